/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : 零填充节点：在 NHWC 张量的 H、W 两个维度前后各补 pad_size 个 0
 */

use super::super::{TraitNode, expect_rank, parent_of_rank};
use super::{expect_parents, view4};
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::{DynamicShape, GraphError};
use crate::tensor::Tensor;
use ndarray::{Array4, s};

#[derive(Clone)]
pub(crate) struct Pad2d {
    shape: DynamicShape,
    value: Option<Tensor>,
    pad_size: usize,
}

impl Pad2d {
    pub(crate) fn new(parents: &[&NodeHandle], pad_size: usize) -> Result<Self, GraphError> {
        expect_parents(parents, 1, "Pad2d")?;
        let input_shape = parents[0].expected_shape();
        expect_rank(input_shape, 4, "Pad2d 输入必须是 4 维 [batch, H, W, C]")?;
        let grow = |d: Option<usize>| d.map(|n| n + 2 * pad_size);
        let shape = input_shape
            .with_dim(1, grow(input_shape.dim(1)))
            .with_dim(2, grow(input_shape.dim(2)));
        Ok(Self {
            shape,
            value: None,
            pad_size,
        })
    }
}

impl TraitNode for Pad2d {
    fn type_name(&self) -> &'static str {
        "Pad2d"
    }

    fn expected_shape(&self) -> &DynamicShape {
        &self.shape
    }

    fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<(), GraphError> {
        let input = view4(parent_of_rank(parents, 0, 4, "Pad2d")?, "Pad2d")?;
        let (batch, h, w, c) = input.dim();
        let p = self.pad_size;
        let mut padded = Array4::<f32>::zeros((batch, h + 2 * p, w + 2 * p, c));
        padded
            .slice_mut(s![.., p..p + h, p..p + w, ..])
            .assign(&input);
        self.value = Some(Tensor::from_array(padded.into_dyn()));
        Ok(())
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Pad2d {
            pad_size: self.pad_size,
        }
    }
}
