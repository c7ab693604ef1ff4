/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : 矩阵乘法节点：[N, K] × [K, M] → [N, M]（注意父节点顺序）
 */

use super::super::{TraitNode, expect_rank, parent_of_rank};
use super::expect_parents;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::{DynamicShape, GraphError};
use crate::tensor::Tensor;
use ndarray::{ArrayView2, Ix2};

#[derive(Clone)]
pub(crate) struct MatMul {
    shape: DynamicShape,
    value: Option<Tensor>,
}

impl MatMul {
    pub(crate) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        expect_parents(parents, 2, "MatMul")?;
        let left = parents[0].expected_shape();
        let right = parents[1].expected_shape();
        expect_rank(left, 2, "MatMul 的左矩阵必须是 2 维")?;
        expect_rank(right, 2, "MatMul 的右矩阵必须是 2 维")?;
        if let (Some(l), Some(r)) = (left.dim(1), right.dim(0)) {
            if l != r {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![l],
                    got: vec![r],
                    message: format!(
                        "MatMul 左矩阵的列数({l})与右矩阵的行数({r})不相等"
                    ),
                });
            }
        }
        Ok(Self {
            shape: DynamicShape::new(&[left.dim(0), right.dim(1)]),
            value: None,
        })
    }
}

fn as_matrix(t: &Tensor) -> Result<ArrayView2<'_, f32>, GraphError> {
    t.view().into_dimensionality::<Ix2>().map_err(|_| {
        GraphError::ComputationError(format!("无法把形状{:?}视作矩阵", t.shape()))
    })
}

impl TraitNode for MatMul {
    fn type_name(&self) -> &'static str {
        "MatMul"
    }

    fn expected_shape(&self) -> &DynamicShape {
        &self.shape
    }

    fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<(), GraphError> {
        let left = parent_of_rank(parents, 0, 2, "MatMul")?;
        let right = parent_of_rank(parents, 1, 2, "MatMul")?;
        if left.shape()[1] != right.shape()[0] {
            return Err(GraphError::ShapeMismatch {
                expected: vec![left.shape()[1]],
                got: vec![right.shape()[0]],
                message: "MatMul 两个父节点的形状不兼容".to_string(),
            });
        }
        let product = as_matrix(left)?.dot(&as_matrix(right)?);
        self.value = Some(Tensor::from_array(product.into_dyn()));
        Ok(())
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::MatMul
    }
}
