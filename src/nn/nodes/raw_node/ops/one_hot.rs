/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : 独热编码节点：整数标签 [batch] → [batch, num_classes]，每行恰好一个 1
 *
 * 标签必须是 [0, num_classes) 内的非负整数，否则执行期报 ComputationError。
 */

use super::super::{TraitNode, expect_rank, parent_of_rank};
use super::expect_parents;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::{DynamicShape, GraphError};
use crate::tensor::Tensor;
use ndarray::Array2;

#[derive(Clone)]
pub(crate) struct OneHot {
    shape: DynamicShape,
    value: Option<Tensor>,
    num_classes: usize,
}

impl OneHot {
    pub(crate) fn new(parents: &[&NodeHandle], num_classes: usize) -> Result<Self, GraphError> {
        expect_parents(parents, 1, "OneHot")?;
        if num_classes == 0 {
            return Err(GraphError::InvalidOperation(
                "类别数必须为正数".to_string(),
            ));
        }
        let labels_shape = parents[0].expected_shape();
        expect_rank(labels_shape, 1, "标签必须是 1 维 [batch]")?;
        Ok(Self {
            shape: DynamicShape::new(&[labels_shape.dim(0), Some(num_classes)]),
            value: None,
            num_classes,
        })
    }
}

impl TraitNode for OneHot {
    fn type_name(&self) -> &'static str {
        "OneHot"
    }

    fn expected_shape(&self) -> &DynamicShape {
        &self.shape
    }

    fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<(), GraphError> {
        let labels = parent_of_rank(parents, 0, 1, "OneHot")?;
        let indices = labels.to_indices().map_err(|bad| {
            GraphError::ComputationError(format!("标签{bad}不是非负整数"))
        })?;

        let mut encoded = Array2::<f32>::zeros((indices.len(), self.num_classes));
        for (row, &class) in indices.iter().enumerate() {
            if class >= self.num_classes {
                return Err(GraphError::ComputationError(format!(
                    "标签{class}超出类别范围[0, {})",
                    self.num_classes
                )));
            }
            encoded[[row, class]] = 1.0;
        }
        self.value = Some(Tensor::from_array(encoded.into_dyn()));
        Ok(())
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::OneHot {
            num_classes: self.num_classes,
        }
    }
}
