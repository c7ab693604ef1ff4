/*
 * @Author       : 老董
 * @Date         : 2026-03-04
 * @Description  : 输入节点：形状可以只部分已知（如 batch 维为 None），值由外部喂入
 */

use super::TraitNode;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::{DynamicShape, GraphError};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Input {
    shape: DynamicShape,
    value: Option<Tensor>,
}

impl Input {
    pub(crate) const fn new(shape: DynamicShape) -> Self {
        Self { shape, value: None }
    }
}

impl TraitNode for Input {
    fn type_name(&self) -> &'static str {
        "Input"
    }

    fn expected_shape(&self) -> &DynamicShape {
        &self.shape
    }

    fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    fn set_value(&mut self, value: Option<&Tensor>) -> Result<(), GraphError> {
        if let Some(v) = value {
            if !self.shape.is_compatible_with_tensor(v.shape()) {
                return Err(GraphError::ShapeMismatch {
                    expected: self.shape.dims().iter().map(|d| d.unwrap_or(0)).collect(),
                    got: v.shape().to_vec(),
                    message: format!("输入节点期望形状{}，喂入的张量形状不兼容", self.shape),
                });
            }
        }
        self.value = value.cloned();
        Ok(())
    }

    fn calc_value_by_parents(&mut self, _parents: &[&Tensor]) -> Result<(), GraphError> {
        Err(GraphError::InvalidOperation(
            "输入节点的值应通过 set_value 设置，而非通过父节点计算".to_string(),
        ))
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Input
    }
}
