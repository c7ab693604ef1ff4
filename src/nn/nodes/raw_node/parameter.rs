/*
 * @Author       : 老董
 * @Date         : 2026-03-04
 * @Description  : 参数节点：形状在创建时完全确定，创建时即按初始化策略填好值
 */

use super::TraitNode;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::{DynamicShape, GraphError};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Parameter {
    shape: DynamicShape,
    value: Tensor,
}

impl Parameter {
    pub(crate) fn new(init_value: Tensor) -> Self {
        Self {
            shape: DynamicShape::fixed(init_value.shape()),
            value: init_value,
        }
    }
}

impl TraitNode for Parameter {
    fn type_name(&self) -> &'static str {
        "Parameter"
    }

    fn expected_shape(&self) -> &DynamicShape {
        &self.shape
    }

    fn value(&self) -> Option<&Tensor> {
        Some(&self.value)
    }

    fn set_value(&mut self, value: Option<&Tensor>) -> Result<(), GraphError> {
        let value = value.ok_or_else(|| {
            GraphError::InvalidOperation("参数节点的值不能被清空".to_string())
        })?;
        if value.shape() != self.value.shape() {
            return Err(GraphError::ShapeMismatch {
                expected: self.value.shape().to_vec(),
                got: value.shape().to_vec(),
                message: "参数节点的新值必须与原形状一致".to_string(),
            });
        }
        self.value = value.clone();
        Ok(())
    }

    fn calc_value_by_parents(&mut self, _parents: &[&Tensor]) -> Result<(), GraphError> {
        Err(GraphError::InvalidOperation(
            "参数节点的值应通过初始化或 set_value 设置，而非通过父节点计算".to_string(),
        ))
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Parameter
    }
}
