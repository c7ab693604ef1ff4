/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : 偏置加法节点：把形状为 [C] 的偏置广播加到输入的最后一维上
 *
 * 父节点：
 * - parents[0]: 输入 [..., C]
 * - parents[1]: 偏置 [C]
 */

use super::super::{TraitNode, parent_of_rank};
use super::expect_parents;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::{DynamicShape, GraphError};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct BiasAdd {
    shape: DynamicShape,
    value: Option<Tensor>,
}

impl BiasAdd {
    pub(crate) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        expect_parents(parents, 2, "BiasAdd")?;
        let input_shape = parents[0].expected_shape();
        let bias_shape = parents[1].expected_shape();
        let bias_len = match bias_shape.dims() {
            [Some(n)] => *n,
            _ => {
                return Err(GraphError::DimensionMismatch {
                    expected: 1,
                    got: bias_shape.ndim(),
                    message: format!("偏置必须是形状确定的 1 维张量，得到{bias_shape}"),
                });
            }
        };
        if input_shape.ndim() == 0 {
            return Err(GraphError::InvalidOperation(
                "BiasAdd 的输入不能是标量".to_string(),
            ));
        }
        if let Some(channels) = input_shape.last_dim() {
            if channels != bias_len {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![channels],
                    got: vec![bias_len],
                    message: "偏置长度必须等于输入的最后一维".to_string(),
                });
            }
        }
        // 最后一维由偏置长度确定
        let shape = input_shape.with_dim(input_shape.ndim() - 1, Some(bias_len));
        Ok(Self { shape, value: None })
    }
}

impl TraitNode for BiasAdd {
    fn type_name(&self) -> &'static str {
        "BiasAdd"
    }

    fn expected_shape(&self) -> &DynamicShape {
        &self.shape
    }

    fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<(), GraphError> {
        let input = parents.first().copied().ok_or_else(|| {
            GraphError::ComputationError("BiasAdd 缺少输入值".to_string())
        })?;
        let bias = parent_of_rank(parents, 1, 1, "BiasAdd")?;
        if input.shape().last() != Some(&bias.size()) {
            return Err(GraphError::ShapeMismatch {
                expected: vec![bias.size()],
                got: input.shape().to_vec(),
                message: "偏置长度必须等于输入的最后一维".to_string(),
            });
        }
        self.value = Some(Tensor::from_array(&input.view() + &bias.view()));
        Ok(())
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::BiasAdd
    }
}
