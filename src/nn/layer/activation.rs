/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : 激活函数
 */

use crate::nn::{GraphError, Var};

/// 对任意层的输出逐元素取 ReLU，无参数，形状不变
pub fn with_relu(output: &Var) -> Result<Var, GraphError> {
    output.relu()
}
