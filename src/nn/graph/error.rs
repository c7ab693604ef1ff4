/*
 * @Author       : 老董
 * @Date         : 2026-03-04
 * @Description  : Graph 模块的错误类型
 */

use crate::errors::TensorError;
use crate::nn::NodeId;
use thiserror::Error;

/// Graph 操作错误类型
///
/// 构图期（形状不匹配、维度未知、参数名冲突）和执行期（缺少输入值、标签越界）
/// 的错误都用它表示，层函数不做任何捕获或重试，直接用`?`向上传递。
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    #[error("节点{0}不存在")]
    NodeNotFound(NodeId),
    #[error("非法操作：{0}")]
    InvalidOperation(String),
    #[error("形状不匹配（预期{expected:?}，实际{got:?}）：{message}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },
    #[error("维数不匹配（预期{expected}维，实际{got}维）：{message}")]
    DimensionMismatch {
        expected: usize,
        got: usize,
        message: String,
    },
    #[error("构图时维度未知：{0}")]
    UnknownDimension(String),
    #[error("计算错误：{0}")]
    ComputationError(String),
    #[error("节点名重复：{0}")]
    DuplicateNodeName(String),
    #[error("参数冲突：{0}")]
    ParameterConflict(String),
}

impl From<TensorError> for GraphError {
    fn from(e: TensorError) -> Self {
        Self::ComputationError(e.to_string())
    }
}
