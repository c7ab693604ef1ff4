use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    #[error("数据长度{data_len}与形状{shape:?}所需的元素个数{expected}不一致")]
    DataLengthMismatch {
        data_len: usize,
        shape: Vec<usize>,
        expected: usize,
    },
    #[error("无法将形状为{from:?}的张量重塑为{to:?}")]
    IncompatibleReshape { from: Vec<usize>, to: Vec<usize> },
}
