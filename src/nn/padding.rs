/*
 * @Author       : 老董
 * @Date         : 2026-03-04
 * @Description  : 滑动窗口算子（卷积/反卷积/池化）的填充策略
 *
 * - Same：输出尺寸 = ceil(输入 / 步长)，需要的总填充量前后各一半，奇数时多出的 1 放在后面（下/右）
 * - Valid：不填充，输出尺寸 = (输入 - 核) / 步长 + 1
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// 填充策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Padding {
    /// 保持尺寸（步长为 1 时输出与输入同尺寸）
    #[default]
    Same,
    /// 不填充
    Valid,
}

impl Padding {
    /// 单个空间维度的输出尺寸；Valid 模式下核大于输入时返回 None
    pub fn output_size(self, input: usize, kernel: usize, stride: usize) -> Option<usize> {
        match self {
            Self::Same => Some(input.div_ceil(stride)),
            Self::Valid => {
                if input < kernel {
                    None
                } else {
                    Some((input - kernel) / stride + 1)
                }
            }
        }
    }

    /// 单个空间维度前后的填充量 (before, after)
    pub fn pads(self, input: usize, kernel: usize, stride: usize) -> (usize, usize) {
        match self {
            Self::Valid => (0, 0),
            Self::Same => {
                let output = input.div_ceil(stride);
                let needed = (output.saturating_sub(1) * stride + kernel).saturating_sub(input);
                let before = needed / 2;
                (before, needed - before)
            }
        }
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Same => write!(f, "SAME"),
            Self::Valid => write!(f, "VALID"),
        }
    }
}
