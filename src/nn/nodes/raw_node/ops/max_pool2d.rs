/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : 2D 最大池化节点（NHWC）
 *
 * - 每个通道独立取窗口内最大值
 * - Same 填充时，落在填充区的位置不参与取最大值（而不是当作 0）
 * - 使用 Rayon 在 batch 维度并行
 *
 * 父节点：
 * - parents[0]: 输入 [batch, H, W, C]
 */

use super::super::{TraitNode, expect_rank, parent_of_rank};
use super::{expect_parents, stack_samples, view4};
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::{DynamicShape, GraphError, Padding};
use crate::tensor::Tensor;
use rayon::prelude::*;

#[derive(Clone)]
pub(crate) struct MaxPool2d {
    shape: DynamicShape,
    value: Option<Tensor>,
    kernel_size: usize,
    stride: usize,
    padding: Padding,
}

impl MaxPool2d {
    pub(crate) fn new(
        parents: &[&NodeHandle],
        kernel_size: usize,
        stride: usize,
        padding: Padding,
    ) -> Result<Self, GraphError> {
        expect_parents(parents, 1, "MaxPool2d")?;
        if kernel_size == 0 || stride == 0 {
            return Err(GraphError::InvalidOperation(format!(
                "MaxPool2d 的窗口大小和步长必须为正数，得到 kernel_size={kernel_size}, stride={stride}"
            )));
        }
        let input_shape = parents[0].expected_shape();
        expect_rank(input_shape, 4, "MaxPool2d 输入必须是 4 维 [batch, H, W, C]")?;

        let mut shape = input_shape.clone();
        for axis in [1, 2] {
            if let Some(size) = input_shape.dim(axis) {
                let out = padding
                    .output_size(size, kernel_size, stride)
                    .ok_or_else(|| {
                        GraphError::InvalidOperation(format!(
                            "池化窗口{kernel_size}大于输入尺寸{size}（{padding}）"
                        ))
                    })?;
                shape = shape.with_dim(axis, Some(out));
            }
        }

        Ok(Self {
            shape,
            value: None,
            kernel_size,
            stride,
            padding,
        })
    }
}

impl TraitNode for MaxPool2d {
    fn type_name(&self) -> &'static str {
        "MaxPool2d"
    }

    fn expected_shape(&self) -> &DynamicShape {
        &self.shape
    }

    fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<(), GraphError> {
        let input = view4(parent_of_rank(parents, 0, 4, "MaxPool2d")?, "MaxPool2d")?;
        let (batch, in_h, in_w, channels) = input.dim();
        let (k, stride) = (self.kernel_size, self.stride);
        let out_size = |size: usize| {
            self.padding.output_size(size, k, stride).ok_or_else(|| {
                GraphError::ComputationError(format!("输入尺寸{size}小于池化窗口{k}"))
            })
        };
        let out_h = out_size(in_h)?;
        let out_w = out_size(in_w)?;
        let (pad_top, _) = self.padding.pads(in_h, k, stride);
        let (pad_left, _) = self.padding.pads(in_w, k, stride);

        let samples: Vec<Vec<f32>> = (0..batch)
            .into_par_iter()
            .map(|b| {
                let mut out = vec![f32::NEG_INFINITY; out_h * out_w * channels];
                for oh in 0..out_h {
                    for ow in 0..out_w {
                        let acc = &mut out[(oh * out_w + ow) * channels..][..channels];
                        for kh in 0..k {
                            let Some(ih) = (oh * stride + kh).checked_sub(pad_top) else {
                                continue;
                            };
                            if ih >= in_h {
                                continue;
                            }
                            for kw in 0..k {
                                let Some(iw) = (ow * stride + kw).checked_sub(pad_left) else {
                                    continue;
                                };
                                if iw >= in_w {
                                    continue;
                                }
                                for (c, slot) in acc.iter_mut().enumerate() {
                                    *slot = slot.max(input[[b, ih, iw, c]]);
                                }
                            }
                        }
                    }
                }
                out
            })
            .collect();

        self.value = Some(stack_samples(samples, &[batch, out_h, out_w, channels])?);
        Ok(())
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::MaxPool2d {
            kernel_size: self.kernel_size,
            stride: self.stride,
            padding: self.padding,
        }
    }
}
