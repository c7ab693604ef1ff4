/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : 2D 卷积节点（NHWC）
 *
 * 父节点：
 * - parents[0]: 输入 [batch, H, W, C_in]
 * - parents[1]: 卷积核 [kH, kW, C_in, C_out]
 *
 * 输出 [batch, H', W', C_out]，H'/W' 由填充策略决定（见 Padding）。
 * 使用 Rayon 在 batch 维度并行。
 */

use super::super::{TraitNode, expect_rank, parent_of_rank};
use super::{expect_parents, fixed_kernel_shape, stack_samples, view4};
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::{DynamicShape, GraphError, Padding};
use crate::tensor::Tensor;
use rayon::prelude::*;

#[derive(Clone)]
pub(crate) struct Conv2d {
    shape: DynamicShape,
    value: Option<Tensor>,
    stride: usize,
    padding: Padding,
}

impl Conv2d {
    pub(crate) fn new(
        parents: &[&NodeHandle],
        stride: usize,
        padding: Padding,
    ) -> Result<Self, GraphError> {
        expect_parents(parents, 2, "Conv2d")?;
        if stride == 0 {
            return Err(GraphError::InvalidOperation(
                "Conv2d 的步长必须为正数".to_string(),
            ));
        }
        let input_shape = parents[0].expected_shape();
        expect_rank(input_shape, 4, "Conv2d 输入必须是 4 维 [batch, H, W, C]")?;
        let [kernel_h, kernel_w, kernel_in, kernel_out] = fixed_kernel_shape(parents[1], "Conv2d")?;

        if let Some(in_channels) = input_shape.last_dim() {
            if in_channels != kernel_in {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![kernel_in],
                    got: vec![in_channels],
                    message: format!(
                        "输入通道数{in_channels}与卷积核输入通道数{kernel_in}不匹配"
                    ),
                });
            }
        }

        let out_h = spatial_out(input_shape.dim(1), kernel_h, stride, padding)?;
        let out_w = spatial_out(input_shape.dim(2), kernel_w, stride, padding)?;
        let shape = DynamicShape::new(&[input_shape.dim(0), out_h, out_w, Some(kernel_out)]);

        Ok(Self {
            shape,
            value: None,
            stride,
            padding,
        })
    }
}

/// 构图期推断单个空间维度的输出尺寸；输入尺寸未知时输出也未知
fn spatial_out(
    input: Option<usize>,
    kernel: usize,
    stride: usize,
    padding: Padding,
) -> Result<Option<usize>, GraphError> {
    match input {
        None => Ok(None),
        Some(size) => padding
            .output_size(size, kernel, stride)
            .map(Some)
            .ok_or_else(|| {
                GraphError::InvalidOperation(format!(
                    "卷积输出尺寸无效：输入{size}，核{kernel}，步长{stride}，填充{padding}"
                ))
            }),
    }
}

impl TraitNode for Conv2d {
    fn type_name(&self) -> &'static str {
        "Conv2d"
    }

    fn expected_shape(&self) -> &DynamicShape {
        &self.shape
    }

    fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<(), GraphError> {
        let input = view4(parent_of_rank(parents, 0, 4, "Conv2d")?, "Conv2d")?;
        let kernel = view4(parent_of_rank(parents, 1, 4, "Conv2d")?, "Conv2d")?;
        let (batch, in_h, in_w, in_c) = input.dim();
        let (kernel_h, kernel_w, kernel_in, out_c) = kernel.dim();
        if in_c != kernel_in {
            return Err(GraphError::ComputationError(format!(
                "输入通道数{in_c}与卷积核输入通道数{kernel_in}不匹配"
            )));
        }

        let stride = self.stride;
        let out_size = |size: usize, k: usize| {
            self.padding.output_size(size, k, stride).ok_or_else(|| {
                GraphError::ComputationError(format!("输入尺寸{size}小于卷积核{k}"))
            })
        };
        let out_h = out_size(in_h, kernel_h)?;
        let out_w = out_size(in_w, kernel_w)?;
        let (pad_top, _) = self.padding.pads(in_h, kernel_h, stride);
        let (pad_left, _) = self.padding.pads(in_w, kernel_w, stride);

        let samples: Vec<Vec<f32>> = (0..batch)
            .into_par_iter()
            .map(|b| {
                let mut out = vec![0.0f32; out_h * out_w * out_c];
                for oh in 0..out_h {
                    for ow in 0..out_w {
                        let acc = &mut out[(oh * out_w + ow) * out_c..][..out_c];
                        for kh in 0..kernel_h {
                            // 落在填充区的位置贡献为 0，直接跳过
                            let Some(ih) = (oh * stride + kh).checked_sub(pad_top) else {
                                continue;
                            };
                            if ih >= in_h {
                                continue;
                            }
                            for kw in 0..kernel_w {
                                let Some(iw) = (ow * stride + kw).checked_sub(pad_left) else {
                                    continue;
                                };
                                if iw >= in_w {
                                    continue;
                                }
                                for ic in 0..in_c {
                                    let x = input[[b, ih, iw, ic]];
                                    for (oc, slot) in acc.iter_mut().enumerate() {
                                        *slot += x * kernel[[kh, kw, ic, oc]];
                                    }
                                }
                            }
                        }
                    }
                }
                out
            })
            .collect();

        self.value = Some(stack_samples(samples, &[batch, out_h, out_w, out_c])?);
        Ok(())
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Conv2d {
            stride: self.stride,
            padding: self.padding,
        }
    }
}
