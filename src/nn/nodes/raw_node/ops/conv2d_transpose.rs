/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : 2D 转置卷积（反卷积）节点（NHWC）
 *
 * 父节点：
 * - parents[0]: 输入 [batch, H, W, C_in]
 * - parents[1]: 卷积核 [kH, kW, C_out, C_in]（注意通道顺序与普通卷积相反）
 *
 * 输出形状必须在构图时显式给出，且满足：以同样的核/步长/填充对输出做正向卷积，
 * 得到的空间尺寸恰好等于输入尺寸。
 * 计算方式：out[b, ih*s+kh-pad_top, iw*s+kw-pad_left, oc] += x[b, ih, iw, ic] * w[kh, kw, oc, ic]
 */

use super::super::{TraitNode, expect_rank, parent_of_rank};
use super::{expect_parents, fixed_kernel_shape, stack_samples, view4};
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::{DynamicShape, GraphError, Padding};
use crate::tensor::Tensor;
use rayon::prelude::*;

#[derive(Clone)]
pub(crate) struct Conv2dTranspose {
    shape: DynamicShape,
    value: Option<Tensor>,
    output_shape: [usize; 4],
    stride: usize,
    padding: Padding,
}

impl Conv2dTranspose {
    pub(crate) fn new(
        parents: &[&NodeHandle],
        output_shape: [usize; 4],
        stride: usize,
        padding: Padding,
    ) -> Result<Self, GraphError> {
        expect_parents(parents, 2, "Conv2dTranspose")?;
        if stride == 0 {
            return Err(GraphError::InvalidOperation(
                "Conv2dTranspose 的步长必须为正数".to_string(),
            ));
        }
        let input_shape = parents[0].expected_shape();
        expect_rank(input_shape, 4, "Conv2dTranspose 输入必须是 4 维 [batch, H, W, C]")?;
        let [kernel_h, kernel_w, kernel_out, kernel_in] =
            fixed_kernel_shape(parents[1], "Conv2dTranspose")?;

        let [out_batch, out_h, out_w, out_c] = output_shape;
        if out_c != kernel_out {
            return Err(GraphError::ShapeMismatch {
                expected: vec![kernel_out],
                got: vec![out_c],
                message: "输出通道数与卷积核的输出通道数不匹配".to_string(),
            });
        }

        // 正向卷积 output_shape 应当还原出输入形状
        let restored = [
            Some(out_batch),
            padding.output_size(out_h, kernel_h, stride),
            padding.output_size(out_w, kernel_w, stride),
            Some(kernel_in),
        ];
        for (axis, restored_dim) in restored.iter().enumerate() {
            if let Some(actual) = input_shape.dim(axis) {
                if *restored_dim != Some(actual) {
                    return Err(GraphError::ShapeMismatch {
                        expected: restored.iter().map(|d| d.unwrap_or(0)).collect(),
                        got: input_shape.dims().iter().map(|d| d.unwrap_or(0)).collect(),
                        message: format!(
                            "输出形状{output_shape:?}与输入形状{input_shape}在核{kernel_h}×{kernel_w}、步长{stride}、填充{padding}下不对应"
                        ),
                    });
                }
            }
        }

        Ok(Self {
            shape: DynamicShape::fixed(&output_shape),
            value: None,
            output_shape,
            stride,
            padding,
        })
    }
}

impl TraitNode for Conv2dTranspose {
    fn type_name(&self) -> &'static str {
        "Conv2dTranspose"
    }

    fn expected_shape(&self) -> &DynamicShape {
        &self.shape
    }

    fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<(), GraphError> {
        let input = view4(parent_of_rank(parents, 0, 4, "Conv2dTranspose")?, "Conv2dTranspose")?;
        let kernel = view4(parent_of_rank(parents, 1, 4, "Conv2dTranspose")?, "Conv2dTranspose")?;
        let (batch, in_h, in_w, in_c) = input.dim();
        let (kernel_h, kernel_w, _, kernel_in) = kernel.dim();
        let [out_batch, out_h, out_w, out_c] = self.output_shape;
        if batch != out_batch || in_c != kernel_in {
            return Err(GraphError::ComputationError(format!(
                "输入形状{:?}与构图时声明的 batch={out_batch}、输入通道数={kernel_in}不一致",
                input.shape()
            )));
        }

        let stride = self.stride;
        let (pad_top, _) = self.padding.pads(out_h, kernel_h, stride);
        let (pad_left, _) = self.padding.pads(out_w, kernel_w, stride);

        let samples: Vec<Vec<f32>> = (0..batch)
            .into_par_iter()
            .map(|b| {
                let mut out = vec![0.0f32; out_h * out_w * out_c];
                for ih in 0..in_h {
                    for iw in 0..in_w {
                        for kh in 0..kernel_h {
                            let Some(oh) = (ih * stride + kh).checked_sub(pad_top) else {
                                continue;
                            };
                            if oh >= out_h {
                                continue;
                            }
                            for kw in 0..kernel_w {
                                let Some(ow) = (iw * stride + kw).checked_sub(pad_left) else {
                                    continue;
                                };
                                if ow >= out_w {
                                    continue;
                                }
                                let acc = &mut out[(oh * out_w + ow) * out_c..][..out_c];
                                for ic in 0..in_c {
                                    let x = input[[b, ih, iw, ic]];
                                    for (oc, slot) in acc.iter_mut().enumerate() {
                                        *slot += x * kernel[[kh, kw, oc, ic]];
                                    }
                                }
                            }
                        }
                    }
                }
                out
            })
            .collect();

        self.value = Some(stack_samples(samples, &self.output_shape)?);
        Ok(())
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Conv2dTranspose {
            stride: self.stride,
            padding: self.padding,
            output_shape: self.output_shape.to_vec(),
        }
    }
}
