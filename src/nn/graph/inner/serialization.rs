/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : GraphInner 参数检查点（save_params/load_params）
 *
 * 文件内容是 bincode 编码的 ParamCheckpoint：
 * - 所有参数节点，按全名保存
 * - 所有批归一化节点的滑动平均，保存为"{节点名}/moving_mean"和"{节点名}/moving_variance"
 * 加载时按名称匹配；文件里出现图中不存在的名称或形状不一致都视为错误，
 * 出错时图中的参数和滑动平均都不会被修改。
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::NodeType;
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

const MOVING_MEAN_SUFFIX: &str = "/moving_mean";
const MOVING_VARIANCE_SUFFIX: &str = "/moving_variance";

#[derive(Debug, Serialize, Deserialize)]
struct ParamCheckpoint {
    magic: [u8; 4],
    version: u32,
    params: Vec<ParamRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ParamRecord {
    name: String,
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl ParamRecord {
    fn new(name: String, value: &Tensor) -> Self {
        Self {
            name,
            shape: value.shape().to_vec(),
            data: value.to_vec(),
        }
    }

    fn to_tensor(&self) -> Result<Tensor, GraphError> {
        Ok(Tensor::try_new(&self.data, &self.shape)?)
    }
}

impl GraphInner {
    /// 参数文件魔数
    const PARAMS_MAGIC: [u8; 4] = *b"GLPR";
    /// 参数文件版本
    const PARAMS_VERSION: u32 = 1;

    /// 保存所有参数和批归一化滑动平均到二进制文件
    pub fn save_params<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let mut params = Vec::new();
        for node_id in self.nodes() {
            let node = self.get_node(node_id)?;
            match node.node_type() {
                NodeType::Parameter(_) => {
                    let value = node.value().ok_or_else(|| {
                        GraphError::ComputationError(format!("参数{}没有值", node.name()))
                    })?;
                    params.push(ParamRecord::new(node.name().to_string(), value));
                }
                NodeType::BatchNorm(bn) => {
                    params.push(ParamRecord::new(
                        format!("{}{MOVING_MEAN_SUFFIX}", node.name()),
                        bn.moving_mean(),
                    ));
                    params.push(ParamRecord::new(
                        format!("{}{MOVING_VARIANCE_SUFFIX}", node.name()),
                        bn.moving_variance(),
                    ));
                }
                _ => {}
            }
        }

        let checkpoint = ParamCheckpoint {
            magic: Self::PARAMS_MAGIC,
            version: Self::PARAMS_VERSION,
            params,
        };
        let file = File::create(path.as_ref())
            .map_err(|e| GraphError::ComputationError(format!("无法创建参数文件: {e}")))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, &checkpoint)
            .map_err(|e| GraphError::ComputationError(format!("写入参数失败: {e}")))?;
        writer
            .flush()
            .map_err(|e| GraphError::ComputationError(format!("刷新缓冲区失败: {e}")))
    }

    /// 从二进制文件加载参数（图结构须与保存时一致）
    pub fn load_params<P: AsRef<Path>>(&mut self, path: P) -> Result<(), GraphError> {
        let file = File::open(path.as_ref())
            .map_err(|e| GraphError::ComputationError(format!("无法打开参数文件: {e}")))?;
        let checkpoint: ParamCheckpoint = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| GraphError::ComputationError(format!("无效的参数文件: {e}")))?;
        if checkpoint.magic != Self::PARAMS_MAGIC {
            return Err(GraphError::ComputationError(
                "无效的参数文件：魔数不匹配，请使用 save_params() 保存的文件".to_string(),
            ));
        }
        if checkpoint.version != Self::PARAMS_VERSION {
            return Err(GraphError::ComputationError(format!(
                "不支持的参数文件版本: {}",
                checkpoint.version
            )));
        }

        // 先校验全部记录，全部通过后才写回，失败时图保持原样
        let mut params: Vec<(NodeId, Tensor)> = Vec::new();
        let mut moving: HashMap<NodeId, (Option<Tensor>, Option<Tensor>)> = HashMap::new();
        for record in &checkpoint.params {
            let value = record.to_tensor()?;
            if let Some(node_id) = self.get_node_id_by_name(&record.name) {
                let node = self.get_node(node_id)?;
                let NodeType::Parameter(_) = node.node_type() else {
                    return Err(GraphError::ComputationError(format!(
                        "参数文件中的{}对应的{node}不是参数节点",
                        record.name
                    )));
                };
                let expected = node.value().map(|v| v.shape().to_vec()).unwrap_or_default();
                if expected != record.shape {
                    return Err(GraphError::ShapeMismatch {
                        expected,
                        got: record.shape.clone(),
                        message: format!("参数文件中的{}与图中参数形状不一致", record.name),
                    });
                }
                params.push((node_id, value));
                continue;
            }
            let (bn_name, is_mean) = if let Some(bn) = record.name.strip_suffix(MOVING_MEAN_SUFFIX)
            {
                (bn, true)
            } else if let Some(bn) = record.name.strip_suffix(MOVING_VARIANCE_SUFFIX) {
                (bn, false)
            } else {
                return Err(GraphError::ComputationError(format!(
                    "参数文件中的{}在图中不存在",
                    record.name
                )));
            };
            let (node_id, bn) = self
                .get_node_id_by_name(bn_name)
                .and_then(|id| match self.get_node(id).map(|n| n.node_type()) {
                    Ok(NodeType::BatchNorm(bn)) => Some((id, bn)),
                    _ => None,
                })
                .ok_or_else(|| {
                    GraphError::ComputationError(format!(
                        "参数文件中的{}找不到对应的批归一化节点",
                        record.name
                    ))
                })?;
            let current = if is_mean {
                bn.moving_mean()
            } else {
                bn.moving_variance()
            };
            if current.shape() != value.shape() {
                return Err(GraphError::ShapeMismatch {
                    expected: current.shape().to_vec(),
                    got: value.shape().to_vec(),
                    message: format!("参数文件中的{}与滑动平均形状不一致", record.name),
                });
            }
            let slot = moving.entry(node_id).or_default();
            if is_mean {
                slot.0 = Some(value);
            } else {
                slot.1 = Some(value);
            }
        }

        for (node_id, value) in params {
            self.set_node_value(node_id, Some(&value))?;
        }
        for (node_id, (mean, variance)) in moving {
            let node = self.get_node_mut(node_id)?;
            let name = node.name().to_string();
            let NodeType::BatchNorm(bn) = node.node_type_mut() else {
                continue;
            };
            let mean = mean.unwrap_or_else(|| bn.moving_mean().clone());
            let variance = variance.unwrap_or_else(|| bn.moving_variance().clone());
            bn.set_moving_statistics(&mean, &variance)
                .map_err(|e| GraphError::ComputationError(format!("{name}: {e}")))?;
        }
        Ok(())
    }
}
