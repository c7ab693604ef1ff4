/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : 批归一化层
 *
 * 按最后一维（通道）分别统计均值/方差，统计范围是其余所有轴。
 * 训练标志为 1 时用本批次统计量归一化，并以 decay = 0.5 更新滑动平均；
 * 为 0 时用滑动平均归一化。
 */

use super::{BatchNormOptions, input_shape};
use crate::nn::{Graph, GraphError, Init, Var};

/// 滑动平均的衰减率
pub const BN_DECAY: f32 = 0.5;
/// 方差上的数值稳定项
pub const BN_EPSILON: f32 = 1e-3;

/// 批归一化
///
/// - `training_flag`: 标量输入，通常由`Graph::training_flag`创建，用`Var::set_flag`切换
/// - 未提供的 beta/gamma 会在新的作用域（"BatchNorm"、"BatchNorm_1"...）下创建，
///   分别全 0、全 1，每次调用互不共享
///
/// ```ignore
/// let train = graph.training_flag(true)?;
/// let y = batch_normalize(&graph, &h, &train, &BatchNormOptions::default())?;
/// y.forward()?;          // 训练：更新滑动平均
/// train.set_flag(false)?;
/// y.forward()?;          // 推理：使用滑动平均
/// ```
pub fn batch_normalize(
    graph: &Graph,
    input: &Var,
    training_flag: &Var,
    options: &BatchNormOptions,
) -> Result<Var, GraphError> {
    let shape = input_shape(graph, input, "BatchNorm")?;
    input_shape(graph, training_flag, "BatchNorm")?;
    let channels = shape.last_dim().ok_or_else(|| {
        GraphError::UnknownDimension(format!(
            "批归一化输入的通道维（最后一维）在构图时必须已知（{shape}）"
        ))
    })?;
    for given in [&options.beta, &options.gamma].into_iter().flatten() {
        input_shape(graph, given, "BatchNorm")?;
    }

    let scope_name = graph.inner().unique_scope_name("BatchNorm");
    graph.variable_scope(&scope_name, |g| {
        let beta = match &options.beta {
            Some(beta) => beta.clone(),
            None => g.get_variable("beta", &[channels], &Init::Zeros)?,
        };
        let gamma = match &options.gamma {
            Some(gamma) => gamma.clone(),
            None => g.get_variable("gamma", &[channels], &Init::Ones)?,
        };
        let bn_id = g.inner_mut().new_batch_norm_node(
            [
                input.node_id(),
                beta.node_id(),
                gamma.node_id(),
                training_flag.node_id(),
            ],
            BN_DECAY,
            BN_EPSILON,
            None,
        )?;
        let scope = g.current_scope();
        g.inner_mut().register_layer_group(
            &scope,
            "BatchNorm",
            &format!("{channels} channels, decay {BN_DECAY}, eps {BN_EPSILON}"),
            vec![beta.node_id(), gamma.node_id(), bn_id],
        );
        Ok(g.wrap_node_id(bn_id))
    })
}
