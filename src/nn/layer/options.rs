/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : 层函数的可选配置
 *
 * 默认值：
 * - 权重：Normal { mean: 0.0, std: 0.01 }
 * - 偏置：Constant(0.0)
 * - 填充：Same（带显式填充的卷积默认 Valid，见`ConvOptions::valid`）
 * - 使用偏置
 */

use crate::nn::{Init, Padding, Var};
use serde::{Deserialize, Serialize};

fn default_weights_initializer() -> Init {
    Init::Normal {
        mean: 0.0,
        std: 0.01,
    }
}

fn default_biases_initializer() -> Init {
    Init::Constant(0.0)
}

const fn default_bias_term() -> bool {
    true
}

/// 卷积/反卷积层的配置
///
/// 可以从 JSON 读入，缺省字段取默认值：
/// ```
/// use graph_layers::nn::layer::ConvOptions;
/// use graph_layers::nn::Padding;
///
/// let opts: ConvOptions = serde_json::from_str(r#"{"padding": "Valid"}"#).unwrap();
/// assert_eq!(opts, ConvOptions::default().padding(Padding::Valid));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvOptions {
    #[serde(default)]
    pub padding: Padding,
    #[serde(default = "default_bias_term")]
    pub bias_term: bool,
    #[serde(default = "default_weights_initializer")]
    pub weights_initializer: Init,
    #[serde(default = "default_biases_initializer")]
    pub biases_initializer: Init,
}

impl Default for ConvOptions {
    fn default() -> Self {
        Self {
            padding: Padding::Same,
            bias_term: default_bias_term(),
            weights_initializer: default_weights_initializer(),
            biases_initializer: default_biases_initializer(),
        }
    }
}

impl ConvOptions {
    /// 不填充的默认配置（`conv2d_with_pad`系列的默认值）
    pub fn valid() -> Self {
        Self::default().padding(Padding::Valid)
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn bias_term(mut self, bias_term: bool) -> Self {
        self.bias_term = bias_term;
        self
    }

    pub fn weights_initializer(mut self, init: Init) -> Self {
        self.weights_initializer = init;
        self
    }

    pub fn biases_initializer(mut self, init: Init) -> Self {
        self.biases_initializer = init;
        self
    }
}

/// 全连接层的配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcOptions {
    #[serde(default = "default_bias_term")]
    pub bias_term: bool,
    #[serde(default = "default_weights_initializer")]
    pub weights_initializer: Init,
    #[serde(default = "default_biases_initializer")]
    pub biases_initializer: Init,
}

impl Default for FcOptions {
    fn default() -> Self {
        Self {
            bias_term: default_bias_term(),
            weights_initializer: default_weights_initializer(),
            biases_initializer: default_biases_initializer(),
        }
    }
}

impl FcOptions {
    pub fn bias_term(mut self, bias_term: bool) -> Self {
        self.bias_term = bias_term;
        self
    }

    pub fn weights_initializer(mut self, init: Init) -> Self {
        self.weights_initializer = init;
        self
    }

    pub fn biases_initializer(mut self, init: Init) -> Self {
        self.biases_initializer = init;
        self
    }
}

/// 批归一化的配置
///
/// `beta`/`gamma`为 None 时，每次调用都新建一对参数（分别全 0、全 1），互不共享。
/// 传入已有的 Var 则直接使用（形状须为[通道数]）。
/// 这里持有的是图节点句柄，因此不支持 serde。
#[derive(Debug, Clone, Default)]
pub struct BatchNormOptions {
    pub beta: Option<Var>,
    pub gamma: Option<Var>,
}

impl BatchNormOptions {
    pub fn beta(mut self, beta: Var) -> Self {
        self.beta = Some(beta);
        self
    }

    pub fn gamma(mut self, gamma: Var) -> Self {
        self.gamma = Some(gamma);
        self
    }
}
