//! # Graph Layers
//!
//! `graph_layers`提供一组在计算图上搭建常见网络层的便捷函数：
//! 卷积、带显式填充的卷积、反卷积（转置卷积）、最大池化、全连接、批归一化和独热编码。
//!
//! 每个函数只做三件事：在命名作用域下创建（或复用）权重/偏置参数，
//! 调用一个图算子，返回输出节点的句柄（[`nn::Var`]）。
//! 数值计算由图在`forward`时完成，层函数本身不持有任何状态。
//!
//! ```ignore
//! use graph_layers::nn::layer::{conv2d_relu, max_pool2d, fully_connected, ConvOptions, FcOptions};
//! use graph_layers::nn::{Graph, Padding};
//!
//! let graph = Graph::new_with_seed(42);
//! let x = graph.placeholder(&[None, Some(28), Some(28), Some(1)], Some("images"))?;
//! let h = conv2d_relu(&graph, "conv1", &x, 3, 1, 16, &ConvOptions::default())?;
//! let h = max_pool2d(&graph, "pool1", &h, 2, 2, Padding::Same)?;
//! let logits = fully_connected(&graph, "fc1", &h, 10, &FcOptions::default())?;
//! ```

pub mod errors;
pub mod nn;
pub mod tensor;
pub mod utils;
