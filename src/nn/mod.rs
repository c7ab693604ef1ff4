/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : 负责神经网络（neural network）的构建：计算图、节点和层函数
 */

mod descriptor;
mod graph;
pub mod layer;
mod nodes;
mod padding;
mod shape;
mod var;

pub use descriptor::{GraphDescriptor, NodeDescriptor, NodeTypeDescriptor};
pub use graph::{Graph, GraphError, GraphInner, LayerGroup};
pub use nodes::NodeId;
pub use padding::Padding;
pub use shape::{Dim, DynamicShape};
pub use var::{Init, Var};

#[cfg(test)]
mod tests;
