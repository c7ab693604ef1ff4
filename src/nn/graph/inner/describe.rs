/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : GraphInner describe/summary 相关方法
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::descriptor::{GraphDescriptor, NodeDescriptor};
use std::path::Path;

impl GraphInner {
    // ========== 图描述（describe）==========

    /// 导出图的描述符（用于序列化、调试）
    ///
    /// # 示例
    /// ```ignore
    /// let descriptor = graph.describe();
    /// println!("{}", descriptor.to_json()?);
    /// ```
    pub fn describe(&self) -> GraphDescriptor {
        let mut descriptor = GraphDescriptor::new(&self.name);

        for node_id in self.nodes() {
            let Some(node) = self.nodes.get(&node_id) else {
                continue;
            };
            let parents = self
                .backward_edges
                .get(&node_id)
                .map(|ids| ids.iter().map(|id| id.0).collect())
                .unwrap_or_default();

            descriptor.add_node(NodeDescriptor::new(
                node_id.0,
                node.name(),
                node.descriptor(),
                node.expected_shape().dims().to_vec(),
                parents,
            ));
        }

        descriptor
    }

    // ========== 模型摘要（summary）==========

    /// 打印模型摘要（类似 Keras 的`model.summary()`）
    ///
    /// ```text
    /// ┌────────────────┬───────────┬────────────────┬────────────┬──────────┐
    /// │ 节点名称       │ 类型      │ 输出形状       │     参数量 │ 父节点   │
    /// ├────────────────┼───────────┼────────────────┼────────────┼──────────┤
    /// │ images         │ Input     │ [?, 28, 28, 1] │          - │ -        │
    /// ...
    /// ```
    pub fn summary(&self) {
        println!("{}", self.summary_string());
    }

    /// 将模型摘要保存到文件
    ///
    /// 根据文件扩展名自动选择格式：
    /// - `.md` → Markdown 表格
    /// - 其他（`.txt` 等）→ Unicode 文本表格
    pub fn save_summary<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let path = path.as_ref();
        let summary = match path.extension().and_then(|e| e.to_str()) {
            Some("md") => self.summary_markdown(),
            _ => self.summary_string(),
        };
        std::fs::write(path, summary)
            .map_err(|e| GraphError::ComputationError(format!("保存摘要文件失败: {e}")))
    }

    /// 返回模型摘要的 Markdown 格式字符串
    pub fn summary_markdown(&self) -> String {
        let desc = self.describe();
        let mut output = format!("# 模型摘要: {}\n\n", desc.name);

        output.push_str("| 节点名称 | 类型 | 输出形状 | 参数量 | 父节点 |\n");
        output.push_str("|----------|------|----------|--------|--------|\n");
        for node in &desc.nodes {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                node.name,
                node.type_name(),
                node.shape_string(),
                node.param_count
                    .map_or_else(|| "-".to_string(), Self::format_number),
                Self::format_parent_names(&desc, &node.parents)
            ));
        }

        if !self.layer_groups.is_empty() {
            output.push_str("\n## 层\n\n| 层名称 | 类型 | 描述 |\n|--------|------|------|\n");
            for group in &self.layer_groups {
                output.push_str(&format!(
                    "| {} | {} | {} |\n",
                    group.name, group.layer_type, group.description
                ));
            }
        }

        output.push_str(&format!(
            "\n**总参数量**: {}\n",
            Self::format_number(desc.total_params())
        ));
        output
    }

    /// 返回模型摘要字符串（Unicode 文本表格，用于控制台输出）
    pub fn summary_string(&self) -> String {
        let desc = self.describe();
        let rows: Vec<[String; 5]> = desc
            .nodes
            .iter()
            .map(|node| {
                [
                    node.name.clone(),
                    node.type_name().to_string(),
                    node.shape_string(),
                    node.param_count
                        .map_or_else(|| "-".to_string(), Self::format_number),
                    Self::format_parent_names(&desc, &node.parents),
                ]
            })
            .collect();

        let headers = ["节点名称", "类型", "输出形状", "参数量", "父节点"];
        let mut widths = headers.map(Self::display_width);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(Self::display_width(cell));
            }
        }
        let total_width = widths.iter().map(|w| w + 3).sum::<usize>() + 1;

        let border = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{left}{}{right}\n", segments.join(mid))
        };
        let line = |cells: [&str; 5], right_align_params: bool| {
            let mut out = String::from("│");
            for (i, (cell, width)) in cells.iter().zip(widths.iter()).enumerate() {
                let pad = " ".repeat(width - Self::display_width(cell));
                if i == 3 && right_align_params {
                    out.push_str(&format!(" {pad}{cell} │"));
                } else {
                    out.push_str(&format!(" {cell}{pad} │"));
                }
            }
            out.push('\n');
            out
        };

        let mut output = border("┌", "┬", "┐");
        output.push_str(&line(headers, false));
        output.push_str(&border("├", "┼", "┤"));
        for row in &rows {
            let cells = [
                row[0].as_str(),
                row[1].as_str(),
                row[2].as_str(),
                row[3].as_str(),
                row[4].as_str(),
            ];
            output.push_str(&line(cells, true));
        }
        output.push_str(&border("├", "┴", "┤"));

        let footer = |text: String| {
            let pad = " ".repeat((total_width - 4).saturating_sub(Self::display_width(&text)));
            format!("│ {text}{pad} │\n")
        };
        output.push_str(&footer(format!(
            "总参数量: {}",
            Self::format_number(desc.total_params())
        )));
        for group in &self.layer_groups {
            output.push_str(&footer(format!(
                "{} ({}): {}",
                group.name, group.layer_type, group.description
            )));
        }
        output.push_str(&format!("└{}┘\n", "─".repeat(total_width - 2)));

        output
    }

    /// 格式化数字为千分位分隔形式
    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        for (i, c) in s.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }
        result.chars().rev().collect()
    }

    fn format_parent_names(desc: &GraphDescriptor, parent_ids: &[u64]) -> String {
        if parent_ids.is_empty() {
            "-".to_string()
        } else {
            parent_ids
                .iter()
                .filter_map(|id| desc.nodes.iter().find(|n| n.id == *id))
                .map(|n| n.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    /// 计算字符串显示宽度（U+1100 之后的中日韩等字符按 2 格算）
    fn display_width(s: &str) -> usize {
        s.chars().map(|c| if (c as u32) < 0x1100 { 1 } else { 2 }).sum()
    }
}
