//! Vector output for parsed flow diagrams.
//!
//! Vertical-stack layout: nodes are placed in definition order down the
//! page, edges drawn as straight connectors with optional branch labels.
//! Colors come from the theme palette resolved at draw time.

use std::collections::HashMap;
use std::fmt::Write;

use quill_renderer::escape_html;

use crate::flowchart::grammar::{FlowDiagram, NodeKind};
use crate::theme::FlowchartOptions;

const NODE_WIDTH: u32 = 160;
const NODE_HEIGHT: u32 = 40;
const CHAR_WIDTH: u32 = 8;

/// Draw the diagram as a standalone `<svg>` fragment.
#[must_use]
pub fn draw(diagram: &FlowDiagram, options: &FlowchartOptions) -> String {
    let gap = options.line_length;
    let step = NODE_HEIGHT + gap;
    let width = diagram
        .nodes
        .iter()
        .map(|n| node_width(&n.label))
        .max()
        .unwrap_or(NODE_WIDTH)
        + 4 * options.text_margin;
    let height = (u32::try_from(diagram.nodes.len()).unwrap_or(0)) * step + gap;
    let center_x = width / 2;

    let mut positions: HashMap<&str, (u32, u32)> = HashMap::new();
    for (index, node) in diagram.nodes.iter().enumerate() {
        let y = gap + u32::try_from(index).unwrap_or(0) * step;
        positions.insert(node.id.as_str(), (center_x, y));
    }

    let mut svg = String::with_capacity(1024);
    write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    )
    .unwrap();

    // Edges first so node shapes paint over connector ends.
    for edge in &diagram.edges {
        let (Some(&(fx, fy)), Some(&(tx, ty))) = (
            positions.get(edge.from.as_str()),
            positions.get(edge.to.as_str()),
        ) else {
            continue;
        };
        let (x1, y1, x2, y2) = if ty >= fy {
            (fx, fy + NODE_HEIGHT, tx, ty)
        } else {
            // Back edge: leave from the side.
            (fx + NODE_WIDTH / 2, fy + NODE_HEIGHT / 2, tx, ty + NODE_HEIGHT / 2)
        };
        write!(
            svg,
            r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{}" stroke-width="{}"/>"#,
            options.line_color, options.line_width
        )
        .unwrap();
        if let Some(branch) = &edge.branch {
            let label = match branch.as_str() {
                "yes" => options.yes_text,
                "no" => options.no_text,
                other => other,
            };
            write!(
                svg,
                r#"<text x="{}" y="{}" font-size="{}" fill="{}">{}</text>"#,
                x1 + 6,
                (y1 + y2) / 2,
                options.font_size - 2,
                options.font_color,
                escape_html(label)
            )
            .unwrap();
        }
    }

    for node in &diagram.nodes {
        let Some(&(cx, y)) = positions.get(node.id.as_str()) else {
            continue;
        };
        let w = node_width(&node.label);
        let x = cx - w / 2;
        let style = node
            .flowstate
            .as_deref()
            .and_then(|state| options.flowstate(state));
        let fill = style.map_or(options.fill, |s| s.fill);
        let font_color = style
            .and_then(|s| s.font_color)
            .unwrap_or(options.font_color);
        let font_size = style.and_then(|s| s.font_size).unwrap_or(options.font_size);
        let weight = if style.is_some_and(|s| s.bold) {
            r#" font-weight="bold""#
        } else {
            ""
        };

        match node.kind {
            NodeKind::Start | NodeKind::End => {
                write!(
                    svg,
                    r#"<rect x="{x}" y="{y}" width="{w}" height="{NODE_HEIGHT}" rx="20" fill="{fill}" stroke="{}" stroke-width="{}"/>"#,
                    options.element_color, options.line_width
                )
                .unwrap();
            }
            NodeKind::Condition => {
                let half_w = w / 2;
                let half_h = NODE_HEIGHT / 2;
                write!(
                    svg,
                    r#"<polygon points="{cx},{y} {},{} {cx},{} {},{}" fill="{fill}" stroke="{}" stroke-width="{}"/>"#,
                    cx + half_w,
                    y + half_h,
                    y + NODE_HEIGHT,
                    cx - half_w,
                    y + half_h,
                    options.element_color,
                    options.line_width
                )
                .unwrap();
            }
            NodeKind::InputOutput => {
                let skew = 12;
                write!(
                    svg,
                    r#"<polygon points="{},{y} {},{y} {},{} {x},{}" fill="{fill}" stroke="{}" stroke-width="{}"/>"#,
                    x + skew,
                    x + w,
                    x + w - skew,
                    y + NODE_HEIGHT,
                    y + NODE_HEIGHT,
                    options.element_color,
                    options.line_width
                )
                .unwrap();
            }
            NodeKind::Subroutine => {
                write!(
                    svg,
                    r#"<rect x="{x}" y="{y}" width="{w}" height="{NODE_HEIGHT}" fill="{fill}" stroke="{}" stroke-width="{}"/>"#,
                    options.element_color, options.line_width
                )
                .unwrap();
                // Double side bars mark the subroutine shape.
                for bar_x in [x + 6, x + w - 6] {
                    write!(
                        svg,
                        r#"<line x1="{bar_x}" y1="{y}" x2="{bar_x}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
                        y + NODE_HEIGHT,
                        options.element_color,
                        options.line_width
                    )
                    .unwrap();
                }
            }
            NodeKind::Operation | NodeKind::Parallel => {
                write!(
                    svg,
                    r#"<rect x="{x}" y="{y}" width="{w}" height="{NODE_HEIGHT}" fill="{fill}" stroke="{}" stroke-width="{}"/>"#,
                    options.element_color, options.line_width
                )
                .unwrap();
            }
        }

        write!(
            svg,
            r#"<text x="{cx}" y="{}" text-anchor="middle" font-size="{font_size}" fill="{font_color}"{weight}>{}</text>"#,
            y + NODE_HEIGHT / 2 + font_size / 3,
            escape_html(&node.label)
        )
        .unwrap();
    }

    svg.push_str("</svg>");
    svg
}

fn node_width(label: &str) -> u32 {
    let text = u32::try_from(label.chars().count()).unwrap_or(0) * CHAR_WIDTH + 24;
    text.max(NODE_WIDTH / 2).max(64)
}
