//! Flow-diagram notation parser.
//!
//! Accepts the flowchart.js-style subset used in article content: node
//! definitions `id=>type: label` (optionally `label|flowstate`) and
//! connection lines `a->b`, with branch qualifiers `cond(yes)->b`.

use std::collections::HashSet;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowchartError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Node shapes the notation names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Start,
    End,
    Operation,
    Condition,
    InputOutput,
    Subroutine,
    Parallel,
}

impl NodeKind {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "start" => Some(Self::Start),
            "end" => Some(Self::End),
            "operation" => Some(Self::Operation),
            "condition" => Some(Self::Condition),
            "inputoutput" => Some(Self::InputOutput),
            "subroutine" => Some(Self::Subroutine),
            "parallel" => Some(Self::Parallel),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    /// Optional style class (`label|past`), resolved against the theme's
    /// flow-state table at draw time.
    pub flowstate: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    /// Branch qualifier on the source (`cond(yes)->b`).
    pub branch: Option<String>,
}

/// Parsed diagram: nodes in definition order plus directed edges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowDiagram {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowDiagram {
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

pub fn parse(source: &str) -> Result<FlowDiagram, FlowchartError> {
    let mut diagram = FlowDiagram::default();
    let mut defined: HashSet<String> = HashSet::new();

    for (index, raw_line) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((id, rest)) = line.split_once("=>") {
            let node = parse_definition(line_no, id.trim(), rest.trim())?;
            if !defined.insert(node.id.clone()) {
                return Err(FlowchartError::Parse {
                    line: line_no,
                    message: format!("duplicate node id `{}`", node.id),
                });
            }
            diagram.nodes.push(node);
        } else if line.contains("->") {
            parse_connection(line_no, line, &defined, &mut diagram.edges)?;
        } else {
            return Err(FlowchartError::Parse {
                line: line_no,
                message: format!("expected `id=>type: label` or `a->b`, got `{line}`"),
            });
        }
    }

    Ok(diagram)
}

fn parse_definition(line: usize, id: &str, rest: &str) -> Result<FlowNode, FlowchartError> {
    if id.is_empty() {
        return Err(FlowchartError::Parse {
            line,
            message: "empty node id".to_owned(),
        });
    }
    let (kind_token, label_part) = match rest.split_once(':') {
        Some((kind, label)) => (kind.trim(), label.trim()),
        None => (rest.trim(), ""),
    };
    let Some(kind) = NodeKind::parse(kind_token) else {
        return Err(FlowchartError::Parse {
            line,
            message: format!("unknown node type `{kind_token}`"),
        });
    };
    let (label, flowstate) = match label_part.split_once('|') {
        Some((label, state)) => (label.trim(), Some(state.trim().to_owned())),
        None => (label_part, None),
    };
    Ok(FlowNode {
        id: id.to_owned(),
        kind,
        label: if label.is_empty() {
            id.to_owned()
        } else {
            label.to_owned()
        },
        flowstate,
    })
}

/// Connection lines may chain: `a->b->c` yields two edges.
fn parse_connection(
    line: usize,
    text: &str,
    defined: &HashSet<String>,
    edges: &mut Vec<FlowEdge>,
) -> Result<(), FlowchartError> {
    let segments: Vec<&str> = text.split("->").map(str::trim).collect();
    if segments.len() < 2 {
        return Err(FlowchartError::Parse {
            line,
            message: format!("incomplete connection `{text}`"),
        });
    }
    for pair in segments.windows(2) {
        let (from, branch) = split_branch(line, pair[0])?;
        let (to, _) = split_branch(line, pair[1])?;
        for id in [&from, &to] {
            if !defined.contains(id.as_str()) {
                return Err(FlowchartError::Parse {
                    line,
                    message: format!("connection references undefined node `{id}`"),
                });
            }
        }
        edges.push(FlowEdge { from, to, branch });
    }
    Ok(())
}

/// Split `cond(yes)` into the node id and branch qualifier. Direction hints
/// after a comma (`cond(yes, right)`) are accepted and dropped. A qualifier
/// on the final segment of a chain qualifies no outgoing edge and is also
/// dropped.
fn split_branch(line: usize, segment: &str) -> Result<(String, Option<String>), FlowchartError> {
    let Some(open) = segment.find('(') else {
        return Ok((segment.to_owned(), None));
    };
    let Some(close) = segment.rfind(')') else {
        return Err(FlowchartError::Parse {
            line,
            message: format!("unclosed branch qualifier in `{segment}`"),
        });
    };
    let id = segment[..open].trim().to_owned();
    let inner = &segment[open + 1..close];
    let branch = inner
        .split(',')
        .next()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_owned);
    Ok((id, branch))
}
