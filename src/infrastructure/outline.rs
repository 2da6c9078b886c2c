//! Indented outline reader feeding the import path
//!
//! One node per line, two spaces of indentation per level:
//!
//! ```text
//! Projects [id=1]
//!   Alpha [id=2] #work [bookmark]
//!   Beta [shared=2]
//! // comment lines and blank lines are ignored
//! ```
//!
//! `#word` tokens are tags, bracketed tokens are attributes, the rest is the
//! node name.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::application::ImportNode;
use crate::domain::{NodeId, NodeRecord};
use crate::infrastructure::error::{InfraError, InfraResult};

const INDENT: usize = 2;

/// Parsed outline: top-level nodes plus bookmarked ids in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    pub nodes: Vec<ImportNode>,
    pub bookmarks: Vec<NodeId>,
}

impl Outline {
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(ImportNode::count).sum()
    }
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([a-z-]+)(?:=([^\]]*))?\]").expect("valid attribute pattern"))
}

pub fn read_outline(path: &Path) -> InfraResult<Outline> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| InfraError::io(format!("read {}", path.display()), e))?;
    parse_outline(&content)
}

pub fn parse_outline(content: &str) -> InfraResult<Outline> {
    let mut outline = Outline::default();
    // stack[level] is the open node at that depth
    let mut stack: Vec<ImportNode> = Vec::new();

    for (i, raw) in content.lines().enumerate() {
        let line_no = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let leading = &raw[..raw.len() - raw.trim_start().len()];
        if leading.contains('\t') {
            return Err(InfraError::outline(line_no, "tabs are not allowed in indentation"));
        }
        if leading.len() % INDENT != 0 {
            return Err(InfraError::outline(
                line_no,
                format!("indentation must be a multiple of {} spaces", INDENT),
            ));
        }
        let level = leading.len() / INDENT;
        if level > stack.len() {
            return Err(InfraError::outline(line_no, "indentation skips a level"));
        }

        let (record, bookmarked) = parse_line(trimmed, line_no)?;
        if bookmarked {
            outline.bookmarks.push(record.id);
        }

        close_to(&mut stack, level, &mut outline.nodes);
        stack.push(ImportNode::new(record));
    }
    close_to(&mut stack, 0, &mut outline.nodes);
    debug!(nodes = outline.node_count(), "outline parsed");
    Ok(outline)
}

/// Pop open nodes until `level` remain, attaching each to its parent.
fn close_to(stack: &mut Vec<ImportNode>, level: usize, roots: &mut Vec<ImportNode>) {
    while stack.len() > level {
        let Some(done) = stack.pop() else { break };
        match stack.last_mut() {
            Some(parent) => parent.children.push(done),
            None => roots.push(done),
        }
    }
}

fn parse_int<T: std::str::FromStr>(value: Option<&str>, key: &str, line: usize) -> InfraResult<T> {
    value
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| InfraError::outline(line, format!("attribute '{}' needs a number", key)))
}

fn parse_line(text: &str, line: usize) -> InfraResult<(NodeRecord, bool)> {
    let mut record = NodeRecord::default();
    let mut bookmarked = false;

    for caps in attribute_regex().captures_iter(text) {
        let key = &caps[1];
        let value = caps.get(2).map(|m| m.as_str());
        match key {
            "id" => record.id = parse_int(value, key, line)?,
            "shared" => record.shared_master_id = parse_int(value, key, line)?,
            "seq" => record.sequence = parse_int(value, key, line)?,
            "icon" => record.custom_icon_id = parse_int(value, key, line)?,
            "bold" => record.is_bold = true,
            "ro" => record.is_read_only = true,
            "exclude" => record.exclude_me_from_search = true,
            "exclude-children" => record.exclude_children_from_search = true,
            "bookmark" => bookmarked = true,
            "syntax" => record.syntax = value.unwrap_or_default().trim().to_string(),
            "fg" => record.foreground_color = value.unwrap_or_default().trim().to_string(),
            other => {
                return Err(InfraError::outline(line, format!("unknown attribute '{}'", other)))
            }
        }
    }

    let rest = attribute_regex().replace_all(text, " ");
    let (tags, words): (Vec<&str>, Vec<&str>) = rest
        .split_whitespace()
        .partition(|t| t.len() > 1 && t.starts_with('#'));
    record.name = words.join(" ");
    record.tags = tags
        .iter()
        .map(|t| t.trim_start_matches('#'))
        .collect::<Vec<_>>()
        .join(" ");

    if record.name.is_empty() {
        return Err(InfraError::outline(line, "node has no name"));
    }
    if bookmarked && record.id == 0 {
        return Err(InfraError::outline(line, "bookmarked nodes need an explicit [id=N]"));
    }
    Ok((record, bookmarked))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_nested_outline_then_tree_shape_and_attributes_parsed() {
        let outline = parse_outline(
            "Root [id=1]\n  Alpha [id=2] #work #home [bold] [bookmark]\n  Beta [shared=2]\nOther\n",
        )
        .unwrap();
        assert_eq!(outline.nodes.len(), 2);
        assert_eq!(outline.node_count(), 4);
        let alpha = &outline.nodes[0].children[0].record;
        assert_eq!(alpha.name, "Alpha");
        assert_eq!(alpha.tags, "work home");
        assert!(alpha.is_bold);
        assert_eq!(outline.bookmarks, vec![2]);
        assert_eq!(outline.nodes[0].children[1].record.shared_master_id, 2);
    }

    #[test]
    fn given_skipped_level_then_error_names_line() {
        let err = parse_outline("Root\n    Deep\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn given_unknown_attribute_then_error() {
        assert!(parse_outline("Root [color=red]\n").is_err());
    }
}
