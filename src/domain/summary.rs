//! Tree statistics

use crate::domain::arena::TreeArena;
use crate::domain::record::AnchoredKind;

/// Counts over every data-holding node (aliases are not counted twice).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryInfo {
    pub nodes_rich_text: usize,
    pub nodes_plain_text: usize,
    pub nodes_code: usize,
    pub nodes_shared: usize,
    pub images: usize,
    pub embedded_files: usize,
    pub tables: usize,
    pub codeboxes: usize,
    pub anchors: usize,
    pub latexes: usize,
}

impl SummaryInfo {
    pub fn collect(arena: &TreeArena) -> Self {
        let mut info = Self::default();
        for (_, node) in arena.iter() {
            let record = &node.record;
            if record.is_shared() {
                info.nodes_shared += 1;
                continue;
            }
            if record.is_rich_text() {
                info.nodes_rich_text += 1;
            } else if record.is_plain_text() {
                info.nodes_plain_text += 1;
            } else {
                info.nodes_code += 1;
            }
            for object in &record.anchored_objects {
                match object.kind {
                    AnchoredKind::Image => info.images += 1,
                    AnchoredKind::EmbeddedFile => info.embedded_files += 1,
                    AnchoredKind::Table => info.tables += 1,
                    AnchoredKind::CodeBox => info.codeboxes += 1,
                    AnchoredKind::Anchor => info.anchors += 1,
                    AnchoredKind::Latex => info.latexes += 1,
                }
            }
        }
        info
    }

    pub fn total_nodes(&self) -> usize {
        self.nodes_rich_text + self.nodes_plain_text + self.nodes_code + self.nodes_shared
    }
}
