//! Index of distinct tags used across the tree

use std::collections::BTreeSet;

/// Split a node's tag string on whitespace and commas.
pub fn tokenize_tags(tags: &str) -> impl Iterator<Item = &str> {
    tags.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
}

/// Deduplicated, case-sensitive tag set.
///
/// Grows as tags are registered; stale tags stay until `clear` and a rebuild.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    tags: BTreeSet<String>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_tags(&mut self, tag_string: &str) {
        for token in tokenize_tags(tag_string) {
            if !self.tags.contains(token) {
                self.tags.insert(token.to_string());
            }
        }
    }

    pub fn all_tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_mixed_separators_then_tokens_are_split_and_deduplicated() {
        let mut index = TagIndex::new();
        index.register_tags("work, home  work,,Urgent");
        let tags: Vec<_> = index.all_tags().iter().cloned().collect();
        assert_eq!(tags, ["Urgent", "home", "work"]);
    }

    #[test]
    fn given_case_variants_then_kept_distinct() {
        let mut index = TagIndex::new();
        index.register_tags("todo TODO");
        assert_eq!(index.all_tags().len(), 2);
    }

    #[test]
    fn given_blank_string_then_nothing_registered() {
        let mut index = TagIndex::new();
        index.register_tags(" , \t ");
        assert!(index.all_tags().is_empty());
    }
}
