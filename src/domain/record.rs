//! Node records: the passive value stored at every tree position

use std::fmt;

/// Store-wide node identifier. `0` is never assigned.
pub type NodeId = i64;

/// Syntax marker for rich text nodes.
pub const SYNTAX_RICH_TEXT: &str = "custom-colors";
/// Syntax marker for plain text nodes.
pub const SYNTAX_PLAIN_TEXT: &str = "plain-text";

/// Opaque handle to an editable content buffer owned by the content collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Kind of a non-text element embedded in a content buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchoredKind {
    Image,
    EmbeddedFile,
    Table,
    CodeBox,
    Latex,
    Anchor,
}

/// Embedded element tied to a character offset of the node's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchoredObject {
    pub offset: i32,
    pub kind: AnchoredKind,
}

impl AnchoredObject {
    pub fn new(offset: i32, kind: AnchoredKind) -> Self {
        Self { offset, kind }
    }
}

/// All attributes of one node.
///
/// Content fields (everything between `name` and `last_save_timestamp`, plus
/// the buffer and anchored objects) are ignored for shared nodes: the master
/// record is authoritative. `id`, `shared_master_id` and `sequence` always
/// belong to the node itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: NodeId,
    /// `0` when the node is not shared
    pub shared_master_id: NodeId,
    pub sequence: i64,
    pub name: String,
    pub syntax: String,
    /// Space and/or comma separated
    pub tags: String,
    pub is_read_only: bool,
    pub custom_icon_id: u32,
    pub is_bold: bool,
    pub exclude_me_from_search: bool,
    pub exclude_children_from_search: bool,
    pub foreground_color: String,
    pub creation_timestamp: i64,
    pub last_save_timestamp: i64,
    /// `None` until the content collaborator materializes the buffer
    pub content: Option<BufferHandle>,
    pub anchored_objects: Vec<AnchoredObject>,
}

impl Default for NodeRecord {
    fn default() -> Self {
        Self {
            id: 0,
            shared_master_id: 0,
            sequence: 0,
            name: String::new(),
            syntax: SYNTAX_RICH_TEXT.to_string(),
            tags: String::new(),
            is_read_only: false,
            custom_icon_id: 0,
            is_bold: false,
            exclude_me_from_search: false,
            exclude_children_from_search: false,
            foreground_color: String::new(),
            creation_timestamp: 0,
            last_save_timestamp: 0,
            content: None,
            anchored_objects: Vec::new(),
        }
    }
}

impl NodeRecord {
    /// Record with just a name; everything else defaulted.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_shared(&self) -> bool {
        self.shared_master_id != 0
    }

    pub fn is_rich_text(&self) -> bool {
        self.syntax == SYNTAX_RICH_TEXT
    }

    pub fn is_plain_text(&self) -> bool {
        self.syntax == SYNTAX_PLAIN_TEXT
    }

    pub fn is_text(&self) -> bool {
        self.is_rich_text() || self.is_plain_text()
    }

    pub fn is_code(&self) -> bool {
        !self.is_text()
    }

    /// Copy every content field from `holder`, keeping this record's identity.
    pub(crate) fn take_content_from(&mut self, holder: &NodeRecord, include_content: bool) {
        self.name = holder.name.clone();
        self.syntax = holder.syntax.clone();
        self.tags = holder.tags.clone();
        self.is_read_only = holder.is_read_only;
        self.custom_icon_id = holder.custom_icon_id;
        self.is_bold = holder.is_bold;
        self.exclude_me_from_search = holder.exclude_me_from_search;
        self.exclude_children_from_search = holder.exclude_children_from_search;
        self.foreground_color = holder.foreground_color.clone();
        self.creation_timestamp = holder.creation_timestamp;
        self.last_save_timestamp = holder.last_save_timestamp;
        if include_content {
            self.content = holder.content;
            self.anchored_objects = holder.anchored_objects.clone();
        } else {
            self.content = None;
            self.anchored_objects.clear();
        }
    }
}

impl fmt::Display for NodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.id)
    }
}

/// Rendering weight for bold node names.
pub const WEIGHT_BOLD: i32 = 900;
/// Rendering weight for regular node names.
pub const WEIGHT_NORMAL: i32 = 400;

pub fn weight_from_is_bold(is_bold: bool) -> i32 {
    if is_bold {
        WEIGHT_BOLD
    } else {
        WEIGHT_NORMAL
    }
}

pub fn is_bold_from_weight(weight: i32) -> bool {
    weight == WEIGHT_BOLD
}
