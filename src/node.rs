use ratatui::layout::Rect;
use ratatui::style::Color;

/// Reference to a [`Node`] inside a [`TmTree`](crate::TmTree).
///
/// Ids are only meaningful for the tree which created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node inside the arena of its tree.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A node in a [`TmTree`](crate::TmTree).
///
/// Internal nodes and leaves share this representation.
/// Whether a node is a leaf is derived from its children and never stored.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// `None` marks the empty tree.
    pub(crate) name: Option<String>,
    pub(crate) data_size: u64,
    pub(crate) colour: Color,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) rect: Rect,
    pub(crate) expanded: bool,
}

impl Node {
    /// The name of this node or `None` for the empty tree.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// For leaves their intrinsic size, for internal nodes the sum of their children.
    #[must_use]
    pub const fn data_size(&self) -> u64 {
        self.data_size
    }

    /// Assigned once on construction and stable afterwards.
    #[must_use]
    pub const fn colour(&self) -> Color {
        self.colour
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Rectangle of the last layout pass. Zero sized before the first one.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}
