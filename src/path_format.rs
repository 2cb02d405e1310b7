/// Describes how the path of a node is written by [`TmTree::path_string`](crate::TmTree::path_string).
///
/// Supplied by whatever built the tree, as it knows what the names stand for.
/// See [`FileSystemFormat`](crate::file_system::FileSystemFormat) for the file system flavour.
pub trait PathFormat {
    /// Placed between the names of a node and its ancestors.
    fn separator(&self) -> &str;

    /// Appended to the path describing the kind of the node.
    fn suffix(&self, is_leaf: bool) -> &str;
}

/// A [`PathFormat`] made of plain strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleFormat {
    pub separator: String,
    pub leaf_suffix: String,
    pub internal_suffix: String,
}

impl PathFormat for SimpleFormat {
    fn separator(&self) -> &str {
        &self.separator
    }

    fn suffix(&self, is_leaf: bool) -> &str {
        if is_leaf {
            &self.leaf_suffix
        } else {
            &self.internal_suffix
        }
    }
}
