use std::collections::HashSet;
use std::fmt;

use ratatui::layout::Rect;

use crate::colour::{ColourSource, RandomColour};
use crate::error::Error;
use crate::node::{Node, NodeId};
use crate::path_format::PathFormat;

/// A tree which can be laid out as a treemap.
///
/// Nodes live in an arena owned by the tree and reference each other by [`NodeId`].
/// The tree is assembled bottom-up: leaves first, then the nodes containing them.
/// The root is the most recently inserted node which was not adopted by a parent.
///
/// # Example
///
/// ```
/// # use tui_treemap::TmTree;
/// let mut tree = TmTree::new();
/// let a = tree.insert_leaf("a.txt", 10);
/// let b = tree.insert_leaf("b.txt", 20);
/// let root = tree.insert("docs", vec![a, b])?;
/// assert_eq!(tree.root(), Some(root));
/// assert_eq!(tree[root].data_size(), 30);
/// # Ok::<(), tui_treemap::Error>(())
/// ```
pub struct TmTree {
    pub(crate) nodes: Vec<Node>,
    colours: Box<dyn ColourSource>,
    format: Option<Box<dyn PathFormat>>,
}

impl TmTree {
    /// Create a tree without nodes which colours its nodes randomly.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            colours: Box::new(RandomColour::new()),
            format: None,
        }
    }

    /// Use the given source for the colours of nodes inserted from now on.
    #[must_use]
    pub fn with_colours<C>(mut self, colours: C) -> Self
    where
        C: ColourSource + 'static,
    {
        self.colours = Box::new(colours);
        self
    }

    /// Supply the separator and suffix used by [`path_string`](Self::path_string).
    #[must_use]
    pub fn with_format<F>(mut self, format: F) -> Self
    where
        F: PathFormat + 'static,
    {
        self.format = Some(Box::new(format));
        self
    }

    fn push(&mut self, name: Option<String>, data_size: u64, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let colour = self.colours.next_colour();
        self.nodes.push(Node {
            name,
            data_size,
            colour,
            children,
            parent: None,
            rect: Rect::default(),
            expanded: false,
        });
        id
    }

    /// Insert a node without children and the given intrinsic size.
    pub fn insert_leaf<N>(&mut self, name: N, data_size: u64) -> NodeId
    where
        N: Into<String>,
    {
        self.push(Some(name.into()), data_size, Vec::new())
    }

    /// Insert the empty tree: no name, no children and a size of zero.
    pub fn insert_empty(&mut self) -> NodeId {
        self.push(None, 0, Vec::new())
    }

    /// Insert a node adopting the given, previously inserted, `children` in their order.
    ///
    /// The size of the new node is the sum of its children.
    /// All children are collapsed, and so is the new node.
    /// Without children this is the same as a leaf of size 0.
    ///
    /// # Errors
    ///
    /// Errors when a child is unknown, the empty tree, already has a parent or is given twice.
    pub fn insert<N>(&mut self, name: N, children: Vec<NodeId>) -> Result<NodeId, Error>
    where
        N: Into<String>,
    {
        let mut seen = HashSet::with_capacity(children.len());
        for &child in &children {
            let node = self.get(child).ok_or(Error::UnknownNode(child))?;
            if node.is_empty() {
                return Err(Error::EmptyChild(child));
            }
            if node.parent.is_some() {
                return Err(Error::AlreadyAttached(child));
            }
            if !seen.insert(child) {
                return Err(Error::DuplicateChild(child));
            }
        }

        let data_size: u64 = children.iter().map(|&child| self[child].data_size).sum();
        let id = self.push(Some(name.into()), data_size, children);
        for child in self.nodes[id.0].children.clone() {
            let child = &mut self.nodes[child.0];
            child.parent = Some(id);
            child.expanded = false;
        }
        Ok(id)
    }

    /// The most recently inserted node without a parent.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .rposition(|node| node.parent.is_none())
            .map(NodeId)
    }

    /// Get a node by its id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Amount of nodes ever inserted, including nodes no longer reachable from the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ancestors of `id`, nearest first. The root is last.
    ///
    /// Unknown nodes have no ancestors.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.get(id).and_then(Node::parent);
        while let Some(parent) = current {
            result.push(parent);
            current = self[parent].parent;
        }
        result
    }

    /// Return the separator between the names of `id` and its parent.
    ///
    /// # Errors
    ///
    /// Errors when no [`PathFormat`] was supplied.
    pub fn separator(&self, _id: NodeId) -> Result<&str, Error> {
        self.format
            .as_deref()
            .map(|format| format.separator())
            .ok_or(Error::Unimplemented("separator"))
    }

    /// Return the string describing the kind of `id` at the end of its path.
    ///
    /// # Errors
    ///
    /// Errors when `id` is unknown or no [`PathFormat`] was supplied.
    pub fn suffix(&self, id: NodeId) -> Result<&str, Error> {
        let is_leaf = self.get(id).ok_or(Error::UnknownNode(id))?.is_leaf();
        self.format
            .as_deref()
            .map(|format| format.suffix(is_leaf))
            .ok_or(Error::Unimplemented("suffix"))
    }

    /// Return the names from the root down to `id` joined by the separator.
    ///
    /// With `final_node` the suffix of `id` is appended.
    /// Leaves always get their suffix.
    ///
    /// # Errors
    ///
    /// Errors when `id` is unknown or no [`PathFormat`] was supplied.
    pub fn path_string(&self, id: NodeId, final_node: bool) -> Result<String, Error> {
        let node = self.get(id).ok_or(Error::UnknownNode(id))?;
        let name = node.name().unwrap_or_default();
        let mut path = match node.parent {
            None => name.to_owned(),
            Some(parent) => {
                let mut path = self.path_string(parent, false)?;
                path += self.separator(id)?;
                path += name;
                path
            }
        };
        if final_node || (node.parent.is_some() && node.is_leaf()) {
            path += self.suffix(id)?;
        }
        Ok(path)
    }

    /// Verify the representation invariants of every node reachable from the root.
    ///
    /// # Errors
    ///
    /// Describes the first violation found.
    pub fn check_invariants(&self) -> Result<(), Error> {
        let Some(root) = self.root() else {
            return Ok(());
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &self[id];
            if node.is_empty() && (!node.is_leaf() || node.parent.is_some() || node.data_size != 0)
            {
                return Err(Error::Invariant(format!("{id:?} is only partially empty")));
            }
            if !node.is_leaf() {
                let sum: u64 = node.children.iter().map(|&child| self[child].data_size).sum();
                if sum != node.data_size {
                    return Err(Error::Invariant(format!(
                        "{id:?} has size {} but its children sum up to {sum}",
                        node.data_size
                    )));
                }
            }
            if let Some(parent) = node.parent {
                let occurrences = self[parent].children.iter().filter(|&&c| c == id).count();
                if occurrences != 1 {
                    return Err(Error::Invariant(format!(
                        "{id:?} appears {occurrences} times in its parent {parent:?}"
                    )));
                }
                if node.expanded && !self[parent].expanded {
                    return Err(Error::Invariant(format!(
                        "{id:?} is expanded while its parent {parent:?} is collapsed"
                    )));
                }
            }
            if node.expanded && node.is_leaf() {
                return Err(Error::Invariant(format!("{id:?} is an expanded leaf")));
            }
            for &child in &node.children {
                if self[child].parent != Some(id) {
                    return Err(Error::Invariant(format!(
                        "{child:?} is a child of {id:?} but does not point back"
                    )));
                }
                stack.push(child);
            }
        }
        Ok(())
    }
}

impl Default for TmTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TmTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmTree")
            .field("nodes", &self.nodes)
            .field("root", &self.root())
            .field("has_format", &self.format.is_some())
            .finish_non_exhaustive()
    }
}

/// # Panics
///
/// Panics when the id was not created by this tree.
impl std::ops::Index<NodeId> for TmTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

#[cfg(test)]
impl TmTree {
    /// Named like the example items of the tree widget:
    ///
    /// ```text
    /// root (65)
    /// ├── a (5)
    /// ├── b (30)
    /// │   ├── c (10)
    /// │   ├── d (15)
    /// │   │   ├── e (5)
    /// │   │   └── f (10)
    /// │   └── g (5)
    /// └── h (30)
    /// ```
    pub(crate) fn example() -> Self {
        use ratatui::style::Color;

        use crate::colour::FixedColour;

        let mut tree = Self::new().with_colours(FixedColour(Color::Rgb(1, 2, 3)));
        let a = tree.insert_leaf("a", 5);
        let c = tree.insert_leaf("c", 10);
        let e = tree.insert_leaf("e", 5);
        let f = tree.insert_leaf("f", 10);
        let d = tree.insert("d", vec![e, f]).expect("children are new");
        let g = tree.insert_leaf("g", 5);
        let b = tree.insert("b", vec![c, d, g]).expect("children are new");
        let h = tree.insert_leaf("h", 30);
        tree.insert("root", vec![a, b, h]).expect("children are new");
        tree
    }

    /// Find a node reachable from the root by its name.
    pub(crate) fn find(&self, name: &str) -> NodeId {
        let mut stack = vec![self.root().expect("tree has a root")];
        while let Some(id) = stack.pop() {
            if self[id].name() == Some(name) {
                return id;
            }
            stack.extend_from_slice(&self[id].children);
        }
        panic!("no node named {name}");
    }
}

#[test]
fn sizes_are_summed_on_insert() {
    let tree = TmTree::example();
    assert_eq!(tree[tree.find("root")].data_size(), 65);
    assert_eq!(tree[tree.find("b")].data_size(), 30);
    assert_eq!(tree[tree.find("d")].data_size(), 15);
    tree.check_invariants().unwrap();
}

#[test]
fn children_point_to_their_parent() {
    let tree = TmTree::example();
    let b = tree.find("b");
    for &child in tree[b].children() {
        assert_eq!(tree[child].parent(), Some(b));
    }
    assert_eq!(tree[tree.find("root")].parent(), None);
}

#[test]
fn insert_collapses_children() {
    let mut tree = TmTree::new();
    let a = tree.insert_leaf("a", 1);
    let b = tree.insert_leaf("b", 1);
    let inner = tree.insert("inner", vec![a, b]).unwrap();
    tree.nodes[inner.0].expanded = true;
    let root = tree.insert("root", vec![inner]).unwrap();
    assert!(!tree[inner].is_expanded());
    assert!(!tree[root].is_expanded());
}

#[test]
fn insert_without_children_is_leaf_of_zero() {
    let mut tree = TmTree::new();
    let id = tree.insert("lonely", Vec::new()).unwrap();
    assert!(tree[id].is_leaf());
    assert_eq!(tree[id].data_size(), 0);
}

#[test]
fn insert_errors_with_adopted_child() {
    let mut tree = TmTree::new();
    let a = tree.insert_leaf("a", 1);
    tree.insert("first", vec![a]).unwrap();
    let result = tree.insert("second", vec![a]);
    assert_eq!(result, Err(Error::AlreadyAttached(a)));
}

#[test]
fn insert_errors_with_duplicate_child() {
    let mut tree = TmTree::new();
    let a = tree.insert_leaf("a", 1);
    let result = tree.insert("root", vec![a, a]);
    assert_eq!(result, Err(Error::DuplicateChild(a)));
    assert_eq!(tree[a].parent(), None);
}

#[test]
fn insert_errors_with_empty_child() {
    let mut tree = TmTree::new();
    let empty = tree.insert_empty();
    let result = tree.insert("root", vec![empty]);
    assert_eq!(result, Err(Error::EmptyChild(empty)));
    assert_eq!(tree[empty].parent(), None);
    assert_eq!(tree.root(), Some(empty));
    tree.check_invariants().unwrap();
}

#[test]
fn insert_errors_with_unknown_child() {
    let mut tree = TmTree::new();
    let result = tree.insert("root", vec![NodeId(7)]);
    assert_eq!(result, Err(Error::UnknownNode(NodeId(7))));
}

#[test]
fn empty_tree_is_all_empty() {
    let mut tree = TmTree::new();
    let id = tree.insert_empty();
    let node = &tree[id];
    assert!(node.is_empty());
    assert!(node.is_leaf());
    assert_eq!(node.parent(), None);
    assert_eq!(node.data_size(), 0);
    tree.check_invariants().unwrap();
}

#[test]
fn root_is_last_unadopted() {
    let mut tree = TmTree::new();
    assert_eq!(tree.root(), None);
    let a = tree.insert_leaf("a", 1);
    assert_eq!(tree.root(), Some(a));
    let root = tree.insert("root", vec![a]).unwrap();
    assert_eq!(tree.root(), Some(root));
}

#[test]
fn colours_come_from_the_source() {
    use ratatui::style::Color;

    let mut next = 0_u8;
    let mut tree = TmTree::new().with_colours(move || {
        next += 1;
        Color::Rgb(next, next, next)
    });
    let a = tree.insert_leaf("a", 1);
    let root = tree.insert("root", vec![a]).unwrap();
    assert_eq!(tree[a].colour(), Color::Rgb(1, 1, 1));
    assert_eq!(tree[root].colour(), Color::Rgb(2, 2, 2));
}

#[test]
fn ancestors_end_with_root() {
    let tree = TmTree::example();
    let ancestors = tree.ancestors(tree.find("e"));
    assert_eq!(
        ancestors,
        [tree.find("d"), tree.find("b"), tree.find("root")]
    );
}

#[cfg(test)]
fn slash_format() -> crate::path_format::SimpleFormat {
    crate::path_format::SimpleFormat {
        separator: "/".to_owned(),
        leaf_suffix: " (leaf)".to_owned(),
        internal_suffix: " (node)".to_owned(),
    }
}

#[test]
fn path_string_joins_ancestors() {
    let tree = TmTree::example().with_format(slash_format());
    assert_eq!(
        tree.path_string(tree.find("e"), true).unwrap(),
        "root/b/d/e (leaf)"
    );
    assert_eq!(
        tree.path_string(tree.find("d"), true).unwrap(),
        "root/b/d (node)"
    );
    assert_eq!(tree.path_string(tree.find("d"), false).unwrap(), "root/b/d");
    assert_eq!(tree.path_string(tree.find("a"), false).unwrap(), "root/a (leaf)");
    assert_eq!(
        tree.path_string(tree.find("root"), true).unwrap(),
        "root (node)"
    );
    assert_eq!(tree.path_string(tree.find("root"), false).unwrap(), "root");
}

#[test]
fn path_string_of_unknown_node_errors() {
    let tree = TmTree::example().with_format(slash_format());
    let unknown = NodeId(1_000);
    assert_eq!(tree.path_string(unknown, true), Err(Error::UnknownNode(unknown)));
    assert_eq!(tree.suffix(unknown), Err(Error::UnknownNode(unknown)));
    assert!(tree.ancestors(unknown).is_empty());
}

#[test]
fn path_string_without_format_is_unimplemented() {
    let tree = TmTree::example();
    let e = tree.find("e");
    assert_eq!(tree.separator(e), Err(Error::Unimplemented("separator")));
    assert_eq!(tree.suffix(e), Err(Error::Unimplemented("suffix")));
    assert_eq!(
        tree.path_string(e, true),
        Err(Error::Unimplemented("separator"))
    );
    // The root alone needs no separator
    assert_eq!(tree.path_string(tree.find("root"), false).unwrap(), "root");
}

#[test]
fn check_invariants_finds_size_mismatch() {
    let mut tree = TmTree::example();
    let c = tree.find("c");
    tree.nodes[c.0].data_size = 11;
    let error = tree.check_invariants().unwrap_err();
    assert!(matches!(error, Error::Invariant(message) if message.contains("sum up to")));
}

#[test]
fn check_invariants_finds_expanded_below_collapsed() {
    let mut tree = TmTree::example();
    let d = tree.find("d");
    tree.nodes[d.0].expanded = true;
    assert!(tree.check_invariants().is_err());
}
