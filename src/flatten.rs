use crate::{NodeId, TmTree};

/// A node which is shown as a single rectangle in the current display.
///
/// Either a leaf or a node which is not expanded.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flattened {
    pub id: NodeId,
    /// Zero based depth. The root has depth 0.
    pub depth: usize,
}

/// Recursive implementation of [`TmTree::visible_nodes`].
///
/// Appends in child order, depth first, which is also the order of drawing.
pub(crate) fn flatten(tree: &TmTree, id: NodeId, depth: usize, result: &mut Vec<Flattened>) {
    let node = &tree[id];
    if node.is_leaf() || !node.expanded {
        result.push(Flattened { id, depth });
        return;
    }
    for &child in &node.children {
        flatten(tree, child, depth + 1, result);
    }
}

impl TmTree {
    /// Get a flat list of all visible units below (and including) the root.
    #[must_use]
    pub fn visible_nodes(&self) -> Vec<Flattened> {
        let mut result = Vec::new();
        if let Some(root) = self.root() {
            flatten(self, root, 0, &mut result);
        }
        result
    }
}

#[cfg(test)]
fn flatten_works(tree: &TmTree, expected: &[&str]) {
    let actual = tree
        .visible_nodes()
        .into_iter()
        .map(|flattened| tree[flattened.id].name().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(actual, expected);
}

#[cfg(test)]
fn open(tree: &mut TmTree, names: &[&str]) {
    for name in names {
        let id = tree.find(name);
        tree.nodes[id.0].expanded = true;
    }
}

#[test]
fn depth_works() {
    let mut tree = TmTree::example();
    open(&mut tree, &["root", "b", "d"]);
    let depths = tree
        .visible_nodes()
        .into_iter()
        .map(|flattened| flattened.depth)
        .collect::<Vec<_>>();
    assert_eq!(depths, [1, 2, 3, 3, 2, 1]);
}

#[test]
fn flatten_nothing_open_is_root() {
    let tree = TmTree::example();
    flatten_works(&tree, &["root"]);
}

#[test]
fn flatten_root_open_is_top_level() {
    let mut tree = TmTree::example();
    open(&mut tree, &["root"]);
    flatten_works(&tree, &["a", "b", "h"]);
}

#[test]
fn flatten_one_is_open() {
    let mut tree = TmTree::example();
    open(&mut tree, &["root", "b"]);
    flatten_works(&tree, &["a", "c", "d", "g", "h"]);
}

#[test]
fn flatten_all_open() {
    let mut tree = TmTree::example();
    open(&mut tree, &["root", "b", "d"]);
    flatten_works(&tree, &["a", "c", "e", "f", "g", "h"]);
}

#[test]
fn flatten_without_root_is_empty() {
    assert!(TmTree::new().visible_nodes().is_empty());
}
