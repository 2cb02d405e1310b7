use crate::{NodeId, TmTree};

/// Expanded / collapsed state of the nodes.
///
/// A node which is expanded shows its children instead of itself.
/// Only nodes with children can be expanded.
impl TmTree {
    /// Expand a node.
    ///
    /// Its ancestors are not touched, so it only becomes visible once they are expanded too.
    /// See [`expand_path`](Self::expand_path).
    ///
    /// Returns `true` if the node was collapsed and has been expanded.
    /// Returns `false` if the node was already expanded, has no children or is unknown.
    pub fn expand(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return false;
        };
        if node.children.is_empty() || node.expanded {
            return false;
        }
        node.expanded = true;
        true
    }

    /// Expand every ancestor of `id` from the root down and `id` itself.
    ///
    /// Afterwards the children of `id` are visible.
    ///
    /// Returns `true` when any node was expanded.
    pub fn expand_path(&mut self, id: NodeId) -> bool {
        let mut changed = false;
        for ancestor in self.ancestors(id).into_iter().rev() {
            changed |= self.expand(ancestor);
        }
        changed |= self.expand(id);
        changed
    }

    /// Expand `id` and all of its descendants which have children.
    pub fn expand_all(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            self.expand(id);
            if let Some(node) = self.nodes.get(id.0) {
                stack.extend_from_slice(&node.children);
            }
        }
    }

    /// Collapse a node.
    ///
    /// Its descendants get collapsed too.
    /// The parent is no longer expanded and every expanded sibling gets collapsed as well,
    /// so the parent is shown as a single rectangle again.
    ///
    /// Does nothing for unknown nodes.
    pub fn collapse(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let parent = node.parent;
        self.collapse_subtree(id);

        let Some(parent) = parent else {
            return;
        };
        self.nodes[parent.0].expanded = false;
        let siblings = self.nodes[parent.0].children.clone();
        for sibling in siblings {
            if self.nodes[sibling.0].expanded {
                self.collapse_subtree(sibling);
            }
        }
    }

    /// Clear the expanded flag of `id` and all of its descendants.
    fn collapse_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id.0];
            node.expanded = false;
            stack.extend_from_slice(&node.children);
        }
    }

    /// Collapse `id` and every ancestor up to the root.
    ///
    /// Afterwards the whole tree is collapsed and only the root is visible.
    pub fn collapse_all(&mut self, id: NodeId) {
        if self.get(id).is_none() {
            return;
        }
        log::debug!("collapse all from {id:?}");
        let top = self.ancestors(id).last().copied().unwrap_or(id);
        self.collapse_subtree(top);
    }

    /// Collapse the node when expanded, expand it otherwise.
    ///
    /// Returns `true` when the node was expanded or collapsed.
    /// This only returns `false` for nodes without children or unknown nodes.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if self.get(id).is_some_and(|node| node.expanded) {
            self.collapse(id);
            true
        } else {
            self.expand(id)
        }
    }
}

#[cfg(test)]
fn expanded(tree: &TmTree) -> Vec<&str> {
    let mut names = tree
        .nodes
        .iter()
        .filter(|node| node.expanded)
        .filter_map(|node| node.name())
        .collect::<Vec<_>>();
    names.sort_unstable();
    names
}

#[test]
fn expand_sets_only_the_node() {
    let mut tree = TmTree::example();
    assert!(tree.expand(tree.find("b")));
    assert_eq!(expanded(&tree), ["b"]);
    assert!(!tree.expand(tree.find("b")));
}

#[test]
fn expand_leaf_does_nothing() {
    let mut tree = TmTree::example();
    assert!(!tree.expand(tree.find("a")));
    assert!(!tree[tree.find("a")].is_expanded());
}

#[test]
fn expand_path_expands_ancestors() {
    let mut tree = TmTree::example();
    assert!(tree.expand_path(tree.find("d")));
    assert_eq!(expanded(&tree), ["b", "d", "root"]);
    tree.check_invariants().unwrap();
}

#[test]
fn expand_all_skips_leaves() {
    let mut tree = TmTree::example();
    tree.expand_all(tree.find("root"));
    assert_eq!(expanded(&tree), ["b", "d", "root"]);
    tree.check_invariants().unwrap();
}

#[test]
fn collapse_deep_leaf_collapses_parent_and_siblings() {
    let mut tree = TmTree::example();
    tree.expand_all(tree.find("root"));
    tree.collapse(tree.find("e"));
    assert!(!tree[tree.find("d")].is_expanded());
    for name in ["c", "d", "f", "g"] {
        assert!(!tree[tree.find(name)].is_expanded(), "{name}");
    }
    assert_eq!(expanded(&tree), ["b", "root"]);
    tree.check_invariants().unwrap();
}

#[test]
fn collapse_node_collapses_expanded_siblings() {
    let mut tree = TmTree::new();
    let a = tree.insert_leaf("a", 1);
    let b = tree.insert_leaf("b", 1);
    let left = tree.insert("left", vec![a]).unwrap();
    let right = tree.insert("right", vec![b]).unwrap();
    let root = tree.insert("root", vec![left, right]).unwrap();
    tree.expand_all(root);
    tree.collapse(left);
    assert!(!tree[left].is_expanded());
    assert!(!tree[right].is_expanded());
    assert!(!tree[root].is_expanded());
    tree.check_invariants().unwrap();
}

#[test]
fn collapse_root_collapses_descendants() {
    let mut tree = TmTree::example();
    tree.expand_all(tree.find("root"));
    tree.collapse(tree.find("root"));
    assert!(expanded(&tree).is_empty());
}

#[test]
fn collapse_all_from_leaf_collapses_everything() {
    let mut tree = TmTree::example();
    tree.expand_all(tree.find("root"));
    tree.collapse_all(tree.find("f"));
    assert!(expanded(&tree).is_empty());
    assert_eq!(tree.visible_nodes().len(), 1);
    tree.check_invariants().unwrap();
}

#[test]
fn toggle_switches() {
    let mut tree = TmTree::example();
    let root = tree.find("root");
    assert!(tree.toggle(root));
    assert!(tree[root].is_expanded());
    assert!(tree.toggle(root));
    assert!(!tree[root].is_expanded());
    assert!(!tree.toggle(tree.find("a")));
}

#[test]
fn collapse_wide_node_clears_every_child() {
    let mut tree = TmTree::new();
    let mut folders = Vec::new();
    for index in 0..10_000 {
        let leaf = tree.insert_leaf(format!("file-{index}"), 1);
        folders.push(tree.insert(format!("folder-{index}"), vec![leaf]).unwrap());
    }
    let root = tree.insert("root", folders.clone()).unwrap();
    tree.expand_all(root);
    tree.collapse(folders[0]);
    assert!(expanded(&tree).is_empty());
    tree.check_invariants().unwrap();
}

#[test]
fn unknown_nodes_are_ignored() {
    let mut tree = TmTree::example();
    let unknown = NodeId(1_000);
    assert!(!tree.expand(unknown));
    assert!(!tree.expand_path(unknown));
    assert!(!tree.toggle(unknown));
    tree.expand_all(unknown);
    tree.collapse(unknown);
    tree.collapse_all(unknown);
    assert!(expanded(&tree).is_empty());
}
