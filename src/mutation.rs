use crate::{NodeId, TmTree};

impl TmTree {
    /// Move the leaf `id` to be the last child of `destination`.
    ///
    /// Does nothing if `id` has children, is the root or `destination` has no children.
    /// Unknown nodes are ignored as well.
    ///
    /// When the old parent is left without children it is removed from its own parent.
    /// Sizes are not updated, call [`update_data_sizes`](Self::update_data_sizes) afterwards.
    ///
    /// Returns `true` when the leaf was moved.
    pub fn move_to(&mut self, id: NodeId, destination: NodeId) -> bool {
        let (Some(node), Some(target)) = (self.get(id), self.get(destination)) else {
            return false;
        };
        let Some(parent) = node.parent else {
            return false;
        };
        if !node.children.is_empty() || target.children.is_empty() {
            return false;
        }
        log::debug!("move {id:?} from {parent:?} to {destination:?}");

        self.nodes[parent.0].children.retain(|&child| child != id);
        if parent != destination && self.nodes[parent.0].children.is_empty() {
            self.nodes[parent.0].expanded = false;
            if let Some(grandparent) = self.nodes[parent.0].parent.take() {
                log::debug!("prune {parent:?} from {grandparent:?} as it has no children left");
                self.nodes[grandparent.0]
                    .children
                    .retain(|&child| child != parent);
                if self.nodes[grandparent.0].children.is_empty() {
                    self.nodes[grandparent.0].expanded = false;
                }
            }
        }

        self.nodes[id.0].parent = Some(destination);
        self.nodes[destination.0].children.push(id);
        true
    }

    /// Change the size of the leaf `id` by `factor` relative to its current size.
    ///
    /// The amount of change is always rounded up so some change is made:
    /// `0.01` grows a leaf of size 100 to 101 and a leaf of size 0 to 1.
    /// Shrinking is skipped when the leaf would end up smaller than 1.
    ///
    /// Does nothing for unknown nodes, nodes with children, a zero `factor` or one which is not finite.
    /// Sizes of ancestors are not updated, call [`update_data_sizes`](Self::update_data_sizes) afterwards.
    ///
    /// Returns `true` when the size changed.
    pub fn change_size(&mut self, id: NodeId, factor: f64) -> bool {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return false;
        };
        if !node.children.is_empty() || factor == 0.0 || !factor.is_finite() {
            return false;
        }

        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_precision_loss,
            clippy::cast_sign_loss
        )]
        let amount = (node.data_size as f64 * factor.abs()).ceil() as u64;

        let before = node.data_size;
        if factor > 0.0 {
            node.data_size = node.data_size.saturating_add(amount.max(1));
        } else {
            match node.data_size.checked_sub(amount) {
                Some(size) if size >= 1 => node.data_size = size,
                _ => return false,
            }
        }
        log::debug!("size of {id:?} changed from {before} to {}", node.data_size);
        before != node.data_size
    }

    /// Recompute the size of `id` and its descendants from their leaves and return it.
    ///
    /// Leaves keep their size. Unknown nodes have a size of 0.
    pub fn update_data_sizes(&mut self, id: NodeId) -> u64 {
        let Some(node) = self.get(id) else {
            return 0;
        };
        if node.children.is_empty() {
            return node.data_size;
        }
        let children = node.children.clone();
        let data_size: u64 = children
            .into_iter()
            .map(|child| self.update_data_sizes(child))
            .sum();
        self.nodes[id.0].data_size = data_size;
        data_size
    }
}

#[cfg(test)]
fn two_parents() -> (TmTree, [NodeId; 6]) {
    let mut tree = TmTree::new();
    let ten = tree.insert_leaf("ten", 10);
    let twenty = tree.insert_leaf("twenty", 20);
    let five = tree.insert_leaf("five", 5);
    let a = tree.insert("a", vec![ten, twenty]).unwrap();
    let b = tree.insert("b", vec![five]).unwrap();
    let root = tree.insert("root", vec![a, b]).unwrap();
    (tree, [root, a, b, ten, twenty, five])
}

#[test]
fn move_then_update_sizes() {
    let (mut tree, [root, a, b, ten, ..]) = two_parents();
    assert!(tree.move_to(ten, b));
    assert_eq!(tree[ten].parent(), Some(b));
    assert_eq!(tree[b].children().last(), Some(&ten));
    assert_eq!(tree.update_data_sizes(root), 35);
    assert_eq!(tree[a].data_size(), 20);
    assert_eq!(tree[b].data_size(), 15);
    tree.check_invariants().unwrap();
}

#[test]
fn move_does_not_update_sizes() {
    let (mut tree, [_, a, b, ten, ..]) = two_parents();
    tree.move_to(ten, b);
    assert_eq!(tree[a].data_size(), 30);
    assert_eq!(tree[b].data_size(), 5);
    assert!(tree.check_invariants().is_err());
}

#[test]
fn move_prunes_empty_parent() {
    let (mut tree, [root, a, b, _, _, five]) = two_parents();
    assert!(tree.move_to(five, a));
    assert_eq!(tree[root].children(), [a]);
    assert_eq!(tree[b].parent(), None);
    assert!(tree[b].is_leaf());
    assert_eq!(tree.root(), Some(root));
    tree.update_data_sizes(root);
    assert_eq!(tree[root].data_size(), 35);
    tree.check_invariants().unwrap();
}

#[test]
fn move_within_parent_reorders() {
    let (mut tree, [_, a, _, ten, twenty, _]) = two_parents();
    assert!(tree.move_to(ten, a));
    assert_eq!(tree[a].children(), [twenty, ten]);
}

#[test]
fn move_only_child_to_own_parent_keeps_it() {
    let (mut tree, [root, a, b, _, _, five]) = two_parents();
    assert!(tree.move_to(five, b));
    assert_eq!(tree[root].children(), [a, b]);
    assert_eq!(tree[b].children(), [five]);
}

#[test]
fn move_is_noop_for_invalid_gestures() {
    let (mut tree, [root, a, b, ten, twenty, _]) = two_parents();
    // source has children
    assert!(!tree.move_to(a, b));
    // destination is a leaf
    assert!(!tree.move_to(ten, twenty));
    // the root can not be moved
    assert!(!tree.move_to(root, a));
    assert_eq!(tree[a].children(), [ten, twenty]);
    tree.check_invariants().unwrap();
}

#[test]
fn change_size_grows_by_at_least_one() {
    let mut tree = TmTree::new();
    let hundred = tree.insert_leaf("hundred", 100);
    let zero = tree.insert_leaf("zero", 0);
    let big = tree.insert_leaf("big", 1000);
    assert!(tree.change_size(hundred, 0.01));
    assert_eq!(tree[hundred].data_size(), 101);
    assert!(tree.change_size(zero, 0.01));
    assert_eq!(tree[zero].data_size(), 1);
    assert!(tree.change_size(big, 0.25));
    assert_eq!(tree[big].data_size(), 1250);
}

#[test]
fn change_size_never_drops_below_one() {
    let mut tree = TmTree::new();
    let one = tree.insert_leaf("one", 1);
    let hundred = tree.insert_leaf("hundred", 100);
    let small = tree.insert_leaf("small", 2);
    assert!(!tree.change_size(one, -0.01));
    assert_eq!(tree[one].data_size(), 1);
    assert!(tree.change_size(hundred, -0.01));
    assert_eq!(tree[hundred].data_size(), 99);
    // 2 - ceil(1.2) would be 0
    assert!(!tree.change_size(small, -0.6));
    assert_eq!(tree[small].data_size(), 2);
}

#[test]
fn change_size_ignores_internal_nodes_and_odd_factors() {
    let (mut tree, [root, a, _, ten, ..]) = two_parents();
    assert!(!tree.change_size(a, 0.01));
    assert_eq!(tree[a].data_size(), 30);
    assert!(!tree.change_size(ten, 0.0));
    assert!(!tree.change_size(ten, f64::NAN));
    assert!(!tree.change_size(ten, f64::INFINITY));
    assert_eq!(tree[ten].data_size(), 10);
    assert_eq!(tree[root].data_size(), 35);
}

#[test]
fn change_size_then_update_sizes() {
    let (mut tree, [root, a, _, ten, ..]) = two_parents();
    tree.change_size(ten, 0.5);
    assert_eq!(tree.update_data_sizes(root), 40);
    assert_eq!(tree[a].data_size(), 35);
    tree.check_invariants().unwrap();
}

#[test]
fn update_data_sizes_of_leaf_is_unchanged() {
    let (mut tree, [.., twenty, _]) = two_parents();
    assert_eq!(tree.update_data_sizes(twenty), 20);
}

#[test]
fn move_into_detached_tree_leaves_root_childless() {
    let mut tree = TmTree::new();
    let y = tree.insert_leaf("y", 1);
    let other = tree.insert("other", vec![y]).unwrap();
    let x = tree.insert_leaf("x", 2);
    let root = tree.insert("root", vec![x]).unwrap();
    tree.expand(root);
    assert!(tree.move_to(x, other));
    assert!(tree[root].children().is_empty());
    assert_eq!(tree[root].parent(), None);
    assert!(!tree[root].is_expanded());
    assert_eq!(tree.root(), Some(root));
    assert_eq!(tree[other].children(), [y, x]);
    assert_eq!(tree[x].parent(), Some(other));
}

#[test]
fn unknown_nodes_are_not_mutated() {
    let (mut tree, [root, a, _, ten, ..]) = two_parents();
    let unknown = NodeId(1_000);
    assert!(!tree.move_to(unknown, a));
    assert!(!tree.move_to(ten, unknown));
    assert!(!tree.change_size(unknown, 0.5));
    assert_eq!(tree.update_data_sizes(unknown), 0);
    assert_eq!(tree[a].children().first(), Some(&ten));
    assert_eq!(tree.update_data_sizes(root), 35);
    tree.check_invariants().unwrap();
}
