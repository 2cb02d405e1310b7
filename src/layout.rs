use ratatui::layout::Rect;
use ratatui::style::Color;

use crate::{NodeId, TmTree};

/// Portion of `extent` a child of `size` gets out of `total`, rounded down.
fn share(size: u64, total: u64, extent: u16) -> u16 {
    if total == 0 {
        return 0;
    }
    let share = u128::from(size) * u128::from(extent) / u128::from(total);
    u16::try_from(share).unwrap_or(extent)
}

/// Split `rect` along its longer side (rows when it is at least as high as wide).
///
/// Returns the part starting at `offset` with the given `length`.
const fn slice(rect: Rect, stacked: bool, offset: u16, length: u16) -> Rect {
    if stacked {
        Rect {
            x: rect.x,
            y: rect.y.saturating_add(offset),
            width: rect.width,
            height: length,
        }
    } else {
        Rect {
            x: rect.x.saturating_add(offset),
            y: rect.y,
            width: length,
            height: rect.height,
        }
    }
}

/// Right and bottom edges are inclusive, left and top are not checked at all.
fn contains(rect: Rect, (column, row): (u16, u16)) -> bool {
    u32::from(column) <= u32::from(rect.x) + u32::from(rect.width)
        && u32::from(row) <= u32::from(rect.y) + u32::from(rect.height)
}

impl TmTree {
    /// Lay out the whole tree from the root into `rect`.
    ///
    /// Every node gets a rectangle proportional to its size, including nodes which are not visible.
    pub fn compute_layout(&mut self, rect: Rect) {
        if let Some(root) = self.root() {
            log::trace!("layout of {} nodes into {rect:?}", self.nodes.len());
            self.compute_node_layout(root, rect);
        }
    }

    /// Lay out `id` and its descendants into `rect`.
    ///
    /// The children partition the longer side of `rect` in their order.
    /// Each gets its share rounded down, the last one gets what is left, so there are no gaps.
    /// Unknown nodes are ignored.
    pub fn compute_node_layout(&mut self, id: NodeId, rect: Rect) {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return;
        };
        node.rect = rect;
        let children = node.children.clone();
        let Some((&last, rest)) = children.split_last() else {
            return;
        };

        let total: u64 = children
            .iter()
            .map(|&child| self.nodes[child.0].data_size)
            .sum();
        if total != self.nodes[id.0].data_size {
            log::warn!(
                "size of {id:?} is {} while its children sum up to {total}, sizes need an update",
                self.nodes[id.0].data_size
            );
        }

        let stacked = rect.height >= rect.width;
        let extent = if stacked { rect.height } else { rect.width };
        let mut offset = 0;
        for &child in rest {
            let length = share(self.nodes[child.0].data_size, total, extent);
            self.compute_node_layout(child, slice(rect, stacked, offset, length));
            offset += length;
        }
        self.compute_node_layout(last, slice(rect, stacked, offset, extent - offset));
    }

    /// Rectangle and colour of every visible unit in the order to draw them.
    ///
    /// See [`visible_nodes`](Self::visible_nodes) for which nodes are visible.
    #[must_use]
    pub fn collect_visible_rects(&self) -> Vec<(Rect, Color)> {
        self.visible_nodes()
            .into_iter()
            .map(|flattened| {
                let node = &self[flattened.id];
                (node.rect, node.colour)
            })
            .collect()
    }

    /// Return the visible unit whose rectangle contains `position`.
    ///
    /// A position on the edge shared by two siblings belongs to the one closer to the origin.
    ///
    /// Only the right and bottom edges of a rectangle are checked.
    /// A position left of or above a rectangle is considered inside as long as it is not past those edges.
    #[must_use]
    pub fn hit_test(&self, position: (u16, u16)) -> Option<NodeId> {
        self.root()
            .and_then(|root| self.hit_test_node(root, position))
    }

    fn hit_test_node(&self, id: NodeId, position: (u16, u16)) -> Option<NodeId> {
        let node = &self[id];
        if !contains(node.rect, position) {
            return None;
        }
        if node.is_leaf() || !node.expanded {
            return Some(id);
        }
        node.children
            .iter()
            .find_map(|&child| self.hit_test_node(child, position))
    }
}

#[cfg(test)]
const fn rect(x: u16, y: u16, width: u16, height: u16) -> Rect {
    Rect {
        x,
        y,
        width,
        height,
    }
}

#[cfg(test)]
fn two_leaves(left: u64, right: u64) -> (TmTree, NodeId, NodeId, NodeId) {
    let mut tree = TmTree::new();
    let a = tree.insert_leaf("left", left);
    let b = tree.insert_leaf("right", right);
    let root = tree.insert("root", vec![a, b]).unwrap();
    (tree, root, a, b)
}

#[test]
fn wide_rect_is_split_side_by_side() {
    let (mut tree, root, a, b) = two_leaves(1, 3);
    tree.compute_layout(rect(0, 0, 100, 10));
    assert_eq!(tree[root].rect(), rect(0, 0, 100, 10));
    assert_eq!(tree[a].rect(), rect(0, 0, 25, 10));
    assert_eq!(tree[b].rect(), rect(25, 0, 75, 10));
}

#[test]
fn square_rect_is_stacked() {
    let (mut tree, _, a, b) = two_leaves(1, 1);
    tree.compute_layout(rect(0, 0, 100, 100));
    assert_eq!(tree[a].rect(), rect(0, 0, 100, 50));
    assert_eq!(tree[b].rect(), rect(0, 50, 100, 50));
}

#[test]
fn last_child_gets_the_remainder() {
    let mut tree = TmTree::new();
    let children = (0..3)
        .map(|index| tree.insert_leaf(index.to_string(), 1))
        .collect::<Vec<_>>();
    tree.insert("root", children.clone()).unwrap();
    tree.compute_layout(rect(5, 5, 10, 1));
    let widths = children
        .iter()
        .map(|&child| tree[child].rect().width)
        .collect::<Vec<_>>();
    assert_eq!(widths, [3, 3, 4]);
    assert_eq!(tree[children[2]].rect().x, 11);
}

#[test]
fn zero_sized_tree_gives_everything_to_the_last() {
    let (mut tree, _, a, b) = two_leaves(0, 0);
    tree.compute_layout(rect(0, 0, 40, 20));
    assert_eq!(tree[a].rect(), rect(0, 0, 0, 20));
    assert_eq!(tree[b].rect(), rect(0, 0, 40, 20));
}

#[test]
fn nested_layout_alternates_by_shape() {
    let mut tree = TmTree::example();
    tree.compute_layout(rect(0, 0, 65, 20));
    // root is wide: split into columns of 5, 30 and 30
    assert_eq!(tree[tree.find("a")].rect(), rect(0, 0, 5, 20));
    assert_eq!(tree[tree.find("b")].rect(), rect(5, 0, 30, 20));
    assert_eq!(tree[tree.find("h")].rect(), rect(35, 0, 30, 20));
    // b is wide as well: 10, 15 and 5 of 30
    assert_eq!(tree[tree.find("d")].rect(), rect(15, 0, 15, 20));
    // d is high: rows of 5 and 10 out of 15 with a height of 20
    assert_eq!(tree[tree.find("e")].rect(), rect(15, 0, 15, 6));
    assert_eq!(tree[tree.find("f")].rect(), rect(15, 6, 15, 14));
}

#[test]
fn collapsed_tree_shows_only_root() {
    let mut tree = TmTree::example();
    tree.compute_layout(rect(0, 0, 80, 24));
    let rects = tree.collect_visible_rects();
    assert_eq!(rects.len(), 1);
    assert_eq!(rects[0].0, rect(0, 0, 80, 24));
}

#[test]
fn visible_rects_follow_child_order() {
    let mut tree = TmTree::example();
    let root = tree.find("root");
    let b = tree.find("b");
    tree.expand(root);
    tree.expand(b);
    tree.compute_layout(rect(0, 0, 65, 20));
    let rects = tree.collect_visible_rects();
    let expected = ["a", "c", "d", "g", "h"]
        .map(|name| tree[tree.find(name)].rect())
        .to_vec();
    assert_eq!(rects.iter().map(|(rect, _)| *rect).collect::<Vec<_>>(), expected);
}

#[test]
fn hit_test_with_shared_edge() {
    let (mut tree, root, a, b) = two_leaves(1, 1);
    tree.expand(root);
    tree.compute_layout(rect(0, 0, 100, 99));
    assert_eq!(tree[a].rect(), rect(0, 0, 50, 99));
    assert_eq!(tree.hit_test((49, 10)), Some(a));
    // The shared edge belongs to the rectangle closer to the origin
    assert_eq!(tree.hit_test((50, 10)), Some(a));
    assert_eq!(tree.hit_test((51, 10)), Some(b));
    assert_eq!(tree.hit_test((100, 99)), Some(b));
    assert_eq!(tree.hit_test((101, 10)), None);
    assert_eq!(tree.hit_test((10, 100)), None);
}

#[test]
fn hit_test_does_not_check_left_and_top() {
    let (mut tree, root, a, _) = two_leaves(1, 1);
    tree.expand(root);
    tree.compute_layout(rect(10, 10, 100, 50));
    // Left of and above the whole layout still matches the first rectangle
    assert_eq!(tree.hit_test((0, 0)), Some(a));
}

#[test]
fn hit_test_stops_at_collapsed_nodes() {
    let mut tree = TmTree::example();
    let root = tree.find("root");
    tree.expand(root);
    tree.compute_layout(rect(0, 0, 65, 20));
    assert_eq!(tree.hit_test((20, 5)), Some(tree.find("b")));
    tree.expand(tree.find("b"));
    assert_eq!(tree.hit_test((20, 5)), Some(tree.find("d")));
}

#[test]
fn hit_test_on_collapsed_root() {
    let mut tree = TmTree::example();
    tree.compute_layout(rect(0, 0, 65, 20));
    assert_eq!(tree.hit_test((3, 3)), tree.root());
    assert_eq!(TmTree::new().hit_test((0, 0)), None);
}

#[test]
fn layout_of_unknown_node_is_ignored() {
    let (mut tree, root, a, _) = two_leaves(1, 1);
    tree.compute_layout(rect(0, 0, 10, 10));
    tree.compute_node_layout(NodeId(1_000), rect(0, 0, 4, 4));
    assert_eq!(tree[root].rect(), rect(0, 0, 10, 10));
    assert_eq!(tree[a].rect(), rect(0, 0, 10, 5));
}

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::*;

    /// Groups of leaf sizes, every group becomes one internal node below the root.
    fn tree_from(groups: &[Vec<u64>]) -> TmTree {
        let mut tree = TmTree::new();
        let mut inner = Vec::new();
        for (index, sizes) in groups.iter().enumerate() {
            let leaves = sizes
                .iter()
                .enumerate()
                .map(|(leaf, &size)| tree.insert_leaf(format!("{index}-{leaf}"), size))
                .collect();
            inner.push(tree.insert(index.to_string(), leaves).unwrap());
        }
        tree.insert("root", inner).unwrap();
        tree
    }

    fn groups() -> impl Strategy<Value = Vec<Vec<u64>>> {
        prop::collection::vec(prop::collection::vec(0_u64..1_000, 1..6), 1..6)
    }

    proptest! {
        #[test]
        fn children_tile_their_parent(groups in groups(), width in 0_u16..300, height in 0_u16..300) {
            let mut tree = tree_from(&groups);
            tree.compute_layout(rect(3, 7, width, height));
            for node in &tree.nodes {
                let Some((first, _)) = node.children.split_first() else {
                    continue;
                };
                let parent = node.rect;
                let stacked = parent.height >= parent.width;
                let mut expected_start = if stacked { parent.y } else { parent.x };
                prop_assert_eq!(tree[*first].rect().x, parent.x);
                prop_assert_eq!(tree[*first].rect().y, parent.y);
                for &child in &node.children {
                    let child = tree[child].rect();
                    if stacked {
                        prop_assert_eq!(child.y, expected_start);
                        prop_assert_eq!(child.width, parent.width);
                        expected_start += child.height;
                    } else {
                        prop_assert_eq!(child.x, expected_start);
                        prop_assert_eq!(child.height, parent.height);
                        expected_start += child.width;
                    }
                }
                let end = if stacked { parent.y + parent.height } else { parent.x + parent.width };
                prop_assert_eq!(expected_start, end);
            }
        }

        #[test]
        fn layout_is_idempotent(groups in groups(), width in 0_u16..300, height in 0_u16..300) {
            let mut tree = tree_from(&groups);
            let area = rect(0, 0, width, height);
            tree.compute_layout(area);
            let first = tree.nodes.iter().map(|node| node.rect).collect::<Vec<_>>();
            tree.compute_layout(area);
            let second = tree.nodes.iter().map(|node| node.rect).collect::<Vec<_>>();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn built_trees_hold_invariants(groups in groups()) {
            let tree = tree_from(&groups);
            prop_assert!(tree.check_invariants().is_ok());
            let total: u64 = groups.iter().flatten().sum();
            prop_assert_eq!(tree[tree.root().unwrap()].data_size(), total);
        }
    }
}
