#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]

/*!
Treemap built to show sized Tree Data structures like a file system.

A [`TmTree`] holds the nodes, their sizes and which of them are expanded.
It lays its nodes out as nested rectangles whose areas are proportional to their sizes.
The [`Treemap`] widget renders the visible rectangles of a [`TmTree`].
*/

use std::borrow::Cow;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, StatefulWidget, Widget};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

mod colour;
mod error;
pub mod file_system;
mod flatten;
mod layout;
mod mutation;
mod node;
mod path_format;
mod tm_tree;
mod tree_state;

pub use crate::colour::{ColourSource, FixedColour, RandomColour};
pub use crate::error::Error;
pub use crate::flatten::Flattened;
pub use crate::node::{Node, NodeId};
pub use crate::path_format::{PathFormat, SimpleFormat};
pub use crate::tm_tree::TmTree;

/// A `Treemap` which can be rendered.
///
/// Every visible node of the [`TmTree`] is filled with its colour and labelled with its name.
/// Rendering lays the tree out into the area, so [`TmTree::hit_test`] matches what was drawn last.
///
/// # Example
///
/// ```
/// # use tui_treemap::{TmTree, Treemap};
/// # use ratatui::backend::TestBackend;
/// # use ratatui::Terminal;
/// # use ratatui::widgets::Block;
/// # let mut terminal = Terminal::new(TestBackend::new(32, 32)).unwrap();
/// let mut tree = TmTree::new();
/// let leaf = tree.insert_leaf("leaf", 1);
/// tree.insert("root", vec![leaf])?;
///
/// terminal.draw(|frame| {
///     let area = frame.size();
///
///     let widget = Treemap::new().block(Block::bordered().title("Treemap"));
///
///     frame.render_stateful_widget(widget, area, &mut tree);
/// })?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Treemap<'a> {
    block: Option<Block<'a>>,
    /// Style used as a base style for the widget
    style: Style,

    /// Style used to render the highlighted node
    highlight_style: Style,
    highlight: Option<NodeId>,

    /// Write the names of the nodes into their rectangles
    labels: bool,
}

impl<'a> Treemap<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            block: None,
            style: Style::new(),
            highlight_style: Style::new(),
            highlight: None,
            labels: true,
        }
    }

    #[allow(clippy::missing_const_for_fn)]
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    #[must_use]
    pub const fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub const fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }

    /// Highlight the given node when it is visible.
    #[must_use]
    pub const fn highlight(mut self, id: Option<NodeId>) -> Self {
        self.highlight = id;
        self
    }

    #[must_use]
    pub const fn labels(mut self, labels: bool) -> Self {
        self.labels = labels;
        self
    }
}

impl Default for Treemap<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Black or white, whatever is readable on `background`.
fn label_colour(background: Color) -> Color {
    if let Color::Rgb(r, g, b) = background {
        let luma = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
        if luma < 128_000 {
            return Color::White;
        }
    }
    Color::Black
}

/// Shorten `name` to fit into `max_width` columns, marking the cut with an ellipsis.
fn label(name: &str, max_width: usize) -> Cow<'_, str> {
    if name.width() <= max_width {
        return Cow::Borrowed(name);
    }
    let mut result = String::new();
    let mut width = 0;
    for character in name.chars() {
        let character_width = character.width().unwrap_or(0);
        if width + character_width + 1 > max_width {
            break;
        }
        width += character_width;
        result.push(character);
    }
    if max_width > 0 {
        result.push('…');
    }
    Cow::Owned(result)
}

impl StatefulWidget for Treemap<'_> {
    type State = TmTree;

    fn render(self, full_area: Rect, buf: &mut Buffer, tree: &mut Self::State) {
        buf.set_style(full_area, self.style);

        // Get the inner area inside a possible block, otherwise use the full area
        let area = self.block.map_or(full_area, |block| {
            let inner_area = block.inner(full_area);
            block.render(full_area, buf);
            inner_area
        });

        if area.width < 1 || area.height < 1 {
            return;
        }

        tree.compute_layout(area);

        for flattened in tree.visible_nodes() {
            let node = &tree[flattened.id];
            let rect = node.rect().intersection(area);
            if rect.width == 0 || rect.height == 0 {
                continue;
            }

            let colour = node.colour();
            let style = self.style.bg(colour).fg(label_colour(colour));
            buf.set_style(rect, style);

            if self.labels {
                if let Some(name) = node.name() {
                    let max_width = rect.width as usize;
                    buf.set_stringn(rect.x, rect.y, label(name, max_width), max_width, style);
                }
            }

            if self.highlight == Some(flattened.id) {
                buf.set_style(rect, self.highlight_style);
            }
        }
    }
}

#[cfg(test)]
fn render(widget: Treemap, tree: &mut TmTree, area: Rect) -> Buffer {
    let mut buffer = Buffer::empty(area);
    widget.render(area, &mut buffer, tree);
    buffer
}

#[cfg(test)]
fn coloured_pair() -> (TmTree, NodeId, NodeId) {
    let mut colours = [
        Color::Rgb(255, 0, 0),
        Color::Rgb(0, 0, 255),
        Color::Rgb(0, 255, 0),
    ]
    .into_iter();
    let mut tree = TmTree::new().with_colours(move || colours.next().unwrap_or(Color::Reset));
    let left = tree.insert_leaf("left", 1);
    let right = tree.insert_leaf("right", 1);
    tree.insert("root", vec![left, right]).unwrap();
    (tree, left, right)
}

#[test]
fn renders_collapsed_root_only() {
    let (mut tree, _, _) = coloured_pair();
    let buffer = render(Treemap::new(), &mut tree, Rect::new(0, 0, 10, 4));
    assert_eq!(buffer.get(0, 0).bg, Color::Rgb(0, 255, 0));
    assert_eq!(buffer.get(9, 3).bg, Color::Rgb(0, 255, 0));
    assert_eq!(buffer.get(0, 0).symbol(), "r");
}

#[test]
fn renders_expanded_children_in_their_colours() {
    let (mut tree, left, right) = coloured_pair();
    tree.expand(tree.root().unwrap());
    let buffer = render(
        Treemap::new().labels(false),
        &mut tree,
        Rect::new(0, 0, 10, 4),
    );
    assert_eq!(buffer.get(0, 0).bg, Color::Rgb(255, 0, 0));
    assert_eq!(buffer.get(4, 3).bg, Color::Rgb(255, 0, 0));
    assert_eq!(buffer.get(5, 0).bg, Color::Rgb(0, 0, 255));
    assert_eq!(buffer.get(0, 0).symbol(), " ");
    assert_eq!(tree[left].rect(), Rect::new(0, 0, 5, 4));
    assert_eq!(tree[right].rect(), Rect::new(5, 0, 5, 4));
}

#[test]
fn renders_inside_block() {
    let (mut tree, _, _) = coloured_pair();
    let area = Rect::new(0, 0, 10, 5);
    let buffer = render(Treemap::new().block(Block::bordered()), &mut tree, area);
    assert_eq!(tree[tree.root().unwrap()].rect(), Rect::new(1, 1, 8, 3));
    assert_ne!(buffer.get(0, 0).bg, Color::Rgb(0, 255, 0));
    assert_eq!(buffer.get(1, 1).bg, Color::Rgb(0, 255, 0));
}

#[test]
fn highlight_is_applied() {
    let (mut tree, left, _) = coloured_pair();
    tree.expand(tree.root().unwrap());
    let widget = Treemap::new()
        .highlight(Some(left))
        .highlight_style(Style::new().bg(Color::Yellow));
    let buffer = render(widget, &mut tree, Rect::new(0, 0, 10, 4));
    assert_eq!(buffer.get(0, 0).bg, Color::Yellow);
    assert_eq!(buffer.get(5, 0).bg, Color::Rgb(0, 0, 255));
}

#[test]
fn label_is_shortened() {
    assert_eq!(label("folder", 10), "folder");
    assert_eq!(label("folder", 6), "folder");
    assert_eq!(label("folder", 4), "fol…");
    assert_eq!(label("folder", 1), "…");
    assert_eq!(label("folder", 0), "");
}

#[test]
fn label_colour_is_readable() {
    assert_eq!(label_colour(Color::Rgb(0, 0, 0)), Color::White);
    assert_eq!(label_colour(Color::Rgb(255, 255, 255)), Color::Black);
    assert_eq!(label_colour(Color::Reset), Color::Black);
}
