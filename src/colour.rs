use ratatui::style::Color;

/// Supplies the colour of each node while it is inserted into a [`TmTree`](crate::TmTree).
///
/// The default is [`RandomColour`].
/// Tests and reproducible renders can inject their own source with [`TmTree::with_colours`](crate::TmTree::with_colours).
pub trait ColourSource {
    /// Colour for the next inserted node.
    fn next_colour(&mut self) -> Color;
}

/// Uniformly random colours over the full 24-bit space.
#[derive(Debug, Clone)]
pub struct RandomColour(fastrand::Rng);

impl RandomColour {
    #[must_use]
    pub fn new() -> Self {
        Self(fastrand::Rng::new())
    }

    /// Same seed, same colours.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self(fastrand::Rng::with_seed(seed))
    }
}

impl Default for RandomColour {
    fn default() -> Self {
        Self::new()
    }
}

impl ColourSource for RandomColour {
    fn next_colour(&mut self) -> Color {
        Color::Rgb(self.0.u8(..), self.0.u8(..), self.0.u8(..))
    }
}

/// Every node gets the same colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedColour(pub Color);

impl ColourSource for FixedColour {
    fn next_colour(&mut self) -> Color {
        self.0
    }
}

impl<F> ColourSource for F
where
    F: FnMut() -> Color,
{
    fn next_colour(&mut self) -> Color {
        self()
    }
}

#[test]
fn seeded_colours_repeat() {
    let mut a = RandomColour::with_seed(42);
    let mut b = RandomColour::with_seed(42);
    for _ in 0..8 {
        assert_eq!(a.next_colour(), b.next_colour());
    }
}

#[test]
fn random_colour_is_rgb() {
    let mut source = RandomColour::new();
    assert!(matches!(source.next_colour(), Color::Rgb(..)));
}

#[test]
fn closure_is_a_source() {
    let mut counter = 0_u8;
    let mut source = move || {
        counter += 1;
        Color::Rgb(counter, 0, 0)
    };
    assert_eq!(source.next_colour(), Color::Rgb(1, 0, 0));
    assert_eq!(source.next_colour(), Color::Rgb(2, 0, 0));
}
