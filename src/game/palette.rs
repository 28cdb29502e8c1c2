//! Color Palette
//!
//! The ordered set of selectable colors. Only the difficulty adapter
//! replaces the palette; everything else treats it as read-only.

use serde::{Serialize, Deserialize};

/// A selectable color identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// Base set, slot 0.
    Red = 0,
    /// Base set, slot 1.
    Yellow = 1,
    /// Base set, slot 2.
    Green = 2,
    /// Base set, slot 3.
    Blue = 3,
    /// Expanded set only.
    Purple = 4,
    /// Expanded set only.
    Orange = 5,
}

/// Base palette: the 4 colors every session starts with.
pub const BASE_COLORS: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];

/// Expanded palette: base set grown by two entries for higher difficulty.
pub const EXPANDED_COLORS: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Purple,
    Color::Orange,
];

/// The ordered sequence of selectable colors.
///
/// Invariant: non-empty, entries distinct.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// The base 4-color palette.
    pub fn base() -> Self {
        Self {
            colors: BASE_COLORS.to_vec(),
        }
    }

    /// The expanded 6-color palette.
    pub fn expanded() -> Self {
        Self {
            colors: EXPANDED_COLORS.to_vec(),
        }
    }

    /// Number of colors.
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Palettes are never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Color at `index`, if in bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    /// Whether the palette contains `color`.
    #[inline]
    pub fn contains(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    /// Largest valid selector index.
    #[inline]
    pub fn max_index(&self) -> usize {
        self.colors.len() - 1
    }

    /// The colors in order.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::base()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_palette() {
        let p = Palette::base();
        assert_eq!(p.len(), 4);
        assert_eq!(p.get(0), Some(Color::Red));
        assert_eq!(p.get(3), Some(Color::Blue));
        assert_eq!(p.get(4), None);
        assert_eq!(p.max_index(), 3);
    }

    #[test]
    fn test_expanded_palette() {
        let p = Palette::expanded();
        assert_eq!(p.len(), 6);
        assert!(p.contains(Color::Purple));
        assert!(p.contains(Color::Orange));
        assert_eq!(p.max_index(), 5);
    }

    #[test]
    fn test_expanded_extends_base() {
        // The expanded set keeps base colors in their slots, so a shrink
        // back to base never reorders what the player sees.
        let base = Palette::base();
        let expanded = Palette::expanded();
        for i in 0..base.len() {
            assert_eq!(base.get(i), expanded.get(i));
        }
    }

    #[test]
    fn test_entries_distinct() {
        let p = Palette::expanded();
        for i in 0..p.len() {
            for j in (i + 1)..p.len() {
                assert_ne!(p.get(i), p.get(j));
            }
        }
    }

}
