//! Axis-Aligned Rectangles
//!
//! The only collision shape in the game. Origin is the top-left corner,
//! +y points down.

use serde::{Serialize, Deserialize};

use super::fixed::{units, Fixed};
use super::vec2::FixedVec2;

/// Axis-aligned rectangle in fixed-point world units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    #[serde(with = "units")]
    pub x: Fixed,
    #[serde(with = "units")]
    pub y: Fixed,
    #[serde(with = "units")]
    pub width: Fixed,
    #[serde(with = "units")]
    pub height: Fixed,
}

impl Rect {
    #[inline]
    pub const fn new(x: Fixed, y: Fixed, width: Fixed, height: Fixed) -> Self {
        Self { x, y, width, height }
    }

    /// Build from authored float units (load time only).
    #[inline]
    pub const fn from_units(x: f64, y: f64, width: f64, height: f64) -> Self {
        use super::fixed::to_fixed;
        Self::new(to_fixed(x), to_fixed(y), to_fixed(width), to_fixed(height))
    }

    /// Rectangle of a given size anchored at `origin`.
    #[inline]
    pub const fn at(origin: FixedVec2, width: Fixed, height: Fixed) -> Self {
        Self::new(origin.x, origin.y, width, height)
    }

    #[inline]
    pub const fn left(&self) -> Fixed {
        self.x
    }

    #[inline]
    pub const fn top(&self) -> Fixed {
        self.y
    }

    #[inline]
    pub const fn right(&self) -> Fixed {
        self.x + self.width
    }

    #[inline]
    pub const fn bottom(&self) -> Fixed {
        self.y + self.height
    }

    #[inline]
    pub const fn origin(&self) -> FixedVec2 {
        FixedVec2::new(self.x, self.y)
    }

    /// Strict overlap test. Touching edges do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Both dimensions strictly positive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Float tuple `(x, y, w, h)` for rendering.
    pub fn to_floats(&self) -> (f32, f32, f32, f32) {
        use super::fixed::to_float;
        (to_float(self.x), to_float(self.y), to_float(self.width), to_float(self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::from_units(0.0, 350.0, 300.0, 50.0);
        assert_eq!(r.left(), 0);
        assert_eq!(r.top(), Rect::from_units(0.0, 350.0, 1.0, 1.0).y);
        assert_eq!(r.right(), Rect::from_units(300.0, 0.0, 1.0, 1.0).x);
        assert_eq!(r.bottom(), Rect::from_units(0.0, 400.0, 1.0, 1.0).y);
    }

    #[test]
    fn test_rect_overlap() {
        let platform = Rect::from_units(0.0, 350.0, 300.0, 50.0);
        let player = Rect::from_units(100.0, 300.0, 40.0, 60.0);
        assert!(player.overlaps(&platform));
        assert!(platform.overlaps(&player));

        let above = Rect::from_units(100.0, 200.0, 40.0, 60.0);
        assert!(!above.overlaps(&platform));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let platform = Rect::from_units(0.0, 350.0, 300.0, 50.0);
        // Bottom exactly on the platform top
        let resting = Rect::from_units(100.0, 290.0, 40.0, 60.0);
        assert!(!resting.overlaps(&platform));

        // Left edge exactly on the platform's right edge
        let beside = Rect::from_units(300.0, 360.0, 40.0, 60.0);
        assert!(!beside.overlaps(&platform));
    }

    #[test]
    fn test_rect_validity() {
        assert!(Rect::from_units(0.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!Rect::from_units(0.0, 0.0, 0.0, 1.0).is_valid());
        assert!(!Rect::from_units(0.0, 0.0, 1.0, -1.0).is_valid());
    }
}
