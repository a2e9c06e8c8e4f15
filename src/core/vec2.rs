//! Fixed-Point 2D Vector
//!
//! Deterministic 2D vector operations for platformer physics.
//! All operations use fixed-point arithmetic.

use std::fmt;
use std::ops::{Add, Sub, Neg};
use serde::{Serialize, Deserialize};

use super::fixed::{
    units, Fixed, FIXED_ONE, FIXED_SCALE,
    fixed_mul,
};

/// 2D vector with fixed-point components.
///
/// Screen-space convention: +x is right, +y is down.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    /// X component (Q16.16 fixed-point)
    #[serde(with = "units")]
    pub x: Fixed,
    /// Y component (Q16.16 fixed-point)
    #[serde(with = "units")]
    pub y: Fixed,
}

impl FixedVec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self { x: FIXED_ONE, y: 0 };

    /// Unit vector pointing up on screen (-Y)
    pub const UP: Self = Self { x: 0, y: -FIXED_ONE };

    /// Unit vector pointing left (-X)
    pub const LEFT: Self = Self { x: -FIXED_ONE, y: 0 };

    /// Unit vector pointing down on screen (+Y)
    pub const DOWN: Self = Self { x: 0, y: FIXED_ONE };

    /// Create a new vector from fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer components.
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self {
            x: x << FIXED_SCALE,
            y: y << FIXED_SCALE,
        }
    }

    /// Create a vector from authored float units (load time only).
    #[inline]
    pub const fn from_units(x: f64, y: f64) -> Self {
        Self {
            x: super::fixed::to_fixed(x),
            y: super::fixed::to_fixed(y),
        }
    }

    /// Add another vector.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_add(other.x),
            y: self.y.wrapping_add(other.y),
        }
    }

    /// Subtract another vector.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_sub(other.x),
            y: self.y.wrapping_sub(other.y),
        }
    }

    /// Distance to another point.
    ///
    /// Computed in i128 so level-scale distances never overflow.
    #[inline]
    pub fn distance(self, other: Self) -> Fixed {
        let dx = other.x as i128 - self.x as i128;
        let dy = other.y as i128 - self.y as i128;
        // Raw units squared stay in raw units after the root.
        ((dx * dx + dy * dy) as u128).isqrt() as Fixed
    }

    /// Move toward `target` by exactly `step` units along the straight line.
    ///
    /// Callers check `distance(target) >= step` first; this never
    /// overshoots when that holds.
    #[inline]
    pub fn step_towards(self, target: Self, step: Fixed) -> Self {
        let dist = self.distance(target);
        if dist == 0 {
            return self;
        }
        let dx = target.x as i64 - self.x as i64;
        let dy = target.y as i64 - self.y as i64;
        Self {
            x: self.x.wrapping_add((dx * step as i64 / dist as i64) as Fixed),
            y: self.y.wrapping_add((dy * step as i64 / dist as i64) as Fixed),
        }
    }

    /// Linear interpolation between two vectors.
    /// t = 0 returns self, t = FIXED_ONE returns other.
    #[inline]
    pub fn lerp(self, other: Self, t: Fixed) -> Self {
        let dx = other.x.wrapping_sub(self.x);
        let dy = other.y.wrapping_sub(self.y);
        Self {
            x: self.x.wrapping_add(fixed_mul(dx, t)),
            y: self.y.wrapping_add(fixed_mul(dy, t)),
        }
    }

    /// Convert to float tuple for rendering.
    #[inline]
    pub fn to_floats(self) -> (f32, f32) {
        (
            self.x as f32 / FIXED_ONE as f32,
            self.y as f32 / FIXED_ONE as f32,
        )
    }
}

// Operator overloads for ergonomics
impl Add for FixedVec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.add(rhs)
    }
}

impl Sub for FixedVec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.sub(rhs)
    }
}

impl Neg for FixedVec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self {
            x: self.x.wrapping_neg(),
            y: self.y.wrapping_neg(),
        }
    }
}

impl fmt::Debug for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "Vec2({:.3}, {:.3})", fx, fy)
    }
}

impl fmt::Display for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "({:.3}, {:.3})", fx, fy)
    }
}

// =============================================================================
// TESTS
// =============================================================================
