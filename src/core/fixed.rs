//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for the platformer simulation.
//! Gameplay code never touches floats; authored values and config are
//! converted once at load time.
//!
//! ## Format: Q16.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q16.16 (32-bit signed integer)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [S][IIIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]                    │
//! │   │  └──── 16 bits ────┘└──── 16 bits ────┘                 │
//! │   └─ Sign bit                                               │
//! │                                                             │
//! │  Range: -32768.0 to +32767.99998 (approx)                   │
//! │  Precision: 1/65536 ≈ 0.000015 units                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Levels are a few thousand units wide, so the 32k range leaves plenty of
//! headroom. Products and distances widen to i64/i128 internally.

/// Q16.16 fixed-point number stored as i32.
/// 16 bits integer, 16 bits fractional.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE; // 65536

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1; // 32768

// =============================================================================
// GAME CONSTANTS (defaults for PhysicsConfig / CameraConfig)
// =============================================================================

/// Gravity per tick: 0.8 = floor(0.8 * 65536) = 52428
pub const GRAVITY: Fixed = 52428;

/// Jump impulse: -15.0 = -15 * 65536
pub const JUMP_STRENGTH: Fixed = -983040;

/// Horizontal speed per tick: 5.0
pub const MOVE_SPEED: Fixed = 327680;

/// Ground fallback line: 350.0
pub const GROUND_Y: Fixed = 22937600;

/// Vertical snap window for landing/ceiling resolution: 15.0
pub const LANDING_TOLERANCE: Fixed = 983040;

/// Upward nudge applied on the tick a jump starts: 2.0
pub const JUMP_NUDGE: Fixed = 131072;

/// Neck growth per tick while stretching: 5.0
pub const NECK_GROW: Fixed = 327680;

/// Neck decay per tick while relaxed: 3.0
pub const NECK_SHRINK: Fixed = 196608;

/// Maximum neck length: 100.0
pub const MAX_NECK_LENGTH: Fixed = 6553600;

/// Player body width: 40.0
pub const PLAYER_WIDTH: Fixed = 2621440;

/// Player body height: 60.0
pub const PLAYER_HEIGHT: Fixed = 3932160;

/// Collectible pickup box edge: 20.0
pub const PICKUP_SIZE: Fixed = 1310720;

/// Camera smoothing factor per tick: 0.1 = floor(0.1 * 65536)
pub const CAMERA_SMOOTHING: Fixed = 6553;

/// Viewport width: 800.0
pub const VIEWPORT_WIDTH: Fixed = 52428800;

/// Viewport height: 400.0
pub const VIEWPORT_HEIGHT: Fixed = 26214400;

/// Maximum hearts a player can hold
pub const MAX_HEARTS: u32 = 5;

/// Hearts at level start
pub const STARTING_HEARTS: u32 = 3;

/// Points per leaf
pub const SCORE_PER_LEAF: u32 = 10;

/// Points per star
pub const SCORE_PER_STAR: u32 = 50;

/// Points per heart
pub const SCORE_PER_HEART: u32 = 25;

// =============================================================================
// CORE OPERATIONS
// =============================================================================

/// Convert a float to fixed-point (truncates toward zero).
///
/// # Warning
/// Only use at compile-time, level load or config parsing. NEVER in the tick loop.
///
/// # Example
/// ```
/// use gimbo::core::fixed::{to_fixed, FIXED_ONE};
/// const MY_VALUE: i32 = to_fixed(2.5);
/// assert_eq!(MY_VALUE, FIXED_ONE * 2 + FIXED_ONE / 2);
/// ```
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert an integer number of units to fixed-point.
#[inline]
pub const fn from_int(i: i32) -> Fixed {
    i << FIXED_SCALE
}

/// Convert fixed-point to float for display/rendering.
///
/// # Warning
/// Only use for visual output. NEVER use result in game logic.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Convert fixed-point to f64 without loss.
#[inline]
pub fn to_f64(f: Fixed) -> f64 {
    f as f64 / FIXED_ONE as f64
}

/// Multiply two fixed-point numbers.
///
/// Uses i64 intermediate to prevent overflow, then truncates.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as i64) * (b as i64);
    (wide >> FIXED_SCALE) as Fixed
}

/// Divide two fixed-point numbers.
///
/// Pre-shifts numerator to maintain precision.
/// Divide-by-zero returns 0 (not panic).
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if b == 0 {
        return 0;
    }
    let wide = (a as i64) << FIXED_SCALE;
    (wide / b as i64) as Fixed
}

/// Square root, exact to the last fractional bit.
///
/// Returns 0 for non-positive inputs.
#[inline]
pub fn fixed_sqrt(x: Fixed) -> Fixed {
    if x <= 0 {
        return 0;
    }
    // sqrt(raw / 2^16) * 2^16 == sqrt(raw * 2^16)
    ((x as u64) << FIXED_SCALE).isqrt() as Fixed
}

/// Absolute value of a fixed-point number.
#[inline]
pub fn fixed_abs(x: Fixed) -> Fixed {
    if x < 0 { x.wrapping_neg() } else { x }
}

/// Minimum of two fixed-point numbers.
#[inline]
pub fn fixed_min(a: Fixed, b: Fixed) -> Fixed {
    if a < b { a } else { b }
}

/// Maximum of two fixed-point numbers.
#[inline]
pub fn fixed_max(a: Fixed, b: Fixed) -> Fixed {
    if a > b { a } else { b }
}

/// Clamp a fixed-point number to a range. `min` wins when the range is empty.
#[inline]
pub fn fixed_clamp(value: Fixed, min: Fixed, max: Fixed) -> Fixed {
    fixed_max(min, fixed_min(max, value))
}

/// Quadratic ease-in-out over t in [0, FIXED_ONE].
///
/// `t < 0.5 ? 2t² : 1 - (-2t + 2)² / 2`
#[inline]
pub fn ease_in_out_quad(t: Fixed) -> Fixed {
    let t = fixed_clamp(t, 0, FIXED_ONE);
    if t < FIXED_HALF {
        2 * fixed_mul(t, t)
    } else {
        let u = 2 * FIXED_ONE - 2 * t;
        FIXED_ONE - fixed_mul(u, u) / 2
    }
}

// =============================================================================
// SERDE ADAPTER (human units <-> Fixed)
// =============================================================================

/// Serialize a `Fixed` as a float in world units.
///
/// Used with `#[serde(with = "crate::core::fixed::units")]` on config and
/// level fields so JSON stays readable. The conversion is lossless:
/// every Q16.16 value is exactly representable as f64.
pub mod units {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{to_f64, to_fixed, Fixed};

    /// Write the value as world units.
    pub fn serialize<S: Serializer>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(to_f64(*value))
    }

    /// Read world units into fixed-point.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fixed, D::Error> {
        let units = f64::deserialize(deserializer)?;
        Ok(to_fixed(units))
    }
}

// =============================================================================
// TESTS
// =============================================================================
