//! Camera Controller
//!
//! Horizontal follow camera with exponential smoothing, deterministic
//! shake, and eased transitions. Lives inside the level state so it is
//! hashed and replayed with everything else.

use serde::{Serialize, Deserialize};

use crate::core::fixed::{
    units, Fixed, FIXED_ONE, CAMERA_SMOOTHING, VIEWPORT_HEIGHT, VIEWPORT_WIDTH,
    ease_in_out_quad, fixed_clamp, fixed_mul,
};
use crate::core::hash::StateHasher;
use crate::core::rng::DeterministicRng;
use crate::core::vec2::FixedVec2;
use crate::game::level::Bounds;

/// Camera tuning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    #[serde(with = "units")]
    pub viewport_width: Fixed,
    #[serde(with = "units")]
    pub viewport_height: Fixed,
    /// Fraction of the remaining distance covered per tick
    #[serde(with = "units")]
    pub smoothing: Fixed,
    /// Peak-to-peak jitter of a default shake
    #[serde(with = "units")]
    pub shake_intensity: Fixed,
    pub shake_duration_ticks: u32,
    /// Shake when a breakable platform gives way
    pub shake_on_break: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            smoothing: CAMERA_SMOOTHING,
            shake_intensity: 10 * FIXED_ONE,
            // ~300ms at 60Hz
            shake_duration_ticks: 18,
            shake_on_break: true,
        }
    }
}

/// Horizontal offset that centers the player, kept inside the level.
///
/// On a level narrower than the viewport `min_x` wins.
pub fn target_offset(player_x: Fixed, bounds: &Bounds, viewport_width: Fixed) -> Fixed {
    fixed_clamp(
        player_x - viewport_width / 2,
        bounds.min_x,
        bounds.max_x - viewport_width,
    )
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Transition {
    from: FixedVec2,
    to: FixedVec2,
    duration_ticks: u32,
    elapsed_ticks: u32,
}

impl Transition {
    fn progress(&self) -> Fixed {
        if self.duration_ticks == 0 {
            return FIXED_ONE;
        }
        ((self.elapsed_ticks as i64 * FIXED_ONE as i64) / self.duration_ticks as i64) as Fixed
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Shake {
    #[serde(with = "units")]
    intensity: Fixed,
    remaining_ticks: u32,
}

/// Smoothed follow camera.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothCamera {
    config: CameraConfig,
    /// Smoothed position (shake excluded)
    position: FixedVec2,
    target: FixedVec2,
    /// Current shake offset, re-rolled each tick
    jitter: FixedVec2,
    shake: Shake,
    transition: Option<Transition>,
    rng: DeterministicRng,
}

impl SmoothCamera {
    pub fn new(config: CameraConfig, rng: DeterministicRng) -> Self {
        Self {
            config,
            position: FixedVec2::ZERO,
            target: FixedVec2::ZERO,
            jitter: FixedVec2::ZERO,
            shake: Shake::default(),
            transition: None,
            rng,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Jump straight to the player with no smoothing.
    pub fn snap_to_player(&mut self, player_x: Fixed, bounds: &Bounds) {
        let x = target_offset(player_x, bounds, self.config.viewport_width);
        self.target = FixedVec2::new(x, 0);
        self.position = self.target;
    }

    /// Advance one tick.
    pub fn update(&mut self, player_x: Fixed, bounds: &Bounds) {
        if let Some(transition) = self.transition.as_mut() {
            transition.elapsed_ticks = transition.elapsed_ticks.saturating_add(1);
            let eased = ease_in_out_quad(transition.progress());
            self.position = transition.from.lerp(transition.to, eased);
            self.target = self.position;
            if transition.elapsed_ticks >= transition.duration_ticks {
                self.position = transition.to;
                self.target = transition.to;
                self.transition = None;
            }
        } else {
            self.target = FixedVec2::new(
                target_offset(player_x, bounds, self.config.viewport_width),
                0,
            );
            let delta = self.target - self.position;
            self.position.x += fixed_mul(delta.x, self.config.smoothing);
            self.position.y += fixed_mul(delta.y, self.config.smoothing);
        }

        if self.shake.remaining_ticks > 0 {
            self.jitter = FixedVec2::new(
                self.rng.next_jitter(self.shake.intensity),
                self.rng.next_jitter(self.shake.intensity),
            );
            self.shake.remaining_ticks -= 1;
        } else {
            self.jitter = FixedVec2::ZERO;
        }
    }

    /// Start a shake, replacing any shake in progress.
    pub fn shake(&mut self, intensity: Fixed, duration_ticks: u32) {
        self.shake = Shake { intensity, remaining_ticks: duration_ticks };
    }

    /// Shake with the configured intensity and duration.
    pub fn shake_default(&mut self) {
        self.shake(self.config.shake_intensity, self.config.shake_duration_ticks);
    }

    #[inline]
    pub fn is_shaking(&self) -> bool {
        self.shake.remaining_ticks > 0 || self.jitter != FixedVec2::ZERO
    }

    /// Ease to `(x, y)` over `duration_ticks`, suspending follow until done.
    pub fn transition_to(&mut self, x: Fixed, y: Fixed, duration_ticks: u32) {
        let to = FixedVec2::new(x, y);
        if duration_ticks == 0 {
            self.position = to;
            self.target = to;
            self.transition = None;
            return;
        }
        self.transition = Some(Transition {
            from: self.position,
            to,
            duration_ticks,
            elapsed_ticks: 0,
        });
    }

    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Smoothed position without shake.
    #[inline]
    pub fn position(&self) -> FixedVec2 {
        self.position
    }

    #[inline]
    pub fn target(&self) -> FixedVec2 {
        self.target
    }

    /// Render offset: smoothed position plus shake.
    #[inline]
    pub fn offset(&self) -> FixedVec2 {
        self.position + self.jitter
    }

    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.target);
        hasher.update_vec2(self.jitter);
        hasher.update_fixed(self.shake.intensity);
        hasher.update_u32(self.shake.remaining_ticks);
        match &self.transition {
            Some(t) => {
                hasher.update_bool(true);
                hasher.update_vec2(t.to);
                hasher.update_u32(t.duration_ticks);
                hasher.update_u32(t.elapsed_ticks);
            }
            None => hasher.update_bool(false),
        }
        let [s0, s1] = self.rng.state();
        hasher.update_u64(s0);
        hasher.update_u64(s1);
    }
}

// =============================================================================
// TESTS
// =============================================================================
