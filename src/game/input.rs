//! Input Capture and Recording
//!
//! Maps host key codes to logical keys, tracks which keys are held, and
//! hands the simulation an immutable [`InputFrame`] at the start of each tick.
//! Frames are recorded delta-compressed so a level run can be replayed.

use std::collections::BTreeSet;

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, StateHasher};

// =============================================================================
// LOGICAL KEYS
// =============================================================================

/// Logical game keys. Host key codes are folded onto these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Jump,
    Stretch,
}

impl Key {
    /// All logical keys.
    pub const ALL: [Key; 4] = [Key::Left, Key::Right, Key::Jump, Key::Stretch];

    /// Map a host key code (DOM `KeyboardEvent.code` naming) to a logical key.
    ///
    /// ```
    /// use gimbo::game::input::Key;
    /// assert_eq!(Key::from_code("KeyA"), Some(Key::Left));
    /// assert_eq!(Key::from_code("Space"), Some(Key::Jump));
    /// assert_eq!(Key::from_code("Enter"), None);
    /// ```
    pub fn from_code(code: &str) -> Option<Key> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Key::Left),
            "ArrowRight" | "KeyD" => Some(Key::Right),
            "Space" | "ArrowUp" | "KeyW" => Some(Key::Jump),
            "ArrowDown" | "KeyS" => Some(Key::Stretch),
            _ => None,
        }
    }

    /// Bit in [`InputFrame::flags`].
    #[inline]
    pub const fn flag(self) -> u8 {
        match self {
            Key::Left => InputFrame::FLAG_LEFT,
            Key::Right => InputFrame::FLAG_RIGHT,
            Key::Jump => InputFrame::FLAG_JUMP,
            Key::Stretch => InputFrame::FLAG_STRETCH,
        }
    }
}

/// What the host should do with a key event after the sampler saw it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Managed key: suppress the host's default handling (scrolling etc).
    Consumed,
    /// Not a game key: let the host handle it.
    Ignored,
}

impl KeyDisposition {
    #[inline]
    pub fn is_consumed(self) -> bool {
        matches!(self, KeyDisposition::Consumed)
    }
}

// =============================================================================
// INPUT FRAME
// =============================================================================

/// Held-key state for a single tick.
///
/// Immutable once sampled; the physics step only ever sees a copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct InputFrame {
    /// Key flags (packed bits):
    /// - Bit 0: Left
    /// - Bit 1: Right
    /// - Bit 2: Jump
    /// - Bit 3: Stretch
    /// - Bit 4-7: Reserved
    pub flags: u8,
}

impl InputFrame {
    /// Size in bytes
    pub const SIZE: usize = 1;

    pub const FLAG_LEFT: u8 = 0x01;
    pub const FLAG_RIGHT: u8 = 0x02;
    pub const FLAG_JUMP: u8 = 0x04;
    pub const FLAG_STRETCH: u8 = 0x08;

    const VALID_MASK: u8 = 0x0F;

    /// Create a new empty input frame.
    pub const fn new() -> Self {
        Self { flags: 0 }
    }

    /// Frame from raw flags. Reserved bits are dropped.
    pub const fn from_flags(flags: u8) -> Self {
        Self { flags: flags & Self::VALID_MASK }
    }

    /// Builder: frame with `key` held as well.
    #[inline]
    pub const fn with(self, key: Key) -> Self {
        Self { flags: self.flags | key.flag() }
    }

    #[inline]
    pub fn is_held(&self, key: Key) -> bool {
        self.flags & key.flag() != 0
    }

    #[inline]
    pub fn left(&self) -> bool {
        self.is_held(Key::Left)
    }

    #[inline]
    pub fn right(&self) -> bool {
        self.is_held(Key::Right)
    }

    #[inline]
    pub fn jump(&self) -> bool {
        self.is_held(Key::Jump)
    }

    #[inline]
    pub fn stretch(&self) -> bool {
        self.is_held(Key::Stretch)
    }

    /// Set or clear a key.
    #[inline]
    pub fn set(&mut self, key: Key, held: bool) {
        if held {
            self.flags |= key.flag();
        } else {
            self.flags &= !key.flag();
        }
    }

    /// No keys held.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.flags == 0
    }
}

// =============================================================================
// SAMPLER
// =============================================================================

/// Tracks the last-known state of every logical key.
///
/// Host codes are tracked individually so two aliases of one key (say
/// `ArrowLeft` and `KeyA`) keep it held until both are released.
/// No debouncing. Repeated key-downs are harmless.
#[derive(Clone, Debug, Default)]
pub struct InputSampler {
    /// Host key codes currently down.
    codes: BTreeSet<String>,
    /// Logical keys pressed directly.
    pressed: InputFrame,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a host key-down.
    pub fn key_down(&mut self, code: &str) -> KeyDisposition {
        if Key::from_code(code).is_none() {
            return KeyDisposition::Ignored;
        }
        if !self.codes.contains(code) {
            self.codes.insert(code.to_string());
        }
        KeyDisposition::Consumed
    }

    /// Handle a host key-up.
    pub fn key_up(&mut self, code: &str) -> KeyDisposition {
        if Key::from_code(code).is_none() {
            return KeyDisposition::Ignored;
        }
        self.codes.remove(code);
        KeyDisposition::Consumed
    }

    /// Press a logical key directly (scripted input, tests).
    #[inline]
    pub fn press(&mut self, key: Key) {
        self.pressed.set(key, true);
    }

    /// Release a logical key directly. Host codes still down keep it held.
    #[inline]
    pub fn release(&mut self, key: Key) {
        self.pressed.set(key, false);
    }

    #[inline]
    pub fn is_held(&self, key: Key) -> bool {
        self.snapshot().is_held(key)
    }

    /// Release everything (focus loss, reset).
    pub fn clear(&mut self) {
        self.codes.clear();
        self.pressed = InputFrame::new();
    }

    /// Immutable copy of the held keys for one tick.
    pub fn snapshot(&self) -> InputFrame {
        self.codes
            .iter()
            .filter_map(|code| Key::from_code(code))
            .fold(self.pressed, |frame, key| frame.with(key))
    }
}

// =============================================================================
// RECORDING
// =============================================================================

/// Delta-compressed input entry.
///
/// Only stored when input CHANGES (not every tick).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input state began
    pub tick: u32,
    /// The new input state
    pub frame: InputFrame,
}

impl InputDelta {
    /// Size in bytes (approximate)
    pub const SIZE: usize = 5;

    pub fn new(tick: u32, frame: InputFrame) -> Self {
        Self { tick, frame }
    }
}

/// Complete input recording for one level run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputRecording {
    /// Starting tick (usually 0)
    pub start_tick: u32,

    /// Last tick that received input
    pub end_tick: u32,

    /// Delta-compressed input data.
    /// Only stores ticks where input CHANGED.
    deltas: Vec<InputDelta>,

    /// Last recorded input (for delta comparison)
    #[serde(skip)]
    last_frame: InputFrame,
}

impl InputRecording {
    pub fn new() -> Self {
        Self {
            start_tick: 0,
            end_tick: 0,
            deltas: Vec::with_capacity(256),
            last_frame: InputFrame::new(),
        }
    }

    /// Rebuild a recording from stored deltas.
    pub fn from_deltas(deltas: Vec<InputDelta>, end_tick: u32) -> Self {
        let last_frame = deltas.last().map(|d| d.frame).unwrap_or_default();
        Self {
            start_tick: 0,
            end_tick,
            deltas,
            last_frame,
        }
    }

    /// Record input for a tick.
    ///
    /// Only stores if input changed from previous frame.
    pub fn record(&mut self, tick: u32, frame: InputFrame) {
        self.end_tick = tick;

        if frame != self.last_frame {
            self.deltas.push(InputDelta::new(tick, frame));
            self.last_frame = frame;
        }
    }

    /// Get input at a specific tick.
    ///
    /// Uses binary search for efficiency.
    pub fn input_at(&self, tick: u32) -> InputFrame {
        // Last delta at or before this tick
        let idx = self.deltas.partition_point(|d| d.tick <= tick);

        if idx == 0 {
            InputFrame::new()
        } else {
            self.deltas[idx - 1].frame
        }
    }

    /// Get all deltas (for serialization/replay).
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    /// Number of delta entries.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Estimated size in bytes.
    pub fn estimated_size(&self) -> usize {
        8 + (self.deltas.len() * InputDelta::SIZE)
    }

    /// Finalize the recording (call at level end).
    pub fn finalize(&mut self, end_tick: u32) {
        self.end_tick = end_tick;
    }

    /// Hash of the recorded deltas.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_input_recording();
        hasher.update_u32(self.start_tick);
        hasher.update_u32(self.end_tick);
        hasher.update_u32(self.deltas.len() as u32);
        for delta in &self.deltas {
            hasher.update_u32(delta.tick);
            hasher.update_u8(delta.frame.flags);
        }
        hasher.finalize()
    }

    /// Create iterator over all inputs for replay.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: self.start_tick,
            delta_idx: 0,
            current_frame: InputFrame::new(),
        }
    }
}

/// Iterator for replaying inputs tick-by-tick.
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u32,
    delta_idx: usize,
    current_frame: InputFrame,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u32, InputFrame);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick > self.recording.end_tick {
            return None;
        }

        while let Some(delta) = self.recording.deltas.get(self.delta_idx) {
            if delta.tick > self.current_tick {
                break;
            }
            self.current_frame = delta.frame;
            self.delta_idx += 1;
        }

        let result = (self.current_tick, self.current_frame);
        self.current_tick += 1;
        Some(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================
