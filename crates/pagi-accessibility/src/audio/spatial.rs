//! World-space geometry to stereo pan, volume, and pitch.
//!
//! These mappings are the whole of the "spatial" in spatial audio: every cue the mixers
//! play is placed with one of the functions below.

use serde::{Deserialize, Serialize};

/// Pitch at 0% progress.
pub const PROGRESS_PITCH_LOW: f32 = 0.5;
/// Pitch at 100% progress.
pub const PROGRESS_PITCH_HIGH: f32 = 2.0;

/// A 2D world position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Stereo pan from a horizontal offset: `clamp((emitter_x - listener_x) / divisor, -1, 1)`.
///
/// -1 is full left, +1 full right. A non-positive divisor collapses to hard left/right;
/// a NaN position centers.
pub fn pan_from_offset(emitter_x: f32, listener_x: f32, pan_divisor: f32) -> f32 {
    let offset = emitter_x - listener_x;
    if offset.is_nan() {
        return 0.0;
    }
    if pan_divisor <= 0.0 {
        return if offset == 0.0 { 0.0 } else { offset.signum() };
    }
    clamp_pan(offset / pan_divisor)
}

/// Closer is louder: `max(clamp01(1 - distance / max_audible), floor)`.
pub fn volume_from_distance(distance: f32, max_audible_distance: f32, floor: f32) -> f32 {
    let raw = if max_audible_distance <= 0.0 {
        0.0
    } else {
        (1.0 - distance.abs() / max_audible_distance).clamp(0.0, 1.0)
    };
    raw.max(floor.clamp(0.0, 1.0))
}

/// Obstacle loudness band: `clamp(1 - |dx| / 3, 0.3, 0.9)`.
pub fn banded_volume(dx: f32) -> f32 {
    (1.0 - dx.abs() / 3.0).clamp(0.3, 0.9)
}

/// Linear interpolation between two pitch bounds; `t` is clamped to 0..1 first.
pub fn lerp_pitch(t: f32, low: f32, high: f32) -> f32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    low + t * (high - low)
}

/// Progress bar pitch: 0.5x at 0%, 2.0x at 100%.
pub fn progress_pitch(progress: f32) -> f32 {
    lerp_pitch(progress, PROGRESS_PITCH_LOW, PROGRESS_PITCH_HIGH)
}

pub fn clamp_pan(pan: f32) -> f32 {
    if pan.is_nan() {
        0.0
    } else {
        pan.clamp(-1.0, 1.0)
    }
}

pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Per-mixer tuning of the pan and distance mappings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixerProfile {
    /// World units of horizontal offset that reach full pan.
    pub pan_divisor: f32,
    /// Distance at which the unfloored volume reaches zero.
    pub max_audible_distance: f32,
    /// Volume never drops below this while a cue is relevant.
    pub volume_floor: f32,
    /// Volume never rises above this.
    pub volume_ceiling: f32,
}

impl MixerProfile {
    /// Gentle pan, proximity beeps fading out over 10 units.
    pub fn stealth() -> Self {
        Self {
            pan_divisor: 5.0,
            max_audible_distance: 10.0,
            volume_floor: 0.0,
            volume_ceiling: 1.0,
        }
    }

    /// Pronounced pan; obstacle loops stay inside a 0.3..0.9 band over 3 units.
    pub fn minigame() -> Self {
        Self {
            pan_divisor: 2.0,
            max_audible_distance: 3.0,
            volume_floor: 0.3,
            volume_ceiling: 0.9,
        }
    }

    /// Pronounced pan, audible from 20 units so the player hears it before reaching it.
    pub fn interactable() -> Self {
        Self {
            pan_divisor: 2.0,
            max_audible_distance: 20.0,
            volume_floor: 0.05,
            volume_ceiling: 1.0,
        }
    }

    pub fn pan(&self, emitter_x: f32, listener_x: f32) -> f32 {
        pan_from_offset(emitter_x, listener_x, self.pan_divisor)
    }

    /// Distance-mapped volume, floored and capped.
    pub fn volume_at(&self, distance: f32) -> f32 {
        volume_from_distance(distance, self.max_audible_distance, self.volume_floor)
            .min(self.volume_ceiling.clamp(0.0, 1.0))
    }
}
