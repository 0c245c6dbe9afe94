//! AR Hoops - augmented-reality basketball mini-game core
//!
//! Core modules:
//! - `sim`: Gameplay state machines (throw, placement, scoring, particle cues)
//! - `audio`: Audio cue dispatcher with pitch variation
//! - `platform`: Host service traits and an in-memory headless host
//! - `settings`: Data-driven tunables

pub mod audio;
pub mod platform;
pub mod settings;
pub mod sim;

pub use audio::{AudioCue, AudioDispatcher};
pub use settings::Settings;
pub use sim::{GameEvent, Session, TickInput};

use glam::{Quat, Vec3};

/// Game configuration constants
pub mod consts {
    /// Gesture length (pixels) that maps to one unit of force before the multiplier
    pub const GESTURE_PIXEL_SCALE: f32 = 100.0;
    /// Upward bias mixed into every throw to loft the shot
    pub const LOFT_BIAS: f32 = 0.7;
    /// Default force multiplier applied to gesture strength
    pub const FORCE_MULTIPLIER: f32 = 0.1;

    /// Ball counts as settled below this speed (units/s)
    pub const SETTLE_SPEED: f32 = 0.1;
    /// Flight time budget before a forced respawn (seconds)
    pub const MAX_FLIGHT_SECS: f32 = 2.0;

    /// Celebration particles run this long before being stopped (seconds)
    pub const PARTICLE_DURATION_SECS: f32 = 2.0;

    /// Random pitch range for audio cues
    pub const PITCH_MIN: f32 = 0.8;
    pub const PITCH_MAX: f32 = 1.2;

    /// Upper bound on a single frame delta to keep timers sane after stalls
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Yaw rotation that turns an object at `from` to face `target`, ignoring height.
///
/// The object's local -Z axis ends up pointing at the target on the XZ plane.
/// Returns identity when the target sits directly above or below.
#[inline]
pub fn yaw_facing(from: Vec3, target: Vec3) -> Quat {
    let mut dir = target - from;
    dir.y = 0.0;
    if dir.length_squared() <= f32::EPSILON {
        return Quat::IDENTITY;
    }
    let dir = dir.normalize();
    Quat::from_rotation_y((-dir.x).atan2(-dir.z))
}
