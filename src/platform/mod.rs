//! Platform abstraction layer
//!
//! The gameplay core never simulates physics, tracks planes or mixes audio
//! itself. The host engine provides those services through these traits:
//! - Rigid-body control for the ball
//! - Camera pose
//! - Plane raycasts (AR tracking)
//! - Hoop instantiation
//! - Particle effects, audio clips, text surfaces

pub mod headless;

use glam::{Quat, Vec2, Vec3};

/// Rigid-body physics handle for the ball
pub trait RigidBody {
    /// Current linear velocity (units/s)
    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn set_angular_velocity(&mut self, velocity: Vec3);
    /// Apply an instantaneous impulse; the velocity query reflects it immediately
    fn apply_impulse(&mut self, impulse: Vec3);
    fn set_kinematic(&mut self, kinematic: bool);
    fn set_gravity(&mut self, enabled: bool);
    /// Parent the body to the camera at the given local offset
    fn attach_to_camera(&mut self, local_offset: Vec3);
    /// Unparent the body, keeping its world pose
    fn detach(&mut self);
    fn set_visible(&mut self, visible: bool);
}

/// Camera basis at the moment of a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl CameraPose {
    /// Build a pose from a forward and an approximate up vector
    pub fn new(position: Vec3, forward: Vec3, up: Vec3) -> Self {
        let forward = forward.normalize_or_zero();
        let right = forward.cross(up).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        Self {
            position,
            forward,
            right,
            up,
        }
    }

    /// Pose of a camera looking down its local -Z axis
    pub fn from_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            forward: rotation * Vec3::NEG_Z,
            right: rotation * Vec3::X,
            up: rotation * Vec3::Y,
        }
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::from_rotation(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// Rendering camera
pub trait CameraRig {
    fn pose(&self) -> CameraPose;
}

/// Result of a raycast against tracked planes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneHit {
    /// World-space hit position
    pub position: Vec3,
    /// Whether the hit lies inside the tracked plane's polygon
    pub within_polygon: bool,
}

/// AR plane tracking / raycast service
pub trait PlaneRaycaster {
    fn raycast(&mut self, screen_pos: Vec2) -> Option<PlaneHit>;
}

/// Host-side handle for an instantiated hoop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoopHandle(pub u32);

/// Instantiates and destroys the hoop resource
pub trait HoopSpawner {
    fn spawn(&mut self, position: Vec3, rotation: Quat) -> HoopHandle;
    fn despawn(&mut self, hoop: HoopHandle);
}

/// A single particle system
pub trait ParticleEffect {
    fn play(&mut self);
    fn stop(&mut self);
}

/// Host-side handle for a preloaded audio clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ClipId(pub u32);

/// Audio playback service
pub trait AudioSink {
    fn play(&mut self, clip: ClipId, pitch: f32, volume: f32);
}

/// Text rendering surface (HUD label)
pub trait TextSurface {
    fn set_text(&mut self, text: &str);
}

/// Bundle of host services handed to a session at startup
pub struct Host {
    pub ball: Box<dyn RigidBody>,
    pub camera: Box<dyn CameraRig>,
    pub raycaster: Box<dyn PlaneRaycaster>,
    pub hoops: Box<dyn HoopSpawner>,
    pub score_text: Box<dyn TextSurface>,
    /// Celebration effects; `None` slots are tolerated and skipped
    pub effects: Vec<Option<Box<dyn ParticleEffect>>>,
}
