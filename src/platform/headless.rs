//! In-memory host services
//!
//! Used by the native demo and by tests. Every service is a cheap handle over
//! shared state so the creator can keep a clone and inspect what the session
//! did after handing the boxed service over.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Quat, Vec2, Vec3};

use super::{
    AudioSink, CameraPose, CameraRig, ClipId, Host, HoopHandle, HoopSpawner, ParticleEffect,
    PlaneHit, PlaneRaycaster, RigidBody, TextSurface,
};

/// Snapshot of the headless ball
#[derive(Debug, Clone, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub kinematic: bool,
    pub gravity: bool,
    /// Local offset when parented to the camera
    pub attached: Option<Vec3>,
    pub visible: bool,
    /// Every impulse applied, oldest first
    pub impulses: Vec<Vec3>,
}

impl Default for BodyState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            kinematic: true,
            gravity: false,
            attached: None,
            visible: true,
            impulses: Vec::new(),
        }
    }
}

/// Unit-mass ball with linear drag and a flat floor.
///
/// Stand-in for the host physics engine; just enough motion for a throw to
/// eventually settle.
#[derive(Debug, Clone)]
pub struct HeadlessBody {
    state: Rc<RefCell<BodyState>>,
    /// Fraction of velocity lost per second
    pub drag: f32,
    /// Height of the floor plane
    pub floor_y: f32,
}

impl Default for HeadlessBody {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBody {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(BodyState::default())),
            drag: 1.5,
            floor_y: -1.5,
        }
    }

    pub fn state(&self) -> BodyState {
        self.state.borrow().clone()
    }

    /// Overwrite the velocity as if the host physics had changed it
    pub fn set_velocity(&self, velocity: Vec3) {
        self.state.borrow_mut().linear_velocity = velocity;
    }

    /// Advance the stand-in physics by `dt`
    pub fn step(&self, dt: f32) {
        let mut s = self.state.borrow_mut();
        if s.kinematic || s.attached.is_some() {
            return;
        }
        if s.gravity {
            s.linear_velocity.y -= 9.81 * dt;
        }
        let damping = (1.0 - self.drag * dt).max(0.0);
        s.linear_velocity *= damping;
        s.angular_velocity *= damping;
        let velocity = s.linear_velocity;
        s.position += velocity * dt;

        if s.position.y < self.floor_y {
            s.position.y = self.floor_y;
            // Dead ball on the floor
            s.linear_velocity.y = 0.0;
        }
    }
}

impl RigidBody for HeadlessBody {
    fn linear_velocity(&self) -> Vec3 {
        self.state.borrow().linear_velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.state.borrow_mut().linear_velocity = velocity;
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.state.borrow_mut().angular_velocity = velocity;
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        let mut s = self.state.borrow_mut();
        s.impulses.push(impulse);
        if !s.kinematic {
            s.linear_velocity += impulse;
        }
    }

    fn set_kinematic(&mut self, kinematic: bool) {
        self.state.borrow_mut().kinematic = kinematic;
    }

    fn set_gravity(&mut self, enabled: bool) {
        self.state.borrow_mut().gravity = enabled;
    }

    fn attach_to_camera(&mut self, local_offset: Vec3) {
        let mut s = self.state.borrow_mut();
        s.attached = Some(local_offset);
        s.position = local_offset;
    }

    fn detach(&mut self) {
        self.state.borrow_mut().attached = None;
    }

    fn set_visible(&mut self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }
}

/// Camera with a settable pose
#[derive(Debug, Clone, Default)]
pub struct HeadlessCamera {
    pose: Rc<RefCell<CameraPose>>,
}

impl HeadlessCamera {
    pub fn set_pose(&self, pose: CameraPose) {
        *self.pose.borrow_mut() = pose;
    }
}

impl CameraRig for HeadlessCamera {
    fn pose(&self) -> CameraPose {
        *self.pose.borrow()
    }
}

/// Raycaster returning a scripted hit for every query
#[derive(Debug, Clone, Default)]
pub struct HeadlessRaycaster {
    hit: Rc<RefCell<Option<PlaneHit>>>,
    casts: Rc<RefCell<u32>>,
}

impl HeadlessRaycaster {
    pub fn set_hit(&self, hit: Option<PlaneHit>) {
        *self.hit.borrow_mut() = hit;
    }

    /// Number of raycasts performed so far
    pub fn casts(&self) -> u32 {
        *self.casts.borrow()
    }
}

impl PlaneRaycaster for HeadlessRaycaster {
    fn raycast(&mut self, _screen_pos: Vec2) -> Option<PlaneHit> {
        *self.casts.borrow_mut() += 1;
        *self.hit.borrow()
    }
}

/// A hoop instantiated by [`HeadlessHoops`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnedHoop {
    pub handle: HoopHandle,
    pub position: Vec3,
    pub rotation: Quat,
}

#[derive(Debug, Default)]
struct HoopLedger {
    next_id: u32,
    live: Vec<SpawnedHoop>,
    spawned_total: u32,
}

/// Hoop spawner that records live instances
#[derive(Debug, Clone, Default)]
pub struct HeadlessHoops {
    ledger: Rc<RefCell<HoopLedger>>,
}

impl HeadlessHoops {
    pub fn live(&self) -> Vec<SpawnedHoop> {
        self.ledger.borrow().live.clone()
    }

    pub fn spawned_total(&self) -> u32 {
        self.ledger.borrow().spawned_total
    }
}

impl HoopSpawner for HeadlessHoops {
    fn spawn(&mut self, position: Vec3, rotation: Quat) -> HoopHandle {
        let mut ledger = self.ledger.borrow_mut();
        ledger.next_id += 1;
        let handle = HoopHandle(ledger.next_id);
        ledger.live.push(SpawnedHoop {
            handle,
            position,
            rotation,
        });
        ledger.spawned_total += 1;
        handle
    }

    fn despawn(&mut self, hoop: HoopHandle) {
        self.ledger.borrow_mut().live.retain(|h| h.handle != hoop);
    }
}

/// Play/stop counters for a particle effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectCounters {
    pub plays: u32,
    pub stops: u32,
    pub playing: bool,
}

/// Particle effect that counts play/stop requests
#[derive(Debug, Clone, Default)]
pub struct HeadlessEffect {
    counters: Rc<RefCell<EffectCounters>>,
}

impl HeadlessEffect {
    pub fn counters(&self) -> EffectCounters {
        *self.counters.borrow()
    }
}

impl ParticleEffect for HeadlessEffect {
    fn play(&mut self) {
        let mut c = self.counters.borrow_mut();
        c.plays += 1;
        c.playing = true;
    }

    fn stop(&mut self) {
        let mut c = self.counters.borrow_mut();
        c.stops += 1;
        c.playing = false;
    }
}

/// One recorded audio playback request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayedClip {
    pub clip: ClipId,
    pub pitch: f32,
    pub volume: f32,
}

/// Audio sink that records every request
#[derive(Debug, Clone, Default)]
pub struct HeadlessAudio {
    played: Rc<RefCell<Vec<PlayedClip>>>,
}

impl HeadlessAudio {
    pub fn played(&self) -> Vec<PlayedClip> {
        self.played.borrow().clone()
    }
}

impl AudioSink for HeadlessAudio {
    fn play(&mut self, clip: ClipId, pitch: f32, volume: f32) {
        log::trace!("audio clip {:?} pitch {:.2} volume {:.2}", clip, pitch, volume);
        self.played.borrow_mut().push(PlayedClip {
            clip,
            pitch,
            volume,
        });
    }
}

/// Text surface holding the last rendered string
#[derive(Debug, Clone, Default)]
pub struct HeadlessText {
    text: Rc<RefCell<String>>,
    writes: Rc<RefCell<u32>>,
}

impl HeadlessText {
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn writes(&self) -> u32 {
        *self.writes.borrow()
    }
}

impl TextSurface for HeadlessText {
    fn set_text(&mut self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
        *self.writes.borrow_mut() += 1;
    }
}

/// Every headless service, kept by the creator for inspection
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    pub ball: HeadlessBody,
    pub camera: HeadlessCamera,
    pub raycaster: HeadlessRaycaster,
    pub hoops: HeadlessHoops,
    pub score_text: HeadlessText,
    pub effects: Vec<HeadlessEffect>,
    pub audio: HeadlessAudio,
}

impl HeadlessHost {
    /// Host with `effect_count` particle effects
    pub fn new(effect_count: usize) -> Self {
        Self {
            effects: (0..effect_count).map(|_| HeadlessEffect::default()).collect(),
            ..Default::default()
        }
    }

    /// Boxed services sharing state with this host
    pub fn host(&self) -> Host {
        Host {
            ball: Box::new(self.ball.clone()),
            camera: Box::new(self.camera.clone()),
            raycaster: Box::new(self.raycaster.clone()),
            hoops: Box::new(self.hoops.clone()),
            score_text: Box::new(self.score_text.clone()),
            effects: self
                .effects
                .iter()
                .map(|e| Some(Box::new(e.clone()) as Box<dyn ParticleEffect>))
                .collect(),
        }
    }
}
