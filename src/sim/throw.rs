//! Ball throw/respawn state machine
//!
//! The ball rests on a camera-relative anchor until a swipe releases it. While
//! in flight it is watched every tick and brought back once it slows down,
//! runs out of flight time, or drops through the hoop.

use glam::{Vec2, Vec3};

use super::events::{Contact, ContactKind, EventBus, GameEvent, Tag};
use super::gesture::GestureSample;
use crate::audio::AudioCue;
use crate::platform::{CameraPose, RigidBody};
use crate::settings::ThrowSettings;

/// Ball state - attached to the camera or free under physics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallState {
    /// Kinematic, parented to the camera anchor, zero velocity
    Resting,
    /// Dynamic, driven by the host physics
    InFlight,
}

/// Owns the ball body and turns gestures into throws
pub struct ThrowController {
    body: Box<dyn RigidBody>,
    tuning: ThrowSettings,
    state: BallState,
    gesture_start: Option<Vec2>,
    /// Seconds since release
    elapsed: f32,
    /// Physics has not stepped since the impulse was applied
    released_this_frame: bool,
}

impl ThrowController {
    /// Take ownership of the ball and put it at rest.
    ///
    /// The initial respawn emits `BallRespawned { after_throw: false }`.
    pub fn new(body: Box<dyn RigidBody>, tuning: ThrowSettings, events: &mut EventBus) -> Self {
        let mut controller = Self {
            body,
            tuning,
            state: BallState::Resting,
            gesture_start: None,
            elapsed: 0.0,
            released_this_frame: false,
        };
        controller.respawn(events);
        controller
    }

    pub fn state(&self) -> BallState {
        self.state
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn gesture_open(&self) -> bool {
        self.gesture_start.is_some()
    }

    pub fn tuning(&self) -> &ThrowSettings {
        &self.tuning
    }

    pub fn body_mut(&mut self) -> &mut dyn RigidBody {
        self.body.as_mut()
    }

    /// Start a swipe. Ignored unless resting with no swipe open.
    pub fn begin_gesture(&mut self, screen_pos: Vec2) -> bool {
        if self.state != BallState::Resting || self.gesture_start.is_some() {
            return false;
        }
        self.gesture_start = Some(screen_pos);
        true
    }

    /// Abandon an open swipe without throwing
    pub fn cancel_gesture(&mut self) {
        self.gesture_start = None;
    }

    /// Finish a swipe and throw. Returns the applied impulse.
    pub fn end_gesture(
        &mut self,
        screen_pos: Vec2,
        camera: &CameraPose,
        events: &mut EventBus,
    ) -> Option<Vec3> {
        if self.state != BallState::Resting {
            return None;
        }
        let start = self.gesture_start.take()?;
        let gesture = GestureSample::new(start, screen_pos);
        let impulse = gesture.impulse(camera, &self.tuning);

        self.body.detach();
        self.body.set_kinematic(false);
        self.body.set_gravity(true);
        self.body.apply_impulse(impulse);

        self.state = BallState::InFlight;
        self.elapsed = 0.0;
        self.released_this_frame = true;

        log::debug!(
            "Ball thrown: swipe {:.0}px, impulse {:.3}",
            gesture.magnitude(),
            impulse.length()
        );
        events.emit(GameEvent::BallThrown { impulse });
        Some(impulse)
    }

    /// Per-frame settle check. Returns true if the ball respawned.
    ///
    /// The first tick after release is skipped, since the host may only report
    /// the impulse's velocity once its physics has stepped.
    pub fn tick(&mut self, dt: f32, events: &mut EventBus) -> bool {
        if self.state != BallState::InFlight {
            return false;
        }
        if std::mem::take(&mut self.released_this_frame) {
            return false;
        }
        self.elapsed += dt;

        let speed = self.body.linear_velocity().length();
        if speed < self.tuning.settle_speed || self.elapsed >= self.tuning.max_flight_secs {
            log::debug!("Ball settled (speed {:.3}, {:.2}s in flight)", speed, self.elapsed);
            self.respawn(events);
            return true;
        }
        false
    }

    /// Return the ball to rest on the camera anchor
    pub fn respawn(&mut self, events: &mut EventBus) {
        let after_throw = self.state == BallState::InFlight;

        self.body.set_linear_velocity(Vec3::ZERO);
        self.body.set_angular_velocity(Vec3::ZERO);
        self.body.set_kinematic(true);
        self.body.set_gravity(false);
        self.body.attach_to_camera(self.tuning.rest_offset());

        self.elapsed = 0.0;
        self.released_this_frame = false;
        self.gesture_start = None;
        self.state = BallState::Resting;

        events.emit(GameEvent::BallRespawned { after_throw });
    }

    /// React to a contact reported against the ball
    pub fn on_contact(&mut self, contact: &Contact, events: &mut EventBus) {
        match contact.kind {
            ContactKind::Collision => {
                let cue = if contact.other == Tag::HoopSurface {
                    AudioCue::HoopHit
                } else {
                    AudioCue::GroundPitch
                };
                events.emit(GameEvent::AudioRequested(cue));
            }
            ContactKind::Trigger if contact.other == Tag::Hoop => {
                // Through the hoop: no need to wait for it to settle
                self.respawn(events);
            }
            ContactKind::Trigger => {}
        }
    }
}
