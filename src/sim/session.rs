//! Per-frame session driver
//!
//! Owns every gameplay component and the host services, routes input and
//! contacts, and delivers events before returning.

use glam::Vec2;

use super::events::{Contact, EventBus, GameEvent, ListenerId};
use super::hoop::HoopPlacement;
use super::particles::ParticleCue;
use super::score::ScoreTracker;
use super::throw::{BallState, ThrowController};
use crate::audio::{AudioDispatcher, AudioService};
use crate::consts::MAX_FRAME_DT;
use crate::platform::{CameraRig, Host, HoopSpawner, PlaneRaycaster};
use crate::settings::Settings;

/// Touch/mouse phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

/// A single pointer event in screen pixels (+Y up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub position: Vec2,
}

impl TouchEvent {
    pub fn began(position: Vec2) -> Self {
        Self {
            phase: TouchPhase::Began,
            position,
        }
    }

    pub fn ended(position: Vec2) -> Self {
        Self {
            phase: TouchPhase::Ended,
            position,
        }
    }
}

/// Everything the host reports for one frame, processed in order
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub touches: Vec<TouchEvent>,
    pub contacts: Vec<Contact>,
}

/// A single play session
pub struct Session {
    settings: Settings,
    /// Monotonic seconds since the session started
    clock: f64,
    camera: Box<dyn CameraRig>,
    raycaster: Box<dyn PlaneRaycaster>,
    hoops: Box<dyn HoopSpawner>,
    placement: HoopPlacement,
    throw: ThrowController,
    score: ScoreTracker,
    particles: ParticleCue,
    audio: AudioService,
    bus: EventBus,
    ball_revealed: bool,
    /// Set when the hoop is removed; the next placement brings the ball back to rest
    respawn_on_place: bool,
}

impl Session {
    /// Start a session. The ball stays hidden until a hoop is placed.
    pub fn new(host: Host, settings: Settings) -> Self {
        let Host {
            mut ball,
            camera,
            raycaster,
            hoops,
            score_text,
            effects,
        } = host;

        let mut bus = EventBus::new();
        ball.set_visible(false);
        let throw = ThrowController::new(ball, settings.throw.clone(), &mut bus);

        let mut session = Self {
            placement: HoopPlacement::new(settings.hoop.offset),
            score: ScoreTracker::new(score_text),
            particles: ParticleCue::new(effects, settings.particles.duration_secs),
            settings,
            clock: 0.0,
            camera,
            raycaster,
            hoops,
            throw,
            audio: AudioService::new(),
            bus,
            ball_revealed: false,
            respawn_on_place: false,
        };
        session.flush_events();
        log::info!("Session started");
        session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn score(&self) -> i32 {
        self.score.score()
    }

    pub fn throws(&self) -> u32 {
        self.score.throws()
    }

    pub fn ball_state(&self) -> BallState {
        self.throw.state()
    }

    pub fn is_hoop_placed(&self) -> bool {
        self.placement.is_placed()
    }

    pub fn ball_revealed(&self) -> bool {
        self.ball_revealed
    }

    pub fn pending_particle_stops(&self) -> usize {
        self.particles.pending_stops()
    }

    /// Install the audio dispatcher. The first registration wins.
    pub fn register_audio(&mut self, dispatcher: AudioDispatcher) -> Result<(), AudioDispatcher> {
        self.audio.register(dispatcher)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Advance one frame
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.clock += f64::from(dt);

        for touch in &input.touches {
            self.route_touch(touch);
        }
        for contact in &input.contacts {
            self.route_contact(contact);
        }

        self.throw.tick(dt, &mut self.bus);
        self.particles.poll(self.clock, &mut self.bus);

        self.flush_events();
    }

    /// Deliver a pointer event outside the frame tick
    pub fn touch(&mut self, touch: TouchEvent) {
        self.route_touch(&touch);
        self.flush_events();
    }

    /// Deliver a contact callback outside the frame tick
    pub fn contact(&mut self, contact: Contact) {
        self.route_contact(&contact);
        self.flush_events();
    }

    /// Destroy the hoop so a new one can be placed. The ball is hidden with it.
    pub fn remove_hoop(&mut self) -> bool {
        let removed = self.placement.remove(self.hoops.as_mut(), &mut self.bus);
        if removed {
            self.hide_ball();
        }
        self.flush_events();
        removed
    }

    /// Tear down services. The session can still be ticked but plays no audio.
    pub fn shutdown(&mut self) {
        if self.placement.remove(self.hoops.as_mut(), &mut self.bus) {
            self.hide_ball();
        }
        self.flush_events();
        self.audio.shutdown();
        log::info!(
            "Session ended: score {}, {} respawns over {:.1}s",
            self.score.score(),
            self.score.throws(),
            self.clock
        );
    }

    fn route_touch(&mut self, touch: &TouchEvent) {
        match touch.phase {
            TouchPhase::Began if !self.placement.is_placed() => {
                let pose = self.camera.pose();
                let placed = self.placement.try_place(
                    touch.position,
                    self.raycaster.as_mut(),
                    &pose,
                    self.hoops.as_mut(),
                    &mut self.bus,
                );
                if placed.is_some() {
                    self.reveal_ball();
                }
            }
            TouchPhase::Began if self.ball_revealed => {
                self.throw.begin_gesture(touch.position);
            }
            TouchPhase::Ended if self.ball_revealed => {
                let pose = self.camera.pose();
                self.throw.end_gesture(touch.position, &pose, &mut self.bus);
            }
            TouchPhase::Cancelled => self.throw.cancel_gesture(),
            _ => {}
        }
    }

    fn reveal_ball(&mut self) {
        self.ball_revealed = true;
        self.throw.body_mut().set_visible(true);
        if self.respawn_on_place {
            self.respawn_on_place = false;
            self.throw.respawn(&mut self.bus);
        }
    }

    fn hide_ball(&mut self) {
        self.ball_revealed = false;
        self.respawn_on_place = true;
        self.throw.cancel_gesture();
        self.throw.body_mut().set_visible(false);
    }

    fn route_contact(&mut self, contact: &Contact) {
        self.throw.on_contact(contact, &mut self.bus);
        self.score.on_contact(contact, &mut self.bus);
        self.particles.on_contact(contact, self.clock, &mut self.bus);
    }

    /// Drain the bus: internal consumers first, then observers, in emission order
    fn flush_events(&mut self) {
        while let Some(event) = self.bus.pop() {
            match event {
                GameEvent::BallRespawned { .. } => self.score.on_respawn(),
                GameEvent::AudioRequested(cue) => {
                    self.audio.request(cue);
                }
                _ => {}
            }
            self.bus.notify(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::HeadlessHost;
    use crate::sim::events::Tag;
    use crate::platform::{ClipId, PlaneHit};
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session(effects: usize) -> (Session, HeadlessHost) {
        let host = HeadlessHost::new(effects);
        host.raycaster.set_hit(Some(PlaneHit {
            position: Vec3::new(0.0, -1.5, -3.0),
            within_polygon: true,
        }));
        let session = Session::new(host.host(), Settings::default());
        (session, host)
    }

    fn with_audio(session: &mut Session, host: &HeadlessHost) {
        let dispatcher = AudioDispatcher::new(
            Box::new(host.audio.clone()),
            vec![ClipId(0), ClipId(1), ClipId(2)],
            3,
        );
        session.register_audio(dispatcher).unwrap();
    }

    fn place(session: &mut Session) {
        session.tick(
            &TickInput {
                touches: vec![TouchEvent::began(Vec2::new(300.0, 500.0))],
                ..Default::default()
            },
            1.0 / 60.0,
        );
    }

    fn swipe() -> TickInput {
        TickInput {
            touches: vec![
                TouchEvent::began(Vec2::new(100.0, 100.0)),
                TouchEvent::ended(Vec2::new(100.0, 300.0)),
            ],
            ..Default::default()
        }
    }

    fn contacts(contacts: &[Contact]) -> TickInput {
        TickInput {
            contacts: contacts.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ball_hidden_until_hoop_placed() {
        let (mut session, host) = session(0);
        assert!(!host.ball.state().visible);
        assert_eq!(session.throws(), 1);

        // Swipes before placement do nothing
        host.raycaster.set_hit(None);
        session.tick(&swipe(), 1.0 / 60.0);
        assert!(host.ball.state().impulses.is_empty());
        assert!(!session.is_hoop_placed());

        host.raycaster.set_hit(Some(PlaneHit {
            position: Vec3::new(0.0, -1.5, -3.0),
            within_polygon: true,
        }));
        place(&mut session);
        assert!(session.is_hoop_placed());
        assert!(session.ball_revealed());
        assert!(host.ball.state().visible);
        assert_eq!(host.hoops.live().len(), 1);
    }

    #[test]
    fn test_placing_touch_does_not_open_gesture() {
        let (mut session, host) = session(0);
        session.tick(
            &TickInput {
                touches: vec![
                    TouchEvent::began(Vec2::ZERO),
                    TouchEvent::ended(Vec2::new(0.0, 400.0)),
                ],
                ..Default::default()
            },
            1.0 / 60.0,
        );
        assert!(session.is_hoop_placed());
        assert!(host.ball.state().impulses.is_empty());
        assert_eq!(session.ball_state(), BallState::Resting);
    }

    #[test]
    fn test_throw_settle_respawn_cycle() {
        let (mut session, host) = session(0);
        place(&mut session);

        session.tick(&swipe(), 1.0 / 60.0);
        assert_eq!(session.ball_state(), BallState::InFlight);
        let impulse = host.ball.state().impulses[0];
        assert!((impulse.length() - 0.2).abs() < 1e-6);

        host.ball.set_velocity(Vec3::new(0.0, 0.0, 0.01));
        session.tick(&TickInput::default(), 1.0 / 60.0);
        assert_eq!(session.ball_state(), BallState::Resting);
        assert_eq!(session.throws(), 2);

        let s = host.ball.state();
        assert!(s.kinematic && !s.gravity);
        assert_eq!(s.linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_timeout_respawn() {
        let (mut session, host) = session(0);
        place(&mut session);
        session.tick(&swipe(), 1.0 / 60.0);
        host.ball.set_velocity(Vec3::new(0.0, 0.0, -4.0));

        for _ in 0..110 {
            session.tick(&TickInput::default(), 1.0 / 60.0);
        }
        assert_eq!(session.ball_state(), BallState::InFlight);
        for _ in 0..15 {
            session.tick(&TickInput::default(), 1.0 / 60.0);
        }
        assert_eq!(session.ball_state(), BallState::Resting);
    }

    #[test]
    fn test_scoring_sequence_with_audio() {
        let (mut session, host) = session(1);
        with_audio(&mut session, &host);
        place(&mut session);

        session.tick(&contacts(&[Contact::trigger(Tag::Hoop)]), 1.0 / 60.0);
        assert_eq!(session.score(), 1);
        assert_eq!(host.score_text.text(), "Score: 1");
        assert!(host.audio.played().iter().any(|p| p.clip == ClipId(2)));

        session.tick(&contacts(&[Contact::trigger(Tag::Ground)]), 1.0 / 60.0);
        assert_eq!(session.score(), 0);

        session.tick(
            &contacts(&[Contact::trigger(Tag::Hoop), Contact::trigger(Tag::Hoop)]),
            1.0 / 60.0,
        );
        assert_eq!(session.score(), 2);
        assert_eq!(host.score_text.text(), "Score: 2");
    }

    #[test]
    fn test_hoop_volume_respawns_and_counts() {
        let (mut session, host) = session(0);
        place(&mut session);
        session.tick(&swipe(), 1.0 / 60.0);
        host.ball.set_velocity(Vec3::new(0.0, -3.0, 0.0));

        session.contact(Contact::trigger(Tag::Hoop));

        assert_eq!(session.ball_state(), BallState::Resting);
        assert_eq!(session.score(), 1);
        assert_eq!(session.throws(), 2);
    }

    #[test]
    fn test_collision_sounds() {
        let (mut session, host) = session(0);
        with_audio(&mut session, &host);

        session.contact(Contact::collision(Tag::HoopSurface));
        session.contact(Contact::collision(Tag::Ground));

        let clips: Vec<_> = host.audio.played().iter().map(|p| p.clip).collect();
        assert_eq!(clips, vec![ClipId(1), ClipId(0)]);
    }

    #[test]
    fn test_no_audio_registered_is_harmless() {
        let (mut session, _host) = session(0);
        session.contact(Contact::collision(Tag::Ground));
        session.contact(Contact::trigger(Tag::Hoop));
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_duplicate_audio_registration_rejected() {
        let (mut session, host) = session(0);
        with_audio(&mut session, &host);
        let second = AudioDispatcher::new(Box::new(host.audio.clone()), vec![], 1);
        assert!(session.register_audio(second).is_err());
    }

    #[test]
    fn test_particles_stop_after_duration() {
        let (mut session, host) = session(2);
        place(&mut session);

        session.tick(&contacts(&[Contact::trigger(Tag::Hoop)]), 1.0 / 60.0);
        assert!(host.effects.iter().all(|e| e.counters().playing));
        assert_eq!(session.pending_particle_stops(), 1);

        // Two seconds at 60 fps
        for _ in 0..121 {
            session.tick(&TickInput::default(), 1.0 / 60.0);
        }
        assert!(host.effects.iter().all(|e| !e.counters().playing));
        assert_eq!(session.pending_particle_stops(), 0);
    }

    #[test]
    fn test_events_reach_observers_in_order() {
        let (mut session, host) = session(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        session.subscribe(move |e| log.borrow_mut().push(*e));

        place(&mut session);
        session.tick(&swipe(), 1.0 / 60.0);
        host.ball.set_velocity(Vec3::ZERO);
        session.tick(&TickInput::default(), 1.0 / 60.0);

        let seen = seen.borrow();
        assert!(matches!(seen[0], GameEvent::HoopPlaced { .. }));
        assert!(matches!(seen[1], GameEvent::BallThrown { .. }));
        assert_eq!(seen[2], GameEvent::BallRespawned { after_throw: true });
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_remove_hoop_hides_ball_and_replacing_respawns() {
        let (mut session, host) = session(0);
        place(&mut session);

        // Swipe opened before the hoop goes away
        session.touch(TouchEvent::began(Vec2::new(100.0, 100.0)));
        assert!(session.remove_hoop());
        assert!(!session.ball_revealed());
        assert!(!host.ball.state().visible);

        // Releasing it now throws nothing
        session.touch(TouchEvent::ended(Vec2::new(100.0, 300.0)));
        assert_eq!(session.ball_state(), BallState::Resting);
        assert!(host.ball.state().impulses.is_empty());

        let throws = session.throws();
        place(&mut session);
        assert!(session.ball_revealed());
        assert!(host.ball.state().visible);
        assert_eq!(session.throws(), throws + 1);

        // And the ball is throwable again
        session.tick(&swipe(), 1.0 / 60.0);
        assert_eq!(session.ball_state(), BallState::InFlight);
    }

    #[test]
    fn test_remove_mid_flight_then_replace_rests_ball() {
        let (mut session, host) = session(0);
        place(&mut session);
        session.tick(&swipe(), 1.0 / 60.0);
        host.ball.set_velocity(Vec3::new(0.0, 0.0, -4.0));

        session.remove_hoop();
        place(&mut session);

        assert_eq!(session.ball_state(), BallState::Resting);
        let s = host.ball.state();
        assert!(s.kinematic && s.visible);
        assert_eq!(s.linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_first_placement_does_not_respawn_again() {
        let (mut session, _host) = session(0);
        place(&mut session);
        assert_eq!(session.throws(), 1);
    }

    #[test]
    fn test_rim_collision_alone_starts_no_particles() {
        let (mut session, host) = session(1);
        place(&mut session);

        session.contact(Contact::collision(Tag::HoopSurface));
        assert_eq!(host.effects[0].counters().plays, 0);
        assert_eq!(session.pending_particle_stops(), 0);

        // A swish reported as rim hit plus volume trigger celebrates once
        session.tick(
            &contacts(&[Contact::collision(Tag::HoopSurface), Contact::trigger(Tag::Hoop)]),
            1.0 / 60.0,
        );
        assert_eq!(host.effects[0].counters().plays, 1);
        assert_eq!(session.pending_particle_stops(), 1);
    }

    #[test]
    fn test_remove_hoop_allows_replacement() {
        let (mut session, host) = session(0);
        place(&mut session);
        assert!(session.remove_hoop());
        assert!(!session.is_hoop_placed());
        assert!(!session.remove_hoop());

        place(&mut session);
        assert_eq!(host.hoops.spawned_total(), 2);
        assert_eq!(host.hoops.live().len(), 1);
    }

    #[test]
    fn test_bad_dt_is_sanitized() {
        let (mut session, _host) = session(0);
        session.tick(&TickInput::default(), f32::NAN);
        session.tick(&TickInput::default(), -1.0);
        assert_eq!(session.clock(), 0.0);
        session.tick(&TickInput::default(), 5.0);
        assert!((session.clock() - f64::from(MAX_FRAME_DT)).abs() < 1e-9);
    }

    #[test]
    fn test_shutdown_removes_hoop_and_audio() {
        let (mut session, host) = session(0);
        with_audio(&mut session, &host);
        place(&mut session);

        session.shutdown();
        assert!(host.hoops.live().is_empty());
        assert!(!host.ball.state().visible);

        session.contact(Contact::collision(Tag::Ground));
        assert!(host.audio.played().is_empty());
    }
}
