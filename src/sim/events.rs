//! Game events and contact reports
//!
//! Components push events onto the bus as they happen; the session drains it
//! before returning from each tick, so observers see events in the order they
//! were emitted and within the same frame.

use std::collections::VecDeque;

use glam::Vec3;

use crate::audio::AudioCue;

/// Tag carried by the object the ball touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Scoring volume inside the hoop ring
    Hoop,
    /// Rim and backboard colliders
    HoopSurface,
    Ground,
    Untagged,
}

/// How the host reported the contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Physical collision
    Collision,
    /// Trigger volume overlap
    Trigger,
}

/// A contact reported against the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub kind: ContactKind,
    pub other: Tag,
}

impl Contact {
    pub fn collision(other: Tag) -> Self {
        Self {
            kind: ContactKind::Collision,
            other,
        }
    }

    pub fn trigger(other: Tag) -> Self {
        Self {
            kind: ContactKind::Trigger,
            other,
        }
    }
}

/// Something observers may care about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Ball is back at rest on the camera anchor.
    ///
    /// Also fires for the initial spawn, where `after_throw` is false.
    BallRespawned { after_throw: bool },
    /// Impulse applied on gesture release
    BallThrown { impulse: Vec3 },
    HoopPlaced { position: Vec3 },
    HoopRemoved,
    ScoreChanged { score: i32 },
    AudioRequested(AudioCue),
    ParticlesStarted,
    ParticlesStopped,
}

/// Observer registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

type Listener = Box<dyn FnMut(&GameEvent)>;

/// FIFO event queue plus registered observers
#[derive(Default)]
pub struct EventBus {
    queue: VecDeque<GameEvent>,
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.queue.push_back(event);
    }

    /// Oldest pending event
    pub fn pop(&mut self) -> Option<GameEvent> {
        self.queue.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Deliver one event to every observer, in registration order
    pub fn notify(&mut self, event: &GameEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}
