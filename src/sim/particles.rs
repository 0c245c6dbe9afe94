//! Celebration particles when the ball drops through the hoop
//!
//! Effects start immediately and are stopped by a timer entry after a fixed
//! duration. Each trigger gets its own entry.

use super::events::{Contact, ContactKind, EventBus, GameEvent, Tag};
use super::timer::{Scheduler, TimerId};
use crate::platform::ParticleEffect;

/// Stop request carried by a timer entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopParticles {
    /// Slots that were started by the trigger
    pub slots: Vec<usize>,
}

/// Plays a set of effects when the ball enters the scoring volume
pub struct ParticleCue {
    effects: Vec<Option<Box<dyn ParticleEffect>>>,
    duration: f32,
    timers: Scheduler<StopParticles>,
}

impl ParticleCue {
    pub fn new(effects: Vec<Option<Box<dyn ParticleEffect>>>, duration: f32) -> Self {
        Self {
            effects,
            duration,
            timers: Scheduler::new(),
        }
    }

    /// Number of stop timers still pending
    pub fn pending_stops(&self) -> usize {
        self.timers.pending()
    }

    /// Start effects on a scoring trigger. Returns the stop timer.
    pub fn on_contact(
        &mut self,
        contact: &Contact,
        now: f64,
        events: &mut EventBus,
    ) -> Option<TimerId> {
        if contact.kind != ContactKind::Trigger || contact.other != Tag::Hoop {
            return None;
        }

        let mut slots = Vec::with_capacity(self.effects.len());
        for (i, slot) in self.effects.iter_mut().enumerate() {
            match slot {
                Some(effect) => {
                    effect.play();
                    slots.push(i);
                }
                None => log::warn!("Particle effect slot {} is not set", i),
            }
        }

        events.emit(GameEvent::ParticlesStarted);
        Some(
            self.timers
                .schedule(now, self.duration, StopParticles { slots }),
        )
    }

    /// Stop effects whose timers are due. Returns how many timers fired.
    pub fn poll(&mut self, now: f64, events: &mut EventBus) -> usize {
        let due = self.timers.poll(now);
        for stop in &due {
            for &i in &stop.slots {
                if let Some(Some(effect)) = self.effects.get_mut(i) {
                    effect.stop();
                }
            }
            events.emit(GameEvent::ParticlesStopped);
        }
        due.len()
    }
}
