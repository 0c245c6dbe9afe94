//! Score and throw bookkeeping

use super::events::{Contact, ContactKind, EventBus, GameEvent, Tag};
use crate::audio::AudioCue;
use crate::platform::TextSurface;

/// Score/throw counters and the HUD label showing the score
pub struct ScoreTracker {
    score: i32,
    throws: u32,
    text: Box<dyn TextSurface>,
}

impl ScoreTracker {
    /// Create the tracker and render the initial score
    pub fn new(text: Box<dyn TextSurface>) -> Self {
        let mut tracker = Self {
            score: 0,
            throws: 0,
            text,
        };
        tracker.render();
        tracker
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    /// Respawns seen so far, including the initial spawn
    pub fn throws(&self) -> u32 {
        self.throws
    }

    /// Count a respawn. Every respawn counts, whether or not a throw preceded it.
    pub fn on_respawn(&mut self) {
        self.throws += 1;
    }

    /// Score trigger contacts: through the hoop +1, onto the ground -1
    pub fn on_contact(&mut self, contact: &Contact, events: &mut EventBus) {
        if contact.kind != ContactKind::Trigger {
            return;
        }
        match contact.other {
            Tag::Hoop => {
                self.score += 1;
                events.emit(GameEvent::AudioRequested(AudioCue::Score));
            }
            Tag::Ground => self.score -= 1,
            _ => return,
        }
        log::debug!("Score now {}", self.score);
        self.render();
        events.emit(GameEvent::ScoreChanged { score: self.score });
    }

    fn render(&mut self) {
        let label = format!("Score: {}", self.score);
        self.text.set_text(&label);
    }
}
