//! Audio cue dispatcher
//!
//! Maps symbolic cues to preloaded clips and asks the host to play them with a
//! little pitch variation so repeated hits don't sound identical.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{PITCH_MAX, PITCH_MIN};
use crate::platform::{AudioSink, ClipId};
use crate::settings::AudioSettings;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Ball bounces off anything but the hoop
    GroundPitch,
    /// Ball hits the hoop rim/backboard
    HoopHit,
    /// Ball went through the hoop
    Score,
}

impl AudioCue {
    pub const ALL: [AudioCue; 3] = [AudioCue::GroundPitch, AudioCue::HoopHit, AudioCue::Score];

    /// Fixed slot in the clip table
    pub fn clip_index(self) -> usize {
        match self {
            AudioCue::GroundPitch => 0,
            AudioCue::HoopHit => 1,
            AudioCue::Score => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioCue::GroundPitch => "ground-pitch",
            AudioCue::HoopHit => "hoop-hit",
            AudioCue::Score => "score",
        }
    }
}

/// Resolves cues to clips and forwards them to the host sink
pub struct AudioDispatcher {
    sink: Box<dyn AudioSink>,
    clips: Vec<ClipId>,
    rng: Pcg32,
    pitch_min: f32,
    pitch_max: f32,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl fmt::Debug for AudioDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioDispatcher")
            .field("clips", &self.clips)
            .field("pitch_min", &self.pitch_min)
            .field("pitch_max", &self.pitch_max)
            .field("master_volume", &self.master_volume)
            .field("sfx_volume", &self.sfx_volume)
            .field("muted", &self.muted)
            .finish_non_exhaustive()
    }
}

impl AudioDispatcher {
    /// Dispatcher with default volumes and pitch range
    pub fn new(sink: Box<dyn AudioSink>, clips: Vec<ClipId>, seed: u64) -> Self {
        Self {
            sink,
            clips,
            rng: Pcg32::seed_from_u64(seed),
            pitch_min: PITCH_MIN,
            pitch_max: PITCH_MAX,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn from_settings(sink: Box<dyn AudioSink>, settings: &AudioSettings, seed: u64) -> Self {
        let mut dispatcher = Self::new(sink, settings.clips.clone(), seed);
        dispatcher.set_pitch_range(settings.pitch_min, settings.pitch_max);
        dispatcher.set_master_volume(settings.master_volume);
        dispatcher.set_sfx_volume(settings.sfx_volume);
        dispatcher.set_muted(settings.muted);
        dispatcher
    }

    /// Set the random pitch range; a reversed range is swapped
    pub fn set_pitch_range(&mut self, min: f32, max: f32) {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.pitch_min = min.max(0.01);
        self.pitch_max = max.max(self.pitch_min);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    fn random_pitch(&mut self) -> f32 {
        if self.pitch_min >= self.pitch_max {
            return self.pitch_min;
        }
        self.rng.random_range(self.pitch_min..=self.pitch_max)
    }

    /// Play a cue. Returns the pitch used, or `None` if nothing was played.
    pub fn play(&mut self, cue: AudioCue) -> Option<f32> {
        let Some(&clip) = self.clips.get(cue.clip_index()) else {
            log::warn!(
                "No clip for audio cue {} (index {}, table has {})",
                cue.as_str(),
                cue.clip_index(),
                self.clips.len()
            );
            return None;
        };

        let vol = self.effective_volume();
        if vol <= 0.0 {
            return None;
        }

        let pitch = self.random_pitch();
        self.sink.play(clip, pitch, vol);
        Some(pitch)
    }
}

/// Process-wide audio service slot.
///
/// Constructed once at startup. The first registered dispatcher wins; later
/// registrations are rejected and handed back to the caller.
#[derive(Debug, Default)]
pub struct AudioService {
    dispatcher: Option<AudioDispatcher>,
}

impl AudioService {
    pub fn new() -> Self {
        Self { dispatcher: None }
    }

    /// Install the dispatcher unless one is already registered
    pub fn register(&mut self, dispatcher: AudioDispatcher) -> Result<(), AudioDispatcher> {
        if self.dispatcher.is_some() {
            log::warn!("Audio dispatcher already registered, rejecting duplicate");
            return Err(dispatcher);
        }
        log::info!("Audio dispatcher registered");
        self.dispatcher = Some(dispatcher);
        Ok(())
    }

    pub fn is_registered(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// Play a cue through the registered dispatcher, if any
    pub fn request(&mut self, cue: AudioCue) -> Option<f32> {
        match self.dispatcher.as_mut() {
            Some(dispatcher) => dispatcher.play(cue),
            None => {
                log::warn!("Audio cue {} requested with no dispatcher registered", cue.as_str());
                None
            }
        }
    }

    /// Tear down the registered dispatcher
    pub fn shutdown(&mut self) -> Option<AudioDispatcher> {
        let dispatcher = self.dispatcher.take();
        if dispatcher.is_some() {
            log::info!("Audio dispatcher shut down");
        }
        dispatcher
    }
}
