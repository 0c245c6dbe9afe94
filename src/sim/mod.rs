//! Gameplay simulation module
//!
//! All gameplay logic lives here. Host services (physics, AR tracking,
//! rendering, audio) are reached only through `crate::platform` traits:
//! - Single-threaded, driven by `Session::tick`
//! - Events delivered in emission order within the tick that produced them
//! - Timers keyed by the session's monotonic clock

pub mod events;
pub mod gesture;
pub mod hoop;
pub mod particles;
pub mod score;
pub mod session;
pub mod throw;
pub mod timer;

pub use events::{Contact, ContactKind, EventBus, GameEvent, ListenerId, Tag};
pub use gesture::GestureSample;
pub use hoop::HoopPlacement;
pub use particles::ParticleCue;
pub use score::ScoreTracker;
pub use session::{Session, TickInput, TouchEvent, TouchPhase};
pub use throw::{BallState, ThrowController};
pub use timer::{Scheduler, TimerId};
