//! Playback subsystem
//!
//! Locates external players, runs them as a fallback chain, serializes
//! background requests through a queue and estimates clip durations.

pub mod chain;
pub mod duration;
pub mod locator;
pub mod players;
pub mod queue;
pub mod types;

pub use chain::{ChainReport, Playback, PlayerChain};
pub use duration::DurationEstimator;
pub use locator::BinaryLocator;
pub use players::{HostOs, Player, PlayerSpec};
pub use queue::PlaybackQueue;
pub use types::{PlayTarget, PlaybackEvent, PlaybackOutcome};
