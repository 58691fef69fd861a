//! Note sequencing for I2C buzzers
//!
//! Queue notes on a [`Buzzer`] and they are played back in order on a
//! background worker, with the queue open to appends and replacement at any
//! time. The [`encode`] module turns text, tab notation and canned tunes into
//! notes.

pub mod config;
pub mod encode;
pub mod error;
pub mod note;
pub mod player;
pub mod queue;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::BuzzerConfig;
pub use error::{Error, Result};
pub use note::Note;
pub use player::{Buzzer, SchedulerState};
pub use queue::PlaybackQueue;
pub use transport::{I2cTransport, NoteCommand, Transport};
