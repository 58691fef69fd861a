//! Note - the unit of playback
//!
//! A note is a (frequency, volume, duration) triple. Frequency 0 is silence.

use crate::error::{Error, Result};

/// Loudest volume step the buzzer accepts
pub const MAX_VOLUME: u8 = 4;

/// Volume used when a caller does not pick one
pub const DEFAULT_VOLUME: u8 = 3;

/// Frequency value that makes the buzzer stay silent
pub const SILENCE: u16 = 0;

/// One tone (or rest) to be played by the buzzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note {
    frequency: u16,
    volume: u8,
    duration: u16,
}

impl Note {
    /// Create a note, clamping `volume` to [`MAX_VOLUME`]
    ///
    /// A louder request silently plays at `MAX_VOLUME`; use
    /// [`Note::try_new`] to get an error instead.
    pub const fn new(frequency: u16, volume: u8, duration: u16) -> Self {
        let volume = if volume > MAX_VOLUME { MAX_VOLUME } else { volume };
        Self {
            frequency,
            volume,
            duration,
        }
    }

    /// Create a note, rejecting volumes the device does not support
    pub fn try_new(frequency: u16, volume: u8, duration: u16) -> Result<Self> {
        if volume > MAX_VOLUME {
            return Err(Error::InvalidVolume(volume));
        }
        Ok(Self::new(frequency, volume, duration))
    }

    /// A silent note lasting `duration` milliseconds
    pub const fn rest(duration: u16) -> Self {
        Self::new(SILENCE, 0, duration)
    }

    /// Frequency in Hz
    pub fn frequency(&self) -> u16 {
        self.frequency
    }

    /// Volume step, 0 (quiet) to 4 (loud)
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Duration in milliseconds
    pub fn duration(&self) -> u16 {
        self.duration
    }

    pub fn is_rest(&self) -> bool {
        self.frequency == SILENCE
    }

    /// Same pitch and volume, different length
    pub fn with_duration(self, duration: u16) -> Self {
        Self { duration, ..self }
    }
}

/// `(frequency, volume, duration)`, with the volume clamped as in [`Note::new`]
impl From<(u16, u8, u16)> for Note {
    fn from((frequency, volume, duration): (u16, u8, u16)) -> Self {
        Self::new(frequency, volume, duration)
    }
}

/// Validate a volume parameter passed to an encoder
pub(crate) fn check_volume(volume: u8) -> Result<u8> {
    if volume > MAX_VOLUME {
        Err(Error::InvalidVolume(volume))
    } else {
        Ok(volume)
    }
}
