//! Device transport - how a note reaches the buzzer hardware
//!
//! The player only needs one capability from the hardware side: program a
//! single note into the device and start it. [`Transport`] is that seam;
//! [`I2cTransport`] implements it over any `embedded-hal` 1.0 I2C bus.

use embedded_hal::i2c::{Error as _, I2c};

use crate::config::BuzzerConfig;
use crate::error::{Error, Result};
use crate::note::Note;

/// Trailing command byte telling the device to start playing right away
pub const PLAY_NOW: u8 = 0x01;

/// Length of an encoded note command frame
pub const FRAME_LEN: usize = 6;

/// A note as sent to the device, with the duration already trimmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteCommand {
    pub frequency: u16,
    pub volume: u8,
    pub duration: u16,
}

impl NoteCommand {
    /// Build the command for `note`, trimming its duration per `config`
    pub fn for_note(note: &Note, config: &BuzzerConfig) -> Self {
        Self {
            frequency: note.frequency(),
            volume: note.volume(),
            duration: config.dispatch_duration(note.duration()),
        }
    }

    /// Encode as `freq_hi freq_lo volume dur_hi dur_lo PLAY_NOW`
    pub fn to_frame(&self) -> [u8; FRAME_LEN] {
        let [f_hi, f_lo] = self.frequency.to_be_bytes();
        let [d_hi, d_lo] = self.duration.to_be_bytes();
        [f_hi, f_lo, self.volume, d_hi, d_lo, PLAY_NOW]
    }

    /// Decode a frame produced by [`NoteCommand::to_frame`]
    ///
    /// Returns `None` if the frame is short or does not end in the play byte.
    pub fn from_frame(frame: &[u8]) -> Option<Self> {
        match frame {
            [f_hi, f_lo, volume, d_hi, d_lo, PLAY_NOW] => Some(Self {
                frequency: u16::from_be_bytes([*f_hi, *f_lo]),
                volume: *volume,
                duration: u16::from_be_bytes([*d_hi, *d_lo]),
            }),
            _ => None,
        }
    }
}

/// Platform-agnostic buzzer transport
///
/// Fire-and-forget: the device's response (if any) is not interpreted.
pub trait Transport: Send + 'static {
    fn transmit(&mut self, command: &NoteCommand) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn transmit(&mut self, command: &NoteCommand) -> Result<()> {
        (**self).transmit(command)
    }
}

/// Qwiic buzzer driver over an `embedded-hal` I2C bus
///
/// Each note is a single register write: the register address followed by
/// the six-byte note frame.
pub struct I2cTransport<I> {
    i2c: I,
    address: u8,
    register: u8,
}

impl<I: I2c> I2cTransport<I> {
    pub fn new(i2c: I, address: u8, register: u8) -> Self {
        Self {
            i2c,
            address,
            register,
        }
    }

    /// Create with the address and register from `config`
    pub fn from_config(i2c: I, config: &BuzzerConfig) -> Self {
        Self::new(i2c, config.address, config.register)
    }
}

impl<I> Transport for I2cTransport<I>
where
    I: I2c + Send + 'static,
{
    fn transmit(&mut self, command: &NoteCommand) -> Result<()> {
        let mut buf = [0u8; FRAME_LEN + 1];
        buf[0] = self.register;
        buf[1..].copy_from_slice(&command.to_frame());

        self.i2c.write(self.address, &buf).map_err(|e| {
            Error::TransportFailure(format!(
                "write to 0x{:02X} failed: {:?}",
                self.address,
                e.kind()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    #[test]
    fn test_frame_layout() {
        let command = NoteCommand {
            frequency: 440,
            volume: 3,
            duration: 990,
        };
        assert_eq!(command.to_frame(), [0x01, 0xB8, 0x03, 0x03, 0xDE, PLAY_NOW]);
        assert_eq!(NoteCommand::from_frame(&command.to_frame()), Some(command));
    }

    #[test]
    fn test_from_frame_rejects_missing_play_byte() {
        assert_eq!(NoteCommand::from_frame(&[0, 0, 0, 0, 0, 0]), None);
        assert_eq!(NoteCommand::from_frame(&[0x01, 0xB8, 3]), None);
    }

    #[test]
    fn test_command_trims_duration() {
        let command = NoteCommand::for_note(&Note::new(262, 2, 800), &BuzzerConfig::default());
        assert_eq!(command.frequency, 262);
        assert_eq!(command.volume, 2);
        assert_eq!(command.duration, 792);
    }

    #[test]
    fn test_i2c_write_goes_to_note_register() {
        let expectations = [Transaction::write(
            0x34,
            vec![0x03, 0x01, 0x06, 0x02, 0x03, 0x18, PLAY_NOW],
        )];
        let mut i2c = I2cMock::new(&expectations);

        let mut transport = I2cTransport::from_config(i2c.clone(), &BuzzerConfig::default());
        transport
            .transmit(&NoteCommand {
                frequency: 262,
                volume: 2,
                duration: 792,
            })
            .unwrap();

        i2c.done();
    }

    #[test]
    fn test_i2c_error_becomes_transport_failure() {
        let expectations = [Transaction::write(0x40, vec![0x03, 0, 0, 0, 0, 10, PLAY_NOW])
            .with_error(ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expectations);

        let mut transport = I2cTransport::new(i2c.clone(), 0x40, 0x03);
        let err = transport
            .transmit(&NoteCommand {
                frequency: 0,
                volume: 0,
                duration: 10,
            })
            .unwrap_err();
        assert!(matches!(err, Error::TransportFailure(_)));

        i2c.done();
    }
}
