//! Simulated Qwiic buzzer on a fake I2C bus
//!
//! Implements the `embedded-hal` I2C trait so the real `I2cTransport` can be
//! exercised on the desktop. Decoded note commands update a shared status
//! block (shown by the TUI) and are forwarded to an optional tone sink.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use buzz_core::NoteCommand;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

/// Something that can make a sound for a while
pub trait ToneSink: Send {
    fn tone(&self, frequency_hz: u16, volume: u8, duration_ms: u16);
}

/// What the simulated device is doing right now
#[derive(Clone, Debug, Default)]
pub struct DeviceStatus {
    pub frequency: u16,
    pub volume: u8,
    pub duration_ms: u16,
    pub sounding_until: Option<Instant>,
    pub notes_received: u64,
    pub bus_errors: u64,
}

impl DeviceStatus {
    pub fn is_sounding(&self) -> bool {
        self.frequency != 0
            && self.volume != 0
            && self.sounding_until.is_some_and(|t| Instant::now() < t)
    }
}

pub struct SimulatedBuzzer {
    address: u8,
    register: u8,
    status: Arc<Mutex<DeviceStatus>>,
    sink: Option<Box<dyn ToneSink>>,
}

impl SimulatedBuzzer {
    pub fn new(address: u8, register: u8) -> Self {
        Self {
            address,
            register,
            status: Arc::new(Mutex::new(DeviceStatus::default())),
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn ToneSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Shared handle to the device status
    pub fn status(&self) -> Arc<Mutex<DeviceStatus>> {
        Arc::clone(&self.status)
    }

    fn handle_write(&mut self, bytes: &[u8]) -> Result<(), ErrorKind> {
        let Some((&register, payload)) = bytes.split_first() else {
            return Ok(());
        };
        if register != self.register {
            log::debug!("Simulated buzzer: ignoring write to register 0x{:02X}", register);
            return Ok(());
        }

        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(command) = NoteCommand::from_frame(payload) else {
            status.bus_errors += 1;
            log::warn!("Simulated buzzer: malformed note frame {:02X?}", payload);
            return Err(ErrorKind::Other);
        };

        status.frequency = command.frequency;
        status.volume = command.volume;
        status.duration_ms = command.duration;
        status.sounding_until =
            Some(Instant::now() + Duration::from_millis(u64::from(command.duration)));
        status.notes_received += 1;
        drop(status);

        log::debug!(
            "Buzzer: {}Hz vol {} for {}ms",
            command.frequency,
            command.volume,
            command.duration
        );
        if let Some(sink) = &self.sink {
            if command.frequency != 0 && command.volume != 0 {
                sink.tone(command.frequency, command.volume, command.duration);
            }
        }
        Ok(())
    }
}

impl ErrorType for SimulatedBuzzer {
    type Error = ErrorKind;
}

impl I2c for SimulatedBuzzer {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            self.status
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .bus_errors += 1;
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => self.handle_write(bytes)?,
                Operation::Read(buf) => buf.fill(0),
            }
        }
        Ok(())
    }
}
