//! Test doubles for the player

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::transport::{NoteCommand, Transport};

#[derive(Debug, Clone, Copy)]
pub struct Sent {
    pub command: NoteCommand,
    pub at: Instant,
}

/// Records every command together with the moment it was transmitted
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<Sent>>>,
    calls: Arc<Mutex<usize>>,
    fail_on_call: Option<usize>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `call`-th transmit (1-based), succeed on every other one
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn frequencies(&self) -> Vec<u16> {
        self.sent().iter().map(|s| s.command.frequency).collect()
    }
}

impl Transport for RecordingTransport {
    fn transmit(&mut self, command: &NoteCommand) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if self.fail_on_call == Some(*calls) {
            return Err(Error::TransportFailure("simulated bus NACK".into()));
        }
        self.sent.lock().unwrap().push(Sent {
            command: *command,
            at: Instant::now(),
        });
        Ok(())
    }
}
