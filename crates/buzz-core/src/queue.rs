//! Playback queue - FIFO of notes not yet sent to the device

use std::collections::VecDeque;

use crate::note::Note;

/// Ordered, unbounded sequence of pending notes
///
/// Insertion order is play order. Not synchronised on its own; the player
/// keeps it behind its state lock.
#[derive(Debug, Default, Clone)]
pub struct PlaybackQueue {
    notes: VecDeque<Note>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add notes at the tail
    pub fn append<I>(&mut self, notes: I)
    where
        I: IntoIterator<Item = Note>,
    {
        self.notes.extend(notes);
    }

    /// Drop every pending note and install `notes` as the whole queue
    ///
    /// Returns how many pending notes were discarded.
    pub fn replace<I>(&mut self, notes: I) -> usize
    where
        I: IntoIterator<Item = Note>,
    {
        let discarded = self.notes.len();
        self.notes.clear();
        self.notes.extend(notes);
        discarded
    }

    /// Remove and return the earliest note
    pub fn pop_front(&mut self) -> Option<Note> {
        self.notes.pop_front()
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Total nominal duration of the pending notes, in milliseconds
    pub fn total_duration_ms(&self) -> u64 {
        self.notes.iter().map(|n| u64::from(n.duration())).sum()
    }
}
