//! Buzzer player - queue plus playback scheduler
//!
//! A [`Buzzer`] owns a transport and a [`PlaybackQueue`]. Playback runs on a
//! worker thread that is started on demand and retires itself once the queue
//! is empty:
//!
//! - `append` on an idle buzzer starts a worker, otherwise only extends the queue
//! - `replace` cancels the running worker and starts a new one
//! - the worker pops a note, transmits it, then waits out the note's duration
//!
//! All state lives behind one mutex. The worker only sleeps inside
//! `Condvar::wait_timeout_while`, which releases the lock, so producers are
//! never held up by a playing note. Transmission happens with the lock held:
//! once `replace` returns, nothing from the old queue can reach the device.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use crate::config::BuzzerConfig;
use crate::error::Error;
use crate::note::Note;
use crate::queue::PlaybackQueue;
use crate::transport::{NoteCommand, Transport};

/// Whether a playback worker is alive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No worker; the queue is empty
    Idle,
    /// A worker is pulling and playing notes
    Draining,
}

struct State<T> {
    queue: PlaybackQueue,
    transport: T,
    scheduler: SchedulerState,
    /// Id of the live worker. Bumped on every start and cancel; a worker
    /// whose id no longer matches has been cancelled and must exit.
    generation: u64,
    last_error: Option<Error>,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    /// Interrupts a worker's post-transmit wait on cancellation
    wake: Condvar,
    /// Signalled whenever the scheduler returns to idle
    idle: Condvar,
    config: BuzzerConfig,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Note player for one buzzer device
pub struct Buzzer<T: Transport> {
    shared: Arc<Shared<T>>,
}

impl<T: Transport> Buzzer<T> {
    /// Create a player with the default configuration
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, BuzzerConfig::default())
    }

    pub fn with_config(transport: T, config: BuzzerConfig) -> Self {
        log::info!("Buzzer player ready for device 0x{:02X}", config.address);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    queue: PlaybackQueue::new(),
                    transport,
                    scheduler: SchedulerState::Idle,
                    generation: 0,
                    last_error: None,
                }),
                wake: Condvar::new(),
                idle: Condvar::new(),
                config,
            }),
        }
    }

    pub fn config(&self) -> &BuzzerConfig {
        &self.shared.config
    }

    /// Append notes at the end of the playlist, starting playback if idle
    pub fn append<I>(&self, notes: I)
    where
        I: IntoIterator<Item = Note>,
    {
        let mut state = self.shared.lock();
        state.queue.append(notes);

        if state.scheduler == SchedulerState::Idle && !state.queue.is_empty() {
            start_worker(&self.shared, &mut state);
        }
    }

    /// Stop what is playing and play `notes` instead
    ///
    /// The current worker is cancelled in the middle of its wait. A note the
    /// device already received keeps sounding for at most its own duration.
    /// Replacing with an empty list stops playback without starting a worker.
    pub fn replace<I>(&self, notes: I)
    where
        I: IntoIterator<Item = Note>,
    {
        let mut state = self.shared.lock();
        let discarded = state.queue.replace(notes);

        if state.scheduler == SchedulerState::Draining {
            cancel_worker(&self.shared, &mut state);
            log::debug!("Playback replaced, {} pending note(s) discarded", discarded);
        }

        if !state.queue.is_empty() {
            start_worker(&self.shared, &mut state);
        }
    }

    /// Stop playback and forget every pending note
    pub fn stop(&self) {
        self.replace(core::iter::empty());
    }

    /// True while a playback worker is alive
    pub fn is_playing(&self) -> bool {
        self.state() == SchedulerState::Draining
    }

    pub fn state(&self) -> SchedulerState {
        self.shared.lock().scheduler
    }

    /// Number of notes waiting to be sent
    pub fn pending(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Playing time of the notes still queued, not counting the current one
    pub fn pending_duration(&self) -> Duration {
        Duration::from_millis(self.shared.lock().queue.total_duration_ms())
    }

    /// Block until playback is idle or `timeout` elapses
    ///
    /// Returns true if the player went idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let state = self.shared.lock();
        let (state, _) = self
            .shared
            .idle
            .wait_timeout_while(state, timeout, |s| s.scheduler == SchedulerState::Draining)
            .unwrap_or_else(PoisonError::into_inner);
        state.scheduler == SchedulerState::Idle
    }

    /// Take the error that ended the last worker, if any
    pub fn take_error(&self) -> Option<Error> {
        self.shared.lock().last_error.take()
    }
}

impl<T: Transport> Drop for Buzzer<T> {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.queue.clear();
        if state.scheduler == SchedulerState::Draining {
            cancel_worker(&self.shared, &mut state);
        }
    }
}

fn start_worker<T: Transport>(shared: &Arc<Shared<T>>, state: &mut State<T>) {
    state.generation = state.generation.wrapping_add(1);
    state.scheduler = SchedulerState::Draining;

    let generation = state.generation;
    let worker_shared = Arc::clone(shared);
    let spawned = thread::Builder::new()
        .name("buzzer-player".to_string())
        .spawn(move || run_worker(worker_shared, generation));

    if let Err(e) = spawned {
        log::error!("Failed to start playback thread: {}", e);
        state.scheduler = SchedulerState::Idle;
        state.last_error = Some(Error::SpawnFailed(e));
        shared.idle.notify_all();
    }
}

fn cancel_worker<T>(shared: &Shared<T>, state: &mut State<T>) {
    state.generation = state.generation.wrapping_add(1);
    state.scheduler = SchedulerState::Idle;
    shared.wake.notify_all();
    shared.idle.notify_all();
}

fn run_worker<T: Transport>(shared: Arc<Shared<T>>, generation: u64) {
    log::debug!("Player worker {} started", generation);

    let mut state = shared.lock();
    loop {
        if state.generation != generation {
            log::debug!("Player worker {} cancelled", generation);
            return;
        }

        // Emptiness check and retire happen under the same lock `append` takes
        let Some(note) = state.queue.pop_front() else {
            state.scheduler = SchedulerState::Idle;
            shared.idle.notify_all();
            log::debug!("Player worker {} finished, queue drained", generation);
            return;
        };

        let command = NoteCommand::for_note(&note, &shared.config);
        log::trace!(
            "Note: {}Hz vol {} for {}ms (sent {}ms)",
            command.frequency,
            command.volume,
            note.duration(),
            command.duration
        );

        if let Err(e) = state.transport.transmit(&command) {
            let dropped = state.queue.len();
            log::error!(
                "Buzzer 0x{:02X}: {} ({} pending note(s) dropped)",
                shared.config.address,
                e,
                dropped
            );
            state.queue.clear();
            state.scheduler = SchedulerState::Idle;
            state.last_error = Some(e);
            shared.idle.notify_all();
            return;
        }

        let wait = Duration::from_millis(u64::from(note.duration()));
        state = shared
            .wake
            .wait_timeout_while(state, wait, |s| s.generation == generation)
            .unwrap_or_else(PoisonError::into_inner)
            .0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use rand::{Rng, SeedableRng, rngs::SmallRng};
    use std::time::Instant;

    const LONG_WAIT: Duration = Duration::from_secs(10);

    fn tones(freqs: &[u16], duration: u16) -> Vec<Note> {
        freqs.iter().map(|&f| Note::new(f, 3, duration)).collect()
    }

    #[test]
    fn test_append_plays_in_order_with_trimmed_durations() {
        let transport = RecordingTransport::new();
        let buzzer = Buzzer::new(transport.clone());
        let notes = vec![
            Note::new(262, 1, 30),
            Note::new(294, 2, 20),
            Note::new(0, 0, 40),
            Note::new(392, 4, 100),
        ];

        buzzer.append(notes.clone());
        assert!(buzzer.wait_idle(LONG_WAIT));

        let sent = transport.sent();
        assert_eq!(sent.len(), notes.len());
        for (s, n) in sent.iter().zip(&notes) {
            assert_eq!(s.command.frequency, n.frequency());
            assert_eq!(s.command.volume, n.volume());
            assert_eq!(u32::from(s.command.duration), u32::from(n.duration()) * 99 / 100);
        }
        for (pair, n) in sent.windows(2).zip(&notes) {
            let gap = pair[1].at.duration_since(pair[0].at);
            assert!(
                gap >= Duration::from_millis(u64::from(n.duration())),
                "gap {:?} shorter than {}ms",
                gap,
                n.duration()
            );
        }
    }

    #[test]
    fn test_is_playing_lifecycle() {
        let transport = RecordingTransport::new();
        let buzzer = Buzzer::new(transport.clone());
        assert!(!buzzer.is_playing());

        buzzer.append(tones(&[440, 880], 20));
        assert!(buzzer.is_playing());

        assert!(buzzer.wait_idle(LONG_WAIT));
        assert!(!buzzer.is_playing());
        assert_eq!(buzzer.pending(), 0);

        buzzer.replace(tones(&[523], 20));
        assert!(buzzer.is_playing());
        assert!(buzzer.wait_idle(LONG_WAIT));
        assert_eq!(transport.frequencies(), vec![440, 880, 523]);
    }

    #[test]
    fn test_empty_append_and_replace_never_start_playback() {
        let transport = RecordingTransport::new();
        let buzzer = Buzzer::new(transport.clone());

        buzzer.append(Vec::new());
        assert!(!buzzer.is_playing());
        buzzer.replace(Vec::new());
        assert!(!buzzer.is_playing());

        thread::sleep(Duration::from_millis(20));
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_replace_empty_stops_immediately() {
        let transport = RecordingTransport::new();
        let buzzer = Buzzer::new(transport.clone());

        buzzer.append(tones(&[100, 200, 300], 200));
        thread::sleep(Duration::from_millis(30));
        assert_eq!(buzzer.pending_duration(), Duration::from_millis(400));
        buzzer.replace(Vec::new());
        assert!(!buzzer.is_playing());
        assert_eq!(buzzer.pending(), 0);
        assert_eq!(buzzer.pending_duration(), Duration::ZERO);

        thread::sleep(Duration::from_millis(300));
        assert_eq!(transport.frequencies(), vec![100]);
    }

    #[test]
    fn test_append_while_draining_reuses_worker() {
        let transport = RecordingTransport::new();
        let buzzer = Buzzer::new(transport.clone());

        buzzer.append(tones(&[1], 40));
        buzzer.append(tones(&[2, 3], 10));
        assert_eq!(buzzer.state(), SchedulerState::Draining);
        assert!(buzzer.pending_duration() <= Duration::from_millis(60));

        assert!(buzzer.wait_idle(LONG_WAIT));
        assert_eq!(transport.frequencies(), vec![1, 2, 3]);
    }

    #[test]
    fn test_replace_interrupts_wait_without_leaking_old_notes() {
        let transport = RecordingTransport::new();
        let buzzer = Buzzer::new(transport.clone());

        buzzer.append(tones(&[100, 101, 102], 300));
        thread::sleep(Duration::from_millis(50));
        buzzer.replace(tones(&[200, 201], 20));
        let replaced_at = Instant::now();

        assert!(buzzer.wait_idle(LONG_WAIT));
        let sent = transport.sent();
        assert_eq!(
            sent.iter().map(|s| s.command.frequency).collect::<Vec<_>>(),
            vec![100, 200, 201]
        );

        // the new worker did not wait for the old note to run out
        assert!(sent[1].at.duration_since(sent[0].at) < Duration::from_millis(300));
        for s in sent.iter().filter(|s| s.at > replaced_at) {
            assert!(s.command.frequency >= 200);
        }
    }

    #[test]
    fn test_repeated_replace_race() {
        let transport = RecordingTransport::new();
        let buzzer = Buzzer::new(transport.clone());
        let mut boundaries = Vec::new();

        for round in 0..50u16 {
            buzzer.append(tones(&[1000 + round, 1000 + round], 2));
            thread::sleep(Duration::from_micros(u64::from(round % 5) * 500));
            buzzer.replace(tones(&[3000 + round], 1));
            boundaries.push((round, Instant::now()));
        }
        assert!(buzzer.wait_idle(LONG_WAIT));

        let sent = transport.sent();
        for (round, replaced_at) in boundaries {
            let leaked = sent
                .iter()
                .filter(|s| s.at > replaced_at)
                .any(|s| s.command.frequency == 1000 + round);
            assert!(!leaked, "note from round {} sent after its replace", round);
        }
        assert_eq!(sent.last().map(|s| s.command.frequency), Some(3049));
    }

    #[test]
    fn test_append_racing_retire_drops_nothing() {
        let transport = RecordingTransport::new();
        let buzzer = Buzzer::new(transport.clone());

        for i in 0..300u16 {
            buzzer.append([Note::new(i, 1, 0)]);
            if i % 7 == 0 {
                thread::yield_now();
            }
        }
        assert!(buzzer.wait_idle(LONG_WAIT));

        assert_eq!(transport.frequencies(), (0..300).collect::<Vec<u16>>());
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        const PRODUCERS: u16 = 4;
        const BATCHES: u16 = 40;

        let transport = RecordingTransport::new();
        let buzzer = Buzzer::new(transport.clone());

        thread::scope(|scope| {
            for producer in 0..PRODUCERS {
                let buzzer = &buzzer;
                scope.spawn(move || {
                    let mut rng = SmallRng::seed_from_u64(2137 + u64::from(producer));
                    let mut seq = 0u16;
                    for _ in 0..BATCHES {
                        let batch_len = rng.random_range(1..4u16);
                        let batch: Vec<Note> = (0..batch_len)
                            .map(|k| {
                                Note::new(producer * 1000 + seq + k, 1, rng.random_range(0..2))
                            })
                            .collect();
                        seq += batch_len;
                        buzzer.append(batch);
                        thread::sleep(Duration::from_micros(rng.random_range(0..800)));
                    }
                });
            }
        });
        assert!(buzzer.wait_idle(LONG_WAIT));

        let sent = transport.frequencies();
        let mut sorted = sent.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), sent.len(), "a note was sent twice");

        for producer in 0..PRODUCERS {
            let own: Vec<u16> = sent
                .iter()
                .copied()
                .filter(|f| f / 1000 == producer)
                .collect();
            let expected: Vec<u16> = (0..own.len() as u16).map(|k| producer * 1000 + k).collect();
            assert_eq!(own, expected, "producer {} lost or reordered notes", producer);
            assert!(own.len() >= usize::from(BATCHES));
        }
    }

    #[test]
    fn test_transport_failure_ends_worker() {
        let transport = RecordingTransport::failing_on(2);
        let buzzer = Buzzer::new(transport.clone());

        buzzer.append(tones(&[1, 2, 3, 4], 10));
        assert!(buzzer.wait_idle(LONG_WAIT));

        assert!(!buzzer.is_playing());
        assert_eq!(buzzer.pending(), 0);
        assert_eq!(transport.frequencies(), vec![1]);
        assert!(matches!(buzzer.take_error(), Some(Error::TransportFailure(_))));
        assert!(buzzer.take_error().is_none());

        // the next append starts over on a fresh worker
        buzzer.append(tones(&[5], 10));
        assert!(buzzer.wait_idle(LONG_WAIT));
        assert_eq!(transport.frequencies(), vec![1, 5]);
    }

    #[test]
    fn test_drop_cancels_playback() {
        let transport = RecordingTransport::new();
        let buzzer = Buzzer::new(transport.clone());

        buzzer.append(tones(&[1, 2, 3], 100));
        thread::sleep(Duration::from_millis(20));
        drop(buzzer);

        thread::sleep(Duration::from_millis(250));
        assert_eq!(transport.frequencies(), vec![1]);
    }

    #[test]
    fn test_instances_are_independent() {
        let left = RecordingTransport::new();
        let right = RecordingTransport::new();
        let a = Buzzer::new(left.clone());
        let b = Buzzer::new(right.clone());

        a.append(tones(&[1, 2], 10));
        b.append(tones(&[7], 200));
        assert!(a.wait_idle(LONG_WAIT));
        assert!(b.is_playing());

        b.stop();
        assert!(!b.is_playing());
        assert!(a.wait_idle(Duration::ZERO));
        assert_eq!(left.frequencies(), vec![1, 2]);
        assert_eq!(right.frequencies(), vec![7]);
    }
}
