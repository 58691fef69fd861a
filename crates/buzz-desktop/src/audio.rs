//! Audible output for the simulated buzzer, through the default sound card

use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamHandle, Source};

use crate::device::ToneSink;

const SAMPLE_RATE: u32 = 48000;

/// Peak amplitude per volume step
const AMPLITUDE_STEP: f32 = 0.05;

// Square wave generator
struct SquareWave {
    frequency: f32,
    amplitude: f32,
    num_samples: usize,
    current_sample: usize,
}

impl SquareWave {
    fn new(frequency: f32, amplitude: f32, duration: Duration) -> Self {
        Self {
            frequency,
            amplitude,
            num_samples: (duration.as_secs_f32() * SAMPLE_RATE as f32) as usize,
            current_sample: 0,
        }
    }
}

impl Iterator for SquareWave {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_sample >= self.num_samples {
            return None;
        }

        let t = self.current_sample as f32 / SAMPLE_RATE as f32;
        let phase = (t * self.frequency) % 1.0;
        self.current_sample += 1;

        // high for the first half of the cycle
        Some(if phase < 0.5 { self.amplitude } else { -self.amplitude })
    }
}

impl Source for SquareWave {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.num_samples - self.current_sample)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(
            self.num_samples as f32 / SAMPLE_RATE as f32,
        ))
    }
}

struct ToneCommand {
    frequency_hz: u16,
    volume: u8,
    duration_ms: u16,
}

/// Plays tones on a dedicated audio thread
pub struct SpeakerSink {
    command_tx: Sender<ToneCommand>,
}

impl SpeakerSink {
    pub fn new() -> Self {
        let (tx, rx) = channel::<ToneCommand>();

        thread::spawn(move || {
            audio_thread(rx);
        });

        Self { command_tx: tx }
    }
}

impl ToneSink for SpeakerSink {
    fn tone(&self, frequency_hz: u16, volume: u8, duration_ms: u16) {
        // the audio thread may have failed to open a device; stay silent then
        let _ = self.command_tx.send(ToneCommand {
            frequency_hz,
            volume,
            duration_ms,
        });
    }
}

fn audio_thread(rx: Receiver<ToneCommand>) {
    let Ok((_stream, stream_handle)) = OutputStream::try_default() else {
        log::error!("Failed to open audio output, buzzer will be silent");
        return;
    };

    while let Ok(cmd) = rx.recv() {
        play_tone(&stream_handle, &cmd);
    }
}

fn play_tone(stream_handle: &OutputStreamHandle, cmd: &ToneCommand) {
    let source = SquareWave::new(
        f32::from(cmd.frequency_hz),
        AMPLITUDE_STEP * f32::from(cmd.volume),
        Duration::from_millis(u64::from(cmd.duration_ms)),
    );

    // non-blocking; the device itself is fire-and-forget too
    if let Err(e) = stream_handle.play_raw(source.convert_samples()) {
        log::warn!("Failed to play tone: {}", e);
    }
}
