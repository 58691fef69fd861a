use std::sync::Arc;
use std::time::Duration;

use buzz_core::{Buzzer, BuzzerConfig, I2cTransport};

#[cfg(feature = "audio")]
mod audio;
mod demo;
mod device;
mod log_capture;
mod tui;

use device::SimulatedBuzzer;

struct Options {
    headless: bool,
    audio: bool,
}

impl Options {
    fn from_args() -> anyhow::Result<Self> {
        let mut options = Options {
            headless: false,
            audio: false,
        };
        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--headless" => options.headless = true,
                "--audio" => options.audio = true,
                other => {
                    anyhow::bail!("unknown argument `{}` (expected --headless or --audio)", other)
                }
            }
        }
        Ok(options)
    }
}

fn build_device(config: &BuzzerConfig, audio: bool) -> anyhow::Result<SimulatedBuzzer> {
    let device = SimulatedBuzzer::new(config.address, config.register);
    if audio {
        attach_speaker(device)
    } else {
        Ok(device)
    }
}

#[cfg(feature = "audio")]
fn attach_speaker(device: SimulatedBuzzer) -> anyhow::Result<SimulatedBuzzer> {
    Ok(device.with_sink(Box::new(audio::SpeakerSink::new())))
}

#[cfg(not(feature = "audio"))]
fn attach_speaker(_device: SimulatedBuzzer) -> anyhow::Result<SimulatedBuzzer> {
    anyhow::bail!("--audio needs a build with the `audio` feature")
}

fn main() -> anyhow::Result<()> {
    let options = Options::from_args()?;
    let config = BuzzerConfig::default();

    // logger first, so the player's start-up message is captured
    let tui_logs = if options.headless {
        log_capture::init(log::LevelFilter::Debug);
        None
    } else {
        Some(tui::init_logger())
    };

    let device = build_device(&config, options.audio)?;
    let status = device.status();
    let buzzer = Arc::new(Buzzer::with_config(
        I2cTransport::from_config(device, &config),
        config,
    ));

    match tui_logs {
        None => {
            demo::run(&buzzer)?;
            let finished = buzzer.wait_idle(Duration::from_secs(120));
            if let Some(e) = buzzer.take_error() {
                return Err(e.into());
            }
            if !finished {
                anyhow::bail!("playback did not finish in time");
            }
            log::info!("Demo finished");
        }
        Some(rx) => tui::run(buzzer, status, rx)?,
    }

    Ok(())
}
