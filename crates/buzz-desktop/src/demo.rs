//! Scripted playlists used by the headless mode and the TUI

use std::thread;
use std::time::Duration;

use buzz_core::encode::pitch::frequency;
use buzz_core::encode::tabs::DEFAULT_UNIT_LENGTH;
use buzz_core::encode::{
    MorseStyle, Tune, TuneStyle, tabs_to_notes, text_to_morse_notes, text_to_tunetalk_tabs,
};
use buzz_core::{Buzzer, Note, Transport};

/// "Memory", Undertale (Toby Fox)
pub const MEMORY_TABS: &str = "S_ G4 D5 C5 G4 B4- B4 C5- G4 C5 G4 B4- B4 C5- G4 D5 C5 G4 B4- B4 C5- G4 C5 E5 D5- C5 D5-";

/// Four notes at rising volume, one second each
pub fn warm_up() -> anyhow::Result<Vec<Note>> {
    Ok(vec![
        Note::try_new(frequency("C4")?, 1, 1000)?,
        Note::try_new(frequency("D2")?, 2, 1000)?,
        Note::try_new(frequency("F3")?, 3, 1000)?,
        Note::try_new(frequency("G5")?, 4, 1000)?,
    ])
}

pub fn pause() -> anyhow::Result<Vec<Note>> {
    Ok(tabs_to_notes("S_", 4, 150)?)
}

pub fn morse(text: &str) -> anyhow::Result<Vec<Note>> {
    let dot = Note::try_new(frequency("E5")?, 4, 50)?;
    Ok(text_to_morse_notes(text, &MorseStyle::new(dot)))
}

pub fn memory() -> anyhow::Result<Vec<Note>> {
    Ok(tabs_to_notes(MEMORY_TABS, 3, DEFAULT_UNIT_LENGTH)?)
}

pub fn tunetalk(text: &str) -> anyhow::Result<Vec<Note>> {
    let tabs = text_to_tunetalk_tabs(text, 4)?;
    Ok(tabs_to_notes(&tabs, 3, 180)?)
}

pub fn tune(tune: Tune) -> anyhow::Result<Vec<Note>> {
    Ok(tune.notes(&TuneStyle::default())?)
}

/// Everything after the warm-up, queued back to back
pub fn showcase() -> anyhow::Result<Vec<Note>> {
    let mut notes = Vec::new();
    notes.extend(morse("Hello World")?);
    notes.extend(pause()?);
    notes.extend(memory()?);
    notes.extend(pause()?);
    notes.extend(tunetalk("Hello World")?);
    notes.extend(pause()?);
    notes.extend(tune(Tune::Siren)?);
    Ok(notes)
}

/// Play the warm-up, cut it short after three notes, then the showcase
pub fn run<T: Transport>(buzzer: &Buzzer<T>) -> anyhow::Result<()> {
    let showcase = showcase()?;

    log::info!("Demo: warm-up");
    buzzer.append(warm_up()?);
    thread::sleep(Duration::from_millis(2400));

    log::info!("Demo: replacing warm-up, {} showcase notes queued", showcase.len());
    buzzer.replace(pause()?);
    buzzer.append(showcase);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlists_encode() {
        assert_eq!(warm_up().unwrap().len(), 4);
        assert_eq!(pause().unwrap(), vec![Note::new(0, 4, 600)]);
        assert_eq!(memory().unwrap().len(), 27);
        assert!(!showcase().unwrap().is_empty());
    }
}
