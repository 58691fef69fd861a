//! Canned feedback tunes

use core::fmt;
use core::str::FromStr;

use crate::encode::pitch::{A4, C3, C5, D4, DS4, E4, E5, F4, F5, FS5};
use crate::error::Result;
use crate::note::{DEFAULT_VOLUME, Note, check_volume};

/// Scaling applied when rendering a tune
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuneStyle {
    /// Multiplies every frequency
    pub freq_scaling: f64,
    pub volume: u8,
    /// Multiplies every duration
    pub duration_scaling: f64,
}

impl Default for TuneStyle {
    fn default() -> Self {
        Self {
            freq_scaling: 1.0,
            volume: DEFAULT_VOLUME,
            duration_scaling: 1.0,
        }
    }
}

impl TuneStyle {
    pub fn with_volume(mut self, volume: u8) -> Self {
        self.volume = volume;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tune {
    Yes,
    No,
    Wrong,
    Victory,
    Laugh,
    Sad,
    Siren,
}

const YES: &[(u16, u16)] = &[(C5, 150), (E5, 250)];
const NO: &[(u16, u16)] = &[(C5, 200), (A4, 300)];
const WRONG: &[(u16, u16)] = &[(C3, 800)];
const VICTORY: &[(u16, u16)] = &[(C5, 150), (E5, 150), (C5, 150), (F5, 300)];
#[rustfmt::skip]
const LAUGH: &[(u16, u16)] = &[
    (F5, 100), (E5, 200), (F5, 100), (E5, 200),
    (F5, 100), (E5, 200), (F5, 100), (E5, 200),
];
const SAD: &[(u16, u16)] = &[(F4, 400), (E4, 400), (DS4, 400), (D4, 400)];
#[rustfmt::skip]
const SIREN: &[(u16, u16)] = &[
    (FS5, 400), (C5, 400), (FS5, 400), (C5, 400),
    (FS5, 400), (C5, 400), (FS5, 400), (C5, 400),
];

impl Tune {
    pub const ALL: [Tune; 7] = [
        Tune::Yes,
        Tune::No,
        Tune::Wrong,
        Tune::Victory,
        Tune::Laugh,
        Tune::Sad,
        Tune::Siren,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tune::Yes => "yes",
            Tune::No => "no",
            Tune::Wrong => "wrong",
            Tune::Victory => "victory",
            Tune::Laugh => "laugh",
            Tune::Sad => "sad",
            Tune::Siren => "siren",
        }
    }

    fn score(&self) -> &'static [(u16, u16)] {
        match self {
            Tune::Yes => YES,
            Tune::No => NO,
            Tune::Wrong => WRONG,
            Tune::Victory => VICTORY,
            Tune::Laugh => LAUGH,
            Tune::Sad => SAD,
            Tune::Siren => SIREN,
        }
    }

    /// Render the tune with the given scaling
    ///
    /// Scaled values are truncated toward zero and saturate at `u16::MAX`.
    pub fn notes(&self, style: &TuneStyle) -> Result<Vec<Note>> {
        let volume = check_volume(style.volume)?;
        Ok(self
            .score()
            .iter()
            .map(|&(frequency, duration)| {
                Note::new(
                    scale(frequency, style.freq_scaling),
                    volume,
                    scale(duration, style.duration_scaling),
                )
            })
            .collect())
    }
}

// float to int `as` casts truncate and saturate, NaN becomes 0
fn scale(value: u16, factor: f64) -> u16 {
    (f64::from(value) * factor) as u16
}

impl fmt::Display for Tune {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tune {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Tune::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tune `{}`", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_yes_default_style() {
        let notes = Tune::Yes.notes(&TuneStyle::default()).unwrap();
        assert_eq!(notes, vec![Note::new(523, 3, 150), Note::new(659, 3, 250)]);
    }

    #[test]
    fn test_scaling_truncates() {
        let style = TuneStyle {
            freq_scaling: 1.5,
            volume: 1,
            duration_scaling: 0.5,
        };
        let notes = Tune::Wrong.notes(&style).unwrap();
        assert_eq!(notes, vec![Note::new(196, 1, 400)]);
    }

    #[test]
    fn test_scaled_duration_matches_decimal_product() {
        // 800 * 0.29 is 231.99..., single precision rounds it up to 232
        let style = TuneStyle {
            freq_scaling: 1.0,
            volume: 3,
            duration_scaling: 0.29,
        };
        assert_eq!(Tune::Wrong.notes(&style).unwrap()[0].duration(), 231);

        let style = TuneStyle {
            duration_scaling: 0.21,
            ..TuneStyle::default()
        };
        let notes = Tune::No.notes(&style).unwrap();
        assert_eq!(notes[1].duration(), (300.0f64 * 0.21) as u16);
    }

    #[test]
    fn test_lengths() {
        let style = TuneStyle::default();
        let lengths: Vec<usize> = Tune::ALL
            .iter()
            .map(|t| t.notes(&style).unwrap().len())
            .collect();
        assert_eq!(lengths, vec![2, 2, 1, 4, 8, 4, 8]);
    }

    #[test]
    fn test_bad_volume() {
        let style = TuneStyle::default().with_volume(7);
        assert!(matches!(Tune::Sad.notes(&style), Err(Error::InvalidVolume(7))));
    }

    #[test]
    fn test_parse_names() {
        for tune in Tune::ALL {
            assert_eq!(tune.to_string().parse::<Tune>(), Ok(tune));
        }
        assert_eq!("SIREN".parse::<Tune>(), Ok(Tune::Siren));
        assert!("polka".parse::<Tune>().is_err());
    }
}
