//! Tab notation parser
//!
//! A tab string is a list of space-separated tokens. Each token is a pitch
//! name (see [`super::pitch`]) optionally followed by one length modifier:
//!
//! | suffix | length          |
//! |--------|-----------------|
//! | `!`    | 1/8 unit        |
//! | `:`    | 1/4 unit        |
//! | `;`    | 1/3 unit        |
//! | `.`    | 1/2 unit        |
//! | none   | 1 unit          |
//! | `*`    | 1.5 units       |
//! | `-`    | 2 units         |
//! | `~`    | 3 units         |
//! | `_`    | 4 units         |
//!
//! `"C4- D4"` is a C4 lasting two units followed by a D4 lasting one.

use crate::encode::pitch;
use crate::error::{Error, Result};
use crate::note::{Note, check_volume};

/// Default length of a one-unit note, in milliseconds
pub const DEFAULT_UNIT_LENGTH: u16 = 400;

/// Note length relative to the unit length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Eighth,
    Quarter,
    Third,
    Half,
    Unit,
    OneAndHalf,
    Double,
    Triple,
    Quadruple,
}

impl Length {
    pub fn from_suffix(c: char) -> Option<Self> {
        match c {
            '!' => Some(Length::Eighth),
            ':' => Some(Length::Quarter),
            ';' => Some(Length::Third),
            '.' => Some(Length::Half),
            '*' => Some(Length::OneAndHalf),
            '-' => Some(Length::Double),
            '~' => Some(Length::Triple),
            '_' => Some(Length::Quadruple),
            _ => None,
        }
    }

    /// Length in milliseconds for a given unit, rounded down
    pub fn millis(&self, unit_length: u16) -> u16 {
        let unit = u32::from(unit_length);
        let ms = match self {
            Length::Eighth => unit / 8,
            Length::Quarter => unit / 4,
            Length::Third => unit / 3,
            Length::Half => unit / 2,
            Length::Unit => unit,
            Length::OneAndHalf => unit * 3 / 2,
            Length::Double => unit * 2,
            Length::Triple => unit * 3,
            Length::Quadruple => unit * 4,
        };
        ms.min(u32::from(u16::MAX)) as u16
    }
}

/// Split one token into its pitch name and length
fn parse_token(token: &str) -> Result<(&str, Length)> {
    let Some(last) = token.chars().last() else {
        return Err(Error::MalformedTabToken(token.to_string()));
    };

    let (name, length) = match Length::from_suffix(last) {
        Some(length) => (&token[..token.len() - last.len_utf8()], length),
        None => (token, Length::Unit),
    };

    if name.is_empty() {
        return Err(Error::MalformedTabToken(token.to_string()));
    }
    Ok((name, length))
}

/// Convert a tab string into notes
///
/// Fails on the first empty token, bare modifier or unknown pitch name;
/// nothing is returned for a partially valid string.
pub fn tabs_to_notes(tabs: &str, volume: u8, unit_length: u16) -> Result<Vec<Note>> {
    let volume = check_volume(volume)?;
    let tabs = tabs.trim();
    if tabs.is_empty() {
        return Ok(Vec::new());
    }

    tabs.split(' ')
        .map(|token| {
            let (name, length) = parse_token(token)?;
            let frequency = pitch::frequency(name)?;
            Ok(Note::new(frequency, volume, length.millis(unit_length)))
        })
        .collect()
}
