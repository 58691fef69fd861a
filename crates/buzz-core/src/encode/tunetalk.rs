//! Tunetalk - a tonal alphabet
//!
//! Each letter maps to notes within one octave: vowels are a single long
//! note, consonants two short ones. Letters are separated by a short
//! silence. The result is tab notation, to be fed to
//! [`tabs_to_notes`](super::tabs::tabs_to_notes).

use crate::error::{Error, Result};

/// Octave used when the caller has no preference
pub const DEFAULT_OCTAVE: u8 = 4;

/// Tokens emitted for a space
const WORD_BREAK: &str = "S- S:";

/// Silence after every letter
const LETTER_BREAK: &str = "S:";

/// Pitch letters for each letter; a single entry is held for two units
#[rustfmt::skip]
const ALPHABET: [(char, &[char]); 26] = [
    ('a', &['F']), ('b', &['E', 'C']), ('c', &['A', 'D']), ('d', &['F', 'D']),
    ('e', &['A']), ('f', &['E', 'A']), ('g', &['D', 'C']), ('h', &['G', 'A']),
    ('i', &['B']), ('j', &['A', 'B']), ('k', &['A', 'F']), ('l', &['D', 'F']),
    ('m', &['F', 'A']), ('n', &['E', 'G']), ('o', &['E']), ('p', &['G', 'E']),
    ('q', &['A', 'E']), ('r', &['D', 'G']), ('s', &['F', 'B']), ('t', &['B', 'G']),
    ('u', &['D']), ('v', &['C', 'E']), ('w', &['C', 'F']), ('x', &['A', 'C']),
    ('y', &['G']), ('z', &['G', 'D']),
];

fn letter_pitches(symbol: char) -> Option<&'static [char]> {
    let symbol = symbol.to_ascii_lowercase();
    ALPHABET
        .iter()
        .find(|(c, _)| *c == symbol)
        .map(|(_, pitches)| *pitches)
}

/// Translate text to a tunetalk tab string
///
/// Only letters and spaces are considered. `octave` must be 1 to 7 so every
/// letter's pitches exist in the pitch table.
pub fn text_to_tunetalk_tabs(text: &str, octave: u8) -> Result<String> {
    if !(1..=7).contains(&octave) {
        return Err(Error::InvalidOctave(octave));
    }

    let mut tokens: Vec<String> = Vec::new();
    for symbol in text.chars() {
        if symbol == ' ' {
            tokens.push(WORD_BREAK.to_string());
            continue;
        }

        let Some(pitches) = letter_pitches(symbol) else {
            continue;
        };

        let mut group = match pitches {
            [single] => format!("{}{}-", single, octave),
            _ => pitches
                .iter()
                .map(|pitch| format!("{}{}", pitch, octave))
                .collect::<Vec<_>>()
                .join(" "),
        };
        group.push(' ');
        group.push_str(LETTER_BREAK);
        tokens.push(group);
    }

    Ok(tokens.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::tabs::tabs_to_notes;

    #[test]
    fn test_vowels_and_consonants() {
        assert_eq!(text_to_tunetalk_tabs("ab", 4).unwrap(), "F4- S: E4 C4 S:");
    }

    #[test]
    fn test_space_and_case() {
        assert_eq!(text_to_tunetalk_tabs("I O", 5).unwrap(), "B5- S: S- S: E5- S:");
    }

    #[test]
    fn test_other_characters_skipped() {
        assert_eq!(text_to_tunetalk_tabs("h1!", 3).unwrap(), "G3 A3 S:");
        assert_eq!(text_to_tunetalk_tabs("", 4).unwrap(), "");
    }

    #[test]
    fn test_output_parses_as_tabs() {
        let tabs = text_to_tunetalk_tabs("Hello World", DEFAULT_OCTAVE).unwrap();
        let notes = tabs_to_notes(&tabs, 3, 180).unwrap();
        // h e l l o: 2+1+2+2+1 notes plus 5 breaks, space: 2, w o r l d: 2+1+2+2+2 plus 5 breaks
        assert_eq!(notes.len(), 8 + 5 + 2 + 9 + 5);
    }

    #[test]
    fn test_octave_range() {
        assert!(matches!(text_to_tunetalk_tabs("a", 0), Err(Error::InvalidOctave(0))));
        assert!(matches!(text_to_tunetalk_tabs("a", 8), Err(Error::InvalidOctave(8))));
        for octave in 1..=7 {
            let tabs = text_to_tunetalk_tabs("abcdefghijklmnopqrstuvwxyz", octave).unwrap();
            assert!(tabs_to_notes(&tabs, 3, 100).is_ok(), "octave {}", octave);
        }
    }
}
