//! Text to Morse code notes

use crate::note::Note;

#[rustfmt::skip]
const MORSE_TABLE: [(char, &str); 36] = [
    ('a', ".-"), ('b', "-..."), ('c', "-.-."), ('d', "-.."), ('e', "."),
    ('f', "..-."), ('g', "--."), ('h', "...."), ('i', ".."), ('j', ".---"),
    ('k', "-.-"), ('l', ".-.."), ('m', "--"), ('n', "-."), ('o', "---"),
    ('p', ".--."), ('q', "--.-"), ('r', ".-."), ('s', "..."), ('t', "-"),
    ('u', "..-"), ('v', "...-"), ('w', ".--"), ('x', "-..-"), ('y', "-.--"),
    ('z', "--.."),
    ('1', ".----"), ('2', "..---"), ('3', "...--"), ('4', "....-"), ('5', "....."),
    ('6', "-...."), ('7', "--..."), ('8', "---.."), ('9', "----."), ('0', "-----"),
];

/// Standard gaps, in dot lengths: between symbols, letters and words
pub const STANDARD_SEPARATORS: [u16; 3] = [1, 3, 7];

/// Sounds used to key Morse code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorseStyle {
    /// The dot
    pub short: Note,
    /// The dash; three dots long at the dot's pitch when not set
    pub long: Option<Note>,
    /// Silence after a symbol, a letter and a word, as multiples of the
    /// dot duration
    pub separators: [u16; 3],
}

impl MorseStyle {
    pub fn new(short: Note) -> Self {
        Self {
            short,
            long: None,
            separators: STANDARD_SEPARATORS,
        }
    }

    pub fn with_long(mut self, long: Note) -> Self {
        self.long = Some(long);
        self
    }

    pub fn with_separators(mut self, separators: [u16; 3]) -> Self {
        self.separators = separators;
        self
    }

    fn dash(&self) -> Note {
        self.long.unwrap_or_else(|| {
            self.short
                .with_duration(self.short.duration().saturating_mul(3))
        })
    }

    fn gap(&self, index: usize) -> Note {
        Note::rest(self.short.duration().saturating_mul(self.separators[index]))
    }
}

/// Morse pattern (dots and dashes) for a character, case-insensitive
pub fn pattern(symbol: char) -> Option<&'static str> {
    let symbol = symbol.to_ascii_lowercase();
    MORSE_TABLE
        .iter()
        .find(|(c, _)| *c == symbol)
        .map(|(_, p)| *p)
}

/// Translate text into Morse code notes
///
/// Letters and digits are keyed, spaces become word gaps. Every letter is
/// followed by a letter gap. Characters without a Morse code are skipped.
pub fn text_to_morse_notes(text: &str, style: &MorseStyle) -> Vec<Note> {
    let dot = style.short;
    let dash = style.dash();
    let symbol_gap = style.gap(0);
    let letter_gap = style.gap(1);
    let word_gap = style.gap(2);

    let mut notes = Vec::new();
    for symbol in text.chars() {
        if symbol == ' ' {
            notes.push(word_gap);
            continue;
        }

        let Some(code) = pattern(symbol) else {
            log::trace!("Morse: no code for {:?}, skipped", symbol);
            continue;
        };

        for (i, mark) in code.chars().enumerate() {
            if i > 0 {
                notes.push(symbol_gap);
            }
            notes.push(if mark == '-' { dash } else { dot });
        }
        notes.push(letter_gap);
    }
    notes
}
