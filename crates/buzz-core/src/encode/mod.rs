//! Note encoders - pure functions turning text and tables into notes

pub mod morse;
pub mod pitch;
pub mod tabs;
pub mod tunes;
pub mod tunetalk;

pub use morse::{MorseStyle, text_to_morse_notes};
pub use tabs::tabs_to_notes;
pub use tunes::{Tune, TuneStyle};
pub use tunetalk::text_to_tunetalk_tabs;
