use thiserror::Error;

/// Errors produced by the encoders and the playback engine
#[derive(Debug, Error)]
pub enum Error {
    /// A tab token names a pitch that is not in the pitch table
    #[error("unknown pitch name `{0}`")]
    InvalidPitchName(String),

    /// A tab token is empty or carries no pitch
    #[error("malformed tab token `{0}`")]
    MalformedTabToken(String),

    /// Volume outside 0..=4
    #[error("volume {0} is out of range (0-4)")]
    InvalidVolume(u8),

    /// The tunetalk alphabet has no pitches in this octave
    #[error("octave {0} is not covered by the pitch table")]
    InvalidOctave(u8),

    /// Writing a note to the device did not complete
    #[error("transport failure: {0}")]
    TransportFailure(String),

    /// The OS refused to start the playback thread
    #[error("failed to start playback thread: {0}")]
    SpawnFailed(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
