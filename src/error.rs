use crate::narration::state::{PlaybackEvent, PlaybackState};

#[derive(thiserror::Error, Debug)]
pub enum NarrationError {
    #[error("Invalid base64 audio payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("PCM payload of {len} bytes is not a whole number of {frame}-byte frames")]
    MisalignedPcm { len: usize, frame: usize },
    #[error("Unsupported PCM format: {0}")]
    UnsupportedFormat(String),
    #[error("Speech generation did not answer in time")]
    Timeout,
    #[error("Narration no longer belongs to the displayed page")]
    StaleSession,
    #[error("Malformed speech response: {0}")]
    MalformedResponse(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Illegal playback transition from {from:?} on {event:?}")]
    IllegalTransition {
        from: PlaybackState,
        event: PlaybackEvent,
    },
    #[error("Narrator is shut down. Call init() first.")]
    ShutDown,
}

impl NarrationError {
    /// True for failures of the payload itself (bad base64, truncated or
    /// unsupported PCM).
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::Base64(_) | Self::MisalignedPcm { .. } | Self::UnsupportedFormat(_)
        )
    }

    /// True for failures that should switch narration to the fallback voice.
    pub fn needs_fallback(&self) -> bool {
        self.is_decode() || matches!(self, Self::Timeout | Self::MalformedResponse(_) | Self::Json(_))
    }
}
