//! # storybook-narration
//!
//! Narration and word interaction for an illustrated children's storybook.
//!
//! ## Features
//!
//! - **PCM decoding**: base64 raw 16-bit PCM (24 kHz mono by default) into a playable buffer
//! - **Word highlighting**: character-weighted estimate of the word being spoken
//! - **Vocabulary matching**: plural and phrase tolerant matching of page tokens
//!   against the learner's collected words, with per-page "found" tracking
//!
//! ## Quick Start
//!
//! ```ignore
//! use storybook_narration::{reader::StoryReader, narration::NarrationConfig};
//!
//! let mut reader = StoryReader::new(pages, vocabulary, output, voice, NarrationConfig::default());
//! if let Some(ticket) = reader.toggle_narration(Instant::now())? {
//!     // fetch speech for `ticket.text` from the speech backend, then:
//!     reader.resolve_narration(&ticket, reply)?;
//! }
//! ```

pub mod error;
pub mod narration;
pub mod pcm;
pub mod reader;
pub mod speech;
pub mod text;

pub use error::NarrationError;

use std::path::Path;

/// A decoded, playable audio buffer.
///
/// Contains mono f32 samples in `[-1.0, 1.0]` and the sample rate they were
/// recorded at.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Raw audio samples as f32 values
    pub samples: Vec<f32>,
    /// Sample rate of the audio (24000 for the speech backend)
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Write the audio to a 32-bit float WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), NarrationError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// The one audio output owner of the application.
///
/// Implementations wrap the platform audio engine. Narration, word speech and
/// any other playback go through a single instance so two sources never
/// overlap.
pub trait AudioOutput {
    /// Start playing `buffer` immediately.
    fn play(&mut self, buffer: &AudioBuffer) -> Result<(), NarrationError>;

    /// Stop and release whatever is playing.
    ///
    /// Must be a no-op when playback already ended on its own.
    fn stop(&mut self);

    /// Scheduler time in seconds. Monotonic, same clock `play` starts on.
    fn current_time(&self) -> f64;
}

/// Lower-fidelity text-to-speech used when the generated narration is
/// unavailable.
pub trait FallbackVoice {
    /// Speak `text`, replacing anything this voice is currently saying.
    fn speak(&mut self, text: &str);

    /// Silence the voice. Safe to call when idle.
    fn cancel(&mut self);
}
