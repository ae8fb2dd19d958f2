use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::text::{total_characters, PageToken};
use crate::AudioBuffer;

/// Identity of a displayed page: its index plus a hash of its text.
///
/// Two fingerprints differ whenever the reader moved to another page or the
/// page's text was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageFingerprint {
    pub index: usize,
    text_hash: u64,
}

impl PageFingerprint {
    pub fn of(index: usize, text: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        Self {
            index,
            text_hash: hasher.finish(),
        }
    }
}

/// One narration playback attempt.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub buffer: AudioBuffer,
    /// Scheduler time playback began at.
    pub start_time: f64,
    /// Tokens being read; empty for word speech, which is not highlighted.
    pub tokens: Vec<PageToken>,
    pub total_characters: usize,
    pub page: PageFingerprint,
    /// Narrator generation this session was started under.
    pub generation: u64,
}

impl PlaybackSession {
    pub fn new(
        buffer: AudioBuffer,
        start_time: f64,
        tokens: Vec<PageToken>,
        page: PageFingerprint,
        generation: u64,
    ) -> Self {
        Self {
            total_characters: total_characters(&tokens),
            buffer,
            start_time,
            tokens,
            page,
            generation,
        }
    }

    pub fn duration(&self) -> f64 {
        self.buffer.duration_secs()
    }

    pub fn is_complete(&self, now: f64) -> bool {
        estimate_elapsed(self, now) >= self.duration()
    }
}

/// Seconds played so far, clamped to `[0, duration]`.
pub fn estimate_elapsed(session: &PlaybackSession, now: f64) -> f64 {
    (now - session.start_time).clamp(0.0, session.duration())
}
