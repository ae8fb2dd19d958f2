use std::time::Duration;

use derive_builder::Builder;

use crate::pcm::PcmFormat;

/// How long generated speech may take before the fallback voice takes over.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Typewriter pace.
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(100);

pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Parameters for a [`Narrator`](super::Narrator) and its reader.
///
/// ```rust
/// use std::time::Duration;
/// use storybook_narration::narration::NarrationConfigBuilder;
///
/// let config = NarrationConfigBuilder::default()
///     .request_timeout(Duration::from_secs(5))
///     .build()?;
/// assert_eq!(config.pcm.sample_rate, 24000);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(default)]
pub struct NarrationConfig {
    /// Payload layout used when the backend does not report one.
    pub pcm: PcmFormat,
    pub request_timeout: Duration,
    pub reveal_interval: Duration,
    /// Generated payloads kept per spoken text. Zero disables caching.
    pub cache_capacity: usize,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            pcm: PcmFormat::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            reveal_interval: DEFAULT_REVEAL_INTERVAL,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_unset_defaults() {
        let config = NarrationConfigBuilder::default()
            .cache_capacity(0)
            .build()
            .unwrap();
        assert_eq!(config.cache_capacity, 0);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.reveal_interval, Duration::from_millis(100));
        assert_eq!(config.pcm, PcmFormat::default());
    }
}
