//! Raw PCM payload decoding.
//!
//! The speech backend answers with headerless signed little-endian PCM,
//! base64 encoded. By default that is 16-bit mono at 24 kHz; a different
//! layout has to be described by a [`PcmFormat`] rather than assumed.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::{AudioBuffer, NarrationError};

/// Sample rate of the speech backend's audio.
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// Divisor mapping an i16 sample onto `[-1.0, 1.0]`.
const I16_SCALE: f32 = 32768.0;

/// Layout of a headerless PCM payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    /// Interleaved channel count. Multi-channel input is downmixed to mono.
    pub channels: u16,
    /// Only 16 is supported.
    pub bits_per_sample: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 1,
            bits_per_sample: 16,
        }
    }
}

impl PcmFormat {
    /// Bytes per interleaved frame.
    pub fn frame_size(&self) -> usize {
        self.channels as usize * (self.bits_per_sample as usize / 8)
    }

    /// Read the format out of an `audio/L16` MIME type such as
    /// `audio/L16;codec=pcm;rate=24000`.
    ///
    /// Parameters that are absent keep the values of `fallback`. Returns `None`
    /// for any other media type.
    pub fn from_mime(mime: &str, fallback: PcmFormat) -> Option<Self> {
        let mut params = mime.split(';').map(str::trim);
        let media_type = params.next()?;
        if !media_type.eq_ignore_ascii_case("audio/l16") {
            return None;
        }

        let mut format = PcmFormat {
            bits_per_sample: 16,
            ..fallback
        };
        for param in params {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            match key.trim().to_ascii_lowercase().as_str() {
                "rate" => format.sample_rate = value.trim().parse().ok()?,
                "channels" => format.channels = value.trim().parse().ok()?,
                _ => {}
            }
        }
        Some(format)
    }

    fn validate(&self) -> Result<(), NarrationError> {
        if self.bits_per_sample != 16 {
            return Err(NarrationError::UnsupportedFormat(format!(
                "{}-bit samples",
                self.bits_per_sample
            )));
        }
        if self.channels == 0 {
            return Err(NarrationError::UnsupportedFormat("zero channels".to_string()));
        }
        if self.sample_rate == 0 {
            return Err(NarrationError::UnsupportedFormat("zero sample rate".to_string()));
        }
        Ok(())
    }
}

/// Decode a base64 PCM payload into a playable mono buffer.
pub fn decode_base64_pcm(payload: &str, format: PcmFormat) -> Result<AudioBuffer, NarrationError> {
    let bytes = STANDARD.decode(payload.trim())?;
    decode_pcm(&bytes, format)
}

/// Decode raw little-endian PCM bytes into a playable mono buffer.
///
/// Every frame must be complete: a mono 16-bit payload with an odd byte count
/// is rejected rather than silently truncated.
pub fn decode_pcm(bytes: &[u8], format: PcmFormat) -> Result<AudioBuffer, NarrationError> {
    format.validate()?;

    let frame = format.frame_size();
    if bytes.len() % frame != 0 {
        return Err(NarrationError::MisalignedPcm {
            len: bytes.len(),
            frame,
        });
    }

    let channels = format.channels as usize;
    let samples = bytes
        .chunks_exact(frame)
        .map(|frame| {
            let sum: f32 = frame
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / I16_SCALE)
                .sum();
            sum / channels as f32
        })
        .collect();

    Ok(AudioBuffer {
        samples,
        sample_rate: format.sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(samples: &[i16]) -> String {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        STANDARD.encode(bytes)
    }

    #[test]
    fn decodes_one_sample_per_byte_pair() {
        let input = [0i16, 16384, -16384, i16::MAX, i16::MIN, 1];
        let buffer = decode_base64_pcm(&encode(&input), PcmFormat::default()).unwrap();

        assert_eq!(buffer.sample_rate, 24000);
        assert_eq!(buffer.samples.len(), input.len());
        for (decoded, raw) in buffer.samples.iter().zip(input) {
            assert!((decoded - raw as f32 / 32768.0).abs() < 1e-7);
        }
        assert_eq!(buffer.samples[4], -1.0);
        assert!(buffer.samples[3] < 1.0);
    }

    #[test]
    fn rejects_odd_byte_count() {
        let payload = STANDARD.encode([0u8, 1, 2]);
        let err = decode_base64_pcm(&payload, PcmFormat::default()).unwrap_err();
        assert!(matches!(err, NarrationError::MisalignedPcm { len: 3, frame: 2 }));
        assert!(err.is_decode());
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = decode_base64_pcm("not base64!!", PcmFormat::default()).unwrap_err();
        assert!(matches!(err, NarrationError::Base64(_)));
        assert!(err.needs_fallback());
    }

    #[test]
    fn empty_payload_decodes_to_empty_buffer() {
        let buffer = decode_base64_pcm("", PcmFormat::default()).unwrap();
        assert!(buffer.samples.is_empty());
        assert_eq!(buffer.duration_secs(), 0.0);
    }

    #[test]
    fn downmixes_stereo_frames() {
        let format = PcmFormat {
            channels: 2,
            ..Default::default()
        };
        let buffer = decode_pcm(
            &[16384i16, -16384, 16384, 16384]
                .iter()
                .flat_map(|s| s.to_le_bytes())
                .collect::<Vec<_>>(),
            format,
        )
        .unwrap();
        assert_eq!(buffer.samples, vec![0.0, 0.5]);

        let err = decode_pcm(&[0, 0, 0, 0, 0, 0], format).unwrap_err();
        assert!(matches!(err, NarrationError::MisalignedPcm { len: 6, frame: 4 }));
    }

    #[test]
    fn rejects_other_bit_depths() {
        let format = PcmFormat {
            bits_per_sample: 24,
            ..Default::default()
        };
        assert!(matches!(
            decode_pcm(&[0; 6], format),
            Err(NarrationError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn reads_rate_from_mime() {
        let format = PcmFormat::from_mime("audio/L16;codec=pcm;rate=16000", PcmFormat::default());
        assert_eq!(
            format,
            Some(PcmFormat {
                sample_rate: 16000,
                channels: 1,
                bits_per_sample: 16
            })
        );
        assert_eq!(
            PcmFormat::from_mime("audio/L16", PcmFormat::default()),
            Some(PcmFormat::default())
        );
        assert_eq!(PcmFormat::from_mime("audio/mpeg", PcmFormat::default()), None);
        assert_eq!(
            PcmFormat::from_mime("audio/L16;rate=fast", PcmFormat::default()),
            None
        );
    }
}
