//! Boundary with the speech generation backend.
//!
//! Replies are parsed into a [`SpeechPayload`] or rejected. Nothing past this
//! module looks at free-form response fields.

use std::collections::{HashMap, VecDeque};

use serde::Deserialize;

use crate::pcm::PcmFormat;
use crate::NarrationError;

/// Generated speech, still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechPayload {
    /// Base64 PCM.
    pub data: String,
    /// Media type reported by the backend, e.g. `audio/L16;codec=pcm;rate=24000`.
    pub mime_type: Option<String>,
}

impl SpeechPayload {
    /// Wrap a bare base64 string in the default format.
    pub fn raw(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: None,
        }
    }

    /// PCM layout of this payload, `default` when the backend did not say.
    pub fn format(&self, default: PcmFormat) -> Result<PcmFormat, NarrationError> {
        match &self.mime_type {
            None => Ok(default),
            Some(mime) => PcmFormat::from_mime(mime, default)
                .ok_or_else(|| NarrationError::UnsupportedFormat(mime.clone())),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SpeechResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: Option<String>,
}

/// Parse a `generateContent` style reply into the first inline audio part.
pub fn parse_speech_response(json: &str) -> Result<SpeechPayload, NarrationError> {
    let response: SpeechResponse = serde_json::from_str(json)?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| NarrationError::MalformedResponse("no candidates".to_string()))?;
    let content = candidate
        .content
        .ok_or_else(|| NarrationError::MalformedResponse("candidate has no content".to_string()))?;

    content
        .parts
        .into_iter()
        .filter_map(|part| part.inline_data)
        .find_map(|inline| match inline.data {
            Some(data) if !data.trim().is_empty() => Some(SpeechPayload {
                data,
                mime_type: inline.mime_type,
            }),
            _ => None,
        })
        .ok_or_else(|| NarrationError::MalformedResponse("no inline audio data".to_string()))
}

/// Previously generated speech keyed by the exact text spoken.
///
/// Oldest entries are evicted first once `capacity` is reached. A capacity of
/// zero disables caching.
#[derive(Debug, Default)]
pub struct PayloadCache {
    entries: HashMap<String, SpeechPayload>,
    order: VecDeque<String>,
    capacity: usize,
}

impl PayloadCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    pub fn get(&self, text: &str) -> Option<&SpeechPayload> {
        self.entries.get(text)
    }

    pub fn insert(&mut self, text: &str, payload: SpeechPayload) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(text.to_string(), payload).is_some() {
            return;
        }
        self.order.push_back(text.to_string());
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn remove(&mut self, text: &str) {
        if self.entries.remove(text).is_some() {
            self.order.retain(|t| t != text);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
