//! Narration playback and word highlighting.
//!
//! The [`Narrator`] is the single owner of audio output. A narration request
//! silences everything else, then either plays cached speech or hands the
//! caller a [`NarrationTicket`] to fetch generated speech for. The reply goes
//! back through [`Narrator::resolve`], which decodes the PCM payload, starts
//! playback and hands out a [`FrameToken`] for the highlight loop.
//!
//! # Lifecycle
//!
//! ```text
//!            request            start            finish
//!   Idle ──────────────▶ Loading ─────▶ Playing ─────────▶ Complete
//!     ▲                     │ fail / timeout
//!     │ stop (any state)    ▼
//!     └──────────────── Error (fallback voice speaks)
//! ```
//!
//! # Highlighting
//!
//! The speech backend gives no word timings. While audio plays, each animation
//! frame maps the fraction of audio played onto the page's characters and
//! highlights the token containing that character ([`highlight_for_elapsed`]).
//! Words with unusual spoken length drift; that is accepted.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use std::time::Instant;
//! # use storybook_narration::narration::*;
//! # use storybook_narration::speech::parse_speech_response;
//! # use storybook_narration::text::tokenize_page;
//! # fn demo<O: storybook_narration::AudioOutput, V: storybook_narration::FallbackVoice>(
//! #     output: O, voice: V, reply_json: &str,
//! # ) -> Result<(), storybook_narration::NarrationError> {
//! let mut narrator = Narrator::new(output, voice, NarrationConfig::default());
//! narrator.init();
//!
//! let text = "A dog ran fast.";
//! let page = PageFingerprint::of(0, text);
//! if let NarrationRequest::Fetch(ticket) =
//!     narrator.request_narration(page, text, tokenize_page(text), Instant::now())?
//! {
//!     narrator.resolve(&ticket, parse_speech_response(reply_json), page)?;
//! }
//!
//! while let Some(token) = narrator.frame_token() {
//!     if narrator.on_frame(token, page) == FrameControl::Stop {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod highlight;
pub mod narrator;
pub mod session;
pub mod state;
pub mod typewriter;

pub use config::{NarrationConfig, NarrationConfigBuilder};
pub use highlight::highlight_for_elapsed;
pub use narrator::{
    FrameControl, FrameToken, NarrationEvent, NarrationRequest, NarrationTicket, Narrator,
    Resolution, SpeechKind,
};
pub use session::{estimate_elapsed, PageFingerprint, PlaybackSession};
pub use state::{PlaybackEvent, PlaybackState};
pub use typewriter::Typewriter;
