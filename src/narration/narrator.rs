use std::time::Instant;

use crate::pcm::decode_base64_pcm;
use crate::speech::{PayloadCache, SpeechPayload};
use crate::text::PageToken;
use crate::{AudioOutput, FallbackVoice, NarrationError};

use super::config::NarrationConfig;
use super::highlight::highlight_for_elapsed;
use super::session::{estimate_elapsed, PageFingerprint, PlaybackSession};
use super::state::{PlaybackEvent, PlaybackState};

/// Notifications for the surrounding UI, drained with
/// [`Narrator::take_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationEvent {
    HighlightChanged(Option<usize>),
    StateChanged(PlaybackState),
    VocabularyFound { entry_id: String, page: usize },
}

/// What a speech request is for.
///
/// Only page narration drives [`PlaybackState`]. Word speech shares the audio
/// output but leaves the storyteller state alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechKind {
    Narration,
    Word,
}

/// A speech generation request the caller has to fulfil.
///
/// Hand the reply back through [`Narrator::resolve`]. Replies to tickets that
/// were superseded, timed out or belong to a page no longer displayed are
/// discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationTicket {
    pub generation: u64,
    pub page: PageFingerprint,
    pub kind: SpeechKind,
    /// Text to synthesize, markers already removed.
    pub text: String,
    tokens: Vec<PageToken>,
}

/// Outcome of a narration or word speech request.
#[derive(Debug)]
pub enum NarrationRequest {
    /// Speech has to be generated for the ticket.
    Fetch(NarrationTicket),
    /// Settled without generation (cached payload or nothing to say).
    Settled(Resolution),
}

/// What became of a speech reply.
#[derive(Debug)]
pub enum Resolution {
    /// Decoded audio is playing.
    Playing,
    /// The fallback voice is speaking instead.
    Fallback(NarrationError),
    /// Stale or empty; nothing was played.
    Discarded,
    /// Narration that was loading or playing got stopped instead.
    Stopped,
}

/// Cancellation token for the per-frame highlight loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    /// Schedule another frame with the same token.
    Continue,
    /// The loop is over; drop the token.
    Stop,
}

#[derive(Debug)]
struct Pending {
    generation: u64,
    text: String,
    deadline: Instant,
}

/// Owner of all audio output: generated narration, word speech and the
/// fallback voice.
///
/// Every request first silences whatever is playing and bumps the generation
/// counter. Asynchronous replies carry the generation they were issued under
/// and are dropped when it is no longer current, so at most one session is
/// ever audible.
pub struct Narrator<O: AudioOutput, V: FallbackVoice> {
    output: O,
    voice: V,
    config: NarrationConfig,
    cache: PayloadCache,
    running: bool,
    generation: u64,
    kind: SpeechKind,
    state: PlaybackState,
    session: Option<PlaybackSession>,
    pending: Option<Pending>,
    frame: Option<FrameToken>,
    highlight: Option<usize>,
    events: Vec<NarrationEvent>,
}

impl<O: AudioOutput, V: FallbackVoice> Narrator<O, V> {
    /// Create a narrator. It refuses requests until [`init`](Self::init).
    pub fn new(output: O, voice: V, config: NarrationConfig) -> Self {
        Self {
            output,
            voice,
            cache: PayloadCache::new(config.cache_capacity),
            config,
            running: false,
            generation: 0,
            kind: SpeechKind::Narration,
            state: PlaybackState::Idle,
            session: None,
            pending: None,
            frame: None,
            highlight: None,
            events: Vec::new(),
        }
    }

    pub fn init(&mut self) {
        if !self.running {
            log::info!("Narrator started");
            self.running = true;
        }
    }

    /// Stop everything and drop cached speech. Idempotent.
    pub fn shutdown(&mut self) {
        self.stop_all();
        self.cache.clear();
        if self.running {
            log::info!("Narrator shut down");
            self.running = false;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Storyteller state. Word speech never changes it.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Kind of the most recent request.
    pub fn kind(&self) -> SpeechKind {
        self.kind
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn frame_token(&self) -> Option<FrameToken> {
        self.frame
    }

    pub fn config(&self) -> &NarrationConfig {
        &self.config
    }

    pub fn cache(&self) -> &PayloadCache {
        &self.cache
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn voice(&self) -> &V {
        &self.voice
    }

    pub fn take_events(&mut self) -> Vec<NarrationEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: NarrationEvent) {
        self.events.push(event);
    }

    /// Silence all audio, cancel the frame loop and any pending request, and
    /// clear the highlight. Safe to call at any time, any number of times.
    pub fn stop_all(&mut self) {
        self.generation += 1;
        if self.session.take().is_some() {
            self.output.stop();
        }
        self.voice.cancel();
        self.pending = None;
        self.frame = None;
        self.set_highlight(None);
        // Stop is accepted from every state.
        let _ = self.apply(PlaybackEvent::Stop);
    }

    /// Narrate a page, highlighting `tokens` as it plays.
    pub fn request_narration(
        &mut self,
        page: PageFingerprint,
        text: &str,
        tokens: Vec<PageToken>,
        now: Instant,
    ) -> Result<NarrationRequest, NarrationError> {
        self.request(SpeechKind::Narration, page, text, tokens, now)
    }

    /// Pronounce a single word or phrase, without highlighting.
    pub fn speak_word(
        &mut self,
        page: PageFingerprint,
        text: &str,
        now: Instant,
    ) -> Result<NarrationRequest, NarrationError> {
        self.request(SpeechKind::Word, page, text, Vec::new(), now)
    }

    fn request(
        &mut self,
        kind: SpeechKind,
        page: PageFingerprint,
        text: &str,
        tokens: Vec<PageToken>,
        now: Instant,
    ) -> Result<NarrationRequest, NarrationError> {
        if !self.running {
            return Err(NarrationError::ShutDown);
        }
        self.stop_all();
        self.kind = kind;

        let text = text.trim();
        if text.is_empty() {
            log::debug!("Nothing to say on page {}", page.index);
            return Ok(NarrationRequest::Settled(Resolution::Discarded));
        }

        self.advance(PlaybackEvent::Request)?;
        let ticket = NarrationTicket {
            generation: self.generation,
            page,
            kind,
            text: text.to_string(),
            tokens,
        };

        if let Some(payload) = self.cache.get(text).cloned() {
            log::debug!("Speech cache hit for {} chars", text.len());
            return Ok(NarrationRequest::Settled(self.play_payload(ticket, payload)?));
        }

        log::debug!(
            "Requesting {kind:?} speech for page {} (generation {})",
            page.index,
            self.generation
        );
        self.pending = Some(Pending {
            generation: self.generation,
            text: ticket.text.clone(),
            deadline: now + self.config.request_timeout,
        });
        Ok(NarrationRequest::Fetch(ticket))
    }

    /// Deliver the speech backend's reply for `ticket`.
    ///
    /// `displayed` is the page on screen now. A reply for a superseded ticket
    /// or another page is discarded silently. A failed or undecodable reply
    /// switches to the fallback voice.
    pub fn resolve(
        &mut self,
        ticket: &NarrationTicket,
        reply: Result<SpeechPayload, NarrationError>,
        displayed: PageFingerprint,
    ) -> Result<Resolution, NarrationError> {
        if !self.running || ticket.generation != self.generation {
            log::debug!(
                "Discarding stale speech reply (generation {} vs {})",
                ticket.generation,
                self.generation
            );
            return Ok(Resolution::Discarded);
        }
        if ticket.page != displayed {
            log::debug!(
                "Discarding speech for page {}, page {} is displayed",
                ticket.page.index,
                displayed.index
            );
            self.stop_all();
            return Ok(Resolution::Discarded);
        }

        self.pending = None;
        match reply {
            Ok(payload) => self.play_payload(ticket.clone(), payload),
            Err(e) => self.fall_back(&ticket.text, e),
        }
    }

    /// Check the pending request against its deadline.
    ///
    /// On timeout the request is abandoned (a late reply is discarded) and the
    /// fallback voice speaks instead.
    pub fn poll(&mut self, now: Instant) -> Result<Option<Resolution>, NarrationError> {
        let expired = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.generation == self.generation && now >= pending.deadline);
        if !expired {
            return Ok(None);
        }

        let Some(pending) = self.pending.take() else {
            return Ok(None);
        };
        self.generation += 1;
        log::warn!(
            "Speech generation timed out after {:?}",
            self.config.request_timeout
        );
        self.fall_back(&pending.text, NarrationError::Timeout).map(Some)
    }

    /// One tick of the highlight loop.
    ///
    /// Returns [`FrameControl::Stop`] once the token is revoked, playback
    /// completed, or `displayed` is not the session's page. Completion is
    /// reported exactly once.
    pub fn on_frame(&mut self, token: FrameToken, displayed: PageFingerprint) -> FrameControl {
        if self.frame != Some(token) {
            return FrameControl::Stop;
        }
        let Some(session) = self.session.as_ref() else {
            self.frame = None;
            return FrameControl::Stop;
        };
        if session.page != displayed {
            log::debug!("Displayed page changed under narration, stopping");
            self.stop_all();
            return FrameControl::Stop;
        }

        let duration = session.duration();
        let elapsed = estimate_elapsed(session, self.output.current_time());
        if elapsed >= duration {
            self.finish();
            return FrameControl::Stop;
        }

        let index = if session.tokens.is_empty() {
            None
        } else {
            highlight_for_elapsed(&session.tokens, elapsed, duration)
        };
        self.set_highlight(index);
        FrameControl::Continue
    }

    fn finish(&mut self) {
        self.frame = None;
        if self.session.take().is_some() {
            self.output.stop();
        }
        self.set_highlight(None);
        log::debug!("{:?} speech complete", self.kind);
        if let Err(e) = self.advance(PlaybackEvent::Finish) {
            log::warn!("{e}");
        }
    }

    fn play_payload(
        &mut self,
        ticket: NarrationTicket,
        payload: SpeechPayload,
    ) -> Result<Resolution, NarrationError> {
        let decoded = payload
            .format(self.config.pcm)
            .and_then(|format| decode_base64_pcm(&payload.data, format))
            .and_then(|buffer| {
                if buffer.samples.is_empty() {
                    Err(NarrationError::MalformedResponse("empty audio payload".to_string()))
                } else {
                    Ok(buffer)
                }
            });
        let buffer = match decoded {
            Ok(buffer) => buffer,
            Err(e) => {
                self.cache.remove(&ticket.text);
                return self.fall_back(&ticket.text, e);
            }
        };

        if self.session.take().is_some() {
            self.output.stop();
        }
        self.voice.cancel();
        if let Err(e) = self.output.play(&buffer) {
            return self.fall_back(&ticket.text, e);
        }

        log::info!(
            "Playing {:.2}s of {:?} speech for page {}",
            buffer.duration_secs(),
            ticket.kind,
            ticket.page.index
        );
        let start_time = self.output.current_time();
        self.cache.insert(&ticket.text, payload);
        self.session = Some(PlaybackSession::new(
            buffer,
            start_time,
            ticket.tokens,
            ticket.page,
            ticket.generation,
        ));
        self.frame = Some(FrameToken(ticket.generation));
        self.advance(PlaybackEvent::Start)?;
        Ok(Resolution::Playing)
    }

    fn fall_back(&mut self, text: &str, error: NarrationError) -> Result<Resolution, NarrationError> {
        log::warn!("Falling back to the basic voice: {error}");
        self.advance(PlaybackEvent::Fail)?;
        self.voice.speak(text);
        Ok(Resolution::Fallback(error))
    }

    /// Storyteller transition for the current request; a no-op for word speech.
    fn advance(&mut self, event: PlaybackEvent) -> Result<(), NarrationError> {
        match self.kind {
            SpeechKind::Narration => self.apply(event),
            SpeechKind::Word => Ok(()),
        }
    }

    fn apply(&mut self, event: PlaybackEvent) -> Result<(), NarrationError> {
        let next = self.state.transition(event)?;
        if next != self.state {
            self.state = next;
            self.emit(NarrationEvent::StateChanged(next));
        }
        Ok(())
    }

    fn set_highlight(&mut self, index: Option<usize>) {
        if self.highlight != index {
            self.highlight = index;
            self.emit(NarrationEvent::HighlightChanged(index));
        }
    }
}

impl<O: AudioOutput, V: FallbackVoice> Drop for Narrator<O, V> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
