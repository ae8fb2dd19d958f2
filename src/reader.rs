//! The storybook reader: one page on screen at a time, tappable words,
//! narration with highlighting, and per-page "found" vocabulary.

use std::time::Instant;

use crate::narration::{
    FrameControl, FrameToken, NarrationConfig, NarrationEvent, NarrationRequest, NarrationTicket,
    Narrator, PageFingerprint, PlaybackState, Resolution, Typewriter,
};
use crate::speech::{parse_speech_response, SpeechPayload};
use crate::text::tokenize::trim_tapped;
use crate::text::{
    find_token_match, interaction_for, page_target_indices, plain_text, record_found,
    tokenize_page, FoundState, Interaction, PageToken, VocabularyEntry,
};
use crate::{AudioOutput, FallbackVoice, NarrationError};

/// What a tap on a token led to.
#[derive(Debug)]
pub enum TapOutcome {
    /// The token names a collected vocabulary entry. Its full word is spoken.
    Vocabulary {
        entry: VocabularyEntry,
        /// False when the entry was already found on this page.
        first_find: bool,
        speech: NarrationRequest,
    },
    /// An ordinary word, a candidate for dictionary lookup. It is spoken.
    PlainWord {
        word: String,
        speech: NarrationRequest,
    },
    /// Punctuation, a single letter, or no such token.
    Ignored,
}

/// Render state of one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenView<'a> {
    pub text: &'a str,
    pub interaction: Interaction,
    pub found: bool,
    pub highlighted: bool,
    pub visible: bool,
}

/// A vocabulary entry hinted for the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget<'a> {
    pub entry: &'a VocabularyEntry,
    pub found: bool,
}

pub struct StoryReader<O: AudioOutput, V: FallbackVoice> {
    pages: Vec<String>,
    current: usize,
    tokens: Vec<PageToken>,
    fingerprint: PageFingerprint,
    vocabulary: Vec<VocabularyEntry>,
    /// Vocabulary index per token of the current page.
    token_matches: Vec<Option<usize>>,
    /// Vocabulary indices hinted on the current page.
    targets: Vec<usize>,
    found: FoundState,
    typewriter: Typewriter,
    narrator: Narrator<O, V>,
}

impl<O: AudioOutput, V: FallbackVoice> StoryReader<O, V> {
    /// Open the story on its first page.
    pub fn new(
        pages: Vec<String>,
        vocabulary: Vec<VocabularyEntry>,
        output: O,
        voice: V,
        config: NarrationConfig,
        now: Instant,
    ) -> Self {
        let typewriter = Typewriter::new(config.reveal_interval);
        let mut narrator = Narrator::new(output, voice, config);
        narrator.init();

        let mut reader = Self {
            pages,
            current: 0,
            tokens: Vec::new(),
            fingerprint: PageFingerprint::of(0, ""),
            vocabulary,
            token_matches: Vec::new(),
            targets: Vec::new(),
            found: FoundState::new(),
            typewriter,
            narrator,
        };
        reader.load_page(now);
        reader
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_text(&self) -> &str {
        self.pages.get(self.current).map(String::as_str).unwrap_or_default()
    }

    pub fn fingerprint(&self) -> PageFingerprint {
        self.fingerprint
    }

    pub fn tokens(&self) -> &[PageToken] {
        &self.tokens
    }

    pub fn vocabulary(&self) -> &[VocabularyEntry] {
        &self.vocabulary
    }

    pub fn found(&self) -> &FoundState {
        &self.found
    }

    pub fn narrator(&self) -> &Narrator<O, V> {
        &self.narrator
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.narrator.state()
    }

    pub fn highlight(&self) -> Option<usize> {
        self.narrator.highlight()
    }

    pub fn take_events(&mut self) -> Vec<NarrationEvent> {
        self.narrator.take_events()
    }

    /// Show page `index`. Out-of-range indices are ignored.
    ///
    /// All audio stops, in-flight speech for the old page becomes stale and the
    /// typewriter starts over, even when returning to a page seen before.
    pub fn go_to_page(&mut self, index: usize, now: Instant) -> bool {
        if index >= self.pages.len() {
            return false;
        }
        self.narrator.stop_all();
        self.typewriter.cancel();
        self.current = index;
        self.load_page(now);
        true
    }

    pub fn next_page(&mut self, now: Instant) -> bool {
        self.go_to_page(self.current + 1, now)
    }

    pub fn prev_page(&mut self, now: Instant) -> bool {
        match self.current.checked_sub(1) {
            Some(index) => self.go_to_page(index, now),
            None => false,
        }
    }

    fn load_page(&mut self, now: Instant) {
        let text = self.page_text().to_string();
        self.tokens = tokenize_page(&text);
        self.fingerprint = PageFingerprint::of(self.current, &text);
        self.typewriter.restart(self.fingerprint, self.tokens.len(), now);
        self.refresh_matches();
        log::debug!(
            "Showing page {} of {} ({} tokens)",
            self.current + 1,
            self.pages.len(),
            self.tokens.len()
        );
    }

    /// Recompute vocabulary matches for the current page and vocabulary.
    fn refresh_matches(&mut self) {
        self.token_matches = self
            .tokens
            .iter()
            .map(|token| find_token_match(token, &self.vocabulary))
            .collect();
        self.targets = page_target_indices(self.page_text(), &self.vocabulary);
    }

    fn matched_entry(&self, index: usize) -> Option<&VocabularyEntry> {
        self.token_matches
            .get(index)
            .copied()
            .flatten()
            .and_then(|entry| self.vocabulary.get(entry))
    }

    /// Storyteller button: narrate the page, or stop narration already
    /// loading or playing. Word speech in progress is cut off and the page is
    /// narrated.
    pub fn toggle_narration(&mut self, now: Instant) -> Result<NarrationRequest, NarrationError> {
        if self.narrator.state().is_busy() {
            self.narrator.stop_all();
            return Ok(NarrationRequest::Settled(Resolution::Stopped));
        }
        let text = plain_text(self.page_text());
        self.narrator
            .request_narration(self.fingerprint, &text, self.tokens.clone(), now)
    }

    /// Deliver generated speech for a ticket from this reader.
    pub fn resolve_speech(
        &mut self,
        ticket: &NarrationTicket,
        reply: Result<SpeechPayload, NarrationError>,
    ) -> Result<Resolution, NarrationError> {
        self.narrator.resolve(ticket, reply, self.fingerprint)
    }

    /// Deliver the backend's raw JSON reply for a ticket.
    pub fn resolve_speech_json(
        &mut self,
        ticket: &NarrationTicket,
        json: &str,
    ) -> Result<Resolution, NarrationError> {
        self.resolve_speech(ticket, parse_speech_response(json))
    }

    /// Animation frame callback for the highlight loop.
    pub fn on_frame(&mut self, token: FrameToken) -> FrameControl {
        self.narrator.on_frame(token, self.fingerprint)
    }

    /// Timer callback: expires overdue speech requests.
    pub fn tick(&mut self, now: Instant) -> Result<Option<Resolution>, NarrationError> {
        self.narrator.poll(now)
    }

    pub fn visible_count(&self, now: Instant) -> usize {
        self.typewriter.visible_count(now)
    }

    /// Tap on token `index` of the current page.
    pub fn tap(&mut self, index: usize, now: Instant) -> Result<TapOutcome, NarrationError> {
        let Some(token) = self.tokens.get(index) else {
            return Ok(TapOutcome::Ignored);
        };
        let word = trim_tapped(&token.display_text).to_string();
        if word.chars().count() < 2 && !word.eq_ignore_ascii_case("i") {
            return Ok(TapOutcome::Ignored);
        }
        if !self.narrator.is_running() {
            return Err(NarrationError::ShutDown);
        }

        let matched = self.matched_entry(index).cloned();
        match matched {
            Some(entry) => {
                let first_find = self.mark_found(&entry.id);
                let speech = self
                    .narrator
                    .speak_word(self.fingerprint, &entry.word, now)?;
                Ok(TapOutcome::Vocabulary {
                    entry,
                    first_find,
                    speech,
                })
            }
            None => {
                let speech = self.narrator.speak_word(self.fingerprint, &word, now)?;
                Ok(TapOutcome::PlainWord { word, speech })
            }
        }
    }

    /// Speak arbitrary text (a definition, a quiz prompt) through the same
    /// single audio owner.
    pub fn speak(&mut self, text: &str, now: Instant) -> Result<NarrationRequest, NarrationError> {
        self.narrator.speak_word(self.fingerprint, text, now)
    }

    fn mark_found(&mut self, entry_id: &str) -> bool {
        let (next, first_find) = record_found(self.current, entry_id, &self.found);
        if first_find {
            self.found = next;
            log::info!("Found {entry_id} on page {}", self.current);
            self.narrator.emit(NarrationEvent::VocabularyFound {
                entry_id: entry_id.to_string(),
                page: self.current,
            });
        }
        first_find
    }

    /// Add a freshly collected entry. It counts as found on the current page.
    ///
    /// Returns false when an entry with the same id is already collected.
    pub fn add_vocabulary(&mut self, entry: VocabularyEntry) -> bool {
        if self.vocabulary.iter().any(|e| e.id == entry.id) {
            return false;
        }
        let id = entry.id.clone();
        self.vocabulary.push(entry);
        self.refresh_matches();
        self.mark_found(&id);
        true
    }

    /// Replace the vocabulary snapshot. Found state is kept.
    pub fn set_vocabulary(&mut self, vocabulary: Vec<VocabularyEntry>) {
        self.vocabulary = vocabulary;
        self.refresh_matches();
    }

    /// "Find these on this page" hints.
    pub fn page_targets(&self) -> Vec<PageTarget<'_>> {
        self.targets
            .iter()
            .filter_map(|&index| self.vocabulary.get(index))
            .map(|entry| PageTarget {
                found: self.found.is_found(self.current, &entry.id),
                entry,
            })
            .collect()
    }

    /// Render state of every token on the page at `now`.
    pub fn token_views(&self, now: Instant) -> Vec<TokenView<'_>> {
        let visible = self.typewriter.visible_count(now);
        let highlight = self.narrator.highlight();
        self.tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                let matched = self.matched_entry(index);
                TokenView {
                    text: &token.display_text,
                    interaction: interaction_for(token, matched),
                    found: matched.is_some_and(|e| self.found.is_found(self.current, &e.id)),
                    highlighted: highlight == Some(index),
                    visible: index < visible,
                }
            })
            .collect()
    }

    /// Teardown. Stops all audio and timers. Idempotent.
    pub fn close(&mut self) {
        self.typewriter.cancel();
        self.narrator.shutdown();
    }
}
