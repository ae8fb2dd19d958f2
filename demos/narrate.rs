use std::path::PathBuf;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use storybook_narration::narration::{FrameControl, NarrationConfig, NarrationRequest};
use storybook_narration::reader::{StoryReader, TapOutcome};
use storybook_narration::speech::SpeechPayload;
use storybook_narration::text::VocabularyEntry;
use storybook_narration::{AudioBuffer, AudioOutput, FallbackVoice, NarrationError};

/// Pretends to play audio; keeps time with the wall clock.
struct ConsoleOutput {
    epoch: Instant,
}

impl AudioOutput for ConsoleOutput {
    fn play(&mut self, buffer: &AudioBuffer) -> Result<(), NarrationError> {
        println!("[audio] playing {:.2}s", buffer.duration_secs());
        buffer.write_wav(&PathBuf::from("narration.wav"))?;
        Ok(())
    }

    fn stop(&mut self) {
        println!("[audio] stop");
    }

    fn current_time(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

struct ConsoleVoice;

impl FallbackVoice for ConsoleVoice {
    fn speak(&mut self, text: &str) {
        println!("[voice] {text}");
    }

    fn cancel(&mut self) {}
}

/// Stand-in for the speech backend: a quiet 220 Hz tone, one second per
/// ten characters.
fn synthesize(text: &str) -> SpeechPayload {
    let samples = 24_000 * text.len() / 10;
    let bytes: Vec<u8> = (0..samples)
        .flat_map(|i| {
            let t = i as f32 / 24_000.0;
            let s = (t * 220.0 * std::f32::consts::TAU).sin() * 0.2;
            ((s * 32767.0) as i16).to_le_bytes()
        })
        .collect();
    SpeechPayload::raw(STANDARD.encode(bytes))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let pages = vec![
        "A *dog* ran fast past the *fire truck*.".to_string(),
        "The end.".to_string(),
    ];
    let vocabulary = vec![
        VocabularyEntry::new("w1", "dog"),
        VocabularyEntry::new("w2", "fire truck"),
    ];

    let start = Instant::now();
    let mut reader = StoryReader::new(
        pages,
        vocabulary,
        ConsoleOutput { epoch: start },
        ConsoleVoice,
        NarrationConfig::default(),
        start,
    );

    let targets: Vec<&str> = reader
        .page_targets()
        .iter()
        .map(|t| t.entry.word.as_str())
        .collect();
    println!("Find on this page: {targets:?}");

    if let NarrationRequest::Fetch(ticket) = reader.toggle_narration(Instant::now())? {
        let payload = synthesize(&ticket.text);
        reader.resolve_speech(&ticket, Ok(payload))?;
    }

    let mut last = None;
    while let Some(token) = reader.narrator().frame_token() {
        if reader.on_frame(token) == FrameControl::Stop {
            break;
        }
        if reader.highlight() != last {
            last = reader.highlight();
            if let Some(index) = last {
                println!("  > {}", reader.tokens()[index].display_text);
            }
        }
        std::thread::sleep(Duration::from_millis(16));
    }

    for index in [1, 7, 1] {
        match reader.tap(index, Instant::now())? {
            TapOutcome::Vocabulary {
                entry, first_find, ..
            } => println!("Tapped {:?} (first find: {first_find})", entry.word),
            TapOutcome::PlainWord { word, .. } => println!("Look up {word:?}"),
            TapOutcome::Ignored => {}
        }
    }

    for event in reader.take_events() {
        println!("event: {event:?}");
    }
    reader.close();
    Ok(())
}
