/// Delimiter wrapped around author-marked vocabulary words, e.g. `*dog*`.
pub const EMPHASIS_MARKER: char = '*';

/// One whitespace-delimited chunk of page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageToken {
    /// Chunk as written, markers included.
    pub raw_text: String,
    /// Chunk with emphasis markers removed; what gets rendered.
    pub display_text: String,
    /// Display text reduced to alphanumerics; what gets matched and timed.
    pub clean_text: String,
    /// The author wrapped this chunk in emphasis markers.
    pub is_marked_interactive: bool,
}

impl PageToken {
    pub fn parse(chunk: &str) -> Self {
        let display_text: String = chunk.chars().filter(|&c| c != EMPHASIS_MARKER).collect();
        let clean_text = display_text.chars().filter(|c| c.is_alphanumeric()).collect();
        Self {
            raw_text: chunk.to_string(),
            is_marked_interactive: chunk.contains(EMPHASIS_MARKER),
            display_text,
            clean_text,
        }
    }

    /// Narration weight: characters of the clean form.
    pub fn weight(&self) -> usize {
        self.clean_text.chars().count()
    }
}

/// Split page text into tokens on any run of whitespace.
pub fn tokenize_page(text: &str) -> Vec<PageToken> {
    text.split_whitespace().map(PageToken::parse).collect()
}

/// Sum of token weights; the denominator of the highlight estimate.
pub fn total_characters(tokens: &[PageToken]) -> usize {
    tokens.iter().map(PageToken::weight).sum()
}

/// Page text as it should be read aloud or rendered: markers removed.
pub fn plain_text(text: &str) -> String {
    text.chars().filter(|&c| c != EMPHASIS_MARKER).collect()
}

/// Strip leading and trailing non-alphanumerics from a tapped word.
///
/// Inner punctuation survives (`"don't!"` becomes `"don't"`).
pub fn trim_tapped(display: &str) -> &str {
    display.trim_matches(|c: char| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_markers_and_punctuation() {
        let tokens = tokenize_page("A *dog* ran   fast.\n*Fire-truck!*");
        let display: Vec<&str> = tokens.iter().map(|t| t.display_text.as_str()).collect();
        let clean: Vec<&str> = tokens.iter().map(|t| t.clean_text.as_str()).collect();
        let marked: Vec<bool> = tokens.iter().map(|t| t.is_marked_interactive).collect();

        assert_eq!(display, ["A", "dog", "ran", "fast.", "Fire-truck!"]);
        assert_eq!(clean, ["A", "dog", "ran", "fast", "Firetruck"]);
        assert_eq!(marked, [false, true, false, false, true]);
        assert_eq!(tokens[1].raw_text, "*dog*");
    }

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(tokenize_page("  \n\t ").is_empty());
        assert_eq!(total_characters(&[]), 0);
    }

    #[test]
    fn weights_count_clean_characters() {
        let tokens = tokenize_page("Hi, *you* \u{2014} there!");
        assert_eq!(
            tokens.iter().map(PageToken::weight).collect::<Vec<_>>(),
            [2, 3, 0, 5]
        );
        assert_eq!(total_characters(&tokens), 10);
    }

    #[test]
    fn plain_text_drops_only_markers() {
        assert_eq!(plain_text("A *dog* ran *fast*."), "A dog ran fast.");
    }

    #[test]
    fn trims_tapped_word_edges() {
        assert_eq!(trim_tapped("\"Hello,"), "Hello");
        assert_eq!(trim_tapped("don't!"), "don't");
        assert_eq!(trim_tapped("..."), "");
    }
}
