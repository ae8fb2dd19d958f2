use regex::Regex;
use serde::{Deserialize, Serialize};

use super::tokenize::{trim_tapped, PageToken};

/// Shortest phrase part or token that can match on its own.
const MIN_MATCH_LEN: usize = 2;

/// A word or short phrase the learner has collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    pub id: String,
    pub word: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub image_url: String,
}

impl VocabularyEntry {
    pub fn new(id: impl Into<String>, word: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            word: word.into(),
            definition: String::new(),
            image_url: String::new(),
        }
    }
}

/// How a token relates to the collected vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Author-marked and in the collection.
    Marked,
    /// In the collection without a marker, e.g. a word collected after the
    /// story was written.
    Collected,
    /// Not vocabulary. Still tappable for a dictionary lookup.
    Plain,
}

/// Split a vocabulary word into its space or hyphen separated parts.
pub fn entry_parts(word: &str) -> Vec<&str> {
    word.split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Tokens shorter than two characters never match, except "I".
fn is_matchable(token: &str) -> bool {
    char_len(token) >= MIN_MATCH_LEN || token == "i"
}

/// Equal up to a trailing `s`/`es` on the token, or a trailing `s` on the word.
fn plural_equal(token: &str, word: &str) -> bool {
    if token == word {
        return true;
    }
    if let Some(stem) = token.strip_suffix('s') {
        if stem == word || token.strip_suffix("es") == Some(word) {
            return true;
        }
    }
    word.strip_suffix('s') == Some(token)
}

fn entry_matches(token: &str, entry: &VocabularyEntry) -> bool {
    let word = entry.word.trim().to_lowercase();
    if plural_equal(token, &word) {
        return true;
    }

    let parts = entry_parts(&word);
    parts.len() > 1
        && parts
            .iter()
            .any(|part| char_len(part) >= MIN_MATCH_LEN && plural_equal(token, part))
}

/// First vocabulary entry, in caller order, that `clean_token` refers to.
///
/// Matching is case-insensitive and tolerates simple plurals in both
/// directions. A multi-word entry also matches any one of its parts of two or
/// more characters, so "fire truck" matches "truck" but "a fire truck" never
/// matches "a".
pub fn find_vocabulary_match<'a>(
    clean_token: &str,
    vocabulary: &'a [VocabularyEntry],
) -> Option<&'a VocabularyEntry> {
    find_vocabulary_index(clean_token, vocabulary).map(|index| &vocabulary[index])
}

/// Position of the entry [`find_vocabulary_match`] would return.
pub fn find_vocabulary_index(clean_token: &str, vocabulary: &[VocabularyEntry]) -> Option<usize> {
    let token = clean_token.to_lowercase();
    if !is_matchable(&token) {
        return None;
    }
    vocabulary.iter().position(|entry| entry_matches(&token, entry))
}

/// Entry a page token refers to.
///
/// The edge-trimmed word is tried first so inner hyphens and apostrophes
/// survive ("fire-truck", "jack-o-lantern"), then the fully cleaned text.
pub fn find_token_match(token: &PageToken, vocabulary: &[VocabularyEntry]) -> Option<usize> {
    find_vocabulary_index(trim_tapped(&token.display_text), vocabulary)
        .or_else(|| find_vocabulary_index(&token.clean_text, vocabulary))
}

pub fn interaction_for(token: &PageToken, matched: Option<&VocabularyEntry>) -> Interaction {
    match (matched, token.is_marked_interactive) {
        (Some(_), true) => Interaction::Marked,
        (Some(_), false) => Interaction::Collected,
        // A marker on a word the learner has not collected is not enough.
        (None, _) => Interaction::Plain,
    }
}

/// Whether tapping `token` reveals a vocabulary entry rather than looking up a
/// plain word.
pub fn is_eligible_for_interaction(token: &PageToken, matched: Option<&VocabularyEntry>) -> bool {
    interaction_for(token, matched) != Interaction::Plain
}

/// Entries worth hinting as "find these on this page".
///
/// An entry is a target when any of its parts occurs as a whole word in
/// `page_text`, optionally followed by `s` or `es`. Parts shorter than two
/// characters only count for single-word entries.
pub fn compute_page_vocabulary_targets<'a>(
    page_text: &str,
    vocabulary: &'a [VocabularyEntry],
) -> Vec<&'a VocabularyEntry> {
    page_target_indices(page_text, vocabulary)
        .into_iter()
        .map(|index| &vocabulary[index])
        .collect()
}

/// Positions of the entries [`compute_page_vocabulary_targets`] returns.
pub fn page_target_indices(page_text: &str, vocabulary: &[VocabularyEntry]) -> Vec<usize> {
    vocabulary
        .iter()
        .enumerate()
        .filter(|(_, entry)| {
            entry_pattern(&entry.word).is_some_and(|re| re.is_match(page_text))
        })
        .map(|(index, _)| index)
        .collect()
}

/// One word-boundary pattern covering every part of an entry that may match
/// on its own. `None` when no part qualifies.
fn entry_pattern(word: &str) -> Option<Regex> {
    let word = word.to_lowercase();
    let parts = entry_parts(&word);
    let single = parts.len() == 1;
    let alternatives: Vec<String> = parts
        .iter()
        .filter(|part| single || char_len(part) >= MIN_MATCH_LEN)
        .map(|part| regex::escape(part))
        .collect();
    if alternatives.is_empty() {
        return None;
    }

    let pattern = format!(r"(?i)\b(?:{})(?:s|es)?\b", alternatives.join("|"));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("Skipping vocabulary word {word:?}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tokenize::PageToken;

    fn vocab(words: &[(&str, &str)]) -> Vec<VocabularyEntry> {
        words
            .iter()
            .map(|(id, word)| VocabularyEntry::new(*id, *word))
            .collect()
    }

    fn matched_id<'a>(token: &str, vocabulary: &'a [VocabularyEntry]) -> Option<&'a str> {
        find_vocabulary_match(token, vocabulary).map(|e| e.id.as_str())
    }

    #[test]
    fn exact_match_ignores_case() {
        let v = vocab(&[("w1", "Dog")]);
        assert_eq!(matched_id("dog", &v), Some("w1"));
        assert_eq!(matched_id("DOG", &v), Some("w1"));
        assert_eq!(matched_id("dot", &v), None);
    }

    #[test]
    fn tolerates_plurals_both_ways() {
        let singular = vocab(&[("t", "truck"), ("b", "box")]);
        assert_eq!(matched_id("truck", &singular), Some("t"));
        assert_eq!(matched_id("trucks", &singular), Some("t"));
        assert_eq!(matched_id("boxes", &singular), Some("b"));
        assert_eq!(matched_id("truckss", &singular), None);

        let plural = vocab(&[("t", "trucks")]);
        assert_eq!(matched_id("truck", &plural), Some("t"));
    }

    #[test]
    fn matches_phrase_parts() {
        let v = vocab(&[("f", "fire truck")]);
        assert_eq!(matched_id("truck", &v), Some("f"));
        assert_eq!(matched_id("fire", &v), Some("f"));
        assert_eq!(matched_id("trucks", &v), Some("f"));

        let hyphen = vocab(&[("j", "jack-in-the-box")]);
        assert_eq!(matched_id("box", &hyphen), Some("j"));
    }

    #[test]
    fn short_phrase_parts_never_match() {
        let v = vocab(&[("f", "a fire truck"), ("c", "cup of tea")]);
        assert_eq!(matched_id("a", &v), None);
        assert_eq!(matched_id("as", &v), None);
        assert_eq!(matched_id("of", &v), Some("c"));
        assert_eq!(matched_id("fire", &v), Some("f"));
    }

    #[test]
    fn short_tokens_are_ignored_except_i() {
        let v = vocab(&[("x", "x"), ("i", "I")]);
        assert_eq!(matched_id("x", &v), None);
        assert_eq!(matched_id("i", &v), Some("i"));
        assert_eq!(matched_id("I", &v), Some("i"));
        assert_eq!(matched_id("", &v), None);
    }

    #[test]
    fn first_entry_wins() {
        let v = vocab(&[("phrase", "red ball"), ("ball", "ball")]);
        assert_eq!(matched_id("ball", &v), Some("phrase"));

        let reversed = vocab(&[("ball", "ball"), ("phrase", "red ball")]);
        assert_eq!(matched_id("ball", &reversed), Some("ball"));
    }

    #[test]
    fn interaction_needs_a_match() {
        let v = vocab(&[("w1", "dog")]);
        let marked = PageToken::parse("*dog*");
        let unmarked = PageToken::parse("dog,");
        let marked_unknown = PageToken::parse("*cat*");

        let hit = find_vocabulary_match(&marked.clean_text, &v);
        assert_eq!(interaction_for(&marked, hit), Interaction::Marked);
        assert_eq!(
            interaction_for(&unmarked, find_vocabulary_match(&unmarked.clean_text, &v)),
            Interaction::Collected
        );
        assert!(is_eligible_for_interaction(&unmarked, hit));

        let miss = find_vocabulary_match(&marked_unknown.clean_text, &v);
        assert!(miss.is_none());
        assert!(!is_eligible_for_interaction(&marked_unknown, miss));
    }

    #[test]
    fn page_targets_use_word_boundaries() {
        let v = vocab(&[
            ("art", "art"),
            ("dog", "dog"),
            ("box", "toy box"),
            ("a", "a"),
            ("ant", "an ant"),
        ]);
        let ids = |text: &str| -> Vec<String> {
            compute_page_vocabulary_targets(text, &v)
                .into_iter()
                .map(|e| e.id.clone())
                .collect()
        };

        assert_eq!(ids("The cart rolled by."), Vec::<String>::new());
        assert_eq!(ids("Two *Dogs* and some boxes!"), ["dog", "box"]);
        assert_eq!(ids("Look at a bird"), ["a"]);
        // "a" is a single-word entry, "an" is a significant part of "an ant".
        assert_eq!(ids("An apple"), ["ant"]);
        assert_eq!(ids("Ants everywhere"), ["ant"]);
    }

    #[test]
    fn page_targets_escape_regex_characters() {
        let v = vocab(&[("q", "what?"), ("p", "c++")]);
        assert!(compute_page_vocabulary_targets("what is this", &v).is_empty());
    }

    #[test]
    fn tokens_keep_inner_hyphens_and_apostrophes() {
        let v = vocab(&[("f", "fire-truck"), ("j", "jack-o-lantern"), ("d", "don't")]);
        let index = |chunk: &str| find_token_match(&PageToken::parse(chunk), &v);
        assert_eq!(index("*fire-truck*,"), Some(0));
        assert_eq!(index("Fire-Trucks"), Some(0));
        assert_eq!(index("jack-o-lantern!"), Some(1));
        assert_eq!(index("\"Don't"), Some(2));
        assert_eq!(index("lantern."), Some(1));
        assert_eq!(index("firetruck"), None);
    }

    #[test]
    fn cleaned_text_is_the_second_chance() {
        let v = vocab(&[("d", "dog")]);
        assert_eq!(find_token_match(&PageToken::parse("d.o.g"), &v), Some(0));
        assert_eq!(find_vocabulary_index("cat", &v), None);
    }

    #[test]
    fn target_indices_follow_caller_order() {
        let v = vocab(&[("c", "cat"), ("x", "zebra"), ("d", "hot dog")]);
        assert_eq!(page_target_indices("Two dogs and a cat.", &v), [0, 2]);
    }

    #[test]
    fn deserializes_camel_case_entries() {
        let entry: VocabularyEntry =
            serde_json::from_str(r#"{"id":"w1","word":"dog","imageUrl":"dog.png"}"#).unwrap();
        assert_eq!(entry.image_url, "dog.png");
        assert_eq!(entry.definition, "");
    }
}
