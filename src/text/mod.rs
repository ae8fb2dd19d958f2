//! Page text tokenization and vocabulary matching.
//!
//! Page text is plain prose where author-intended vocabulary words are
//! wrapped in asterisks (`A *dog* ran fast.`). The markers never reach the
//! rendered or spoken text.
//!
//! # Examples
//!
//! ```rust
//! use storybook_narration::text::{find_vocabulary_match, tokenize_page, VocabularyEntry};
//!
//! let tokens = tokenize_page("Two *fire trucks* raced by.");
//! let vocabulary = vec![VocabularyEntry::new("w1", "fire truck")];
//!
//! let hit = find_vocabulary_match(&tokens[2].clean_text, &vocabulary);
//! assert_eq!(hit.map(|e| e.id.as_str()), Some("w1"));
//! ```

pub mod found;
pub mod matcher;
pub mod tokenize;

pub use found::{record_found, FoundState};
pub use matcher::{
    compute_page_vocabulary_targets, find_token_match, find_vocabulary_index,
    find_vocabulary_match, interaction_for, is_eligible_for_interaction, page_target_indices,
    Interaction, VocabularyEntry,
};
pub use tokenize::{plain_text, tokenize_page, total_characters, PageToken};
