//! Greedy longest-match segmentation of words into phoneme tokens
//!
//! A [`CompiledInventory`] sorts the phoneme list once so that many words can be
//! tokenized without re-sorting. Longer phonemes always win; equal lengths fall back
//! to lexicographic order so forward and backward application segment identically.

pub mod error;

pub use error::TokenizationError;

use crate::inventory::PhonemeInventory;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Inventory tokens pre-sorted for repeated tokenization
#[derive(Debug, Clone, Default)]
pub struct CompiledInventory {
    /// All tokens, longest first, ties broken lexicographically
    sorted: Vec<String>,
    /// Indices into `sorted` grouped by first character, order preserved
    by_first_char: HashMap<char, Vec<usize>>,
    members: HashSet<String>,
    characters: HashSet<char>,
}

impl CompiledInventory {
    pub fn new<I, S>(phonemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorted: Vec<String> = phonemes
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .filter(|p| !p.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        sorted.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });

        let mut by_first_char: HashMap<char, Vec<usize>> = HashMap::new();
        for (index, token) in sorted.iter().enumerate() {
            if let Some(first) = token.chars().next() {
                by_first_char.entry(first).or_default().push(index);
            }
        }

        let members = sorted.iter().cloned().collect();
        let characters = sorted.iter().flat_map(|t| t.chars()).collect();

        Self {
            sorted,
            by_first_char,
            members,
            characters,
        }
    }

    pub fn from_inventory(inventory: &PhonemeInventory) -> Self {
        Self::new(inventory.phonemes())
    }

    /// Segment `word` into phoneme tokens
    ///
    /// The empty word yields an empty sequence.
    pub fn tokenize(&self, word: &str) -> Result<Vec<String>, TokenizationError> {
        let mut tokens = Vec::new();
        let mut rest = word;
        let mut position = 0;

        while let Some(first) = rest.chars().next() {
            let matched = self
                .by_first_char
                .get(&first)
                .and_then(|indices| {
                    indices
                        .iter()
                        .map(|&i| &self.sorted[i])
                        .find(|token| rest.starts_with(token.as_str()))
                })
                .ok_or_else(|| TokenizationError::new(word, position, first))?;

            tokens.push(matched.clone());
            rest = &rest[matched.len()..];
            position += matched.chars().count();
        }

        Ok(tokens)
    }

    /// Whether `word` can be segmented at all
    pub fn can_tokenize(&self, word: &str) -> bool {
        self.tokenize(word).is_ok()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.members.contains(token)
    }

    /// Whether any phoneme uses this character
    pub fn uses_char(&self, c: char) -> bool {
        self.characters.contains(&c)
    }

    pub fn tokens(&self) -> &[String] {
        &self.sorted
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}

/// Tokenize a single word, sorting the inventory for this call only
pub fn tokenize(word: &str, inventory: &PhonemeInventory) -> Result<Vec<String>, TokenizationError> {
    CompiledInventory::from_inventory(inventory).tokenize(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn inventory(tokens: &[&str]) -> CompiledInventory {
        CompiledInventory::new(tokens.iter().copied())
    }

    #[test]
    fn test_longest_match_wins() {
        let inv = inventory(&["t", "s", "ts", "a"]);
        assert_eq!(inv.tokenize("tsat").unwrap(), vec!["ts", "a", "t"]);
    }

    #[test]
    fn test_multichar_and_non_ascii_tokens() {
        let inv = inventory(&["tʃ", "a", "ʃ", "t"]);
        assert_eq!(inv.tokenize("tʃaʃt").unwrap(), vec!["tʃ", "a", "ʃ", "t"]);
    }

    #[test]
    fn test_empty_word_is_empty_sequence() {
        let inv = inventory(&["a"]);
        assert!(inv.tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_error_reports_character_position() {
        let inv = inventory(&["ʃ", "a"]);
        let err = inv.tokenize("ʃaxa").unwrap_err();
        assert_matches!(
            err,
            TokenizationError { position: 2, character: 'x', .. }
        );
        assert_eq!(err.word, "ʃaxa");
        assert_eq!(err.error_code().as_str(), "E050");
    }

    #[test]
    fn test_sort_order_is_length_then_lexicographic() {
        let inv = inventory(&["b", "aa", "a", "ab", "abc"]);
        assert_eq!(inv.tokens(), &["abc", "aa", "ab", "a", "b"]);
    }

    #[test]
    fn test_greedy_does_not_backtrack() {
        // "ab" is consumed greedily, leaving "c" which is not in the inventory
        let inv = inventory(&["ab", "a", "bc"]);
        assert_matches!(inv.tokenize("abc"), Err(TokenizationError { position: 2, .. }));
    }

    #[test]
    fn test_membership_helpers() {
        let inv = inventory(&["th", "e", ""]);
        assert_eq!(inv.len(), 2);
        assert!(inv.contains("th"));
        assert!(!inv.contains("t"));
        assert!(inv.uses_char('t'));
        assert!(!inv.uses_char('x'));
        assert!(inv.can_tokenize("the"));
    }
}
