//! Word-shape constraints as positional token-set patterns

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// An ordered sequence of slots, each listing the tokens allowed there
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PhonotacticPattern {
    positions: Vec<BTreeSet<String>>,
}

impl PhonotacticPattern {
    pub fn new(positions: Vec<BTreeSet<String>>) -> Self {
        Self { positions }
    }

    /// Build a pattern from per-slot token lists
    pub fn from_slots<I, S>(slots: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            positions: slots
                .into_iter()
                .map(|slot| slot.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn positions(&self) -> &[BTreeSet<String>] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Exact-length positional membership
    pub fn matches<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        tokens.len() == self.positions.len()
            && tokens
                .iter()
                .zip(&self.positions)
                .all(|(token, allowed)| allowed.contains(token.as_ref()))
    }
}

impl fmt::Display for PhonotacticPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in &self.positions {
            let members: Vec<&str> = slot.iter().map(String::as_str).collect();
            write!(f, "[{}]", members.join(" "))?;
        }
        Ok(())
    }
}

/// Whether `tokens` satisfies at least one pattern
///
/// `None` means the inventory declares no phonotactics, so every word is allowed.
/// An empty pattern list admits nothing.
pub fn matches<S: AsRef<str>>(tokens: &[S], patterns: Option<&[PhonotacticPattern]>) -> bool {
    match patterns {
        None => true,
        Some(patterns) => patterns.iter().any(|pattern| pattern.matches(tokens)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cv() -> PhonotacticPattern {
        PhonotacticPattern::from_slots(vec![vec!["p", "t", "k"], vec!["a", "i"]])
    }

    #[test]
    fn test_absent_patterns_are_unconstrained() {
        assert!(matches(&["x", "y", "z"], None));
        assert!(matches::<&str>(&[], None));
    }

    #[test]
    fn test_positional_membership() {
        let patterns = vec![cv()];
        assert!(matches(&["t", "a"], Some(patterns.as_slice())));
        assert!(!matches(&["a", "t"], Some(patterns.as_slice())));
        assert!(!matches(&["t", "a", "k"], Some(patterns.as_slice())));
    }

    #[test]
    fn test_or_semantics_across_patterns() {
        let cvc = PhonotacticPattern::from_slots(vec![vec!["t"], vec!["a"], vec!["k"]]);
        let patterns = vec![cv(), cvc];
        assert!(matches(&["k", "i"], Some(patterns.as_slice())));
        assert!(matches(&["t", "a", "k"], Some(patterns.as_slice())));
        assert!(!matches(&["k", "a", "t"], Some(patterns.as_slice())));
    }

    #[test]
    fn test_empty_pattern_list_admits_nothing() {
        assert!(!matches(&["t", "a"], Some(&[][..])));
    }

    #[test]
    fn test_display() {
        assert_eq!(cv().to_string(), "[k p t][a i]");
    }
}
