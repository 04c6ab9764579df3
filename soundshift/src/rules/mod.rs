//! Compiled rewrite rules and context matching shared by both directions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Context token marking the edge of the word
pub const WORD_BOUNDARY: &str = "#";

/// A concrete rewrite rule: no classes, variables or optional groups remain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub from: Vec<String>,
    /// Empty for deletion rules
    pub to: Vec<String>,
    pub left_context: Option<Vec<String>>,
    pub right_context: Option<Vec<String>>,
    /// 1-based line of the statement this rule was expanded from
    pub line: usize,
}

impl Rule {
    pub fn new<S: Into<String>>(from: Vec<S>, to: Vec<S>) -> Self {
        Self {
            from: from.into_iter().map(Into::into).collect(),
            to: to.into_iter().map(Into::into).collect(),
            left_context: None,
            right_context: None,
            line: 0,
        }
    }

    pub fn with_left<S: Into<String>>(mut self, context: Vec<S>) -> Self {
        self.left_context = Some(context.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_right<S: Into<String>>(mut self, context: Vec<S>) -> Self {
        self.right_context = Some(context.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn is_deletion(&self) -> bool {
        self.to.is_empty()
    }

    pub fn has_context(&self) -> bool {
        self.left_context.is_some() || self.right_context.is_some()
    }

    /// Whether the tokens before `start` satisfy the left context
    ///
    /// A leading `#` pins the rest of the context to the start of the word, so
    /// `["#"]` alone means "at the start".
    pub fn left_matches(&self, tokens: &[String], start: usize) -> bool {
        let Some(context) = &self.left_context else {
            return true;
        };

        match context.split_first() {
            Some((first, rest)) if first == WORD_BOUNDARY => {
                start == rest.len() && tokens[..start] == *rest
            }
            _ => start >= context.len() && tokens[start - context.len()..start] == context[..],
        }
    }

    /// Whether the tokens from `end` on satisfy the right context
    ///
    /// A trailing `#` pins the rest of the context to the end of the word.
    pub fn right_matches(&self, tokens: &[String], end: usize) -> bool {
        let Some(context) = &self.right_context else {
            return true;
        };

        match context.split_last() {
            Some((last, rest)) if last == WORD_BOUNDARY => {
                tokens.len() - end == rest.len() && tokens[end..] == *rest
            }
            _ => end + context.len() <= tokens.len() && tokens[end..end + context.len()] == context[..],
        }
    }

    /// Whether both contexts hold around the span `start..end`
    pub fn context_holds(&self, tokens: &[String], start: usize, end: usize) -> bool {
        self.left_matches(tokens, start) && self.right_matches(tokens, end)
    }

    /// Whether `from` occurs at `start` with both contexts satisfied
    pub fn matches_at(&self, tokens: &[String], start: usize) -> bool {
        let end = start + self.from.len();
        end <= tokens.len()
            && tokens[start..end] == self.from[..]
            && self.context_holds(tokens, start, end)
    }

    /// Every token mentioned by the rule, boundary marker excluded
    pub fn tokens(&self) -> impl Iterator<Item = &String> {
        self.from
            .iter()
            .chain(&self.to)
            .chain(self.left_context.iter().flatten())
            .chain(self.right_context.iter().flatten())
            .filter(|t| t.as_str() != WORD_BOUNDARY)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let to = if self.to.is_empty() {
            "∅".to_string()
        } else {
            self.to.join(" ")
        };
        write!(f, "{} > {}", self.from.join(" "), to)?;

        if self.has_context() {
            let mut context = Vec::new();
            if let Some(left) = &self.left_context {
                context.push(left.join(" "));
            }
            context.push("_".to_string());
            if let Some(right) = &self.right_context {
                context.push(right.join(" "));
            }
            write!(f, " / {}", context.join(" "))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(word: &str) -> Vec<String> {
        word.chars().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_plain_contexts() {
        let rule = Rule::new(vec!["a"], vec!["b"]).with_left(vec!["c"]).with_right(vec!["d"]);
        let word = tokens("cad");
        assert!(rule.matches_at(&word, 1));
        assert!(!rule.matches_at(&word, 0));
        assert!(!rule.matches_at(&tokens("ca"), 1));
    }

    #[test]
    fn test_word_boundary() {
        let initial = Rule::new(vec!["a"], vec!["b"]).with_left(vec!["#"]);
        assert!(initial.matches_at(&tokens("aa"), 0));
        assert!(!initial.matches_at(&tokens("aa"), 1));

        let final_ = Rule::new(vec!["a"], vec!["b"]).with_right(vec!["#"]);
        assert!(final_.matches_at(&tokens("aa"), 1));
        assert!(!final_.matches_at(&tokens("aa"), 0));
    }

    #[test]
    fn test_anchored_multi_token_context() {
        let rule = Rule::new(vec!["a"], vec!["b"]).with_left(vec!["#", "s"]);
        assert!(rule.matches_at(&tokens("sa"), 1));
        assert!(!rule.matches_at(&tokens("tsa"), 2));

        let rule = Rule::new(vec!["a"], vec!["b"]).with_right(vec!["s", "#"]);
        assert!(rule.matches_at(&tokens("as"), 0));
        assert!(!rule.matches_at(&tokens("ast"), 0));
    }

    #[test]
    fn test_display() {
        let rule = Rule::new(vec!["a"], vec!["x"]).with_left(vec!["c"]);
        assert_eq!(rule.to_string(), "a > x / c _");

        let deletion = Rule::new(vec!["h"], vec![]).with_right(vec!["#"]);
        assert_eq!(deletion.to_string(), "h > ∅ / _ #");

        assert_eq!(Rule::new(vec!["a", "b"], vec!["c"]).to_string(), "a b > c");
    }

    #[test]
    fn test_serializes_to_json() {
        let rule = Rule::new(vec!["a"], vec!["b"]).with_line(3);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["from"][0], "a");
        assert_eq!(json["left_context"], serde_json::Value::Null);
        assert_eq!(json["line"], 3);
    }
}
