//! Forward application: rules folded over a tokenized word in declaration order

use crate::inventory::PhonemeInventory;
use crate::logging::codes;
use crate::phonotactics::{self, PhonotacticPattern};
use crate::rules::Rule;
use crate::tokenizer::{CompiledInventory, TokenizationError};
use serde::Serialize;

/// Apply one rule in a single left-to-right pass
///
/// Contexts are checked against the sequence as modified so far in this pass.
/// After a replacement the scan resumes behind the inserted tokens, so matches never
/// overlap and never see their own output.
pub fn apply_rule(mut tokens: Vec<String>, rule: &Rule) -> Vec<String> {
    let width = rule.from.len();
    let mut position = 0;

    while position + width <= tokens.len() {
        if rule.matches_at(&tokens, position) {
            tokens.splice(position..position + width, rule.to.iter().cloned());
            position += rule.to.len();
        } else {
            position += 1;
        }
    }

    tokens
}

/// The word after a rule that changed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    /// Position of the rule in the compiled list
    pub rule_index: usize,
    pub rule: Rule,
    pub word: String,
}

/// Forward engine with both inventories compiled once
#[derive(Debug, Clone)]
pub struct ForwardEngine {
    rules: Vec<Rule>,
    source: CompiledInventory,
    target: CompiledInventory,
    target_patterns: Option<Vec<PhonotacticPattern>>,
}

impl ForwardEngine {
    pub fn new(rules: &[Rule], source: &PhonemeInventory, target: &PhonemeInventory) -> Self {
        Self {
            rules: rules.to_vec(),
            source: source.compile(),
            target: target.compile(),
            target_patterns: target.phonotactics().map(<[_]>::to_vec),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn apply(&self, word: &str) -> Result<String, TokenizationError> {
        let tokens = self.source.tokenize(word)?;
        let output = self
            .rules
            .iter()
            .fold(tokens, |tokens, rule| apply_rule(tokens, rule))
            .concat();

        crate::log_debug!("Word derived", "input" => word, "output" => output);
        Ok(output)
    }

    /// Apply every rule, recording the word after each rule that changed it
    pub fn trace(&self, word: &str) -> Result<Vec<TraceStep>, TokenizationError> {
        let mut tokens = self.source.tokenize(word)?;
        let mut steps = Vec::new();

        for (rule_index, rule) in self.rules.iter().enumerate() {
            let next = apply_rule(tokens.clone(), rule);
            if next != tokens {
                steps.push(TraceStep {
                    rule_index,
                    rule: rule.clone(),
                    word: next.concat(),
                });
            }
            tokens = next;
        }

        Ok(steps)
    }

    /// Whether `word` tokenizes under the target inventory and fits its phonotactics
    pub fn is_valid_target(&self, word: &str) -> bool {
        self.target
            .tokenize(word)
            .map(|tokens| phonotactics::matches(&tokens, self.target_patterns.as_deref()))
            .unwrap_or(false)
    }
}

/// Derive `word` through `rules`
pub fn apply(
    word: &str,
    rules: &[Rule],
    source: &PhonemeInventory,
    target: &PhonemeInventory,
) -> Result<String, TokenizationError> {
    let output = ForwardEngine::new(rules, source, target).apply(word)?;

    crate::log_success!(
        codes::success::FORWARD_APPLICATION_COMPLETE,
        "Forward application completed",
        "input" => word,
        "output" => output,
        "rules" => rules.len()
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::inventory::parse_inventory;
    use assert_matches::assert_matches;

    fn tokens(word: &str) -> Vec<String> {
        word.chars().map(|c| c.to_string()).collect()
    }

    fn inventory(phonemes: &str) -> PhonemeInventory {
        PhonemeInventory::new(phonemes.split_whitespace())
    }

    #[test]
    fn test_earliest_match_non_overlapping() {
        let rule = Rule::new(vec!["a", "a"], vec!["b"]);
        assert_eq!(apply_rule(tokens("aaa"), &rule).concat(), "ba");
    }

    #[test]
    fn test_no_reapplication_to_own_output() {
        let rule = Rule::new(vec!["a"], vec!["a", "a"]);
        assert_eq!(apply_rule(tokens("aa"), &rule).concat(), "aaaa");
    }

    #[test]
    fn test_context_sees_earlier_replacements() {
        let rule = Rule::new(vec!["a"], vec!["b"]).with_left(vec!["b"]);
        assert_eq!(apply_rule(tokens("baa"), &rule).concat(), "bbb");
    }

    #[test]
    fn test_deletion() {
        let rule = Rule::new(vec!["h"], vec![]).with_right(vec!["#"]);
        assert_eq!(apply_rule(tokens("hah"), &rule).concat(), "ha");
    }

    #[test]
    fn test_rules_fold_in_order() {
        let rules = compile("a > b\nb > c").unwrap();
        let output = apply("ab", &rules, &inventory("a b"), &inventory("c")).unwrap();
        assert_eq!(output, "cc");
    }

    #[test]
    fn test_multi_character_phonemes() {
        let rules = compile("th > t / _ #").unwrap();
        let output = apply("thath", &rules, &inventory("t h th a"), &inventory("t h a")).unwrap();
        assert_eq!(output, "that");
    }

    #[test]
    fn test_untokenizable_input() {
        let err = apply("abx", &[], &inventory("a b"), &inventory("a b")).unwrap_err();
        assert_eq!(err.position, 2);
        assert_eq!(err.character, 'x');
    }

    #[test]
    fn test_trace_records_changes_only() {
        let rules = compile("a > b\nx > y\nb > c").unwrap();
        let engine = ForwardEngine::new(&rules, &inventory("a"), &inventory("c"));
        let steps = engine.trace("a").unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].word, "b");
        assert_eq!(steps[1].rule_index, 2);
        assert_eq!(steps[1].word, "c");
    }

    #[test]
    fn test_valid_target() {
        let target = parse_inventory("C = [p]\nV = [a]\nCV").unwrap();
        let engine = ForwardEngine::new(&[], &inventory("p a"), &target);
        assert!(engine.is_valid_target("pa"));
        assert!(!engine.is_valid_target("pap"));
        assert!(!engine.is_valid_target("pz"));
        assert_matches!(engine.apply("z"), Err(TokenizationError { character: 'z', .. }));
    }
}
