//! Phoneme inventories inferred from a rule list
//!
//! Classifies every token the rules mention by how the rules treat it, which is
//! enough to suggest starting source and target inventories for a new rule file.

use crate::rules::{Rule, WORD_BOUNDARY};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhonemeDerivation {
    /// Written by some rule, never rewritten
    pub produced_only: BTreeSet<String>,
    /// Rewritten by some rule, never written
    pub consumed_only: BTreeSet<String>,
    /// Written by one rule and later rewritten everywhere by a context-free rule
    pub intermediate: BTreeSet<String>,
    /// Both written and rewritten, but can survive to the output
    pub persistent: BTreeSet<String>,
    /// Only ever conditions a change
    pub context_only: BTreeSet<String>,
}

impl PhonemeDerivation {
    pub fn suggested_source(&self) -> BTreeSet<String> {
        self.consumed_only
            .iter()
            .chain(&self.persistent)
            .chain(&self.context_only)
            .cloned()
            .collect()
    }

    pub fn suggested_target(&self) -> BTreeSet<String> {
        self.produced_only
            .iter()
            .chain(&self.persistent)
            .chain(&self.context_only)
            .cloned()
            .collect()
    }
}

pub fn derive(rules: &[Rule]) -> PhonemeDerivation {
    let produced: BTreeSet<&String> = rules.iter().flat_map(|r| &r.to).collect();
    let consumed: BTreeSet<&String> = rules.iter().flat_map(|r| &r.from).collect();

    let mut derivation = PhonemeDerivation::default();

    for token in produced.union(&consumed) {
        let owned = (*token).clone();
        match (produced.contains(token), consumed.contains(token)) {
            (true, false) => {
                derivation.produced_only.insert(owned);
            }
            (false, true) => {
                derivation.consumed_only.insert(owned);
            }
            _ if is_intermediate(rules, token) => {
                derivation.intermediate.insert(owned);
            }
            _ => {
                derivation.persistent.insert(owned);
            }
        }
    }

    derivation.context_only = rules
        .iter()
        .flat_map(|r| r.left_context.iter().chain(&r.right_context).flatten())
        .filter(|t| t.as_str() != WORD_BOUNDARY)
        .filter(|t| !produced.contains(t) && !consumed.contains(t))
        .cloned()
        .collect();

    derivation
}

/// Every rule producing `token` is followed by a context-free rule rewriting it
fn is_intermediate(rules: &[Rule], token: &str) -> bool {
    let mut produced = false;
    for (index, rule) in rules.iter().enumerate() {
        if rule.to.iter().any(|t| t == token) {
            produced = true;
            if !rules[index + 1..]
                .iter()
                .any(|later| rewrites_unconditionally(later, token))
            {
                return false;
            }
        }
    }
    produced
}

fn rewrites_unconditionally(rule: &Rule, token: &str) -> bool {
    !rule.has_context() && rule.from.len() == 1 && rule.from[0] == token
}
