//! Phoneme inventories and their phonotactic word-shape patterns

pub mod error;
pub mod parser;

pub use error::InventoryError;
pub use parser::parse_inventory;

use crate::phonotactics::PhonotacticPattern;
use crate::tokenizer::CompiledInventory;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Literal phonemes plus the patterns words built from them must follow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonemeInventory {
    phonemes: BTreeSet<String>,
    patterns: Vec<PhonotacticPattern>,
    /// Named classes the inventory was declared with
    classes: BTreeMap<String, BTreeSet<String>>,
}

impl PhonemeInventory {
    pub fn new<I, S>(phonemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phonemes: phonemes
                .into_iter()
                .filter_map(|p| {
                    let p: String = p.into();
                    (!p.is_empty()).then_some(p)
                })
                .collect(),
            patterns: Vec::new(),
            classes: BTreeMap::new(),
        }
    }

    pub fn with_patterns(mut self, patterns: Vec<PhonotacticPattern>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_classes(mut self, classes: BTreeMap<String, BTreeSet<String>>) -> Self {
        self.classes = classes;
        self
    }

    pub fn phonemes(&self) -> &BTreeSet<String> {
        &self.phonemes
    }

    pub fn patterns(&self) -> &[PhonotacticPattern] {
        &self.patterns
    }

    pub fn classes(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.classes
    }

    /// Patterns to check words against; `None` when the inventory is unconstrained
    pub fn phonotactics(&self) -> Option<&[PhonotacticPattern]> {
        (!self.patterns.is_empty()).then_some(self.patterns.as_slice())
    }

    pub fn is_constrained(&self) -> bool {
        !self.patterns.is_empty()
    }

    pub fn contains(&self, phoneme: &str) -> bool {
        self.phonemes.contains(phoneme)
    }

    pub fn len(&self) -> usize {
        self.phonemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phonemes.is_empty()
    }

    /// Sort the phonemes once for repeated tokenization
    pub fn compile(&self) -> CompiledInventory {
        CompiledInventory::from_inventory(self)
    }
}

impl<S: Into<String>> FromIterator<S> for PhonemeInventory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
