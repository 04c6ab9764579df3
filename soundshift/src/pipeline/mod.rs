//! A ready-to-use session: rules compiled and inventories parsed once, then applied
//! to any number of words in either direction

mod error;
pub mod files;

pub use error::{InventoryRole, PipelineError};
pub use files::{read_source_file, SourceFile, SourceFileError};

use crate::compiler::{CompileStats, RuleCompiler};
use crate::config::runtime::{CompilerPreferences, ReverserPreferences};
use crate::derivation::{self, PhonemeDerivation};
use crate::engine::{ForwardEngine, Reverser, TraceStep};
use crate::inventory::{parse_inventory, PhonemeInventory};
use crate::logging::{self, codes};
use crate::rules::Rule;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

/// Compiled rules and both inventories, with a reusable engine for each direction
#[derive(Debug, Clone)]
pub struct Session {
    rules: Vec<Rule>,
    stats: CompileStats,
    source: PhonemeInventory,
    target: PhonemeInventory,
    forward: ForwardEngine,
    reverser: Reverser,
    reverser_preferences: ReverserPreferences,
}

impl Session {
    /// Build a session from rule text and two inventory definitions
    pub fn from_text(rules: &str, source: &str, target: &str) -> Result<Self, PipelineError> {
        Self::from_text_with_preferences(
            rules,
            source,
            target,
            &CompilerPreferences::default(),
            ReverserPreferences::default(),
        )
    }

    pub fn from_text_with_preferences(
        rules: &str,
        source: &str,
        target: &str,
        compiler_preferences: &CompilerPreferences,
        reverser_preferences: ReverserPreferences,
    ) -> Result<Self, PipelineError> {
        let started = Instant::now();

        let compiled = logging::with_source_context("rules", || {
            RuleCompiler::with_preferences(compiler_preferences.clone()).compile(rules)
        })
        .map_err(|err| {
            crate::log_error!(err.error_code(), &err.kind.to_string(),
                line = err.line,
                "text" => err.text
            );
            err
        })?;

        let source = parse_role(source, InventoryRole::Source)?;
        let target = parse_role(target, InventoryRole::Target)?;

        let session = Self::from_parts_with_preferences(
            compiled.rules,
            source,
            target,
            reverser_preferences,
        )
        .with_stats(compiled.stats);

        crate::log_success!(
            codes::success::SESSION_READY,
            "Session ready",
            "rules" => session.rules.len(),
            "source_phonemes" => session.source.len(),
            "target_phonemes" => session.target.len(),
            "duration_ms" => format!("{:.3}", started.elapsed().as_secs_f64() * 1000.0)
        );

        Ok(session)
    }

    /// Read the three files, then build as [`Session::from_text`]
    pub fn from_files(
        rules: &Path,
        source: &Path,
        target: &Path,
    ) -> Result<Self, PipelineError> {
        let rules = read_source_file(rules)?;
        let source = read_source_file(source)?;
        let target = read_source_file(target)?;

        logging::with_source_context(&rules.path, || {
            Self::from_text(&rules.contents, &source.contents, &target.contents)
        })
    }

    /// Build a session from already compiled rules and parsed inventories
    pub fn from_parts(rules: Vec<Rule>, source: PhonemeInventory, target: PhonemeInventory) -> Self {
        Self::from_parts_with_preferences(rules, source, target, ReverserPreferences::default())
    }

    pub fn from_parts_with_preferences(
        rules: Vec<Rule>,
        source: PhonemeInventory,
        target: PhonemeInventory,
        reverser_preferences: ReverserPreferences,
    ) -> Self {
        let forward = ForwardEngine::new(&rules, &source, &target);
        let reverser =
            Reverser::with_preferences(&rules, &source, &target, reverser_preferences.clone());

        Self {
            stats: CompileStats {
                rules_emitted: rules.len(),
                ..CompileStats::default()
            },
            rules,
            source,
            target,
            forward,
            reverser,
            reverser_preferences,
        }
    }

    fn with_stats(mut self, stats: CompileStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn stats(&self) -> &CompileStats {
        &self.stats
    }

    pub fn source(&self) -> &PhonemeInventory {
        &self.source
    }

    pub fn target(&self) -> &PhonemeInventory {
        &self.target
    }

    pub fn forward(&self) -> &ForwardEngine {
        &self.forward
    }

    pub fn apply(&self, word: &str) -> Result<String, PipelineError> {
        Ok(self.forward.apply(word)?)
    }

    pub fn trace(&self, word: &str) -> Result<Vec<TraceStep>, PipelineError> {
        Ok(self.forward.trace(word)?)
    }

    pub fn is_valid_target(&self, word: &str) -> bool {
        self.forward.is_valid_target(word)
    }

    /// Reverse with the session's own reverser, sharing its cache across calls
    pub fn reverse(&mut self, word: &str) -> Result<BTreeSet<String>, PipelineError> {
        Ok(self.reverser.reverse(word)?)
    }

    /// A fresh reverser for another thread
    pub fn new_reverser(&self) -> Reverser {
        Reverser::with_preferences(
            &self.rules,
            &self.source,
            &self.target,
            self.reverser_preferences.clone(),
        )
    }

    pub fn derivation(&self) -> PhonemeDerivation {
        derivation::derive(&self.rules)
    }
}

fn parse_role(text: &str, role: InventoryRole) -> Result<PhonemeInventory, PipelineError> {
    let context = format!("{} inventory", role);
    logging::with_source_context(&context, || parse_inventory(text)).map_err(|err| {
        crate::log_error!(err.error_code(), &err.to_string(), "role" => role);
        PipelineError::inventory(role, err)
    })
}
