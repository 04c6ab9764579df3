//! Rule compiler: rule text to a flat, ordered list of concrete rules
//!
//! Phases run to completion one after another:
//! line classification, variable resolution, substitution, universe collection and
//! negative-set expansion, structural parse, optional-group expansion, class
//! expansion, and the final Cartesian combination.

pub mod classes;
pub mod combination;
pub mod error;
pub mod lines;
pub mod negation;
pub mod optional;
pub mod scan;
pub mod structure;
pub mod substitution;
pub mod variables;

pub use error::{CompileError, CompileErrorKind, ContextSide};

use crate::config::runtime::CompilerPreferences;
use crate::logging::codes;
use crate::rules::Rule;
use lines::{Statement, StatementKind};
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use variables::{ResolvedVariables, VariableDefinition, VariableTable};

/// Counters gathered while compiling
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompileStats {
    pub statements: usize,
    pub variables: usize,
    pub rule_statements: usize,
    pub rules_emitted: usize,
    pub universe_size: usize,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
    }
}

/// Compiled rules with the statistics of the run that produced them
#[derive(Debug, Clone, Serialize)]
pub struct CompiledRuleSet {
    pub rules: Vec<Rule>,
    pub stats: CompileStats,
}

/// A rule statement after substitution and negative-set expansion
#[derive(Debug, Clone)]
struct PreparedStatement {
    line: usize,
    source: String,
    text: String,
}

/// Compiler carrying runtime preferences
#[derive(Debug, Clone, Default)]
pub struct RuleCompiler {
    preferences: CompilerPreferences,
}

impl RuleCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: CompilerPreferences) -> Self {
        Self { preferences }
    }

    pub fn compile(&self, text: &str) -> Result<CompiledRuleSet, CompileError> {
        let started = Instant::now();

        let statements = self.timed("classification", || lines::classify(text))?;
        let (table, rule_statements) = self.collect_variables(statements)?;
        let resolved = self.timed("resolution", || table.resolve_all())?;
        let prepared = self.timed("substitution", || {
            prepare_statements(&rule_statements, &resolved)
        })?;

        let mut rules = Vec::new();
        for statement in &prepared.statements {
            let expanded = compile_statement(statement)
                .map_err(|kind| CompileError::new(statement.line, &statement.source, kind))?;

            if self.preferences.log_expansion_details {
                for rule in &expanded {
                    crate::log_debug!("Rule expanded",
                        "line" => statement.line,
                        "rule" => rule
                    );
                }
            }

            rules.extend(expanded);
        }

        let stats = CompileStats {
            statements: table.len() + rule_statements.len(),
            variables: table.len(),
            rule_statements: rule_statements.len(),
            rules_emitted: rules.len(),
            universe_size: prepared.universe_size,
            duration: started.elapsed(),
        };

        crate::log_success!(
            codes::success::RULE_COMPILATION_COMPLETE,
            "Rule compilation completed",
            "statements" => stats.statements,
            "variables" => stats.variables,
            "rules" => stats.rules_emitted,
            "duration_ms" => format!("{:.3}", stats.duration.as_secs_f64() * 1000.0)
        );

        Ok(CompiledRuleSet { rules, stats })
    }

    fn collect_variables(
        &self,
        statements: Vec<Statement>,
    ) -> Result<(VariableTable, Vec<Statement>), CompileError> {
        let mut table = VariableTable::new();
        let mut rule_statements = Vec::new();

        for statement in statements {
            match statement.kind {
                StatementKind::Variable { name, value } => table.define(
                    VariableDefinition {
                        name,
                        value,
                        line: statement.line,
                        source: statement.source,
                    },
                    self.preferences.allow_variable_redefinition,
                )?,
                StatementKind::Rule { .. } => rule_statements.push(statement),
            }
        }

        Ok((table, rule_statements))
    }

    fn timed<T, F: FnOnce() -> T>(&self, phase: &str, f: F) -> T {
        if !self.preferences.log_phase_timings {
            return f();
        }
        let started = Instant::now();
        let result = f();
        crate::log_debug!("Compiler phase finished",
            "phase" => phase,
            "duration_us" => started.elapsed().as_micros()
        );
        result
    }
}

struct PreparedStatements {
    statements: Vec<PreparedStatement>,
    universe_size: usize,
}

/// Substitute variables, then expand negative sets against the inferred universe
fn prepare_statements(
    rule_statements: &[Statement],
    resolved: &ResolvedVariables,
) -> Result<PreparedStatements, CompileError> {
    let substituted: Vec<PreparedStatement> = rule_statements
        .iter()
        .filter_map(|statement| match &statement.kind {
            StatementKind::Rule { text } => Some(PreparedStatement {
                line: statement.line,
                source: statement.source.clone(),
                text: resolved.substitute(text),
            }),
            StatementKind::Variable { .. } => None,
        })
        .collect();

    let universe: BTreeSet<String> = negation::collect_universe(
        substituted
            .iter()
            .map(|s| s.text.as_str())
            .chain(resolved.values()),
    );

    let statements = substituted
        .into_iter()
        .map(|mut statement| {
            statement.text = negation::expand_negative_sets(&statement.text, &universe)
                .map_err(|kind| CompileError::new(statement.line, &statement.source, kind))?;
            Ok(statement)
        })
        .collect::<Result<Vec<_>, CompileError>>()?;

    Ok(PreparedStatements {
        statements,
        universe_size: universe.len(),
    })
}

/// Expand one prepared statement into its concrete rules
fn compile_statement(statement: &PreparedStatement) -> Result<Vec<Rule>, CompileErrorKind> {
    let shape = structure::parse_shape(&statement.text)?;

    let from_items = classes::parse_items(&shape.from)?;
    let to_items = classes::parse_items(&shape.to)?;
    let rewrites = combination::expand_rewrites(&from_items, &to_items)?;

    let left = combination::expand_context(shape.left.as_deref(), ContextSide::Left)?;
    let right = combination::expand_context(shape.right.as_deref(), ContextSide::Right)?;

    combination::combine(&rewrites, &left, &right, statement.line)
}

/// Compile rule text with default preferences
pub fn compile(text: &str) -> Result<Vec<Rule>, CompileError> {
    compile_with_preferences(text, &CompilerPreferences::default())
}

pub fn compile_with_preferences(
    text: &str,
    preferences: &CompilerPreferences,
) -> Result<Vec<Rule>, CompileError> {
    RuleCompiler::with_preferences(preferences.clone())
        .compile(text)
        .map(|set| set.rules)
        .map_err(|err| {
            crate::log_error!(err.error_code(), &err.kind.to_string(),
                line = err.line,
                "text" => err.text
            );
            err
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn rendered(text: &str) -> Vec<String> {
        compile(text)
            .unwrap()
            .iter()
            .map(Rule::to_string)
            .collect()
    }

    #[test]
    fn test_simple_rules_keep_order_and_lines() {
        let rules = compile("a > b\n\n# comment\nc d > e / # _").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].line, 1);
        assert_eq!(rules[1].line, 4);
        assert_eq!(rules[1].from, vec!["c", "d"]);
        assert_eq!(rules[1].left_context, Some(vec!["#".to_string()]));
    }

    #[test]
    fn test_cartesian_expansion() {
        assert_eq!(
            rendered("[a b] > [x y] / [c d] _;"),
            vec!["a > x / c _", "a > x / d _", "b > y / c _", "b > y / d _"]
        );
    }

    #[test]
    fn test_variables_and_boundaries() {
        assert_eq!(
            rendered("V = [a e]\nC = [p t]\nC > b / V_V"),
            vec![
                "p > b / a _ a",
                "p > b / a _ e",
                "p > b / e _ a",
                "p > b / e _ e",
                "t > b / a _ a",
                "t > b / a _ e",
                "t > b / e _ a",
                "t > b / e _ e",
            ]
        );
    }

    #[test]
    fn test_deletion_forms() {
        let rules = compile("h > ∅; x >; y > / _ #").unwrap();
        assert!(rules.iter().all(Rule::is_deletion));
        assert_eq!(rules[2].right_context, Some(vec!["#".to_string()]));
    }

    #[test]
    fn test_negative_set_uses_universe() {
        assert_eq!(
            rendered("V = [a e]\nC = [p t]\na > b / ![V] _"),
            vec!["a > b / b _", "a > b / p _", "a > b / t _"]
        );
    }

    #[test]
    fn test_optional_context_without_constraint() {
        assert_eq!(
            rendered("a > b / _ (c)"),
            vec!["a > b / _ c", "a > b"]
        );
    }

    #[test]
    fn test_duplicates_within_statement_removed() {
        assert_eq!(rendered("[a a] > b"), vec!["a > b"]);
    }

    #[test]
    fn test_errors_carry_line_and_text() {
        let err = compile("a > b\n[a b] > [x y z]").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.text, "[a b] > [x y z]");
        assert_matches!(
            err.kind,
            CompileErrorKind::PairedClassArityMismatch { from_len: 2, to_len: 3 }
        );

        assert_matches!(
            compile("a > [x y]").unwrap_err().kind,
            CompileErrorKind::ClassTargetRequiresClassSource
        );
    }

    #[test]
    fn test_circular_variables() {
        let err = compile("A = B; B = A;\nA > x").unwrap_err();
        assert_matches!(
            err.kind,
            CompileErrorKind::CircularReference { ref cycle } if cycle.contains(&"A".to_string())
        );
    }

    #[test]
    fn test_vacuous_context() {
        assert_matches!(
            compile("a > b / [c _] _").unwrap_err().kind,
            CompileErrorKind::VacuousContext { side: ContextSide::Left }
        );
    }

    #[test]
    fn test_optional_literal_rescues_context() {
        let rules = compile("a > b / (c) [d _] _").unwrap();
        let rendered: Vec<String> = rules.iter().map(|r| r.to_string()).collect();
        assert_eq!(rendered, vec!["a > b / c d _", "a > b / c _", "a > b / d _", "a > b"]);
    }

    #[test]
    fn test_forbidden_redefinition() {
        let preferences = CompilerPreferences {
            allow_variable_redefinition: false,
            ..CompilerPreferences::default()
        };
        let err = compile_with_preferences("V = [a]\nV = [e]", &preferences).unwrap_err();
        assert_eq!(err.line, 2);
        assert_matches!(err.kind, CompileErrorKind::VariableRedefinition { .. });
    }

    #[test]
    fn test_stats() {
        let set = RuleCompiler::new()
            .compile("V = [a e]\nV > x; b > c")
            .unwrap();
        assert_eq!(set.stats.variables, 1);
        assert_eq!(set.stats.rule_statements, 2);
        assert_eq!(set.stats.rules_emitted, 3);
    }

    #[test]
    fn test_empty_text_compiles_to_nothing() {
        assert!(compile("").unwrap().is_empty());
        assert!(compile("# only a comment\n\n").unwrap().is_empty());
    }
}
