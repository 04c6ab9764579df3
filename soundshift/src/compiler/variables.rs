//! Variable collection and cycle-checked resolution

use super::error::{CompileError, CompileErrorKind};
use super::substitution;
use crate::config::compile_time::compiler::{MAX_VARIABLES, MAX_VARIABLE_DEPTH};
use crate::logging::codes;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: String,
    pub value: String,
    pub line: usize,
    pub source: String,
}

/// Variable definitions in declaration order, last definition wins
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    definitions: Vec<VariableDefinition>,
    index: HashMap<String, usize>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition
    ///
    /// Redefinitions replace the earlier value in place. With `allow_redefinition`
    /// off they are rejected instead.
    pub fn define(
        &mut self,
        definition: VariableDefinition,
        allow_redefinition: bool,
    ) -> Result<(), CompileError> {
        if let Some(&existing) = self.index.get(&definition.name) {
            let previous_line = self.definitions[existing].line;
            if !allow_redefinition {
                return Err(CompileError::new(
                    definition.line,
                    &definition.source,
                    CompileErrorKind::VariableRedefinition {
                        name: definition.name,
                        previous_line,
                    },
                ));
            }

            crate::log_warning!("Variable redefined, using the later value",
                "name" => definition.name,
                "line" => definition.line,
                "previous_line" => previous_line
            );
            self.definitions[existing] = definition;
            return Ok(());
        }

        if self.definitions.len() >= MAX_VARIABLES {
            return Err(CompileError::new(
                definition.line,
                &definition.source,
                CompileErrorKind::LimitExceeded {
                    what: "variables",
                    count: self.definitions.len() + 1,
                    max: MAX_VARIABLES,
                },
            ));
        }

        self.index
            .insert(definition.name.clone(), self.definitions.len());
        self.definitions.push(definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&VariableDefinition> {
        self.index.get(name).map(|&i| &self.definitions[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.definitions.iter().map(|d| &d.name)
    }

    pub fn definitions(&self) -> &[VariableDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolve every variable, including ones no rule uses
    ///
    /// Returns the resolved values keyed by name, plus the name list sorted for
    /// substitution.
    pub fn resolve_all(&self) -> Result<ResolvedVariables, CompileError> {
        let names = substitution::sort_names(self.names());
        let mut resolved = HashMap::with_capacity(self.definitions.len());

        for definition in &self.definitions {
            let mut visiting = Vec::new();
            resolve(&definition.name, self, &names, &mut resolved, &mut visiting)?;
        }

        crate::log_success!(
            codes::success::VARIABLE_RESOLUTION_COMPLETE,
            "Variables resolved",
            "count" => resolved.len()
        );

        Ok(ResolvedVariables {
            values: resolved,
            names,
        })
    }
}

/// Fully substituted variable values
#[derive(Debug, Clone, Default)]
pub struct ResolvedVariables {
    values: HashMap<String, String>,
    names: Vec<String>,
}

impl ResolvedVariables {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Names longest first
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.values().map(String::as_str)
    }

    /// Substitute resolved values into `text`
    pub fn substitute(&self, text: &str) -> String {
        let result: Result<String, std::convert::Infallible> =
            substitution::substitute(text, &self.names, |name| {
                Ok(self.values.get(name).cloned().unwrap_or_else(|| name.to_string()))
            });
        match result {
            Ok(text) => text,
            Err(never) => match never {},
        }
    }
}

/// Resolve one name, memoizing into `resolved`
///
/// `visiting` is the chain of names currently being expanded; meeting one of them
/// again means the definitions form a cycle.
fn resolve(
    name: &str,
    table: &VariableTable,
    names: &[String],
    resolved: &mut HashMap<String, String>,
    visiting: &mut Vec<String>,
) -> Result<String, CompileError> {
    if let Some(value) = resolved.get(name) {
        return Ok(value.clone());
    }

    let Some(definition) = table.get(name) else {
        return Ok(name.to_string());
    };

    if let Some(start) = visiting.iter().position(|n| n == name) {
        let mut cycle: Vec<String> = visiting[start..].to_vec();
        cycle.push(name.to_string());
        return Err(CompileError::new(
            definition.line,
            &definition.source,
            CompileErrorKind::CircularReference { cycle },
        ));
    }

    if visiting.len() >= MAX_VARIABLE_DEPTH {
        return Err(CompileError::new(
            definition.line,
            &definition.source,
            CompileErrorKind::VariableDepthExceeded {
                name: name.to_string(),
                max: MAX_VARIABLE_DEPTH,
            },
        ));
    }

    visiting.push(name.to_string());
    let value = substitution::substitute(&definition.value, names, |reference| {
        resolve(reference, table, names, resolved, visiting)
    })?;
    visiting.pop();

    resolved.insert(name.to_string(), value.clone());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn table(defs: &[(&str, &str, usize)]) -> VariableTable {
        let mut table = VariableTable::new();
        for (name, value, line) in defs {
            table
                .define(
                    VariableDefinition {
                        name: name.to_string(),
                        value: value.to_string(),
                        line: *line,
                        source: format!("{} = {}", name, value),
                    },
                    true,
                )
                .unwrap();
        }
        table
    }

    #[test]
    fn test_nested_resolution() {
        let vars = table(&[("S", "[C V]", 1), ("C", "[p t]", 2), ("V", "[a]", 3)])
            .resolve_all()
            .unwrap();
        assert_eq!(vars.get("S"), Some("[[p t] [a]]"));
        assert_eq!(vars.substitute("S > x / C _"), "[[p t] [a]] > x / [p t] _");
    }

    #[test]
    fn test_two_cycle_names_participants() {
        let err = table(&[("A", "B", 1), ("B", "A", 1)])
            .resolve_all()
            .unwrap_err();
        assert_matches!(
            err.kind,
            CompileErrorKind::CircularReference { ref cycle } if cycle == &["A", "B", "A"]
        );
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let err = table(&[("A", "[a A]", 5)]).resolve_all().unwrap_err();
        assert_eq!(err.line, 5);
        assert_matches!(err.kind, CompileErrorKind::CircularReference { .. });
    }

    #[test]
    fn test_unused_cycles_are_still_reported() {
        let result = table(&[("X", "[a]", 1), ("P", "Q", 2), ("Q", "P", 3)]).resolve_all();
        assert!(result.is_err());
    }

    #[test]
    fn test_redefinition_last_wins() {
        let vars = table(&[("V", "[a]", 1), ("V", "[e]", 2)])
            .resolve_all()
            .unwrap();
        assert_eq!(vars.get("V"), Some("[e]"));
    }

    #[test]
    fn test_redefinition_can_be_forbidden() {
        let mut vars = table(&[("V", "[a]", 1)]);
        let err = vars
            .define(
                VariableDefinition {
                    name: "V".into(),
                    value: "[e]".into(),
                    line: 2,
                    source: "V = [e]".into(),
                },
                false,
            )
            .unwrap_err();
        assert_matches!(
            err.kind,
            CompileErrorKind::VariableRedefinition { previous_line: 1, .. }
        );
    }
}
