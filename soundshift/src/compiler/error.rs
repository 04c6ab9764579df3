use crate::logging::codes;
use std::fmt;

/// Which side of the `_` placeholder a context fragment sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSide {
    Left,
    Right,
}

impl fmt::Display for ContextSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextSide::Left => write!(f, "left"),
            ContextSide::Right => write!(f, "right"),
        }
    }
}

/// A rule-text error with the line it came from
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}\n  | {text}")]
pub struct CompileError {
    /// 1-based line number
    pub line: usize,
    /// The original, unmodified line
    pub text: String,
    pub kind: CompileErrorKind,
}

impl CompileError {
    pub fn new(line: usize, text: &str, kind: CompileErrorKind) -> Self {
        Self {
            line,
            text: text.to_string(),
            kind,
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        self.kind.error_code()
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileErrorKind {
    #[error("malformed rule: {reason}")]
    MalformedRule { reason: String },

    #[error("rule has an empty left-hand side")]
    EmptyFrom,

    #[error("a class on the right-hand side requires a class on the left-hand side")]
    ClassTargetRequiresClassSource,

    #[error("paired classes differ in length ({from_len} on the left, {to_len} on the right)")]
    PairedClassArityMismatch { from_len: usize, to_len: usize },

    #[error("{to_classes} classes on the right-hand side but only {from_classes} on the left")]
    UnpairedTargetClass {
        from_classes: usize,
        to_classes: usize,
    },

    #[error("empty phoneme class")]
    EmptyClass,

    #[error("unclosed or unbalanced class brackets")]
    UnclosedClass,

    #[error("unclosed or unbalanced optional group")]
    UnclosedOptionalGroup,

    #[error("optional groups are only allowed in contexts")]
    OptionalGroupOutsideContext,

    #[error("'!' must be followed by a bracketed class")]
    MalformedNegativeSet,

    #[error("negative set excludes every known phoneme")]
    EmptyNegativeSet,

    #[error("{side} context can be satisfied by no phoneme at all")]
    VacuousContext { side: ContextSide },

    #[error("context has no '_' placeholder")]
    MissingPlaceholder,

    #[error("context has more than one '_' placeholder")]
    DuplicatePlaceholder,

    #[error("malformed variable definition: {reason}")]
    MalformedVariable { reason: String },

    #[error("circular variable reference: {}", .cycle.join(" -> "))]
    CircularReference { cycle: Vec<String> },

    #[error("variable '{name}' is already defined on line {previous_line}")]
    VariableRedefinition { name: String, previous_line: usize },

    #[error("variable '{name}' nests deeper than {max} levels")]
    VariableDepthExceeded { name: String, max: usize },

    #[error("line is {length} characters long (max: {max})")]
    LineTooLong { length: usize, max: usize },

    #[error("too many {what}: {count} (max: {max})")]
    LimitExceeded {
        what: &'static str,
        count: usize,
        max: usize,
    },

    #[error("statement expands to {count} rules (max: {max})")]
    ExpansionLimitExceeded { count: usize, max: usize },
}

impl CompileErrorKind {
    pub fn malformed_rule(reason: &str) -> Self {
        Self::MalformedRule {
            reason: reason.to_string(),
        }
    }

    pub fn malformed_variable(reason: &str) -> Self {
        Self::MalformedVariable {
            reason: reason.to_string(),
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        use CompileErrorKind::*;
        match self {
            MalformedRule { .. } | OptionalGroupOutsideContext | MalformedNegativeSet => {
                codes::compiler::MALFORMED_RULE
            }
            EmptyFrom => codes::compiler::EMPTY_SOURCE,
            ClassTargetRequiresClassSource | UnpairedTargetClass { .. } => {
                codes::compiler::CLASS_TARGET_WITHOUT_CLASS_SOURCE
            }
            PairedClassArityMismatch { .. } => codes::compiler::PAIRED_CLASS_ARITY,
            EmptyClass => codes::compiler::EMPTY_CLASS,
            UnclosedClass | UnclosedOptionalGroup => codes::compiler::UNBALANCED_GROUP,
            EmptyNegativeSet => codes::compiler::EMPTY_NEGATIVE_SET,
            VacuousContext { .. } => codes::compiler::VACUOUS_CONTEXT,
            MissingPlaceholder | DuplicatePlaceholder => codes::compiler::MISSING_PLACEHOLDER,
            MalformedVariable { .. } | VariableRedefinition { .. } => {
                codes::compiler::MALFORMED_VARIABLE
            }
            CircularReference { .. } => codes::compiler::CIRCULAR_REFERENCE,
            VariableDepthExceeded { .. }
            | LineTooLong { .. }
            | LimitExceeded { .. }
            | ExpansionLimitExceeded { .. } => codes::compiler::EXPANSION_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_line_and_text() {
        let err = CompileError::new(
            4,
            "[a b] > [x y z]",
            CompileErrorKind::PairedClassArityMismatch {
                from_len: 2,
                to_len: 3,
            },
        );
        let message = err.to_string();
        assert!(message.starts_with("line 4: paired classes differ"));
        assert!(message.contains("[a b] > [x y z]"));
        assert_eq!(err.error_code().as_str(), "E023");
        assert!(err.requires_halt());
    }

    #[test]
    fn test_cycle_display() {
        let kind = CompileErrorKind::CircularReference {
            cycle: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(kind.to_string(), "circular variable reference: A -> B -> A");
        assert_eq!(kind.error_code().as_str(), "E028");
    }
}
