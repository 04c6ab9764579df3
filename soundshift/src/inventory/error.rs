use crate::compiler::CompileError;
use crate::logging::codes;

/// Errors raised while reading a phoneme/phonotactics definition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("invalid class definition: {0}")]
    Variable(#[from] CompileError),

    #[error("line {line}: '{symbol}' is neither a class name nor a phoneme")]
    UnknownPatternSymbol { line: usize, symbol: String },

    #[error("line {line}: malformed pattern: {reason}")]
    MalformedPattern { line: usize, reason: String },

    #[error("line {line}: unexpected content in [{section}] section")]
    UnexpectedContent { line: usize, section: String },

    #[error("inventory declares {count} phonemes (max: {max})")]
    TooManyPhonemes { count: usize, max: usize },

    #[error("phonotactics expand to {count} patterns (max: {max})")]
    TooManyPatterns { count: usize, max: usize },
}

impl InventoryError {
    pub fn malformed_pattern(line: usize, reason: &str) -> Self {
        Self::MalformedPattern {
            line,
            reason: reason.to_string(),
        }
    }

    /// 1-based line the error refers to, when it refers to one
    pub fn line(&self) -> Option<usize> {
        match self {
            InventoryError::Variable(err) => Some(err.line),
            InventoryError::UnknownPatternSymbol { line, .. }
            | InventoryError::MalformedPattern { line, .. }
            | InventoryError::UnexpectedContent { line, .. } => Some(*line),
            InventoryError::TooManyPhonemes { .. } | InventoryError::TooManyPatterns { .. } => None,
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            InventoryError::Variable(err) => err.error_code(),
            InventoryError::UnknownPatternSymbol { .. } => codes::inventory::UNKNOWN_PATTERN_SYMBOL,
            InventoryError::MalformedPattern { .. }
            | InventoryError::UnexpectedContent { .. } => codes::inventory::MALFORMED_INVENTORY,
            InventoryError::TooManyPhonemes { .. } | InventoryError::TooManyPatterns { .. } => {
                codes::inventory::INVENTORY_LIMIT
            }
        }
    }
}
