use super::files::SourceFileError;
use crate::compiler::CompileError;
use crate::inventory::InventoryError;
use crate::tokenizer::TokenizationError;
use std::fmt;

/// Which inventory an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryRole {
    Source,
    Target,
}

impl fmt::Display for InventoryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryRole::Source => write!(f, "source"),
            InventoryRole::Target => write!(f, "target"),
        }
    }
}

/// Session setup and per-word errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    File(#[from] SourceFileError),

    #[error("Rule compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("Invalid {role} inventory: {source}")]
    Inventory {
        role: InventoryRole,
        #[source]
        source: InventoryError,
    },

    #[error("Tokenization failed: {0}")]
    Tokenization(#[from] TokenizationError),
}

impl PipelineError {
    pub fn inventory(role: InventoryRole, source: InventoryError) -> Self {
        Self::Inventory { role, source }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            PipelineError::File(err) => err.error_code(),
            PipelineError::Compile(err) => err.error_code(),
            PipelineError::Inventory { source, .. } => source.error_code(),
            PipelineError::Tokenization(err) => err.error_code(),
        }
    }

    pub fn requires_halt(&self) -> bool {
        crate::logging::codes::requires_halt(self.error_code().as_str())
    }
}
