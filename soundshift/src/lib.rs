// Internal modules
pub mod batch;
pub mod compiler;
pub mod config;
pub mod derivation;
pub mod engine;
pub mod inventory;
#[macro_use]
pub mod logging;
pub mod phonotactics;
pub mod pipeline;
pub mod rules;
pub mod tokenizer;

// Re-export key types for library consumers
pub use batch::{process_words, BatchConfig, BatchError, BatchResults, Direction, WordOutcome, WordResult};
pub use compiler::{compile, CompileError, CompileErrorKind, CompiledRuleSet, RuleCompiler};
pub use derivation::{derive, PhonemeDerivation};
pub use engine::{apply, reverse, ForwardEngine, Reverser, TraceStep};
pub use inventory::{parse_inventory, InventoryError, PhonemeInventory};
pub use phonotactics::PhonotacticPattern;
pub use pipeline::{InventoryRole, PipelineError, Session};
pub use rules::Rule;
pub use tokenizer::{tokenize, CompiledInventory, TokenizationError};
