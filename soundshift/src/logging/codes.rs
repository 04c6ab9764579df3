//! Consolidated error codes and classification system
//!
//! Single source of truth for all error codes, their metadata, and classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
}

/// Rule compiler error codes
pub mod compiler {
    use super::Code;

    pub const MALFORMED_RULE: Code = Code::new("E020");
    pub const EMPTY_SOURCE: Code = Code::new("E021");
    pub const CLASS_TARGET_WITHOUT_CLASS_SOURCE: Code = Code::new("E022");
    pub const PAIRED_CLASS_ARITY: Code = Code::new("E023");
    pub const EMPTY_CLASS: Code = Code::new("E024");
    pub const UNBALANCED_GROUP: Code = Code::new("E025");
    pub const EMPTY_NEGATIVE_SET: Code = Code::new("E026");
    pub const VACUOUS_CONTEXT: Code = Code::new("E027");
    pub const CIRCULAR_REFERENCE: Code = Code::new("E028");
    pub const MALFORMED_VARIABLE: Code = Code::new("E029");
    pub const MISSING_PLACEHOLDER: Code = Code::new("E030");
    pub const EXPANSION_LIMIT: Code = Code::new("E031");
}

/// Inventory and phonotactics error codes
pub mod inventory {
    use super::Code;

    pub const MALFORMED_INVENTORY: Code = Code::new("E040");
    pub const UNKNOWN_PATTERN_SYMBOL: Code = Code::new("E041");
    pub const INVENTORY_LIMIT: Code = Code::new("E042");
}

/// Tokenization error codes
pub mod tokenization {
    use super::Code;

    pub const UNTOKENIZABLE_WORD: Code = Code::new("E050");
}

/// Batch processing error codes
pub mod batch {
    use super::Code;

    pub const TOO_MANY_WORDS: Code = Code::new("E060");
    pub const WORKER_FAILURE: Code = Code::new("E061");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const VARIABLE_RESOLUTION_COMPLETE: Code = Code::new("I020");
    pub const RULE_COMPILATION_COMPLETE: Code = Code::new("I021");
    pub const INVENTORY_PARSE_COMPLETE: Code = Code::new("I030");
    pub const FORWARD_APPLICATION_COMPLETE: Code = Code::new("I040");
    pub const REVERSAL_COMPLETE: Code = Code::new("I050");
    pub const SESSION_READY: Code = Code::new("I060");
    pub const BATCH_COMPLETE: Code = Code::new("I061");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

const REGISTRY_ENTRIES: &[ErrorMetadata] = &[
    // System errors
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        true,
        "Critical internal system error",
        "File a bug report with the rule text that triggered it",
    ),
    // File processing errors
    ErrorMetadata::new(
        "E005",
        "FileProcessing",
        Severity::Medium,
        false,
        true,
        "File not found at specified path",
        "Check file path and ensure file exists",
    ),
    ErrorMetadata::new(
        "E007",
        "FileProcessing",
        Severity::Medium,
        false,
        true,
        "File exceeds maximum size limit",
        "Split the file or raise max_file_size in the build profile",
    ),
    ErrorMetadata::new(
        "E010",
        "FileProcessing",
        Severity::Medium,
        false,
        true,
        "Invalid UTF-8 encoding in file",
        "Convert file to UTF-8 encoding",
    ),
    ErrorMetadata::new(
        "E011",
        "FileProcessing",
        Severity::Medium,
        false,
        true,
        "I/O error during file operation",
        "Check permissions and file system integrity",
    ),
    // Compiler errors
    ErrorMetadata::new(
        "E020",
        "Compiler",
        Severity::High,
        false,
        true,
        "Rule statement is not of the form `from > to [/ left _ right]`",
        "Use exactly one `>` and at most one `/` per rule",
    ),
    ErrorMetadata::new(
        "E021",
        "Compiler",
        Severity::High,
        false,
        true,
        "Rule has nothing to rewrite",
        "Give the rule a non-empty left-hand side",
    ),
    ErrorMetadata::new(
        "E022",
        "Compiler",
        Severity::High,
        false,
        true,
        "A class on the right-hand side needs a class on the left-hand side",
        "Write the source as a class of the same length",
    ),
    ErrorMetadata::new(
        "E023",
        "Compiler",
        Severity::High,
        false,
        true,
        "Paired classes have different lengths",
        "Make both classes list the same number of members",
    ),
    ErrorMetadata::new(
        "E024",
        "Compiler",
        Severity::High,
        false,
        true,
        "Class lists no members",
        "Add at least one phoneme or `_` to the class",
    ),
    ErrorMetadata::new(
        "E025",
        "Compiler",
        Severity::High,
        false,
        true,
        "Unbalanced brackets or parentheses",
        "Close every `[` and `(` on the same statement",
    ),
    ErrorMetadata::new(
        "E026",
        "Compiler",
        Severity::High,
        false,
        true,
        "Negative set excludes every known phoneme",
        "Remove phonemes from the negated class",
    ),
    ErrorMetadata::new(
        "E027",
        "Compiler",
        Severity::High,
        false,
        true,
        "Context side can be satisfied by nothing at all",
        "Add a literal phoneme to the side or drop `_` from its classes",
    ),
    ErrorMetadata::new(
        "E028",
        "Compiler",
        Severity::High,
        false,
        true,
        "Variables reference each other in a cycle",
        "Break the cycle by inlining one of the values",
    ),
    ErrorMetadata::new(
        "E029",
        "Compiler",
        Severity::High,
        false,
        true,
        "Variable definition is malformed",
        "Use `Name = value` with an alphanumeric name",
    ),
    ErrorMetadata::new(
        "E030",
        "Compiler",
        Severity::High,
        false,
        true,
        "Context needs exactly one `_` placeholder",
        "Mark the rewritten position with a single `_`",
    ),
    ErrorMetadata::new(
        "E031",
        "Compiler",
        Severity::High,
        false,
        true,
        "Statement expands past the configured limits",
        "Split the statement or raise the compiler limits in the build profile",
    ),
    // Inventory errors
    ErrorMetadata::new(
        "E040",
        "Inventory",
        Severity::High,
        false,
        true,
        "Phoneme inventory definition is malformed",
        "Check variable lines and section headers",
    ),
    ErrorMetadata::new(
        "E041",
        "Inventory",
        Severity::High,
        false,
        true,
        "Phonotactic pattern uses an unknown symbol",
        "Declare the symbol as a variable or phoneme first",
    ),
    ErrorMetadata::new(
        "E042",
        "Inventory",
        Severity::Medium,
        false,
        true,
        "Inventory exceeds configured limits",
        "Reduce the inventory or raise inventory limits in the build profile",
    ),
    // Tokenization errors
    ErrorMetadata::new(
        "E050",
        "Tokenization",
        Severity::Medium,
        true,
        false,
        "Word cannot be segmented with the given inventory",
        "Add the missing phoneme to the inventory or fix the word",
    ),
    // Batch errors
    ErrorMetadata::new(
        "E060",
        "Batch",
        Severity::Medium,
        false,
        true,
        "Too many words in one batch",
        "Split the word list",
    ),
    ErrorMetadata::new(
        "E061",
        "Batch",
        Severity::High,
        false,
        true,
        "A batch worker thread failed",
        "Rerun sequentially with --threads 1 to isolate the word",
    ),
];

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ENTRIES
            .iter()
            .map(|metadata| (metadata.code, metadata.clone()))
            .collect()
    })
}

/// Look up metadata for a code
pub fn get_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_description(code: &str) -> &'static str {
    get_metadata(code)
        .map(|m| m.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_metadata(code)
        .map(|m| m.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    match get_metadata(code) {
        Some(m) => m.category,
        None if code.starts_with('I') => "Success",
        None if code.starts_with('W') => "Warning",
        None if code.starts_with('D') => "Debug",
        None => "Unknown",
    }
}

pub fn get_severity(code: &str) -> Severity {
    get_metadata(code)
        .map(|m| m.severity)
        .unwrap_or(Severity::Low)
}

pub fn is_recoverable(code: &str) -> bool {
    get_metadata(code).map(|m| m.recoverable).unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_metadata(code).map(|m| m.requires_halt).unwrap_or(false)
}
