use crate::logging::codes;

/// A word that cannot be segmented with the given inventory
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot tokenize '{word}': no phoneme matches '{character}' at position {position}")]
pub struct TokenizationError {
    /// The word as given by the caller
    pub word: String,
    /// Character index (not byte offset) of the first unmatched character
    pub position: usize,
    pub character: char,
}

impl TokenizationError {
    pub fn new(word: &str, position: usize, character: char) -> Self {
        Self {
            word: word.to_string(),
            position,
            character,
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        codes::tokenization::UNTOKENIZABLE_WORD
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}
