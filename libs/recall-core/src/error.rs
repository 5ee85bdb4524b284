//! Error types for recall-core.

use thiserror::Error;

/// Result type alias for deck and lesson logic operations.
pub type Result<T> = std::result::Result<T, LogicError>;

/// Non-fatal logic errors. The triggering operation is aborted and state is
/// left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogicError {
    #[error("question has already been answered")]
    QuestionAlreadyAnswered,

    #[error("requested {requested} cards but the deck only has {available}")]
    SubsetTooLarge { requested: usize, available: usize },

    #[error("a card with clue \"{0}\" already exists in the deck")]
    DuplicateClue(String),

    #[error("no card with clue \"{0}\" in the deck")]
    NoSuchCard(String),

    #[error("tag \"{0}\" is already set on the deck")]
    DuplicateTag(String),

    #[error("tag \"{0}\" is not set on the deck")]
    NoSuchTag(String),
}

/// Errors from parsing the deck file format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckFileError {
    #[error("deck file has fewer lines than the three header lines")]
    TruncatedHeader,

    #[error("line {line} must start with \"{keyword}:\"")]
    MissingKeyword { line: usize, keyword: &'static str },

    #[error("card entry at line {line} has {found} fields, expected {expected}")]
    BadFieldCount {
        line: usize,
        found: usize,
        expected: usize,
    },

    #[error("invalid due date \"{value}\" at line {line}")]
    BadDate { line: usize, value: String },

    #[error("unknown tier \"{value}\" at line {line}")]
    BadTier { line: usize, value: String },

    #[error("invalid number \"{value}\" at line {line}")]
    BadNumber { line: usize, value: String },
}
