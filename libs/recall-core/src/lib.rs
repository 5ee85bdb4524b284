//! Core study engine for the recall flashcard tool.
//!
//! Provides:
//! - Pattern expansion for clue/answer definitions (choice groups,
//!   optional segments, annotations)
//! - Answer matching with strict and accent-folding modes
//! - The six-tier mastery state machine and per-card scheduling
//! - Lesson composition and the repeat-until-mastered question loop
//! - The deck file codec and CSV import

pub mod card;
pub mod config;
pub mod deck;
pub mod deckfile;
pub mod error;
pub mod lesson;
pub mod mastery;
pub mod matching;
pub mod pattern;

pub use card::FlashCard;
pub use config::StudyConfig;
pub use deck::{Deck, ImportOutcome, TAG_IRREVERSIBLE, TAG_STRICT};
pub use error::{DeckFileError, LogicError, Result};
pub use lesson::{
    Feedback, Lesson, LessonKind, LessonSummary, Question, StudyIo, SummaryEntry,
    RETIRE_SENTINEL,
};
pub use mastery::Tier;
pub use matching::{find_match, fold_accents, MatchMode};
pub use pattern::{display_form, expand};
