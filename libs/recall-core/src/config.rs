//! Study session configuration.
//!
//! An explicit value threaded into the expander, matcher, and scheduler;
//! nothing in the core reads ambient global state.

use serde::{Deserialize, Serialize};

/// Configuration for study sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Maximum cards (due + newly introduced) per training lesson.
    pub intro_limit: usize,
    /// Initial lesson counter for cards never introduced before.
    pub lesson_counter_new: u32,
    /// Initial lesson counter for cards under review.
    pub lesson_counter_review: u32,
    /// Seconds allowed per answer in timed mode.
    pub seconds_timeout: u32,
    /// When true, accents must match exactly (lenient matching is off).
    pub mark_for_accents: bool,
    /// Offer to force-mark a mismatched answer as correct.
    pub allow_mark_correct: bool,
    /// Expand `(text)` optional segments to a dropped variant as well.
    pub ignore_bracketed: bool,
    /// Swap clue and answer patterns.
    pub reverse_mode: bool,
    /// Enforce the answer timeout.
    pub timed_mode: bool,
    /// Show one concrete expansion of the clue instead of the pattern text.
    pub specific_clue_path: bool,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            intro_limit: 40,
            lesson_counter_new: 3,
            lesson_counter_review: 2,
            seconds_timeout: 30,
            mark_for_accents: false,
            allow_mark_correct: true,
            ignore_bracketed: true,
            reverse_mode: false,
            timed_mode: false,
            specific_clue_path: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = StudyConfig::default();
        assert_eq!(config.intro_limit, 40);
        assert_eq!(config.lesson_counter_new, 3);
        assert_eq!(config.lesson_counter_review, 2);
        assert_eq!(config.seconds_timeout, 30);
        assert!(!config.mark_for_accents);
        assert!(config.allow_mark_correct);
        assert!(config.ignore_bracketed);
        assert!(!config.reverse_mode);
        assert!(!config.timed_mode);
        assert!(!config.specific_clue_path);
    }
}
