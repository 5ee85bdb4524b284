//! The persistent flashcard record.

use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::StudyConfig;
use crate::mastery::Tier;

const CODE_LEN: usize = 8;
const CODE_DIGIT_PROBABILITY: f64 = 0.3;

/// A clue/answer pattern pair with its memorization state.
///
/// Mutated only through the scheduler's answer processing; every other
/// access goes through accessors so the promotion/due invariants hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashCard {
    clue: String,
    answer: String,
    code: String,
    introduced: bool,
    due: NaiveDate,
    tier: Tier,
    promotion_counter: u32,
    #[serde(skip)]
    lesson_counter: u32,
    correct_in_tests: u32,
    attempted_in_tests: u32,
}

impl FlashCard {
    /// A fresh card: tier `NEW`, due immediately, no statistics.
    pub fn new(
        clue: impl Into<String>,
        answer: impl Into<String>,
        today: NaiveDate,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            clue: clue.into(),
            answer: answer.into(),
            code: generate_code(rng),
            introduced: false,
            due: today,
            tier: Tier::New,
            promotion_counter: Tier::New.promotion_threshold(),
            lesson_counter: 0,
            correct_in_tests: 0,
            attempted_in_tests: 0,
        }
    }

    /// Reconstruct a card from storage.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        clue: impl Into<String>,
        answer: impl Into<String>,
        code: impl Into<String>,
        introduced: bool,
        due: NaiveDate,
        tier: Tier,
        promotion_counter: u32,
        correct_in_tests: u32,
        attempted_in_tests: u32,
    ) -> Self {
        Self {
            clue: clue.into(),
            answer: answer.into(),
            code: code.into(),
            introduced,
            due,
            tier,
            promotion_counter,
            lesson_counter: 0,
            correct_in_tests,
            attempted_in_tests,
        }
    }

    /// Set the lesson counter for a new session: the review default for
    /// introduced cards, the new-card default otherwise.
    pub fn init_lesson_counter(&mut self, config: &StudyConfig) {
        self.lesson_counter = if self.introduced {
            config.lesson_counter_review
        } else {
            config.lesson_counter_new
        };
    }

    /// Apply a training-lesson verdict to the mastery state.
    pub fn apply_answer(&mut self, correct: bool, today: NaiveDate, config: &StudyConfig) {
        self.introduced = true;

        if correct {
            self.correct_adjustment(today);
        } else {
            self.incorrect_adjustment(today, config);
        }
    }

    fn correct_adjustment(&mut self, today: NaiveDate) {
        self.lesson_counter = self.lesson_counter.saturating_sub(1);

        if !self.tier.is_terminal() {
            self.promotion_counter = self.promotion_counter.saturating_sub(1);
            if self.promotion_counter == 0 {
                self.tier = self.tier.promote();
                self.promotion_counter = self.tier.promotion_threshold();
            }
        }

        self.due = today + Duration::days(self.tier.interval_days());
    }

    fn incorrect_adjustment(&mut self, today: NaiveDate, config: &StudyConfig) {
        self.tier = self.tier.demote();
        self.promotion_counter = self.tier.promotion_threshold();
        self.init_lesson_counter(config);
        self.due = today;
    }

    /// Update cumulative test statistics. Test lessons never touch tier,
    /// counters, or due date.
    pub fn record_test_answer(&mut self, correct: bool) {
        self.attempted_in_tests += 1;
        if correct {
            self.correct_in_tests += 1;
        }
    }

    /// Back to `NEW`, not introduced, due today. Test statistics survive.
    pub fn reset(&mut self, today: NaiveDate) {
        self.introduced = false;
        self.tier = Tier::New;
        self.promotion_counter = Tier::New.promotion_threshold();
        self.lesson_counter = 0;
        self.due = today;
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.due <= today
    }

    pub fn clue(&self) -> &str {
        &self.clue
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_introduced(&self) -> bool {
        self.introduced
    }

    pub fn due(&self) -> NaiveDate {
        self.due
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn promotion_counter(&self) -> u32 {
        self.promotion_counter
    }

    pub fn lesson_counter(&self) -> u32 {
        self.lesson_counter
    }

    pub fn correct_in_tests(&self) -> u32 {
        self.correct_in_tests
    }

    pub fn attempted_in_tests(&self) -> u32 {
        self.attempted_in_tests
    }

    /// Test accuracy as a whole percentage; 0 when never tested.
    pub fn record_percentage(&self) -> u32 {
        if self.attempted_in_tests == 0 {
            0
        } else {
            self.correct_in_tests * 100 / self.attempted_in_tests
        }
    }
}

/// An 8-character identifier from `[0-9A-Z]`, stable for the card's life.
fn generate_code(rng: &mut impl Rng) -> String {
    (0..CODE_LEN)
        .map(|_| {
            if rng.gen_bool(CODE_DIGIT_PROBABILITY) {
                rng.gen_range(b'0'..=b'9') as char
            } else {
                rng.gen_range(b'A'..=b'Z') as char
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn card() -> FlashCard {
        let mut rng = StdRng::seed_from_u64(7);
        FlashCard::new("perro", "dog", today(), &mut rng)
    }

    #[test]
    fn new_card_promotes_to_d_on_first_correct() {
        let config = StudyConfig::default();
        let mut card = card();
        card.init_lesson_counter(&config);

        card.apply_answer(true, today(), &config);

        assert_eq!(card.tier(), Tier::D);
        assert_eq!(card.promotion_counter(), 4);
        assert_eq!(card.due(), today() + Duration::days(2));
        assert!(card.is_introduced());
    }

    #[test]
    fn incorrect_answer_demotes_to_f_and_is_due_today() {
        let config = StudyConfig::default();
        for tier in [Tier::New, Tier::D, Tier::F] {
            let mut card = FlashCard::restore(
                "c", "a", "ABCD1234", true, today(), tier,
                tier.promotion_threshold(), 0, 0,
            );
            card.init_lesson_counter(&config);

            card.apply_answer(false, today(), &config);

            assert_eq!(card.tier(), Tier::F);
            assert_eq!(card.promotion_counter(), 5);
            assert_eq!(card.due(), today());
            assert_eq!(card.lesson_counter(), config.lesson_counter_review);
        }
    }

    #[test]
    fn tier_a_stays_terminal_on_correct() {
        let config = StudyConfig::default();
        let mut card =
            FlashCard::restore("c", "a", "ABCD1234", true, today(), Tier::A, 0, 0, 0);
        card.init_lesson_counter(&config);

        card.apply_answer(true, today(), &config);

        assert_eq!(card.tier(), Tier::A);
        assert_eq!(card.promotion_counter(), 0);
        assert_eq!(card.due(), today() + Duration::days(16));
    }

    #[test]
    fn tier_a_demotes_to_b_on_incorrect() {
        let config = StudyConfig::default();
        let mut card =
            FlashCard::restore("c", "a", "ABCD1234", true, today(), Tier::A, 0, 0, 0);
        card.init_lesson_counter(&config);

        card.apply_answer(false, today(), &config);

        assert_eq!(card.tier(), Tier::B);
        assert_eq!(card.promotion_counter(), 3);
    }

    #[test]
    fn lesson_counter_initializes_by_introduced_state() {
        let config = StudyConfig::default();
        let mut card = card();

        card.init_lesson_counter(&config);
        assert_eq!(card.lesson_counter(), config.lesson_counter_new);

        card.apply_answer(true, today(), &config);
        card.init_lesson_counter(&config);
        assert_eq!(card.lesson_counter(), config.lesson_counter_review);
    }

    #[test]
    fn test_answers_touch_statistics_only() {
        let mut card = card();
        let before_tier = card.tier();
        let before_due = card.due();

        card.record_test_answer(true);
        card.record_test_answer(false);

        assert_eq!(card.correct_in_tests(), 1);
        assert_eq!(card.attempted_in_tests(), 2);
        assert_eq!(card.record_percentage(), 50);
        assert_eq!(card.tier(), before_tier);
        assert_eq!(card.due(), before_due);
        assert!(!card.is_introduced());
    }

    #[test]
    fn reset_preserves_statistics() {
        let config = StudyConfig::default();
        let mut card = card();
        card.init_lesson_counter(&config);
        card.apply_answer(true, today(), &config);
        card.record_test_answer(true);

        card.reset(today());

        assert_eq!(card.tier(), Tier::New);
        assert!(!card.is_introduced());
        assert_eq!(card.due(), today());
        assert_eq!(card.attempted_in_tests(), 1);
    }

    #[test]
    fn codes_are_eight_chars_from_the_alphabet() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let code = generate_code(&mut rng);
            assert_eq!(code.len(), 8);
            assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn due_comparison_is_inclusive() {
        let card = card();
        assert!(card.is_due(today()));
        assert!(card.is_due(today() + Duration::days(1)));
        assert!(!card.is_due(today() - Duration::days(1)));
    }
}
