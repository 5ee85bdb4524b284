//! Lesson composition and the ask/answer/repeat loop.

use std::collections::{BTreeSet, VecDeque};
use std::time::Instant;

use chrono::NaiveDate;
use rand::Rng;

use crate::card::FlashCard;
use crate::config::StudyConfig;
use crate::deck::Deck;
use crate::error::{LogicError, Result};
use crate::mastery::Tier;
use crate::matching::{self, MatchMode};
use crate::pattern;

/// Entered in place of an answer to end the session immediately.
pub const RETIRE_SENTINEL: &str = "???";

/// Whether a lesson mutates mastery state or only test statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonKind {
    /// Spaced-repetition training: answers update tier, counters, due date.
    Training,
    /// Statistics-only quiz: answers update attempted/correct counts.
    Test,
}

/// A single presentation of one card within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    clue: String,
    answered: bool,
    correct: bool,
}

impl Question {
    pub fn new(clue: impl Into<String>) -> Self {
        Self {
            clue: clue.into(),
            answered: false,
            correct: false,
        }
    }

    pub fn clue(&self) -> &str {
        &self.clue
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn is_correct(&self) -> bool {
        self.correct
    }

    /// Record the verdict and apply it to the card. Answering twice is a
    /// logic error: reported, and both question and card stay unchanged.
    pub fn record(
        &mut self,
        card: &mut FlashCard,
        correct: bool,
        kind: LessonKind,
        today: NaiveDate,
        config: &StudyConfig,
    ) -> Result<()> {
        if self.answered {
            return Err(LogicError::QuestionAlreadyAnswered);
        }

        self.answered = true;
        self.correct = correct;

        match kind {
            LessonKind::Training => card.apply_answer(correct, today, config),
            LessonKind::Test => card.record_test_answer(correct),
        }

        Ok(())
    }
}

/// Per-answer feedback for the presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Correct {
        matched: String,
    },
    /// Matched only after accent folding; `canonical` is the exact literal.
    CorrectWithAccents {
        canonical: String,
    },
    /// The answer arrived too late and is marked wrong.
    TimedOut {
        elapsed_secs: u64,
        accepted: BTreeSet<String>,
    },
    Incorrect {
        accepted: BTreeSet<String>,
    },
}

/// Presentation and input collaborator for a session. The core never
/// touches a terminal itself.
pub trait StudyIo {
    fn show_clue(&mut self, clue: &str);
    /// Blocking read of one response line.
    fn read_response(&mut self) -> String;
    fn show_feedback(&mut self, feedback: &Feedback);
    /// Ask whether a mismatched answer should count as correct anyway.
    fn confirm_override(&mut self) -> bool;
    fn notify_repeat(&mut self, remaining: u32);
    fn show_summary(&mut self, summary: &LessonSummary);
}

/// One card's history within a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub clue: String,
    pub answer: String,
    /// One slot per question, in order; `None` for never-reached questions.
    pub outcomes: Vec<Option<bool>>,
    /// Final tier, for training lessons.
    pub tier: Option<Tier>,
}

/// End-of-session report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonSummary {
    pub kind: LessonKind,
    pub correct: usize,
    pub total: usize,
    pub retired: bool,
    pub entries: Vec<SummaryEntry>,
}

/// An ordered sequence of questions over one deck.
#[derive(Debug)]
pub struct Lesson {
    kind: LessonKind,
    pending: Vec<String>,
    questions: Vec<Question>,
}

impl Lesson {
    /// Compose a training lesson: due cards first, then cards never
    /// introduced, shuffled, together capped at the introduction limit.
    /// Every selected card's lesson counter is (re)initialized.
    pub fn training(
        deck: &mut Deck,
        config: &StudyConfig,
        today: NaiveDate,
        rng: &mut impl Rng,
    ) -> Self {
        let due = deck.due_clues(today, config.intro_limit, rng);
        let fresh = deck.introduction_clues(&due, config.intro_limit, rng);

        let pending: Vec<String> = due.into_iter().chain(fresh).collect();
        init_counters(deck, &pending, config);

        Self {
            kind: LessonKind::Training,
            pending,
            questions: Vec::new(),
        }
    }

    /// Compose a test lesson over `count` cards (all of them when `None`).
    pub fn test(
        deck: &mut Deck,
        count: Option<usize>,
        config: &StudyConfig,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let count = count.unwrap_or_else(|| deck.len());
        let pending = deck.test_clues(count, rng)?;
        init_counters(deck, &pending, config);

        Ok(Self {
            kind: LessonKind::Test,
            pending,
            questions: Vec::new(),
        })
    }

    pub fn kind(&self) -> LessonKind {
        self.kind
    }

    /// Questions waiting to be asked. Zero once the lesson has run.
    pub fn question_count(&self) -> usize {
        self.pending.len()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Drive the session to completion or retirement and return the
    /// summary (also pushed to the presenter).
    pub fn run(
        &mut self,
        deck: &mut Deck,
        config: &StudyConfig,
        today: NaiveDate,
        rng: &mut impl Rng,
        io: &mut dyn StudyIo,
    ) -> LessonSummary {
        let mut current: VecDeque<String> = self.pending.drain(..).collect();
        let mut next_round: Vec<String> = Vec::new();

        let mut retired = false;

        'session: while !current.is_empty() {
            while let Some(clue_key) = current.pop_front() {
                let (clue_pattern, answer_pattern) = match deck.card(&clue_key) {
                    Some(card) if config.reverse_mode => {
                        (card.answer().to_string(), card.clue().to_string())
                    }
                    Some(card) => (card.clue().to_string(), card.answer().to_string()),
                    None => continue,
                };

                io.show_clue(&clue_text(&clue_pattern, config, rng));

                let asked_at = Instant::now();
                let response = io.read_response();
                let elapsed_secs = asked_at.elapsed().as_secs();

                if response.trim() == RETIRE_SENTINEL {
                    // everything not yet reached stays untouched
                    retired = true;
                    self.questions.push(Question::new(clue_key));
                    self.questions.extend(current.drain(..).map(Question::new));
                    self.questions.extend(next_round.drain(..).map(Question::new));
                    break 'session;
                }

                let response = response.trim();
                let accepted = pattern::expand(&answer_pattern, config.ignore_bracketed);

                let timed_out =
                    config.timed_mode && elapsed_secs >= u64::from(config.seconds_timeout);
                let strict = matching::find_match(&accepted, response, MatchMode::Strict);
                let lenient = if config.mark_for_accents {
                    None
                } else {
                    matching::find_match(&accepted, response, MatchMode::Lenient)
                };

                let would_match = strict.is_some() || lenient.is_some();
                let initially_correct = !timed_out && would_match;

                let feedback = if timed_out && would_match {
                    Feedback::TimedOut {
                        elapsed_secs,
                        accepted: accepted.clone(),
                    }
                } else if let Some(matched) = strict {
                    Feedback::Correct {
                        matched: matched.to_string(),
                    }
                } else if let Some(canonical) = lenient {
                    Feedback::CorrectWithAccents {
                        canonical: canonical.to_string(),
                    }
                } else {
                    Feedback::Incorrect {
                        accepted: accepted.clone(),
                    }
                };
                io.show_feedback(&feedback);

                let overridden = if !initially_correct && config.allow_mark_correct {
                    io.confirm_override()
                } else {
                    false
                };
                let verdict = initially_correct || overridden;

                let card = match deck.card_mut(&clue_key) {
                    Some(card) => card,
                    None => continue,
                };

                let mut question = Question::new(clue_key.clone());
                if question.record(card, verdict, self.kind, today, config).is_err() {
                    // a freshly created question cannot already be answered
                    continue;
                }
                let remaining = card.lesson_counter();
                self.questions.push(question);

                // repeat-until-mastered: reinsert at a random slot of the
                // queue for the next round, never the current one
                if self.kind == LessonKind::Training && remaining > 0 {
                    io.notify_repeat(remaining);
                    let slot = rng.gen_range(0..=next_round.len());
                    next_round.insert(slot, clue_key);
                }
            }

            current = next_round.drain(..).collect();
        }

        let summary = self.summary(deck, retired);
        io.show_summary(&summary);
        summary
    }

    fn summary(&self, deck: &Deck, retired: bool) -> LessonSummary {
        let mut entries: Vec<SummaryEntry> = Vec::new();

        for question in &self.questions {
            let index = match entries.iter().position(|e| e.clue == question.clue) {
                Some(i) => i,
                None => {
                    let (answer, tier) = match deck.card(&question.clue) {
                        Some(card) => (card.answer().to_string(), card.tier()),
                        None => (String::new(), Tier::New),
                    };
                    entries.push(SummaryEntry {
                        clue: question.clue.clone(),
                        answer,
                        outcomes: Vec::new(),
                        tier: (self.kind == LessonKind::Training).then_some(tier),
                    });
                    entries.len() - 1
                }
            };

            entries[index]
                .outcomes
                .push(question.answered.then_some(question.correct));
        }

        LessonSummary {
            kind: self.kind,
            correct: self
                .questions
                .iter()
                .filter(|q| q.answered && q.correct)
                .count(),
            total: self.questions.len(),
            retired,
            entries,
        }
    }
}

/// The clue text to display: one random expansion in specific-clue-path
/// mode, the pattern's display form otherwise.
fn clue_text(clue_pattern: &str, config: &StudyConfig, rng: &mut impl Rng) -> String {
    if config.specific_clue_path {
        let literals = pattern::expand(clue_pattern, false);
        if !literals.is_empty() {
            let index = rng.gen_range(0..literals.len());
            if let Some(literal) = literals.iter().nth(index) {
                return literal.clone();
            }
        }
    }

    pattern::display_form(clue_pattern)
}

fn init_counters(deck: &mut Deck, clues: &[String], config: &StudyConfig) {
    for clue in clues {
        if let Some(card) = deck.card_mut(clue) {
            card.init_lesson_counter(config);
        }
    }
}
