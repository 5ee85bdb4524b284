//! A deck: the owning collection of flashcards.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::card::FlashCard;
use crate::config::StudyConfig;
use crate::error::{LogicError, Result};
use crate::mastery::Tier;

/// Deck tag forcing exact marking for lessons over this deck.
pub const TAG_STRICT: &str = "strict";
/// Deck tag forcing normal clue-to-answer direction.
pub const TAG_IRREVERSIBLE: &str = "irreversible";

/// Outcome of a CSV import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Clues of cards added to the deck.
    pub added: Vec<String>,
    /// Clues rejected because the deck already had them.
    pub duplicates: Vec<String>,
    /// Lines skipped for not having exactly two fields.
    pub skipped_lines: usize,
}

/// A named collection of flashcards, keyed by clue.
///
/// `BTreeMap` keeps iteration (and the saved file) in stable clue order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    name: String,
    description: String,
    tags: BTreeSet<String>,
    cards: BTreeMap<String, FlashCard>,
}

impl Deck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tags: BTreeSet::new(),
            cards: BTreeMap::new(),
        }
    }

    /// Reassemble a deck parsed from storage.
    pub fn restore(
        name: impl Into<String>,
        description: impl Into<String>,
        tags: BTreeSet<String>,
        cards: Vec<FlashCard>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tags,
            cards: cards
                .into_iter()
                .map(|card| (card.clue().to_string(), card))
                .collect(),
        }
    }

    pub fn add_card(&mut self, card: FlashCard) -> Result<()> {
        if self.cards.contains_key(card.clue()) {
            return Err(LogicError::DuplicateClue(card.clue().to_string()));
        }

        self.cards.insert(card.clue().to_string(), card);
        Ok(())
    }

    pub fn remove_card(&mut self, clue: &str) -> Result<FlashCard> {
        self.cards
            .remove(clue)
            .ok_or_else(|| LogicError::NoSuchCard(clue.to_string()))
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) -> Result<()> {
        let tag = tag.into();
        if !self.tags.insert(tag.clone()) {
            return Err(LogicError::DuplicateTag(tag));
        }
        Ok(())
    }

    pub fn remove_tag(&mut self, tag: &str) -> Result<()> {
        if !self.tags.remove(tag) {
            return Err(LogicError::NoSuchTag(tag.to_string()));
        }
        Ok(())
    }

    pub fn card(&self, clue: &str) -> Option<&FlashCard> {
        self.cards.get(clue)
    }

    pub(crate) fn card_mut(&mut self, clue: &str) -> Option<&mut FlashCard> {
        self.cards.get_mut(clue)
    }

    /// Case-insensitive lookup by identifier code.
    pub fn card_by_code(&self, code: &str) -> Option<&FlashCard> {
        let wanted = code.trim().to_uppercase();
        self.cards
            .values()
            .find(|card| card.code().to_uppercase() == wanted)
    }

    pub fn cards(&self) -> impl Iterator<Item = &FlashCard> {
        self.cards.values()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn due_count(&self, today: NaiveDate) -> usize {
        self.cards.values().filter(|c| c.is_due(today)).count()
    }

    pub fn tier_count(&self, tier: Tier) -> usize {
        self.cards.values().filter(|c| c.tier() == tier).count()
    }

    /// Aggregate memorization score as a whole percentage of the maximum.
    pub fn memorized_percentage(&self) -> u32 {
        if self.cards.is_empty() {
            return 0;
        }

        let total: u32 = self.cards.values().map(|c| c.tier().score()).sum();
        total * 100 / (self.cards.len() as u32 * Tier::MAX_SCORE)
    }

    /// Every card back to `NEW` and due today; test statistics survive.
    pub fn reset_memorization(&mut self, today: NaiveDate) {
        for card in self.cards.values_mut() {
            card.reset(today);
        }
    }

    /// Due cards, shuffled and capped at the introduction limit.
    pub fn due_clues(
        &self,
        today: NaiveDate,
        limit: usize,
        rng: &mut impl Rng,
    ) -> Vec<String> {
        let mut due: Vec<String> = self
            .cards
            .values()
            .filter(|c| c.is_due(today))
            .map(|c| c.clue().to_string())
            .collect();

        due.shuffle(rng);
        due.truncate(limit);
        due
    }

    /// Not-yet-introduced cards outside `already_selected`, shuffled and
    /// capped at whatever remains of the introduction limit.
    pub fn introduction_clues(
        &self,
        already_selected: &[String],
        limit: usize,
        rng: &mut impl Rng,
    ) -> Vec<String> {
        let remainder = limit.saturating_sub(already_selected.len());

        let mut fresh: Vec<String> = self
            .cards
            .values()
            .filter(|c| !c.is_introduced())
            .map(|c| c.clue().to_string())
            .filter(|clue| !already_selected.contains(clue))
            .collect();

        fresh.shuffle(rng);
        fresh.truncate(remainder);
        fresh
    }

    /// A shuffled subset for a test lesson. Requesting more cards than the
    /// deck holds is a reported logic error.
    pub fn test_clues(&self, count: usize, rng: &mut impl Rng) -> Result<Vec<String>> {
        if count > self.cards.len() {
            return Err(LogicError::SubsetTooLarge {
                requested: count,
                available: self.cards.len(),
            });
        }

        let mut clues: Vec<String> = self.cards.keys().cloned().collect();
        clues.shuffle(rng);
        clues.truncate(count);
        Ok(clues)
    }

    /// Per-lesson configuration with deck tags applied: `strict` turns off
    /// every marking concession, `irreversible` forces normal direction.
    pub fn effective_config(&self, base: &StudyConfig) -> StudyConfig {
        let mut config = base.clone();

        if self.tags.contains(TAG_IRREVERSIBLE) {
            config.reverse_mode = false;
        }

        if self.tags.contains(TAG_STRICT) {
            config.mark_for_accents = true;
            config.allow_mark_correct = false;
            config.ignore_bracketed = false;
        }

        config
    }

    /// Import `clue,answer` lines. Lines with any other field count are
    /// skipped; duplicate clues are collected, not fatal.
    pub fn import_csv(
        &mut self,
        content: &str,
        today: NaiveDate,
        rng: &mut impl Rng,
    ) -> ImportOutcome {
        let mut outcome = ImportOutcome::default();

        for line in content.lines() {
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != 2 {
                outcome.skipped_lines += 1;
                continue;
            }

            let card = FlashCard::new(fields[0].trim(), fields[1].trim(), today, rng);
            let clue = card.clue().to_string();
            match self.add_card(card) {
                Ok(()) => outcome.added.push(clue),
                Err(_) => outcome.duplicates.push(clue),
            }
        }

        outcome
    }
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

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    fn deck_with(clues: &[&str]) -> Deck {
        let mut deck = Deck::new("verbs");
        let mut rng = rng();
        for clue in clues {
            deck.add_card(FlashCard::new(*clue, "answer", today(), &mut rng))
                .unwrap();
        }
        deck
    }

    #[test]
    fn duplicate_clue_is_rejected_and_deck_unchanged() {
        let mut deck = deck_with(&["hablar"]);
        let mut rng = rng();
        let duplicate = FlashCard::new("hablar", "other", today(), &mut rng);

        let err = deck.add_card(duplicate).unwrap_err();

        assert_eq!(err, LogicError::DuplicateClue("hablar".into()));
        assert_eq!(deck.card("hablar").unwrap().answer(), "answer");
    }

    #[test]
    fn removing_missing_card_reports() {
        let mut deck = deck_with(&["uno"]);
        assert_eq!(
            deck.remove_card("dos").unwrap_err(),
            LogicError::NoSuchCard("dos".into())
        );
    }

    #[test]
    fn tag_errors_round_trip() {
        let mut deck = deck_with(&[]);
        deck.add_tag("strict").unwrap();
        assert_eq!(
            deck.add_tag("strict").unwrap_err(),
            LogicError::DuplicateTag("strict".into())
        );
        deck.remove_tag("strict").unwrap();
        assert_eq!(
            deck.remove_tag("strict").unwrap_err(),
            LogicError::NoSuchTag("strict".into())
        );
    }

    #[test]
    fn code_lookup_is_case_insensitive() {
        let deck = deck_with(&["uno"]);
        let code = deck.card("uno").unwrap().code().to_lowercase();
        assert!(deck.card_by_code(&format!(" {code} ")).is_some());
        assert!(deck.card_by_code("NOPE0000").is_none());
    }

    #[test]
    fn memorized_percentage_averages_tier_scores() {
        let mut deck = deck_with(&["top", "fresh"]);
        let config = StudyConfig::default();

        // drive "top" to tier A: NEW -> D -> C -> B -> A is 1+4+3+3 corrects
        for _ in 0..11 {
            deck.card_mut("top")
                .unwrap()
                .apply_answer(true, today(), &config);
        }

        assert_eq!(deck.card("top").unwrap().tier(), Tier::A);
        assert_eq!(deck.memorized_percentage(), 50);
    }

    #[test]
    fn empty_deck_scores_zero() {
        assert_eq!(deck_with(&[]).memorized_percentage(), 0);
    }

    #[test]
    fn due_selection_respects_limit() {
        let deck = deck_with(&["a", "b", "c", "d"]);
        let mut rng = rng();
        let due = deck.due_clues(today(), 2, &mut rng);
        assert_eq!(due.len(), 2);
    }

    #[test]
    fn introduction_selection_excludes_already_selected() {
        let deck = deck_with(&["a", "b", "c"]);
        let mut rng = rng();
        let selected = vec!["a".to_string()];
        let fresh = deck.introduction_clues(&selected, 3, &mut rng);

        assert_eq!(fresh.len(), 2);
        assert!(!fresh.contains(&"a".to_string()));
    }

    #[test]
    fn oversized_test_subset_is_an_error() {
        let deck = deck_with(&["a"]);
        let mut rng = rng();
        assert_eq!(
            deck.test_clues(2, &mut rng).unwrap_err(),
            LogicError::SubsetTooLarge {
                requested: 2,
                available: 1
            }
        );
    }

    #[test]
    fn strict_tag_disables_marking_concessions() {
        let mut deck = deck_with(&[]);
        deck.add_tag(TAG_STRICT).unwrap();
        let base = StudyConfig::default();

        let effective = deck.effective_config(&base);

        assert!(effective.mark_for_accents);
        assert!(!effective.allow_mark_correct);
        assert!(!effective.ignore_bracketed);
        // the saved settings themselves are untouched
        assert!(!base.mark_for_accents);
    }

    #[test]
    fn irreversible_tag_forces_normal_direction() {
        let mut deck = deck_with(&[]);
        deck.add_tag(TAG_IRREVERSIBLE).unwrap();
        let base = StudyConfig {
            reverse_mode: true,
            ..StudyConfig::default()
        };

        assert!(!deck.effective_config(&base).reverse_mode);
    }

    #[test]
    fn csv_import_skips_malformed_and_collects_duplicates() {
        let mut deck = deck_with(&["uno"]);
        let mut rng = rng();
        let content = "dos,two\nuno,one\nbad line\ntres,three";

        let outcome = deck.import_csv(content, today(), &mut rng);

        assert_eq!(outcome.added, vec!["dos", "tres"]);
        assert_eq!(outcome.duplicates, vec!["uno"]);
        assert_eq!(outcome.skipped_lines, 1);
        assert_eq!(deck.len(), 3);
    }

    #[test]
    fn seeded_shuffles_are_reproducible() {
        let deck = deck_with(&["a", "b", "c", "d", "e"]);
        let first = deck.test_clues(5, &mut StdRng::seed_from_u64(3)).unwrap();
        let second = deck.test_clues(5, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(first, second);
    }
}
