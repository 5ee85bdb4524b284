//! The deck file codec.
//!
//! # Format
//! ```text
//! description:Common Spanish verbs
//! tags:strict,verbs
//! cards:
//! hablar;to {speak|talk};true;14-6-2024;D;3;2/4;QK3M8Z1A
//! ```
//!
//! One card per line, eight `;`-separated fields: clue, answer, introduced,
//! due date (day-month-year), tier, promotion counter, correct/attempted
//! test record, identifier code. Cards are saved sorted by clue so files
//! stay diffable. A blank line ends the card block.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::card::FlashCard;
use crate::deck::Deck;
use crate::error::DeckFileError;
use crate::mastery::Tier;

const KEYWORD_DESCRIPTION: &str = "description";
const KEYWORD_TAGS: &str = "tags";
const KEYWORD_CARDS: &str = "cards";

const FIELD_SEPARATOR: char = ';';
const TAG_SEPARATOR: char = ',';
const DATE_SEPARATOR: char = '-';
const RECORD_SEPARATOR: char = '/';

const CARD_FIELDS: usize = 8;
const HEADER_LINES: usize = 3;

/// Parse deck file content into a deck named `name`.
pub fn parse(name: &str, content: &str) -> Result<Deck, DeckFileError> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < HEADER_LINES {
        return Err(DeckFileError::TruncatedHeader);
    }

    let description = keyword_value(lines[0], KEYWORD_DESCRIPTION, 1)?;
    let tags = parse_tags(keyword_value(lines[1], KEYWORD_TAGS, 2)?);
    keyword_value(lines[2], KEYWORD_CARDS, 3)?;

    let mut cards = Vec::new();
    for (index, line) in lines.iter().enumerate().skip(HEADER_LINES) {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        cards.push(parse_card(line, index + 1)?);
    }

    Ok(Deck::restore(name, description, tags, cards))
}

/// Render a deck back to file content.
pub fn serialize(deck: &Deck) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{KEYWORD_DESCRIPTION}:{}\n",
        deck.description()
    ));

    let tags: Vec<&str> = deck.tags().iter().map(String::as_str).collect();
    out.push_str(&format!(
        "{KEYWORD_TAGS}:{}\n",
        tags.join(&TAG_SEPARATOR.to_string())
    ));

    out.push_str(&format!("{KEYWORD_CARDS}:\n"));

    for card in deck.cards() {
        out.push_str(&format!(
            "{clue};{answer};{introduced};{due};{tier};{counter};{correct}{rec}{attempted};{code}\n",
            clue = card.clue(),
            answer = card.answer(),
            introduced = card.is_introduced(),
            due = date_to_string(card.due()),
            tier = card.tier().as_str(),
            counter = card.promotion_counter(),
            correct = card.correct_in_tests(),
            rec = RECORD_SEPARATOR,
            attempted = card.attempted_in_tests(),
            code = card.code(),
        ));
    }

    out
}

fn keyword_value<'a>(
    line: &'a str,
    keyword: &'static str,
    line_number: usize,
) -> Result<&'a str, DeckFileError> {
    line.strip_prefix(keyword)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or(DeckFileError::MissingKeyword {
            line: line_number,
            keyword,
        })
}

fn parse_tags(value: &str) -> BTreeSet<String> {
    value
        .split(TAG_SEPARATOR)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_card(line: &str, line_number: usize) -> Result<FlashCard, DeckFileError> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();

    if fields.len() != CARD_FIELDS {
        return Err(DeckFileError::BadFieldCount {
            line: line_number,
            found: fields.len(),
            expected: CARD_FIELDS,
        });
    }

    let introduced = fields[2] == "true";
    let due = parse_date(fields[3], line_number)?;
    let tier = Tier::from_str(fields[4]).ok_or_else(|| DeckFileError::BadTier {
        line: line_number,
        value: fields[4].to_string(),
    })?;
    let counter = parse_number(fields[5], line_number)?;
    let (correct, attempted) = parse_record(fields[6], line_number)?;

    Ok(FlashCard::restore(
        fields[0], fields[1], fields[7], introduced, due, tier, counter, correct, attempted,
    ))
}

fn parse_date(value: &str, line_number: usize) -> Result<NaiveDate, DeckFileError> {
    let bad_date = || DeckFileError::BadDate {
        line: line_number,
        value: value.to_string(),
    };

    let parts: Vec<&str> = value.split(DATE_SEPARATOR).collect();
    if parts.len() != 3 {
        return Err(bad_date());
    }

    let day: u32 = parts[0].parse().map_err(|_| bad_date())?;
    let month: u32 = parts[1].parse().map_err(|_| bad_date())?;
    let year: i32 = parts[2].parse().map_err(|_| bad_date())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(bad_date)
}

fn parse_number(value: &str, line_number: usize) -> Result<u32, DeckFileError> {
    value.parse().map_err(|_| DeckFileError::BadNumber {
        line: line_number,
        value: value.to_string(),
    })
}

/// `correct/attempted`; anything else means no record yet, as older files
/// did not carry one.
fn parse_record(value: &str, line_number: usize) -> Result<(u32, u32), DeckFileError> {
    let parts: Vec<&str> = value.split(RECORD_SEPARATOR).collect();
    if parts.len() != 2 {
        return Ok((0, 0));
    }

    Ok((
        parse_number(parts[0], line_number)?,
        parse_number(parts[1], line_number)?,
    ))
}

fn date_to_string(date: NaiveDate) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        date.day(),
        date.month(),
        date.year(),
        sep = DATE_SEPARATOR
    )
}
