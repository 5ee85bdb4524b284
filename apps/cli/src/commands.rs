//! Implementation of the recall CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use colored::Colorize;
use dialoguer::{Confirm, Input};
use rand::rngs::StdRng;
use rand::SeedableRng;
use recall_core::{deckfile, Deck, FlashCard, Lesson, LogicError, Tier};

use crate::settings;
use crate::term::TermIo;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn deck_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "deck".to_string())
}

fn load_deck(path: &Path) -> Result<Deck> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read deck file {}", path.display()))?;
    deckfile::parse(&deck_name(path), &content)
        .with_context(|| format!("deck file {} is malformed", path.display()))
}

fn save_deck(path: &Path, deck: &Deck) -> Result<()> {
    fs::write(path, deckfile::serialize(deck))
        .with_context(|| format!("failed to write deck file {}", path.display()))?;
    tracing::debug!("deck saved to {}", path.display());
    Ok(())
}

pub fn new_deck(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }

    let deck = Deck::new(deck_name(path));
    save_deck(path, &deck)?;
    println!("Created empty deck at {}", path.display());
    Ok(())
}

pub fn learn(path: &Path) -> Result<()> {
    let config = settings::load()?;
    let mut deck = load_deck(path)?;
    let effective = deck.effective_config(&config);

    let mut rng = StdRng::from_entropy();
    let mut lesson = Lesson::training(&mut deck, &effective, today(), &mut rng);

    if lesson.question_count() == 0 {
        println!("Nothing is due in {} today.", deck.name().bold());
        return Ok(());
    }

    let mut io = TermIo::new();
    lesson.run(&mut deck, &effective, today(), &mut rng, &mut io);

    save_deck(path, &deck)
}

pub fn test(path: &Path, count: Option<usize>) -> Result<()> {
    let config = settings::load()?;
    let mut deck = load_deck(path)?;
    let effective = deck.effective_config(&config);

    let mut rng = StdRng::from_entropy();
    let mut lesson = match Lesson::test(&mut deck, count, &effective, &mut rng) {
        Ok(lesson) => lesson,
        Err(err @ LogicError::SubsetTooLarge { .. }) => {
            println!("{}", err.to_string().yellow());
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if lesson.question_count() == 0 {
        println!("{} has no cards to test.", deck.name().bold());
        return Ok(());
    }

    let mut io = TermIo::new();
    lesson.run(&mut deck, &effective, today(), &mut rng, &mut io);

    // test results still carry updated statistics
    save_deck(path, &deck)
}

pub fn add(path: &Path) -> Result<()> {
    let mut deck = load_deck(path)?;
    let mut rng = StdRng::from_entropy();
    let mut added = 0usize;

    loop {
        let clue: String = Input::new()
            .with_prompt("Clue (empty to finish)")
            .allow_empty(true)
            .interact_text()
            .context("failed to read the clue")?;

        if clue.trim().is_empty() {
            break;
        }

        let answer: String = Input::new()
            .with_prompt("Answer")
            .interact_text()
            .context("failed to read the answer")?;

        let card = FlashCard::new(clue.trim(), answer.trim(), today(), &mut rng);
        match deck.add_card(card) {
            Ok(()) => added += 1,
            Err(err) => println!("{}", err.to_string().yellow()),
        }
    }

    if added > 0 {
        save_deck(path, &deck)?;
    }
    println!("Added {added} cards to {}.", deck.name().bold());
    Ok(())
}

pub fn list(path: &Path) -> Result<()> {
    let deck = load_deck(path)?;
    let today = today();

    for card in deck.cards() {
        let due = if card.is_due(today) {
            "due".red().bold().to_string()
        } else {
            format!("due {}", card.due())
        };

        println!(
            "{}  {:4} {}  {} {} {}",
            card.code().dimmed(),
            card.tier().as_str().bold(),
            due,
            card.clue(),
            "->".dimmed(),
            card.answer(),
        );
    }

    println!(
        "{} cards, {} due today",
        deck.len(),
        deck.due_count(today)
    );
    Ok(())
}

pub fn stats(path: &Path) -> Result<()> {
    let deck = load_deck(path)?;
    let percentage = deck.memorized_percentage();

    let colored_percentage = if percentage > 80 {
        format!("{percentage}%").cyan().bold()
    } else if percentage > 55 {
        format!("{percentage}%").green().bold()
    } else if percentage > 30 {
        format!("{percentage}%").yellow().bold()
    } else {
        format!("{percentage}%").red().bold()
    };

    println!("{}: {} memorized", deck.name().bold(), colored_percentage);
    println!("{} cards, {} due today", deck.len(), deck.due_count(today()));

    for tier in [Tier::A, Tier::B, Tier::C, Tier::D, Tier::New, Tier::F] {
        let count = deck.tier_count(tier);
        if count > 0 {
            println!("  {:4} {count}", tier.as_str());
        }
    }

    if !deck.tags().is_empty() {
        let tags: Vec<&str> = deck.tags().iter().map(String::as_str).collect();
        println!("tags: {}", tags.join(", "));
    }
    Ok(())
}

pub fn import(path: &Path, csv: &Path) -> Result<()> {
    let mut deck = load_deck(path)?;
    let content = fs::read_to_string(csv)
        .with_context(|| format!("failed to read {}", csv.display()))?;

    let mut rng = StdRng::from_entropy();
    let outcome = deck.import_csv(&content, today(), &mut rng);

    for clue in &outcome.duplicates {
        println!("{}", format!("skipped duplicate clue \"{clue}\"").yellow());
    }
    if outcome.skipped_lines > 0 {
        println!(
            "{}",
            format!("skipped {} malformed lines", outcome.skipped_lines).yellow()
        );
    }

    save_deck(path, &deck)?;
    println!(
        "Imported {} cards into {}.",
        outcome.added.len(),
        deck.name().bold()
    );
    Ok(())
}

pub fn remove(path: &Path, code: &str) -> Result<()> {
    let mut deck = load_deck(path)?;

    let clue = match deck.card_by_code(code) {
        Some(card) => card.clue().to_string(),
        None => {
            println!("{}", format!("no card with code \"{code}\"").yellow());
            return Ok(());
        }
    };

    match deck.remove_card(&clue) {
        Ok(card) => {
            save_deck(path, &deck)?;
            println!("Removed {} {} {}", card.clue(), "->".dimmed(), card.answer());
        }
        Err(err) => println!("{}", err.to_string().yellow()),
    }
    Ok(())
}

pub fn reset(path: &Path, yes: bool) -> Result<()> {
    let mut deck = load_deck(path)?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Reset memorization state for all {} cards in {}?",
                deck.len(),
                deck.name()
            ))
            .default(false)
            .interact()
            .context("failed to read the confirmation")?;
        if !confirmed {
            println!("Nothing reset.");
            return Ok(());
        }
    }

    deck.reset_memorization(today());
    save_deck(path, &deck)?;
    println!("Reset memorization state in {}.", deck.name().bold());
    Ok(())
}

pub fn tag(path: &Path, tag: &str, remove: bool) -> Result<()> {
    let mut deck = load_deck(path)?;

    let result = if remove {
        deck.remove_tag(tag)
    } else {
        deck.add_tag(tag)
    };

    match result {
        Ok(()) => {
            save_deck(path, &deck)?;
            let action = if remove { "removed from" } else { "added to" };
            println!("Tag \"{tag}\" {action} {}.", deck.name().bold());
        }
        Err(err) => println!("{}", err.to_string().yellow()),
    }
    Ok(())
}

pub fn config_show() -> Result<()> {
    let config = settings::load()?;
    let rendered = toml::to_string_pretty(&config).context("failed to render settings")?;
    print!("{rendered}");
    println!();
    println!("settings file: {}", settings::config_path()?.display());
    Ok(())
}

pub fn config_set(key: &str, value: &str) -> Result<()> {
    let mut config = settings::load()?;
    settings::set(&mut config, key, value)?;
    settings::save(&config)?;
    println!("Set {} = {}", key.bold(), value.bold());
    Ok(())
}
