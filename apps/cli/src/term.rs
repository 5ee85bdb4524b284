//! Terminal implementation of the study session collaborator.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use dialoguer::Confirm;
use recall_core::{Feedback, LessonKind, LessonSummary, StudyIo, Tier};

const BORDER_WIDTH: usize = 44;

/// Presents questions on stdout and reads answers from stdin.
pub struct TermIo;

impl TermIo {
    pub fn new() -> Self {
        Self
    }
}

fn border() -> String {
    "─".repeat(BORDER_WIDTH).dimmed().to_string()
}

fn tier_colored(tier: Tier) -> String {
    let name = tier.as_str();
    match tier {
        Tier::A => name.cyan().bold().to_string(),
        Tier::B => name.green().bold().to_string(),
        Tier::C | Tier::D => name.yellow().bold().to_string(),
        Tier::New => name.normal().to_string(),
        Tier::F => name.red().bold().to_string(),
    }
}

impl StudyIo for TermIo {
    fn show_clue(&mut self, clue: &str) {
        println!("{}", border());
        println!("{} {}", "[ Clue ]".purple().bold(), clue.bold());
        print!("{} ", "[ Answer ]".purple().bold());
        io::stdout().flush().ok();
    }

    fn read_response(&mut self) -> String {
        let mut line = String::new();
        // EOF reads as an empty (wrong) answer rather than an error
        io::stdin().lock().read_line(&mut line).ok();
        line.trim_end_matches(['\n', '\r']).to_string()
    }

    fn show_feedback(&mut self, feedback: &Feedback) {
        match feedback {
            Feedback::Correct { .. } => {
                println!("{}", "[ CORRECT! ]".green().bold());
            }
            Feedback::CorrectWithAccents { canonical } => {
                println!(
                    "{} ... but watch out for accents: {} is the exact answer",
                    "[ CORRECT! ]".green().bold(),
                    canonical.cyan().bold()
                );
            }
            Feedback::TimedOut {
                elapsed_secs,
                accepted,
            } => {
                println!(
                    "{} {elapsed_secs}s is over the time limit",
                    "[ TOO SLOW! ]".red().bold()
                );
                show_accepted(accepted);
            }
            Feedback::Incorrect { accepted } => {
                println!("{} The accepted answers are:", "[ WRONG! ]".red().bold());
                show_accepted(accepted);
            }
        }
    }

    fn confirm_override(&mut self) -> bool {
        Confirm::new()
            .with_prompt("Mark as correct anyway?")
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    fn notify_repeat(&mut self, remaining: u32) {
        println!(
            "{}",
            format!("[ This card will repeat at least ({remaining}) more times ]")
                .yellow()
                .bold()
        );
    }

    fn show_summary(&mut self, summary: &LessonSummary) {
        println!("{}", border());
        match summary.kind {
            LessonKind::Training => {
                print!("{}", "[ Training finished ]".purple().bold());
            }
            LessonKind::Test => {
                print!(
                    "{} {} / {}",
                    "[ Test finished ]".purple().bold(),
                    summary.correct,
                    summary.total
                );
            }
        }
        if summary.retired {
            print!(" {}", "(retired early)".yellow());
        }
        println!();
        println!("{}", border());

        for (index, entry) in summary.entries.iter().enumerate() {
            let outcomes: String = entry
                .outcomes
                .iter()
                .map(|outcome| match outcome {
                    Some(true) => " X".green().bold().to_string(),
                    Some(false) => " X".red().bold().to_string(),
                    None => " -".dimmed().to_string(),
                })
                .collect();

            print!(
                "{}. {} {} {} [{outcomes} ]",
                index + 1,
                entry.clue.purple().bold(),
                "->".dimmed(),
                entry.answer.purple().bold(),
            );

            match entry.tier {
                Some(tier) => println!(" ... updated status: {}", tier_colored(tier)),
                None => println!(),
            }
        }

        println!("{}", border());
    }
}

impl Default for TermIo {
    fn default() -> Self {
        Self::new()
    }
}

fn show_accepted(accepted: &std::collections::BTreeSet<String>) {
    for literal in accepted {
        println!("  {}", literal.cyan().bold());
    }
}
