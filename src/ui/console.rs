use colored::Colorize;

use crate::embeddings::{EnsureOutcome, ScoredItem};
use crate::recommend::HappyHourRow;

pub struct Console;

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    pub fn new() -> Self {
        Self
    }

    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "[INFO]".blue(), message);
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "[WARN]".yellow(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "[ERROR]".red(), message);
    }

    pub fn ensure_outcome(&self, outcome: EnsureOutcome) {
        match outcome {
            EnsureOutcome::AlreadyEnsured => {}
            EnsureOutcome::CacheHit { items } => {
                self.info(&format!("Loaded cached embeddings for {} spots", items))
            }
            EnsureOutcome::Rebuilt { items } => {
                self.info(&format!("Embedded {} spots and refreshed the cache", items))
            }
        }
    }

    pub fn search_results(&self, query: &str, results: &[ScoredItem<'_, HappyHourRow>]) {
        println!("\n{} {}", "▶".cyan().bold(), query);
        println!("{}", "─".repeat(50).dimmed());

        if results.is_empty() {
            println!("  {}", "No matching spots".dimmed());
            return;
        }

        for (rank, result) in results.iter().enumerate() {
            let row = result.item;
            println!(
                "  {:>2}. {} {}",
                rank + 1,
                row.name.cyan().bold(),
                format!("({:.4})", result.score).dimmed()
            );
            println!("      {} · {} · {}", row.cuisine, row.neighborhood, row.when);
            if !row.notes.is_empty() {
                println!("      {}", row.notes.dimmed());
            }
        }
    }

    pub fn recommendation(&self, text: &str) {
        println!(
            "\n{} {}\n{}",
            "[RECOMMENDATION]".green().bold(),
            "━".repeat(40).dimmed(),
            text
        );
    }
}
