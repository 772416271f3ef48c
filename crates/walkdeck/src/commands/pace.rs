use std::path::Path;
use std::time::Duration;

use colored::Colorize;

use crate::catalog;
use crate::engine::format_clock;

/// Print the deck's expected-time schedule: for each slide, the cumulative
/// clock time at which the presenter should be starting it.
pub fn run(file: &Path) -> anyhow::Result<()> {
    let deck = catalog::load(file)?;

    if let Some(title) = &deck.title {
        println!("{}", title.bold());
    }
    println!(
        "{} slides, {} total\n",
        deck.timeline.len(),
        format_clock(deck.timeline.total_target())
    );

    let mut cumulative = Duration::ZERO;
    for (index, slide) in deck.timeline.slides().iter().enumerate() {
        println!(
            "  {:>7}  {}  {} {}",
            format_clock(cumulative),
            format!("[{}]", index + 1).dimmed(),
            slide.title,
            format!("({})", format_clock(slide.target)).dimmed()
        );
        cumulative += slide.target;
    }
    println!(
        "  {:>7}  {}",
        format_clock(cumulative),
        "end".dimmed()
    );
    Ok(())
}
