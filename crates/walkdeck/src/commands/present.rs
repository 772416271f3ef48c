use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Instant;

use colored::Colorize;

use crate::catalog::{self, Deck};
use crate::config::Config;
use crate::engine::{Pace, Status, Walkthrough, analyze, format_clock};
use crate::sync::{FileStore, Publisher, session_key};

/// One line typed into the presenter terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PresenterCommand {
    Pause,
    Resume,
    TogglePause,
    Next,
    Previous,
    Jump(usize),
    Stop,
    Quit,
}

fn parse_command(line: &str) -> Option<PresenterCommand> {
    let mut words = line.split_whitespace();
    let command = match words.next()? {
        "pause" => PresenterCommand::Pause,
        "resume" => PresenterCommand::Resume,
        "p" | "space" => PresenterCommand::TogglePause,
        "next" | "n" => PresenterCommand::Next,
        "prev" | "previous" | "b" => PresenterCommand::Previous,
        "jump" | "j" => {
            // Slide numbers are 1-indexed at the prompt.
            let n: usize = words.next()?.parse().ok()?;
            PresenterCommand::Jump(n.checked_sub(1)?)
        }
        "stop" => PresenterCommand::Stop,
        "quit" | "q" | "exit" => PresenterCommand::Quit,
        _ => return None,
    };
    Some(command)
}

pub fn run(file: &Path, session: &str, no_sync: bool, quiet: bool) -> anyhow::Result<()> {
    let deck = catalog::load(file)?;
    let config = Config::load_or_default();
    let thresholds = config.pace_thresholds();
    let tick_interval = config.tick_interval();

    let mut publisher = if no_sync {
        None
    } else {
        let dir = config.session_dir()?;
        let store = FileStore::new(dir)?;
        Some(Publisher::new(session_key(session), None, Some(Arc::new(store))))
    };

    let mut walk = Walkthrough::new(deck.timeline.clone());

    if !quiet {
        print_preamble(&deck, session, no_sync);
    }

    // Stdin is read on its own thread; the main loop multiplexes typed
    // commands with the timer tick via recv_timeout.
    let (tx, rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let start = Instant::now();
    walk.start(start);
    let mut last_shown_index = walk.current_index();
    announce_slide(&deck, &walk, quiet);

    loop {
        let now = Instant::now();
        walk.tick(now);

        if walk.current_index() != last_shown_index {
            last_shown_index = walk.current_index();
            announce_slide(&deck, &walk, quiet);
        }

        if let Some(publisher) = publisher.as_mut() {
            publisher.publish_if_changed(&walk.snapshot(now));
        }

        if !quiet {
            print_status_line(&walk, now);
        }

        match rx.recv_timeout(tick_interval) {
            Ok(line) => {
                let now = Instant::now();
                match parse_command(&line) {
                    Some(PresenterCommand::Pause) => walk.pause(now),
                    Some(PresenterCommand::Resume) => walk.resume(now),
                    Some(PresenterCommand::TogglePause) => walk.toggle_pause(now),
                    Some(PresenterCommand::Next) => walk.next(now),
                    Some(PresenterCommand::Previous) => walk.previous(now),
                    Some(PresenterCommand::Jump(index)) => walk.jump_to(index, now),
                    Some(PresenterCommand::Stop) => walk.stop(now),
                    Some(PresenterCommand::Quit) => break,
                    None => {
                        if !line.trim().is_empty() {
                            eprintln!(
                                "{} Unknown command: {}. Try pause, resume, next, prev, jump N, stop, quit.",
                                "walkdeck:".yellow(),
                                line.trim()
                            );
                        }
                    }
                }
                if walk.current_index() != last_shown_index {
                    last_shown_index = walk.current_index();
                    announce_slide(&deck, &walk, quiet);
                }
                if let Some(publisher) = publisher.as_mut() {
                    publisher.publish_if_changed(&walk.snapshot(now));
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let now = Instant::now();
    if let Some(publisher) = publisher.as_mut() {
        // Final state, so late mirrors see where the run ended.
        publisher.publish(&walk.snapshot(now));
    }

    if !quiet {
        print_summary(&deck, &walk, now, &thresholds);
    }
    Ok(())
}

fn print_preamble(deck: &Deck, session: &str, no_sync: bool) {
    let title = deck.title.as_deref().unwrap_or("Untitled walkthrough");
    println!("{}", title.bold());
    println!(
        "{} slides, {} total",
        deck.timeline.len(),
        format_clock(deck.timeline.total_target())
    );
    if no_sync {
        println!("{}", "Running standalone (no sync).".dimmed());
    } else {
        println!(
            "Mirrors can follow with {}",
            format!("walkdeck watch --session {session}").cyan()
        );
    }
    println!(
        "{}",
        "Commands: pause, resume, next, prev, jump N, stop, quit".dimmed()
    );
    println!();
}

fn announce_slide(deck: &Deck, walk: &Walkthrough, quiet: bool) {
    if quiet || walk.status() == Status::Idle {
        return;
    }
    let index = walk.current_index();
    let slide = walk.current_slide();
    println!(
        "\n{} {} {}",
        format!("[{}/{}]", index + 1, deck.timeline.len()).bold(),
        slide.title.bold(),
        format!("({})", format_clock(slide.target)).dimmed()
    );
    if let Some(Some(notes)) = deck.notes.get(index) {
        println!("  {}", notes.dimmed());
    }
}

fn print_status_line(walk: &Walkthrough, now: Instant) {
    let view = walk.view(now);
    let status = match view.status {
        Status::Running => view.status.label().green(),
        Status::Paused => view.status.label().yellow(),
        Status::Completed => view.status.label().cyan(),
        Status::Idle => view.status.label().dimmed(),
    };
    // \r keeps the ticker on one line between slide announcements.
    print!(
        "\r  {status}  slide {}/{}  {:>3.0}%  elapsed {}  remaining {}   ",
        view.slide_index + 1,
        view.total_slides,
        view.slide_progress_percent,
        view.formatted_elapsed,
        view.formatted_remaining
    );
    use std::io::Write;
    let _ = std::io::stdout().flush();
}

fn print_summary(
    deck: &Deck,
    walk: &Walkthrough,
    now: Instant,
    thresholds: &crate::engine::PaceThresholds,
) {
    let snapshot = walk.snapshot(now);
    let verdict = analyze(&snapshot, &deck.timeline, thresholds);
    let pace = match verdict.pace {
        Pace::Ahead => verdict.pace.label().cyan(),
        Pace::OnPace => verdict.pace.label().green(),
        Pace::Behind => verdict.pace.label().red(),
    };
    println!("\n");
    println!(
        "Finished on slide {}/{} after {}.",
        snapshot.slide_index + 1,
        deck.timeline.len(),
        format_clock(std::time::Duration::from_secs(snapshot.total_elapsed_secs))
    );
    println!(
        "Pace: {pace} ({}{}s against the schedule)",
        if verdict.delta_secs >= 0 { "+" } else { "" },
        verdict.delta_secs
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_words() {
        assert_eq!(parse_command("pause"), Some(PresenterCommand::Pause));
        assert_eq!(parse_command("  next "), Some(PresenterCommand::Next));
        assert_eq!(parse_command("b"), Some(PresenterCommand::Previous));
        assert_eq!(parse_command("quit"), Some(PresenterCommand::Quit));
        assert_eq!(parse_command("jump 3"), Some(PresenterCommand::Jump(2)));
    }

    #[test]
    fn test_parse_command_rejects_garbage() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("jump"), None);
        assert_eq!(parse_command("jump zero"), None);
        assert_eq!(parse_command("jump 0"), None);
        assert_eq!(parse_command("faster"), None);
    }
}
