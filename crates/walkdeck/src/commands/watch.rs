use std::path::PathBuf;
use std::time::{Duration, Instant};

use colored::Colorize;

use crate::catalog::{self, Deck};
use crate::config::Config;
use crate::engine::{Pace, PaceThresholds, Status, WalkthroughSnapshot, analyze, format_clock};
use crate::sync::{FileStore, Mirror, session_key};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Staleness past this is worth flagging: the presenter publishes at least
/// once per second while anything changes.
const STALE_AFTER: Duration = Duration::from_secs(5);

pub fn run(file: Option<PathBuf>, session: &str, quiet: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default();
    let thresholds = config.pace_thresholds();
    let deck = match file {
        Some(path) => Some(catalog::load(&path)?),
        None => None,
    };

    let key = session_key(session);
    let store = FileStore::new(config.session_dir()?)?;
    let mirror = Mirror::mount(&key, None, Some(&store));

    if !quiet {
        println!("Following session {}. Ctrl-C to leave.", session.bold());
        if mirror.latest().is_none() {
            println!("{}", "Waiting for the presenter to publish...".dimmed());
        }
    }

    let mut last_timestamp = 0u64;
    loop {
        if let Some(received) = mirror.latest() {
            let snapshot = &received.snapshot;
            if snapshot.source_timestamp_ms != last_timestamp {
                last_timestamp = snapshot.source_timestamp_ms;
                render(snapshot, deck.as_ref(), &thresholds);
            } else if let Some(staleness) = mirror.staleness(Instant::now()) {
                if staleness > STALE_AFTER && snapshot.status == Status::Running {
                    print!(
                        "\r{}",
                        format!("  (no update for {})   ", format_clock(staleness)).dimmed()
                    );
                    use std::io::Write;
                    let _ = std::io::stdout().flush();
                }
            }
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn render(snapshot: &WalkthroughSnapshot, deck: Option<&Deck>, thresholds: &PaceThresholds) {
    let status = match snapshot.status {
        Status::Running => snapshot.status.label().green(),
        Status::Paused => snapshot.status.label().yellow(),
        Status::Completed => snapshot.status.label().cyan(),
        Status::Idle => snapshot.status.label().dimmed(),
    };

    let title = deck
        .and_then(|d| {
            d.timeline
                .index_of(&snapshot.slide_id)
                .or(Some(snapshot.slide_index))
                .and_then(|i| d.timeline.get(i))
        })
        .map(|s| s.title.clone())
        .unwrap_or_else(|| snapshot.slide_id.clone());

    print!(
        "\r{status}  {} {}  {:>3.0}%  slide {}  total {}   ",
        format!("[{}]", snapshot.slide_index + 1).bold(),
        title.bold(),
        snapshot.progress_percent,
        format_clock(Duration::from_secs(snapshot.slide_elapsed_secs)),
        format_clock(Duration::from_secs(snapshot.total_elapsed_secs))
    );

    if let Some(deck) = deck {
        let verdict = analyze(snapshot, &deck.timeline, thresholds);
        let pace = match verdict.pace {
            Pace::Ahead => verdict.pace.label().cyan(),
            Pace::OnPace => verdict.pace.label().green(),
            Pace::Behind => verdict.pace.label().red(),
        };
        print!(
            "{pace} ({}{}s)   ",
            if verdict.delta_secs >= 0 { "+" } else { "" },
            verdict.delta_secs
        );
    }

    use std::io::Write;
    let _ = std::io::stdout().flush();
}
