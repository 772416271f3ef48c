use std::time::Duration;

use super::snapshot::WalkthroughSnapshot;
use super::timeline::Timeline;

/// Ahead/behind classification cutoffs. The defaults are deliberately
/// asymmetric: finishing early is a mild inconvenience, running over time is
/// an operational problem, so the behind band starts further out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceThresholds {
    /// More than this far ahead of schedule reads as `Ahead`.
    pub ahead: Duration,
    /// This far (or further) behind schedule reads as `Behind`.
    pub behind: Duration,
}

impl Default for PaceThresholds {
    fn default() -> Self {
        Self {
            ahead: Duration::from_secs(30),
            behind: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    Ahead,
    OnPace,
    Behind,
}

impl Pace {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ahead => "ahead",
            Self::OnPace => "on pace",
            Self::Behind => "behind",
        }
    }
}

/// Derived comparison of actual vs. expected cumulative elapsed time.
/// Recomputed on demand from a snapshot and the timeline; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceVerdict {
    pub expected_elapsed: Duration,
    pub actual_elapsed: Duration,
    /// Actual minus expected, in whole seconds. Positive means behind.
    pub delta_secs: i64,
    pub pace: Pace,
}

/// Classify the presenter's pacing at the instant the snapshot was taken.
///
/// The slide position is resolved by id first so a mirror holding a slightly
/// different deck revision still compares against the right schedule entry;
/// the raw index is the fallback.
pub fn analyze(
    snapshot: &WalkthroughSnapshot,
    timeline: &Timeline,
    thresholds: &PaceThresholds,
) -> PaceVerdict {
    let index = timeline
        .index_of(&snapshot.slide_id)
        .unwrap_or(snapshot.slide_index);
    let expected =
        timeline.expected_elapsed_at(index) + Duration::from_secs(snapshot.slide_elapsed_secs);
    let actual = Duration::from_secs(snapshot.total_elapsed_secs);
    let delta_secs = actual.as_secs() as i64 - expected.as_secs() as i64;

    // The behind boundary is inclusive: hitting the limit already counts.
    let pace = if delta_secs < -(thresholds.ahead.as_secs() as i64) {
        Pace::Ahead
    } else if delta_secs >= thresholds.behind.as_secs() as i64 {
        Pace::Behind
    } else {
        Pace::OnPace
    };

    PaceVerdict {
        expected_elapsed: expected,
        actual_elapsed: actual,
        delta_secs,
        pace,
    }
}
