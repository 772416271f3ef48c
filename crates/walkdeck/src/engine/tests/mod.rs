mod advancement;

use std::time::{Duration, Instant};

use super::snapshot::Status;
use super::timeline::{SlideDescriptor, Timeline};
use super::walkthrough::Walkthrough;

/// Helper to build a timeline from `(id, target seconds)` pairs.
fn timeline(slides: &[(&str, u64)]) -> Timeline {
    Timeline::new(
        slides
            .iter()
            .map(|(id, secs)| SlideDescriptor {
                id: id.to_string(),
                title: id.to_uppercase(),
                target: Duration::from_secs(*secs),
            })
            .collect(),
    )
    .unwrap()
}

/// Helper to build a walkthrough already started at a fixed origin instant.
fn started(slides: &[(&str, u64)]) -> (Walkthrough, Instant) {
    let t0 = Instant::now();
    let mut walk = Walkthrough::new(timeline(slides));
    walk.start(t0);
    (walk, t0)
}

/// Shorthand for an offset from the origin instant.
fn at(t0: Instant, secs: u64) -> Instant {
    t0 + Duration::from_secs(secs)
}

/// Drive one tick per simulated second over `(from, from + secs]`.
/// Returns the instant of the last tick.
fn run_ticks(walk: &mut Walkthrough, t0: Instant, from: u64, secs: u64) -> Instant {
    for s in (from + 1)..=(from + secs) {
        walk.tick(at(t0, s));
    }
    at(t0, from + secs)
}

/// Assert the full `(status, index, slide elapsed, total elapsed)` shape.
fn assert_state(
    walk: &Walkthrough,
    now: Instant,
    status: Status,
    index: usize,
    slide_secs: u64,
    total_secs: u64,
) {
    assert_eq!(walk.status(), status, "status");
    assert_eq!(walk.current_index(), index, "current slide index");
    assert_eq!(
        walk.slide_elapsed(now),
        Duration::from_secs(slide_secs),
        "slide elapsed"
    );
    assert_eq!(
        walk.total_elapsed(now),
        Duration::from_secs(total_secs),
        "total elapsed"
    );
}
