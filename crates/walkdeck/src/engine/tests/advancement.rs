use super::*;

#[test]
fn natural_completion_visits_every_slide_in_order() {
    let (mut walk, t0) = started(&[("a", 10), ("b", 20), ("c", 15)]);
    let mut visited = vec![walk.current_index()];

    for s in 1..=60 {
        walk.tick(at(t0, s));
        if visited.last() != Some(&walk.current_index()) {
            visited.push(walk.current_index());
        }
        if walk.status() == Status::Completed {
            break;
        }
    }

    assert_eq!(visited, vec![0, 1, 2], "slides visited out of order");
    assert_eq!(walk.status(), Status::Completed);
}

#[test]
fn single_slide_deck_completes() {
    let (mut walk, t0) = started(&[("only", 5)]);
    run_ticks(&mut walk, t0, 0, 5);
    assert_eq!(walk.status(), Status::Completed);
    assert_eq!(walk.progress_percent(at(t0, 5)), 100.0);
}

#[test]
fn rollover_scenario_130s_over_120s_slide() {
    // Timeline [A:120, B:60]; 130 simulated seconds of ticking lands
    // 10s into slide B with the total still running.
    let (mut walk, t0) = started(&[("a", 120), ("b", 60)]);
    let now = run_ticks(&mut walk, t0, 0, 130);
    assert_state(&walk, now, Status::Running, 1, 10, 130);
}

#[test]
fn rollover_resets_slide_progress() {
    let (mut walk, t0) = started(&[("a", 60), ("b", 60)]);
    run_ticks(&mut walk, t0, 0, 59);
    assert!(walk.progress_percent(at(t0, 59)) > 98.0);
    run_ticks(&mut walk, t0, 59, 1);
    // The tick at 60s advanced to B and re-anchored the slide clock
    assert_eq!(walk.current_index(), 1);
    assert_eq!(walk.progress_percent(at(t0, 60)), 0.0);
}

#[test]
fn progress_is_monotonic_within_a_slide() {
    let (mut walk, t0) = started(&[("a", 100)]);
    let mut previous = walk.progress_percent(t0);
    for s in 1..100 {
        walk.tick(at(t0, s));
        let p = walk.progress_percent(at(t0, s));
        assert!(
            p >= previous,
            "progress regressed from {previous} to {p} at {s}s"
        );
        assert!((0.0..=100.0).contains(&p), "progress out of range: {p}");
        previous = p;
    }
}

#[test]
fn total_elapsed_keeps_running_across_slide_boundaries() {
    let (mut walk, t0) = started(&[("a", 30), ("b", 30), ("c", 30)]);
    let now = run_ticks(&mut walk, t0, 0, 70);
    assert_eq!(walk.current_index(), 2);
    assert_eq!(walk.total_elapsed(now), Duration::from_secs(70));
}

#[test]
fn completion_freezes_readings() {
    let (mut walk, t0) = started(&[("a", 10)]);
    run_ticks(&mut walk, t0, 0, 10);
    assert_eq!(walk.status(), Status::Completed);
    // Ticks and time after completion change nothing
    run_ticks(&mut walk, t0, 10, 500);
    assert_state(&walk, at(t0, 510), Status::Completed, 0, 10, 10);
}

#[test]
fn tick_is_noop_while_idle() {
    let mut walk = Walkthrough::new(timeline(&[("a", 10)]));
    let t0 = Instant::now();
    walk.tick(at(t0, 100));
    assert_state(&walk, at(t0, 100), Status::Idle, 0, 0, 0);
}
