use std::time::{Duration, Instant};

/// Monotonic elapsed-time accounting that is insensitive to pause intervals.
///
/// Two anchors are kept: the instant the current slide became active and the
/// instant the run started. Pausing records `pause_began`; resuming shifts
/// both anchors forward by the pause length, so `now - anchor` reads exactly
/// as if the pause never happened. This shift-on-resume device avoids
/// accumulating and subtracting pause totals on every read.
///
/// Every method takes `now` rather than sampling the clock itself, so callers
/// (and tests) control the time source. Readings are frozen while paused:
/// the effective "now" is the instant the pause began.
#[derive(Debug, Clone, Copy)]
pub struct WalkClock {
    run_start: Instant,
    slide_start: Instant,
    pause_began: Option<Instant>,
}

impl WalkClock {
    /// Anchor both the run and the first slide at `now`.
    pub fn start(now: Instant) -> Self {
        Self {
            run_start: now,
            slide_start: now,
            pause_began: None,
        }
    }

    /// Anchor a new run at `now` with `total` already on the clock.
    /// Used when a completed walkthrough is re-entered without a full reset.
    pub fn with_total(now: Instant, total: Duration) -> Self {
        Self {
            run_start: now.checked_sub(total).unwrap_or(now),
            slide_start: now,
            pause_began: None,
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if self.pause_began.is_none() {
            self.pause_began = Some(now);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(began) = self.pause_began.take() {
            let paused = now.saturating_duration_since(began);
            self.run_start += paused;
            self.slide_start += paused;
        }
    }

    /// Re-anchor the slide-local elapsed time at zero. While paused, the
    /// anchor is the pause instant so the reading stays zero until resume.
    pub fn restart_slide(&mut self, now: Instant) {
        self.slide_start = self.pause_began.unwrap_or(now);
    }

    pub fn is_paused(&self) -> bool {
        self.pause_began.is_some()
    }

    pub fn elapsed_in_slide(&self, now: Instant) -> Duration {
        let effective = self.pause_began.unwrap_or(now);
        effective.saturating_duration_since(self.slide_start)
    }

    pub fn total_elapsed(&self, now: Instant) -> Duration {
        let effective = self.pause_began.unwrap_or(now);
        effective.saturating_duration_since(self.run_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_elapsed_tracks_now() {
        let t0 = Instant::now();
        let clock = WalkClock::start(t0);
        assert_eq!(clock.elapsed_in_slide(t0 + secs(7)), secs(7));
        assert_eq!(clock.total_elapsed(t0 + secs(7)), secs(7));
    }

    #[test]
    fn test_pause_freezes_readings() {
        let t0 = Instant::now();
        let mut clock = WalkClock::start(t0);
        clock.pause(t0 + secs(10));
        assert_eq!(clock.elapsed_in_slide(t0 + secs(500)), secs(10));
        assert_eq!(clock.total_elapsed(t0 + secs(500)), secs(10));
    }

    #[test]
    fn test_resume_shift_excludes_pause() {
        let t0 = Instant::now();
        let mut clock = WalkClock::start(t0);
        clock.pause(t0 + secs(50));
        clock.resume(t0 + secs(550));
        // 500s of pause excluded: 10 more seconds reads as 60 total
        assert_eq!(clock.elapsed_in_slide(t0 + secs(560)), secs(60));
        assert_eq!(clock.total_elapsed(t0 + secs(560)), secs(60));
    }

    #[test]
    fn test_zero_length_pause_is_identity() {
        let t0 = Instant::now();
        let mut clock = WalkClock::start(t0);
        clock.pause(t0 + secs(30));
        clock.resume(t0 + secs(30));
        assert_eq!(clock.elapsed_in_slide(t0 + secs(45)), secs(45));
    }

    #[test]
    fn test_restart_slide_keeps_total() {
        let t0 = Instant::now();
        let mut clock = WalkClock::start(t0);
        clock.restart_slide(t0 + secs(120));
        assert_eq!(clock.elapsed_in_slide(t0 + secs(130)), secs(10));
        assert_eq!(clock.total_elapsed(t0 + secs(130)), secs(130));
    }

    #[test]
    fn test_restart_slide_while_paused_reads_zero() {
        let t0 = Instant::now();
        let mut clock = WalkClock::start(t0);
        clock.pause(t0 + secs(20));
        clock.restart_slide(t0 + secs(25));
        assert_eq!(clock.elapsed_in_slide(t0 + secs(30)), Duration::ZERO);
        clock.resume(t0 + secs(40));
        assert_eq!(clock.elapsed_in_slide(t0 + secs(43)), secs(3));
    }

    #[test]
    fn test_with_total_resumes_accounting() {
        let t0 = Instant::now();
        let clock = WalkClock::with_total(t0 + secs(1000), secs(200));
        assert_eq!(clock.total_elapsed(t0 + secs(1010)), secs(210));
        assert_eq!(clock.elapsed_in_slide(t0 + secs(1010)), secs(10));
    }
}
