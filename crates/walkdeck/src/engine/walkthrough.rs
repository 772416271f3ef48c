use std::time::{Duration, Instant};

use super::clock::WalkClock;
use super::snapshot::{SNAPSHOT_SCHEMA_VERSION, Status, WalkthroughSnapshot, unix_millis};
use super::timeline::{SlideDescriptor, Timeline};

/// The timer-driven walkthrough state machine.
///
/// States: `Idle → Running ⇄ Paused → Completed`, plus `stop` back to `Idle`
/// from anywhere mid-run. Every operation takes `now: Instant` supplied by
/// the caller, and every operation that is not meaningful in the current
/// state is a silent no-op: a live presentation must never halt on a
/// state-machine fault, so there is no error path out of this type.
///
/// The host owns the tick cadence (nominally once per second) and must stop
/// ticking when `status()` leaves `Running`; a tick received in any other
/// state is ignored anyway.
#[derive(Debug, Clone)]
pub struct Walkthrough {
    timeline: Timeline,
    status: Status,
    current_index: usize,
    clock: Option<WalkClock>,
    /// Readings frozen at the instant the run left Running/Paused.
    /// `frozen_total` survives `stop` so an abandoned run's length stays
    /// readable; only a fresh `start` zeroes it.
    frozen_slide: Duration,
    frozen_total: Duration,
}

impl Walkthrough {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            status: Status::Idle,
            current_index: 0,
            clock: None,
            frozen_slide: Duration::ZERO,
            frozen_total: Duration::ZERO,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_slide(&self) -> &SlideDescriptor {
        // The timeline is non-empty and the index is always clamped to it.
        &self.timeline.slides()[self.current_index]
    }

    /// Begin a fresh run from slide 0. Valid from any state; always resets
    /// the total-elapsed clock, so observers never see a stale reading.
    pub fn start(&mut self, now: Instant) {
        self.clock = Some(WalkClock::start(now));
        self.status = Status::Running;
        self.current_index = 0;
        self.frozen_slide = Duration::ZERO;
        self.frozen_total = Duration::ZERO;
    }

    /// Abandon the run: back to `Idle` at slide 0. The final total-elapsed
    /// reading is retained (distinguishing "abandoned after 20 minutes" from
    /// "never started") until the next `start`.
    pub fn stop(&mut self, now: Instant) {
        match self.status {
            Status::Running | Status::Paused => {
                self.frozen_total = self.readings(now).1;
                self.frozen_slide = Duration::ZERO;
                self.status = Status::Idle;
                self.current_index = 0;
                self.clock = None;
            }
            Status::Idle | Status::Completed => {}
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if self.status == Status::Running {
            if let Some(clock) = self.clock.as_mut() {
                clock.pause(now);
            }
            self.status = Status::Paused;
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if self.status == Status::Paused {
            if let Some(clock) = self.clock.as_mut() {
                clock.resume(now);
            }
            self.status = Status::Running;
        }
    }

    pub fn toggle_pause(&mut self, now: Instant) {
        match self.status {
            Status::Running => self.pause(now),
            Status::Paused => self.resume(now),
            Status::Idle | Status::Completed => {}
        }
    }

    /// Manual advance. No-op on the last slide (clamped), in `Idle`, and in
    /// `Completed` (only `jump_to` or `start` leaves the terminal state).
    pub fn next(&mut self, now: Instant) {
        if self.current_index + 1 < self.timeline.len() {
            self.navigate(self.current_index + 1, now);
        }
    }

    pub fn previous(&mut self, now: Instant) {
        if self.current_index > 0 {
            self.navigate(self.current_index - 1, now);
        }
    }

    /// Best-effort jump: an out-of-range index is silently ignored. From
    /// `Completed` this re-enters `Running` with the total-elapsed clock
    /// continuing from the frozen reading.
    pub fn jump_to(&mut self, index: usize, now: Instant) {
        if index >= self.timeline.len() {
            return;
        }
        if self.status == Status::Completed {
            self.clock = Some(WalkClock::with_total(now, self.frozen_total));
            self.status = Status::Running;
            self.current_index = index;
            return;
        }
        self.navigate(index, now);
    }

    fn navigate(&mut self, index: usize, now: Instant) {
        match self.status {
            Status::Running | Status::Paused => {
                self.current_index = index;
                if let Some(clock) = self.clock.as_mut() {
                    clock.restart_slide(now);
                }
            }
            Status::Idle | Status::Completed => {}
        }
    }

    /// Advance the walkthrough by one timer firing. A no-op unless `Running`.
    ///
    /// When the current slide's elapsed time reaches its target the machine
    /// moves to the next slide (slide-local clock re-anchored, total left
    /// running), or freezes into `Completed` past the last slide.
    pub fn tick(&mut self, now: Instant) {
        if self.status != Status::Running {
            return;
        }
        let Some(clock) = self.clock.as_mut() else {
            return;
        };
        let target = self.timeline.slides()[self.current_index].target;
        if clock.elapsed_in_slide(now) >= target {
            if self.current_index + 1 < self.timeline.len() {
                self.current_index += 1;
                clock.restart_slide(now);
            } else {
                self.frozen_slide = target;
                self.frozen_total = clock.total_elapsed(now);
                self.status = Status::Completed;
            }
        }
    }

    /// `(elapsed in slide, total elapsed)` at `now`, honoring frozen states.
    fn readings(&self, now: Instant) -> (Duration, Duration) {
        match (self.status, self.clock.as_ref()) {
            (Status::Running | Status::Paused, Some(clock)) => {
                (clock.elapsed_in_slide(now), clock.total_elapsed(now))
            }
            _ => (self.frozen_slide, self.frozen_total),
        }
    }

    pub fn slide_elapsed(&self, now: Instant) -> Duration {
        self.readings(now).0
    }

    pub fn total_elapsed(&self, now: Instant) -> Duration {
        self.readings(now).1
    }

    /// Progress through the current slide, clamped to `[0, 100]`.
    pub fn progress_percent(&self, now: Instant) -> f32 {
        if self.status == Status::Completed {
            return 100.0;
        }
        let target = self.timeline.slides()[self.current_index]
            .target
            .as_secs_f32();
        let elapsed = self.slide_elapsed(now).as_secs_f32();
        (100.0 * elapsed / target).min(100.0)
    }

    pub fn snapshot(&self, now: Instant) -> WalkthroughSnapshot {
        let (slide_elapsed, total_elapsed) = self.readings(now);
        let slide = self.current_slide();
        WalkthroughSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            status: self.status,
            slide_id: slide.id.clone(),
            slide_index: self.current_index,
            slide_elapsed_secs: slide_elapsed.as_secs(),
            total_elapsed_secs: total_elapsed.as_secs(),
            progress_percent: self.progress_percent(now),
            source_timestamp_ms: unix_millis(),
        }
    }

    /// The read model handed to a rendering layer. Pure projection; the
    /// renderer issues commands and re-renders from this, holding no
    /// walkthrough state of its own.
    pub fn view(&self, now: Instant) -> WalkthroughView {
        let slide = self.current_slide();
        let total_elapsed = self.total_elapsed(now);
        let remaining = self.timeline.total_target().saturating_sub(total_elapsed);
        WalkthroughView {
            status: self.status,
            slide_title: slide.title.clone(),
            slide_index: self.current_index,
            total_slides: self.timeline.len(),
            slide_progress_percent: self.progress_percent(now),
            formatted_elapsed: format_clock(total_elapsed),
            formatted_remaining: format_clock(remaining),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkthroughView {
    pub status: Status,
    pub slide_title: String,
    pub slide_index: usize,
    pub total_slides: usize,
    pub slide_progress_percent: f32,
    pub formatted_elapsed: String,
    pub formatted_remaining: String,
}

/// Format a duration as `m:ss`, or `h:mm:ss` from one hour up.
pub fn format_clock(d: Duration) -> String {
    let total = d.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
