//! Race pacing
//!
//! Two independent clocks drive a race:
//! - `FrameClock` turns render-loop timestamps into per-frame `dt`
//! - `CountdownTimer` fires at a fixed wall-clock cadence during the countdown
//!
//! `Session` owns both plus the `Race`, and cancels them together.

use std::time::Duration;

use crate::consts::COUNTDOWN_START;
use crate::gates::Side;
use crate::settings::Settings;
use crate::sim::{Race, RacePhase, RunState, TickInput};

/// Converts monotonically increasing timestamps (seconds) into frame deltas
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<f64>,
    max_dt: f32,
    running: bool,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last: None,
            max_dt,
            running: false,
        }
    }

    /// Begin delivering frames; the next sample yields `dt = 0`
    pub fn begin(&mut self) {
        self.last = None;
        self.running = true;
    }

    /// Stop delivering frames and forget the last timestamp
    pub fn cancel(&mut self) {
        self.last = None;
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Delta since the previous sample, or None when cancelled
    pub fn sample(&mut self, timestamp: f64) -> Option<f32> {
        if !self.running {
            return None;
        }
        let previous = self.last.replace(timestamp).unwrap_or(timestamp);
        let dt = (timestamp - previous) as f32;
        // Timestamps going backwards or NaN collapse to an empty frame
        Some(if dt.is_finite() { dt.clamp(0.0, self.max_dt) } else { 0.0 })
    }
}

/// Most ticks a single `advance` reports (3, 2, 1, Go, then Running)
const MAX_DUE_TICKS: u32 = COUNTDOWN_START as u32 + 1;

/// Coarse fixed-cadence timer for the countdown
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    interval: Duration,
    accumulated: Duration,
    armed: bool,
}

impl CountdownTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
            armed: false,
        }
    }

    pub fn arm(&mut self) {
        self.accumulated = Duration::ZERO;
        self.armed = true;
    }

    pub fn cancel(&mut self) {
        self.accumulated = Duration::ZERO;
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Feed elapsed wall time; returns how many ticks are due
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.armed || self.interval.is_zero() {
            return 0;
        }
        self.accumulated = self.accumulated.saturating_add(elapsed);
        let due = self.accumulated.as_nanos() / self.interval.as_nanos();
        if due > u128::from(MAX_DUE_TICKS) {
            // Nothing past the countdown cares about the leftover
            self.accumulated = Duration::ZERO;
            return MAX_DUE_TICKS;
        }
        let fired = due as u32;
        self.accumulated -= self.interval.saturating_mul(fired);
        fired
    }
}

/// A race together with the clocks that pace it
#[derive(Debug, Clone)]
pub struct Session {
    race: Race,
    frames: FrameClock,
    countdown: CountdownTimer,
}

impl Session {
    pub fn new(race: Race, settings: &Settings) -> Self {
        Self {
            race,
            frames: FrameClock::new(settings.max_frame_dt),
            countdown: CountdownTimer::new(settings.countdown_interval()),
        }
    }

    /// Start the race and arm the countdown timer
    pub fn start(&mut self) {
        self.race.start();
        if self.race.phase() == RacePhase::Countdown {
            self.frames.cancel();
            self.countdown.arm();
        }
    }

    /// Reset the race, stopping both clocks
    pub fn reset(&mut self) {
        self.teardown();
        self.race.reset();
    }

    /// Stop both clocks without touching the run (host going away)
    pub fn teardown(&mut self) {
        self.frames.cancel();
        self.countdown.cancel();
    }

    pub fn set_input(&mut self, input: TickInput) {
        self.race.set_input(input);
    }

    pub fn commit_lane(&mut self, lane: Side) {
        self.race.commit_lane(lane);
    }

    /// Countdown timer callback with the wall time since the last call
    pub fn on_timer(&mut self, elapsed: Duration) {
        for _ in 0..self.countdown.advance(elapsed) {
            self.race.tick_countdown();
            if self.race.phase() == RacePhase::Running {
                self.countdown.cancel();
                self.frames.begin();
                break;
            }
        }
    }

    /// Frame callback with the render loop's timestamp in seconds
    pub fn on_frame(&mut self, timestamp: f64) {
        let Some(dt) = self.frames.sample(timestamp) else {
            return;
        };
        self.race.step(dt);
        if self.race.phase() != RacePhase::Running {
            self.frames.cancel();
        }
    }

    pub fn race(&self) -> &Race {
        &self.race
    }

    pub fn snapshot(&self) -> &RunState {
        self.race.snapshot()
    }

    pub fn frames_running(&self) -> bool {
        self.frames.is_running()
    }

    pub fn countdown_armed(&self) -> bool {
        self.countdown.is_armed()
    }
}
