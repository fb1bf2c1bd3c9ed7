use std::time::{Duration, Instant};

use crate::traits::{SystemTimer, Timer};

/// Waits longer than this start with a coarse OS sleep
const COARSE_SLEEP_THRESHOLD: Duration = Duration::from_millis(10);
/// Portion of the wait left to the spin loop after a coarse sleep
const SPIN_MARGIN: Duration = Duration::from_millis(5);

/// What a call to [`FramePacer::wait_for_next_slot`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceOutcome {
    /// Interval 0 or refresh rate unknown: returned immediately
    Unpaced,
    /// The target had already passed; the reference was reset to now
    Late,
    /// Blocked for this long before returning
    Waited(Duration),
}

/// Software vsync: spaces presentations `interval` refreshes apart.
///
/// Idle until first use, when it captures the reference timestamp. Misses
/// are never paid back; a late frame just resets the reference.
#[derive(Debug)]
pub struct FramePacer<T: Timer = SystemTimer> {
    timer: T,
    interval: u32,
    reference: Option<Instant>,
}

impl Default for FramePacer<SystemTimer> {
    fn default() -> Self {
        Self::new(SystemTimer)
    }
}

impl<T: Timer> FramePacer<T> {
    pub fn new(timer: T) -> Self {
        Self {
            timer,
            interval: 0,
            reference: None,
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn is_armed(&self) -> bool {
        self.reference.is_some()
    }

    /// Timestamp of the last accepted presentation
    pub fn reference(&self) -> Option<Instant> {
        self.reference
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Set the interval in refreshes; negative clamps to 0. Returns the previous one.
    pub fn set_interval(&mut self, interval: i32) -> i32 {
        self.arm();
        let previous = self.interval;
        self.interval = interval.max(0) as u32;
        if self.interval == 0 {
            self.reference = Some(self.timer.now());
        }
        log::debug!("swap interval {} -> {}", previous, self.interval);
        previous as i32
    }

    /// Block until `interval / refresh_hz` seconds after the last accepted slot
    pub fn wait_for_next_slot(&mut self, refresh_hz: Option<u32>) -> PaceOutcome {
        let reference = self.arm();

        let refresh = match refresh_hz {
            Some(hz) if hz > 0 && self.interval > 0 => hz,
            _ => {
                self.reference = Some(self.timer.now());
                return PaceOutcome::Unpaced;
            }
        };

        let target = reference + Duration::from_secs_f64(self.interval as f64 / refresh as f64);
        let start = self.timer.now();
        if start >= target {
            self.reference = Some(start);
            return PaceOutcome::Late;
        }

        let remaining = target - start;
        if remaining > COARSE_SLEEP_THRESHOLD {
            self.timer.sleep(remaining - SPIN_MARGIN);
        }

        let mut end = self.timer.now();
        while end < target {
            std::hint::spin_loop();
            end = self.timer.now();
        }

        self.reference = Some(end);
        PaceOutcome::Waited(end - start)
    }

    fn arm(&mut self) -> Instant {
        let timer = &self.timer;
        *self.reference.get_or_insert_with(|| timer.now())
    }
}
