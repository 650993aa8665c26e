use std::time::Duration;

/// Owned state of the external periodic tick trigger.
///
/// The engine starts, stops and re-times the schedule; the driver reads
/// [`TickSchedule::interval`] and only calls `tick` while it is `Some`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TickSchedule {
    interval: Duration,
    running: bool,
}

impl TickSchedule {
    #[must_use]
    pub fn stopped(interval: Duration) -> Self {
        Self {
            interval,
            running: false,
        }
    }

    pub fn start(&mut self, interval: Duration) {
        self.interval = interval;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Changes the period without starting or stopping the schedule.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current period while running, `None` while stopped.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.running.then_some(self.interval)
    }

    /// Configured period regardless of the running flag.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.interval
    }
}
