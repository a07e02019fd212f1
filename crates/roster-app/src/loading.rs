// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

pub const DEFAULT_SPINNER_DELAY: Duration = Duration::from_millis(300);

/// Counts requests that want the global busy indicator.
///
/// The spinner only shows once loading has been continuous for the spinner
/// delay, so fast responses never flash it.
#[derive(Debug, Clone)]
pub struct LoadingTracker {
    active: usize,
    busy_since: Option<Instant>,
    spinner_delay: Duration,
}

impl Default for LoadingTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SPINNER_DELAY)
    }
}

impl LoadingTracker {
    pub const fn new(spinner_delay: Duration) -> Self {
        Self {
            active: 0,
            busy_since: None,
            spinner_delay,
        }
    }

    pub fn start(&mut self, now: Instant) {
        if self.active == 0 {
            self.busy_since = Some(now);
        }
        self.active += 1;
    }

    pub fn finish(&mut self) {
        self.active = self.active.saturating_sub(1);
        if self.active == 0 {
            self.busy_since = None;
        }
    }

    pub const fn active(&self) -> usize {
        self.active
    }

    pub const fn is_loading(&self) -> bool {
        self.active > 0
    }

    pub fn spinner_visible(&self, now: Instant) -> bool {
        self.busy_since
            .is_some_and(|since| now.saturating_duration_since(since) >= self.spinner_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::LoadingTracker;
    use std::time::{Duration, Instant};

    #[test]
    fn overlapping_requests_keep_loading_until_last_finishes() {
        let start = Instant::now();
        let mut tracker = LoadingTracker::default();
        tracker.start(start);
        tracker.start(start + Duration::from_millis(10));
        assert_eq!(tracker.active(), 2);

        tracker.finish();
        assert!(tracker.is_loading());
        tracker.finish();
        assert!(!tracker.is_loading());
    }

    #[test]
    fn spinner_waits_for_continuous_loading() {
        let start = Instant::now();
        let mut tracker = LoadingTracker::new(Duration::from_millis(300));
        tracker.start(start);
        assert!(!tracker.spinner_visible(start + Duration::from_millis(299)));
        assert!(tracker.spinner_visible(start + Duration::from_millis(300)));

        tracker.finish();
        assert!(!tracker.spinner_visible(start + Duration::from_secs(5)));
    }

    #[test]
    fn finish_without_start_does_not_underflow() {
        let mut tracker = LoadingTracker::default();
        tracker.finish();
        assert_eq!(tracker.active(), 0);
    }
}
