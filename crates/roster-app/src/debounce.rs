// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
/// Longer windows are clamped to this.
pub const MAX_DEBOUNCE: Duration = Duration::from_secs(60);

/// Collapses a burst of search edits into the last value once input has
/// been quiet for `window`.
///
/// The caller owns the clock: every method takes `now`, and the event loop
/// uses [`Debouncer::next_deadline`] to decide how long it may sleep.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    pending: Option<Pending>,
    disposed: bool,
}

#[derive(Debug, Clone)]
struct Pending {
    text: String,
    deadline: Instant,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub const fn new(window: Duration) -> Self {
        let window = if window.as_millis() > MAX_DEBOUNCE.as_millis() {
            MAX_DEBOUNCE
        } else {
            window
        };
        Self {
            window,
            pending: None,
            disposed: false,
        }
    }

    pub const fn window(&self) -> Duration {
        self.window
    }

    pub fn on_change(&mut self, text: &str, now: Instant) {
        if self.disposed {
            return;
        }
        self.pending = Some(Pending {
            text: text.to_owned(),
            deadline: now.checked_add(self.window).unwrap_or(now),
        });
    }

    pub fn poll(&mut self, now: Instant) -> Option<String> {
        if self.disposed {
            return None;
        }
        match &self.pending {
            Some(pending) if now >= pending.deadline => {
                self.pending.take().map(|pending| pending.text)
            }
            _ => None,
        }
    }

    /// Drops any pending edit and yields the empty query right away.
    pub fn clear(&mut self) -> String {
        self.pending = None;
        String::new()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn dispose(&mut self) {
        self.pending = None;
        self.disposed = true;
    }
}
