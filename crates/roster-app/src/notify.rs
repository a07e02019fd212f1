// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

use crate::error::FetchError;
use crate::ids::NotificationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    /// How long a toast of this kind stays up before auto-dismissal.
    pub const fn default_duration(self) -> Duration {
        match self {
            Self::Success => Duration::from_millis(4000),
            Self::Error => Duration::from_millis(6000),
            Self::Warning | Self::Info => Duration::from_millis(5000),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    /// `None` keeps the toast until it is dismissed.
    pub expires_at: Option<Instant>,
}

/// Stack of user-facing toasts, newest last.
#[derive(Debug, Clone, Default)]
pub struct NotificationStore {
    items: Vec<Notification>,
    next_id: u64,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Instant,
    ) -> NotificationId {
        self.show_for(kind, message, kind.default_duration(), now)
    }

    /// A zero `duration` makes the toast sticky.
    pub fn show_for(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        duration: Duration,
        now: Instant,
    ) -> NotificationId {
        self.next_id += 1;
        let id = NotificationId::new(self.next_id);
        self.items.push(Notification {
            id,
            kind,
            message: message.into(),
            expires_at: (!duration.is_zero()).then(|| now + duration),
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>, now: Instant) -> NotificationId {
        self.show(NotificationKind::Success, message, now)
    }

    pub fn error(&mut self, message: impl Into<String>, now: Instant) -> NotificationId {
        self.show(NotificationKind::Error, message, now)
    }

    pub fn warning(&mut self, message: impl Into<String>, now: Instant) -> NotificationId {
        self.show(NotificationKind::Warning, message, now)
    }

    pub fn info(&mut self, message: impl Into<String>, now: Instant) -> NotificationId {
        self.show(NotificationKind::Info, message, now)
    }

    pub fn show_fetch_error(&mut self, error: &FetchError, now: Instant) -> NotificationId {
        self.error(error_message(error), now)
    }

    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Removes expired toasts and returns their ids.
    pub fn prune(&mut self, now: Instant) -> Vec<NotificationId> {
        let mut expired = Vec::new();
        self.items.retain(|item| match item.expires_at {
            Some(deadline) if deadline <= now => {
                expired.push(item.id);
                false
            }
            _ => true,
        });
        expired
    }

    pub fn next_expiry(&self) -> Option<Instant> {
        self.items.iter().filter_map(|item| item.expires_at).min()
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Text shown to the user for a failed remote call.
pub fn error_message(error: &FetchError) -> &'static str {
    match error.status() {
        Some(0) => "Network error. Check your connection.",
        Some(400) => "Bad request. Please check your input.",
        Some(401) => "Session expired. Please log in again.",
        Some(403) => "You do not have permission for this action.",
        Some(404) => "Resource not found.",
        Some(409) => "Conflict. The resource was modified by another user.",
        Some(422) => "Validation failed. Please check your input.",
        Some(429) => "Too many requests. Please try again later.",
        Some(status) if status >= 500 => "Server error. Please try again later.",
        _ => "An unexpected error occurred.",
    }
}
