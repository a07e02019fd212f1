// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

/// Why a remote call failed. Each value belongs to one operation; the
/// client that produced it stays usable for the next call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl FetchError {
    /// Builds the error for a non-2xx status. A 404 on a single-record path
    /// becomes [`FetchError::NotFound`].
    pub fn from_status(status: u16, message: impl Into<String>, record_path: bool) -> Self {
        let message = message.into();
        if status == 404 && record_path {
            Self::NotFound(message)
        } else {
            Self::Http { status, message }
        }
    }

    /// Short machine tag, `network`, `http:<status>` or `decode`.
    pub fn tag(&self) -> String {
        match self {
            Self::Network(_) => "network".to_owned(),
            Self::Http { status, .. } => format!("http:{status}"),
            Self::NotFound(_) => "http:404".to_owned(),
            Self::Decode(_) => "decode".to_owned(),
        }
    }

    /// HTTP status, with `0` standing in for "no response".
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network(_) => Some(0),
            Self::Http { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Decode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || self.status() == Some(404)
    }
}
