// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::debug;

use crate::error::FetchError;
use crate::ids::RequestId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl ResourceStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Outcome of handing a completion to [`Resource::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

/// The observable state of one remote value.
///
/// Every [`Resource::begin`] opens a new generation. Only the completion
/// carrying the newest generation is applied, so a slow early response can
/// never overwrite a later one. The previous value is kept while a reload is
/// in flight.
#[derive(Debug, Clone)]
pub struct Resource<T> {
    status: ResourceStatus,
    value: Option<T>,
    error: Option<FetchError>,
    generation: u64,
    in_flight: Option<RequestId>,
    disposed: bool,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self {
            status: ResourceStatus::Idle,
            value: None,
            error: None,
            generation: 0,
            in_flight: None,
            disposed: false,
        }
    }
}

impl<T> Resource<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> RequestId {
        let request_id = RequestId::bump(&mut self.generation);
        if self.disposed {
            return request_id;
        }
        self.status = ResourceStatus::Loading;
        self.error = None;
        self.in_flight = Some(request_id);
        request_id
    }

    pub fn complete(&mut self, request_id: RequestId, result: Result<T, FetchError>) -> Completion {
        if self.disposed || self.in_flight != Some(request_id) {
            debug!(
                request_id = request_id.get(),
                current = self.generation,
                disposed = self.disposed,
                "dropping stale completion"
            );
            return Completion::Stale;
        }

        self.in_flight = None;
        match result {
            Ok(value) => {
                self.status = ResourceStatus::Success;
                self.value = Some(value);
                self.error = None;
            }
            Err(error) => {
                self.status = ResourceStatus::Error;
                self.error = Some(error);
            }
        }
        Completion::Applied
    }

    /// Abandons whatever is in flight; every later completion is stale.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.in_flight = None;
    }

    pub const fn status(&self) -> ResourceStatus {
        self.status
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub const fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    pub fn is_loading(&self) -> bool {
        self.status == ResourceStatus::Loading
    }

    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }
}
