// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use roster_app::{FetchError, MutationKind, RecordId, RequestId};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use tracing::debug;

use crate::Collection;

/// Tripped when the consumer no longer wants a request's result.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create(serde_json::Value),
    Update(RecordId, serde_json::Value),
    Patch(RecordId, serde_json::Value),
    Delete(RecordId),
}

impl Mutation {
    pub const fn kind(&self) -> MutationKind {
        match self {
            Self::Create(_) => MutationKind::Create,
            Self::Update(..) => MutationKind::Update,
            Self::Patch(..) => MutationKind::Patch,
            Self::Delete(_) => MutationKind::Delete,
        }
    }

    pub const fn record(&self) -> Option<RecordId> {
        match self {
            Self::Create(_) => None,
            Self::Update(id, _) | Self::Patch(id, _) | Self::Delete(id) => Some(*id),
        }
    }
}

/// A finished background call, tagged with the request id it was started
/// under.
#[derive(Debug)]
pub enum FetchEvent<T> {
    Listed {
        request_id: RequestId,
        result: Result<Vec<T>, FetchError>,
    },
    Mutated {
        request_id: RequestId,
        kind: MutationKind,
        result: Result<(), FetchError>,
    },
}

impl<T> FetchEvent<T> {
    pub const fn request_id(&self) -> RequestId {
        match self {
            Self::Listed { request_id, .. } | Self::Mutated { request_id, .. } => *request_id,
        }
    }
}

pub fn spawn_list<T>(
    collection: &Collection<T>,
    request_id: RequestId,
    query: Vec<(String, String)>,
    cancel: CancelToken,
    tx: Sender<FetchEvent<T>>,
) -> JoinHandle<()>
where
    T: DeserializeOwned + Send + 'static,
{
    let collection = collection.clone();
    thread::spawn(move || {
        let result = collection.list(&query);
        deliver(&cancel, &tx, FetchEvent::Listed { request_id, result });
    })
}

pub fn spawn_mutation<T>(
    collection: &Collection<T>,
    request_id: RequestId,
    mutation: Mutation,
    cancel: CancelToken,
    tx: Sender<FetchEvent<T>>,
) -> JoinHandle<()>
where
    T: DeserializeOwned + Send + 'static,
{
    let collection = collection.clone();
    thread::spawn(move || {
        let kind = mutation.kind();
        let result = match mutation {
            Mutation::Create(body) => collection.create(&body).map(drop),
            Mutation::Update(id, body) => collection.update(id, &body).map(drop),
            Mutation::Patch(id, body) => collection.patch(id, &body).map(drop),
            Mutation::Delete(id) => collection.delete(id),
        };
        deliver(
            &cancel,
            &tx,
            FetchEvent::Mutated {
                request_id,
                kind,
                result,
            },
        );
    })
}

fn deliver<T>(cancel: &CancelToken, tx: &Sender<FetchEvent<T>>, event: FetchEvent<T>) {
    let request_id = event.request_id().get();
    if cancel.is_cancelled() {
        debug!(request_id, "discarding result of cancelled request");
        return;
    }
    if tx.send(event).is_err() {
        debug!(request_id, "fetch event receiver gone");
    }
}
