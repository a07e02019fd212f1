// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use roster_app::{
    ListCommand, ListConfig, ListEvent, ListState, ListView, PageItem, RecordId, RequestId, Row,
    RowFields,
};
use roster_client::{
    Api, CancelToken, Collection, FetchEvent, Mutation, spawn_list, spawn_mutation,
};
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const MAX_CELL_WIDTH: usize = 32;
const MAX_PUMP_WAIT: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Products,
    Users,
}

impl Entity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "products" | "product" => Some(Self::Products),
            "users" | "user" => Some(Self::Users),
            _ => None,
        }
    }

    pub const fn collection(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Users => "users",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Products => "Product",
            Self::Users => "User",
        }
    }

    /// `(field, header)` pairs in display order.
    pub const fn columns(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Products => &[
                ("id", "ID"),
                ("name", "Name"),
                ("sku", "SKU"),
                ("price", "Price"),
                ("quantity", "Qty"),
                ("category", "Category"),
                ("isActive", "Active"),
            ],
            Self::Users => &[("id", "ID"), ("name", "Name"), ("email", "Email")],
        }
    }

    pub fn list_config(self, page_size: Option<usize>, debounce: Duration) -> ListConfig {
        let fields: Vec<&str> = self.columns().iter().map(|(field, _)| *field).collect();
        let config = match self {
            Self::Products => ListConfig::new(self.label())
                .search_fields(&["name", "sku", "category"])
                .page_size(5),
            Self::Users => ListConfig::new(self.label())
                .search_fields(&["name", "email"])
                .page_size(10),
        };
        let config = config.sortable(&fields).debounce(debounce);
        match page_size {
            Some(page_size) => config.page_size(page_size),
            None => config,
        }
    }
}

/// Drives one [`ListState`] against a remote collection.
///
/// The session thread owns all list state. Fetches and mutations run on
/// worker threads and report back over a channel that [`ListSession::pump`]
/// drains.
pub struct ListSession {
    entity: Entity,
    collection: Collection<Row>,
    state: ListState<Row, RowFields>,
    tx: Sender<FetchEvent<Row>>,
    rx: Receiver<FetchEvent<Row>>,
    // Fetch and mutation ids come from separate counters.
    fetches: BTreeMap<RequestId, CancelToken>,
    mutations: BTreeMap<RequestId, CancelToken>,
}

impl ListSession {
    pub fn new(api: &Api, entity: Entity, config: ListConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            entity,
            collection: api.collection(entity.collection()),
            state: ListState::new(config, RowFields),
            tx,
            rx,
            fetches: BTreeMap::new(),
            mutations: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> &ListState<Row, RowFields> {
        &self.state
    }

    pub fn view(&self) -> ListView<'_, Row> {
        self.state.view()
    }

    pub fn dispatch(&mut self, command: ListCommand) -> Vec<ListEvent> {
        let events = self.state.dispatch(command, Instant::now());
        self.follow(events)
    }

    pub fn reload(&mut self) -> Vec<ListEvent> {
        self.dispatch(ListCommand::Reload)
    }

    pub fn mutate(&mut self, mutation: Mutation) -> Vec<ListEvent> {
        let Some(request_id) = self.state.begin_mutation(mutation.kind(), mutation.record())
        else {
            return Vec::new();
        };
        let cancel = CancelToken::new();
        spawn_mutation(
            &self.collection,
            request_id,
            mutation,
            cancel.clone(),
            self.tx.clone(),
        );
        self.mutations.insert(request_id, cancel);
        self.state.mutation_started(request_id).into_iter().collect()
    }

    pub fn is_busy(&self) -> bool {
        !self.fetches.is_empty() || !self.mutations.is_empty() || self.state.search_pending()
    }

    /// Applies worker results and due deadlines until nothing is in flight
    /// and no search is waiting, or until `limit` elapses.
    pub fn pump(&mut self, limit: Duration) -> Vec<ListEvent> {
        let start = Instant::now();
        let until = start
            .checked_add(limit.min(MAX_PUMP_WAIT))
            .unwrap_or(start);
        let mut events = Vec::new();
        loop {
            let now = Instant::now();
            let due = self.state.tick(now);
            events.extend(self.follow(due));
            if !self.is_busy() {
                break;
            }
            if now >= until {
                warn!(
                    fetches = self.fetches.len(),
                    mutations = self.mutations.len(),
                    "gave up waiting for outstanding requests"
                );
                break;
            }

            let wake = match self.state.next_deadline() {
                Some(deadline) if self.state.search_pending() => deadline.min(until),
                _ => until,
            };
            match self.rx.recv_timeout(wake.saturating_duration_since(now)) {
                Ok(event) => events.extend(self.apply(event)),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        events
    }

    fn apply(&mut self, event: FetchEvent<Row>) -> Vec<ListEvent> {
        let now = Instant::now();
        match event {
            FetchEvent::Listed { request_id, result } => {
                self.fetches.remove(&request_id);
                self.state.apply_fetch(request_id, result, now)
            }
            FetchEvent::Mutated {
                request_id, result, ..
            } => {
                self.mutations.remove(&request_id);
                let events = self.state.apply_mutation(request_id, result, now);
                let succeeded = events
                    .iter()
                    .any(|event| matches!(event, ListEvent::MutationSucceeded { .. }));
                let mut events = self.follow(events);
                if succeeded {
                    events.extend(self.reload());
                }
                events
            }
        }
    }

    /// Starts the fetches that `events` ask for.
    fn follow(&mut self, events: Vec<ListEvent>) -> Vec<ListEvent> {
        for event in &events {
            match event {
                ListEvent::FetchRequested(request_id) => {
                    let cancel = CancelToken::new();
                    spawn_list(
                        &self.collection,
                        *request_id,
                        Vec::new(),
                        cancel.clone(),
                        self.tx.clone(),
                    );
                    self.fetches.insert(*request_id, cancel);
                    debug!(
                        collection = self.entity.collection(),
                        request_id = request_id.get(),
                        "list fetch started"
                    );
                }
                ListEvent::StaleDropped(request_id) => {
                    debug!(request_id = request_id.get(), "stale response dropped");
                }
                ListEvent::FetchFailed { error, .. } => {
                    info!(collection = self.entity.collection(), tag = %error.tag(), "list fetch failed");
                }
                _ => {}
            }
        }
        events
    }

    /// Tears the session down. Results still in flight are discarded.
    pub fn dispose(&mut self) {
        for cancel in self.fetches.values().chain(self.mutations.values()) {
            cancel.cancel();
        }
        self.fetches.clear();
        self.mutations.clear();
        self.state.dispose();
    }

    pub fn render(&self, out: &mut impl Write) -> Result<()> {
        let view = self.state.view();
        let columns = self.entity.columns();

        let mut heading = format!("{}s", self.entity.label());
        if !view.search_text.is_empty() {
            heading.push_str(&format!("  search: {:?}", view.search_text));
        }
        if let (Some(column), Some(direction)) = (view.sort.column(), view.sort.direction()) {
            heading.push_str(&format!("  sort: {column} {}", direction.as_str()));
        }
        writeln!(out, "{heading}")?;

        if view.loading {
            writeln!(out, "loading...")?;
        }
        if let Some(error) = view.error {
            writeln!(out, "error: {error}")?;
        }

        let cells: Vec<Vec<String>> = view
            .items
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|(field, _)| cell_text(row, field))
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(index, (_, header))| {
                cells
                    .iter()
                    .map(|row| row[index].chars().count())
                    .chain([header.chars().count()])
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|((_, header), width)| format!("{header:<width$}"))
            .collect();
        writeln!(out, "{}", header.join("  ").trim_end())?;
        if cells.is_empty() {
            writeln!(out, "(no {} found)", self.entity.collection())?;
        }
        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect();
            writeln!(out, "{}", line.join("  ").trim_end())?;
        }

        let window: Vec<String> = view
            .window
            .iter()
            .map(|item| match item {
                PageItem::Page(page) if *page == view.meta.page => format!("[{page}]"),
                other => other.to_string(),
            })
            .collect();
        writeln!(out, "pages: {}", window.join(" "))?;
        if view.meta.total_items == 0 {
            writeln!(out, "{}", view.meta.range_label)?;
        } else {
            writeln!(
                out,
                "{} of {}",
                view.meta.range_label, view.meta.total_items
            )?;
        }

        for notice in view.notifications {
            writeln!(out, "[{}] {}", notice.kind.as_str(), notice.message)?;
        }
        Ok(())
    }
}

impl Drop for ListSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn cell_text(row: &Row, field: &str) -> String {
    let text = row.get(field).map(ToString::to_string).unwrap_or_default();
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text;
    }
    let mut clipped: String = text.chars().take(MAX_CELL_WIDTH - 3).collect();
    clipped.push_str("...");
    clipped
}

/// Parses `--delete` style record ids.
pub fn parse_record_id(raw: &str) -> Result<RecordId> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(RecordId::new(id)),
        _ => bail!("invalid record id {raw:?}; expected a positive integer"),
    }
}
