// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::debounce::{DEFAULT_DEBOUNCE, Debouncer};
use crate::error::FetchError;
use crate::filter::filter_rows;
use crate::ids::{NotificationId, RecordId, RequestId};
use crate::notify::{Notification, NotificationStore};
use crate::paginate::{Page, PageItem, PageMeta, clamp_page, go_to_page, paginate, total_pages};
use crate::query::{DEFAULT_PAGE_SIZE, QueryState, SortState};
use crate::resource::{Completion, Resource, ResourceStatus};
use crate::sort::sort_rows;
use crate::value::FieldAccess;

/// Static description of one list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    /// Singular noun used in toasts, e.g. "Product".
    pub entity: String,
    pub search_fields: Vec<String>,
    /// Columns a header click may sort by. Empty allows every column.
    pub sortable: Vec<String>,
    pub page_size: usize,
    pub debounce: Duration,
}

impl ListConfig {
    pub fn new(entity: &str) -> Self {
        Self {
            entity: entity.to_owned(),
            search_fields: Vec::new(),
            sortable: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn search_fields(mut self, fields: &[&str]) -> Self {
        self.search_fields = fields.iter().map(|field| (*field).to_owned()).collect();
        self
    }

    pub fn sortable(mut self, columns: &[&str]) -> Self {
        self.sortable = columns.iter().map(|column| (*column).to_owned()).collect();
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    pub fn is_sortable(&self, column: &str) -> bool {
        self.sortable.is_empty() || self.sortable.iter().any(|known| known == column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Patch,
    Delete,
}

impl MutationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }

    const fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update | Self::Patch => "updated",
            Self::Delete => "deleted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MutationInFlight {
    kind: MutationKind,
    record: Option<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    SearchInput(String),
    ClearSearch,
    SortHeaderClick(String),
    PageClick(usize),
    SetPageSize(usize),
    Reload,
    DismissNotification(NotificationId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    SearchScheduled {
        deadline: Instant,
    },
    SearchApplied(String),
    SortChanged(SortState),
    SortUnavailable(String),
    PageChanged(usize),
    PageSizeChanged(usize),
    FetchRequested(RequestId),
    FetchApplied(RequestId),
    FetchFailed {
        request_id: RequestId,
        error: FetchError,
    },
    StaleDropped(RequestId),
    MutationStarted {
        request_id: RequestId,
        kind: MutationKind,
        record: Option<RecordId>,
    },
    MutationSucceeded {
        request_id: RequestId,
        kind: MutationKind,
    },
    MutationFailed {
        request_id: RequestId,
        kind: MutationKind,
        error: FetchError,
    },
    Notified(NotificationId),
    NotificationsExpired(Vec<NotificationId>),
}

/// Everything a list screen renders, derived from current state.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<'a, T> {
    pub items: Vec<&'a T>,
    pub meta: PageMeta,
    pub window: Vec<PageItem>,
    pub search_text: &'a str,
    pub sort: &'a SortState,
    pub status: ResourceStatus,
    pub loading: bool,
    pub mutating: bool,
    pub error: Option<&'a FetchError>,
    pub notifications: &'a [Notification],
}

/// State container behind one list screen: search, sort and page over a
/// remotely loaded collection.
///
/// Input arrives through [`ListState::dispatch`] and the completion methods;
/// each returns the events it caused. [`ListState::view`] recomputes the
/// visible page from scratch on every call.
#[derive(Debug, Clone)]
pub struct ListState<T, A> {
    config: ListConfig,
    access: A,
    query: QueryState,
    debouncer: Debouncer,
    rows: Resource<Vec<T>>,
    mutations: BTreeMap<RequestId, MutationInFlight>,
    mutation_counter: u64,
    notifications: NotificationStore,
    disposed: bool,
}

impl<T, A: FieldAccess<T>> ListState<T, A> {
    pub fn new(config: ListConfig, access: A) -> Self {
        let query = QueryState::with_page_size(config.page_size);
        let debouncer = Debouncer::new(config.debounce);
        Self {
            config,
            access,
            query,
            debouncer,
            rows: Resource::new(),
            mutations: BTreeMap::new(),
            mutation_counter: 0,
            notifications: NotificationStore::new(),
            disposed: false,
        }
    }

    pub fn dispatch(&mut self, command: ListCommand, now: Instant) -> Vec<ListEvent> {
        if self.disposed {
            return Vec::new();
        }
        match command {
            ListCommand::SearchInput(text) => {
                self.debouncer.on_change(&text, now);
                self.debouncer
                    .next_deadline()
                    .map(|deadline| ListEvent::SearchScheduled { deadline })
                    .into_iter()
                    .collect()
            }
            ListCommand::ClearSearch => {
                let text = self.debouncer.clear();
                self.apply_search(&text)
            }
            ListCommand::SortHeaderClick(column) => {
                if !self.config.is_sortable(&column) {
                    return vec![ListEvent::SortUnavailable(column)];
                }
                let sort = self.query.toggle_sort(&column).clone();
                vec![ListEvent::SortChanged(sort)]
            }
            ListCommand::PageClick(page) => {
                let total = total_pages(self.filtered_len(), self.query.page_size);
                match go_to_page(self.query.page, page, total) {
                    Some(page) => {
                        self.query.page = page;
                        vec![ListEvent::PageChanged(page)]
                    }
                    None => Vec::new(),
                }
            }
            ListCommand::SetPageSize(page_size) => {
                self.query.set_page_size(page_size);
                vec![ListEvent::PageSizeChanged(self.query.page_size)]
            }
            ListCommand::Reload => vec![ListEvent::FetchRequested(self.rows.begin())],
            ListCommand::DismissNotification(id) => {
                self.notifications.dismiss(id);
                Vec::new()
            }
        }
    }

    /// Fires due deadlines: the debounced search and toast expiry.
    pub fn tick(&mut self, now: Instant) -> Vec<ListEvent> {
        if self.disposed {
            return Vec::new();
        }
        let mut events = match self.debouncer.poll(now) {
            Some(text) => self.apply_search(&text),
            None => Vec::new(),
        };
        events.extend(self.prune_notifications(now));
        events
    }

    pub fn apply_fetch(
        &mut self,
        request_id: RequestId,
        result: Result<Vec<T>, FetchError>,
        now: Instant,
    ) -> Vec<ListEvent> {
        let failure = result.as_ref().err().cloned();
        if self.rows.complete(request_id, result) == Completion::Stale {
            return vec![ListEvent::StaleDropped(request_id)];
        }

        match failure {
            None => {
                let mut events = vec![ListEvent::FetchApplied(request_id)];
                let filtered = self.filtered_len();
                if self.query.clamp(filtered) {
                    events.push(ListEvent::PageChanged(self.query.page));
                }
                events
            }
            Some(error) => {
                let notice = self.notifications.show_fetch_error(&error, now);
                vec![
                    ListEvent::FetchFailed { request_id, error },
                    ListEvent::Notified(notice),
                ]
            }
        }
    }

    /// Registers a create/update/delete about to be sent. The list is not
    /// refreshed when it completes; callers reload explicitly.
    pub fn begin_mutation(
        &mut self,
        kind: MutationKind,
        record: Option<RecordId>,
    ) -> Option<RequestId> {
        if self.disposed {
            return None;
        }
        let request_id = RequestId::bump(&mut self.mutation_counter);
        self.mutations
            .insert(request_id, MutationInFlight { kind, record });
        Some(request_id)
    }

    pub fn apply_mutation(
        &mut self,
        request_id: RequestId,
        result: Result<(), FetchError>,
        now: Instant,
    ) -> Vec<ListEvent> {
        if self.disposed {
            return vec![ListEvent::StaleDropped(request_id)];
        }
        let Some(MutationInFlight { kind, .. }) = self.mutations.remove(&request_id) else {
            return vec![ListEvent::StaleDropped(request_id)];
        };

        match result {
            Ok(()) => {
                let message = format!("{} {}", self.config.entity, kind.past_tense());
                let notice = self.notifications.success(message, now);
                vec![
                    ListEvent::MutationSucceeded { request_id, kind },
                    ListEvent::Notified(notice),
                ]
            }
            Err(error) => {
                let notice = self.notifications.show_fetch_error(&error, now);
                vec![
                    ListEvent::MutationFailed {
                        request_id,
                        kind,
                        error,
                    },
                    ListEvent::Notified(notice),
                ]
            }
        }
    }

    /// Describes a mutation that has been registered but not completed.
    pub fn mutation_started(&self, request_id: RequestId) -> Option<ListEvent> {
        self.mutations
            .get(&request_id)
            .map(|pending| ListEvent::MutationStarted {
                request_id,
                kind: pending.kind,
                record: pending.record,
            })
    }

    pub fn prune_notifications(&mut self, now: Instant) -> Vec<ListEvent> {
        let expired = self.notifications.prune(now);
        if expired.is_empty() {
            Vec::new()
        } else {
            vec![ListEvent::NotificationsExpired(expired)]
        }
    }

    /// Earliest instant at which [`ListState::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debouncer.next_deadline(), self.notifications.next_expiry()) {
            (Some(left), Some(right)) => Some(left.min(right)),
            (left, right) => left.or(right),
        }
    }

    pub fn view(&self) -> ListView<'_, T> {
        let sorted = self.visible_rows();
        let page = clamp_page(self.query.page, sorted.len(), self.query.page_size);
        let Page { items, meta } = paginate(&sorted, page, self.query.page_size);
        let window = meta.window();
        ListView {
            items,
            meta,
            window,
            search_text: &self.query.search_text,
            sort: &self.query.sort,
            status: self.rows.status(),
            loading: self.rows.is_loading(),
            mutating: !self.mutations.is_empty(),
            error: self.rows.error(),
            notifications: self.notifications.items(),
        }
    }

    /// Cancels pending search and abandons every in-flight request.
    pub fn dispose(&mut self) {
        self.debouncer.dispose();
        self.rows.dispose();
        self.mutations.clear();
        self.disposed = true;
    }

    /// True while a typed search is waiting out the debounce window.
    pub fn search_pending(&self) -> bool {
        self.debouncer.has_pending()
    }

    pub fn mutations_pending(&self) -> usize {
        self.mutations.len()
    }

    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub const fn query(&self) -> &QueryState {
        &self.query
    }

    pub const fn config(&self) -> &ListConfig {
        &self.config
    }

    pub const fn access(&self) -> &A {
        &self.access
    }

    pub const fn rows(&self) -> &Resource<Vec<T>> {
        &self.rows
    }

    pub const fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    fn apply_search(&mut self, text: &str) -> Vec<ListEvent> {
        if self.query.set_search(text) {
            vec![ListEvent::SearchApplied(text.to_owned())]
        } else {
            Vec::new()
        }
    }

    fn visible_rows(&self) -> Vec<&T> {
        sort_rows(self.filtered(), &self.query.sort, &self.access)
    }

    fn filtered(&self) -> Vec<&T> {
        let rows = self.rows.value().map(Vec::as_slice).unwrap_or(&[]);
        let fields = self
            .config
            .search_fields
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>();
        filter_rows(rows, &self.query.search_text, &fields, &self.access)
    }

    fn filtered_len(&self) -> usize {
        self.filtered().len()
    }
}

#[cfg(test)]
mod tests {
    use super::{ListCommand, ListConfig, ListEvent, ListState, MutationKind};
    use crate::error::FetchError;
    use crate::ids::RecordId;
    use crate::notify::NotificationKind;
    use crate::paginate::PageItem;
    use crate::query::{SortDirection, SortState};
    use crate::resource::ResourceStatus;
    use crate::value::{Accessors, Row, RowFields, Value};
    use std::time::{Duration, Instant};

    fn users() -> Vec<Row> {
        [
            (1, "John Doe", "john.doe@example.com"),
            (2, "Jane Smith", "jane.smith@example.com"),
            (3, "Bob Johnson", "bob.johnson@example.com"),
        ]
        .into_iter()
        .map(|(id, name, email)| {
            Row::new()
                .with("id", id as i64)
                .with("name", name)
                .with("email", email)
        })
        .collect()
    }

    fn user_list() -> ListState<Row, RowFields> {
        let config = ListConfig::new("User")
            .search_fields(&["name", "email"])
            .sortable(&["name", "email"])
            .page_size(10);
        ListState::new(config, RowFields)
    }

    fn loaded(rows: Vec<Row>, now: Instant) -> ListState<Row, RowFields> {
        load_into(user_list(), rows, now)
    }

    fn load_into(
        mut state: ListState<Row, RowFields>,
        rows: Vec<Row>,
        now: Instant,
    ) -> ListState<Row, RowFields> {
        let events = state.dispatch(ListCommand::Reload, now);
        let [ListEvent::FetchRequested(request_id)] = events[..] else {
            panic!("expected a fetch request, got {events:?}");
        };
        state.apply_fetch(request_id, Ok(rows), now);
        state
    }

    fn ids(state: &ListState<Row, RowFields>) -> Vec<u64> {
        state
            .view()
            .items
            .iter()
            .filter_map(|row| row.id())
            .map(RecordId::get)
            .collect()
    }

    #[test]
    fn idle_view_is_empty() {
        let state = user_list();
        let view = state.view();
        assert!(view.items.is_empty());
        assert_eq!(view.status, ResourceStatus::Idle);
        assert_eq!(view.meta.total_pages, 1);
        assert_eq!(view.meta.range_label, "0 of 0");
        assert_eq!(view.window, vec![PageItem::Page(1)]);
    }

    #[test]
    fn debounced_search_for_john_keeps_only_john_doe() {
        let start = Instant::now();
        let mut state = loaded(users(), start);

        for (offset, text) in [(0, "j"), (50, "jo"), (100, "joh"), (150, "john")] {
            let events = state.dispatch(
                ListCommand::SearchInput(text.to_owned()),
                start + Duration::from_millis(offset),
            );
            assert!(matches!(events[..], [ListEvent::SearchScheduled { .. }]));
        }
        assert!(state.tick(start + Duration::from_millis(300)).is_empty());
        assert_eq!(ids(&state), vec![1, 2, 3]);

        let events = state.tick(start + Duration::from_millis(450));
        assert_eq!(events, vec![ListEvent::SearchApplied("john".to_owned())]);
        // "Bob Johnson" contains "john" too.
        assert_eq!(ids(&state), vec![1, 3]);
    }

    #[test]
    fn clear_search_applies_immediately() {
        let start = Instant::now();
        let mut state = loaded(users(), start);
        state.dispatch(ListCommand::SearchInput("jane".to_owned()), start);
        state.tick(start + Duration::from_millis(300));
        assert_eq!(ids(&state), vec![2]);

        state.dispatch(ListCommand::SearchInput("bob".to_owned()), start + Duration::from_secs(1));
        let events = state.dispatch(ListCommand::ClearSearch, start + Duration::from_secs(1));
        assert_eq!(events, vec![ListEvent::SearchApplied(String::new())]);
        assert_eq!(ids(&state), vec![1, 2, 3]);
        assert!(state.tick(start + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn price_header_cycles_back_to_original_order() {
        let start = Instant::now();
        let rows = vec![
            Row::new().with("id", 1_i64).with("price", 30_i64),
            Row::new().with("id", 2_i64).with("price", 10_i64),
            Row::new().with("id", 3_i64).with("price", 20_i64),
        ];
        let config = ListConfig::new("Product").sortable(&["name", "price"]);
        let mut state = load_into(ListState::new(config, RowFields), rows, start);

        let events = state.dispatch(ListCommand::SortHeaderClick("price".to_owned()), start);
        assert_eq!(
            events,
            vec![ListEvent::SortChanged(SortState::by("price", SortDirection::Asc))]
        );
        assert_eq!(ids(&state), vec![2, 3, 1]);

        state.dispatch(ListCommand::SortHeaderClick("price".to_owned()), start);
        assert_eq!(ids(&state), vec![1, 3, 2]);

        let events = state.dispatch(ListCommand::SortHeaderClick("price".to_owned()), start);
        assert_eq!(events, vec![ListEvent::SortChanged(SortState::Unsorted)]);
        assert_eq!(ids(&state), vec![1, 2, 3]);
    }

    #[test]
    fn unknown_sort_column_is_reported() {
        let start = Instant::now();
        let mut state = loaded(users(), start);
        let events = state.dispatch(ListCommand::SortHeaderClick("salary".to_owned()), start);
        assert_eq!(events, vec![ListEvent::SortUnavailable("salary".to_owned())]);
        assert_eq!(state.query().sort, SortState::Unsorted);
    }

    #[test]
    fn paging_through_twenty_three_rows() {
        let start = Instant::now();
        let rows = (1..=23)
            .map(|id| Row::new().with("id", id as i64).with("name", format!("user {id}")))
            .collect();
        let mut state = loaded(rows, start);

        assert_eq!(
            state.dispatch(ListCommand::PageClick(2), start),
            vec![ListEvent::PageChanged(2)]
        );
        assert_eq!(state.view().meta.range_label, "11–20");

        assert!(state.dispatch(ListCommand::PageClick(2), start).is_empty());
        assert!(state.dispatch(ListCommand::PageClick(4), start).is_empty());

        state.dispatch(ListCommand::PageClick(3), start);
        let view = state.view();
        assert_eq!(view.items.len(), 3);
        assert!(view.meta.has_prev());
        assert!(!view.meta.has_next());
    }

    #[test]
    fn search_and_sort_reset_page() {
        let start = Instant::now();
        let rows = (1..=23)
            .map(|id| Row::new().with("id", id as i64).with("name", format!("user {id}")))
            .collect();
        let mut state = loaded(rows, start);

        state.dispatch(ListCommand::PageClick(3), start);
        state.dispatch(ListCommand::SortHeaderClick("name".to_owned()), start);
        assert_eq!(state.query().page, 1);

        state.dispatch(ListCommand::PageClick(2), start);
        state.dispatch(ListCommand::SearchInput("user 1".to_owned()), start);
        state.tick(start + Duration::from_millis(300));
        assert_eq!(state.query().page, 1);
    }

    #[test]
    fn shrinking_data_clamps_page() {
        let start = Instant::now();
        let rows = (1..=23).map(|id| Row::new().with("id", id as i64)).collect();
        let mut state = loaded(rows, start);
        state.dispatch(ListCommand::PageClick(3), start);

        let events = state.dispatch(ListCommand::Reload, start);
        let [ListEvent::FetchRequested(request_id)] = events[..] else {
            panic!("expected a fetch request, got {events:?}");
        };
        let fewer = (1..=5).map(|id| Row::new().with("id", id as i64)).collect();
        let events = state.apply_fetch(request_id, Ok(fewer), start);
        assert_eq!(
            events,
            vec![ListEvent::FetchApplied(request_id), ListEvent::PageChanged(1)]
        );
        assert_eq!(state.view().items.len(), 5);
    }

    #[test]
    fn view_is_idempotent() {
        let start = Instant::now();
        let mut state = loaded(users(), start);
        state.dispatch(ListCommand::SortHeaderClick("name".to_owned()), start);
        assert_eq!(state.view(), state.view());
    }

    #[test]
    fn only_latest_reload_is_applied() {
        let start = Instant::now();
        let mut state = user_list();
        let first = match state.dispatch(ListCommand::Reload, start)[..] {
            [ListEvent::FetchRequested(id)] => id,
            _ => panic!("expected fetch request"),
        };
        let second = match state.dispatch(ListCommand::Reload, start)[..] {
            [ListEvent::FetchRequested(id)] => id,
            _ => panic!("expected fetch request"),
        };

        let latest = vec![Row::new().with("id", 2_i64).with("name", "B")];
        state.apply_fetch(second, Ok(latest), start);
        let events = state.apply_fetch(first, Ok(vec![Row::new().with("id", 1_i64)]), start);
        assert_eq!(events, vec![ListEvent::StaleDropped(first)]);
        assert_eq!(ids(&state), vec![2]);
    }

    #[test]
    fn failed_fetch_raises_one_error_toast_and_keeps_rows() {
        let start = Instant::now();
        let mut state = loaded(users(), start);
        let request_id = match state.dispatch(ListCommand::Reload, start)[..] {
            [ListEvent::FetchRequested(id)] => id,
            _ => panic!("expected fetch request"),
        };
        assert!(state.view().loading);

        let error = FetchError::from_status(500, "Internal server error", false);
        let events = state.apply_fetch(request_id, Err(error.clone()), start);
        assert!(matches!(events[0], ListEvent::FetchFailed { .. }));

        let view = state.view();
        assert_eq!(view.status, ResourceStatus::Error);
        assert_eq!(view.error, Some(&error));
        assert_eq!(view.items.len(), 3);
        assert_eq!(view.notifications.len(), 1);
        assert_eq!(view.notifications[0].kind, NotificationKind::Error);
        assert_eq!(
            view.notifications[0].message,
            "Server error. Please try again later."
        );

        state.dispatch(ListCommand::Reload, start);
        let view = state.view();
        assert!(view.loading);
        assert_eq!(view.error, None);
        assert_eq!(view.items.len(), 3);
    }

    #[test]
    fn mutation_success_notifies_without_reloading() {
        let start = Instant::now();
        let mut state = loaded(users(), start);
        let Some(request_id) = state.begin_mutation(MutationKind::Delete, Some(RecordId::new(2)))
        else {
            panic!("mutation should start");
        };
        assert!(state.view().mutating);
        assert!(matches!(
            state.mutation_started(request_id),
            Some(ListEvent::MutationStarted {
                kind: MutationKind::Delete,
                ..
            })
        ));

        let events = state.apply_mutation(request_id, Ok(()), start);
        assert!(matches!(events[0], ListEvent::MutationSucceeded { .. }));
        assert_eq!(state.view().notifications[0].message, "User deleted");
        assert_eq!(ids(&state), vec![1, 2, 3]);
        assert!(!state.view().mutating);

        let again = state.apply_mutation(request_id, Ok(()), start);
        assert_eq!(again, vec![ListEvent::StaleDropped(request_id)]);
    }

    #[test]
    fn mutation_failure_maps_status_to_message() {
        let start = Instant::now();
        let mut state = loaded(users(), start);
        let Some(request_id) = state.begin_mutation(MutationKind::Update, Some(RecordId::new(9)))
        else {
            panic!("mutation should start");
        };
        let events = state.apply_mutation(
            request_id,
            Err(FetchError::NotFound("/users/9".to_owned())),
            start,
        );
        assert!(matches!(events[0], ListEvent::MutationFailed { .. }));
        assert_eq!(state.view().notifications[0].message, "Resource not found.");
    }

    #[test]
    fn toasts_expire_on_tick() {
        let start = Instant::now();
        let mut state = loaded(users(), start);
        let Some(request_id) = state.begin_mutation(MutationKind::Create, None) else {
            panic!("mutation should start");
        };
        state.apply_mutation(request_id, Ok(()), start);
        assert_eq!(state.next_deadline(), Some(start + Duration::from_secs(4)));

        let events = state.tick(start + Duration::from_secs(4));
        assert!(matches!(events[..], [ListEvent::NotificationsExpired(_)]));
        assert!(state.view().notifications.is_empty());
    }

    #[test]
    fn dispose_ignores_everything_afterwards() {
        let start = Instant::now();
        let mut state = user_list();
        let request_id = match state.dispatch(ListCommand::Reload, start)[..] {
            [ListEvent::FetchRequested(id)] => id,
            _ => panic!("expected fetch request"),
        };
        state.dispatch(ListCommand::SearchInput("john".to_owned()), start);
        state.dispose();

        assert!(state.dispatch(ListCommand::Reload, start).is_empty());
        assert!(state.tick(start + Duration::from_secs(1)).is_empty());
        assert_eq!(
            state.apply_fetch(request_id, Ok(users()), start),
            vec![ListEvent::StaleDropped(request_id)]
        );
        assert!(state.begin_mutation(MutationKind::Create, None).is_none());
        assert!(state.view().items.is_empty());
        assert_eq!(state.query().search_text, "");
    }

    #[test]
    fn typed_rows_use_accessors() {
        #[derive(Debug, PartialEq)]
        struct Trip {
            driver: &'static str,
            fare: f64,
        }

        let access = Accessors::<Trip>::new()
            .field("driver", |trip| Value::from(trip.driver))
            .field("fare", |trip| Value::from(trip.fare));
        let config = ListConfig::new("Trip")
            .search_fields(&["driver"])
            .sortable(&["driver", "fare"]);
        let mut state = ListState::new(config, access);
        let start = Instant::now();
        let request_id = match state.dispatch(ListCommand::Reload, start)[..] {
            [ListEvent::FetchRequested(id)] => id,
            _ => panic!("expected fetch request"),
        };
        state.apply_fetch(
            request_id,
            Ok(vec![
                Trip {
                    driver: "Alice Johnson",
                    fare: 18.5,
                },
                Trip {
                    driver: "Bob Smith",
                    fare: 7.25,
                },
            ]),
            start,
        );

        state.dispatch(ListCommand::SortHeaderClick("fare".to_owned()), start);
        let drivers = state
            .view()
            .items
            .iter()
            .map(|trip| trip.driver)
            .collect::<Vec<_>>();
        assert_eq!(drivers, vec!["Bob Smith", "Alice Johnson"]);
    }
}
