//! Test utilities for the client crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use mockable::Clock;
use pagination::{Page, PageRequest, Pagination};
use tokio::sync::Notify;

use crate::domain::ports::{RequestError, Resource, ResourceClient};

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Build a page, panicking on envelope violations.
pub fn page_of<R>(current_page: u32, page_size: u32, total_records: u64, records: Vec<R>) -> Page<R> {
    let total_pages = total_records.div_ceil(u64::from(page_size.max(1)));
    let pagination = Pagination {
        current_page,
        page_size,
        total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        total_records,
    };
    match Page::try_new(pagination, records) {
        Ok(page) => page,
        Err(error) => panic!("fixture page is invalid: {error}"),
    }
}

type Script<T> = Mutex<VecDeque<Result<T, RequestError>>>;

fn next<T>(script: &Script<T>, operation: &str) -> Result<T, RequestError> {
    match script
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
    {
        Some(result) => result,
        None => panic!("no scripted response left for {operation}"),
    }
}

fn push<T>(script: &Script<T>, result: Result<T, RequestError>) {
    script
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push_back(result);
}

/// In-memory [`ResourceClient`] answering from per-operation scripts.
///
/// Each call pops the next scripted result and panics when none is left.
/// `hold_responses` makes `list`, `create`, `update` and `remove` wait for
/// `release_response` before answering, so tests can observe a request in
/// flight.
pub struct ScriptedResourceClient<R: Resource> {
    pages: Script<Page<R>>,
    collections: Script<Vec<R>>,
    records: Script<R>,
    created: Script<R>,
    updated: Script<R>,
    removed: Script<()>,
    page_requests: Mutex<Vec<PageRequest>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl<R: Resource> Default for ScriptedResourceClient<R> {
    fn default() -> Self {
        Self {
            pages: Mutex::default(),
            collections: Mutex::default(),
            records: Mutex::default(),
            created: Mutex::default(),
            updated: Mutex::default(),
            removed: Mutex::default(),
            page_requests: Mutex::default(),
            gate: Mutex::default(),
        }
    }
}

impl<R: Resource> ScriptedResourceClient<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, result: Result<Page<R>, RequestError>) -> &Self {
        push(&self.pages, result);
        self
    }

    pub fn push_collection(&self, result: Result<Vec<R>, RequestError>) -> &Self {
        push(&self.collections, result);
        self
    }

    pub fn push_record(&self, result: Result<R, RequestError>) -> &Self {
        push(&self.records, result);
        self
    }

    pub fn push_created(&self, result: Result<R, RequestError>) -> &Self {
        push(&self.created, result);
        self
    }

    pub fn push_updated(&self, result: Result<R, RequestError>) -> &Self {
        push(&self.updated, result);
        self
    }

    pub fn push_removed(&self, result: Result<(), RequestError>) -> &Self {
        push(&self.removed, result);
        self
    }

    /// Page requests received so far, in order.
    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.page_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make subsequent store-facing calls wait for [`Self::release_response`].
    pub fn hold_responses(&self) {
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(Notify::new()));
    }

    /// Let one held call answer.
    pub fn release_response(&self) {
        if let Some(gate) = self
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            gate.notify_one();
        }
    }

    async fn wait_for_release(&self) {
        let gate = self
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl<R: Resource> ResourceClient<R> for ScriptedResourceClient<R> {
    async fn list(&self, request: PageRequest) -> Result<Page<R>, RequestError> {
        self.page_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.wait_for_release().await;
        next(&self.pages, "list")
    }

    async fn list_all(&self) -> Result<Vec<R>, RequestError> {
        next(&self.collections, "list_all")
    }

    async fn get(&self, _id: &R::Id) -> Result<R, RequestError> {
        next(&self.records, "get")
    }

    async fn create(&self, _draft: &R::Draft) -> Result<R, RequestError> {
        self.wait_for_release().await;
        next(&self.created, "create")
    }

    async fn update(&self, _id: &R::Id, _draft: &R::Draft) -> Result<R, RequestError> {
        self.wait_for_release().await;
        next(&self.updated, "update")
    }

    async fn remove(&self, _id: &R::Id) -> Result<(), RequestError> {
        self.wait_for_release().await;
        next(&self.removed, "remove")
    }
}

/// File token store rooted in a fresh temporary directory.
///
/// Keep the returned [`tempfile::TempDir`] alive for as long as the store is
/// used; dropping it deletes the directory.
pub fn temp_token_store() -> (tempfile::TempDir, crate::outbound::FileTokenStore) {
    let dir = match tempfile::TempDir::new() {
        Ok(dir) => dir,
        Err(error) => panic!("create temp dir: {error}"),
    };
    let store = crate::outbound::FileTokenStore::new(dir.path().join("board-client").join("token"));
    (dir, store)
}
