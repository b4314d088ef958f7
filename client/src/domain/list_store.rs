//! Client-side mirror of a paginated REST resource.
//!
//! The store keeps a keyed map of records plus an ordered view of their ids:
//! created records go to the front, fetched pages are appended. Because the
//! map is the single source of truth, racing fetch, update and remove calls
//! converge instead of duplicating or resurrecting entries.
//!
//! State only changes after a successful response. Dropping an operation's
//! future cancels it without side effects, and responses that resolve after
//! [`ListStore::reset`] or after a [`ViewLease`] is dropped are discarded.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pagination::{PageRequest, Pagination};
use tracing::{debug, warn};

use crate::domain::ports::{RequestError, Resource, ResourceClient};

/// Removed ids remembered to keep stale pages from resurrecting them.
const MAX_TOMBSTONES: usize = 256;

/// Loading state of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// No page has been fetched yet.
    NotLoaded,
    /// A page request is in flight.
    Loading,
    /// At least one page has been applied.
    Loaded,
}

/// Result of [`ListStore::fetch_next_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was merged into the collection.
    Applied {
        /// Records not previously held.
        appended: usize,
        /// Records that replaced an entry with the same id.
        replaced: usize,
    },
    /// Another page request was already in flight; nothing was sent.
    Skipped,
    /// The store was reset or its view released while the request ran.
    Discarded,
}

/// Result of [`ListStore::update`], carrying the canonical record.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome<R> {
    /// The entry was replaced in place.
    Replaced(R),
    /// No entry with that id was held (for example it was removed
    /// concurrently), so the local collection was left alone.
    Dropped(R),
}

impl<R> UpdateOutcome<R> {
    /// The server's canonical record, whichever way the update went.
    pub fn into_record(self) -> R {
        match self {
            Self::Replaced(record) | Self::Dropped(record) => record,
        }
    }
}

struct StoreState<R: Resource> {
    entries: HashMap<R::Id, R>,
    order: VecDeque<R::Id>,
    tombstones: HashSet<R::Id>,
    tombstone_order: VecDeque<R::Id>,
    pagination: Pagination,
    status: LoadStatus,
    generation: u64,
}

impl<R: Resource> Default for StoreState<R> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            tombstones: HashSet::new(),
            tombstone_order: VecDeque::new(),
            pagination: Pagination::default(),
            status: LoadStatus::NotLoaded,
            generation: 0,
        }
    }
}

impl<R: Resource> StoreState<R> {
    fn settled_status(&self) -> LoadStatus {
        if self.pagination.is_initial() {
            LoadStatus::NotLoaded
        } else {
            LoadStatus::Loaded
        }
    }

    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.status == LoadStatus::Loading {
            self.status = self.settled_status();
        }
    }

    fn merge_page(&mut self, records: Vec<R>) -> (usize, usize) {
        let (mut appended, mut replaced) = (0, 0);
        for record in records {
            let id = record.id().clone();
            if self.tombstones.contains(&id) {
                continue;
            }
            if self.entries.insert(id.clone(), record).is_some() {
                replaced += 1;
            } else {
                self.order.push_back(id);
                appended += 1;
            }
        }
        (appended, replaced)
    }

    // Oldest tombstones are evicted first once the cap is reached.
    fn bury(&mut self, id: R::Id) {
        if !self.tombstones.insert(id.clone()) {
            return;
        }
        self.tombstone_order.push_back(id);
        while self.tombstone_order.len() > MAX_TOMBSTONES {
            if let Some(oldest) = self.tombstone_order.pop_front() {
                self.tombstones.remove(&oldest);
            }
        }
    }

    fn unbury(&mut self, id: &R::Id) {
        if self.tombstones.remove(id) {
            self.tombstone_order.retain(|buried| buried != id);
        }
    }

    fn clear_tombstones(&mut self) {
        self.tombstones.clear();
        self.tombstone_order.clear();
    }

    fn prepend(&mut self, record: R) {
        let id = record.id().clone();
        self.unbury(&id);
        if self.entries.insert(id.clone(), record).is_some() {
            self.order.retain(|held| held != &id);
        }
        self.order.push_front(id);
    }

    fn ordered(&self) -> impl Iterator<Item = &R> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }
}

fn lock<R: Resource>(state: &Mutex<StoreState<R>>) -> MutexGuard<'_, StoreState<R>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Restores the pre-request status if a page request fails or is dropped.
struct LoadingGuard<'a, R: Resource> {
    state: &'a Mutex<StoreState<R>>,
    generation: u64,
    armed: bool,
}

impl<R: Resource> LoadingGuard<'_, R> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<R: Resource> Drop for LoadingGuard<'_, R> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = lock(self.state);
        if state.generation == self.generation && state.status == LoadStatus::Loading {
            state.status = state.settled_status();
        }
    }
}

/// Ordered, paginated view over one resource.
pub struct ListStore<R: Resource, C> {
    client: Arc<C>,
    page_size: u32,
    state: Arc<Mutex<StoreState<R>>>,
}

impl<R, C> ListStore<R, C>
where
    R: Resource,
    C: ResourceClient<R>,
{
    /// Create an empty store requesting `page_size` records per page.
    pub fn new(client: Arc<C>, page_size: u32) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
            state: Arc::new(Mutex::new(StoreState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState<R>> {
        lock(&self.state)
    }

    /// Fetch the page after the last one applied and append its records.
    ///
    /// Records already held are replaced in place; records removed locally
    /// stay removed. Pagination is overwritten with the server's values.
    /// The request is issued even at the last page, trusting the server to
    /// answer with an empty slice; such a slice leaves the cursor on the last
    /// page. Once the last page is applied no removed record can come back,
    /// so the tombstones are cleared.
    pub async fn fetch_next_page(&self) -> Result<FetchOutcome, RequestError> {
        let (request, generation) = {
            let mut state = self.state();
            if state.status == LoadStatus::Loading {
                debug!("page request already in flight; skipping");
                return Ok(FetchOutcome::Skipped);
            }
            state.status = LoadStatus::Loading;
            (
                PageRequest::new(self.page_size, state.pagination.next_page()),
                state.generation,
            )
        };
        let mut guard = LoadingGuard {
            state: &self.state,
            generation,
            armed: true,
        };

        let page = match self.client.list(request).await {
            Ok(page) => page,
            Err(error) => {
                warn!(kind = error.kind(), %error, page = request.page(), "page request failed");
                return Err(error);
            }
        };
        guard.disarm();

        let mut state = self.state();
        if state.generation != generation {
            debug!(page = request.page(), "discarding page for a released view");
            return Ok(FetchOutcome::Discarded);
        }
        let (mut pagination, records) = page.into_parts();
        if records.is_empty() && pagination.total_pages > 0 {
            pagination.current_page = pagination.current_page.min(pagination.total_pages);
        }
        let (appended, replaced) = state.merge_page(records);
        if pagination.reached_end() {
            state.clear_tombstones();
        }
        state.pagination = pagination;
        state.status = LoadStatus::Loaded;
        debug!(
            page = pagination.current_page,
            total_pages = pagination.total_pages,
            appended,
            replaced,
            "page applied"
        );
        Ok(FetchOutcome::Applied { appended, replaced })
    }

    /// Create a record and show the canonical version first.
    ///
    /// `total_records` is left as last reported by the server.
    pub async fn create(&self, draft: &R::Draft) -> Result<R, RequestError> {
        let generation = self.state().generation;
        let record = self.client.create(draft).await?;
        let mut state = self.state();
        if state.generation == generation {
            state.prepend(record.clone());
        } else {
            debug!(id = %record.id(), "created record not shown; view released");
        }
        Ok(record)
    }

    /// Replace a record, keeping its position.
    pub async fn update(
        &self,
        id: &R::Id,
        draft: &R::Draft,
    ) -> Result<UpdateOutcome<R>, RequestError> {
        let generation = self.state().generation;
        let record = self.client.update(id, draft).await?;
        let mut state = self.state();
        if state.generation != generation {
            return Ok(UpdateOutcome::Dropped(record));
        }
        match state.entries.get_mut(record.id()) {
            Some(held) => {
                *held = record.clone();
                Ok(UpdateOutcome::Replaced(record))
            }
            None => {
                debug!(id = %record.id(), "updated record no longer held; dropping");
                Ok(UpdateOutcome::Dropped(record))
            }
        }
    }

    /// Delete a record. Returns whether a local entry was removed.
    pub async fn remove(&self, id: &R::Id) -> Result<bool, RequestError> {
        let generation = self.state().generation;
        self.client.remove(id).await?;
        let mut state = self.state();
        if state.generation != generation {
            return Ok(false);
        }
        state.bury(id.clone());
        let removed = state.entries.remove(id).is_some();
        if removed {
            state.order.retain(|held| held != id);
        }
        Ok(removed)
    }

    /// Forget everything and discard responses still in flight.
    pub fn reset(&self) {
        let mut state = self.state();
        state.invalidate();
        let generation = state.generation;
        *state = StoreState {
            generation,
            ..StoreState::default()
        };
    }

    /// Tie in-flight responses to the lifetime of a consuming view.
    ///
    /// Dropping the lease discards every response that has not resolved
    /// yet. Records already applied are kept. Hold one lease per view.
    pub fn lease(&self) -> ViewLease<R> {
        ViewLease {
            state: Arc::clone(&self.state),
        }
    }

    /// Snapshot of the records in display order.
    pub fn records(&self) -> Vec<R> {
        self.state().ordered().cloned().collect()
    }

    /// First record in display order.
    pub fn first(&self) -> Option<R> {
        self.state().ordered().next().cloned()
    }

    /// Record held under `id`.
    pub fn get(&self, id: &R::Id) -> Option<R> {
        self.state().entries.get(id).cloned()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    /// Return whether no record is held, whatever the load status.
    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }

    /// Pagination as last reported by the server.
    pub fn pagination(&self) -> Pagination {
        self.state().pagination
    }

    /// `current_page >= total_pages`; true before the first fetch.
    pub fn reached_end(&self) -> bool {
        self.state().pagination.reached_end()
    }

    /// Current load status.
    pub fn status(&self) -> LoadStatus {
        self.state().status
    }
}

/// Keeps in-flight store responses relevant while alive.
pub struct ViewLease<R: Resource> {
    state: Arc<Mutex<StoreState<R>>>,
}

impl<R: Resource> Drop for ViewLease<R> {
    fn drop(&mut self) {
        lock(&self.state).invalidate();
    }
}

#[cfg(test)]
#[path = "list_store_tests.rs"]
mod tests;
