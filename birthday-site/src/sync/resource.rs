//! Generic resource state shared by the resource hooks
//!
//! A [`Resource`] owns one cached value plus its loading and error flags.
//! Readers subscribe through a `watch` channel; writers go through the
//! resource so every change is published.
//!
//! Loads are ordered by generation: [`Resource::begin_load`] hands out a
//! ticket, and [`Resource::commit`] only succeeds for the newest ticket.
//! Starting another load or calling [`Resource::cancel`] invalidates all
//! earlier tickets, so a slow response can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Snapshot handed to readers
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub data: T,
    pub loading: bool,
    /// Human-readable message from the last failed operation
    pub error: Option<String>,
}

/// What to show when a load fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFallback {
    /// Degraded copy: local cache, device defaults or static data
    Degraded,
    /// Nothing; the error message is the content
    Empty,
}

/// What to do with a mutation the backend rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
    /// Keep the change locally, log it, report success
    ApplyLocally,
    /// Leave state unchanged, set the error flag, return the error
    Surface,
}

/// Per-resource retry/fallback policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    pub on_read_failure: ReadFallback,
    pub on_write_failure: WriteFailure,
}

impl SyncPolicy {
    /// Preferences favour responsiveness over accuracy
    pub const fn optimistic() -> Self {
        Self {
            on_read_failure: ReadFallback::Degraded,
            on_write_failure: WriteFailure::ApplyLocally,
        }
    }

    /// Public content degrades on read, reports failed writes
    pub const fn degraded_reads() -> Self {
        Self {
            on_read_failure: ReadFallback::Degraded,
            on_write_failure: WriteFailure::Surface,
        }
    }

    /// Admin data never shows synthesized records
    pub const fn strict() -> Self {
        Self {
            on_read_failure: ReadFallback::Empty,
            on_write_failure: WriteFailure::Surface,
        }
    }
}

/// Proof that a load was started; only the newest one may commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Result of a load attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The load's result is now visible
    Committed,
    /// A newer load or a cancel came first; the result was discarded
    Superseded,
}

pub struct Resource<T> {
    name: &'static str,
    state: watch::Sender<ResourceState<T>>,
    generation: AtomicU64,
}

impl<T: Clone> Resource<T> {
    pub fn new(name: &'static str, initial: T) -> Self {
        let (state, _) = watch::channel(ResourceState {
            data: initial,
            loading: false,
            error: None,
        });

        Self {
            name,
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn snapshot(&self) -> ResourceState<T> {
        self.state.borrow().clone()
    }

    pub fn data(&self) -> T {
        self.state.borrow().data.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.state.subscribe()
    }

    /// Start a load: mark loading and invalidate older tickets
    pub fn begin_load(&self) -> LoadTicket {
        let mut ticket = LoadTicket(0);
        // Bumped under the channel lock so commits observe it atomically
        self.state.send_modify(|state| {
            ticket = LoadTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
            state.loading = true;
        });
        tracing::debug!("[{}] load #{} started", self.name, ticket.0);
        ticket
    }

    /// Publish a load result if `ticket` is still the newest
    pub fn commit(&self, ticket: LoadTicket, data: T, error: Option<String>) -> LoadOutcome {
        let committed = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != ticket.0 {
                return false;
            }
            state.data = data;
            state.error = error;
            state.loading = false;
            true
        });

        if committed {
            LoadOutcome::Committed
        } else {
            tracing::debug!("[{}] load #{} superseded, result discarded", self.name, ticket.0);
            LoadOutcome::Superseded
        }
    }

    /// Drop every in-flight load (the owner went away or gave up)
    pub fn cancel(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            state.loading = false;
        });
        tracing::debug!("[{}] in-flight loads cancelled", self.name);
    }

    /// Apply a mutation result and clear the error flag
    pub fn update(&self, change: impl FnOnce(&mut T)) {
        self.state.send_modify(|state| {
            change(&mut state.data);
            state.error = None;
        });
    }

    /// Record a failed operation without touching the data
    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("[{}] {}", self.name, message);
        self.state.send_modify(|state| state.error = Some(message));
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }
}
