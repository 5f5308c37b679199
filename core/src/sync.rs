//! Orchestration of remote operations and their effect on local state.
//!
//! # Design
//! Each operation is an independent request/response cycle. The controller
//! issues the remote call, awaits it, then applies one state transition to
//! `SyncState` in a single synchronous step. The state lives in a `RefCell`
//! and no borrow is ever held across an `.await`, so any number of
//! operations can be in flight on one task (or a `LocalSet`) and their
//! completions land in whatever order the network delivers them, each one
//! applied atomically.
//!
//! Failures never escape: they are logged and recorded in the shared error
//! slot, which keeps the most recent one until a newer failure replaces it.
//! Done-state changes are confirmed by re-fetching the item rather than by
//! trusting the value that was sent.

use std::cell::RefCell;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::remote::RemoteItemService;
use crate::store::ItemStore;
use crate::types::{Item, ItemId, ItemPatch};

/// Everything the presentation layer renders: the store plus transient
/// flags. Only `SyncController` writes to it.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    store: ItemStore,
    loads_in_flight: usize,
    inserts_in_flight: usize,
    last_error: Option<TransportError>,
}

impl SyncState {
    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    /// True while a full-collection fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loads_in_flight > 0
    }

    /// True while at least one create is outstanding.
    pub fn is_inserting(&self) -> bool {
        self.inserts_in_flight > 0
    }

    /// The most recent failure. Successes do not clear it.
    pub fn last_error(&self) -> Option<&TransportError> {
        self.last_error.as_ref()
    }

    fn record_error(&mut self, operation: &'static str, err: TransportError) {
        warn!(operation, error = %err, "remote call failed");
        self.last_error = Some(err);
    }

    fn in_flight(&mut self, flight: Flight) -> &mut usize {
        match flight {
            Flight::Load => &mut self.loads_in_flight,
            Flight::Insert => &mut self.inserts_in_flight,
        }
    }
}

/// State cell plus the revision channel announcing each change.
struct Shared {
    state: RefCell<SyncState>,
    revision: watch::Sender<u64>,
}

impl Shared {
    /// The borrow is confined to this call; nothing else in the crate
    /// borrows `state`, so it cannot be contended.
    fn apply<R>(&self, transition: impl FnOnce(&mut SyncState) -> R) -> R {
        let result = transition(&mut self.state.borrow_mut());
        self.revision.send_modify(|rev| *rev += 1);
        result
    }
}

#[derive(Debug, Clone, Copy)]
enum Flight {
    Load,
    Insert,
}

/// Holds one unit of a transient in-flight counter. The unit is released
/// either together with the completion transition (`settle`) or, if the
/// operation's future is dropped first, on drop.
struct InFlight<'a> {
    shared: &'a Shared,
    flight: Flight,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn start(shared: &'a Shared, flight: Flight) -> Self {
        shared.apply(|state| *state.in_flight(flight) += 1);
        Self {
            shared,
            flight,
            settled: false,
        }
    }

    fn settle<R>(mut self, transition: impl FnOnce(&mut SyncState) -> R) -> R {
        self.settled = true;
        let flight = self.flight;
        self.shared.apply(|state| {
            *state.in_flight(flight) -= 1;
            transition(state)
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        debug!(flight = ?self.flight, "operation dropped before completion");
        let flight = self.flight;
        self.shared.apply(|state| *state.in_flight(flight) -= 1);
    }
}

pub struct SyncController<S> {
    service: S,
    shared: Shared,
}

impl<S: RemoteItemService> SyncController<S> {
    pub fn new(service: S) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            service,
            shared: Shared {
                state: RefCell::new(SyncState::default()),
                revision,
            },
        }
    }

    /// Snapshot of the current state. Later transitions do not affect it.
    pub fn state(&self) -> SyncState {
        self.shared.state.borrow().clone()
    }

    /// Receives a new revision number after every applied state transition.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    fn apply<R>(&self, transition: impl FnOnce(&mut SyncState) -> R) -> R {
        self.shared.apply(transition)
    }

    /// Fetch the whole collection and replace the store with it.
    pub async fn load(&self) {
        let flight = InFlight::start(&self.shared, Flight::Load);
        let result = self.service.list_all().await;
        flight.settle(|state| match result {
            Ok(items) => {
                debug!(count = items.len(), "collection loaded");
                state.store.replace_all(items);
            }
            Err(err) => state.record_error("load", err),
        });
    }

    pub async fn refresh(&self) {
        self.load().await;
    }

    /// Create an item and prepend it once the server has assigned an id.
    ///
    /// The prepended item is built locally: `done` is false and
    /// `created_at` stays unknown until the next load. Blank descriptions
    /// are ignored without contacting the server.
    pub async fn add(&self, description: &str) -> Option<ItemId> {
        if description.trim().is_empty() {
            debug!("ignoring blank description");
            return None;
        }

        let flight = InFlight::start(&self.shared, Flight::Insert);
        let result = self.service.create(description).await;
        flight.settle(|state| match result {
            Ok(id) => {
                debug!(%id, "item created");
                state.store.prepend(Item::created(id.clone(), description));
                Some(id)
            }
            Err(err) => {
                state.record_error("add", err);
                None
            }
        })
    }

    /// Ask the server to flip `done`, then reconcile the item with what the
    /// server reports. The store is untouched unless both calls succeed.
    pub async fn toggle_done(&self, id: &ItemId, description: &str, current_done: bool) {
        if let Err(err) = self.service.update(id, description, !current_done).await {
            self.apply(|state| state.record_error("toggle_done", err));
            return;
        }

        let result = self.service.fetch_one(id).await;
        self.apply(|state| match result {
            Ok(snapshot) => {
                debug!(%id, done = snapshot.done, "item reconciled");
                state.store.patch(id, ItemPatch::from(snapshot));
            }
            Err(err) => state.record_error("toggle_done", err),
        });
    }

    /// Delete remotely; the item and its star go only after the server
    /// confirms.
    pub async fn delete(&self, id: &ItemId) {
        let result = self.service.delete(id).await;
        self.apply(|state| match result {
            Ok(()) => {
                debug!(%id, "item deleted");
                state.store.remove(id);
            }
            Err(err) => state.record_error("delete", err),
        });
    }

    /// Local only. Returns the new starred state.
    pub fn toggle_star(&self, id: &ItemId) -> bool {
        self.apply(|state| state.store.toggle_star(id))
    }
}
