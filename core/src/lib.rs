//! Client-side state reconciliation for a remote task list.
//!
//! # Overview
//! Keeps an in-memory view of a remote item collection in step with a CRUD
//! service over HTTP. `SyncController` issues operations through a
//! `RemoteItemService`, then folds each confirmed result into `ItemStore`
//! together with the transient loading/inserting/error flags.
//!
//! # Design
//! - `ItemClient` is sans-IO: `build_*` produces an `HttpRequest`, `parse_*`
//!   consumes an `HttpResponse`. A `Transport` (reqwest by default) does the
//!   round-trip in between.
//! - The controller never lets a `TransportError` escape. Failures land in
//!   a single error slot and leave the store as it was.
//! - State is single-threaded: operations may overlap on one task, and each
//!   completion is applied atomically in arrival order.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod remote;
pub mod store;
pub mod sync;
pub mod transport;
pub mod types;

pub use client::ItemClient;
pub use config::ClientConfig;
pub use error::{ConfigError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use remote::{HttpItemService, RemoteItemService};
pub use store::ItemStore;
pub use sync::{SyncController, SyncState};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Item, ItemId, ItemPatch, ItemSnapshot, ItemUpdate, NewItem};
