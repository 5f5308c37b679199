//! The remote collection as the sync layer sees it.
//!
//! # Design
//! `RemoteItemService` is the seam between reconciliation logic and the
//! network. `HttpItemService` implements it by pairing each `ItemClient`
//! build/parse step with a `Transport` round-trip. Nothing here retries.

use std::future::Future;

use tracing::debug;

use crate::client::ItemClient;
use crate::config::ClientConfig;
use crate::error::{ConfigError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Item, ItemId, ItemSnapshot, ItemUpdate};

/// Asynchronous CRUD against one collection resource.
pub trait RemoteItemService {
    fn list_all(&self) -> impl Future<Output = Result<Vec<Item>, TransportError>>;

    /// Returns the identifier the server assigned.
    fn create(&self, description: &str) -> impl Future<Output = Result<ItemId, TransportError>>;

    fn update(
        &self,
        id: &ItemId,
        description: &str,
        done: bool,
    ) -> impl Future<Output = Result<(), TransportError>>;

    fn fetch_one(&self, id: &ItemId) -> impl Future<Output = Result<ItemSnapshot, TransportError>>;

    fn delete(&self, id: &ItemId) -> impl Future<Output = Result<(), TransportError>>;
}

#[derive(Debug, Clone)]
pub struct HttpItemService<T> {
    client: ItemClient,
    transport: T,
}

impl HttpItemService<ReqwestTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(ItemClient::from_config(config), ReqwestTransport::new(config)?))
    }
}

impl<T: Transport> HttpItemService<T> {
    pub fn new(client: ItemClient, transport: T) -> Self {
        Self { client, transport }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}

impl<T: Transport> RemoteItemService for HttpItemService<T> {
    async fn list_all(&self) -> Result<Vec<Item>, TransportError> {
        let response = self.send(self.client.build_list_all()).await?;
        self.client.parse_list_all(response)
    }

    async fn create(&self, description: &str) -> Result<ItemId, TransportError> {
        let request = self.client.build_create(description)?;
        let response = self.send(request).await?;
        self.client.parse_create(response)
    }

    async fn update(&self, id: &ItemId, description: &str, done: bool) -> Result<(), TransportError> {
        let update = ItemUpdate {
            description: description.to_string(),
            done,
        };
        let request = self.client.build_update(id, &update)?;
        let response = self.send(request).await?;
        self.client.parse_update(response)
    }

    async fn fetch_one(&self, id: &ItemId) -> Result<ItemSnapshot, TransportError> {
        let response = self.send(self.client.build_fetch_one(id)?).await?;
        self.client.parse_fetch_one(response)
    }

    async fn delete(&self, id: &ItemId) -> Result<(), TransportError> {
        let response = self.send(self.client.build_delete(id)?).await?;
        self.client.parse_delete(response)
    }
}
