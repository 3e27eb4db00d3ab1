//! Async storage abstraction for the synchronization core.

use async_trait::async_trait;
use todos_core::id::{ItemId, OwnerId};
use todos_core::{Item, ItemPatch, NewItem};
use todos_store_http::{HttpStore, StoreError};

/// Remote collection the synchronization core talks to.
///
/// Implementations must not retry or cache; every failure is surfaced to the
/// caller immediately.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Error type bubbled up from the backing store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// List every item owned by `owner`.
    ///
    /// # Errors
    /// Returns a store-specific error when the request fails.
    async fn list(&self, owner: OwnerId) -> Result<Vec<Item>, Self::Error>;

    /// Persist a new item; the store assigns its id.
    ///
    /// # Errors
    /// Returns a store-specific error when the request fails.
    async fn create(&self, item: &NewItem) -> Result<Item, Self::Error>;

    /// Delete an item.
    ///
    /// # Errors
    /// Returns a store-specific error when the request fails.
    async fn delete(&self, id: ItemId) -> Result<(), Self::Error>;

    /// Apply a partial update.
    ///
    /// # Errors
    /// Returns a store-specific error when the request fails.
    async fn update(&self, id: ItemId, patch: &ItemPatch) -> Result<Item, Self::Error>;
}

#[async_trait]
impl RemoteStore for HttpStore {
    type Error = StoreError;

    async fn list(&self, owner: OwnerId) -> Result<Vec<Item>, Self::Error> {
        Self::list(self, owner).await
    }

    async fn create(&self, item: &NewItem) -> Result<Item, Self::Error> {
        Self::create(self, item).await
    }

    async fn delete(&self, id: ItemId) -> Result<(), Self::Error> {
        Self::delete(self, id).await
    }

    async fn update(&self, id: ItemId, patch: &ItemPatch) -> Result<Item, Self::Error> {
        Self::update(self, id, patch).await
    }
}
