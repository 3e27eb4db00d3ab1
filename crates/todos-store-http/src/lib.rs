//! HTTP-backed remote store for the todos client.

mod error;

pub use error::StoreError;

use reqwest::{Client, Method, Response, Url};
use serde_json::Value;
use std::time::Duration;
use todos_core::id::{ItemId, OwnerId};
use todos_core::{Item, ItemPatch, NewItem};
use tracing::{debug, info};

const COLLECTION: &str = "todos";
const OWNER_QUERY: &str = "userId";

/// Typed client for the `/todos` collection.
///
/// Every call hits the network: there is no caching and no retry. Failures
/// are surfaced to the caller as [`StoreError`].
#[derive(Clone, Debug)]
pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    /// Build a store rooted at `base_url` without a request timeout.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidBaseUrl`] when the URL is malformed or not http(s).
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        Self::with_timeout(base_url, None)
    }

    /// Build a store rooted at `base_url` with an optional per-request timeout.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidBaseUrl`] when the URL is unusable, or
    /// [`StoreError::Transport`] if the HTTP client cannot be constructed.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, StoreError> {
        let base_url = parse_base_url(base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, id: Option<ItemId>) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| StoreError::InvalidBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push(COLLECTION);
            if let Some(id) = id {
                segments.push(&id.to_string());
            }
        }
        Ok(url)
    }

    /// `GET /todos?userId={owner}`.
    ///
    /// # Errors
    /// Returns a [`StoreError`] on transport, status, or decode failure.
    pub async fn list(&self, owner: OwnerId) -> Result<Vec<Item>, StoreError> {
        let mut url = self.endpoint(None)?;
        url.query_pairs_mut()
            .append_pair(OWNER_QUERY, &owner.to_string());
        let response = self.send(Method::GET, url, None).await?;
        let items: Vec<Item> = decode(response).await?;
        debug!(owner = %owner, count = items.len(), "listed items");
        Ok(items)
    }

    /// `POST /todos` with the item body; the server assigns the id.
    ///
    /// # Errors
    /// Returns a [`StoreError`] on transport, status, or decode failure.
    pub async fn create(&self, item: &NewItem) -> Result<Item, StoreError> {
        let url = self.endpoint(None)?;
        let body = serde_json::to_value(item)?;
        let response = self.send(Method::POST, url, Some(body)).await?;
        let created: Item = decode(response).await?;
        info!(id = %created.id, "created item");
        Ok(created)
    }

    /// `DELETE /todos/{id}`. Any response body is ignored.
    ///
    /// # Errors
    /// Returns a [`StoreError`] on transport or status failure.
    pub async fn delete(&self, id: ItemId) -> Result<(), StoreError> {
        let url = self.endpoint(Some(id))?;
        self.send(Method::DELETE, url, None).await?;
        info!(id = %id, "deleted item");
        Ok(())
    }

    /// `PATCH /todos/{id}` with the partial fields.
    ///
    /// # Errors
    /// Returns a [`StoreError`] on transport, status, or decode failure.
    pub async fn update(&self, id: ItemId, patch: &ItemPatch) -> Result<Item, StoreError> {
        let url = self.endpoint(Some(id))?;
        let body = serde_json::to_value(patch)?;
        let response = self.send(Method::PATCH, url, Some(body)).await?;
        let updated: Item = decode(response).await?;
        info!(id = %id, "updated item");
        Ok(updated)
    }

    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> Result<Response, StoreError> {
        debug!(method = %method, url = %url, "sending request");
        let method_name = method.as_str().to_owned();
        let mut request = self.client.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            method: method_name,
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn parse_base_url(raw: &str) -> Result<Url, StoreError> {
    let url = Url::parse(raw.trim()).map_err(|err| StoreError::InvalidBaseUrl(format!("{raw}: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(StoreError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint_of(base: &str, id: Option<u64>) -> String {
        let store = HttpStore::new(base).unwrap_or_else(|err| panic!("valid base url: {err}"));
        store
            .endpoint(id.map(ItemId))
            .unwrap_or_else(|err| panic!("endpoint must build: {err}"))
            .to_string()
    }

    #[test]
    fn endpoint_appends_collection_to_base_path() {
        assert_eq!(endpoint_of("http://localhost:3000", None), "http://localhost:3000/todos");
        assert_eq!(
            endpoint_of("https://example.test/api/", Some(7)),
            "https://example.test/api/todos/7"
        );
        assert_eq!(
            endpoint_of("https://example.test/api", Some(7)),
            "https://example.test/api/todos/7"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(HttpStore::new("not a url"), Err(StoreError::InvalidBaseUrl(_))));
        assert!(matches!(HttpStore::new("ftp://example.test"), Err(StoreError::InvalidBaseUrl(_))));
        assert!(matches!(HttpStore::new("mailto:me@example.test"), Err(StoreError::InvalidBaseUrl(_))));
    }
}
