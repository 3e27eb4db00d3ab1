#![allow(missing_docs)]

use anyhow::Result;
use serde_json::json;
use std::time::Duration;
use todos_core::id::{ItemId, OwnerId};
use todos_core::{ItemPatch, NewItem};
use todos_store_http::{HttpStore, StoreError};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn owner() -> OwnerId {
    OwnerId::new(3090).unwrap_or_else(|| unreachable!("non-zero literal"))
}

#[tokio::test]
async fn list_scopes_request_by_owner() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/todos"))
        .and(query_param("userId", "3090"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "userId": 3090, "title": "First", "completed": false},
            {"id": 2, "userId": 3090, "title": "Second", "completed": true}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpStore::new(&server.uri())?;
    let items = store.list(owner()).await?;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, ItemId(1));
    assert_eq!(items[1].title, "Second");
    assert!(items[1].completed);
    Ok(())
}

#[tokio::test]
async fn create_posts_item_without_id() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/todos"))
        .and(body_json(json!({"userId": 3090, "title": "Buy milk", "completed": false})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 41, "userId": 3090, "title": "Buy milk", "completed": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpStore::new(&server.uri())?;
    let created = store.create(&NewItem::new(owner(), " Buy milk ")?).await?;

    assert_eq!(created.id, ItemId(41));
    assert_eq!(created.title, "Buy milk");
    Ok(())
}

#[tokio::test]
async fn update_patches_only_given_fields() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/todos/5"))
        .and(body_json(json!({"completed": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5, "userId": 3090, "title": "Walk", "completed": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpStore::new(&server.uri())?;
    let updated = store.update(ItemId(5), &ItemPatch::completed(true)).await?;

    assert!(updated.completed);
    Ok(())
}

#[tokio::test]
async fn delete_ignores_response_body() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/todos/8"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpStore::new(&server.uri())?;
    store.delete(ItemId(8)).await?;
    Ok(())
}

#[tokio::test]
async fn non_success_status_is_reported() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/todos/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .mount(&server)
        .await;

    let store = HttpStore::new(&server.uri())?;
    let err = store
        .delete(ItemId(9))
        .await
        .err()
        .unwrap_or_else(|| panic!("delete must fail"));

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("missing"));
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let store = HttpStore::new(&server.uri())?;
    let result = store.list(owner()).await;

    assert!(matches!(result, Err(StoreError::Decode(_))));
    Ok(())
}

#[tokio::test]
async fn slow_responses_hit_the_timeout() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/todos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let store = HttpStore::with_timeout(&server.uri(), Some(Duration::from_millis(50)))?;
    let result = store.list(owner()).await;

    assert!(matches!(result, Err(StoreError::Timeout(_))));
    Ok(())
}
