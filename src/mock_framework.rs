//! # Mock Framework
//!
//! Utilities for testing the catalog client without a running store.
//!
//! Use [`create_mock_client`] to get a store client and the receiver behind it.
//! Then use helpers like [`expect_save`] or [`expect_find_by_public_id`] to
//! inspect each request and answer it.

use crate::actor_framework::{Entity, ResourceClient, ResourceRequest, Response};
use crate::query::{Page, PageRequest, Predicate};
use tokio::sync::mpsc;

pub type MockReceiver<T> = mpsc::Receiver<ResourceRequest<T>>;

/// Creates a store client whose requests land on a receiver owned by the test.
///
/// Answering through the returned responders lets a test play the store,
/// including failures a real store rarely produces.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, MockReceiver<T>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Save request
pub async fn expect_save<T: Entity>(receiver: &mut MockReceiver<T>) -> Option<(T, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Save { entity, respond_to }) => Some((entity, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a FindByPublicId request
pub async fn expect_find_by_public_id<T: Entity>(
    receiver: &mut MockReceiver<T>,
) -> Option<(String, Response<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::FindByPublicId { public_id, respond_to }) => Some((public_id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a DeleteByKey request
pub async fn expect_delete_by_key<T: Entity>(receiver: &mut MockReceiver<T>) -> Option<(u64, Response<()>)> {
    match receiver.recv().await {
        Some(ResourceRequest::DeleteByKey { key, respond_to }) => Some((key, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a FindAll request
pub async fn expect_find_all<T: Entity>(
    receiver: &mut MockReceiver<T>,
) -> Option<(Predicate, PageRequest, Response<Page<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::FindAll {
            predicate,
            page,
            respond_to,
        }) => Some((predicate, page, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::StoreError;
    use crate::domain::Product;
    use chrono::Utc;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Product>(10);

        let save_task = tokio::spawn(async move {
            let product = Product::new("p-1", "Widget", "", "tools", 9.99, "USD", Utc::now());
            client.save(product).await
        });

        let (mut payload, responder) = expect_save(&mut receiver).await.expect("Expected Save request");
        assert_eq!(payload.name, "Widget");
        payload.id = Some(1);
        responder.send(Ok(payload)).unwrap();

        let saved = save_task.await.unwrap().unwrap();
        assert_eq!(saved.id, Some(1));
    }

    #[tokio::test]
    async fn test_dropped_receiver_reads_as_unavailable() {
        let (client, receiver) = create_mock_client::<Product>(1);
        drop(receiver);

        assert_eq!(client.find_by_public_id("p-1").await, Err(StoreError::Unavailable));
    }
}
