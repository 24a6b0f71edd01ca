#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use crate::actor_framework::StoreError;
    use crate::app_system::{CatalogConfig, CatalogSystem};
    use crate::clients::ProductClient;
    use crate::domain::Product;
    use crate::mock_framework::{
        create_mock_client, expect_delete_by_key, expect_find_all, expect_find_by_public_id, expect_save,
    };
    use crate::patch::PatchMap;
    use crate::product::{ProductError, ProductRequest};
    use crate::query::{Predicate, SearchCriteria};

    fn stored(product_id: &str, key: u64) -> Product {
        let mut product = Product::new(product_id, "Widget", "", "tools", 9.99, "USD", Utc::now());
        product.id = Some(key);
        product
    }

    fn patch(entries: serde_json::Value) -> PatchMap {
        serde_json::from_value(entries).unwrap()
    }

    #[tokio::test]
    async fn test_catalog_lifecycle() {
        let system = CatalogSystem::new(CatalogConfig::default());
        let client = system.product_client.clone();

        // 1. Two identical creates are two products
        let request = ProductRequest::new("Widget", 9.99, "USD");
        let first = client.create(request.clone()).await.unwrap();
        let second = client.create(request).await.unwrap();
        assert_ne!(first.product_id, second.product_id);

        // 2. Patch the name, then try to smuggle in an unknown field
        let patched = client
            .patch(&first.product_id, patch(json!({"name": "Gadget"})))
            .await
            .unwrap();
        assert_eq!(patched.name, "Gadget");

        let rejected = client
            .patch(&first.product_id, patch(json!({"name": "Nope", "internalKey": 7})))
            .await;
        assert_eq!(rejected, Err(ProductError::InvalidField("internalKey".to_string())));
        assert_eq!(client.get(&first.product_id).await.unwrap().name, "Gadget");

        // 3. Search sees the patched record
        let page = client
            .list(&SearchCriteria::name("gad"), None, None, None)
            .await
            .unwrap();
        assert_eq!(page.content, vec![patched]);

        // 4. Delete, then the record is gone
        client.delete(&second.product_id).await.unwrap();
        assert_eq!(
            client.get(&second.product_id).await,
            Err(ProductError::NotFound(second.product_id.clone()))
        );
        let remaining = client.list(&SearchCriteria::default(), None, None, None).await.unwrap();
        assert_eq!(remaining.total_elements, 1);

        drop(client);
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_create_reports_not_created_when_store_fails() {
        for failure in [StoreError::Conflict("duplicate productId".to_string()), StoreError::Unavailable] {
            let (store, mut store_rx) = create_mock_client::<Product>(10);
            let client = ProductClient::new(store, CatalogConfig::default());

            let task = tokio::spawn(async move { client.create(ProductRequest::new("Widget", 9.99, "USD")).await });

            let (payload, responder) = expect_save(&mut store_rx).await.expect("Expected Save");
            assert_eq!(payload.id, None);
            assert!(!payload.product_id.is_empty());
            responder.send(Err(failure)).unwrap();

            let result = task.await.unwrap();
            assert_eq!(result, Err(ProductError::NotCreated("Widget".to_string())));
        }
    }

    #[tokio::test]
    async fn test_patch_reports_not_updated_when_save_fails() {
        let (store, mut store_rx) = create_mock_client::<Product>(10);
        let client = ProductClient::new(store, CatalogConfig::default());

        let task = tokio::spawn(async move {
            client
                .patch("p-1", patch(json!({"amount": 12.5})))
                .await
        });

        let (public_id, responder) = expect_find_by_public_id(&mut store_rx)
            .await
            .expect("Expected FindByPublicId");
        assert_eq!(public_id, "p-1");
        responder.send(Ok(Some(stored("p-1", 3)))).unwrap();

        let (payload, responder) = expect_save(&mut store_rx).await.expect("Expected Save");
        assert_eq!(payload.id, Some(3));
        assert_eq!(payload.amount, 12.5);
        responder.send(Err(StoreError::Unavailable)).unwrap();

        assert_eq!(task.await.unwrap(), Err(ProductError::NotUpdated("p-1".to_string())));
    }

    #[tokio::test]
    async fn test_update_losing_a_race_with_delete_is_not_found() {
        let (store, mut store_rx) = create_mock_client::<Product>(10);
        let client = ProductClient::new(store, CatalogConfig::default());

        let task = tokio::spawn(async move {
            client
                .update("p-1", ProductRequest::new("Widget Pro", 19.99, "USD"))
                .await
        });

        let (_, responder) = expect_find_by_public_id(&mut store_rx).await.expect("Expected FindByPublicId");
        responder.send(Ok(Some(stored("p-1", 3)))).unwrap();
        let (_, responder) = expect_save(&mut store_rx).await.expect("Expected Save");
        responder.send(Err(StoreError::MissingKey(3))).unwrap();

        assert_eq!(task.await.unwrap(), Err(ProductError::NotFound("p-1".to_string())));
    }

    #[tokio::test]
    async fn test_delete_reports_not_deleted_when_store_fails() {
        let (store, mut store_rx) = create_mock_client::<Product>(10);
        let client = ProductClient::new(store, CatalogConfig::default());

        let task = tokio::spawn(async move { client.delete("p-1").await });

        let (_, responder) = expect_find_by_public_id(&mut store_rx).await.expect("Expected FindByPublicId");
        responder.send(Ok(Some(stored("p-1", 5)))).unwrap();
        let (key, responder) = expect_delete_by_key(&mut store_rx).await.expect("Expected DeleteByKey");
        assert_eq!(key, 5);
        responder.send(Err(StoreError::Unavailable)).unwrap();

        assert_eq!(task.await.unwrap(), Err(ProductError::NotDeleted("p-1".to_string())));
    }

    #[tokio::test]
    async fn test_list_passes_built_predicate_and_defaults_to_store() {
        let (store, mut store_rx) = create_mock_client::<Product>(10);
        let client = ProductClient::new(store, CatalogConfig::default());

        let task = tokio::spawn(async move {
            client
                .list(&SearchCriteria::default().with_currency("usd"), None, None, None)
                .await
        });

        let (predicate, page, responder) = expect_find_all(&mut store_rx).await.expect("Expected FindAll");
        assert_eq!(predicate, Predicate::eq_ignore_case("currency", "usd"));
        assert_eq!(page.page, 0);
        assert_eq!(page.size, CatalogConfig::default().default_page_size);
        assert_eq!(page.sort.field, "createdAt");
        responder.send(Err(StoreError::Unavailable)).unwrap();

        assert_eq!(task.await.unwrap(), Err(ProductError::Unavailable));
    }

    #[tokio::test]
    async fn test_store_sort_rejection_reads_as_invalid_sort() {
        let (store, mut store_rx) = create_mock_client::<Product>(10);
        let client = ProductClient::new(store, CatalogConfig::default());

        let task = tokio::spawn(async move {
            client
                .list(&SearchCriteria::default(), None, None, Some("name"))
                .await
        });

        let (_, page, responder) = expect_find_all(&mut store_rx).await.expect("Expected FindAll");
        assert_eq!(page.sort.field, "name");
        responder
            .send(Err(StoreError::UnsortableField("name".to_string())))
            .unwrap();

        assert_eq!(task.await.unwrap(), Err(ProductError::InvalidSort("name".to_string())));
    }
}
