use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use super::config::CatalogConfig;
use super::error::SystemError;
use crate::actor_framework::{Entity, ResourceActor};
use crate::clients::ProductClient;
use crate::domain::Product;

/// Starts the product store and hands out the catalog client.
///
/// The store actor lives until every clone of the client is dropped.
pub struct CatalogSystem {
    pub product_client: ProductClient,
    handles: Vec<JoinHandle<()>>,
}

impl CatalogSystem {
    #[instrument(skip(config), fields(store_buffer = config.store_buffer))]
    pub fn new(config: CatalogConfig) -> Self {
        let (product_actor, product_store) = ResourceActor::<Product>::new(config.store_buffer);
        let product_handle = tokio::spawn(product_actor.run());
        let product_client = ProductClient::new(product_store, config);

        let schema = Product::schema();
        info!(
            patchable = ?schema.patchable_fields().collect::<Vec<_>>(),
            sortable = ?schema.sortable_fields().collect::<Vec<_>>(),
            "Catalog system started"
        );

        Self {
            product_client,
            handles: vec![product_handle],
        }
    }

    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down catalog system");
        // closing the last client closes the store channel
        drop(self.product_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Store task failed");
                return Err(SystemError::TaskFailed(e.to_string()));
            }
        }

        info!("Catalog system shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductRequest;

    #[tokio::test]
    async fn test_start_use_and_shutdown() {
        let system = CatalogSystem::new(CatalogConfig::default());
        let created = system
            .product_client
            .create(ProductRequest::new("Widget", 9.99, "USD"))
            .await
            .unwrap();
        assert_eq!(system.product_client.get(&created.product_id).await.unwrap(), created);

        system.shutdown().await.unwrap();
    }
}
