mod actor_framework;
mod app_system;
mod clients;
mod domain;
mod patch;
mod product;
mod query;
mod schema;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod integration_tests;

use clap::Parser;
use serde_json::json;
use tracing::{error, info, Instrument};

use crate::app_system::{setup_tracing, CatalogArgs, CatalogConfig, CatalogSystem};
use crate::clients::ProductClient;
use crate::patch::PatchMap;
use crate::product::ProductRequest;
use crate::query::SearchCriteria;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CatalogArgs::parse();

    // Setup tracing once for the entire application
    setup_tracing(&args.log);

    let config = CatalogConfig::from_args(&args)?;
    info!(?config, "Starting product catalog");

    let system = CatalogSystem::new(config);
    run_demo(&system.product_client).await?;
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}

/// Walks every catalog operation once against a running system.
async fn run_demo(client: &ProductClient) -> Result<(), Box<dyn std::error::Error>> {
    let span = tracing::info_span!("product_creation");
    let (widget, sprocket) = async {
        info!("Creating demo products");
        let widget = client
            .create(
                ProductRequest::new("Widget", 9.99, "USD")
                    .with_description("A small widget")
                    .with_category("tools"),
            )
            .await?;
        let sprocket = client
            .create(ProductRequest::new("Sprocket", 4.5, "EUR").with_category("parts"))
            .await?;
        Ok::<_, Box<dyn std::error::Error>>((widget, sprocket))
    }
    .instrument(span)
    .await?;

    info!(product_id = %widget.product_id, "Product created successfully");

    let span = tracing::info_span!("product_changes");
    async {
        let rename: PatchMap = serde_json::from_value(json!({"name": "Gadget"}))?;
        let patched = client.patch(&widget.product_id, rename).await?;
        info!(name = %patched.name, "Product renamed");

        let smuggled: PatchMap = serde_json::from_value(json!({"internalKey": 7}))?;
        match client.patch(&widget.product_id, smuggled).await {
            Ok(_) => error!("Patch of an unknown field was accepted"),
            Err(e) if e.is_client_error() => info!(error = %e, "Patch of an unknown field rejected"),
            Err(e) => return Err(e.into()),
        }

        let repriced = client
            .update(
                &sprocket.product_id,
                ProductRequest::new("Sprocket", 5.25, "EUR").with_category("parts"),
            )
            .await?;
        info!(amount = repriced.amount, "Product replaced");

        let current = client.get(&widget.product_id).await?;
        info!(name = %current.name, "Product fetched");
        Ok::<_, Box<dyn std::error::Error>>(())
    }
    .instrument(span)
    .await?;

    let page = client.list(&SearchCriteria::default(), None, None, None).await?;
    info!(page = %serde_json::to_string(&page)?, "Catalog listing");

    let criteria = SearchCriteria::name("gad")
        .with_category("TOOLS")
        .with_currency("usd")
        .with_amount_range(Some(1.0), Some(50.0));
    let found = client.list(&criteria, Some(0), Some(10), Some("name")).await?;
    info!(matched = found.total_elements, "Catalog search");

    let ids = vec![widget.product_id.clone(), sprocket.product_id.clone()];
    let batch = client.list_by_ids(ids, None, None, Some("amount,desc")).await?;
    info!(returned = batch.content.len(), "Batch lookup");

    let deleted = client.delete(&sprocket.product_id).await?;
    info!(product_id = %deleted.product_id, "Product deleted");
    if let Err(e) = client.get(&sprocket.product_id).await {
        info!(error = %e, "Deleted product is gone");
    }

    Ok(())
}
