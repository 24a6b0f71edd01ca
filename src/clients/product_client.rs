use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::actor_framework::{Entity, ResourceClient, StoreError};
use crate::app_system::CatalogConfig;
use crate::domain::Product;
use crate::patch::{apply_patch, PatchMap};
use crate::product::{validate_fields, ProductError, ProductRequest, ProductResponse};
use crate::query::{Page, PageRequest, PredicateBuilder, QueryError, QueryExecutor, SearchCriteria, Sort};

/// Client for the product catalog.
///
/// Orchestrates every catalog operation against the product store: identity
/// assignment, patch validation, dynamic search, and translation of store
/// failures into [`ProductError`].
#[derive(Clone)]
pub struct ProductClient {
    store: ResourceClient<Product>,
    executor: QueryExecutor<Product>,
    config: CatalogConfig,
}

impl ProductClient {
    pub fn new(store: ResourceClient<Product>, config: CatalogConfig) -> Self {
        let executor = QueryExecutor::new(store.clone(), config.max_page_size);
        Self {
            store,
            executor,
            config,
        }
    }

    #[instrument(skip(self, request), fields(product_name = %request.name))]
    pub async fn create(&self, request: ProductRequest) -> Result<ProductResponse, ProductError> {
        debug!("Processing create request");
        request.validate()?;

        let product = Product::new(
            Uuid::new_v4().to_string(),
            request.name,
            request.description,
            request.category,
            request.amount,
            request.currency,
            Utc::now(),
        );
        let name = product.name.clone();

        let saved = self.store.save(product).await.map_err(|e| {
            error!(error = %e, "Product not persisted");
            ProductError::NotCreated(name)
        })?;

        info!(product_id = %saved.product_id, "Product created successfully");
        Ok(saved.into())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, product_id: &str) -> Result<ProductResponse, ProductError> {
        debug!("Processing get request");
        let product = self.load(product_id).await?;
        Ok(product.into())
    }

    /// Replaces every mutable field with the values from `request`.
    #[instrument(skip(self, request))]
    pub async fn update(&self, product_id: &str, request: ProductRequest) -> Result<ProductResponse, ProductError> {
        debug!("Processing update request");
        request.validate()?;

        let mut product = self.load(product_id).await?;
        product.name = request.name;
        product.description = request.description;
        product.category = request.category;
        product.amount = request.amount;
        product.currency = request.currency;

        let saved = self.persist_update(product_id, product).await?;
        info!("Product updated successfully");
        Ok(saved.into())
    }

    /// Applies a sparse field map. Nothing is written unless every entry names
    /// a patchable field with a value of the right type.
    #[instrument(skip(self, patch), fields(fields = patch.len()))]
    pub async fn patch(&self, product_id: &str, patch: PatchMap) -> Result<ProductResponse, ProductError> {
        debug!("Processing patch request");
        let mut product = self.load(product_id).await?;

        apply_patch(Product::schema(), &mut product, &patch).map_err(|e| {
            warn!(error = %e, "Patch rejected");
            ProductError::InvalidField(e.field().to_string())
        })?;
        validate_fields(&product.name, product.amount, &product.currency)?;

        let saved = self.persist_update(product_id, product).await?;
        info!("Product patched successfully");
        Ok(saved.into())
    }

    /// Deletes the product and returns it as it was before deletion.
    #[instrument(skip(self))]
    pub async fn delete(&self, product_id: &str) -> Result<ProductResponse, ProductError> {
        debug!("Processing delete request");
        let product = self.load(product_id).await?;
        let key = product.key().ok_or_else(|| {
            error!("Loaded product has no internal key");
            ProductError::NotDeleted(product_id.to_string())
        })?;

        self.store.delete_by_key(key).await.map_err(|e| match e {
            StoreError::MissingKey(_) => {
                warn!("Product disappeared before delete");
                ProductError::NotFound(product_id.to_string())
            }
            e => {
                error!(error = %e, "Product not deleted");
                ProductError::NotDeleted(product_id.to_string())
            }
        })?;

        info!("Product deleted successfully");
        Ok(product.into())
    }

    /// Paginated search. `page`, `size` and `sort` fall back to the configured
    /// defaults when not given.
    #[instrument(skip(self, criteria))]
    pub async fn list(
        &self,
        criteria: &SearchCriteria,
        page: Option<u32>,
        size: Option<u32>,
        sort: Option<&str>,
    ) -> Result<Page<ProductResponse>, ProductError> {
        debug!("Processing list request");
        let request = self.page_request(page, size, sort)?;
        let predicate = PredicateBuilder::build(criteria);

        let result = self.executor.query(predicate, request).await.map_err(map_query_error)?;
        if !result.has_content() {
            debug!("No products matched");
        }
        info!(returned = result.content.len(), total = result.total_elements, "Listed products");
        Ok(result.map(ProductResponse::from))
    }

    /// Batch lookup by public identifiers. Unknown identifiers are skipped.
    #[instrument(skip(self, product_ids), fields(ids = product_ids.len()))]
    pub async fn list_by_ids(
        &self,
        product_ids: Vec<String>,
        page: Option<u32>,
        size: Option<u32>,
        sort: Option<&str>,
    ) -> Result<Page<ProductResponse>, ProductError> {
        debug!("Processing list_by_ids request");
        let request = self.page_request(page, size, sort)?;

        let result = self
            .executor
            .query_by_public_ids(product_ids, request)
            .await
            .map_err(map_query_error)?;
        info!(returned = result.content.len(), "Listed products by id");
        Ok(result.map(ProductResponse::from))
    }

    fn page_request(
        &self,
        page: Option<u32>,
        size: Option<u32>,
        sort: Option<&str>,
    ) -> Result<PageRequest, ProductError> {
        let sort = Sort::parse(sort.unwrap_or(&self.config.default_sort)).map_err(map_query_error)?;
        Ok(PageRequest::new(
            page.unwrap_or(0),
            size.unwrap_or(self.config.default_page_size),
            sort,
        ))
    }

    async fn load(&self, product_id: &str) -> Result<Product, ProductError> {
        match self.store.find_by_public_id(product_id).await {
            Ok(Some(product)) => Ok(product),
            Ok(None) => {
                debug!(product_id, "Product not found");
                Err(ProductError::NotFound(product_id.to_string()))
            }
            Err(e) => {
                error!(error = %e, "Product lookup failed");
                Err(ProductError::Unavailable)
            }
        }
    }

    async fn persist_update(&self, product_id: &str, product: Product) -> Result<Product, ProductError> {
        self.store.save(product).await.map_err(|e| match e {
            // a concurrent delete won the race
            StoreError::MissingKey(_) => {
                warn!("Product disappeared before update");
                ProductError::NotFound(product_id.to_string())
            }
            e => {
                error!(error = %e, "Product not updated");
                ProductError::NotUpdated(product_id.to_string())
            }
        })
    }
}

fn map_query_error(e: QueryError) -> ProductError {
    match e {
        QueryError::InvalidSort(field) => ProductError::InvalidSort(field),
        QueryError::InvalidPage { page, size } => ProductError::InvalidPage { page, size },
        QueryError::Store(StoreError::UnsortableField(field)) => ProductError::InvalidSort(field),
        QueryError::Store(e) => {
            error!(error = %e, "Product query failed");
            ProductError::Unavailable
        }
    }
}
