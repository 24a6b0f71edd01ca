use thiserror::Error;
use tracing::{debug, instrument};

use super::page::{Page, PageRequest};
use super::predicate::Predicate;
use crate::actor_framework::{Entity, ResourceClient, StoreError};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("Invalid sort field: {0}")]
    InvalidSort(String),
    #[error("Invalid page request: page {page}, size {size}")]
    InvalidPage { page: u32, size: u32 },
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Runs predicates against the store with validated paging and ordering.
pub struct QueryExecutor<T: Entity> {
    store: ResourceClient<T>,
    max_page_size: u32,
}

impl<T: Entity> Clone for QueryExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            max_page_size: self.max_page_size,
        }
    }
}

impl<T: Entity> QueryExecutor<T> {
    pub fn new(store: ResourceClient<T>, max_page_size: u32) -> Self {
        Self { store, max_page_size }
    }

    /// Checks the page bounds and that the sort field is sortable for `T`.
    /// An unknown sort field is an error, never a silent default.
    pub fn validate(&self, request: &PageRequest) -> Result<(), QueryError> {
        if request.size == 0 || request.size > self.max_page_size {
            return Err(QueryError::InvalidPage {
                page: request.page,
                size: request.size,
            });
        }
        if !T::schema().is_sortable(&request.sort.field) {
            return Err(QueryError::InvalidSort(request.sort.field.clone()));
        }
        Ok(())
    }

    #[instrument(skip(self, predicate), fields(page = request.page, size = request.size, sort = %request.sort))]
    pub async fn query(&self, predicate: Predicate, request: PageRequest) -> Result<Page<T>, QueryError> {
        self.validate(&request)?;
        let page = self.store.find_all(predicate, request).await?;
        debug!(returned = page.content.len(), total = page.total_elements, "Query complete");
        Ok(page)
    }

    #[instrument(
        skip(self, ids),
        fields(ids = ids.len(), page = request.page, size = request.size, sort = %request.sort)
    )]
    pub async fn query_by_public_ids(&self, ids: Vec<String>, request: PageRequest) -> Result<Page<T>, QueryError> {
        self.validate(&request)?;
        let page = self.store.find_by_public_id_in(ids, request).await?;
        debug!(returned = page.content.len(), total = page.total_elements, "Batch lookup complete");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;
    use crate::domain::Product;
    use crate::query::{PredicateBuilder, SearchCriteria, Sort};
    use chrono::Utc;

    async fn seeded() -> QueryExecutor<Product> {
        let (actor, store) = ResourceActor::<Product>::new(10);
        tokio::spawn(actor.run());
        for (id, name, amount) in [("p1", "Widget", 9.99), ("p2", "wideband", 120.0), ("p3", "Gadget", 25.0)] {
            store
                .save(Product::new(id, name, "", "tools", amount, "USD", Utc::now()))
                .await
                .unwrap();
        }
        QueryExecutor::new(store, 50)
    }

    fn names(page: &Page<Product>) -> Vec<&str> {
        page.content.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_unknown_sort_field_is_rejected() {
        let executor = seeded().await;
        let result = executor
            .query(Predicate::True, PageRequest::new(0, 10, Sort::asc("unknownField")))
            .await;
        assert_eq!(result, Err(QueryError::InvalidSort("unknownField".to_string())));

        // known but not sortable
        let result = executor
            .query(Predicate::True, PageRequest::new(0, 10, Sort::asc("description")))
            .await;
        assert_eq!(result, Err(QueryError::InvalidSort("description".to_string())));
    }

    #[tokio::test]
    async fn test_page_size_bounds() {
        let executor = seeded().await;
        for size in [0, 51] {
            let result = executor
                .query(Predicate::True, PageRequest::new(0, size, Sort::asc("name")))
                .await;
            assert_eq!(result, Err(QueryError::InvalidPage { page: 0, size }));
        }
    }

    #[tokio::test]
    async fn test_query_sorts_and_pages() {
        let executor = seeded().await;

        let page = executor
            .query(Predicate::True, PageRequest::new(0, 2, Sort::desc("amount")))
            .await
            .unwrap();
        assert_eq!(names(&page), vec!["wideband", "Gadget"]);
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_next);

        let filtered = executor
            .query(
                PredicateBuilder::build(&SearchCriteria::name("wid")),
                PageRequest::new(0, 10, Sort::asc("name")),
            )
            .await
            .unwrap();
        assert_eq!(names(&filtered), vec!["Widget", "wideband"]);
    }

    #[tokio::test]
    async fn test_no_matches_is_an_empty_page() {
        let executor = seeded().await;
        let page = executor
            .query(
                PredicateBuilder::build(&SearchCriteria::name("sprocket")),
                PageRequest::new(0, 10, Sort::asc("name")),
            )
            .await
            .unwrap();
        assert!(!page.has_content());
        assert_eq!(page.total_elements, 0);
    }

    #[tokio::test]
    async fn test_query_by_public_ids() {
        let executor = seeded().await;
        let page = executor
            .query_by_public_ids(
                vec!["p3".into(), "p1".into()],
                PageRequest::new(0, 10, Sort::asc("productId")),
            )
            .await
            .unwrap();
        assert_eq!(names(&page), vec!["Widget", "Gadget"]);

        let invalid = executor
            .query_by_public_ids(vec!["p1".into()], PageRequest::new(0, 10, Sort::asc("bogus")))
            .await;
        assert_eq!(invalid, Err(QueryError::InvalidSort("bogus".to_string())));
    }
}
