use thiserror::Error;

/// Errors returned by the product catalog.
///
/// Storage failures are logged where they happen and reported here without
/// their underlying detail.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product with productId: {0} not found")]
    NotFound(String),
    #[error("Product {0} not created")]
    NotCreated(String),
    #[error("Product {0} not updated")]
    NotUpdated(String),
    #[error("Product {0} not deleted")]
    NotDeleted(String),
    #[error("Invalid field: {0}")]
    InvalidField(String),
    #[error("Invalid sort field: {0}")]
    InvalidSort(String),
    #[error("Invalid page request: page {page}, size {size}")]
    InvalidPage { page: u32, size: u32 },
    #[error("Invalid product: {0}")]
    InvalidRequest(String),
    #[error("Product store unavailable")]
    Unavailable,
}

impl ProductError {
    /// `true` when the caller can fix the request; `false` for failures on
    /// the catalog side.
    pub fn is_client_error(&self) -> bool {
        match self {
            ProductError::NotFound(_)
            | ProductError::InvalidField(_)
            | ProductError::InvalidSort(_)
            | ProductError::InvalidPage { .. }
            | ProductError::InvalidRequest(_) => true,
            ProductError::NotCreated(_)
            | ProductError::NotUpdated(_)
            | ProductError::NotDeleted(_)
            | ProductError::Unavailable => false,
        }
    }
}
