use chrono::{DateTime, Utc};

/// Wire names of the product fields, shared by patch maps, filters and sort
/// clauses.
pub mod field {
    pub const PRODUCT_ID: &str = "productId";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const CATEGORY: &str = "category";
    pub const AMOUNT: &str = "amount";
    pub const CURRENCY: &str = "currency";
    pub const CREATED_AT: &str = "createdAt";
}

/// Represents a product in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Internal surrogate key, set by the store on first save.
    pub id: Option<u64>,
    /// Public identifier. Assigned once at creation and never changed.
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub amount: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product that has not been persisted yet.
    ///
    /// # Arguments
    /// * `product_id` - Public identifier (generated by the catalog)
    /// * `created_at` - Creation timestamp (set by the catalog)
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        amount: f64,
        currency: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            product_id: product_id.into(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
            amount,
            currency: currency.into(),
            created_at,
        }
    }
}
