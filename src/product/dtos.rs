use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ProductError;
use crate::domain::Product;

/// Caller input for creating a product or replacing all of its mutable fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub amount: f64,
    pub currency: String,
}

impl ProductRequest {
    pub fn new(name: impl Into<String>, amount: f64, currency: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: String::new(),
            amount,
            currency: currency.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn validate(&self) -> Result<(), ProductError> {
        validate_fields(&self.name, self.amount, &self.currency)
    }
}

/// Record-level rules shared by create, full update and patched records.
pub(crate) fn validate_fields(name: &str, amount: f64, currency: &str) -> Result<(), ProductError> {
    if name.trim().is_empty() {
        return Err(ProductError::InvalidRequest("name must not be blank".to_string()));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(ProductError::InvalidRequest(format!(
            "amount must be a non-negative number, got {}",
            amount
        )));
    }
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ProductError::InvalidRequest(format!(
            "currency must be a three-letter code, got {:?}",
            currency
        )));
    }
    Ok(())
}

/// Wire shape of a product: every field except the internal key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub amount: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            product_id: product.product_id,
            name: product.name,
            description: product.description,
            category: product.category,
            amount: product.amount,
            currency: product.currency,
            created_at: product.created_at,
        }
    }
}
