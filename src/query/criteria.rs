use serde::Deserialize;

use super::predicate::Predicate;
use crate::domain::field;

/// Optional product search filters. Every filter that is set narrows the
/// result; an empty criteria matches every product.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    pub name: Option<String>,
    pub category: Option<String>,
    pub currency: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub product_ids: Option<Vec<String>>,
}

impl SearchCriteria {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_amount_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    #[allow(dead_code)]
    pub fn with_product_ids(mut self, ids: Vec<String>) -> Self {
        self.product_ids = Some(ids);
        self
    }
}

/// Turns [`SearchCriteria`] into a [`Predicate`] at call time.
pub struct PredicateBuilder;

impl PredicateBuilder {
    pub fn build(criteria: &SearchCriteria) -> Predicate {
        let mut predicate = Predicate::True;

        if let Some(name) = non_blank(&criteria.name) {
            predicate = predicate & Predicate::contains(field::NAME, name);
        }
        if let Some(category) = non_blank(&criteria.category) {
            predicate = predicate & Predicate::eq_ignore_case(field::CATEGORY, category);
        }
        if let Some(currency) = non_blank(&criteria.currency) {
            predicate = predicate & Predicate::eq_ignore_case(field::CURRENCY, currency);
        }
        if let Some(min) = criteria.min_amount {
            predicate = predicate & Predicate::gte(field::AMOUNT, min);
        }
        if let Some(max) = criteria.max_amount {
            predicate = predicate & Predicate::lte(field::AMOUNT, max);
        }
        if let Some(ids) = &criteria.product_ids {
            predicate = predicate & Self::public_ids(ids.iter().cloned());
        }

        predicate
    }

    /// `productId ∈ ids`.
    pub fn public_ids(ids: impl IntoIterator<Item = String>) -> Predicate {
        Predicate::is_in(field::PRODUCT_ID, ids)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
