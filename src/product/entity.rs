use once_cell::sync::Lazy;

use crate::actor_framework::Entity;
use crate::domain::{field, Product};
use crate::schema::{FieldDescriptor, FieldKind, FieldValue, Schema};

/// Field table for [`Product`].
///
/// The setter entries are the complete list of remotely patchable fields.
/// `productId` and `createdAt` are readable and sortable but carry no setter;
/// the internal key is not listed at all.
static PRODUCT_SCHEMA: Lazy<Schema<Product>> = Lazy::new(|| {
    Schema::new(
        "product",
        vec![
            FieldDescriptor::read_only(field::PRODUCT_ID, FieldKind::Identifier, |p: &Product| {
                FieldValue::Text(p.product_id.clone())
            })
            .sortable(),
            FieldDescriptor::text(
                field::NAME,
                |p: &Product| FieldValue::Text(p.name.clone()),
                |p: &mut Product, v| p.name = v,
            )
            .sortable(),
            FieldDescriptor::text(
                field::DESCRIPTION,
                |p: &Product| FieldValue::Text(p.description.clone()),
                |p: &mut Product, v| p.description = v,
            ),
            FieldDescriptor::text(
                field::CATEGORY,
                |p: &Product| FieldValue::Text(p.category.clone()),
                |p: &mut Product, v| p.category = v,
            )
            .sortable(),
            FieldDescriptor::decimal(
                field::AMOUNT,
                |p: &Product| FieldValue::Decimal(p.amount),
                |p: &mut Product, v| p.amount = v,
            )
            .sortable(),
            FieldDescriptor::text(
                field::CURRENCY,
                |p: &Product| FieldValue::Text(p.currency.clone()),
                |p: &mut Product, v| p.currency = v,
            )
            .sortable(),
            FieldDescriptor::read_only(field::CREATED_AT, FieldKind::Timestamp, |p: &Product| {
                FieldValue::Timestamp(p.created_at)
            })
            .sortable(),
        ],
    )
});

impl Entity for Product {
    fn schema() -> &'static Schema<Self> {
        &PRODUCT_SCHEMA
    }

    fn key(&self) -> Option<u64> {
        self.id
    }

    fn assign_key(&mut self, key: u64) {
        self.id = Some(key);
    }

    fn public_id(&self) -> &str {
        &self.product_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldClass;

    #[test]
    fn test_only_descriptive_fields_are_patchable() {
        let schema = Product::schema();
        let patchable: Vec<_> = schema.patchable_fields().collect();
        assert_eq!(
            patchable,
            vec![field::NAME, field::DESCRIPTION, field::CATEGORY, field::AMOUNT, field::CURRENCY]
        );

        assert_eq!(schema.classify("productId"), FieldClass::Protected(FieldKind::Identifier));
        assert_eq!(schema.classify("createdAt"), FieldClass::Protected(FieldKind::Timestamp));
        assert_eq!(schema.classify("id"), FieldClass::Unknown);
        assert_eq!(schema.classify("internalKey"), FieldClass::Unknown);
    }

    #[test]
    fn test_description_is_not_sortable() {
        let schema = Product::schema();
        assert!(schema.is_sortable("createdAt"));
        assert!(schema.is_sortable("amount"));
        assert!(!schema.is_sortable("description"));
        assert!(!schema.is_sortable("id"));
    }
}
