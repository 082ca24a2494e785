
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockdesk_core::validate::require_non_empty;
use stockdesk_core::{CategoryId, DomainResult, ProductId, SupplierId, ValidationErrors};

use crate::{Category, Supplier};

/// Product as returned by `/api/products`.
///
/// The API embeds the full category and supplier records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub available_quantity: i64,
    pub unit_price: f64,
    pub category: Category,
    pub supplier: Supplier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Stock value of this product (`unit_price * available_quantity`).
    pub fn stock_value(&self) -> f64 {
        self.unit_price * self.available_quantity as f64
    }
}

/// Product create/update form (`ProductDto` on the wire).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub available_quantity: i64,
    pub unit_price: f64,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
}

impl ProductDraft {
    /// Client-side form checks; nothing is sent to the API when these fail.
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = ValidationErrors::new();
        require_non_empty(&mut errors, "name", &self.name, "Product name is required");
        if self.available_quantity < 0 {
            errors.add("availableQuantity", "Quantity cannot be negative");
        }
        if !self.unit_price.is_finite() || self.unit_price <= 0.0 {
            errors.add("unitPrice", "Price must be greater than 0");
        }
        if self.category_id.is_none() {
            errors.add("categoryId", "Category is required");
        }
        if self.supplier_id.is_none() {
            errors.add("supplierId", "Supplier is required");
        }
        errors.into_result()
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.id.clone()),
            name: product.name.clone(),
            description: product.description.clone(),
            available_quantity: product.available_quantity,
            unit_price: product.unit_price,
            category_id: Some(product.category.id),
            supplier_id: Some(product.supplier.id.clone()),
        }
    }
}
