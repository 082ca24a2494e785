//! Dashboard statistics over a loaded product list.

use serde::Serialize;

use crate::Product;

/// Products at or below this quantity (and above zero) count as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Number of recently updated products shown on the dashboard.
pub const RECENT_PRODUCTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_products: usize,
    pub total_categories: usize,
    pub total_suppliers: usize,
    pub total_value: f64,
    pub low_stock_products: usize,
    pub out_of_stock_products: usize,
    pub recent_products: Vec<Product>,
}

impl InventoryStats {
    pub fn compute(products: &[Product], total_categories: usize, total_suppliers: usize) -> Self {
        let total_value = products.iter().map(Product::stock_value).sum();
        let low_stock_products = products
            .iter()
            .filter(|p| p.available_quantity > 0 && p.available_quantity <= LOW_STOCK_THRESHOLD)
            .count();
        let out_of_stock_products = products.iter().filter(|p| p.available_quantity == 0).count();

        // Newest first; products without a timestamp sort last.
        let mut recent: Vec<&Product> = products.iter().collect();
        recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        let recent_products = recent.into_iter().take(RECENT_PRODUCTS).cloned().collect();

        Self {
            total_products: products.len(),
            total_categories,
            total_suppliers,
            total_value,
            low_stock_products,
            out_of_stock_products,
            recent_products,
        }
    }
}
