//! Inventory domain module.
//!
//! Products, categories and suppliers as the API returns them, the drafts the
//! admin forms submit (with client-side validation), product filtering and
//! dashboard statistics. Pure data and rules: no IO, no HTTP, no storage.

pub mod category;
pub mod filters;
pub mod product;
pub mod stats;
pub mod supplier;

pub use category::{Category, CategoryDraft};
pub use filters::{
    DEFAULT_PAGE_SIZE, Paginated, ProductFilters, SortField, SortOrder, paginate,
};
pub use product::{Product, ProductDraft};
pub use stats::{InventoryStats, LOW_STOCK_THRESHOLD, RECENT_PRODUCTS};
pub use supplier::{Supplier, SupplierDraft};
