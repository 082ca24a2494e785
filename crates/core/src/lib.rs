//! `stockdesk-core` — shared building blocks for the inventory client.
//!
//! This crate contains **pure** primitives (no IO, no HTTP, no storage).

pub mod error;
pub mod id;
pub mod validate;

pub use error::{DomainError, DomainResult, ValidationErrors};
pub use id::{CategoryId, ProductId, SupplierId, UserId};
