//! Domain services: typed endpoints of the remote API.
//!
//! Drafts are validated before anything is sent; a validation failure never
//! reaches the network layer.

use std::sync::Arc;

use thiserror::Error;

use stockdesk_auth::{NewUser, Principal, UserStatus};
use stockdesk_core::{CategoryId, DomainError, ProductId, SupplierId, UserId};
use stockdesk_inventory::{
    Category, CategoryDraft, InventoryStats, Product, ProductDraft, ProductFilters, Supplier,
    SupplierDraft,
};

use crate::http::{ApiClient, ApiError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ServiceError {
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Validation(e) => e.to_string(),
            ServiceError::Api(e) => e.user_message(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Products, categories and suppliers.
#[derive(Debug, Clone)]
pub struct InventoryService {
    api: Arc<ApiClient>,
}

impl InventoryService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list_products(&self, filters: &ProductFilters) -> ServiceResult<Vec<Product>> {
        Ok(self
            .api
            .get_with_query("/api/products", &filters.query_pairs())
            .await?)
    }

    pub async fn get_product(&self, id: &ProductId) -> ServiceResult<Product> {
        Ok(self.api.get(&format!("/api/products/{id}")).await?)
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> ServiceResult<Product> {
        draft.validate()?;
        let product: Product = self.api.post("/api/products", draft).await?;
        tracing::info!(product = %product.id, "product created");
        Ok(product)
    }

    pub async fn update_product(&self, id: &ProductId, draft: &ProductDraft) -> ServiceResult<Product> {
        draft.validate()?;
        let product: Product = self.api.put(&format!("/api/products/{id}"), draft).await?;
        tracing::info!(product = %product.id, "product updated");
        Ok(product)
    }

    pub async fn delete_product(&self, id: &ProductId) -> ServiceResult<()> {
        self.api.delete(&format!("/api/products/{id}")).await?;
        tracing::info!(product = %id, "product deleted");
        Ok(())
    }

    pub async fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.api.get("/api/categories").await?)
    }

    pub async fn get_category(&self, id: CategoryId) -> ServiceResult<Category> {
        Ok(self.api.get(&format!("/api/categories/{id}")).await?)
    }

    pub async fn create_category(&self, draft: &CategoryDraft) -> ServiceResult<Category> {
        draft.validate()?;
        let category: Category = self.api.post("/api/categories", draft).await?;
        tracing::info!(category = %category.id, "category created");
        Ok(category)
    }

    pub async fn update_category(&self, id: CategoryId, draft: &CategoryDraft) -> ServiceResult<Category> {
        draft.validate()?;
        let category: Category = self.api.put(&format!("/api/categories/{id}"), draft).await?;
        tracing::info!(category = %category.id, "category updated");
        Ok(category)
    }

    pub async fn delete_category(&self, id: CategoryId) -> ServiceResult<()> {
        self.api.delete(&format!("/api/categories/{id}")).await?;
        tracing::info!(category = %id, "category deleted");
        Ok(())
    }

    pub async fn list_suppliers(&self) -> ServiceResult<Vec<Supplier>> {
        Ok(self.api.get("/api/suppliers").await?)
    }

    pub async fn create_supplier(&self, draft: &SupplierDraft) -> ServiceResult<Supplier> {
        draft.validate()?;
        let supplier: Supplier = self.api.post("/api/suppliers", draft).await?;
        tracing::info!(supplier = %supplier.id, "supplier created");
        Ok(supplier)
    }

    pub async fn update_supplier(&self, id: &SupplierId, draft: &SupplierDraft) -> ServiceResult<Supplier> {
        draft.validate()?;
        let supplier: Supplier = self.api.put(&format!("/api/suppliers/{id}"), draft).await?;
        tracing::info!(supplier = %supplier.id, "supplier updated");
        Ok(supplier)
    }

    pub async fn delete_supplier(&self, id: &SupplierId) -> ServiceResult<()> {
        self.api.delete(&format!("/api/suppliers/{id}")).await?;
        tracing::info!(supplier = %id, "supplier deleted");
        Ok(())
    }

    /// Load products, categories and suppliers concurrently and summarize them.
    pub async fn dashboard(&self) -> ServiceResult<InventoryStats> {
        let filters = ProductFilters::default();
        let (products, categories, suppliers) = tokio::try_join!(
            self.list_products(&filters),
            self.list_categories(),
            self.list_suppliers(),
        )?;
        Ok(InventoryStats::compute(&products, categories.len(), suppliers.len()))
    }
}

/// User administration (`/api/users`).
#[derive(Debug, Clone)]
pub struct UserService {
    api: Arc<ApiClient>,
}

impl UserService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Principal>> {
        Ok(self.api.get("/api/users").await?)
    }

    pub async fn create(&self, user: &NewUser) -> ServiceResult<Principal> {
        user.validate()?;
        let created: Principal = self.api.post("/api/users", user).await?;
        tracing::info!(user = %created.id, role = %created.role.name, "user created");
        Ok(created)
    }

    pub async fn update_status(&self, id: UserId, status: &UserStatus) -> ServiceResult<Principal> {
        let updated: Principal = self
            .api
            .patch(
                &format!("/api/users/{id}/status"),
                &[("status", status.as_str().to_string())],
            )
            .await?;
        tracing::info!(user = %id, status = %status, "user status updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: UserId) -> ServiceResult<()> {
        self.api.delete(&format!("/api/users/{id}")).await?;
        tracing::info!(user = %id, "user deleted");
        Ok(())
    }
}
