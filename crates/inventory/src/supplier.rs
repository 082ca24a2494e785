use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockdesk_core::validate::{require_email, require_non_empty};
use stockdesk_core::{DomainResult, SupplierId, ValidationErrors};

/// Supplier record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Supplier create/update form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_info: Option<String>,
}

impl SupplierDraft {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = ValidationErrors::new();
        require_non_empty(&mut errors, "name", &self.name, "Supplier name is required");
        require_email(&mut errors, "email", &self.email);
        require_non_empty(&mut errors, "phone", &self.phone, "Phone is required");
        require_non_empty(&mut errors, "address", &self.address, "Address is required");
        errors.into_result()
    }
}

impl From<&Supplier> for SupplierDraft {
    fn from(supplier: &Supplier) -> Self {
        Self {
            name: supplier.name.clone(),
            email: supplier.email.clone(),
            phone: supplier.phone.clone(),
            address: supplier.address.clone(),
            company_info: supplier.company_info.clone(),
        }
    }
}
