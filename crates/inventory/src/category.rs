use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockdesk_core::validate::require_non_empty;
use stockdesk_core::{CategoryId, DomainResult, ValidationErrors};

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Category create/update form (`CategoryDto` on the wire).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
}

impl CategoryDraft {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = ValidationErrors::new();
        require_non_empty(&mut errors, "name", &self.name, "Category name is required");
        require_non_empty(
            &mut errors,
            "description",
            &self.description,
            "Description is required",
        );
        errors.into_result()
    }
}

impl From<&Category> for CategoryDraft {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone(),
        }
    }
}
