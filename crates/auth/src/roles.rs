
use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockdesk_core::id::opt_string_or_number;

/// Role name used for RBAC (`ADMIN`, `MANAGER`, `USER`, ...).
///
/// Names are opaque, case-sensitive strings assigned by the server. The
/// well-known names are provided as constants for route tables and menus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(Cow<'static, str>);

impl RoleName {
    pub const ADMIN: RoleName = RoleName(Cow::Borrowed("ADMIN"));
    pub const MANAGER: RoleName = RoleName(Cow::Borrowed("MANAGER"));
    pub const USER: RoleName = RoleName(Cow::Borrowed("USER"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for RoleName {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for RoleName {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

/// Role attached to a principal, as returned by the API.
///
/// Only `name` takes part in authorization decisions; the rest is
/// descriptive metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: RoleName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Role {
    /// A role carrying only its name.
    pub fn named(name: impl Into<RoleName>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_accepts_numeric_id_and_sparse_fields() {
        let role: Role = serde_json::from_str(r#"{"id": 3, "name": "MANAGER"}"#).unwrap();
        assert_eq!(role.id.as_deref(), Some("3"));
        assert_eq!(role.name, RoleName::MANAGER);
        assert!(role.description.is_none());
    }

    #[test]
    fn role_name_compares_by_value() {
        assert_eq!(RoleName::new(String::from("ADMIN")), RoleName::ADMIN);
        assert_ne!(RoleName::from("admin"), RoleName::ADMIN);
    }
}
