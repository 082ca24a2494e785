
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockdesk_core::id::string_or_number;

use crate::{Role, RoleName};

/// Identity of an authenticated principal.
///
/// The API has shipped both numeric and string user keys; either is accepted
/// and kept as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(#[serde(deserialize_with = "string_or_number")] String);

impl PrincipalId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account status as reported by the API.
///
/// Unknown values are preserved verbatim so a newer server does not break
/// session rehydration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
    Other(String),
}

impl UserStatus {
    pub fn as_str(&self) -> &str {
        match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Inactive => "INACTIVE",
            UserStatus::Suspended => "SUSPENDED",
            UserStatus::Other(s) => s,
        }
    }
}

impl From<String> for UserStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "ACTIVE" => UserStatus::Active,
            "INACTIVE" => UserStatus::Inactive,
            "SUSPENDED" => UserStatus::Suspended,
            _ => UserStatus::Other(value),
        }
    }
}

impl From<UserStatus> for String {
    fn from(value: UserStatus) -> Self {
        value.as_str().to_string()
    }
}

impl core::str::FromStr for UserStatus {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(UserStatus::from(s.to_string()))
    }
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated identity of the current session.
///
/// Also the shape of user records returned by `/api/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: PrincipalId,
    pub email: String,
    pub full_name: String,
    pub status: UserStatus,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Principal {
    pub fn role_name(&self) -> &RoleName {
        &self.role.name
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}
