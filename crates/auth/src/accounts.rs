//! User administration payloads (`/api/users`).

use serde::{Deserialize, Serialize};

use stockdesk_core::validate::{require_email, require_non_empty};
use stockdesk_core::{DomainResult, ValidationErrors};

use crate::UserStatus;
use crate::credentials::MIN_PASSWORD_LEN;

/// Body of `POST /api/users` (admin-only account creation).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role_name: String,
    pub status: UserStatus,
}

impl NewUser {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = ValidationErrors::new();
        require_email(&mut errors, "email", &self.email);
        require_non_empty(&mut errors, "fullName", &self.full_name, "Full name is required");
        require_non_empty(&mut errors, "roleName", &self.role_name, "Role is required");
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        errors.into_result()
    }
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("password", &"<redacted>")
            .field("role_name", &self.role_name)
            .field("status", &self.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_serializes_camel_case_with_status_string() {
        let user = NewUser {
            email: "clerk@x.com".into(),
            full_name: "Store Clerk".into(),
            password: "secret1".into(),
            role_name: "USER".into(),
            status: UserStatus::Active,
        };
        assert!(user.validate().is_ok());

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["fullName"], "Store Clerk");
        assert_eq!(json["roleName"], "USER");
        assert_eq!(json["status"], "ACTIVE");
    }

    #[test]
    fn new_user_requires_email_and_role() {
        let user = NewUser {
            email: "bad".into(),
            full_name: "X".into(),
            password: "secret1".into(),
            role_name: " ".into(),
            status: UserStatus::Active,
        };
        let err = user.validate().unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.get("email").is_some());
        assert!(fields.get("roleName").is_some());
        assert!(!format!("{user:?}").contains("secret1"));
    }
}
