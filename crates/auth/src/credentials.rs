//! Login/registration payloads and the credential token derived from them.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockdesk_core::validate::{require_email, require_non_empty};
use stockdesk_core::{DomainResult, ValidationErrors};

/// Opaque credential sent with every API request (`Authorization: Basic ...`).
///
/// The value is `base64(identifier ":" secret)`. It is never rendered by
/// `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialToken(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("credential token is empty")]
    Empty,

    #[error("credential token is not valid base64")]
    Encoding,
}

impl CredentialToken {
    /// Derive the token from a login identifier and secret.
    pub fn from_credentials(identifier: &str, secret: &str) -> Self {
        Self(STANDARD.encode(format!("{identifier}:{secret}")))
    }

    /// Rebuild a token from its persisted encoded form.
    pub fn from_encoded(encoded: impl Into<String>) -> Result<Self, TokenError> {
        let encoded = encoded.into();
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(TokenError::Empty);
        }
        STANDARD.decode(encoded).map_err(|_| TokenError::Encoding)?;
        Ok(Self(encoded.to_string()))
    }

    /// Encoded form, for persistence only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Value of the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Basic {}", self.0)
    }
}

impl core::fmt::Debug for CredentialToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CredentialToken(<redacted>)")
    }
}

impl core::fmt::Display for CredentialToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = ValidationErrors::new();
        require_email(&mut errors, "email", &self.email);
        require_non_empty(&mut errors, "password", &self.password, "Password is required");
        errors.into_result()
    }

    pub fn token(&self) -> CredentialToken {
        CredentialToken::from_credentials(&self.email, &self.password)
    }
}

impl core::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role_name: String,
}

/// Minimum password length accepted by the registration form.
pub const MIN_PASSWORD_LEN: usize = 6;

impl RegisterRequest {
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

    pub fn login_request(&self) -> LoginRequest {
        LoginRequest::new(self.email.clone(), self.password.clone())
    }
}

impl core::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("role_name", &self.role_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_basic_encoding_of_identifier_and_secret() {
        let token = CredentialToken::from_credentials("admin@x.com", "secret");
        assert_eq!(token.expose(), "YWRtaW5AeC5jb206c2VjcmV0");
        assert_eq!(token.authorization_header(), "Basic YWRtaW5AeC5jb206c2VjcmV0");
    }

    #[test]
    fn token_never_leaks_through_formatting() {
        let token = CredentialToken::from_credentials("a@b.c", "hunter2");
        assert!(!format!("{token:?}").contains(token.expose()));
        assert_eq!(token.to_string(), "<redacted>");

        let req = LoginRequest::new("a@b.c", "hunter2");
        assert!(!format!("{req:?}").contains("hunter2"));
    }

    #[test]
    fn persisted_token_must_be_base64() {
        assert_eq!(CredentialToken::from_encoded("  "), Err(TokenError::Empty));
        assert_eq!(CredentialToken::from_encoded("%%%"), Err(TokenError::Encoding));
        let token = CredentialToken::from_encoded("YTpi").unwrap();
        assert_eq!(token, CredentialToken::from_credentials("a", "b"));
    }

    #[test]
    fn login_validation_collects_all_fields() {
        let err = LoginRequest::new("", "").validate().unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.get("email"), Some("Email is required"));
        assert_eq!(fields.get("password"), Some("Password is required"));

        assert!(LoginRequest::new("admin@x.com", "secret").validate().is_ok());
    }

    #[test]
    fn register_validation_checks_password_length() {
        let req = RegisterRequest {
            email: "new@x.com".into(),
            password: "abc".into(),
            full_name: "New User".into(),
            role_name: "USER".into(),
        };
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().unwrap().get("password").is_some());
        assert_eq!(req.login_request().email, "new@x.com");
    }
}
