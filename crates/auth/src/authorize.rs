//! Role-based authorization predicates.
//!
//! Every function here is total: an absent principal is "no permissions",
//! never an error.

use serde::Serialize;
use thiserror::Error;

use crate::{Principal, RoleName};

/// `true` iff a principal exists and its role name equals `name`.
pub fn has_role(principal: Option<&Principal>, name: &str) -> bool {
    principal.is_some_and(|p| p.role_name().as_str() == name)
}

/// `true` iff a principal exists and its role name is one of `names`.
///
/// An empty `names` slice never matches.
pub fn has_any_role<S: AsRef<str>>(principal: Option<&Principal>, names: &[S]) -> bool {
    principal.is_some_and(|p| {
        let role = p.role_name().as_str();
        names.iter().any(|n| n.as_ref() == role)
    })
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("forbidden: required roles {required}")]
    Forbidden { required: String },
}

/// Role requirement placed in front of a protected view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "roles", rename_all = "snake_case")]
pub enum RoleRequirement {
    /// Principal must match every listed role.
    ///
    /// A principal carries exactly one role, so this is only meaningful with a
    /// single element; with more than one distinct name it can never pass.
    All(Vec<RoleName>),

    /// Principal must match at least one listed role.
    Any(Vec<RoleName>),
}

impl RoleRequirement {
    pub fn all(roles: impl IntoIterator<Item = impl Into<RoleName>>) -> Self {
        Self::All(roles.into_iter().map(Into::into).collect())
    }

    pub fn any(roles: impl IntoIterator<Item = impl Into<RoleName>>) -> Self {
        Self::Any(roles.into_iter().map(Into::into).collect())
    }

    pub fn roles(&self) -> &[RoleName] {
        match self {
            Self::All(roles) | Self::Any(roles) => roles,
        }
    }

    pub fn is_satisfied_by(&self, principal: Option<&Principal>) -> bool {
        match self {
            Self::All(roles) => {
                principal.is_some() && roles.iter().all(|r| has_role(principal, r.as_str()))
            }
            Self::Any(roles) => has_any_role(principal, roles.as_slice()),
        }
    }

    /// Check a principal against the requirement.
    ///
    /// - No IO
    /// - No panics
    pub fn check(&self, principal: Option<&Principal>) -> Result<(), AuthzError> {
        if principal.is_none() {
            return Err(AuthzError::Unauthenticated);
        }
        if self.is_satisfied_by(principal) {
            Ok(())
        } else {
            Err(AuthzError::Forbidden {
                required: self.describe(),
            })
        }
    }

    /// Human-readable list of the required roles (`"ADMIN, MANAGER"` for all-of,
    /// `"ADMIN or MANAGER"` for any-of).
    pub fn describe(&self) -> String {
        let names: Vec<&str> = self.roles().iter().map(RoleName::as_str).collect();
        match self {
            Self::All(_) => names.join(", "),
            Self::Any(_) => names.join(" or "),
        }
    }
}
