//! `stockdesk-auth` — identity and authorization model of the client.
//!
//! No HTTP and no storage here. The crate defines the principal, the
//! credential encoding, and the pure role predicates that guards use.

pub mod accounts;
pub mod authorize;
pub mod credentials;
pub mod principal;
pub mod roles;

pub use accounts::NewUser;
pub use authorize::{AuthzError, RoleRequirement, has_any_role, has_role};
pub use credentials::{CredentialToken, LoginRequest, RegisterRequest, TokenError};
pub use principal::{Principal, PrincipalId, UserStatus};
pub use roles::{Role, RoleName};
