//! Route guard: decides whether a protected view may render.

use serde::Serialize;

use stockdesk_auth::{Principal, RoleRequirement};

use crate::navigation::{LoginRedirect, Location};
use crate::session::{SessionPhase, SessionStore};

/// Outcome of evaluating a guard for one navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "camelCase")]
pub enum GuardDecision {
    /// Session restore or login still in flight; render a loading state.
    Pending,
    Authorized,
    /// No principal: send the user to the login entry point.
    Unauthenticated { redirect: LoginRedirect },
    /// Authenticated but lacking the required role. Rendered in place,
    /// never a redirect.
    Forbidden {
        requirement: RoleRequirement,
        message: String,
    },
}

impl GuardDecision {
    pub fn is_authorized(&self) -> bool {
        matches!(self, GuardDecision::Authorized)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteGuard {
    requirement: Option<RoleRequirement>,
}

impl RouteGuard {
    /// Any authenticated principal passes.
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn requiring(requirement: RoleRequirement) -> Self {
        Self {
            requirement: Some(requirement),
        }
    }

    pub fn requirement(&self) -> Option<&RoleRequirement> {
        self.requirement.as_ref()
    }

    pub fn evaluate(
        &self,
        phase: SessionPhase,
        principal: Option<&Principal>,
        requested: &Location,
    ) -> GuardDecision {
        if phase.is_pending() {
            return GuardDecision::Pending;
        }
        let Some(principal) = principal else {
            return GuardDecision::Unauthenticated {
                redirect: LoginRedirect::new(requested.clone()),
            };
        };
        match &self.requirement {
            Some(requirement) if !requirement.is_satisfied_by(Some(principal)) => {
                tracing::debug!(
                    principal = %principal.id,
                    role = %principal.role.name,
                    required = %requirement.describe(),
                    path = %requested,
                    "access denied"
                );
                GuardDecision::Forbidden {
                    requirement: requirement.clone(),
                    message: forbidden_message(requirement),
                }
            }
            _ => GuardDecision::Authorized,
        }
    }

    /// Evaluate against the live session store.
    pub fn evaluate_session(&self, session: &SessionStore, requested: &Location) -> GuardDecision {
        self.evaluate(session.phase(), session.current_principal().as_ref(), requested)
    }
}

pub fn forbidden_message(requirement: &RoleRequirement) -> String {
    format!(
        "You don't have permission to access this page. Required roles: {}",
        requirement.describe()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::LOGIN_PATH;
    use crate::session::tests::principal;

    fn products() -> Location {
        Location::parse("/products?search=drill")
    }

    #[test]
    fn pending_phases_defer_the_decision() {
        let guard = RouteGuard::authenticated();
        let admin = principal("admin@x.com", "ADMIN");
        for phase in [SessionPhase::Restoring, SessionPhase::Authenticating] {
            assert_eq!(guard.evaluate(phase, Some(&admin), &products()), GuardDecision::Pending);
        }
    }

    #[test]
    fn no_requirement_renders_for_any_principal() {
        let guard = RouteGuard::authenticated();
        let user = principal("u@x.com", "USER");
        assert!(guard.evaluate(SessionPhase::Ready, Some(&user), &products()).is_authorized());
    }

    #[test]
    fn missing_principal_redirects_with_attempted_location() {
        let guard = RouteGuard::requiring(RoleRequirement::any(["ADMIN", "MANAGER"]));
        match guard.evaluate(SessionPhase::Ready, None, &products()) {
            GuardDecision::Unauthenticated { redirect } => {
                assert_eq!(redirect.to.path, LOGIN_PATH);
                assert_eq!(redirect.from, products());
            }
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn wrong_role_is_forbidden_not_redirected() {
        let guard = RouteGuard::requiring(RoleRequirement::all(["ADMIN"]));
        let manager = principal("m@x.com", "MANAGER");
        match guard.evaluate(SessionPhase::Ready, Some(&manager), &Location::parse("/users")) {
            GuardDecision::Forbidden { message, .. } => {
                assert_eq!(
                    message,
                    "You don't have permission to access this page. Required roles: ADMIN"
                );
            }
            other => panic!("expected forbidden, got {other:?}"),
        }
    }

    #[test]
    fn any_requirement_accepts_either_role() {
        let guard = RouteGuard::requiring(RoleRequirement::any(["ADMIN", "MANAGER"]));
        let manager = principal("m@x.com", "MANAGER");
        assert!(guard.evaluate(SessionPhase::Ready, Some(&manager), &products()).is_authorized());
        let user = principal("u@x.com", "USER");
        assert!(matches!(
            guard.evaluate(SessionPhase::Ready, Some(&user), &products()),
            GuardDecision::Forbidden { .. }
        ));
    }
}
