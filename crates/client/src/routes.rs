//! Route table, navigation menu, and per-navigation resolution.

use serde::Serialize;

use stockdesk_auth::{Principal, RoleName, RoleRequirement};

use crate::guard::{GuardDecision, RouteGuard};
use crate::navigation::{LoginRedirect, Location};
use crate::session::SessionPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Page {
    Home,
    About,
    Login,
    Dashboard,
    Profile,
    Products,
    Categories,
    Suppliers,
    Users,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::About => "About",
            Page::Login => "Sign in",
            Page::Dashboard => "Dashboard",
            Page::Profile => "Profile",
            Page::Products => "Products",
            Page::Categories => "Categories",
            Page::Suppliers => "Suppliers",
            Page::Users => "Users",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Roles(RoleRequirement),
}

impl Access {
    fn guard(&self) -> Option<RouteGuard> {
        match self {
            Access::Public => None,
            Access::Authenticated => Some(RouteGuard::authenticated()),
            Access::Roles(requirement) => Some(RouteGuard::requiring(requirement.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub page: Page,
    pub access: Access,
}

/// What to do for one navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Resolution {
    Render { page: Page },
    Pending,
    LoginRequired { redirect: LoginRedirect },
    Forbidden { page: Page, message: String },
    /// Navigate elsewhere without rendering (e.g. `/auth` while logged in).
    Redirect { to: Location },
    NotFound { path: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuEntry {
    pub page: Page,
    pub path: &'static str,
    pub title: &'static str,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

fn managers() -> RoleRequirement {
    RoleRequirement::any([RoleName::ADMIN, RoleName::MANAGER])
}

impl RouteTable {
    /// The application's routes.
    pub fn standard() -> Self {
        let route = |path, page, access| Route { path, page, access };
        Self {
            routes: vec![
                route("/", Page::Home, Access::Public),
                route("/about", Page::About, Access::Public),
                route("/auth", Page::Login, Access::Public),
                route("/dashboard", Page::Dashboard, Access::Authenticated),
                route("/profile", Page::Profile, Access::Authenticated),
                route("/products", Page::Products, Access::Roles(managers())),
                route("/categories", Page::Categories, Access::Roles(managers())),
                route("/suppliers", Page::Suppliers, Access::Roles(managers())),
                route(
                    "/users",
                    Page::Users,
                    Access::Roles(RoleRequirement::all([RoleName::ADMIN])),
                ),
            ],
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn find(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.path == path)
    }

    pub fn route_for(&self, page: Page) -> Option<&Route> {
        self.routes.iter().find(|r| r.page == page)
    }

    pub fn resolve(
        &self,
        phase: SessionPhase,
        principal: Option<&Principal>,
        location: &Location,
    ) -> Resolution {
        let Some(route) = self.find(&location.path) else {
            return Resolution::NotFound {
                path: location.path.clone(),
            };
        };

        if route.page == Page::Login && !phase.is_pending() && principal.is_some() {
            return Resolution::Redirect { to: Location::dashboard() };
        }

        let Some(guard) = route.access.guard() else {
            return Resolution::Render { page: route.page };
        };

        match guard.evaluate(phase, principal, location) {
            GuardDecision::Pending => Resolution::Pending,
            GuardDecision::Authorized => Resolution::Render { page: route.page },
            GuardDecision::Unauthenticated { redirect } => Resolution::LoginRequired { redirect },
            GuardDecision::Forbidden { message, .. } => Resolution::Forbidden {
                page: route.page,
                message,
            },
        }
    }

    /// Menu entries visible to `principal`. Empty when logged out.
    pub fn menu(&self, principal: Option<&Principal>) -> Vec<MenuEntry> {
        if principal.is_none() {
            return Vec::new();
        }
        const MENU: [Page; 5] = [
            Page::Dashboard,
            Page::Products,
            Page::Categories,
            Page::Suppliers,
            Page::Users,
        ];
        MENU.iter()
            .filter_map(|page| self.route_for(*page))
            .filter(|route| match &route.access {
                Access::Public | Access::Authenticated => true,
                Access::Roles(requirement) => requirement.is_satisfied_by(principal),
            })
            .map(|route| MenuEntry {
                page: route.page,
                path: route.path,
                title: route.page.title(),
            })
            .collect()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}
