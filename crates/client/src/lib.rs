//! `stockdesk-client`: session, navigation guard, and HTTP facade of the
//! inventory admin client, plus the services and CLI built on them.

pub mod app;
pub mod cli;
pub mod config;
pub mod guard;
pub mod http;
pub mod navigation;
pub mod routes;
pub mod services;
pub mod session;
pub mod storage;

pub use app::{AccessError, App};
pub use config::{ClientConfig, ConfigError};
pub use guard::{GuardDecision, RouteGuard};
pub use http::{ApiClient, ApiError};
pub use navigation::{History, LoginRedirect, Location, NavigationTicket, Navigator};
pub use routes::{Page, Resolution, RouteTable};
pub use services::{InventoryService, ServiceError, UserService};
pub use session::{AuthError, AuthGateway, SessionPhase, SessionSnapshot, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
