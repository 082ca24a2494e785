//! Command-line front end. Each domain command is a "view": it opens the
//! page's route through the guard before calling the API.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use stockdesk_auth::{NewUser, RegisterRequest, UserStatus};
use stockdesk_core::{CategoryId, ProductId, SupplierId, UserId};
use stockdesk_inventory::{
    CategoryDraft, ProductDraft, ProductFilters, SortField, SortOrder, SupplierDraft,
};

use crate::app::App;
use crate::config::ClientConfig;
use crate::navigation::Location;
use crate::routes::{Page, Resolution};
use crate::session::AuthError;

#[derive(Debug, Parser)]
#[command(name = "stockdesk")]
#[command(about = "Inventory administration client")]
#[command(version)]
pub struct Cli {
    /// Base URL of the inventory API
    #[arg(long, global = true, env = "STOCKDESK_API_URL")]
    pub api_url: Option<String>,

    /// Session file path
    #[arg(long, global = true, env = "STOCKDESK_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Keep the session in memory only (nothing is persisted)
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and persist the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "STOCKDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account, then log in
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "STOCKDESK_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        full_name: String,

        #[arg(long, default_value = "USER")]
        role: String,
    },

    /// Clear the current session
    Logout,

    /// Show the current principal
    Whoami,

    /// Resolve a location through the route table
    Open { path: String },

    /// Navigation entries visible to the current principal
    Menu,

    /// Inventory statistics
    Dashboard,

    #[command(subcommand)]
    Products(ProductCommand),

    #[command(subcommand)]
    Categories(CategoryCommand),

    #[command(subcommand)]
    Suppliers(SupplierCommand),

    #[command(subcommand)]
    Users(UserCommand),
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    category: Option<CategoryId>,
    #[arg(long)]
    supplier: Option<SupplierId>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    #[arg(long)]
    min_quantity: Option<i64>,
    #[arg(long)]
    max_quantity: Option<i64>,
    /// Sort by name, price, quantity or created.
    #[arg(long)]
    sort_by: Option<SortField>,
    /// asc or desc.
    #[arg(long)]
    order: Option<SortOrder>,
    /// 1-based page of the filtered list.
    #[arg(long)]
    page: Option<usize>,
    /// Rows per page (default 10).
    #[arg(long)]
    limit: Option<usize>,
}

impl From<FilterArgs> for ProductFilters {
    fn from(args: FilterArgs) -> Self {
        Self {
            search: args.search,
            category_id: args.category,
            supplier_id: args.supplier,
            min_price: args.min_price,
            max_price: args.max_price,
            min_quantity: args.min_quantity,
            max_quantity: args.max_quantity,
            sort_by: args.sort_by,
            sort_order: args.order,
            page: args.page,
            limit: args.limit,
        }
    }
}

/// Product form fields; on update, unset fields keep their current value.
#[derive(Debug, Args)]
pub struct ProductArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    quantity: Option<i64>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    category: Option<CategoryId>,
    #[arg(long)]
    supplier: Option<SupplierId>,
}

impl ProductArgs {
    fn apply(self, mut draft: ProductDraft) -> ProductDraft {
        if let Some(v) = self.name {
            draft.name = v;
        }
        if let Some(v) = self.description {
            draft.description = v;
        }
        if let Some(v) = self.quantity {
            draft.available_quantity = v;
        }
        if let Some(v) = self.price {
            draft.unit_price = v;
        }
        if self.category.is_some() {
            draft.category_id = self.category;
        }
        if self.supplier.is_some() {
            draft.supplier_id = self.supplier;
        }
        draft
    }
}

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    List(FilterArgs),
    Get { id: ProductId },
    Create(ProductArgs),
    Update {
        id: ProductId,
        #[command(flatten)]
        fields: ProductArgs,
    },
    Delete { id: ProductId },
}

#[derive(Debug, Args)]
pub struct CategoryArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

impl CategoryArgs {
    fn apply(self, mut draft: CategoryDraft) -> CategoryDraft {
        if let Some(v) = self.name {
            draft.name = v;
        }
        if let Some(v) = self.description {
            draft.description = v;
        }
        draft
    }
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    List,
    Get { id: CategoryId },
    Create(CategoryArgs),
    Update {
        id: CategoryId,
        #[command(flatten)]
        fields: CategoryArgs,
    },
    Delete { id: CategoryId },
}

#[derive(Debug, Args)]
pub struct SupplierArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    company_info: Option<String>,
}

impl SupplierArgs {
    fn apply(self, mut draft: SupplierDraft) -> SupplierDraft {
        if let Some(v) = self.name {
            draft.name = v;
        }
        if let Some(v) = self.email {
            draft.email = v;
        }
        if let Some(v) = self.phone {
            draft.phone = v;
        }
        if let Some(v) = self.address {
            draft.address = v;
        }
        if self.company_info.is_some() {
            draft.company_info = self.company_info;
        }
        draft
    }
}

#[derive(Debug, Subcommand)]
pub enum SupplierCommand {
    List,
    Create(SupplierArgs),
    Update {
        id: SupplierId,
        #[command(flatten)]
        fields: SupplierArgs,
    },
    Delete { id: SupplierId },
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    List,
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, env = "STOCKDESK_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "USER")]
        role: String,
        #[arg(long, default_value = "ACTIVE")]
        status: UserStatus,
    },
    /// Change an account's status (ACTIVE, INACTIVE, SUSPENDED)
    Status { id: UserId, status: UserStatus },
    Delete { id: UserId },
}

impl Cli {
    /// Environment configuration with flag overrides applied.
    pub fn config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = ClientConfig::from_env().context("invalid client configuration")?;
        if let Some(url) = &self.api_url {
            config = config.with_api_url(url.as_str())?;
        }
        if let Some(path) = &self.session_file {
            config = config.with_session_file(Some(path.clone()));
        }
        if self.ephemeral {
            config = config.with_session_file(None);
        }
        Ok(config)
    }
}

fn emit<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn auth_failure(err: AuthError) -> anyhow::Error {
    match err {
        AuthError::InvalidCredentials => anyhow::anyhow!("Invalid email or password"),
        AuthError::Api(e) => anyhow::anyhow!(e.user_message()),
        other => anyhow::Error::new(other),
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config()?;
    let app = App::bootstrap(&config).context("failed to build HTTP client")?;

    match cli.command {
        Command::Login { email, password } => {
            let (principal, destination) =
                app.login(&email, &password).await.map_err(auth_failure)?;
            emit(&serde_json::json!({ "principal": principal, "location": destination }))
        }
        Command::Register {
            email,
            password,
            full_name,
            role,
        } => {
            let request = RegisterRequest {
                email,
                password,
                full_name,
                role_name: role,
            };
            let (principal, destination) = app.register(&request).await.map_err(auth_failure)?;
            emit(&serde_json::json!({ "principal": principal, "location": destination }))
        }
        Command::Logout => app
            .logout()
            .context("logged out, but the saved session could not be removed"),
        Command::Whoami => match app.session.current_principal() {
            Some(principal) => emit(&principal),
            None => bail!("not logged in"),
        },
        Command::Open { path } => {
            let resolution = app.open(Location::parse(&path));
            emit(&resolution)?;
            match resolution {
                Resolution::NotFound { path } => bail!("page not found: {path}"),
                _ => Ok(()),
            }
        }
        Command::Menu => emit(&app.menu()),
        Command::Dashboard => {
            app.enter(Page::Dashboard)?;
            emit(&app.inventory.dashboard().await.map_err(service_failure)?)
        }
        Command::Products(cmd) => products(&app, cmd).await,
        Command::Categories(cmd) => categories(&app, cmd).await,
        Command::Suppliers(cmd) => suppliers(&app, cmd).await,
        Command::Users(cmd) => users(&app, cmd).await,
    }
}

fn service_failure(err: crate::services::ServiceError) -> anyhow::Error {
    anyhow::anyhow!(err.user_message())
}

async fn products(app: &App, cmd: ProductCommand) -> anyhow::Result<()> {
    app.enter(Page::Products)?;
    let svc = &app.inventory;
    match cmd {
        ProductCommand::List(filters) => {
            let filters = ProductFilters::from(filters);
            let loaded = svc.list_products(&filters).await.map_err(service_failure)?;
            // Re-apply locally in case the server ignored the query.
            emit(&filters.view(&loaded))
        }
        ProductCommand::Get { id } => emit(&svc.get_product(&id).await.map_err(service_failure)?),
        ProductCommand::Create(fields) => {
            let draft = fields.apply(ProductDraft::default());
            emit(&svc.create_product(&draft).await.map_err(service_failure)?)
        }
        ProductCommand::Update { id, fields } => {
            let current = svc.get_product(&id).await.map_err(service_failure)?;
            let draft = fields.apply(ProductDraft::from(&current));
            emit(&svc.update_product(&id, &draft).await.map_err(service_failure)?)
        }
        ProductCommand::Delete { id } => svc.delete_product(&id).await.map_err(service_failure),
    }
}

async fn categories(app: &App, cmd: CategoryCommand) -> anyhow::Result<()> {
    app.enter(Page::Categories)?;
    let svc = &app.inventory;
    match cmd {
        CategoryCommand::List => emit(&svc.list_categories().await.map_err(service_failure)?),
        CategoryCommand::Get { id } => emit(&svc.get_category(id).await.map_err(service_failure)?),
        CategoryCommand::Create(fields) => {
            let draft = fields.apply(CategoryDraft::default());
            emit(&svc.create_category(&draft).await.map_err(service_failure)?)
        }
        CategoryCommand::Update { id, fields } => {
            let current = svc.get_category(id).await.map_err(service_failure)?;
            let draft = fields.apply(CategoryDraft::from(&current));
            emit(&svc.update_category(id, &draft).await.map_err(service_failure)?)
        }
        CategoryCommand::Delete { id } => svc.delete_category(id).await.map_err(service_failure),
    }
}

async fn suppliers(app: &App, cmd: SupplierCommand) -> anyhow::Result<()> {
    app.enter(Page::Suppliers)?;
    let svc = &app.inventory;
    match cmd {
        SupplierCommand::List => emit(&svc.list_suppliers().await.map_err(service_failure)?),
        SupplierCommand::Create(fields) => {
            let draft = fields.apply(SupplierDraft::default());
            emit(&svc.create_supplier(&draft).await.map_err(service_failure)?)
        }
        SupplierCommand::Update { id, fields } => {
            // There is no single-supplier endpoint; start from the listed record.
            let current = svc
                .list_suppliers()
                .await
                .map_err(service_failure)?
                .into_iter()
                .find(|s| s.id == id)
                .with_context(|| format!("supplier {id} not found"))?;
            let draft = fields.apply(SupplierDraft::from(&current));
            emit(&svc.update_supplier(&id, &draft).await.map_err(service_failure)?)
        }
        SupplierCommand::Delete { id } => svc.delete_supplier(&id).await.map_err(service_failure),
    }
}

async fn users(app: &App, cmd: UserCommand) -> anyhow::Result<()> {
    app.enter(Page::Users)?;
    let svc = &app.users;
    match cmd {
        UserCommand::List => emit(&svc.list().await.map_err(service_failure)?),
        UserCommand::Create {
            email,
            full_name,
            password,
            role,
            status,
        } => {
            let user = NewUser {
                email,
                full_name,
                password,
                role_name: role,
                status,
            };
            emit(&svc.create(&user).await.map_err(service_failure)?)
        }
        UserCommand::Status { id, status } => {
            emit(&svc.update_status(id, &status).await.map_err(service_failure)?)
        }
        UserCommand::Delete { id } => svc.delete(id).await.map_err(service_failure),
    }
}
