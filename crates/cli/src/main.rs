//! Shopfront CLI - The storefront in a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in and browse the catalog
//! shopfront login -u sam -p secret
//! shopfront products --search lamp
//!
//! # Build a cart and place an order
//! shopfront cart add 42
//! shopfront checkout --full-name "Sam Doe" --address "1 Main St" \
//!     --city Springfield --state IL --zip-code 62704 --country US
//!
//! # Merchant tools (requires an admin account)
//! shopfront admin add-product --title "Desk Lamp" --price 49.50 --category 7
//! shopfront admin stats
//! ```
//!
//! # Commands
//!
//! - `login` / `signup` / `logout` / `whoami` - Session management
//! - `products` / `product` - Browse the catalog
//! - `cart` - Manage the persisted cart
//! - `checkout` - Place an order from the cart
//! - `orders` - Order history
//! - `admin` - Merchant product management and dashboard

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopfront_client::guard::AccessPolicy;
use shopfront_client::{ClientConfig, Store};
use shopfront_core::OrderStatus;

mod commands;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront command-line storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with username and password
    Login {
        /// Account username
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Register a new account and sign in
    Signup {
        /// Account username
        #[arg(short, long)]
        username: String,

        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        /// Register a merchant account instead of a customer one
        #[arg(long)]
        merchant: bool,
    },
    /// Sign out and drop the stored credentials
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List catalog products
    Products {
        /// Case-insensitive title/description filter
        #[arg(short, long)]
        search: Option<String>,

        /// Show only products in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product
    Product {
        /// Product id
        id: String,
    },
    /// Manage the persisted cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order from the current cart
    Checkout(commands::orders::CheckoutArgs),
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Merchant tools
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart lines and total
    Show,
    /// Add one unit of a product (fetched by id)
    Add {
        /// Product id
        id: String,
    },
    /// Remove a line
    Remove {
        /// Product id
        id: String,
    },
    /// Set a line quantity exactly (0 removes the line)
    Set {
        /// Product id
        id: String,

        /// New quantity
        quantity: u32,
    },
    /// Remove every line
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List the order history
    List,
    /// Update an order status in the current view
    SetStatus {
        /// Order id
        id: String,

        /// New status (`pending`, `processing`, `shipped`, `delivered`, `cancelled`)
        status: OrderStatus,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List your products
    Products,
    /// Create a product
    AddProduct(commands::admin::ProductArgs),
    /// Update a product (every field is sent)
    UpdateProduct {
        /// Product id
        id: String,

        #[command(flatten)]
        args: commands::admin::ProductArgs,
    },
    /// Delete a product
    DeleteProduct {
        /// Product id
        id: String,
    },
    /// List the product categories
    Categories,
    /// Show the merchant dashboard
    Stats,
}

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront=info,shopfront_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open(ClientConfig::from_env()?)?;
    // Pick up a previously signed-in session, if one was persisted.
    let _ = store.auth().restore();

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&store, &username, &password).await?;
        }
        Commands::Signup {
            username,
            email,
            password,
            merchant,
        } => {
            commands::auth::signup(&store, &username, &email, &password, merchant).await?;
        }
        Commands::Logout => commands::auth::logout(&store)?,
        Commands::Whoami => commands::auth::whoami(&store),
        Commands::Products { search, category } => {
            commands::catalog::list(&store, search, category).await?;
        }
        Commands::Product { id } => commands::catalog::show(&store, &id).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&store),
            CartAction::Add { id } => commands::cart::add(&store, &id).await?,
            CartAction::Remove { id } => commands::cart::remove(&store, &id)?,
            CartAction::Set { id, quantity } => commands::cart::set(&store, &id, quantity)?,
            CartAction::Clear => commands::cart::clear(&store)?,
        },
        Commands::Checkout(args) => {
            commands::ensure_access(&store, AccessPolicy::Authenticated)?;
            commands::orders::checkout(&store, args)?;
        }
        Commands::Orders { action } => match action {
            OrdersAction::List => {
                commands::ensure_access(&store, AccessPolicy::Authenticated)?;
                commands::orders::list(&store)?;
            }
            // Changing an order status is a merchant action.
            OrdersAction::SetStatus { id, status } => {
                commands::ensure_access(&store, AccessPolicy::AdminOnly)?;
                commands::orders::set_status(&store, &id, status)?;
            }
        },
        Commands::Admin { action } => {
            commands::ensure_access(&store, AccessPolicy::AdminOnly)?;
            match action {
                AdminAction::Products => commands::admin::products(&store).await?,
                AdminAction::AddProduct(args) => {
                    commands::admin::add_product(&store, args).await?;
                }
                AdminAction::UpdateProduct { id, args } => {
                    commands::admin::update_product(&store, &id, args).await?;
                }
                AdminAction::DeleteProduct { id } => {
                    commands::admin::delete_product(&store, &id).await?;
                }
                AdminAction::Categories => commands::admin::categories(&store).await?,
                AdminAction::Stats => commands::admin::stats(&store).await?,
            }
        }
    }
    Ok(())
}
