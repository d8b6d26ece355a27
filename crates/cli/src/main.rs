//! Tienda CLI - command-line storefront for the Tienda API.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! tienda products
//! tienda products --search widget
//!
//! # Sign in and fill the cart
//! tienda login -e ana@example.com -p secret
//! tienda cart add 7 --quantity 2
//! tienda cart show
//!
//! # Preview, review, confirm
//! tienda checkout --address "Main 123"
//!
//! # Order history and documents
//! tienda orders
//! tienda orders invoice 55
//! ```
//!
//! Configuration comes from the environment (`TIENDA_API_URL`, optional
//! `TIENDA_SESSION_FILE`); see `tienda_client::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]
// stdout is the user surface of this binary
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tienda_client::config::ClientConfig;
use tienda_client::state::AppState;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "tienda")]
#[command(version, about = "Command-line storefront for the Tienda API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Shipping address to save on the profile
        #[arg(short, long)]
        address: String,
    },
    /// Sign in
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in profile
    Profile,
    /// List the catalog
    Products {
        /// Filter by name or description
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Preview and confirm an order
    Checkout {
        /// Shipping address (defaults to the profile address)
        #[arg(short, long)]
        address: Option<String>,

        /// Confirm without prompting
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Order history and documents
    Orders {
        #[command(subcommand)]
        action: Option<OrdersAction>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        /// Product id
        product_id: i64,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 removes the line)
    Update {
        /// Product id
        product_id: i64,

        /// New quantity
        quantity: u32,
    },
    /// Remove a product
    Remove {
        /// Product id
        product_id: i64,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List past orders
    List,
    /// Show one order in detail
    Details {
        /// Order id
        order_id: i64,
    },
    /// Download one order's invoice
    Invoice {
        /// Order id
        order_id: i64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let mut app = AppState::load(config)?;

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
            address,
        } => commands::auth::register(&mut app, &name, &email, &password, &address).await?,
        Commands::Login { email, password } => {
            commands::auth::login(&mut app, &email, &password).await?;
        }
        Commands::Logout => commands::auth::logout(&mut app)?,
        Commands::Profile => commands::auth::profile(&mut app).await?,
        Commands::Products { search } => {
            commands::products::list(&app, search.as_deref()).await?;
        }
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&app).await?,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&app, product_id, quantity).await?,
            CartAction::Update {
                product_id,
                quantity,
            } => commands::cart::update(&app, product_id, quantity).await?,
            CartAction::Remove { product_id } => {
                commands::cart::remove(&app, product_id).await?;
            }
        },
        Commands::Checkout { address, yes } => {
            commands::checkout::run(&app, address.as_deref(), yes).await?;
        }
        Commands::Orders { action } => match action.unwrap_or(OrdersAction::List) {
            OrdersAction::List => commands::orders::list(&app).await?,
            OrdersAction::Details { order_id } => commands::orders::details(&app, order_id).await?,
            OrdersAction::Invoice { order_id } => commands::orders::invoice(&app, order_id).await?,
        },
    }

    Ok(())
}
