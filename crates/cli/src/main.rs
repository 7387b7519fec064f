//! Marketplace CLI - operator and developer tools.
//!
//! # Usage
//!
//! ```bash
//! # How would the proxy treat a path?
//! mkt route /messages
//! mkt route /t/new --session
//!
//! # Work with a local cart
//! mkt cart add p1 --name "Desk lamp" --price 24.99 --quantity 2
//! mkt cart set p1 5
//! mkt cart show
//!
//! # Call a backend function (needs BACKEND_URL)
//! mkt call forum.getLeaderboard --args '{"limit": 5}'
//! mkt call admin.approveProduct --mutation --args '{"productId": "p1"}' --token "$JWT"
//!
//! # Follow a query as it changes
//! mkt watch categories.list
//! ```
//!
//! # Commands
//!
//! - `route` - Classify a path and show the proxy decision
//! - `cart` - Show and edit a cart stored in a local directory
//! - `call` - Run a backend query or mutation
//! - `watch` - Poll a backend query and print each change

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use marketplace_gateway::backend::Credentials;
use rust_decimal::Decimal;

mod commands;
mod storage;

#[derive(Parser)]
#[command(name = "mkt")]
#[command(author, version, about = "Marketplace CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how the page proxy treats a path
    Route {
        /// Request path, e.g. /messages
        path: String,

        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Pretend the session cookie is present
        #[arg(short, long)]
        session: bool,
    },
    /// Show and edit a local cart
    Cart {
        /// Directory the cart is stored in
        #[arg(long, default_value = ".marketplace")]
        store: PathBuf,

        #[command(subcommand)]
        action: CartAction,
    },
    /// Call a backend function
    Call {
        /// Dotted function name, e.g. forum.getLeaderboard
        function: String,

        /// JSON object of arguments
        #[arg(short, long, default_value = "{}")]
        args: String,

        /// Run as a mutation instead of a query
        #[arg(long)]
        mutation: bool,

        /// User auth token to call with
        #[arg(short, long, conflicts_with = "deployment")]
        token: Option<String>,

        /// Call with the deployment key (BACKEND_DEPLOY_KEY)
        #[arg(long)]
        deployment: bool,
    },
    /// Poll a backend query and print each change
    Watch {
        /// Dotted function name
        function: String,

        /// JSON object of arguments
        #[arg(short, long, default_value = "{}")]
        args: String,

        /// User auth token to call with
        #[arg(short, long)]
        token: Option<String>,

        /// Seconds between polls
        #[arg(short, long, default_value = "2")]
        interval: u64,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart and its totals
    Show,
    /// Add a product
    Add {
        /// Product ID
        id: String,

        /// Product name
        #[arg(short, long)]
        name: String,

        /// Unit price, e.g. 24.99
        #[arg(short, long)]
        price: Decimal,

        /// How many to add
        #[arg(short, long, default_value = "1")]
        quantity: u32,

        /// Seller ID
        #[arg(long)]
        seller: Option<String>,
    },
    /// Remove a product
    Remove {
        /// Product ID
        id: String,
    },
    /// Set a product's quantity (0 removes it)
    Set {
        /// Product ID
        id: String,

        /// New quantity
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Route {
            path,
            method,
            session,
        } => commands::route::show(&path, &method, session),
        Commands::Cart { store, action } => {
            let mut cart = commands::cart::open(&store);
            match action {
                CartAction::Show => {}
                CartAction::Add {
                    id,
                    name,
                    price,
                    quantity,
                    seller,
                } => commands::cart::add(&mut cart, id, name, price, quantity, seller)?,
                CartAction::Remove { id } => commands::cart::remove(&mut cart, &id),
                CartAction::Set { id, quantity } => commands::cart::set(&mut cart, &id, quantity),
                CartAction::Clear => cart.clear_cart(),
            }
            commands::cart::print(&cart);
        }
        Commands::Call {
            function,
            args,
            mutation,
            token,
            deployment,
        } => {
            let credentials = if deployment {
                Credentials::Deployment
            } else {
                Credentials::from_token(token.as_deref())
            };
            commands::call::call(&function, &args, mutation, credentials).await?;
        }
        Commands::Watch {
            function,
            args,
            token,
            interval,
        } => commands::call::watch(function, &args, token, interval).await?,
    }
    Ok(())
}
