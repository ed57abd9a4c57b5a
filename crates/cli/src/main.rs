//! Storefront Kit CLI - Render pages and drive the storefront from a shell.
//!
//! # Usage
//!
//! ```bash
//! # Check the environment configuration
//! sfk config check
//!
//! # Render a page with data-shopify bindings
//! sfk render page.html --out rendered.html
//!
//! # Browse the catalog
//! sfk product --handle classic-tee
//! sfk collection Shirts --limit 5
//! sfk search "linen" --limit 3
//!
//! # Work with the cart and check out
//! sfk cart add gid://shopify/ProductVariant/123 --quantity 2
//! sfk cart show
//! sfk checkout
//!
//! # Inspect or clear the response cache
//! sfk cache stats
//! sfk cache clear search
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPIFY_DOMAIN` - Store domain (`your-store.myshopify.com`)
//! - `STOREFRONT_TOKEN` - Storefront API access token
//! - `API_VERSION` - Storefront API version (default `2023-04`)
//! - `CACHE_TTL` - Cache time-to-live in milliseconds (default 300000)
//! - `STOREFRONT_KIT_DATA_DIR` - Where the cart and cache are persisted
//! - `RUST_LOG` - Log filter

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "sfk")]
#[command(author, version, about = "Storefront kit command-line tools")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Render a static HTML page, resolving every data-shopify binding
    Render {
        /// Page to render
        page: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Fetch one product
    Product(ProductArgs),
    /// List collections
    Collections,
    /// List the products of a collection
    Collection {
        /// Collection title
        name: String,

        /// Maximum number of products
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Search products
    Search {
        /// Search term
        term: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Create a remote cart and print the checkout URL
    Checkout {
        /// Reuse the remote cart created by the last checkout if it still exists
        #[arg(long)]
        existing: bool,
    },
    /// Inspect or clear the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate the environment configuration
    Check,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ProductArgs {
    /// Product handle
    #[arg(long)]
    handle: Option<String>,

    /// Product GID
    #[arg(long)]
    id: Option<String>,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a variant
    Add {
        /// Variant GID
        variant_id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a variant's line
    Remove {
        /// Variant GID
        variant_id: String,
    },
    /// Set a line's quantity (0 removes it)
    Update {
        /// Variant GID
        variant_id: String,

        quantity: u32,
    },
    /// Empty the cart
    Clear,
    /// Print the cart lines
    List,
    /// Print the total item count
    Count,
    /// Print the cart lines joined with live variant data
    Show,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Print entry counts per partition
    Stats,
    /// Clear one partition, or all of them
    Clear {
        /// `productById`, `productByHandle`, `collections`, `search` or `collectionsList`
        partition: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli.command).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storefront_kit=info,storefront_kit_cli=info".into());

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Config { action } => match action {
            ConfigAction::Check => commands::config::check()?,
        },
        Commands::Render { page, out } => commands::render::page(&page, out.as_deref()).await?,
        Commands::Product(ProductArgs { handle, id }) => {
            commands::catalog::product(handle.as_deref(), id.as_deref()).await?;
        }
        Commands::Collections => commands::catalog::collections().await?,
        Commands::Collection { name, limit } => commands::catalog::collection(&name, limit).await?,
        Commands::Search { term, limit } => commands::catalog::search(&term, limit).await?,
        Commands::Cart { action } => match action {
            CartAction::Add {
                variant_id,
                quantity,
            } => commands::cart::add(&variant_id, quantity)?,
            CartAction::Remove { variant_id } => commands::cart::remove(&variant_id)?,
            CartAction::Update {
                variant_id,
                quantity,
            } => commands::cart::update(&variant_id, quantity)?,
            CartAction::Clear => commands::cart::clear()?,
            CartAction::List => commands::cart::list()?,
            CartAction::Count => commands::cart::count()?,
            CartAction::Show => commands::cart::show().await?,
        },
        Commands::Checkout { existing } => commands::checkout::run(existing).await?,
        Commands::Cache { action } => match action {
            CacheAction::Stats => commands::cache::stats()?,
            CacheAction::Clear { partition } => commands::cache::clear(partition.as_deref())?,
        },
    }
    Ok(())
}
