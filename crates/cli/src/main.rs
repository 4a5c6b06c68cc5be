//! Lumina CLI - a terminal storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! lumina products --category Electronics --search key
//!
//! # Show a product with its reviews
//! lumina product 3
//!
//! # Sign in; the session is resumed by later invocations
//! lumina login -e ada@example.com -p hunter22
//!
//! # Fill the cart and check out
//! lumina cart add 3
//! lumina checkout --address "1 Via Roma" --city Torino --postal-code 10121
//! ```
//!
//! # Commands
//!
//! - `products`, `product`, `review` - Catalog
//! - `login`, `register`, `logout`, `whoami` - Session
//! - `cart` - Show and edit the cart
//! - `wishlist` - Show and toggle wishlist entries
//! - `checkout` - Place an order for the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use lumina_storefront::AppError;
use lumina_storefront::config::StorefrontConfig;
use lumina_storefront::details::DEFAULT_REVIEW_RATING;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "lumina")]
#[command(author, version, about = "Lumina terminal storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only show products whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one product with its reviews
    Product {
        /// Product ID
        id: String,
    },
    /// Review a product as the signed-in user
    Review {
        /// Product ID
        id: String,

        /// Star rating (1-5)
        #[arg(short, long, default_value_t = DEFAULT_REVIEW_RATING)]
        rating: u8,

        /// Review text
        #[arg(short, long)]
        comment: String,
    },
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Sign out, clearing the cart and wishlist
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show and edit the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Show and edit the wishlist
    Wishlist {
        #[command(subcommand)]
        action: Option<WishlistAction>,
    },
    /// Place an order for the cart
    Checkout {
        #[arg(long)]
        address: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        postal_code: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add { id: String },
    /// Remove a product's line
    Remove { id: String },
    /// Set a line's quantity; 0 removes it
    Set {
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show the wishlist
    Show,
    /// Add or remove a product
    Toggle { id: String },
    /// Reload the signed-in wishlist from the service
    Refresh,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Map tracing levels to Sentry: warnings and errors become events, the rest
/// breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lumina_storefront=info,lumina_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let e = AppError::from(e);
            e.report();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    let _sentry_guard = init_sentry(&config);

    if let Err(e) = run(cli, &config).await {
        if let CliError::App(app) = &e {
            app.report();
        }
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), CliError> {
    let mut storefront = lumina_storefront::Storefront::from_config(config).await;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = match cli.command {
        Commands::Products { category, search } => {
            commands::catalog::list(&storefront, &mut out, category.as_deref(), search.as_deref())
                .await
        }
        Commands::Product { id } => commands::catalog::show(&storefront, &mut out, &id).await,
        Commands::Review {
            id,
            rating,
            comment,
        } => commands::catalog::review(&storefront, &mut out, &id, rating, &comment).await,
        Commands::Login { email, password } => {
            commands::account::login(&mut storefront, &mut out, &email, password).await
        }
        Commands::Register {
            name,
            email,
            password,
        } => commands::account::register(&mut storefront, &mut out, &name, &email, password).await,
        Commands::Logout => commands::account::logout(&mut storefront, &mut out).await,
        Commands::Whoami => commands::account::whoami(&storefront, &mut out),
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(&storefront, &mut out),
            CartAction::Add { id } => commands::cart::add(&mut storefront, &mut out, &id).await,
            CartAction::Remove { id } => commands::cart::remove(&mut storefront, &mut out, &id),
            CartAction::Set { id, quantity } => {
                commands::cart::set(&mut storefront, &mut out, &id, quantity)
            }
            CartAction::Clear => commands::cart::clear(&mut storefront, &mut out),
        },
        Commands::Wishlist { action } => match action.unwrap_or(WishlistAction::Show) {
            WishlistAction::Show => commands::wishlist::show(&storefront, &mut out),
            WishlistAction::Toggle { id } => {
                commands::wishlist::toggle(&mut storefront, &mut out, &id).await
            }
            WishlistAction::Refresh => commands::wishlist::refresh(&mut storefront, &mut out).await,
        },
        Commands::Checkout {
            address,
            city,
            postal_code,
        } => {
            let shipping = lumina_storefront::checkout::ShippingDetails {
                address,
                city,
                postal_code,
            };
            commands::checkout::submit(&mut storefront, &mut out, &shipping).await
        }
    };

    // Wishlist writes must land before the process exits
    let outcomes = storefront.close().await;
    commands::wishlist::report_outcomes(&mut out, &outcomes)?;
    result
}
