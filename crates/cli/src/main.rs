//! Clementine CLI - Command-line storefront frontend.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! clem products list
//! clem products search "keyboard"
//!
//! # Manage the cart
//! clem cart add 664f1c2a
//! clem cart show
//! clem cart checkout
//!
//! # Session
//! clem auth login -e user@example.com -p secret
//! clem auth logout
//! ```
//!
//! # Commands
//!
//! - `products` - List, search, and manage catalog products
//! - `cart` - Show and mutate the persistent cart
//! - `auth` - Login, registration, logout, session status
//! - `theme` - Read or set the persisted display theme
//!
//! # Environment Variables
//!
//! - `CLEMENTINE_BACKEND_URL` - Base URL of the REST backend (required)
//! - `CLEMENTINE_STATE_DIR` - Persisted state directory (default `.clementine`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use clementine_client::{ClientConfig, Notice, Storefront};

mod commands;

#[derive(Parser)]
#[command(name = "clem")]
#[command(author, version, about = "Clementine storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and manage catalog products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Show and mutate the persistent cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Session management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Display theme preference
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List the whole catalog
    List,
    /// Show one product
    Get { id: String },
    /// Search by keyword (case-insensitive substring)
    Search { keyword: String },
    /// Create a product from a JSON metadata file plus an image
    Add {
        /// Path to the product metadata JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Path to the product image
        #[arg(short, long)]
        image: PathBuf,
    },
    /// Update a product from a JSON metadata file
    Update {
        id: String,

        /// Path to the product metadata JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Optional replacement image
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Delete a product
    Delete { id: String },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart lines and total
    Show,
    /// Add one unit of a product
    Add { id: String },
    /// Remove a line entirely
    Remove { id: String },
    /// Increase a line's quantity by one
    Increase { id: String },
    /// Decrease a line's quantity by one
    Decrease { id: String },
    /// Empty the cart
    Clear,
    /// Decrement backend stock for every line
    Checkout,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Log in and store the session token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Register a new account
    Register {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Clear the stored session token
    Logout,
    /// Show whether a session token is stored
    Status,
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Print the persisted theme
    Get,
    /// Persist a theme (`light` or `dark`)
    Set { theme: String },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let front = Storefront::new(&config)?;

    // Surface notices (session teardown after 401s) once the command is done
    let mut notices = front.events.subscribe_notices();

    let outcome = dispatch(cli, &front).await;
    drain_notices(&mut notices);
    outcome?;
    Ok(())
}

async fn dispatch(cli: Cli, front: &Storefront) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List => commands::products::list(front).await?,
            ProductAction::Get { id } => commands::products::get(front, &id).await?,
            ProductAction::Search { keyword } => commands::products::search(front, &keyword).await?,
            ProductAction::Add { file, image } => {
                commands::products::add(front, &file, &image).await?;
            }
            ProductAction::Update { id, file, image } => {
                commands::products::update(front, &id, &file, image.as_deref()).await?;
            }
            ProductAction::Delete { id } => commands::products::delete(front, &id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(front),
            CartAction::Add { id } => commands::cart::add(front, &id).await?,
            CartAction::Remove { id } => commands::cart::remove(front, &id)?,
            CartAction::Increase { id } => commands::cart::increase(front, &id)?,
            CartAction::Decrease { id } => commands::cart::decrease(front, &id)?,
            CartAction::Clear => commands::cart::clear(front)?,
            CartAction::Checkout => commands::cart::checkout(front).await?,
        },
        Commands::Auth { action } => match action {
            AuthAction::Login { email, password } => {
                commands::auth::login(front, &email, &password).await?;
            }
            AuthAction::Register { email, password } => {
                commands::auth::register(front, &email, &password).await?;
            }
            AuthAction::Logout => commands::auth::logout(front)?,
            AuthAction::Status => commands::auth::status(front),
        },
        Commands::Theme { action } => match action {
            ThemeAction::Get => commands::theme::get(front),
            ThemeAction::Set { theme } => commands::theme::set(front, &theme)?,
        },
    }
    Ok(())
}

#[allow(clippy::print_stderr)]
fn drain_notices(notices: &mut tokio::sync::broadcast::Receiver<Notice>) {
    while let Ok(notice) = notices.try_recv() {
        match notice {
            Notice::SignInRequired { redirect } => {
                eprintln!("Please sign in (see {redirect})");
            }
        }
    }
}
