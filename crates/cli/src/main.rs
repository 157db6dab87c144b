//! Design Library CLI - Database migrations and account tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! dl-cli migrate
//!
//! # Create a profile
//! dl-cli user create -e admin@example.com -n "Admin Name" -r super_admin
//!
//! # Change a profile's role
//! dl-cli user set-role -e maker@example.com -r admin
//!
//! # Issue a bearer token (printed once)
//! dl-cli session issue -e maker@example.com --ttl-hours 24
//!
//! # Revoke every token of a profile
//! dl-cli session revoke -e maker@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `API_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `SESSION_TTL_HOURS` - Default lifetime of issued tokens (720)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "dl-cli")]
#[command(author, version, about = "Design library CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage profiles
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage bearer-token sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new profile
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Role (`user`, `admin`, `super_admin`)
        #[arg(short, long, default_value = "user")]
        role: String,
    },
    /// Change the role of an existing profile
    SetRole {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// New role (`user`, `admin`, `super_admin`)
        #[arg(short, long)]
        role: String,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Issue a new token and print it once
    Issue {
        /// Email address of the profile
        #[arg(short, long)]
        email: String,

        /// Token lifetime in hours (defaults to `SESSION_TTL_HOURS` or 720)
        #[arg(long)]
        ttl_hours: Option<i64>,
    },
    /// Revoke every token of a profile
    Revoke {
        /// Email address of the profile
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create { email, name, role } => {
                commands::user::create(&email, name.as_deref(), &role).await?;
            }
            UserAction::SetRole { email, role } => {
                commands::user::set_role(&email, &role).await?;
            }
        },
        Commands::Session { action } => match action {
            SessionAction::Issue { email, ttl_hours } => {
                commands::session::issue(&email, ttl_hours).await?;
            }
            SessionAction::Revoke { email } => commands::session::revoke(&email).await?,
        },
    }
    Ok(())
}
