//! recipebox Admin CLI
//!
//! Administration tool for managing users and API tokens.
//!
//! # Usage
//!
//! ```bash
//! recipebox-admin user add erik@example.com --name Erik
//! recipebox-admin user list
//! recipebox-admin user deactivate erik@example.com
//! recipebox-admin user remove erik@example.com
//! recipebox-admin token issue erik@example.com
//! recipebox-admin token revoke <token>
//! ```
//!
//! The database location comes from the same config file and
//! `RECIPEBOX_DATABASE_PATH` variable the server reads.

use clap::{Args, Parser, Subcommand};
use recipebox::config::Config;
use recipebox::db::{init_db, TokenRepository, UserRepository};
use recipebox::models::User;
use sqlx::SqlitePool;
use std::path::PathBuf;

type AdminResult = Result<(), Box<dyn std::error::Error>>;

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "recipebox-admin")]
#[command(version)]
#[command(about = "recipebox administration tool")]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User(UserCommand),
    /// Manage API tokens
    Token(TokenCommand),
}

#[derive(Args)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Subcommand)]
enum UserSubcommand {
    /// Add a new user
    Add {
        /// User's email address
        email: String,
        /// User's display name
        #[arg(long, short)]
        name: Option<String>,
    },
    /// List all users
    List,
    /// Allow a user's tokens to authenticate again
    Activate {
        /// User's email address
        email: String,
    },
    /// Stop a user's tokens from authenticating
    Deactivate {
        /// User's email address
        email: String,
    },
    /// Remove a user and everything they own
    Remove {
        /// User's email address
        email: String,
    },
}

#[derive(Args)]
struct TokenCommand {
    #[command(subcommand)]
    command: TokenSubcommand,
}

#[derive(Subcommand)]
enum TokenSubcommand {
    /// Issue a new token for a user
    Issue {
        /// User's email address
        email: String,
    },
    /// Revoke a token
    Revoke {
        /// The token to revoke
        token: String,
    },
    /// Revoke every token of a user
    RevokeAll {
        /// User's email address
        email: String,
    },
}

// ============================================================================
// Commands
// ============================================================================

async fn find_user(pool: &SqlitePool, email: &str) -> Result<User, Box<dyn std::error::Error>> {
    UserRepository::new(pool.clone())
        .get_by_email(email)
        .await?
        .ok_or_else(|| format!("User '{}' not found", email).into())
}

async fn add_user(pool: &SqlitePool, email: String, name: Option<String>) -> AdminResult {
    let repo = UserRepository::new(pool.clone());
    let email = email.trim();

    if repo.get_by_email(email).await?.is_some() {
        return Err(format!("User '{}' already exists", email).into());
    }

    let user = match name {
        Some(n) => User::new(email).with_name(n),
        None => User::new(email),
    };
    let user = repo.create(&user).await?;
    tracing::info!(email = %user.email, "Added user");

    println!("Added user: {}", user.email);
    println!("  ID: {}", user.id);
    if let Some(n) = &user.name {
        println!("  Name: {}", n);
    }

    Ok(())
}

async fn list_users(pool: &SqlitePool) -> AdminResult {
    let users = UserRepository::new(pool.clone()).list().await?;

    if users.is_empty() {
        println!("No users registered.");
        return Ok(());
    }

    println!("{:<38} {}", "ID", "USER");
    println!("{}", "-".repeat(80));

    for user in &users {
        println!("{:<38} {}", user.id, user);
    }

    println!();
    println!("Total: {} user(s)", users.len());

    Ok(())
}

async fn set_active(pool: &SqlitePool, email: String, is_active: bool) -> AdminResult {
    let user = find_user(pool, &email).await?;
    UserRepository::new(pool.clone())
        .set_active(user.id, is_active)
        .await?;

    let state = if is_active { "Activated" } else { "Deactivated" };
    tracing::info!(email = %user.email, "{} user", state);
    println!("{} user: {}", state, user.email);
    Ok(())
}

async fn remove_user(pool: &SqlitePool, email: String) -> AdminResult {
    let user = find_user(pool, &email).await?;
    UserRepository::new(pool.clone()).delete(user.id).await?;

    tracing::info!(email = %user.email, "Removed user");
    println!("Removed user: {}", user.email);
    Ok(())
}

async fn issue_token(pool: &SqlitePool, email: String) -> AdminResult {
    let user = find_user(pool, &email).await?;
    let token = TokenRepository::new(pool.clone()).issue(user.id).await?;

    tracing::info!(email = %user.email, "Issued token");
    println!("Token for {}:", user.email);
    println!("  {}", token);
    println!();
    println!("Store it now; it cannot be shown again.");
    Ok(())
}

async fn revoke_token(pool: &SqlitePool, token: String) -> AdminResult {
    if !TokenRepository::new(pool.clone()).revoke(&token).await? {
        return Err("Token not found".into());
    }

    tracing::info!("Revoked token");
    println!("Revoked token.");
    Ok(())
}

async fn revoke_all_tokens(pool: &SqlitePool, email: String) -> AdminResult {
    let user = find_user(pool, &email).await?;
    let count = TokenRepository::new(pool.clone())
        .revoke_all(user.id)
        .await?;

    tracing::info!(email = %user.email, count, "Revoked tokens");
    println!("Revoked {} token(s) for {}", count, user.email);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

async fn run(cli: Cli) -> AdminResult {
    let config = Config::load(cli.config)?;
    let pool = init_db(&config.database_path).await?;

    match cli.command {
        Commands::User(user_cmd) => match user_cmd.command {
            UserSubcommand::Add { email, name } => add_user(&pool, email, name).await,
            UserSubcommand::List => list_users(&pool).await,
            UserSubcommand::Activate { email } => set_active(&pool, email, true).await,
            UserSubcommand::Deactivate { email } => set_active(&pool, email, false).await,
            UserSubcommand::Remove { email } => remove_user(&pool, email).await,
        },
        Commands::Token(token_cmd) => match token_cmd.command {
            TokenSubcommand::Issue { email } => issue_token(&pool, email).await,
            TokenSubcommand::Revoke { token } => revoke_token(&pool, token).await,
            TokenSubcommand::RevokeAll { email } => revoke_all_tokens(&pool, email).await,
        },
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
