//! CLI administration tool for snaplink.
//!
//! Provides link and connectivity operations without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Disable a link (it stops redirecting immediately)
//! cargo run --bin admin -- link disable promo
//!
//! # List a user's links
//! cargo run --bin admin -- link list alice
//!
//! # Check database and Redis connectivity
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see `snaplink::config`.

use snaplink::config::{self, Config, mask_connection_string};
use snaplink::domain::repositories::{LinkRepository, UserRepository};
use snaplink::infrastructure::cache::{CacheService, RedisCache};
use snaplink::infrastructure::persistence::{PgLinkRepository, PgUserRepository};
use snaplink::server::create_pool;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;

/// Number of links shown by `link list`.
const LIST_LIMIT: i64 = 100;

/// CLI tool for managing snaplink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Soft-disable a link and drop its cache entry
    Disable {
        /// Short code to disable
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List a user's most recent links
    List {
        username: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database and Redis connectivity
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &config).await?,
        Commands::Db { action } => handle_db_action(action, &config).await?,
    }

    Ok(())
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, config: &Config) -> Result<()> {
    let pool = Arc::new(create_pool(config)?);
    let links = PgLinkRepository::new(pool.clone());

    match action {
        LinkAction::Disable { code, yes } => disable_link(&links, config, &code, yes).await?,
        LinkAction::List { username } => {
            let users = PgUserRepository::new(pool);
            list_links(&links, &users, &username).await?;
        }
    }

    Ok(())
}

/// Disables a link with a confirmation prompt.
///
/// The database update is required; removing the cache entry is best effort
/// since it expires on its own after the cache TTL.
async fn disable_link(
    links: &PgLinkRepository,
    config: &Config,
    code: &str,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔒 Disable Link".bright_blue().bold());
    println!();

    let link = links
        .find_active_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("No active link with code '{code}'"))?;

    println!("  Code: {}", link.short_code.cyan());
    println!("  URL:  {}", link.long_url.bright_white());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Disable this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let disabled = links
        .deactivate(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to disable link: {}", e))?;

    if !disabled {
        println!("{}", "⚠️  Link was already disabled".yellow());
        return Ok(());
    }

    match RedisCache::connect(&config.redis_url).await {
        Ok(cache) => {
            if let Err(e) = cache.invalidate(code).await {
                println!("{} {}", "⚠️  Cache entry not removed:".yellow(), e);
            }
        }
        Err(e) => {
            println!(
                "{} {} (expires within {}s)",
                "⚠️  Redis unavailable:".yellow(),
                e,
                config.cache_ttl_seconds
            );
        }
    }

    println!();
    println!("{}", "✅ Link disabled".green().bold());
    println!();

    Ok(())
}

/// Lists a user's links, newest first.
///
/// # Output Format
///
/// ```text
/// 📋 Links for alice
///
///   Code       Created            Status    URL
///   ──────────────────────────────────────────────────────────────
///   promo      2025-01-15 10:30   ACTIVE    https://example.com
/// ```
async fn list_links(
    links: &PgLinkRepository,
    users: &PgUserRepository,
    username: &str,
) -> Result<()> {
    println!(
        "{} {}",
        "📋 Links for".bright_blue().bold(),
        username.bright_blue().bold()
    );
    println!();

    let user = users
        .get_or_create(username)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let rows = links
        .list_by_owner(user.id, LIST_LIMIT)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if rows.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<10} {:<18} {:<9} {}",
        "Code".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &rows {
        let status = if link.is_active {
            "ACTIVE".green()
        } else {
            "DISABLED".red()
        };

        println!(
            "  {:<10} {:<18} {:<9} {}",
            link.short_code.cyan(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            status,
            link.long_url
        );
    }

    println!();
    println!("  Total: {}", rows.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Handles connectivity diagnostics.
async fn handle_db_action(action: DbAction, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking connections...".bright_blue());
            println!();

            let pool = create_pool(config)?;
            let db_ok = sqlx::query("SELECT 1").execute(&pool).await.is_ok();
            print_check("PostgreSQL", &mask_connection_string(&config.database_url), db_ok);

            let redis_ok = match RedisCache::connect(&config.redis_url).await {
                Ok(cache) => cache.health_check().await,
                Err(_) => false,
            };
            print_check("Redis", &mask_connection_string(&config.redis_url), redis_ok);

            println!();
            if !(db_ok && redis_ok) {
                anyhow::bail!("One or more connections failed");
            }
        }
    }

    Ok(())
}

fn print_check(name: &str, target: &str, ok: bool) {
    let status = if ok { "OK".green().bold() } else { "FAILED".red().bold() };
    println!("  {:<11} {:<8} {}", name, status, target.bright_black());
}
