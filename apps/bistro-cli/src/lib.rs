//! # Bistro Counter Terminal
//!
//! The operator-facing shell over `bistro-core` and `bistro-db`: one
//! command per invocation, state kept in the configured store between runs.
//!
//! ## Module Organization
//! ```text
//! bistro_cli/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── config.rs       ◄─── TOML + environment configuration
//! ├── commands/
//! │   ├── mod.rs      ◄─── Parsing, dispatch, terminal settings
//! │   ├── menu.rs     ◄─── Menu listing and editing
//! │   ├── cart.rs     ◄─── Cart manipulation
//! │   ├── order.rs    ◄─── Checkout and order history
//! │   └── report.rs   ◄─── Monthly sales report
//! └── error.rs        ◄─── Error type shown to the operator
//! ```
//!
//! ## Startup Sequence
//! 1. Parse the command line
//! 2. Load configuration (file, then environment)
//! 3. Open the store: SQLite file, or memory with `--memory`
//! 4. Open the session (menu seeded on first run)
//! 5. Execute the command
//! 6. Close the session and the store

pub mod commands;
pub mod config;
pub mod error;

use bistro_db::{Database, DbConfig, KeyValueStore, MemoryStore, Session, SessionOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::{execute, Command, StdinConfirm, Terminal, USAGE};
use config::AppConfig;
use error::AppResult;

/// Runs one command line (without the program name) and returns what to
/// print on stdout.
pub async fn run(args: &[String]) -> AppResult<String> {
    let invocation = commands::parse(args)?;
    if invocation.command == Command::Help {
        return Ok(USAGE.to_string());
    }

    // An explicitly named config file must load; the default one may not
    let config = match &invocation.options.config {
        Some(path) => AppConfig::load(Some(path.clone()))?,
        None => AppConfig::load_or_default(None),
    };

    let terminal = Terminal::new(config.display.currency_symbol.clone(), config.display_zone()?);
    let options = SessionOptions {
        seed_default_menu: config.menu.seed_defaults,
    };

    if invocation.options.in_memory || config.store.in_memory {
        info!("Using in-memory store, nothing is kept after this run");
        let session = Session::open(MemoryStore::new(), options).await?;
        return run_session(session, &invocation.command, &terminal).await;
    }

    let path = config.database_path()?;
    info!(path = %path.display(), "Opening database");
    let db = Database::new(DbConfig::new(path)).await?;

    let outcome = match Session::open(db.clone(), options).await {
        Ok(session) => run_session(session, &invocation.command, &terminal).await,
        Err(e) => Err(e.into()),
    };

    db.close().await;
    outcome
}

async fn run_session<S>(
    mut session: Session<S>,
    command: &Command,
    terminal: &Terminal,
) -> AppResult<String>
where
    S: KeyValueStore + Clone,
{
    let output = execute(&mut session, command, terminal, &StdinConfirm).await;
    session.close().await?;
    output
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so command output on stdout stays clean.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bistro_db=trace` - Show trace for the store only
/// - Default: warnings, plus INFO from the bistro crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,bistro_cli=info,bistro_db=info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::path::PathBuf;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bistro-cli-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_help() {
        let out = run(&args("--help")).await.unwrap();
        assert!(out.starts_with("Usage: bistro"));
    }

    #[tokio::test]
    async fn test_memory_run_seeds_menu() {
        let dir = scratch_dir("memory");
        let config_path = dir.join("bistro.toml");
        std::fs::write(&config_path, "[display]\ncurrency_symbol = \"$\"\n").unwrap();

        let line = format!("--memory --config {} menu", config_path.display());
        let out = run(&args(&line)).await.unwrap();

        assert_eq!(out.lines().count(), 10);
        assert!(out.contains('$'));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_state_survives_between_runs() {
        let dir = scratch_dir("file");
        let config_path = dir.join("bistro.toml");
        let db_path = dir.join("bistro.db");
        std::fs::write(
            &config_path,
            format!(
                "[store]\ndatabase_path = \"{}\"\n\n[report]\nutc_offset_minutes = 0\n",
                db_path.display()
            ),
        )
        .unwrap();
        let with_config = |rest: &str| format!("--config {} {}", config_path.display(), rest);

        run(&args(&with_config("cart add 1"))).await.unwrap();
        run(&args(&with_config("cart add 1"))).await.unwrap();

        let cart = run(&args(&with_config("cart"))).await.unwrap();
        assert!(cart.contains("x2"));

        let paid = run(&args(&with_config("checkout"))).await.unwrap();
        assert!(paid.contains("Order #ORD-001"));

        let err = run(&args(&with_config("checkout"))).await.unwrap_err();
        assert_eq!(err.to_string(), "Your cart is empty");

        let orders = run(&args(&with_config("orders"))).await.unwrap();
        assert!(orders.starts_with("ORD-001"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_missing_explicit_config() {
        let err = run(&args("--config /nonexistent/bistro.toml menu"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
