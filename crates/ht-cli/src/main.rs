use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ht_cli::commands::{add, archive, calendar, list, stats, status, toggle};
use ht_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(ht_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = ht_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so JSON output stays parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let today = cli
        .today
        .map_or_else(|| Local::now().date_naive(), |key| key.date());
    let mut stdout = io::stdout();

    match &cli.command {
        Some(Commands::Add(args)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            add::run(&mut stdout, &mut db, args, today)?;
        }
        Some(Commands::List { all, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            list::run(&db, *all, *json)?;
        }
        Some(Commands::Toggle(args)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            toggle::run(&mut stdout, &mut db, args, today)?;
        }
        Some(Commands::Archive { habit }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            archive::set_archived(&mut stdout, &mut db, habit, true)?;
        }
        Some(Commands::Unarchive { habit }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            archive::set_archived(&mut stdout, &mut db, habit, false)?;
        }
        Some(Commands::Delete { habit }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            archive::delete(&mut stdout, &mut db, habit)?;
        }
        Some(Commands::Stats(args)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let window = config
                .rolling_window()
                .context("invalid window_days in configuration")?;
            stats::run(&db, args, window, today)?;
        }
        Some(Commands::Calendar(args)) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            calendar::run(&db, args, today)?;
        }
        Some(Commands::Status { json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            status::run(&db, today, *json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
