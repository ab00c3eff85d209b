// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use spendwise::models::Session;
use spendwise::{cli, commands, db};

fn main() -> ExitCode {
    let matches = cli::build_cli().get_matches();
    let level = matches
        .get_one::<String>("log-level")
        .and_then(|s| s.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::WARN);
    init_logger(level);
    debug!("Log level set to {}", level.to_string().to_lowercase());

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(matches: &clap::ArgMatches) -> Result<()> {
    let user = matches
        .get_one::<String>("user")
        .map(|s| s.trim())
        .unwrap_or("local");
    if user.is_empty() {
        bail!("--user cannot be empty");
    }
    let session = Session::new(user);
    let db_arg = matches.get_one::<PathBuf>("db").map(|p| p.as_path());

    let mut conn = db::open_or_init(db_arg)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path(db_arg)?.display());
        }
        Some(("tx", sub)) => commands::transactions::handle(&conn, &session, sub)?,
        Some(("category", sub)) => commands::categories::handle(sub)?,
        Some(("settings", sub)) => commands::settings::handle(&conn, &session, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&conn, &session, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(&conn, &session, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut conn, &session, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, &session, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

/// Initializes the tracing subscriber. `RUST_LOG` wins when set; otherwise `level`
/// applies to this crate only.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
