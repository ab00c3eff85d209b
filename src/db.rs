// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Spendwise", "spendwise"));

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("spendwise.sqlite"))
}

/// Resolves `--db` / `SPENDWISE_DB`, falling back to the platform data dir.
pub fn db_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => {
            if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            Ok(p.to_path_buf())
        }
        None => default_db_path(),
    }
}

pub fn open_or_init(explicit: Option<&Path>) -> Result<Connection> {
    let path = db_path(explicit)?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        merchant TEXT NOT NULL,
        date TEXT NOT NULL,
        amount TEXT NOT NULL,
        category TEXT NOT NULL,
        has_receipt INTEGER NOT NULL DEFAULT 0,
        is_matched INTEGER NOT NULL DEFAULT 0,
        notes TEXT,
        receipt_url TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);

    CREATE TABLE IF NOT EXISTS user_settings(
        user_id TEXT PRIMARY KEY,
        currency TEXT NOT NULL,
        monthly_budget TEXT NOT NULL,
        notifications_enabled INTEGER NOT NULL DEFAULT 1
    );

    -- per-category limits, stored in the user's currency
    CREATE TABLE IF NOT EXISTS category_budgets(
        user_id TEXT NOT NULL,
        category TEXT NOT NULL,
        amount TEXT NOT NULL,
        UNIQUE(user_id, category)
    );
    "#,
    )?;
    Ok(())
}
