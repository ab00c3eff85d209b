// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, Session, Transaction};
use crate::store;
use crate::utils::{parse_bool, parse_date, parse_decimal, parse_merchant, required};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::Connection;
use tracing::warn;

pub fn handle(conn: &mut Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => import_transactions(conn, session, sub),
        _ => Ok(()),
    }
}

/// Columns: date, merchant, amount, category, then optional notes, has_receipt,
/// is_matched, receipt_url. All rows land in one SQLite transaction or none do.
fn import_transactions(
    conn: &mut Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let path = required(sub, "path")?.trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut count = 0usize;
    for (ix, result) in rdr.records().enumerate() {
        let line = ix + 2;
        let rec = result?;
        let date_raw = rec.get(0).context("date missing")?.trim();
        let merchant = rec.get(1).context("merchant missing")?.trim();
        let amount_raw = rec.get(2).context("amount missing")?.trim();
        let category_raw = rec.get(3).unwrap_or("").trim();
        let notes = rec
            .get(4)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        let receipt_url = rec
            .get(7)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        let flag = |i: usize| -> Result<bool> {
            match rec.get(i).map(|s| s.trim()).filter(|s| !s.is_empty()) {
                Some(s) => parse_bool(s).with_context(|| format!("line {}", line)),
                None => Ok(false),
            }
        };

        let date = parse_date(date_raw).with_context(|| format!("line {}", line))?;
        let merchant = parse_merchant(merchant).with_context(|| format!("line {}", line))?;
        let amount = parse_decimal(amount_raw).with_context(|| {
            format!("Invalid amount '{}' for {} (line {})", amount_raw, merchant, line)
        })?;
        let category = match Category::from_name(category_raw) {
            Some(c) => c,
            None => {
                if !category_raw.is_empty() {
                    warn!(line, category = %category_raw, "unknown category, filed under Other");
                }
                Category::classify(category_raw)
            }
        };

        let mut t = Transaction::new(&session.user_id, date, &merchant, amount, category);
        t.notes = notes;
        t.receipt_url = receipt_url;
        t.has_receipt = flag(5)?;
        t.is_matched = flag(6)?;
        store::add_transaction(&tx, &t)?;
        count += 1;
    }
    tx.commit()?;
    println!("Imported {} transactions from {}", count, path);
    Ok(())
}
