// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Session;
use crate::store;
use crate::utils::required;
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, session, sub),
        _ => Ok(()),
    }
}

/// Writes the user's transactions oldest first, in the column order `import` reads.
fn export_transactions(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.trim().to_lowercase();
    let out = required(sub, "out")?.trim();

    let mut rows = store::transactions_for_user(conn, &session.user_id)?;
    rows.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date",
                "merchant",
                "amount",
                "category",
                "notes",
                "has_receipt",
                "is_matched",
                "receipt_url",
            ])?;
            for t in &rows {
                wtr.write_record([
                    t.date.to_string(),
                    t.merchant.clone(),
                    t.amount.to_string(),
                    t.category.to_string(),
                    t.notes.clone().unwrap_or_default(),
                    t.has_receipt.to_string(),
                    t.is_matched.to_string(),
                    t.receipt_url.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|t| {
                    json!({
                        "date": t.date.to_string(),
                        "merchant": t.merchant,
                        "amount": t.amount.to_string(),
                        "category": t.category.name(),
                        "notes": t.notes,
                        "has_receipt": t.has_receipt,
                        "is_matched": t.is_matched,
                        "receipt_url": t.receipt_url,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
