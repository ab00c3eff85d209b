// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Session;
use crate::store;
use crate::utils::{fmt_money, maybe_print_json, parse_bool, parse_decimal, pretty_table};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, session, sub)?,
        Some(("set", sub)) => set(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn show(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let s = store::load_settings(conn, &session.user_id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let mut rows = vec![
            vec!["User".to_string(), session.user_id.clone()],
            vec!["Currency".to_string(), s.currency.clone()],
            vec![
                "Monthly budget".to_string(),
                fmt_money(&s.monthly_budget, &s.currency),
            ],
            vec![
                "Notifications".to_string(),
                (if s.notifications_enabled { "on" } else { "off" }).to_string(),
            ],
        ];
        for (cat, limit) in &s.category_budgets {
            rows.push(vec![format!("Limit: {}", cat), fmt_money(limit, &s.currency)]);
        }
        println!("{}", pretty_table(&["Setting", "Value"], rows));
    }
    Ok(())
}

fn set(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let mut s = store::load_settings(conn, &session.user_id)?;
    let mut changed = false;
    if let Some(ccy) = sub.get_one::<String>("currency") {
        let ccy = ccy.trim().to_uppercase();
        if ccy.is_empty() {
            bail!("Currency cannot be empty");
        }
        s.currency = ccy;
        changed = true;
    }
    if let Some(b) = sub.get_one::<String>("budget") {
        s.monthly_budget = parse_decimal(b)?;
        changed = true;
    }
    if let Some(n) = sub.get_one::<String>("notifications") {
        s.notifications_enabled = parse_bool(n)?;
        changed = true;
    }
    if !changed {
        bail!("Nothing to change; pass --currency, --budget or --notifications");
    }
    store::save_settings(conn, &session.user_id, &s)?;
    println!(
        "Settings saved: budget {}, notifications {}",
        fmt_money(&s.monthly_budget, &s.currency),
        if s.notifications_enabled { "on" } else { "off" }
    );
    Ok(())
}
