// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{CategoryBudgetStatus, DateWindow, category_budget_status, summarize};
use crate::models::Session;
use crate::store::{self, RecordSource};
use crate::utils::{
    fmt_money, maybe_print_json, parse_category, parse_decimal, parse_month, pretty_table,
    required, today,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, session, sub)?,
        Some(("clear", sub)) => clear(conn, session, sub)?,
        Some(("list", sub)) => list(conn, session, sub)?,
        Some(("status", sub)) => status(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let cat = parse_category(required(sub, "category")?)?;
    let amount = parse_decimal(required(sub, "amount")?)?;
    store::set_category_budget(conn, &session.user_id, cat, amount)?;
    println!("Budget set for {} = {}", cat, amount);
    Ok(())
}

fn clear(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let cat = parse_category(required(sub, "category")?)?;
    if store::clear_category_budget(conn, &session.user_id, cat)? {
        println!("Cleared budget for {}", cat);
    } else {
        println!("No budget was set for {}", cat);
    }
    Ok(())
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let s = store::load_settings(conn, &session.user_id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s.category_budgets)? {
        let data = s
            .category_budgets
            .iter()
            .map(|(cat, amt)| vec![cat.to_string(), fmt_money(amt, &s.currency)])
            .collect();
        println!("{}", pretty_table(&["Category", "Limit"], data));
    }
    Ok(())
}

/// Per-category limits against what was spent in the requested month.
pub fn status_rows(
    source: &impl RecordSource,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<Vec<CategoryBudgetStatus>> {
    let anchor = match sub.get_one::<String>("month") {
        Some(m) => parse_month(m)?,
        None => today(),
    };
    let window = DateWindow::month_of(anchor);
    let settings = source.user_settings(&session.user_id)?;
    let records = source.transactions_in_range(&session.user_id, &window)?;
    let summary = summarize(&records, window, settings.monthly_budget)?;
    Ok(category_budget_status(&summary, &settings.category_budgets)?)
}

fn status(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let data = status_rows(conn, session, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let ccy = conn.user_settings(&session.user_id)?.currency;
        let rows = data
            .iter()
            .map(|s| {
                vec![
                    s.category.to_string(),
                    fmt_money(&s.limit, &ccy),
                    fmt_money(&s.spent, &ccy),
                    fmt_money(&s.remaining, &ccy),
                    s.percent_used
                        .map(|p| format!("{}%", p))
                        .unwrap_or_else(|| "-".into()),
                    (if s.is_over { "OVER" } else { "ok" }).to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Category", "Limit", "Spent", "Remaining", "Used", "Status"],
                rows
            )
        );
    }
    Ok(())
}
