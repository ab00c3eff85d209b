// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::DateWindow;
use crate::filter::{TransactionFilter, filter_transactions};
use crate::models::{Session, Transaction, TransactionPatch};
use crate::store;
use crate::utils::{
    maybe_print_json, parse_bool, parse_category, parse_date, parse_decimal, parse_merchant,
    parse_month, pretty_table, required, today,
};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, session, sub)?,
        Some(("list", sub)) => list(conn, session, sub)?,
        Some(("show", sub)) => show(conn, session, sub)?,
        Some(("edit", sub)) => edit(conn, session, sub)?,
        Some(("rm", sub)) => rm(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let merchant = parse_merchant(required(sub, "merchant")?)?;
    let amount = parse_decimal(required(sub, "amount")?)?;
    let category = parse_category(required(sub, "category")?)?;

    let mut t = Transaction::new(&session.user_id, date, &merchant, amount, category);
    t.has_receipt = sub.get_flag("receipt");
    t.is_matched = sub.get_flag("matched");
    t.notes = sub.get_one::<String>("note").cloned();
    t.receipt_url = sub.get_one::<String>("receipt-url").cloned();

    let stored = store::add_transaction(conn, &t)?;
    println!(
        "Recorded #{}: {} on {} at '{}' ({})",
        stored.id, stored.amount, stored.date, stored.merchant, stored.category
    );
    Ok(())
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, session, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        if data.is_empty() {
            println!("No transactions found. Try adjusting your search or filters.");
            return Ok(());
        }
        let ccy = store::load_settings(conn, &session.user_id)?.currency;
        let rows: Vec<Vec<String>> = data.iter().map(|t| table_row(t, &ccy)).collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Merchant", "Category", "Amount", "Receipt", "Matched", "Notes"],
                rows,
            )
        );
    }
    Ok(())
}

fn table_row(t: &Transaction, ccy: &str) -> Vec<String> {
    let mark = |b: bool| (if b { "yes" } else { "" }).to_string();
    vec![
        t.id.to_string(),
        t.date.format("%b %-d, %Y").to_string(),
        t.merchant.clone(),
        t.category.to_string(),
        format!("{} {:.2}", ccy, t.amount),
        mark(t.has_receipt),
        mark(t.is_matched),
        t.notes.clone().unwrap_or_default(),
    ]
}

/// Rows for `tx list`: month/category narrow the query, then search and quick filter
/// apply, then the limit.
pub fn query_rows(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<Vec<Transaction>> {
    let user = session.user_id.as_str();
    let category = match sub.get_one::<String>("category") {
        Some(c) => Some(parse_category(c)?),
        None => None,
    };

    let mut rows = match (sub.get_one::<String>("month"), category) {
        (Some(month), cat) => {
            let window = DateWindow::month_of(parse_month(month)?);
            let mut rows = store::transactions_in_range(conn, user, &window)?;
            if let Some(cat) = cat {
                rows.retain(|t| t.category == cat);
            }
            rows
        }
        (None, Some(cat)) => store::transactions_by_category(conn, user, cat)?,
        (None, None) => store::transactions_for_user(conn, user)?,
    };

    let search = sub
        .get_one::<String>("search")
        .map(|s| s.as_str())
        .unwrap_or("");
    let filter = match sub.get_one::<String>("filter") {
        Some(f) => f.parse::<TransactionFilter>()?,
        None => TransactionFilter::All,
    };
    if !search.trim().is_empty() || filter != TransactionFilter::All {
        rows = filter_transactions(&rows, search, filter)
            .into_iter()
            .cloned()
            .collect();
    }
    if let Some(limit) = sub.get_one::<usize>("limit") {
        rows.truncate(*limit);
    }
    Ok(rows)
}

fn show(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap_or(&0);
    let Some(t) = store::get_transaction(conn, &session.user_id, id)? else {
        bail!("Transaction #{} not found", id);
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &t)? {
        let ccy = store::load_settings(conn, &session.user_id)?.currency;
        let rows = vec![
            vec!["Date".into(), t.date.to_string()],
            vec!["Merchant".into(), t.merchant.clone()],
            vec!["Category".into(), t.category.to_string()],
            vec!["Amount".into(), format!("{} {:.2}", ccy, t.amount)],
            vec!["Receipt".into(), t.has_receipt.to_string()],
            vec!["Matched".into(), t.is_matched.to_string()],
            vec!["Notes".into(), t.notes.clone().unwrap_or_default()],
            vec!["Receipt URL".into(), t.receipt_url.clone().unwrap_or_default()],
        ];
        println!("{}", pretty_table(&["Field", &format!("#{}", t.id)], rows));
    }
    Ok(())
}

/// Builds the patch for `tx edit` from whichever options were given.
pub fn patch_from_args(sub: &clap::ArgMatches) -> Result<TransactionPatch> {
    let opt = |id: &str| sub.get_one::<String>(id);
    Ok(TransactionPatch {
        merchant: opt("merchant").map(|s| parse_merchant(s)).transpose()?,
        date: opt("date").map(|s| parse_date(s)).transpose()?,
        amount: opt("amount").map(|s| parse_decimal(s)).transpose()?,
        category: opt("category").map(|s| parse_category(s)).transpose()?,
        has_receipt: opt("receipt").map(|s| parse_bool(s)).transpose()?,
        is_matched: opt("matched").map(|s| parse_bool(s)).transpose()?,
        notes: opt("note").cloned(),
        receipt_url: opt("receipt-url").cloned(),
    })
}

fn edit(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap_or(&0);
    let patch = patch_from_args(sub)?;
    if patch.is_empty() {
        bail!("Nothing to change for transaction #{}", id);
    }
    let t = store::update_transaction(conn, &session.user_id, id, &patch)?;
    println!("Updated #{}: {} on {} at '{}'", t.id, t.amount, t.date, t.merchant);
    Ok(())
}

fn rm(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap_or(&0);
    if !store::delete_transaction(conn, &session.user_id, id)? {
        bail!("Transaction #{} not found", id);
    }
    println!("Removed transaction #{}", id);
    Ok(())
}
