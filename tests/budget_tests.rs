// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use spendwise::commands::{budgets, settings};
use spendwise::models::{Category, DEFAULT_CURRENCY, DEFAULT_MONTHLY_BUDGET, Session, Transaction};
use spendwise::{cli, db, store};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn run_budget(conn: &Connection, user: &str, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["spendwise", "budget"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, budget_m) = matches.subcommand().unwrap();
    budgets::handle(conn, &Session::new(user), budget_m)
}

fn run_settings(conn: &Connection, user: &str, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["spendwise", "settings"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, settings_m) = matches.subcommand().unwrap();
    settings::handle(conn, &Session::new(user), settings_m)
}

#[test]
fn settings_default_until_saved() {
    let conn = setup();
    let s = store::load_settings(&conn, "alice").unwrap();
    assert_eq!(s.currency, DEFAULT_CURRENCY);
    assert_eq!(s.monthly_budget, DEFAULT_MONTHLY_BUDGET);
    assert!(s.notifications_enabled);
    assert!(s.category_budgets.is_empty());
}

#[test]
fn settings_set_updates_only_given_fields() {
    let conn = setup();
    run_settings(&conn, "alice", &["set", "--budget", "1500.50", "--currency", "eur"]).unwrap();
    run_settings(&conn, "alice", &["set", "--notifications", "off"]).unwrap();

    let s = store::load_settings(&conn, "alice").unwrap();
    assert_eq!(s.monthly_budget, dec("1500.50"));
    assert_eq!(s.currency, "EUR");
    assert!(!s.notifications_enabled);

    let other = store::load_settings(&conn, "bob").unwrap();
    assert_eq!(other.monthly_budget, DEFAULT_MONTHLY_BUDGET);
}

#[test]
fn settings_reject_negative_budget_and_empty_change() {
    let conn = setup();
    assert!(run_settings(&conn, "alice", &["set", "--budget", "-1"]).is_err());
    assert!(run_settings(&conn, "alice", &["set"]).is_err());
    assert_eq!(
        store::load_settings(&conn, "alice").unwrap().monthly_budget,
        DEFAULT_MONTHLY_BUDGET
    );
}

#[test]
fn category_budget_set_overwrite_and_clear() {
    let conn = setup();
    run_budget(&conn, "alice", &["set", "--category", "Grocery", "--amount", "300"]).unwrap();
    run_budget(&conn, "alice", &["set", "--category", "grocery", "--amount", "350"]).unwrap();
    run_budget(&conn, "alice", &["set", "--category", "Bills", "--amount", "0"]).unwrap();

    let limits = store::load_settings(&conn, "alice").unwrap().category_budgets;
    assert_eq!(limits.len(), 2);
    assert_eq!(limits.get(&Category::Grocery), Some(&dec("350")));

    assert!(store::clear_category_budget(&conn, "alice", Category::Grocery).unwrap());
    assert!(!store::clear_category_budget(&conn, "alice", Category::Grocery).unwrap());
    run_budget(&conn, "alice", &["clear", "--category", "Bills"]).unwrap();
    assert!(store::load_settings(&conn, "alice").unwrap().category_budgets.is_empty());
}

#[test]
fn category_budget_rejects_negative_and_unknown() {
    let conn = setup();
    assert!(run_budget(&conn, "alice", &["set", "--category", "Bills", "--amount", "-10"]).is_err());
    assert!(run_budget(&conn, "alice", &["set", "--category", "Pets", "--amount", "10"]).is_err());
}

#[test]
fn status_compares_limits_with_month_spending() {
    let conn = setup();
    let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
    for (date, amount, cat) in [
        ("2025-05-03", "-120", Category::Grocery),
        ("2025-05-20", "-90", Category::Grocery),
        ("2025-05-21", "-40", Category::Entertainment),
        ("2025-04-30", "-500", Category::Grocery),
    ] {
        let t = Transaction::new("alice", d(date), "M", dec(amount), cat);
        store::add_transaction(&conn, &t).unwrap();
    }
    store::set_category_budget(&conn, "alice", Category::Grocery, dec("200")).unwrap();
    store::set_category_budget(&conn, "alice", Category::Entertainment, dec("100")).unwrap();

    let matches =
        cli::build_cli().get_matches_from(["spendwise", "budget", "status", "--month", "2025-05"]);
    let (_, budget_m) = matches.subcommand().unwrap();
    let (_, status_m) = budget_m.subcommand().unwrap();
    let rows = budgets::status_rows(&conn, &Session::new("alice"), status_m).unwrap();

    assert_eq!(rows.len(), 2);
    let grocery = rows.iter().find(|r| r.category == Category::Grocery).unwrap();
    assert_eq!(grocery.spent, dec("210"));
    assert_eq!(grocery.remaining, dec("-10"));
    assert_eq!(grocery.percent_used, Some(105));
    assert!(grocery.is_over);

    let fun = rows
        .iter()
        .find(|r| r.category == Category::Entertainment)
        .unwrap();
    assert_eq!(fun.percent_used, Some(40));
    assert!(!fun.is_over);
}

#[test]
fn stray_budget_rows_do_not_replace_the_other_limit() {
    let conn = setup();
    store::set_category_budget(&conn, "alice", Category::Other, dec("75")).unwrap();
    conn.execute(
        "INSERT INTO category_budgets(user_id, category, amount) VALUES ('alice', 'Pets', '5')",
        [],
    )
    .unwrap();

    let limits = store::load_settings(&conn, "alice").unwrap().category_budgets;
    assert_eq!(limits.len(), 1);
    assert_eq!(limits.get(&Category::Other), Some(&dec("75")));
}
