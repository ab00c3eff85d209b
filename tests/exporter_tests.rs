// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use spendwise::models::{Category, Session, Transaction};
use spendwise::{cli, commands::exporter, commands::importer, db, store};
use tempfile::tempdir;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let rows = [
        ("2025-03-02", "Metro", "-2.75", Category::Transportation),
        ("2025-03-01", "Deli, Inc.", "-8.10", Category::FoodAndDining),
    ];
    for (date, merchant, amount, cat) in rows {
        let mut t = Transaction::new(
            "alice",
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            merchant,
            amount.parse().unwrap(),
            cat,
        );
        if merchant == "Metro" {
            t.is_matched = true;
            t.has_receipt = true;
            t.receipt_url = Some("https://r/metro.png".to_string());
            t.notes = Some("monthly pass".to_string());
        }
        store::add_transaction(&conn, &t).unwrap();
    }
    conn
}

fn run_export(conn: &Connection, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "spendwise",
        "export",
        "transactions",
        "--format",
        format,
        "--out",
        out,
    ]);
    let Some(("export", export_m)) = matches.subcommand() else {
        panic!("no export subcommand");
    };
    exporter::handle(conn, &Session::new("alice"), export_m)
}

#[test]
fn export_csv_writes_oldest_first() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.csv");
    run_export(&conn, "csv", out.to_str().unwrap()).unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "date,merchant,amount,category,notes,has_receipt,is_matched,receipt_url"
    );
    assert_eq!(
        lines[1],
        "2025-03-01,\"Deli, Inc.\",-8.10,Food & Dining,,false,false,"
    );
    assert_eq!(
        lines[2],
        "2025-03-02,Metro,-2.75,Transportation,monthly pass,true,true,https://r/metro.png"
    );
}

#[test]
fn export_json_uses_category_names() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.json");
    run_export(&conn, "json", out.to_str().unwrap()).unwrap();

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let items = v.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["category"], "Food & Dining");
    assert_eq!(items[0]["amount"], "-8.10");
    assert_eq!(items[1]["is_matched"], true);
    assert_eq!(items[1]["receipt_url"], "https://r/metro.png");
    assert!(items[0]["receipt_url"].is_null());
}

#[test]
fn unknown_format_writes_nothing() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.xml");
    assert!(run_export(&conn, "xml", out.to_str().unwrap()).is_err());
    assert!(!out.exists());
}

#[test]
fn exported_csv_imports_back() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.csv");
    run_export(&conn, "csv", out.to_str().unwrap()).unwrap();

    let mut other = Connection::open_in_memory().unwrap();
    db::init_schema(&other).unwrap();
    let matches = cli::build_cli().get_matches_from([
        "spendwise",
        "import",
        "transactions",
        "--path",
        out.to_str().unwrap(),
    ]);
    let (_, import_m) = matches.subcommand().unwrap();
    importer::handle(&mut other, &Session::new("alice"), import_m).unwrap();

    let before = store::transactions_for_user(&conn, "alice").unwrap();
    let after = store::transactions_for_user(&other, "alice").unwrap();
    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(after.iter()) {
        assert_eq!(a.merchant, b.merchant);
        assert_eq!(a.amount, b.amount);
        assert_eq!(a.category, b.category);
        assert_eq!(a.date, b.date);
        assert_eq!(a.notes, b.notes);
        assert_eq!(a.has_receipt, b.has_receipt);
        assert_eq!(a.is_matched, b.is_matched);
        assert_eq!(a.receipt_url, b.receipt_url);
    }
}
