// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use spendwise::models::{Category, Session};
use spendwise::{cli, commands::importer, db, store};
use std::io::Write;
use tempfile::NamedTempFile;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn csv_file(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", body).unwrap();
    file.flush().unwrap();
    file
}

fn run_import(conn: &mut Connection, user: &str, path: &str) -> anyhow::Result<()> {
    let matches =
        cli::build_cli().get_matches_from(["spendwise", "import", "transactions", "--path", path]);
    let Some(("import", import_m)) = matches.subcommand() else {
        panic!("no import subcommand");
    };
    importer::handle(conn, &Session::new(user), import_m)
}

#[test]
fn importer_trims_cli_path_argument() {
    let mut conn = base_conn();
    let file = csv_file("date,merchant,amount,category\n2025-02-03,Shop,-5.00,Shopping\n");
    let padded = format!("  {}  ", file.path().to_str().unwrap());
    run_import(&mut conn, "alice", &padded).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn importer_reads_optional_columns_and_folds_unknown_categories() {
    let mut conn = base_conn();
    let file = csv_file(
        "date,merchant,amount,category,notes,has_receipt,is_matched\n\
         2025-02-03,Vet Clinic,-80.00,Pets,checkup,yes,false\n\
         2025-02-04,Acme Payroll,2500,salary,,,\n",
    );
    run_import(&mut conn, "alice", file.path().to_str().unwrap()).unwrap();

    let rows = store::transactions_for_user(&conn, "alice").unwrap();
    assert_eq!(rows.len(), 2);
    let vet = rows.iter().find(|t| t.merchant == "Vet Clinic").unwrap();
    assert_eq!(vet.category, Category::Other);
    assert_eq!(vet.notes.as_deref(), Some("checkup"));
    assert!(vet.has_receipt);
    assert!(!vet.is_matched);

    let pay = rows.iter().find(|t| t.merchant == "Acme Payroll").unwrap();
    assert_eq!(pay.category, Category::Salary);
    assert_eq!(pay.notes, None);

    let amount: String = conn
        .query_row(
            "SELECT amount FROM transactions WHERE merchant='Vet Clinic'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(amount, "-80.00");
}

#[test]
fn importer_rolls_back_on_bad_row() {
    let mut conn = base_conn();
    let file = csv_file(
        "date,merchant,amount,category\n\
         2025-02-03,Shop,-5.00,Shopping\n\
         2025-02-04,Shop,not-a-number,Shopping\n",
    );
    let err = run_import(&mut conn, "alice", file.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{:#}", err).contains("line 3"));

    assert!(store::transactions_for_user(&conn, "alice").unwrap().is_empty());
}

#[test]
fn imported_rows_belong_to_the_session_user() {
    let mut conn = base_conn();
    let file = csv_file("date,merchant,amount,category\n2025-02-03,Shop,-5.00,Shopping\n");
    run_import(&mut conn, "bob", file.path().to_str().unwrap()).unwrap();

    assert_eq!(store::transactions_for_user(&conn, "bob").unwrap().len(), 1);
    assert!(store::transactions_for_user(&conn, "alice").unwrap().is_empty());
}

#[test]
fn importer_rejects_blank_merchant() {
    let mut conn = base_conn();
    let file = csv_file(
        "date,merchant,amount,category\n\
         2025-02-03,Shop,-5.00,Shopping\n\
         2025-02-04,  ,-7.00,Shopping\n",
    );
    let err = run_import(&mut conn, "alice", file.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{:#}", err).contains("Merchant cannot be empty"));
    assert!(store::transactions_for_user(&conn, "alice").unwrap().is_empty());
}

#[test]
fn importer_reads_receipt_url_column() {
    let mut conn = base_conn();
    let file = csv_file(
        "date,merchant,amount,category,notes,has_receipt,is_matched,receipt_url\n\
         2025-02-03,Shop,-5.00,Shopping,,true,false,https://r/1.png\n",
    );
    run_import(&mut conn, "alice", file.path().to_str().unwrap()).unwrap();
    let rows = store::transactions_for_user(&conn, "alice").unwrap();
    assert_eq!(rows[0].receipt_url.as_deref(), Some("https://r/1.png"));
    assert!(rows[0].has_receipt);
}
