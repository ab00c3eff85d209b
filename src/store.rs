// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite-backed record source: transactions and per-user settings.

use crate::aggregate::{DateWindow, validate_budget};
use crate::models::{Category, Transaction, TransactionPatch, UserSettings};
use crate::utils::{parse_date, parse_decimal};
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, Params, Row, params};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Where the aggregator's inputs come from.
pub trait RecordSource {
    /// All of the user's transactions dated inside `window`, newest first.
    fn transactions_in_range(&self, user_id: &str, window: &DateWindow)
    -> Result<Vec<Transaction>>;

    /// The user's settings, or the defaults when nothing has been saved.
    fn user_settings(&self, user_id: &str) -> Result<UserSettings>;
}

impl RecordSource for Connection {
    fn transactions_in_range(
        &self,
        user_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<Transaction>> {
        transactions_in_range(self, user_id, window)
    }

    fn user_settings(&self, user_id: &str) -> Result<UserSettings> {
        load_settings(self, user_id)
    }
}

const TX_COLUMNS: &str = "id, user_id, merchant, date, amount, category, has_receipt, \
                          is_matched, notes, receipt_url, created_at, updated_at";

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn from_row(r: &Row<'_>) -> Result<Transaction> {
    let id: i64 = r.get(0)?;
    let date_s: String = r.get(3)?;
    let amount_s: String = r.get(4)?;
    let category_s: String = r.get(5)?;
    Ok(Transaction {
        id,
        user_id: r.get(1)?,
        merchant: r.get(2)?,
        date: parse_date(&date_s).with_context(|| format!("Transaction #{}", id))?,
        amount: parse_decimal(&amount_s).with_context(|| format!("Transaction #{}", id))?,
        category: Category::classify(&category_s),
        has_receipt: r.get(6)?,
        is_matched: r.get(7)?,
        notes: r.get(8)?,
        receipt_url: r.get(9)?,
        created_at: r.get(10)?,
        updated_at: r.get(11)?,
    })
}

fn read_transactions<P: Params>(conn: &Connection, sql: &str, p: P) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(p)?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(from_row(r)?);
    }
    Ok(out)
}

/// Stores `t` for `t.user_id` and returns it with its new id and timestamps.
pub fn add_transaction(conn: &Connection, t: &Transaction) -> Result<Transaction> {
    let now = now_millis();
    conn.execute(
        "INSERT INTO transactions(user_id, merchant, date, amount, category, has_receipt, \
         is_matched, notes, receipt_url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            t.user_id,
            t.merchant,
            t.date.to_string(),
            t.amount.to_string(),
            t.category.name(),
            t.has_receipt,
            t.is_matched,
            t.notes,
            t.receipt_url,
            now,
            now
        ],
    )?;
    let mut stored = t.clone();
    stored.id = conn.last_insert_rowid();
    stored.created_at = now;
    stored.updated_at = now;
    info!(id = stored.id, user = %stored.user_id, "transaction added");
    Ok(stored)
}

pub fn get_transaction(conn: &Connection, user_id: &str, id: i64) -> Result<Option<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE id=?1 AND user_id=?2",
        TX_COLUMNS
    );
    let mut found = read_transactions(conn, &sql, params![id, user_id])?;
    Ok(found.pop())
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.merchant.is_none()
            && self.date.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.has_receipt.is_none()
            && self.is_matched.is_none()
            && self.notes.is_none()
            && self.receipt_url.is_none()
    }

    pub fn apply(&self, t: &mut Transaction) {
        if let Some(v) = &self.merchant {
            t.merchant = v.clone();
        }
        if let Some(v) = self.date {
            t.date = v;
        }
        if let Some(v) = self.amount {
            t.amount = v;
        }
        if let Some(v) = self.category {
            t.category = v;
        }
        if let Some(v) = self.has_receipt {
            t.has_receipt = v;
        }
        if let Some(v) = self.is_matched {
            t.is_matched = v;
        }
        if let Some(v) = &self.notes {
            t.notes = Some(v.clone());
        }
        if let Some(v) = &self.receipt_url {
            t.receipt_url = Some(v.clone());
        }
    }
}

pub fn update_transaction(
    conn: &Connection,
    user_id: &str,
    id: i64,
    patch: &TransactionPatch,
) -> Result<Transaction> {
    let Some(mut t) = get_transaction(conn, user_id, id)? else {
        bail!("Transaction #{} not found", id);
    };
    patch.apply(&mut t);
    t.updated_at = now_millis();
    conn.execute(
        "UPDATE transactions SET merchant=?1, date=?2, amount=?3, category=?4, has_receipt=?5, \
         is_matched=?6, notes=?7, receipt_url=?8, updated_at=?9 WHERE id=?10 AND user_id=?11",
        params![
            t.merchant,
            t.date.to_string(),
            t.amount.to_string(),
            t.category.name(),
            t.has_receipt,
            t.is_matched,
            t.notes,
            t.receipt_url,
            t.updated_at,
            id,
            user_id
        ],
    )?;
    info!(id, user = %user_id, "transaction updated");
    Ok(t)
}

/// Returns whether a row was removed.
pub fn delete_transaction(conn: &Connection, user_id: &str, id: i64) -> Result<bool> {
    let n = conn.execute(
        "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n > 0 {
        info!(id, user = %user_id, "transaction deleted");
    }
    Ok(n > 0)
}

pub fn transactions_for_user(conn: &Connection, user_id: &str) -> Result<Vec<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE user_id=?1 ORDER BY date DESC, id DESC",
        TX_COLUMNS
    );
    read_transactions(conn, &sql, params![user_id])
}

pub fn transactions_by_category(
    conn: &Connection,
    user_id: &str,
    category: Category,
) -> Result<Vec<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE user_id=?1 AND category=?2 ORDER BY date DESC, id DESC",
        TX_COLUMNS
    );
    read_transactions(conn, &sql, params![user_id, category.name()])
}

pub fn transactions_in_range(
    conn: &Connection,
    user_id: &str,
    window: &DateWindow,
) -> Result<Vec<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE user_id=?1 AND date>=?2 AND date<=?3 \
         ORDER BY date DESC, id DESC",
        TX_COLUMNS
    );
    let rows = read_transactions(
        conn,
        &sql,
        params![user_id, window.start().to_string(), window.end().to_string()],
    )?;
    debug!(user = %user_id, window = %window, count = rows.len(), "fetched transactions");
    Ok(rows)
}

pub fn load_settings(conn: &Connection, user_id: &str) -> Result<UserSettings> {
    let mut settings = UserSettings::default();
    let row: Option<(String, String, bool)> = conn
        .query_row(
            "SELECT currency, monthly_budget, notifications_enabled FROM user_settings \
             WHERE user_id=?1",
            params![user_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    if let Some((currency, budget_s, notifications)) = row {
        settings.currency = currency;
        settings.monthly_budget = parse_decimal(&budget_s)
            .with_context(|| format!("Invalid monthly budget for user '{}'", user_id))?;
        settings.notifications_enabled = notifications;
    }
    settings.category_budgets = load_category_budgets(conn, user_id)?;
    Ok(settings)
}

fn load_category_budgets(conn: &Connection, user_id: &str) -> Result<BTreeMap<Category, Decimal>> {
    let mut stmt = conn.prepare("SELECT category, amount FROM category_budgets WHERE user_id=?1")?;
    let mut rows = stmt.query(params![user_id])?;
    let mut out = BTreeMap::new();
    while let Some(r) = rows.next()? {
        let cat_s: String = r.get(0)?;
        let amt_s: String = r.get(1)?;
        let Some(category) = Category::from_name(&cat_s) else {
            warn!(user = %user_id, category = %cat_s, "skipping budget for unknown category");
            continue;
        };
        let amount = parse_decimal(&amt_s)
            .with_context(|| format!("Invalid budget for category '{}'", cat_s))?;
        out.insert(category, amount);
    }
    Ok(out)
}

/// Writes currency, monthly budget and notification flag. Category limits are managed
/// separately through `set_category_budget`.
pub fn save_settings(conn: &Connection, user_id: &str, settings: &UserSettings) -> Result<()> {
    validate_budget(settings.monthly_budget)?;
    conn.execute(
        "INSERT INTO user_settings(user_id, currency, monthly_budget, notifications_enabled)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id) DO UPDATE SET currency=excluded.currency,
             monthly_budget=excluded.monthly_budget,
             notifications_enabled=excluded.notifications_enabled",
        params![
            user_id,
            settings.currency,
            settings.monthly_budget.to_string(),
            settings.notifications_enabled
        ],
    )?;
    info!(user = %user_id, "settings saved");
    Ok(())
}

pub fn set_category_budget(
    conn: &Connection,
    user_id: &str,
    category: Category,
    amount: Decimal,
) -> Result<()> {
    validate_budget(amount)?;
    conn.execute(
        "INSERT INTO category_budgets(user_id, category, amount) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id, category) DO UPDATE SET amount=excluded.amount",
        params![user_id, category.name(), amount.to_string()],
    )?;
    info!(user = %user_id, category = %category, "category budget set");
    Ok(())
}

/// Returns whether a limit was removed.
pub fn clear_category_budget(conn: &Connection, user_id: &str, category: Category) -> Result<bool> {
    let n = conn.execute(
        "DELETE FROM category_budgets WHERE user_id=?1 AND category=?2",
        params![user_id, category.name()],
    )?;
    Ok(n > 0)
}
