// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Transaction;
use anyhow::{Result, anyhow};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Quick filters offered by the transaction list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionFilter {
    #[default]
    All,
    Receipts,
    Matched,
    Unmatched,
}

impl TransactionFilter {
    pub const NAMES: [&'static str; 4] = ["all", "receipts", "matched", "unmatched"];

    pub fn accepts(&self, t: &Transaction) -> bool {
        match self {
            TransactionFilter::All => true,
            TransactionFilter::Receipts => t.has_receipt,
            TransactionFilter::Matched => t.is_matched,
            TransactionFilter::Unmatched => !t.is_matched,
        }
    }
}

impl FromStr for TransactionFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TransactionFilter::All),
            "receipts" => Ok(TransactionFilter::Receipts),
            "matched" => Ok(TransactionFilter::Matched),
            "unmatched" => Ok(TransactionFilter::Unmatched),
            other => Err(anyhow!(
                "Unknown filter '{}' (use {})",
                other,
                Self::NAMES.join("|")
            )),
        }
    }
}

impl fmt::Display for TransactionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionFilter::All => "all",
            TransactionFilter::Receipts => "receipts",
            TransactionFilter::Matched => "matched",
            TransactionFilter::Unmatched => "unmatched",
        };
        f.write_str(s)
    }
}

/// Keeps transactions whose merchant contains `search` (case-insensitive) and that pass
/// `filter`. Order is preserved.
pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    search: &str,
    filter: TransactionFilter,
) -> Vec<&'a Transaction> {
    let needle = search.trim().to_lowercase();
    transactions
        .iter()
        .filter(|t| needle.is_empty() || t.merchant.to_lowercase().contains(&needle))
        .filter(|t| filter.accepts(t))
        .collect()
}
