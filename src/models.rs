// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Color used for any category without an entry in the palette.
pub const FALLBACK_COLOR: &str = "#C9CBCF";

/// Monthly budget applied when the user has not configured one.
pub const DEFAULT_MONTHLY_BUDGET: Decimal = Decimal::from_parts(2000, 0, 0, false, 0);

pub const DEFAULT_CURRENCY: &str = "USD";

/// The closed set of spending and income categories.
///
/// Declaration order is the canonical ordering used for tie-breaks and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Grocery,
    Salary,
    Entertainment,
    Transportation,
    #[serde(rename = "Food & Dining")]
    FoodAndDining,
    Shopping,
    Bills,
    Income,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Grocery,
        Category::Salary,
        Category::Entertainment,
        Category::Transportation,
        Category::FoodAndDining,
        Category::Shopping,
        Category::Bills,
        Category::Income,
        Category::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Grocery => "Grocery",
            Category::Salary => "Salary",
            Category::Entertainment => "Entertainment",
            Category::Transportation => "Transportation",
            Category::FoodAndDining => "Food & Dining",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Income => "Income",
            Category::Other => "Other",
        }
    }

    /// Maps a free-form category name onto the closed set. Matching ignores case and
    /// surrounding whitespace; anything unrecognized becomes `Other`.
    pub fn classify(s: &str) -> Category {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(needle))
            .unwrap_or(Category::Other)
    }

    /// Strict lookup, for callers that must reject unknown names instead of folding
    /// them into `Other`.
    pub fn from_name(s: &str) -> Option<Category> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(needle))
    }

    /// Income-class categories never count as spending.
    pub fn is_income(&self) -> bool {
        matches!(self, Category::Income | Category::Salary)
    }

    pub fn display_color(&self) -> &'static str {
        match self {
            Category::FoodAndDining => "#FF6384",
            Category::Transportation => "#36A2EB",
            Category::Shopping => "#FFCE56",
            Category::Bills => "#4BC0C0",
            Category::Grocery => "#9966FF",
            Category::Entertainment => "#FF9F40",
            Category::Salary | Category::Income | Category::Other => FALLBACK_COLOR,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub merchant: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: Category,
    pub has_receipt: bool,
    pub is_matched: bool,
    pub notes: Option<String>,
    pub receipt_url: Option<String>,
    pub created_at: i64, // unix millis
    pub updated_at: i64,
}

impl Transaction {
    /// A transaction that has not been stored yet; `id` and timestamps are zero.
    pub fn new(
        user_id: &str,
        date: NaiveDate,
        merchant: &str,
        amount: Decimal,
        category: Category,
    ) -> Self {
        Self {
            id: 0,
            user_id: user_id.to_string(),
            merchant: merchant.to_string(),
            date,
            amount,
            category,
            has_receipt: false,
            is_matched: false,
            notes: None,
            receipt_url: None,
            created_at: 0,
            updated_at: 0,
        }
    }
}

/// Fields that may change on an existing transaction. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub merchant: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub category: Option<Category>,
    pub has_receipt: Option<bool>,
    pub is_matched: Option<bool>,
    pub notes: Option<String>,
    pub receipt_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub currency: String,
    pub monthly_budget: Decimal,
    pub category_budgets: BTreeMap<Category, Decimal>,
    pub notifications_enabled: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            monthly_budget: DEFAULT_MONTHLY_BUDGET,
            category_budgets: BTreeMap::new(),
            notifications_enabled: true,
        }
    }
}

/// The caller's identity, passed explicitly to anything that reads or writes user data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}
