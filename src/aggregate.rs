// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Spending aggregation over already-fetched transactions.
//!
//! Everything here is a pure function of its inputs: totals per category, the spending
//! breakdown and budget usage for a window, the monthly trend, and the change against
//! the previous period.

use crate::error::AggregateError;
use crate::models::{Category, Transaction};
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Number of months shown in the dashboard trend unless the caller asks otherwise.
pub const DEFAULT_TREND_PERIODS: usize = 4;

/// Longest trend `overview` will build.
pub const MAX_TREND_PERIODS: usize = 120;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AggregateError> {
        if start > end {
            return Err(AggregateError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Short month name of the window start, e.g. `Apr`.
    pub fn label(&self) -> String {
        self.start.format("%b").to_string()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub amount: Decimal,
    pub percentage_of_total: u32,
    pub display_color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingSummary {
    pub window: DateWindow,
    pub budget: Decimal,
    /// Absolute amounts per category, income categories included.
    pub category_totals: BTreeMap<Category, Decimal>,
    pub total_spent: Decimal,
    pub categories: Vec<CategorySummary>,
    /// `None` when the budget is zero.
    pub percent_of_budget: Option<u64>,
    pub is_over_budget: bool,
    pub transaction_count: usize,
}

impl SpendingSummary {
    pub fn remaining_budget(&self) -> Decimal {
        self.budget - self.total_spent
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period_label: String,
    pub period_start: NaiveDate,
    pub amount: Decimal,
}

/// Change of the latest trend point against the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum SpendingChange {
    Percent(Decimal),
    NotApplicable,
}

impl SpendingChange {
    pub fn percent(&self) -> Option<Decimal> {
        match self {
            SpendingChange::Percent(p) => Some(*p),
            SpendingChange::NotApplicable => None,
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, SpendingChange::Percent(p) if *p > Decimal::ZERO)
    }
}

impl fmt::Display for SpendingChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpendingChange::Percent(p) if *p > Decimal::ZERO => write!(f, "+{:.1}%", p),
            SpendingChange::Percent(p) => write!(f, "{:.1}%", p),
            SpendingChange::NotApplicable => f.write_str("n/a"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingOverview {
    pub summary: SpendingSummary,
    pub trend: Vec<TrendPoint>,
    pub change: SpendingChange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBudgetStatus {
    pub category: Category,
    pub limit: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// `None` when the limit is zero.
    pub percent_used: Option<u64>,
    pub is_over: bool,
}

pub fn validate_budget(budget: Decimal) -> Result<Decimal, AggregateError> {
    if budget.is_sign_negative() && !budget.is_zero() {
        return Err(AggregateError::InvalidBudget(budget));
    }
    Ok(budget)
}

/// `round(part / whole * 100)`, half away from zero. `whole` must be non-zero.
fn rounded_percent(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .unwrap_or(Decimal::MAX)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Sums `abs(amount)` per category for the records inside `window`, whatever the sign.
pub fn category_totals<'a, I>(records: I, window: &DateWindow) -> BTreeMap<Category, Decimal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals = BTreeMap::new();
    for t in records.into_iter().filter(|t| window.contains(t.date)) {
        *totals.entry(t.category).or_insert(Decimal::ZERO) += t.amount.abs();
    }
    totals
}

fn spent_from_totals(totals: &BTreeMap<Category, Decimal>) -> Decimal {
    totals
        .iter()
        .filter(|(cat, _)| !cat.is_income())
        .map(|(_, amt)| *amt)
        .sum()
}

/// Total spent inside `window`, income categories excluded.
pub fn total_spent(records: &[Transaction], window: &DateWindow) -> Decimal {
    spent_from_totals(&category_totals(records, window))
}

/// Summary for the inclusive range `[start, end]`.
pub fn compute_summary(
    records: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
    budget: Decimal,
) -> Result<SpendingSummary, AggregateError> {
    let window = DateWindow::new(start, end)?;
    summarize(records, window, budget)
}

/// Summary for an already validated window.
pub fn summarize(
    records: &[Transaction],
    window: DateWindow,
    budget: Decimal,
) -> Result<SpendingSummary, AggregateError> {
    let budget = validate_budget(budget)?;
    let transaction_count = records.iter().filter(|t| window.contains(t.date)).count();
    let category_totals = category_totals(records, &window);
    let total_spent = spent_from_totals(&category_totals);

    let mut categories = Vec::new();
    if !total_spent.is_zero() {
        for (cat, amount) in category_totals.iter() {
            if cat.is_income() || *amount <= Decimal::ZERO {
                continue;
            }
            categories.push(CategorySummary {
                category: *cat,
                amount: *amount,
                percentage_of_total: rounded_percent(*amount, total_spent)
                    .to_u32()
                    .unwrap_or(100),
                display_color: cat.display_color(),
            });
        }
    }
    // Stable sort keeps enum order for equal amounts.
    categories.sort_by(|a, b| b.amount.cmp(&a.amount));

    let percent_of_budget = if budget.is_zero() {
        None
    } else {
        Some(
            rounded_percent(total_spent, budget)
                .to_u64()
                .unwrap_or(u64::MAX),
        )
    };
    let is_over_budget = total_spent > budget;

    debug!(
        window = %window,
        records = transaction_count,
        total_spent = %total_spent,
        "computed spending summary"
    );

    Ok(SpendingSummary {
        window,
        budget,
        category_totals,
        total_spent,
        categories,
        percent_of_budget,
        is_over_budget,
        transaction_count,
    })
}

/// The `n` calendar-month windows ending with the month that contains `anchor`, oldest
/// first.
pub fn monthly_windows(anchor: NaiveDate, n: usize) -> Vec<DateWindow> {
    let current = DateWindow::month_of(anchor).start();
    (0..n)
        .rev()
        .filter_map(|back| {
            let back = u32::try_from(back).ok()?;
            current.checked_sub_months(Months::new(back))
        })
        .map(DateWindow::month_of)
        .collect()
}

/// One trend point per window, in the order given, each the total spent inside it.
pub fn compute_trend(records: &[Transaction], windows: &[DateWindow]) -> Vec<TrendPoint> {
    windows
        .iter()
        .map(|w| TrendPoint {
            period_label: w.label(),
            period_start: w.start(),
            amount: total_spent(records, w),
        })
        .collect()
}

/// Percent change of the last trend point over the second-to-last, to one decimal.
pub fn spending_change(trend: &[TrendPoint]) -> SpendingChange {
    let [.., previous, current] = trend else {
        return SpendingChange::NotApplicable;
    };
    if previous.amount.is_zero() {
        return SpendingChange::NotApplicable;
    }
    match (current.amount - previous.amount)
        .checked_div(previous.amount)
        .and_then(|r| r.checked_mul(HUNDRED))
    {
        Some(p) => {
            SpendingChange::Percent(p.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
        }
        None => SpendingChange::NotApplicable,
    }
}

/// Clamps `0` to one month and rejects anything above `MAX_TREND_PERIODS`.
pub fn validate_periods(periods: usize) -> Result<usize, AggregateError> {
    if periods > MAX_TREND_PERIODS {
        return Err(AggregateError::TooManyPeriods {
            requested: periods,
            max: MAX_TREND_PERIODS,
        });
    }
    Ok(periods.max(1))
}

/// The range a record source must cover for `overview(_, anchor, _, periods)`.
pub fn overview_window(anchor: NaiveDate, periods: usize) -> Result<DateWindow, AggregateError> {
    let windows = monthly_windows(anchor, validate_periods(periods)?);
    let current = DateWindow::month_of(anchor);
    let start = windows.first().map(|w| w.start()).unwrap_or(current.start());
    Ok(DateWindow {
        start,
        end: current.end(),
    })
}

/// Dashboard view for the month containing `anchor`: the month's summary, a trend of
/// `periods` months ending with it, and the change against the month before.
pub fn overview(
    records: &[Transaction],
    anchor: NaiveDate,
    budget: Decimal,
    periods: usize,
) -> Result<SpendingOverview, AggregateError> {
    let periods = validate_periods(periods)?;
    let summary = summarize(records, DateWindow::month_of(anchor), budget)?;
    let windows = monthly_windows(anchor, periods);
    let trend = compute_trend(records, &windows);
    let change = spending_change(&trend);
    Ok(SpendingOverview {
        summary,
        trend,
        change,
    })
}

/// Status of every configured per-category limit against the summary's totals.
pub fn category_budget_status(
    summary: &SpendingSummary,
    limits: &BTreeMap<Category, Decimal>,
) -> Result<Vec<CategoryBudgetStatus>, AggregateError> {
    let mut out = Vec::with_capacity(limits.len());
    for (cat, limit) in limits {
        let limit = validate_budget(*limit)?;
        let spent = summary
            .category_totals
            .get(cat)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let percent_used = if limit.is_zero() {
            None
        } else {
            Some(rounded_percent(spent, limit).to_u64().unwrap_or(u64::MAX))
        };
        out.push(CategoryBudgetStatus {
            category: *cat,
            limit,
            spent,
            remaining: limit - spent,
            percent_used,
            is_over: spent > limit,
        });
    }
    Ok(out)
}
