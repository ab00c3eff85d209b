// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Input validation failures from the spending aggregator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Invalid date window: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid budget {0}: budgets cannot be negative")]
    InvalidBudget(Decimal),

    #[error("Invalid trend length {requested}: at most {max} months are supported")]
    TooManyPeriods { requested: usize, max: usize },
}
