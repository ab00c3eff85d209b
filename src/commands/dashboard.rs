// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{
    DEFAULT_TREND_PERIODS, SpendingChange, SpendingOverview, overview, overview_window,
};
use crate::models::Session;
use crate::store::RecordSource;
use crate::utils::{fmt_money, maybe_print_json, parse_month, pretty_table, today};
use anyhow::Result;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

const BAR_WIDTH: usize = 24;

pub fn handle(source: &impl RecordSource, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let ov = build_overview(source, session, m)?;
    if maybe_print_json(json_flag, jsonl_flag, &ov)? {
        return Ok(());
    }
    let ccy = source.user_settings(&session.user_id)?.currency;
    render(&ov, &ccy);
    Ok(())
}

/// One read covering every trend month, then the aggregation.
pub fn build_overview(
    source: &impl RecordSource,
    session: &Session,
    m: &clap::ArgMatches,
) -> Result<SpendingOverview> {
    let anchor = match m.get_one::<String>("month") {
        Some(month) => parse_month(month)?,
        None => today(),
    };
    let periods = m
        .get_one::<usize>("periods")
        .copied()
        .unwrap_or(DEFAULT_TREND_PERIODS);
    let settings = source.user_settings(&session.user_id)?;
    let range = overview_window(anchor, periods)?;
    let records = source.transactions_in_range(&session.user_id, &range)?;
    debug!(range = %range, records = records.len(), "building overview");
    Ok(overview(&records, anchor, settings.monthly_budget, periods)?)
}

fn bar(amount: Decimal, max: Decimal) -> String {
    if max.is_zero() {
        return String::new();
    }
    let ratio = (amount / max).to_f64().unwrap_or(0.0);
    let n = (ratio * BAR_WIDTH as f64).round() as usize;
    "█".repeat(n.min(BAR_WIDTH))
}

/// Month-over-month change as shown in the summary table.
pub fn change_label(change: &SpendingChange) -> String {
    match change.percent() {
        Some(p) if p.is_zero() => format!("{} from last month (no change)", change),
        Some(_) if change.is_up() => format!("{} from last month (up)", change),
        Some(_) => format!("{} from last month (down)", change),
        None => "n/a".to_string(),
    }
}

fn render(ov: &SpendingOverview, ccy: &str) {
    let s = &ov.summary;
    println!(
        "Spending overview for {}",
        s.window.start().format("%B %Y")
    );

    let used = match s.percent_of_budget {
        Some(p) => format!("{}%", p),
        None => "no budget set".to_string(),
    };
    let status = if s.is_over_budget { "OVER BUDGET" } else { "within budget" };
    let change = change_label(&ov.change);
    let rows = vec![
        vec!["Total spent".to_string(), fmt_money(&s.total_spent, ccy)],
        vec!["Budget".to_string(), fmt_money(&s.budget, ccy)],
        vec!["Remaining".to_string(), fmt_money(&s.remaining_budget(), ccy)],
        vec!["Used".to_string(), used],
        vec!["Status".to_string(), status.to_string()],
        vec!["Change".to_string(), change],
        vec!["Transactions".to_string(), s.transaction_count.to_string()],
    ];
    println!("{}", pretty_table(&["Summary", ""], rows));

    if s.categories.is_empty() {
        println!("No spending recorded for this month.");
    } else {
        let rows = s
            .categories
            .iter()
            .map(|c| {
                vec![
                    c.category.to_string(),
                    fmt_money(&c.amount, ccy),
                    format!("{}%", c.percentage_of_total),
                    c.display_color.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Spent", "% of total", "Color"], rows)
        );
    }

    let max = ov
        .trend
        .iter()
        .map(|p| p.amount)
        .max()
        .unwrap_or(Decimal::ZERO);
    let rows = ov
        .trend
        .iter()
        .map(|p| {
            vec![
                p.period_label.clone(),
                fmt_money(&p.amount, ccy),
                bar(p.amount, max),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Month", "Spent", ""], rows));
}
