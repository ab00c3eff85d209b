// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Category;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
pub struct CategoryRow {
    pub name: &'static str,
    pub color: &'static str,
    pub income: bool,
}

pub fn rows() -> Vec<CategoryRow> {
    Category::ALL
        .iter()
        .map(|c| CategoryRow {
            name: c.name(),
            color: c.display_color(),
            income: c.is_income(),
        })
        .collect()
}

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    if let Some(("list", sub)) = m.subcommand() {
        let data = rows();
        if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
            let table: Vec<Vec<String>> = data
                .iter()
                .map(|r| {
                    vec![
                        r.name.to_string(),
                        r.color.to_string(),
                        (if r.income { "income" } else { "spending" }).to_string(),
                    ]
                })
                .collect();
            println!("{}", pretty_table(&["Category", "Color", "Kind"], table));
        }
    }
    Ok(())
}
