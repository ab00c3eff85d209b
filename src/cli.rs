// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::MAX_TREND_PERIODS;
use crate::filter::TransactionFilter;
use clap::builder::RangedU64ValueParser;
use clap::{Arg, ArgAction, Command, value_parser};
use std::path::PathBuf;

fn with_json(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON instead of a table"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn amount_arg(required: bool) -> Arg {
    Arg::new("amount")
        .long("amount")
        .required(required)
        .allow_hyphen_values(true)
        .help("Signed amount; negative for expenses")
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and browse transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add a transaction")
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to today"))
                .arg(Arg::new("merchant").long("merchant").required(true))
                .arg(amount_arg(true))
                .arg(Arg::new("category").long("category").default_value("Other"))
                .arg(
                    Arg::new("receipt")
                        .long("receipt")
                        .action(ArgAction::SetTrue)
                        .help("A receipt is attached"),
                )
                .arg(
                    Arg::new("matched")
                        .long("matched")
                        .action(ArgAction::SetTrue)
                        .help("Matched against a bank record"),
                )
                .arg(Arg::new("note").long("note"))
                .arg(Arg::new("receipt-url").long("receipt-url")),
        )
        .subcommand(with_json(
            Command::new("list")
                .about("List transactions, newest first")
                .arg(Arg::new("month").long("month").help("YYYY-MM"))
                .arg(Arg::new("category").long("category"))
                .arg(
                    Arg::new("search")
                        .long("search")
                        .help("Case-insensitive merchant substring"),
                )
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .value_parser(TransactionFilter::NAMES)
                        .default_value("all"),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(with_json(
            Command::new("show").about("Show one transaction").arg(
                Arg::new("id")
                    .long("id")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        ))
        .subcommand(
            Command::new("edit")
                .about("Change fields of a transaction")
                .arg(
                    Arg::new("id")
                        .long("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("merchant").long("merchant"))
                .arg(Arg::new("date").long("date"))
                .arg(amount_arg(false))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("receipt").long("receipt").help("true|false"))
                .arg(Arg::new("matched").long("matched").help("true|false"))
                .arg(Arg::new("note").long("note"))
                .arg(Arg::new("receipt-url").long("receipt-url")),
        )
        .subcommand(
            Command::new("rm").about("Delete a transaction").arg(
                Arg::new("id")
                    .long("id")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        )
}

fn settings_cmd() -> Command {
    Command::new("settings")
        .about("Currency, monthly budget and notifications")
        .subcommand_required(true)
        .subcommand(with_json(Command::new("show")))
        .subcommand(
            Command::new("set")
                .arg(Arg::new("currency").long("currency"))
                .arg(
                    Arg::new("budget")
                        .long("budget")
                        .allow_hyphen_values(true)
                        .help("Monthly budget"),
                )
                .arg(
                    Arg::new("notifications")
                        .long("notifications")
                        .help("true|false"),
                ),
        )
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Per-category spending limits")
        .subcommand_required(true)
        .subcommand(
            Command::new("set")
                .arg(Arg::new("category").long("category").required(true))
                .arg(amount_arg(true)),
        )
        .subcommand(
            Command::new("clear").arg(Arg::new("category").long("category").required(true)),
        )
        .subcommand(with_json(Command::new("list")))
        .subcommand(with_json(
            Command::new("status")
                .about("Limits against spending for a month")
                .arg(
                    Arg::new("month")
                        .long("month")
                        .help("YYYY-MM, defaults to the current month"),
                ),
        ))
}

pub fn build_cli() -> Command {
    Command::new("spendwise")
        .version(clap::crate_version!())
        .about("Track expenses, budgets and monthly spending trends")
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .env("SPENDWISE_USER")
                .default_value("local")
                .help("User whose records are read and written"),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("SPENDWISE_DB")
                .value_parser(value_parser!(PathBuf))
                .help("SQLite database path"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("warn")
                .help("off|error|warn|info|debug|trace; RUST_LOG takes precedence"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(tx_cmd())
        .subcommand(
            Command::new("category")
                .about("Spending and income categories")
                .subcommand_required(true)
                .subcommand(with_json(Command::new("list"))),
        )
        .subcommand(settings_cmd())
        .subcommand(budget_cmd())
        .subcommand(with_json(
            Command::new("dashboard")
                .about("Spending overview for a month")
                .arg(
                    Arg::new("month")
                        .long("month")
                        .help("YYYY-MM, defaults to the current month"),
                )
                .arg(
                    Arg::new("periods")
                        .long("periods")
                        .value_parser(
                            RangedU64ValueParser::<usize>::new()
                                .range(1..=MAX_TREND_PERIODS as u64),
                        )
                        .default_value("4")
                        .help("Months in the trend, including the selected one (1-120)"),
                ),
        ))
        .subcommand(
            Command::new("import")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .about("Import date,merchant,amount,category[,notes,...] rows from CSV")
                        .arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv|json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
}
