//! viewpay admin tool
//!
//! Opens the ledger database and runs one administration command.
//!
//! # Usage
//!
//! ```bash
//! # Print the current CPM table
//! viewpay_daemon rates show
//!
//! # Pay 5.00 per 1000 views coming from the US
//! viewpay_daemon rates set US 5.0
//!
//! # Replace the whole table, countries left out fall back on OTHER
//! viewpay_daemon rates replace US=6.0 OTHER=1.5
//!
//! # Review and settle payouts
//! viewpay_daemon withdrawals pending
//! viewpay_daemon withdrawals approve 12 "paid via paypal"
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use serde::Serialize;
use viewpay_common::{
    account::UserId,
    config::VERSION,
    get_cli_styles,
    rates::{RateKey, RateTable},
    time::get_current_time_in_millis,
    utils::parse_coin,
    withdrawal::WithdrawalId,
};
use viewpay_daemon::core::{
    config::Config, error::LedgerError, ledger::Ledger, storage::RocksStorage,
};

const DEFAULT_TOP_LIMIT: usize = 10;

#[derive(Parser)]
#[clap(version = VERSION, about = "viewpay earnings ledger administration")]
#[command(styles = get_cli_styles())]
struct Cli {
    #[clap(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect or update the CPM table
    #[command(subcommand)]
    Rates(RatesCommand),
    /// Review and settle withdrawal requests
    #[command(subcommand)]
    Withdrawals(WithdrawalsCommand),
    /// Inspect a user
    #[command(subcommand)]
    User(UserCommand),
    /// Global counters and size on disk
    Status,
    /// Users with the highest balance
    Top {
        #[arg(short, long, default_value_t = DEFAULT_TOP_LIMIT)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum RatesCommand {
    /// Print the current table
    Show,
    /// Set the CPM of a country code or OTHER
    Set {
        key: RateKey,
        /// Amount paid per 1000 views, e.g. 5.0
        #[arg(value_parser = parse_coin)]
        cpm: u64,
    },
    /// Replace the whole table with KEY=CPM entries
    Replace {
        #[arg(required = true, value_parser = parse_rate_entry)]
        entries: Vec<(String, u64)>,
    },
}

// KEY=CPM, e.g. US=5.0
fn parse_rate_entry(value: &str) -> Result<(String, u64), String> {
    let (key, cpm) = value
        .split_once('=')
        .ok_or_else(|| format!("Invalid rate entry '{}', expected KEY=CPM", value))?;
    let cpm = parse_coin(cpm).map_err(|e| e.to_string())?;
    Ok((key.to_owned(), cpm))
}

#[derive(Subcommand)]
enum WithdrawalsCommand {
    /// Pending withdrawals, oldest first
    Pending,
    Approve {
        id: WithdrawalId,
        note: Option<String>,
    },
    Reject {
        id: WithdrawalId,
        note: Option<String>,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    Stats { id: UserId },
    Referrals { id: UserId },
    Withdrawals { id: UserId },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Error while serializing output")?;
    println!("{}", json);
    Ok(())
}

async fn run(ledger: &Ledger<RocksStorage>, command: Command) -> Result<()> {
    match command {
        Command::Rates(RatesCommand::Show) => print_json(&ledger.get_rates().await?),
        Command::Rates(RatesCommand::Set { key, cpm }) => {
            print_json(&ledger.set_rate(key, cpm).await?)
        }
        Command::Rates(RatesCommand::Replace { entries }) => {
            let table = RateTable::from_entries(entries, get_current_time_in_millis())?;
            print_json(&ledger.set_rates(table).await?)
        }
        Command::Withdrawals(WithdrawalsCommand::Pending) => {
            print_json(&ledger.get_pending_withdrawals().await?)
        }
        Command::Withdrawals(WithdrawalsCommand::Approve { id, note }) => {
            print_json(&ledger.approve_withdrawal(id, note).await?)
        }
        Command::Withdrawals(WithdrawalsCommand::Reject { id, note }) => {
            print_json(&ledger.reject_withdrawal(id, note).await?)
        }
        Command::User(UserCommand::Stats { id }) => print_json(&ledger.get_user_stats(id).await?),
        Command::User(UserCommand::Referrals { id }) => {
            print_json(&ledger.get_referral_stats(id).await?)
        }
        Command::User(UserCommand::Withdrawals { id }) => {
            print_json(&ledger.get_user_withdrawals(id, 0, usize::MAX).await?)
        }
        Command::Status => print_json(&ledger.get_status().await?),
        Command::Top { limit } => print_json(&ledger.get_top_users(limit).await?),
    }
}

// A failure while stopping is logged, the command result is kept
fn finish<T>(res: Result<T>, stopped: Result<(), LedgerError>) -> Result<T> {
    if let Err(e) = stopped {
        error!("Error while stopping ledger: {}", e);
    }
    res
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config;

    env_logger::Builder::from_default_env()
        .filter_level(config.log_level.into())
        .format_timestamp_millis()
        .init();

    info!("Opening ledger at {}", config.dir_path);
    let storage = RocksStorage::new(&config.dir_path, &config.rocksdb)
        .with_context(|| format!("Error while opening storage at {}", config.dir_path))?;
    let ledger = Ledger::new(storage, config.ledger).await?;

    let res = run(&ledger, cli.command).await;
    finish(res, ledger.stop().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_entry_parsing() {
        assert_eq!(
            parse_rate_entry("US=5.0").unwrap(),
            ("US".to_owned(), 500_000_000)
        );
        assert!(parse_rate_entry("US").is_err());
        assert!(parse_rate_entry("US=abc").is_err());
    }

    #[test]
    fn test_replace_command_collects_entries() {
        let cli = Cli::try_parse_from(["viewpay_daemon", "rates", "replace", "US=6", "OTHER=1.5"])
            .unwrap();
        match cli.command {
            Command::Rates(RatesCommand::Replace { entries }) => assert_eq!(
                entries,
                vec![
                    ("US".to_owned(), 600_000_000),
                    ("OTHER".to_owned(), 150_000_000)
                ]
            ),
            _ => panic!("expected rates replace"),
        }
        assert!(Cli::try_parse_from(["viewpay_daemon", "rates", "replace"]).is_err());
    }

    #[test]
    fn test_command_error_survives_stop_failure() {
        let res: Result<()> = finish(
            Err(anyhow::anyhow!("withdrawal not found")),
            Err(LedgerError::SnapshotNotStarted),
        );
        assert_eq!(res.unwrap_err().to_string(), "withdrawal not found");

        let res = finish(Ok(7), Err(LedgerError::SnapshotNotStarted));
        assert_eq!(res.unwrap(), 7);
    }
}
