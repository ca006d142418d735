use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::application::{BankConfig, BankService};
use crate::domain::{parse_cents, WithdrawalWindow};

mod shell;

pub use shell::*;

/// Teller - in-memory retail banking ledger
#[derive(Parser, Debug)]
#[command(name = "teller")]
#[command(about = "Customers, checking accounts, deposits and withdrawals in one interactive session")]
#[command(version)]
pub struct Cli {
    /// Per-withdrawal ceiling for new checking accounts (e.g., "500" or "500.00")
    #[arg(long, env = "TELLER_WITHDRAWAL_LIMIT", default_value = "500")]
    pub withdrawal_limit: String,

    /// Number of withdrawals a checking account may perform
    #[arg(long, env = "TELLER_MAX_WITHDRAWALS", default_value_t = 3)]
    pub max_withdrawals: u32,

    /// Which withdrawals count toward the cap: lifetime, daily
    #[arg(long, env = "TELLER_WITHDRAWAL_WINDOW", default_value = "lifetime")]
    pub withdrawal_window: String,

    /// Read commands from a file instead of standard input
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Log filter directive for the engine (error, warn, info, debug, trace)
    #[arg(long, env = "TELLER_LOG", default_value = "warn")]
    pub log_level: String,

    /// Enable verbose output (same as --log-level info)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the bank configuration from the parsed arguments.
    pub fn config(&self) -> Result<BankConfig> {
        let withdrawal_limit = parse_cents(&self.withdrawal_limit)
            .context("Invalid withdrawal limit. Use '500.00' or '500'")?;
        let withdrawal_window =
            WithdrawalWindow::from_str(&self.withdrawal_window).ok_or_else(|| {
                anyhow!(
                    "Invalid withdrawal window '{}'. Valid windows: lifetime, daily",
                    self.withdrawal_window
                )
            })?;

        Ok(BankConfig {
            withdrawal_limit,
            max_withdrawals: self.max_withdrawals,
            withdrawal_window,
        })
    }

    /// Install the log subscriber. `RUST_LOG` wins over the command line.
    pub fn init_logging(&self) {
        let level = if self.verbose { "info" } else { self.log_level.as_str() };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("teller={level}")));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }

    pub fn run(self) -> Result<()> {
        let config = self.config()?;
        let service = BankService::new(config)?;
        let mut shell = Shell::new(service);
        let mut stdout = io::stdout().lock();

        match &self.script {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open script {}", path.display()))?;
                shell.run(BufReader::new(file), &mut stdout, false)
            }
            None => {
                let stdin = io::stdin();
                let interactive = stdin.is_terminal();
                if interactive {
                    shell.banner(&mut stdout)?;
                }
                shell.run(stdin.lock(), &mut stdout, interactive)
            }
        }
    }
}
