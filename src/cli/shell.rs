use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufRead, Write};

use crate::application::{AccountSummary, BankService, OperationResult};
use crate::domain::{format_cents, parse_cents, AccountNumber, EntryKind};
use crate::io::{ExportFormat, Exporter};

/// One line typed at the prompt.
#[derive(Parser, Debug)]
#[command(name = "teller", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Customer management commands
    #[command(subcommand)]
    Customer(CustomerCommands),

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Deposit into an account
    Deposit {
        /// Amount to deposit (e.g., "50.00" or "50")
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Customer tax id
        #[arg(long)]
        tax_id: String,

        /// Account number (defaults to the customer's first account)
        #[arg(short, long)]
        account: Option<AccountNumber>,
    },

    /// Withdraw from an account
    Withdraw {
        /// Amount to withdraw (e.g., "50.00" or "50")
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Customer tax id
        #[arg(long)]
        tax_id: String,

        /// Account number (defaults to the customer's first account)
        #[arg(short, long)]
        account: Option<AccountNumber>,
    },

    /// Show the statement of an account
    Statement {
        /// Customer tax id
        #[arg(long)]
        tax_id: String,

        /// Account number (defaults to the customer's first account)
        #[arg(short, long)]
        account: Option<AccountNumber>,
    },

    /// Export a statement or the account list
    Export {
        /// What to export: statement, accounts
        export_type: String,

        /// Customer tax id (statement only)
        #[arg(long)]
        tax_id: Option<String>,

        /// Account number (statement only)
        #[arg(short, long)]
        account: Option<AccountNumber>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (printed if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

#[derive(Subcommand, Debug)]
enum CustomerCommands {
    /// Register a new customer
    New {
        /// Full name
        #[arg(long)]
        name: String,

        /// Birth date (YYYY-MM-DD or DD-MM-YYYY)
        #[arg(long)]
        birth_date: String,

        /// Tax id, digits only (must be unique)
        #[arg(long)]
        tax_id: String,

        /// Address (street, number - district - city/state)
        #[arg(long)]
        address: String,
    },

    /// List all customers
    List,
}

#[derive(Subcommand, Debug)]
enum AccountCommands {
    /// Open a checking account for a customer
    New {
        /// Customer tax id
        #[arg(long)]
        tax_id: String,
    },

    /// List all accounts
    List,
}

/// Whether the loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Line-oriented front end over a [`BankService`]. State lives as long as the
/// shell does.
pub struct Shell {
    service: BankService,
}

impl Shell {
    pub fn new(service: BankService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &BankService {
        &self.service
    }

    pub fn banner<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "teller {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "Type 'help' for the list of commands, 'quit' to leave.")?;
        Ok(())
    }

    /// Read commands until end of input or `quit`. A failing command prints
    /// its error and the loop goes on.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W, prompt: bool) -> Result<()> {
        let mut lines = input.lines();
        loop {
            if prompt {
                write!(out, "> ")?;
                out.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            let line = line.context("Failed to read command")?;

            match self.execute_line(&line, out) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(err) => {
                    tracing::debug!(command = %line, "command failed: {err:#}");
                    writeln!(out, "error: {err:#}")?;
                }
            }
        }
        Ok(())
    }

    /// Parse and execute a single line.
    pub fn execute_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(Flow::Continue);
        }

        let words = split_words(trimmed)?;
        let parsed = match Line::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(err) => {
                use clap::error::ErrorKind;
                // Help output is a normal result, not a failure.
                if matches!(
                    err.kind(),
                    ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    write!(out, "{}", err)?;
                    return Ok(Flow::Continue);
                }
                let message = err.to_string();
                bail!("{}", message.trim_end().trim_start_matches("error: "));
            }
        };

        self.execute(parsed.command, out)
    }

    fn execute<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> Result<Flow> {
        match command {
            ShellCommand::Customer(cmd) => self.run_customer_command(cmd, out)?,
            ShellCommand::Account(cmd) => self.run_account_command(cmd, out)?,

            ShellCommand::Deposit {
                amount,
                tax_id,
                account,
            } => {
                let amount_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
                let result = self.service.deposit(&tax_id, account, amount_cents)?;
                print_operation(out, &result)?;
            }

            ShellCommand::Withdraw {
                amount,
                tax_id,
                account,
            } => {
                let amount_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
                let result = self.service.withdraw(&tax_id, account, amount_cents)?;
                print_operation(out, &result)?;
            }

            ShellCommand::Statement { tax_id, account } => {
                self.run_statement_command(&tax_id, account, out)?;
            }

            ShellCommand::Export {
                export_type,
                tax_id,
                account,
                format,
                output,
            } => {
                let format = ExportFormat::from_str(&format).ok_or_else(|| {
                    anyhow!("Invalid format '{}'. Valid formats: csv, json", format)
                })?;
                self.run_export_command(
                    &export_type,
                    tax_id.as_deref(),
                    account,
                    format,
                    output.as_deref(),
                    out,
                )?;
            }

            ShellCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn run_customer_command<W: Write>(&mut self, cmd: CustomerCommands, out: &mut W) -> Result<()> {
        match cmd {
            CustomerCommands::New {
                name,
                birth_date,
                tax_id,
                address,
            } => {
                let birth_date = parse_date(&birth_date).with_context(|| {
                    format!(
                        "Invalid date format '{}'. Use YYYY-MM-DD or DD-MM-YYYY",
                        birth_date
                    )
                })?;
                let customer = self
                    .service
                    .register_customer(name, birth_date, tax_id, address)?;
                writeln!(
                    out,
                    "Registered customer: {} ({})",
                    customer.name,
                    customer.tax_id.as_deref().unwrap_or("-")
                )?;
            }

            CustomerCommands::List => {
                let customers = self.service.list_customers();
                if customers.is_empty() {
                    writeln!(out, "No customers found.")?;
                    return Ok(());
                }
                writeln!(out, "{:<25} {:<14} {:<12} ACCOUNTS", "NAME", "TAX ID", "BORN")?;
                writeln!(out, "{}", "-".repeat(62))?;
                for customer in customers {
                    let accounts: Vec<String> =
                        customer.accounts.iter().map(|n| n.to_string()).collect();
                    writeln!(
                        out,
                        "{:<25} {:<14} {:<12} {}",
                        truncate(&customer.name, 25),
                        customer.tax_id.as_deref().unwrap_or("-"),
                        customer
                            .birth_date
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_default(),
                        accounts.join(", ")
                    )?;
                }
            }
        }
        Ok(())
    }

    fn run_account_command<W: Write>(&mut self, cmd: AccountCommands, out: &mut W) -> Result<()> {
        match cmd {
            AccountCommands::New { tax_id } => {
                let account = self.service.open_account(&tax_id)?;
                writeln!(
                    out,
                    "Opened account: agency {} number {} for {}",
                    account.agency, account.number, account.holder
                )?;
            }

            AccountCommands::List => {
                let accounts = self.service.list_accounts();
                if accounts.is_empty() {
                    writeln!(out, "No accounts found.")?;
                    return Ok(());
                }
                writeln!(
                    out,
                    "{:<8} {:<8} {:<25} {:>12} WITHDRAWALS",
                    "AGENCY", "NUMBER", "HOLDER", "BALANCE"
                )?;
                writeln!(out, "{}", "-".repeat(68))?;
                for account in accounts {
                    writeln!(
                        out,
                        "{:<8} {:<8} {:<25} {:>12} {}",
                        account.agency,
                        account.number,
                        truncate(&account.holder, 25),
                        format_cents(account.balance),
                        withdrawal_usage(&account)
                    )?;
                }
            }
        }
        Ok(())
    }

    fn run_statement_command<W: Write>(
        &self,
        tax_id: &str,
        account: Option<AccountNumber>,
        out: &mut W,
    ) -> Result<()> {
        let statement = self.service.statement(tax_id, account)?;

        writeln!(out, "{:=^44}", " STATEMENT ")?;
        writeln!(
            out,
            "Agency {}  Account {}  {}",
            statement.agency, statement.number, statement.holder
        )?;
        writeln!(out)?;
        if statement.entries.is_empty() {
            writeln!(out, "No operations recorded.")?;
        } else {
            for entry in &statement.entries {
                let sign = match entry.kind {
                    EntryKind::Deposit => "+",
                    EntryKind::Withdrawal => "-",
                };
                writeln!(
                    out,
                    "{}  {:<10} {}{:>12}",
                    entry.timestamp.format("%d-%m-%Y %H:%M:%S"),
                    entry.kind,
                    sign,
                    format_cents(entry.amount)
                )?;
            }
        }
        writeln!(out)?;
        writeln!(out, "Deposits:    {:>12}", format_cents(statement.total_deposits))?;
        writeln!(
            out,
            "Withdrawals: {:>12}",
            format_cents(statement.total_withdrawals)
        )?;
        writeln!(out, "Balance:     {:>12}", format_cents(statement.balance))?;
        writeln!(out, "{}", "=".repeat(44))?;
        Ok(())
    }

    fn run_export_command<W: Write>(
        &self,
        export_type: &str,
        tax_id: Option<&str>,
        account: Option<AccountNumber>,
        format: ExportFormat,
        output: Option<&str>,
        out: &mut W,
    ) -> Result<()> {
        let exporter = Exporter::new(&self.service);

        let count = match output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file {}", path))?;
                export_to(&exporter, export_type, tax_id, account, format, file)?
            }
            None => export_to(&exporter, export_type, tax_id, account, format, &mut *out)?,
        };

        if let Some(path) = output {
            writeln!(
                out,
                "Exported {} {} row(s) to {} ({})",
                count,
                export_type,
                path,
                format.as_str()
            )?;
        }
        Ok(())
    }
}

fn export_to<W: Write>(
    exporter: &Exporter<'_>,
    export_type: &str,
    tax_id: Option<&str>,
    account: Option<AccountNumber>,
    format: ExportFormat,
    writer: W,
) -> Result<usize> {
    match export_type.to_lowercase().as_str() {
        "statement" => {
            let tax_id = tax_id.ok_or_else(|| anyhow!("Statement export needs --tax-id"))?;
            exporter.export_statement(writer, tax_id, account, format)
        }
        "accounts" => exporter.export_accounts(writer, format),
        _ => bail!(
            "Unknown export type '{}'. Valid types: statement, accounts",
            export_type
        ),
    }
}

fn print_operation<W: Write>(out: &mut W, result: &OperationResult) -> Result<()> {
    let verb = match result.entry.kind {
        EntryKind::Deposit => "Deposited",
        EntryKind::Withdrawal => "Withdrew",
    };
    writeln!(
        out,
        "{} {} (account {}). Balance: {}",
        verb,
        format_cents(result.entry.amount),
        result.account,
        format_cents(result.balance)
    )?;
    Ok(())
}

fn withdrawal_usage(account: &AccountSummary) -> String {
    match account.max_withdrawals {
        Some(max) => format!("{}/{}", account.withdrawals_made, max),
        None => account.withdrawals_made.to_string(),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d-%m-%Y"))
        .map_err(|e| anyhow!("Invalid date: {}", e))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Split a command line on whitespace, keeping quoted sections together.
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        bail!("Unterminated quote ({}) in command", q);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
