use anyhow::Result;
use std::io::Write;

use crate::application::{AccountSummary, BankService, Statement};
use crate::domain::{format_cents, AccountNumber};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// Exporter for rendering account data to CSV or JSON.
pub struct Exporter<'a> {
    service: &'a BankService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a BankService) -> Self {
        Self { service }
    }

    /// Export the statement of one account. Returns the number of entries
    /// written.
    pub fn export_statement<W: Write>(
        &self,
        writer: W,
        tax_id: &str,
        account: Option<AccountNumber>,
        format: ExportFormat,
    ) -> Result<usize> {
        let statement = self.service.statement(tax_id, account)?;
        match format {
            ExportFormat::Csv => export_statement_csv(writer, &statement),
            ExportFormat::Json => export_statement_json(writer, &statement),
        }
    }

    /// Export the account listing. Returns the number of accounts written.
    pub fn export_accounts<W: Write>(&self, writer: W, format: ExportFormat) -> Result<usize> {
        let accounts = self.service.list_accounts();
        match format {
            ExportFormat::Csv => export_accounts_csv(writer, &accounts),
            ExportFormat::Json => {
                serde_json::to_writer_pretty(writer, &accounts)?;
                Ok(accounts.len())
            }
        }
    }
}

/// Write statement entries as CSV: `timestamp,kind,amount`.
pub fn export_statement_csv<W: Write>(writer: W, statement: &Statement) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["timestamp", "kind", "amount"])?;

    for entry in &statement.entries {
        csv_writer.write_record([
            entry.timestamp.to_rfc3339(),
            entry.kind.as_str().to_string(),
            format_cents(entry.amount),
        ])?;
    }

    csv_writer.flush()?;
    Ok(statement.entries.len())
}

/// Write the whole statement as pretty JSON.
pub fn export_statement_json<W: Write>(mut writer: W, statement: &Statement) -> Result<usize> {
    serde_json::to_writer_pretty(&mut writer, statement)?;
    writeln!(writer)?;
    Ok(statement.entries.len())
}

fn export_accounts_csv<W: Write>(writer: W, accounts: &[AccountSummary]) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["agency", "number", "holder", "kind", "balance"])?;

    for account in accounts {
        csv_writer.write_record([
            account.agency.clone(),
            account.number.to_string(),
            account.holder.clone(),
            account.kind.clone(),
            format_cents(account.balance),
        ])?;
    }

    csv_writer.flush()?;
    Ok(accounts.len())
}
