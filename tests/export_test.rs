mod common;

use anyhow::Result;
use std::fs;
use std::io::Cursor;
use teller::cli::Shell;
use teller::io::{ExportFormat, Exporter};

use common::{test_service, StandardCustomers};

#[test]
fn test_export_statement_csv() -> Result<()> {
    let mut service = test_service()?;
    StandardCustomers::with_funded_account(&mut service, 100_000)?;
    service.withdraw(StandardCustomers::ANA, None, 12_345)?;

    let mut out = Vec::new();
    let count = Exporter::new(&service).export_statement(
        &mut out,
        StandardCustomers::ANA,
        None,
        ExportFormat::Csv,
    )?;

    assert_eq!(count, 2);
    let mut reader = csv::Reader::from_reader(out.as_slice());
    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][1], "deposit");
    assert_eq!(&rows[0][2], "1000.00");
    assert_eq!(&rows[1][1], "withdrawal");
    assert_eq!(&rows[1][2], "123.45");
    Ok(())
}

#[test]
fn test_export_statement_json() -> Result<()> {
    let mut service = test_service()?;
    StandardCustomers::with_funded_account(&mut service, 5_000)?;

    let mut out = Vec::new();
    Exporter::new(&service).export_statement(
        &mut out,
        StandardCustomers::ANA,
        None,
        ExportFormat::Json,
    )?;

    let value: serde_json::Value = serde_json::from_slice(&out)?;
    assert_eq!(value["holder"], "Ana Lima");
    assert_eq!(value["balance"], 5_000);
    assert_eq!(value["entries"][0]["kind"], "deposit");
    Ok(())
}

#[test]
fn test_export_accounts_csv() -> Result<()> {
    let mut service = test_service()?;
    StandardCustomers::register(&mut service)?;
    service.open_account(StandardCustomers::ANA)?;
    service.open_account(StandardCustomers::BRUNO)?;

    let mut out = Vec::new();
    let count = Exporter::new(&service).export_accounts(&mut out, ExportFormat::Csv)?;

    assert_eq!(count, 2);
    let text = String::from_utf8(out)?;
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], "agency,number,holder,kind,balance");
    assert_eq!(lines[1], "0001,1,Ana Lima,checking,0.00");
    assert_eq!(lines[2], "0001,2,Bruno Costa,checking,0.00");
    Ok(())
}

#[test]
fn test_export_from_shell_to_file() -> Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let path = temp_dir.path().join("statement.csv");

    let script = format!(
        r#"customer new --name "Ana Lima" --birth-date 1990-04-12 --tax-id 111 --address "Rua A"
account new --tax-id 111
deposit 250 --tax-id 111
withdraw 50 --tax-id 111
export statement --tax-id 111 --format csv --output "{}"
"#,
        path.display()
    );
    let mut shell = Shell::new(test_service()?);
    let mut out = Vec::new();
    shell.run(Cursor::new(script), &mut out, false)?;

    let output = String::from_utf8(out)?;
    assert!(output.contains("Exported 2 statement row(s)"));

    let written = fs::read_to_string(&path)?;
    assert_eq!(written.lines().count(), 3);
    assert!(written.starts_with("timestamp,kind,amount"));
    Ok(())
}

#[test]
fn test_export_unknown_type() -> Result<()> {
    let mut shell = Shell::new(test_service()?);
    let mut out = Vec::new();

    let result = shell.execute_line("export budgets", &mut out);

    assert!(result.is_err());
    Ok(())
}
