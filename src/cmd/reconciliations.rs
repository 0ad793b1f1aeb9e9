//! Reconciliations command - per-tank rows with variance highlighting

use super::{read_report, report_title};
use crate::core::{
    classify, export_csv, format_liters, format_percent, format_ugx, is_high_variance,
    row_highlight, FuelType, ReconciliationRecord, ReportSnapshot,
};
use clap::{Args, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ReconciliationsCommand {
    /// JSON report snapshot ("-" for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Restrict to one tank (tank id)
    #[arg(short, long)]
    tank: Option<String>,

    /// Filter by fuel type
    #[arg(short, long, value_enum)]
    fuel: Option<FuelTypeArg>,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FuelTypeArg {
    Petrol,
    Diesel,
    Kerosene,
}

impl From<FuelTypeArg> for FuelType {
    fn from(arg: FuelTypeArg) -> Self {
        match arg {
            FuelTypeArg::Petrol => FuelType::Petrol,
            FuelTypeArg::Diesel => FuelType::Diesel,
            FuelTypeArg::Kerosene => FuelType::Kerosene,
        }
    }
}

/// Row for the reconciliations table output
#[derive(Debug, Clone, Tabled)]
pub struct ReconciliationRow {
    #[tabled(rename = "Tank")]
    pub tank: String,

    #[tabled(rename = "Fuel")]
    pub fuel: String,

    #[tabled(rename = "Opening")]
    pub opening: String,

    #[tabled(rename = "Delivered")]
    pub delivered: String,

    #[tabled(rename = "Dispensed")]
    pub dispensed: String,

    #[tabled(rename = "Expected")]
    pub expected: String,

    #[tabled(rename = "Closing")]
    pub closing: String,

    #[tabled(rename = "Variance")]
    pub variance: String,

    #[tabled(rename = "Flag")]
    pub flag: String,

    #[tabled(rename = "Sales")]
    pub sales: String,

    #[tabled(rename = "Profit")]
    pub profit: String,
}

impl From<&ReconciliationRecord> for ReconciliationRow {
    fn from(r: &ReconciliationRecord) -> Self {
        let highlight = row_highlight(r.variance_percentage);
        log::debug!(
            "Tank {} variance {}: row {}, severity {}",
            r.tank_number,
            r.variance_percentage,
            highlight.as_str(),
            classify(r.abs_variance()).label()
        );
        ReconciliationRow {
            tank: r.tank_number.clone(),
            fuel: r.fuel_type.label().to_string(),
            opening: format_liters(r.opening_stock_liters),
            delivered: format_liters(r.total_delivered_liters),
            dispensed: format_liters(r.total_dispensed_liters),
            expected: format_liters(r.expected_closing_stock_liters()),
            closing: format_liters(r.actual_closing_stock_liters),
            variance: format_percent(r.variance_percentage),
            flag: highlight.as_str().to_string(),
            sales: format_ugx(r.total_sales_ugx),
            profit: format_ugx(r.gross_profit_ugx),
        }
    }
}

impl ReconciliationsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let snapshot = read_report(&self.input, self.tank.as_deref())?;
        let fuel: Option<FuelType> = self.fuel.map(Into::into);
        let records: Vec<ReconciliationRecord> = snapshot
            .reconciliations
            .iter()
            .filter(|r| fuel.is_none_or(|f| r.fuel_type == f))
            .cloned()
            .collect();

        if self.csv {
            let csv = export_csv(&records)?;
            let mut stdout = io::stdout().lock();
            if !csv.is_empty() {
                writeln!(stdout, "{}", csv)?;
            }
            return Ok(());
        }

        print_reconciliations(&snapshot, &records);
        Ok(())
    }
}

pub fn print_reconciliations(snapshot: &ReportSnapshot, records: &[ReconciliationRecord]) {
    println!();
    println!("{}", report_title("RECONCILIATIONS", snapshot));
    println!();
    if records.is_empty() {
        println!("No reconciliation records found for the selected filters");
        println!();
        return;
    }

    let rows: Vec<ReconciliationRow> = records.iter().map(ReconciliationRow::from).collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);

    let flagged = records
        .iter()
        .filter(|r| is_high_variance(r.variance_percentage))
        .count();
    println!("{} of {} tanks flagged red (variance above 2%)", flagged, records.len());
    println!();
}
