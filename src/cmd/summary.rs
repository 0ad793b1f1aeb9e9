//! Summary command - the overview tab: station totals and fuel type breakdown

use super::{read_report, report_title};
use crate::core::{
    aggregate_by_fuel_type, format_liters, format_percent, format_ugx, whole_shillings,
    FuelBreakdown, ReportSnapshot,
};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct SummaryCommand {
    /// JSON report snapshot ("-" for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Restrict to one tank (tank id)
    #[arg(short, long)]
    tank: Option<String>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// Summary data for JSON output
#[derive(Debug, Serialize)]
struct SummaryData {
    station_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    station_name: Option<String>,
    report_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tank_id: Option<String>,
    total_sales: String,
    total_profit: String,
    total_volume_sold: String,
    avg_variance: String,
    total_tanks: u32,
    high_variance_count: u32,
    fuel_types: Vec<FuelTypeData>,
}

#[derive(Debug, Serialize)]
struct FuelTypeData {
    fuel_type: String,
    sales: String,
    profit: String,
    volume: String,
    percent_of_total: String,
}

#[derive(Tabled)]
struct FuelRow {
    #[tabled(rename = "Fuel")]
    fuel: String,
    #[tabled(rename = "Tanks")]
    tanks: usize,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Sales")]
    sales: String,
    #[tabled(rename = "Profit")]
    profit: String,
    #[tabled(rename = "Share")]
    share: String,
}

impl SummaryCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let snapshot = read_report(&self.input, self.tank.as_deref())?;
        let breakdown = aggregate_by_fuel_type(&snapshot.reconciliations);
        if snapshot.tank_id.is_none() && breakdown.total_sales() != snapshot.summary.total_sales {
            log::warn!(
                "Record sales total {} differs from the station summary {}",
                breakdown.total_sales(),
                snapshot.summary.total_sales
            );
        }

        if self.json {
            let data = summary_data(&snapshot, &breakdown);
            println!("{}", serde_json::to_string_pretty(&data)?);
        } else {
            print_summary(&snapshot, &breakdown);
        }
        Ok(())
    }
}

fn summary_data(snapshot: &ReportSnapshot, breakdown: &FuelBreakdown) -> SummaryData {
    let summary = &snapshot.summary;
    SummaryData {
        station_id: snapshot.station_id.clone(),
        station_name: snapshot.station_name().map(str::to_string),
        report_date: snapshot.report_date.format("%Y-%m-%d").to_string(),
        tank_id: snapshot.tank_id.clone(),
        total_sales: whole_shillings(summary.total_sales).to_string(),
        total_profit: whole_shillings(summary.total_profit).to_string(),
        total_volume_sold: format!("{:.1}", summary.total_volume_sold),
        avg_variance: format!("{:.2}", summary.avg_variance),
        total_tanks: summary.total_tanks,
        high_variance_count: summary.high_variance_count,
        fuel_types: breakdown
            .iter()
            .map(|t| FuelTypeData {
                fuel_type: t.fuel_type.label().to_string(),
                sales: whole_shillings(t.sales).to_string(),
                profit: whole_shillings(t.profit).to_string(),
                volume: format!("{:.1}", t.volume),
                percent_of_total: format!("{:.2}", t.percent_of_total),
            })
            .collect(),
    }
}

pub fn print_summary(snapshot: &ReportSnapshot, breakdown: &FuelBreakdown) {
    let summary = &snapshot.summary;

    println!();
    println!("{}", report_title("DAILY RECONCILIATION", snapshot));
    println!();
    println!("OVERVIEW");
    println!(
        "  Sales: {} | Profit: {} | Volume Sold: {}",
        format_ugx(summary.total_sales),
        format_ugx(summary.total_profit),
        format_liters(summary.total_volume_sold)
    );
    println!(
        "  Tanks: {} | Avg Variance: {} | High Variance: {}",
        summary.total_tanks,
        format_percent(summary.avg_variance),
        summary.high_variance_count
    );
    println!();

    if breakdown.is_empty() {
        println!("No reconciliation records found for the selected filters");
        println!();
        return;
    }

    println!("SALES BY FUEL TYPE");
    let rows: Vec<FuelRow> = breakdown
        .iter()
        .map(|t| FuelRow {
            fuel: t.fuel_type.label().to_string(),
            tanks: t.tanks,
            volume: format_liters(t.volume),
            sales: format_ugx(t.sales),
            profit: format_ugx(t.profit),
            share: format_percent(t.percent_of_total),
        })
        .collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
    println!();
}
