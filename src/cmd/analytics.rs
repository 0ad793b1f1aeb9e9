//! Analytics command - sales share by fuel type and the variance distribution

use super::{read_report, report_title};
use crate::core::{
    aggregate_by_fuel_type, format_liters, format_percent, format_ugx, histogram, unbucketed,
    BucketCount, FuelBreakdown, ReportSnapshot,
};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct AnalyticsCommand {
    /// JSON report snapshot ("-" for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Restrict to one tank (tank id)
    #[arg(short, long)]
    tank: Option<String>,

    /// Output as JSON instead of formatted tables
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct AnalyticsData<'a> {
    record_count: usize,
    fuel_types: &'a FuelBreakdown,
    variance_distribution: &'a [BucketCount],
    outside_ranges: usize,
}

#[derive(Tabled)]
struct BucketRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "Tanks")]
    count: usize,
    #[tabled(rename = "Share")]
    share: String,
    #[tabled(rename = "")]
    bar: String,
}

#[derive(Tabled)]
struct ShareRow {
    #[tabled(rename = "Fuel")]
    fuel: String,
    #[tabled(rename = "Sales")]
    sales: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Share")]
    share: String,
}

const BAR_WIDTH: f64 = 30.0;

impl AnalyticsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let snapshot = read_report(&self.input, self.tank.as_deref())?;
        let breakdown = aggregate_by_fuel_type(&snapshot.reconciliations);
        let buckets = histogram(&snapshot.reconciliations);

        if self.json {
            let record_count = snapshot.reconciliations.len();
            let data = AnalyticsData {
                record_count,
                fuel_types: &breakdown,
                variance_distribution: &buckets,
                outside_ranges: unbucketed(&buckets, record_count),
            };
            println!("{}", serde_json::to_string_pretty(&data)?);
        } else {
            print_analytics(&snapshot, &breakdown, &buckets);
        }
        Ok(())
    }
}

pub fn print_analytics(snapshot: &ReportSnapshot, breakdown: &FuelBreakdown, buckets: &[BucketCount]) {
    println!();
    println!("{}", report_title("ANALYTICS", snapshot));
    println!();
    if snapshot.reconciliations.is_empty() {
        println!("No reconciliation records found for the selected filters");
        println!();
        return;
    }

    println!("SALES SHARE BY FUEL TYPE");
    let shares: Vec<ShareRow> = breakdown
        .iter()
        .map(|t| ShareRow {
            fuel: t.fuel_type.label().to_string(),
            sales: format_ugx(t.sales),
            volume: format_liters(t.volume),
            share: format_percent(t.percent_of_total),
        })
        .collect();
    let table = Table::new(shares)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
    println!();

    println!("VARIANCE DISTRIBUTION");
    let rows: Vec<BucketRow> = buckets
        .iter()
        .map(|b| BucketRow {
            severity: b.bucket.label.to_string(),
            range: b.bucket.range_label(),
            count: b.count,
            share: format_percent(b.percent_of_total),
            bar: "#".repeat((b.percent_of_total / 100.0 * BAR_WIDTH).round() as usize),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);

    let record_count = snapshot.reconciliations.len();
    let outside = unbucketed(buckets, record_count);
    if outside > 0 {
        println!(
            "{} of {} records outside all variance ranges (100% or more)",
            outside, record_count
        );
    }
    println!();
}
