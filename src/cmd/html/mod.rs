//! HTML report generation
//!
//! Generates a self-contained HTML file with embedded CSS/JS: overview,
//! reconciliations and analytics tabs, client-side fuel filtering and CSV export.

use super::export::FilenameDateArg;
use super::read_report;
use super::watch::TabArg;
use crate::core::{
    aggregate_by_fuel_type, export_csv, export_filename, format_liters, format_percent,
    format_ugx, histogram, row_highlight, transition, FilenameDate, ReconciliationRecord,
    ReportSnapshot, Tab, ViewEvent, ViewState, CSV_MIME_TYPE, DEFAULT_ROUTE, REFRESH_INTERVAL,
};
use crate::core::report::{StationOption, TankOption};
use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

const TEMPLATE: &str = include_str!("report.html");
const CSS: &str = include_str!("report.css");
const JS: &str = include_str!("report.js");

#[derive(Args, Debug)]
pub struct HtmlCommand {
    /// JSON report snapshot ("-" for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Restrict to one tank (tank id)
    #[arg(short, long)]
    tank: Option<String>,

    /// Output file path (default: opens in browser)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report route the station/date/tank filters navigate to
    #[arg(long, default_value = DEFAULT_ROUTE)]
    route: String,

    /// Endpoint returning fresh page data (as printed by --data-json); enables auto refresh
    #[arg(long)]
    refresh_url: Option<String>,

    /// Date used in the export file name
    #[arg(long, value_enum, default_value_t = FilenameDateArg::Report)]
    filename_date: FilenameDateArg,

    /// Tab shown when the page opens
    #[arg(long, value_enum, default_value_t = TabArg::Overview)]
    tab: TabArg,

    /// Print the page data as JSON instead of HTML
    #[arg(long)]
    data_json: bool,
}

impl HtmlCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let snapshot = read_report(&self.input, self.tank.as_deref())?;
        let options = PageOptions {
            route: self.route.clone(),
            refresh_url: self.refresh_url.clone(),
            export_date: FilenameDate::from(self.filename_date)
                .date(snapshot.report_date, Local::now().date_naive()),
            tab: self.tab.into(),
        };
        let data = build_page_data(&snapshot, &options)?;

        if self.data_json {
            println!("{}", serde_json::to_string_pretty(&data)?);
            return Ok(());
        }

        let html = render(&data)?;
        if let Some(ref output_path) = self.output {
            std::fs::write(output_path, &html)?;
            println!("HTML report written to: {}", output_path.display());
        } else {
            let file_name = format!(
                "fuelrec-{}-{}.html",
                snapshot.station_id,
                snapshot.report_date.format("%Y-%m-%d")
            );
            let temp_path = std::env::temp_dir().join(file_name);
            std::fs::write(&temp_path, &html)?;
            opener::open(&temp_path)?;
            println!("Opened HTML report in browser: {}", temp_path.display());
        }
        Ok(())
    }
}

pub struct PageOptions {
    pub route: String,
    pub refresh_url: Option<String>,
    pub export_date: NaiveDate,
    pub tab: Tab,
}

/// Data embedded in the page as JSON
#[derive(Debug, Serialize)]
pub struct PageData {
    pub title: String,
    pub station_id: String,
    pub report_date: String,
    pub route: String,
    pub refresh_url: Option<String>,
    pub refresh_seconds: u64,
    pub state: ViewState,
    pub summary: SummaryCards,
    pub records: Vec<RecordRow>,
    pub fuel_types: Vec<FuelShare>,
    pub variance_buckets: Vec<BucketBar>,
    pub stations: Vec<StationOption>,
    pub tanks: Vec<TankOption>,
    pub csv: String,
    pub csv_filename: String,
    pub csv_mime: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SummaryCards {
    pub total_sales: String,
    pub total_profit: String,
    pub total_volume_sold: String,
    pub avg_variance: String,
    pub total_tanks: u32,
    pub high_variance_count: u32,
}

#[derive(Debug, Serialize)]
pub struct RecordRow {
    pub tank_number: String,
    pub fuel_type: String,
    pub fuel_label: String,
    pub opening: String,
    pub delivered: String,
    pub dispensed: String,
    pub expected: String,
    pub closing: String,
    pub variance: String,
    pub highlight: &'static str,
    pub sales: String,
    pub profit: String,
}

#[derive(Debug, Serialize)]
pub struct FuelShare {
    pub fuel_type: String,
    pub label: String,
    pub sales: String,
    pub volume: String,
    pub percent: f64,
    pub percent_label: String,
}

#[derive(Debug, Serialize)]
pub struct BucketBar {
    pub label: &'static str,
    pub range: String,
    pub color_tag: &'static str,
    pub count: usize,
    pub percent: f64,
    pub percent_label: String,
}

pub fn build_page_data(snapshot: &ReportSnapshot, options: &PageOptions) -> anyhow::Result<PageData> {
    let summary = &snapshot.summary;
    let records = &snapshot.reconciliations;

    let fuel_types: Vec<FuelShare> = aggregate_by_fuel_type(records)
        .iter()
        .map(|t| FuelShare {
            fuel_type: t.fuel_type.label().to_lowercase(),
            label: t.fuel_type.label().to_string(),
            sales: format_ugx(t.sales),
            volume: format_liters(t.volume),
            percent: t.percent_of_total,
            percent_label: format_percent(t.percent_of_total),
        })
        .collect();

    let variance_buckets: Vec<BucketBar> = histogram(records)
        .iter()
        .map(|b| BucketBar {
            label: b.bucket.label,
            range: b.bucket.range_label(),
            color_tag: b.bucket.color_tag,
            count: b.count,
            percent: b.percent_of_total,
            percent_label: format_percent(b.percent_of_total),
        })
        .collect();

    Ok(PageData {
        title: super::report_title("Daily Reconciliation", snapshot),
        station_id: snapshot.station_id.clone(),
        report_date: snapshot.report_date.format("%Y-%m-%d").to_string(),
        route: options.route.clone(),
        refresh_url: options.refresh_url.clone(),
        refresh_seconds: REFRESH_INTERVAL.as_secs(),
        state: initial_state(snapshot, options.tab),
        summary: SummaryCards {
            total_sales: format_ugx(summary.total_sales),
            total_profit: format_ugx(summary.total_profit),
            total_volume_sold: format_liters(summary.total_volume_sold),
            avg_variance: format_percent(summary.avg_variance),
            total_tanks: summary.total_tanks,
            high_variance_count: summary.high_variance_count,
        },
        records: records.iter().map(record_row).collect(),
        fuel_types,
        variance_buckets,
        stations: snapshot.accessible_stations.clone(),
        tanks: snapshot.available_tanks.clone(),
        csv: export_csv(records)?,
        csv_filename: export_filename(options.export_date),
        csv_mime: CSV_MIME_TYPE,
    })
}

fn initial_state(snapshot: &ReportSnapshot, tab: Tab) -> ViewState {
    let (state, _) = transition(&ViewState::from_snapshot(snapshot), ViewEvent::TabSelected(tab));
    state
}

fn record_row(r: &ReconciliationRecord) -> RecordRow {
    RecordRow {
        tank_number: r.tank_number.clone(),
        fuel_type: r.fuel_type.label().to_lowercase(),
        fuel_label: r.fuel_type.label().to_string(),
        opening: format_liters(r.opening_stock_liters),
        delivered: format_liters(r.total_delivered_liters),
        dispensed: format_liters(r.total_dispensed_liters),
        expected: format_liters(r.expected_closing_stock_liters()),
        closing: format_liters(r.actual_closing_stock_liters),
        variance: format_percent(r.variance_percentage),
        highlight: row_highlight(r.variance_percentage).as_str(),
        sales: format_ugx(r.total_sales_ugx),
        profit: format_ugx(r.gross_profit_ugx),
    }
}

/// Generate HTML report content
pub fn render(data: &PageData) -> anyhow::Result<String> {
    // `</` inside the embedded JSON would end the script element early
    let json_data = serde_json::to_string(data)?.replace("</", "<\\/");
    let js = fill_template(JS, &[("__JSON_DATA__", json_data.as_str())]);
    let title = escape_html(&data.title);

    Ok(fill_template(
        TEMPLATE,
        &[("__TITLE__", title.as_str()), ("__CSS__", CSS), ("__JS__", js.as_str())],
    ))
}

/// Replace each marker in one left-to-right pass; inserted values are never
/// scanned for markers again
fn fill_template(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some((pos, marker, value)) = slots
        .iter()
        .filter_map(|&(marker, value)| rest.find(marker).map(|pos| (pos, marker, value)))
        .min_by_key(|&(pos, _, _)| pos)
    {
        out.push_str(&rest[..pos]);
        out.push_str(value);
        rest = &rest[pos + marker.len()..];
    }
    out.push_str(rest);
    out
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::read_snapshot_json;

    const SNAPSHOT: &str = r#"{
        "summary": { "total_sales": 400, "total_profit": 40, "total_tanks": 2 },
        "reconciliations": [
            { "tank_number": "T1", "fuel_type": "petrol", "total_dispensed_liters": 50,
              "variance_percentage": 0.5, "total_sales_ugx": 100 },
            { "tank_number": "T2</script>", "fuel_type": "diesel", "total_dispensed_liters": 150,
              "variance_percentage": 3.0, "total_sales_ugx": 300 }
        ],
        "accessible_stations": [{ "id": "7", "name": "Jinja & Sons" }],
        "report_date": "2024-03-05",
        "station_id": "7"
    }"#;

    fn page() -> PageData {
        let snapshot = read_snapshot_json(SNAPSHOT.as_bytes()).unwrap();
        let options = PageOptions {
            route: DEFAULT_ROUTE.to_string(),
            refresh_url: None,
            export_date: snapshot.report_date,
            tab: Tab::Overview,
        };
        build_page_data(&snapshot, &options).unwrap()
    }

    fn title_element(html: &str) -> &str {
        let start = html.find("<title>").unwrap() + "<title>".len();
        let end = html.find("</title>").unwrap();
        &html[start..end]
    }

    #[test]
    fn page_data_carries_breakdowns() {
        let data = page();
        assert_eq!(data.records.len(), 2);
        assert_eq!(data.records[0].highlight, "green");
        assert_eq!(data.records[1].highlight, "red");

        assert_eq!(data.fuel_types[0].fuel_type, "petrol");
        assert_eq!(data.fuel_types[0].percent_label, "25.00%");
        assert_eq!(data.fuel_types[1].percent_label, "75.00%");

        let counts: Vec<_> = data.variance_buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 0, 1, 0]);

        assert_eq!(data.csv_filename, "daily-reconciliation-2024-03-05.csv");
        assert!(data.csv.starts_with("tank_number,fuel_type,"));
        assert_eq!(data.summary.total_sales, "UGX 400");
    }

    #[test]
    fn rendered_page_embeds_data_safely() {
        let html = render(&page()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Jinja &amp; Sons"));
        assert!(html.contains("T2<\\/script>"));
        assert!(!html.contains("T2</script>"));
        assert!(!html.contains("__JSON_DATA__"));
        assert!(!html.contains("__CSS__"));
    }

    #[test]
    fn markers_in_station_names_are_left_alone() {
        let json = SNAPSHOT.replace("Jinja & Sons", "__CSS__ __JS__ Depot");
        let snapshot = read_snapshot_json(json.as_bytes()).unwrap();
        let options = PageOptions {
            route: DEFAULT_ROUTE.to_string(),
            refresh_url: None,
            export_date: snapshot.report_date,
            tab: Tab::Overview,
        };
        let html = render(&build_page_data(&snapshot, &options).unwrap()).unwrap();

        assert_eq!(
            title_element(&html),
            "Daily Reconciliation (__CSS__ __JS__ Depot, 2024-03-05)"
        );
        assert_eq!(html.matches("--primary").count(), CSS.matches("--primary").count());
    }

    #[test]
    fn fill_template_is_single_pass() {
        let out = fill_template("<a>__X__</a><b>__Y__</b>", &[("__X__", "__Y__"), ("__Y__", "y")]);
        assert_eq!(out, "<a>__Y__</a><b>y</b>");
    }

    #[test]
    fn initial_tab_goes_through_the_view_state() {
        let snapshot = read_snapshot_json(SNAPSHOT.as_bytes()).unwrap();
        let options = PageOptions {
            route: DEFAULT_ROUTE.to_string(),
            refresh_url: None,
            export_date: snapshot.report_date,
            tab: Tab::Analytics,
        };
        let data = build_page_data(&snapshot, &options).unwrap();
        assert_eq!(data.state.active_tab, Tab::Analytics);
        assert!(!data.state.loading);
    }
}
