mod cmd;
mod core;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "fuelrec", version, about = "Daily fuel-tank reconciliation reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Station totals and sales by fuel type
    Summary(cmd::summary::SummaryCommand),
    /// Per-tank reconciliation rows with variance highlighting
    Reconciliations(cmd::reconciliations::ReconciliationsCommand),
    /// Fuel type shares and variance distribution
    Analytics(cmd::analytics::AnalyticsCommand),
    /// Write the records as a CSV download
    Export(cmd::export::ExportCommand),
    /// Generate an interactive HTML report
    Html(cmd::html::HtmlCommand),
    /// Keep the overview on screen, refreshing periodically
    Watch(cmd::watch::WatchCommand),
    /// Print the input schema or export columns
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Summary(c) => c.exec(),
        Command::Reconciliations(c) => c.exec(),
        Command::Analytics(c) => c.exec(),
        Command::Export(c) => c.exec(),
        Command::Html(c) => c.exec(),
        Command::Watch(c) => c.exec(),
        Command::Schema(c) => c.exec(),
    }
}
