//! Export command - write the reconciliation records as a CSV download

use super::read_report;
use crate::core::{export_csv, export_filename, FilenameDate, CSV_MIME_TYPE};
use chrono::Local;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ExportCommand {
    /// JSON report snapshot ("-" for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Restrict to one tank (tank id)
    #[arg(short, long)]
    tank: Option<String>,

    /// Directory the CSV file is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Date used in the file name
    #[arg(long, value_enum, default_value_t = FilenameDateArg::Report)]
    filename_date: FilenameDateArg,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum FilenameDateArg {
    /// The report date of the snapshot
    #[default]
    Report,
    /// The current date at export time
    Today,
}

impl From<FilenameDateArg> for FilenameDate {
    fn from(arg: FilenameDateArg) -> Self {
        match arg {
            FilenameDateArg::Report => FilenameDate::Report,
            FilenameDateArg::Today => FilenameDate::Today,
        }
    }
}

impl ExportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let snapshot = read_report(&self.input, self.tank.as_deref())?;
        let date = FilenameDate::from(self.filename_date)
            .date(snapshot.report_date, Local::now().date_naive());

        let csv = export_csv(&snapshot.reconciliations)?;
        let path = self.output_dir.join(export_filename(date));
        std::fs::write(&path, csv)?;

        log::info!(
            "Exported {} records as {} to {}",
            snapshot.reconciliations.len(),
            CSV_MIME_TYPE,
            path.display()
        );
        println!("CSV export written to: {}", path.display());
        Ok(())
    }
}
