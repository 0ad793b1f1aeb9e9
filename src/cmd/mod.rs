pub mod analytics;
pub mod export;
pub mod html;
pub mod reconciliations;
pub mod schema;
pub mod summary;
pub mod watch;

use crate::core::{read_snapshot_json, ReportError, ReportSnapshot};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read a report snapshot (JSON) from a file, or stdin with "-", optionally
/// narrowed to one tank
pub fn read_report(path: &Path, tank: Option<&str>) -> anyhow::Result<ReportSnapshot> {
    let snapshot = if path.as_os_str() == "-" {
        read_from_stdin()?
    } else {
        read_from_file(path)?
    };

    match tank.filter(|t| !t.is_empty()) {
        Some(tank_id) => Ok(snapshot.filter_tank(tank_id)?),
        None => Ok(snapshot),
    }
}

fn read_from_file(path: &Path) -> anyhow::Result<ReportSnapshot> {
    let file = File::open(path)?;
    read_snapshot_json(BufReader::new(file))
}

fn read_from_stdin() -> anyhow::Result<ReportSnapshot> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        return Err(ReportError::EmptyInput.into());
    }

    read_snapshot_json(io::Cursor::new(buffer))
}

/// Header line naming the station and date a report covers
pub fn report_title(title: &str, snapshot: &ReportSnapshot) -> String {
    let station = snapshot
        .station_name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("station {}", snapshot.station_id));
    let mut line = format!(
        "{} ({}, {})",
        title,
        station,
        snapshot.report_date.format("%Y-%m-%d")
    );
    if let Some(tank) = snapshot.tank_id.as_deref().and_then(|id| snapshot.tank(id)) {
        line.push_str(&format!(" - tank {}", tank.tank_number));
    }
    line
}
