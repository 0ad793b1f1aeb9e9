//! Watch command - keep a report tab on screen and refresh it periodically
//!
//! The report file stands in for the report endpoint: filter changes and
//! refresh ticks re-read it and re-render only when its content changed.

use super::analytics::print_analytics;
use super::export::FilenameDateArg;
use super::read_report;
use super::reconciliations::print_reconciliations;
use super::summary::print_summary;
use crate::core::{
    aggregate_by_fuel_type, export_csv, histogram, parse_report_date, Environment, ReportQuery,
    ReportSnapshot, Tab, ViewController, ViewEvent, ViewState, DEFAULT_ROUTE, REFRESH_INTERVAL,
};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct WatchCommand {
    /// JSON report snapshot file, re-read on every refresh
    #[arg(short, long)]
    input: PathBuf,

    /// Select a station (station id) after the first load
    #[arg(short, long)]
    station: Option<String>,

    /// Select a tank (tank id) after the first load
    #[arg(short, long)]
    tank: Option<String>,

    /// Select a report date (YYYY-MM-DD) after the first load
    #[arg(short, long, value_parser = parse_report_date)]
    date: Option<NaiveDate>,

    /// Tab kept on screen
    #[arg(long, value_enum, default_value_t = TabArg::Overview)]
    tab: TabArg,

    /// Seconds between refreshes
    #[arg(long, default_value_t = REFRESH_INTERVAL.as_secs())]
    interval: u64,

    /// Report route used for navigation URLs
    #[arg(long, default_value = DEFAULT_ROUTE)]
    route: String,

    /// Refresh even when stdout is not a terminal
    #[arg(long)]
    background: bool,

    /// Stop after this many refresh ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Write a CSV export here whenever the data changes
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Date used in export file names
    #[arg(long, value_enum, default_value_t = FilenameDateArg::Report)]
    filename_date: FilenameDateArg,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum TabArg {
    #[default]
    Overview,
    Reconciliations,
    Analytics,
}

impl From<TabArg> for Tab {
    fn from(arg: TabArg) -> Self {
        match arg {
            TabArg::Overview => Tab::Overview,
            TabArg::Reconciliations => Tab::Reconciliations,
            TabArg::Analytics => Tab::Analytics,
        }
    }
}

/// Environment backed by the report file and the terminal
struct TerminalEnv {
    input: PathBuf,
    background: bool,
    snapshot: ReportSnapshot,
    fingerprint: String,
    changed: bool,
}

impl TerminalEnv {
    fn load(&mut self, query: &ReportQuery) -> anyhow::Result<()> {
        let snapshot = read_report(&self.input, query.tank_id.as_deref())?;
        if query.station_id.as_deref() != Some(snapshot.station_id.as_str()) {
            log::warn!(
                "Requested station {:?} but {} holds station {}",
                query.station_id,
                self.input.display(),
                snapshot.station_id
            );
        }
        if query.report_date != snapshot.report_date {
            log::warn!(
                "Requested {} but {} holds {}",
                query.report_date,
                self.input.display(),
                snapshot.report_date
            );
        }

        let fingerprint = snapshot.fingerprint()?;
        self.changed = fingerprint != self.fingerprint;
        self.fingerprint = fingerprint;
        self.snapshot = snapshot;
        Ok(())
    }
}

impl Environment for TerminalEnv {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn is_visible(&self) -> bool {
        self.background || io::stdout().is_terminal()
    }

    fn navigate(&mut self, url: &str, query: &ReportQuery) -> anyhow::Result<()> {
        log::debug!("Loading {}", url);
        self.load(query)
    }

    fn refetch(&mut self, url: &str, query: &ReportQuery) -> anyhow::Result<()> {
        log::debug!("Refetching {}", url);
        self.load(query)
    }
}

impl WatchCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        if self.input.as_os_str() == "-" {
            anyhow::bail!("watch re-reads its input; pass a file, not stdin");
        }

        let snapshot = read_report(&self.input, None)?;
        let env = TerminalEnv {
            input: self.input.clone(),
            background: self.background,
            fingerprint: snapshot.fingerprint()?,
            changed: true,
            snapshot,
        };
        let state = ViewState::from_snapshot(&env.snapshot);
        let mut view = ViewController::new(state, env).with_route(self.route.as_str());

        view.dispatch(ViewEvent::TabSelected(self.tab.into()))?;
        if let Some(station) = &self.station {
            view.dispatch(ViewEvent::StationChanged(station.clone()))?;
        }
        if let Some(date) = self.date {
            view.dispatch(ViewEvent::DateChanged(date))?;
        }
        if let Some(tank) = &self.tank {
            view.dispatch(ViewEvent::TankChanged(Some(tank.clone())))?;
        }
        self.render(&mut view)?;

        let mut ticks = 0;
        while self.ticks.is_none_or(|max| ticks < max) {
            thread::sleep(Duration::from_secs(self.interval));
            ticks += 1;

            match view.refresh_tick() {
                Ok(true) if view.env().changed => self.render(&mut view)?,
                Ok(true) => log::debug!("Refresh {}: no changes", ticks),
                Ok(false) => log::debug!("Refresh {}: skipped, view hidden or no station", ticks),
                Err(e) => {
                    log::warn!("Refresh {} failed: {:#}", ticks, e);
                    view.dispatch(ViewEvent::Loaded)?;
                }
            }
        }
        Ok(())
    }

    fn render(&self, view: &mut ViewController<TerminalEnv>) -> anyhow::Result<()> {
        let snapshot = &view.env().snapshot;
        match view.state().active_tab {
            Tab::Overview => {
                print_summary(snapshot, &aggregate_by_fuel_type(&snapshot.reconciliations))
            }
            Tab::Reconciliations => print_reconciliations(snapshot, &snapshot.reconciliations),
            Tab::Analytics => print_analytics(
                snapshot,
                &aggregate_by_fuel_type(&snapshot.reconciliations),
                &histogram(&snapshot.reconciliations),
            ),
        }
        println!("Last refreshed {}", Local::now().format("%H:%M:%S"));

        if let Some(dir) = &self.export_dir {
            let path = dir.join(view.export_filename(self.filename_date.into()));
            std::fs::write(&path, export_csv(&snapshot.reconciliations)?)?;
            log::info!("Exported {} records to {}", snapshot.reconciliations.len(), path.display());
        }

        view.env_mut().changed = false;
        Ok(())
    }
}
