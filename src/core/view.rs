//! Report view state machine.
//!
//! Transitions are pure: `transition` maps a state and an event to the next
//! state plus an optional [`Effect`]. [`ViewController`] owns the state and
//! carries out effects through an injected [`Environment`], so the same rules
//! drive the terminal `watch` loop and the tests.

use super::export::export_filename;
use super::report::ReportSnapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ROUTE: &str = "/reports/daily-reconciliation";

/// How often a visible view refetches its data
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Overview,
    Reconciliations,
    Analytics,
}

impl Tab {
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Reconciliations => "reconciliations",
            Tab::Analytics => "analytics",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub active_tab: Tab,
    pub selected_station: Option<String>,
    pub selected_date: NaiveDate,
    pub selected_tank: Option<String>,
    pub loading: bool,
}

impl ViewState {
    /// Initial state for a freshly rendered report
    pub fn from_snapshot(snapshot: &ReportSnapshot) -> Self {
        ViewState {
            active_tab: Tab::default(),
            selected_station: Some(snapshot.station_id.clone()).filter(|s| !s.is_empty()),
            selected_date: snapshot.report_date,
            selected_tank: snapshot.tank_id.clone().filter(|t| !t.is_empty()),
            loading: false,
        }
    }

    pub fn query(&self) -> ReportQuery {
        ReportQuery {
            station_id: self.selected_station.clone(),
            report_date: self.selected_date,
            tank_id: self.selected_tank.clone(),
        }
    }

    fn has_station(&self) -> bool {
        self.selected_station.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Parameters of the report route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub station_id: Option<String>,
    pub report_date: NaiveDate,
    pub tank_id: Option<String>,
}

impl ReportQuery {
    /// `<route>?station_id=..&report_date=..&tank_id=..`, `tank_id` empty when unset
    pub fn to_url(&self, route: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("station_id", self.station_id.as_deref().unwrap_or_default())
            .append_pair("report_date", &self.report_date.format("%Y-%m-%d").to_string())
            .append_pair("tank_id", self.tank_id.as_deref().unwrap_or_default())
            .finish();
        format!("{route}?{query}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    StationChanged(String),
    DateChanged(NaiveDate),
    TankChanged(Option<String>),
    TabSelected(Tab),
    /// Periodic timer fired; `visible` is whether the view is currently shown
    RefreshTick { visible: bool },
    /// A navigation or refetch finished
    Loaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace the view with the report for a new selection
    Navigate(ReportQuery),
    /// Reload the data for the current selection in place
    Refetch(ReportQuery),
}

impl Effect {
    pub fn query(&self) -> &ReportQuery {
        match self {
            Effect::Navigate(q) | Effect::Refetch(q) => q,
        }
    }
}

pub fn transition(state: &ViewState, event: ViewEvent) -> (ViewState, Option<Effect>) {
    let mut next = state.clone();
    let effect = match event {
        ViewEvent::StationChanged(station) => {
            next.selected_station = Some(station).filter(|s| !s.is_empty());
            next.loading = true;
            Some(Effect::Navigate(next.query()))
        }
        ViewEvent::DateChanged(date) => {
            next.selected_date = date;
            next.loading = true;
            Some(Effect::Navigate(next.query()))
        }
        ViewEvent::TankChanged(tank) => {
            next.selected_tank = tank.filter(|t| !t.is_empty());
            next.loading = true;
            Some(Effect::Navigate(next.query()))
        }
        ViewEvent::TabSelected(tab) => {
            log::debug!("Switching to {} tab", tab.as_str());
            next.active_tab = tab;
            None
        }
        ViewEvent::RefreshTick { visible } => {
            if visible && state.has_station() {
                next.loading = true;
                Some(Effect::Refetch(next.query()))
            } else {
                None
            }
        }
        ViewEvent::Loaded => {
            next.loading = false;
            None
        }
    };
    (next, effect)
}

/// Capabilities the view needs from its host
pub trait Environment {
    /// Current date, used for export file names stamped at export time
    fn today(&self) -> NaiveDate;
    /// Whether the view is currently shown to the user
    fn is_visible(&self) -> bool;
    fn navigate(&mut self, url: &str, query: &ReportQuery) -> anyhow::Result<()>;
    fn refetch(&mut self, url: &str, query: &ReportQuery) -> anyhow::Result<()>;
}

/// Which date stamps the CSV export file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilenameDate {
    /// The report date being viewed
    #[default]
    Report,
    /// The date the export happens
    Today,
}

impl FilenameDate {
    /// The date stamped into the export file name
    pub fn date(self, report_date: NaiveDate, today: NaiveDate) -> NaiveDate {
        match self {
            FilenameDate::Report => report_date,
            FilenameDate::Today => today,
        }
    }
}

pub struct ViewController<E> {
    state: ViewState,
    env: E,
    route: String,
}

impl<E: Environment> ViewController<E> {
    pub fn new(state: ViewState, env: E) -> Self {
        ViewController {
            state,
            env,
            route: DEFAULT_ROUTE.to_string(),
        }
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Apply an event, carrying out any effect it produces.
    ///
    /// On a failed effect the view stays in the loading state and the error
    /// is returned.
    pub fn dispatch(&mut self, event: ViewEvent) -> anyhow::Result<Option<Effect>> {
        log::debug!("View event {:?} in state {:?}", event, self.state);
        let (next, effect) = transition(&self.state, event);
        self.state = next;

        if let Some(ref effect) = effect {
            let url = effect.query().to_url(&self.route);
            match effect {
                Effect::Navigate(query) => {
                    log::info!("Navigating to {}", url);
                    self.env.navigate(&url, query)?;
                }
                Effect::Refetch(query) => {
                    log::info!("Refreshing {}", url);
                    self.env.refetch(&url, query)?;
                }
            }
            self.state = transition(&self.state, ViewEvent::Loaded).0;
        }
        Ok(effect)
    }

    /// Fire the periodic refresh; returns whether data was refetched
    pub fn refresh_tick(&mut self) -> anyhow::Result<bool> {
        let visible = self.env.is_visible();
        let effect = self.dispatch(ViewEvent::RefreshTick { visible })?;
        Ok(effect.is_some())
    }

    pub fn export_filename(&self, date: FilenameDate) -> String {
        export_filename(date.date(self.state.selected_date, self.env.today()))
    }
}
