use chrono::NaiveDate;
use fuelrec_derive::RecordSchema;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Read;

/// Fuel product stored in a tank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Petrol,
    Diesel,
    Kerosene,
}

impl FuelType {
    pub fn label(self) -> &'static str {
        match self {
            FuelType::Petrol => "Petrol",
            FuelType::Diesel => "Diesel",
            FuelType::Kerosene => "Kerosene",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Column metadata generated by `#[derive(RecordSchema)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// One tank's reconciliation for the report date.
///
/// Field order is the column order of the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, RecordSchema)]
pub struct ReconciliationRecord {
    /// Tank identifier as labelled on the forecourt
    pub tank_number: String,
    /// Fuel stored in the tank (petrol, diesel, kerosene)
    pub fuel_type: FuelType,
    /// Stock at the start of the day in liters
    #[serde(default, deserialize_with = "zero_if_null")]
    pub opening_stock_liters: f64,
    /// Sum of deliveries received during the day in liters
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_delivered_liters: f64,
    /// Volume dispensed through the pumps in liters
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_dispensed_liters: f64,
    /// Dipped stock at the end of the day in liters
    #[serde(default, deserialize_with = "zero_if_null")]
    pub actual_closing_stock_liters: f64,
    /// Signed variance against expected closing stock (positive = surplus)
    #[serde(default, deserialize_with = "zero_if_null")]
    pub variance_percentage: f64,
    /// Sales value in UGX
    #[serde(default, deserialize_with = "zero_if_null")]
    #[schemars(with = "f64")]
    pub total_sales_ugx: Decimal,
    /// Gross profit in UGX
    #[serde(default, deserialize_with = "zero_if_null")]
    #[schemars(with = "f64")]
    pub gross_profit_ugx: Decimal,
}

impl ReconciliationRecord {
    /// Closing stock implied by the meter readings, before variance
    pub fn expected_closing_stock_liters(&self) -> f64 {
        self.opening_stock_liters + self.total_delivered_liters - self.total_dispensed_liters
    }

    pub fn abs_variance(&self) -> f64 {
        self.variance_percentage.abs()
    }
}

/// Station-level totals computed upstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SummaryAggregate {
    #[serde(deserialize_with = "zero_if_null")]
    #[schemars(with = "f64")]
    pub total_sales: Decimal,
    #[serde(deserialize_with = "zero_if_null")]
    #[schemars(with = "f64")]
    pub total_profit: Decimal,
    #[serde(deserialize_with = "zero_if_null")]
    pub total_volume_sold: f64,
    #[serde(deserialize_with = "zero_if_null")]
    pub avg_variance: f64,
    #[serde(deserialize_with = "zero_if_null")]
    pub total_tanks: u32,
    #[serde(deserialize_with = "zero_if_null")]
    pub high_variance_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StationOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TankOption {
    pub id: String,
    pub tank_number: String,
    pub fuel_type: FuelType,
}

/// Everything the report screen is rendered from, for one (station, date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportSnapshot {
    #[serde(default, deserialize_with = "zero_if_null")]
    pub summary: SummaryAggregate,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub reconciliations: Vec<ReconciliationRecord>,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub accessible_stations: Vec<StationOption>,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub available_tanks: Vec<TankOption>,
    #[schemars(with = "String")]
    pub report_date: NaiveDate,
    pub station_id: String,
    #[serde(default)]
    pub tank_id: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("tank '{tank_id}' is not available at station '{station_id}'")]
    UnknownTank { station_id: String, tank_id: String },
    #[error("invalid report date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("no report data received")]
    EmptyInput,
}

impl ReportSnapshot {
    pub fn station_name(&self) -> Option<&str> {
        self.accessible_stations
            .iter()
            .find(|s| s.id == self.station_id)
            .map(|s| s.name.as_str())
    }

    pub fn tank(&self, tank_id: &str) -> Option<&TankOption> {
        self.available_tanks.iter().find(|t| t.id == tank_id)
    }

    /// Restrict the records to a single tank, as the report route does for `tank_id`
    pub fn filter_tank(mut self, tank_id: &str) -> Result<Self, ReportError> {
        let tank_number = self
            .tank(tank_id)
            .map(|t| t.tank_number.clone())
            .ok_or_else(|| ReportError::UnknownTank {
                station_id: self.station_id.clone(),
                tank_id: tank_id.to_string(),
            })?;
        self.reconciliations.retain(|r| r.tank_number == tank_number);
        self.tank_id = Some(tank_id.to_string());
        Ok(self)
    }

    /// SHA-256 of the snapshot's JSON form, hex encoded. Equal fingerprints
    /// mean a refetch brought nothing new.
    pub fn fingerprint(&self) -> anyhow::Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// Read a report snapshot (JSON)
pub fn read_snapshot_json<R: Read>(reader: R) -> anyhow::Result<ReportSnapshot> {
    let snapshot: ReportSnapshot = serde_json::from_reader(reader)?;
    log::info!(
        "Read {} reconciliation records for station {} on {}",
        snapshot.reconciliations.len(),
        snapshot.station_id,
        snapshot.report_date
    );
    Ok(snapshot)
}

pub fn parse_report_date(s: &str) -> Result<NaiveDate, ReportError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ReportError::InvalidDate(s.to_string()))
}

/// Treat an explicit `null` the same as a missing value
fn zero_if_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
