pub mod export;
pub mod format;
pub mod fuel;
pub mod histogram;
pub mod report;
pub mod variance;
pub mod view;

// Flat public surface for domain types and functions.
pub use export::{export_csv, export_filename, CSV_MIME_TYPE};
pub use format::{format_liters, format_percent, format_ugx, whole_shillings};
pub use fuel::{aggregate_by_fuel_type, FuelBreakdown};
pub use histogram::{histogram, unbucketed, BucketCount};
pub use report::{
    parse_report_date, read_snapshot_json, FieldSpec, FuelType, ReconciliationRecord,
    ReportError, ReportSnapshot,
};
pub use variance::{classify, is_high_variance, row_highlight};
pub use view::{
    transition, Environment, FilenameDate, ReportQuery, Tab, ViewController, ViewEvent, ViewState,
    DEFAULT_ROUTE, REFRESH_INTERVAL,
};
