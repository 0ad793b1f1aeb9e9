use chrono::NaiveDate;
use serde::Serialize;

pub const CSV_MIME_TYPE: &str = "text/csv";

/// Serialize records to CSV.
///
/// The header is taken from the record's serialized field names. No records
/// means no output at all, not even a header. Rows are joined with `\n`
/// without a trailing newline; fields containing a delimiter, quote or
/// newline are quoted.
pub fn export_csv<R: Serialize>(records: &[R]) -> anyhow::Result<String> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner()?;

    let mut out = String::from_utf8(bytes)?;
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

/// Download name for a reconciliation export, e.g. `daily-reconciliation-2024-03-05.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("daily-reconciliation-{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::{FuelType, ReconciliationRecord};
    use rust_decimal_macros::dec;

    #[derive(Serialize)]
    struct Pair {
        a: u32,
        b: u32,
    }

    #[derive(Serialize)]
    struct Note {
        tank: String,
        text: String,
    }

    #[test]
    fn empty_export_has_no_header() {
        let records: Vec<Pair> = Vec::new();
        assert_eq!(export_csv(&records).unwrap(), "");
    }

    #[test]
    fn header_then_rows_without_trailing_newline() {
        assert_eq!(export_csv(&[Pair { a: 1, b: 2 }]).unwrap(), "a,b\n1,2");
        assert_eq!(
            export_csv(&[Pair { a: 1, b: 2 }, Pair { a: 3, b: 4 }]).unwrap(),
            "a,b\n1,2\n3,4"
        );
    }

    #[test]
    fn embedded_delimiters_are_quoted() {
        let notes = [Note {
            tank: "T1, north".to_string(),
            text: "said \"ok\"".to_string(),
        }];
        assert_eq!(
            export_csv(&notes).unwrap(),
            "tank,text\n\"T1, north\",\"said \"\"ok\"\"\""
        );
    }

    #[test]
    fn reconciliation_columns_in_declaration_order() {
        let record = ReconciliationRecord {
            tank_number: "T1".to_string(),
            fuel_type: FuelType::Diesel,
            opening_stock_liters: 1000.0,
            total_delivered_liters: 500.0,
            total_dispensed_liters: 450.5,
            actual_closing_stock_liters: 1040.0,
            variance_percentage: -0.92,
            total_sales_ugx: dec!(2250000),
            gross_profit_ugx: dec!(180000),
        };
        let csv = export_csv(&[record]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some(
                "tank_number,fuel_type,opening_stock_liters,total_delivered_liters,\
                 total_dispensed_liters,actual_closing_stock_liters,variance_percentage,\
                 total_sales_ugx,gross_profit_ugx"
            )
        );
        assert_eq!(lines.next(), Some("T1,diesel,1000.0,500.0,450.5,1040.0,-0.92,2250000,180000"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn filename_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(export_filename(date), "daily-reconciliation-2024-03-05.csv");
    }
}
