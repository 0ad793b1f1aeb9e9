use super::report::{FuelType, ReconciliationRecord};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Totals for one fuel type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelTotals {
    pub fuel_type: FuelType,
    pub sales: Decimal,
    pub profit: Decimal,
    pub volume: f64,
    pub tanks: usize,
    /// Share of all sales, 0 when there were no sales
    pub percent_of_total: f64,
}

/// Per fuel type breakdown, in the order fuel types first appear in the records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FuelBreakdown(Vec<FuelTotals>);

impl FuelBreakdown {
    pub fn iter(&self) -> impl Iterator<Item = &FuelTotals> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_sales(&self) -> Decimal {
        self.0.iter().map(|t| t.sales).sum()
    }
}

impl<'a> IntoIterator for &'a FuelBreakdown {
    type Item = &'a FuelTotals;
    type IntoIter = std::slice::Iter<'a, FuelTotals>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Group records by fuel type, summing sales, profit and dispensed volume
pub fn aggregate_by_fuel_type(records: &[ReconciliationRecord]) -> FuelBreakdown {
    let mut groups: Vec<FuelTotals> = Vec::new();

    for record in records {
        let idx = match groups.iter().position(|g| g.fuel_type == record.fuel_type) {
            Some(idx) => idx,
            None => {
                groups.push(FuelTotals {
                    fuel_type: record.fuel_type,
                    sales: Decimal::ZERO,
                    profit: Decimal::ZERO,
                    volume: 0.0,
                    tanks: 0,
                    percent_of_total: 0.0,
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[idx];
        group.sales += record.total_sales_ugx;
        group.profit += record.gross_profit_ugx;
        group.volume += record.total_dispensed_liters;
        group.tanks += 1;
    }

    let total_sales: Decimal = records.iter().map(|r| r.total_sales_ugx).sum();
    for group in &mut groups {
        group.percent_of_total = percent_of(group.sales, total_sales);
    }

    FuelBreakdown(groups)
}

fn percent_of(part: Decimal, total: Decimal) -> f64 {
    if total <= Decimal::ZERO {
        return 0.0;
    }
    (part / total * dec!(100)).to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(breakdown: &FuelBreakdown, fuel_type: FuelType) -> Option<&FuelTotals> {
        breakdown.iter().find(|t| t.fuel_type == fuel_type)
    }

    fn record(tank: &str, fuel_type: FuelType, sales: Decimal, volume: f64) -> ReconciliationRecord {
        ReconciliationRecord {
            tank_number: tank.to_string(),
            fuel_type,
            opening_stock_liters: 0.0,
            total_delivered_liters: 0.0,
            total_dispensed_liters: volume,
            actual_closing_stock_liters: 0.0,
            variance_percentage: 0.0,
            total_sales_ugx: sales,
            gross_profit_ugx: sales / dec!(10),
        }
    }

    #[test]
    fn petrol_and_diesel_shares() {
        let records = vec![
            record("T1", FuelType::Petrol, dec!(100), 50.0),
            record("T2", FuelType::Diesel, dec!(300), 150.0),
        ];
        let breakdown = aggregate_by_fuel_type(&records);

        let petrol = get(&breakdown, FuelType::Petrol).unwrap();
        assert_eq!(petrol.sales, dec!(100));
        assert_eq!(petrol.volume, 50.0);
        assert_eq!(petrol.percent_of_total, 25.0);

        let diesel = get(&breakdown, FuelType::Diesel).unwrap();
        assert_eq!(diesel.sales, dec!(300));
        assert_eq!(diesel.volume, 150.0);
        assert_eq!(diesel.percent_of_total, 75.0);

        assert!(get(&breakdown, FuelType::Kerosene).is_none());
    }

    #[test]
    fn groups_in_first_seen_order() {
        let records = vec![
            record("T1", FuelType::Kerosene, dec!(10), 1.0),
            record("T2", FuelType::Petrol, dec!(20), 2.0),
            record("T3", FuelType::Kerosene, dec!(30), 3.0),
            record("T4", FuelType::Diesel, dec!(40), 4.0),
        ];
        let breakdown = aggregate_by_fuel_type(&records);

        let order: Vec<_> = breakdown.iter().map(|t| t.fuel_type).collect();
        assert_eq!(order, vec![FuelType::Kerosene, FuelType::Petrol, FuelType::Diesel]);

        let kerosene = get(&breakdown, FuelType::Kerosene).unwrap();
        assert_eq!(kerosene.sales, dec!(40));
        assert_eq!(kerosene.profit, dec!(4));
        assert_eq!(kerosene.volume, 4.0);
        assert_eq!(kerosene.tanks, 2);
    }

    #[test]
    fn group_sales_partition_total_sales() {
        let records = vec![
            record("T1", FuelType::Petrol, dec!(1234567.89), 1.0),
            record("T2", FuelType::Diesel, dec!(0.11), 2.0),
            record("T3", FuelType::Petrol, dec!(98765), 3.0),
            record("T4", FuelType::Kerosene, dec!(5), 4.0),
        ];
        let total: Decimal = records.iter().map(|r| r.total_sales_ugx).sum();
        assert_eq!(aggregate_by_fuel_type(&records).total_sales(), total);
    }

    #[test]
    fn empty_records_give_empty_breakdown() {
        let breakdown = aggregate_by_fuel_type(&[]);
        assert!(breakdown.is_empty());
    }

    #[test]
    fn zero_sales_give_zero_percent() {
        let records = vec![
            record("T1", FuelType::Petrol, Decimal::ZERO, 10.0),
            record("T2", FuelType::Diesel, Decimal::ZERO, 20.0),
        ];
        let breakdown = aggregate_by_fuel_type(&records);
        assert_eq!(breakdown.iter().count(), 2);
        for totals in &breakdown {
            assert_eq!(totals.percent_of_total, 0.0);
        }
    }
}
