use super::report::ReconciliationRecord;
use super::variance::{VarianceBucket, VARIANCE_BUCKETS};
use serde::Serialize;

/// Number of records falling in one variance bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub bucket: VarianceBucket,
    pub count: usize,
    pub percent_of_total: f64,
}

/// Count records per variance bucket, always returning the buckets in fixed order.
///
/// A record whose absolute variance is 100% or more lands in no bucket.
pub fn histogram(records: &[ReconciliationRecord]) -> Vec<BucketCount> {
    let mut counts = [0usize; VARIANCE_BUCKETS.len()];

    for record in records {
        let abs_variance = record.abs_variance();
        match VARIANCE_BUCKETS.iter().position(|b| b.contains(abs_variance)) {
            Some(idx) => counts[idx] += 1,
            None => log::debug!(
                "Tank {} variance {}% is outside all buckets",
                record.tank_number,
                record.variance_percentage
            ),
        }
    }

    let total = records.len();
    VARIANCE_BUCKETS
        .iter()
        .zip(counts)
        .map(|(bucket, count)| BucketCount {
            bucket: *bucket,
            count,
            percent_of_total: if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// Records counted in no bucket, i.e. with an absolute variance of 100% or more
pub fn unbucketed(buckets: &[BucketCount], record_count: usize) -> usize {
    record_count.saturating_sub(buckets.iter().map(|b| b.count).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::FuelType;
    use crate::core::variance::Severity;
    use rust_decimal::Decimal;

    fn record(variance: f64) -> ReconciliationRecord {
        ReconciliationRecord {
            tank_number: "T1".to_string(),
            fuel_type: FuelType::Petrol,
            opening_stock_liters: 0.0,
            total_delivered_liters: 0.0,
            total_dispensed_liters: 0.0,
            actual_closing_stock_liters: 0.0,
            variance_percentage: variance,
            total_sales_ugx: Decimal::ZERO,
            gross_profit_ugx: Decimal::ZERO,
        }
    }

    fn counts(buckets: &[BucketCount]) -> Vec<usize> {
        buckets.iter().map(|b| b.count).collect()
    }

    #[test]
    fn empty_records_give_zeroed_buckets() {
        let buckets = histogram(&[]);
        assert_eq!(buckets.len(), 4);
        for b in &buckets {
            assert_eq!(b.count, 0);
            assert_eq!(b.percent_of_total, 0.0);
        }
    }

    #[test]
    fn normal_and_high_split_evenly() {
        let buckets = histogram(&[record(0.5), record(3.0)]);

        let severities: Vec<_> = buckets.iter().map(|b| b.bucket.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Normal, Severity::Moderate, Severity::High, Severity::Critical]
        );
        assert_eq!(counts(&buckets), vec![1, 0, 1, 0]);
        assert_eq!(buckets[0].percent_of_total, 50.0);
        assert_eq!(buckets[1].percent_of_total, 0.0);
        assert_eq!(buckets[2].percent_of_total, 50.0);
        assert_eq!(buckets[3].percent_of_total, 0.0);
    }

    #[test]
    fn shortages_counted_by_magnitude() {
        let buckets = histogram(&[record(-0.2), record(-1.0), record(-7.5), record(2.0)]);
        assert_eq!(counts(&buckets), vec![1, 1, 1, 1]);
    }

    #[test]
    fn counts_sum_to_record_count() {
        let records: Vec<_> = (0..40).map(|i| record(i as f64 * 0.37 - 7.0)).collect();
        let buckets = histogram(&records);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), records.len());
        let pct: f64 = buckets.iter().map(|b| b.percent_of_total).sum();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn variance_of_100_or_more_is_not_bucketed() {
        let buckets = histogram(&[record(100.0), record(1.5)]);
        assert_eq!(counts(&buckets), vec![0, 1, 0, 0]);
        assert_eq!(buckets[1].percent_of_total, 50.0);
        assert_eq!(unbucketed(&buckets, 2), 1);
    }

    #[test]
    fn nothing_unbucketed_below_100() {
        let buckets = histogram(&[record(0.2), record(-99.9)]);
        assert_eq!(unbucketed(&buckets, 2), 0);
        assert_eq!(unbucketed(&histogram(&[]), 0), 0);
    }
}
