use alloy_primitives::{Address, U256};
use chrono::{DateTime, Datelike};

use crate::domain::models::common::epoch_currency_revenue_id;
use crate::domain::models::{EntityKind, EntityRecord, EpochCurrencyRevenue};
use crate::infrastructure::store::EntityStore;

/// Maintains the per-(year, month, currency) revenue buckets. This is the
/// only code that writes `EpochCurrencyRevenue` rows.
#[derive(Debug, Clone, Default)]
pub struct RevenueAggregator;

impl RevenueAggregator {
    pub fn new() -> Self {
        Self
    }

    /// UTC calendar bucket a block timestamp falls in
    pub fn epoch_of(block_timestamp: u64) -> (i32, u32) {
        DateTime::from_timestamp(block_timestamp as i64, 0)
            .map(|dt| (dt.year(), dt.month()))
            .unwrap_or((1970, 1))
    }

    /// Fold one protocol-fee event into its bucket. Returns the updated
    /// bucket, or `None` when `record_id` was already applied: redelivery is
    /// a no-op, never a double count.
    pub fn apply_fee(
        &self,
        store: &EntityStore,
        currency: Address,
        fee: U256,
        record_id: &str,
        block_timestamp: u64,
    ) -> Option<EpochCurrencyRevenue> {
        let (year, month) = Self::epoch_of(block_timestamp);
        let bucket_id = epoch_currency_revenue_id(year, month, &currency);

        let mut bucket = match store.get(EntityKind::EpochCurrencyRevenue, &bucket_id) {
            Some(EntityRecord::EpochCurrencyRevenue(bucket)) => bucket,
            _ => EpochCurrencyRevenue {
                id: bucket_id,
                year,
                month,
                currency,
                total_amount: U256::ZERO,
                calls_with_protocol_fee: Vec::new(),
            },
        };

        if bucket.calls_with_protocol_fee.iter().any(|id| id == record_id) {
            return None;
        }

        bucket.total_amount += fee;
        bucket.calls_with_protocol_fee.push(record_id.to_string());
        Some(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_utc_calendar_month() {
        // 2024-02-29T23:59:59Z
        assert_eq!(RevenueAggregator::epoch_of(1_709_251_199), (2024, 2));
        // 2024-03-01T00:00:00Z
        assert_eq!(RevenueAggregator::epoch_of(1_709_251_200), (2024, 3));
    }

    #[test]
    fn fees_accumulate_within_a_bucket() {
        let store = EntityStore::new();
        let agg = RevenueAggregator::new();
        let currency = Address::ZERO;
        let ts = 1_709_251_199; // 2024-02

        let bucket = agg
            .apply_fee(&store, currency, U256::from(100u64), "0xaa-0", ts)
            .unwrap();
        store
            .put(EntityRecord::EpochCurrencyRevenue(bucket), 1, ts)
            .unwrap();

        let bucket = agg
            .apply_fee(&store, currency, U256::from(250u64), "0xbb-0", ts)
            .unwrap();
        assert_eq!(bucket.total_amount, U256::from(350u64));
        assert_eq!(bucket.calls_with_protocol_fee.len(), 2);
    }

    #[test]
    fn redelivery_is_a_no_op() {
        let store = EntityStore::new();
        let agg = RevenueAggregator::new();
        let ts = 1_709_251_199;

        let bucket = agg
            .apply_fee(&store, Address::ZERO, U256::from(100u64), "0xaa-0", ts)
            .unwrap();
        store
            .put(EntityRecord::EpochCurrencyRevenue(bucket), 1, ts)
            .unwrap();

        assert!(agg
            .apply_fee(&store, Address::ZERO, U256::from(100u64), "0xaa-0", ts)
            .is_none());
    }

    #[test]
    fn currencies_get_separate_buckets() {
        let store = EntityStore::new();
        let agg = RevenueAggregator::new();
        let ts = 1_709_251_199;
        let other = alloy_primitives::address!("00000000000000000000000000000000000000cc");

        let a = agg
            .apply_fee(&store, Address::ZERO, U256::from(100u64), "0xaa-0", ts)
            .unwrap();
        let b = agg
            .apply_fee(&store, other, U256::from(100u64), "0xbb-0", ts)
            .unwrap();
        assert_ne!(a.id, b.id);
    }
}
