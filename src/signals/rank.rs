//! Sparse-pair filtering and priority ordering of the signal table.

use std::cmp::Ordering;

use super::SignalRecord;

/// Watchlist first, then `a` descending, then PRR descending.
///
/// Remaining ties fall back to the pair key so the order never depends on input order.
pub fn priority_order(x: &SignalRecord, y: &SignalRecord) -> Ordering {
    y.is_watchlist
        .cmp(&x.is_watchlist)
        .then_with(|| y.cell.a.cmp(&x.cell.a))
        .then_with(|| x.prr.cmp_desc(y.prr))
        .then_with(|| x.drug_name.cmp(&y.drug_name))
        .then_with(|| x.event_pt.cmp(&y.event_pt))
}

/// Drop pairs with `a < min_cases` and sort the rest by [`priority_order`].
pub fn rank(mut records: Vec<SignalRecord>, min_cases: u64) -> Vec<SignalRecord> {
    records.retain(|record| record.cell.a >= min_cases);
    records.sort_by(priority_order);
    records
}
