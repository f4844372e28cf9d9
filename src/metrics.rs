use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::dates::days_between;
use crate::error::{AnalyticsError, Result};
use crate::models::{ClvRecord, RfmRecord, SalesRecord, TopProductRecord};

/// Recency, frequency and monetary value per order.
///
/// Fails on the first record whose date cannot be parsed; no row is skipped.
pub fn compute_rfm(
    table: &[SalesRecord],
    reference_date: NaiveDate,
    date_formats: &[&str],
) -> Result<BTreeMap<String, RfmRecord>> {
    let mut rfm: BTreeMap<String, RfmRecord> = BTreeMap::new();

    for record in table {
        let recency = days_between(reference_date, record.date.as_deref(), date_formats)
            .inspect_err(|err| {
                warn!(order_id = ?record.order_id, error = %err, "cannot compute recency");
            })?;

        let Some(order_id) = record.order_id.as_ref() else {
            continue;
        };

        let entry = rfm.entry(order_id.clone()).or_insert(RfmRecord {
            recency,
            frequency: 0,
            monetary: Decimal::ZERO,
        });

        entry.recency = entry.recency.min(recency);
        entry.frequency += 1;
        entry.monetary = add_amount(entry.monetary, record.amount, "monetary")?;
    }

    debug!(orders = rfm.len(), "computed rfm");
    Ok(rfm)
}

/// Lifetime value per order: the order's summed amount.
pub fn compute_clv(table: &[SalesRecord]) -> Result<BTreeMap<String, ClvRecord>> {
    let mut clv: BTreeMap<String, ClvRecord> = BTreeMap::new();

    for record in table {
        if let Some(order_id) = record.order_id.as_ref() {
            let entry = clv
                .entry(order_id.clone())
                .or_insert(ClvRecord { clv: Decimal::ZERO });
            entry.clv = add_amount(entry.clv, record.amount, "clv")?;
        }
    }

    debug!(orders = clv.len(), "computed clv");
    Ok(clv)
}

/// The `n` styles with the highest total quantity.
///
/// Styles with equal totals keep the order in which they first appear.
pub fn compute_top_products(table: &[SalesRecord], n: usize) -> Result<Vec<TopProductRecord>> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<TopProductRecord> = Vec::new();

    for record in table {
        let Some(style) = record.style.as_deref() else {
            continue;
        };

        let index = *positions.entry(style).or_insert_with(|| {
            totals.push(TopProductRecord {
                style: style.to_string(),
                qty: 0,
            });
            totals.len() - 1
        });
        totals[index].qty = add_qty(totals[index].qty, record.qty, "quantity")?;
    }

    // sort_by is stable, so ties stay in first-seen order
    totals.sort_by(|a, b| b.qty.cmp(&a.qty));
    totals.truncate(n);
    Ok(totals)
}

pub(crate) fn add_amount(total: Decimal, amount: Decimal, what: &'static str) -> Result<Decimal> {
    total
        .checked_add(amount)
        .ok_or(AnalyticsError::Overflow(what))
}

pub(crate) fn add_qty(total: u64, qty: u64, what: &'static str) -> Result<u64> {
    total.checked_add(qty).ok_or(AnalyticsError::Overflow(what))
}
