use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::info;

use crate::models::{CleanedTable, CleaningSummary, RawSalesRow, SalesRecord};

/// Keep only rows with a usable quantity, amount and category.
pub fn clean(rows: Vec<RawSalesRow>) -> (CleanedTable, CleaningSummary) {
    let total = rows.len();
    let table: CleanedTable = rows.into_iter().filter_map(into_record).collect();

    let summary = CleaningSummary {
        kept: table.len(),
        dropped: total - table.len(),
    };
    info!(kept = summary.kept, dropped = summary.dropped, "cleaned sales rows");
    (table, summary)
}

fn into_record(row: RawSalesRow) -> Option<SalesRecord> {
    let qty = present(row.qty.as_deref()).and_then(|value| value.parse::<u64>().ok())?;
    let amount = present(row.amount.as_deref()).and_then(|value| Decimal::from_str(value).ok())?;
    let category = present(row.category.as_deref())?.to_string();

    Some(SalesRecord {
        order_id: row.order_id.filter(|value| !value.trim().is_empty()),
        date: row.date.filter(|value| !value.trim().is_empty()),
        qty,
        amount,
        category,
        style: row.style.filter(|value| !value.trim().is_empty()),
    })
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(qty: Option<&str>, amount: Option<&str>, category: Option<&str>) -> RawSalesRow {
        RawSalesRow {
            order_id: Some("A".to_string()),
            date: Some("2025-01-01".to_string()),
            qty: qty.map(str::to_string),
            amount: amount.map(str::to_string),
            category: category.map(str::to_string),
            style: Some("S1".to_string()),
        }
    }

    #[test]
    fn drops_rows_missing_required_fields() {
        let rows = vec![
            raw(Some("2"), Some("100"), Some("Set")),
            raw(None, Some("100"), Some("Set")),
            raw(Some("1"), None, Some("Set")),
            raw(Some("1"), Some("50"), None),
            raw(Some("1"), Some("50"), Some("   ")),
        ];

        let (table, summary) = clean(rows);
        assert_eq!(table.len(), 1);
        assert_eq!(summary, CleaningSummary { kept: 1, dropped: 4 });
        assert!(table
            .iter()
            .all(|record| !record.category.is_empty()));
    }

    #[test]
    fn unparseable_numbers_count_as_missing() {
        let rows = vec![
            raw(Some("two"), Some("100"), Some("Set")),
            raw(Some("-1"), Some("100"), Some("Set")),
            raw(Some("1"), Some("1,000"), Some("Set")),
        ];

        let (table, summary) = clean(rows);
        assert!(table.is_empty());
        assert_eq!(summary.dropped, 3);
    }

    #[test]
    fn keeps_rows_without_date_order_or_style() {
        let row = RawSalesRow {
            order_id: None,
            date: Some(" ".to_string()),
            qty: Some(" 3 ".to_string()),
            amount: Some("19.99".to_string()),
            category: Some("kurta".to_string()),
            style: None,
        };

        let (table, _) = clean(vec![row]);
        assert_eq!(table.len(), 1);
        let record = &table[0];
        assert_eq!(record.qty, 3);
        assert_eq!(record.amount, dec!(19.99));
        assert_eq!(record.order_id, None);
        assert_eq!(record.date, None);
        assert_eq!(record.style, None);
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let (table, summary) = clean(Vec::new());
        assert!(table.is_empty());
        assert_eq!(summary, CleaningSummary { kept: 0, dropped: 0 });
    }
}
