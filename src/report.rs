use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;

use crate::dates::parse_date;
use crate::error::Result;
use crate::metrics::{add_amount, add_qty};
use crate::models::{
    CategoryRevenue, ClvRecord, ColumnProfile, MonthlyRevenue, NumericSummary, RfmRecord,
    SalesRecord, TopProductRecord,
};

/// Plain-text rendering of a table, ready for a console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextReport(pub String);

impl std::fmt::Display for TextReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait Summarizer {
    fn summarize(&self, table: &[SalesRecord]) -> TextReport;
}

/// Prints the first rows followed by the info and describe views.
pub struct ConsoleSummarizer {
    pub head: usize,
}

impl Summarizer for ConsoleSummarizer {
    fn summarize(&self, table: &[SalesRecord]) -> TextReport {
        let mut output = String::new();

        let _ = writeln!(output, "First rows of the dataset:");
        let _ = writeln!(
            output,
            "{:<22} {:<12} {:>5} {:>10}  {:<16} {}",
            "Order ID", "Date", "Qty", "Amount", "Category", "Style"
        );
        for record in table.iter().take(self.head) {
            let _ = writeln!(
                output,
                "{:<22} {:<12} {:>5} {:>10}  {:<16} {}",
                record.order_id.as_deref().unwrap_or("-"),
                record.date.as_deref().unwrap_or("-"),
                record.qty,
                record.amount,
                record.category,
                record.style.as_deref().unwrap_or("-")
            );
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "Dataset info: {} rows", table.len());
        for profile in profile_columns(table) {
            let _ = writeln!(output, "  {:<10} {} non-null", profile.column, profile.non_null);
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "Descriptive statistics:");
        let _ = writeln!(
            output,
            "  {:<8} {:>8} {:>12} {:>12} {:>10} {:>12}",
            "column", "count", "mean", "std", "min", "max"
        );
        for summary in describe_numeric(table) {
            let _ = writeln!(
                output,
                "  {:<8} {:>8} {:>12.2} {:>12.2} {:>10.2} {:>12.2}",
                summary.column, summary.count, summary.mean, summary.std, summary.min, summary.max
            );
        }

        TextReport(output)
    }
}

pub fn profile_columns(table: &[SalesRecord]) -> Vec<ColumnProfile> {
    let count = |f: fn(&SalesRecord) -> bool| table.iter().filter(|r| f(r)).count();

    vec![
        ColumnProfile {
            column: "Order ID",
            non_null: count(|r| r.order_id.is_some()),
        },
        ColumnProfile {
            column: "Date",
            non_null: count(|r| r.date.is_some()),
        },
        ColumnProfile {
            column: "Qty",
            non_null: table.len(),
        },
        ColumnProfile {
            column: "Amount",
            non_null: table.len(),
        },
        ColumnProfile {
            column: "Category",
            non_null: table.len(),
        },
        ColumnProfile {
            column: "Style",
            non_null: count(|r| r.style.is_some()),
        },
    ]
}

pub fn describe_numeric(table: &[SalesRecord]) -> Vec<NumericSummary> {
    let qty: Vec<f64> = table.iter().map(|r| r.qty as f64).collect();
    let amount: Vec<f64> = table
        .iter()
        .map(|r| r.amount.to_f64().unwrap_or(0.0))
        .collect();

    vec![describe("Qty", &qty), describe("Amount", &amount)]
}

fn describe(column: &'static str, values: &[f64]) -> NumericSummary {
    let count = values.len();
    if count == 0 {
        return NumericSummary {
            column,
            count,
            mean: 0.0,
            std: 0.0,
            min: 0.0,
            max: 0.0,
        };
    }

    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };

    NumericSummary {
        column,
        count,
        mean,
        std,
        min: values.iter().cloned().fold(f64::INFINITY, f64::min),
        max: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    }
}

pub fn revenue_by_category(table: &[SalesRecord]) -> Result<Vec<CategoryRevenue>> {
    let mut map: BTreeMap<&str, Decimal> = BTreeMap::new();

    for record in table {
        let entry = map.entry(record.category.as_str()).or_insert(Decimal::ZERO);
        *entry = add_amount(*entry, record.amount, "category revenue")?;
    }

    Ok(map
        .into_iter()
        .map(|(category, revenue)| CategoryRevenue {
            category: category.to_string(),
            revenue,
        })
        .collect())
}

/// (quantity, amount) pairs for the correlation scatter.
pub fn qty_amount_points(table: &[SalesRecord]) -> Vec<(f64, f64)> {
    table
        .iter()
        .map(|r| (r.qty as f64, r.amount.to_f64().unwrap_or(0.0)))
        .collect()
}

pub fn monthly_revenue(table: &[SalesRecord], date_formats: &[&str]) -> Result<Vec<MonthlyRevenue>> {
    let mut map: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();

    for record in table {
        let raw = record.date.as_deref().unwrap_or_default();
        let date = parse_date(raw, date_formats)?;
        let entry = map.entry((date.year(), date.month())).or_insert(Decimal::ZERO);
        *entry = add_amount(*entry, record.amount, "monthly revenue")?;
    }

    Ok(map
        .into_iter()
        .map(|((year, month), revenue)| MonthlyRevenue {
            month: format!("{year:04}-{month:02}"),
            revenue,
        })
        .collect())
}

pub fn format_rfm(rfm: &BTreeMap<String, RfmRecord>, limit: usize) -> String {
    let mut output = String::new();

    if rfm.is_empty() {
        let _ = writeln!(output, "No orders to score.");
        return output;
    }

    let _ = writeln!(
        output,
        "{:<22} {:>8} {:>10} {:>12}",
        "Order ID", "Recency", "Frequency", "Monetary"
    );
    for (order_id, record) in rfm.iter().take(limit) {
        let _ = writeln!(
            output,
            "{:<22} {:>8} {:>10} {:>12}",
            order_id, record.recency, record.frequency, record.monetary
        );
    }
    output
}

pub fn format_clv(clv: &BTreeMap<String, ClvRecord>, limit: usize) -> String {
    let mut output = String::new();

    if clv.is_empty() {
        let _ = writeln!(output, "No orders to value.");
        return output;
    }

    let _ = writeln!(output, "{:<22} {:>12}", "Order ID", "CLV");
    for (order_id, record) in clv.iter().take(limit) {
        let _ = writeln!(output, "{:<22} {:>12}", order_id, record.clv);
    }
    output
}

pub fn format_top_products(products: &[TopProductRecord]) -> String {
    let mut output = String::new();

    if products.is_empty() {
        let _ = writeln!(output, "No products sold.");
        return output;
    }

    let _ = writeln!(output, "{:<4} {:<20} {:>8}", "#", "Style", "Qty");
    for (rank, product) in products.iter().enumerate() {
        let _ = writeln!(output, "{:<4} {:<20} {:>8}", rank + 1, product.style, product.qty);
    }
    output
}

pub struct ReportInput<'a> {
    pub table: &'a [SalesRecord],
    pub reference_date: chrono::NaiveDate,
    pub rfm: &'a BTreeMap<String, RfmRecord>,
    pub clv: &'a BTreeMap<String, ClvRecord>,
    pub top_products: &'a [TopProductRecord],
}

pub fn build_report(input: &ReportInput<'_>, head: usize) -> Result<String> {
    let mut output = String::new();
    let mut total = Decimal::ZERO;
    let mut units = 0u64;
    for record in input.table {
        total = add_amount(total, record.amount, "revenue")?;
        units = add_qty(units, record.qty, "units sold")?;
    }

    let _ = writeln!(output, "# Sales Insights Report");
    let _ = writeln!(
        output,
        "Generated from {} line items (recency measured from {})",
        input.table.len(),
        input.reference_date
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "- Total revenue: {}", total);
    let _ = writeln!(output, "- Units sold: {}", units);
    let _ = writeln!(output, "- Orders: {}", input.clv.len());

    let _ = writeln!(output);
    let _ = writeln!(output, "## Revenue by Category");
    let categories = revenue_by_category(input.table)?;
    if categories.is_empty() {
        let _ = writeln!(output, "No sales recorded.");
    } else {
        for entry in categories.iter() {
            let _ = writeln!(output, "- {}: {}", entry.category, entry.revenue);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## RFM");
    if input.rfm.is_empty() {
        let _ = writeln!(output, "No orders to score.");
    } else {
        for (order_id, record) in input.rfm.iter().take(head) {
            let _ = writeln!(
                output,
                "- {}: recency {} days, frequency {}, monetary {}",
                order_id, record.recency, record.frequency, record.monetary
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Customer Lifetime Value");
    if input.clv.is_empty() {
        let _ = writeln!(output, "No orders to value.");
    } else {
        for (order_id, record) in input.clv.iter().take(head) {
            let _ = writeln!(output, "- {}: {}", order_id, record.clv);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Products");
    if input.top_products.is_empty() {
        let _ = writeln!(output, "No products sold.");
    } else {
        for (rank, product) in input.top_products.iter().enumerate() {
            let _ = writeln!(output, "{}. {} ({} units)", rank + 1, product.style, product.qty);
        }
    }

    Ok(output)
}

pub fn build_json_report(input: &ReportInput<'_>) -> Result<serde_json::Value> {
    let rfm: Vec<_> = input
        .rfm
        .iter()
        .map(|(order_id, record)| {
            json!({
                "order_id": order_id,
                "recency": record.recency,
                "frequency": record.frequency,
                "monetary": record.monetary,
            })
        })
        .collect();
    let clv: Vec<_> = input
        .clv
        .iter()
        .map(|(order_id, record)| json!({ "order_id": order_id, "clv": record.clv }))
        .collect();

    Ok(json!({
        "reference_date": input.reference_date,
        "line_items": input.table.len(),
        "columns": profile_columns(input.table),
        "describe": describe_numeric(input.table),
        "revenue_by_category": revenue_by_category(input.table)?,
        "rfm": rfm,
        "clv": clv,
        "top_products": input.top_products,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DATE_FORMATS;
    use crate::error::AnalyticsError;
    use crate::metrics::{compute_clv, compute_rfm, compute_top_products};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record(order_id: &str, date: &str, qty: u64, amount: Decimal, category: &str) -> SalesRecord {
        SalesRecord {
            order_id: Some(order_id.to_string()),
            date: Some(date.to_string()),
            qty,
            amount,
            category: category.to_string(),
            style: Some(format!("{category}-style")),
        }
    }

    fn sample_table() -> Vec<SalesRecord> {
        vec![
            record("A", "2025-01-01", 2, dec!(100), "kurta"),
            record("A", "2025-01-05", 1, dec!(50), "Set"),
            record("B", "2025-02-01", 5, dec!(300), "kurta"),
        ]
    }

    #[test]
    fn category_revenue_is_summed_and_sorted() {
        let categories = revenue_by_category(&sample_table()).unwrap();
        assert_eq!(
            categories,
            vec![
                CategoryRevenue {
                    category: "Set".to_string(),
                    revenue: dec!(50),
                },
                CategoryRevenue {
                    category: "kurta".to_string(),
                    revenue: dec!(400),
                },
            ]
        );
    }

    #[test]
    fn monthly_revenue_buckets_by_calendar_month() {
        let months = monthly_revenue(&sample_table(), &DEFAULT_DATE_FORMATS).unwrap();
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, "2025-01");
        assert_eq!(months[0].revenue, dec!(150));
        assert_eq!(months[1].month, "2025-02");
        assert_eq!(months[1].revenue, dec!(300));
    }

    #[test]
    fn monthly_revenue_rejects_bad_dates() {
        let mut table = sample_table();
        table[0].date = None;
        let err = monthly_revenue(&table, &DEFAULT_DATE_FORMATS).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidDate(_)));
    }

    #[test]
    fn describe_matches_sample_statistics() {
        let summaries = describe_numeric(&sample_table());
        let qty = &summaries[0];
        assert_eq!(qty.column, "Qty");
        assert_eq!(qty.count, 3);
        assert!((qty.mean - 8.0 / 3.0).abs() < 1e-9);
        assert!((qty.std - 2.081_665_999).abs() < 1e-6);
        assert_eq!(qty.min, 1.0);
        assert_eq!(qty.max, 5.0);

        let amount = &summaries[1];
        assert_eq!(amount.max, 300.0);
    }

    #[test]
    fn profile_counts_optional_columns() {
        let mut table = sample_table();
        table[2].style = None;
        let profile = profile_columns(&table);
        let style = profile.iter().find(|p| p.column == "Style").unwrap();
        assert_eq!(style.non_null, 2);
        let qty = profile.iter().find(|p| p.column == "Qty").unwrap();
        assert_eq!(qty.non_null, 3);
    }

    #[test]
    fn console_summary_lists_head_and_stats() {
        let report = ConsoleSummarizer { head: 1 }.summarize(&sample_table());
        let text = report.to_string();
        assert!(text.contains("Dataset info: 3 rows"));
        assert!(text.contains("Descriptive statistics:"));
        assert_eq!(text.matches("2025-01-05").count(), 0);
    }

    #[test]
    fn report_covers_every_section() {
        let table = sample_table();
        let reference = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        let rfm = compute_rfm(&table, reference, &DEFAULT_DATE_FORMATS).unwrap();
        let clv = compute_clv(&table).unwrap();
        let top = compute_top_products(&table, 10).unwrap();
        let input = ReportInput {
            table: &table,
            reference_date: reference,
            rfm: &rfm,
            clv: &clv,
            top_products: &top,
        };

        let report = build_report(&input, 5).unwrap();
        assert!(report.contains("- Total revenue: 450"));
        assert!(report.contains("- A: recency 65 days, frequency 2, monetary 150"));
        assert!(report.contains("- B: 300"));
        assert!(report.contains("1. kurta-style (7 units)"));

        let json = build_json_report(&input).unwrap();
        assert_eq!(json["line_items"], 3);
        assert_eq!(json["rfm"][0]["order_id"], "A");
        assert_eq!(json["top_products"][0]["qty"], 7);
    }

    #[test]
    fn empty_report_has_placeholders() {
        let table: Vec<SalesRecord> = Vec::new();
        let rfm = BTreeMap::new();
        let clv = BTreeMap::new();
        let input = ReportInput {
            table: &table,
            reference_date: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
            rfm: &rfm,
            clv: &clv,
            top_products: &[],
        };

        let report = build_report(&input, 5).unwrap();
        assert!(report.contains("No sales recorded."));
        assert!(report.contains("No products sold."));
        assert_eq!(format_top_products(&[]), "No products sold.\n");
    }

    #[test]
    fn revenue_totals_report_overflow() {
        let mut table = sample_table();
        table[0].amount = Decimal::MAX;
        table[2].amount = Decimal::MAX;

        let err = revenue_by_category(&table).unwrap_err();
        assert!(matches!(err, AnalyticsError::Overflow("category revenue")));

        table[2].date = Some("2025-01-09".to_string());
        let err = monthly_revenue(&table, &DEFAULT_DATE_FORMATS).unwrap_err();
        assert!(matches!(err, AnalyticsError::Overflow("monthly revenue")));
    }

    #[test]
    fn report_rejects_overflowing_units() {
        let mut table = sample_table();
        table[1].qty = u64::MAX;
        let rfm = BTreeMap::new();
        let clv = BTreeMap::new();
        let input = ReportInput {
            table: &table,
            reference_date: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
            rfm: &rfm,
            clv: &clv,
            top_products: &[],
        };

        let err = build_report(&input, 5).unwrap_err();
        assert!(matches!(err, AnalyticsError::Overflow("units sold")));
    }
}
