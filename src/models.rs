use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of the input file, before any validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSalesRow {
    #[serde(rename = "Order ID", default)]
    pub order_id: Option<String>,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Qty", default)]
    pub qty: Option<String>,
    #[serde(rename = "Amount", default)]
    pub amount: Option<String>,
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
    #[serde(rename = "Style", default)]
    pub style: Option<String>,
}

/// A line item that carries a quantity, an amount and a category.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub order_id: Option<String>,
    pub date: Option<String>,
    pub qty: u64,
    pub amount: Decimal,
    pub category: String,
    pub style: Option<String>,
}

pub type CleanedTable = Vec<SalesRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleaningSummary {
    pub kept: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfmRecord {
    pub recency: i64,
    pub frequency: usize,
    pub monetary: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClvRecord {
    pub clv: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopProductRecord {
    pub style: String,
    pub qty: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRevenue {
    /// Calendar month formatted as `YYYY-MM`.
    pub month: String,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub column: &'static str,
    pub non_null: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: &'static str,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}
