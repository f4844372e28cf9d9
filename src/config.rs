use chrono::NaiveDate;

pub const DEFAULT_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m-%d-%y", "%d/%m/%Y"];
pub const DEFAULT_TOP_PRODUCTS: usize = 10;

/// Settings shared by every analysis step.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Fixed "today" used for recency; never read from the data.
    pub reference_date: NaiveDate,
    /// chrono format strings, tried in order.
    pub date_formats: Vec<String>,
    pub top_products: usize,
    pub delimiter: u8,
}

impl AnalysisConfig {
    pub fn date_formats(&self) -> Vec<&str> {
        self.date_formats.iter().map(String::as_str).collect()
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reference_date: NaiveDate::from_ymd_opt(2025, 3, 7)
                .expect("2025-03-07 is a valid calendar date"),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            top_products: DEFAULT_TOP_PRODUCTS,
            delimiter: b',',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_fixed_reference_date() {
        let config = AnalysisConfig::default();
        assert_eq!(
            config.reference_date,
            NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
        );
        assert_eq!(config.top_products, 10);
        assert_eq!(config.date_formats(), DEFAULT_DATE_FORMATS.to_vec());
    }
}
