use std::path::Path;

use tracing::{debug, info};

use crate::error::{AnalyticsError, Result};
use crate::models::RawSalesRow;

/// Read every row of a delimited sales export.
pub fn load_sales(path: &Path, delimiter: u8) -> Result<Vec<RawSalesRow>> {
    if !path.is_file() {
        return Err(AnalyticsError::FileNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)?;
    let mut rows = Vec::new();

    for result in reader.deserialize::<RawSalesRow>() {
        rows.push(result?);
    }

    info!(path = %path.display(), rows = rows.len(), "loaded sales data");
    debug!(delimiter = %char::from(delimiter), "csv reader settings");
    Ok(rows)
}
