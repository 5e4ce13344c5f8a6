//! CSV export source.

use super::{Grid, SheetSource};
use crate::error::{DashboardError, Result};
use polars::prelude::*;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Reads a CSV export of the lead sheet from disk.
///
/// Every column is read as text so values like `00123` or `TRUE` reach the
/// normalizer untouched. Missing cells become empty strings.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_error(&self, reason: impl ToString) -> DashboardError {
        DashboardError::SourceRead {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Load the file, retrying without quote handling if the first pass fails.
    fn load(&self) -> Result<DataFrame> {
        let quoted = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
            .try_into_reader_with_file_path(Some(self.path.clone()))
            .and_then(|reader| reader.finish());

        match quoted {
            Ok(df) => return Ok(df),
            Err(e) => debug!("Quoted CSV parse failed, retrying without quotes: {}", e),
        }

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_parse_options(CsvParseOptions::default().with_quote_char(None))
            .try_into_reader_with_file_path(Some(self.path.clone()))
            .and_then(|reader| reader.finish())
            .map_err(|e| self.read_error(e))
    }
}

/// Convert a frame into a header row followed by string rows.
fn frame_to_grid(df: &DataFrame) -> Result<Grid> {
    let header: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut rows = vec![Vec::with_capacity(header.len()); df.height()];
    for column in df.get_columns() {
        let text = column.cast(&DataType::String)?;
        let values = text.as_materialized_series().str()?;
        for (row, value) in rows.iter_mut().zip(values.into_iter()) {
            row.push(value.unwrap_or_default().to_string());
        }
    }

    let mut grid = Vec::with_capacity(rows.len() + 1);
    grid.push(header);
    grid.extend(rows);
    Ok(grid)
}

impl SheetSource for CsvSource {
    fn fetch_grid(&self) -> Result<Grid> {
        info!("Reading leads from {}", self.path.display());

        let metadata = fs::metadata(&self.path).map_err(|e| self.read_error(e))?;
        if metadata.len() == 0 {
            return Ok(Vec::new());
        }

        let df = self.load()?;
        debug!("Loaded CSV: {} rows x {} columns", df.height(), df.width());
        frame_to_grid(&df).map_err(|e| self.read_error(e))
    }

    fn name(&self) -> &str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_all_cells_as_text() {
        let file = write_csv(
            "Client Name,Status,In Radius,Tag,Created At\n\
             Acme,Approved,TRUE,00123,2024-05-01\n\
             \"Smith, Jones\",Discard,,,\n",
        );

        let grid = CsvSource::new(file.path()).fetch_grid().unwrap();
        assert_eq!(
            grid,
            vec![
                vec!["Client Name", "Status", "In Radius", "Tag", "Created At"],
                vec!["Acme", "Approved", "TRUE", "00123", "2024-05-01"],
                vec!["Smith, Jones", "Discard", "", "", ""],
            ]
        );
    }

    #[test]
    fn test_header_only_file() {
        let file = write_csv("Client,Status\n");
        let grid = CsvSource::new(file.path()).fetch_grid().unwrap();
        assert_eq!(grid, vec![vec!["Client".to_string(), "Status".to_string()]]);
    }

    #[test]
    fn test_empty_file_is_empty_grid() {
        let file = write_csv("");
        let grid = CsvSource::new(file.path()).fetch_grid().unwrap();
        assert!(grid.is_empty());
    }

    #[test]
    fn test_missing_file_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvSource::new(dir.path().join("missing.csv"))
            .fetch_grid()
            .unwrap_err();

        assert_eq!(err.error_code(), "SOURCE_READ_ERROR");
        assert!(err.is_transport());
        assert!(!err.is_config());
    }
}
