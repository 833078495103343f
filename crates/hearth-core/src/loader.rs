//! Feature loading: merge sale records with zipcode demographics
//!
//! Sales drive the join, so the feature table always has one row per sale.
//! The join key is read as text from both sources.

use std::path::Path;

use crate::csv_reader::{read_csv, CsvOptions};
use crate::error::DataError;
use crate::frame::{Column, Frame};

/// Column names the loader relies on
#[derive(Debug, Clone)]
pub struct LoaderColumns {
    /// Regression target, removed from the features
    pub target: String,
    /// Join key shared by both sources
    pub join_key: String,
    /// Sales columns to read (must include target and join key)
    pub sales: Vec<String>,
}

/// Joined feature table and its aligned target
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub features: Frame,
    pub target: Vec<f64>,
}

/// Read the demographics table with the join key kept as text
pub fn load_demographics(path: impl AsRef<Path>, join_key: &str) -> Result<Frame, DataError> {
    let path = path.as_ref();
    let options = CsvOptions::default().with_text_column(join_key);
    let frame = read_csv(path, &options)?;
    if !frame.contains(join_key) {
        return Err(DataError::MissingColumn {
            column: join_key.to_string(),
            source_name: path.display().to_string(),
        });
    }
    Ok(frame)
}

/// Load sales and demographics, join them, and split off the target
pub fn load(
    sales_path: impl AsRef<Path>,
    demographics_path: impl AsRef<Path>,
    columns: &LoaderColumns,
) -> Result<LoadedData, DataError> {
    let sales_path = sales_path.as_ref();
    let source_name = sales_path.display().to_string();

    for required in [&columns.target, &columns.join_key] {
        if !columns.sales.contains(required) {
            return Err(DataError::MissingColumn {
                column: required.clone(),
                source_name: "sales column selection".to_string(),
            });
        }
    }

    let options = CsvOptions::default()
        .with_text_column(&columns.join_key)
        .with_use_columns(columns.sales.iter().cloned());
    let sales = read_csv(sales_path, &options)?;
    let demographics = load_demographics(demographics_path, &columns.join_key)?;

    let data = merge(&sales, &demographics, columns)?;
    tracing::info!(
        "Loaded {} sales joined with {} demographic rows ({} features)",
        data.features.height(),
        demographics.height(),
        data.features.width()
    );
    Ok(data)
}

/// Join already-read frames and split off the target
pub fn merge(
    sales: &Frame,
    demographics: &Frame,
    columns: &LoaderColumns,
) -> Result<LoadedData, DataError> {
    let mut features = sales.left_join(demographics, &columns.join_key)?;
    let target = match features.pop(&columns.target) {
        Ok(Column::Numeric(values)) => values,
        Ok(Column::Text(_)) => {
            return Err(DataError::TypeMismatch {
                column: columns.target.clone(),
                expected: "numeric".to_string(),
            })
        }
        Err(_) => {
            return Err(DataError::MissingColumn {
                column: columns.target.clone(),
                source_name: "sales".to_string(),
            })
        }
    };

    if target.iter().any(|y| !y.is_finite()) {
        return Err(DataError::TypeMismatch {
            column: columns.target.clone(),
            expected: "finite for every row".to_string(),
        });
    }

    Ok(LoadedData { features, target })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn columns() -> LoaderColumns {
        LoaderColumns {
            target: "price".to_string(),
            join_key: "zipcode".to_string(),
            sales: vec![
                "price".to_string(),
                "bedrooms".to_string(),
                "zipcode".to_string(),
            ],
        }
    }

    const SALES: &str = "\
id,price,bedrooms,zipcode,yr_built
1,300000,3,98103,1990
2,450000,4,98115,2001
3,250000,2,00000,1955
";

    const DEMOGRAPHICS: &str = "\
ppltn_qty,zipcode,medn_hshld_incm_amt
1000,98103,70000
2000,98115,90000
";

    #[test]
    fn test_load_left_join() {
        let sales = write_temp_csv(SALES);
        let demographics = write_temp_csv(DEMOGRAPHICS);

        let data = load(sales.path(), demographics.path(), &columns()).unwrap();

        assert_eq!(data.features.height(), 3);
        assert_eq!(data.target, vec![300000.0, 450000.0, 250000.0]);
        assert!(!data.features.contains("price"));
        assert!(!data.features.contains("yr_built"));
        assert_eq!(
            data.features.names(),
            &["bedrooms", "zipcode", "ppltn_qty", "medn_hshld_incm_amt"]
        );
        // unmatched zipcode keeps null demographics
        assert!(data.features.column("ppltn_qty").unwrap().is_null(2));
    }

    #[test]
    fn test_missing_join_key_in_demographics() {
        let sales = write_temp_csv(SALES);
        let demographics = write_temp_csv("ppltn_qty,zip\n1000,98103\n");

        let result = load(sales.path(), demographics.path(), &columns());
        assert!(matches!(
            result,
            Err(DataError::MissingColumn { ref column, .. }) if column == "zipcode"
        ));
    }

    #[test]
    fn test_missing_target_in_sales() {
        let sales = write_temp_csv("bedrooms,zipcode\n3,98103\n");
        let demographics = write_temp_csv(DEMOGRAPHICS);

        let result = load(sales.path(), demographics.path(), &columns());
        assert!(matches!(
            result,
            Err(DataError::MissingColumn { ref column, .. }) if column == "price"
        ));
    }

    #[test]
    fn test_selection_without_target() {
        let mut cols = columns();
        cols.sales.retain(|c| c != "price");
        let sales = write_temp_csv(SALES);
        let demographics = write_temp_csv(DEMOGRAPHICS);

        assert!(load(sales.path(), demographics.path(), &cols).is_err());
    }
}
