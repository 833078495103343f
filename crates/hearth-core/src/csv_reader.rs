//! CSV reader with type inference
//!
//! Each column becomes numeric when every non-null cell parses as a float,
//! and text otherwise. Columns listed in [`CsvOptions::text_columns`] are
//! always text, so identifiers like zipcodes keep their spelling.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::DataError;
use crate::frame::{Column, Frame};

/// Cell spellings treated as null
const NULL_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Options for reading a CSV file
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter
    pub delimiter: u8,
    /// Columns always read as text
    pub text_columns: Vec<String>,
    /// Restrict to these columns (file order is kept)
    pub use_columns: Option<Vec<String>>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            text_columns: Vec::new(),
            use_columns: None,
        }
    }
}

impl CsvOptions {
    /// Always read the named column as text
    pub fn with_text_column(mut self, name: impl Into<String>) -> Self {
        self.text_columns.push(name.into());
        self
    }

    /// Keep only the named columns
    pub fn with_use_columns<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.use_columns = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// Read a CSV file into a frame
pub fn read_csv(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Frame, DataError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    if !path.exists() {
        return Err(DataError::FileNotFound(display));
    }

    let file = File::open(path).map_err(|e| DataError::ReadFailed {
        path: display.clone(),
        reason: e.to_string(),
    })?;
    read_csv_from(BufReader::new(file), &display, options)
}

/// Read CSV content from any reader.
///
/// `source_name` is only used in error messages.
pub fn read_csv_from<R: Read>(
    reader: R,
    source_name: &str,
    options: &CsvOptions,
) -> Result<Frame, DataError> {
    let invalid = |e: csv::Error| DataError::InvalidCsv {
        path: source_name.to_string(),
        reason: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(invalid)?
        .iter()
        .map(|s| s.trim().to_string())
        .collect();

    let keep: Vec<usize> = match &options.use_columns {
        Some(wanted) => {
            for name in wanted {
                if !headers.contains(name) {
                    return Err(DataError::MissingColumn {
                        column: name.clone(),
                        source_name: source_name.to_string(),
                    });
                }
            }
            (0..headers.len())
                .filter(|&i| wanted.contains(&headers[i]))
                .collect()
        }
        None => (0..headers.len()).collect(),
    };

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); keep.len()];
    for result in reader.records() {
        let record = result.map_err(invalid)?;
        for (slot, &index) in keep.iter().enumerate() {
            cells[slot].push(record.get(index).unwrap_or("").to_string());
        }
    }

    let mut frame = Frame::new();
    for (slot, &index) in keep.iter().enumerate() {
        let name = &headers[index];
        let values = std::mem::take(&mut cells[slot]);
        let column = if options.text_columns.contains(name) {
            parse_text(values)
        } else {
            infer_column(values)
        };
        frame.push_column(name.clone(), column)?;
    }

    tracing::debug!(
        "Read {} rows x {} columns from {}",
        frame.height(),
        frame.width(),
        source_name
    );
    Ok(frame)
}

fn is_null(value: &str) -> bool {
    NULL_TOKENS.contains(&value.trim())
}

/// Numeric when every non-null cell parses, text otherwise
fn infer_column(values: Vec<String>) -> Column {
    let numeric = values
        .iter()
        .filter(|s| !is_null(s))
        .all(|s| s.trim().parse::<f64>().is_ok());

    if numeric {
        Column::Numeric(
            values
                .iter()
                .map(|s| {
                    if is_null(s) {
                        f64::NAN
                    } else {
                        s.trim().parse().unwrap_or(f64::NAN)
                    }
                })
                .collect(),
        )
    } else {
        parse_text(values)
    }
}

fn parse_text(values: Vec<String>) -> Column {
    Column::Text(
        values
            .into_iter()
            .map(|s| if is_null(&s) { None } else { Some(s) })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
id,price,zipcode,date,bedrooms
1,221900,98178,20141013T000000,3
2,538000,00501,20141209T000000,
3,180000,98028,20150225T000000,2
";

    #[test]
    fn test_infer_numeric_and_text() {
        let frame = read_csv_from(SAMPLE.as_bytes(), "sample", &CsvOptions::default()).unwrap();

        assert_eq!(frame.height(), 3);
        assert!(frame.column("price").unwrap().is_numeric());
        assert!(!frame.column("date").unwrap().is_numeric());
        // empty cell is a null, not a text marker
        assert!(frame.column("bedrooms").unwrap().is_numeric());
        assert!(frame.column("bedrooms").unwrap().is_null(1));
    }

    #[test]
    fn test_text_column_keeps_leading_zeros() {
        let options = CsvOptions::default().with_text_column("zipcode");
        let frame = read_csv_from(SAMPLE.as_bytes(), "sample", &options).unwrap();

        match frame.column("zipcode").unwrap() {
            Column::Text(values) => assert_eq!(values[1].as_deref(), Some("00501")),
            Column::Numeric(_) => panic!("zipcode must be text"),
        }
    }

    #[test]
    fn test_use_columns_keeps_file_order() {
        let options = CsvOptions::default().with_use_columns(["zipcode", "price"]);
        let frame = read_csv_from(SAMPLE.as_bytes(), "sample", &options).unwrap();

        assert_eq!(frame.names(), &["price", "zipcode"]);
    }

    #[test]
    fn test_use_columns_missing() {
        let options = CsvOptions::default().with_use_columns(["price", "grade"]);
        let result = read_csv_from(SAMPLE.as_bytes(), "sample", &options);

        assert!(matches!(
            result,
            Err(DataError::MissingColumn { ref column, .. }) if column == "grade"
        ));
    }

    #[test]
    fn test_file_not_found() {
        let result = read_csv("/nonexistent/sales.csv", &CsvOptions::default());
        assert!(matches!(result, Err(DataError::FileNotFound(_))));
    }
}
