//! In-memory tabular frame
//!
//! A `Frame` is an ordered list of named, equal-height columns. Columns are
//! either numeric (`NaN` marks a null cell) or text (`None` marks a null
//! cell). Text columns hold values that must keep their exact spelling,
//! such as zipcodes with leading zeros.

use std::collections::HashMap;

use ndarray::Array2;

use crate::error::DataError;

/// A single column of data
#[derive(Debug, Clone)]
pub enum Column {
    Numeric(Vec<f64>),
    Text(Vec<Option<String>>),
}

impl Column {
    /// A numeric column of `len` nulls
    pub fn null(len: usize) -> Self {
        Column::Numeric(vec![f64::NAN; len])
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    /// Whether the column has no cells
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the column holds numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    /// Numeric view of the column, if it is numeric
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    /// Whether the cell at `row` is null
    pub fn is_null(&self, row: usize) -> bool {
        match self {
            Column::Numeric(v) => v[row].is_nan(),
            Column::Text(v) => v[row].is_none(),
        }
    }

    /// Cell value as a float.
    ///
    /// Text cells are parsed; null or unparseable text becomes `NaN`.
    pub fn value_f64(&self, row: usize) -> f64 {
        match self {
            Column::Numeric(v) => v[row],
            Column::Text(v) => v[row]
                .as_deref()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .unwrap_or(f64::NAN),
        }
    }

    /// Cell value as a join key.
    ///
    /// Whole numbers render without a fractional part so that a numeric
    /// `98103.0` matches the text key `"98103"`.
    pub fn key_at(&self, row: usize) -> Option<String> {
        match self {
            Column::Text(v) => v[row].clone(),
            Column::Numeric(v) => {
                let x = v[row];
                if x.is_nan() {
                    None
                } else if x.fract() == 0.0 && x.abs() < 1e15 {
                    Some(format!("{}", x as i64))
                } else {
                    Some(x.to_string())
                }
            }
        }
    }

    /// Gather rows by index
    pub fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(indices.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }

    /// Gather rows by optional index; `None` yields a null cell
    pub fn take_optional(&self, indices: &[Option<usize>]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(
                indices
                    .iter()
                    .map(|i| i.map_or(f64::NAN, |i| v[i]))
                    .collect(),
            ),
            Column::Text(v) => Column::Text(
                indices
                    .iter()
                    .map(|i| i.and_then(|i| v[i].clone()))
                    .collect(),
            ),
        }
    }
}

/// Ordered collection of named columns with a shared height
#[derive(Debug, Clone, Default)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
    height: usize,
}

impl Frame {
    /// Create an empty frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame from named columns.
    ///
    /// Fails on duplicate names or unequal heights.
    pub fn from_columns<S: Into<String>>(
        columns: impl IntoIterator<Item = (S, Column)>,
    ) -> Result<Self, DataError> {
        let mut frame = Self::new();
        for (name, column) in columns {
            frame.push_column(name, column)?;
        }
        Ok(frame)
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of a column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Whether a column exists
    pub fn contains(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    /// Append a column at the end
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), DataError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(DataError::DuplicateColumn(name));
        }
        if self.columns.is_empty() {
            self.height = column.len();
        } else if column.len() != self.height {
            return Err(DataError::HeightMismatch {
                column: name,
                expected: self.height,
                actual: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Remove a column and return it
    pub fn pop(&mut self, name: &str) -> Result<Column, DataError> {
        let index = self
            .column_index(name)
            .ok_or_else(|| DataError::MissingColumn {
                column: name.to_string(),
                source_name: "frame".to_string(),
            })?;
        self.names.remove(index);
        Ok(self.columns.remove(index))
    }

    /// Gather rows by index into a new frame
    pub fn take_rows(&self, indices: &[usize]) -> Frame {
        Frame {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            height: indices.len(),
        }
    }

    /// Left join `right` onto this frame on `key`.
    ///
    /// Every row of `self` is kept, in order. Right-hand non-key
    /// columns follow the left columns; unmatched rows get null cells. When
    /// the right side repeats a key, its first row is used.
    pub fn left_join(&self, right: &Frame, key: &str) -> Result<Frame, DataError> {
        let left_key = self.column(key).ok_or_else(|| DataError::MissingColumn {
            column: key.to_string(),
            source_name: "left side of join".to_string(),
        })?;
        let right_key = right.column(key).ok_or_else(|| DataError::MissingColumn {
            column: key.to_string(),
            source_name: "right side of join".to_string(),
        })?;

        let mut lookup: HashMap<String, usize> = HashMap::with_capacity(right.height);
        for row in 0..right.height {
            if let Some(k) = right_key.key_at(row) {
                lookup.entry(k).or_insert(row);
            }
        }

        let matches: Vec<Option<usize>> = (0..self.height)
            .map(|row| left_key.key_at(row).and_then(|k| lookup.get(&k).copied()))
            .collect();

        let mut joined = self.clone();
        for (name, column) in right.names.iter().zip(&right.columns) {
            if name == key {
                continue;
            }
            joined.push_column(name.clone(), column.take_optional(&matches))?;
        }
        Ok(joined)
    }

    /// Select columns by name, in the given order.
    ///
    /// Names absent from the frame become all-null numeric columns.
    pub fn select(&self, names: &[String]) -> Frame {
        let mut selected = Frame {
            names: Vec::with_capacity(names.len()),
            columns: Vec::with_capacity(names.len()),
            height: self.height,
        };
        for name in names {
            let column = self
                .column(name)
                .cloned()
                .unwrap_or_else(|| Column::null(self.height));
            selected.names.push(name.clone());
            selected.columns.push(column);
        }
        selected
    }

    /// Dense row-major matrix of the named columns.
    ///
    /// Column order follows `names`, never the frame's own order. Missing
    /// columns and null cells become `NaN`.
    pub fn to_matrix(&self, names: &[String]) -> Array2<f64> {
        let columns: Vec<Option<&Column>> = names.iter().map(|n| self.column(n)).collect();
        Array2::from_shape_fn((self.height, names.len()), |(row, col)| {
            columns[col].map_or(f64::NAN, |c| c.value_f64(row))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[Option<&str>]) -> Column {
        Column::Text(values.iter().map(|v| v.map(String::from)).collect())
    }

    fn sales() -> Frame {
        Frame::from_columns([
            ("price", Column::Numeric(vec![100.0, 200.0, 300.0])),
            ("zipcode", text(&[Some("98001"), Some("00501"), Some("99999")])),
        ])
        .unwrap()
    }

    fn demographics() -> Frame {
        Frame::from_columns([
            ("zipcode", text(&[Some("00501"), Some("98001"), Some("98001")])),
            ("population", Column::Numeric(vec![10.0, 20.0, 30.0])),
        ])
        .unwrap()
    }

    #[test]
    fn test_push_rejects_height_mismatch() {
        let mut frame = sales();
        let result = frame.push_column("extra", Column::Numeric(vec![1.0]));
        assert!(matches!(result, Err(DataError::HeightMismatch { .. })));
    }

    #[test]
    fn test_push_rejects_duplicate() {
        let mut frame = sales();
        let result = frame.push_column("price", Column::null(3));
        assert!(matches!(result, Err(DataError::DuplicateColumn(_))));
    }

    #[test]
    fn test_left_join_keeps_all_left_rows() {
        let joined = sales().left_join(&demographics(), "zipcode").unwrap();

        assert_eq!(joined.height(), 3);
        assert_eq!(joined.names(), &["price", "zipcode", "population"]);

        let population = joined.column("population").unwrap().as_numeric().unwrap();
        // first duplicate key wins
        assert_eq!(population[0], 20.0);
        // leading zeros preserved for matching
        assert_eq!(population[1], 10.0);
        assert!(population[2].is_nan());
    }

    #[test]
    fn test_left_join_missing_key() {
        let frame = Frame::from_columns([("price", Column::Numeric(vec![1.0]))]).unwrap();
        let result = frame.left_join(&demographics(), "zipcode");
        assert!(matches!(result, Err(DataError::MissingColumn { .. })));
    }

    #[test]
    fn test_numeric_key_matches_text_key() {
        let left = Frame::from_columns([("zipcode", Column::Numeric(vec![98001.0]))]).unwrap();
        let joined = left.left_join(&demographics(), "zipcode").unwrap();
        assert_eq!(joined.column("population").unwrap().value_f64(0), 20.0);
    }

    #[test]
    fn test_pop_removes_column() {
        let mut frame = sales();
        let price = frame.pop("price").unwrap();
        assert_eq!(price.len(), 3);
        assert!(!frame.contains("price"));
        assert!(frame.pop("price").is_err());
    }

    #[test]
    fn test_select_by_name_and_null_fill() {
        let frame = sales();
        let names = vec!["zipcode".to_string(), "missing".to_string(), "price".to_string()];
        let selected = frame.select(&names);

        assert_eq!(selected.names(), names.as_slice());
        assert!(selected.column("missing").unwrap().is_null(0));
    }

    #[test]
    fn test_to_matrix_follows_requested_order() {
        let frame = sales();
        let names = vec!["price".to_string(), "zipcode".to_string()];
        let reversed = vec!["zipcode".to_string(), "price".to_string()];

        let a = frame.to_matrix(&names);
        let b = frame.to_matrix(&reversed);

        assert_eq!(a[[1, 0]], 200.0);
        assert_eq!(a[[1, 1]], 501.0);
        assert_eq!(b[[1, 0]], 501.0);
        assert_eq!(b[[1, 1]], 200.0);
    }

    #[test]
    fn test_take_rows() {
        let frame = sales().take_rows(&[2, 0]);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.column("price").unwrap().value_f64(0), 300.0);
    }
}
