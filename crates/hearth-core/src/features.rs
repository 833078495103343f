//! Ordered feature list shared by training and inference

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::frame::Frame;

/// Column names the model was trained on, in training order.
///
/// Serialized as a plain JSON array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureList(Vec<String>);

impl FeatureList {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    /// Capture the column order of a feature table
    pub fn from_frame(frame: &Frame) -> Self {
        Self(frame.names().to_vec())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Model matrix with exactly these columns, selected by name.
    ///
    /// Columns absent from `frame` are null-filled.
    pub fn matrix(&self, frame: &Frame) -> Array2<f64> {
        frame.to_matrix(&self.0)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;

    #[test]
    fn test_json_is_plain_array() {
        let features = FeatureList::new(vec!["bedrooms".into(), "zipcode".into()]);
        assert_eq!(features.to_json().unwrap(), r#"["bedrooms","zipcode"]"#);
        assert_eq!(FeatureList::from_json(r#"["bedrooms","zipcode"]"#).unwrap(), features);
    }

    #[test]
    fn test_matrix_realigns_reordered_frame() {
        let features = FeatureList::new(vec!["a".into(), "b".into()]);
        let reordered = Frame::from_columns([
            ("b", Column::Numeric(vec![2.0])),
            ("extra", Column::Numeric(vec![9.0])),
            ("a", Column::Numeric(vec![1.0])),
        ])
        .unwrap();

        let matrix = features.matrix(&reordered);
        assert_eq!(matrix.row(0).to_vec(), vec![1.0, 2.0]);
    }
}
