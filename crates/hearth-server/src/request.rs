//! Request parsing strategies
//!
//! Both endpoints turn their body into a one-row [`Frame`] through
//! [`FeatureRowSource`]. The strict strategy relies on serde for field and
//! type validation; the loose strategy keeps whatever recognized keys the
//! caller sent and leaves the rest to null-filling.

use hearth_core::{Column, FeatureList, Frame};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ServiceError;

/// Fields accepted by the strict endpoint, in schema order
pub const STRICT_FIELDS: [&str; 18] = [
    "bedrooms",
    "bathrooms",
    "sqft_living",
    "sqft_lot",
    "floors",
    "waterfront",
    "view",
    "condition",
    "grade",
    "sqft_above",
    "sqft_basement",
    "yr_built",
    "yr_renovated",
    "zipcode",
    "lat",
    "long",
    "sqft_living15",
    "sqft_lot15",
];

/// Turns a parsed request body into a single feature row
pub trait FeatureRowSource {
    /// Build a one-row frame carrying the join key and any known features
    fn into_feature_row(self, features: &FeatureList, join_key: &str)
        -> Result<Frame, ServiceError>;
}

/// Fixed, strictly typed request schema
#[derive(Debug, Clone, Deserialize)]
pub struct StrictPriceRequest {
    pub bedrooms: i64,
    pub bathrooms: f64,
    pub sqft_living: i64,
    pub sqft_lot: i64,
    pub floors: f64,
    pub waterfront: i64,
    pub view: i64,
    pub condition: i64,
    pub grade: i64,
    pub sqft_above: i64,
    pub sqft_basement: i64,
    pub yr_built: i64,
    pub yr_renovated: i64,
    pub zipcode: String,
    pub lat: f64,
    pub long: f64,
    pub sqft_living15: i64,
    pub sqft_lot15: i64,
}

impl FeatureRowSource for StrictPriceRequest {
    fn into_feature_row(
        self,
        _features: &FeatureList,
        join_key: &str,
    ) -> Result<Frame, ServiceError> {
        let numeric = [
            ("bedrooms", self.bedrooms as f64),
            ("bathrooms", self.bathrooms),
            ("sqft_living", self.sqft_living as f64),
            ("sqft_lot", self.sqft_lot as f64),
            ("floors", self.floors),
            ("waterfront", self.waterfront as f64),
            ("view", self.view as f64),
            ("condition", self.condition as f64),
            ("grade", self.grade as f64),
            ("sqft_above", self.sqft_above as f64),
            ("sqft_basement", self.sqft_basement as f64),
            ("yr_built", self.yr_built as f64),
            ("yr_renovated", self.yr_renovated as f64),
            ("lat", self.lat),
            ("long", self.long),
            ("sqft_living15", self.sqft_living15 as f64),
            ("sqft_lot15", self.sqft_lot15 as f64),
        ];

        let mut row = Frame::new();
        row.push_column(join_key, Column::Text(vec![Some(self.zipcode)]))?;
        for (name, value) in numeric {
            row.push_column(name, Column::Numeric(vec![value]))?;
        }
        Ok(row)
    }
}

/// Arbitrary JSON object; only recognized keys are used
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct LoosePriceRequest(pub Map<String, Value>);

impl FeatureRowSource for LoosePriceRequest {
    fn into_feature_row(self, features: &FeatureList, join_key: &str) -> Result<Frame, ServiceError> {
        let mut row = Frame::new();
        for (key, value) in self.0 {
            if key == join_key {
                row.push_column(key, key_cell(value)?)?;
            } else if features.contains(&key) {
                let column = value_cell(&key, value)?;
                row.push_column(key, column)?;
            }
        }
        Ok(row)
    }
}

/// Join key cell; numbers are accepted and rendered as text
fn key_cell(value: Value) -> Result<Column, ServiceError> {
    match value {
        Value::String(s) => Ok(Column::Text(vec![Some(s)])),
        Value::Null => Ok(Column::Text(vec![None])),
        Value::Number(n) => {
            let key = Column::Numeric(vec![n.as_f64().unwrap_or(f64::NAN)]).key_at(0);
            Ok(Column::Text(vec![key]))
        }
        other => Err(ServiceError::InvalidRequest(format!(
            "join key must be a string, got {}",
            other
        ))),
    }
}

fn value_cell(key: &str, value: Value) -> Result<Column, ServiceError> {
    match value {
        Value::Number(n) => Ok(Column::Numeric(vec![n.as_f64().unwrap_or(f64::NAN)])),
        Value::Bool(b) => Ok(Column::Numeric(vec![if b { 1.0 } else { 0.0 }])),
        Value::String(s) => Ok(Column::Text(vec![Some(s)])),
        Value::Null => Ok(Column::null(1)),
        Value::Array(_) | Value::Object(_) => Err(ServiceError::InvalidRequest(format!(
            "field '{}' must be a scalar",
            key
        ))),
    }
}
