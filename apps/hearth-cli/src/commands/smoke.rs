use std::path::PathBuf;

use clap::Args;
use hearth_core::csv_reader::{read_csv, CsvOptions};
use hearth_core::{Column, Frame};
use serde_json::{Map, Value};

/// Post every row of the unseen-examples file and print the estimates
#[derive(Args, Debug, Clone)]
pub struct SmokeCommand {
    /// CSV of records to estimate
    #[arg(long, default_value = "data/future_unseen_examples.csv")]
    pub data: PathBuf,

    /// Estimate endpoint
    #[arg(long, default_value = "http://localhost:8000/api/price")]
    pub url: String,
}

impl SmokeCommand {
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let frame = read_csv(&self.data, &CsvOptions::default().with_text_column("zipcode"))?;
        tracing::info!("Posting {} records to {}", frame.height(), self.url);

        let client = reqwest::Client::new();
        for row in 0..frame.height() {
            let record = record_json(&frame, row);
            let response = client.post(&self.url).json(&record).send().await?;
            let status = response.status();
            let body: Value = response.json().await?;

            match body.get("estimated_price").and_then(Value::as_f64) {
                Some(price) => println!("Estimated price: ${:.2}", price),
                None => {
                    return Err(format!("record {} rejected with {}: {}", row, status, body).into())
                }
            }
        }
        Ok(())
    }
}

/// One CSV row as a JSON object; whole numbers are sent as integers
fn record_json(frame: &Frame, row: usize) -> Value {
    let mut record = Map::new();
    for name in frame.names() {
        let value = match frame.column(name) {
            Some(Column::Numeric(values)) => number(values[row]),
            Some(Column::Text(values)) => values[row].clone().map_or(Value::Null, Value::String),
            None => Value::Null,
        };
        record.insert(name.clone(), value);
    }
    Value::Object(record)
}

fn number(x: f64) -> Value {
    if x.is_nan() {
        Value::Null
    } else if x.fract() == 0.0 && x.abs() < 1e15 {
        Value::from(x as i64)
    } else {
        Value::from(x)
    }
}
