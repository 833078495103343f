//! Train on small synthetic CSVs, persist, reload, and predict

use std::fs;
use std::path::Path;

use hearth_core::loader::{self, load_demographics};
use hearth_core::{Column, Frame, HearthConfig, ModelArtifacts, Trainer};
use tempfile::TempDir;

const ZIPCODES: [&str; 4] = ["98103", "98115", "98004", "98001"];

fn write_sales(path: &Path, rows: usize) {
    let mut csv = String::from(
        "id,date,price,bedrooms,bathrooms,sqft_living,sqft_lot,floors,waterfront,view,\
condition,grade,sqft_above,sqft_basement,yr_built,yr_renovated,zipcode,lat,long,\
sqft_living15,sqft_lot15\n",
    );
    for i in 0..rows {
        let zip = ZIPCODES[i % ZIPCODES.len()];
        let sqft = 900 + (i * 53) % 2600;
        let grade = 5 + i % 6;
        let bedrooms = 1 + i % 5;
        let price = 120 * sqft + 25_000 * grade + 40_000 * (i % ZIPCODES.len());
        csv.push_str(&format!(
            "{id},20141013T000000,{price},{bedrooms},2.0,{sqft},5000,1.0,0,0,3,{grade},{sqft},0,1990,0,{zip},47.6,-122.3,{sqft},5000\n",
            id = i + 1,
        ));
    }
    fs::write(path, csv).unwrap();
}

fn write_demographics(path: &Path) {
    // 98001 deliberately missing so some sales have null demographics
    let csv = "\
ppltn_qty,medn_hshld_incm_amt,zipcode,per_bchlr
40000,70000,98103,35
38000,90000,98115,45
35000,120000,98004,60
";
    fs::write(path, csv).unwrap();
}

fn config_in(dir: &Path) -> HearthConfig {
    let mut config = HearthConfig::new();
    config.data.sales_path = dir.join("sales.csv");
    config.data.demographics_path = dir.join("demographics.csv");
    config.training.output_dir = dir.join("model");
    config.training.cv_folds = 4;
    config.training.forest.n_trees = 15;
    config
}

#[test]
fn test_train_persist_reload_predict() {
    let tmp = TempDir::new().unwrap();
    write_sales(&tmp.path().join("sales.csv"), 120);
    write_demographics(&tmp.path().join("demographics.csv"));
    let config = config_in(tmp.path());

    let report = Trainer::new(config.clone()).run().unwrap();
    assert_eq!(report.evaluation.n_train + report.evaluation.n_test, 120);
    assert_eq!(report.evaluation.cv_scores.len(), 4);
    assert!(report.evaluation.holdout_r2.is_finite());

    // Feature list: selected sales columns in file order without the target,
    // then the demographic columns without the join key.
    let first = ModelArtifacts::load(&config.training.output_dir).unwrap();
    assert_eq!(
        first.features().names(),
        &[
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
            "zipcode",
            "ppltn_qty",
            "medn_hshld_incm_amt",
            "per_bchlr",
        ]
    );

    let second = ModelArtifacts::load(&config.training.output_dir).unwrap();
    let demographics = load_demographics(&config.data.demographics_path, "zipcode").unwrap();

    let record = Frame::from_columns([
        ("zipcode", Column::Text(vec![Some("98115".to_string())])),
        ("grade", Column::Numeric(vec![8.0])),
        ("sqft_living", Column::Numeric(vec![1800.0])),
        ("bedrooms", Column::Numeric(vec![3.0])),
    ])
    .unwrap();
    let joined = record.left_join(&demographics, "zipcode").unwrap();

    let a = first
        .pipeline()
        .predict(first.features().matrix(&joined).view())
        .unwrap();
    let b = second
        .pipeline()
        .predict(second.features().matrix(&joined).view())
        .unwrap();
    assert_eq!(a, b);
    assert!(a[0] > 0.0);
}

#[test]
fn test_unknown_zipcode_still_predicts() {
    let tmp = TempDir::new().unwrap();
    write_sales(&tmp.path().join("sales.csv"), 80);
    write_demographics(&tmp.path().join("demographics.csv"));
    let config = config_in(tmp.path());
    Trainer::new(config.clone()).run().unwrap();

    let artifacts = ModelArtifacts::load(&config.training.output_dir).unwrap();
    let demographics = load_demographics(&config.data.demographics_path, "zipcode").unwrap();

    let record = Frame::from_columns([
        ("zipcode", Column::Text(vec![Some("00000".to_string())])),
        ("sqft_living", Column::Numeric(vec![2000.0])),
    ])
    .unwrap();
    let joined = record.left_join(&demographics, "zipcode").unwrap();
    assert!(joined.column("ppltn_qty").unwrap().is_null(0));

    let prediction = artifacts
        .pipeline()
        .predict(artifacts.features().matrix(&joined).view())
        .unwrap();
    assert!(prediction[0].is_finite());
}

#[test]
fn test_loader_row_count_matches_sales() {
    let tmp = TempDir::new().unwrap();
    write_sales(&tmp.path().join("sales.csv"), 37);
    write_demographics(&tmp.path().join("demographics.csv"));
    let config = config_in(tmp.path());

    let data = loader::load(
        &config.data.sales_path,
        &config.data.demographics_path,
        &config.data.loader_columns(),
    )
    .unwrap();

    assert_eq!(data.features.height(), 37);
    assert_eq!(data.target.len(), 37);
    assert!(!data.features.contains("price"));
}

#[test]
fn test_unwritable_output_fails_without_artifacts() {
    let tmp = TempDir::new().unwrap();
    write_sales(&tmp.path().join("sales.csv"), 40);
    write_demographics(&tmp.path().join("demographics.csv"));

    // a regular file where the output directory should go
    let blocker = tmp.path().join("model");
    fs::write(&blocker, "not a directory").unwrap();

    let mut config = config_in(tmp.path());
    config.training.cv_folds = 2;
    config.training.forest.n_trees = 3;
    let result = Trainer::new(config).run();

    assert!(result.is_err());
    assert!(!blocker.join("model_features.json").exists());
}

#[test]
fn test_missing_sales_file_is_fatal() {
    let tmp = TempDir::new().unwrap();
    write_demographics(&tmp.path().join("demographics.csv"));

    let result = Trainer::new(config_in(tmp.path())).run();
    assert!(matches!(result, Err(hearth_core::HearthError::Data(_))));
}
