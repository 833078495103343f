//! Training run orchestration
//!
//! One run loads and joins the inputs, holds out a seeded partition, fits
//! the pipeline on the remaining rows, and scores it on the holdout. It then
//! cross-validates fresh pipelines over the full dataset and saves the
//! holdout-trained pipeline together with its feature list.

use ndarray::{Array2, Axis};
use serde::Serialize;

use crate::artifacts::{ArtifactPaths, ModelArtifacts};
use crate::config::HearthConfig;
use crate::error::Result;
use crate::features::FeatureList;
use crate::loader::{self, LoadedData};
use crate::metrics::{mean_std, r2_score};
use crate::pipeline::Pipeline;
use crate::split::{train_test_split, KFold};

/// Scores from one training run
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Rows used for fitting
    pub n_train: usize,
    /// Rows held out
    pub n_test: usize,
    /// R² on the holdout partition
    pub holdout_r2: f64,
    /// R² per cross-validation fold
    pub cv_scores: Vec<f64>,
    /// Mean of the fold scores
    pub cv_mean: f64,
    /// Population standard deviation of the fold scores
    pub cv_std: f64,
    /// Features ranked by impurity importance, highest first
    pub importances: Vec<(String, f64)>,
}

/// Result of a full run, including where artifacts were written
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub evaluation: Evaluation,
    pub paths: ArtifactPaths,
}

/// Runs training as described by a [`HearthConfig`]
#[derive(Debug, Clone)]
pub struct Trainer {
    config: HearthConfig,
}

impl Trainer {
    pub fn new(config: HearthConfig) -> Self {
        Self { config }
    }

    /// Load inputs, train, evaluate, and persist artifacts
    pub fn run(&self) -> Result<TrainingReport> {
        self.config.validate()?;
        let data = &self.config.data;
        let loaded = loader::load(
            &data.sales_path,
            &data.demographics_path,
            &data.loader_columns(),
        )?;

        let (artifacts, evaluation) = self.train(&loaded)?;
        let paths = artifacts.save(&self.config.training.output_dir)?;
        Ok(TrainingReport { evaluation, paths })
    }

    /// Fit and evaluate on already-loaded data without touching the disk
    pub fn train(&self, data: &LoadedData) -> Result<(ModelArtifacts, Evaluation)> {
        let training = &self.config.training;
        let features = FeatureList::from_frame(&data.features);
        let x = features.matrix(&data.features);
        let y = &data.target;

        let partition = train_test_split(y.len(), training.test_fraction, training.split_seed);
        tracing::info!(
            "Split {} rows into {} train / {} holdout",
            y.len(),
            partition.train.len(),
            partition.test.len()
        );

        let pipeline = Pipeline::new(training.forest.clone());
        let (x_train, y_train) = gather(&x, y, &partition.train);
        let (x_test, y_test) = gather(&x, y, &partition.test);

        let fitted = pipeline.fit(x_train.view(), &y_train)?;
        let predictions = fitted.predict(x_test.view())?.to_vec();
        let holdout_r2 = r2_score(&y_test, &predictions);
        tracing::info!("r2 score: {:.6}", holdout_r2);

        let mut cv_scores = Vec::with_capacity(training.cv_folds);
        for (fold, split) in KFold::new(training.cv_folds, training.cv_seed)
            .split(y.len())
            .iter()
            .enumerate()
        {
            let (x_fold, y_fold) = gather(&x, y, &split.train);
            let (x_eval, y_eval) = gather(&x, y, &split.test);
            let fold_model = pipeline.fit(x_fold.view(), &y_fold)?;
            let fold_pred = fold_model.predict(x_eval.view())?.to_vec();
            let score = r2_score(&y_eval, &fold_pred);
            tracing::debug!("Fold {}: r2 {:.6}", fold, score);
            cv_scores.push(score);
        }
        let (cv_mean, cv_std) = mean_std(&cv_scores);
        tracing::info!("Cross-validation scores: {:?}", cv_scores);
        tracing::info!("Mean r2: {:.6}, standard deviation: {:.6}", cv_mean, cv_std);

        let importances = ranked_importances(&features, fitted.forest().feature_importances());
        for (rank, (name, value)) in importances.iter().enumerate() {
            tracing::info!("Feature rank {:>2}: {:<28} {:.4}", rank + 1, name, value);
        }

        let evaluation = Evaluation {
            n_train: partition.train.len(),
            n_test: partition.test.len(),
            holdout_r2,
            cv_scores,
            cv_mean,
            cv_std,
            importances,
        };
        let artifacts = ModelArtifacts::new(fitted, features)?;
        Ok((artifacts, evaluation))
    }
}

/// Rows of `x` and `y` at `indices`
fn gather(x: &Array2<f64>, y: &[f64], indices: &[usize]) -> (Array2<f64>, Vec<f64>) {
    (
        x.select(Axis(0), indices),
        indices.iter().map(|&i| y[i]).collect(),
    )
}

/// Pair feature names with importances, sorted highest first
pub fn ranked_importances(features: &FeatureList, importances: &[f64]) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = features
        .names()
        .iter()
        .cloned()
        .zip(importances.iter().copied())
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Column, Frame};

    fn synthetic(n: usize) -> LoadedData {
        let sqft: Vec<f64> = (0..n).map(|i| 800.0 + (i * 37 % 2000) as f64).collect();
        let grade: Vec<f64> = (0..n).map(|i| (5 + i % 6) as f64).collect();
        let target = sqft
            .iter()
            .zip(&grade)
            .map(|(s, g)| 150.0 * s + 20_000.0 * g)
            .collect();
        let features = Frame::from_columns([
            ("sqft_living", Column::Numeric(sqft)),
            ("grade", Column::Numeric(grade)),
        ])
        .unwrap();
        LoadedData { features, target }
    }

    fn trainer() -> Trainer {
        let mut config = HearthConfig::new();
        config.training.cv_folds = 3;
        config.training.forest.n_trees = 10;
        Trainer::new(config)
    }

    #[test]
    fn test_train_evaluates_and_keeps_feature_order() {
        let (artifacts, evaluation) = trainer().train(&synthetic(80)).unwrap();

        assert_eq!(evaluation.n_test, 20);
        assert_eq!(evaluation.n_train, 60);
        assert_eq!(evaluation.cv_scores.len(), 3);
        assert!(evaluation.holdout_r2 > 0.5);
        assert_eq!(artifacts.features().names(), &["sqft_living", "grade"]);
        assert_eq!(artifacts.pipeline().n_features(), 2);
    }

    #[test]
    fn test_ranked_importances_sorted() {
        let features = FeatureList::new(vec!["a".into(), "b".into(), "c".into()]);
        let ranked = ranked_importances(&features, &[0.2, 0.5, 0.3]);
        let names: Vec<&str> = ranked.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }
}
