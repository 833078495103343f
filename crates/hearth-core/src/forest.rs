//! Bagged regression forest
//!
//! Each tree is grown on a bootstrap sample of the training rows using the
//! variance (squared error) criterion, considering every feature at every
//! split. The forest prediction is the mean of the tree predictions.
//!
//! # Missing values
//!
//! While searching a split on feature `f`, rows where `f` is `NaN` are tried
//! on both sides and the better side is recorded in `missing_left`. When a
//! node saw no missing values during training, `NaN` follows the child that
//! received more samples.
//!
//! # Reproducibility
//!
//! Per-tree seeds are drawn sequentially from the forest seed before the
//! trees are fit in parallel, so the fitted forest does not depend on the
//! thread count.

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ModelError};

/// Forest hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees
    pub n_trees: usize,
    /// Maximum tree depth (unbounded when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Minimum rows required to split a node
    pub min_samples_split: usize,
    /// Minimum rows in each child
    pub min_samples_leaf: usize,
    /// Seed for bootstrap sampling
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 0,
        }
    }
}

impl ForestConfig {
    /// Validate hyperparameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_trees == 0 {
            return Err(ConfigError::OutOfRange(
                "n_trees must be at least 1".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(ConfigError::OutOfRange(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ConfigError::OutOfRange(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(ConfigError::OutOfRange(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Unfitted forest regressor
#[derive(Debug, Clone, Default)]
pub struct ForestRegressor {
    config: ForestConfig,
}

impl ForestRegressor {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Grow the forest on `x` (rows x features) and targets `y`
    pub fn fit(&self, x: ArrayView2<'_, f64>, y: &[f64]) -> Result<FittedForest, ModelError> {
        self.config.validate()?;
        let (rows, cols) = x.dim();
        if rows == 0 {
            return Err(ModelError::EmptyData(
                "cannot fit forest on zero rows".to_string(),
            ));
        }
        if rows != y.len() {
            return Err(ModelError::LengthMismatch {
                features: rows,
                targets: y.len(),
            });
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.seed);
        let seeds: Vec<u64> = (0..self.config.n_trees).map(|_| rng.gen()).collect();

        let grown: Vec<(Tree, Vec<f64>)> = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                let sample: Vec<usize> = (0..rows).map(|_| rng.gen_range(0..rows)).collect();
                Tree::grow(x, y, sample, &self.config)
            })
            .collect();

        let mut importances = vec![0.0; cols];
        let mut trees = Vec::with_capacity(grown.len());
        for (tree, gains) in grown {
            let total: f64 = gains.iter().sum();
            if total > 0.0 {
                for (acc, gain) in importances.iter_mut().zip(&gains) {
                    *acc += gain / total;
                }
            }
            trees.push(tree);
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        Ok(FittedForest {
            trees,
            n_features: cols,
            importances,
        })
    }
}

/// Fitted forest, ready to predict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedForest {
    trees: Vec<Tree>,
    n_features: usize,
    importances: Vec<f64>,
}

impl FittedForest {
    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of features seen during fit
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Mean decrease in impurity per feature, summing to 1
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Predict one value per row
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        if x.ncols() != self.n_features {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }

        let n_trees = self.trees.len() as f64;
        let predictions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|r| {
                let row = x.row(r);
                self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees
            })
            .collect();
        Ok(Array1::from(predictions))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        missing_left: bool,
        left: u32,
        right: u32,
    },
}

/// Single regression tree stored as a flat node array; node 0 is the root
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

/// Best split found for a node
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    missing_left: bool,
    /// Reduction in summed squared error
    gain: f64,
}

/// Pending node during growth
struct Pending {
    node: usize,
    start: usize,
    end: usize,
    depth: usize,
}

impl Tree {
    /// Grow a tree over the given (possibly repeated) row indices.
    ///
    /// Returns the tree and the per-feature impurity decrease.
    fn grow(
        x: ArrayView2<'_, f64>,
        y: &[f64],
        mut rows: Vec<usize>,
        config: &ForestConfig,
    ) -> (Tree, Vec<f64>) {
        let mut gains = vec![0.0; x.ncols()];
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut stack = vec![Pending {
            node: 0,
            start: 0,
            end: rows.len(),
            depth: 0,
        }];

        while let Some(task) = stack.pop() {
            let slice = &mut rows[task.start..task.end];
            let n = slice.len();
            let mean = slice.iter().map(|&r| y[r]).sum::<f64>() / n as f64;

            let splittable = n >= config.min_samples_split
                && n >= 2 * config.min_samples_leaf
                && config.max_depth.map_or(true, |d| task.depth < d)
                && slice.iter().any(|&r| y[r] != y[slice[0]]);

            let split = if splittable {
                best_split(x, y, slice, config.min_samples_leaf)
            } else {
                None
            };

            let Some(split) = split else {
                nodes[task.node] = Node::Leaf { value: mean };
                continue;
            };

            let n_left = partition(x, slice, &split);
            gains[split.feature] += split.gain;

            let left = nodes.len();
            nodes.push(Node::Leaf { value: mean });
            nodes.push(Node::Leaf { value: mean });
            nodes[task.node] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                missing_left: split.missing_left,
                left: left as u32,
                right: (left + 1) as u32,
            };

            let mid = task.start + n_left;
            stack.push(Pending {
                node: left + 1,
                start: mid,
                end: task.end,
                depth: task.depth + 1,
            });
            stack.push(Pending {
                node: left,
                start: task.start,
                end: mid,
                depth: task.depth + 1,
            });
        }

        (Tree { nodes }, gains)
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    missing_left,
                    left,
                    right,
                } => {
                    let v = row[*feature];
                    let go_left = if v.is_nan() { *missing_left } else { v <= *threshold };
                    let next = if go_left { *left } else { *right };
                    index = next as usize;
                }
            }
        }
    }
}

/// Running sum and count of targets
#[derive(Clone, Copy, Default)]
struct Stats {
    sum: f64,
    count: usize,
}

impl Stats {
    fn add(&mut self, y: f64) {
        self.sum += y;
        self.count += 1;
    }

    fn merged(self, other: Stats) -> Stats {
        Stats {
            sum: self.sum + other.sum,
            count: self.count + other.count,
        }
    }

    fn minus(self, other: Stats) -> Stats {
        Stats {
            sum: self.sum - other.sum,
            count: self.count - other.count,
        }
    }

    /// sum² / n, the part of the squared error a split can change
    fn proxy(self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum * self.sum / self.count as f64
        }
    }
}

/// Search every feature for the split with the largest error reduction
fn best_split(
    x: ArrayView2<'_, f64>,
    y: &[f64],
    rows: &[usize],
    min_leaf: usize,
) -> Option<SplitCandidate> {
    let mut parent = Stats::default();
    rows.iter().for_each(|&r| parent.add(y[r]));
    let parent_proxy = parent.proxy();

    let mut best: Option<SplitCandidate> = None;
    let mut best_proxy = parent_proxy;
    let mut present: Vec<(f64, f64)> = Vec::with_capacity(rows.len());

    for feature in 0..x.ncols() {
        present.clear();
        let mut missing = Stats::default();
        for &r in rows {
            let v = x[[r, feature]];
            if v.is_nan() {
                missing.add(y[r]);
            } else {
                present.push((v, y[r]));
            }
        }
        if present.is_empty() {
            continue;
        }
        present.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut total_present = Stats::default();
        present.iter().for_each(|&(_, t)| total_present.add(t));

        let mut consider = |left: Stats, right: Stats, threshold: f64, missing_left: bool| {
            if left.count < min_leaf || right.count < min_leaf {
                return;
            }
            let proxy = left.proxy() + right.proxy();
            if proxy > best_proxy + f64::EPSILON * best_proxy.abs() {
                best_proxy = proxy;
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    missing_left,
                    gain: proxy - parent_proxy,
                });
            }
        };

        let mut left = Stats::default();
        for i in 1..present.len() {
            left.add(present[i - 1].1);
            let (lo, hi) = (present[i - 1].0, present[i].0);
            if lo == hi {
                continue;
            }
            let mut threshold = lo + (hi - lo) / 2.0;
            if threshold >= hi {
                threshold = lo;
            }
            let right = total_present.minus(left);

            if missing.count == 0 {
                let missing_left = left.count >= right.count;
                consider(left, right, threshold, missing_left);
            } else {
                consider(left.merged(missing), right, threshold, true);
                consider(left, right.merged(missing), threshold, false);
            }
        }

        if missing.count > 0 {
            consider(total_present, missing, f64::INFINITY, false);
        }
    }

    best
}

/// Reorder rows so the left child comes first; returns the left count
fn partition(x: ArrayView2<'_, f64>, rows: &mut [usize], split: &SplitCandidate) -> usize {
    let goes_left = |r: usize| {
        let v = x[[r, split.feature]];
        if v.is_nan() {
            split.missing_left
        } else {
            v <= split.threshold
        }
    };

    let (left, right): (Vec<usize>, Vec<usize>) = rows.iter().partition(|&&r| goes_left(r));
    let n_left = left.len();
    rows[..n_left].copy_from_slice(&left);
    rows[n_left..].copy_from_slice(&right);
    n_left
}
