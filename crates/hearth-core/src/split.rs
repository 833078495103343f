//! Seeded row partitioning for holdout evaluation and cross-validation

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Row indices of one train/evaluation partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `n` rows and hold out `ceil(n * test_fraction)` of them
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Partition {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64 * test_fraction).ceil() as usize).min(n);
    let train = indices.split_off(n_test);
    Partition {
        train,
        test: indices,
    }
}

/// Shuffled k-fold splitter.
///
/// The first `n % k` folds get one extra row, so fold sizes differ by at
/// most one. Every row lands in exactly one test fold.
#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
    seed: u64,
}

impl KFold {
    pub fn new(n_splits: usize, seed: u64) -> Self {
        Self { n_splits, seed }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// All folds for `n` rows
    pub fn split(&self, n: usize) -> Vec<Partition> {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let k = self.n_splits.max(1);
        let base = n / k;
        let extra = n % k;

        let mut folds = Vec::with_capacity(k);
        let mut start = 0;
        for fold in 0..k {
            let size = base + usize::from(fold < extra);
            let end = start + size;
            let test = indices[start..end].to_vec();
            let train = indices[..start]
                .iter()
                .chain(&indices[end..])
                .copied()
                .collect();
            folds.push(Partition { train, test });
            start = end;
        }
        folds
    }
}
