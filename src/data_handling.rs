//! Dataset containers and helpers for exercising aggregators.
//!
//! This module defines `Dataset` plus synthetic Gaussian-blob generation and
//! a seeded train/test split used by the examples and the test suites.

use ndarray::{Array2, Axis};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use statrs::distribution::Normal;

use crate::error::EnsembleError;

#[derive(Debug, Clone)]
pub struct Dataset {
    pub x: Array2<f32>,
    pub y: Vec<i32>,
}

impl Dataset {
    pub fn new(x: Array2<f32>, y: Vec<i32>) -> Result<Self, EnsembleError> {
        if x.nrows() != y.len() {
            return Err(EnsembleError::InvalidInput(format!(
                "{} feature rows for {} labels",
                x.nrows(),
                y.len()
            )));
        }
        Ok(Self { x, y })
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            x: self.x.select(Axis(0), indices),
            y: indices.iter().map(|&i| self.y[i]).collect(),
        }
    }
}

/// Sample `n_per_center` points around each center with isotropic Gaussian
/// noise. The label of a point is the index of its center.
pub fn make_blobs(
    centers: &[Vec<f32>],
    n_per_center: usize,
    std_dev: f64,
    seed: u64,
) -> Result<Dataset, EnsembleError> {
    let first = centers.first().ok_or_else(|| {
        EnsembleError::InvalidInput("at least one blob center is required".to_string())
    })?;
    let n_features = first.len();
    if n_features == 0 || n_per_center == 0 {
        return Err(EnsembleError::InvalidInput(
            "blob centers need at least one feature and one sample".to_string(),
        ));
    }
    if centers.iter().any(|c| c.len() != n_features) {
        return Err(EnsembleError::InvalidInput(
            "all blob centers must have the same dimensionality".to_string(),
        ));
    }
    let noise = Normal::new(0.0, std_dev).map_err(|e| {
        EnsembleError::InvalidInput(format!("invalid blob standard deviation: {}", e))
    })?;
    let mut rng = StdRng::seed_from_u64(seed);

    let n_samples = centers.len() * n_per_center;
    let mut data = Vec::with_capacity(n_samples * n_features);
    let mut labels = Vec::with_capacity(n_samples);
    for (label, center) in centers.iter().enumerate() {
        for _ in 0..n_per_center {
            for &coord in center {
                data.push(coord + noise.sample(&mut rng) as f32);
            }
            labels.push(label as i32);
        }
    }
    let x = Array2::from_shape_vec((n_samples, n_features), data).map_err(|e| {
        EnsembleError::InvalidInput(format!("failed to assemble blob matrix: {}", e))
    })?;
    Dataset::new(x, labels)
}

/// Shuffle with a seeded rng and split off `test_ratio` of the samples.
pub fn train_test_split(
    data: &Dataset,
    test_ratio: f32,
    seed: u64,
) -> Result<(Dataset, Dataset), EnsembleError> {
    if !(0.0..1.0).contains(&test_ratio) || test_ratio == 0.0 {
        return Err(EnsembleError::InvalidInput(format!(
            "test_ratio must be in (0, 1), got {}",
            test_ratio
        )));
    }
    let n = data.n_samples();
    if n < 2 {
        return Err(EnsembleError::InvalidInput(
            "need at least 2 samples to split".to_string(),
        ));
    }
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let n_test = ((n as f32 * test_ratio).round() as usize).clamp(1, n - 1);
    let (test_idx, train_idx) = indices.split_at(n_test);
    Ok((data.select(train_idx), data.select(test_idx)))
}
