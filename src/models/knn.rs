use std::cmp::Ordering;

use ndarray::Array2;

use crate::error::EnsembleError;
use crate::models::classifier_trait::Classifier;
use crate::models::utils;

/// k-nearest-neighbor classifier over Euclidean distance.
///
/// Probabilities are the class frequencies among the neighbors, so they are
/// coarse (multiples of 1/k) but well formed.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    n_neighbors: usize,
    state: Option<KnnState>,
}

#[derive(Debug, Clone)]
struct KnnState {
    classes: Vec<i32>,
    x: Array2<f32>,
    y: Vec<i32>,
}

impl KnnClassifier {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            state: None,
        }
    }
}

impl Default for KnnClassifier {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Classifier for KnnClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), EnsembleError> {
        utils::check_fit_inputs(x, y)?;
        if self.n_neighbors == 0 {
            return Err(EnsembleError::Configuration(
                "n_neighbors must be at least 1".to_string(),
            ));
        }
        self.state = Some(KnnState {
            classes: utils::unique_classes(y),
            x: x.clone(),
            y: y.to_vec(),
        });
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>, EnsembleError> {
        let state = self
            .state
            .as_ref()
            .ok_or(EnsembleError::NotFitted("predict_proba"))?;
        if x.ncols() != state.x.ncols() {
            return Err(EnsembleError::InvalidInput(format!(
                "model was fit on {} features, input has {}",
                state.x.ncols(),
                x.ncols()
            )));
        }
        let k_classes = state.classes.len();
        let n_train = state.x.nrows();
        let k = self.n_neighbors.min(n_train);
        let mut out = Array2::<f32>::zeros((x.nrows(), k_classes));
        for (r, row) in x.outer_iter().enumerate() {
            let mut distances: Vec<(f32, usize)> = state
                .x
                .outer_iter()
                .enumerate()
                .map(|(i, train_row)| (utils::squared_distance(row, train_row), i))
                .collect();
            distances
                .sort_unstable_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
            for &(_, i) in distances.iter().take(k) {
                if let Some(ci) = utils::class_index(&state.classes, state.y[i]) {
                    out[[r, ci]] += 1.0;
                }
            }
            for c in 0..k_classes {
                out[[r, c]] /= k as f32;
            }
        }
        Ok(out)
    }

    fn classes(&self) -> Option<&[i32]> {
        self.state.as_ref().map(|s| s.classes.as_slice())
    }

    fn name(&self) -> &str {
        "knn"
    }

    fn clone_box(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}
