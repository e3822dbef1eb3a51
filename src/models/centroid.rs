use ndarray::Array2;

use crate::error::EnsembleError;
use crate::models::classifier_trait::Classifier;
use crate::models::utils;

const DISTANCE_EPS: f32 = 1e-6;

/// Nearest-centroid classifier: one mean vector per class, probabilities
/// from inverse distances renormalized per row.
#[derive(Debug, Clone, Default)]
pub struct NearestCentroidClassifier {
    state: Option<CentroidState>,
}

#[derive(Debug, Clone)]
struct CentroidState {
    classes: Vec<i32>,
    centroids: Array2<f32>,
}

impl NearestCentroidClassifier {
    pub fn new() -> Self {
        Self { state: None }
    }
}

impl Classifier for NearestCentroidClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), EnsembleError> {
        utils::check_fit_inputs(x, y)?;
        let classes = utils::unique_classes(y);
        let (_, d) = x.dim();
        let k = classes.len();
        let mut centroids = Array2::<f32>::zeros((k, d));
        let mut counts = vec![0usize; k];
        for (row, &label) in x.outer_iter().zip(y.iter()) {
            if let Some(ci) = utils::class_index(&classes, label) {
                counts[ci] += 1;
                for (c, &v) in row.iter().enumerate() {
                    centroids[[ci, c]] += v;
                }
            }
        }
        for ci in 0..k {
            if counts[ci] > 0 {
                for c in 0..d {
                    centroids[[ci, c]] /= counts[ci] as f32;
                }
            }
        }
        self.state = Some(CentroidState { classes, centroids });
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>, EnsembleError> {
        let state = self
            .state
            .as_ref()
            .ok_or(EnsembleError::NotFitted("predict_proba"))?;
        if x.ncols() != state.centroids.ncols() {
            return Err(EnsembleError::InvalidInput(format!(
                "model was fit on {} features, input has {}",
                state.centroids.ncols(),
                x.ncols()
            )));
        }
        let k = state.classes.len();
        let mut out = Array2::<f32>::zeros((x.nrows(), k));
        for (r, row) in x.outer_iter().enumerate() {
            let mut total = 0.0f32;
            for (ci, centroid) in state.centroids.outer_iter().enumerate() {
                let dist = utils::squared_distance(row, centroid).sqrt();
                let similarity = 1.0 / (dist + DISTANCE_EPS);
                out[[r, ci]] = similarity;
                total += similarity;
            }
            for ci in 0..k {
                out[[r, ci]] /= total;
            }
        }
        Ok(out)
    }

    fn classes(&self) -> Option<&[i32]> {
        self.state.as_ref().map(|s| s.classes.as_slice())
    }

    fn name(&self) -> &str {
        "nearest_centroid"
    }

    fn clone_box(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}
