use ndarray::{Array1, Array2};

use crate::error::EnsembleError;
use crate::models::classifier_trait::Classifier;
use crate::models::utils;

/// One-vs-rest logistic regression trained by batch gradient descent.
///
/// Per-class sigmoid scores are renormalized per row so the output is a
/// probability distribution over the class set.
#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    learning_rate: f32,
    n_iters: u32,
    state: Option<LogisticState>,
}

#[derive(Debug, Clone)]
struct LogisticState {
    classes: Vec<i32>,
    weights: Array2<f32>,
    bias: Vec<f32>,
}

impl LogisticClassifier {
    pub fn new(learning_rate: f32, n_iters: u32) -> Self {
        Self {
            learning_rate,
            n_iters,
            state: None,
        }
    }
}

impl Default for LogisticClassifier {
    fn default() -> Self {
        Self::new(0.1, 200)
    }
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for LogisticClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), EnsembleError> {
        utils::check_fit_inputs(x, y)?;
        if self.learning_rate <= 0.0 {
            return Err(EnsembleError::Configuration(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        let classes = utils::unique_classes(y);
        let (n, d) = x.dim();
        let k = classes.len();
        let mut weights = Array2::<f32>::zeros((k, d));
        let mut bias = vec![0.0f32; k];

        for (ci, &class) in classes.iter().enumerate() {
            let targets: Vec<f32> = y
                .iter()
                .map(|&label| if label == class { 1.0 } else { 0.0 })
                .collect();
            let mut w = Array1::<f32>::zeros(d);
            let mut b = 0.0f32;
            for _ in 0..self.n_iters {
                let z = x.dot(&w);
                let mut grad_w = Array1::<f32>::zeros(d);
                let mut grad_b = 0.0f32;
                for i in 0..n {
                    let err = sigmoid(z[i] + b) - targets[i];
                    grad_b += err;
                    grad_w.scaled_add(err, &x.row(i));
                }
                let step = self.learning_rate / n as f32;
                w.scaled_add(-step, &grad_w);
                b -= step * grad_b;
            }
            weights.row_mut(ci).assign(&w);
            bias[ci] = b;
        }

        self.state = Some(LogisticState {
            classes,
            weights,
            bias,
        });
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>, EnsembleError> {
        let state = self
            .state
            .as_ref()
            .ok_or(EnsembleError::NotFitted("predict_proba"))?;
        if x.ncols() != state.weights.ncols() {
            return Err(EnsembleError::InvalidInput(format!(
                "model was fit on {} features, input has {}",
                state.weights.ncols(),
                x.ncols()
            )));
        }
        let k = state.classes.len();
        let mut out = Array2::<f32>::zeros((x.nrows(), k));
        for (ci, w) in state.weights.outer_iter().enumerate() {
            let z = x.dot(&w);
            for (r, &zi) in z.iter().enumerate() {
                out[[r, ci]] = sigmoid(zi + state.bias[ci]);
            }
        }
        for mut row in out.rows_mut() {
            let sum: f32 = row.sum();
            if sum > 0.0 {
                row.mapv_inplace(|v| v / sum);
            } else {
                row.fill(1.0 / k as f32);
            }
        }
        Ok(out)
    }

    fn classes(&self) -> Option<&[i32]> {
        self.state.as_ref().map(|s| s.classes.as_slice())
    }

    fn name(&self) -> &str {
        "logistic"
    }

    fn clone_box(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}
