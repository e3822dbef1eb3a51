use std::cmp::Ordering;

use ndarray::Array2;

use crate::error::EnsembleError;
use crate::models::classifier_trait::Classifier;
use crate::models::utils;

/// Single-split decision tree.
///
/// The split is chosen over all (feature, threshold) candidates by weighted
/// Gini impurity; each side of the split predicts the class distribution of
/// its training samples.
#[derive(Debug, Clone, Default)]
pub struct DecisionStumpClassifier {
    state: Option<StumpState>,
}

#[derive(Debug, Clone)]
struct StumpState {
    classes: Vec<i32>,
    feature: usize,
    threshold: f32,
    below: Vec<f32>,
    above: Vec<f32>,
}

impl DecisionStumpClassifier {
    pub fn new() -> Self {
        Self { state: None }
    }
}

fn gini(counts: &[usize], total: usize) -> f32 {
    let mut sum = 0.0f32;
    for &c in counts {
        let p = c as f32 / total as f32;
        sum += p * p;
    }
    1.0 - sum
}

fn to_distribution(counts: &[usize], fallback: &[usize]) -> Vec<f32> {
    let own_total: usize = counts.iter().sum();
    let (counts, total) = if own_total > 0 {
        (counts, own_total)
    } else {
        (fallback, fallback.iter().sum())
    };
    counts.iter().map(|&c| c as f32 / total as f32).collect()
}

impl Classifier for DecisionStumpClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), EnsembleError> {
        utils::check_fit_inputs(x, y)?;
        let classes = utils::unique_classes(y);
        let k = classes.len();
        let n = x.nrows();
        let class_ids: Vec<usize> = y
            .iter()
            .map(|&label| classes.binary_search(&label).unwrap_or(0))
            .collect();
        let mut total = vec![0usize; k];
        for &c in &class_ids {
            total[c] += 1;
        }

        let mut best: Option<(f32, usize, f32)> = None;
        for feature in 0..x.ncols() {
            let mut order: Vec<usize> = (0..n).collect();
            order.sort_unstable_by(|&a, &b| {
                x[[a, feature]]
                    .partial_cmp(&x[[b, feature]])
                    .unwrap_or(Ordering::Equal)
            });
            let mut left = vec![0usize; k];
            for i in 0..n - 1 {
                left[class_ids[order[i]]] += 1;
                let here = x[[order[i], feature]];
                let next = x[[order[i + 1], feature]];
                if here == next {
                    continue;
                }
                let n_left = i + 1;
                let n_right = n - n_left;
                let mut right_gini = 1.0f32;
                {
                    let mut sum = 0.0f32;
                    for c in 0..k {
                        let p = (total[c] - left[c]) as f32 / n_right as f32;
                        sum += p * p;
                    }
                    right_gini -= sum;
                }
                let split_gini = (n_left as f32 * gini(&left, n_left)
                    + n_right as f32 * right_gini)
                    / n as f32;
                if best.map_or(true, |(g, _, _)| split_gini < g) {
                    best = Some((split_gini, feature, (here + next) / 2.0));
                }
            }
        }

        let state = match best {
            Some((_, feature, threshold)) => {
                let mut below = vec![0usize; k];
                let mut above = vec![0usize; k];
                for r in 0..n {
                    if x[[r, feature]] <= threshold {
                        below[class_ids[r]] += 1;
                    } else {
                        above[class_ids[r]] += 1;
                    }
                }
                StumpState {
                    classes,
                    feature,
                    threshold,
                    below: to_distribution(&below, &total),
                    above: to_distribution(&above, &total),
                }
            }
            // every feature constant: degenerate stump predicting the prior
            None => StumpState {
                classes,
                feature: 0,
                threshold: f32::INFINITY,
                below: to_distribution(&total, &total),
                above: to_distribution(&total, &total),
            },
        };
        self.state = Some(state);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>, EnsembleError> {
        let state = self
            .state
            .as_ref()
            .ok_or(EnsembleError::NotFitted("predict_proba"))?;
        if state.feature >= x.ncols() {
            return Err(EnsembleError::InvalidInput(format!(
                "stump split on feature {} but input has {} columns",
                state.feature,
                x.ncols()
            )));
        }
        let k = state.classes.len();
        let mut out = Array2::<f32>::zeros((x.nrows(), k));
        for r in 0..x.nrows() {
            let side = if x[[r, state.feature]] <= state.threshold {
                &state.below
            } else {
                &state.above
            };
            for c in 0..k {
                out[[r, c]] = side[c];
            }
        }
        Ok(out)
    }

    fn classes(&self) -> Option<&[i32]> {
        self.state.as_ref().map(|s| s.classes.as_slice())
    }

    fn name(&self) -> &str {
        "decision_stump"
    }

    fn clone_box(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}
