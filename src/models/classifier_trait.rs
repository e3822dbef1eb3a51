use ndarray::Array2;

use crate::combination;
use crate::error::EnsembleError;
use crate::introspect::Params;

/// The classifier capability consumed by aggregators. Centralized here so
/// implementations can live next to model code.
///
/// `fit` replaces any prior fitted state; `predict` and `predict_proba` are
/// side-effect-free and may be called any number of times after `fit`.
pub trait Classifier: Send + Sync {
    /// Fit the model on a feature matrix and its labels.
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), EnsembleError>;

    /// Predicted label per row: the arg-max of `predict_proba`, ties broken
    /// by the lowest class label. Implementations with a non-probabilistic
    /// decision rule override this.
    fn predict(&self, x: &Array2<f32>) -> Result<Vec<i32>, EnsembleError> {
        let classes = self.classes().ok_or(EnsembleError::NotFitted("predict"))?;
        let probas = self.predict_proba(x)?;
        combination::argmax_labels(&probas, classes)
    }

    /// Per-row probability distribution over `classes()`, columns in the
    /// same ascending label order.
    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>, EnsembleError>;

    /// Sorted class labels seen during `fit`; `None` before the first fit.
    fn classes(&self) -> Option<&[i32]>;

    /// Human readable model name.
    fn name(&self) -> &str {
        "classifier"
    }

    fn clone_box(&self) -> Box<dyn Classifier>;
}

impl Clone for Box<dyn Classifier> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A classifier that owns a pool of classifiers and a combination policy,
/// and exposes the parameter-introspection protocol. Aggregators satisfy the
/// `Classifier` contract themselves, so pools can nest aggregators.
pub trait Aggregator: Classifier + Params {
    /// Fresh instance rebuilt from copies of the current option values.
    /// Aggregator-level fitted state is not carried over.
    fn clone_aggregator(&self) -> Box<dyn Aggregator>;
}

impl Clone for Box<dyn Aggregator> {
    fn clone(&self) -> Self {
        self.clone_aggregator()
    }
}
