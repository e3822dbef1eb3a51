use std::fmt;

use ndarray::Array2;
use rayon::prelude::*;

use crate::combination;
use crate::config::CombinationMethod;
use crate::error::EnsembleError;
use crate::introspect::{aggregators_eq, ParamValue, Params};
use crate::models::classifier_trait::{Aggregator, Classifier};
use crate::models::utils;
use crate::repr;

/// An ensemble over a fixed pool of base classifiers.
///
/// `fit` trains every pooled classifier on the same data (unless the pool is
/// marked pre-fitted); `predict`/`predict_proba` collect the per-classifier
/// outputs and merge them under the configured combination policy. Pooled
/// classifiers are independent, so their prediction calls are dispatched
/// across a rayon worker pool and recombined in declared pool order.
///
/// The aggregator satisfies the `Classifier` contract itself, so a pool may
/// contain other aggregators.
#[derive(Clone)]
pub struct SimpleClassifierAggregator {
    classifiers: Vec<Box<dyn Classifier>>,
    method: CombinationMethod,
    weights: Option<Vec<f32>>,
    pre_fitted: bool,
    classes: Option<Vec<i32>>,
}

fn check_pool(pool_len: usize, weights: Option<&[f32]>) -> Result<(), EnsembleError> {
    if pool_len < 2 {
        return Err(EnsembleError::Configuration(format!(
            "an aggregator needs at least 2 base classifiers, got {}",
            pool_len
        )));
    }
    if let Some(w) = weights {
        if w.len() != pool_len {
            return Err(EnsembleError::Configuration(format!(
                "{} weights for {} classifiers",
                w.len(),
                pool_len
            )));
        }
        if w.iter().any(|&v| v < 0.0) || w.iter().sum::<f32>() <= 0.0 {
            return Err(EnsembleError::Configuration(
                "classifier weights must be non-negative and sum to a positive value"
                    .to_string(),
            ));
        }
    }
    Ok(())
}

impl SimpleClassifierAggregator {
    /// Build an aggregator over `classifiers`, merged under `method`.
    ///
    /// `weights` (one per classifier) bias the weighted policies; omitted
    /// weights count every classifier equally. With `pre_fitted`, `fit` only
    /// records the class set and leaves the pooled models untouched.
    pub fn new(
        classifiers: Vec<Box<dyn Classifier>>,
        method: CombinationMethod,
        weights: Option<Vec<f32>>,
        pre_fitted: bool,
    ) -> Result<Self, EnsembleError> {
        check_pool(classifiers.len(), weights.as_deref())?;
        Ok(Self {
            classifiers,
            method,
            weights,
            pre_fitted,
            classes: None,
        })
    }

    pub fn classifiers(&self) -> &[Box<dyn Classifier>] {
        &self.classifiers
    }

    pub fn method(&self) -> CombinationMethod {
        self.method
    }

    pub fn weights(&self) -> Option<&[f32]> {
        self.weights.as_deref()
    }

    fn fitted_classes(&self, op: &'static str) -> Result<&[i32], EnsembleError> {
        self.classes.as_deref().ok_or(EnsembleError::NotFitted(op))
    }

    fn check_aligned(&self, clf: &dyn Classifier, classes: &[i32]) -> Result<(), EnsembleError> {
        let fitted = clf
            .classes()
            .ok_or(EnsembleError::NotFitted("predict"))?;
        if fitted != classes {
            return Err(EnsembleError::ClassAlignment(format!(
                "classifier '{}' was fit on classes {:?}, the aggregator on {:?}",
                clf.name(),
                fitted,
                classes
            )));
        }
        Ok(())
    }

    /// Per-classifier probability matrices, collected in pool order.
    fn pooled_probas(
        &self,
        x: &Array2<f32>,
        classes: &[i32],
    ) -> Result<Vec<Array2<f32>>, EnsembleError> {
        self.classifiers
            .par_iter()
            .map(|clf| {
                self.check_aligned(clf.as_ref(), classes)?;
                let probas = clf.predict_proba(x)?;
                if probas.dim() != (x.nrows(), classes.len()) {
                    return Err(EnsembleError::ClassAlignment(format!(
                        "classifier '{}' returned shape {:?}, expected {:?}",
                        clf.name(),
                        probas.dim(),
                        (x.nrows(), classes.len())
                    )));
                }
                Ok(probas)
            })
            .collect()
    }
}

impl Classifier for SimpleClassifierAggregator {
    fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<(), EnsembleError> {
        utils::check_fit_inputs(x, y)?;
        // refitting starts from scratch; prior fitted state is discarded
        self.classes = None;
        let classes = utils::unique_classes(y);
        if !self.pre_fitted {
            let n = self.classifiers.len();
            for (i, clf) in self.classifiers.iter_mut().enumerate() {
                log::trace!("fitting base classifier {}/{} ({})", i + 1, n, clf.name());
                clf.fit(x, y)?;
            }
        }
        log::debug!(
            "aggregator fit over {} classifiers and {} classes ({})",
            self.classifiers.len(),
            classes.len(),
            self.method
        );
        self.classes = Some(classes);
        Ok(())
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Vec<i32>, EnsembleError> {
        let classes = self.fitted_classes("predict")?;
        if self.method == CombinationMethod::MajorityVote {
            let votes: Vec<Vec<i32>> = self
                .classifiers
                .par_iter()
                .map(|clf| {
                    self.check_aligned(clf.as_ref(), classes)?;
                    clf.predict(x)
                })
                .collect::<Result<_, _>>()?;
            combination::majority_vote(&votes, classes, self.weights.as_deref())
        } else {
            let probas = self.predict_proba(x)?;
            combination::argmax_labels(&probas, classes)
        }
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>, EnsembleError> {
        let classes = self.fitted_classes("predict_proba")?;
        match self.method {
            CombinationMethod::MajorityVote => Err(EnsembleError::UnsupportedOperation(
                "majority_vote has no probabilistic output; use predict".to_string(),
            )),
            CombinationMethod::Average => {
                let probas = self.pooled_probas(x, classes)?;
                match &self.weights {
                    Some(w) => combination::weighted_average(&probas, w),
                    None => combination::average(&probas),
                }
            }
            CombinationMethod::WeightedAverage => {
                let probas = self.pooled_probas(x, classes)?;
                // weights default to 1 per classifier when omitted
                let uniform;
                let w = match &self.weights {
                    Some(w) => w.as_slice(),
                    None => {
                        uniform = vec![1.0; probas.len()];
                        uniform.as_slice()
                    }
                };
                combination::weighted_average(&probas, w)
            }
            CombinationMethod::Maximization => {
                combination::maximization(&self.pooled_probas(x, classes)?)
            }
            CombinationMethod::Median => combination::median(&self.pooled_probas(x, classes)?),
        }
    }

    fn classes(&self) -> Option<&[i32]> {
        self.classes.as_deref()
    }

    fn name(&self) -> &str {
        "simple_classifier_aggregator"
    }

    fn clone_box(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}

impl Params for SimpleClassifierAggregator {
    fn class_name(&self) -> &'static str {
        "SimpleClassifierAggregator"
    }

    fn param_names(&self) -> &'static [&'static str] {
        &["classifiers", "method", "weights", "pre_fitted"]
    }

    fn get_param(&self, name: &str) -> Option<ParamValue> {
        match name {
            "classifiers" => Some(ParamValue::Classifiers(self.classifiers.clone())),
            "method" => Some(ParamValue::Str(self.method.as_str().to_string())),
            "weights" => Some(match &self.weights {
                Some(w) => ParamValue::from_floats(w),
                None => ParamValue::None,
            }),
            "pre_fitted" => Some(ParamValue::Bool(self.pre_fitted)),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> Result<(), EnsembleError> {
        match name {
            "classifiers" => match value {
                ParamValue::Classifiers(pool) => {
                    check_pool(pool.len(), self.weights.as_deref())?;
                    self.classifiers = pool;
                    Ok(())
                }
                _ => Err(EnsembleError::InvalidParameterValue {
                    key: name.to_string(),
                    detail: "expected a classifier pool".to_string(),
                }),
            },
            "method" => match value {
                ParamValue::Str(s) => {
                    self.method = s.parse().map_err(|detail| {
                        EnsembleError::InvalidParameterValue {
                            key: name.to_string(),
                            detail,
                        }
                    })?;
                    Ok(())
                }
                _ => Err(EnsembleError::InvalidParameterValue {
                    key: name.to_string(),
                    detail: "expected a combination method name".to_string(),
                }),
            },
            "weights" => match value {
                ParamValue::None => {
                    self.weights = None;
                    Ok(())
                }
                other => match other.as_float_vec() {
                    Some(w) => {
                        check_pool(self.classifiers.len(), Some(&w))?;
                        self.weights = Some(w);
                        Ok(())
                    }
                    None => Err(EnsembleError::InvalidParameterValue {
                        key: name.to_string(),
                        detail: "expected a numeric list or None".to_string(),
                    }),
                },
            },
            "pre_fitted" => match value {
                ParamValue::Bool(b) => {
                    self.pre_fitted = b;
                    Ok(())
                }
                _ => Err(EnsembleError::InvalidParameterValue {
                    key: name.to_string(),
                    detail: "expected a boolean".to_string(),
                }),
            },
            _ => Err(EnsembleError::InvalidParameter {
                key: name.to_string(),
                class_name: self.class_name().to_string(),
                valid: self.param_names().to_vec(),
            }),
        }
    }

    fn default_params(&self) -> Vec<(&'static str, ParamValue)> {
        vec![
            ("method", ParamValue::Str("average".to_string())),
            ("weights", ParamValue::None),
            ("pre_fitted", ParamValue::Bool(false)),
        ]
    }
}

impl Aggregator for SimpleClassifierAggregator {
    fn clone_aggregator(&self) -> Box<dyn Aggregator> {
        let mut copy = self.clone();
        copy.classes = None;
        Box::new(copy)
    }
}

impl PartialEq for SimpleClassifierAggregator {
    fn eq(&self, other: &Self) -> bool {
        aggregators_eq(self, other)
    }
}

impl fmt::Display for SimpleClassifierAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&repr::format(self))
    }
}

impl fmt::Debug for SimpleClassifierAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&repr::format(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::centroid::NearestCentroidClassifier;
    use crate::models::stump::DecisionStumpClassifier;
    use ndarray::arr2;

    fn tiny_pool() -> Vec<Box<dyn Classifier>> {
        vec![
            Box::new(DecisionStumpClassifier::new()),
            Box::new(NearestCentroidClassifier::new()),
        ]
    }

    #[test]
    fn test_fit_then_predict_on_separable_data() {
        let x = arr2(&[
            [0.0, 0.1],
            [0.2, 0.0],
            [0.1, 0.2],
            [3.0, 3.0],
            [3.1, 2.9],
            [2.9, 3.1],
        ]);
        let y = vec![0, 0, 0, 1, 1, 1];

        let mut agg =
            SimpleClassifierAggregator::new(tiny_pool(), CombinationMethod::Average, None, false)
                .unwrap();
        agg.fit(&x, &y).unwrap();
        assert_eq!(agg.classes(), Some(&[0, 1][..]));
        assert_eq!(agg.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_pool_of_one_is_rejected() {
        let pool: Vec<Box<dyn Classifier>> = vec![Box::new(DecisionStumpClassifier::new())];
        let err = SimpleClassifierAggregator::new(pool, CombinationMethod::Average, None, false)
            .unwrap_err();
        assert!(matches!(err, EnsembleError::Configuration(_)));
    }

    #[test]
    fn test_weight_arity_is_validated() {
        let err = SimpleClassifierAggregator::new(
            tiny_pool(),
            CombinationMethod::WeightedAverage,
            Some(vec![1.0, 2.0, 3.0]),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, EnsembleError::Configuration(_)));
    }

    #[test]
    fn test_refit_replaces_the_class_set() {
        let x = arr2(&[[0.0], [1.0], [2.0], [3.0]]);
        let mut agg =
            SimpleClassifierAggregator::new(tiny_pool(), CombinationMethod::Average, None, false)
                .unwrap();
        agg.fit(&x, &[0, 0, 1, 1]).unwrap();
        assert_eq!(agg.classes(), Some(&[0, 1][..]));
        agg.fit(&x, &[5, 5, 9, 9]).unwrap();
        assert_eq!(agg.classes(), Some(&[5, 9][..]));
    }
}
