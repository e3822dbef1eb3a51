use crate::config::ClassifierConfig;
use crate::models::centroid::NearestCentroidClassifier;
use crate::models::classifier_trait::Classifier;
use crate::models::knn::KnnClassifier;
use crate::models::logistic::LogisticClassifier;
use crate::models::stump::DecisionStumpClassifier;

/// Build a boxed classifier from a `ClassifierConfig`.
/// Currently this is a thin factory implemented as a single function.
pub fn build_classifier(config: ClassifierConfig) -> Box<dyn Classifier> {
    match config {
        ClassifierConfig::DecisionStump => Box::new(DecisionStumpClassifier::new()),
        ClassifierConfig::Logistic {
            learning_rate,
            n_iters,
        } => Box::new(LogisticClassifier::new(learning_rate, n_iters)),
        ClassifierConfig::Knn { n_neighbors } => Box::new(KnnClassifier::new(n_neighbors)),
        ClassifierConfig::NearestCentroid => Box::new(NearestCentroidClassifier::new()),
    }
}
