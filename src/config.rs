use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the outputs of the pooled classifiers are merged into one prediction.
///
/// Chosen at aggregator construction and immutable for its lifetime (the
/// introspection protocol may replace it wholesale, never mutate it in place).
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CombinationMethod {
    /// Plain per-cell mean of the probability matrices.
    Average,
    /// Weighted per-cell mean, normalized by the weight sum.
    WeightedAverage,
    /// Per-cell maximum, rows renormalized to sum 1.
    Maximization,
    /// Per-cell median, rows renormalized to sum 1.
    Median,
    /// Hard vote over per-classifier arg-max labels. No probabilistic output.
    MajorityVote,
}

impl CombinationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CombinationMethod::Average => "average",
            CombinationMethod::WeightedAverage => "weighted_average",
            CombinationMethod::Maximization => "maximization",
            CombinationMethod::Median => "median",
            CombinationMethod::MajorityVote => "majority_vote",
        }
    }
}

impl FromStr for CombinationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "average" => Ok(CombinationMethod::Average),
            "weighted_average" => Ok(CombinationMethod::WeightedAverage),
            "maximization" => Ok(CombinationMethod::Maximization),
            "median" => Ok(CombinationMethod::Median),
            "majority_vote" => Ok(CombinationMethod::MajorityVote),
            _ => Err(format!(
                "Unknown combination method: {}. Expected one of average, weighted_average, maximization, median, majority_vote",
                s
            )),
        }
    }
}

impl fmt::Display for CombinationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported reference models and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ClassifierConfig {
    DecisionStump,
    Logistic { learning_rate: f32, n_iters: u32 },
    Knn { n_neighbors: usize },
    NearestCentroid,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig::Logistic {
            learning_rate: 0.1,
            n_iters: 200,
        }
    }
}

impl FromStr for ClassifierConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "decision_stump" => Ok(ClassifierConfig::DecisionStump),
            "logistic" => Ok(ClassifierConfig::Logistic {
                learning_rate: 0.1,
                n_iters: 200,
            }),
            "knn" => Ok(ClassifierConfig::Knn { n_neighbors: 5 }),
            "nearest_centroid" => Ok(ClassifierConfig::NearestCentroid),
            _ => Err(format!("Unknown classifier type: {}", s)),
        }
    }
}
