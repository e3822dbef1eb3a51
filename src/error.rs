use std::error::Error;
use std::fmt;

/// Error type shared by the introspection protocol, the combination engine
/// and the aggregators built on top of them.
#[derive(Debug, Clone, PartialEq)]
pub enum EnsembleError {
    /// An aggregator was constructed in violation of its option contract
    /// (empty pool, weight arity mismatch, ...).
    Configuration(String),
    /// `set_params` was given a key that is not a declared option at its
    /// nesting level.
    InvalidParameter {
        key: String,
        class_name: String,
        valid: Vec<&'static str>,
    },
    /// A declared option was assigned a value of the wrong shape or type.
    InvalidParameterValue { key: String, detail: String },
    /// `predict` / `predict_proba` called before `fit`.
    NotFitted(&'static str),
    /// Pooled classifiers disagree on the class-label set or output shape.
    ClassAlignment(String),
    /// The requested operation has no semantics under the configured policy.
    UnsupportedOperation(String),
    /// Runtime data with inconsistent shape (feature matrix vs. labels).
    InvalidInput(String),
}

impl fmt::Display for EnsembleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EnsembleError::Configuration(msg) => write!(f, "invalid configuration: {}", msg),
            EnsembleError::InvalidParameter {
                key,
                class_name,
                valid,
            } => write!(
                f,
                "invalid parameter '{}' for {}; valid options are [{}]",
                key,
                class_name,
                valid.join(", ")
            ),
            EnsembleError::InvalidParameterValue { key, detail } => {
                write!(f, "invalid value for parameter '{}': {}", key, detail)
            }
            EnsembleError::NotFitted(op) => {
                write!(f, "'{}' called before 'fit'", op)
            }
            EnsembleError::ClassAlignment(msg) => {
                write!(f, "base classifiers are not class-aligned: {}", msg)
            }
            EnsembleError::UnsupportedOperation(msg) => {
                write!(f, "unsupported operation: {}", msg)
            }
            EnsembleError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
        }
    }
}

impl Error for EnsembleError {}
