//! Integration tests for the parameter-introspection protocol and the
//! configuration repr, exercised through small fixture aggregators.

use ndarray::Array2;

use classifier_ensemble::error::EnsembleError;
use classifier_ensemble::introspect::{aggregators_eq, ParamMap, ParamValue, Params};
use classifier_ensemble::models::classifier_trait::{Aggregator, Classifier};
use classifier_ensemble::repr::{self, ReprMode};

// ---------------------------------------------------------------------------
// Fixture aggregators
// ---------------------------------------------------------------------------

macro_rules! fixture_classifier_impl {
    ($ty:ident) => {
        impl Classifier for $ty {
            fn fit(&mut self, _x: &Array2<f32>, _y: &[i32]) -> Result<(), EnsembleError> {
                Ok(())
            }

            fn predict_proba(&self, _x: &Array2<f32>) -> Result<Array2<f32>, EnsembleError> {
                Err(EnsembleError::NotFitted("predict_proba"))
            }

            fn classes(&self) -> Option<&[i32]> {
                None
            }

            fn clone_box(&self) -> Box<dyn Classifier> {
                Box::new(self.clone())
            }
        }

        impl Aggregator for $ty {
            fn clone_aggregator(&self) -> Box<dyn Aggregator> {
                Box::new(self.clone())
            }
        }
    };
}

#[derive(Clone)]
struct K {
    c: ParamValue,
    d: ParamValue,
}

impl K {
    fn new() -> Self {
        Self {
            c: ParamValue::None,
            d: ParamValue::None,
        }
    }
}

impl Params for K {
    fn class_name(&self) -> &'static str {
        "K"
    }

    fn param_names(&self) -> &'static [&'static str] {
        &["c", "d"]
    }

    fn get_param(&self, name: &str) -> Option<ParamValue> {
        match name {
            "c" => Some(self.c.clone()),
            "d" => Some(self.d.clone()),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> Result<(), EnsembleError> {
        match name {
            "c" => self.c = value,
            "d" => self.d = value,
            _ => {
                return Err(EnsembleError::InvalidParameter {
                    key: name.to_string(),
                    class_name: self.class_name().to_string(),
                    valid: self.param_names().to_vec(),
                })
            }
        }
        Ok(())
    }
}

fixture_classifier_impl!(K);

#[derive(Clone)]
struct T {
    a: ParamValue,
    b: ParamValue,
}

impl T {
    fn new(a: ParamValue, b: ParamValue) -> Self {
        Self { a, b }
    }

    fn nested() -> Self {
        Self::new(
            ParamValue::Aggregator(Box::new(K::new())),
            ParamValue::Aggregator(Box::new(K::new())),
        )
    }
}

impl Params for T {
    fn class_name(&self) -> &'static str {
        "T"
    }

    fn param_names(&self) -> &'static [&'static str] {
        &["a", "b"]
    }

    fn get_param(&self, name: &str) -> Option<ParamValue> {
        match name {
            "a" => Some(self.a.clone()),
            "b" => Some(self.b.clone()),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> Result<(), EnsembleError> {
        match name {
            "a" => self.a = value,
            "b" => self.b = value,
            _ => {
                return Err(EnsembleError::InvalidParameter {
                    key: name.to_string(),
                    class_name: self.class_name().to_string(),
                    valid: self.param_names().to_vec(),
                })
            }
        }
        Ok(())
    }
}

fixture_classifier_impl!(T);

#[derive(Clone)]
struct MyEstimator {
    l1: ParamValue,
    empty: ParamValue,
}

impl MyEstimator {
    fn new() -> Self {
        Self {
            l1: ParamValue::Int(0),
            empty: ParamValue::None,
        }
    }
}

impl Params for MyEstimator {
    fn class_name(&self) -> &'static str {
        "MyEstimator"
    }

    fn param_names(&self) -> &'static [&'static str] {
        &["l1", "empty"]
    }

    fn get_param(&self, name: &str) -> Option<ParamValue> {
        match name {
            "l1" => Some(self.l1.clone()),
            "empty" => Some(self.empty.clone()),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: ParamValue) -> Result<(), EnsembleError> {
        match name {
            "l1" => self.l1 = value,
            "empty" => self.empty = value,
            _ => {
                return Err(EnsembleError::InvalidParameter {
                    key: name.to_string(),
                    class_name: self.class_name().to_string(),
                    valid: self.param_names().to_vec(),
                })
            }
        }
        Ok(())
    }

    fn default_params(&self) -> Vec<(&'static str, ParamValue)> {
        vec![
            ("l1", ParamValue::Int(0)),
            ("empty", ParamValue::None),
        ]
    }
}

fixture_classifier_impl!(MyEstimator);

// ---------------------------------------------------------------------------
// Repr
// ---------------------------------------------------------------------------

#[test]
fn test_repr() {
    // smoke test on a plain estimator
    let my_estimator = MyEstimator::new();
    assert_eq!(repr::format(&my_estimator), "MyEstimator(l1=0, empty=None)");

    let test = T::nested();
    assert_eq!(
        repr::format(&test),
        "T(a=K(c=None, d=None), b=K(c=None, d=None))"
    );

    let some_est = T::new(
        ParamValue::List(vec![
            ParamValue::Str("long_params".to_string());
            1000
        ]),
        ParamValue::None,
    );
    assert_eq!(repr::format(&some_est).chars().count(), 415);
}

#[test]
fn test_repr_is_deterministic() {
    let test = T::nested();
    assert_eq!(repr::format(&test), repr::format(&test));

    let long = T::new(
        ParamValue::List(vec![ParamValue::Str("long_params".to_string()); 1000]),
        ParamValue::None,
    );
    assert_eq!(repr::format(&long), repr::format(&long));
}

#[test]
fn test_repr_changed_only_omits_defaults() {
    let fresh = MyEstimator::new();
    assert_eq!(repr::format_with(&fresh, ReprMode::ChangedOnly), "MyEstimator()");

    let mut touched = MyEstimator::new();
    touched
        .set_params(ParamMap::from_iter([("l1", ParamValue::Int(7))]))
        .unwrap();
    assert_eq!(
        repr::format_with(&touched, ReprMode::ChangedOnly),
        "MyEstimator(l1=7)"
    );
}

// ---------------------------------------------------------------------------
// get_params / set_params
// ---------------------------------------------------------------------------

#[test]
fn test_get_params() {
    let test = T::nested();

    let deep = test.get_params(true);
    let shallow = test.get_params(false);
    assert!(deep.contains_key("a__d"));
    assert!(!shallow.contains_key("a__d"));

    // the deep key set is a superset of the shallow one
    for (key, _) in shallow.iter() {
        assert!(deep.contains_key(key));
    }

    let mut test = test;
    test.set_params(ParamMap::from_iter([("a__d", ParamValue::Int(2))]))
        .unwrap();
    assert_eq!(test.get_params(true).get("a__d"), Some(&ParamValue::Int(2)));

    let err = test
        .set_params(ParamMap::from_iter([("a__a", ParamValue::Int(2))]))
        .unwrap_err();
    assert!(matches!(err, EnsembleError::InvalidParameter { .. }));
}

#[test]
fn test_deep_params_expand_recursively() {
    let inner = T::nested();
    let outer = T::new(
        ParamValue::Aggregator(Box::new(inner)),
        ParamValue::None,
    );

    let deep = outer.get_params(true);
    assert!(deep.contains_key("a__a__c"));
    assert!(deep.contains_key("a__b__d"));

    let mut outer = outer;
    outer
        .set_params(ParamMap::from_iter([(
            "a__b__d",
            ParamValue::Str("x".to_string()),
        )]))
        .unwrap();
    assert_eq!(
        outer.get_params(true).get("a__b__d"),
        Some(&ParamValue::Str("x".to_string()))
    );
}

#[test]
fn test_set_params_is_atomic() {
    let mut test = T::new(
        ParamValue::Aggregator(Box::new(K::new())),
        ParamValue::Int(5),
    );
    let before = test.get_params(true);

    let overrides = ParamMap::from_iter([
        ("b", ParamValue::Int(9)),
        ("nope", ParamValue::Int(0)),
    ]);
    let err = test.set_params(overrides).unwrap_err();
    match err {
        EnsembleError::InvalidParameter { key, valid, .. } => {
            assert_eq!(key, "nope");
            assert_eq!(valid, vec!["a", "b"]);
        }
        other => panic!("expected InvalidParameter, got {:?}", other),
    }

    // the valid key in the same batch must not have been applied
    assert_eq!(test.get_params(true), before);
}

#[test]
fn test_dotted_path_through_a_non_aggregator_is_rejected() {
    let mut test = T::new(ParamValue::Int(1), ParamValue::None);
    let err = test
        .set_params(ParamMap::from_iter([("a__c", ParamValue::Int(2))]))
        .unwrap_err();
    assert!(matches!(err, EnsembleError::InvalidParameter { .. }));
}

// ---------------------------------------------------------------------------
// Equality / clone
// ---------------------------------------------------------------------------

#[test]
fn test_structural_equality_and_clone() {
    let a = T::nested();
    let b = T::nested();
    assert!(aggregators_eq(&a, &b));

    let cloned = a.clone_aggregator();
    assert!(aggregators_eq(&a, cloned.as_ref()));

    let mut changed = T::nested();
    changed
        .set_params(ParamMap::from_iter([("a__c", ParamValue::Int(1))]))
        .unwrap();
    assert!(!aggregators_eq(&a, &changed));

    // different types never compare equal
    assert!(!aggregators_eq(&a, &K::new()));
}

#[test]
fn test_clone_copies_values_not_references() {
    let original = T::nested();
    let mut cloned = original.clone_aggregator();
    cloned
        .set_params(ParamMap::from_iter([("a__d", ParamValue::Int(3))]))
        .unwrap();

    // mutating the clone leaves the original untouched
    assert_eq!(original.get_params(true).get("a__d"), Some(&ParamValue::None));
    assert_eq!(
        cloned.get_params(true).get("a__d"),
        Some(&ParamValue::Int(3))
    );
}
