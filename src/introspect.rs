//! Parameter introspection for aggregators.
//!
//! Every aggregator declares a static table of option names (its constructor
//! signature) and exposes get/set access to the current values. On top of the
//! per-type table this module provides deep parameter maps with dotted keys
//! (`outer__inner`) for nested aggregators, atomic bulk updates, and the
//! structural equality used by clones and tests.

use std::fmt;

use crate::error::EnsembleError;
use crate::models::classifier_trait::{Aggregator, Classifier};

/// The value universe of the introspection protocol.
///
/// Option values are reflected into this closed set. Nested aggregators stay
/// introspectable through the `Aggregator` variant; classifier pools are
/// carried whole but treated as opaque (they are capabilities, not options
/// with internal structure).
pub enum ParamValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ParamValue>),
    Classifiers(Vec<Box<dyn Classifier>>),
    Aggregator(Box<dyn Aggregator>),
}

impl ParamValue {
    pub fn from_floats(values: &[f32]) -> ParamValue {
        ParamValue::List(
            values
                .iter()
                .map(|&v| ParamValue::Float(f64::from(v)))
                .collect(),
        )
    }

    /// Numeric list conversion; `None` when any element is non-numeric.
    pub fn as_float_vec(&self) -> Option<Vec<f32>> {
        match self {
            ParamValue::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        ParamValue::Float(v) => out.push(*v as f32),
                        ParamValue::Int(v) => out.push(*v as f32),
                        _ => return None,
                    }
                }
                Some(out)
            }
            _ => None,
        }
    }
}

impl Clone for ParamValue {
    fn clone(&self) -> Self {
        match self {
            ParamValue::None => ParamValue::None,
            ParamValue::Bool(b) => ParamValue::Bool(*b),
            ParamValue::Int(i) => ParamValue::Int(*i),
            ParamValue::Float(x) => ParamValue::Float(*x),
            ParamValue::Str(s) => ParamValue::Str(s.clone()),
            ParamValue::List(items) => ParamValue::List(items.clone()),
            ParamValue::Classifiers(pool) => ParamValue::Classifiers(pool.clone()),
            ParamValue::Aggregator(agg) => ParamValue::Aggregator(agg.clone_aggregator()),
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamValue::None, ParamValue::None) => true,
            (ParamValue::Bool(a), ParamValue::Bool(b)) => a == b,
            (ParamValue::Int(a), ParamValue::Int(b)) => a == b,
            (ParamValue::Float(a), ParamValue::Float(b)) => a == b,
            (ParamValue::Str(a), ParamValue::Str(b)) => a == b,
            (ParamValue::List(a), ParamValue::List(b)) => a == b,
            // Pool equality is by declared model name; the pool is opaque to
            // the protocol and fitted state never participates in equality.
            (ParamValue::Classifiers(a), ParamValue::Classifiers(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| x.name() == y.name())
            }
            (ParamValue::Aggregator(a), ParamValue::Aggregator(b)) => {
                aggregators_eq(a.as_ref(), b.as_ref())
            }
            _ => false,
        }
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::None => f.write_str("None"),
            ParamValue::Bool(b) => write!(f, "{:?}", b),
            ParamValue::Int(i) => write!(f, "{:?}", i),
            ParamValue::Float(x) => write!(f, "{:?}", x),
            ParamValue::Str(s) => write!(f, "{:?}", s),
            ParamValue::List(items) => f.debug_list().entries(items.iter()).finish(),
            ParamValue::Classifiers(pool) => {
                let names: Vec<&str> = pool.iter().map(|c| c.name()).collect();
                write!(f, "Classifiers({:?})", names)
            }
            ParamValue::Aggregator(agg) => write!(f, "Aggregator({})", agg.class_name()),
        }
    }
}

/// Insertion-ordered name -> value map returned by `get_params`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamMap {
    entries: Vec<(String, ParamValue)>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace; a replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: ParamValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, ParamValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for ParamMap {
    type Item = (String, ParamValue);
    type IntoIter = std::vec::IntoIter<(String, ParamValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, ParamValue)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, ParamValue)>>(iter: I) -> Self {
        let mut map = ParamMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Static option table plus get/set access for one aggregator type.
///
/// `param_names` is the full, ordered set of declared options; it never
/// includes derived or fitted state. `get_param`/`set_param` cover exactly
/// those names. The bulk operations (`get_params`, `set_params`,
/// `validate_param_path`) are provided on top and behave identically for
/// every implementor.
pub trait Params {
    fn class_name(&self) -> &'static str;

    /// Declared option names in declaration order.
    fn param_names(&self) -> &'static [&'static str];

    fn get_param(&self, name: &str) -> Option<ParamValue>;

    fn set_param(&mut self, name: &str, value: ParamValue) -> Result<(), EnsembleError>;

    /// Declared defaults, for the changed-only repr mode. Options without a
    /// default (required constructor arguments) are absent.
    fn default_params(&self) -> Vec<(&'static str, ParamValue)> {
        Vec::new()
    }

    /// Current option values. With `deep`, every aggregator-valued option is
    /// additionally expanded under dotted keys `name__inner`, recursively.
    fn get_params(&self, deep: bool) -> ParamMap {
        let mut out = ParamMap::new();
        for &name in self.param_names() {
            if let Some(value) = self.get_param(name) {
                if deep {
                    if let ParamValue::Aggregator(inner) = &value {
                        for (key, nested) in inner.get_params(true) {
                            out.insert(format!("{}__{}", name, key), nested);
                        }
                    }
                }
                out.insert(name, value);
            }
        }
        out
    }

    /// Check that a (possibly dotted) key addresses a declared option,
    /// recursing through nested aggregators. Does not mutate anything.
    fn validate_param_path(&self, key: &str) -> Result<(), EnsembleError> {
        let (head, rest) = match key.split_once("__") {
            None => (key, None),
            Some((head, rest)) => (head, Some(rest)),
        };
        if head.is_empty() || !self.param_names().contains(&head) {
            return Err(EnsembleError::InvalidParameter {
                key: head.to_string(),
                class_name: self.class_name().to_string(),
                valid: self.param_names().to_vec(),
            });
        }
        match rest {
            None => Ok(()),
            Some(rest) if rest.is_empty() => Err(EnsembleError::InvalidParameter {
                key: key.to_string(),
                class_name: self.class_name().to_string(),
                valid: self.param_names().to_vec(),
            }),
            Some(rest) => match self.get_param(head) {
                Some(ParamValue::Aggregator(inner)) => inner.validate_param_path(rest),
                _ => Err(EnsembleError::InvalidParameter {
                    key: key.to_string(),
                    class_name: self.class_name().to_string(),
                    valid: self.param_names().to_vec(),
                }),
            },
        }
    }

    /// Apply a batch of overrides. Every key is validated (at every nesting
    /// level) before the first assignment, so an unrecognized key leaves the
    /// aggregator untouched. Dotted keys split once on the first `__` and
    /// delegate the remainder to the nested aggregator.
    fn set_params(&mut self, overrides: ParamMap) -> Result<(), EnsembleError> {
        for (key, _) in overrides.iter() {
            self.validate_param_path(key)?;
        }
        for (key, value) in overrides {
            match key.split_once("__") {
                None => self.set_param(&key, value)?,
                Some((head, rest)) => {
                    let mut inner = match self.get_param(head) {
                        Some(ParamValue::Aggregator(inner)) => inner,
                        _ => {
                            return Err(EnsembleError::InvalidParameter {
                                key,
                                class_name: self.class_name().to_string(),
                                valid: self.param_names().to_vec(),
                            })
                        }
                    };
                    let mut nested = ParamMap::new();
                    nested.insert(rest, value);
                    inner.set_params(nested)?;
                    self.set_param(head, ParamValue::Aggregator(inner))?;
                }
            }
        }
        Ok(())
    }
}

/// Structural equality: same type and equal shallow parameter values.
/// Fitted state is deliberately excluded.
pub fn aggregators_eq(a: &dyn Aggregator, b: &dyn Aggregator) -> bool {
    a.class_name() == b.class_name() && a.get_params(false) == b.get_params(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_map_preserves_insertion_order() {
        let mut map = ParamMap::new();
        map.insert("b", ParamValue::Int(1));
        map.insert("a", ParamValue::Int(2));
        map.insert("b", ParamValue::Int(3));
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(map.get("b"), Some(&ParamValue::Int(3)));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_float_vec_conversion() {
        let v = ParamValue::from_floats(&[0.5, 1.5]);
        assert_eq!(v.as_float_vec(), Some(vec![0.5, 1.5]));

        let mixed = ParamValue::List(vec![ParamValue::Int(1), ParamValue::Float(2.0)]);
        assert_eq!(mixed.as_float_vec(), Some(vec![1.0, 2.0]));

        let bad = ParamValue::List(vec![ParamValue::Str("x".to_string())]);
        assert_eq!(bad.as_float_vec(), None);
        assert_eq!(ParamValue::Int(3).as_float_vec(), None);
    }

    #[test]
    fn test_param_value_equality() {
        assert_eq!(ParamValue::None, ParamValue::None);
        assert_ne!(ParamValue::None, ParamValue::Int(0));
        assert_eq!(
            ParamValue::List(vec![ParamValue::Float(1.0)]),
            ParamValue::List(vec![ParamValue::Float(1.0)])
        );
    }
}
