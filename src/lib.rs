//! classifier-ensemble: a combination layer for classification models.
//!
//! This crate merges the outputs of several base classifiers into one
//! consensus label and probability distribution per input. It provides the
//! combination policies (average, weighted average, maximization, median,
//! majority vote), a parameter-introspection protocol with dotted-key access
//! to nested aggregators, a deterministic bounded textual representation of
//! aggregator configurations, and a handful of small reference models for
//! filling pools.
//!
//! The design favors small, testable modules; base classifiers are consumed
//! through the `Classifier` trait and never reimplemented beyond the bundled
//! reference models.
pub mod combination;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod introspect;
pub mod models;
pub mod repr;
