pub mod centroid;
pub mod knn;
pub mod logistic;
pub mod stump;
pub mod utils;

pub mod classifier_trait;
pub mod factory;
pub mod simple;
