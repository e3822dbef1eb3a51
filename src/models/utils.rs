use ndarray::{Array2, ArrayView1};

use crate::error::EnsembleError;

/// Shape validation shared by every model's `fit`.
pub fn check_fit_inputs(x: &Array2<f32>, y: &[i32]) -> Result<(), EnsembleError> {
    if x.nrows() != y.len() {
        return Err(EnsembleError::InvalidInput(format!(
            "{} feature rows for {} labels",
            x.nrows(),
            y.len()
        )));
    }
    if y.is_empty() {
        return Err(EnsembleError::InvalidInput(
            "cannot fit on an empty dataset".to_string(),
        ));
    }
    Ok(())
}

/// Sorted, deduplicated label set of a training vector.
pub fn unique_classes(y: &[i32]) -> Vec<i32> {
    let mut classes = y.to_vec();
    classes.sort_unstable();
    classes.dedup();
    classes
}

/// Position of a label in a sorted class set.
pub fn class_index(classes: &[i32], label: i32) -> Option<usize> {
    classes.binary_search(&label).ok()
}

pub fn squared_distance(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}
