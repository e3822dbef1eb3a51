//! Prediction-combination policies.
//!
//! Pure functions over per-classifier probability matrices that share a row
//! count and a pre-aligned column ordering over the class labels. Shape
//! disagreement is a class-alignment failure; no re-alignment by relabeling
//! is attempted here.

use ndarray::Array2;
use statrs::statistics::{Data, Median};

use crate::error::EnsembleError;

fn check_alignment(probas: &[Array2<f32>]) -> Result<(usize, usize), EnsembleError> {
    let first = probas.first().ok_or_else(|| {
        EnsembleError::InvalidInput("no probability matrices to combine".to_string())
    })?;
    let dim = first.dim();
    for (i, p) in probas.iter().enumerate().skip(1) {
        if p.dim() != dim {
            return Err(EnsembleError::ClassAlignment(format!(
                "matrix {} has shape {:?}, expected {:?}",
                i,
                p.dim(),
                dim
            )));
        }
    }
    Ok(dim)
}

fn normalize_rows(matrix: &mut Array2<f32>) {
    let cols = matrix.ncols();
    for mut row in matrix.rows_mut() {
        let sum: f32 = row.sum();
        if sum > 0.0 {
            row.mapv_inplace(|v| v / sum);
        } else {
            row.fill(1.0 / cols as f32);
        }
    }
}

/// Per-cell mean of the matrices.
pub fn average(probas: &[Array2<f32>]) -> Result<Array2<f32>, EnsembleError> {
    let uniform = vec![1.0; probas.len()];
    weighted_average(probas, &uniform)
}

/// Per-cell weighted mean. Weights need not be pre-normalized; the result is
/// divided by their sum.
pub fn weighted_average(
    probas: &[Array2<f32>],
    weights: &[f32],
) -> Result<Array2<f32>, EnsembleError> {
    let (rows, cols) = check_alignment(probas)?;
    if weights.len() != probas.len() {
        return Err(EnsembleError::Configuration(format!(
            "{} weights for {} probability matrices",
            weights.len(),
            probas.len()
        )));
    }
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return Err(EnsembleError::Configuration(
            "combination weights must sum to a positive value".to_string(),
        ));
    }
    let mut combined = Array2::<f32>::zeros((rows, cols));
    for (p, &w) in probas.iter().zip(weights.iter()) {
        combined.scaled_add(w, p);
    }
    combined.mapv_inplace(|v| v / total);
    Ok(combined)
}

/// Per-cell maximum over the classifiers, rows renormalized to sum 1.
/// Takes the most confident vote per class, then rescales.
pub fn maximization(probas: &[Array2<f32>]) -> Result<Array2<f32>, EnsembleError> {
    check_alignment(probas)?;
    let mut combined = probas[0].clone();
    for p in &probas[1..] {
        combined.zip_mut_with(p, |acc, &v| {
            if v > *acc {
                *acc = v;
            }
        });
    }
    normalize_rows(&mut combined);
    Ok(combined)
}

/// Per-cell median over the classifiers, rows renormalized to sum 1.
/// Robust against a single badly calibrated classifier.
pub fn median(probas: &[Array2<f32>]) -> Result<Array2<f32>, EnsembleError> {
    let (rows, cols) = check_alignment(probas)?;
    let mut combined = Array2::<f32>::zeros((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            let cell: Vec<f64> = probas.iter().map(|p| f64::from(p[[r, c]])).collect();
            combined[[r, c]] = Data::new(cell).median() as f32;
        }
    }
    normalize_rows(&mut combined);
    Ok(combined)
}

/// Hard vote over per-classifier label predictions.
///
/// `votes` holds one label vector per classifier, `classes` the aggregated
/// label set in ascending order. Ties go to the lowest class label. Optional
/// weights scale each classifier's vote.
pub fn majority_vote(
    votes: &[Vec<i32>],
    classes: &[i32],
    weights: Option<&[f32]>,
) -> Result<Vec<i32>, EnsembleError> {
    let first = votes.first().ok_or_else(|| {
        EnsembleError::InvalidInput("no vote vectors to combine".to_string())
    })?;
    let rows = first.len();
    for (i, v) in votes.iter().enumerate().skip(1) {
        if v.len() != rows {
            return Err(EnsembleError::ClassAlignment(format!(
                "vote vector {} has {} entries, expected {}",
                i,
                v.len(),
                rows
            )));
        }
    }
    if let Some(w) = weights {
        if w.len() != votes.len() {
            return Err(EnsembleError::Configuration(format!(
                "{} weights for {} vote vectors",
                w.len(),
                votes.len()
            )));
        }
    }
    let mut combined = Vec::with_capacity(rows);
    for r in 0..rows {
        let mut tally = vec![0.0f32; classes.len()];
        for (i, v) in votes.iter().enumerate() {
            let label = v[r];
            let idx = classes.iter().position(|&c| c == label).ok_or_else(|| {
                EnsembleError::ClassAlignment(format!(
                    "vote label {} is not in the aggregated class set {:?}",
                    label, classes
                ))
            })?;
            tally[idx] += weights.map_or(1.0, |w| w[i]);
        }
        // strictly-greater keeps the first (lowest) label on ties
        let mut best = 0;
        for (idx, &count) in tally.iter().enumerate() {
            if count > tally[best] {
                best = idx;
            }
        }
        combined.push(classes[best]);
    }
    Ok(combined)
}

/// Label with the highest combined probability per row; ties go to the
/// lowest class label.
pub fn argmax_labels(
    probas: &Array2<f32>,
    classes: &[i32],
) -> Result<Vec<i32>, EnsembleError> {
    if probas.ncols() != classes.len() {
        return Err(EnsembleError::ClassAlignment(format!(
            "{} probability columns for {} classes",
            probas.ncols(),
            classes.len()
        )));
    }
    Ok(probas
        .outer_iter()
        .map(|row| {
            let mut best = 0;
            for (idx, &p) in row.iter().enumerate() {
                if p > row[best] {
                    best = idx;
                }
            }
            classes[best]
        })
        .collect())
}
