//! Per-layer mean difference reporting.
//!
//! For each key present in both mappings whose entries are tagged
//! learnable, computes the signed mean of elementwise subtraction (base
//! tensor minus finetuned tensor). Emitted for observability only; the
//! output is not consumed downstream.
//!
//! A shape mismatch at a shared key is reported as a per-key outcome and
//! the pass continues to the next key rather than aborting.

use crate::params::{ParamSet, ParamTensor};
use std::fmt;

/// Outcome of diffing a single layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffOutcome {
    /// Signed mean of (base - finetuned) over all elements.
    MeanDiff(f64),
    /// Tensors at this key have different shapes; no mean is defined.
    ShapeMismatch {
        /// Shape in the base model
        base: Vec<usize>,
        /// Shape in the finetuned model
        finetuned: Vec<usize>,
    },
}

/// A single layer's difference report.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDiff {
    /// Layer name.
    pub name: String,
    /// Per-layer outcome.
    pub outcome: DiffOutcome,
}

impl fmt::Display for LayerDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            DiffOutcome::MeanDiff(mean) => {
                write!(f, "Layer {} has mean difference of {mean:.6e}", self.name)
            }
            DiffOutcome::ShapeMismatch { base, finetuned } => {
                write!(
                    f,
                    "Layer {}: shape mismatch {base:?} vs {finetuned:?}",
                    self.name
                )
            }
        }
    }
}

/// Signed mean of elementwise subtraction, `a - b`.
///
/// Meta tensors contribute zeros, consistent with the flattening policy.
fn mean_difference(a: &ParamTensor, b: &ParamTensor) -> f64 {
    let av = a.to_flat();
    let bv = b.to_flat();
    if av.is_empty() {
        return 0.0;
    }
    let sum: f64 = av
        .iter()
        .zip(bv.iter())
        .map(|(x, y)| f64::from(*x) - f64::from(*y))
        .sum();
    sum / av.len() as f64
}

/// Compute per-layer mean differences between two parameter mappings.
///
/// Iterates the base mapping in canonical order and reports one
/// [`LayerDiff`] for every key that is present in both mappings and
/// tagged learnable on both sides. Keys missing from the finetuned
/// mapping are skipped; run [`crate::compare_structure`] first to detect
/// them.
#[must_use]
pub fn layer_differences(base: &ParamSet, finetuned: &ParamSet) -> Vec<LayerDiff> {
    let mut diffs = Vec::new();

    for (name, base_entry) in base.iter() {
        let Some(tuned_entry) = finetuned.get(name) else {
            continue;
        };
        if !base_entry.learnable || !tuned_entry.learnable {
            continue;
        }

        let outcome = if base_entry.tensor.shape() == tuned_entry.tensor.shape() {
            DiffOutcome::MeanDiff(mean_difference(&base_entry.tensor, &tuned_entry.tensor))
        } else {
            DiffOutcome::ShapeMismatch {
                base: base_entry.tensor.shape().to_vec(),
                finetuned: tuned_entry.tensor.shape().to_vec(),
            }
        };

        diffs.push(LayerDiff {
            name: name.clone(),
            outcome,
        });
    }

    diffs
}
