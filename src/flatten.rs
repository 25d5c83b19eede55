//! Flattening and concatenation of learnable parameters.
//!
//! Produces one flat `Vec<f32>` per model: every entry tagged learnable
//! is flattened to 1-D preserving element order and concatenated in
//! canonical key order. Meta tensors contribute zero-filled data of the
//! same shape.
//!
//! Because both mappings iterate in canonical order, two structurally
//! matching models always produce positionally comparable vectors.

use crate::params::ParamSet;

/// Flatten all learnable entries into a single vector.
///
/// Idempotent: the same set always yields an identical vector.
#[must_use]
pub fn flatten_learnable(set: &ParamSet) -> Vec<f32> {
    let capacity: usize = set
        .iter()
        .filter(|(_, e)| e.learnable)
        .map(|(_, e)| e.tensor.element_count())
        .sum();

    let mut out = Vec::with_capacity(capacity);
    for (_, entry) in set.iter() {
        if entry.learnable {
            entry.tensor.extend_flat(&mut out);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamTensor;

    fn dense(shape: Vec<usize>, data: Vec<f32>) -> ParamTensor {
        ParamTensor::dense(shape, data).expect("valid tensor")
    }

    #[test]
    fn test_flatten_single_tensor() {
        let mut set = ParamSet::new();
        set.insert("layer1.weight", dense(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]));
        assert_eq!(flatten_learnable(&set), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_flatten_concatenates_in_canonical_order() {
        let mut set = ParamSet::new();
        set.insert("b.weight", dense(vec![2], vec![3.0, 4.0]));
        set.insert("a.weight", dense(vec![2], vec![1.0, 2.0]));

        // "a.weight" < "b.weight" regardless of insertion order
        assert_eq!(flatten_learnable(&set), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_flatten_excludes_non_learnable() {
        let mut set = ParamSet::new();
        set.insert("layer1.weight", dense(vec![2], vec![1.0, 2.0]));
        set.insert("bn.running_mean", dense(vec![2], vec![8.0, 9.0]));

        assert_eq!(flatten_learnable(&set), vec![1.0, 2.0]);
    }

    #[test]
    fn test_flatten_respects_explicit_tag() {
        let mut set = ParamSet::new();
        set.insert_with_tag("custom_scale", dense(vec![1], vec![5.0]), true);
        set.insert_with_tag("layer1.weight", dense(vec![1], vec![1.0]), false);

        assert_eq!(flatten_learnable(&set), vec![5.0]);
    }

    #[test]
    fn test_flatten_zero_fills_meta() {
        let mut set = ParamSet::new();
        set.insert("layer1.weight", ParamTensor::meta(vec![3]));
        assert_eq!(flatten_learnable(&set), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_flatten_mixed_meta_and_dense() {
        let mut set = ParamSet::new();
        set.insert("a.weight", dense(vec![2], vec![1.0, 2.0]));
        set.insert("b.weight", ParamTensor::meta(vec![2]));
        set.insert("c.bias", dense(vec![1], vec![7.0]));

        assert_eq!(flatten_learnable(&set), vec![1.0, 2.0, 0.0, 0.0, 7.0]);
    }

    #[test]
    fn test_flatten_idempotent() {
        let mut set = ParamSet::new();
        set.insert("a.weight", dense(vec![2], vec![1.0, 2.0]));
        set.insert("b.bias", ParamTensor::meta(vec![2]));

        assert_eq!(flatten_learnable(&set), flatten_learnable(&set));
    }

    #[test]
    fn test_flatten_empty_set() {
        assert!(flatten_learnable(&ParamSet::new()).is_empty());
    }
}
