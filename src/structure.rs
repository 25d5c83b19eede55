//! Structural comparison of two parameter mappings.
//!
//! Two models are structurally comparable when their key sets are
//! set-equal. A mismatch is a normal outcome carried in
//! [`StructureReport`], not an error: callers branch on the report and
//! must not run dependent stages (flattening, statistics) on mismatch.

use crate::params::ParamSet;
use std::fmt;

/// Which mapping a key was missing from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The base model's parameter mapping.
    Base,
    /// The finetuned model's parameter mapping.
    Finetuned,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Base => write!(f, "base model"),
            Side::Finetuned => write!(f, "finetuned model"),
        }
    }
}

/// Outcome of a structural comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureReport {
    /// Key sets are identical.
    Match,
    /// A key exists on one side only. Reports the first mismatch found
    /// in canonical key order.
    Mismatch {
        /// The offending key.
        key: String,
        /// The side the key is absent from.
        missing_from: Side,
    },
}

impl StructureReport {
    /// Whether the structures match.
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, StructureReport::Match)
    }

    /// Human-readable summary line.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            StructureReport::Match => "Structure of both models matches".to_string(),
            StructureReport::Mismatch { key, missing_from } => {
                format!("Layer {key} not found in {missing_from}")
            }
        }
    }
}

/// Compare the key sets of two parameter mappings.
///
/// The check is symmetric: it fails if any base key is absent from the
/// finetuned mapping, or any finetuned key is absent from the base
/// mapping. Short-circuits on the first mismatch found in either
/// direction; with canonical ordering the reported key is deterministic.
#[must_use]
pub fn compare_structure(base: &ParamSet, finetuned: &ParamSet) -> StructureReport {
    for key in base.keys() {
        if !finetuned.contains_key(key) {
            return StructureReport::Mismatch {
                key: key.clone(),
                missing_from: Side::Finetuned,
            };
        }
    }
    for key in finetuned.keys() {
        if !base.contains_key(key) {
            return StructureReport::Mismatch {
                key: key.clone(),
                missing_from: Side::Base,
            };
        }
    }
    StructureReport::Match
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamTensor;

    fn set_of(keys: &[&str]) -> ParamSet {
        let mut set = ParamSet::new();
        for key in keys {
            set.insert(*key, ParamTensor::meta(vec![2]));
        }
        set
    }

    #[test]
    fn test_identical_key_sets_match() {
        let a = set_of(&["layer1.weight", "layer1.bias"]);
        let b = set_of(&["layer1.weight", "layer1.bias"]);
        assert!(compare_structure(&a, &b).is_match());
    }

    #[test]
    fn test_empty_sets_match() {
        assert!(compare_structure(&ParamSet::new(), &ParamSet::new()).is_match());
    }

    #[test]
    fn test_key_missing_from_finetuned() {
        let a = set_of(&["layer1.weight"]);
        let b = set_of(&["layer2.weight"]);

        let report = compare_structure(&a, &b);
        assert_eq!(
            report,
            StructureReport::Mismatch {
                key: "layer1.weight".to_string(),
                missing_from: Side::Finetuned,
            }
        );
    }

    #[test]
    fn test_key_missing_from_base() {
        let a = set_of(&["layer1.weight"]);
        let b = set_of(&["layer1.weight", "layer1.bias"]);

        let report = compare_structure(&a, &b);
        assert_eq!(
            report,
            StructureReport::Mismatch {
                key: "layer1.bias".to_string(),
                missing_from: Side::Base,
            }
        );
    }

    #[test]
    fn test_mismatch_deterministic_under_insertion_order() {
        // Canonical ordering: the lexicographically smallest missing key
        // is reported no matter the insertion order.
        let mut a = ParamSet::new();
        a.insert("z.weight", ParamTensor::meta(vec![1]));
        a.insert("a.weight", ParamTensor::meta(vec![1]));
        let b = ParamSet::new();

        let report = compare_structure(&a, &b);
        assert_eq!(
            report,
            StructureReport::Mismatch {
                key: "a.weight".to_string(),
                missing_from: Side::Finetuned,
            }
        );
    }

    #[test]
    fn test_shapes_do_not_affect_structure() {
        // Structure compares keys only; differing shapes still match here
        let mut a = ParamSet::new();
        a.insert("layer1.weight", ParamTensor::meta(vec![2]));
        let mut b = ParamSet::new();
        b.insert("layer1.weight", ParamTensor::meta(vec![3]));

        assert!(compare_structure(&a, &b).is_match());
    }

    #[test]
    fn test_summary_lines() {
        assert_eq!(
            StructureReport::Match.summary(),
            "Structure of both models matches"
        );
        let mismatch = StructureReport::Mismatch {
            key: "layer1.weight".to_string(),
            missing_from: Side::Finetuned,
        };
        assert_eq!(
            mismatch.summary(),
            "Layer layer1.weight not found in finetuned model"
        );
    }

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Base.to_string(), "base model");
        assert_eq!(Side::Finetuned.to_string(), "finetuned model");
    }
}
