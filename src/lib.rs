//! Cotejar: model weight comparison in pure Rust.
//!
//! Cotejar loads two pretrained model checkpoints as named parameter
//! mappings, verifies their structures match, reports per-layer weight
//! differences, and computes aggregate statistics over the flattened
//! learnable parameters of both models.
//!
//! # Quick Start
//!
//! ```
//! use cotejar::{compare_structure, flatten_learnable, ge_percentage};
//! use cotejar::{ParamSet, ParamTensor};
//!
//! let mut base = ParamSet::new();
//! base.insert(
//!     "layer1.weight",
//!     ParamTensor::dense(vec![4], vec![1.0, 2.0, 3.0, 4.0]).unwrap(),
//! );
//!
//! let mut finetuned = ParamSet::new();
//! finetuned.insert(
//!     "layer1.weight",
//!     ParamTensor::dense(vec![4], vec![0.0, 2.0, 4.0, 3.0]).unwrap(),
//! );
//!
//! assert!(compare_structure(&base, &finetuned).is_match());
//!
//! let a = flatten_learnable(&base);
//! let b = flatten_learnable(&finetuned);
//! let pct = ge_percentage(&a, &b).unwrap();
//! assert!((pct - 50.0).abs() < 1e-9);
//! ```
//!
//! # Modules
//!
//! - [`params`]: Named parameter mappings and tensor storage
//! - [`structure`]: Structural comparison of two parameter mappings
//! - [`diff`]: Per-layer mean difference reporting
//! - [`flatten`]: Flattening and concatenation of learnable parameters
//! - [`stats`]: Aggregate statistics over flat weight vectors
//! - [`serialization`]: SafeTensors checkpoint reading and writing
//! - [`hub`]: Hugging Face Hub model pulls (feature `hub`)

pub mod diff;
pub mod error;
pub mod flatten;
/// Hugging Face Hub integration (feature `hub`)
#[cfg(feature = "hub")]
pub mod hub;
pub mod params;
pub mod serialization;
pub mod stats;
pub mod structure;

pub use diff::{layer_differences, DiffOutcome, LayerDiff};
pub use error::{CotejarError, Result};
pub use flatten::flatten_learnable;
pub use params::{ParamEntry, ParamSet, ParamTensor};
pub use stats::ge_percentage;
pub use structure::{compare_structure, Side, StructureReport};
