//! Named parameter mappings and tensor storage.
//!
//! A model checkpoint is represented as a [`ParamSet`]: an ordered mapping
//! from hierarchical layer names to [`ParamTensor`] values. Ordering is
//! canonical (lexicographic by key), so two sets with equal key sets are
//! positionally comparable after flattening regardless of the order the
//! loader produced their entries in.
//!
//! Each entry carries a `learnable` capability tag supplied at insertion
//! time. Loaders default the tag from the layer name ([`is_learnable_name`]);
//! downstream filtering uses the tag, never the name.

use crate::error::{CotejarError, Result};
use std::collections::BTreeMap;

/// Backing data of a parameter tensor.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    /// Fully materialized values, length equals the shape's element count.
    Dense(Vec<f32>),
    /// Uninitialized tensor: defined shape, no real backing data.
    ///
    /// Contributes zeros when flattened.
    Meta,
}

/// A parameter tensor: a shape plus dense or uninitialized data.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamTensor {
    shape: Vec<usize>,
    data: TensorData,
}

impl ParamTensor {
    /// Create a dense tensor.
    ///
    /// # Errors
    ///
    /// Returns [`CotejarError::ShapeMismatch`] if the shape's element count
    /// does not equal the data length.
    pub fn dense(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(CotejarError::ShapeMismatch {
                shape,
                elements: data.len(),
            });
        }
        Ok(Self {
            shape,
            data: TensorData::Dense(data),
        })
    }

    /// Create an uninitialized (meta) tensor with the given shape.
    #[must_use]
    pub fn meta(shape: Vec<usize>) -> Self {
        Self {
            shape,
            data: TensorData::Meta,
        }
    }

    /// Tensor shape.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Flat element count (product of shape).
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether this tensor is uninitialized.
    #[must_use]
    pub fn is_meta(&self) -> bool {
        matches!(self.data, TensorData::Meta)
    }

    /// Dense values, if materialized.
    #[must_use]
    pub fn values(&self) -> Option<&[f32]> {
        match &self.data {
            TensorData::Dense(v) => Some(v),
            TensorData::Meta => None,
        }
    }

    /// Append this tensor's flattened values to `out`.
    ///
    /// Element order is preserved; meta tensors contribute
    /// `element_count()` zeros.
    pub fn extend_flat(&self, out: &mut Vec<f32>) {
        match &self.data {
            TensorData::Dense(v) => out.extend_from_slice(v),
            TensorData::Meta => out.resize(out.len() + self.element_count(), 0.0),
        }
    }

    /// Flattened values as a fresh vector.
    #[must_use]
    pub fn to_flat(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.element_count());
        self.extend_flat(&mut out);
        out
    }
}

/// A named parameter with its capability tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamEntry {
    /// The tensor value.
    pub tensor: ParamTensor,
    /// Whether this entry holds learnable parameters.
    pub learnable: bool,
}

/// Default learnability heuristic used by loaders.
///
/// Keys containing "weight" or "bias" are assumed learnable; buffers such
/// as `running_mean` or step counters are not.
#[must_use]
pub fn is_learnable_name(name: &str) -> bool {
    name.contains("weight") || name.contains("bias")
}

/// Ordered mapping from layer names to parameter entries.
///
/// Iteration order is always lexicographic by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    entries: BTreeMap<String, ParamEntry>,
}

impl ParamSet {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tensor, tagging learnability from the name heuristic.
    pub fn insert(&mut self, name: impl Into<String>, tensor: ParamTensor) {
        let name = name.into();
        let learnable = is_learnable_name(&name);
        self.entries.insert(name, ParamEntry { tensor, learnable });
    }

    /// Insert a tensor with an explicit learnability tag.
    pub fn insert_with_tag(&mut self, name: impl Into<String>, tensor: ParamTensor, learnable: bool) {
        self.entries
            .insert(name.into(), ParamEntry { tensor, learnable });
    }

    /// Look up an entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamEntry> {
        self.entries.get(name)
    }

    /// Whether a key is present.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in canonical order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Entries in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamEntry)> {
        self.entries.iter()
    }

    /// Total element count across all entries.
    #[must_use]
    pub fn total_elements(&self) -> usize {
        self.entries
            .values()
            .map(|e| e.tensor.element_count())
            .sum()
    }
}
