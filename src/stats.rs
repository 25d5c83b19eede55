//! Aggregate statistics over flat weight vectors.

use crate::error::{CotejarError, Result};

/// Percentage of positions where `finetuned[i] >= base[i]`.
///
/// Purely a function of the two inputs; the result is in `[0, 100]` for
/// any two equal-length finite vectors. Empty vectors yield 100.0 (every
/// one of the zero positions vacuously satisfies the predicate).
///
/// # Errors
///
/// Returns [`CotejarError::LengthMismatch`] if the vectors differ in
/// length. That indicates the filtering or flattening diverged between
/// the two models, which cannot happen when the structural check passed;
/// there is no recovery path.
pub fn ge_percentage(base: &[f32], finetuned: &[f32]) -> Result<f64> {
    if base.len() != finetuned.len() {
        return Err(CotejarError::LengthMismatch {
            expected: base.len(),
            actual: finetuned.len(),
        });
    }
    if base.is_empty() {
        return Ok(100.0);
    }

    let count = base
        .iter()
        .copied()
        .zip(finetuned.iter().copied())
        .filter(|pair| pair.1 >= pair.0)
        .count();

    Ok(count as f64 / base.len() as f64 * 100.0)
}
