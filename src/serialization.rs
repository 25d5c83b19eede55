//! `SafeTensors` checkpoint reading and writing.
//!
//! Implements the `SafeTensors` layout:
//! ```text
//! [8-byte header: u64 metadata length (little-endian)]
//! [JSON metadata: tensor names, dtypes, shapes, data_offsets]
//! [Raw tensor data: little-endian values]
//! ```
//!
//! Reading produces a [`ParamSet`] with learnability tagged from the
//! layer-name heuristic. F32 is native; F16 and BF16 are converted to
//! f32 on read so both models flatten at a consistent width.

use crate::error::{CotejarError, Result};
use crate::params::{ParamSet, ParamTensor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Metadata for a single tensor in `SafeTensors` format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorMetadata {
    /// Data type of the tensor (e.g., "F32").
    pub dtype: String,
    /// Shape of the tensor.
    pub shape: Vec<usize>,
    /// Data offsets `[start, end]` in the raw data section.
    pub data_offsets: [usize; 2],
}

/// Complete `SafeTensors` metadata structure.
/// Uses `BTreeMap` for deterministic JSON serialization (sorted keys).
pub type SafeTensorsMetadata = BTreeMap<String, TensorMetadata>;

/// Load a `SafeTensors` checkpoint into a parameter set.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the header or metadata
/// is invalid, or any tensor's data region is inconsistent with its
/// declared shape and dtype.
pub fn load_safetensors<P: AsRef<Path>>(path: P) -> Result<ParamSet> {
    let bytes = fs::read(path.as_ref())?;
    let metadata_len = validate_and_read_header(&bytes)?;
    let metadata = parse_metadata(&bytes, metadata_len)?;
    let raw_data = &bytes[8 + metadata_len..];

    let mut set = ParamSet::new();
    for (name, tensor_meta) in &metadata {
        let values = extract_tensor(raw_data, tensor_meta)?;
        let expected: usize = tensor_meta.shape.iter().product();
        if expected != values.len() {
            return Err(CotejarError::FormatError {
                message: format!(
                    "tensor {name}: shape {:?} declares {expected} elements, data holds {}",
                    tensor_meta.shape,
                    values.len()
                ),
            });
        }
        set.insert(
            name.clone(),
            ParamTensor::dense(tensor_meta.shape.clone(), values)?,
        );
    }

    Ok(set)
}

/// Save a parameter set to `SafeTensors` format.
///
/// All entries are written as F32 in canonical key order; meta tensors
/// are materialized as zeros.
///
/// # Errors
///
/// Returns an error if metadata serialization or file writing fails.
pub fn save_safetensors<P: AsRef<Path>>(path: P, set: &ParamSet) -> Result<()> {
    let mut metadata = SafeTensorsMetadata::new();
    let mut raw_data = Vec::new();
    let mut current_offset = 0;

    for (name, entry) in set.iter() {
        let data = entry.tensor.to_flat();
        let start_offset = current_offset;
        let end_offset = current_offset + data.len() * 4;

        metadata.insert(
            name.clone(),
            TensorMetadata {
                dtype: "F32".to_string(),
                shape: entry.tensor.shape().to_vec(),
                data_offsets: [start_offset, end_offset],
            },
        );

        for &value in &data {
            raw_data.extend_from_slice(&value.to_le_bytes());
        }
        current_offset = end_offset;
    }

    let metadata_json =
        serde_json::to_string(&metadata).map_err(|e| CotejarError::Serialization(e.to_string()))?;
    let metadata_bytes = metadata_json.as_bytes();

    let mut out = Vec::with_capacity(8 + metadata_bytes.len() + raw_data.len());
    out.extend_from_slice(&(metadata_bytes.len() as u64).to_le_bytes());
    out.extend_from_slice(metadata_bytes);
    out.extend_from_slice(&raw_data);

    fs::write(path.as_ref(), out)?;
    Ok(())
}

pub(crate) fn validate_and_read_header(bytes: &[u8]) -> Result<usize> {
    if bytes.len() < 8 {
        return Err(CotejarError::FormatError {
            message: format!(
                "file is {} bytes, need at least 8 bytes for header",
                bytes.len()
            ),
        });
    }

    let header_bytes: [u8; 8] = bytes[0..8].try_into().map_err(|_| CotejarError::FormatError {
        message: "failed to read header bytes".to_string(),
    })?;
    let metadata_len = u64::from_le_bytes(header_bytes) as usize;

    if metadata_len == 0 {
        return Err(CotejarError::FormatError {
            message: "metadata length is 0".to_string(),
        });
    }

    if 8 + metadata_len > bytes.len() {
        return Err(CotejarError::FormatError {
            message: format!("metadata length {metadata_len} exceeds file size"),
        });
    }

    Ok(metadata_len)
}

pub(crate) fn parse_metadata(bytes: &[u8], metadata_len: usize) -> Result<SafeTensorsMetadata> {
    let metadata_json = &bytes[8..8 + metadata_len];
    let metadata_str = std::str::from_utf8(metadata_json).map_err(|e| CotejarError::FormatError {
        message: format!("metadata is not valid UTF-8: {e}"),
    })?;

    let raw_metadata: serde_json::Value = serde_json::from_str(metadata_str)
        .map_err(|e| CotejarError::Serialization(format!("JSON parsing failed: {e}")))?;

    let serde_json::Value::Object(map) = raw_metadata else {
        return Ok(SafeTensorsMetadata::new());
    };

    let mut metadata = SafeTensorsMetadata::new();
    for (key, value) in map {
        // "__metadata__" and other dunder sections hold user metadata,
        // not tensors
        if key.starts_with("__") {
            continue;
        }
        let tensor_meta = serde_json::from_value::<TensorMetadata>(value).map_err(|e| {
            CotejarError::FormatError {
                message: format!("invalid tensor metadata for {key}: {e}"),
            }
        })?;
        metadata.insert(key, tensor_meta);
    }

    Ok(metadata)
}

/// Extracts a tensor from raw `SafeTensors` data.
///
/// # Errors
///
/// Returns an error on invalid data offsets, size/dtype inconsistency,
/// or an unsupported dtype.
pub fn extract_tensor(raw_data: &[u8], tensor_meta: &TensorMetadata) -> Result<Vec<f32>> {
    let [start, end] = tensor_meta.data_offsets;

    if end > raw_data.len() {
        return Err(CotejarError::FormatError {
            message: format!(
                "invalid data offset: end={end} exceeds data size={}",
                raw_data.len()
            ),
        });
    }

    if start > end {
        return Err(CotejarError::FormatError {
            message: format!("invalid data offset: start={start} > end={end}"),
        });
    }

    let tensor_bytes = &raw_data[start..end];

    match tensor_meta.dtype.as_str() {
        "F32" => extract_f32(tensor_bytes),
        "BF16" => extract_bf16_to_f32(tensor_bytes),
        "F16" => extract_f16_to_f32(tensor_bytes),
        other => Err(CotejarError::FormatError {
            message: format!("unsupported dtype: {other}. Supported: F32, BF16, F16"),
        }),
    }
}

fn extract_f32(tensor_bytes: &[u8]) -> Result<Vec<f32>> {
    if tensor_bytes.len() % 4 != 0 {
        return Err(CotejarError::FormatError {
            message: format!(
                "invalid F32 tensor data: size {} is not a multiple of 4 bytes",
                tensor_bytes.len()
            ),
        });
    }

    Ok(tensor_bytes
        .chunks_exact(4)
        .map(|chunk| {
            let bytes: [u8; 4] = chunk.try_into().expect("chunk is 4 bytes");
            f32::from_le_bytes(bytes)
        })
        .collect())
}

fn extract_bf16_to_f32(tensor_bytes: &[u8]) -> Result<Vec<f32>> {
    if tensor_bytes.len() % 2 != 0 {
        return Err(CotejarError::FormatError {
            message: format!(
                "invalid BF16 tensor data: size {} is not a multiple of 2 bytes",
                tensor_bytes.len()
            ),
        });
    }

    Ok(tensor_bytes
        .chunks_exact(2)
        .map(|chunk| bf16_to_f32([chunk[0], chunk[1]]))
        .collect())
}

fn extract_f16_to_f32(tensor_bytes: &[u8]) -> Result<Vec<f32>> {
    if tensor_bytes.len() % 2 != 0 {
        return Err(CotejarError::FormatError {
            message: format!(
                "invalid F16 tensor data: size {} is not a multiple of 2 bytes",
                tensor_bytes.len()
            ),
        });
    }

    Ok(tensor_bytes
        .chunks_exact(2)
        .map(|chunk| f16_to_f32(u16::from_le_bytes([chunk[0], chunk[1]])))
        .collect())
}

/// Convert BF16 (Brain Float 16) to F32.
///
/// BF16 has the same exponent range as F32 (8 bits) but only 7 mantissa
/// bits; conversion zero-pads the mantissa.
#[inline]
fn bf16_to_f32(bytes: [u8; 2]) -> f32 {
    // BF16 is the upper 16 bits of an F32
    let bits = u32::from_le_bytes([0, 0, bytes[0], bytes[1]]);
    f32::from_bits(bits)
}

/// Convert F16 (IEEE 754 half-precision) to F32.
#[inline]
fn f16_to_f32(bits: u16) -> f32 {
    let sign = u32::from(bits >> 15) << 31;
    let exp = u32::from((bits >> 10) & 0x1F);
    let mantissa = u32::from(bits & 0x3FF);

    let bits32 = if exp == 0 {
        if mantissa == 0 {
            // Signed zero
            sign
        } else {
            // Subnormal: renormalize into an F32 normal
            let mut e: i32 = 113; // 127 - 15 + 1
            let mut m = mantissa;
            while m & 0x400 == 0 {
                m <<= 1;
                e -= 1;
            }
            m &= 0x3FF;
            sign | ((e as u32) << 23) | (m << 13)
        }
    } else if exp == 0x1F {
        // Inf / NaN
        sign | 0x7F80_0000 | (mantissa << 13)
    } else {
        sign | ((exp + 112) << 23) | (mantissa << 13)
    };

    f32::from_bits(bits32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fixture_set() -> ParamSet {
        let mut set = ParamSet::new();
        set.insert(
            "layer1.weight",
            ParamTensor::dense(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).expect("valid"),
        );
        set.insert(
            "layer1.bias",
            ParamTensor::dense(vec![2], vec![0.5, -0.5]).expect("valid"),
        );
        set.insert(
            "bn1.running_mean",
            ParamTensor::dense(vec![2], vec![0.1, 0.2]).expect("valid"),
        );
        set
    }

    #[test]
    fn test_save_and_load_checkpoint() {
        let dir = tempdir().expect("create dir");
        let path = dir.path().join("model.safetensors");

        let set = fixture_set();
        save_safetensors(&path, &set).expect("save");
        let loaded = load_safetensors(&path).expect("load");

        assert_eq!(loaded.len(), 3);
        let weight = loaded.get("layer1.weight").expect("weight present");
        assert_eq!(weight.tensor.shape(), &[2, 2]);
        assert_eq!(weight.tensor.values(), Some(&[1.0, 2.0, 3.0, 4.0][..]));
        assert!(weight.learnable);
        // Buffers load untagged
        assert!(!loaded.get("bn1.running_mean").expect("buffer").learnable);
    }

    #[test]
    fn test_save_materializes_meta_as_zeros() {
        let dir = tempdir().expect("create dir");
        let path = dir.path().join("meta.safetensors");

        let mut set = ParamSet::new();
        set.insert("layer1.weight", ParamTensor::meta(vec![3]));
        save_safetensors(&path, &set).expect("save");

        let loaded = load_safetensors(&path).expect("load");
        let weight = loaded.get("layer1.weight").expect("present");
        assert_eq!(weight.tensor.values(), Some(&[0.0, 0.0, 0.0][..]));
    }

    #[test]
    fn test_header_too_short() {
        let result = validate_and_read_header(&[0u8; 4]);
        assert!(matches!(result, Err(CotejarError::FormatError { .. })));
    }

    #[test]
    fn test_header_zero_metadata_len() {
        let result = validate_and_read_header(&[0u8; 16]);
        assert!(matches!(result, Err(CotejarError::FormatError { .. })));
    }

    #[test]
    fn test_header_metadata_exceeds_file() {
        let mut bytes = vec![0u8; 16];
        bytes[0..8].copy_from_slice(&1000u64.to_le_bytes());
        let result = validate_and_read_header(&bytes);
        assert!(matches!(result, Err(CotejarError::FormatError { .. })));
    }

    #[test]
    fn test_metadata_invalid_json() {
        let mut bytes = Vec::new();
        let junk = b"not json at all";
        bytes.extend_from_slice(&(junk.len() as u64).to_le_bytes());
        bytes.extend_from_slice(junk);
        let result = parse_metadata(&bytes, junk.len());
        assert!(matches!(result, Err(CotejarError::Serialization(_))));
    }

    #[test]
    fn test_metadata_skips_dunder_sections() {
        let json = r#"{"__metadata__":{"format":"pt"},"w":{"dtype":"F32","shape":[1],"data_offsets":[0,4]}}"#;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(json.len() as u64).to_le_bytes());
        bytes.extend_from_slice(json.as_bytes());

        let metadata = parse_metadata(&bytes, json.len()).expect("parse");
        assert_eq!(metadata.len(), 1);
        assert!(metadata.contains_key("w"));
    }

    #[test]
    fn test_extract_tensor_bad_offsets() {
        let meta = TensorMetadata {
            dtype: "F32".to_string(),
            shape: vec![4],
            data_offsets: [0, 64],
        };
        let result = extract_tensor(&[0u8; 16], &meta);
        assert!(matches!(result, Err(CotejarError::FormatError { .. })));
    }

    #[test]
    fn test_extract_tensor_unsupported_dtype() {
        let meta = TensorMetadata {
            dtype: "I64".to_string(),
            shape: vec![1],
            data_offsets: [0, 8],
        };
        let result = extract_tensor(&[0u8; 8], &meta);
        assert!(matches!(result, Err(CotejarError::FormatError { .. })));
    }

    #[test]
    fn test_load_rejects_shape_data_disagreement() {
        // Metadata declares 3 elements but offsets hold one F32
        let json = r#"{"w":{"dtype":"F32","shape":[3],"data_offsets":[0,4]}}"#;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(json.len() as u64).to_le_bytes());
        bytes.extend_from_slice(json.as_bytes());
        bytes.extend_from_slice(&1.0f32.to_le_bytes());

        let dir = tempdir().expect("create dir");
        let path = dir.path().join("bad.safetensors");
        fs::write(&path, bytes).expect("write");

        let result = load_safetensors(&path);
        assert!(matches!(result, Err(CotejarError::FormatError { .. })));
    }

    #[test]
    fn test_f16_conversion() {
        // 1.0 in F16 is 0x3C00
        assert_eq!(f16_to_f32(0x3C00), 1.0);
        // -2.0 is 0xC000
        assert_eq!(f16_to_f32(0xC000), -2.0);
        // 0.5 is 0x3800
        assert_eq!(f16_to_f32(0x3800), 0.5);
        // Signed zeros
        assert_eq!(f16_to_f32(0x0000), 0.0);
        assert_eq!(f16_to_f32(0x8000).to_bits(), (-0.0f32).to_bits());
        // Infinity and NaN
        assert_eq!(f16_to_f32(0x7C00), f32::INFINITY);
        assert_eq!(f16_to_f32(0xFC00), f32::NEG_INFINITY);
        assert!(f16_to_f32(0x7E00).is_nan());
        // Largest subnormal: (1023/1024) * 2^-14
        let largest_subnormal = f16_to_f32(0x03FF);
        assert!((f64::from(largest_subnormal) - 1023.0 / 1024.0 * 2f64.powi(-14)).abs() < 1e-12);
    }

    #[test]
    fn test_bf16_conversion() {
        // BF16 of 1.0 is the upper half of 0x3F80_0000
        assert_eq!(bf16_to_f32([0x80, 0x3F]), 1.0);
        assert_eq!(bf16_to_f32([0x00, 0xC0]), -2.0);
    }

    #[test]
    fn test_load_f16_checkpoint() {
        // Hand-built file with one F16 tensor [1.0, 0.5]
        let json = r#"{"w.weight":{"dtype":"F16","shape":[2],"data_offsets":[0,4]}}"#;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(json.len() as u64).to_le_bytes());
        bytes.extend_from_slice(json.as_bytes());
        bytes.extend_from_slice(&0x3C00u16.to_le_bytes());
        bytes.extend_from_slice(&0x3800u16.to_le_bytes());

        let dir = tempdir().expect("create dir");
        let path = dir.path().join("half.safetensors");
        fs::write(&path, bytes).expect("write");

        let loaded = load_safetensors(&path).expect("load");
        let w = loaded.get("w.weight").expect("present");
        assert_eq!(w.tensor.values(), Some(&[1.0, 0.5][..]));
    }
}
