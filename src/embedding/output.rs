//! Shape-robust extraction of a fixed-length vector from raw inference output.
//!
//! Embedding results vary in shape depending on backend quirks: upstream
//! pooling may or may not have collapsed the token axis, and a batch call may
//! return one flat tensor or per-item rows. This module infers the shape from
//! the buffer length and guarantees a pooled, unit-normalized vector either
//! way. The corpus builder and the query service both call [`normalize_row`] —
//! the shared-vector-space invariant depends on there being exactly one copy
//! of this logic.

use crate::embedding::l2_normalize;
use crate::error::BuildError;

/// Turn one row's raw buffer into a `dim`-length vector.
///
/// Shape inference is a length heuristic: a buffer no longer than
/// `dim * pooled_len_ratio` is assumed to be already pooled and its first
/// `dim` values are used as-is; anything longer is treated as `tokens`
/// concatenated per-token vectors and mean-pooled column-wise, then
/// re-normalized (a computed norm of 0 is treated as 1, leaving the zero
/// vector unchanged). Buffers shorter than `dim`, or that do not divide
/// evenly into `dim`-length rows, fail with
/// [`BuildError::UnexpectedOutputShape`].
pub fn normalize_row(
    buffer: &[f32],
    dim: usize,
    pooled_len_ratio: f32,
) -> Result<Vec<f32>, BuildError> {
    let len = buffer.len();
    if len < dim {
        return Err(BuildError::UnexpectedOutputShape { len, dims: None });
    }

    if (len as f32) <= (dim as f32) * pooled_len_ratio {
        return Ok(buffer[..dim].to_vec());
    }

    // self-pooling fallback: upstream pooling did not collapse the token axis
    let tokens = ((len as f64) / (dim as f64)).round() as usize;
    if tokens * dim != len {
        return Err(BuildError::UnexpectedOutputShape { len, dims: None });
    }

    let mut pooled = vec![0.0f32; dim];
    for token in 0..tokens {
        let row = &buffer[token * dim..(token + 1) * dim];
        for (acc, x) in pooled.iter_mut().zip(row) {
            *acc += x;
        }
    }
    for acc in &mut pooled {
        *acc /= tokens as f32;
    }

    Ok(l2_normalize(&pooled))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIM: usize = 4;

    #[test]
    fn already_pooled_buffer_passes_through() {
        let buffer = vec![0.5, -0.5, 0.5, -0.5];
        let out = normalize_row(&buffer, DIM, 1.5).unwrap();
        assert_eq!(out, buffer);
    }

    #[test]
    fn per_token_buffer_is_mean_pooled_and_normalized() {
        // 3 token rows of dim 4
        let buffer = vec![
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            2.0, 2.0, 0.0, 0.0, //
        ];
        let out = normalize_row(&buffer, DIM, 1.5).unwrap();

        // column means: [1.0, 1.0, 0.0, 0.0], re-normalized
        let expected = 1.0 / 2.0f32.sqrt();
        assert!((out[0] - expected).abs() < 1e-6);
        assert!((out[1] - expected).abs() < 1e-6);
        assert_eq!(out[2], 0.0);
        assert_eq!(out[3], 0.0);

        let norm: f32 = out.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[test]
    fn zero_norm_pooled_vector_survives() {
        let buffer = vec![0.0; DIM * 3];
        let out = normalize_row(&buffer, DIM, 1.5).unwrap();
        assert_eq!(out, vec![0.0; DIM]);
    }

    #[test]
    fn too_short_buffer_is_rejected() {
        let err = normalize_row(&[1.0, 2.0], DIM, 1.5).unwrap_err();
        assert!(matches!(
            err,
            BuildError::UnexpectedOutputShape { len: 2, .. }
        ));
    }

    #[test]
    fn ragged_buffer_is_rejected() {
        // 10 floats is above dim*1.5 but not a whole number of dim-4 rows
        let err = normalize_row(&vec![1.0; 10], DIM, 1.5).unwrap_err();
        assert!(matches!(err, BuildError::UnexpectedOutputShape { .. }));
    }

    #[test]
    fn ratio_boundary_is_configurable() {
        // 6 floats with ratio 1.5 → treated as pooled, first 4 kept
        let buffer = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let out = normalize_row(&buffer, DIM, 1.5).unwrap();
        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0]);

        // same buffer with a tighter ratio → pooling path, but 6 % 4 != 0
        assert!(normalize_row(&buffer, DIM, 1.0).is_err());
    }
}
