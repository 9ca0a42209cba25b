//! Mixed-radix coordinate/index conversion and k-mer extraction.
//!
//! The conversion helpers are the Rust equivalent of numpy's
//! `ravel_multi_index` / `unravel_index` over a `(num_states,) * k`
//! shape: each k-mer is a point in a k-dimensional grid, and the
//! "index" is its flat position in row-major order.

use crate::error::{DvsError, Result};

/// Radix weights for a `k`-long string over an alphabet of
/// `num_states` symbols: `coeffs[j] = num_states ^ (k - 1 - j)`.
pub fn coord_conversion_coeffs(num_states: u64, k: usize) -> Vec<u64> {
    (0..k).rev().map(|p| num_states.pow(p as u32)).collect()
}

/// Flatten a coordinate (one digit per k-mer position) into its index.
pub fn coord_to_index(coord: &[u8], coeffs: &[u64]) -> Result<u64> {
    if coord.len() != coeffs.len() {
        return Err(DvsError::value(format!(
            "coordinate has {} dimensions but coeffs describe {}",
            coord.len(),
            coeffs.len()
        )));
    }
    Ok(coord
        .iter()
        .zip(coeffs)
        .map(|(&c, &w)| c as u64 * w)
        .sum())
}

/// Inverse of [`coord_to_index`]. `num_states` is needed separately
/// from `coeffs` because a single coefficient can't be un-ambiguously
/// inverted back into a radix (a k=1 alphabet has only the weight 1).
pub fn index_to_coord(index: u64, num_states: u64, coeffs: &[u64]) -> Vec<u8> {
    coeffs
        .iter()
        .map(|&w| ((index / w) % num_states) as u8)
        .collect()
}

/// Yield every `k`-long window of `seq` (already encoded into state
/// indices via [`crate::alphabet::encode`]) that contains no ambiguous
/// symbol (`>= num_states`).
///
/// A `skip_until` cursor avoids rescanning: once a bad symbol is seen
/// at position `p`, every window up to and including `p` is invalid,
/// so the cursor jumps past it in one step rather than re-checking
/// each position.
pub fn valid_kmer_windows<'a>(
    seq: &'a [u8],
    num_states: u8,
    k: usize,
) -> impl Iterator<Item = &'a [u8]> {
    let mut skip_until = 0usize;
    if k > 0 && seq.len() >= k {
        for i in 0..k {
            if seq[i] >= num_states {
                skip_until = i + 1;
            }
        }
    }
    let end = if k == 0 || seq.len() < k {
        0
    } else {
        seq.len() - k + 1
    };
    (0..end).filter_map(move |i| {
        if seq[i + k - 1] >= num_states {
            skip_until = skip_until.max(i + k);
        }
        if i < skip_until {
            None
        } else {
            Some(&seq[i..i + k])
        }
    })
}

/// Extract the flat indices of every unambiguous k-mer in `seq`.
pub fn kmer_indices(seq: &[u8], num_states: u8, k: usize) -> Vec<u64> {
    if k == 0 || seq.len() < k {
        return Vec::new();
    }
    let coeffs = coord_conversion_coeffs(num_states as u64, k);
    valid_kmer_windows(seq, num_states, k)
        .map(|w| {
            coord_to_index(w, &coeffs).expect("window length always matches coeffs length by construction")
        })
        .collect()
}

/// Build the dense k-mer count vector for a single sequence.
pub fn kmer_counts(seq: &[u8], num_states: u8, k: usize) -> Result<crate::freqvec::FreqVec<u64>> {
    let length = (num_states as u64)
        .checked_pow(k as u32)
        .ok_or_else(|| DvsError::config(format!("num_states={num_states}, k={k} overflows")))?;
    let mut v = crate::freqvec::FreqVec::<u64>::zeros(length as usize)?;
    for idx in kmer_indices(seq, num_states, k) {
        v.add_at(idx as usize, 1)?;
    }
    Ok(v)
}

/// Decode a batch of flat k-mer indices back into strings over
/// `states` (e.g. `b"TCAG"`). Returns a value error for any index
/// outside `states.len() ^ k`.
pub fn indices_to_seqs(indices: &[u64], states: &[u8], k: usize) -> Result<Vec<String>> {
    let num_states = states.len() as u64;
    let coeffs = coord_conversion_coeffs(num_states, k);
    let max_index = num_states.pow(k as u32);
    indices
        .iter()
        .map(|&idx| {
            if idx >= max_index {
                return Err(DvsError::value(format!(
                    "index {idx} is out of range for k={k} over an alphabet of {num_states} states"
                )));
            }
            let coord = index_to_coord(idx, num_states, &coeffs);
            Ok(coord.iter().map(|&c| states[c as usize] as char).collect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coeffs_match_row_major_strides() {
        assert_eq!(coord_conversion_coeffs(4, 3), vec![16, 4, 1]);
        assert_eq!(coord_conversion_coeffs(4, 1), vec![1]);
    }

    #[test]
    fn coord_index_round_trip() {
        let coeffs = coord_conversion_coeffs(4, 3);
        for idx in 0u64..64 {
            let coord = index_to_coord(idx, 4, &coeffs);
            assert_eq!(coord_to_index(&coord, &coeffs).unwrap(), idx);
        }
    }

    #[test]
    fn coord_to_index_rejects_dimension_mismatch() {
        let coeffs = coord_conversion_coeffs(4, 3);
        assert!(coord_to_index(&[0, 1], &coeffs).is_err());
    }

    #[test]
    fn kmer_indices_skips_windows_touching_ambiguous_symbols() {
        // T C A N A G  -> encode(DNA) -> 0 1 2 4 2 3
        let encoded = [0u8, 1, 2, 4, 2, 3];
        let idx = kmer_indices(&encoded, 4, 2);
        // windows: TC(0,1) CA(1,2) AN(skip) NA(skip) AG(2,3)
        let coeffs = coord_conversion_coeffs(4, 2);
        let expected: Vec<u64> = [[0u8, 1], [1, 2], [2, 3]]
            .iter()
            .map(|c| coord_to_index(c, &coeffs).unwrap())
            .collect();
        assert_eq!(idx, expected);
    }

    #[test]
    fn kmer_indices_empty_when_seq_shorter_than_k() {
        assert!(kmer_indices(&[0, 1], 4, 5).is_empty());
    }

    #[test]
    fn indices_to_seqs_decodes_known_values() {
        let out = indices_to_seqs(&[0, 8], b"TCAG", 2).unwrap();
        assert_eq!(out, vec!["TT".to_string(), "AT".to_string()]);
    }

    #[test]
    fn indices_to_seqs_rejects_out_of_range_index() {
        let err = indices_to_seqs(&[16], b"TCAG", 2).unwrap_err();
        assert!(matches!(err, DvsError::Value(_)));
    }
}
