//! Pairwise distance computation: mash (sketch-based) and euclidean
//! (full k-mer frequency vector) modes, both producing a dense,
//! symmetric [`DistanceMatrix`].

use crate::error::Result;
use crate::freqvec::FreqVec;
use crate::minhash::BottomSketch;
use crate::progress::Progress;
use ndarray::Array2;
use rayon::prelude::*;
use std::io::Write;

/// A dense, symmetric all-vs-all distance matrix with a zero diagonal.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    pub names: Vec<String>,
    pub values: Array2<f64>,
}

impl DistanceMatrix {
    /// Write as CSV: a header row of names, then one row per sequence
    /// with its name as the first column.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut w = csv::Writer::from_writer(writer);
        let mut header = vec![String::new()];
        header.extend(self.names.iter().cloned());
        w.write_record(&header)
            .map_err(|e| crate::error::DvsError::value(format!("writing csv header: {e}")))?;
        for (i, name) in self.names.iter().enumerate() {
            let mut row = vec![name.clone()];
            row.extend(self.values.row(i).iter().map(|v| v.to_string()));
            w.write_record(&row)
                .map_err(|e| crate::error::DvsError::value(format!("writing csv row: {e}")))?;
        }
        w.flush()
            .map_err(|e| crate::error::DvsError::value(format!("flushing csv writer: {e}")))?;
        Ok(())
    }
}

/// Walk two ascending sketches in lockstep, counting intersection and
/// union up to `sketch_size`, then convert the Jaccard estimate into a
/// mash distance: `d = -ln(2j / (1+j)) / k`, clamped to `[0, 1]`.
pub fn mash_distance(a: &BottomSketch, b: &BottomSketch, k: usize, sketch_size: usize) -> f64 {
    let (mut i, mut j) = (0usize, 0usize);
    let (mut intersection, mut union) = (0u64, 0u64);

    while i < a.len() && j < b.len() && (union as usize) < sketch_size {
        if a[i] < b[j] {
            i += 1;
        } else if a[i] > b[j] {
            j += 1;
        } else {
            i += 1;
            j += 1;
            intersection += 1;
        }
        union += 1;
    }
    while i < a.len() && (union as usize) < sketch_size {
        i += 1;
        union += 1;
    }
    while j < b.len() && (union as usize) < sketch_size {
        j += 1;
        union += 1;
    }

    if union == 0 {
        return 0.0;
    }
    let jaccard = intersection as f64 / union as f64;
    if jaccard <= 0.0 {
        return 1.0;
    }
    if jaccard >= 1.0 {
        return 0.0;
    }
    let d = -((2.0 * jaccard) / (1.0 + jaccard)).ln() / k as f64;
    d.clamp(0.0, 1.0)
}

/// Euclidean (L2) distance between two dense k-mer frequency vectors.
pub fn euclidean_distance(a: &FreqVec<f64>, b: &FreqVec<f64>) -> Result<f64> {
    let diff = a.checked_sub(b)?;
    Ok(diff.as_slice().iter().map(|&x| x * x).sum::<f64>().sqrt())
}

/// Fill a symmetric matrix from an `n choose 2` pairwise computation
/// run in parallel, mirroring the teacher's
/// `chromosomes.par_iter().map(...).collect()` pattern.
fn build_symmetric_matrix<F>(names: &[String], pair_distance: F, progress: &dyn Progress) -> Result<Array2<f64>>
where
    F: Fn(usize, usize) -> Result<f64> + Sync,
{
    let n = names.len();
    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i + 1..n).map(move |j| (i, j))).collect();
    let task = progress.add_task("computing pairwise distances", pairs.len() as u64);

    let results: Vec<((usize, usize), f64)> = pairs
        .par_iter()
        .map(|&(i, j)| pair_distance(i, j).map(|d| ((i, j), d)))
        .collect::<Result<Vec<_>>>()?;
    progress.update(task, results.len() as u64);

    let mut values = Array2::<f64>::zeros((n, n));
    for ((i, j), d) in results {
        values[[i, j]] = d;
        values[[j, i]] = d;
    }
    Ok(values)
}

/// Pairwise mash distances over a set of already-sketched sequences.
pub fn mash_distances(
    names: Vec<String>,
    sketches: &[BottomSketch],
    k: usize,
    sketch_size: usize,
    progress: &dyn Progress,
) -> Result<DistanceMatrix> {
    let values = build_symmetric_matrix(
        &names,
        |i, j| Ok(mash_distance(&sketches[i], &sketches[j], k, sketch_size)),
        progress,
    )?;
    Ok(DistanceMatrix { names, values })
}

/// Pairwise euclidean distances over dense k-mer frequency vectors.
pub fn euclidean_distances(
    names: Vec<String>,
    kfreqs: &[FreqVec<f64>],
    progress: &dyn Progress,
) -> Result<DistanceMatrix> {
    let values = build_symmetric_matrix(
        &names,
        |i, j| euclidean_distance(&kfreqs[i], &kfreqs[j]),
        progress,
    )?;
    Ok(DistanceMatrix { names, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;

    #[test]
    fn identical_sketches_have_zero_mash_distance() {
        let s = vec![1u64, 2, 3, 4];
        assert_eq!(mash_distance(&s, &s, 21, 100), 0.0);
    }

    #[test]
    fn disjoint_sketches_have_max_mash_distance() {
        let a = vec![1u64, 2, 3];
        let b = vec![4u64, 5, 6];
        assert_eq!(mash_distance(&a, &b, 21, 100), 1.0);
    }

    #[test]
    fn euclidean_distance_of_identical_vectors_is_zero() {
        let v = FreqVec::from_dense(vec![0.25, 0.25, 0.25, 0.25]).unwrap();
        assert_eq!(euclidean_distance(&v, &v).unwrap(), 0.0);
    }

    #[test]
    fn euclidean_distance_matches_hand_computed_value() {
        let a = FreqVec::from_dense(vec![1.0, 0.0]).unwrap();
        let b = FreqVec::from_dense(vec![0.0, 1.0]).unwrap();
        let d = euclidean_distance(&a, &b).unwrap();
        assert!((d - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn mash_distances_matrix_has_zero_diagonal_and_is_symmetric() {
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let sketches = vec![vec![1u64, 2, 3], vec![1u64, 2, 4], vec![9u64, 10, 11]];
        let dm = mash_distances(names, &sketches, 21, 100, &NullProgress).unwrap();
        for i in 0..3 {
            assert_eq!(dm.values[[i, i]], 0.0);
        }
        assert_eq!(dm.values[[0, 1]], dm.values[[1, 0]]);
    }

    #[test]
    fn euclidean_distances_propagates_a_length_mismatch_error() {
        let names = vec!["a".to_string(), "b".to_string()];
        let kfreqs = vec![
            FreqVec::from_dense(vec![0.5, 0.5]).unwrap(),
            FreqVec::from_dense(vec![0.25, 0.25, 0.25, 0.25]).unwrap(),
        ];
        assert!(euclidean_distances(names, &kfreqs, &NullProgress).is_err());
    }

    #[test]
    fn csv_export_has_header_and_one_row_per_name() {
        let names = vec!["a".to_string(), "b".to_string()];
        let sketches = vec![vec![1u64, 2], vec![3u64, 4]];
        let dm = mash_distances(names, &sketches, 21, 100, &NullProgress).unwrap();
        let mut buf = Vec::new();
        dm.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 3); // header + 2 rows
    }
}
