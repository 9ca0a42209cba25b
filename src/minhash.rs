//! Bottom-k MinHash sketching over encoded sequences.

use crate::alphabet::MolType;
use crate::error::{DvsError, Result};
use crate::kmer::valid_kmer_windows;
use std::collections::BinaryHeap;

/// A bottom-k sketch: the `sketch_size` smallest distinct k-mer hash
/// values seen, in ascending order.
pub type BottomSketch = Vec<u64>;

/// `(x + 2) % 4` is the DNA complement when symbols are ordered
/// `T,C,A,G` (T<->A differ by 2, C<->G differ by 2); reversing the
/// digit order then gives the reverse complement.
fn reverse_complement(coord: &[u8]) -> Vec<u8> {
    coord.iter().rev().map(|&x| (x + 2) % 4).collect()
}

fn hash_kmer(window: &[u8], canonical: bool) -> u64 {
    if canonical {
        let rc = reverse_complement(window);
        if rc.as_slice() < window {
            fxhash::hash64(&rc)
        } else {
            fxhash::hash64(window)
        }
    } else {
        fxhash::hash64(window)
    }
}

/// Sketch an already-encoded sequence. `canonical` folds each k-mer
/// together with its reverse complement (DNA/RNA only).
pub fn mash_sketch(
    encoded: &[u8],
    moltype: MolType,
    k: usize,
    sketch_size: usize,
    canonical: bool,
) -> Result<BottomSketch> {
    if canonical && !moltype.supports_canonical_kmers() {
        return Err(DvsError::config(
            "canonical k-mer hashing requires a nucleic-acid moltype",
        ));
    }
    let num_states = moltype.num_states();

    // Bound the heap to `sketch_size`: keep the smallest distinct
    // hashes seen by pushing every candidate and popping the current
    // maximum once the heap overflows. `BinaryHeap` is a max-heap, so
    // `peek`/`pop` always expose the hash we'd want to evict first.
    let mut heap: BinaryHeap<u64> = BinaryHeap::with_capacity(sketch_size + 1);
    let mut seen: fxhash::FxHashSet<u64> = fxhash::FxHashSet::default();

    for window in valid_kmer_windows(encoded, num_states, k) {
        let h = hash_kmer(window, canonical);
        if !seen.insert(h) {
            continue;
        }
        if heap.len() < sketch_size {
            heap.push(h);
        } else if let Some(&max) = heap.peek() {
            if h < max {
                heap.pop();
                heap.push(h);
            }
        }
    }

    Ok(heap.into_sorted_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sketch_is_bounded_by_sketch_size_and_sorted() {
        let encoded = crate::alphabet::encode(b"ACGTACGTACGTACGTACGT", MolType::Dna);
        let sketch = mash_sketch(&encoded, MolType::Dna, 3, 4, false).unwrap();
        assert!(sketch.len() <= 4);
        let mut sorted = sketch.clone();
        sorted.sort_unstable();
        assert_eq!(sketch, sorted);
    }

    #[test]
    fn canonical_rejects_protein() {
        let encoded = crate::alphabet::encode(b"ACDEFG", MolType::Protein);
        assert!(mash_sketch(&encoded, MolType::Protein, 2, 4, true).is_err());
    }

    #[test]
    fn canonical_sketch_is_orientation_invariant() {
        let fwd = crate::alphabet::encode(b"ACGTACGT", MolType::Dna);
        let rc: Vec<u8> = b"ACGTACGT"
            .iter()
            .rev()
            .map(|&b| match b {
                b'A' => b'T',
                b'T' => b'A',
                b'C' => b'G',
                b'G' => b'C',
                _ => unreachable!(),
            })
            .collect();
        let rc_encoded = crate::alphabet::encode(&rc, MolType::Dna);
        let sketch_fwd = mash_sketch(&fwd, MolType::Dna, 4, 10, true).unwrap();
        let sketch_rc = mash_sketch(&rc_encoded, MolType::Dna, 4, 10, true).unwrap();
        assert_eq!(sketch_fwd, sketch_rc);
    }
}
