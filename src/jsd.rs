//! Jensen-Shannon divergence over summed k-mer frequency vectors.
//!
//! There is exactly one JSD entry point: callers always hold a summed
//! frequency vector and a summed-entropy scalar (the source dispatches
//! on whether the vector is sparse or dense; here `FreqVec` is already
//! a single concrete type so there's nothing left to dispatch on).

use crate::freqvec::FreqVec;

/// `JSD(sum_f, sum_h, n) = entropy(sum_f / n) - sum_h / n`: the
/// entropy of the mean frequency vector, minus the mean of the
/// per-record entropies.
pub fn jsd(summed_kfreqs: &FreqVec<f64>, summed_entropies: f64, n: usize) -> f64 {
    debug_assert!(n > 0, "JSD is undefined for an empty collection");
    let n = n as f64;
    let mean_vec = summed_kfreqs.div_scalar(n);
    mean_vec.entropy() - summed_entropies / n
}
