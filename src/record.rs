//! Sequence records and the collection they're drawn from.

use crate::alphabet::MolType;
use crate::error::{DvsError, Result};
use crate::freqvec::FreqVec;
use crate::kmer::kmer_counts;
use std::cell::Cell;

/// A raw, encoded sequence as read from storage, before any k-mer
/// statistics are computed.
#[derive(Debug, Clone)]
pub struct SeqArray {
    pub name: String,
    pub data: Vec<u8>,
    pub moltype: MolType,
}

/// A sequence plus its cached k-mer statistics.
///
/// `delta_jsd` uses interior mutability: it is the record's marginal
/// contribution to whichever [`crate::divergent::SummedRecords`]
/// currently holds it, and gets refreshed in place as that collection
/// grows and shrinks rather than forcing a full record rebuild.
#[derive(Debug)]
pub struct SeqRecord {
    pub name: String,
    pub length: usize,
    pub kcounts: FreqVec<u64>,
    pub kfreqs: FreqVec<f64>,
    pub entropy: f64,
    pub delta_jsd: Cell<f64>,
}

impl SeqRecord {
    pub fn delta_jsd(&self) -> f64 {
        self.delta_jsd.get()
    }

    pub fn set_delta_jsd(&self, value: f64) {
        self.delta_jsd.set(value);
    }
}

impl PartialEq for SeqRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for SeqRecord {}

impl PartialOrd for SeqRecord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SeqRecord {
    /// Ascending by `delta_jsd`, so the "lowest" record in a sorted
    /// collection is always the least divergent one.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.delta_jsd()
            .partial_cmp(&other.delta_jsd())
            .expect("delta_jsd must never be NaN")
    }
}

/// A `FreqVec` of k-mer counts must have exactly `num_states^k`
/// entries; anything else means it was built for a different
/// `(moltype, k)` pair than the one it's being attached to.
fn validate_kcounts_length(kcounts: &FreqVec<u64>, num_states: u8, k: usize) -> Result<()> {
    let expected = (num_states as u64).pow(k as u32) as usize;
    if kcounts.len() != expected {
        return Err(DvsError::type_err(format!(
            "kcounts has length {} but num_states={num_states}, k={k} implies {expected}",
            kcounts.len()
        )));
    }
    Ok(())
}

/// Build a [`SeqRecord`] directly from a precomputed counts vector,
/// checking it matches the `(moltype, k)` k-mer space before trusting it.
pub fn record_from_counts(
    name: impl Into<String>,
    length: usize,
    kcounts: FreqVec<u64>,
    moltype: MolType,
    k: usize,
) -> Result<SeqRecord> {
    validate_kcounts_length(&kcounts, moltype.num_states(), k)?;
    let total = kcounts.sum();
    if total == 0 {
        return Err(DvsError::value("record has no unambiguous k-mers"));
    }
    let dense: Vec<f64> = kcounts.as_slice().iter().map(|&c| c as f64).collect();
    let counts_f = FreqVec::from_dense(dense)?;
    let kfreqs = counts_f.div_scalar(total as f64);
    let entropy = kfreqs.entropy();
    Ok(SeqRecord {
        name: name.into(),
        length,
        kcounts,
        kfreqs,
        entropy,
        delta_jsd: Cell::new(0.0),
    })
}

/// Build a [`SeqRecord`] from a raw sequence: encode it, count its
/// k-mers, and cache the normalized frequencies and entropy.
pub fn seqarray_to_record(seq: &SeqArray, k: usize) -> Result<SeqRecord> {
    let num_states = seq.moltype.num_states();
    let encoded = crate::alphabet::encode(&seq.data, seq.moltype);
    let kcounts = kmer_counts(&encoded, num_states, k)?;
    record_from_counts(seq.name.clone(), seq.data.len(), kcounts, seq.moltype, k).map_err(|e| {
        match e {
            DvsError::Value(_) => DvsError::value(format!(
                "sequence {:?} has no unambiguous {k}-mers",
                seq.name
            )),
            other => other,
        }
    })
}

/// The distinct k-mer indices actually observed in a record — the
/// sparse complement to `kcounts`' dense `num_states^k` layout, for
/// reporting/debugging on large alphabets where enumerating every
/// possible motif isn't useful.
pub fn observed_motifs(record: &SeqRecord) -> Vec<usize> {
    record
        .kcounts
        .as_slice()
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c > 0)
        .map(|(i, _)| i)
        .collect()
}

/// A named set of sequences, the source a [`SeqRecord`] is built from.
pub trait SeqCollection {
    fn names(&self) -> Vec<&str>;
    fn get_seq(&self, name: &str) -> Option<&SeqArray>;
}

impl SeqCollection for Vec<SeqArray> {
    fn names(&self) -> Vec<&str> {
        self.iter().map(|s| s.name.as_str()).collect()
    }

    fn get_seq(&self, name: &str) -> Option<&SeqArray> {
        self.iter().find(|s| s.name == name)
    }
}
