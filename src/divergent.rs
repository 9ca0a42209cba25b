//! Greedy divergent-subset selection over a pool of sequence records.
//!
//! [`SummedRecords`] keeps the running sum of k-mer frequencies and
//! entropies for every record it holds *except* the current least
//! divergent one (`lowest`). That asymmetry means swapping the lowest
//! record out for a candidate ([`SummedRecords::replaced_lowest`])
//! only has to combine the candidate's own stats with the cached sum,
//! instead of re-summing the whole surviving set.
//!
//! Both [`SummedRecords::most_divergent`] and
//! [`SummedRecords::max_divergent`] are greedy, single-pass-ish
//! heuristics over the input order, not exhaustive search: they are
//! not guaranteed to find the globally most divergent subset, only a
//! good one reachable by local swaps.

use crate::error::{DvsError, Result};
use crate::freqvec::FreqVec;
use crate::jsd::jsd;
use crate::record::SeqRecord;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct SummedRecords {
    /// Ascending by `delta_jsd`; `records[0]` is the least divergent
    /// member ("lowest").
    records: Vec<Rc<SeqRecord>>,
    /// Sum of `kfreqs` over `records[1..]`.
    summed_kfreqs: FreqVec<f64>,
    /// Sum of `entropy` over `records[1..]`.
    summed_entropies: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceStat {
    MeanJsd,
    MeanDeltaJsd,
    TotalJsd,
}

fn assign_delta_jsds_given_total(
    records: &[Rc<SeqRecord>],
    total_kfreqs: &FreqVec<f64>,
    total_entropies: f64,
) -> Result<()> {
    let n = records.len();
    let total = jsd(total_kfreqs, total_entropies, n);
    for r in records {
        let without_kfreqs = total_kfreqs.checked_sub(&r.kfreqs)?;
        let without_entropies = total_entropies - r.entropy;
        let without = jsd(&without_kfreqs, without_entropies, n - 1);
        let delta = total - without;
        if delta.is_nan() {
            return Err(DvsError::invariant(format!(
                "delta_jsd for record {:?} evaluated to NaN",
                r.name
            )));
        }
        r.set_delta_jsd(delta);
    }
    Ok(())
}

fn assign_delta_jsds(records: &[Rc<SeqRecord>]) -> Result<()> {
    let mut total_kfreqs = records[0].kfreqs.clone();
    for r in &records[1..] {
        total_kfreqs = total_kfreqs.checked_add(&r.kfreqs)?;
    }
    let total_entropies: f64 = records.iter().map(|r| r.entropy).sum();
    assign_delta_jsds_given_total(records, &total_kfreqs, total_entropies)
}

fn sum_kfreqs_and_entropies(records: &[Rc<SeqRecord>]) -> Result<(FreqVec<f64>, f64)> {
    let mut summed_kfreqs = FreqVec::zeros(records[0].kfreqs.len())?;
    let mut summed_entropies = 0.0;
    for r in records {
        summed_kfreqs = summed_kfreqs.checked_add(&r.kfreqs)?;
        summed_entropies += r.entropy;
    }
    Ok((summed_kfreqs, summed_entropies))
}

impl SummedRecords {
    /// Build from an initial pool of at least two records, computing
    /// every record's `delta_jsd` relative to the whole set.
    pub fn from_records(mut records: Vec<Rc<SeqRecord>>) -> Result<Self> {
        if records.len() < 2 {
            return Err(DvsError::config(
                "a divergent-record collection needs at least two records",
            ));
        }
        assign_delta_jsds(&records)?;
        records.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
        let (summed_kfreqs, summed_entropies) = sum_kfreqs_and_entropies(&records[1..])?;
        Ok(Self {
            records,
            summed_kfreqs,
            summed_entropies,
        })
    }

    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn record_names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name == name)
    }

    fn lowest(&self) -> &Rc<SeqRecord> {
        &self.records[0]
    }

    fn total_kfreqs(&self) -> Result<FreqVec<f64>> {
        self.summed_kfreqs.checked_add(&self.lowest().kfreqs)
    }

    fn total_entropies(&self) -> f64 {
        self.summed_entropies + self.lowest().entropy
    }

    /// The Jensen-Shannon divergence of the whole collection (not
    /// divided by size).
    pub fn total_jsd(&self) -> Result<f64> {
        Ok(jsd(&self.total_kfreqs()?, self.total_entropies(), self.size()))
    }

    /// `total_jsd` divided by `size`.
    pub fn mean_jsd(&self) -> Result<f64> {
        Ok(self.total_jsd()? / self.size() as f64)
    }

    /// Average of the per-record marginal contributions.
    pub fn mean_delta_jsd(&self) -> f64 {
        self.records.iter().map(|r| r.delta_jsd()).sum::<f64>() / self.size() as f64
    }

    /// Add a record, returning a new, recomputed collection.
    pub fn add(&self, new: Rc<SeqRecord>) -> Result<Self> {
        if self.contains(&new.name) {
            return Err(DvsError::value(format!(
                "record {:?} is already present in this collection",
                new.name
            )));
        }
        let mut all = self.records.clone();
        all.push(new);
        Self::from_records(all)
    }

    /// Remove a record by name, returning a new, recomputed collection.
    pub fn remove(&self, name: &str) -> Result<Self> {
        if !self.contains(name) {
            return Err(DvsError::value(format!(
                "record {name:?} is not present in this collection"
            )));
        }
        let remaining: Vec<_> = self
            .records
            .iter()
            .filter(|r| r.name != name)
            .cloned()
            .collect();
        if remaining.len() < 2 {
            return Err(DvsError::config(
                "cannot shrink a divergent-record collection below two members",
            ));
        }
        Self::from_records(remaining)
    }

    /// Swap the current `lowest` record for `new`, keeping the
    /// collection size unchanged. Cheaper than `remove` + `add`
    /// because the running sum over the untouched members doesn't
    /// need to be recomputed.
    pub fn replaced_lowest(&self, new: Rc<SeqRecord>) -> Result<Self> {
        let mut records: Vec<Rc<SeqRecord>> = self.records[1..].to_vec();
        let total_kfreqs = self.summed_kfreqs.checked_add(&new.kfreqs)?;
        let total_entropies = self.summed_entropies + new.entropy;
        records.push(new);
        assign_delta_jsds_given_total(&records, &total_kfreqs, total_entropies)?;
        records.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
        let (summed_kfreqs, summed_entropies) = sum_kfreqs_and_entropies(&records[1..])?;
        Ok(Self {
            records,
            summed_kfreqs,
            summed_entropies,
        })
    }

    /// Fast rejection heuristic: would folding `candidate` into the
    /// current totals raise the pooled JSD, evaluated at the
    /// collection's *current* size rather than `size + 1`? This is
    /// deliberately not the exact effect of admitting `candidate` —
    /// it is a cheap filter used only to skip obviously unhelpful
    /// candidates before paying for a real `add`/`replaced_lowest`.
    pub fn increases_jsd(&self, candidate: &Rc<SeqRecord>) -> Result<bool> {
        let combined_kfreqs = self.total_kfreqs()?.checked_add(&candidate.kfreqs)?;
        let combined_entropies = self.total_entropies() + candidate.entropy;
        let heuristic = jsd(&combined_kfreqs, combined_entropies, self.size());
        Ok(heuristic > self.total_jsd()?)
    }

    /// Rebuild excluding the current lowest-divergence member, i.e.
    /// shrink by exactly one.
    fn rebuild_dropping_lowest(&self) -> Result<Self> {
        Self::from_records(self.records[1..].to_vec())
    }

    pub fn report(&self) -> Result<SelectionReport> {
        Ok(SelectionReport {
            names: self.records.iter().map(|r| r.name.clone()).collect(),
            size: self.size(),
            mean_jsd: self.mean_jsd()?,
            mean_delta_jsd: self.mean_delta_jsd(),
        })
    }

    /// Fixed-size greedy selection: seed with the first `size`
    /// records in input order, then for each remaining candidate, skip
    /// it if already present or if `increases_jsd` rejects it,
    /// otherwise swap it in for the current lowest member
    /// unconditionally.
    pub fn most_divergent(records: Vec<Rc<SeqRecord>>, size: usize) -> Result<Self> {
        if size < 2 {
            return Err(DvsError::config("size must be at least 2"));
        }
        if records.len() < size {
            return Err(DvsError::config(format!(
                "requested {size} records but only {} are available",
                records.len()
            )));
        }
        let mut sr = Self::from_records(records[..size].to_vec())?;
        for r in &records[size..] {
            if sr.contains(&r.name) {
                continue;
            }
            if sr.increases_jsd(r)? {
                sr = sr.replaced_lowest(r.clone())?;
            }
        }
        Ok(sr)
    }

    /// Variable-size greedy selection: grow from `min_size`, admitting
    /// each candidate that passes the `increases_jsd` heuristic either
    /// by growing the set (if that raises `stat`) or by swapping out
    /// the current lowest member, rebuilding without the lowest member
    /// whenever `max_size` is exceeded. A shrink pass then walks back
    /// down to `min_size`, one member at a time, recording `stat` at
    /// every step. Returns whichever intermediate collection scored
    /// best across the whole walk, not necessarily the final state.
    pub fn max_divergent(
        records: Vec<Rc<SeqRecord>>,
        min_size: usize,
        max_size: usize,
        stat: DivergenceStat,
    ) -> Result<Self> {
        if min_size < 2 {
            return Err(DvsError::config("min_size must be at least 2"));
        }
        if max_size < min_size {
            return Err(DvsError::config("max_size must be >= min_size"));
        }
        if records.len() < min_size {
            return Err(DvsError::config(format!(
                "requested at least {min_size} records but only {} are available",
                records.len()
            )));
        }

        let stat_of = |sr: &Self| -> Result<f64> {
            match stat {
                DivergenceStat::MeanJsd => sr.mean_jsd(),
                DivergenceStat::MeanDeltaJsd => Ok(sr.mean_delta_jsd()),
                DivergenceStat::TotalJsd => sr.total_jsd(),
            }
        };

        let mut sr = Self::from_records(records[..min_size].to_vec())?;
        let mut best = sr.clone();
        let mut best_stat = stat_of(&sr)?;

        for r in &records[min_size..] {
            if sr.contains(&r.name) {
                continue;
            }
            if !sr.increases_jsd(r)? {
                continue;
            }
            let current_stat = stat_of(&sr)?;
            let grown = sr.add(r.clone())?;
            if stat_of(&grown)? > current_stat {
                sr = grown;
            } else {
                sr = sr.replaced_lowest(r.clone())?;
            }
            if sr.size() > max_size {
                sr = sr.rebuild_dropping_lowest()?;
            }
            let now_stat = stat_of(&sr)?;
            if now_stat > best_stat {
                best_stat = now_stat;
                best = sr.clone();
            }
        }

        while sr.size() > min_size {
            sr = sr.rebuild_dropping_lowest()?;
            let now_stat = stat_of(&sr)?;
            if now_stat > best_stat {
                best_stat = now_stat;
                best = sr.clone();
            }
        }

        Ok(best)
    }
}

#[derive(Debug, Clone)]
pub struct SelectionReport {
    pub names: Vec<String>,
    pub size: usize,
    pub mean_jsd: f64,
    pub mean_delta_jsd: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::MolType;
    use crate::record::{seqarray_to_record, SeqArray};

    fn record(name: &str, data: &[u8]) -> Rc<SeqRecord> {
        let seq = SeqArray {
            name: name.to_string(),
            data: data.to_vec(),
            moltype: MolType::Dna,
        };
        Rc::new(seqarray_to_record(&seq, 2).unwrap())
    }

    #[test]
    fn from_records_rejects_fewer_than_two() {
        let r = record("a", b"ACGTACGT");
        assert!(SummedRecords::from_records(vec![r]).is_err());
    }

    #[test]
    fn identical_records_have_near_zero_divergence() {
        let a = record("a", b"ACGTACGTACGT");
        let b = record("b", b"ACGTACGTACGT");
        let sr = SummedRecords::from_records(vec![a, b]).unwrap();
        assert!(sr.mean_jsd().unwrap().abs() < 1e-9);
    }

    #[test]
    fn divergent_records_have_positive_divergence() {
        let a = record("a", b"AAAAAAAAAAAA");
        let b = record("b", b"GCGCGCGCGCGC");
        let sr = SummedRecords::from_records(vec![a, b]).unwrap();
        assert!(sr.mean_jsd().unwrap() > 0.0);
    }

    #[test]
    fn add_and_remove_round_trip_keeps_collection_consistent() {
        let a = record("a", b"ACGTACGTACGT");
        let b = record("b", b"GGGGCCCCAAAA");
        let c = record("c", b"TTTTAAAACCCC");
        let sr = SummedRecords::from_records(vec![a, b.clone()]).unwrap();
        let grown = sr.add(c).unwrap();
        assert_eq!(grown.size(), 3);
        let shrunk = grown.remove("c").unwrap();
        assert_eq!(shrunk.size(), 2);
        assert!(shrunk.contains("a") && shrunk.contains("b"));
    }

    #[test]
    fn remove_unknown_name_is_value_error() {
        let a = record("a", b"ACGTACGTACGT");
        let b = record("b", b"GGGGCCCCAAAA");
        let sr = SummedRecords::from_records(vec![a, b]).unwrap();
        assert!(matches!(sr.remove("nope"), Err(DvsError::Value(_))));
    }

    #[test]
    fn most_divergent_keeps_the_two_most_different_of_three() {
        let records = vec![
            record("similar_a", b"ACGTACGTACGT"),
            record("similar_b", b"ACGTACGTACGA"),
            record("different", b"GGGGGGGGGGGG"),
        ];
        let sr = SummedRecords::most_divergent(records, 2).unwrap();
        assert_eq!(sr.size(), 2);
        assert!(sr.contains("different"));
    }

    #[test]
    fn max_divergent_stays_within_size_bounds() {
        let records = vec![
            record("r1", b"AAAAAAAAAAAA"),
            record("r2", b"CCCCCCCCCCCC"),
            record("r3", b"GGGGGGGGGGGG"),
            record("r4", b"TTTTTTTTTTTT"),
            record("r5", b"ACGTACGTACGT"),
        ];
        let sr =
            SummedRecords::max_divergent(records, 2, 4, DivergenceStat::MeanJsd).unwrap();
        assert!(sr.size() >= 2 && sr.size() <= 4);
    }

    #[test]
    fn increases_jsd_rejects_a_similar_candidate_but_accepts_a_divergent_one() {
        let a = record("a", b"ACGTACGTACGT");
        let b = record("b", b"ACGTACGTACGT");
        let sr = SummedRecords::from_records(vec![a, b]).unwrap();
        let similar = record("similar", b"ACGTACGTACGT");
        let different = record("different", b"GGGGGGGGGGGG");
        assert!(!sr.increases_jsd(&similar).unwrap());
        assert!(sr.increases_jsd(&different).unwrap());
    }

    #[test]
    fn total_jsd_is_mean_jsd_times_size() {
        let a = record("a", b"AAAAAAAAAAAA");
        let b = record("b", b"GCGCGCGCGCGC");
        let sr = SummedRecords::from_records(vec![a, b]).unwrap();
        let total = sr.total_jsd().unwrap();
        let mean = sr.mean_jsd().unwrap();
        assert!((total - mean * sr.size() as f64).abs() < 1e-9);
    }
}
