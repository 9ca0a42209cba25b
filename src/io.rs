//! Sequence loading glue: FASTA records in, [`SeqArray`] values out.
//!
//! The teacher loads alignments via `twobit::TwoBitFile`
//! (`src/cli/io.rs`); the closest precedent for loading sequences here
//! is the plain `bio::io::fasta` reader, as used by the sibling
//! example crates that work with raw FASTA (`krust`, `SeqSizzle`).

use crate::alphabet::MolType;
use crate::error::{DvsError, Result};
use crate::record::SeqArray;
use bio::io::fasta;
use std::path::Path;

/// Load every record in a FASTA file as a [`SeqArray`] of the given
/// moltype.
pub fn load_fasta(path: impl AsRef<Path>, moltype: MolType) -> Result<Vec<SeqArray>> {
    let path = path.as_ref();
    let reader = fasta::Reader::from_file(path)
        .map_err(|e| DvsError::value(format!("opening fasta file {path:?}: {e}")))?;

    let mut out = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| DvsError::value(format!("reading fasta record: {e}")))?;
        if record.seq().is_empty() {
            return Err(DvsError::value(format!(
                "record {:?} in {path:?} has an empty sequence",
                record.id()
            )));
        }
        out.push(SeqArray {
            name: record.id().to_string(),
            data: record.seq().to_vec(),
            moltype,
        });
    }
    if out.is_empty() {
        return Err(DvsError::value(format!("no records found in {path:?}")));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_multiple_records_with_names_and_sequences() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, ">seq1\nACGTACGT\n>seq2\nTTTTGGGG").unwrap();
        let records = load_fasta(f.path(), MolType::Dna).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "seq1");
        assert_eq!(records[0].data, b"ACGTACGT");
        assert_eq!(records[1].name, "seq2");
    }

    #[test]
    fn empty_file_is_a_value_error() {
        let f = NamedTempFile::new().unwrap();
        assert!(load_fasta(f.path(), MolType::Dna).is_err());
    }
}
