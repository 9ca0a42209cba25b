//! Canonical alphabets and symbol-to-integer encoding.
//!
//! Mirrors the teacher's `static LUT: [u8; 256]` approach in
//! `kmer_codec.rs`: a 256-entry lookup table built once, so encoding a
//! sequence is a single indexed read per byte rather than a branching
//! match.

/// Molecule type, determining the canonical alphabet and `num_states`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MolType {
    Dna,
    Rna,
    Protein,
}

impl MolType {
    /// Number of canonical states in this alphabet.
    pub fn num_states(self) -> u8 {
        match self {
            MolType::Dna | MolType::Rna => 4,
            MolType::Protein => 20,
        }
    }

    /// Canonical symbol order. For DNA this is `T,C,A,G` so that the
    /// reverse-complement trick in the MinHash sketcher (`(x + 2) % 4`)
    /// is valid.
    pub fn canonical_states(self) -> &'static [u8] {
        match self {
            MolType::Dna => b"TCAG",
            MolType::Rna => b"UCAG",
            MolType::Protein => b"ACDEFGHIKLMNPQRSTVWY",
        }
    }

    /// Whether this moltype supports `mash_canonical_kmers` (reverse
    /// complement is a nucleic-acid-only concept).
    pub fn supports_canonical_kmers(self) -> bool {
        matches!(self, MolType::Dna | MolType::Rna)
    }
}

impl std::str::FromStr for MolType {
    type Err = crate::error::DvsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dna" => Ok(MolType::Dna),
            "rna" => Ok(MolType::Rna),
            "protein" => Ok(MolType::Protein),
            other => Err(crate::error::DvsError::config(format!(
                "unknown moltype {other:?}, expected one of dna, rna, protein"
            ))),
        }
    }
}

/// A single nucleotide lookup table: canonical symbols map to their
/// position, ambiguous symbols map to 4.
static DNA_LUT: [u8; 256] = {
    const N: u8 = 4;
    let mut t = [N; 256];
    t[b'T' as usize] = 0;
    t[b't' as usize] = 0;
    t[b'C' as usize] = 1;
    t[b'c' as usize] = 1;
    t[b'A' as usize] = 2;
    t[b'a' as usize] = 2;
    t[b'G' as usize] = 3;
    t[b'g' as usize] = 3;
    t
};

static RNA_LUT: [u8; 256] = {
    const N: u8 = 4;
    let mut t = [N; 256];
    t[b'U' as usize] = 0;
    t[b'u' as usize] = 0;
    t[b'C' as usize] = 1;
    t[b'c' as usize] = 1;
    t[b'A' as usize] = 2;
    t[b'a' as usize] = 2;
    t[b'G' as usize] = 3;
    t[b'g' as usize] = 3;
    t
};

static PROTEIN_LUT: [u8; 256] = {
    const N: u8 = 20;
    let mut t = [N; 256];
    // ACDEFGHIKLMNPQRSTVWY, alphabetical one-letter codes.
    let order = *b"ACDEFGHIKLMNPQRSTVWY";
    let mut i = 0;
    while i < order.len() {
        t[order[i] as usize] = i as u8;
        t[(order[i] + 32) as usize] = i as u8; // lowercase
        i += 1;
    }
    t
};

/// Encode a byte sequence into per-position state indices. Canonical
/// symbols map to `0..num_states`; anything else maps to `num_states`
/// (ambiguous).
pub fn encode(seq: &[u8], moltype: MolType) -> Vec<u8> {
    let lut: &'static [u8; 256] = match moltype {
        MolType::Dna => &DNA_LUT,
        MolType::Rna => &RNA_LUT,
        MolType::Protein => &PROTEIN_LUT,
    };
    seq.iter().map(|&b| lut[b as usize]).collect()
}
