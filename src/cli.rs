//! Command-line surface, following the teacher's `clap` derive style
//! (`src/bin/reference.rs`, `src/cli/opts.rs`): `help_heading`d field
//! groups, an `ArgGroup` for mutually exclusive modes, and
//! `value_parser!(...).range(...)` for bounded numeric flags.

use crate::alphabet::MolType;
use crate::divergent::DivergenceStat;
use crate::error::{DvsError, Result};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "divergence", version, about = "Sequence diversity toolkit: divergent-subset selection and pairwise distance")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Select the most divergent subset of a sequence collection.
    Select(SelectArgs),
    /// Compute a pairwise distance matrix over a sequence collection.
    Distance(DistanceArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MolTypeArg {
    Dna,
    Rna,
    Protein,
}

impl From<MolTypeArg> for MolType {
    fn from(m: MolTypeArg) -> Self {
        match m {
            MolTypeArg::Dna => MolType::Dna,
            MolTypeArg::Rna => MolType::Rna,
            MolTypeArg::Protein => MolType::Protein,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatArg {
    MeanJsd,
    MeanDeltaJsd,
    TotalJsd,
}

impl From<StatArg> for DivergenceStat {
    fn from(s: StatArg) -> Self {
        match s {
            StatArg::MeanJsd => DivergenceStat::MeanJsd,
            StatArg::MeanDeltaJsd => DivergenceStat::MeanDeltaJsd,
            StatArg::TotalJsd => DivergenceStat::TotalJsd,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceModeArg {
    Mash,
    Euclidean,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("size_mode").args(["size", "min_size"]).multiple(false)))]
pub struct SelectArgs {
    /// Input FASTA file.
    #[arg(long, help_heading = "Input")]
    pub fasta: String,

    /// Molecule type of the input sequences.
    #[arg(long, value_enum, default_value = "dna", help_heading = "Input")]
    pub moltype: MolTypeArg,

    /// K-mer size.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=8), help_heading = "K-mer")]
    pub k: u8,

    /// Select a fixed-size subset of this many records.
    #[arg(long, help_heading = "Selection")]
    pub size: Option<usize>,

    /// Grow a variable-size subset starting from at least this many records.
    #[arg(long, requires = "max_size", help_heading = "Selection")]
    pub min_size: Option<usize>,

    /// Upper bound for the variable-size subset.
    #[arg(long, help_heading = "Selection")]
    pub max_size: Option<usize>,

    /// Statistic maximized by variable-size selection.
    #[arg(long, value_enum, default_value = "mean-jsd", help_heading = "Selection")]
    pub stat: StatArg,

    /// Suppress the progress bar.
    #[arg(long, help_heading = "Output")]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct DistanceArgs {
    /// Input FASTA file.
    #[arg(long, help_heading = "Input")]
    pub fasta: String,

    /// Molecule type of the input sequences.
    #[arg(long, value_enum, default_value = "dna", help_heading = "Input")]
    pub moltype: MolTypeArg,

    /// Distance computation mode.
    #[arg(long, value_enum, default_value = "mash", help_heading = "Distance")]
    pub mode: DistanceModeArg,

    /// K-mer size.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=8), help_heading = "K-mer")]
    pub k: u8,

    /// Sketch size, mash mode only.
    #[arg(long, default_value_t = 3000, help_heading = "Distance")]
    pub sketch_size: usize,

    /// Fold each k-mer together with its reverse complement; mash mode
    /// and nucleic-acid moltypes only.
    #[arg(long, help_heading = "Distance")]
    pub canonical: bool,

    /// Number of threads to use; defaults to all available cores.
    #[arg(long, help_heading = "Performance")]
    pub threads: Option<usize>,

    /// Write the distance matrix as CSV to this path instead of stdout.
    #[arg(long, help_heading = "Output")]
    pub output: Option<String>,

    /// Suppress the progress bar.
    #[arg(long, help_heading = "Output")]
    pub quiet: bool,
}

impl SelectArgs {
    pub fn validate(&self) -> Result<()> {
        match (self.size, self.min_size, self.max_size) {
            (None, None, None) => Err(DvsError::config(
                "select requires either --size or --min-size/--max-size",
            )),
            (Some(_), Some(_), _) => Err(DvsError::config(
                "--size cannot be combined with --min-size/--max-size",
            )),
            (None, Some(min), Some(max)) if min > max => Err(DvsError::config(format!(
                "--min-size {min} is greater than --max-size {max}"
            ))),
            _ => Ok(()),
        }
    }
}

impl DistanceArgs {
    pub fn validate(&self) -> Result<()> {
        if self.canonical && self.mode != DistanceModeArg::Mash {
            return Err(DvsError::config("--canonical only applies to --mode mash"));
        }
        if self.canonical && matches!(self.moltype, MolTypeArg::Protein) {
            return Err(DvsError::config(
                "--canonical cannot be used with --moltype protein",
            ));
        }
        if self.mode == DistanceModeArg::Euclidean && self.sketch_size != 3000 {
            return Err(DvsError::config(
                "--sketch-size only applies to --mode mash",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_requires_a_size_mode() {
        let args = SelectArgs {
            fasta: "x.fasta".into(),
            moltype: MolTypeArg::Dna,
            k: 4,
            size: None,
            min_size: None,
            max_size: None,
            stat: StatArg::MeanJsd,
            quiet: false,
        };
        assert!(matches!(args.validate(), Err(DvsError::Config(_))));
    }

    #[test]
    fn select_rejects_both_size_modes_at_once() {
        let args = SelectArgs {
            fasta: "x.fasta".into(),
            moltype: MolTypeArg::Dna,
            k: 4,
            size: Some(5),
            min_size: Some(2),
            max_size: None,
            stat: StatArg::MeanJsd,
            quiet: false,
        };
        assert!(matches!(args.validate(), Err(DvsError::Config(_))));
    }

    #[test]
    fn distance_rejects_canonical_with_protein() {
        let args = DistanceArgs {
            fasta: "x.fasta".into(),
            moltype: MolTypeArg::Protein,
            mode: DistanceModeArg::Mash,
            k: 4,
            sketch_size: 3000,
            canonical: true,
            threads: None,
            output: None,
            quiet: false,
        };
        assert!(matches!(args.validate(), Err(DvsError::Config(_))));
    }

    #[test]
    fn distance_rejects_canonical_with_euclidean_mode() {
        let args = DistanceArgs {
            fasta: "x.fasta".into(),
            moltype: MolTypeArg::Dna,
            mode: DistanceModeArg::Euclidean,
            k: 4,
            sketch_size: 3000,
            canonical: true,
            threads: None,
            output: None,
            quiet: false,
        };
        assert!(matches!(args.validate(), Err(DvsError::Config(_))));
    }
}
