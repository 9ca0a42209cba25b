use anyhow::{Context, Result};
use clap::Parser;
use diverse_seq::alphabet::MolType;
use diverse_seq::cli::{Cli, Command, DistanceModeArg};
use diverse_seq::distance::{euclidean_distances, mash_distances};
use diverse_seq::divergent::SummedRecords;
use diverse_seq::io::load_fasta;
use diverse_seq::minhash::mash_sketch;
use diverse_seq::progress::{IndicatifProgress, NullProgress, Progress};
use diverse_seq::record::seqarray_to_record;
use std::rc::Rc;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Select(args) => run_select(args),
        Command::Distance(args) => run_distance(args),
    }
}

fn run_select(args: diverse_seq::cli::SelectArgs) -> Result<()> {
    args.validate().context("validating select arguments")?;
    let moltype: MolType = args.moltype.into();
    let seqs = load_fasta(&args.fasta, moltype).context("loading input fasta")?;

    let progress: Box<dyn Progress> = if args.quiet {
        Box::new(NullProgress)
    } else {
        Box::new(IndicatifProgress::new())
    };
    let task = progress.add_task("counting k-mers", seqs.len() as u64);
    let mut records = Vec::with_capacity(seqs.len());
    for seq in &seqs {
        let record = seqarray_to_record(seq, args.k as usize)
            .with_context(|| format!("building record for {:?}", seq.name))?;
        records.push(Rc::new(record));
        progress.update(task, 1);
    }

    let selected = if let Some(size) = args.size {
        SummedRecords::most_divergent(records, size).context("selecting most divergent subset")?
    } else {
        let min_size = args.min_size.expect("validated: min_size present without --size");
        let max_size = args.max_size.expect("validated: max_size present without --size");
        SummedRecords::max_divergent(records, min_size, max_size, args.stat.into())
            .context("selecting maximally divergent subset")?
    };

    let report = selected.report().context("summarizing selection")?;
    println!("selected {} of {} records", report.size, seqs.len());
    println!("mean_jsd = {:.6}", report.mean_jsd);
    println!("mean_delta_jsd = {:.6}", report.mean_delta_jsd);
    for name in &report.names {
        println!("{name}");
    }
    Ok(())
}

fn run_distance(args: diverse_seq::cli::DistanceArgs) -> Result<()> {
    args.validate().context("validating distance arguments")?;
    let moltype: MolType = args.moltype.into();
    let seqs = load_fasta(&args.fasta, moltype).context("loading input fasta")?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("configuring the thread pool")?;
    }

    let progress: Box<dyn Progress> = if args.quiet {
        Box::new(NullProgress)
    } else {
        Box::new(IndicatifProgress::new())
    };

    let names: Vec<String> = seqs.iter().map(|s| s.name.clone()).collect();
    let k = args.k as usize;

    let matrix = match args.mode {
        DistanceModeArg::Mash => {
            let task = progress.add_task("sketching sequences", seqs.len() as u64);
            let sketches: Vec<_> = seqs
                .iter()
                .map(|s| -> diverse_seq::Result<_> {
                    let encoded = diverse_seq::alphabet::encode(&s.data, moltype);
                    let sketch = mash_sketch(&encoded, moltype, k, args.sketch_size, args.canonical)?;
                    progress.update(task, 1);
                    Ok(sketch)
                })
                .collect::<diverse_seq::Result<_>>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("sketching sequences")?;
            mash_distances(names, &sketches, k, args.sketch_size, progress.as_ref())
                .map_err(|e| anyhow::anyhow!(e))
                .context("computing mash distances")?
        }
        DistanceModeArg::Euclidean => {
            let task = progress.add_task("counting k-mers", seqs.len() as u64);
            let kfreqs: Vec<_> = seqs
                .iter()
                .map(|s| -> diverse_seq::Result<_> {
                    let record = seqarray_to_record(s, k)?;
                    progress.update(task, 1);
                    Ok(record.kfreqs)
                })
                .collect::<diverse_seq::Result<_>>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("counting k-mers")?;
            euclidean_distances(names, &kfreqs, progress.as_ref())
                .map_err(|e| anyhow::anyhow!(e))
                .context("computing euclidean distances")?
        }
    };

    match args.output {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("creating output file {path:?}"))?;
            matrix
                .write_csv(file)
                .map_err(|e| anyhow::anyhow!(e))
                .context("writing distance matrix")?;
        }
        None => {
            matrix
                .write_csv(std::io::stdout())
                .map_err(|e| anyhow::anyhow!(e))
                .context("writing distance matrix")?;
        }
    }

    Ok(())
}
