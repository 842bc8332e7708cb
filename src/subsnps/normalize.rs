//! Implementation of the `subsnps normalize` sub command.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use enum_map::EnumMap;
use rayon::prelude::*;
use strum::IntoEnumIterator;
use thousands::Separable;

use crate::common::io::{open_write_maybe_gz, read_json_lines};
use crate::subsnps::contig::ContigMapping;
use crate::subsnps::model::{SubSnpCoreFields, SubSnpGenotype, SubSnpRow};
use crate::subsnps::pipeline::{Outcome, Pipeline};
use crate::subsnps::processors::Step;
use crate::subsnps::sequence::FastaSequenceReader;

/// Command line arguments for `subsnps normalize` sub command.
#[derive(Parser, Debug)]
#[command(about = "Normalize dbSNP SubSNPs into variants", long_about = None)]
pub struct Args {
    /// SubSNP rows as JSON lines, optionally gzipped.
    #[arg(long)]
    pub path_input: PathBuf,
    /// FASTA file with the reference assembly, optionally gzipped.
    #[arg(long)]
    pub path_reference: PathBuf,
    /// NCBI assembly report for renaming RefSeq contigs to GenBank.
    #[arg(long)]
    pub path_assembly_report: Option<PathBuf>,
    /// Genotype rows as JSON lines, replacing the genotypes of the SubSNPs.
    #[arg(long)]
    pub path_genotypes: Option<PathBuf>,
    /// Path to the output JSON lines file with the variants.
    #[arg(long)]
    pub path_output: PathBuf,
    /// dbSNP build the SubSNPs come from.
    #[arg(long)]
    pub dbsnp_build: u32,
}

/// Number of records per outcome.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Counts {
    pub written: usize,
    pub rejected: EnumMap<Step, usize>,
}

impl Counts {
    fn log(&self) {
        tracing::info!("wrote {} variants", self.written.separate_with_commas());
        for step in Step::iter() {
            if self.rejected[step] > 0 {
                tracing::info!(
                    "  rejected by {}: {}",
                    step,
                    self.rejected[step].separate_with_commas()
                );
            }
        }
    }
}

/// Load the SubSNP records and attach the genotypes, if any.
fn load_records(args: &Args) -> Result<Vec<SubSnpCoreFields>, anyhow::Error> {
    let rows: Vec<SubSnpRow> = read_json_lines(&args.path_input)?;
    let records = rows
        .into_iter()
        .map(SubSnpCoreFields::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("invalid SubSNP row: {}", e))?;

    let Some(path_genotypes) = &args.path_genotypes else {
        return Ok(records);
    };
    let mut genotypes = HashMap::new();
    for genotype in read_json_lines::<SubSnpGenotype, _>(path_genotypes)? {
        if let Some(previous) = genotypes.insert(genotype.ss_id, genotype) {
            tracing::warn!(
                "genotypes of ss{} given more than once, using the last ones",
                previous.ss_id
            );
        }
    }
    tracing::info!(
        "loaded genotypes for {} SubSNPs",
        genotypes.len().separate_with_commas()
    );

    Ok(records
        .into_iter()
        .map(|record| match genotypes.get(&record.ss_id) {
            Some(genotype) => record.with_genotypes(genotype),
            None => record,
        })
        .collect())
}

/// Normalize all `records` in parallel and write the variants in input
/// order.
pub fn normalize<W: Write>(
    pipeline: &Pipeline,
    records: &[SubSnpCoreFields],
    writer: &mut W,
) -> Result<Counts, anyhow::Error> {
    let outcomes = records
        .par_iter()
        .map(|record| {
            pipeline
                .process(record)
                .map_err(|e| anyhow::anyhow!("could not process ss{}: {}", record.ss_id, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut counts = Counts::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Variant(variant) => {
                serde_json::to_writer(&mut *writer, &variant)
                    .map_err(|e| anyhow::anyhow!("could not write variant: {}", e))?;
                writeln!(writer)?;
                counts.written += 1;
            }
            Outcome::Rejected(step) => counts.rejected[step] += 1,
        }
    }
    Ok(counts)
}

/// Main entry point for the `subsnps normalize` command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<Counts, anyhow::Error> {
    tracing::info!("Starting `subsnps normalize`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let before_loading = Instant::now();
    let contig_mapping = match &args.path_assembly_report {
        Some(path) => ContigMapping::from_assembly_report(path)?,
        None => ContigMapping::default(),
    };
    let sequence_reader = FastaSequenceReader::from_path(&args.path_reference)?;
    tracing::info!(
        "loaded {} reference sequences and {} contig names in {:?}",
        sequence_reader.len().separate_with_commas(),
        contig_mapping.len().separate_with_commas(),
        before_loading.elapsed()
    );
    let pipeline = Pipeline::new(contig_mapping, Box::new(sequence_reader), args.dbsnp_build);

    let records = load_records(args)?;
    tracing::info!("loaded {} SubSNPs", records.len().separate_with_commas());

    let before_processing = Instant::now();
    let mut writer = open_write_maybe_gz(&args.path_output)?;
    let counts = normalize(&pipeline, &records, &mut writer)?;
    writer.flush()?;
    tracing::info!(
        "... done normalizing {} SubSNPs in {:?}",
        records.len().separate_with_commas(),
        before_processing.elapsed()
    );
    counts.log();

    Ok(counts)
}
