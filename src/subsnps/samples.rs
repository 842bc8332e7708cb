//! Samples of dbSNP submission batches and their conversion to a variant
//! source, plus the `subsnps samples` sub command.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use indexmap::IndexMap;
use thousands::Separable;

use crate::common::io::{open_read_maybe_gz, open_write_maybe_gz, read_json_lines};
use crate::subsnps::variant::DBSNP_BUILD_KEY;

/// Metadata key with the numeric dbSNP batch identifier.
pub const DBSNP_BATCH_ID_KEY: &str = "dbsnp-batch-id";

/// Cohort key for the population of a sample.
pub const POPULATION_KEY: &str = "population";

/// Sex of an individual.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Sex {
    /// Interpret the first character of `raw`, `M` and `F` in any case.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.and_then(|raw| raw.chars().next()) {
            Some('M' | 'm') => Sex::Male,
            Some('F' | 'f') => Sex::Female,
            _ => Sex::Unknown,
        }
    }
}

/// Supporting code for `Sample` and `VariantSource`.
pub(crate) mod samples {
    /// Error type for samples and their conversion to a variant source.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error("sample batch must not be empty")]
        EmptyBatch,
        #[error("sample name must not be empty (batch {batch})")]
        EmptyName { batch: String },
        #[error("no samples in batch {batch_id}")]
        NoSamples { batch_id: u64 },
        #[error("samples from more than one batch: {batches:?}")]
        MultipleBatches { batches: Vec<String> },
        #[error("sample {name} appears more than once in batch {batch}")]
        DuplicateSample { batch: String, name: String },
    }
}

/// One individual submitted in a dbSNP batch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Sample {
    pub batch: String,
    pub name: String,
    pub sex: Sex,
    pub father: Option<String>,
    pub mother: Option<String>,
    /// Cohort memberships, e.g., `population`.
    pub cohorts: IndexMap<String, String>,
}

impl Sample {
    pub fn new<B: Into<String>, N: Into<String>>(
        batch: B,
        name: N,
        sex: Sex,
        father: Option<String>,
        mother: Option<String>,
        cohorts: IndexMap<String, String>,
    ) -> Result<Self, samples::Error> {
        let batch = batch.into();
        let name = name.into();
        if batch.is_empty() {
            return Err(samples::Error::EmptyBatch);
        }
        if name.is_empty() {
            return Err(samples::Error::EmptyName { batch });
        }
        Ok(Self {
            batch,
            name,
            sex,
            father,
            mother,
            cohorts,
        })
    }

    /// Identifier unique across batches.
    pub fn id(&self) -> String {
        format!("{}_{}", self.batch, self.name)
    }
}

/// Raw row of the sample query, from JSON lines or TSV with header.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SampleRow {
    pub handle: String,
    pub batch_id: u64,
    pub batch_name: String,
    pub individual_name: String,
    pub population: Option<String>,
    pub individual_id: Option<u64>,
    pub submitted_individual_id: Option<u64>,
    pub father_id: Option<String>,
    pub mother_id: Option<String>,
    pub sex: Option<String>,
}

impl TryFrom<SampleRow> for Sample {
    type Error = samples::Error;

    fn try_from(row: SampleRow) -> Result<Self, Self::Error> {
        let cohorts = row
            .population
            .map(|population| IndexMap::from([(POPULATION_KEY.to_string(), population)]))
            .unwrap_or_default();
        Sample::new(
            row.batch_name,
            row.individual_name,
            Sex::from_raw(row.sex.as_deref()),
            row.father_id.filter(|id| !id.is_empty()),
            row.mother_id.filter(|id| !id.is_empty()),
            cohorts,
        )
    }
}

/// A dbSNP submission batch with its samples.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DbsnpBatch {
    pub batch_id: u64,
    /// Submitter handle.
    pub handle: String,
    pub batch_name: String,
    pub samples: Vec<Sample>,
}

/// Description of the study and file the variants of one batch belong to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VariantSource {
    pub file_id: String,
    pub file_name: String,
    pub study_id: String,
    pub study_name: String,
    /// Column of each sample in the genotype lists.
    pub samples_position: IndexMap<String, usize>,
    pub metadata: IndexMap<String, String>,
}

/// Build the `VariantSource` of the samples of one batch.
///
/// Fails if `samples` is empty, if the samples come from different batches,
/// or if a sample name repeats.
pub fn samples_to_variant_source(
    samples: &[Sample],
    dbsnp_build: u32,
    batch_id: u64,
) -> Result<VariantSource, samples::Error> {
    let Some(first) = samples.first() else {
        return Err(samples::Error::NoSamples { batch_id });
    };

    let mut batches = samples
        .iter()
        .map(|sample| sample.batch.clone())
        .collect::<Vec<_>>();
    batches.sort();
    batches.dedup();
    if batches.len() > 1 {
        return Err(samples::Error::MultipleBatches { batches });
    }

    let mut samples_position = IndexMap::new();
    for sample in samples {
        let position = samples_position.len();
        if samples_position
            .insert(sample.name.clone(), position)
            .is_some()
        {
            return Err(samples::Error::DuplicateSample {
                batch: sample.batch.clone(),
                name: sample.name.clone(),
            });
        }
    }

    let metadata = IndexMap::from([
        (DBSNP_BUILD_KEY.to_string(), dbsnp_build.to_string()),
        (DBSNP_BATCH_ID_KEY.to_string(), batch_id.to_string()),
    ]);

    Ok(VariantSource {
        file_id: first.batch.clone(),
        file_name: first.batch.clone(),
        study_id: first.batch.clone(),
        study_name: first.batch.clone(),
        samples_position,
        metadata,
    })
}

/// Load sample rows; paths containing `.tsv` are read as tab-separated with
/// header, everything else as JSON lines.
fn load_sample_rows<P: AsRef<Path>>(path: P) -> Result<Vec<SampleRow>, anyhow::Error> {
    let path = path.as_ref();
    if !path.to_string_lossy().contains(".tsv") {
        return read_json_lines(path);
    }

    let reader = open_read_maybe_gz(path)
        .map_err(|e| anyhow::anyhow!("could not open samples file {:?}: {}", path, e))?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);
    csv_reader
        .deserialize()
        .collect::<Result<Vec<SampleRow>, _>>()
        .map_err(|e| anyhow::anyhow!("could not parse samples TSV {:?}: {}", path, e))
}

/// Collect the rows of batch `batch_id` into a `DbsnpBatch`.
pub fn load_batch<P: AsRef<Path>>(path: P, batch_id: u64) -> Result<DbsnpBatch, anyhow::Error> {
    let rows = load_sample_rows(path)?
        .into_iter()
        .filter(|row| row.batch_id == batch_id)
        .collect::<Vec<_>>();
    let Some(first) = rows.first() else {
        anyhow::bail!("no samples found for batch {}", batch_id);
    };

    Ok(DbsnpBatch {
        batch_id,
        handle: first.handle.clone(),
        batch_name: first.batch_name.clone(),
        samples: rows
            .into_iter()
            .map(Sample::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("invalid sample in batch {}: {}", batch_id, e))?,
    })
}

/// Command line arguments for `subsnps samples` sub command.
#[derive(Parser, Debug)]
#[command(about = "Build the variant source of a dbSNP batch", long_about = None)]
pub struct Args {
    /// Samples as JSON lines or TSV with header, optionally gzipped.
    #[arg(long)]
    pub path_input: PathBuf,
    /// Path to the output JSON file.
    #[arg(long)]
    pub path_output: PathBuf,
    /// dbSNP build the batch was imported from.
    #[arg(long)]
    pub dbsnp_build: u32,
    /// Numeric identifier of the batch.
    #[arg(long)]
    pub batch_id: u64,
}

/// Main entry point for the `subsnps samples` command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `subsnps samples`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let batch = load_batch(&args.path_input, args.batch_id)?;
    tracing::info!(
        "loaded {} samples of batch {} ({})",
        batch.samples.len().separate_with_commas(),
        batch.batch_name,
        batch.handle
    );

    let source = samples_to_variant_source(&batch.samples, args.dbsnp_build, batch.batch_id)
        .map_err(|e| anyhow::anyhow!("could not build variant source: {}", e))?;

    let mut writer = open_write_maybe_gz(&args.path_output)?;
    serde_json::to_writer_pretty(&mut writer, &source)
        .map_err(|e| anyhow::anyhow!("could not write variant source: {}", e))?;
    writeln!(writer)?;
    writer.flush()?;

    tracing::info!("All done writing variant source for {}", source.study_id);
    Ok(())
}

#[cfg(test)]
mod test {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    use super::*;

    const DBSNP_BUILD: u32 = 150;
    const BATCH_ID: u64 = 12345;
    const BATCH_NAME: &str = "some_study";

    fn sample(batch: &str, name: &str, sex: Sex, father: Option<&str>, mother: Option<&str>) -> Sample {
        Sample::new(
            batch,
            name,
            sex,
            father.map(String::from),
            mother.map(String::from),
            IndexMap::from([(POPULATION_KEY.to_string(), "ALL".to_string())]),
        )
        .expect("valid sample")
    }

    #[rstest::fixture]
    fn trio() -> Vec<Sample> {
        vec![
            sample(BATCH_NAME, "father", Sex::Male, None, None),
            sample(BATCH_NAME, "mother", Sex::Female, None, None),
            sample(
                BATCH_NAME,
                "child",
                Sex::Unknown,
                Some("father"),
                Some("mother"),
            ),
        ]
    }

    #[rstest::rstest]
    #[case(Some("M"), Sex::Male)]
    #[case(Some("male"), Sex::Male)]
    #[case(Some("F"), Sex::Female)]
    #[case(Some("f"), Sex::Female)]
    #[case(Some("U"), Sex::Unknown)]
    #[case(Some(""), Sex::Unknown)]
    #[case(None, Sex::Unknown)]
    fn sex_from_raw(#[case] raw: Option<&str>, #[case] expected: Sex) {
        assert_eq!(Sex::from_raw(raw), expected);
    }

    #[test]
    fn sample_id() {
        let sample = sample(BATCH_NAME, "child", Sex::Unknown, None, None);
        assert_eq!(sample.id(), "some_study_child");
    }

    #[test]
    fn sample_requires_batch_and_name() {
        assert_eq!(
            Sample::new("", "x", Sex::Unknown, None, None, IndexMap::new()),
            Err(samples::Error::EmptyBatch)
        );
        assert_eq!(
            Sample::new("b", "", Sex::Unknown, None, None, IndexMap::new()),
            Err(samples::Error::EmptyName { batch: "b".into() })
        );
    }

    #[rstest::rstest]
    fn variant_source(trio: Vec<Sample>) -> Result<(), anyhow::Error> {
        let source = samples_to_variant_source(&trio, DBSNP_BUILD, BATCH_ID)?;

        assert_eq!(source.file_id, BATCH_NAME);
        assert_eq!(source.file_name, BATCH_NAME);
        assert_eq!(source.study_id, BATCH_NAME);
        assert_eq!(source.study_name, BATCH_NAME);
        assert_eq!(source.samples_position["father"], 0);
        assert_eq!(source.samples_position["mother"], 1);
        assert_eq!(source.samples_position["child"], 2);
        assert_eq!(
            source.metadata.into_iter().collect::<Vec<_>>(),
            vec![
                ("dbsnp-build".to_string(), "150".to_string()),
                ("dbsnp-batch-id".to_string(), "12345".to_string()),
            ]
        );

        Ok(())
    }

    #[rstest::rstest]
    fn fail_with_multiple_batches(mut trio: Vec<Sample>) {
        trio.push(sample("another_study", "someone", Sex::Male, None, None));

        assert_eq!(
            samples_to_variant_source(&trio, DBSNP_BUILD, BATCH_ID),
            Err(samples::Error::MultipleBatches {
                batches: vec!["another_study".into(), BATCH_NAME.into()]
            })
        );
    }

    #[rstest::rstest]
    fn fail_with_duplicate_samples(mut trio: Vec<Sample>) {
        trio.push(sample(BATCH_NAME, "mother", Sex::Female, None, None));

        assert_eq!(
            samples_to_variant_source(&trio, DBSNP_BUILD, BATCH_ID),
            Err(samples::Error::DuplicateSample {
                batch: BATCH_NAME.into(),
                name: "mother".into()
            })
        );
    }

    #[test]
    fn fail_without_samples() {
        assert_eq!(
            samples_to_variant_source(&[], DBSNP_BUILD, BATCH_ID),
            Err(samples::Error::NoSamples { batch_id: BATCH_ID })
        );
    }

    #[rstest::rstest]
    #[case("tests/subsnps/samples.jsonl")]
    #[case("tests/subsnps/samples.tsv")]
    fn load_batch_from_file(#[case] path: &str) -> Result<(), anyhow::Error> {
        let batch = load_batch(path, BATCH_ID)?;

        assert_eq!(batch.handle, "SOME_LAB");
        assert_eq!(batch.batch_name, BATCH_NAME);
        let names = batch
            .samples
            .iter()
            .map(|sample| (sample.name.as_str(), sample.sex))
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                ("father", Sex::Male),
                ("mother", Sex::Female),
                ("child", Sex::Unknown)
            ]
        );
        assert_eq!(batch.samples[2].father.as_deref(), Some("father"));
        assert_eq!(batch.samples[2].cohorts[POPULATION_KEY], "CEU");

        Ok(())
    }

    #[test]
    fn load_unknown_batch() {
        assert!(load_batch("tests/subsnps/samples.jsonl", 1).is_err());
    }

    #[test]
    fn run_smoke() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path_output = tmp_dir.join("source.json");
        let args = Args {
            path_input: "tests/subsnps/samples.jsonl".into(),
            path_output: path_output.clone(),
            dbsnp_build: DBSNP_BUILD,
            batch_id: BATCH_ID,
        };

        run(&crate::common::Args::default(), &args)?;

        let source: VariantSource = serde_json::from_reader(std::fs::File::open(path_output)?)?;
        assert_eq!(source.study_id, BATCH_NAME);
        assert_eq!(source.samples_position.len(), 3);

        Ok(())
    }
}
