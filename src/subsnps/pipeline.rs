//! Full normalization of one SubSNP record into a variant.

use super::contig::ContigMapping;
use super::model::SubSnpCoreFields;
use super::processors::{self, renormalization, Context, Step, DEFAULT_CHAIN};
use super::sequence::SequenceReader;
use super::variant::{self, Variant};

/// Supporting code for `Pipeline`.
pub(crate) mod pipeline {
    /// Error type for running the pipeline on a record.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error(transparent)]
        Step(#[from] crate::subsnps::processors::step::Error),
        #[error(transparent)]
        Builder(#[from] crate::subsnps::variant::builder::Error),
    }
}

/// Result of processing one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The record passed all steps.
    Variant(Variant),
    /// The record was dropped by the given step.
    Rejected(Step),
}

/// The record steps, the variant builder and the renormalization together
/// with their read-only collaborators.
pub struct Pipeline {
    contig_mapping: ContigMapping,
    sequence_reader: Box<dyn SequenceReader>,
    dbsnp_build: u32,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("contig_mapping", &self.contig_mapping.len())
            .field("dbsnp_build", &self.dbsnp_build)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(
        contig_mapping: ContigMapping,
        sequence_reader: Box<dyn SequenceReader>,
        dbsnp_build: u32,
    ) -> Self {
        Self {
            contig_mapping,
            sequence_reader,
            dbsnp_build,
        }
    }

    pub fn dbsnp_build(&self) -> u32 {
        self.dbsnp_build
    }

    fn context(&self) -> Context<'_> {
        Context {
            contig_mapping: &self.contig_mapping,
            sequence_reader: self.sequence_reader.as_ref(),
        }
    }

    /// Normalize `record`.
    ///
    /// The record itself is not touched, so processing the same record
    /// again gives the same outcome.
    pub fn process(&self, record: &SubSnpCoreFields) -> Result<Outcome, pipeline::Error> {
        let record = match processors::apply_all(DEFAULT_CHAIN, record.clone(), &self.context())? {
            Ok(record) => record,
            Err(step) => return Ok(Outcome::Rejected(step)),
        };

        let Some(variant) = variant::build(&record, self.dbsnp_build)? else {
            return Ok(Outcome::Rejected(Step::VariantBuilder));
        };

        Ok(Outcome::Variant(renormalization::process(
            variant,
            self.sequence_reader.as_ref(),
        )))
    }
}
