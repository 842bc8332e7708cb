//! Filters and transformations applied to SubSNP records and variants.
//!
//! The record steps in `DEFAULT_CHAIN` run in order on `SubSnpCoreFields`,
//! each either passing on a (possibly rewritten) record or dropping it.
//! The variant is then built and renormalized.

use super::contig::ContigMapping;
use super::model::SubSnpCoreFields;
use super::sequence::SequenceReader;

pub mod assembly_check;
pub mod matching_alleles;
pub mod missing_coordinates;
pub mod refseq_to_genbank;
pub mod renormalization;
pub mod unambiguous_alleles;

/// One step of the normalization pipeline.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    serde::Serialize,
    enum_map::Enum,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    /// Drop records without start and end on contig or chromosome.
    MissingCoordinates,
    /// Drop records with non-`ACGT` alleles.
    UnambiguousAlleles,
    /// Drop records whose reference/alternate are not among the alleles.
    MatchingAlleles,
    /// Rename RefSeq contigs to GenBank for unmapped records.
    RefseqToGenbank,
    /// Drop records whose reference does not match the assembly.
    AssemblyCheck,
    /// Build the variant; drops records without genotypes or frequencies.
    VariantBuilder,
    /// Shift ambiguous indels one base to the left.
    Renormalization,
}

/// The record steps, in the order they are applied.
pub const DEFAULT_CHAIN: &[Step] = &[
    Step::MissingCoordinates,
    Step::UnambiguousAlleles,
    Step::MatchingAlleles,
    Step::RefseqToGenbank,
    Step::AssemblyCheck,
];

/// Read-only collaborators of the processing steps.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub contig_mapping: &'a ContigMapping,
    pub sequence_reader: &'a dyn SequenceReader,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("contig_mapping", &self.contig_mapping.len())
            .finish_non_exhaustive()
    }
}

/// Supporting code for `Step`.
pub(crate) mod step {
    /// Error type for applying a step.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error(transparent)]
        Coordinates(#[from] crate::subsnps::coords::variant_coordinates::Error),
        #[error("step {0} does not operate on SubSNP records")]
        NotARecordStep(super::Step),
    }
}

impl Step {
    /// Apply a record step.
    ///
    /// `Ok(None)` means the record was dropped.
    pub fn apply(
        self,
        record: SubSnpCoreFields,
        context: &Context,
    ) -> Result<Option<SubSnpCoreFields>, step::Error> {
        Ok(match self {
            Step::MissingCoordinates => missing_coordinates::process(record),
            Step::UnambiguousAlleles => unambiguous_alleles::process(record),
            Step::MatchingAlleles => matching_alleles::process(record),
            Step::RefseqToGenbank => Some(refseq_to_genbank::process(
                record,
                context.contig_mapping,
            )),
            Step::AssemblyCheck => assembly_check::process(record, context.sequence_reader)?,
            Step::VariantBuilder | Step::Renormalization => {
                return Err(step::Error::NotARecordStep(self))
            }
        })
    }
}

/// Run `record` through `steps`, returning the step that dropped it on
/// rejection.
pub fn apply_all(
    steps: &[Step],
    record: SubSnpCoreFields,
    context: &Context,
) -> Result<Result<SubSnpCoreFields, Step>, step::Error> {
    let mut record = record;
    for &step in steps {
        tracing::trace!("ss{}: applying {}", record.ss_id, step);
        match step.apply(record, context)? {
            Some(next) => record = next,
            None => return Ok(Err(step)),
        }
    }
    Ok(Ok(record))
}
