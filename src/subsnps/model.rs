//! Data model for SubSNP records as read from dbSNP.

use super::orientation::{trimmed_allele, Orientation};

/// Shape of the variant described by a SubSNP.
///
/// `ShorterOnContig` and `LongerOnContig` are indels where both alleles have
/// bases, the name tells which side is longer on the contig.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LocusType {
    /// Single nucleotide variant, called "SNP" by dbSNP.
    #[serde(rename = "SNP", alias = "SNV")]
    #[strum(to_string = "SNP", serialize = "SNV")]
    Snv,
    /// Insertion, anchored between two bases.
    Insertion,
    /// Deletion.
    Deletion,
    /// Indel where the contig allele is shorter than the alternate.
    ShorterOnContig,
    /// Indel where the contig allele is longer than the alternate.
    LongerOnContig,
}

impl LocusType {
    /// Derive the locus type from the reference and alternate alleles.
    pub fn classify(reference: &str, alternate: &str) -> LocusType {
        match (reference.len(), alternate.len()) {
            (0, _) => LocusType::Insertion,
            (_, 0) => LocusType::Deletion,
            (r, a) if r == a => LocusType::Snv,
            (r, a) if r > a => LocusType::LongerOnContig,
            _ => LocusType::ShorterOnContig,
        }
    }

    /// Whether this is any kind of insertion/deletion.
    pub fn is_indel(&self) -> bool {
        !matches!(self, LocusType::Snv)
    }
}

/// Supporting code for `Region`.
pub(crate) mod region {
    /// Error type for building a `Region`.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error("coordinates of {name} must be non-negative, got {value}")]
        NegativeCoordinate { name: String, value: i64 },
        #[error("region on {name} has an end ({end}) but no start")]
        EndWithoutStart { name: String, end: u64 },
        #[error("region on {name} starts after its end ({start} > {end})")]
        StartAfterEnd { name: String, start: u64, end: u64 },
    }
}

/// A named sequence with optional 1-based inclusive coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Region {
    name: String,
    start: Option<u64>,
    end: Option<u64>,
}

impl Region {
    /// Create a region, checking that an end comes with a start and that the
    /// start is not after the end.
    pub fn new<S: Into<String>>(
        name: S,
        start: Option<u64>,
        end: Option<u64>,
    ) -> Result<Self, region::Error> {
        let name = name.into();
        match (start, end) {
            (None, Some(end)) => Err(region::Error::EndWithoutStart { name, end }),
            (Some(start), Some(end)) if start > end => {
                Err(region::Error::StartAfterEnd { name, start, end })
            }
            _ => Ok(Self { name, start, end }),
        }
    }

    /// Create a region from signed database coordinates.
    pub fn from_signed<S: Into<String>>(
        name: S,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Self, region::Error> {
        let name = name.into();
        let start = non_negative(&name, start)?;
        let end = non_negative(&name, end)?;
        Self::new(name, start, end)
    }

    /// A region that only names its sequence.
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            start: None,
            end: None,
        }
    }

    /// Name of the sequence.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start position, if known.
    pub fn start(&self) -> Option<u64> {
        self.start
    }

    /// End position, if known.
    pub fn end(&self) -> Option<u64> {
        self.end
    }

    /// Whether both start and end are known.
    pub fn has_coordinates(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Copy of this region on a sequence with another name.
    pub fn renamed<S: Into<String>>(&self, name: S) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

fn non_negative(name: &str, value: Option<i64>) -> Result<Option<u64>, region::Error> {
    value
        .map(|value| {
            u64::try_from(value).map_err(|_| region::Error::NegativeCoordinate {
                name: name.to_string(),
                value,
            })
        })
        .transpose()
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.start, self.end) {
            (Some(start), Some(end)) => write!(f, "{}:{}-{}", self.name, start, end),
            (Some(start), None) => write!(f, "{}:{}", self.name, start),
            _ => write!(f, "{}", self.name),
        }
    }
}

/// One SubSNP with its contig and (optional) chromosome placement.
///
/// Values of this type are not modified once built, processing steps that
/// change a record return a new one.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SubSnpCoreFields {
    /// The `ss` identifier.
    pub ss_id: u64,
    /// The `rs` identifier of the cluster, if any.
    pub rs_id: Option<u64>,
    /// Orientation of the SubSNP relative to the RefSNP.
    pub subsnp_orientation: Orientation,
    /// Orientation of the RefSNP relative to the contig.
    pub snp_orientation: Orientation,
    /// Orientation of the contig relative to the chromosome.
    pub contig_orientation: Orientation,
    /// Placement on the contig.
    pub contig_region: Region,
    /// Placement on the chromosome, absent when the contig is not mapped.
    pub chromosome_region: Option<Region>,
    /// Shape of the variant.
    pub locus_type: LocusType,
    /// Reference allele from the chromosome-level HGVS annotation.
    pub hgvs_c_reference: Option<String>,
    /// Reference allele from the contig-level HGVS annotation.
    pub hgvs_t_reference: Option<String>,
    /// Submitted alternate allele, oriented like the applicable HGVS context.
    pub alternate: Option<String>,
    /// Slash-separated alleles as submitted.
    pub alleles: String,
    /// Chromosome-level HGVS string.
    pub hgvs_c_string: Option<String>,
    pub hgvs_c_start: Option<u64>,
    pub hgvs_c_stop: Option<u64>,
    pub hgvs_c_orientation: Orientation,
    /// Contig-level HGVS string.
    pub hgvs_t_string: Option<String>,
    pub hgvs_t_start: Option<u64>,
    pub hgvs_t_stop: Option<u64>,
    pub hgvs_t_orientation: Orientation,
    /// Raw comma-separated genotypes, one per sample.
    pub genotypes: Option<String>,
    /// Raw population frequency JSON.
    pub frequencies: Option<String>,
    /// Submission batch name.
    pub batch: Option<String>,
}

impl SubSnpCoreFields {
    /// The orientation that brings the submitted alleles to the forward
    /// strand, i.e., the composition of the three primary orientations.
    pub fn allele_orientation(&self) -> Orientation {
        Orientation::combine_all([
            self.subsnp_orientation,
            self.snp_orientation,
            self.contig_orientation,
        ])
    }

    /// Copy of this record with the genotypes replaced by the ones given.
    pub fn with_genotypes(&self, genotypes: &SubSnpGenotype) -> Self {
        Self {
            genotypes: Some(genotypes.genotypes.join(",")),
            ..self.clone()
        }
    }
}

/// Raw row of the SubSNP query, as read from JSON lines.
///
/// Coordinates are signed and orientations are the integers `1`/`-1` used
/// by dbSNP, both are checked when converting to `SubSnpCoreFields`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SubSnpRow {
    pub ss_id: u64,
    pub rs_id: Option<u64>,
    pub contig_name: String,
    pub contig_start: Option<i64>,
    pub contig_end: Option<i64>,
    pub chromosome: Option<String>,
    pub chromosome_start: Option<i64>,
    pub chromosome_end: Option<i64>,
    pub subsnp_orientation: i64,
    pub snp_orientation: i64,
    pub contig_orientation: i64,
    /// Derived from the alleles when missing.
    pub locus_type: Option<LocusType>,
    pub hgvs_c_string: Option<String>,
    pub hgvs_c_start: Option<i64>,
    pub hgvs_c_stop: Option<i64>,
    pub reference_c: Option<String>,
    pub hgvs_c_orientation: i64,
    pub hgvs_t_string: Option<String>,
    pub hgvs_t_start: Option<i64>,
    pub hgvs_t_stop: Option<i64>,
    pub reference_t: Option<String>,
    pub hgvs_t_orientation: i64,
    pub alternate: Option<String>,
    pub alleles: String,
    pub batch: Option<String>,
    pub genotypes_string: Option<String>,
    pub freq_info: Option<String>,
}

/// Supporting code for `SubSnpRow`.
pub(crate) mod subsnp_row {
    use crate::subsnps::orientation::conversion;

    /// Error type for converting a `SubSnpRow` into `SubSnpCoreFields`.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error("ss{ss_id}: invalid {field}: {source}")]
        Orientation {
            ss_id: u64,
            field: &'static str,
            source: conversion::Error,
        },
        #[error("ss{ss_id}: invalid contig region: {source}")]
        ContigRegion {
            ss_id: u64,
            source: super::region::Error,
        },
        #[error("ss{ss_id}: invalid chromosome region: {source}")]
        ChromosomeRegion {
            ss_id: u64,
            source: super::region::Error,
        },
        #[error("ss{ss_id}: {field} must be non-negative, got {value}")]
        NegativeHgvsCoordinate {
            ss_id: u64,
            field: &'static str,
            value: i64,
        },
    }
}

impl TryFrom<SubSnpRow> for SubSnpCoreFields {
    type Error = subsnp_row::Error;

    fn try_from(row: SubSnpRow) -> Result<Self, Self::Error> {
        let ss_id = row.ss_id;
        let orientation = |field: &'static str, value: i64| {
            Orientation::try_from(value).map_err(|source| subsnp_row::Error::Orientation {
                ss_id,
                field,
                source,
            })
        };
        let hgvs_coordinate = |field: &'static str, value: Option<i64>| {
            value
                .map(|value| {
                    u64::try_from(value).map_err(|_| subsnp_row::Error::NegativeHgvsCoordinate {
                        ss_id,
                        field,
                        value,
                    })
                })
                .transpose()
        };

        let contig_region = Region::from_signed(row.contig_name, row.contig_start, row.contig_end)
            .map_err(|source| subsnp_row::Error::ContigRegion { ss_id, source })?;
        // Negative chromosome coordinates are an error even without a name.
        let chromosome_region = Region::from_signed(
            row.chromosome.clone().unwrap_or_default(),
            row.chromosome_start,
            row.chromosome_end,
        )
        .map_err(|source| subsnp_row::Error::ChromosomeRegion { ss_id, source })?;
        let chromosome_region = row.chromosome.map(|_| chromosome_region);

        let locus_type = row.locus_type.unwrap_or_else(|| {
            let reference = if row.hgvs_c_string.is_some() {
                row.reference_c.as_deref()
            } else {
                row.reference_t.as_deref()
            };
            LocusType::classify(
                &trimmed_allele(reference),
                &trimmed_allele(row.alternate.as_deref()),
            )
        });

        Ok(SubSnpCoreFields {
            ss_id,
            rs_id: row.rs_id,
            subsnp_orientation: orientation("subsnp_orientation", row.subsnp_orientation)?,
            snp_orientation: orientation("snp_orientation", row.snp_orientation)?,
            contig_orientation: orientation("contig_orientation", row.contig_orientation)?,
            contig_region,
            chromosome_region,
            locus_type,
            hgvs_c_reference: row.reference_c,
            hgvs_t_reference: row.reference_t,
            alternate: row.alternate,
            alleles: row.alleles,
            hgvs_c_string: row.hgvs_c_string,
            hgvs_c_start: hgvs_coordinate("hgvs_c_start", row.hgvs_c_start)?,
            hgvs_c_stop: hgvs_coordinate("hgvs_c_stop", row.hgvs_c_stop)?,
            hgvs_c_orientation: orientation("hgvs_c_orientation", row.hgvs_c_orientation)?,
            hgvs_t_string: row.hgvs_t_string,
            hgvs_t_start: hgvs_coordinate("hgvs_t_start", row.hgvs_t_start)?,
            hgvs_t_stop: hgvs_coordinate("hgvs_t_stop", row.hgvs_t_stop)?,
            hgvs_t_orientation: orientation("hgvs_t_orientation", row.hgvs_t_orientation)?,
            genotypes: row.genotypes_string,
            frequencies: row.freq_info,
            batch: row.batch,
        })
    }
}

/// Raw genotype row, one line per SubSNP and batch.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SubSnpGenotypeRow {
    pub batch_id: u64,
    pub loc_batch_id: String,
    pub ss_id: u64,
    pub genotypes_string: Option<String>,
}

/// Genotypes of all samples of a batch for one SubSNP.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "SubSnpGenotypeRow")]
pub struct SubSnpGenotype {
    /// Numeric batch identifier.
    pub batch_id: u64,
    /// Submitter's batch (study) identifier.
    pub loc_batch_id: String,
    /// The `ss` identifier.
    pub ss_id: u64,
    /// One raw genotype per sample, e.g., `"A/G"`.
    pub genotypes: Vec<String>,
}

impl SubSnpGenotype {
    /// Split the comma-separated `genotypes` string.  A missing or blank
    /// string gives no genotypes at all.
    pub fn new<S: Into<String>>(
        batch_id: u64,
        loc_batch_id: S,
        ss_id: u64,
        genotypes: Option<&str>,
    ) -> Self {
        let genotypes = match genotypes.map(str::trim) {
            None | Some("") => Vec::new(),
            Some(genotypes) => genotypes.split(',').map(|g| g.trim().to_string()).collect(),
        };
        Self {
            batch_id,
            loc_batch_id: loc_batch_id.into(),
            ss_id,
            genotypes,
        }
    }
}

impl From<SubSnpGenotypeRow> for SubSnpGenotype {
    fn from(row: SubSnpGenotypeRow) -> Self {
        Self::new(
            row.batch_id,
            row.loc_batch_id,
            row.ss_id,
            row.genotypes_string.as_deref(),
        )
    }
}
