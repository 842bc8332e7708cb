//! Translation of SubSNP placements into variant coordinates.

use super::model::{LocusType, Region, SubSnpCoreFields};

/// Position and forward-strand alleles of a variant.
///
/// This is the part of a variant that identifies it, coordinates are 1-based
/// and inclusive.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, derive_new::new,
)]
pub struct VariantCoordinates {
    /// Name of the chromosome, or of the contig if not mapped to one.
    pub chromosome: String,
    /// First affected position.
    pub start: u64,
    /// Last affected position.
    pub end: u64,
    /// Reference allele on the forward strand.
    pub reference: String,
    /// Alternate allele on the forward strand.
    pub alternate: String,
}

/// Supporting code for `VariantCoordinates`.
pub(crate) mod variant_coordinates {
    /// Error type for computing variant coordinates.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error(transparent)]
        ForwardStrand(#[from] crate::subsnps::alleles::forward_strand::Error),
        #[error("ss{ss_id}: region {region} has no start position")]
        MissingStart { ss_id: u64, region: String },
    }
}

impl SubSnpCoreFields {
    /// Whether the variant is placed on the chromosome, i.e. the chromosome
    /// region has a start.
    pub fn is_on_chromosome(&self) -> bool {
        self.chromosome_region
            .as_ref()
            .is_some_and(|region| region.start().is_some())
    }

    /// The region the variant is placed on.
    ///
    /// The chromosome is used if the SubSNP has chromosome coordinates,
    /// otherwise the contig.
    pub fn variant_region(&self) -> &Region {
        match &self.chromosome_region {
            Some(region) if self.is_on_chromosome() => region,
            _ => &self.contig_region,
        }
    }

    /// Normalized coordinates and forward-strand alleles of the variant.
    ///
    /// dbSNP places insertions between the two flanking bases; here the
    /// start is moved to the first inserted base and the end to the last.
    pub fn variant_coordinates(&self) -> Result<VariantCoordinates, variant_coordinates::Error> {
        let reference = self.reference_in_forward_strand()?;
        let alternate = self.alternate_in_forward_strand()?;

        let region = self.variant_region();
        let start = region
            .start()
            .ok_or_else(|| variant_coordinates::Error::MissingStart {
                ss_id: self.ss_id,
                region: region.to_string(),
            })?;

        let (start, end) = if self.locus_type == LocusType::Insertion {
            let start = start + 1;
            (start, start + (alternate.len().max(1) as u64) - 1)
        } else {
            let end = region
                .end()
                .unwrap_or_else(|| start + (reference.len().max(1) as u64) - 1);
            (start, end)
        };

        Ok(VariantCoordinates {
            chromosome: region.name().to_string(),
            start,
            end,
            reference,
            alternate,
        })
    }
}
