//! Rename RefSeq contigs to their GenBank accession.

use crate::subsnps::contig::ContigMapping;
use crate::subsnps::model::SubSnpCoreFields;

/// Rename the contig of `record` to GenBank if the record is not placed on a
/// chromosome.
///
/// Records whose chromosome region has a start and records on contigs
/// unknown to `mapping` are returned unchanged.
pub fn process(record: SubSnpCoreFields, mapping: &ContigMapping) -> SubSnpCoreFields {
    if record.is_on_chromosome() {
        return record;
    }

    match mapping.lookup(record.contig_region.name()) {
        Some(genbank) => {
            tracing::trace!(
                "ss{}: renaming contig {} to {}",
                record.ss_id,
                record.contig_region.name(),
                genbank
            );
            SubSnpCoreFields {
                contig_region: record.contig_region.renamed(genbank),
                ..record
            }
        }
        None => record,
    }
}
