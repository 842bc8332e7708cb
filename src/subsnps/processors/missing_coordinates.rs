//! Drop records that cannot be placed.

use crate::subsnps::model::SubSnpCoreFields;

/// Keep `record` if its contig or its chromosome region has both start and
/// end.
pub fn process(record: SubSnpCoreFields) -> Option<SubSnpCoreFields> {
    let chromosome_placed = record
        .chromosome_region
        .as_ref()
        .is_some_and(|region| region.has_coordinates());
    if record.contig_region.has_coordinates() || chromosome_placed {
        Some(record)
    } else {
        tracing::debug!(
            "ss{} filtered out, missing contig and chromosome coordinates",
            record.ss_id
        );
        None
    }
}
