//! Drop records whose reference and alternate are not among the submitted
//! alleles.

use crate::subsnps::model::SubSnpCoreFields;

/// Keep `record` if the forward reference is one of the forward alleles and
/// the forward alternate is another one of them.
pub fn process(record: SubSnpCoreFields) -> Option<SubSnpCoreFields> {
    let forward = match record.forward_alleles() {
        Ok(forward) => forward,
        Err(e) => {
            tracing::debug!("ss{} filtered out: {}", record.ss_id, e);
            return None;
        }
    };

    let Some(reference_index) = forward
        .alleles
        .iter()
        .position(|allele| *allele == forward.reference)
    else {
        tracing::debug!(
            "ss{} filtered out, reference {:?} not in alleles {:?}",
            record.ss_id,
            forward.reference,
            forward.alleles
        );
        return None;
    };

    let alternate_matches = forward
        .alleles
        .iter()
        .enumerate()
        .any(|(i, allele)| i != reference_index && *allele == forward.alternate);
    if alternate_matches {
        Some(record)
    } else {
        tracing::debug!(
            "ss{} filtered out, alternate {:?} not in alleles {:?}",
            record.ss_id,
            forward.alternate,
            forward.alleles
        );
        None
    }
}
