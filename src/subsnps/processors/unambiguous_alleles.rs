//! Drop records with ambiguity codes in their alleles.

use crate::subsnps::model::SubSnpCoreFields;

fn is_unambiguous(allele: &str) -> bool {
    allele
        .bytes()
        .all(|b| matches!(b, b'A' | b'C' | b'G' | b'T' | b'a' | b'c' | b'g' | b't'))
}

/// Keep `record` if its forward reference and alternate consist of `ACGT`
/// only (in any case) or are empty.
///
/// Records without HGVS context are dropped as well.
pub fn process(record: SubSnpCoreFields) -> Option<SubSnpCoreFields> {
    let (reference, alternate) = match (
        record.reference_in_forward_strand(),
        record.alternate_in_forward_strand(),
    ) {
        (Ok(reference), Ok(alternate)) => (reference, alternate),
        (Err(e), _) | (_, Err(e)) => {
            tracing::debug!("ss{} filtered out: {}", record.ss_id, e);
            return None;
        }
    };

    if is_unambiguous(&reference) && is_unambiguous(&alternate) {
        Some(record)
    } else {
        tracing::debug!(
            "ss{} filtered out, ambiguous alleles {:?}/{:?}",
            record.ss_id,
            reference,
            alternate
        );
        None
    }
}
