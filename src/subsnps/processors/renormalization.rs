//! Move ambiguous indels from right-anchored to left-anchored form.
//!
//! dbSNP drops the base before an indel as context.  When the last base of
//! the inserted or deleted sequence equals that context base, the indel can
//! equally be placed one base to the left.  Such variants are shifted and
//! their allele is rotated so that the last base comes first, e.g. with `C`
//! at position 6 the insertion `7: "" > "CC"` is kept as `6: "" > "CC"` and
//! `7: "" > "GC"` (context `C`) becomes `6: "" > "CG"`.

use crate::subsnps::sequence::SequenceReader;
use crate::subsnps::stats::VariantStatistics;
use crate::subsnps::variant::Variant;

/// Attribute set on renormalized variants.
pub const AMBIGUOUS_KEY: &str = "ambiguous";
/// Attribute with the original start of a renormalized variant.
pub const START_KEY: &str = "start";
/// Attribute with the original reference of a renormalized variant.
pub const REFERENCE_KEY: &str = "ref";
/// Attribute with the original alternate of a renormalized variant.
pub const ALTERNATE_KEY: &str = "alt";

fn is_ambiguous(variant: &Variant, reader: &dyn SequenceReader) -> bool {
    if !variant.is_indel() || (variant.reference.is_empty() == variant.alternate.is_empty()) {
        return false;
    }
    let allele = if variant.reference.is_empty() {
        &variant.alternate
    } else {
        &variant.reference
    };
    let Some(last) = allele.chars().last() else {
        return false;
    };
    let Some(context_pos) = variant.start.checked_sub(1).filter(|&pos| pos > 0) else {
        return false;
    };

    match reader.get_sequence(&variant.chromosome, context_pos, context_pos) {
        Ok(context) => context
            .chars()
            .next()
            .is_some_and(|base| base.eq_ignore_ascii_case(&last)),
        Err(e) => {
            tracing::warn!(
                "cannot read context base of {}:{}, leaving variant as is: {}",
                variant.chromosome,
                variant.start,
                e
            );
            false
        }
    }
}

/// Move the last base of `allele` to the front.
fn rotate(allele: &str) -> String {
    match allele.char_indices().last() {
        Some((i, last)) => format!("{}{}", last, &allele[..i]),
        None => String::new(),
    }
}

/// Renormalize `variant` if it is an ambiguous indel, otherwise return it
/// unchanged.
///
/// The original start and alleles are kept in the attributes, statistics
/// follow the new alleles.
pub fn process(variant: Variant, reader: &dyn SequenceReader) -> Variant {
    if !is_ambiguous(&variant, reader) {
        return variant;
    }

    let (reference, alternate) = if variant.reference.is_empty() {
        (String::new(), rotate(&variant.alternate))
    } else {
        (rotate(&variant.reference), String::new())
    };
    tracing::trace!(
        "renormalizing {}:{} {:?}>{:?} to {}:{} {:?}>{:?}",
        variant.chromosome,
        variant.start,
        variant.reference,
        variant.alternate,
        variant.chromosome,
        variant.start - 1,
        reference,
        alternate
    );

    let statistics = variant
        .statistics
        .iter()
        .map(|(population, stats)| {
            let maf_allele = if stats.maf_allele == stats.reference {
                reference.clone()
            } else if stats.maf_allele == stats.alternate {
                alternate.clone()
            } else {
                stats.maf_allele.clone()
            };
            (
                population.clone(),
                VariantStatistics {
                    reference: reference.clone(),
                    alternate: alternate.clone(),
                    maf: stats.maf,
                    maf_allele,
                },
            )
        })
        .collect();

    let mut attributes = variant.attributes.clone();
    attributes.insert(AMBIGUOUS_KEY.to_string(), "true".to_string());
    attributes.insert(START_KEY.to_string(), variant.start.to_string());
    attributes.insert(REFERENCE_KEY.to_string(), variant.reference.clone());
    attributes.insert(ALTERNATE_KEY.to_string(), variant.alternate.clone());

    Variant {
        start: variant.start - 1,
        end: variant.end - 1,
        reference,
        alternate,
        attributes,
        statistics,
        ..variant
    }
}
