//! Check reference alleles against the reference assembly.

use crate::subsnps::coords::variant_coordinates;
use crate::subsnps::model::SubSnpCoreFields;
use crate::subsnps::sequence::SequenceReader;

/// Keep `record` if its forward reference allele matches the assembly at
/// the variant coordinates.
///
/// The comparison ignores case.  Insertions (empty reference) only need
/// their sequence to exist.  Records without HGVS context and regions that
/// cannot be read from `reader` are dropped.
pub fn process(
    record: SubSnpCoreFields,
    reader: &dyn SequenceReader,
) -> Result<Option<SubSnpCoreFields>, variant_coordinates::Error> {
    let coordinates = match record.variant_coordinates() {
        Ok(coordinates) => coordinates,
        Err(variant_coordinates::Error::ForwardStrand(e)) => {
            tracing::debug!("ss{} filtered out: {}", record.ss_id, e);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    if coordinates.reference.is_empty() {
        if reader.contains(&coordinates.chromosome) {
            return Ok(Some(record));
        }
        tracing::warn!(
            "ss{} filtered out, sequence {} not found in reference",
            record.ss_id,
            coordinates.chromosome
        );
        return Ok(None);
    }

    match reader.get_sequence(&coordinates.chromosome, coordinates.start, coordinates.end) {
        Ok(sequence) if sequence.eq_ignore_ascii_case(&coordinates.reference) => Ok(Some(record)),
        Ok(sequence) => {
            tracing::warn!(
                "ss{} filtered out, reference is {} in {}:{}-{} but the variant has {}",
                record.ss_id,
                sequence,
                coordinates.chromosome,
                coordinates.start,
                coordinates.end,
                coordinates.reference
            );
            Ok(None)
        }
        Err(e) => {
            tracing::warn!(
                "ss{} filtered out, region {}:{}-{} cannot be read from reference: {}",
                record.ss_id,
                coordinates.chromosome,
                coordinates.start,
                coordinates.end,
                e
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod test {
    use crate::subsnps::model::test::snv;
    use crate::subsnps::model::{LocusType, Region, SubSnpCoreFields};
    use crate::subsnps::orientation::Orientation;
    use crate::subsnps::sequence::FastaSequenceReader;

    #[rstest::fixture]
    fn reader() -> FastaSequenceReader {
        FastaSequenceReader::from_records([
            ("22", "ACGTACGTTGTACGATCGAT"),
            ("AADN04000814.1", "CCCCACCCC"),
            ("soft", "acgtn"),
        ])
    }

    /// Record placed on chromosome 22 with chromosome-level HGVS.
    #[allow(clippy::too_many_arguments)]
    fn on_chromosome(
        base: SubSnpCoreFields,
        locus_type: LocusType,
        start: u64,
        end: u64,
        hgvs_c_orientation: Orientation,
        reference: &str,
        alternate: Option<&str>,
    ) -> SubSnpCoreFields {
        SubSnpCoreFields {
            locus_type,
            chromosome_region: Some(Region::new("22", Some(start), Some(end)).expect("valid")),
            hgvs_c_orientation,
            hgvs_c_reference: Some(reference.into()),
            alternate: alternate.map(String::from),
            ..base
        }
    }

    #[rstest::rstest]
    #[case::snp_valid(LocusType::Snv, 4, 4, Orientation::Reverse, "A", Some("G"), true)]
    #[case::snp_invalid(LocusType::Snv, 4, 4, Orientation::Reverse, "C", Some("G"), false)]
    #[case::insertion(LocusType::Insertion, 4, 5, Orientation::Forward, "-", Some("C"), true)]
    #[case::deletion_valid(LocusType::Deletion, 10, 12, Orientation::Forward, "GTA", None, true)]
    #[case::deletion_invalid(LocusType::Deletion, 10, 12, Orientation::Forward, "GAA", None, false)]
    #[case::indel_valid(LocusType::ShorterOnContig, 5, 6, Orientation::Reverse, "GT", Some("A"), true)]
    #[case::indel_invalid(LocusType::ShorterOnContig, 5, 6, Orientation::Reverse, "TT", Some("A"), false)]
    #[case::past_end(LocusType::Snv, 30, 30, Orientation::Forward, "A", Some("G"), false)]
    #[allow(clippy::too_many_arguments)]
    fn check_on_chromosome(
        snv: SubSnpCoreFields,
        reader: FastaSequenceReader,
        #[case] locus_type: LocusType,
        #[case] start: u64,
        #[case] end: u64,
        #[case] hgvs_c_orientation: Orientation,
        #[case] reference: &str,
        #[case] alternate: Option<&str>,
        #[case] kept: bool,
    ) -> Result<(), anyhow::Error> {
        let record = on_chromosome(
            snv,
            locus_type,
            start,
            end,
            hgvs_c_orientation,
            reference,
            alternate,
        );

        assert_eq!(super::process(record, &reader)?.is_some(), kept);

        Ok(())
    }

    #[rstest::rstest]
    fn insertion_with_non_existent_contig(
        snv: SubSnpCoreFields,
        reader: FastaSequenceReader,
    ) -> Result<(), anyhow::Error> {
        let record = SubSnpCoreFields {
            locus_type: LocusType::Insertion,
            contig_region: Region::new("AADN04000815.1", Some(4), Some(5))?,
            chromosome_region: None,
            hgvs_c_reference: Some("-".into()),
            alternate: Some("C".into()),
            ..snv
        };

        assert!(super::process(record, &reader)?.is_none());

        Ok(())
    }

    #[rstest::rstest]
    fn snp_on_contig_with_reverse_hgvs_t(
        snv: SubSnpCoreFields,
        reader: FastaSequenceReader,
    ) -> Result<(), anyhow::Error> {
        // contig already renamed to GenBank, HGVS T string still names RefSeq
        let record = SubSnpCoreFields {
            contig_region: Region::new("AADN04000814.1", Some(5), Some(5))?,
            chromosome_region: None,
            hgvs_c_string: None,
            hgvs_t_string: Some("NT_455866.1:g.5T>C".into()),
            hgvs_t_orientation: Orientation::Reverse,
            hgvs_t_reference: Some("T".into()),
            alternate: Some("C".into()),
            ..snv
        };

        assert!(super::process(record, &reader)?.is_some());

        Ok(())
    }

    #[rstest::rstest]
    fn soft_masked_reference(
        snv: SubSnpCoreFields,
        reader: FastaSequenceReader,
    ) -> Result<(), anyhow::Error> {
        let record = SubSnpCoreFields {
            chromosome_region: Some(Region::new("soft", Some(2), Some(3))?),
            hgvs_c_reference: Some("CG".into()),
            ..snv
        };

        assert!(super::process(record, &reader)?.is_some());

        Ok(())
    }

    #[rstest::rstest]
    fn remove_undefined_hgvs(
        snv: SubSnpCoreFields,
        reader: FastaSequenceReader,
    ) -> Result<(), anyhow::Error> {
        let record = SubSnpCoreFields {
            hgvs_c_string: None,
            hgvs_t_string: None,
            ..snv
        };

        assert!(super::process(record, &reader)?.is_none());

        Ok(())
    }

    #[rstest::rstest]
    #[tracing_test::traced_test]
    fn mismatch_is_logged(
        snv: SubSnpCoreFields,
        reader: FastaSequenceReader,
    ) -> Result<(), anyhow::Error> {
        let record = SubSnpCoreFields {
            chromosome_region: Some(Region::new("22", Some(1), Some(1))?),
            hgvs_c_reference: Some("T".into()),
            ..snv
        };

        assert!(super::process(record, &reader)?.is_none());
        assert!(logs_contain("reference is A in 22:1-1 but the variant has T"));

        Ok(())
    }

    #[rstest::rstest]
    fn fail_without_start(snv: SubSnpCoreFields, reader: FastaSequenceReader) {
        let record = SubSnpCoreFields {
            contig_region: Region::named("22"),
            chromosome_region: None,
            ..snv
        };

        assert!(super::process(record, &reader).is_err());
    }
}
