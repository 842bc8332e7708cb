//! Resolution of SubSNP alleles on the forward strand.
//!
//! The reference and alternate allele are given relative to one of two HGVS
//! contexts (chromosome-level "C" and contig-level "T").  The full allele list
//! is given relative to the SubSNP and has to be flipped according to the
//! composition of the SubSNP, RefSNP and contig orientations.

use super::model::SubSnpCoreFields;
use super::orientation::{reverse_complement, trimmed_allele, Orientation};

/// Supporting code for the forward strand mapping.
pub(crate) mod forward_strand {
    /// Error type for mapping alleles to the forward strand.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error("ss{0}: neither the HGVS C nor the HGVS T string is defined")]
        MissingHgvsContext(u64),
    }
}

/// Reference, alternate and all other alleles of a SubSNP on the forward
/// strand.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ForwardAlleles {
    /// Reference allele, empty for insertions.
    pub reference: String,
    /// Alternate allele, empty for deletions.
    pub alternate: String,
    /// All submitted alleles, in submission order.
    pub alleles: Vec<String>,
    /// Alleles other than the reference and alternate.
    pub secondary_alternates: Vec<String>,
}

impl SubSnpCoreFields {
    /// The reference allele and orientation of the applicable HGVS context.
    ///
    /// The chromosome-level context is preferred over the contig-level one.
    fn hgvs_context(&self) -> Result<(Option<&str>, Orientation), forward_strand::Error> {
        if self.hgvs_c_string.is_some() {
            Ok((self.hgvs_c_reference.as_deref(), self.hgvs_c_orientation))
        } else if self.hgvs_t_string.is_some() {
            Ok((self.hgvs_t_reference.as_deref(), self.hgvs_t_orientation))
        } else {
            Err(forward_strand::Error::MissingHgvsContext(self.ss_id))
        }
    }

    /// Reference allele on the forward strand.
    pub fn reference_in_forward_strand(&self) -> Result<String, forward_strand::Error> {
        let (reference, orientation) = self.hgvs_context()?;
        Ok(to_forward_strand(reference, orientation))
    }

    /// Alternate allele on the forward strand.
    ///
    /// The alternate is always given relative to the same HGVS context as the
    /// reference.
    pub fn alternate_in_forward_strand(&self) -> Result<String, forward_strand::Error> {
        let (_, orientation) = self.hgvs_context()?;
        Ok(to_forward_strand(self.alternate.as_deref(), orientation))
    }

    /// All submitted alleles on the forward strand.
    ///
    /// Empty fields are kept so that positions in the list still correspond
    /// to the submission.
    pub fn alleles_in_forward_strand(&self) -> Vec<String> {
        let alleles = match self.allele_orientation() {
            Orientation::Forward => self.alleles.clone(),
            Orientation::Reverse => reverse_complement(&self.alleles),
        };
        alleles
            .split('/')
            .map(|allele| trimmed_allele(Some(allele)))
            .collect()
    }

    /// All submitted alleles on the forward strand, joined by `/`.
    pub fn alleles_string_in_forward_strand(&self) -> String {
        self.alleles_in_forward_strand().join("/")
    }

    /// Alleles that are neither the forward reference nor the forward
    /// alternate, in submission order.
    pub fn secondary_alternates_in_forward_strand(
        &self,
    ) -> Result<Vec<String>, forward_strand::Error> {
        Ok(self.forward_alleles()?.secondary_alternates)
    }

    /// Resolve all alleles on the forward strand at once.
    pub fn forward_alleles(&self) -> Result<ForwardAlleles, forward_strand::Error> {
        let reference = self.reference_in_forward_strand()?;
        let alternate = self.alternate_in_forward_strand()?;
        let alleles = self.alleles_in_forward_strand();
        let secondary_alternates = alleles
            .iter()
            .filter(|allele| **allele != reference && **allele != alternate)
            .cloned()
            .collect();

        Ok(ForwardAlleles {
            reference,
            alternate,
            alleles,
            secondary_alternates,
        })
    }
}

fn to_forward_strand(allele: Option<&str>, orientation: Orientation) -> String {
    match (allele, orientation) {
        (Some(allele), Orientation::Reverse) => trimmed_allele(Some(&reverse_complement(allele))),
        (allele, _) => trimmed_allele(allele),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::forward_strand;
    use crate::subsnps::model::test::snv;
    use crate::subsnps::model::SubSnpCoreFields;
    use crate::subsnps::orientation::Orientation;

    /// Variation of `snv` with the given alleles and HGVS orientations.
    fn with_alleles(
        base: &SubSnpCoreFields,
        reference: Option<&str>,
        alternate: Option<&str>,
        alleles: &str,
        hgvs_c_orientation: Orientation,
        hgvs_t_orientation: Orientation,
    ) -> SubSnpCoreFields {
        SubSnpCoreFields {
            hgvs_c_reference: reference.map(String::from),
            hgvs_t_reference: reference.map(String::from),
            alternate: alternate.map(String::from),
            alleles: alleles.into(),
            hgvs_c_orientation,
            hgvs_t_orientation,
            ..base.clone()
        }
    }

    #[rstest::rstest]
    // snp
    #[case(Some("T"), Some("A"), "T", "A")]
    // insertion with bases in both alleles
    #[case(Some("T"), Some("TAGA"), "T", "TAGA")]
    // insertion with dash or missing reference
    #[case(Some("-"), Some("TA"), "", "TA")]
    #[case(None, Some("TA"), "", "TA")]
    // deletion with bases in both alleles
    #[case(Some("TAGA"), Some("T"), "TAGA", "T")]
    // deletion with dash or missing alternate
    #[case(Some("TA"), Some("-"), "TA", "")]
    #[case(Some("TA"), None, "TA", "")]
    fn forward_strand_must_not_change(
        snv: SubSnpCoreFields,
        #[case] reference: Option<&str>,
        #[case] alternate: Option<&str>,
        #[case] expected_reference: &str,
        #[case] expected_alternate: &str,
    ) -> Result<(), anyhow::Error> {
        let record = with_alleles(
            &snv,
            reference,
            alternate,
            "T/A",
            Orientation::Forward,
            Orientation::Forward,
        );

        assert_eq!(record.reference_in_forward_strand()?, expected_reference);
        assert_eq!(record.alternate_in_forward_strand()?, expected_alternate);

        Ok(())
    }

    #[rstest::rstest]
    fn forward_strand_without_hgvs_c(snv: SubSnpCoreFields) -> Result<(), anyhow::Error> {
        let record = SubSnpCoreFields {
            hgvs_c_string: None,
            hgvs_c_reference: None,
            ..snv
        };

        assert_eq!(record.reference_in_forward_strand()?, "T");
        assert_eq!(record.alternate_in_forward_strand()?, "A");

        Ok(())
    }

    #[rstest::rstest]
    #[case(Some("T"), Some("TAGA"), "A", "TCTA")]
    #[case(Some("-"), Some("G"), "", "C")]
    #[case(None, Some("G"), "", "C")]
    #[case(Some("TAGA"), Some("-"), "TCTA", "")]
    fn hgvs_c_reverse_must_change(
        snv: SubSnpCoreFields,
        #[case] reference: Option<&str>,
        #[case] alternate: Option<&str>,
        #[case] expected_reference: &str,
        #[case] expected_alternate: &str,
    ) -> Result<(), anyhow::Error> {
        let record = with_alleles(
            &snv,
            reference,
            alternate,
            "T/A",
            Orientation::Reverse,
            Orientation::Forward,
        );

        assert_eq!(record.reference_in_forward_strand()?, expected_reference);
        assert_eq!(record.alternate_in_forward_strand()?, expected_alternate);

        Ok(())
    }

    #[rstest::rstest]
    fn hgvs_t_orientation_used_without_hgvs_c(snv: SubSnpCoreFields) -> Result<(), anyhow::Error> {
        let record = SubSnpCoreFields {
            hgvs_c_string: None,
            ..with_alleles(
                &snv,
                Some("T"),
                Some("TAGA"),
                "T/TAGA",
                Orientation::Forward,
                Orientation::Reverse,
            )
        };

        assert_eq!(record.reference_in_forward_strand()?, "A");
        assert_eq!(record.alternate_in_forward_strand()?, "TCTA");

        Ok(())
    }

    #[rstest::rstest]
    fn missing_hgvs_context(snv: SubSnpCoreFields) {
        let record = SubSnpCoreFields {
            hgvs_c_string: None,
            hgvs_t_string: None,
            ..snv
        };

        assert_eq!(
            record.reference_in_forward_strand(),
            Err(forward_strand::Error::MissingHgvsContext(1766472))
        );
        assert!(record.alternate_in_forward_strand().is_err());
        assert!(record.forward_alleles().is_err());
        // the allele list does not depend on the HGVS context
        assert_eq!(record.alleles_string_in_forward_strand(), "T/A");
    }

    #[rstest::rstest]
    #[case(Orientation::Forward, Orientation::Forward, Orientation::Forward, "G/A")]
    #[case(Orientation::Reverse, Orientation::Forward, Orientation::Forward, "T/C")]
    #[case(Orientation::Forward, Orientation::Reverse, Orientation::Forward, "T/C")]
    #[case(Orientation::Forward, Orientation::Forward, Orientation::Reverse, "T/C")]
    #[case(Orientation::Reverse, Orientation::Reverse, Orientation::Forward, "G/A")]
    #[case(Orientation::Reverse, Orientation::Forward, Orientation::Reverse, "G/A")]
    #[case(Orientation::Forward, Orientation::Reverse, Orientation::Reverse, "G/A")]
    #[case(Orientation::Reverse, Orientation::Reverse, Orientation::Reverse, "T/C")]
    fn alleles_in_forward_strand(
        snv: SubSnpCoreFields,
        #[case] subsnp_orientation: Orientation,
        #[case] snp_orientation: Orientation,
        #[case] contig_orientation: Orientation,
        #[case] expected: &str,
    ) {
        let record = SubSnpCoreFields {
            subsnp_orientation,
            snp_orientation,
            contig_orientation,
            alleles: "G/A".into(),
            ..snv
        };

        assert_eq!(record.alleles_string_in_forward_strand(), expected);
    }

    #[rstest::rstest]
    fn multi_base_alleles_reversed_as_a_whole(snv: SubSnpCoreFields) {
        let record = SubSnpCoreFields {
            subsnp_orientation: Orientation::Reverse,
            alleles: "GGA/CCCT".into(),
            ..snv
        };

        assert_eq!(record.alleles_in_forward_strand(), vec!["AGGG", "TCC"]);
    }

    #[rstest::rstest]
    fn empty_alleles_are_kept(snv: SubSnpCoreFields) {
        let record = SubSnpCoreFields {
            subsnp_orientation: Orientation::Reverse,
            alleles: "-/AT//G".into(),
            ..snv
        };

        assert_eq!(record.alleles_in_forward_strand(), vec!["C", "", "AT", ""]);
    }

    #[rstest::rstest]
    fn secondary_alternates(snv: SubSnpCoreFields) -> Result<(), anyhow::Error> {
        // SubSNP is reverse, HGVS is forward: "TAC/A/CC" becomes "GG/T/GTA"
        let record = SubSnpCoreFields {
            subsnp_orientation: Orientation::Reverse,
            hgvs_c_reference: Some("GTA".into()),
            alternate: Some("T".into()),
            alleles: "TAC/A/CC".into(),
            ..snv
        };

        let alleles = record.forward_alleles()?;
        assert_eq!(alleles.reference, "GTA");
        assert_eq!(alleles.alternate, "T");
        assert_eq!(alleles.alleles, vec!["GG", "T", "GTA"]);
        assert_eq!(alleles.secondary_alternates, vec!["GG"]);
        assert_eq!(record.secondary_alternates_in_forward_strand()?, vec!["GG"]);

        Ok(())
    }

    #[rstest::rstest]
    fn secondary_alternates_by_value_not_position(
        snv: SubSnpCoreFields,
    ) -> Result<(), anyhow::Error> {
        let record = SubSnpCoreFields {
            alleles: "G/A/T/C".into(),
            ..snv
        };

        assert_eq!(record.secondary_alternates_in_forward_strand()?, vec!["G", "C"]);

        Ok(())
    }
}
