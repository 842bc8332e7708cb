//! Construction of normalized variants from SubSNP records.

use indexmap::IndexMap;

use super::model::{LocusType, SubSnpCoreFields};
use super::orientation::normalized_allele;
use super::stats::{self, VariantStatistics};

/// Attribute with the dbSNP build the variant was imported from.
pub const DBSNP_BUILD_KEY: &str = "dbsnp-build";

lazy_static::lazy_static! {
    /// Any character that may not appear in a raw genotype string.
    static ref INVALID_GENOTYPE: regex::Regex =
        regex::Regex::new(r"[^,./|ATCGN -]").expect("invalid regex in source code");
}

/// Genotype of one sample as indices into the allele list of a variant.
///
/// Index 0 is the reference, 1 the alternate and 2.. the secondary
/// alternates; `None` marks a missing or unknown allele.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, serde_with::SerializeDisplay, serde_with::DeserializeFromStr,
)]
pub struct GenotypeCall {
    pub alleles: Vec<Option<usize>>,
    pub phased: bool,
}

impl std::fmt::Display for GenotypeCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sep = if self.phased { "|" } else { "/" };
        for (i, allele) in self.alleles.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", sep)?;
            }
            match allele {
                Some(index) => write!(f, "{}", index)?,
                None => write!(f, ".")?,
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for GenotypeCall {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let phased = s.contains('|');
        let alleles = s
            .split(['/', '|'])
            .map(|allele| match allele {
                "." => Ok(None),
                _ => allele
                    .parse::<usize>()
                    .map(Some)
                    .map_err(|e| anyhow::anyhow!("invalid allele {:?} in {:?}: {}", allele, s, e)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alleles, phased })
    }
}

/// A normalized variant as written to the archive.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Variant {
    pub chromosome: String,
    /// 1-based start position.
    pub start: u64,
    /// 1-based inclusive end position.
    pub end: u64,
    pub reference: String,
    pub alternate: String,
    /// `rs` identifier of the cluster.
    pub main_id: Option<String>,
    /// `rs` (if any) and `ss` identifiers.
    pub dbsnp_ids: Vec<String>,
    pub study_id: Option<String>,
    pub file_id: Option<String>,
    pub secondary_alternates: Vec<String>,
    /// One call per sample, in sample order.
    pub genotypes: Vec<GenotypeCall>,
    pub attributes: IndexMap<String, String>,
    /// Statistics by population name.
    pub statistics: IndexMap<String, VariantStatistics>,
}

impl Variant {
    /// A variant with the given position and alleles and nothing else.
    pub fn new<C, R, A>(chromosome: C, start: u64, end: u64, reference: R, alternate: A) -> Self
    where
        C: Into<String>,
        R: Into<String>,
        A: Into<String>,
    {
        Self {
            chromosome: chromosome.into(),
            start,
            end,
            reference: reference.into(),
            alternate: alternate.into(),
            main_id: None,
            dbsnp_ids: Vec::new(),
            study_id: None,
            file_id: None,
            secondary_alternates: Vec::new(),
            genotypes: Vec::new(),
            attributes: IndexMap::new(),
            statistics: IndexMap::new(),
        }
    }

    /// Whether reference and alternate differ in length.
    pub fn is_indel(&self) -> bool {
        self.reference.len() != self.alternate.len()
    }

    /// Whether `allele` is the reference, the alternate or a secondary
    /// alternate.
    pub fn has_allele(&self, allele: &str) -> bool {
        self.reference == allele
            || self.alternate == allele
            || self.secondary_alternates.iter().any(|s| s == allele)
    }

    /// Reference, alternate and secondary alternates in genotype index order.
    pub fn alleles(&self) -> Vec<&str> {
        [self.reference.as_str(), self.alternate.as_str()]
            .into_iter()
            .chain(self.secondary_alternates.iter().map(String::as_str))
            .collect()
    }

    /// Drop the leading bases that all alleles share and move `start` past
    /// them.
    ///
    /// Nothing happens if any allele is empty.  An allele may become empty,
    /// the variant then follows the insertion/deletion conventions.  Genotype
    /// indices are unchanged, statistics alleles lose the same prefix.
    pub fn trim_shared_prefix(self) -> Self {
        let alleles = self.alleles();
        let Some(min_len) = alleles.iter().map(|allele| allele.len()).min() else {
            return self;
        };
        let first = alleles[0].as_bytes();
        let shared = (0..min_len)
            .take_while(|&i| {
                alleles
                    .iter()
                    .all(|allele| allele.as_bytes()[i] == first[i])
            })
            .count();
        if shared == 0 {
            return self;
        }

        let trim = |allele: &str| {
            allele
                .get(shared..)
                .filter(|_| allele.as_bytes().starts_with(&first[..shared]))
                .unwrap_or(allele)
                .to_string()
        };
        let mut trimmed = alleles
            .iter()
            .map(|allele| trim(allele))
            .collect::<Vec<_>>()
            .into_iter();
        let statistics = self
            .statistics
            .iter()
            .map(|(population, stats)| {
                (
                    population.clone(),
                    VariantStatistics {
                        reference: trim(&stats.reference),
                        alternate: trim(&stats.alternate),
                        maf: stats.maf,
                        maf_allele: trim(&stats.maf_allele),
                    },
                )
            })
            .collect();

        let start = self.start + shared as u64;
        let reference = trimmed.next().unwrap_or_default();
        let alternate = trimmed.next().unwrap_or_default();
        let end = if reference.is_empty() {
            start + alternate.len().max(1) as u64 - 1
        } else {
            self.end
        };
        Self {
            start,
            end,
            reference,
            alternate,
            secondary_alternates: trimmed.collect(),
            statistics,
            ..self
        }
    }
}

/// Supporting code for `build`.
pub(crate) mod builder {
    /// Error type for building a variant.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error(transparent)]
        Coordinates(#[from] crate::subsnps::coords::variant_coordinates::Error),
        #[error(transparent)]
        ForwardStrand(#[from] crate::subsnps::alleles::forward_strand::Error),
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |value| value.trim().is_empty())
}

/// Decode the comma-separated genotypes of a SubSNP.
///
/// Each token holds the raw alleles of one sample, separated by `/` or by
/// `|` for phased genotypes.  Alleles are brought to the forward strand
/// and looked up in `alleles`.  Bases not found are missing, but `None` is
/// returned if an allele with other symbols than A, C, G, T (such as `N`)
/// is not found.
pub fn decode_genotypes(
    genotypes: &str,
    alleles: &[&str],
    orientation: crate::subsnps::orientation::Orientation,
) -> Option<Vec<GenotypeCall>> {
    genotypes
        .split(',')
        .map(|token| {
            let calls = token
                .split(['/', '|'])
                .map(|allele| match allele.trim() {
                    "." => Some(None),
                    allele => {
                        let allele = normalized_allele(allele, orientation);
                        match alleles.iter().position(|a| *a == allele) {
                            Some(index) => Some(Some(index)),
                            None if allele.bytes().all(|b| b"ACGT".contains(&b)) => Some(None),
                            None => None,
                        }
                    }
                })
                .collect::<Option<Vec<_>>>()?;
            Some(GenotypeCall {
                phased: token.contains('|'),
                alleles: calls,
            })
        })
        .collect()
}

/// Build the variant for a SubSNP that passed all filters.
///
/// `Ok(None)` means the record was dropped: it has neither genotypes nor
/// frequencies, its genotypes contain invalid characters or unknown
/// ambiguous alleles, or its frequencies do not match its alleles.
pub fn build(
    record: &SubSnpCoreFields,
    dbsnp_build: u32,
) -> Result<Option<Variant>, builder::Error> {
    let genotypes = record.genotypes.as_deref();
    let frequencies = record.frequencies.as_deref();
    if is_blank(genotypes) && is_blank(frequencies) {
        tracing::debug!(
            "ss{} filtered out, neither genotypes nor frequencies given",
            record.ss_id
        );
        return Ok(None);
    }
    if let Some(genotypes) = genotypes.filter(|g| !g.trim().is_empty()) {
        if INVALID_GENOTYPE.is_match(genotypes) {
            tracing::debug!(
                "ss{} filtered out, genotypes {:?} contain bases other than A, C, G, T, N",
                record.ss_id,
                genotypes
            );
            return Ok(None);
        }
    }

    let coordinates = record.variant_coordinates()?;
    let forward = record.forward_alleles()?;
    let orientation = record.allele_orientation();

    let mut variant = Variant::new(
        coordinates.chromosome,
        coordinates.start,
        coordinates.end,
        coordinates.reference,
        coordinates.alternate,
    );
    if let Some(rs_id) = record.rs_id {
        let rs_id = format!("rs{}", rs_id);
        variant.main_id = Some(rs_id.clone());
        variant.dbsnp_ids.push(rs_id);
    }
    variant.dbsnp_ids.push(format!("ss{}", record.ss_id));
    variant.study_id = record.batch.clone();
    variant.file_id = record.batch.clone();
    variant.secondary_alternates = forward.secondary_alternates;
    variant
        .attributes
        .insert(DBSNP_BUILD_KEY.to_string(), dbsnp_build.to_string());

    if let Some(genotypes) = genotypes.filter(|g| !g.trim().is_empty()) {
        match decode_genotypes(genotypes, &variant.alleles(), orientation) {
            Some(calls) => variant.genotypes = calls,
            None => {
                tracing::debug!(
                    "ss{} filtered out, genotypes {:?} name alleles other than {:?}",
                    record.ss_id,
                    genotypes,
                    variant.alleles()
                );
                return Ok(None);
            }
        }
    }

    match stats::build(&variant, frequencies, orientation) {
        Ok(Some(statistics)) => {
            for (population, stats) in &statistics {
                variant
                    .attributes
                    .insert(format!("{}_maf", population), stats.maf.to_string());
            }
            variant.statistics = statistics;
        }
        Ok(None) => (),
        Err(e) => {
            tracing::warn!("ss{} filtered out: {}", record.ss_id, e);
            return Ok(None);
        }
    }

    if matches!(
        record.locus_type,
        LocusType::LongerOnContig | LocusType::ShorterOnContig
    ) {
        variant = variant.trim_shared_prefix();
    }

    Ok(Some(variant))
}
