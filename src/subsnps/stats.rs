//! Per-population allele frequency statistics.

use indexmap::IndexMap;

use super::orientation::{normalized_allele, Orientation};
use super::variant::Variant;

/// Frequency of one allele in one population, as reported by dbSNP.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AlleleFrequency {
    pub allele: String,
    /// dbSNP stores counts as reals.
    #[serde(rename = "cnt")]
    pub count: f64,
    #[serde(rename = "freq")]
    pub frequency: f64,
}

/// Allele frequencies of one population.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PopulationFrequencies {
    #[serde(rename = "pop_id")]
    pub population_id: u64,
    #[serde(rename = "pop_name")]
    pub population_name: String,
    #[serde(rename = "freq_info")]
    pub allele_frequencies: Vec<AlleleFrequency>,
}

/// Summary statistics of a variant in one population.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariantStatistics {
    /// Reference allele of the variant.
    pub reference: String,
    /// Alternate allele of the variant.
    pub alternate: String,
    /// Minor allele frequency.
    pub maf: f64,
    /// The allele with the minor allele frequency.
    pub maf_allele: String,
}

/// Supporting code for `build`.
pub(crate) mod statistics {
    /// Error type for building variant statistics.
    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("could not parse frequencies: {0}")]
        Parse(#[from] serde_json::Error),
        #[error("population {population} has an empty frequency list")]
        EmptyPopulation { population: String },
        #[error("variant and frequency alleles do not match: {allele:?} in population {population}")]
        AlleleMismatch { population: String, allele: String },
    }
}

/// Build the statistics of `variant` from the dbSNP frequency JSON.
///
/// `frequencies` is a JSON array of populations, alleles in it are given in
/// `orientation` and are normalized before comparing with the variant.  Every
/// allele must be the reference, the alternate or a secondary alternate of
/// the variant.  A blank input gives `None`.
///
/// The result is keyed by population name, in input order.
pub fn build(
    variant: &Variant,
    frequencies: Option<&str>,
    orientation: Orientation,
) -> Result<Option<IndexMap<String, VariantStatistics>>, statistics::Error> {
    let frequencies = match frequencies.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(frequencies) => frequencies,
    };
    let populations: Vec<PopulationFrequencies> = serde_json::from_str(frequencies)?;

    let mut result = IndexMap::new();
    for population in populations {
        let mut maf: Option<AlleleFrequency> = None;
        for allele_frequency in population.allele_frequencies {
            let allele = normalized_allele(&allele_frequency.allele, orientation);
            if !variant.has_allele(&allele) {
                return Err(statistics::Error::AlleleMismatch {
                    population: population.population_name,
                    allele,
                });
            }
            // strict comparison keeps the first allele on ties
            if maf
                .as_ref()
                .map_or(true, |maf| allele_frequency.frequency < maf.frequency)
            {
                maf = Some(AlleleFrequency {
                    allele,
                    ..allele_frequency
                });
            }
        }

        let maf = maf.ok_or_else(|| statistics::Error::EmptyPopulation {
            population: population.population_name.clone(),
        })?;
        result.insert(
            population.population_name,
            VariantStatistics {
                reference: variant.reference.clone(),
                alternate: variant.alternate.clone(),
                maf: maf.frequency,
                maf_allele: maf.allele,
            },
        );
    }

    Ok(Some(result))
}
