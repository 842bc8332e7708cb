//! Strand orientation algebra and allele string helpers.

/// Orientation of a sequence relative to the one it was mapped against.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Orientation {
    /// Same strand.
    #[default]
    Forward,
    /// Opposite strand.
    Reverse,
}

impl Orientation {
    /// Compose two orientations.
    ///
    /// The result is `Forward` if both agree and `Reverse` otherwise, so that
    /// folding the orientations of a chain of mappings tells whether a value
    /// has to be flipped to end up on the forward strand.
    pub fn combine(self, other: Orientation) -> Orientation {
        if self == other {
            Orientation::Forward
        } else {
            Orientation::Reverse
        }
    }

    /// Fold an arbitrary number of orientations with `combine`.
    pub fn combine_all<I>(orientations: I) -> Orientation
    where
        I: IntoIterator<Item = Orientation>,
    {
        orientations
            .into_iter()
            .fold(Orientation::Forward, Orientation::combine)
    }
}

/// Supporting code for `Orientation`.
pub(crate) mod conversion {
    /// Error type for converting raw orientation values.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error("invalid orientation value {0}, expected 1 or -1")]
        InvalidValue(i64),
    }
}

impl TryFrom<i64> for Orientation {
    type Error = conversion::Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Orientation::Forward),
            -1 => Ok(Orientation::Reverse),
            _ => Err(conversion::Error::InvalidValue(value)),
        }
    }
}

/// Reverse-complement a nucleotide string.
///
/// The case of each base is kept.  Characters without a complement (`N`,
/// IUPAC ambiguity codes, gaps, ...) are kept as they are, only their
/// position changes.
pub fn reverse_complement(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|c| match c {
            'A' => 'T',
            'T' => 'A',
            'C' => 'G',
            'G' => 'C',
            'a' => 't',
            't' => 'a',
            'c' => 'g',
            'g' => 'c',
            _ => c,
        })
        .collect()
}

/// Canonical representation of an allele.
///
/// A missing allele and the `-` placeholder both mean "no bases" and map to
/// the empty string, everything else is trimmed.
pub fn trimmed_allele(allele: Option<&str>) -> String {
    match allele.map(str::trim) {
        None | Some("-") => String::new(),
        Some(trimmed) => trimmed.to_string(),
    }
}

/// Bring an allele given in `orientation` to the forward strand and trim it.
pub fn normalized_allele(allele: &str, orientation: Orientation) -> String {
    match orientation {
        Orientation::Forward => trimmed_allele(Some(allele)),
        Orientation::Reverse => trimmed_allele(Some(&reverse_complement(allele))),
    }
}
