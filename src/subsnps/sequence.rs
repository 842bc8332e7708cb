//! Access to the reference sequence.

use std::path::Path;

use indexmap::IndexMap;

use crate::common::io::open_read_maybe_gz;

/// Supporting code for `SequenceReader`.
pub(crate) mod sequence {
    /// Error type for sequence lookups.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error("'end' ({end}) should be greater or equal than 'start' ({start})")]
        EndBeforeStart { start: u64, end: u64 },
        #[error("'start' and 'end' should be positive integers")]
        StartNotPositive,
        #[error("sequence {0} not present in reference")]
        UnknownSequence(String),
        #[error("query {name}:{start}-{end} asks for data past end of sequence (length {length})")]
        PastEnd {
            name: String,
            start: u64,
            end: u64,
            length: u64,
        },
    }
}

/// Read access to named reference sequences.
///
/// Implementations must be usable from several threads at once.
pub trait SequenceReader: Send + Sync {
    /// Bases of `name` from `start` to `end`, 1-based and inclusive.
    fn get_sequence(&self, name: &str, start: u64, end: u64) -> Result<String, sequence::Error>;

    /// Whether a sequence with the given name exists.
    fn contains(&self, name: &str) -> bool;
}

/// Reference sequences loaded from a FASTA file into memory.
#[derive(Debug, Clone, Default)]
pub struct FastaSequenceReader {
    sequences: IndexMap<String, Vec<u8>>,
}

impl FastaSequenceReader {
    /// Load all records of a FASTA file, which may be gzip compressed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        tracing::debug!("loading reference sequence from {:?}", path.as_ref());
        let reader = bio::io::fasta::Reader::new(open_read_maybe_gz(path.as_ref())?);

        let mut sequences = IndexMap::new();
        for record in reader.records() {
            let record = record.map_err(|e| {
                anyhow::anyhow!("problem reading FASTA {:?}: {}", path.as_ref(), e)
            })?;
            record
                .check()
                .map_err(|e| anyhow::anyhow!("invalid FASTA record {}: {}", record.id(), e))?;
            sequences.insert(record.id().to_string(), record.seq().to_vec());
        }
        tracing::debug!("loaded {} sequences", sequences.len());

        Ok(Self { sequences })
    }

    /// Build from in-memory `(name, bases)` pairs.
    pub fn from_records<I, N, S>(records: I) -> Self
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: AsRef<[u8]>,
    {
        Self {
            sequences: records
                .into_iter()
                .map(|(name, seq)| (name.into(), seq.as_ref().to_vec()))
                .collect(),
        }
    }

    /// Number of sequences.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Whether no sequence was loaded.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl SequenceReader for FastaSequenceReader {
    fn get_sequence(&self, name: &str, start: u64, end: u64) -> Result<String, sequence::Error> {
        if end < start {
            return Err(sequence::Error::EndBeforeStart { start, end });
        } else if start < 1 {
            return Err(sequence::Error::StartNotPositive);
        }

        let seq = self
            .sequences
            .get(name)
            .ok_or_else(|| sequence::Error::UnknownSequence(name.to_string()))?;
        let length = seq.len() as u64;
        if end > length {
            return Err(sequence::Error::PastEnd {
                name: name.to_string(),
                start,
                end,
                length,
            });
        }

        Ok(String::from_utf8_lossy(&seq[(start - 1) as usize..end as usize]).into_owned())
    }

    fn contains(&self, name: &str) -> bool {
        self.sequences.contains_key(name)
    }
}
