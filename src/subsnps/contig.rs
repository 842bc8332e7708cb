//! Mapping of RefSeq contig accessions to GenBank accessions.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use thousands::Separable;

use crate::common::io::open_read_maybe_gz;

/// Column of the GenBank accession in the NCBI assembly report (0-based).
const COL_GENBANK: usize = 4;
/// Column of the GenBank/RefSeq relationship.
const COL_RELATIONSHIP: usize = 5;
/// Column of the RefSeq accession.
const COL_REFSEQ: usize = 6;

/// Lookup from RefSeq accession (`NT_...`) to GenBank accession (`GL...`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContigMapping {
    refseq_to_genbank: HashMap<String, String>,
}

impl ContigMapping {
    /// Build from an explicit RefSeq to GenBank map.
    pub fn new(refseq_to_genbank: HashMap<String, String>) -> Self {
        Self { refseq_to_genbank }
    }

    /// Load from an NCBI assembly report, which may be gzip compressed.
    pub fn from_assembly_report<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        tracing::debug!("loading assembly report from {:?}", path.as_ref());
        let before_parsing = Instant::now();
        let result = Self::from_reader(open_read_maybe_gz(path.as_ref())?)
            .map_err(|e| anyhow::anyhow!("problem reading {:?}: {}", path.as_ref(), e))?;
        tracing::debug!(
            "loaded {} contig synonyms in {:?}",
            result.len().separate_with_commas(),
            before_parsing.elapsed()
        );
        Ok(result)
    }

    /// Parse an assembly report from a reader.
    ///
    /// Only rows where GenBank and RefSeq sequences are identical (`=`) are
    /// used, rows without RefSeq accession (`na`) are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut refseq_to_genbank = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let (Some(genbank), Some(relationship), Some(refseq)) = (
                record.get(COL_GENBANK),
                record.get(COL_RELATIONSHIP),
                record.get(COL_REFSEQ),
            ) else {
                tracing::trace!("skipping short assembly report row {:?}", &record);
                continue;
            };
            if relationship != "=" || refseq == "na" || genbank == "na" {
                continue;
            }
            refseq_to_genbank.insert(refseq.to_string(), genbank.to_string());
        }

        Ok(Self { refseq_to_genbank })
    }

    /// The GenBank accession for `refseq`, if known.
    pub fn lookup(&self, refseq: &str) -> Option<&str> {
        self.refseq_to_genbank.get(refseq).map(String::as_str)
    }

    /// Number of known accessions.
    pub fn len(&self) -> usize {
        self.refseq_to_genbank.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.refseq_to_genbank.is_empty()
    }
}
