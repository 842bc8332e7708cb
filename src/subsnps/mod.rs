//! Normalization of dbSNP SubSNPs into variants.
//!
//! A SubSNP is read into `model::SubSnpCoreFields`, run through the
//! filters in `processors`, and turned into a `variant::Variant` whose
//! alleles are on the forward strand and whose indels are left-anchored.

pub mod alleles;
pub mod contig;
pub mod coords;
pub mod model;
pub mod normalize;
pub mod orientation;
pub mod pipeline;
pub mod processors;
pub mod samples;
pub mod sequence;
pub mod stats;
pub mod variant;
