//! Async work performed on behalf of the models.

pub mod enrichment;
