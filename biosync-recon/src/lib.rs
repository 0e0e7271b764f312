//! biosync-recon library - Specimen inventory reconciliation
//!
//! Pairs the lab inventory report's view of each physical sample with the
//! registry API's specimen model and classifies every divergence into a
//! fixed taxonomy, tolerating the known, benign skew between the two
//! pipelines.

pub mod db;
pub mod engine;
pub mod report;
pub mod status_map;
