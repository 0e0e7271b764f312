//! Specimen services: upsert, point updates, preloading, retrieval

pub mod fetch;
pub mod lookup;
pub mod preloader;
pub mod transition;
pub mod upsert;
