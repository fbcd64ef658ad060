//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod sighting_repo;

pub use sighting_repo::SightingRepo;
