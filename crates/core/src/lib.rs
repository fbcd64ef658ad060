//! Domain logic for the PlateWatch sighting service.
//!
//! No internal dependencies: ids, errors, validators, date ranges, pagination
//! and aggregation rules shared by the store and API crates.

pub mod aggregation;
pub mod error;
pub mod search;
pub mod time_range;
pub mod types;
pub mod validation;
