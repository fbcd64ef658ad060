pub mod sighting;
