/// Sighting ids are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Absolute UTC instant. Sightings are filtered and ordered on this, never on
/// their string form.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
