//! Repository for the `sightings` table.

use sqlx::{PgConnection, PgPool};
use platewatch_core::search::escape_like;
use platewatch_core::types::{DbId, Timestamp};

use crate::models::sighting::{CreateSighting, Sighting, SightingFilter, SightingQuery};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for `sightings` SELECT queries.
const COLUMNS: &str = "\
    id, plate_number, confidence, timestamp, location, \
    latitude, longitude, image_url, video_id, created_at";

/// Column list for INSERT (excludes auto-generated `id`, `created_at`).
const INSERT_COLUMNS: &str = "\
    plate_number, confidence, timestamp, location, \
    latitude, longitude, image_url, video_id";

// ---------------------------------------------------------------------------
// SightingRepo
// ---------------------------------------------------------------------------

/// Provides query and insert operations for sightings.
pub struct SightingRepo;

impl SightingRepo {
    /// Insert a validated sighting, returning the stored row.
    pub async fn create(pool: &PgPool, input: &CreateSighting) -> Result<Sighting, sqlx::Error> {
        let query = format!(
            "INSERT INTO sightings ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sighting>(&query)
            .bind(&input.plate_number)
            .bind(input.confidence)
            .bind(input.timestamp)
            .bind(&input.location)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.image_url)
            .bind(&input.video_id)
            .fetch_one(pool)
            .await
    }

    /// Find a sighting by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Sighting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sightings WHERE id = $1");
        sqlx::query_as::<_, Sighting>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of matching sightings plus the total match count, read from a
    /// single snapshot so `total` agrees with the page.
    pub async fn page(
        pool: &PgPool,
        params: &SightingQuery,
    ) -> Result<(Vec<Sighting>, i64), sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let records = Self::query(&mut *tx, params).await?;
        let total = Self::count(&mut *tx, &params.filter).await?;

        tx.commit().await?;
        Ok((records, total))
    }

    /// Query one page of sightings, most recent first.
    pub async fn query(
        conn: &mut PgConnection,
        params: &SightingQuery,
    ) -> Result<Vec<Sighting>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_sighting_filter(&params.filter);

        let query = format!(
            "SELECT {COLUMNS} FROM sightings {where_clause} \
             ORDER BY timestamp DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let q = bind_sighting_values(sqlx::query_as::<_, Sighting>(&query), &bind_values);
        q.bind(params.page.limit)
            .bind(params.page.offset)
            .fetch_all(conn)
            .await
    }

    /// Count sightings matching the filter (for pagination metadata).
    pub async fn count(conn: &mut PgConnection, filter: &SightingFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_sighting_filter(filter);

        let query = format!("SELECT COUNT(*)::BIGINT AS count FROM sightings {where_clause}");

        let q = bind_sighting_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values);
        q.fetch_one(conn).await
    }

    /// Per-plate sighting counts for matching sightings, highest first.
    ///
    /// Plates are grouped on their trimmed, upper-cased form.
    pub async fn plate_counts(
        pool: &PgPool,
        filter: &SightingFilter,
        limit: i64,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_sighting_filter(filter);

        let query = format!(
            "SELECT upper(btrim(plate_number)) AS plate, COUNT(*)::BIGINT AS count \
             FROM sightings {where_clause} \
             GROUP BY 1 ORDER BY 2 DESC, 1 ASC \
             LIMIT ${bind_idx}"
        );

        let q = bind_sighting_values(sqlx::query_as::<_, (String, i64)>(&query), &bind_values);
        q.bind(limit).fetch_all(pool).await
    }

    /// Geocoded sightings matching the filter, oldest first, capped at `max`.
    pub async fn geocoded(
        pool: &PgPool,
        filter: &SightingFilter,
        max: i64,
    ) -> Result<Vec<Sighting>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_sighting_filter(filter);
        let geocoded = "latitude IS NOT NULL AND longitude IS NOT NULL";
        let where_clause = if where_clause.is_empty() {
            format!("WHERE {geocoded}")
        } else {
            format!("{where_clause} AND {geocoded}")
        };

        let query = format!(
            "SELECT {COLUMNS} FROM sightings {where_clause} \
             ORDER BY timestamp ASC, id ASC \
             LIMIT ${bind_idx}"
        );

        let q = bind_sighting_values(sqlx::query_as::<_, Sighting>(&query), &bind_values);
        q.bind(max).fetch_all(pool).await
    }
}

// ---------------------------------------------------------------------------
// Filter building
// ---------------------------------------------------------------------------

enum BindValue {
    Text(String),
    Timestamp(Timestamp),
}

/// Build a `WHERE` clause for the filter.
///
/// Returns the clause (empty when unfiltered), the values to bind in order,
/// and the next free placeholder index.
fn build_sighting_filter(filter: &SightingFilter) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(ref plate) = filter.plate_number {
        conditions.push(format!("plate_number ILIKE ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(format!("%{}%", escape_like(plate))));
    }

    if let Some(ref location) = filter.location {
        conditions.push(format!("location ILIKE ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(format!("%{}%", escape_like(location))));
    }

    if let Some(start) = filter.range.start {
        conditions.push(format!("timestamp >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(start));
    }

    if let Some(end) = filter.range.end {
        conditions.push(format!("timestamp <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(end));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_sighting_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_sighting_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}
