//! Integration tests for the Postgres sighting repository and store.
//!
//! These need a live database (`DATABASE_URL`); run them with
//! `cargo test -p platewatch-db -- --ignored`.

use chrono::{Duration, TimeZone, Utc};
use platewatch_core::search::PageWindow;
use platewatch_core::time_range::DateRange;
use platewatch_db::models::sighting::{CreateSighting, SightingFilter, SightingQuery};
use platewatch_db::repositories::SightingRepo;
use assert_matches::assert_matches;
use platewatch_db::store::{PgSightingStore, SightingStore, StoreError};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_sighting(plate: &str, minutes: i64) -> CreateSighting {
    CreateSighting {
        plate_number: plate.to_string(),
        confidence: 0.9,
        timestamp: Utc.with_ymd_and_hms(2023, 11, 15, 8, 0, 0).unwrap() + Duration::minutes(minutes),
        location: Some("Uhuru Highway".to_string()),
        latitude: Some(-1.29),
        longitude: Some(36.82),
        image_url: None,
        video_id: "clm1234567890".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_create_and_find(pool: PgPool) {
    let created = SightingRepo::create(&pool, &new_sighting("KAA 123A", 0))
        .await
        .unwrap();
    assert!(created.id > 0);

    let found = SightingRepo::find_by_id(&pool, created.id).await.unwrap();
    assert_eq!(found.map(|s| s.plate_number), Some("KAA 123A".to_string()));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_query_pages_and_counts(pool: PgPool) {
    for i in 0..25 {
        SightingRepo::create(&pool, &new_sighting("KBZ 900X", i)).await.unwrap();
    }
    let store = PgSightingStore::new(pool);

    let page = store
        .query(&SightingQuery {
            filter: SightingFilter {
                plate_number: Some("kbz".into()),
                ..Default::default()
            },
            page: PageWindow { limit: 10, offset: 0 },
        })
        .await
        .unwrap();

    assert_eq!(page.records.len(), 10);
    assert_eq!(page.total, 25);
    assert!(page
        .records
        .windows(2)
        .all(|w| w[0].timestamp >= w[1].timestamp));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_page_reads_records_and_total_in_one_snapshot(pool: PgPool) {
    for i in 0..3 {
        SightingRepo::create(&pool, &new_sighting("KCB 777Z", i)).await.unwrap();
    }

    let (records, total) = SightingRepo::page(
        &pool,
        &SightingQuery {
            page: PageWindow { limit: 2, offset: 0 },
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(total, 3);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_like_wildcards_match_literally(pool: PgPool) {
    SightingRepo::create(&pool, &new_sighting("AB_123", 0)).await.unwrap();
    SightingRepo::create(&pool, &new_sighting("ABX123", 1)).await.unwrap();

    let filter = SightingFilter {
        plate_number: Some("b_1".into()),
        ..Default::default()
    };
    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(SightingRepo::count(&mut conn, &filter).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_date_range_is_inclusive(pool: PgPool) {
    let first = SightingRepo::create(&pool, &new_sighting("KCA 001A", 0)).await.unwrap();
    SightingRepo::create(&pool, &new_sighting("KCA 001A", 60)).await.unwrap();

    let filter = SightingFilter {
        range: DateRange {
            start: Some(first.timestamp),
            end: Some(first.timestamp),
        },
        ..Default::default()
    };
    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(SightingRepo::count(&mut conn, &filter).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_confidence_check_constraint(pool: PgPool) {
    let bad = CreateSighting {
        confidence: 1.5,
        ..new_sighting("KAA 123A", 0)
    };
    let err = SightingRepo::create(&pool, &bad).await.unwrap_err();
    let db_err = err.as_database_error().expect("should be a database error");
    assert_eq!(db_err.constraint(), Some("ck_sightings_confidence_range"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_plate_counts_and_tracks(pool: PgPool) {
    SightingRepo::create(&pool, &new_sighting("kaa 123a", 0)).await.unwrap();
    SightingRepo::create(&pool, &new_sighting("KAA 123A", 5)).await.unwrap();
    SightingRepo::create(&pool, &new_sighting("KBZ 900X", 10)).await.unwrap();
    let store = PgSightingStore::new(pool);

    let counts = store.plate_counts(&SightingFilter::default(), 5).await.unwrap();
    assert_eq!(counts[0].plate_number, "KAA 123A");
    assert_eq!(counts[0].count, 2);

    let tracks = store.tracks(&SightingFilter::default()).await.unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].points.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_rejected_rows_are_not_unavailability(pool: PgPool) {
    let store = PgSightingStore::new(pool);

    let bad = CreateSighting {
        confidence: 1.5,
        ..new_sighting("KAA 123A", 0)
    };
    let err = store.create(&bad).await.unwrap_err();
    assert_matches!(
        err,
        StoreError::Failed { constraint: Some(ref c), .. } if c == "ck_sightings_confidence_range"
    );

    let nul = new_sighting("AB\u{0}", 0);
    assert_matches!(store.create(&nul).await, Err(StoreError::Failed { .. }));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_closed_pool_is_unavailable(pool: PgPool) {
    let store = PgSightingStore::new(pool);
    store.close().await;

    assert_matches!(
        store.query(&SightingQuery::default()).await,
        Err(StoreError::Unavailable(_))
    );
}
