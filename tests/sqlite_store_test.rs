//! Exercises the SeaORM-backed stores against an in-memory SQLite database.

use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal_macros::dec;
use showmatch_api::{
    db::{self, DbConfig},
    entities::profile,
    models::{BookingWindow, Coordinate, InterestStatus, ProfileKind},
    repositories::{CandidateCriteria, NewBooking, NewInterest, Stores},
    services::{
        geo_reference::GeoReferenceService,
        geocoding::{bounding_box, DistanceResolver},
    },
};
use std::sync::Arc;
use uuid::Uuid;

async fn stores() -> Stores {
    // One connection: every sqlite::memory: connection is its own database
    let pool = db::establish_connection_with_config(&DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    })
    .await
    .expect("connect to sqlite");
    db::run_migrations(&pool).await.expect("migrations apply");
    Stores::database(Arc::new(pool))
}

fn point(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn located(kind: ProfileKind, lat: f64, lng: f64, radius: Option<f64>) -> profile::Model {
    profile::Model {
        id: Uuid::new_v4(),
        kind,
        display_name: format!("{} at {},{}", kind, lat, lng),
        city: None,
        state: None,
        postal_code: None,
        latitude: Some(lat),
        longitude: Some(lng),
        service_radius_km: radius,
        created_at: Utc::now(),
        updated_at: None,
    }
}

#[tokio::test]
async fn geo_reference_upsert_resolve_and_repair() {
    let stores = stores().await;
    let geo = GeoReferenceService::new(stores.geo_references.clone(), stores.postal_codes.clone());

    let first = geo
        .upsert_entry("São Paulo", "sp", point(-23.0, -46.0))
        .await
        .unwrap();
    let second = geo
        .upsert_entry("São Paulo", "SP", point(-23.5505, -46.6333))
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.state, "SP");
    assert_eq!(second.normalized_city, "SAO PAULO");

    geo.upsert_postal_code("01310-100", "Sao Paulo", "SP")
        .await
        .unwrap();

    let resolver = DistanceResolver::new(stores.geo_references.clone(), stores.postal_codes.clone());
    let by_city = resolver.resolve_by_city_state("sao paulo", "sp").await.unwrap();
    let by_postal = resolver.resolve_by_postal_code("01310 100").await.unwrap();
    assert_eq!(by_city, point(-23.5505, -46.6333));
    assert_eq!(by_city, by_postal);

    assert_eq!(geo.repair_normalized_index().await.unwrap(), 0);
}

#[tokio::test]
async fn candidates_respect_kind_and_bounds() {
    let stores = stores().await;
    let near_artist = stores
        .profiles
        .insert(located(ProfileKind::Artist, -23.56, -46.63, Some(10.0)))
        .await
        .unwrap();
    let _near_space = stores
        .profiles
        .insert(located(ProfileKind::Space, -23.55, -46.64, None))
        .await
        .unwrap();
    let _far_artist = stores
        .profiles
        .insert(located(ProfileKind::Artist, -3.73, -38.52, Some(10.0)))
        .await
        .unwrap();

    let criteria = CandidateCriteria {
        kind: Some(ProfileKind::Artist),
        bounds: bounding_box(&point(-23.5505, -46.6333), 100.0),
    };
    let found = stores.profiles.find_candidates(&criteria).await.unwrap();
    assert_eq!(
        found.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![near_artist.id]
    );
    assert_eq!(
        stores
            .profiles
            .find_candidates(&CandidateCriteria::default())
            .await
            .unwrap()
            .len(),
        3
    );

    assert_eq!(
        stores
            .profiles
            .max_service_radius_km(Some(ProfileKind::Artist))
            .await
            .unwrap(),
        Some(10.0)
    );
    assert_eq!(
        stores
            .profiles
            .max_service_radius_km(Some(ProfileKind::Space))
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn bookings_list_update_and_delete() {
    let stores = stores().await;
    let entity = Uuid::new_v4();
    let window = |s: (&str, &str), e: (&str, &str)| {
        BookingWindow::new(date(s.0), time(s.1), date(e.0), time(e.1)).unwrap()
    };
    let new_booking = |w: BookingWindow| NewBooking {
        owner_profile_id: Uuid::new_v4(),
        entity_id: entity,
        entity_kind: ProfileKind::Space,
        window: w,
        interest_id: None,
    };

    let late = stores
        .bookings
        .insert(new_booking(window(("2025-08-02", "22:00"), ("2025-08-03", "01:00"))))
        .await
        .unwrap();
    let early = stores
        .bookings
        .insert(new_booking(window(("2025-08-02", "18:00"), ("2025-08-02", "20:00"))))
        .await
        .unwrap();
    assert_eq!(late.window().unwrap().end(), date("2025-08-03").and_time(time("01:00")));

    let listed = stores.bookings.list_for_entity(entity, None).await.unwrap();
    assert_eq!(
        listed.iter().map(|b| b.id).collect::<Vec<_>>(),
        vec![early.id, late.id]
    );
    let without_early = stores
        .bookings
        .list_for_entity(entity, Some(early.id))
        .await
        .unwrap();
    assert_eq!(without_early.len(), 1);

    let moved = stores
        .bookings
        .update_window(early.id, window(("2025-08-02", "19:00"), ("2025-08-02", "21:00")))
        .await
        .unwrap();
    assert_eq!(moved.start_time, time("19:00"));

    assert!(stores.bookings.delete(early.id).await.unwrap());
    assert!(!stores.bookings.delete(early.id).await.unwrap());
    assert!(stores.bookings.find_by_id(early.id).await.unwrap().is_none());
}

#[tokio::test]
async fn interest_status_compare_and_set() {
    let stores = stores().await;
    let created = stores
        .interests
        .insert(NewInterest {
            interested_profile_id: Uuid::new_v4(),
            target_profile_id: Uuid::new_v4(),
            proposed_date: date("2025-08-01"),
            proposed_start_time: time("20:00"),
            duration_hours: 2.5,
            offered_hourly_rate: dec!(150.00),
            offered_cover_charge: dec!(0),
            message: None,
        })
        .await
        .unwrap();
    assert_eq!(created.status, InterestStatus::AwaitingConfirmation);

    let accepted = stores
        .interests
        .compare_and_set_status(
            created.id,
            InterestStatus::AwaitingConfirmation,
            InterestStatus::Accepted,
        )
        .await
        .unwrap()
        .expect("first transition wins");
    assert_eq!(accepted.status, InterestStatus::Accepted);

    let stale = stores
        .interests
        .compare_and_set_status(
            created.id,
            InterestStatus::AwaitingConfirmation,
            InterestStatus::Rejected,
        )
        .await
        .unwrap();
    assert!(stale.is_none());

    let stored = stores.interests.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InterestStatus::Accepted);
}
