//! Property-based tests for the matching core.
//!
//! These tests use proptest to verify invariants across a wide range of inputs,
//! helping to catch edge cases that unit tests might miss.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use showmatch_api::{
    models::{normalize::normalize_city, BookingWindow, Coordinate},
    services::geocoding::{bounding_box, great_circle_distance_km, EARTH_RADIUS_KM},
};

// Strategies for generating test data
fn coordinate_strategy() -> impl Strategy<Value = Coordinate> {
    (-90.0f64..=90.0, -180.0f64..=180.0)
        .prop_map(|(lat, lng)| Coordinate::new(lat, lng).expect("in range"))
}

fn instant_strategy() -> impl Strategy<Value = NaiveDateTime> {
    (0i64..60 * 24 * 30).prop_map(|minutes| {
        NaiveDate::from_ymd_opt(2025, 8, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::minutes(minutes)
    })
}

fn window_strategy() -> impl Strategy<Value = BookingWindow> {
    (instant_strategy(), 1i64..60 * 24 * 3).prop_map(|(start, minutes)| {
        BookingWindow::from_instants(start, start + Duration::minutes(minutes)).expect("start < end")
    })
}

// Property: distance is a symmetric, bounded metric-like function
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn distance_is_symmetric(a in coordinate_strategy(), b in coordinate_strategy()) {
        prop_assert_eq!(great_circle_distance_km(&a, &b), great_circle_distance_km(&b, &a));
    }

    #[test]
    fn distance_to_self_is_zero(a in coordinate_strategy()) {
        prop_assert_eq!(great_circle_distance_km(&a, &a), 0.0);
    }

    #[test]
    fn distance_is_bounded_by_half_circumference(a in coordinate_strategy(), b in coordinate_strategy()) {
        let d = great_circle_distance_km(&a, &b);
        prop_assert!(d >= 0.0);
        prop_assert!(d <= EARTH_RADIUS_KM * std::f64::consts::PI + 1e-6);
    }
}

// Property: the prefilter box never drops a point inside the radius
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn bounding_box_contains_every_point_within_radius(
        origin in (-60.0f64..60.0, -170.0f64..170.0),
        offset in (-1.0f64..1.0, -1.0f64..1.0),
        radius in 1.0f64..300.0,
    ) {
        let origin = Coordinate::new(origin.0, origin.1).unwrap();
        let candidate = Coordinate::new(
            origin.latitude() + offset.0 * 3.0,
            origin.longitude() + offset.1 * 3.0,
        ).unwrap();

        if let Some(bounds) = bounding_box(&origin, radius) {
            if great_circle_distance_km(&origin, &candidate) <= radius {
                prop_assert!(bounds.contains(&candidate));
            }
        }
    }
}

// Property: overlap is symmetric and matches the half-open definition
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn overlap_is_symmetric(a in window_strategy(), b in window_strategy()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        let expected = a.start() < b.end() && b.start() < a.end();
        prop_assert_eq!(a.overlaps(&b), expected);
    }

    #[test]
    fn back_to_back_windows_never_overlap(a in window_strategy(), minutes in 1i64..600) {
        let next = BookingWindow::from_instants(a.end(), a.end() + Duration::minutes(minutes)).unwrap();
        prop_assert!(!a.overlaps(&next));
        prop_assert!(a.overlaps(&a));
    }
}

// Property: city normalization is idempotent
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn normalization_is_idempotent(s in "[a-zA-Z\u{C0}-\u{17F} \t-]{0,40}") {
        let once = normalize_city(&s);
        prop_assert_eq!(normalize_city(&once), once);
    }
}
