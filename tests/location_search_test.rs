mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::Value;
use showmatch_api::models::ProfileKind;
use uuid::Uuid;

const SAO_PAULO: (f64, f64) = (-23.5505, -46.6333);
const RIO: (f64, f64) = (-22.9068, -43.1729);

async fn seeded_app() -> TestApp {
    let app = TestApp::new().await;
    app.add_city("São Paulo", "SP", SAO_PAULO.0, SAO_PAULO.1).await;
    app.add_city("Rio de Janeiro", "RJ", RIO.0, RIO.1).await;
    app
}

fn result_ids(body: &Value) -> Vec<Uuid> {
    body["data"]["results"]
        .as_array()
        .expect("results array")
        .iter()
        .map(|r| {
            r["profile"]["id"]
                .as_str()
                .and_then(|s| s.parse().ok())
                .expect("profile id")
        })
        .collect()
}

#[tokio::test]
async fn accent_and_case_variants_resolve_to_the_same_origin() {
    let app = seeded_app().await;
    let artist = app
        .add_profile(ProfileKind::Artist, "Trio", Some((-23.5605, -46.6333)), Some(5.0))
        .await;

    let mut origins = Vec::new();
    for query in [
        "city=S%C3%A3o%20Paulo&state=SP",
        "city=sao%20paulo&state=sp",
        "city=SAO%20PAULO&state=Sp",
        "city=%20Sao%20Paulo%20&state=%20sp%20",
    ] {
        let (status, body) = app
            .json(Method::GET, &format!("/api/v1/search/city?{}", query), None)
            .await;
        assert_eq!(status, StatusCode::OK, "query {}", query);
        assert_eq!(result_ids(&body), vec![artist]);
        origins.push(body["data"]["origin"].clone());
    }
    assert!(origins.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(origins[0]["latitude"], SAO_PAULO.0);
}

#[tokio::test]
async fn service_radius_must_cover_the_distance() {
    let app = seeded_app().await;
    let near = app
        .add_profile(ProfileKind::Artist, "Near", Some((-23.5605, -46.6333)), Some(5.0))
        .await;
    let _far = app
        .add_profile(ProfileKind::Artist, "Far", Some((-23.9, -46.9)), Some(5.0))
        .await;

    let (status, body) = app
        .json(
            Method::GET,
            "/api/v1/search/coordinates?latitude=-23.5505&longitude=-46.6333&respect_service_radius=true",
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result_ids(&body), vec![near]);
    let distance = body["data"]["results"][0]["distance_km"].as_f64().unwrap();
    assert!((distance - 1.11).abs() < 0.01, "distance was {}", distance);
}

#[tokio::test]
async fn touring_artist_far_from_the_origin_still_matches() {
    let app = seeded_app().await;
    let touring = app
        .add_profile(ProfileKind::Artist, "Touring", Some((-30.0346, -51.2177)), Some(1000.0))
        .await;

    let (status, body) = app
        .json(
            Method::GET,
            "/api/v1/search/city?city=Sao%20Paulo&state=SP&respect_service_radius=true",
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result_ids(&body), vec![touring]);
    let distance = body["data"]["results"][0]["distance_km"].as_f64().unwrap();
    assert!(distance > 800.0 && distance < 1000.0, "distance was {}", distance);
}

#[tokio::test]
async fn space_search_without_radius_flag_lists_nearby_spaces() {
    let app = seeded_app().await;
    let club = app
        .add_profile(ProfileKind::Space, "Club", Some((-23.551, -46.634)), None)
        .await;

    let (status, body) = app
        .json(
            Method::GET,
            "/api/v1/search/city?city=Sao%20Paulo&state=SP&kind=space",
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result_ids(&body), vec![club]);
}

#[tokio::test]
async fn plain_ranking_ignores_radius_and_orders_nearest_first() {
    let app = seeded_app().await;
    let rio = app
        .add_profile(ProfileKind::Artist, "Carioca", Some(RIO), Some(1.0))
        .await;
    let local = app
        .add_profile(ProfileKind::Artist, "Paulista", Some((-23.56, -46.64)), None)
        .await;
    let _nowhere = app
        .add_profile(ProfileKind::Artist, "Unlocated", None, Some(10_000.0))
        .await;

    let (status, body) = app
        .json(
            Method::GET,
            "/api/v1/search/city?city=Sao%20Paulo&state=SP&respect_service_radius=false",
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result_ids(&body), vec![local, rio]);
}

#[tokio::test]
async fn kind_filter_and_max_results() {
    let app = seeded_app().await;
    let space = app
        .add_profile(ProfileKind::Space, "Club", Some((-23.551, -46.634)), None)
        .await;
    for i in 0..3 {
        app.add_profile(
            ProfileKind::Artist,
            &format!("Artist {}", i),
            Some((-23.55 - 0.01 * i as f64, -46.63)),
            Some(50.0),
        )
        .await;
    }

    let (_, spaces) = app
        .json(
            Method::GET,
            "/api/v1/search/city?city=Sao%20Paulo&state=SP&kind=space&respect_service_radius=false",
            None,
        )
        .await;
    assert_eq!(result_ids(&spaces), vec![space]);

    let (_, artists) = app
        .json(
            Method::GET,
            "/api/v1/search/city?city=Sao%20Paulo&state=SP&kind=artist&max_results=2",
            None,
        )
        .await;
    assert_eq!(result_ids(&artists).len(), 2);
}

#[tokio::test]
async fn postal_code_search_goes_through_the_city_table() {
    let app = seeded_app().await;
    app.add_postal_code("01310-100", "Sao Paulo", "sp").await;
    let artist = app
        .add_profile(ProfileKind::Artist, "Trio", Some((-23.5605, -46.6333)), Some(5.0))
        .await;

    let (status, body) = app
        .json(Method::GET, "/api/v1/search/postal-code/01310100", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result_ids(&body), vec![artist]);

    let (status, body) = app
        .json(Method::GET, "/api/v1/search/postal-code/99999-999", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn unknown_city_is_location_not_found() {
    let app = seeded_app().await;
    let (status, body) = app
        .json(
            Method::GET,
            "/api/v1/search/city?city=Atlantis&state=XX",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Location not found"));
}

#[tokio::test]
async fn out_of_range_latitude_is_rejected() {
    let app = seeded_app().await;
    let (status, body) = app
        .json(
            Method::GET,
            "/api/v1/search/coordinates?latitude=200&longitude=0",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid coordinate"));
}

#[tokio::test]
async fn zero_max_results_is_a_validation_error() {
    let app = seeded_app().await;
    let (status, _) = app
        .json(
            Method::GET,
            "/api/v1/search/coordinates?latitude=-23.5&longitude=-46.6&max_results=0",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn error_bodies_carry_the_request_id() {
    let app = seeded_app().await;
    let request = axum::http::Request::builder()
        .uri("/api/v1/search/city?city=Nowhere&state=ZZ")
        .header("x-request-id", "search-req-1")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(showmatch_api::app(app.state.clone()), request)
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "search-req-1"
    );
    let body = common::response_json(response).await;
    assert_eq!(body["request_id"], "search-req-1");
}
