//! Distance resolver: turns a location query into a coordinate and measures great-circle distance.

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::errors::ServiceError;
use crate::models::normalize::{normalize_city, normalize_postal_code, normalize_state};
use crate::models::{
    BoundingBox, Coordinate, MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE,
};
use crate::repositories::{GeoReferenceRepository, PostalCodeRepository};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Arc length of one degree of latitude on the haversine sphere.
const KM_PER_DEGREE_LATITUDE: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// Haversine distance in kilometres.
///
/// Endpoints are put in a fixed order before computing so the result is bit-for-bit symmetric.
pub fn great_circle_distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }
    let key = |c: &Coordinate| (c.latitude(), c.longitude());
    let (p, q) = if key(a) <= key(b) { (a, b) } else { (b, a) };

    let (lat1, lon1) = (p.latitude().to_radians(), p.longitude().to_radians());
    let (lat2, lon2) = (q.latitude().to_radians(), q.longitude().to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points
    let c = 2.0 * h.min(1.0).sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Lat/lng rectangle enclosing every point within `radius_km` of `origin`.
///
/// Returns `None` when the rectangle would reach a pole or wrap the antimeridian;
/// callers then skip the prefilter.
pub fn bounding_box(origin: &Coordinate, radius_km: f64) -> Option<BoundingBox> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return None;
    }
    let lat_delta = radius_km / KM_PER_DEGREE_LATITUDE;
    let min_latitude = origin.latitude() - lat_delta;
    let max_latitude = origin.latitude() + lat_delta;
    if min_latitude <= MIN_LATITUDE || max_latitude >= MAX_LATITUDE {
        return None;
    }

    // Widest longitude span sits at the latitude edge closest to a pole
    let widest = min_latitude.abs().max(max_latitude.abs()).to_radians().cos();
    let lng_delta = radius_km / (KM_PER_DEGREE_LATITUDE * widest);
    let min_longitude = origin.longitude() - lng_delta;
    let max_longitude = origin.longitude() + lng_delta;
    if min_longitude < MIN_LONGITUDE || max_longitude > MAX_LONGITUDE {
        return None;
    }

    Some(BoundingBox {
        min_latitude,
        max_latitude,
        min_longitude,
        max_longitude,
    })
}

/// Resolves location queries against the geo-reference and postal-code tables.
#[derive(Clone)]
pub struct DistanceResolver {
    geo_references: Arc<dyn GeoReferenceRepository>,
    postal_codes: Arc<dyn PostalCodeRepository>,
}

impl DistanceResolver {
    pub fn new(
        geo_references: Arc<dyn GeoReferenceRepository>,
        postal_codes: Arc<dyn PostalCodeRepository>,
    ) -> Self {
        Self {
            geo_references,
            postal_codes,
        }
    }

    /// Exact lookup on the accent/case-folded city and the state code.
    #[instrument(skip(self))]
    pub async fn resolve_by_city_state(
        &self,
        city: &str,
        state: &str,
    ) -> Result<Coordinate, ServiceError> {
        let normalized = normalize_city(city);
        let state = normalize_state(state);
        if normalized.is_empty() || state.is_empty() {
            return Err(ServiceError::LocationNotFound(format!("{}/{}", city, state)));
        }

        let rows = self
            .geo_references
            .find_by_normalized(&normalized, &state)
            .await?;

        // Several spellings can share a key; the store orders them by city and the first wins
        let coordinate = rows
            .iter()
            .find_map(|row| row.coordinate())
            .ok_or_else(|| ServiceError::LocationNotFound(format!("{}/{}", normalized, state)))?;

        debug!(%coordinate, matches = rows.len(), "resolved city/state");
        Ok(coordinate)
    }

    #[instrument(skip(self))]
    pub async fn resolve_by_postal_code(&self, code: &str) -> Result<Coordinate, ServiceError> {
        let normalized = normalize_postal_code(code);
        if normalized.is_empty() {
            return Err(ServiceError::LocationNotFound(format!(
                "postal code {}",
                code
            )));
        }

        let entry = self
            .postal_codes
            .find(&normalized)
            .await?
            .ok_or_else(|| ServiceError::LocationNotFound(format!("postal code {}", normalized)))?;

        self.resolve_by_city_state(&entry.city, &entry.state).await
    }

    /// Range check only; the coordinate is passed through unchanged.
    pub fn resolve_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Coordinate, ServiceError> {
        Coordinate::new(latitude, longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::{MemoryGeoReferences, MemoryPostalCodes};
    use assert_matches::assert_matches;

    fn point(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    async fn resolver() -> DistanceResolver {
        let geo = Arc::new(MemoryGeoReferences::new());
        let postal = Arc::new(MemoryPostalCodes::new());
        geo.upsert("São Paulo", "SP", point(-23.5505, -46.6333))
            .await
            .unwrap();
        postal.upsert("01310100", "São Paulo", "SP").await.unwrap();
        postal.upsert("99999999", "Atlantis", "SP").await.unwrap();
        DistanceResolver::new(geo, postal)
    }

    #[test]
    fn known_city_pair_distance() {
        // São Paulo to Rio de Janeiro
        let d = great_circle_distance_km(&point(-23.5505, -46.6333), &point(-22.9068, -43.1729));
        assert!((d - 360.7).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let d = great_circle_distance_km(&point(0.0, 0.0), &point(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn bounding_box_covers_radius_and_skips_poles_and_antimeridian() {
        let origin = point(-23.5505, -46.6333);
        let bbox = bounding_box(&origin, 50.0).unwrap();
        assert!(bbox.contains(&origin));
        assert!(bbox.contains(&point(-23.5505 + 0.44, -46.6333)));
        assert!(!bbox.contains(&point(-22.9068, -43.1729)));

        assert!(bounding_box(&point(89.9, 0.0), 50.0).is_none());
        assert!(bounding_box(&point(0.0, 179.9), 50.0).is_none());
    }

    #[tokio::test]
    async fn city_lookup_folds_case_and_accents() {
        let resolver = resolver().await;
        let a = resolver.resolve_by_city_state("São Paulo", "SP").await.unwrap();
        let b = resolver.resolve_by_city_state("sao paulo", "sp").await.unwrap();
        assert_eq!(a, b);
        assert_matches!(
            resolver.resolve_by_city_state("Sao Paul", "SP").await,
            Err(ServiceError::LocationNotFound(_))
        );
    }

    #[tokio::test]
    async fn postal_code_goes_through_city_lookup() {
        let resolver = resolver().await;
        let c = resolver.resolve_by_postal_code("01310-100").await.unwrap();
        assert_eq!(c, point(-23.5505, -46.6333));
        assert_matches!(
            resolver.resolve_by_postal_code("00000-000").await,
            Err(ServiceError::LocationNotFound(_))
        );
        // Mapped code whose city has no coordinate
        assert_matches!(
            resolver.resolve_by_postal_code("99999999").await,
            Err(ServiceError::LocationNotFound(_))
        );
    }

    #[tokio::test]
    async fn raw_coordinates_are_range_checked() {
        let resolver = resolver().await;
        assert_matches!(
            resolver.resolve_by_coordinates(200.0, 0.0),
            Err(ServiceError::InvalidCoordinate { .. })
        );
        assert_eq!(
            resolver.resolve_by_coordinates(-23.5, -46.6).unwrap(),
            point(-23.5, -46.6)
        );
    }
}
