//! Proximity matcher: filters candidate profiles by distance from an origin and ranks them.

use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::profile;
use crate::models::Coordinate;
use crate::services::geocoding::great_circle_distance_km;

/// A candidate that survived filtering, with its distance from the origin.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RankedProfile {
    #[schema(value_type = Object)]
    pub profile: profile::Model,
    pub distance_km: f64,
}

/// Ranks `candidates` by great-circle distance from `origin`.
///
/// Candidates without a usable coordinate are dropped. With `respect_service_radius`,
/// a candidate is kept only when its service radius is set and covers the distance.
/// Ordering is by ascending distance, then by profile id.
pub fn match_candidates(
    origin: &Coordinate,
    candidates: Vec<profile::Model>,
    respect_service_radius: bool,
    max_results: Option<usize>,
) -> Vec<RankedProfile> {
    let mut ranked: Vec<RankedProfile> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let coordinate = candidate.coordinate()?;
            let distance_km = great_circle_distance_km(origin, &coordinate);
            if respect_service_radius && !within_service_radius(&candidate, distance_km) {
                return None;
            }
            Some(RankedProfile {
                profile: candidate,
                distance_km,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.profile.id.cmp(&b.profile.id))
    });

    if let Some(limit) = max_results {
        ranked.truncate(limit);
    }
    ranked
}

fn within_service_radius(candidate: &profile::Model, distance_km: f64) -> bool {
    match candidate.service_radius_km {
        Some(radius) if radius > 0.0 => radius >= distance_km,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileKind;
    use chrono::Utc;
    use uuid::Uuid;

    fn artist(id: u128, lat: Option<f64>, lng: Option<f64>, radius: Option<f64>) -> profile::Model {
        profile::Model {
            id: Uuid::from_u128(id),
            kind: ProfileKind::Artist,
            display_name: format!("artist-{}", id),
            city: None,
            state: None,
            postal_code: None,
            latitude: lat,
            longitude: lng,
            service_radius_km: radius,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn origin() -> Coordinate {
        Coordinate::new(-23.5505, -46.6333).unwrap()
    }

    #[test]
    fn keeps_only_artists_whose_radius_covers_the_distance() {
        let near = artist(1, Some(-23.5605), Some(-46.6333), Some(5.0));
        let far = artist(2, Some(-23.9), Some(-46.9), Some(5.0));

        let ranked = match_candidates(&origin(), vec![far, near.clone()], true, None);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].profile.id, near.id);
        assert!((ranked[0].distance_km - 1.11).abs() < 0.01);
    }

    #[test]
    fn without_radius_filtering_everything_located_is_ranked() {
        let candidates = vec![
            artist(3, Some(-23.9), Some(-46.9), Some(5.0)),
            artist(4, Some(-23.5605), Some(-46.6333), None),
            artist(5, None, None, Some(100.0)),
            artist(6, Some(-23.5605), None, Some(100.0)),
        ];

        let ranked = match_candidates(&origin(), candidates, false, None);
        let ids: Vec<_> = ranked.iter().map(|r| r.profile.id.as_u128()).collect();
        assert_eq!(ids, vec![4, 3]);
    }

    #[test]
    fn radius_filtering_excludes_profiles_without_a_radius() {
        let candidates = vec![artist(7, Some(-23.5505), Some(-46.6333), None)];
        assert!(match_candidates(&origin(), candidates, true, None).is_empty());
    }

    #[test]
    fn ties_break_on_id_and_max_results_truncates() {
        let candidates = vec![
            artist(9, Some(-23.5605), Some(-46.6333), None),
            artist(8, Some(-23.5605), Some(-46.6333), None),
            artist(10, Some(-23.6), Some(-46.6333), None),
        ];

        let ranked = match_candidates(&origin(), candidates, false, Some(2));
        let ids: Vec<_> = ranked.iter().map(|r| r.profile.id.as_u128()).collect();
        assert_eq!(ids, vec![8, 9]);
    }
}
