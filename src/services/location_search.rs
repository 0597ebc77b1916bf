use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::config::MatchingConfig;
use crate::errors::ServiceError;
use crate::models::{Coordinate, ProfileKind};
use crate::repositories::{CandidateCriteria, ProfileRepository};
use crate::services::geocoding::{bounding_box, DistanceResolver};
use crate::services::proximity::{match_candidates, RankedProfile};

/// Per-request search knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    pub kind: Option<ProfileKind>,
    /// `None` falls back to the configured default.
    pub respect_service_radius: Option<bool>,
    /// `None` falls back to the configured default; always clamped to the cap.
    pub max_results: Option<usize>,
}

/// Resolved origin plus the ranked matches around it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RankedProfiles {
    pub origin: Coordinate,
    pub results: Vec<RankedProfile>,
}

/// Location search: resolve, prefilter from the profile store, then rank.
#[derive(Clone)]
pub struct LocationSearchService {
    resolver: DistanceResolver,
    profiles: Arc<dyn ProfileRepository>,
    config: MatchingConfig,
}

impl LocationSearchService {
    pub fn new(
        resolver: DistanceResolver,
        profiles: Arc<dyn ProfileRepository>,
        config: MatchingConfig,
    ) -> Self {
        Self {
            resolver,
            profiles,
            config,
        }
    }

    #[instrument(skip(self))]
    pub async fn search_by_city_state(
        &self,
        city: &str,
        state: &str,
        options: SearchOptions,
    ) -> Result<RankedProfiles, ServiceError> {
        counter!("location_search_requests_total", 1, "by" => "city_state");
        let limit = self.result_limit(&options)?;
        let origin = self.resolver.resolve_by_city_state(city, state).await?;
        self.rank_around(origin, &options, limit).await
    }

    #[instrument(skip(self))]
    pub async fn search_by_postal_code(
        &self,
        code: &str,
        options: SearchOptions,
    ) -> Result<RankedProfiles, ServiceError> {
        counter!("location_search_requests_total", 1, "by" => "postal_code");
        let limit = self.result_limit(&options)?;
        let origin = self.resolver.resolve_by_postal_code(code).await?;
        self.rank_around(origin, &options, limit).await
    }

    #[instrument(skip(self))]
    pub async fn search_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
        options: SearchOptions,
    ) -> Result<RankedProfiles, ServiceError> {
        counter!("location_search_requests_total", 1, "by" => "coordinates");
        let limit = self.result_limit(&options)?;
        let origin = self.resolver.resolve_by_coordinates(latitude, longitude)?;
        self.rank_around(origin, &options, limit).await
    }

    fn result_limit(&self, options: &SearchOptions) -> Result<usize, ServiceError> {
        match options.max_results {
            Some(0) => Err(ServiceError::ValidationError(
                "max_results must be greater than 0".to_string(),
            )),
            Some(n) => Ok(n.min(self.config.max_results_cap)),
            None => Ok(self
                .config
                .default_max_results
                .min(self.config.max_results_cap)),
        }
    }

    async fn rank_around(
        &self,
        origin: Coordinate,
        options: &SearchOptions,
        limit: usize,
    ) -> Result<RankedProfiles, ServiceError> {
        // Spaces carry no service radius, so they rank plainly unless told otherwise
        let respect_radius = options.respect_service_radius.unwrap_or(
            self.config.respect_service_radius_by_default
                && options.kind != Some(ProfileKind::Space),
        );

        // Box reaches the widest stored service radius
        let bounds = if respect_radius {
            let widest = self
                .profiles
                .max_service_radius_km(options.kind)
                .await?
                .unwrap_or(0.0);
            bounding_box(&origin, widest.max(self.config.candidate_prefilter_km))
        } else {
            None
        };

        let criteria = CandidateCriteria {
            kind: options.kind,
            bounds,
        };
        let candidates = self.profiles.find_candidates(&criteria).await?;
        let considered = candidates.len();

        let results = match_candidates(&origin, candidates, respect_radius, Some(limit));
        info!(
            %origin,
            considered,
            matched = results.len(),
            respect_radius,
            "location search ranked"
        );

        Ok(RankedProfiles { origin, results })
    }
}
