//! Maintenance of the geo-reference and postal-code tables.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::entities::{geo_reference, postal_code};
use crate::errors::ServiceError;
use crate::models::normalize::{
    is_valid_state_code, normalize_city, normalize_postal_code, normalize_state,
};
use crate::models::Coordinate;
use crate::repositories::{GeoReferenceRepository, PostalCodeRepository};

#[derive(Clone)]
pub struct GeoReferenceService {
    geo_references: Arc<dyn GeoReferenceRepository>,
    postal_codes: Arc<dyn PostalCodeRepository>,
}

impl GeoReferenceService {
    pub fn new(
        geo_references: Arc<dyn GeoReferenceRepository>,
        postal_codes: Arc<dyn PostalCodeRepository>,
    ) -> Self {
        Self {
            geo_references,
            postal_codes,
        }
    }

    /// Inserts or updates the entry for (city, state); the normalized key is rewritten in the same write.
    #[instrument(skip(self))]
    pub async fn upsert_entry(
        &self,
        city: &str,
        state: &str,
        coordinate: Coordinate,
    ) -> Result<geo_reference::Model, ServiceError> {
        let city = clean_city(city)?;
        let state = clean_state(state)?;
        let entry = self
            .geo_references
            .upsert(&city, &state, coordinate)
            .await?;
        info!(id = %entry.id, normalized_city = %entry.normalized_city, "geo reference upserted");
        Ok(entry)
    }

    #[instrument(skip(self))]
    pub async fn upsert_postal_code(
        &self,
        code: &str,
        city: &str,
        state: &str,
    ) -> Result<postal_code::Model, ServiceError> {
        let code = normalize_postal_code(code);
        if code.is_empty() {
            return Err(ServiceError::ValidationError(
                "postal code must contain letters or digits".to_string(),
            ));
        }
        let city = clean_city(city)?;
        let state = clean_state(state)?;
        self.postal_codes.upsert(&code, &city, &state).await
    }

    /// Recomputes every normalized key from its city. Returns how many rows changed.
    #[instrument(skip(self))]
    pub async fn repair_normalized_index(&self) -> Result<usize, ServiceError> {
        let rows = self.geo_references.all().await?;
        let total = rows.len();
        let mut changed = 0;

        for row in rows {
            let normalized = normalize_city(&row.city);
            let state = normalize_state(&row.state);
            if normalized == row.normalized_city && state == row.state {
                continue;
            }
            if !is_valid_state_code(&state) {
                warn!(id = %row.id, state = %row.state, "stored state code is not two letters");
            }
            self.geo_references
                .set_lookup_keys(row.id, &normalized, &state)
                .await?;
            changed += 1;
        }

        info!(total, changed, "normalized city index repaired");
        Ok(changed)
    }
}

fn clean_city(city: &str) -> Result<String, ServiceError> {
    let trimmed = city.split_whitespace().collect::<Vec<_>>().join(" ");
    if trimmed.is_empty() {
        return Err(ServiceError::ValidationError(
            "city must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

fn clean_state(state: &str) -> Result<String, ServiceError> {
    let state = normalize_state(state);
    if !is_valid_state_code(&state) {
        return Err(ServiceError::ValidationError(format!(
            "state must be a two-letter code, got '{}'",
            state
        )));
    }
    Ok(state)
}
