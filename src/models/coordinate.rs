use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ServiceError;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// A validated latitude/longitude pair in decimal degrees.
///
/// Fields are private so every instance has passed [`Coordinate::new`];
/// deserialization goes through the same check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = ServiceError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Builds a coordinate, rejecting NaN and out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ServiceError> {
        let lat_ok = (MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude);
        let lng_ok = (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude);
        if !lat_ok || !lng_ok {
            return Err(ServiceError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Builds a coordinate from optional stored columns; both must be present and valid.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lng)) => Self::new(lat, lng).ok(),
            _ => None,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Latitude/longitude rectangle used to prefilter candidates before exact distance checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&coordinate.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&coordinate.longitude)
    }
}
