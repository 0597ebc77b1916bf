//! Domain value types shared by the stores, services and handlers.

pub mod booking_window;
pub mod coordinate;
pub mod interest_status;
pub mod normalize;
pub mod profile_kind;

pub use booking_window::BookingWindow;
pub use coordinate::{
    BoundingBox, Coordinate, MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE,
};
pub use interest_status::{InterestParty, InterestStatus};
pub use profile_kind::ProfileKind;
