// Geographic matching
pub mod geo_reference;
pub mod geocoding;
pub mod location_search;
pub mod proximity;

// Scheduling
pub mod booking_conflicts;
pub mod bookings;

// Negotiation
pub mod interests;
