pub mod booking;
pub mod geo_reference;
pub mod interest;
pub mod postal_code;
pub mod profile;
