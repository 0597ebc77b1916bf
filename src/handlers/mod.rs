pub mod bookings;
pub mod geo_reference;
pub mod interests;
pub mod search;

use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::repositories::Stores;
use crate::services::{
    bookings::BookingService,
    geo_reference::GeoReferenceService,
    geocoding::DistanceResolver,
    interests::{BookingOnAcceptance, InterestService},
    location_search::LocationSearchService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub location_search: Arc<LocationSearchService>,
    pub geo_reference: Arc<GeoReferenceService>,
    pub bookings: Arc<BookingService>,
    pub interests: Arc<InterestService>,
}

impl AppServices {
    /// Wires every service over the given stores.
    pub fn new(stores: &Stores, config: &AppConfig, event_sender: EventSender) -> Self {
        let resolver = DistanceResolver::new(
            stores.geo_references.clone(),
            stores.postal_codes.clone(),
        );
        let location_search = LocationSearchService::new(
            resolver,
            stores.profiles.clone(),
            config.matching.clone(),
        );
        let geo_reference =
            GeoReferenceService::new(stores.geo_references.clone(), stores.postal_codes.clone());
        let bookings = BookingService::new(stores.bookings.clone(), event_sender.clone());

        let mut interests = InterestService::new(
            stores.interests.clone(),
            stores.profiles.clone(),
            event_sender,
        );
        if config.auto_book_on_accept {
            info!("Accepted interests will book the target profile");
            interests = interests.with_acceptance_hook(Arc::new(BookingOnAcceptance::new(
                bookings.clone(),
                stores.profiles.clone(),
            )));
        }

        Self {
            location_search: Arc::new(location_search),
            geo_reference: Arc::new(geo_reference),
            bookings: Arc::new(bookings),
            interests: Arc::new(interests),
        }
    }
}
