//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod geo_provider_error;
mod geocoder;
mod hangout_repository;
mod isochrone_source;
mod notifier;
mod poll_repository;
mod recommendation_repository;
mod repository_error;
mod venue_source;

pub use geo_provider_error::GeoProviderError;
#[cfg(test)]
pub use geocoder::MockGeocoder;
pub use geocoder::Geocoder;
#[cfg(test)]
pub use hangout_repository::MockHangoutRepository;
pub use hangout_repository::HangoutRepository;
#[cfg(test)]
pub use isochrone_source::MockIsochroneSource;
pub use isochrone_source::{IsochroneRequest, IsochroneSource};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{Notifier, NotifierError};
#[cfg(test)]
pub use poll_repository::MockPollRepository;
pub use poll_repository::{PollInsertOutcome, PollRepository};
#[cfg(test)]
pub use recommendation_repository::MockRecommendationRepository;
pub use recommendation_repository::RecommendationRepository;
pub use repository_error::RepositoryError;
#[cfg(test)]
pub use venue_source::MockVenueSource;
pub use venue_source::{VenueSearchRequest, VenueSource};
