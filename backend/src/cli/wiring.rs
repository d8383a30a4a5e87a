//! Builds the services against PostgreSQL and the HTTP providers.

use std::sync::Arc;

use backend::config::MeetsyncSettings;
use backend::domain::{
    GeoPorts, HangoutPorts, HangoutService, LocationService, PhaseEngine, PollService,
    RecommendationService,
};
use backend::outbound::mapbox::MapboxGeocoder;
use backend::outbound::overpass::{OverpassHttpIdentity, OverpassVenues};
use backend::outbound::persistence::{
    DbPool, DieselHangoutRepository, DieselNotifier, DieselPollRepository,
    DieselRecommendationRepository,
};
use backend::outbound::traveltime::{TravelTimeCredentials, TravelTimeIsochrones};
use tracing::debug;

use super::CliError;

/// The three driving services sharing one phase engine.
#[derive(Clone)]
pub struct Services {
    pub hangouts: HangoutService,
    pub polls: PollService,
    pub locations: LocationService,
}

impl Services {
    pub fn new(engine: PhaseEngine) -> Self {
        Self {
            hangouts: HangoutService::new(engine.clone()),
            polls: PollService::new(engine.clone()),
            locations: LocationService::new(engine),
        }
    }
}

/// Connect the pool and build every adapter from `settings`.
pub async fn connect(settings: &MeetsyncSettings) -> Result<Services, CliError> {
    let pool = DbPool::new(settings.pool_config()?).await?;
    let timeout = settings.provider_timeout();

    let geocoder = MapboxGeocoder::new(
        settings.mapbox_endpoint()?,
        settings.mapbox_token()?,
        timeout,
    )?;
    let (application_id, api_key) = settings.traveltime_credentials()?;
    let isochrones = TravelTimeIsochrones::new(
        settings.traveltime_endpoint()?,
        TravelTimeCredentials {
            application_id: application_id.to_owned(),
            api_key: api_key.to_owned(),
        },
        timeout,
    )?;
    let venues = OverpassVenues::new(
        settings.overpass_endpoint()?,
        timeout,
        OverpassHttpIdentity::default(),
    )?;

    let hangouts = Arc::new(DieselHangoutRepository::new(pool.clone()));
    let recommendations = Arc::new(DieselRecommendationRepository::new(pool.clone()));
    let ports = HangoutPorts {
        hangouts: hangouts.clone(),
        polls: Arc::new(DieselPollRepository::new(pool.clone())),
        recommendations: recommendations.clone(),
        notifier: Arc::new(DieselNotifier::new(pool)),
    };
    let recommender = RecommendationService::new(
        hangouts,
        recommendations,
        GeoPorts {
            geocoder: Arc::new(geocoder),
            isochrones: Arc::new(isochrones),
            venues: Arc::new(venues),
        },
        settings.venue_query(),
    );
    debug!(timeout_secs = timeout.as_secs(), "services wired");
    Ok(Services::new(PhaseEngine::new(ports, recommender)))
}
