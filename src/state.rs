use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::mongo::create_mongo_client;
use crate::db::plan_store::{MemoryPlanStore, MongoPlanStore, PlanStore};
use crate::services::directions_service::{GoogleDirectionsClient, RouteProvider};
use crate::services::enrichment::EnrichmentService;
use crate::services::hotel_service::{HotelSearch, RapidApiHotelClient};
use crate::services::itinerary_generation_service::ItineraryGenerator;
use crate::services::llm_service::{ItineraryLlm, OpenAiItineraryClient};
use crate::services::places_service::{GooglePlacesClient, PlaceLookup};
use crate::services::regeneration_service::RegenerationService;
use crate::services::weather_service::{OpenWeatherClient, WeatherProvider};

/// Everything route handlers need, shared across workers.
pub struct AppState {
    pub config: AppConfig,
    pub generator: ItineraryGenerator,
    pub regenerator: RegenerationService,
    pub enrichment: EnrichmentService,
    pub places: Arc<dyn PlaceLookup>,
    pub routes: Arc<dyn RouteProvider>,
    pub hotels: Arc<dyn HotelSearch>,
    pub weather: Arc<dyn WeatherProvider>,
    pub store: Arc<dyn PlanStore>,
}

/// The external collaborators, so tests can swap in fakes.
pub struct Providers {
    pub llm: Arc<dyn ItineraryLlm>,
    pub places: Arc<dyn PlaceLookup>,
    pub routes: Arc<dyn RouteProvider>,
    pub hotels: Arc<dyn HotelSearch>,
    pub weather: Arc<dyn WeatherProvider>,
    pub store: Arc<dyn PlanStore>,
}

impl AppState {
    pub fn new(config: AppConfig, providers: Providers) -> Self {
        let enrichment = EnrichmentService::new(
            providers.places.clone(),
            providers.routes.clone(),
            providers.hotels.clone(),
            &config,
        );
        Self {
            generator: ItineraryGenerator::new(providers.llm.clone()),
            regenerator: RegenerationService::new(providers.llm),
            enrichment,
            places: providers.places,
            routes: providers.routes,
            hotels: providers.hotels,
            weather: providers.weather,
            store: providers.store,
            config,
        }
    }

    /// Wire the real HTTP clients and the configured store.
    pub async fn from_config(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let http_client = config.http_client()?;

        let store: Arc<dyn PlanStore> = match &config.mongodb_uri {
            Some(uri) => {
                let client = create_mongo_client(uri).await?;
                Arc::new(MongoPlanStore::new(client, config.mongodb_database.clone()))
            }
            None => {
                log::warn!("MONGODB_URI not set, saved plans are kept in memory only");
                Arc::new(MemoryPlanStore::new())
            }
        };

        let providers = Providers {
            llm: Arc::new(OpenAiItineraryClient::new(http_client.clone(), &config)),
            places: Arc::new(GooglePlacesClient::new(http_client.clone(), &config)),
            routes: Arc::new(GoogleDirectionsClient::new(http_client.clone(), &config)),
            hotels: Arc::new(RapidApiHotelClient::new(http_client.clone(), &config)),
            weather: Arc::new(OpenWeatherClient::new(http_client, &config)),
            store,
        };

        Ok(Self::new(config, providers))
    }
}
