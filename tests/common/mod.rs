#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use tripweaver_api::config::AppConfig;
use tripweaver_api::configure_routes;
use tripweaver_api::db::plan_store::MemoryPlanStore;
use tripweaver_api::error::ClientError;
use tripweaver_api::models::enrichment::{
    Coordinates, HotelCandidate, PlaceDetails, PlaceResult, RouteLeg, RouteSegment,
};
use tripweaver_api::models::plan::Plan;
use tripweaver_api::models::weather::WeatherReport;
use tripweaver_api::services::directions_service::RouteProvider;
use tripweaver_api::services::hotel_service::{HotelQuery, HotelSearch, HotelTarget};
use tripweaver_api::services::llm_service::ItineraryLlm;
use tripweaver_api::services::places_service::PlaceLookup;
use tripweaver_api::services::prompt::PromptTemplate;
use tripweaver_api::services::weather_service::WeatherProvider;
use tripweaver_api::{AppState, Providers};

/// Model that answers from a queue of canned replies.
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, ClientError>>>,
    pub calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn reply(self, reply: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
        self
    }

    pub fn fail(self, error: ClientError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItineraryLlm for ScriptedLlm {
    async fn complete(&self, _prompt: &PromptTemplate) -> Result<String, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Status(500, "no scripted reply".to_string())))
    }
}

/// Places keyed by query. Unknown queries are not found; `failing` ones error.
#[derive(Default)]
pub struct FakePlaces {
    known: HashMap<String, PlaceResult>,
    failing: HashSet<String>,
    pub queries: Mutex<Vec<String>>,
}

impl FakePlaces {
    pub fn with_place(mut self, name: &str, photo: Option<&str>, coordinates: Option<(f64, f64)>) -> Self {
        self.known.insert(
            name.to_string(),
            PlaceResult {
                place_name: name.to_string(),
                place_details: PlaceDetails {
                    name: name.to_string(),
                    ..Default::default()
                },
                photo_url: photo.map(str::to_string),
                coordinates: coordinates.map(|(lat, lng)| Coordinates { lat, lng }),
            },
        );
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }
}

#[async_trait]
impl PlaceLookup for FakePlaces {
    async fn lookup(&self, place_name: &str) -> Result<PlaceResult, ClientError> {
        self.queries.lock().unwrap().push(place_name.to_string());
        if self.failing.contains(place_name) {
            return Err(ClientError::Status(500, "places backend down".to_string()));
        }
        self.known
            .get(place_name)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(place_name.to_string()))
    }
}

/// Every hop is 1 km and 10 minutes. Fails every request when `fail` is set,
/// or only the waypoint lists in `failing_routes`.
#[derive(Default)]
pub struct FakeRoutes {
    pub fail: bool,
    pub failing_routes: Vec<Vec<String>>,
    pub requests: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl RouteProvider for FakeRoutes {
    async fn route(&self, waypoints: &[String]) -> Result<RouteSegment, ClientError> {
        self.requests.lock().unwrap().push(waypoints.to_vec());
        if self.fail || self.failing_routes.iter().any(|failing| failing == waypoints) {
            return Err(ClientError::Status(503, "directions unavailable".to_string()));
        }
        let legs: Vec<RouteLeg> = waypoints
            .windows(2)
            .map(|pair| RouteLeg {
                start_address: pair[0].clone(),
                end_address: pair[1].clone(),
                distance_meters: 1000,
                duration_seconds: 600,
            })
            .collect();
        Ok(RouteSegment {
            distance_meters: legs.iter().map(|leg| leg.distance_meters).sum(),
            duration_seconds: legs.iter().map(|leg| leg.duration_seconds).sum(),
            polyline: "encoded".to_string(),
            static_map_url: "https://maps.test/static".to_string(),
            legs,
        })
    }
}

/// Hotel search that fails everything when `fail` is set, or only the nights
/// starting on a date listed in `failing_checkins`.
#[derive(Default)]
pub struct FakeHotels {
    pub fail: bool,
    pub failing_checkins: HashSet<String>,
    pub queries: Mutex<Vec<HotelQuery>>,
}

#[async_trait]
impl HotelSearch for FakeHotels {
    async fn search(&self, query: &HotelQuery) -> Result<Vec<HotelCandidate>, ClientError> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail || self.failing_checkins.contains(&query.checkin.to_string()) {
            return Err(ClientError::RateLimited);
        }
        let location = match &query.target {
            HotelTarget::Coordinates(coordinates) => {
                format!("{:.3},{:.3}", coordinates.lat, coordinates.lng)
            }
            HotelTarget::Destination(dest_id) => dest_id.clone(),
            HotelTarget::Area(area) => area.clone(),
        };
        Ok(vec![HotelCandidate {
            name: format!("Hotel near {}", location),
            location,
            price: Some(120.0),
            currency: Some("USD".to_string()),
            rating: Some(8.7),
            url: None,
            image: None,
        }])
    }
}

#[derive(Clone, Copy)]
pub enum WeatherBehavior {
    Report,
    NotConfigured,
    Unauthorized,
    NotFound,
}

pub struct FakeWeather {
    pub behavior: WeatherBehavior,
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn weather(
        &self,
        location: &str,
        _at: Option<DateTime<Utc>>,
    ) -> Result<WeatherReport, ClientError> {
        match self.behavior {
            WeatherBehavior::Report => Ok(WeatherReport {
                kind: "current".to_string(),
                timestamp: 1_746_086_400,
                temperature: 17.5,
                condition: "Clouds".to_string(),
                description: "broken clouds".to_string(),
                mock: false,
                ..WeatherReport::mock(location)
            }),
            WeatherBehavior::NotConfigured => Err(ClientError::NotConfigured("weather")),
            WeatherBehavior::Unauthorized => Err(ClientError::Unauthorized),
            WeatherBehavior::NotFound => Err(ClientError::NotFound(location.to_string())),
        }
    }
}

pub struct TestApp {
    pub config: AppConfig,
    pub llm: Arc<ScriptedLlm>,
    pub places: Arc<FakePlaces>,
    pub routes: Arc<FakeRoutes>,
    pub hotels: Arc<FakeHotels>,
    pub weather: Arc<FakeWeather>,
    pub store: Arc<MemoryPlanStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            llm: Arc::new(ScriptedLlm::default()),
            places: Arc::new(kansai_places()),
            routes: Arc::new(FakeRoutes::default()),
            hotels: Arc::new(FakeHotels::default()),
            weather: Arc::new(FakeWeather {
                behavior: WeatherBehavior::Report,
            }),
            store: Arc::new(MemoryPlanStore::new()),
        }
    }

    pub fn with_llm(mut self, llm: ScriptedLlm) -> Self {
        self.llm = Arc::new(llm);
        self
    }

    pub fn with_places(mut self, places: FakePlaces) -> Self {
        self.places = Arc::new(places);
        self
    }

    pub fn with_routes(mut self, routes: FakeRoutes) -> Self {
        self.routes = Arc::new(routes);
        self
    }

    pub fn with_hotels(mut self, hotels: FakeHotels) -> Self {
        self.hotels = Arc::new(hotels);
        self
    }

    pub fn with_weather(mut self, behavior: WeatherBehavior) -> Self {
        self.weather = Arc::new(FakeWeather { behavior });
        self
    }

    pub fn create_app(&self) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = AppState::new(
            self.config.clone(),
            Providers {
                llm: self.llm.clone(),
                places: self.places.clone(),
                routes: self.routes.clone(),
                hotels: self.hotels.clone(),
                weather: self.weather.clone(),
                store: self.store.clone(),
            },
        );

        App::new()
            .app_data(web::Data::new(state))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(configure_routes)
    }
}

/// Every place the Kansai plan looks up, with photos and coordinates.
pub fn kansai_places() -> FakePlaces {
    FakePlaces::default()
        .with_place("Kansai", Some("https://photos.test/kansai.jpg"), None)
        .with_place("Kansai Highlights", None, Some((34.69, 135.50)))
        .with_place("Kyoto", Some("https://photos.test/kyoto.jpg"), Some((35.011, 135.768)))
        .with_place("Osaka", Some("https://photos.test/osaka.jpg"), Some((34.694, 135.502)))
        .with_place(
            "Fushimi Inari, Kyoto",
            Some("https://photos.test/fushimi.jpg"),
            Some((34.967, 135.772)),
        )
        .with_place(
            "Kinkaku-ji, Kyoto",
            Some("https://photos.test/kinkakuji.jpg"),
            Some((35.039, 135.729)),
        )
        .with_place(
            "Dotonbori, Osaka",
            Some("https://photos.test/dotonbori.jpg"),
            Some((34.668, 135.501)),
        )
}

/// Two days: Fushimi Inari and Kinkaku-ji in Kyoto with a night in Gion, then
/// Dotonbori in Osaka with no overnight stay.
pub fn kansai_plan(trip_id: &str) -> Plan {
    serde_json::from_value(json!({
        "trip_id": trip_id,
        "theme": "culture",
        "hero": {
            "title": "Kansai Highlights",
            "subtitle": "Temples and street food",
            "destination": "Kansai",
            "duration": 2,
            "budget": "mid",
            "highlights": ["Fushimi Inari", "Dotonbori"]
        },
        "itinerary": [
            {
                "day": 1,
                "date": "2025-05-01",
                "city": { "name": "京都", "name_en": "Kyoto" },
                "activities": [
                    {
                        "id": "a1",
                        "time": "08:00 - 10:00",
                        "title": "Torii gates",
                        "type": "culture",
                        "priority": "must_see",
                        "location": "Fushimi Inari",
                        "price": 0,
                        "rating": 4.8
                    },
                    {
                        "id": "a2",
                        "time": "11:00 - 12:30",
                        "title": "Golden Pavilion",
                        "type": "culture",
                        "priority": "recommended",
                        "location": "Kinkaku-ji",
                        "price": "500 JPY",
                        "rating": "4.6"
                    }
                ],
                "accommodation": "Gion"
            },
            {
                "day": 2,
                "date": "2025-05-02",
                "city": { "name": "大阪", "name_en": "Osaka" },
                "activities": [
                    {
                        "id": "a3",
                        "time": "18:00 - 21:00",
                        "title": "Street food crawl",
                        "type": "food",
                        "priority": "must_do",
                        "location": "Dotonbori"
                    }
                ],
                "accommodation": "none"
            }
        ]
    }))
    .unwrap()
}
