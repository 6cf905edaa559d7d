//! Place photo / details lookup backed by the Google Places API.
//!
//! A lookup runs "Find Place From Text" for a free-text name and turns the
//! first candidate's photo reference into a Place Photo URL. No candidates is
//! reported as `ClientError::NotFound`; callers decide whether that matters.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::config::AppConfig;
use crate::error::ClientError;
use crate::models::enrichment::{Coordinates, PlaceDetails, PlaceResult};

const PHOTO_MAX_WIDTH: &str = "800";
const FIND_PLACE_FIELDS: &str = "name,formatted_address,place_id,rating,types,geometry,photos";

#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn lookup(&self, place_name: &str) -> Result<PlaceResult, ClientError>;
}

#[derive(Debug, Deserialize)]
struct FindPlaceResponse {
    status: String,
    #[serde(default)]
    candidates: Vec<PlaceCandidate>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceCandidate {
    name: Option<String>,
    formatted_address: Option<String>,
    place_id: Option<String>,
    rating: Option<f32>,
    #[serde(default)]
    types: Vec<String>,
    geometry: Option<Geometry>,
    #[serde(default)]
    photos: Vec<PlacePhoto>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct PlacePhoto {
    photo_reference: String,
}

pub struct GooglePlacesClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GooglePlacesClient {
    pub fn new(http_client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            http_client,
            api_key: config.google_maps_api_key.clone(),
            base_url: config.google_maps_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn api_key(&self) -> Result<&str, ClientError> {
        self.api_key
            .as_deref()
            .ok_or(ClientError::NotConfigured("Google Maps API key"))
    }

    fn photo_url(&self, photo_reference: &str, api_key: &str) -> Result<String, ClientError> {
        Url::parse_with_params(
            &format!("{}/place/photo", self.base_url),
            &[
                ("maxwidth", PHOTO_MAX_WIDTH),
                ("photo_reference", photo_reference),
                ("key", api_key),
            ],
        )
        .map(|url| url.to_string())
        .map_err(|e| ClientError::Decode(format!("Invalid photo URL: {}", e)))
    }
}

#[async_trait]
impl PlaceLookup for GooglePlacesClient {
    async fn lookup(&self, place_name: &str) -> Result<PlaceResult, ClientError> {
        let api_key = self.api_key()?;
        let url = Url::parse_with_params(
            &format!("{}/place/findplacefromtext/json", self.base_url),
            &[
                ("input", place_name),
                ("inputtype", "textquery"),
                ("fields", FIND_PLACE_FIELDS),
                ("key", api_key),
            ],
        )
        .map_err(|e| ClientError::Decode(format!("Invalid Places URL: {}", e)))?;

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status, body));
        }

        let response_text = response.text().await?;
        let places: FindPlaceResponse = serde_json::from_str(&response_text).map_err(|e| {
            log::error!("Unparsable Places response: {}", response_text);
            ClientError::Decode(format!("Failed to parse Places response: {}", e))
        })?;

        match places.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Err(ClientError::NotFound(place_name.to_string())),
            "REQUEST_DENIED" => return Err(ClientError::Unauthorized),
            "OVER_QUERY_LIMIT" => return Err(ClientError::RateLimited),
            other => {
                return Err(ClientError::Status(
                    status.as_u16(),
                    format!(
                        "Places API error: {} {}",
                        other,
                        places.error_message.unwrap_or_default()
                    ),
                ))
            }
        }

        let candidate = places
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound(place_name.to_string()))?;

        let photo_url = match candidate.photos.first() {
            Some(photo) => Some(self.photo_url(&photo.photo_reference, api_key)?),
            None => None,
        };

        Ok(PlaceResult {
            place_name: place_name.to_string(),
            place_details: PlaceDetails {
                name: candidate.name.unwrap_or_else(|| place_name.to_string()),
                formatted_address: candidate.formatted_address,
                place_id: candidate.place_id,
                rating: candidate.rating,
                types: candidate.types,
            },
            photo_url,
            coordinates: candidate.geometry.map(|geometry| Coordinates {
                lat: geometry.location.lat,
                lng: geometry.location.lng,
            }),
        })
    }
}
