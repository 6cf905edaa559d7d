//! Hotel search through the Booking.com RapidAPI endpoints.
//!
//! Searches either around coordinates or within a provider destination. A
//! free-text area is first resolved to a destination through the provider's
//! destination lookup. Results are ranked by review score and cut to the top
//! three.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::ClientError;
use crate::models::enrichment::{Coordinates, HotelCandidate};

pub const MAX_HOTEL_RESULTS: usize = 3;
const BOOKING_HOTEL_URL: &str = "https://www.booking.com/hotel.html";

#[derive(Debug, Clone, PartialEq)]
pub enum HotelTarget {
    Coordinates(Coordinates),
    /// Provider destination id, searched as a city.
    Destination(String),
    /// Free-text area, resolved to a destination before searching.
    Area(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HotelQuery {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub adults: u32,
    pub target: HotelTarget,
}

#[async_trait]
pub trait HotelSearch: Send + Sync {
    async fn search(&self, query: &HotelQuery) -> Result<Vec<HotelCandidate>, ClientError>;
}

#[derive(Debug, Deserialize)]
struct DestinationApiResponse {
    #[serde(default)]
    data: Vec<ApiDestination>,
}

#[derive(Debug, Deserialize)]
struct ApiDestination {
    dest_id: String,
    #[serde(default)]
    search_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HotelSearchApiResponse {
    #[serde(default)]
    data: Option<HotelSearchData>,
    #[serde(default)]
    message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct HotelSearchData {
    #[serde(default)]
    hotels: Vec<ApiHotel>,
}

#[derive(Debug, Deserialize)]
struct ApiHotel {
    hotel_id: Option<u64>,
    #[serde(rename = "accessibilityLabel")]
    accessibility_label: Option<String>,
    property: ApiProperty,
}

#[derive(Debug, Deserialize)]
struct ApiProperty {
    name: String,
    #[serde(rename = "wishlistName")]
    wishlist_name: Option<String>,
    #[serde(rename = "reviewScore")]
    review_score: Option<f32>,
    #[serde(rename = "priceBreakdown")]
    price_breakdown: Option<PriceBreakdown>,
    #[serde(rename = "photoUrls", default)]
    photo_urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PriceBreakdown {
    #[serde(rename = "grossPrice")]
    gross_price: Option<Price>,
}

#[derive(Debug, Deserialize)]
struct Price {
    value: f64,
    currency: Option<String>,
}

impl From<ApiHotel> for HotelCandidate {
    fn from(hotel: ApiHotel) -> Self {
        let price = hotel
            .property
            .price_breakdown
            .and_then(|breakdown| breakdown.gross_price);
        HotelCandidate {
            name: hotel.property.name,
            location: hotel
                .property
                .wishlist_name
                .or(hotel.accessibility_label)
                .unwrap_or_default(),
            price: price.as_ref().map(|p| p.value),
            currency: price.and_then(|p| p.currency),
            rating: hotel.property.review_score,
            url: hotel
                .hotel_id
                .map(|id| format!("{}?hotel_id={}", BOOKING_HOTEL_URL, id)),
            image: hotel.property.photo_urls.into_iter().next(),
        }
    }
}

/// Highest rated first; unrated hotels sink to the bottom.
pub fn rank_hotels(mut hotels: Vec<HotelCandidate>) -> Vec<HotelCandidate> {
    hotels.sort_by(|a, b| {
        b.rating
            .unwrap_or(f32::MIN)
            .total_cmp(&a.rating.unwrap_or(f32::MIN))
    });
    hotels.truncate(MAX_HOTEL_RESULTS);
    hotels
}

pub struct RapidApiHotelClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    api_host: String,
    base_url: String,
}

impl RapidApiHotelClient {
    pub fn new(http_client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            http_client,
            api_key: config.hotel_api_key.clone(),
            api_host: config.hotel_api_host.clone(),
            base_url: config.hotel_api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn base_params(query: &HotelQuery) -> Vec<(&'static str, String)> {
        vec![
            ("arrival_date", query.checkin.format("%Y-%m-%d").to_string()),
            ("departure_date", query.checkout.format("%Y-%m-%d").to_string()),
            ("adults", query.adults.max(1).to_string()),
            ("room_qty", "1".to_string()),
            ("currency_code", "USD".to_string()),
        ]
    }

    async fn get_text(
        &self,
        path: &str,
        params: &[(&str, String)],
        api_key: &str,
    ) -> Result<String, ClientError> {
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, path))
            .query(params)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status, body));
        }
        Ok(response.text().await?)
    }

    /// First destination the provider suggests for `area`.
    async fn resolve_destination(
        &self,
        area: &str,
        api_key: &str,
    ) -> Result<ApiDestination, ClientError> {
        let response_text = self
            .get_text(
                "/api/v1/hotels/searchDestination",
                &[("query", area.to_string())],
                api_key,
            )
            .await?;
        let parsed: DestinationApiResponse = serde_json::from_str(&response_text).map_err(|e| {
            log::error!("Unparsable destination response: {}", response_text);
            ClientError::Decode(format!("Failed to parse destination response: {}", e))
        })?;
        parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound(format!("no hotel destination for {}", area)))
    }
}

#[async_trait]
impl HotelSearch for RapidApiHotelClient {
    async fn search(&self, query: &HotelQuery) -> Result<Vec<HotelCandidate>, ClientError> {
        if query.checkout <= query.checkin {
            return Err(ClientError::InvalidRequest(
                "checkout must be after checkin".to_string(),
            ));
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ClientError::NotConfigured("Hotel API key"))?;

        let mut params = Self::base_params(query);
        let path = match &query.target {
            HotelTarget::Coordinates(coordinates) => {
                params.push(("latitude", coordinates.lat.to_string()));
                params.push(("longitude", coordinates.lng.to_string()));
                "/api/v1/hotels/searchHotelsByCoordinates"
            }
            HotelTarget::Destination(dest_id) => {
                params.push(("dest_id", dest_id.clone()));
                params.push(("search_type", "CITY".to_string()));
                "/api/v1/hotels/searchHotels"
            }
            HotelTarget::Area(area) => {
                let destination = self.resolve_destination(area, api_key).await?;
                let search_type = destination
                    .search_type
                    .filter(|kind| !kind.trim().is_empty())
                    .unwrap_or_else(|| "CITY".to_string());
                params.push(("dest_id", destination.dest_id));
                params.push(("search_type", search_type.to_uppercase()));
                "/api/v1/hotels/searchHotels"
            }
        };

        let response_text = self.get_text(path, &params, api_key).await?;
        let parsed: HotelSearchApiResponse = serde_json::from_str(&response_text).map_err(|e| {
            log::error!("Unparsable hotel response: {}", response_text);
            ClientError::Decode(format!("Failed to parse hotel response: {}", e))
        })?;

        let hotels = match parsed.data {
            Some(data) => data.hotels,
            None => {
                log::debug!("Hotel search returned no data: {:?}", parsed.message);
                Vec::new()
            }
        };

        Ok(rank_hotels(hotels.into_iter().map(HotelCandidate::from).collect()))
    }
}
