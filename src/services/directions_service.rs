//! Route computation backed by the Google Directions API.
//!
//! The first waypoint is the origin, the last the destination and anything in
//! between is passed as intermediate waypoints. Each computed route also gets
//! a Static Maps URL drawing the encoded overview polyline.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::config::AppConfig;
use crate::error::ClientError;
use crate::models::enrichment::{RouteLeg, RouteSegment};

const STATIC_MAP_SIZE: &str = "640x400";
const STATIC_MAP_PATH_STYLE: &str = "color:0x4f46e5ff|weight:4";
// Directions API accepts at most 25 intermediate waypoints.
const MAX_WAYPOINTS: usize = 27;

#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Route through `waypoints` in order. Needs at least two.
    async fn route(&self, waypoints: &[String]) -> Result<RouteSegment, ClientError>;
}

#[derive(Debug, Deserialize)]
struct DirectionsApiResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    overview_polyline: Polyline,
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
struct Polyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    #[serde(default)]
    start_address: String,
    #[serde(default)]
    end_address: String,
    distance: Option<ValueField>,
    duration: Option<ValueField>,
}

#[derive(Debug, Deserialize)]
struct ValueField {
    value: u64,
}

pub struct GoogleDirectionsClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GoogleDirectionsClient {
    pub fn new(http_client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            http_client,
            api_key: config.google_maps_api_key.clone(),
            base_url: config.google_maps_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn directions_url(&self, waypoints: &[String], api_key: &str) -> Result<Url, ClientError> {
        let origin = &waypoints[0];
        let destination = &waypoints[waypoints.len() - 1];
        let mut params: Vec<(&str, String)> = vec![
            ("origin", origin.clone()),
            ("destination", destination.clone()),
        ];
        if waypoints.len() > 2 {
            params.push(("waypoints", waypoints[1..waypoints.len() - 1].join("|")));
        }
        params.push(("key", api_key.to_string()));

        Url::parse_with_params(&format!("{}/directions/json", self.base_url), &params)
            .map_err(|e| ClientError::Decode(format!("Invalid Directions URL: {}", e)))
    }

    fn static_map_url(
        &self,
        polyline: &str,
        waypoints: &[String],
        api_key: &str,
    ) -> Result<String, ClientError> {
        let mut params: Vec<(&str, String)> = vec![
            ("size", STATIC_MAP_SIZE.to_string()),
            ("path", format!("{}|enc:{}", STATIC_MAP_PATH_STYLE, polyline)),
        ];
        for (index, waypoint) in waypoints.iter().enumerate() {
            params.push(("markers", format!("label:{}|{}", marker_label(index), waypoint)));
        }
        params.push(("key", api_key.to_string()));

        Url::parse_with_params(&format!("{}/staticmap", self.base_url), &params)
            .map(|url| url.to_string())
            .map_err(|e| ClientError::Decode(format!("Invalid Static Maps URL: {}", e)))
    }
}

fn marker_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

#[async_trait]
impl RouteProvider for GoogleDirectionsClient {
    async fn route(&self, waypoints: &[String]) -> Result<RouteSegment, ClientError> {
        if waypoints.len() < 2 {
            return Err(ClientError::InvalidRequest(
                "At least two waypoints are required".to_string(),
            ));
        }
        if waypoints.len() > MAX_WAYPOINTS {
            return Err(ClientError::InvalidRequest(format!(
                "At most {} waypoints are supported",
                MAX_WAYPOINTS
            )));
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ClientError::NotConfigured("Google Maps API key"))?;

        let url = self.directions_url(waypoints, api_key)?;
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status, body));
        }

        let response_text = response.text().await?;
        let directions: DirectionsApiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                log::error!("Unparsable Directions response: {}", response_text);
                ClientError::Decode(format!("Failed to parse Directions response: {}", e))
            })?;

        match directions.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" | "NOT_FOUND" => {
                return Err(ClientError::NotFound(waypoints.join(" -> ")))
            }
            "REQUEST_DENIED" => return Err(ClientError::Unauthorized),
            "OVER_QUERY_LIMIT" => return Err(ClientError::RateLimited),
            other => {
                return Err(ClientError::Status(
                    status.as_u16(),
                    format!(
                        "Directions API error: {} {}",
                        other,
                        directions.error_message.unwrap_or_default()
                    ),
                ))
            }
        }

        let route = directions
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound(waypoints.join(" -> ")))?;

        let legs: Vec<RouteLeg> = route
            .legs
            .into_iter()
            .map(|leg| RouteLeg {
                start_address: leg.start_address,
                end_address: leg.end_address,
                distance_meters: leg.distance.map(|d| d.value).unwrap_or(0),
                duration_seconds: leg.duration.map(|d| d.value).unwrap_or(0),
            })
            .collect();

        let static_map_url =
            self.static_map_url(&route.overview_polyline.points, waypoints, api_key)?;

        Ok(RouteSegment {
            distance_meters: legs.iter().map(|leg| leg.distance_meters).sum(),
            duration_seconds: legs.iter().map(|leg| leg.duration_seconds).sum(),
            polyline: route.overview_polyline.points,
            static_map_url,
            legs,
        })
    }
}
