use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct PlaceDetails {
    pub name: String,
    pub formatted_address: Option<String>,
    pub place_id: Option<String>,
    pub rating: Option<f32>,
    pub types: Vec<String>,
}

/// Result of a place photo/details lookup.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PlaceResult {
    pub place_name: String,
    pub place_details: PlaceDetails,
    pub photo_url: Option<String>,
    pub coordinates: Option<Coordinates>,
}

/// Image shown for a hero, day or activity. `fallback` marks the placeholder.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ImageRef {
    pub url: String,
    pub fallback: bool,
}

impl ImageRef {
    pub fn photo(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fallback: false,
        }
    }

    pub fn placeholder(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fallback: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HotelCandidate {
    pub name: String,
    pub location: String,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub rating: Option<f32>,
    pub url: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RouteLeg {
    pub start_address: String,
    pub end_address: String,
    pub distance_meters: u64,
    pub duration_seconds: u64,
}

/// A computed route between two or more waypoints.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RouteSegment {
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub polyline: String,
    pub static_map_url: String,
    pub legs: Vec<RouteLeg>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Default)]
pub struct RouteTotals {
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub transport_cost: f64,
}

/// Key of a route segment inside `route_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SegmentKey {
    Overall,
    Day(u32),
    /// Leg arriving on the given day from the previous one.
    CrossDay(u32),
}

impl SegmentKey {
    /// Per-day and cross-day segments count towards the trip totals.
    pub fn counts_towards_totals(&self) -> bool {
        !matches!(self, SegmentKey::Overall)
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKey::Overall => write!(f, "overall"),
            SegmentKey::Day(day) => write!(f, "day_{}", day),
            SegmentKey::CrossDay(day) => write!(f, "cross_day_{}", day),
        }
    }
}

pub fn day_key(day: u32) -> String {
    format!("day_{}", day)
}

/// Everything the enrichment pass attaches to a set of plans, keyed by trip id.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct EnrichmentMaps {
    pub location_data: BTreeMap<String, PlaceResult>,
    pub hotels: BTreeMap<String, BTreeMap<String, Vec<HotelCandidate>>>,
    pub hero_images: BTreeMap<String, ImageRef>,
    pub day_images: BTreeMap<String, BTreeMap<String, ImageRef>>,
    pub activity_images: BTreeMap<String, BTreeMap<String, ImageRef>>,
    pub route_data: BTreeMap<String, BTreeMap<String, RouteSegment>>,
    pub route_totals: BTreeMap<String, RouteTotals>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_keys_render_as_map_keys() {
        assert_eq!(SegmentKey::Overall.to_string(), "overall");
        assert_eq!(SegmentKey::Day(2).to_string(), "day_2");
        assert_eq!(SegmentKey::CrossDay(3).to_string(), "cross_day_3");
        assert!(!SegmentKey::Overall.counts_towards_totals());
        assert!(SegmentKey::CrossDay(2).counts_towards_totals());
    }
}
