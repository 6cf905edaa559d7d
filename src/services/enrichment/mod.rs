//! Enrichment of generated plans with photos, hotel candidates and routes.
//!
//! Phases run one after another; the calls inside a phase are issued together
//! and awaited as a batch. A failed call never fails the pass: every lookup
//! yields a [`Lookup`] and each map resolves those with its own
//! [`DegradePolicy`] (photos fall back to the placeholder image, hotels to an
//! empty list, locations and routes are left out).

pub mod outcome;
pub mod route_plan;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use futures::future::join_all;

use crate::config::AppConfig;
use crate::models::enrichment::{
    day_key, EnrichmentMaps, HotelCandidate, ImageRef, PlaceResult, RouteSegment, SegmentKey,
};
use crate::models::plan::Plan;
use crate::services::directions_service::RouteProvider;
use crate::services::hotel_service::{HotelQuery, HotelSearch, HotelTarget};
use crate::services::places_service::PlaceLookup;
use crate::services::pricing_service::PricingService;

pub use outcome::{resolve, DegradePolicy, Lookup};
pub use route_plan::{plan_routes, RouteRequest};

const DEFAULT_ADULTS: u32 = 2;

#[derive(Debug, Clone)]
pub struct EnrichmentOptions {
    pub adults: u32,
    pub include_hotels: bool,
    pub include_routes: bool,
    pub include_images: bool,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self {
            adults: DEFAULT_ADULTS,
            include_hotels: true,
            include_routes: true,
            include_images: true,
        }
    }
}

pub struct EnrichmentService {
    places: Arc<dyn PlaceLookup>,
    routes: Arc<dyn RouteProvider>,
    hotels: Arc<dyn HotelSearch>,
    fallback_image_url: String,
    transport_cost_per_km: f64,
}

impl EnrichmentService {
    pub fn new(
        places: Arc<dyn PlaceLookup>,
        routes: Arc<dyn RouteProvider>,
        hotels: Arc<dyn HotelSearch>,
        config: &AppConfig,
    ) -> Self {
        Self {
            places,
            routes,
            hotels,
            fallback_image_url: config.fallback_image_url.clone(),
            transport_cost_per_km: config.transport_cost_per_km,
        }
    }

    /// Build the enrichment maps for `plans`. Always returns; lookups that
    /// fail show up as missing keys or placeholders.
    pub async fn enrich(&self, plans: &[Plan], options: &EnrichmentOptions) -> EnrichmentMaps {
        for plan in plans {
            if let Err(problem) = plan.validate_for_enrichment() {
                log::warn!("Enriching malformed plan: {}", problem);
            }
        }

        let mut maps = EnrichmentMaps::default();

        let locations = collect_locations(plans);
        log::info!(
            "Enriching {} plan(s): {} unique locations",
            plans.len(),
            locations.len()
        );
        maps.location_data = self.lookup_locations(locations).await;

        if options.include_hotels {
            maps.hotels = self
                .search_hotels(plans, &maps.location_data, options.adults)
                .await;
        }

        if options.include_images {
            maps.hero_images = self.hero_images(plans).await;
            maps.day_images = self.day_images(plans).await;
            maps.activity_images = self.activity_images(plans).await;
        }

        if options.include_routes {
            let routes = self.compute_routes(plans).await;
            for (trip_id, segments) in routes {
                let totals = PricingService::calculate_route_totals(
                    segments.iter().map(|(key, segment)| (*key, segment)),
                    self.transport_cost_per_km,
                );
                maps.route_totals.insert(trip_id.clone(), totals);
                maps.route_data.insert(
                    trip_id,
                    segments
                        .into_iter()
                        .map(|(key, segment)| (key.to_string(), segment))
                        .collect(),
                );
            }
        }

        maps
    }

    async fn lookup_locations(&self, locations: Vec<String>) -> BTreeMap<String, PlaceResult> {
        let lookups = locations.into_iter().map(|location| async move {
            let outcome = Lookup::from_result(self.places.lookup(&location).await);
            (location, outcome)
        });
        let outcomes = join_all(lookups).await;
        resolve("geocode", outcomes, &DegradePolicy::Omit)
    }

    async fn search_hotels(
        &self,
        plans: &[Plan],
        location_data: &BTreeMap<String, PlaceResult>,
        adults: u32,
    ) -> BTreeMap<String, BTreeMap<String, Vec<HotelCandidate>>> {
        let mut searches = Vec::new();
        for plan in plans {
            for day in plan.itinerary.iter().filter(|day| day.has_overnight_stay()) {
                let city = day.city.display_name();
                let target = match location_data.get(city).and_then(|place| place.coordinates) {
                    Some(coordinates) => HotelTarget::Coordinates(coordinates),
                    None => HotelTarget::Area(area_label(day.accommodation.trim(), city)),
                };
                let key = (plan.trip_id.clone(), day_key(day.day));
                let date = day.date.clone();
                searches.push(async move {
                    let query = match stay_dates(&date) {
                        Some((checkin, checkout)) => HotelQuery {
                            checkin,
                            checkout,
                            adults,
                            target,
                        },
                        None => {
                            return (key, Lookup::Failed(format!("unreadable date {:?}", date)))
                        }
                    };
                    (key, Lookup::from_result(self.hotels.search(&query).await))
                });
            }
        }

        let outcomes = join_all(searches).await;
        nest(resolve("hotels", outcomes, &DegradePolicy::Substitute(Vec::new())))
    }

    async fn hero_images(&self, plans: &[Plan]) -> BTreeMap<String, ImageRef> {
        let lookups = plans.iter().map(|plan| {
            let query = if plan.hero.destination.trim().is_empty() {
                plan.hero.title.trim().to_string()
            } else {
                plan.hero.destination.trim().to_string()
            };
            let trip_id = plan.trip_id.clone();
            async move { (trip_id, self.photo(query).await) }
        });
        let outcomes = join_all(lookups).await;
        resolve("hero image", outcomes, &self.image_policy())
    }

    async fn day_images(&self, plans: &[Plan]) -> BTreeMap<String, BTreeMap<String, ImageRef>> {
        let mut lookups = Vec::new();
        for plan in plans {
            for day in &plan.itinerary {
                let key = (plan.trip_id.clone(), day_key(day.day));
                let query = day.city.display_name().to_string();
                lookups.push(async move { (key, self.photo(query).await) });
            }
        }
        let outcomes = join_all(lookups).await;
        nest(resolve("day image", outcomes, &self.image_policy()))
    }

    async fn activity_images(
        &self,
        plans: &[Plan],
    ) -> BTreeMap<String, BTreeMap<String, ImageRef>> {
        let mut lookups = Vec::new();
        for plan in plans {
            for day in &plan.itinerary {
                for activity in &day.activities {
                    let key = (plan.trip_id.clone(), activity.id.clone());
                    let query = activity.geocode_query(&day.city).unwrap_or_default();
                    lookups.push(async move { (key, self.photo(query).await) });
                }
            }
        }
        let outcomes = join_all(lookups).await;
        nest(resolve("activity image", outcomes, &self.image_policy()))
    }

    async fn photo(&self, query: String) -> Lookup<ImageRef> {
        if query.is_empty() {
            return Lookup::Missing;
        }
        Lookup::from_result(self.places.lookup(&query).await).and_then(|place| {
            match place.photo_url {
                Some(url) => Lookup::Found(ImageRef::photo(url)),
                None => Lookup::Missing,
            }
        })
    }

    fn image_policy(&self) -> DegradePolicy<ImageRef> {
        DegradePolicy::Substitute(ImageRef::placeholder(self.fallback_image_url.clone()))
    }

    async fn compute_routes(
        &self,
        plans: &[Plan],
    ) -> BTreeMap<String, BTreeMap<SegmentKey, RouteSegment>> {
        let mut lookups = Vec::new();
        for plan in plans {
            for request in plan_routes(plan) {
                let trip_id = plan.trip_id.clone();
                lookups.push(async move {
                    let outcome = Lookup::from_result(self.routes.route(&request.waypoints).await);
                    ((trip_id, request.key), outcome)
                });
            }
        }
        let outcomes = join_all(lookups).await;
        let mut routes = nest(resolve("route", outcomes, &DegradePolicy::Omit));
        // Plans without any resolved segment still get (zero) totals.
        for plan in plans {
            routes.entry(plan.trip_id.clone()).or_default();
        }
        routes
    }
}

/// Unique lookup strings across `plans`, first-seen order: hero titles, day
/// cities, activity locations.
pub fn collect_locations(plans: &[Plan]) -> Vec<String> {
    let mut locations: Vec<String> = Vec::new();
    let mut push = |location: String| {
        if !location.is_empty() && !locations.contains(&location) {
            locations.push(location);
        }
    };
    for plan in plans {
        push(plan.hero.title.trim().to_string());
        for day in &plan.itinerary {
            push(day.city.display_name().to_string());
            for query in day.activity_queries() {
                push(query);
            }
        }
    }
    locations
}

fn area_label(accommodation: &str, city: &str) -> String {
    if city.is_empty() || accommodation.contains(city) {
        accommodation.to_string()
    } else {
        format!("{}, {}", accommodation, city)
    }
}

/// One night starting on the day's date.
fn stay_dates(date: &str) -> Option<(NaiveDate, NaiveDate)> {
    let checkin = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    Some((checkin, checkin + Duration::days(1)))
}

fn nest<K1: Ord, K2: Ord, T>(flat: BTreeMap<(K1, K2), T>) -> BTreeMap<K1, BTreeMap<K2, T>> {
    let mut nested: BTreeMap<K1, BTreeMap<K2, T>> = BTreeMap::new();
    for ((outer, inner), value) in flat {
        nested.entry(outer).or_default().insert(inner, value);
    }
    nested
}
