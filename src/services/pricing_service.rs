use crate::models::enrichment::{RouteSegment, RouteTotals, SegmentKey};

pub struct PricingService;

impl PricingService {
    /// Estimated transportation cost, linear in distance.
    pub fn calculate_transport_cost(distance_meters: u64, cost_per_km: f64) -> f64 {
        let cost = distance_meters as f64 / 1000.0 * cost_per_km;
        (cost * 100.0).round() / 100.0
    }

    /// Sum per-day and cross-day segments; the overall city-to-city route is
    /// informational and not added.
    pub fn calculate_route_totals<'a>(
        segments: impl IntoIterator<Item = (SegmentKey, &'a RouteSegment)>,
        cost_per_km: f64,
    ) -> RouteTotals {
        let mut totals = RouteTotals::default();
        for (key, segment) in segments {
            if !key.counts_towards_totals() {
                continue;
            }
            totals.distance_meters += segment.distance_meters;
            totals.duration_seconds += segment.duration_seconds;
        }
        totals.transport_cost = Self::calculate_transport_cost(totals.distance_meters, cost_per_km);
        totals
    }
}
