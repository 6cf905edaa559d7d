//! Which route requests a plan needs.
//!
//! * `overall`: the day cities in order, when the plan visits at least two
//!   distinct cities.
//! * `day_N`: the day's activity locations in order, when at least two of its
//!   activities have a location to look up.
//! * `cross_day_N`: from the last located activity of day N-1 to the first
//!   located activity of day N.

use crate::models::enrichment::SegmentKey;
use crate::models::plan::Plan;

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub key: SegmentKey,
    pub waypoints: Vec<String>,
}

pub fn plan_routes(plan: &Plan) -> Vec<RouteRequest> {
    let mut requests = Vec::new();

    if plan.distinct_city_count() >= 2 {
        requests.push(RouteRequest {
            key: SegmentKey::Overall,
            waypoints: plan.city_route(),
        });
    }

    let queries: Vec<Vec<String>> = plan
        .itinerary
        .iter()
        .map(|day| day.activity_queries())
        .collect();

    for (index, day) in plan.itinerary.iter().enumerate() {
        let today = &queries[index];
        if today.len() >= 2 {
            requests.push(RouteRequest {
                key: SegmentKey::Day(day.day),
                waypoints: today.clone(),
            });
        }

        if index == 0 {
            continue;
        }
        let previous = &queries[index - 1];
        if let (Some(from), Some(to)) = (previous.last(), today.first()) {
            requests.push(RouteRequest {
                key: SegmentKey::CrossDay(day.day),
                waypoints: vec![from.clone(), to.clone()],
            });
        }
    }

    requests
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::fixtures::{activity, day, plan};

    #[test]
    fn two_day_scenario() {
        // Day 1: A, B in Kyoto. Day 2: C in Osaka.
        let plan = plan(
            "t",
            vec![
                day(1, "Kyoto", vec![activity("a", "A"), activity("b", "B")], "Gion"),
                day(2, "Osaka", vec![activity("c", "C")], "none"),
            ],
        );
        let requests = plan_routes(&plan);
        assert_eq!(
            requests,
            vec![
                RouteRequest {
                    key: SegmentKey::Overall,
                    waypoints: vec!["Kyoto".to_string(), "Osaka".to_string()],
                },
                RouteRequest {
                    key: SegmentKey::Day(1),
                    waypoints: vec!["A, Kyoto".to_string(), "B, Kyoto".to_string()],
                },
                RouteRequest {
                    key: SegmentKey::CrossDay(2),
                    waypoints: vec!["B, Kyoto".to_string(), "C, Osaka".to_string()],
                },
            ]
        );
    }

    #[test]
    fn single_city_has_no_overall_route() {
        let plan = plan(
            "t",
            vec![
                day(1, "Kyoto", vec![activity("a", "A")], "Gion"),
                day(2, "Kyoto", vec![activity("b", "B")], "none"),
            ],
        );
        let keys: Vec<_> = plan_routes(&plan).into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![SegmentKey::CrossDay(2)]);
    }

    #[test]
    fn request_count_matches_formula() {
        let days = vec![
            day(1, "Tokyo", vec![activity("1", "A"), activity("2", "B"), activity("3", "C")], "x"),
            day(2, "Tokyo", vec![], "x"),
            day(3, "Kyoto", vec![activity("4", "D")], "x"),
            day(4, "Nara", vec![activity("5", "E"), activity("6", "F")], "x"),
            day(5, "Osaka", vec![activity("7", "")], "none"),
        ];
        let plan = plan("t", days);

        let per_day = plan
            .itinerary
            .iter()
            .filter(|d| d.activity_queries().len() >= 2)
            .count();
        let overall = usize::from(plan.distinct_city_count() >= 2);
        let cross_day = plan
            .itinerary
            .windows(2)
            .filter(|w| !w[0].activity_queries().is_empty() && !w[1].activity_queries().is_empty())
            .count();

        // day 1 + day 4, overall, and 3 -> 4 only
        assert_eq!((per_day, overall, cross_day), (2, 1, 1));
        assert_eq!(plan_routes(&plan).len(), per_day + overall + cross_day);
    }

    #[test]
    fn activities_without_location_do_not_qualify() {
        let plan = plan(
            "t",
            vec![
                day(1, "Kyoto", vec![activity("a", "A"), activity("b", " ")], "Gion"),
                day(2, "Kyoto", vec![activity("c", "")], "none"),
            ],
        );
        assert!(plan_routes(&plan).is_empty());
    }
}
