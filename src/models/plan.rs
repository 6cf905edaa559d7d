use serde::{Deserialize, Deserializer, Serialize};

/// Accommodation value the generator uses for "no overnight stay" (last day only).
pub const NO_OVERNIGHT_STAY: &str = "none";

// Plans come from a language model: strings may arrive as numbers or `null`,
// and day numbers as strings. Every field below reads those leniently.

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Plan {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub trip_id: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub theme: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hero: Hero,
    #[serde(default, deserialize_with = "null_as_default")]
    pub itinerary: Vec<Day>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Hero {
    #[serde(deserialize_with = "deserialize_text")]
    pub title: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub subtitle: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub destination: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub duration: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub budget: String,
    #[serde(deserialize_with = "deserialize_text_list")]
    pub highlights: Vec<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub hero_image: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Day {
    #[serde(default, deserialize_with = "deserialize_day_number")]
    pub day: u32,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: City,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activities: Vec<Activity>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub accommodation: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct City {
    #[serde(deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub name_en: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub description: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub image: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    MustSee,
    MustDo,
    Recommended,
    #[default]
    #[serde(other)]
    Optional,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Activity {
    #[serde(deserialize_with = "deserialize_text")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub time: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub title: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub subtitle: String,
    #[serde(rename = "type", deserialize_with = "deserialize_text")]
    pub activity_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(deserialize_with = "deserialize_text")]
    pub location: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub price: String,
    #[serde(deserialize_with = "deserialize_optional_rating")]
    pub rating: Option<f32>,
    #[serde(deserialize_with = "deserialize_text")]
    pub description: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub tips: String,
}

fn value_as_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_as_text(value).unwrap_or_default())
}

fn deserialize_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items.into_iter().filter_map(value_as_text).collect(),
        other => value_as_text(other).into_iter().collect(),
    })
}

/// Zero when unreadable; callers renumber days by position.
fn deserialize_day_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .unwrap_or(0))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_optional_rating<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64().map(|f| f as f32)),
        Some(serde_json::Value::String(s)) => Ok(s.trim().parse::<f32>().ok()),
        _ => Ok(None),
    }
}

impl Plan {
    /// Checks the shape the enrichment pass relies on: at least one day, and
    /// day numbers running 1..=N in array order.
    pub fn validate_for_enrichment(&self) -> Result<(), String> {
        if self.itinerary.is_empty() {
            return Err(format!("plan {} has an empty itinerary", self.trip_id));
        }
        for (index, day) in self.itinerary.iter().enumerate() {
            let expected = index as u32 + 1;
            if day.day != expected {
                return Err(format!(
                    "plan {} has day {} at position {}",
                    self.trip_id, day.day, expected
                ));
            }
        }
        Ok(())
    }

    /// Rewrites `day` numbers to match array order.
    pub fn renumber_days(&mut self) {
        for (index, day) in self.itinerary.iter_mut().enumerate() {
            day.day = index as u32 + 1;
        }
    }

    /// Ordered day cities, with consecutive repeats collapsed.
    pub fn city_route(&self) -> Vec<String> {
        let mut cities: Vec<String> = Vec::new();
        for day in &self.itinerary {
            let city = day.city.display_name();
            if city.is_empty() {
                continue;
            }
            if cities.last().map(|last| last != city).unwrap_or(true) {
                cities.push(city.to_string());
            }
        }
        cities
    }

    /// Number of distinct (non-empty) city names across days.
    pub fn distinct_city_count(&self) -> usize {
        let mut seen: Vec<&str> = Vec::new();
        for day in &self.itinerary {
            let city = day.city.display_name();
            if !city.is_empty() && !seen.contains(&city) {
                seen.push(city);
            }
        }
        seen.len()
    }
}

impl City {
    /// Name used for lookups; the English name geocodes more reliably.
    pub fn display_name(&self) -> &str {
        let english = self.name_en.trim();
        if english.is_empty() {
            self.name.trim()
        } else {
            english
        }
    }
}

impl Day {
    pub fn has_overnight_stay(&self) -> bool {
        let stay = self.accommodation.trim();
        !stay.is_empty() && !stay.eq_ignore_ascii_case(NO_OVERNIGHT_STAY)
    }

    /// Geocoding queries of the activities that have one, in activity order.
    pub fn activity_queries(&self) -> Vec<String> {
        self.activities
            .iter()
            .filter_map(|activity| activity.geocode_query(&self.city))
            .collect()
    }
}

impl Activity {
    /// Location suffixed with the day's city, or `None` when the activity has
    /// no location to look up.
    pub fn geocode_query(&self, city: &City) -> Option<String> {
        let location = self.location.trim();
        if location.is_empty() {
            return None;
        }
        let city = city.display_name();
        if city.is_empty() || location.contains(city) {
            Some(location.to_string())
        } else {
            Some(format!("{}, {}", location, city))
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn activity(id: &str, location: &str) -> Activity {
        Activity {
            id: id.to_string(),
            time: "09:00 - 11:00".to_string(),
            title: format!("Visit {}", location),
            location: location.to_string(),
            ..Default::default()
        }
    }

    pub fn day(day: u32, city: &str, activities: Vec<Activity>, accommodation: &str) -> Day {
        Day {
            day,
            date: format!("2025-05-{:02}", day),
            city: City {
                name: city.to_string(),
                name_en: city.to_string(),
                ..Default::default()
            },
            activities,
            accommodation: accommodation.to_string(),
        }
    }

    pub fn plan(trip_id: &str, itinerary: Vec<Day>) -> Plan {
        Plan {
            trip_id: trip_id.to_string(),
            theme: "culture".to_string(),
            hero: Hero {
                title: format!("{} getaway", trip_id),
                destination: "Japan".to_string(),
                ..Default::default()
            },
            itinerary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn llm_shaped_activity_is_read_leniently() {
        let activity: Activity = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "time": "09:00 - 10:30",
            "title": "Fushimi Inari",
            "type": "culture",
            "priority": "must_see",
            "location": "Fushimi Inari Taisha",
            "price": 0,
            "rating": "4.8"
        }))
        .unwrap();
        assert_eq!(activity.priority, Priority::MustSee);
        assert_eq!(activity.price, "0");
        assert_eq!(activity.rating, Some(4.8));
        assert_eq!(activity.activity_type, "culture");
    }

    #[test]
    fn null_fields_read_as_empty() {
        let day: Day = serde_json::from_value(serde_json::json!({
            "day": "2",
            "date": null,
            "city": { "name": "Nara", "name_en": null },
            "activities": [
                { "title": "Deer park", "subtitle": null, "tips": null, "priority": null }
            ],
            "accommodation": null
        }))
        .unwrap();
        assert_eq!(day.day, 2);
        assert_eq!(day.date, "");
        assert_eq!(day.city.display_name(), "Nara");
        assert_eq!(day.activities[0].tips, "");
        assert_eq!(day.activities[0].priority, Priority::Optional);
        assert!(!day.has_overnight_stay());

        let hero: Hero = serde_json::from_value(serde_json::json!({
            "title": "Nara",
            "subtitle": null,
            "highlights": ["deer", null, 3]
        }))
        .unwrap();
        assert_eq!(hero.subtitle, "");
        assert_eq!(hero.highlights, vec!["deer", "3"]);
    }

    #[test]
    fn unreadable_day_number_reads_as_zero() {
        let day: Day =
            serde_json::from_value(serde_json::json!({ "day": "first", "activities": null }))
                .unwrap();
        assert_eq!(day.day, 0);
        assert!(day.activities.is_empty());
    }

    #[test]
    fn unknown_priority_reads_as_optional() {
        let activity: Activity =
            serde_json::from_value(serde_json::json!({ "priority": "nice_to_have" })).unwrap();
        assert_eq!(activity.priority, Priority::Optional);
    }

    #[test]
    fn no_stay_sentinel_is_case_insensitive() {
        assert!(!day(3, "Osaka", vec![], "None").has_overnight_stay());
        assert!(!day(3, "Osaka", vec![], "  ").has_overnight_stay());
        assert!(day(2, "Osaka", vec![], "Namba").has_overnight_stay());
    }

    #[test]
    fn geocode_query_appends_city_once() {
        let city = City {
            name: "Kyoto".into(),
            ..Default::default()
        };
        assert_eq!(
            activity("a", "Kiyomizu-dera").geocode_query(&city).as_deref(),
            Some("Kiyomizu-dera, Kyoto")
        );
        assert_eq!(
            activity("a", "Kyoto Station").geocode_query(&city).as_deref(),
            Some("Kyoto Station")
        );
        assert_eq!(activity("a", "   ").geocode_query(&city), None);
    }

    #[test]
    fn day_numbers_must_match_positions() {
        let mut plan = plan(
            "t1",
            vec![day(1, "Tokyo", vec![], "Shinjuku"), day(3, "Kyoto", vec![], "none")],
        );
        assert!(plan.validate_for_enrichment().is_err());
        plan.renumber_days();
        assert!(plan.validate_for_enrichment().is_ok());
    }

    #[test]
    fn city_route_collapses_consecutive_repeats() {
        let plan = plan(
            "t1",
            vec![
                day(1, "Tokyo", vec![], "a"),
                day(2, "Tokyo", vec![], "a"),
                day(3, "Kyoto", vec![], "b"),
                day(4, "Tokyo", vec![], "none"),
            ],
        );
        assert_eq!(plan.city_route(), vec!["Tokyo", "Kyoto", "Tokyo"]);
        assert_eq!(plan.distinct_city_count(), 2);
    }
}
