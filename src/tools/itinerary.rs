// src/tools/itinerary.rs

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use tracing::{debug, warn};

use crate::model::{DailyWeather, DayPlan, Itinerary, Poi, Preferences, day_count, nth_day};
use crate::tools::PlanningModel;
use crate::tools::llm::extract_json_block;

pub const NOTES_PREFIX: &str = "Check weather: ";
pub const FREE_EVENING: &str = "Free";

/// Turns POIs and weather into a day-by-day itinerary, asking the planning
/// model first and falling back to a round-robin assignment.
pub struct ItinerarySynthesizer {
    llm: Arc<dyn PlanningModel>,
}

impl ItinerarySynthesizer {
    pub fn new(llm: Arc<dyn PlanningModel>) -> Self {
        Self { llm }
    }

    pub fn synthesize(
        &self,
        pois: &[Poi],
        weather_daily: &[DailyWeather],
        start: NaiveDate,
        end: NaiveDate,
        preferences: &Preferences,
    ) -> Itinerary {
        match self.draft(pois, weather_daily, start, end, preferences) {
            Some(itinerary) => {
                debug!("itinerary drafted by {}", self.llm.name());
                itinerary
            }
            None => fallback_itinerary(pois, weather_daily, start, end),
        }
    }

    fn draft(
        &self,
        pois: &[Poi],
        weather_daily: &[DailyWeather],
        start: NaiveDate,
        end: NaiveDate,
        preferences: &Preferences,
    ) -> Option<Itinerary> {
        let payload = json!({
            "instruction": "Create a logical day-by-day itinerary for the given date range.",
            "pois": pois,
            "weather_daily": weather_daily,
            "preferences": preferences,
            "start_date": start,
            "end_date": end,
        });
        let pretty = serde_json::to_string_pretty(&payload).ok()?;
        let prompt = format!(
            r#"Create an itinerary JSON using this payload:
{pretty}

Produce exactly one entry per calendar day from start_date to end_date inclusive.
Use POI names for activities and null for an empty slot.
Respond with ONLY JSON: {{"days": [{{"date": "YYYY-MM-DD", "morning": "...", "afternoon": "...", "evening": "...", "notes": "..."}}]}}"#
        );

        let raw = match self.llm.complete(&prompt) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("itinerary model unavailable, using fallback: {}", e);
                return None;
            }
        };

        let parsed = extract_json_block(&raw).and_then(|json| serde_json::from_str::<Itinerary>(json).ok());
        match parsed {
            Some(itinerary) if covers_range(&itinerary, start, end) => Some(itinerary),
            Some(itinerary) => {
                warn!(
                    "itinerary model returned {} day(s) that do not match {}..{}, using fallback",
                    itinerary.days.len(),
                    start,
                    end
                );
                None
            }
            None => {
                warn!("itinerary model reply was not valid itinerary JSON, using fallback");
                debug!("[raw]: {}", raw);
                None
            }
        }
    }
}

/// One entry per day of `start..=end`, in calendar order.
fn covers_range(itinerary: &Itinerary, start: NaiveDate, end: NaiveDate) -> bool {
    itinerary.days.len() == day_count(start, end)
        && itinerary
            .days
            .iter()
            .enumerate()
            .all(|(i, day)| nth_day(start, i) == Some(day.date))
}

/// Deterministic itinerary: day `i` takes POIs `3i`, `3i+1`, `3i+2` for
/// morning, afternoon and evening. Missing morning/afternoon slots are absent,
/// a missing evening is "Free". Always exactly one entry per day in range.
pub fn fallback_itinerary(
    pois: &[Poi],
    weather_daily: &[DailyWeather],
    start: NaiveDate,
    end: NaiveDate,
) -> Itinerary {
    let name_at = |i: usize| pois.get(i).map(|p| p.name.clone());

    let days = (0..day_count(start, end))
        .map_while(|i| {
            let date = nth_day(start, i)?;
            let notes = match weather_daily.get(i) {
                Some(weather) => format!("{NOTES_PREFIX}{}", weather.summary),
                None => NOTES_PREFIX.to_string(),
            };
            Some(DayPlan {
                date,
                morning: name_at(3 * i),
                afternoon: name_at(3 * i + 1),
                evening: name_at(3 * i + 2).or_else(|| Some(FREE_EVENING.to_string())),
                notes,
            })
        })
        .collect();

    Itinerary { days }
}
