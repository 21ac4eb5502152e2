// src/agent/executor.rs

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::agent::TripAgent;
use crate::memory::RunState;
use crate::model::{Coordinate, TripRequest, day_count};
use crate::parse::MAX_TRIP_DAYS;
use crate::protocol::{Action, Plan, ResultEnvelope, StepArgs, StepError, args};
use crate::tools::{ToolError, WeatherError};

impl TripAgent {
    /// Walk the plan in order, one step at a time. A failing step is recorded
    /// and execution moves on; nothing here aborts the request.
    pub(super) fn execute_plan(&self, request: &TripRequest, plan: &Plan) -> ResultEnvelope {
        let mut state = RunState::new(request);
        debug!("executing {:?} plan with {} step(s)", plan.source, plan.steps.len());

        for (index, step) in plan.steps.iter().enumerate() {
            debug!("step {}: {}", index + 1, step.action);
            let outcome = match &step.action {
                Action::FindPois => self.find_pois(&mut state, &step.args),
                Action::FindWeather => self.find_weather(&mut state, &step.args),
                Action::BuildItinerary => {
                    self.build_itinerary(&mut state, &step.args);
                    Ok(())
                }
                Action::Unknown(tag) => {
                    warn!("step {}: unknown action '{}'", index + 1, tag);
                    state.record_error(StepError::unknown_action(step));
                    continue;
                }
            };

            if let Err(err) = outcome {
                warn!("step {} ({}) failed: {}", index + 1, step.action, err);
                state.record_error(StepError::from(&err));
            }
        }

        state.into_envelope()
    }

    fn find_pois(&self, state: &mut RunState<'_>, args: &StepArgs) -> Result<(), ToolError> {
        let city = args::string(args, "city").unwrap_or(state.request().city());
        let limit = args::count(args, "limit").unwrap_or(self.context.poi_limit);

        let result = self.context.pois.find_pois(city, limit)?;
        debug!("found {} POI(s) for {}", result.pois.len(), city);
        state.store_pois(result);
        Ok(())
    }

    fn find_weather(&self, state: &mut RunState<'_>, args: &StepArgs) -> Result<(), ToolError> {
        let center = match (args::float(args, "lat"), args::float(args, "lon")) {
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon),
            _ => self.resolve_center(state)?,
        };
        let (start, end) = date_range(args, state.request());

        let result = self.context.weather.get_weather(center, start, end)?;
        debug!("got {} daily forecast(s)", result.daily.len());
        state.store_weather(result);
        Ok(())
    }

    /// Coordinates for a weather step that did not carry any: the center of
    /// the POI result if there is one, otherwise a one-item POI lookup whose
    /// result fills the (empty) POI slot.
    fn resolve_center(&self, state: &mut RunState<'_>) -> Result<Coordinate, WeatherError> {
        if let Some(pois) = state.pois() {
            return Ok(pois.center);
        }

        let city = state.request().city();
        debug!("no coordinates yet, geocoding {} with a 1-item POI lookup", city);
        let result = self
            .context
            .pois
            .find_pois(city, 1)
            .map_err(WeatherError::Coordinates)?;
        let center = result.center;
        state.store_pois(result);
        Ok(center)
    }

    fn build_itinerary(&self, state: &mut RunState<'_>, args: &StepArgs) {
        let request = state.request();
        let (start, end) = date_range(args, request);
        let preferences = args::map(args, "preferences").unwrap_or(request.preferences());

        let pois = state.pois().map(|r| r.pois.as_slice()).unwrap_or_default();
        let weather = state.weather().map(|r| r.daily.as_slice()).unwrap_or_default();
        let itinerary = self.synthesizer.synthesize(pois, weather, start, end, preferences);

        state.store_itinerary(itinerary);
    }
}

/// Step dates when they form a sane range, otherwise the request's.
fn date_range(args: &StepArgs, request: &TripRequest) -> (NaiveDate, NaiveDate) {
    let start = args::date(args, "start_date").unwrap_or(request.start_date());
    let end = args::date(args, "end_date").unwrap_or(request.end_date());
    if start <= end && day_count(start, end) <= MAX_TRIP_DAYS {
        (start, end)
    } else {
        debug!("ignoring step date range {}..{}", start, end);
        (request.start_date(), request.end_date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::context::Context;
    use crate::model::{DailyWeather, Poi, PoiResult, Preferences, WeatherResult, nth_day};
    use crate::protocol::{ErrorKind, Invocation, PlanStep, Status, args::object};
    use crate::tools::{LlmError, PlanningModel, PoiError, PoiProvider, WeatherProvider};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakePois {
        fail: bool,
        calls: Arc<Mutex<Vec<(String, usize)>>>,
    }

    impl PoiProvider for FakePois {
        fn name(&self) -> &str {
            "fake-pois"
        }

        fn find_pois(&self, city: &str, limit: usize) -> Result<PoiResult, PoiError> {
            self.calls.lock().unwrap().push((city.to_string(), limit));
            if self.fail {
                return Err(PoiError::Geocoding { city: city.to_string() });
            }
            Ok(PoiResult {
                city: city.to_string(),
                center: Coordinate::new(41.9, 12.5),
                pois: (0..limit.min(5))
                    .map(|i| Poi {
                        name: format!("{city} sight {i}"),
                        category: "attraction".into(),
                        lat: Some(41.9),
                        lon: Some(12.5),
                        short_desc: String::new(),
                    })
                    .collect(),
            })
        }
    }

    #[derive(Clone, Default)]
    struct FakeWeather {
        calls: Arc<Mutex<Vec<(Coordinate, NaiveDate, NaiveDate)>>>,
    }

    impl WeatherProvider for FakeWeather {
        fn name(&self) -> &str {
            "fake-weather"
        }

        fn get_weather(&self, at: Coordinate, start: NaiveDate, end: NaiveDate) -> Result<WeatherResult, WeatherError> {
            self.calls.lock().unwrap().push((at, start, end));
            Ok(WeatherResult {
                lat: at.lat,
                lon: at.lon,
                daily: (0..day_count(start, end))
                    .map(|i| DailyWeather {
                        date: nth_day(start, i).unwrap(),
                        summary: "Clear".into(),
                        max_temp: Some(25.0),
                        min_temp: Some(15.0),
                        weathercode: Some(0),
                    })
                    .collect(),
            })
        }
    }

    fn request() -> TripRequest {
        TripRequest::new(
            "Rome",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            Preferences::new(),
        )
        .unwrap()
    }

    fn agent(pois: &FakePois, weather: &FakeWeather) -> TripAgent {
        TripAgent::new(Context::new(pois.clone(), weather.clone()))
    }

    fn step(action: &str, args: serde_json::Value) -> PlanStep {
        PlanStep::new(Action::from_tag(action), object(args))
    }

    #[test]
    fn test_fallback_plan_happy_path() {
        let (pois, weather) = (FakePois::default(), FakeWeather::default());
        let request = request();
        let envelope = agent(&pois, &weather).execute(&request, &Plan::fallback(&request, 8));

        assert_eq!(envelope.status(), Status::Ok);
        assert_eq!(*pois.calls.lock().unwrap(), vec![("Rome".to_string(), 8)]);
        let weather_calls = weather.calls.lock().unwrap();
        assert_eq!(weather_calls[0].0, Coordinate::new(41.9, 12.5));
        assert_eq!(envelope.itinerary.as_ref().unwrap().days.len(), 2);
        assert_eq!(envelope.itinerary.unwrap().days[0].notes, "Check weather: Clear");

        let tools: Vec<_> = envelope
            .meta
            .tools_called
            .iter()
            .map(|i| match i {
                Invocation::Poi(_) => "poi",
                Invocation::Weather(_) => "weather",
                Invocation::Itinerary(_) => "itinerary",
            })
            .collect();
        assert_eq!(tools, vec!["poi", "weather", "itinerary"]);
    }

    #[test]
    fn test_pois_step_backfills_city_and_limit() {
        let (pois, weather) = (FakePois::default(), FakeWeather::default());
        let plan = Plan::from_model(vec![
            step("POI_TOOL", json!({})),
            step("POI_TOOL", json!({"city": "Milan", "limit": "3"})),
            step("POI_TOOL", json!({"city": "", "limit": 0})),
        ]);
        agent(&pois, &weather).execute(&request(), &plan);

        assert_eq!(
            *pois.calls.lock().unwrap(),
            vec![("Rome".to_string(), 8), ("Milan".to_string(), 3), ("Rome".to_string(), 8)]
        );
    }

    #[test]
    fn test_weather_with_explicit_coordinates_skips_geocoding() {
        let (pois, weather) = (FakePois::default(), FakeWeather::default());
        let plan = Plan::from_model(vec![step(
            "WEATHER_TOOL",
            json!({"lat": "45.4", "lon": 9.19, "start_date": "2024-06-02", "end_date": "2024-06-02"}),
        )]);
        let envelope = agent(&pois, &weather).execute(&request(), &plan);

        assert!(pois.calls.lock().unwrap().is_empty());
        let calls = weather.calls.lock().unwrap();
        assert_eq!(calls[0].0, Coordinate::new(45.4, 9.19));
        assert_eq!(calls[0].1, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        assert!(envelope.pois.is_none());
        assert_eq!(envelope.weather.unwrap().daily.len(), 1);
    }

    #[test]
    fn test_weather_without_coordinates_geocodes_once_and_keeps_result() {
        let (pois, weather) = (FakePois::default(), FakeWeather::default());
        let plan = Plan::from_model(vec![
            step("WEATHER_TOOL", json!({"lat": null})),
            step("ITINERARY_CREATOR", json!({})),
        ]);
        let envelope = agent(&pois, &weather).execute(&request(), &plan);

        assert_eq!(*pois.calls.lock().unwrap(), vec![("Rome".to_string(), 1)]);
        assert_eq!(envelope.pois.as_ref().unwrap().pois.len(), 1);
        assert!(matches!(envelope.meta.tools_called[0], Invocation::Poi(_)));
        assert!(matches!(envelope.meta.tools_called[1], Invocation::Weather(_)));
        let days = envelope.itinerary.unwrap().days;
        assert_eq!(days[0].morning.as_deref(), Some("Rome sight 0"));
        assert_eq!(days[0].evening.as_deref(), Some("Free"));
    }

    #[test]
    fn test_failed_geocoding_is_a_weather_error_and_execution_continues() {
        let pois = FakePois {
            fail: true,
            ..Default::default()
        };
        let weather = FakeWeather::default();
        let request = request();
        let envelope = agent(&pois, &weather).execute(&request, &Plan::fallback(&request, 8));

        assert_eq!(envelope.status(), Status::Partial);
        assert!(weather.calls.lock().unwrap().is_empty());
        let kinds: Vec<_> = envelope.meta.errors.iter().map(|e| (e.tool.as_str(), e.kind)).collect();
        assert_eq!(
            kinds,
            vec![("POI_TOOL", ErrorKind::PoiLookup), ("WEATHER_TOOL", ErrorKind::WeatherLookup)]
        );
        assert!(envelope.meta.errors[1].error.contains("Could not resolve coordinates"));
        assert!(envelope.pois.is_none());
        assert!(envelope.weather.is_none());
        assert_eq!(envelope.itinerary.unwrap().days.len(), 2);
    }

    #[test]
    fn test_unknown_action_is_recorded_verbatim_and_skipped() {
        let (pois, weather) = (FakePois::default(), FakeWeather::default());
        let plan = Plan::from_model(vec![
            step("book_hotel", json!({"stars": 5})),
            step("ITINERARY_CREATOR", json!({})),
        ]);
        let envelope = agent(&pois, &weather).execute(&request(), &plan);

        assert_eq!(envelope.meta.errors.len(), 1);
        let error = &envelope.meta.errors[0];
        assert_eq!(error.tool, "book_hotel");
        assert_eq!(error.error, "unknown action");
        assert_eq!(error.step.as_ref().unwrap().args["stars"], 5);
        assert!(envelope.itinerary.is_some());
    }

    #[test]
    fn test_itinerary_uses_step_range_and_rejects_inverted_range() {
        let (pois, weather) = (FakePois::default(), FakeWeather::default());
        let plan = Plan::from_model(vec![
            step("ITINERARY_CREATOR", json!({"start_date": "2024-06-01", "end_date": "2024-06-04"})),
        ]);
        let envelope = agent(&pois, &weather).execute(&request(), &plan);
        assert_eq!(envelope.itinerary.unwrap().days.len(), 4);

        let plan = Plan::from_model(vec![
            step("ITINERARY_CREATOR", json!({"start_date": "2024-06-09", "end_date": "2024-06-01"})),
        ]);
        let envelope = agent(&pois, &weather).execute(&request(), &plan);
        assert_eq!(envelope.itinerary.unwrap().days.len(), 2);
    }

    /// Fails every call but keeps the prompts it was given.
    #[derive(Clone, Default)]
    struct RecordingModel {
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl PlanningModel for RecordingModel {
        fn name(&self) -> &str {
            "recording"
        }

        fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Err(LlmError::Disabled)
        }
    }

    #[test]
    fn test_itinerary_step_passes_preferences_to_synthesizer() {
        let model = RecordingModel::default();
        let context = Context::new(FakePois::default(), FakeWeather::default()).with_llm(model.clone());
        let agent = TripAgent::new(context);
        let request = TripRequest::new(
            "Rome",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            object(json!({"pace": "slow"})),
        )
        .unwrap();

        let plan = Plan::from_model(vec![
            step("ITINERARY_CREATOR", json!({"preferences": {"budget": "low"}})),
            step("ITINERARY_CREATOR", json!({"preferences": "lots of museums"})),
        ]);
        agent.execute(&request, &plan);

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains(r#""budget": "low""#));
        assert!(!prompts[0].contains(r#""pace""#));
        assert!(prompts[1].contains(r#""pace": "slow""#));
        assert!(!prompts[1].contains("lots of museums"));
    }

    /// Returns forecasts with the scripted number of days, in order.
    struct ScriptedWeather {
        days: Mutex<Vec<usize>>,
    }

    impl WeatherProvider for ScriptedWeather {
        fn name(&self) -> &str {
            "scripted-weather"
        }

        fn get_weather(&self, at: Coordinate, start: NaiveDate, _end: NaiveDate) -> Result<WeatherResult, WeatherError> {
            let count = self.days.lock().unwrap().remove(0);
            Ok(WeatherResult {
                lat: at.lat,
                lon: at.lon,
                daily: (0..count)
                    .map(|i| DailyWeather {
                        date: nth_day(start, i).unwrap(),
                        summary: "Clear".into(),
                        max_temp: None,
                        min_temp: None,
                        weathercode: Some(0),
                    })
                    .collect(),
            })
        }
    }

    #[test]
    fn test_empty_second_forecast_does_not_clear_weather() {
        let weather = ScriptedWeather {
            days: Mutex::new(vec![1, 0]),
        };
        let agent = TripAgent::new(Context::new(FakePois::default(), weather));
        let plan = Plan::from_model(vec![
            step("WEATHER_TOOL", json!({"lat": 1, "lon": 2})),
            step("WEATHER_TOOL", json!({"lat": 1, "lon": 2})),
        ]);
        let envelope = agent.execute(&request(), &plan);

        assert_eq!(envelope.weather.as_ref().unwrap().daily.len(), 1);
        assert_eq!(envelope.meta.tools_called.len(), 2);
        assert_eq!(envelope.status(), Status::Ok);
    }
}
