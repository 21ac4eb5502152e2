// src/protocol/mod.rs

pub mod args;
pub mod planner;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};

use crate::model::{Itinerary, PoiResult, TripRequest, WeatherResult};
use crate::tools::ToolError;

pub use args::StepArgs;
pub use planner::{LLMPlanner, Planner};

pub const POI_TOOL: &str = "POI_TOOL";
pub const WEATHER_TOOL: &str = "WEATHER_TOOL";
pub const ITINERARY_CREATOR: &str = "ITINERARY_CREATOR";

/// The fixed set of actions a plan may contain.
///
/// Model output is parsed into this enum; anything that is not one of the
/// three known tools is kept verbatim in `Unknown` so the executor can report
/// it instead of silently dropping it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    FindPois,
    FindWeather,
    BuildItinerary,
    Unknown(String),
}

impl Action {
    /// Accepts the wire tags and the descriptive names, case-insensitively.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "POI_TOOL" | "FINDPOIS" | "FIND_POIS" => Action::FindPois,
            "WEATHER_TOOL" | "FINDWEATHER" | "FIND_WEATHER" => Action::FindWeather,
            "ITINERARY_CREATOR" | "BUILDITINERARY" | "BUILD_ITINERARY" => Action::BuildItinerary,
            _ => Action::Unknown(tag.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Action::FindPois => POI_TOOL,
            Action::FindWeather => WEATHER_TOOL,
            Action::BuildItinerary => ITINERARY_CREATOR,
            Action::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Action::from_tag(&tag))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub action: Action,
    #[serde(default)]
    pub args: StepArgs,
}

impl PlanStep {
    pub fn new(action: Action, args: StepArgs) -> Self {
        Self { action, args }
    }

    /// Lenient conversion from untrusted JSON. Never fails: a step without a
    /// usable action string becomes `Action::Unknown` carrying whatever was there.
    pub fn from_value(value: &Value) -> Self {
        let action = match value.get("action") {
            Some(Value::String(tag)) => Action::from_tag(tag),
            Some(other) => Action::Unknown(other.to_string()),
            None => Action::Unknown(value.to_string()),
        };
        let args = value
            .get("args")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Self { action, args }
    }

    pub fn find_pois(city: &str, limit: usize) -> Self {
        Self::new(Action::FindPois, args::object(json!({ "city": city, "limit": limit })))
    }

    pub fn find_weather(request: &TripRequest) -> Self {
        Self::new(
            Action::FindWeather,
            args::object(json!({
                "lat": null,
                "lon": null,
                "start_date": request.start_date(),
                "end_date": request.end_date(),
            })),
        )
    }

    pub fn build_itinerary(request: &TripRequest) -> Self {
        Self::new(
            Action::BuildItinerary,
            args::object(json!({
                "start_date": request.start_date(),
                "end_date": request.end_date(),
                "preferences": request.preferences(),
            })),
        )
    }
}

/// Where a plan came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanSource {
    Model,
    Fallback,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    pub source: PlanSource,
}

impl Plan {
    pub fn from_model(steps: Vec<PlanStep>) -> Self {
        Self {
            steps,
            source: PlanSource::Model,
        }
    }

    /// The statically known plan used whenever the model's plan is unusable:
    /// POIs, then weather (coordinates resolved at run time), then the itinerary.
    pub fn fallback(request: &TripRequest, poi_limit: usize) -> Self {
        Self {
            steps: vec![
                PlanStep::find_pois(request.city(), poi_limit),
                PlanStep::find_weather(request),
                PlanStep::build_itinerary(request),
            ],
            source: PlanSource::Fallback,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PoiLookup,
    WeatherLookup,
    UnknownAction,
}

/// A step-level failure surfaced to the caller. Never aborts the request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepError {
    pub tool: String,
    pub error: String,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<PlanStep>,
}

impl StepError {
    pub fn unknown_action(step: &PlanStep) -> Self {
        Self {
            tool: step.action.tag().to_string(),
            error: "unknown action".to_string(),
            kind: ErrorKind::UnknownAction,
            step: Some(step.clone()),
        }
    }
}

impl From<&ToolError> for StepError {
    fn from(err: &ToolError) -> Self {
        let (tool, kind) = match err {
            ToolError::Poi(_) => (POI_TOOL, ErrorKind::PoiLookup),
            ToolError::Weather(_) => (WEATHER_TOOL, ErrorKind::WeatherLookup),
        };
        Self {
            tool: tool.to_string(),
            error: err.to_string(),
            kind,
            step: None,
        }
    }
}

/// One successful tool call, in the order it happened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "result", rename_all = "lowercase")]
pub enum Invocation {
    Poi(PoiResult),
    Weather(WeatherResult),
    Itinerary(Itinerary),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub tools_called: Vec<Invocation>,
    pub errors: Vec<StepError>,
}

/// Everything one request produced: whichever results were obtained plus the
/// ordered invocation log and error list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub weather: Option<WeatherResult>,
    pub pois: Option<PoiResult>,
    pub itinerary: Option<Itinerary>,
    pub meta: Meta,
}

impl ResultEnvelope {
    pub fn status(&self) -> Status {
        if self.meta.errors.is_empty() {
            Status::Ok
        } else {
            Status::Partial
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Partial,
}

/// Body returned to the caller of the plan operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripResponse {
    pub status: Status,
    pub result: ResultEnvelope,
}

impl From<ResultEnvelope> for TripResponse {
    fn from(result: ResultEnvelope) -> Self {
        Self {
            status: result.status(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Preferences;
    use chrono::NaiveDate;

    fn request() -> TripRequest {
        TripRequest::new(
            "Paris",
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            Preferences::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_action_tags_round_trip_through_from_tag() {
        for action in [Action::FindPois, Action::FindWeather, Action::BuildItinerary] {
            assert_eq!(Action::from_tag(action.tag()), action);
        }
        assert_eq!(Action::from_tag("findpois"), Action::FindPois);
        assert_eq!(Action::from_tag("BuildItinerary"), Action::BuildItinerary);
        assert_eq!(Action::from_tag("BOOK_HOTEL"), Action::Unknown("BOOK_HOTEL".into()));
    }

    #[test]
    fn test_step_from_value_keeps_unknown_tag_verbatim() {
        let step = PlanStep::from_value(&json!({"action": "Book_Hotel", "args": {"stars": 4}}));
        assert_eq!(step.action, Action::Unknown("Book_Hotel".into()));
        assert_eq!(step.args["stars"], 4);

        let step = PlanStep::from_value(&json!({"action": 7}));
        assert_eq!(step.action, Action::Unknown("7".into()));
        assert!(step.args.is_empty());
    }

    #[test]
    fn test_fallback_plan_shape() {
        let plan = Plan::fallback(&request(), 8);
        assert_eq!(plan.source, PlanSource::Fallback);
        let actions: Vec<_> = plan.steps.iter().map(|s| s.action.clone()).collect();
        assert_eq!(actions, vec![Action::FindPois, Action::FindWeather, Action::BuildItinerary]);
        assert_eq!(plan.steps[0].args["city"], "Paris");
        assert_eq!(plan.steps[0].args["limit"], 8);
        assert!(plan.steps[1].args["lat"].is_null());
        assert!(plan.steps[1].args["lon"].is_null());
        assert_eq!(plan.steps[1].args["start_date"], "2024-05-01");
        assert_eq!(plan.steps[2].args["end_date"], "2024-05-02");
        assert!(plan.steps[2].args["preferences"].is_object());
    }

    #[test]
    fn test_status_is_partial_iff_errors() {
        let mut envelope = ResultEnvelope::default();
        assert_eq!(envelope.status(), Status::Ok);

        envelope.meta.errors.push(StepError::unknown_action(&PlanStep::new(
            Action::Unknown("X".into()),
            StepArgs::new(),
        )));
        assert_eq!(envelope.status(), Status::Partial);

        let response = TripResponse::from(envelope);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "partial");
        assert_eq!(json["result"]["meta"]["errors"][0]["tool"], "X");
        assert_eq!(json["result"]["meta"]["errors"][0]["error"], "unknown action");
        assert_eq!(json["result"]["meta"]["errors"][0]["kind"], "unknown_action");
        assert_eq!(json["result"]["meta"]["errors"][0]["step"]["action"], "X");
    }

    #[test]
    fn test_invocation_wire_format() {
        let invocation = Invocation::Itinerary(Itinerary::default());
        let json = serde_json::to_value(&invocation).unwrap();
        assert_eq!(json, json!({"tool": "itinerary", "result": {"days": []}}));
    }
}
