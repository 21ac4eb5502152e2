// src/validation/plan.rs

use serde_json::{Value, json};

use crate::protocol::Action;

#[derive(Debug)]
pub enum PlanValidationError {
    NotAnObject,
    MissingField(&'static str),
    UnknownAction(String),
    ArgsNotAnObject(String),
    InvalidArgument {
        action: String,
        field: &'static str,
        reason: &'static str,
    },
}

impl PlanValidationError {
    pub fn hint(&self) -> (String, Option<Value>) {
        match self {
            PlanValidationError::NotAnObject => (
                "Plan step is not a JSON object.".to_string(),
                Some(json!({ "action": "POI_TOOL", "args": { "city": "..." } })),
            ),
            PlanValidationError::MissingField(field) => (
                "Missing required field.".to_string(),
                Some(json!({ field.to_string(): "<required>" })),
            ),
            PlanValidationError::UnknownAction(tag) => (
                format!("Unknown action '{}'. Only POI_TOOL, WEATHER_TOOL and ITINERARY_CREATOR exist.", tag),
                None,
            ),
            PlanValidationError::ArgsNotAnObject(action) => (
                "Step 'args' must be an object.".to_string(),
                Some(json!({ "action": action, "args": {} })),
            ),
            PlanValidationError::InvalidArgument { action, field, reason } => (
                format!("Argument '{}' of {} {}; it will be backfilled.", field, action, reason),
                None,
            ),
        }
    }
}

/// Structural checks on a model-proposed plan. Issues are advisory: the
/// executor coerces or backfills arguments and reports unknown actions itself.
pub fn validate_plan(plan: &[Value]) -> Vec<PlanValidationError> {
    let mut errors = Vec::new();

    for step in plan {
        if !step.is_object() {
            errors.push(PlanValidationError::NotAnObject);
            continue;
        }
        let Some(tag) = step.get("action").and_then(Value::as_str) else {
            errors.push(PlanValidationError::MissingField("action"));
            continue;
        };

        let action = Action::from_tag(tag);
        if let Action::Unknown(tag) = &action {
            errors.push(PlanValidationError::UnknownAction(tag.clone()));
            continue;
        }

        let args = match step.get("args") {
            None | Some(Value::Null) => continue,
            Some(Value::Object(args)) => args,
            Some(_) => {
                errors.push(PlanValidationError::ArgsNotAnObject(action.tag().to_string()));
                continue;
            }
        };

        let mut invalid = |field: &'static str, reason: &'static str| {
            errors.push(PlanValidationError::InvalidArgument {
                action: action.tag().to_string(),
                field,
                reason,
            })
        };

        match action {
            Action::FindPois => {
                if let Some(limit) = args.get("limit") {
                    if !limit.is_u64() && !limit.is_null() {
                        invalid("limit", "is not a positive integer");
                    }
                }
            }
            Action::FindWeather => {
                for field in ["lat", "lon"] {
                    if let Some(v) = args.get(field) {
                        if !v.is_number() && !v.is_null() {
                            invalid(field, "is not a number");
                        }
                    }
                }
            }
            Action::BuildItinerary => {
                if let Some(prefs) = args.get("preferences") {
                    if !prefs.is_object() && !prefs.is_null() {
                        invalid("preferences", "is not an object");
                    }
                }
            }
            Action::Unknown(_) => {}
        }

        if matches!(action, Action::FindWeather | Action::BuildItinerary) {
            for field in ["start_date", "end_date"] {
                if let Some(v) = args.get(field) {
                    let iso = v
                        .as_str()
                        .is_some_and(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok());
                    if !iso {
                        invalid(field, "is not a YYYY-MM-DD date");
                    }
                }
            }
        }
    }

    errors
}
