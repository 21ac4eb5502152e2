// src/protocol/planner.rs

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::model::TripRequest;
use crate::protocol::{Plan, PlanStep};
use crate::tools::llm::extract_json_block;
use crate::tools::{PlanningModel, catalog};
use crate::validation::plan::validate_plan;

/// Trait for turning a trip request into an ordered tool plan.
pub trait Planner: Send + Sync {
    fn generate_plan(&self, request: &TripRequest) -> Plan;
}

/// Asks the planning model for a plan and substitutes the fixed three-step
/// plan whenever the call fails or the reply has no usable plan.
pub struct LLMPlanner {
    llm: Arc<dyn PlanningModel>,
    poi_limit: usize,
}

impl LLMPlanner {
    pub fn new(llm: Arc<dyn PlanningModel>, poi_limit: usize) -> Self {
        Self { llm, poi_limit }
    }

    fn prompt(&self, request: &TripRequest) -> String {
        let user_input = json!({
            "city": request.city(),
            "start_date": request.start_date(),
            "end_date": request.end_date(),
            "preferences": request.preferences(),
        });
        let tools = serde_json::to_string_pretty(&catalog()).unwrap_or_default();

        format!(
            r#"You are a planner agent. User requested travel plan:
{user_input}

You have access to these tools:
{tools}

Produce a JSON 'plan' listing steps. Each step is an object:
{{"action": "<TOOL_NAME>", "args": {{...}}}}
Only use the tool names above. The plan should be minimal and only call what is needed.
Respond with ONLY JSON: {{ "plan": [ ... ] }}
"#
        )
    }
}

impl Planner for LLMPlanner {
    fn generate_plan(&self, request: &TripRequest) -> Plan {
        let raw = match self.llm.complete(&self.prompt(request)) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("planning model unavailable, using fallback plan: {}", e);
                return Plan::fallback(request, self.poi_limit);
            }
        };

        match parse_plan(&raw) {
            Some(plan) => {
                info!("using {}-step plan from {}", plan.steps.len(), self.llm.name());
                plan
            }
            None => {
                warn!("planning model reply had no usable plan, using fallback plan");
                debug!("[raw]: {}", raw);
                Plan::fallback(request, self.poi_limit)
            }
        }
    }
}

/// Parse `{"plan": [...]}` out of a model reply. `None` when there is no JSON
/// object, no `plan` array, or the array is empty. Individual steps are
/// converted leniently; unknown actions survive for the executor to report.
pub fn parse_plan(raw: &str) -> Option<Plan> {
    let json = extract_json_block(raw)?;
    let parsed: Value = serde_json::from_str(json).ok()?;
    let steps = parsed.get("plan")?.as_array()?;
    if steps.is_empty() {
        return None;
    }

    for issue in validate_plan(steps) {
        let (msg, hint) = issue.hint();
        warn!("plan validation: {} ({:?})", msg, issue);
        if let Some(hint) = hint {
            debug!("→ hint: {}", hint);
        }
    }

    Some(Plan::from_model(steps.iter().map(PlanStep::from_value).collect()))
}
