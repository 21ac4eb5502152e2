// src/agent/mod.rs

mod executor;

use tracing::info;

use crate::context::Context;
use crate::model::TripRequest;
use crate::parse::{ParseError, parse_trip_sentence};
use crate::protocol::{LLMPlanner, Plan, Planner, ResultEnvelope, TripResponse};
use crate::tools::ItinerarySynthesizer;

pub trait Agent {
    fn plan(&self, request: &TripRequest) -> Plan;
    fn execute(&self, request: &TripRequest, plan: &Plan) -> ResultEnvelope;

    /// Plan then execute. Never fails: step failures end up in the envelope.
    fn run(&self, request: &TripRequest) -> ResultEnvelope {
        let plan = self.plan(request);
        self.execute(request, &plan)
    }
}

/// The trip planning orchestrator.
///
/// Stateless between requests; every call to [`Agent::execute`] builds its own
/// [`RunState`](crate::memory::RunState), so one agent can serve concurrent requests.
pub struct TripAgent {
    context: Context,
    planner: Box<dyn Planner>,
    synthesizer: ItinerarySynthesizer,
}

impl TripAgent {
    pub fn new(context: Context) -> Self {
        let planner = LLMPlanner::new(context.llm.clone(), context.poi_limit);
        let synthesizer = ItinerarySynthesizer::new(context.llm.clone());
        Self {
            context,
            planner: Box::new(planner),
            synthesizer,
        }
    }

    pub fn with_planner<P: Planner + 'static>(mut self, planner: P) -> Self {
        self.planner = Box::new(planner);
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The inbound operation: sentence in, status-tagged envelope out.
    /// Only a malformed sentence is a request-level failure.
    pub fn handle_query(&self, sentence: &str) -> Result<TripResponse, ParseError> {
        let request = parse_trip_sentence(sentence)?;
        info!(
            "planning {} {}..{} ({} day(s))",
            request.city(),
            request.start_date(),
            request.end_date(),
            request.day_count()
        );
        let response = TripResponse::from(self.run(&request));
        info!(
            "request finished: status={:?} tools_called={} errors={}",
            response.status,
            response.result.meta.tools_called.len(),
            response.result.meta.errors.len()
        );
        Ok(response)
    }
}

impl Agent for TripAgent {
    fn plan(&self, request: &TripRequest) -> Plan {
        self.planner.generate_plan(request)
    }

    fn execute(&self, request: &TripRequest, plan: &Plan) -> ResultEnvelope {
        self.execute_plan(request, plan)
    }
}
