//! Trip agent - plans short city trips from a single sentence
//!
//! A planning model proposes a sequence of tool calls (POI lookup, weather
//! lookup, itinerary synthesis); the agent validates it, runs it step by step
//! against the tool adapters, and returns whatever it managed to gather along
//! with a log of tool calls and step errors.

pub mod agent;
pub mod cli;
pub mod config;
pub mod context;
pub mod memory;
pub mod model;
pub mod parse;
pub mod protocol;
pub mod render;
pub mod server;
pub mod tools;
pub mod validation;
