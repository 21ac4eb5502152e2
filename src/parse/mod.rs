// src/parse/mod.rs

//! Natural-language trip sentence parsing
//!
//! Extracts city, day count and start date from sentences such as
//! "Plan a 2-day trip to New Delhi starting tomorrow". Missing pieces are
//! defaulted; only contradictory or unreadable ones are rejected.

mod date;

use std::sync::LazyLock;

use chrono::{Days, Local, NaiveDate};
use regex::Regex;
use thiserror::Error;

use crate::model::{Preferences, TripRequest};

pub use date::interpret_date;

/// Longest trip the planner will lay out.
pub const MAX_TRIP_DAYS: usize = 366;

pub const UNKNOWN_CITY: &str = "Unknown";

static DAYS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)-day").unwrap());
static START_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bstarting\s+(.+)").unwrap());
static CITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btrip to\s+([\w\s'-]+?)\s*(?:\bstarting\b|[,.!?]|$)").unwrap());

/// Request-level failures: the sentence could not be turned into a trip.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Could not understand start date '{0}'")]
    UnrecognizedDate(String),

    #[error("Trip length must be between 1 and {max} days, got '{0}'", max = MAX_TRIP_DAYS)]
    InvalidDayCount(String),

    #[error("Start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Parse a trip sentence relative to the local current date.
pub fn parse_trip_sentence(sentence: &str) -> Result<TripRequest, ParseError> {
    parse_trip_sentence_on(sentence, Local::now().date_naive())
}

pub fn parse_trip_sentence_on(sentence: &str, today: NaiveDate) -> Result<TripRequest, ParseError> {
    let days = match DAYS_RE.captures(sentence) {
        Some(caps) => {
            let raw = &caps[1];
            raw.parse::<usize>()
                .ok()
                .filter(|n| (1..=MAX_TRIP_DAYS).contains(n))
                .ok_or_else(|| ParseError::InvalidDayCount(raw.to_string()))?
        }
        None => 1,
    };

    let start = match START_RE.captures(sentence) {
        Some(caps) => {
            let phrase = caps[1].trim();
            interpret_leading(phrase, today).ok_or_else(|| ParseError::UnrecognizedDate(phrase.to_string()))?
        }
        None => today,
    };

    let end = start
        .checked_add_days(Days::new(days as u64 - 1))
        .ok_or_else(|| ParseError::InvalidDayCount(days.to_string()))?;

    let city = CITY_RE
        .captures(sentence)
        .map(|caps| caps[1].trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| UNKNOWN_CITY.to_string());

    TripRequest::new(city, start, end, Preferences::new())
}

/// Interpret the longest leading run of words that reads as a date, so
/// "tomorrow with my family" still resolves.
fn interpret_leading(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    (1..=words.len())
        .rev()
        .find_map(|n| interpret_date(&words[..n].join(" "), today))
}
