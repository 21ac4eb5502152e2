// src/parse/date.rs

//! Free-text date interpretation for trip start phrases.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Regex;

static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^in (\d+|a|an|one|two|three|four|five|six|seven|eight|nine|ten) (day|days|week|weeks)$").unwrap()
});
static WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:(next|this) )?([a-z]+)$").unwrap());
static ORDINAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)\b").unwrap());

const WITH_YEAR: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%B %d %Y", "%d %B %Y"];
const WITHOUT_YEAR: [&str; 2] = ["%B %d %Y", "%d %B %Y"];

/// Resolve a phrase like "tomorrow", "next friday", "in 2 weeks", "2025-03-01"
/// or "Sep 24" against `today`. Month-day dates without a year pick the next
/// occurrence on or after `today`.
pub fn interpret_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = normalize(text);
    let text = text.as_str();

    match text {
        "today" | "now" => return Some(today),
        "tomorrow" => return today.checked_add_days(Days::new(1)),
        "yesterday" => return today.checked_sub_days(Days::new(1)),
        "day after tomorrow" => return today.checked_add_days(Days::new(2)),
        "next week" => return today.checked_add_days(Days::new(7)),
        _ => {}
    }

    if let Some(caps) = RELATIVE_RE.captures(text) {
        let n = number_word(&caps[1])?;
        let days = if caps[2].starts_with("week") { n.checked_mul(7)? } else { n };
        return today.checked_add_days(Days::new(days));
    }

    if let Some(caps) = WEEKDAY_RE.captures(text) {
        if let Some(target) = weekday(&caps[2]) {
            let strictly_after = caps.get(1).is_some_and(|m| m.as_str() == "next");
            return next_weekday(today, target, strictly_after);
        }
    }

    if let Some(date) = WITH_YEAR.iter().find_map(|f| NaiveDate::parse_from_str(text, f).ok()) {
        return Some(date);
    }

    let this_year = format!("{} {}", text, today.year());
    let date = WITHOUT_YEAR
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(&this_year, f).ok())?;
    if date >= today {
        Some(date)
    } else {
        date.with_year(today.year() + 1)
    }
}

fn normalize(text: &str) -> String {
    let lowered = text
        .trim()
        .trim_end_matches(['.', ',', '!', '?', ';'])
        .to_lowercase()
        .replace(',', " ");
    let stripped = ORDINAL_RE.replace_all(&lowered, "$1");
    let words: Vec<&str> = stripped
        .split_whitespace()
        .skip_while(|w| matches!(*w, "on" | "from" | "the"))
        .collect();
    words.join(" ")
}

fn number_word(word: &str) -> Option<u64> {
    let n = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        digits => return digits.parse().ok(),
    };
    Some(n)
}

fn weekday(word: &str) -> Option<Weekday> {
    let day = match word {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn next_weekday(today: NaiveDate, target: Weekday, strictly_after: bool) -> Option<NaiveDate> {
    let ahead = (7 + target.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
    let ahead = if ahead == 0 && strictly_after { 7 } else { ahead };
    today.checked_add_days(Days::new(ahead as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Wednesday
    fn today() -> NaiveDate {
        day(2024, 5, 15)
    }

    #[test]
    fn test_relative_words() {
        assert_eq!(interpret_date("today", today()), Some(today()));
        assert_eq!(interpret_date("Tomorrow.", today()), Some(day(2024, 5, 16)));
        assert_eq!(interpret_date("the day after tomorrow", today()), Some(day(2024, 5, 17)));
        assert_eq!(interpret_date("in 3 days", today()), Some(day(2024, 5, 18)));
        assert_eq!(interpret_date("in two weeks", today()), Some(day(2024, 5, 29)));
        assert_eq!(interpret_date("in a week", today()), Some(day(2024, 5, 22)));
    }

    #[test]
    fn test_weekdays() {
        assert_eq!(interpret_date("friday", today()), Some(day(2024, 5, 17)));
        assert_eq!(interpret_date("on Monday", today()), Some(day(2024, 5, 20)));
        assert_eq!(interpret_date("wednesday", today()), Some(today()));
        assert_eq!(interpret_date("next wednesday", today()), Some(day(2024, 5, 22)));
    }

    #[test]
    fn test_absolute_dates() {
        assert_eq!(interpret_date("2025-03-01", today()), Some(day(2025, 3, 1)));
        assert_eq!(interpret_date("September 24, 2025", today()), Some(day(2025, 9, 24)));
        assert_eq!(interpret_date("24 September 2025", today()), Some(day(2025, 9, 24)));
    }

    #[test]
    fn test_month_day_without_year_rolls_forward() {
        assert_eq!(interpret_date("Sep 24", today()), Some(day(2024, 9, 24)));
        assert_eq!(interpret_date("June 3rd", today()), Some(day(2024, 6, 3)));
        assert_eq!(interpret_date("1st of", today()), None);
        assert_eq!(interpret_date("Jan 2", today()), Some(day(2025, 1, 2)));
        assert_eq!(interpret_date("May 15", today()), Some(today()));
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(interpret_date("whenever", today()), None);
        assert_eq!(interpret_date("", today()), None);
        assert_eq!(interpret_date("next blursday", today()), None);
    }
}
