// src/render.rs

//! Terminal dashboard for a trip response

use std::fmt::Write;

use colored::Colorize;

use crate::protocol::{Invocation, Status, TripResponse};

const DASH: &str = "-";

/// Render weather, POIs, the itinerary, the tool trail and any errors.
pub fn render_dashboard(response: &TripResponse) -> String {
    let mut out = String::new();
    let result = &response.result;

    let city = result.pois.as_ref().map(|p| p.city.as_str()).unwrap_or("your trip");
    let status = match response.status {
        Status::Ok => "ok".green(),
        Status::Partial => "partial".yellow(),
    };
    let _ = writeln!(out, "{} {} [{}]\n", "Trip plan:".bold(), city.bold(), status);

    if let Some(weather) = &result.weather {
        let _ = writeln!(out, "{}", "Weather".cyan().bold());
        for (i, day) in weather.daily.iter().enumerate() {
            let _ = writeln!(out, "  • Day {} ({}): {}", i + 1, day.date, day.summary);
        }
        out.push('\n');
    }

    if let Some(pois) = &result.pois {
        let _ = writeln!(out, "{}", "Points of interest".cyan().bold());
        let rows: Vec<Vec<String>> = pois
            .pois
            .iter()
            .map(|p| vec![p.name.clone(), p.category.clone(), coord(p.lat), coord(p.lon)])
            .collect();
        table(&mut out, &["Name", "Category", "Lat", "Lon"], &rows);
        out.push('\n');
    }

    if let Some(itinerary) = &result.itinerary {
        let _ = writeln!(out, "{}", "Itinerary".cyan().bold());
        let slot = |s: &Option<String>| s.clone().unwrap_or_else(|| DASH.to_string());
        let rows: Vec<Vec<String>> = itinerary
            .days
            .iter()
            .enumerate()
            .map(|(i, d)| {
                vec![
                    (i + 1).to_string(),
                    d.date.to_string(),
                    slot(&d.morning),
                    slot(&d.afternoon),
                    slot(&d.evening),
                    d.notes.clone(),
                ]
            })
            .collect();
        table(&mut out, &["Day", "Date", "Morning", "Afternoon", "Evening", "Notes"], &rows);
        out.push('\n');
    }

    if !result.meta.tools_called.is_empty() {
        let _ = writeln!(out, "{}", "How this trip was planned".cyan().bold());
        for invocation in &result.meta.tools_called {
            let line = match invocation {
                Invocation::Poi(r) => format!("poi: retrieved {} POIs around {}", r.pois.len(), r.city),
                Invocation::Weather(r) => format!("weather: retrieved {} weather entries", r.daily.len()),
                Invocation::Itinerary(r) => format!("itinerary: built {}-day itinerary", r.days.len()),
            };
            let _ = writeln!(out, "  - {}", line);
        }
        out.push('\n');
    }

    if !result.meta.errors.is_empty() {
        let _ = writeln!(out, "{}", "⚠ Some tools encountered errors:".yellow().bold());
        for error in &result.meta.errors {
            let _ = writeln!(out, "  - {}: {}", error.tool, error.error);
        }
    }

    out
}

fn coord(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_else(|| DASH.to_string())
}

fn table(out: &mut String, headers: &[&str], rows: &[Vec<String>]) {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.len()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let _ = writeln!(out, "  {}", line(headers.iter().map(|h| h.to_string()).collect()).dimmed());
    for row in rows {
        let _ = writeln!(out, "  {}", line(row.clone()));
    }
}
