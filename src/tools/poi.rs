// src/tools/poi.rs

use std::collections::HashSet;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::PoiConfig;
use crate::model::{Coordinate, Poi, PoiResult};
use crate::tools::{PoiError, PoiProvider};

/// Tag keys consulted, in order, to pick a POI category.
const CATEGORY_TAGS: [&str; 4] = ["tourism", "historic", "amenity", "shop"];
const DEFAULT_CATEGORY: &str = "attraction";

/// POI lookup backed by OpenStreetMap: Nominatim for geocoding and Overpass
/// for tagged nodes around the city center.
pub struct OsmPoiTool {
    client: Client,
    geocode_url: String,
    overpass_url: String,
    radius_m: u32,
}

impl OsmPoiTool {
    pub fn new(config: &PoiConfig) -> Result<Self, PoiError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            geocode_url: config.geocode_url.clone(),
            overpass_url: config.overpass_url.clone(),
            radius_m: config.radius_m,
        })
    }

    fn geocode(&self, city: &str) -> Result<Coordinate, PoiError> {
        let resp = self
            .client
            .get(&self.geocode_url)
            .query(&[("q", city), ("format", "json"), ("limit", "1")])
            .send()?;
        if !resp.status().is_success() {
            debug!("geocoding '{}' returned {}", city, resp.status());
            return Err(PoiError::Geocoding { city: city.to_string() });
        }
        let places: Value = resp
            .json()
            .map_err(|e| PoiError::InvalidResponse(e.to_string()))?;
        parse_geocode(city, &places)
    }
}

impl PoiProvider for OsmPoiTool {
    fn name(&self) -> &str {
        "openstreetmap"
    }

    fn find_pois(&self, city: &str, limit: usize) -> Result<PoiResult, PoiError> {
        let center = self.geocode(city)?;
        debug!("geocoded '{}' to {},{}", city, center.lat, center.lon);

        let query = overpass_query(center, self.radius_m, limit);
        let resp = self.client.post(&self.overpass_url).body(query).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PoiError::Query { status: status.as_u16() });
        }
        let data: Value = resp
            .json()
            .map_err(|e| PoiError::InvalidResponse(e.to_string()))?;
        collect_pois(city, center, &data, limit)
    }
}

/// Read the first Nominatim hit. Nominatim encodes coordinates as strings.
pub fn parse_geocode(city: &str, places: &Value) -> Result<Coordinate, PoiError> {
    let failed = || PoiError::Geocoding { city: city.to_string() };
    let first = places.as_array().and_then(|a| a.first()).ok_or_else(failed)?;
    let lat = coordinate_field(first.get("lat")).ok_or_else(failed)?;
    let lon = coordinate_field(first.get("lon")).ok_or_else(failed)?;
    Ok(Coordinate::new(lat, lon))
}

fn coordinate_field(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn tag_value<'a>(el: &'a Value, key: &str) -> Option<&'a str> {
    el.get("tags")
        .and_then(|t| t.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

pub fn overpass_query(center: Coordinate, radius_m: u32, limit: usize) -> String {
    let around = format!("around:{},{},{}", radius_m, center.lat, center.lon);
    format!(
        r#"[out:json][timeout:25];
(
  node["tourism"]({around});
  node["historic"]({around});
  node["amenity"="restaurant"]({around});
  node["shop"]({around});
);
out center {limit};"#
    )
}

/// Turn Overpass elements into POIs: unnamed elements are skipped, names are
/// de-duplicated exactly, provider order is kept and at most `limit` are taken.
pub fn collect_pois(city: &str, center: Coordinate, data: &Value, limit: usize) -> Result<PoiResult, PoiError> {
    let elements = data
        .get("elements")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut seen = HashSet::new();
    let mut pois = Vec::new();
    for el in elements {
        if pois.len() >= limit {
            break;
        }
        let tag = |key: &str| tag_value(el, key);

        let Some(name) = tag("name") else {
            continue;
        };
        if !seen.insert(name.to_string()) {
            continue;
        }

        let category = CATEGORY_TAGS
            .iter()
            .find_map(|key| tag(*key))
            .unwrap_or(DEFAULT_CATEGORY);
        let lat = el.get("lat").and_then(Value::as_f64).or_else(|| el.pointer("/center/lat").and_then(Value::as_f64));
        let lon = el.get("lon").and_then(Value::as_f64).or_else(|| el.pointer("/center/lon").and_then(Value::as_f64));
        let short_desc = tag("description").or_else(|| tag("note")).unwrap_or_default();

        pois.push(Poi {
            name: name.to_string(),
            category: category.to_string(),
            lat,
            lon,
            short_desc: short_desc.to_string(),
        });
    }

    if pois.is_empty() {
        return Err(PoiError::NoPois { city: city.to_string() });
    }

    Ok(PoiResult {
        city: city.to_string(),
        center,
        pois,
    })
}
