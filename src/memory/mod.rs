// src/memory/mod.rs

use crate::model::{Itinerary, PoiResult, TripRequest, WeatherResult};
use crate::protocol::{Invocation, Meta, ResultEnvelope, StepError};

/// Per-request accumulator threaded through plan execution.
///
/// Slots only ever go from empty to populated or from one successful result to
/// another; a failed step leaves them alone. The invocation log and error list
/// are append-only.
#[derive(Debug)]
pub struct RunState<'a> {
    request: &'a TripRequest,
    pois: Option<PoiResult>,
    weather: Option<WeatherResult>,
    itinerary: Option<Itinerary>,
    tools_called: Vec<Invocation>,
    errors: Vec<StepError>,
}

impl<'a> RunState<'a> {
    pub fn new(request: &'a TripRequest) -> Self {
        Self {
            request,
            pois: None,
            weather: None,
            itinerary: None,
            tools_called: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn request(&self) -> &'a TripRequest {
        self.request
    }

    pub fn pois(&self) -> Option<&PoiResult> {
        self.pois.as_ref()
    }

    pub fn weather(&self) -> Option<&WeatherResult> {
        self.weather.as_ref()
    }

    pub fn itinerary(&self) -> Option<&Itinerary> {
        self.itinerary.as_ref()
    }

    pub fn errors(&self) -> &[StepError] {
        &self.errors
    }

    pub fn tools_called(&self) -> &[Invocation] {
        &self.tools_called
    }

    pub fn store_pois(&mut self, result: PoiResult) {
        self.tools_called.push(Invocation::Poi(result.clone()));
        self.pois = Some(result);
    }

    /// A forecast with no days is logged but never replaces one that has some.
    pub fn store_weather(&mut self, result: WeatherResult) {
        self.tools_called.push(Invocation::Weather(result.clone()));
        if result.daily.is_empty() && self.weather.as_ref().is_some_and(|w| !w.daily.is_empty()) {
            return;
        }
        self.weather = Some(result);
    }

    pub fn store_itinerary(&mut self, itinerary: Itinerary) {
        self.tools_called.push(Invocation::Itinerary(itinerary.clone()));
        self.itinerary = Some(itinerary);
    }

    pub fn record_error(&mut self, error: StepError) {
        self.errors.push(error);
    }

    pub fn into_envelope(self) -> ResultEnvelope {
        ResultEnvelope {
            weather: self.weather,
            pois: self.pois,
            itinerary: self.itinerary,
            meta: Meta {
                tools_called: self.tools_called,
                errors: self.errors,
            },
        }
    }
}
