//! Google Directions web service adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use strollkit_geo::{decode_polyline, number_points};

use crate::{
    LatLng, RouteEngine, RouteEngineError, RouteInput, RouteMode, RouteResponse, RouteStep,
    RouteSummary,
};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
const DEFAULT_LANGUAGE: &str = "en";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`GoogleDirectionsEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleDirectionsConfig {
    /// Directions API key. Must not be empty.
    pub api_key: String,
    /// Instruction language, `en` when unset.
    pub language: Option<String>,
    /// Full endpoint URL, overridable for proxies.
    pub base_url: Option<String>,
}

impl GoogleDirectionsConfig {
    /// Settings with the given key and every other field at its default.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            language: None,
            base_url: None,
        }
    }

    /// Sets the instruction language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Routes from the Google Directions API.
#[derive(Debug, Clone)]
pub struct GoogleDirectionsEngine {
    client: Client,
    api_key: String,
    language: String,
    base_url: String,
}

impl GoogleDirectionsEngine {
    /// Identifier reported by [`RouteEngine::id`].
    pub const ID: &'static str = "google-directions";

    /// Builds the engine and its HTTP client.
    ///
    /// # Errors
    /// [`RouteEngineError::MissingApiKey`] for an empty key, or
    /// [`RouteEngineError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: GoogleDirectionsConfig) -> Result<Self, RouteEngineError> {
        if config.api_key.trim().is_empty() {
            return Err(RouteEngineError::MissingApiKey);
        }

        let client = Client::builder()
            .user_agent(concat!("strollkit/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key,
            language: config.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned()),
            base_url: config.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        })
    }
}

#[async_trait]
impl RouteEngine for GoogleDirectionsEngine {
    fn id(&self) -> &str {
        Self::ID
    }

    fn supports(&self, mode: RouteMode) -> bool {
        matches!(
            mode,
            RouteMode::Walking | RouteMode::Driving | RouteMode::Bicycling
        )
    }

    async fn compute_route(&self, input: RouteInput) -> Result<RouteResponse, RouteEngineError> {
        let origin = input.origin.validate()?;
        let destination = input.destination.validate()?;

        let origin_param = format!("{},{}", origin.lat, origin.lng);
        let destination_param = format!("{},{}", destination.lat, destination.lng);

        let body = self
            .client
            .get(&self.base_url)
            .query(&[
                ("origin", origin_param.as_str()),
                ("destination", destination_param.as_str()),
                ("mode", input.mode.as_str()),
                ("key", self.api_key.as_str()),
                ("language", self.language.as_str()),
                ("alternatives", "false"),
            ])
            .send()
            .await?
            .text()
            .await?;

        parse_directions_response(&body, input)
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsEnvelope {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<WireRoute>,
}

#[derive(Debug, Deserialize)]
struct WireRoute {
    #[serde(default)]
    legs: Vec<WireLeg>,
    overview_polyline: WirePolyline,
}

#[derive(Debug, Deserialize)]
struct WirePolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct WireLeg {
    distance: Measure,
    duration: Measure,
    #[serde(default)]
    steps: Vec<WireStep>,
}

#[derive(Debug, Deserialize)]
struct WireStep {
    distance: Measure,
    duration: Measure,
    #[serde(default)]
    html_instructions: String,
    start_location: LatLng,
    end_location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Measure {
    value: u64,
}

impl Measure {
    fn meters(self) -> u32 {
        u32::try_from(self.value).unwrap_or(u32::MAX)
    }
}

fn parse_directions_response(
    body: &str,
    input: RouteInput,
) -> Result<RouteResponse, RouteEngineError> {
    let envelope: DirectionsEnvelope = serde_json::from_str(body)?;
    match envelope.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(RouteEngineError::NoRoute),
        _ => {
            return Err(RouteEngineError::Api {
                status: envelope.status,
                message: envelope.error_message,
            });
        }
    }

    let route = envelope
        .routes
        .into_iter()
        .next()
        .ok_or(RouteEngineError::EmptyResponse("No routes returned from Google Directions API"))?;
    let leg = route
        .legs
        .into_iter()
        .next()
        .ok_or(RouteEngineError::EmptyResponse("Route has no legs"))?;

    let polyline = number_points(decode_polyline(&route.overview_polyline.points)?);
    let steps = leg
        .steps
        .into_iter()
        .map(|step| RouteStep {
            instruction: strip_html(&step.html_instructions),
            distance_meters: step.distance.meters(),
            duration_seconds: step.duration.value,
            start_location: step.start_location,
            end_location: step.end_location,
        })
        .collect();

    Ok(RouteResponse {
        origin: input.origin,
        destination: input.destination,
        summary: RouteSummary {
            distance_meters: leg.distance.meters(),
            duration_seconds: leg.duration.value,
            mode: input.mode,
        },
        polyline,
        steps: Some(steps),
    })
}

/// Drops markup tags and decodes the handful of entities the API emits.
fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                rest = &rest[open..];
                break;
            }
        }
    }
    text.push_str(rest);

    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .trim()
        .to_owned()
}
