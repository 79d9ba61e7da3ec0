//! Google Places web service adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use strollkit_geo::{distance_meters, round_meters};

use crate::{LatLng, NearbyPlace, NearbyQuery, PlacesError, PlacesRepository};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
const DEFAULT_LANGUAGE: &str = "en";
const SEARCH_KEYWORD: &str = "relax|quiet|peaceful|park|cafe|meditation";
const DETAIL_FIELDS: &str = "place_id,name,geometry,vicinity,types,rating,opening_hours";
const MISSING_ADDRESS: &str = "Address not available";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const RELEVANT_TYPES: [&str; 8] = [
    "park",
    "cafe",
    "library",
    "museum",
    "art_gallery",
    "spa",
    "natural_feature",
    "point_of_interest",
];

/// Connection settings for [`GooglePlacesRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GooglePlacesConfig {
    /// Places API key. Must not be empty.
    pub api_key: String,
    /// Result language, `en` when unset.
    pub language: Option<String>,
    /// Endpoint root, overridable for proxies.
    pub base_url: Option<String>,
}

impl GooglePlacesConfig {
    /// Settings with the given key and every other field at its default.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            language: None,
            base_url: None,
        }
    }

    /// Sets the result language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Places backed by the Google Places "nearbysearch" and "details" endpoints.
#[derive(Debug, Clone)]
pub struct GooglePlacesRepository {
    client: Client,
    api_key: String,
    language: String,
    base_url: String,
}

impl GooglePlacesRepository {
    /// Builds the adapter and its HTTP client.
    ///
    /// # Errors
    /// [`PlacesError::MissingApiKey`] for an empty key, or
    /// [`PlacesError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: GooglePlacesConfig) -> Result<Self, PlacesError> {
        if config.api_key.trim().is_empty() {
            return Err(PlacesError::MissingApiKey);
        }

        let client = Client::builder()
            .user_agent(concat!("strollkit/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key,
            language: config.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned()),
            base_url: config
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
        })
    }

    async fn fetch_details(&self, id: &str) -> Result<Option<NearbyPlace>, PlacesError> {
        let body = self
            .client
            .get(format!("{}/details/json", self.base_url))
            .query(&[
                ("place_id", id),
                ("key", self.api_key.as_str()),
                ("fields", DETAIL_FIELDS),
            ])
            .send()
            .await?
            .text()
            .await?;
        parse_details_response(&body)
    }
}

#[async_trait]
impl PlacesRepository for GooglePlacesRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<NearbyPlace>, PlacesError> {
        // Lookup failures read as "unknown place".
        match self.fetch_details(id).await {
            Ok(place) => Ok(place),
            Err(err) => {
                log::error!("place details for {id} failed: {err}");
                Ok(None)
            }
        }
    }

    async fn find_nearby(&self, query: &NearbyQuery) -> Result<Vec<NearbyPlace>, PlacesError> {
        let origin = query.origin.validate()?;

        let location = format!("{},{}", origin.lat, origin.lng);
        let radius = query.radius().to_string();
        let mapped_types = query.requested_types().map(|types| vendor_types(&types));
        let mut params = vec![
            ("location", location.as_str()),
            ("radius", radius.as_str()),
            ("key", self.api_key.as_str()),
            ("language", self.language.as_str()),
            ("keyword", SEARCH_KEYWORD),
        ];
        // Only one type is accepted per request.
        if let Some(first) = mapped_types.as_ref().and_then(|t| t.first()) {
            params.push(("type", first.as_str()));
        }

        let body = self
            .client
            .get(format!("{}/nearbysearch/json", self.base_url))
            .query(&params)
            .send()
            .await?
            .text()
            .await?;

        parse_nearby_response(&body, origin, query.effective_limit()).inspect_err(|err| {
            log::error!("nearby search failed: {err}");
        })
    }
}

#[derive(Debug, Deserialize)]
struct NearbyEnvelope {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<WirePlace>,
}

#[derive(Debug, Deserialize)]
struct DetailsEnvelope {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<WirePlace>,
}

#[derive(Debug, Deserialize)]
struct WirePlace {
    place_id: String,
    name: String,
    geometry: WireGeometry,
    #[serde(default)]
    vicinity: Option<String>,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    opening_hours: Option<WireOpeningHours>,
}

#[derive(Debug, Deserialize)]
struct WireGeometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct WireOpeningHours {
    #[serde(default)]
    open_now: Option<bool>,
}

impl From<WirePlace> for NearbyPlace {
    fn from(place: WirePlace) -> Self {
        Self {
            id: place.place_id,
            name: place.name,
            lat: place.geometry.location.lat,
            lng: place.geometry.location.lng,
            address: place
                .vicinity
                .or(place.formatted_address)
                .unwrap_or_else(|| MISSING_ADDRESS.to_owned()),
            distance_meters: 0,
            types: place
                .types
                .into_iter()
                .filter(|t| RELEVANT_TYPES.contains(&t.as_str()))
                .collect(),
            rating: place.rating,
            is_open_now: place.opening_hours.and_then(|h| h.open_now),
        }
    }
}

/// Maps app categories onto the vendor's type vocabulary.
fn vendor_types(types: &[&str]) -> Vec<String> {
    types
        .iter()
        .map(|t| match *t {
            "waterfront" | "nature" => "park",
            "quiet_space" | "indoor" => "library",
            other => other,
        })
        .map(str::to_owned)
        .collect()
}

fn parse_nearby_response(
    body: &str,
    origin: LatLng,
    limit: usize,
) -> Result<Vec<NearbyPlace>, PlacesError> {
    let envelope: NearbyEnvelope = serde_json::from_str(body)?;
    match envelope.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Ok(Vec::new()),
        _ => {
            return Err(PlacesError::Api {
                status: envelope.status,
                message: envelope.error_message,
            });
        }
    }

    let mut measured: Vec<(f64, NearbyPlace)> = envelope
        .results
        .into_iter()
        .map(NearbyPlace::from)
        .map(|place| (distance_meters(origin, place.position()), place))
        .collect();
    measured.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(measured
        .into_iter()
        .take(limit)
        .map(|(distance, place)| NearbyPlace {
            distance_meters: round_meters(distance),
            ..place
        })
        .collect())
}

fn parse_details_response(body: &str) -> Result<Option<NearbyPlace>, PlacesError> {
    let envelope: DetailsEnvelope = serde_json::from_str(body)?;
    match (envelope.status.as_str(), envelope.result) {
        ("OK", Some(place)) => Ok(Some(place.into())),
        (status, _) => {
            log::warn!(
                "place details returned {status}: {}",
                envelope.error_message.as_deref().unwrap_or("no message")
            );
            Ok(None)
        }
    }
}
