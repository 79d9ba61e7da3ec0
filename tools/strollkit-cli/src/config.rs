use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use clap::builder::BoolishValueParser;
use log::info;
use strollkit_places::{
    GooglePlacesConfig, GooglePlacesRepository, InMemoryPlacesRepository, PlacesRepository,
    demo_catalog,
};
use strollkit_routing::{GoogleDirectionsConfig, GoogleDirectionsEngine, RouteEngine};

/// Backend selection, read from flags or the environment.
#[derive(Debug, Clone, Args)]
pub struct MapsConfig {
    /// Google Maps platform key used by the places and directions adapters
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true, global = true)]
    pub google_maps_api_key: Option<String>,

    /// Use the Google adapters instead of the bundled catalog
    #[arg(
        long,
        env = "USE_REAL_MAP_API",
        global = true,
        default_value_t = false,
        value_parser = BoolishValueParser::new(),
    )]
    pub use_real_map_api: bool,

    /// Language for place names and route instructions
    #[arg(long, env = "MAPS_LANGUAGE", default_value = "en", global = true)]
    pub maps_language: String,
}

impl MapsConfig {
    /// The key to use, present only when the real backends are switched on.
    fn api_key(&self) -> Option<&str> {
        if !self.use_real_map_api {
            return None;
        }
        self.google_maps_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn places(&self) -> Result<Arc<dyn PlacesRepository>> {
        if let Some(key) = self.api_key() {
            info!("using Google Places");
            let config = GooglePlacesConfig::new(key).with_language(&self.maps_language);
            let repository =
                GooglePlacesRepository::new(config).context("Failed to set up Google Places")?;
            return Ok(Arc::new(repository));
        }

        info!("using the bundled places catalog");
        Ok(Arc::new(InMemoryPlacesRepository::new(demo_catalog())))
    }

    pub fn route_engines(&self) -> Result<Vec<Arc<dyn RouteEngine>>> {
        let Some(key) = self.api_key() else {
            info!("using heuristic routing");
            return Ok(Vec::new());
        };

        info!("using Google Directions");
        let config = GoogleDirectionsConfig::new(key).with_language(&self.maps_language);
        let engine =
            GoogleDirectionsEngine::new(config).context("Failed to set up Google Directions")?;
        let engines: Vec<Arc<dyn RouteEngine>> = vec![Arc::new(engine)];
        Ok(engines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: Option<&str>, enabled: bool) -> MapsConfig {
        MapsConfig {
            google_maps_api_key: key.map(str::to_owned),
            use_real_map_api: enabled,
            maps_language: "en".into(),
        }
    }

    #[test]
    fn real_backends_need_both_switch_and_key() {
        assert_eq!(config(Some("key"), true).api_key(), Some("key"));
        assert_eq!(config(Some("key"), false).api_key(), None);
        assert_eq!(config(None, true).api_key(), None);
        assert_eq!(config(Some("  "), true).api_key(), None);
    }

    #[test]
    fn offline_configuration_has_no_network_engines() {
        assert!(config(None, false).route_engines().unwrap().is_empty());
        assert_eq!(config(Some("key"), true).route_engines().unwrap().len(), 1);
    }
}
