mod google;
mod heuristic;

pub use google::{GoogleDirectionsConfig, GoogleDirectionsEngine};
pub use heuristic::{HeuristicOptions, HeuristicRouteEngine};
