//! Command-line front end: current location, nearby places and walking routes.

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use serde::Serialize;
use strollkit_location::providers::{
    DeviceLocationProvider, ForwardedLocationProvider, MockLocationProvider,
    PermissionGatedProvider,
};
use strollkit_location::{
    GeolocationMode, LocationProvider, LocationRequest, LocationService, LocationServiceError,
    LocationServiceOptions,
};
use strollkit_permission::SystemPermissions;
use strollkit_places::{LatLng, NearbyQuery, NearbyResponse};
use strollkit_routing::{RouteRequest, RoutingService};

use crate::config::MapsConfig;

#[derive(Parser)]
#[command(name = "strollkit")]
#[command(about = "Find where you are, what is nearby and how to walk there", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    maps: MapsConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the current location
    Location(LocationArgs),
    /// List places around a coordinate
    Nearby(NearbyArgs),
    /// Compute a walking route to a known place
    Route(RouteArgs),
}

#[derive(Args)]
struct LocationArgs {
    /// Preferred mode: highAccuracy or batterySaving
    #[arg(long)]
    mode: Option<GeolocationMode>,
    /// Per-provider time budget in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Only try providers of the preferred mode
    #[arg(long)]
    no_mode_fallback: bool,
    /// Fail instead of serving a cached fix
    #[arg(long)]
    no_stale: bool,
    /// Forwarded latitude from a client that already knows its position
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Forwarded longitude
    #[arg(long, allow_negative_numbers = true)]
    lng: Option<f64>,
    /// Accuracy of the forwarded fix in metres
    #[arg(long)]
    accuracy_meters: Option<f64>,
}

#[derive(Args)]
struct NearbyArgs {
    /// Latitude of the search centre
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
    /// Longitude of the search centre
    #[arg(long, allow_negative_numbers = true)]
    lng: f64,
    /// Search radius in metres
    #[arg(long)]
    radius: Option<f64>,
    /// Maximum number of places
    #[arg(long)]
    limit: Option<usize>,
    /// Comma-separated type filter, e.g. "cafe,park"
    #[arg(long)]
    types: Option<String>,
}

#[derive(Args)]
struct RouteArgs {
    /// Latitude of the starting point
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
    /// Longitude of the starting point
    #[arg(long, allow_negative_numbers = true)]
    lng: f64,
    /// Id of the destination place
    #[arg(long)]
    destination_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Location(args) => run_location(args).await,
        Commands::Nearby(args) => run_nearby(&cli.maps, args).await,
        Commands::Route(args) => run_route(&cli.maps, args).await,
    }
}

async fn run_location(args: LocationArgs) -> Result<()> {
    let mock: Arc<dyn LocationProvider> = Arc::new(MockLocationProvider::default());
    let providers: Vec<Arc<dyn LocationProvider>> =
        match ForwardedLocationProvider::from_params(args.lat, args.lng, args.accuracy_meters) {
            Some(forwarded) => vec![Arc::new(forwarded) as Arc<dyn LocationProvider>, mock],
            None => {
                let device =
                    PermissionGatedProvider::new(DeviceLocationProvider::new(), SystemPermissions);
                vec![Arc::new(device) as Arc<dyn LocationProvider>, mock]
            }
        };

    let service = LocationService::new(providers, LocationServiceOptions::default())
        .context("Failed to set up the location service")?;

    let request = LocationRequest {
        mode: args.mode,
        timeout_ms: args.timeout_ms,
        allow_mode_fallback: args.no_mode_fallback.then_some(false),
        allow_stale: args.no_stale.then_some(false),
    };

    match service.get_current_location(&request).await {
        Ok(location) => {
            if location.is_stale {
                eprintln!("{}", "⚠️ Serving a stale location".yellow());
            }
            print_json(&location)
        }
        Err(err) => {
            if let LocationServiceError::Exhausted { errors } = &err {
                for error in errors {
                    eprintln!("{} {}: {}", "✗".red(), error.code, error.message);
                }
            }
            Err(err).context("Unable to resolve the current location")
        }
    }
}

async fn run_nearby(maps: &MapsConfig, args: NearbyArgs) -> Result<()> {
    let places = maps.places()?;
    let query = NearbyQuery {
        origin: LatLng {
            lat: args.lat,
            lng: args.lng,
        },
        radius_meters: args.radius,
        limit: args.limit,
        types: args.types,
    };

    let places = places
        .find_nearby(&query)
        .await
        .context("Nearby search failed")?;
    eprintln!("{}", format!("✅ {} places found", places.len()).green());
    print_json(&NearbyResponse { places })
}

async fn run_route(maps: &MapsConfig, args: RouteArgs) -> Result<()> {
    let service = RoutingService::new(maps.places()?, maps.route_engines()?);
    let request = RouteRequest {
        origin: LatLng {
            lat: args.lat,
            lng: args.lng,
        },
        destination_id: args.destination_id,
    };

    match service.get_walking_route(&request).await {
        Ok(route) => {
            eprintln!(
                "{}",
                format!(
                    "✅ {} m, about {} min",
                    route.summary.distance_meters,
                    route.summary.duration_seconds.div_ceil(60)
                )
                .green()
            );
            print_json(&route)
        }
        Err(err) => {
            for cause in &err.causes {
                eprintln!("{} {cause}", "✗".red());
            }
            Err(err).context("Unable to compute a route")
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
