//! Linux location implementation using the GeoClue2 D-Bus service.

use std::time::Duration;

use futures_timer::Delay;
use zbus::Connection;
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

use super::Fix;
use crate::{GeolocationMode, LatLng, ProviderError, unix_millis};

const SERVICE: &str = "org.freedesktop.GeoClue2";
const MANAGER_PATH: &str = "/org/freedesktop/GeoClue2/Manager";
const MANAGER_IFACE: &str = "org.freedesktop.GeoClue2.Manager";
const CLIENT_IFACE: &str = "org.freedesktop.GeoClue2.Client";
const LOCATION_IFACE: &str = "org.freedesktop.GeoClue2.Location";
const PROPERTIES_IFACE: &str = "org.freedesktop.DBus.Properties";
const DESKTOP_ID: &str = "strollkit";

// GCLUE_ACCURACY_LEVEL_CITY / GCLUE_ACCURACY_LEVEL_EXACT
const ACCURACY_LEVEL_CITY: u32 = 4;
const ACCURACY_LEVEL_EXACT: u32 = 8;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub(crate) async fn get_location(mode: GeolocationMode) -> Result<Fix, ProviderError> {
    let connection = Connection::system()
        .await
        .map_err(|e| ProviderError::provider_off(format!("D-Bus connection failed: {e}")))?;

    let client_path: OwnedObjectPath = connection
        .call_method(
            Some(SERVICE),
            MANAGER_PATH,
            Some(MANAGER_IFACE),
            "GetClient",
            &(),
        )
        .await
        .map_err(|e| map_error("GeoClue2 not available", e))?
        .body()
        .deserialize()
        .map_err(|e| map_error("unexpected GetClient reply", e))?;
    let client = client_path.as_str();

    set_property(&connection, client, "DesktopId", Value::from(DESKTOP_ID))
        .await
        .map_err(|e| map_error("failed to set desktop id", e))?;
    set_property(
        &connection,
        client,
        "RequestedAccuracyLevel",
        Value::from(accuracy_level(mode)),
    )
    .await
    .map_err(|e| map_error("failed to set accuracy level", e))?;

    call_client(&connection, client, "Start")
        .await
        .map_err(|e| map_error("failed to start GeoClue client", e))?;

    let fix = read_fix(&connection, client).await;

    if let Err(e) = call_client(&connection, client, "Stop").await {
        log::debug!("failed to stop GeoClue client: {e}");
    }

    fix
}

const fn accuracy_level(mode: GeolocationMode) -> u32 {
    match mode {
        GeolocationMode::HighAccuracy => ACCURACY_LEVEL_EXACT,
        GeolocationMode::BatterySaving => ACCURACY_LEVEL_CITY,
    }
}

async fn read_fix(connection: &Connection, client: &str) -> Result<Fix, ProviderError> {
    // The client publishes "/" until its first LocationUpdated.
    let location_path = loop {
        let path: OwnedObjectPath = get_property(connection, client, CLIENT_IFACE, "Location")
            .await
            .map_err(|e| map_error("failed to get location", e))?;
        if path.as_str() != "/" {
            break path;
        }
        Delay::new(POLL_INTERVAL).await;
    };
    let location = location_path.as_str();

    let lat: f64 = get_property(connection, location, LOCATION_IFACE, "Latitude")
        .await
        .map_err(|e| map_error("failed to get latitude", e))?;
    let lng: f64 = get_property(connection, location, LOCATION_IFACE, "Longitude")
        .await
        .map_err(|e| map_error("failed to get longitude", e))?;
    let accuracy = get_property::<f64>(connection, location, LOCATION_IFACE, "Accuracy")
        .await
        .ok()
        .filter(|a| a.is_finite() && *a >= 0.0);

    let position =
        LatLng::new(lat, lng).map_err(|e| ProviderError::unknown(format!("GeoClue2: {e}")))?;

    Ok(Fix {
        position,
        accuracy_meters: accuracy,
        timestamp_ms: Some(unix_millis()),
    })
}

async fn get_property<T>(
    connection: &Connection,
    path: &str,
    interface: &str,
    name: &str,
) -> zbus::Result<T>
where
    T: TryFrom<OwnedValue>,
    T::Error: Into<zbus::Error>,
{
    let value: OwnedValue = connection
        .call_method(
            Some(SERVICE),
            path,
            Some(PROPERTIES_IFACE),
            "Get",
            &(interface, name),
        )
        .await?
        .body()
        .deserialize()?;
    T::try_from(value).map_err(Into::into)
}

async fn set_property(
    connection: &Connection,
    path: &str,
    name: &str,
    value: Value<'_>,
) -> zbus::Result<()> {
    connection
        .call_method(
            Some(SERVICE),
            path,
            Some(PROPERTIES_IFACE),
            "Set",
            &(CLIENT_IFACE, name, value),
        )
        .await?;
    Ok(())
}

async fn call_client(connection: &Connection, client: &str, method: &str) -> zbus::Result<()> {
    connection
        .call_method(Some(SERVICE), client, Some(CLIENT_IFACE), method, &())
        .await?;
    Ok(())
}

fn map_error(context: &str, error: zbus::Error) -> ProviderError {
    let message = format!("{context}: {error}");
    match &error {
        zbus::Error::MethodError(name, _, _) if name.as_str().ends_with(".AccessDenied") => {
            ProviderError::permission_denied(message)
        }
        zbus::Error::MethodError(name, _, _)
            if name.as_str().ends_with(".ServiceUnknown")
                || name.as_str().ends_with(".NameHasNoOwner") =>
        {
            ProviderError::provider_off(message)
        }
        _ => ProviderError::unknown(message),
    }
}
