use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use crate::models::location::{
    Coordinates, LocationSelection, PlacePrediction, CURRENT_LOCATION_ADDRESS,
};
use crate::models::notification::{Notification, Notifier};
use crate::repositories::places_repo::PlacesClient;
use crate::services::geolocation::{GeolocationError, Geolocator, PositionOptions};

pub const MIN_AUTOCOMPLETE_CHARS: usize = 3;
pub const AUTOCOMPLETE_DEBOUNCE: Duration = Duration::from_millis(300);
pub const MIN_RADIUS_KM: f64 = 1.0;
pub const MAX_RADIUS_KM: f64 = 12.0;
pub const RADIUS_STEP_KM: f64 = 0.2;
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

const CURRENT_LOCATION_PHRASE: &str = "current location";
// Typed on the way to "current location"; the provider is not asked at all.
const CURRENT_LOCATION_SHORTCUTS: [&str; 3] = ["current", "current ", "current l"];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LocationError {
    #[error("Please enter a location or use current location")]
    EmptyInput,
    #[error("Geolocation is not supported on this device")]
    GeolocationUnsupported,
    #[error("Could not get your location")]
    CurrentLocationUnavailable,
    #[error("Error getting location coordinates")]
    CoordinatesUnavailable,
    #[error("Could not find this location. Please try another search term.")]
    NotFound,
}

/// Debounced place predictions for the text being typed.
///
/// Each keystroke restarts the debounce timer. Once the timer fires the query
/// runs as its own task, so a later keystroke never cancels a query that is
/// already in flight and whichever response lands last is what callers see.
pub struct Autocomplete {
    places: Arc<PlacesClient>,
    debounce: Duration,
    pending: Option<JoinHandle<()>>,
    predictions: Arc<watch::Sender<Vec<PlacePrediction>>>,
}

impl Autocomplete {
    pub fn new(places: Arc<PlacesClient>, debounce: Duration) -> Self {
        let (sender, _) = watch::channel(Vec::new());
        Self {
            places,
            debounce,
            pending: None,
            predictions: Arc::new(sender),
        }
    }

    pub fn predictions(&self) -> Vec<PlacePrediction> {
        self.predictions.borrow().clone()
    }

    pub fn on_input(&mut self, text: &str) {
        self.cancel_timer();

        let input = text.to_string();
        let places = self.places.clone();
        let predictions = self.predictions.clone();
        let debounce = self.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            tokio::spawn(refresh_predictions(places, predictions, input));
        }));
    }

    pub fn clear(&mut self) {
        self.cancel_timer();
        self.predictions.send_replace(Vec::new());
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.abort();
        }
    }
}

impl Drop for Autocomplete {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

async fn refresh_predictions(
    places: Arc<PlacesClient>,
    predictions: Arc<watch::Sender<Vec<PlacePrediction>>>,
    input: String,
) {
    if input.chars().count() < MIN_AUTOCOMPLETE_CHARS {
        predictions.send_replace(Vec::new());
        return;
    }

    let lowered = input.to_lowercase();
    if CURRENT_LOCATION_SHORTCUTS.contains(&lowered.as_str()) {
        predictions.send_replace(vec![PlacePrediction::current_location()]);
        return;
    }

    match places.autocomplete(&input).await {
        Ok(found) => {
            let mut list = Vec::with_capacity(found.len() + 1);
            if CURRENT_LOCATION_PHRASE.starts_with(lowered.as_str()) {
                list.push(PlacePrediction::current_location());
            }
            list.extend(found);
            predictions.send_replace(list);
        }
        Err(e) => {
            warn!("Something went wrong fetching place predictions due to: {}", e);
            predictions.send_replace(vec![PlacePrediction::current_location()]);
        }
    }
}

pub fn snap_radius_km(radius_km: f64) -> f64 {
    let clamped = radius_km.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM);
    let steps = ((clamped - MIN_RADIUS_KM) / RADIUS_STEP_KM).round();
    let snapped = MIN_RADIUS_KM + steps * RADIUS_STEP_KM;
    (snapped * 10.0).round() / 10.0
}

async fn locate_device(geolocator: &dyn Geolocator) -> Result<Coordinates, GeolocationError> {
    if !geolocator.is_supported() {
        return Err(GeolocationError::Unsupported);
    }

    let options = PositionOptions::default();
    return match tokio::time::timeout(options.timeout, geolocator.current_position(options)).await {
        Ok(position) => position,
        Err(_) => Err(GeolocationError::Timeout),
    };
}

/// Turns typed text or the device position into a usable location.
pub struct LocationResolver {
    places: Arc<PlacesClient>,
    notifier: Arc<dyn Notifier>,
    autocomplete: Autocomplete,
    search_text: String,
    radius_km: f64,
    location_error: Option<String>,
}

impl LocationResolver {
    pub fn new(
        places: Arc<PlacesClient>,
        notifier: Arc<dyn Notifier>,
        debounce: Duration,
    ) -> Self {
        Self {
            autocomplete: Autocomplete::new(places.clone(), debounce),
            places,
            notifier,
            search_text: String::new(),
            radius_km: DEFAULT_RADIUS_KM,
            location_error: None,
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub fn radius_meters(&self) -> u32 {
        (self.radius_km * 1000.0).round() as u32
    }

    pub fn location_error(&self) -> Option<&str> {
        self.location_error.as_deref()
    }

    pub fn predictions(&self) -> Vec<PlacePrediction> {
        self.autocomplete.predictions()
    }

    pub fn set_search_text(&mut self, text: &str) {
        self.search_text = text.to_string();
        self.autocomplete.on_input(text);
    }

    /// Clamps to 1-12 km on a 0.2 km grid and returns what was kept.
    pub fn set_radius_km(&mut self, radius_km: f64) -> f64 {
        if radius_km.is_finite() {
            self.radius_km = snap_radius_km(radius_km);
        }
        self.radius_km
    }

    fn fail(&mut self, error: LocationError, notification: Notification) -> LocationError {
        self.location_error = Some(error.to_string());
        self.notifier.notify(notification);
        error
    }

    pub async fn select_prediction(
        &mut self,
        prediction: &PlacePrediction,
        geolocator: &dyn Geolocator,
    ) -> Result<LocationSelection, LocationError> {
        self.search_text = prediction.description.clone();
        self.autocomplete.clear();
        self.location_error = None;

        let resolved = if prediction.is_current_location() {
            match locate_device(geolocator).await {
                Ok(coordinates) => Some(LocationSelection::resolved(CURRENT_LOCATION_ADDRESS, coordinates)),
                Err(e) => {
                    warn!("Something went wrong reading the device position due to: {}", e);
                    None
                }
            }
        } else {
            self.resolve_prediction(prediction).await
        };

        return match resolved {
            Some(location) => Ok(location),
            None => Err(self.fail(
                LocationError::CoordinatesUnavailable,
                Notification::destructive(
                    "Location Error",
                    "Could not determine coordinates for this location",
                ),
            )),
        };
    }

    async fn resolve_prediction(&self, prediction: &PlacePrediction) -> Option<LocationSelection> {
        match self.places.place_details(&prediction.place_id).await {
            Ok(details) => {
                let address = if details.formatted_address.is_empty() {
                    prediction.description.clone()
                } else {
                    details.formatted_address
                };
                return Some(LocationSelection::resolved(address, details.geometry.location));
            }
            Err(e) => {
                warn!(
                    "Place details lookup for {} failed due to: {}, falling back to geocoding",
                    prediction.place_id, e
                );
            }
        }

        match self.places.geocode(&prediction.description).await {
            Ok(coordinates) => Some(LocationSelection::resolved(prediction.description.clone(), coordinates)),
            Err(e) => {
                warn!("Something went wrong geocoding {} due to: {}", prediction.description, e);
                None
            }
        }
    }

    pub async fn use_current_location(
        &mut self,
        geolocator: &dyn Geolocator,
    ) -> Result<LocationSelection, LocationError> {
        self.location_error = None;

        return match locate_device(geolocator).await {
            Ok(coordinates) => {
                info!("Device location found at {}, {}", coordinates.lat, coordinates.lng);
                self.notifier.notify(Notification::info(
                    "Location found!",
                    format!(
                        "Using your current location to find restaurants within {} km",
                        self.radius_km
                    ),
                ));
                Ok(LocationSelection::resolved(CURRENT_LOCATION_ADDRESS, coordinates))
            }
            Err(GeolocationError::Unsupported) => Err(self.fail(
                LocationError::GeolocationUnsupported,
                Notification::destructive(
                    "Geolocation not supported",
                    "This device doesn't support geolocation",
                ),
            )),
            Err(e) => {
                warn!("Something went wrong getting the device location due to: {}", e);
                Err(self.fail(
                    LocationError::CurrentLocationUnavailable,
                    Notification::destructive(
                        "Location error",
                        LocationError::CurrentLocationUnavailable.to_string(),
                    ),
                ))
            }
        };
    }

    /// Geocodes whatever was typed, without picking a prediction.
    pub async fn submit(&mut self) -> Result<LocationSelection, LocationError> {
        let text = self.search_text.trim().to_string();
        if text.is_empty() {
            return Err(self.fail(
                LocationError::EmptyInput,
                Notification::destructive(
                    "Location required",
                    "Please enter a location or use your current location",
                ),
            ));
        }

        return match self.places.geocode(&self.search_text).await {
            Ok(coordinates) => {
                self.location_error = None;
                Ok(LocationSelection::resolved(self.search_text.clone(), coordinates))
            }
            Err(e) => {
                warn!("Something went wrong geocoding {} due to: {}", text, e);
                Err(self.fail(
                    LocationError::NotFound,
                    Notification::destructive(
                        "Location not found",
                        "Could not find coordinates for this location",
                    ),
                ))
            }
        };
    }
}
