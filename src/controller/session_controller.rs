use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::extract::Path;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::controller::AppState;
use crate::models::location::{Coordinates, PlacePrediction};
use crate::repositories::session_repo::{SessionRepo, SharedSession};
use crate::services::discovery_session::{DiscoverySession, SessionError};
use crate::services::geolocation::FixedGeolocator;

pub fn router(app_state: AppState) -> Router {
    let session_api = Arc::new(SessionApi {
        sessions: app_state.sessions,
        default_device_position: app_state.default_device_position,
    });

    Router::new()
        .route("/", post(create_session))
        .route("/:session_id", get(get_session).delete(delete_session))
        .route("/:session_id/cuisines", post(toggle_cuisine))
        .route("/:session_id/next", post(next_step))
        .route("/:session_id/surprise", post(surprise_me))
        .route("/:session_id/back", post(previous_step))
        .route("/:session_id/radius", put(set_radius))
        .route("/:session_id/location/input", post(set_location_input))
        .route("/:session_id/location/predictions", get(get_predictions))
        .route("/:session_id/location/select", post(select_prediction))
        .route("/:session_id/location/current", post(use_current_location))
        .route("/:session_id/location/submit", post(submit_location))
        .route("/:session_id/try-another", post(try_another))
        .route("/:session_id/restart", post(restart))
        .route_layer(Extension(session_api))
}

pub struct SessionApi {
    sessions: Arc<SessionRepo>,
    default_device_position: Option<Coordinates>,
}

impl SessionApi {
    /// Falls back to the configured position when the client sent none, or
    /// sent one that is not on the globe.
    fn geolocator(&self, lat: Option<f64>, lng: Option<f64>) -> FixedGeolocator {
        let reported = match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
        .filter(Coordinates::is_valid);
        FixedGeolocator::new(reported.or(self.default_device_position))
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ToggleCuisineBody {
    pub cuisine: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct RadiusBody {
    pub radius_km: f64,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct LocationInputBody {
    pub text: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct SelectPredictionBody {
    pub description: String,
    pub place_id: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct DevicePositionBody {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

async fn find_session(
    session_api: &SessionApi,
    session_id: &str,
) -> Result<SharedSession, Response> {
    return match session_api.sessions.retrieve_session(session_id).await {
        Some(session) => Ok(session),
        None => {
            debug!("Unknown discovery session {}", session_id);
            Err((StatusCode::NOT_FOUND, "Session not found").into_response())
        }
    };
}

/// Problems the user was told about still answer with the current view.
fn respond(
    session: &DiscoverySession,
    result: Result<(), SessionError>,
) -> Response {
    return match result {
        Ok(()) => (StatusCode::OK, Json(session.view())).into_response(),
        Err(e) if e.is_recoverable() => {
            debug!("Session {} stays put after: {}", session.id(), e);
            (StatusCode::OK, Json(session.view())).into_response()
        }
        Err(SessionError::UnknownCuisine(e)) => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            warn!("Rejected action on session {} due to: {}", session.id(), e);
            (StatusCode::CONFLICT, e.to_string()).into_response()
        }
    };
}

pub async fn create_session(
    Extension(session_api): Extension<Arc<SessionApi>>,
) -> impl IntoResponse {
    let session = session_api.sessions.create_session().await;
    let session = session.lock().await;
    (StatusCode::CREATED, Json(session.view()))
}

pub async fn get_session(
    Extension(session_api): Extension<Arc<SessionApi>>,
    Path(session_id): Path<String>,
) -> Response {
    let session = match find_session(&session_api, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let mut session = session.lock().await;
    session.touch();
    respond(&session, Ok(()))
}

pub async fn delete_session(
    Extension(session_api): Extension<Arc<SessionApi>>,
    Path(session_id): Path<String>,
) -> Response {
    return match session_api.sessions.remove_session(&session_id).await {
        true => StatusCode::NO_CONTENT.into_response(),
        false => (StatusCode::NOT_FOUND, "Session not found").into_response(),
    };
}

pub async fn toggle_cuisine(
    Extension(session_api): Extension<Arc<SessionApi>>,
    Path(session_id): Path<String>,
    Json(body): Json<ToggleCuisineBody>,
) -> Response {
    let session = match find_session(&session_api, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let mut session = session.lock().await;
    session.touch();
    let result = session.toggle_cuisine(&body.cuisine);
    respond(&session, result)
}

pub async fn next_step(
    Extension(session_api): Extension<Arc<SessionApi>>,
    Path(session_id): Path<String>,
) -> Response {
    let session = match find_session(&session_api, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let mut session = session.lock().await;
    session.touch();
    let result = session.next();
    respond(&session, result)
}

pub async fn surprise_me(
    Extension(session_api): Extension<Arc<SessionApi>>,
    Path(session_id): Path<String>,
) -> Response {
    let session = match find_session(&session_api, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let mut session = session.lock().await;
    session.touch();
    let result = session.surprise_me();
    respond(&session, result)
}

pub async fn previous_step(
    Extension(session_api): Extension<Arc<SessionApi>>,
    Path(session_id): Path<String>,
) -> Response {
    let session = match find_session(&session_api, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let mut session = session.lock().await;
    session.touch();
    let result = session.back();
    respond(&session, result)
}

pub async fn set_radius(
    Extension(session_api): Extension<Arc<SessionApi>>,
    Path(session_id): Path<String>,
    Json(body): Json<RadiusBody>,
) -> Response {
    let session = match find_session(&session_api, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let mut session = session.lock().await;
    session.touch();
    let result = session.set_radius_km(body.radius_km).map(|_| ());
    respond(&session, result)
}

pub async fn set_location_input(
    Extension(session_api): Extension<Arc<SessionApi>>,
    Path(session_id): Path<String>,
    Json(body): Json<LocationInputBody>,
) -> Response {
    let session = match find_session(&session_api, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let mut session = session.lock().await;
    session.touch();
    let result = session.set_search_text(&body.text);
    respond(&session, result)
}

pub async fn get_predictions(
    Extension(session_api): Extension<Arc<SessionApi>>,
    Path(session_id): Path<String>,
) -> Response {
    let session = match find_session(&session_api, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let mut session = session.lock().await;
    session.touch();
    return match session.predictions() {
        Ok(predictions) => (StatusCode::OK, Json(predictions)).into_response(),
        Err(e) => (StatusCode::CONFLICT, e.to_string()).into_response(),
    };
}

pub async fn select_prediction(
    Extension(session_api): Extension<Arc<SessionApi>>,
    Path(session_id): Path<String>,
    Json(body): Json<SelectPredictionBody>,
) -> Response {
    let session = match find_session(&session_api, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let geolocator = session_api.geolocator(body.lat, body.lng);
    let prediction = PlacePrediction {
        description: body.description,
        place_id: body.place_id,
    };

    let mut session = session.lock().await;
    session.touch();
    let result = session.select_prediction(&prediction, &geolocator).await;
    respond(&session, result)
}

pub async fn use_current_location(
    Extension(session_api): Extension<Arc<SessionApi>>,
    Path(session_id): Path<String>,
    body: Option<Json<DevicePositionBody>>,
) -> Response {
    let session = match find_session(&session_api, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let geolocator = session_api.geolocator(body.lat, body.lng);

    let mut session = session.lock().await;
    session.touch();
    let result = session.use_current_location(&geolocator).await;
    respond(&session, result)
}

pub async fn submit_location(
    Extension(session_api): Extension<Arc<SessionApi>>,
    Path(session_id): Path<String>,
) -> Response {
    let session = match find_session(&session_api, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let mut session = session.lock().await;
    session.touch();
    let result = session.submit_location().await;
    respond(&session, result)
}

pub async fn try_another(
    Extension(session_api): Extension<Arc<SessionApi>>,
    Path(session_id): Path<String>,
) -> Response {
    let session = match find_session(&session_api, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let mut session = session.lock().await;
    session.touch();
    let result = session.try_another();
    respond(&session, result)
}

pub async fn restart(
    Extension(session_api): Extension<Arc<SessionApi>>,
    Path(session_id): Path<String>,
) -> Response {
    let session = match find_session(&session_api, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };
    let mut session = session.lock().await;
    session.touch();
    let result = session.restart();
    respond(&session, result)
}
