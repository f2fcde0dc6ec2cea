use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::extract::Query;
use axum::response::IntoResponse;
use axum::routing::get;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_with::formats::CommaSeparator;
use serde_with::{serde_as, StringWithSeparator};
use tracing::warn;
use crate::controller::AppState;
use crate::models::cuisine::{Cuisine, CuisinePreference};
use crate::models::location::LocationSelection;
use crate::models::preferences::DEFAULT_RADIUS_METERS;
use crate::services::restaurant_service::{RecommendationError, RestaurantService};

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(search_restaurants))
        .route("/cuisines", get(list_cuisines))
        .route_layer(Extension(app_state.restaurants))
}

#[derive(Clone, Serialize, Debug)]
pub struct CuisineEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

/// The catalog the cuisine step picks from.
pub async fn list_cuisines() -> Json<Vec<CuisineEntry>> {
    Json(
        Cuisine::ALL
            .iter()
            .map(|cuisine| CuisineEntry {
                id: cuisine.id(),
                name: cuisine.display_name(),
                icon: cuisine.icon(),
            })
            .collect(),
    )
}

#[serde_as]
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct SearchRestaurantsParam {
    #[serde_as(as = "StringWithSeparator::<CommaSeparator, String>")]
    #[serde(default)]
    pub cuisines: Vec<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: Option<String>,
    /// Meters
    #[serde(default)]
    pub radius: Option<u32>,
}

pub async fn search_restaurants(
    Extension(restaurant_service): Extension<Arc<RestaurantService>>,
    Query(query): Query<SearchRestaurantsParam>,
) -> impl IntoResponse {
    let cuisines = match CuisinePreference::from_ids(&query.cuisines) {
        Ok(cuisines) => cuisines,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };
    if cuisines.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "Please select at least one cuisine, or surprise",
        ).into_response();
    }

    let location = LocationSelection {
        address: query.address.unwrap_or_else(|| format!("{}, {}", query.lat, query.lng)),
        lat: Some(query.lat),
        lng: Some(query.lng),
    };
    let radius = query.radius.unwrap_or(DEFAULT_RADIUS_METERS);

    let restaurants_res = restaurant_service
        .search(&cuisines, &location, radius)
        .await;

    return match restaurants_res {
        Ok(restaurants) => {
            (StatusCode::OK, Json(restaurants)).into_response()
        }
        Err(e @ (RecommendationError::MissingCoordinates
        | RecommendationError::InvalidCoordinates { .. })) => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            warn!("Something went wrong searching for restaurants due to: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                "Failed to fetch restaurants, please try again!",
            ).into_response()
        }
    };
}
