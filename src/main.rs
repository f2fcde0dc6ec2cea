use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use crate::config::Config;
use crate::controller::AppState;
use crate::repositories::places_repo::{PlacesClient, ReqwestFetcher};
use crate::repositories::session_repo::SessionRepo;
use crate::services::restaurant_service::RestaurantService;

pub mod config;
pub mod controller;
pub mod helpers;
pub mod models;
pub mod repositories;
pub mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();
    info!("Starting quickbite backend in {} mode", config.environment);

    let http_client = reqwest::Client::new();
    let places = Arc::new(PlacesClient::new(
        Arc::new(ReqwestFetcher::new(http_client.clone())),
        &config.places_base_url,
        &config.google_api_key,
    ));
    let restaurants = Arc::new(RestaurantService::new(places.clone()));
    let sessions = Arc::new(SessionRepo::new(
        places.clone(),
        restaurants.clone(),
        Duration::from_millis(config.autocomplete_debounce_ms),
        time::Duration::minutes(config.session_ttl_minutes),
    ));

    let app_state = AppState {
        environment: config.environment.clone(),
        http_client,
        places,
        restaurants,
        sessions,
        default_device_position: config.default_device_position(),
    };

    controller::serve(app_state, &config).await
}
