use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use axum::http::HeaderValue;
use axum::Router;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tracing::info;
use crate::config::Config;
use crate::helpers::handler_404::page_not_found_handler;
use crate::models::location::Coordinates;
use crate::repositories::places_repo::PlacesClient;
use crate::repositories::session_repo::SessionRepo;
use crate::services::restaurant_service::RestaurantService;

pub mod google_places_api;
pub mod health_check;
pub mod restaurant_controller;
pub mod session_controller;

#[derive(Clone)]
pub struct AppState {
    pub environment: String,
    pub http_client: reqwest::Client,
    pub places: Arc<PlacesClient>,
    pub restaurants: Arc<RestaurantService>,
    pub sessions: Arc<SessionRepo>,
    pub default_device_position: Option<Coordinates>,
}

pub async fn serve(
    app_state: AppState,
    config: &Config,
) -> anyhow::Result<()> {
    let origins = config
        .origin_urls
        .split(',')
        .map(|s| s.trim().parse::<HeaderValue>())
        .collect::<Result<Vec<HeaderValue>, _>>()
        .context("Invalid origin url in ORIGIN_URLS")?;

    let application = router_endpoints(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS
                        ])
                        .allow_origin(origins)
                        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                )
                .layer(CompressionLayer::new())
        );

    let port = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("API server listening on port: {}", port);
    axum::Server::bind(&port)
        .serve(application.into_make_service())
        .await
        .context("Error spinning up the API server")
}

pub fn router_endpoints(app_state: AppState) -> Router {
    Router::new()
        .merge(health_check::router(app_state.clone()))
        .nest("/api", google_places_api::router(app_state.clone()))
        .nest("/restaurants", restaurant_controller::router(app_state.clone()))
        .nest("/session", session_controller::router(app_state))
        .fallback(page_not_found_handler)
}
