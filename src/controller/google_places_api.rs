use std::sync::Arc;
use axum::{Extension, Router};
use axum::extract::Query;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::get;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use crate::controller::AppState;

pub fn router(app_state: AppState) -> Router {
    let places_proxy = Arc::new(PlacesProxy {
        http_client: app_state.http_client,
        base_url: app_state.places.base_url().to_string(),
        api_key: app_state.places.api_key().to_string(),
    });

    Router::new()
        .route("/places-proxy", get(proxy_google_places_api))
        .route_layer(Extension(places_proxy))
}

pub struct PlacesProxy {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GooglePlacesApiParams {
    url: Option<String>,
}

#[derive(Error, Debug, PartialEq)]
pub enum ProxyError {
    #[error("missing url parameter")]
    MissingUrl,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("only {0} can be proxied")]
    ForeignHost(String),
}

/// Points a provider url at the configured provider and makes sure it carries
/// an API key. Only the path and query of the requested url are kept.
pub fn rewrite_target(
    target: &str,
    base_url: &str,
    api_key: &str,
) -> Result<Url, ProxyError> {
    let requested = Url::parse(target).map_err(|e| ProxyError::InvalidUrl(e.to_string()))?;
    let base = Url::parse(base_url).map_err(|e| ProxyError::InvalidUrl(e.to_string()))?;
    if requested.host_str() != base.host_str() {
        return Err(ProxyError::ForeignHost(base.host_str().unwrap_or_default().to_string()));
    }

    let mut forwarded = base.clone();
    forwarded.set_path(requested.path());
    forwarded.set_query(requested.query());
    if !forwarded.query_pairs().any(|(key, _)| key == "key") {
        forwarded.query_pairs_mut().append_pair("key", api_key);
    }
    Ok(forwarded)
}

pub async fn proxy_google_places_api(
    Extension(places_proxy): Extension<Arc<PlacesProxy>>,
    Query(params): Query<GooglePlacesApiParams>,
) -> impl IntoResponse {
    let target = match params.url.as_deref() {
        Some(url) => rewrite_target(url, &places_proxy.base_url, &places_proxy.api_key),
        None => Err(ProxyError::MissingUrl),
    };
    let target = match target {
        Ok(target) => target,
        Err(e) => {
            warn!("Refusing to proxy places request due to: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    debug!("Proxying places request to {}", target.path());
    let response = match places_proxy.http_client.get(target).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!("Something went wrong reaching the places provider due to: {}", e);
            return (StatusCode::BAD_GATEWAY, "Failed to reach the places provider").into_response();
        }
    };

    let status = response.status();
    return match response.bytes().await {
        Ok(body) => {
            (status, [(CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            warn!("Something went wrong reading the places provider response due to: {}", e);
            (StatusCode::BAD_GATEWAY, "Failed to read the places provider response").into_response()
        }
    };
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::net::{SocketAddr, TcpListener};
    use axum::Json;
    use serde_json::{json, Value};
    use crate::controller::test_support::{app, app_with_base, call};
    use crate::repositories::places_repo::test_support::StubFetcher;
    use super::*;

    const BASE: &str = "https://maps.googleapis.com";

    #[test]
    fn keeps_path_and_query_and_adds_key() {
        let target = rewrite_target(
            "https://maps.googleapis.com/maps/api/geocode/json?address=Paris",
            BASE,
            "secret",
        ).unwrap();

        assert_eq!(
            target.as_str(),
            "https://maps.googleapis.com/maps/api/geocode/json?address=Paris&key=secret"
        );
    }

    #[test]
    fn leaves_an_existing_key_alone() {
        let target = rewrite_target(
            "https://maps.googleapis.com/maps/api/place/autocomplete/json?input=Lon&key=client",
            BASE,
            "secret",
        ).unwrap();

        assert_eq!(target.query(), Some("input=Lon&key=client"));
    }

    #[test]
    fn forwards_to_the_configured_base() {
        let target = rewrite_target(
            "http://127.0.0.1:9000/maps/api/geocode/json?address=x",
            "http://127.0.0.1:9000",
            "secret",
        ).unwrap();

        assert_eq!(target.port(), Some(9000));
        assert_eq!(target.path(), "/maps/api/geocode/json");
    }

    #[test]
    fn rejects_other_hosts_and_garbage() {
        assert!(matches!(
            rewrite_target("https://evil.example.com/steal", BASE, "secret"),
            Err(ProxyError::ForeignHost(_))
        ));
        assert!(matches!(
            rewrite_target("not a url", BASE, "secret"),
            Err(ProxyError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn missing_url_is_a_bad_request() {
        let app = app(StubFetcher::new(), None);

        let (status, _) = call(&app, "GET", "/api/places-proxy", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn foreign_host_is_a_bad_request() {
        let app = app(StubFetcher::new(), None);

        let (status, _) = call(
            &app,
            "GET",
            "/api/places-proxy?url=https%3A%2F%2Fevil.example.com%2Fsteal",
            None,
        ).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    /// A stand-in provider on a local port: geocode echoes the key it got,
    /// details always answers 403.
    fn spawn_provider() -> SocketAddr {
        let provider = Router::new()
            .route("/maps/api/geocode/json", get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({"status": "OK", "key": params.get("key"), "address": params.get("address")}))
            }))
            .route("/maps/api/place/details/json", get(|| async {
                (StatusCode::FORBIDDEN, Json(json!({"status": "REQUEST_DENIED"})))
            }));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        let server = axum::Server::from_tcp(listener)
            .unwrap()
            .serve(provider.into_make_service());
        tokio::spawn(server);
        address
    }

    fn proxy_uri(target: &str) -> String {
        let uri = Url::parse_with_params("http://localhost/api/places-proxy", [("url", target)]).unwrap();
        format!("{}?{}", uri.path(), uri.query().unwrap())
    }

    #[tokio::test]
    async fn relays_provider_status_and_body() {
        let address = spawn_provider();
        let base = format!("http://{}", address);
        let app = app_with_base(StubFetcher::new(), None, &base);

        let (status, body) = call(
            &app,
            "GET",
            &proxy_uri(&format!("{}/maps/api/geocode/json?address=Oslo", base)),
            None,
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "OK", "key": "secret", "address": "Oslo"}));

        let (status, body) = call(
            &app,
            "GET",
            &proxy_uri(&format!("{}/maps/api/place/details/json?place_id=x", base)),
            None,
        ).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["status"], Value::from("REQUEST_DENIED"));
    }
}
