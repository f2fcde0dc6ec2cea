use std::sync::Arc;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use crate::models::location::{Coordinates, PlacePrediction};
use crate::models::places_response::{
    AutocompleteResponse, GeocodeResponse, NearbySearchResponse, PlaceDetails,
    PlaceDetailsResponse, STATUS_OK, STATUS_ZERO_RESULTS,
};
use crate::models::restaurant::GooglePlace;

pub const NEARBY_SEARCH_PATH: &str = "/maps/api/place/nearbysearch/json";
pub const AUTOCOMPLETE_PATH: &str = "/maps/api/place/autocomplete/json";
pub const PLACE_DETAILS_PATH: &str = "/maps/api/place/details/json";
pub const GEOCODE_PATH: &str = "/maps/api/geocode/json";
pub const PHOTO_PATH: &str = "/maps/api/place/photo";
pub const PHOTO_MAX_WIDTH: u32 = 800;

/// The only way this service talks to the places provider.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn fetch_json(&self, url: &str) -> anyhow::Result<Value>;
}

pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client
        }
    }
}

#[async_trait]
impl JsonFetcher for ReqwestFetcher {
    async fn fetch_json(&self, url: &str) -> anyhow::Result<Value> {
        let response = self.client
            .get(url)
            .send()
            .await
            .context("Failed to reach places provider")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Places provider responded with HTTP {}", status));
        }

        response
            .json::<Value>()
            .await
            .context("Places provider sent a body that is not JSON")
    }
}

#[derive(Error, Debug)]
pub enum PlacesApiError {
    #[error("request to places provider failed: {0}")]
    Transport(#[from] anyhow::Error),
    #[error("places provider returned status: {0}")]
    Status(String),
    #[error("places provider returned no results")]
    NoResults,
    #[error("malformed places response: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub struct PlacesClient {
    fetcher: Arc<dyn JsonFetcher>,
    base_url: String,
    api_key: String,
}

impl PlacesClient {
    pub fn new(
        fetcher: Arc<dyn JsonFetcher>,
        base_url: &str,
        api_key: &str,
    ) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn endpoint(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Url, PlacesApiError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .with_context(|| format!("Invalid places provider url: {}{}", self.base_url, path))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            query.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<T, PlacesApiError> {
        debug!("Calling places provider at {}", url.path());
        let body = self.fetcher.fetch_json(url.as_str()).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn nearby_search(
        &self,
        location: Coordinates,
        radius_meters: u32,
        keyword: Option<&str>,
    ) -> Result<Vec<GooglePlace>, PlacesApiError> {
        let mut params = vec![
            ("location", format!("{},{}", location.lat, location.lng)),
            ("radius", radius_meters.to_string()),
            ("type", "restaurant".to_string()),
        ];
        if let Some(keyword) = keyword.filter(|k| !k.is_empty()) {
            params.push(("keyword", keyword.to_string()));
        }

        let response: NearbySearchResponse = self
            .get(self.endpoint(NEARBY_SEARCH_PATH, &params)?)
            .await?;

        return match response.status.as_str() {
            STATUS_OK => Ok(response.results),
            STATUS_ZERO_RESULTS => Ok(Vec::new()),
            other => {
                warn!("Nearby search returned status: {}", other);
                Err(PlacesApiError::Status(other.to_string()))
            }
        };
    }

    pub async fn autocomplete(
        &self,
        input: &str,
    ) -> Result<Vec<PlacePrediction>, PlacesApiError> {
        let params = [
            ("input", input.to_string()),
            ("types", "geocode".to_string()),
        ];

        let response: AutocompleteResponse = self
            .get(self.endpoint(AUTOCOMPLETE_PATH, &params)?)
            .await?;

        if response.status != STATUS_OK {
            return Err(PlacesApiError::Status(response.status));
        }
        Ok(response.predictions)
    }

    pub async fn place_details(
        &self,
        place_id: &str,
    ) -> Result<PlaceDetails, PlacesApiError> {
        let params = [
            ("place_id", place_id.to_string()),
            ("fields", "geometry,formatted_address".to_string()),
        ];

        let response: PlaceDetailsResponse = self
            .get(self.endpoint(PLACE_DETAILS_PATH, &params)?)
            .await?;

        if response.status != STATUS_OK {
            return Err(PlacesApiError::Status(response.status));
        }
        response.result.ok_or(PlacesApiError::NoResults)
    }

    pub async fn geocode(
        &self,
        address: &str,
    ) -> Result<Coordinates, PlacesApiError> {
        let params = [("address", address.to_string())];

        let response: GeocodeResponse = self
            .get(self.endpoint(GEOCODE_PATH, &params)?)
            .await?;

        if response.status != STATUS_OK {
            return Err(PlacesApiError::Status(response.status));
        }
        response
            .results
            .into_iter()
            .next()
            .map(|result| result.geometry.location)
            .ok_or(PlacesApiError::NoResults)
    }

    pub fn photo_url(&self, photo_reference: &str) -> String {
        format!(
            "{}{}?maxwidth={}&photoreference={}&key={}",
            self.base_url,
            PHOTO_PATH,
            PHOTO_MAX_WIDTH,
            photo_reference,
            self.api_key,
        )
    }
}

#[cfg(test)]
pub mod test_support {
    use std::sync::Mutex;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::Value;
    use super::JsonFetcher;

    /// Answers by the first registered url fragment the request contains.
    #[derive(Default)]
    pub struct StubFetcher {
        routes: Mutex<Vec<(String, Option<Value>)>>,
        calls: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, fragment: &str, body: Value) -> Self {
            self.routes.lock().unwrap().push((fragment.to_string(), Some(body)));
            self
        }

        pub fn fail(self, fragment: &str) -> Self {
            self.routes.lock().unwrap().push((fragment.to_string(), None));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn calls_to(&self, fragment: &str) -> Vec<String> {
            self.calls().into_iter().filter(|url| url.contains(fragment)).collect()
        }
    }

    #[async_trait]
    impl JsonFetcher for StubFetcher {
        async fn fetch_json(&self, url: &str) -> anyhow::Result<Value> {
            self.calls.lock().unwrap().push(url.to_string());
            let routes = self.routes.lock().unwrap();
            match routes.iter().find(|(fragment, _)| url.contains(fragment.as_str())) {
                Some((_, Some(body))) => Ok(body.clone()),
                Some((_, None)) => Err(anyhow!("HTTP 500 from stub")),
                None => Err(anyhow!("no stub for {}", url)),
            }
        }
    }
}
