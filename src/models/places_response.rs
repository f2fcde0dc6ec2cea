use serde::{Deserialize, Serialize};
use crate::models::location::PlacePrediction;
use crate::models::restaurant::{Geometry, GooglePlace};

pub const STATUS_OK: &str = "OK";
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct NearbySearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GooglePlace>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AutocompleteResponse {
    pub status: String,
    #[serde(default)]
    pub predictions: Vec<PlacePrediction>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PlaceDetailsResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<PlaceDetails>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PlaceDetails {
    pub geometry: Geometry,
    #[serde(default)]
    pub formatted_address: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GeocodeResult {
    pub geometry: Geometry,
    #[serde(default)]
    pub formatted_address: Option<String>,
}
