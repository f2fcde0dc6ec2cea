use serde::{Deserialize, Serialize};
use crate::models::location::Coordinates;

/// A nearby search result as the places provider sends it.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct GooglePlace {
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct Photo {
    #[serde(default)]
    pub height: i64,
    #[serde(default)]
    pub html_attributions: Vec<String>,
    #[serde(default)]
    pub photo_reference: String,
    #[serde(default)]
    pub width: i64,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Geometry {
    pub location: Coordinates,
}

/// A place normalized for display.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    pub photo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
    pub cuisines: Vec<String>,
}
