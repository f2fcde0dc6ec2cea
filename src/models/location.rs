use serde::{Deserialize, Serialize};

pub const CURRENT_LOCATION_PLACE_ID: &str = "current_location";
pub const CURRENT_LOCATION_DESCRIPTION: &str = "Current Location";
pub const CURRENT_LOCATION_ADDRESS: &str = "Your Current Location";

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Finite and on the globe: latitude within ±90, longitude within ±180.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct LocationSelection {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl LocationSelection {
    pub fn resolved(address: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            address: address.into(),
            lat: Some(coordinates.lat),
            lng: Some(coordinates.lng),
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct PlacePrediction {
    pub description: String,
    pub place_id: String,
}

impl PlacePrediction {
    pub fn current_location() -> Self {
        Self {
            description: CURRENT_LOCATION_DESCRIPTION.to_string(),
            place_id: CURRENT_LOCATION_PLACE_ID.to_string(),
        }
    }

    pub fn is_current_location(&self) -> bool {
        self.place_id == CURRENT_LOCATION_PLACE_ID
    }
}
