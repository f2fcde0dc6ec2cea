use std::time::Duration;
use async_trait::async_trait;
use thiserror::Error;
use crate::models::location::Coordinates;

pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached position that may be reused. Zero means always re-read.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: GEOLOCATION_TIMEOUT,
            maximum_age: Duration::ZERO,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum GeolocationError {
    #[error("geolocation is not supported on this device")]
    Unsupported,
    #[error("position unavailable: {0}")]
    Unavailable(String),
    #[error("timed out waiting for a position")]
    Timeout,
}

/// Single-shot access to where the user's device is.
#[async_trait]
pub trait Geolocator: Send + Sync {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<Coordinates, GeolocationError>;
}

/// A position known up front: reported by the client, or configured for the
/// deployment. Without one the device counts as having no geolocation.
pub struct FixedGeolocator {
    position: Option<Coordinates>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self {
            position
        }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    fn is_supported(&self) -> bool {
        self.position.is_some()
    }

    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> Result<Coordinates, GeolocationError> {
        self.position.ok_or(GeolocationError::Unsupported)
    }
}
