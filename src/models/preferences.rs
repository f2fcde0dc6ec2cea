use serde::{Deserialize, Serialize};
use crate::models::cuisine::CuisinePreference;
use crate::models::location::LocationSelection;

pub const DEFAULT_RADIUS_METERS: u32 = 5000;

/// Everything the selection wizard hands over once it completes.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Preferences {
    pub cuisines: CuisinePreference,
    pub location: LocationSelection,
    /// Search radius in meters.
    pub radius: u32,
}
