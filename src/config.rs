use clap::Parser;
use crate::models::location::Coordinates;

#[derive(Parser, Clone, Debug)]
pub struct Config {
    #[clap(env, long, default_value = "development")]
    pub environment: String,

    #[clap(env, long)]
    pub google_api_key: String,

    #[clap(env, long, default_value = "https://maps.googleapis.com")]
    pub places_base_url: String,

    /// Comma separated origins allowed to call the API
    #[clap(env, long, default_value = "http://localhost:8080")]
    pub origin_urls: String,

    #[clap(env, long, default_value_t = 3000)]
    pub port: u16,

    #[clap(env, long, default_value_t = 300)]
    pub autocomplete_debounce_ms: u64,

    #[clap(env, long, default_value_t = 30)]
    pub session_ttl_minutes: i64,

    /// Position used for "current location" when the client doesn't send one
    #[clap(env, long, requires = "device_lng", allow_negative_numbers = true)]
    pub device_lat: Option<f64>,

    #[clap(env, long, requires = "device_lat", allow_negative_numbers = true)]
    pub device_lng: Option<f64>,
}

impl Config {
    pub fn default_device_position(&self) -> Option<Coordinates> {
        match (self.device_lat, self.device_lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_only_the_key_is_given() {
        let config = Config::try_parse_from(["quickbite-backend", "--google-api-key", "k"]).unwrap();
        assert_eq!(config.places_base_url, "https://maps.googleapis.com");
        assert_eq!(config.autocomplete_debounce_ms, 300);
        assert_eq!(config.default_device_position(), None);
    }

    #[test]
    fn device_position_needs_both_coordinates() {
        let config = Config::try_parse_from([
            "quickbite-backend",
            "--google-api-key", "k",
            "--device-lat", "1.29",
            "--device-lng", "-103.85",
        ]).unwrap();
        assert_eq!(config.default_device_position(), Some(Coordinates { lat: 1.29, lng: -103.85 }));

        assert!(Config::try_parse_from([
            "quickbite-backend",
            "--google-api-key", "k",
            "--device-lat", "1.29",
        ]).is_err());
    }
}
