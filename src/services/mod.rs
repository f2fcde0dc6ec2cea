pub mod discovery_session;
pub mod geolocation;
pub mod location_resolver;
pub mod place_normalizer;
pub mod restaurant_service;
pub mod result_browser;
pub mod wizard;
