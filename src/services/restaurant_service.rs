use std::sync::Arc;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};
use crate::models::cuisine::{Cuisine, CuisinePreference};
use crate::models::location::LocationSelection;
use crate::models::preferences::Preferences;
use crate::models::restaurant::Restaurant;
use crate::repositories::places_repo::{PlacesApiError, PlacesClient};
use crate::services::place_normalizer::PlaceNormalizer;

#[derive(Error, Debug)]
pub enum RecommendationError {
    #[error("Location coordinates are required")]
    MissingCoordinates,
    #[error("Location coordinates are out of range: {lat}, {lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },
    #[error("Failed to fetch restaurants from the places provider: {0}")]
    Places(#[from] PlacesApiError),
}

/// Space separated search keyword for a cuisine preference. "Surprise" picks
/// one catalog cuisine at random.
pub fn search_keyword<R: Rng + ?Sized>(
    preference: &CuisinePreference,
    rng: &mut R,
) -> String {
    let cuisines: Vec<Cuisine> = match preference {
        CuisinePreference::Surprise => Cuisine::ALL
            .choose(rng)
            .copied()
            .into_iter()
            .collect(),
        CuisinePreference::Selected(cuisines) => cuisines.clone(),
    };

    cuisines
        .iter()
        .flat_map(|cuisine| cuisine.keywords().iter().copied())
        .collect::<Vec<&str>>()
        .join(" ")
}

pub struct RestaurantService {
    places: Arc<PlacesClient>,
}

impl RestaurantService {
    pub fn new(places: Arc<PlacesClient>) -> Self {
        Self {
            places
        }
    }

    pub async fn fetch_restaurants(
        &self,
        preferences: &Preferences,
    ) -> Result<Vec<Restaurant>, RecommendationError> {
        self.search(&preferences.cuisines, &preferences.location, preferences.radius).await
    }

    pub async fn search(
        &self,
        cuisines: &CuisinePreference,
        location: &LocationSelection,
        radius_meters: u32,
    ) -> Result<Vec<Restaurant>, RecommendationError> {
        let origin = location
            .coordinates()
            .ok_or(RecommendationError::MissingCoordinates)?;
        if !origin.is_valid() {
            return Err(RecommendationError::InvalidCoordinates {
                lat: origin.lat,
                lng: origin.lng,
            });
        }

        let keyword = search_keyword(cuisines, &mut rand::thread_rng());
        info!(
            "Searching for {:?} restaurants within {}km of {}",
            keyword,
            radius_meters as f64 / 1000.0,
            location.address,
        );

        let places = match self.places
            .nearby_search(origin, radius_meters, Some(keyword.as_str()))
            .await {
            Ok(places) => places,
            Err(e) => {
                warn!("Something went wrong searching for nearby restaurants due to: {}", e);
                return Err(e.into());
            }
        };
        info!("Found {} restaurants from the places provider", places.len());

        let normalizer = PlaceNormalizer::new(&self.places);
        let mut rng = rand::thread_rng();
        Ok(places
            .iter()
            .map(|place| normalizer.normalize(place, origin, &mut rng))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use crate::models::location::Coordinates;
    use crate::repositories::places_repo::test_support::StubFetcher;
    use super::*;

    fn service(fetcher: StubFetcher) -> (Arc<StubFetcher>, RestaurantService) {
        let fetcher = Arc::new(fetcher);
        let places = Arc::new(PlacesClient::new(fetcher.clone(), "https://maps.example.com", "secret"));
        (fetcher, RestaurantService::new(places))
    }

    fn preferences(cuisines: CuisinePreference) -> Preferences {
        Preferences {
            cuisines,
            location: LocationSelection::resolved("Home", Coordinates { lat: 1.30, lng: 103.80 }),
            radius: 5000,
        }
    }

    #[test]
    fn keyword_flattens_selected_cuisines() {
        let mut rng = StdRng::seed_from_u64(3);
        let preference = CuisinePreference::Selected(vec![Cuisine::Indian, Cuisine::Thai]);
        assert_eq!(search_keyword(&preference, &mut rng), "Indian Curry Thai Spicy");
    }

    #[test]
    fn surprise_keyword_belongs_to_one_catalog_cuisine() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let keyword = search_keyword(&CuisinePreference::Surprise, &mut rng);
            assert!(Cuisine::ALL
                .iter()
                .any(|cuisine| cuisine.keywords().join(" ") == keyword));
        }
    }

    #[tokio::test]
    async fn maps_every_result_in_provider_order() {
        let (fetcher, service) = service(StubFetcher::new().respond("nearbysearch", json!({
            "status": "OK",
            "results": [
                {
                    "place_id": "a",
                    "name": "Tandoor",
                    "vicinity": "2 Spice Lane",
                    "rating": 4.5,
                    "geometry": {"location": {"lat": 1.30, "lng": 103.81}},
                    "types": ["indian_restaurant", "restaurant"]
                },
                {
                    "place_id": "b",
                    "name": "Noodle Bar",
                    "geometry": {"location": {"lat": 1.35, "lng": 103.80}},
                    "types": ["restaurant"]
                }
            ]
        })));

        let restaurants = service
            .fetch_restaurants(&preferences(CuisinePreference::Selected(vec![Cuisine::Indian])))
            .await
            .unwrap();

        assert_eq!(restaurants.len(), 2);
        assert_eq!(restaurants[0].id, "a");
        assert_eq!(restaurants[0].cuisines, vec!["Restaurant", "Indian"]);
        assert_eq!(restaurants[0].distance.as_deref(), Some("1.1 km"));
        assert_eq!(restaurants[1].id, "b");
        assert_eq!(restaurants[1].distance.as_deref(), Some("5.6 km"));
        assert!(fetcher.calls()[0].contains("keyword=Indian+Curry"));
    }

    #[tokio::test]
    async fn zero_results_is_an_empty_list() {
        let (_, service) = service(
            StubFetcher::new().respond("nearbysearch", json!({"status": "ZERO_RESULTS", "results": []}))
        );

        let restaurants = service
            .fetch_restaurants(&preferences(CuisinePreference::Surprise))
            .await
            .unwrap();

        assert!(restaurants.is_empty());
    }

    #[tokio::test]
    async fn missing_coordinates_never_reach_the_provider() {
        let (fetcher, service) = service(StubFetcher::new());
        let mut preferences = preferences(CuisinePreference::Surprise);
        preferences.location.lng = None;

        let err = service.fetch_restaurants(&preferences).await.unwrap_err();

        assert!(matches!(err, RecommendationError::MissingCoordinates));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn non_finite_or_off_globe_coordinates_are_rejected() {
        let (fetcher, service) = service(StubFetcher::new());

        for (lat, lng) in [(f64::NAN, 103.8), (1.3, f64::INFINITY), (91.0, 0.0), (0.0, -180.5)] {
            let location = LocationSelection::resolved("Nowhere", Coordinates { lat, lng });
            let err = service
                .search(&CuisinePreference::Surprise, &location, 5000)
                .await
                .unwrap_err();
            assert!(matches!(err, RecommendationError::InvalidCoordinates { .. }));
        }
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_is_reported() {
        let (_, service) = service(StubFetcher::new().fail("nearbysearch"));

        let err = service
            .fetch_restaurants(&preferences(CuisinePreference::Surprise))
            .await
            .unwrap_err();

        assert!(matches!(err, RecommendationError::Places(_)));
    }
}
