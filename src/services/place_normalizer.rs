use rand::seq::SliceRandom;
use rand::Rng;
use crate::models::cuisine::{Cuisine, PLACE_TYPE_CUISINES};
use crate::models::location::Coordinates;
use crate::models::restaurant::{GooglePlace, Restaurant};
use crate::repositories::places_repo::PlacesClient;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const GENERIC_CUISINE: &str = "Restaurant";
pub const UNKNOWN_NAME: &str = "Unknown Restaurant";
pub const MISSING_ADDRESS: &str = "No address available";
pub const DEFAULT_PRICE_LEVEL: u8 = 1;

/// Stock photos used when the provider has none for a place.
pub const FALLBACK_PHOTOS: [&str; 9] = [
    "https://images.unsplash.com/photo-1559925393-8be0ec4767c8?ixlib=rb-4.0.3&w=800&q=80",
    "https://images.unsplash.com/photo-1585937421612-70a008356fbe?ixlib=rb-4.0.3&w=800&q=80",
    "https://images.unsplash.com/photo-1579684947550-22e945225d9a?ixlib=rb-4.0.3&w=800&q=80",
    "https://images.unsplash.com/photo-1569058242567-93de6f36f8e1?ixlib=rb-4.0.3&w=800&q=80",
    "https://images.unsplash.com/photo-1579871494447-9811cf80d66c?ixlib=rb-4.0.3&w=800&q=80",
    "https://images.unsplash.com/photo-1565299585323-38d6b0865b47?ixlib=rb-4.0.3&w=800&q=80",
    "https://images.unsplash.com/photo-1559314809-0d155014e29e?ixlib=rb-4.0.3&w=800&q=80",
    "https://images.unsplash.com/photo-1571091718767-18b5b1457add?ixlib=rb-4.0.3&w=800&q=80",
    "https://images.unsplash.com/photo-1544025162-d76694265947?ixlib=rb-4.0.3&w=800&q=80",
];

/// Great-circle distance between two points, in kilometers.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn format_distance(distance_km: f64) -> String {
    if distance_km < 1.0 {
        return format!("{} m", (distance_km * 1000.0).round() as i64);
    }
    format!("{:.1} km", distance_km)
}

pub fn infer_cuisines(place: &GooglePlace) -> Vec<String> {
    let mut cuisines = vec![GENERIC_CUISINE.to_string()];
    let types: Vec<String> = place.types.iter().map(|t| t.to_lowercase()).collect();
    let name = place.name.to_lowercase();

    for cuisine in Cuisine::ALL {
        let id = cuisine.id();
        if types.iter().any(|t| t.contains(id) || id.contains(t.as_str())) {
            cuisines.push(cuisine.display_name().to_string());
        }
    }
    if cuisines.len() > 1 {
        return cuisines;
    }

    for cuisine in Cuisine::ALL {
        if cuisine
            .keywords()
            .iter()
            .any(|keyword| name.contains(&keyword.to_lowercase()))
        {
            cuisines.push(cuisine.display_name().to_string());
        }
    }
    if cuisines.len() > 1 {
        return cuisines;
    }

    for (keyword, cuisine_name) in PLACE_TYPE_CUISINES {
        if types.iter().any(|t| t.contains(keyword)) || name.contains(keyword) {
            cuisines.push(cuisine_name.to_string());
            break;
        }
    }
    cuisines
}

pub fn fallback_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..9)
        .map(|_| {
            let digit = rng.gen_range(0..36u32);
            std::char::from_digit(digit, 36).unwrap_or('0')
        })
        .collect();
    format!("restaurant-{}", suffix)
}

pub fn fallback_photo<R: Rng + ?Sized>(rng: &mut R) -> String {
    FALLBACK_PHOTOS
        .choose(rng)
        .copied()
        .unwrap_or(FALLBACK_PHOTOS[0])
        .to_string()
}

/// Maps provider records into display records relative to where the user is.
pub struct PlaceNormalizer<'a> {
    places: &'a PlacesClient,
}

impl<'a> PlaceNormalizer<'a> {
    pub fn new(places: &'a PlacesClient) -> Self {
        Self {
            places
        }
    }

    pub fn normalize<R: Rng + ?Sized>(
        &self,
        place: &GooglePlace,
        origin: Coordinates,
        rng: &mut R,
    ) -> Restaurant {
        let id = if place.place_id.is_empty() {
            fallback_id(rng)
        } else {
            place.place_id.clone()
        };

        let photo = match place.photos.iter().find(|p| !p.photo_reference.is_empty()) {
            Some(photo) => self.places.photo_url(&photo.photo_reference),
            None => fallback_photo(rng),
        };

        let distance = place
            .geometry
            .as_ref()
            .map(|geometry| format_distance(haversine_km(origin, geometry.location)));

        Restaurant {
            id,
            name: if place.name.is_empty() {
                UNKNOWN_NAME.to_string()
            } else {
                place.name.clone()
            },
            rating: place.rating.unwrap_or(0.0),
            price_level: Some(place.price_level.unwrap_or(DEFAULT_PRICE_LEVEL)),
            address: place
                .vicinity
                .clone()
                .filter(|vicinity| !vicinity.is_empty())
                .unwrap_or_else(|| MISSING_ADDRESS.to_string()),
            distance,
            photo,
            is_open: Some(
                place
                    .opening_hours
                    .as_ref()
                    .and_then(|hours| hours.open_now)
                    .unwrap_or(true),
            ),
            cuisines: infer_cuisines(place),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use crate::models::restaurant::{Geometry, OpeningHours, Photo};
    use crate::repositories::places_repo::test_support::StubFetcher;
    use super::*;

    fn place(name: &str, types: &[&str]) -> GooglePlace {
        GooglePlace {
            place_id: "abc".to_string(),
            name: name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn places_client() -> PlacesClient {
        PlacesClient::new(Arc::new(StubFetcher::new()), "https://maps.example.com", "secret")
    }

    #[test]
    fn formats_distance_in_meters_below_one_km() {
        assert_eq!(format_distance(0.5), "500 m");
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(0.9996), "1000 m");
    }

    #[test]
    fn formats_distance_in_km_with_one_decimal() {
        assert_eq!(format_distance(1.0), "1.0 km");
        assert_eq!(format_distance(12.34), "12.3 km");
    }

    #[test]
    fn haversine_matches_known_distance() {
        let paris = Coordinates { lat: 48.8566, lng: 2.3522 };
        let london = Coordinates { lat: 51.5074, lng: -0.1278 };
        let distance = haversine_km(paris, london);
        assert!((distance - 343.5).abs() < 1.0, "got {}", distance);
        assert_eq!(haversine_km(paris, paris), 0.0);
    }

    #[test]
    fn type_tags_match_catalog_ids() {
        let cuisines = infer_cuisines(&place("Spice Route", &["indian_restaurant", "food"]));
        assert_eq!(cuisines, vec!["Restaurant", "Indian"]);
    }

    #[test]
    fn type_match_is_case_insensitive_and_keeps_every_hit() {
        let cuisines = infer_cuisines(&place("Fusion", &["Thai_Restaurant", "japanese_restaurant"]));
        assert_eq!(cuisines, vec!["Restaurant", "Japanese", "Thai"]);
    }

    #[test]
    fn name_keywords_used_when_types_do_not_match() {
        let cuisines = infer_cuisines(&place("Mario's Pizza & Sushi", &["restaurant", "food"]));
        assert_eq!(cuisines, vec!["Restaurant", "Italian", "Japanese"]);
    }

    #[test]
    fn secondary_table_stops_at_first_match() {
        let cuisines = infer_cuisines(&place("Corner Spot", &["cafe", "vegan_restaurant"]));
        assert_eq!(cuisines, vec!["Restaurant", "Cafe"]);

        let cuisines = infer_cuisines(&place("Prime Steakhouse", &["restaurant"]));
        assert_eq!(cuisines, vec!["Restaurant", "American"]);
    }

    #[test]
    fn generic_tag_alone_when_nothing_matches() {
        let cuisines = infer_cuisines(&place("The Place", &["restaurant", "point_of_interest"]));
        assert_eq!(cuisines, vec!["Restaurant"]);
    }

    #[test]
    fn normalizes_a_complete_place() {
        let places = places_client();
        let normalizer = PlaceNormalizer::new(&places);
        let mut rng = StdRng::seed_from_u64(7);
        let raw = GooglePlace {
            place_id: "place-1".to_string(),
            name: "Curry House".to_string(),
            vicinity: Some("1 High Street".to_string()),
            rating: Some(4.4),
            price_level: Some(2),
            photos: vec![Photo {
                photo_reference: "photo-ref".to_string(),
                ..Default::default()
            }],
            opening_hours: Some(OpeningHours { open_now: Some(false) }),
            geometry: Some(Geometry { location: Coordinates { lat: 0.0, lng: 0.0045 } }),
            types: vec!["restaurant".to_string()],
        };

        let restaurant = normalizer.normalize(&raw, Coordinates { lat: 0.0, lng: 0.0 }, &mut rng);

        assert_eq!(restaurant.id, "place-1");
        assert_eq!(restaurant.name, "Curry House");
        assert_eq!(restaurant.rating, 4.4);
        assert_eq!(restaurant.price_level, Some(2));
        assert_eq!(restaurant.address, "1 High Street");
        assert_eq!(restaurant.distance.as_deref(), Some("500 m"));
        assert_eq!(
            restaurant.photo,
            "https://maps.example.com/maps/api/place/photo?maxwidth=800&photoreference=photo-ref&key=secret"
        );
        assert_eq!(restaurant.is_open, Some(false));
        assert_eq!(restaurant.cuisines, vec!["Restaurant", "Indian"]);
    }

    #[test]
    fn fills_defaults_for_missing_fields() {
        let places = places_client();
        let normalizer = PlaceNormalizer::new(&places);
        let mut rng = StdRng::seed_from_u64(42);
        let raw = GooglePlace::default();

        let restaurant = normalizer.normalize(&raw, Coordinates { lat: 1.0, lng: 1.0 }, &mut rng);

        assert!(restaurant.id.starts_with("restaurant-"));
        assert_eq!(restaurant.id.len(), "restaurant-".len() + 9);
        assert_eq!(restaurant.name, UNKNOWN_NAME);
        assert_eq!(restaurant.rating, 0.0);
        assert_eq!(restaurant.price_level, Some(DEFAULT_PRICE_LEVEL));
        assert_eq!(restaurant.address, MISSING_ADDRESS);
        assert_eq!(restaurant.distance, None);
        assert!(FALLBACK_PHOTOS.contains(&restaurant.photo.as_str()));
        assert_eq!(restaurant.is_open, Some(true));
        assert_eq!(restaurant.cuisines, vec!["Restaurant"]);
    }

    #[test]
    fn fallback_ids_are_base36() {
        let mut rng = StdRng::seed_from_u64(1);
        let id = fallback_id(&mut rng);
        assert!(id["restaurant-".len()..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }
}
