use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use strollkit_geo::{equirectangular_distance_meters, round_meters};

use crate::{NearbyPlace, NearbyQuery, PlacesError, PlacesRepository};

/// Places held in process memory.
///
/// Distances use the flat-earth approximation, which is fine inside a city
/// and wrong near the poles or across the antimeridian.
#[derive(Debug, Default)]
pub struct InMemoryPlacesRepository {
    places: RwLock<HashMap<String, NearbyPlace>>,
}

impl InMemoryPlacesRepository {
    /// A repository seeded with `places`. Later duplicates replace earlier ones.
    #[must_use]
    pub fn new(places: impl IntoIterator<Item = NearbyPlace>) -> Self {
        Self {
            places: RwLock::new(
                places
                    .into_iter()
                    .map(|place| (place.id.clone(), place))
                    .collect(),
            ),
        }
    }

    /// Inserts or replaces a place.
    pub fn upsert(&self, place: NearbyPlace) {
        self.places
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(place.id.clone(), place);
    }

    /// Number of stored places.
    #[must_use]
    pub fn len(&self) -> usize {
        self.places
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no places are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PlacesRepository for InMemoryPlacesRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<NearbyPlace>, PlacesError> {
        Ok(self
            .places
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned())
    }

    async fn find_nearby(&self, query: &NearbyQuery) -> Result<Vec<NearbyPlace>, PlacesError> {
        let origin = query.origin.validate()?;
        let radius = query.radius();
        let requested = query.requested_types();

        let places = self.places.read().unwrap_or_else(PoisonError::into_inner);
        let mut hits: Vec<(f64, &NearbyPlace)> = places
            .values()
            .map(|place| (equirectangular_distance_meters(origin, place.position()), place))
            .filter(|(distance, _)| *distance <= radius)
            .filter(|(_, place)| requested.as_ref().is_none_or(|r| place.matches_any(r)))
            .collect();

        hits.sort_by(|(a, _), (b, _)| a.total_cmp(b));

        Ok(hits
            .into_iter()
            .take(query.effective_limit())
            .map(|(distance, place)| NearbyPlace {
                distance_meters: round_meters(distance),
                ..place.clone()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LatLng;

    fn place(id: &str, lat: f64, lng: f64, types: &[&str]) -> NearbyPlace {
        NearbyPlace {
            id: id.into(),
            name: id.to_uppercase(),
            lat,
            lng,
            address: format!("{id} street"),
            distance_meters: 0,
            types: types.iter().map(ToString::to_string).collect(),
            rating: None,
            is_open_now: None,
        }
    }

    fn repository() -> InMemoryPlacesRepository {
        InMemoryPlacesRepository::new([
            place("far", 1.008, 1.0, &["park"]),
            place("near", 1.001, 1.0, &["cafe"]),
            place("middle", 1.004, 1.0, &["park", "quiet_space"]),
            place("outside", 1.5, 1.0, &["park"]),
        ])
    }

    fn origin() -> LatLng {
        LatLng { lat: 1.0, lng: 1.0 }
    }

    #[tokio::test]
    async fn nearby_is_sorted_and_radius_bound() {
        let places = repository()
            .find_nearby(&NearbyQuery::around(origin()))
            .await
            .unwrap();

        let ids: Vec<&str> = places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["near", "middle", "far"]);
        assert_eq!(places[0].distance_meters, 111);
        assert_eq!(places[2].distance_meters, 888);
    }

    #[tokio::test]
    async fn nearby_filters_by_type_intersection() {
        let query = NearbyQuery {
            types: Some("cafe, quiet_space".into()),
            ..NearbyQuery::around(origin())
        };
        let places = repository().find_nearby(&query).await.unwrap();
        let ids: Vec<&str> = places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["near", "middle"]);
    }

    #[tokio::test]
    async fn nearby_respects_limit() {
        let query = NearbyQuery {
            limit: Some(1),
            radius_meters: Some(100_000.0),
            ..NearbyQuery::around(origin())
        };
        let places = repository().find_nearby(&query).await.unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "near");
    }

    #[tokio::test]
    async fn distances_are_relative_to_each_query() {
        let repo = repository();
        let query = NearbyQuery::around(LatLng { lat: 1.004, lng: 1.0 });
        let places = repo.find_nearby(&query).await.unwrap();
        assert_eq!(places[0].id, "middle");
        assert_eq!(places[0].distance_meters, 0);

        let stored = repo.find_by_id("middle").await.unwrap().unwrap();
        assert_eq!(stored.distance_meters, 0);
    }

    #[tokio::test]
    async fn invalid_origin_is_rejected() {
        let query = NearbyQuery::around(LatLng {
            lat: f64::NAN,
            lng: 0.0,
        });
        assert!(matches!(
            repository().find_nearby(&query).await,
            Err(PlacesError::InvalidOrigin(_))
        ));
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let repo = repository();
        repo.upsert(place("near", 1.002, 1.0, &["cafe"]));
        assert_eq!(repo.len(), 4);
        let stored = repo.find_by_id("near").await.unwrap().unwrap();
        assert!((stored.lat - 1.002).abs() < f64::EPSILON);
        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }
}
