//! Place Registry: the keyed snapshot of points of interest, and the
//! add/move/remove delta between consecutive store snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::capabilities::StoreDoc;
use crate::{LatLon, PlaceId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at_ms: u64,
}

impl Place {
    #[must_use]
    pub const fn position(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }

    /// Decodes a pushed document. Returns `None` for anything that violates
    /// the Place invariants (empty name, missing or non-finite coordinates);
    /// a malformed document must never take the whole snapshot down.
    #[must_use]
    pub fn from_doc(doc: &StoreDoc) -> Option<Self> {
        let name = doc.fields.get("name")?.as_str()?.trim();
        if name.is_empty() {
            return None;
        }
        let latitude = doc.fields.get("latitude")?.as_f64()?;
        let longitude = doc.fields.get("longitude")?.as_f64()?;
        LatLon::validated(latitude, longitude).ok()?;
        let created_at_ms = doc
            .fields
            .get("createdAt")
            .and_then(Value::as_u64)
            .unwrap_or(0);

        Some(Self {
            id: PlaceId::new(doc.id.clone()),
            name: name.to_string(),
            latitude,
            longitude,
            created_at_ms,
        })
    }

    /// Field payload for a create write, matching the store schema.
    #[must_use]
    pub fn create_fields(name: &str, location: LatLon, now_ms: u64) -> Value {
        json!({
            "name": name,
            "latitude": location.lat,
            "longitude": location.lng,
            "createdAt": now_ms,
        })
    }

    #[must_use]
    pub fn rename_fields(name: &str) -> Value {
        json!({ "name": name })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceDelta {
    pub added: Vec<Place>,
    pub moved: Vec<Place>,
    pub removed: Vec<PlaceId>,
}

impl PlaceDelta {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.moved.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlaceRegistry {
    places: BTreeMap<PlaceId, Place>,
}

impl PlaceRegistry {
    #[must_use]
    pub fn get(&self, id: &PlaceId) -> Option<&Place> {
        self.places.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &PlaceId) -> bool {
        self.places.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Place> {
        self.places.values()
    }

    /// Replaces the baseline with `docs` and reports what changed.
    ///
    /// A push always carries the complete collection, so the delta is a pure
    /// set difference keyed by id; a position change is `moved`, a name-only
    /// change is neither added nor moved. The swap is atomic: readers only
    /// ever see the previous snapshot or the new one.
    pub fn apply_snapshot(&mut self, docs: &[StoreDoc]) -> PlaceDelta {
        let mut next = BTreeMap::new();
        for doc in docs {
            match Place::from_doc(doc) {
                Some(place) => {
                    next.insert(place.id.clone(), place);
                }
                None => {
                    tracing::warn!(doc_id = %doc.id, "skipping malformed place document");
                }
            }
        }

        let mut delta = PlaceDelta::default();
        for (id, place) in &next {
            match self.places.get(id) {
                None => delta.added.push(place.clone()),
                Some(prev) if !prev.position().same_position(place.position()) => {
                    delta.moved.push(place.clone());
                }
                Some(_) => {}
            }
        }
        for id in self.places.keys() {
            if !next.contains_key(id) {
                delta.removed.push(id.clone());
            }
        }

        self.places = next;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, name: &str, lat: f64, lng: f64, created_at: u64) -> StoreDoc {
        StoreDoc {
            id: id.to_string(),
            fields: json!({
                "name": name,
                "latitude": lat,
                "longitude": lng,
                "createdAt": created_at,
            }),
        }
    }

    #[test]
    fn first_snapshot_is_all_additions() {
        let mut registry = PlaceRegistry::default();
        let delta = registry.apply_snapshot(&[
            doc("p1", "Maison", 45.5, -73.5, 1000),
            doc("p2", "Travail", 45.6, -73.6, 2000),
        ]);

        assert_eq!(delta.added.len(), 2);
        assert!(delta.moved.is_empty());
        assert!(delta.removed.is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn reapplying_the_same_snapshot_is_a_no_op() {
        let mut registry = PlaceRegistry::default();
        let docs = [doc("p1", "Maison", 45.5, -73.5, 1000)];
        registry.apply_snapshot(&docs);

        let delta = registry.apply_snapshot(&docs);
        assert!(delta.is_empty());
    }

    #[test]
    fn position_change_is_moved_name_change_is_not() {
        let mut registry = PlaceRegistry::default();
        registry.apply_snapshot(&[doc("p1", "Maison", 45.5, -73.5, 1000)]);

        let delta = registry.apply_snapshot(&[doc("p1", "Chez nous", 45.5, -73.5, 1000)]);
        assert!(delta.is_empty(), "rename alone must not reposition markers");
        assert_eq!(registry.get(&PlaceId::new("p1")).unwrap().name, "Chez nous");

        let delta = registry.apply_snapshot(&[doc("p1", "Chez nous", 45.51, -73.5, 1000)]);
        assert!(delta.added.is_empty());
        assert_eq!(delta.moved.len(), 1);
        assert!(delta.removed.is_empty());
    }

    #[test]
    fn disappearing_ids_are_removed() {
        let mut registry = PlaceRegistry::default();
        registry.apply_snapshot(&[
            doc("p1", "Maison", 45.5, -73.5, 1000),
            doc("p2", "Travail", 45.6, -73.6, 2000),
        ]);

        let delta = registry.apply_snapshot(&[doc("p2", "Travail", 45.6, -73.6, 2000)]);
        assert_eq!(delta.removed, vec![PlaceId::new("p1")]);
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains(&PlaceId::new("p1")));
    }

    #[test]
    fn malformed_documents_are_skipped_not_fatal() {
        let mut registry = PlaceRegistry::default();
        let bad_name = StoreDoc {
            id: "bad1".into(),
            fields: json!({ "name": "  ", "latitude": 1.0, "longitude": 2.0 }),
        };
        let bad_coord = StoreDoc {
            id: "bad2".into(),
            fields: json!({ "name": "X", "latitude": 91.0, "longitude": 2.0 }),
        };
        let missing_coord = StoreDoc {
            id: "bad3".into(),
            fields: json!({ "name": "X", "latitude": 1.0 }),
        };

        let delta = registry.apply_snapshot(&[
            bad_name,
            bad_coord,
            missing_coord,
            doc("p1", "Maison", 45.5, -73.5, 1000),
        ]);

        assert_eq!(delta.added.len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn missing_created_at_defaults_to_zero() {
        let raw = StoreDoc {
            id: "p1".into(),
            fields: json!({ "name": "Maison", "latitude": 45.5, "longitude": -73.5 }),
        };
        assert_eq!(Place::from_doc(&raw).unwrap().created_at_ms, 0);
    }
}
