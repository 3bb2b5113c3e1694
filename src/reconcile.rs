//! Marker Reconciler: maps Place Registry deltas onto the set of live map
//! markers with minimal churn.
//!
//! The `MarkerSet` is the authoritative record of which marker handles exist
//! on the rendering surface; the shell keeps its opaque handles keyed by the
//! same ids. Reconciliation is pure: it returns the batch of operations to
//! forward to the map capability and never talks to the shell itself.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::registry::PlaceDelta;
use crate::{LatLon, PlaceId, VEHICLE_MARKER_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Vehicle,
    Place,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MarkerOp {
    Add {
        id: String,
        kind: MarkerKind,
        position: LatLon,
    },
    Move {
        id: String,
        position: LatLon,
    },
    Remove {
        id: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    places: HashMap<PlaceId, LatLon>,
    vehicle: Option<LatLon>,
}

impl MarkerSet {
    /// Applies one registry delta as a single logical batch: removes first,
    /// then additions, then repositions. Existing markers are moved in place,
    /// never destroyed and recreated.
    pub fn reconcile(&mut self, delta: &PlaceDelta) -> Vec<MarkerOp> {
        let mut ops = Vec::new();

        for id in &delta.removed {
            if self.places.remove(id).is_some() {
                ops.push(MarkerOp::Remove { id: id.0.clone() });
            }
        }

        for place in &delta.added {
            let position = place.position();
            match self.places.get(&place.id) {
                None => {
                    self.places.insert(place.id.clone(), position);
                    ops.push(MarkerOp::Add {
                        id: place.id.0.clone(),
                        kind: MarkerKind::Place,
                        position,
                    });
                }
                Some(live) if !live.same_position(position) => {
                    self.places.insert(place.id.clone(), position);
                    ops.push(MarkerOp::Move {
                        id: place.id.0.clone(),
                        position,
                    });
                }
                Some(_) => {}
            }
        }

        for place in &delta.moved {
            let position = place.position();
            match self.places.get(&place.id) {
                Some(live) if live.same_position(position) => {}
                Some(_) => {
                    self.places.insert(place.id.clone(), position);
                    ops.push(MarkerOp::Move {
                        id: place.id.0.clone(),
                        position,
                    });
                }
                // A move for an id with no live marker creates one; the live
                // set must converge on the snapshot either way.
                None => {
                    self.places.insert(place.id.clone(), position);
                    ops.push(MarkerOp::Add {
                        id: place.id.0.clone(),
                        kind: MarkerKind::Place,
                        position,
                    });
                }
            }
        }

        ops
    }

    /// Creates the vehicle marker on the first fix, moves it afterwards.
    pub fn update_vehicle(&mut self, position: LatLon) -> Option<MarkerOp> {
        match self.vehicle {
            None => {
                self.vehicle = Some(position);
                Some(MarkerOp::Add {
                    id: VEHICLE_MARKER_ID.to_string(),
                    kind: MarkerKind::Vehicle,
                    position,
                })
            }
            Some(live) if !live.same_position(position) => {
                self.vehicle = Some(position);
                Some(MarkerOp::Move {
                    id: VEHICLE_MARKER_ID.to_string(),
                    position,
                })
            }
            Some(_) => None,
        }
    }

    /// Forgets every handle. Used on teardown together with the map
    /// capability's `ClearMarkers`, which releases the shell side.
    pub fn clear(&mut self) {
        self.places.clear();
        self.vehicle = None;
    }

    #[must_use]
    pub fn live_place_count(&self) -> usize {
        self.places.len()
    }

    #[must_use]
    pub fn has_place_marker(&self, id: &PlaceId) -> bool {
        self.places.contains_key(id)
    }

    #[must_use]
    pub fn place_ids(&self) -> Vec<PlaceId> {
        let mut ids: Vec<_> = self.places.keys().cloned().collect();
        ids.sort();
        ids
    }

    #[must_use]
    pub const fn has_vehicle_marker(&self) -> bool {
        self.vehicle.is_some()
    }
}
