//! Map-surface capability.
//!
//! The shell owns the slippy map and its marker primitives; the core sends
//! camera transitions and marker mutations. Marker operations report back so
//! failures can be logged, but a failure never rolls anything back: marker
//! handles are independent and non-transactional.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::CameraCommand;
use crate::reconcile::MarkerOp;

// Tagged "type", not "op": the embedded `MarkerOp` already carries an "op"
// tag of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapOperation {
    FlyTo(CameraCommand),
    Marker(MarkerOp),
    /// Releases every marker handle, vehicle included. Teardown only.
    ClearMarkers,
}

impl Operation for MapOperation {
    type Output = MapResult;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapOutput {
    Ack,
}

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapError {
    #[error("marker {id}: {message}")]
    Marker { id: String, message: String },

    #[error("map surface: {message}")]
    Surface { message: String },
}

pub type MapResult = Result<MapOutput, MapError>;

pub struct Map<Ev> {
    context: CapabilityContext<MapOperation, Ev>,
}

impl<Ev> Capability<Ev> for Map<Ev> {
    type Operation = MapOperation;
    type MappedSelf<MappedEv> = Map<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Map::new(self.context.map_event(f))
    }
}

impl<Ev> Map<Ev>
where
    Ev: 'static,
{
    #[must_use]
    pub fn new(context: CapabilityContext<MapOperation, Ev>) -> Self {
        Self { context }
    }

    /// Requests one animated camera transition. A new request supersedes any
    /// in-flight animation on the surface; nothing is queued core-side.
    pub fn fly_to(&self, command: CameraCommand) {
        self.context.spawn({
            let context = self.context.clone();
            async move {
                context.notify_shell(MapOperation::FlyTo(command)).await;
            }
        });
    }

    pub fn apply_marker<F>(&self, op: MarkerOp, make_event: F)
    where
        F: FnOnce(MapResult) -> Ev + Send + 'static,
    {
        self.context.spawn({
            let context = self.context.clone();
            async move {
                let result = context.request_from_shell(MapOperation::Marker(op)).await;
                context.update_app(make_event(result));
            }
        });
    }

    pub fn clear_markers(&self) {
        self.context.spawn({
            let context = self.context.clone();
            async move {
                context.notify_shell(MapOperation::ClearMarkers).await;
            }
        });
    }
}
