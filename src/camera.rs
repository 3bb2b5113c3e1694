//! Camera Controller: one desired camera command per triggering event.
//!
//! Precedence: an active place selection pins the camera to the place;
//! otherwise the camera follows the vehicle. Add-mode does not suppress
//! following, it only changes what a map tap means.

use serde::{Deserialize, Serialize};

use crate::model::{Model, PanelMode, Viewport, ViewportClass};
use crate::{
    LatLon, DESKTOP_PANEL_OFFSET_PX, FLY_CURVE, FOLLOW_FLY_SPEED, FOLLOW_ZOOM,
    SELECTION_FLY_SPEED, SELECTION_MIN_ZOOM,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraTrigger {
    TelemetryUpdate,
    PlaceSelected,
    ModeChanged,
}

/// A single animated transition request. A new command supersedes any
/// in-flight animation; interruption is the rendering surface's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraCommand {
    pub center: LatLon,
    pub zoom: f64,
    /// Pixel offset of the target from the viewport center `(x, y)`, keeping
    /// the subject clear of the panel.
    pub offset_px: (f64, f64),
    pub speed: f64,
    pub curve: f64,
}

#[must_use]
pub fn compute(trigger: CameraTrigger, model: &Model) -> Option<CameraCommand> {
    let offset_px = panel_offset(model.viewport, model.panel_mode);

    if let Some(place) = model.selected_place() {
        // Never zoom out when re-centering on a selection.
        let zoom = model.map_zoom.max(SELECTION_MIN_ZOOM);
        tracing::debug!(?trigger, place = %place.id, "camera centers on selection");
        return Some(CameraCommand {
            center: place.position(),
            zoom,
            offset_px,
            speed: SELECTION_FLY_SPEED,
            curve: FLY_CURVE,
        });
    }

    let center = model.telemetry.position?;
    tracing::debug!(?trigger, "camera follows vehicle");
    Some(CameraCommand {
        center,
        zoom: FOLLOW_ZOOM,
        offset_px,
        speed: FOLLOW_FLY_SPEED,
        curve: FLY_CURVE,
    })
}

fn panel_offset(viewport: Viewport, panel_mode: PanelMode) -> (f64, f64) {
    match viewport.class() {
        ViewportClass::Desktop => (DESKTOP_PANEL_OFFSET_PX, 0.0),
        ViewportClass::Mobile => {
            let covered = panel_mode.height_fraction() * f64::from(viewport.height_px);
            (0.0, -covered / 2.0)
        }
    }
}
