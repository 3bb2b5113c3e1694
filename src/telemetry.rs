//! Telemetry Feed Adapter: merges partial vehicle-state documents into the
//! single retained `Telemetry` value.
//!
//! A push may carry any subset of the fields; absent fields keep their last
//! known value. Out-of-order pushes (by the document's own timestamp) are
//! discarded wholesale, so a late echo can never regress visible state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{LatLon, ONLINE_WINDOW_MS};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub status: Option<String>,
    /// Battery charge as a fraction in `[0, 1]`.
    pub battery_level: Option<f64>,
    pub position: Option<LatLon>,
    pub speed: Option<f64>,
    pub last_updated_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The push was merged; `has_fix` is true when it carried a usable
    /// position (the camera only follows on those).
    Applied { has_fix: bool },
    /// Older than what we already hold; dropped.
    Stale,
}

impl Telemetry {
    pub fn merge_push(&mut self, fields: &Value, now_ms: u64) -> MergeOutcome {
        let incoming_ts = fields.get("lastUpdated").and_then(Value::as_u64);
        if let (Some(incoming), Some(current)) = (incoming_ts, self.last_updated_ms) {
            if incoming < current {
                tracing::debug!(incoming, current, "discarding out-of-order telemetry push");
                return MergeOutcome::Stale;
            }
        }

        if let Some(status) = fields.get("status").and_then(Value::as_str) {
            self.status = Some(status.to_string());
        }

        if let Some(level) = fields
            .pointer("/deviceStatus/batteryLevel")
            .and_then(Value::as_f64)
        {
            if level.is_finite() {
                self.battery_level = Some(level.clamp(0.0, 1.0));
            }
        }

        let mut has_fix = false;
        if let Some(location) = fields.get("location") {
            let lat = location.get("latitude").and_then(Value::as_f64);
            let lng = location.get("longitude").and_then(Value::as_f64);
            if let (Some(lat), Some(lng)) = (lat, lng) {
                match LatLon::validated(lat, lng) {
                    Ok(position) => {
                        self.position = Some(position);
                        has_fix = true;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring telemetry fix with invalid coordinates");
                    }
                }
            }
            if let Some(speed) = location.get("speed").and_then(Value::as_f64) {
                if speed.is_finite() {
                    self.speed = Some(speed);
                }
            }
        }

        // A document without its own timestamp is stamped with the current
        // clock, so the staleness rule still decays it from this moment.
        self.last_updated_ms = Some(incoming_ts.unwrap_or(now_ms));

        MergeOutcome::Applied { has_fix }
    }

    #[must_use]
    pub fn is_online(&self, now_ms: u64) -> bool {
        self.last_updated_ms
            .is_some_and(|t| now_ms.saturating_sub(t) < ONLINE_WINDOW_MS)
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn battery_pct(&self) -> Option<u8> {
        self.battery_level.map(|level| (level * 100.0).round() as u8)
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn speed_kmh(&self) -> i64 {
        self.speed.map_or(0, |s| s.round() as i64)
    }
}
