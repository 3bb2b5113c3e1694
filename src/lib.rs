// lib.rs - shared core of the Partner Tracker dashboard

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod camera;
pub mod capabilities;
pub mod event;
pub mod gesture;
pub mod model;
pub mod reconcile;
pub mod registry;
pub mod telemetry;
pub mod view;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use event::Event;
pub use model::Model;
pub use view::ViewModel;

// Store layout.
pub const PLACES_COLLECTION: &str = "places";
pub const VEHICLE_DOC_PATH: &str = "users/partner_01";

// Reserved marker id for the tracked vehicle; place markers use the place id.
pub const VEHICLE_MARKER_ID: &str = "vehicle";

pub const INITIAL_MAP_CENTER: LatLon = LatLon::new(45.5017, -73.5673);
pub const INITIAL_MAP_ZOOM: f64 = 12.0;
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

pub const FOLLOW_ZOOM: f64 = 14.0;
pub const SELECTION_MIN_ZOOM: f64 = 14.0;
pub const FOLLOW_FLY_SPEED: f64 = 0.8;
pub const SELECTION_FLY_SPEED: f64 = 0.6;
pub const FLY_CURVE: f64 = 1.42;

/// Telemetry older than this reads as offline, whether or not pushes keep arriving.
pub const ONLINE_WINDOW_MS: u64 = 120_000;
/// Suggested shell interval for `Event::ClockTick`.
pub const CLOCK_TICK_INTERVAL_MS: u64 = 30_000;

pub const SWIPE_THRESHOLD_PX: f64 = 50.0;
pub const MOBILE_BREAKPOINT_PX: u32 = 768;
/// Horizontal camera offset on desktop: half the 320 px side panel.
pub const DESKTOP_PANEL_OFFSET_PX: f64 = 160.0;

pub const LOW_BATTERY_PCT: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Write,
    Rendering,
    StaleData,
    Auth,
    Validation,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Write => "WRITE_ERROR",
            Self::Rendering => "RENDERING_ERROR",
            Self::StaleData => "STALE_DATA",
            Self::Auth => "AUTH_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Write | Self::Rendering | Self::StaleData => ErrorSeverity::Transient,
            Self::Auth | Self::Validation => ErrorSeverity::Permanent,
            Self::Internal => ErrorSeverity::Fatal,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub internal_message: Option<String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            internal_message: None,
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Write => "Échec de l'enregistrement. Veuillez réessayer.".into(),
            ErrorKind::Rendering | ErrorKind::StaleData | ErrorKind::Internal => {
                "Une erreur est survenue.".into()
            }
            ErrorKind::Auth => format!("Erreur : {}", self.message),
            ErrorKind::Validation => self.message.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordinateError {
    #[error("Latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Coordinate value is not finite (NaN or Infinity)")]
    NonFinite,
}

impl From<CoordinateError> for AppError {
    fn from(e: CoordinateError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct LatLon {
    pub lat: f64,
    pub lng: f64,
}

impl LatLon {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn validated(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    #[must_use]
    pub fn same_position(self, other: Self) -> bool {
        self.lat.to_bits() == other.lat.to_bits() && self.lng.to_bits() == other.lng.to_bits()
    }
}

#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        INITIAL_MAP_ZOOM
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlaceId(pub String);

impl PlaceId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation id for in-flight store writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpId(pub String);

impl OpId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for OpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[must_use]
pub fn format_time_ago(timestamp_ms: u64, now_ms: u64) -> String {
    let diff_secs = now_ms.saturating_sub(timestamp_ms) / 1000;

    if diff_secs < 60 {
        return "À l'instant".into();
    }
    if diff_secs < 3600 {
        return format!("Il y a {} min", diff_secs / 60);
    }
    format!("Il y a {} h", diff_secs / 3600)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub created_at_ms: u64,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind, now_ms: u64) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at_ms: now_ms,
            duration_ms: kind.default_duration_ms(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at_ms) > self.duration_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Warning => 4000,
            Self::Error => 5000,
        }
    }
}
