use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::reconcile::MarkerSet;
use crate::registry::{Place, PlaceRegistry};
use crate::telemetry::Telemetry;
use crate::{
    LatLon, OpId, PlaceId, ToastKind, ToastMessage, UserId, INITIAL_MAP_ZOOM,
    MOBILE_BREAKPOINT_PX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for the identity provider's first session callback.
    #[default]
    Loading,
    SignedOut,
    SigningIn,
    Ready,
}

impl SessionPhase {
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// The one UI mode. `Adding` and `PlaceSelected` cannot coexist because they
/// are variants of the same enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UiMode {
    #[default]
    Browsing,
    Adding,
    PlaceSelected(PlaceId),
}

impl UiMode {
    #[must_use]
    pub const fn is_adding(&self) -> bool {
        matches!(self, Self::Adding)
    }

    #[must_use]
    pub const fn selected_id(&self) -> Option<&PlaceId> {
        match self {
            Self::PlaceSelected(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PanelMode {
    Min,
    #[default]
    Default,
    Full,
}

impl PanelMode {
    #[must_use]
    pub const fn raised(self) -> Self {
        match self {
            Self::Min => Self::Default,
            Self::Default | Self::Full => Self::Full,
        }
    }

    #[must_use]
    pub const fn lowered(self) -> Self {
        match self {
            Self::Full => Self::Default,
            Self::Default | Self::Min => Self::Min,
        }
    }

    /// Fraction of the viewport height the mobile bottom sheet covers.
    #[must_use]
    pub const fn height_fraction(self) -> f64 {
        match self {
            Self::Min => 0.15,
            Self::Default => 0.45,
            Self::Full => 0.85,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportClass {
    Mobile,
    Desktop,
}

impl ViewportClass {
    #[must_use]
    pub const fn from_width(width_px: u32) -> Self {
        if width_px < MOBILE_BREAKPOINT_PX {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    #[must_use]
    pub const fn is_mobile(self) -> bool {
        matches!(self, Self::Mobile)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width_px: u32,
    pub height_px: u32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    #[must_use]
    pub const fn class(self) -> ViewportClass {
        ViewportClass::from_width(self.width_px)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 800)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    NameAsc,
    NewestFirst,
}

impl SortOrder {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::NameAsc => Self::NewestFirst,
            Self::NewestFirst => Self::NameAsc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteKind {
    CreatePlace,
    RenamePlace(PlaceId),
    DeletePlace(PlaceId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingWrite {
    pub kind: WriteKind,
    pub started_at_ms: u64,
}

pub struct Model {
    pub phase: SessionPhase,
    pub user_id: Option<UserId>,
    /// Inline message on the sign-in screen, carrying the provider's text.
    pub auth_error: Option<String>,
    pub session_watch_active: bool,
    pub subscriptions_active: bool,

    pub places: PlaceRegistry,
    pub markers: MarkerSet,
    pub telemetry: Telemetry,
    pub sort_order: SortOrder,

    pub ui_mode: UiMode,
    pub panel_mode: PanelMode,
    pub viewport: Viewport,
    /// Tap position staged while `Adding`, waiting for the name prompt.
    pub draft_location: Option<LatLon>,
    pub drag_start_y: Option<f64>,

    /// Last zoom reported by the map surface.
    pub map_zoom: f64,
    /// Shell-driven wall clock, advanced by `Event::ClockTick`.
    pub now_ms: u64,

    pub pending_writes: HashMap<OpId, PendingWrite>,
    pub active_toast: Option<ToastMessage>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            phase: SessionPhase::default(),
            user_id: None,
            auth_error: None,
            session_watch_active: false,
            subscriptions_active: false,
            places: PlaceRegistry::default(),
            markers: MarkerSet::default(),
            telemetry: Telemetry::default(),
            sort_order: SortOrder::default(),
            ui_mode: UiMode::default(),
            panel_mode: PanelMode::default(),
            viewport: Viewport::default(),
            draft_location: None,
            drag_start_y: None,
            map_zoom: INITIAL_MAP_ZOOM,
            now_ms: 0,
            pending_writes: HashMap::new(),
            active_toast: None,
        }
    }
}

impl Model {
    #[must_use]
    pub fn selected_place(&self) -> Option<&Place> {
        self.ui_mode.selected_id().and_then(|id| self.places.get(id))
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.active_toast = Some(ToastMessage::new(message, kind, self.now_ms));
    }

    pub fn clear_toast(&mut self) {
        self.active_toast = None;
    }

    /// Drops everything owned by the session. The viewport and clock survive;
    /// they are properties of the window, not of the signed-in user.
    pub fn reset_session_state(&mut self) {
        self.user_id = None;
        self.subscriptions_active = false;
        self.places = PlaceRegistry::default();
        self.markers = MarkerSet::default();
        self.telemetry = Telemetry::default();
        self.sort_order = SortOrder::default();
        self.ui_mode = UiMode::default();
        self.panel_mode = PanelMode::default();
        self.draft_location = None;
        self.drag_start_y = None;
        self.map_zoom = INITIAL_MAP_ZOOM;
        self.pending_writes.clear();
        self.active_toast = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_mode_ladder() {
        assert_eq!(PanelMode::Min.raised(), PanelMode::Default);
        assert_eq!(PanelMode::Default.raised(), PanelMode::Full);
        assert_eq!(PanelMode::Full.raised(), PanelMode::Full);

        assert_eq!(PanelMode::Full.lowered(), PanelMode::Default);
        assert_eq!(PanelMode::Default.lowered(), PanelMode::Min);
        assert_eq!(PanelMode::Min.lowered(), PanelMode::Min);
    }

    #[test]
    fn viewport_class_splits_at_breakpoint() {
        assert_eq!(ViewportClass::from_width(375), ViewportClass::Mobile);
        assert_eq!(ViewportClass::from_width(767), ViewportClass::Mobile);
        assert_eq!(ViewportClass::from_width(768), ViewportClass::Desktop);
        assert_eq!(ViewportClass::from_width(1920), ViewportClass::Desktop);
    }

    #[test]
    fn sort_order_toggles_between_the_two_projections() {
        assert_eq!(SortOrder::NameAsc.toggled(), SortOrder::NewestFirst);
        assert_eq!(SortOrder::NewestFirst.toggled(), SortOrder::NameAsc);
    }

    #[test]
    fn session_reset_preserves_the_window_state() {
        let mut model = Model {
            now_ms: 42_000,
            viewport: Viewport::new(390, 844),
            ..Model::default()
        };
        model.user_id = Some(UserId::new("u1"));
        model.ui_mode = UiMode::Adding;
        model.map_zoom = 16.5;

        model.reset_session_state();

        assert_eq!(model.user_id, None);
        assert_eq!(model.ui_mode, UiMode::Browsing);
        assert_eq!(model.map_zoom, INITIAL_MAP_ZOOM);
        assert_eq!(model.now_ms, 42_000);
        assert_eq!(model.viewport, Viewport::new(390, 844));
    }
}
