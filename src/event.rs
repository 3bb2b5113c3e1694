use crate::capabilities::{StoreDoc, StoreResult};
use crate::{OpId, PlaceId};

#[derive(Debug, Clone)]
pub enum Event {
    Noop,

    /// First event from the shell; starts the session watch.
    AppStarted,

    // --- Session ---
    SignInSubmitted { email: String, password: String },
    SignInFailed { message: String },
    SignOutRequested,
    SessionChanged { user_id: Option<String> },
    AuthStreamFailed { message: String },

    // --- Store pushes ---
    PlacesPushed { docs: Vec<StoreDoc> },
    VehiclePushed { doc: Option<StoreDoc> },
    StoreStreamFailed { message: String },

    // --- Store write results ---
    PlaceWriteCompleted { op_id: OpId, result: Box<StoreResult> },

    // --- Map surface ---
    MarkerTapped { id: String },
    MapTapped { lat: f64, lng: f64 },
    MapZoomChanged { zoom: f64 },
    RenderingFailed { message: String },

    // --- Panel & dashboard input ---
    AddModeToggled,
    DraftNameSubmitted { name: String },
    DraftCancelled,
    PlaceRowTapped { id: PlaceId },
    BackRequested,
    RenameConfirmed { name: String },
    DeleteConfirmed,
    SortOrderToggled,
    PanelDragStarted { y: f64 },
    PanelDragEnded { y: f64 },
    ToastDismissed,

    // --- Environment ---
    ViewportResized { width_px: u32, height_px: u32 },
    ClockTick { now_ms: u64 },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::AppStarted => "app_started",
            Self::SignInSubmitted { .. } => "sign_in_submitted",
            Self::SignInFailed { .. } => "sign_in_failed",
            Self::SignOutRequested => "sign_out_requested",
            Self::SessionChanged { .. } => "session_changed",
            Self::AuthStreamFailed { .. } => "auth_stream_failed",
            Self::PlacesPushed { .. } => "places_pushed",
            Self::VehiclePushed { .. } => "vehicle_pushed",
            Self::StoreStreamFailed { .. } => "store_stream_failed",
            Self::PlaceWriteCompleted { .. } => "place_write_completed",
            Self::MarkerTapped { .. } => "marker_tapped",
            Self::MapTapped { .. } => "map_tapped",
            Self::MapZoomChanged { .. } => "map_zoom_changed",
            Self::RenderingFailed { .. } => "rendering_failed",
            Self::AddModeToggled => "add_mode_toggled",
            Self::DraftNameSubmitted { .. } => "draft_name_submitted",
            Self::DraftCancelled => "draft_cancelled",
            Self::PlaceRowTapped { .. } => "place_row_tapped",
            Self::BackRequested => "back_requested",
            Self::RenameConfirmed { .. } => "rename_confirmed",
            Self::DeleteConfirmed => "delete_confirmed",
            Self::SortOrderToggled => "sort_order_toggled",
            Self::PanelDragStarted { .. } => "panel_drag_started",
            Self::PanelDragEnded { .. } => "panel_drag_ended",
            Self::ToastDismissed => "toast_dismissed",
            Self::ViewportResized { .. } => "viewport_resized",
            Self::ClockTick { .. } => "clock_tick",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::SignInSubmitted { .. }
                | Self::SignOutRequested
                | Self::MarkerTapped { .. }
                | Self::MapTapped { .. }
                | Self::AddModeToggled
                | Self::DraftNameSubmitted { .. }
                | Self::DraftCancelled
                | Self::PlaceRowTapped { .. }
                | Self::BackRequested
                | Self::RenameConfirmed { .. }
                | Self::DeleteConfirmed
                | Self::SortOrderToggled
                | Self::PanelDragStarted { .. }
                | Self::PanelDragEnded { .. }
                | Self::ToastDismissed
        )
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::Noop
    }
}
