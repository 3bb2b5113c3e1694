//! View projection: everything the shell renders, derived fresh from the
//! `Model` on every render. Nothing in here is state.

use serde::{Deserialize, Serialize};

use crate::model::{Model, PanelMode, SessionPhase};
use crate::{format_time_ago, ToastKind, ToastMessage, LOW_BATTERY_PCT};

pub const EMPTY_PLACES_MESSAGE: &str = "Aucun lieu enregistré";
pub const ADDING_HINT: &str = "📍 Cliquez sur la carte pour placer le point";
pub const ADD_BUTTON_LABEL: &str = "Ajouter un lieu";
pub const CANCEL_ADD_LABEL: &str = "Annuler l'ajout";
pub const DEFAULT_STATUS: &str = "Connexion...";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Screen {
    Loading,
    SignIn {
        error: Option<String>,
        busy: bool,
    },
    Dashboard(Box<DashboardView>),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VehicleCard {
    pub status: String,
    pub battery_pct: Option<u8>,
    pub battery_low: bool,
    pub speed_kmh: i64,
    pub is_online: bool,
    pub last_update_text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlaceRow {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlaceDetailView {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub coordinates_text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DashboardView {
    pub vehicle: VehicleCard,
    pub is_adding: bool,
    pub add_button_label: String,
    pub adding_hint: Option<String>,
    pub places: Vec<PlaceRow>,
    pub place_count: usize,
    pub empty_message: Option<String>,
    pub selected: Option<PlaceDetailView>,
    /// The shell opens the place-name prompt while a draft tap is staged.
    pub name_prompt_open: bool,
    pub sort_label: String,
    pub panel_mode: PanelMode,
    pub is_mobile: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub screen: Screen,
    pub toast: Option<ToastView>,
}

#[must_use]
pub fn build(model: &Model) -> ViewModel {
    let screen = match model.phase {
        SessionPhase::Loading => Screen::Loading,
        SessionPhase::SignedOut | SessionPhase::SigningIn => Screen::SignIn {
            error: model.auth_error.clone(),
            busy: model.phase == SessionPhase::SigningIn,
        },
        SessionPhase::Ready => Screen::Dashboard(Box::new(build_dashboard(model))),
    };

    ViewModel {
        screen,
        toast: model.active_toast.as_ref().map(ToastView::from),
    }
}

fn build_dashboard(model: &Model) -> DashboardView {
    let is_adding = model.ui_mode.is_adding();

    let mut places: Vec<&crate::registry::Place> = model.places.iter().collect();
    match model.sort_order {
        crate::model::SortOrder::NameAsc => {
            places.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then_with(|| a.id.cmp(&b.id))
            });
        }
        crate::model::SortOrder::NewestFirst => {
            places.sort_by(|a, b| {
                b.created_at_ms
                    .cmp(&a.created_at_ms)
                    .then_with(|| a.id.cmp(&b.id))
            });
        }
    }
    let places: Vec<PlaceRow> = places
        .into_iter()
        .map(|p| PlaceRow {
            id: p.id.0.clone(),
            name: p.name.clone(),
        })
        .collect();

    let selected = model.selected_place().map(|p| PlaceDetailView {
        id: p.id.0.clone(),
        name: p.name.clone(),
        latitude: p.latitude,
        longitude: p.longitude,
        coordinates_text: format!("{:.4}, {:.4}", p.latitude, p.longitude),
    });

    DashboardView {
        vehicle: build_vehicle_card(model),
        is_adding,
        add_button_label: if is_adding {
            CANCEL_ADD_LABEL.to_string()
        } else {
            ADD_BUTTON_LABEL.to_string()
        },
        adding_hint: is_adding.then(|| ADDING_HINT.to_string()),
        place_count: places.len(),
        empty_message: places
            .is_empty()
            .then(|| EMPTY_PLACES_MESSAGE.to_string()),
        places,
        selected,
        name_prompt_open: model.draft_location.is_some(),
        sort_label: match model.sort_order {
            crate::model::SortOrder::NameAsc => "A-Z".to_string(),
            crate::model::SortOrder::NewestFirst => "Récent".to_string(),
        },
        panel_mode: model.panel_mode,
        is_mobile: model.viewport.class().is_mobile(),
    }
}

fn build_vehicle_card(model: &Model) -> VehicleCard {
    let telemetry = &model.telemetry;
    let battery_pct = telemetry.battery_pct();

    VehicleCard {
        status: telemetry
            .status
            .clone()
            .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        battery_pct,
        battery_low: battery_pct.is_some_and(|pct| pct < LOW_BATTERY_PCT),
        speed_kmh: telemetry.speed_kmh(),
        is_online: telemetry.is_online(model.now_ms),
        last_update_text: telemetry
            .last_updated_ms
            .map_or_else(|| "À l'instant".to_string(), |t| format_time_ago(t, model.now_ms)),
    }
}
