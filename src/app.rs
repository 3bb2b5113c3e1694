//! The application core: one `update` function owning every state
//! transition, and the `view` projection the shell renders.
//!
//! The `Model` is the single source of truth for the UI mode. Marker taps,
//! map taps, and swipes all dispatch through here, so what a gesture means
//! is always decided against the live state.

use crate::camera::{self, CameraTrigger};
use crate::capabilities::{
    AuthOutput, Capabilities, MapResult, StoreOutput, StoreResult,
};
use crate::event::Event;
use crate::gesture::{self, SwipeDirection};
use crate::model::{Model, PanelMode, PendingWrite, SessionPhase, UiMode, Viewport, WriteKind};
use crate::reconcile::MarkerOp;
use crate::registry::Place;
use crate::view::{self, ViewModel};
use crate::{
    clamp_zoom, AppError, ErrorKind, LatLon, OpId, PlaceId, ToastKind, UserId,
    PLACES_COLLECTION, VEHICLE_DOC_PATH,
};

#[derive(Default)]
pub struct App;

impl App {
    fn start_session(model: &mut Model, caps: &Capabilities, user_id: String) {
        tracing::info!(user_id = %user_id, "session established");
        model.phase = SessionPhase::Ready;
        model.user_id = Some(UserId::new(user_id));
        model.auth_error = None;

        if !model.subscriptions_active {
            model.subscriptions_active = true;

            caps.store
                .subscribe_collection(PLACES_COLLECTION, |result: StoreResult| match result {
                    Ok(StoreOutput::Snapshot { docs }) => Event::PlacesPushed { docs },
                    Ok(_) => Event::Noop,
                    Err(e) => Event::StoreStreamFailed {
                        message: e.to_string(),
                    },
                });

            caps.store
                .subscribe_document(VEHICLE_DOC_PATH, |result: StoreResult| match result {
                    Ok(StoreOutput::Document { doc }) => Event::VehiclePushed { doc },
                    Ok(_) => Event::Noop,
                    Err(e) => Event::StoreStreamFailed {
                        message: e.to_string(),
                    },
                });
        }
    }

    fn end_session(model: &mut Model, caps: &Capabilities) {
        tracing::info!("session ended, releasing subscriptions and markers");
        if model.subscriptions_active {
            caps.store.unsubscribe(PLACES_COLLECTION);
            caps.store.unsubscribe(VEHICLE_DOC_PATH);
        }
        if model.markers.live_place_count() > 0 || model.markers.has_vehicle_marker() {
            caps.map.clear_markers();
        }
        model.reset_session_state();
        model.phase = SessionPhase::SignedOut;
    }

    fn dispatch_marker_ops(caps: &Capabilities, ops: Vec<MarkerOp>) {
        for op in ops {
            caps.map.apply_marker(op, |result: MapResult| match result {
                Ok(_) => Event::Noop,
                Err(e) => Event::RenderingFailed {
                    message: e.to_string(),
                },
            });
        }
    }

    fn recompute_camera(trigger: CameraTrigger, model: &Model, caps: &Capabilities) {
        if let Some(command) = camera::compute(trigger, model) {
            caps.map.fly_to(command);
        }
    }

    fn select_place(model: &mut Model, caps: &Capabilities, id: PlaceId) {
        if !model.places.contains(&id) {
            tracing::debug!(place = %id, "tap on a place no longer in the registry");
            return;
        }
        model.ui_mode = UiMode::PlaceSelected(id);
        model.panel_mode = PanelMode::Default;
        model.draft_location = None;
        Self::recompute_camera(CameraTrigger::PlaceSelected, model, caps);
        caps.render.render();
    }

    fn apply_swipe(model: &mut Model, caps: &Capabilities, direction: SwipeDirection) {
        if !model.viewport.class().is_mobile() {
            return;
        }
        let next = match direction {
            SwipeDirection::Up => model.panel_mode.raised(),
            SwipeDirection::Down => model.panel_mode.lowered(),
        };
        if next != model.panel_mode {
            model.panel_mode = next;
            Self::recompute_camera(CameraTrigger::ModeChanged, model, caps);
            caps.render.render();
        }
    }

    fn start_place_write(
        model: &mut Model,
        kind: WriteKind,
    ) -> OpId {
        let op_id = OpId::generate();
        model.pending_writes.insert(
            op_id.clone(),
            PendingWrite {
                kind,
                started_at_ms: model.now_ms,
            },
        );
        op_id
    }

    fn write_callback(op_id: OpId) -> impl FnOnce(StoreResult) -> Event + Send + 'static {
        move |result| Event::PlaceWriteCompleted {
            op_id,
            result: Box::new(result),
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        tracing::trace!(event = event.name(), "handling event");
        match event {
            Event::Noop => {}

            Event::AppStarted => {
                if !model.session_watch_active {
                    model.session_watch_active = true;
                    caps.auth.watch_session(|result| match result {
                        Ok(AuthOutput::Session { user_id }) => Event::SessionChanged { user_id },
                        Ok(_) => Event::Noop,
                        Err(e) => Event::AuthStreamFailed {
                            message: e.to_string(),
                        },
                    });
                }
                caps.render.render();
            }

            // --- Session ---
            Event::SignInSubmitted { email, password } => {
                if model.phase.is_ready() {
                    return;
                }
                model.phase = SessionPhase::SigningIn;
                model.auth_error = None;
                caps.auth.sign_in(email, password, |result| match result {
                    Ok(_) => Event::Noop,
                    Err(e) => Event::SignInFailed {
                        message: e.to_string(),
                    },
                });
                caps.render.render();
            }

            Event::SignInFailed { message } => {
                tracing::warn!(%message, "sign-in failed");
                model.phase = SessionPhase::SignedOut;
                model.auth_error =
                    Some(AppError::new(ErrorKind::Auth, message).user_facing_message());
                caps.render.render();
            }

            Event::SignOutRequested => {
                caps.auth.sign_out();
            }

            Event::SessionChanged { user_id } => {
                match user_id {
                    Some(user_id) => Self::start_session(model, caps, user_id),
                    None => {
                        if model.phase.is_ready() {
                            Self::end_session(model, caps);
                        } else {
                            model.phase = SessionPhase::SignedOut;
                        }
                    }
                }
                caps.render.render();
            }

            Event::AuthStreamFailed { message } => {
                tracing::error!(%message, "session stream failed");
                if model.phase == SessionPhase::Loading {
                    model.phase = SessionPhase::SignedOut;
                    caps.render.render();
                }
            }

            // --- Store pushes ---
            Event::PlacesPushed { docs } => {
                if !model.phase.is_ready() {
                    return;
                }

                let delta = model.places.apply_snapshot(&docs);
                tracing::debug!(
                    added = delta.added.len(),
                    moved = delta.moved.len(),
                    removed = delta.removed.len(),
                    total = model.places.len(),
                    "places snapshot applied"
                );

                // A selection whose place was deleted remotely has nothing
                // left to point at.
                let selection_dropped = model
                    .ui_mode
                    .selected_id()
                    .is_some_and(|id| !model.places.contains(id));
                if selection_dropped {
                    model.ui_mode = UiMode::Browsing;
                }

                let ops = model.markers.reconcile(&delta);
                Self::dispatch_marker_ops(caps, ops);

                if selection_dropped {
                    Self::recompute_camera(CameraTrigger::ModeChanged, model, caps);
                }
                caps.render.render();
            }

            Event::VehiclePushed { doc } => {
                if !model.phase.is_ready() {
                    return;
                }

                let Some(doc) = doc else {
                    // Deleted document: keep the last telemetry and let the
                    // staleness rule take the indicator offline.
                    tracing::debug!("vehicle document absent, retaining last telemetry");
                    return;
                };

                match model.telemetry.merge_push(&doc.fields, model.now_ms) {
                    crate::telemetry::MergeOutcome::Stale => return,
                    crate::telemetry::MergeOutcome::Applied { has_fix } => {
                        if has_fix {
                            if let Some(position) = model.telemetry.position {
                                if let Some(op) = model.markers.update_vehicle(position) {
                                    Self::dispatch_marker_ops(caps, vec![op]);
                                }
                            }
                            // Selection pins the camera; following resumes
                            // only once nothing is selected.
                            if model.ui_mode.selected_id().is_none() {
                                Self::recompute_camera(
                                    CameraTrigger::TelemetryUpdate,
                                    model,
                                    caps,
                                );
                            }
                        }
                    }
                }
                caps.render.render();
            }

            Event::StoreStreamFailed { message } => {
                tracing::error!(%message, "store subscription failed");
            }

            // --- Store write results ---
            Event::PlaceWriteCompleted { op_id, result } => {
                let Some(pending) = model.pending_writes.remove(&op_id) else {
                    tracing::warn!(op_id = %op_id, "write completion for unknown operation");
                    return;
                };
                let PendingWrite { kind, started_at_ms } = pending;
                let in_flight_ms = model.now_ms.saturating_sub(started_at_ms);

                match (*result, kind) {
                    (Ok(_), WriteKind::CreatePlace) => {
                        tracing::info!("place created");
                        if model.ui_mode.is_adding() {
                            model.ui_mode = UiMode::Browsing;
                            model.panel_mode = PanelMode::Default;
                            Self::recompute_camera(CameraTrigger::ModeChanged, model, caps);
                        }
                    }
                    (Ok(_), WriteKind::RenamePlace(id)) => {
                        tracing::info!(place = %id, "place renamed");
                    }
                    (Ok(_), WriteKind::DeletePlace(id)) => {
                        tracing::info!(place = %id, "place deleted");
                    }
                    (Err(e), kind) => {
                        tracing::warn!(error = %e, ?kind, in_flight_ms, "place write failed");
                        let error = AppError::new(ErrorKind::Write, e.to_string());
                        model.show_toast(error.user_facing_message(), ToastKind::Error);
                    }
                }
                caps.render.render();
            }

            // --- Map surface ---
            Event::MarkerTapped { id } => {
                Self::select_place(model, caps, PlaceId::new(id));
            }

            Event::MapTapped { lat, lng } => {
                // Outside add-mode a map tap means nothing.
                if !model.ui_mode.is_adding() {
                    return;
                }
                match LatLon::validated(lat, lng) {
                    Ok(location) => {
                        model.draft_location = Some(location);
                        caps.render.render();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring tap with invalid coordinates");
                    }
                }
            }

            Event::MapZoomChanged { zoom } => {
                model.map_zoom = clamp_zoom(zoom);
            }

            Event::RenderingFailed { message } => {
                tracing::warn!(%message, "marker operation failed on the map surface");
            }

            // --- Panel & dashboard input ---
            Event::AddModeToggled => {
                if model.ui_mode.selected_id().is_some() {
                    return;
                }
                if model.ui_mode.is_adding() {
                    model.ui_mode = UiMode::Browsing;
                    model.draft_location = None;
                } else {
                    model.ui_mode = UiMode::Adding;
                    model.panel_mode = PanelMode::Min;
                }
                Self::recompute_camera(CameraTrigger::ModeChanged, model, caps);
                caps.render.render();
            }

            Event::DraftNameSubmitted { name } => {
                if !model.ui_mode.is_adding() {
                    return;
                }
                let Some(location) = model.draft_location.take() else {
                    return;
                };

                let name = name.trim().to_string();
                if name.is_empty() {
                    // Prompt dismissed; stay in add-mode, drop the tap.
                    caps.render.render();
                    return;
                }

                let op_id = Self::start_place_write(model, WriteKind::CreatePlace);
                caps.store.create(
                    PLACES_COLLECTION,
                    Place::create_fields(&name, location, model.now_ms),
                    Self::write_callback(op_id),
                );
                caps.render.render();
            }

            Event::DraftCancelled => {
                if model.draft_location.take().is_some() {
                    caps.render.render();
                }
            }

            Event::PlaceRowTapped { id } => {
                Self::select_place(model, caps, id);
            }

            Event::BackRequested => {
                if model.ui_mode.selected_id().is_none() {
                    return;
                }
                model.ui_mode = UiMode::Browsing;
                Self::recompute_camera(CameraTrigger::ModeChanged, model, caps);
                caps.render.render();
            }

            Event::RenameConfirmed { name } => {
                let Some(place) = model.selected_place() else {
                    return;
                };
                let name = name.trim().to_string();
                // An unchanged or empty name performs no write.
                if name.is_empty() || name == place.name {
                    return;
                }
                let id = place.id.clone();
                let path = format!("{PLACES_COLLECTION}/{id}");
                let op_id = Self::start_place_write(model, WriteKind::RenamePlace(id));
                caps.store
                    .update(path, Place::rename_fields(&name), Self::write_callback(op_id));
                caps.render.render();
            }

            Event::DeleteConfirmed => {
                let Some(id) = model.ui_mode.selected_id().cloned() else {
                    return;
                };
                let path = format!("{PLACES_COLLECTION}/{id}");
                let op_id = Self::start_place_write(model, WriteKind::DeletePlace(id));
                caps.store.delete(path, Self::write_callback(op_id));

                model.ui_mode = UiMode::Browsing;
                Self::recompute_camera(CameraTrigger::ModeChanged, model, caps);
                caps.render.render();
            }

            Event::SortOrderToggled => {
                model.sort_order = model.sort_order.toggled();
                caps.render.render();
            }

            Event::PanelDragStarted { y } => {
                if model.viewport.class().is_mobile() {
                    model.drag_start_y = Some(y);
                }
            }

            Event::PanelDragEnded { y } => {
                let Some(start_y) = model.drag_start_y.take() else {
                    return;
                };
                if let Some(direction) = gesture::interpret_vertical_drag(start_y, y) {
                    Self::apply_swipe(model, caps, direction);
                }
            }

            Event::ToastDismissed => {
                model.clear_toast();
                caps.render.render();
            }

            // --- Environment ---
            Event::ViewportResized {
                width_px,
                height_px,
            } => {
                let next = Viewport::new(width_px, height_px);
                if next == model.viewport {
                    return;
                }
                model.viewport = next;
                Self::recompute_camera(CameraTrigger::ModeChanged, model, caps);
                caps.render.render();
            }

            Event::ClockTick { now_ms } => {
                model.now_ms = model.now_ms.max(now_ms);
                if model
                    .active_toast
                    .as_ref()
                    .is_some_and(|t| t.is_expired(model.now_ms))
                {
                    model.clear_toast();
                }
                // The online indicator and relative time decay with the
                // clock, independent of push arrival.
                caps.render.render();
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        view::build(model)
    }
}
