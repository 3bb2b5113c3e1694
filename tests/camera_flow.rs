use crux_core::testing::AppTester;
use serde_json::json;
use traceur_core::capabilities::{MapOperation, StoreDoc};
use traceur_core::camera::CameraCommand;
use traceur_core::{
    App, Effect, Event, LatLon, Model, FOLLOW_ZOOM, SELECTION_MIN_ZOOM,
};

fn ready_app() -> (AppTester<App, Effect>, Model) {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();
    app.update(Event::AppStarted, &mut model);
    app.update(
        Event::SessionChanged {
            user_id: Some("u1".into()),
        },
        &mut model,
    );
    (app, model)
}

fn push_place(app: &AppTester<App, Effect>, model: &mut Model) {
    app.update(
        Event::PlacesPushed {
            docs: vec![StoreDoc {
                id: "p1".into(),
                fields: json!({
                    "name": "Maison",
                    "latitude": 48.86,
                    "longitude": 2.35,
                    "createdAt": 1000u64,
                }),
            }],
        },
        model,
    );
}

fn telemetry_push(lat: f64, lng: f64, ts: u64) -> Event {
    Event::VehiclePushed {
        doc: Some(StoreDoc {
            id: "partner_01".into(),
            fields: json!({
                "status": "En route",
                "location": { "latitude": lat, "longitude": lng, "speed": 30.0 },
                "lastUpdated": ts,
            }),
        }),
    }
}

fn fly_to_commands(effects: Vec<Effect>) -> Vec<CameraCommand> {
    effects
        .into_iter()
        .filter_map(|e| {
            if let Effect::Map(req) = e {
                if let MapOperation::FlyTo(cmd) = &req.operation {
                    return Some(cmd.clone());
                }
            }
            None
        })
        .collect()
}

#[test]
fn telemetry_is_followed_at_fixed_zoom_when_nothing_is_selected() {
    let (app, mut model) = ready_app();

    let update = app.update(telemetry_push(45.5, -73.5, 1000), &mut model);
    let commands = fly_to_commands(update.effects);

    assert_eq!(commands.len(), 1);
    assert!(commands[0].center.same_position(LatLon::new(45.5, -73.5)));
    assert_eq!(commands[0].zoom, FOLLOW_ZOOM);
}

#[test]
fn no_camera_command_before_any_data() {
    let (app, mut model) = ready_app();

    let update = app.update(Event::BackRequested, &mut model);
    assert!(fly_to_commands(update.effects).is_empty());
}

#[test]
fn selecting_a_place_flies_to_it_with_a_zoom_floor() {
    let (app, mut model) = ready_app();
    push_place(&app, &mut model);
    app.update(Event::MapZoomChanged { zoom: 10.0 }, &mut model);

    let update = app.update(Event::MarkerTapped { id: "p1".into() }, &mut model);
    let commands = fly_to_commands(update.effects);

    assert_eq!(commands.len(), 1);
    assert!(commands[0].center.same_position(LatLon::new(48.86, 2.35)));
    assert_eq!(commands[0].zoom, SELECTION_MIN_ZOOM);
}

#[test]
fn selection_keeps_a_deeper_zoom() {
    let (app, mut model) = ready_app();
    push_place(&app, &mut model);
    app.update(Event::MapZoomChanged { zoom: 16.5 }, &mut model);

    let update = app.update(Event::MarkerTapped { id: "p1".into() }, &mut model);
    assert_eq!(fly_to_commands(update.effects)[0].zoom, 16.5);
}

#[test]
fn selection_pins_the_camera_against_telemetry() {
    let (app, mut model) = ready_app();
    push_place(&app, &mut model);
    app.update(telemetry_push(45.5, -73.5, 1000), &mut model);
    app.update(Event::MarkerTapped { id: "p1".into() }, &mut model);

    // Telemetry keeps arriving while the place is selected: the vehicle
    // marker moves, the camera does not.
    let update = app.update(telemetry_push(45.6, -73.6, 2000), &mut model);
    assert!(fly_to_commands(update.effects).is_empty());

    // Deselecting resumes following on the next push.
    let update = app.update(Event::BackRequested, &mut model);
    let commands = fly_to_commands(update.effects);
    assert_eq!(commands.len(), 1);
    assert!(commands[0].center.same_position(LatLon::new(45.6, -73.6)));

    let update = app.update(telemetry_push(45.7, -73.7, 3000), &mut model);
    let commands = fly_to_commands(update.effects);
    assert_eq!(commands.len(), 1);
    assert!(commands[0].center.same_position(LatLon::new(45.7, -73.7)));
}

#[test]
fn stale_telemetry_neither_moves_the_camera_nor_the_marker() {
    let (app, mut model) = ready_app();
    app.update(telemetry_push(45.5, -73.5, 5000), &mut model);

    let update = app.update(telemetry_push(40.0, -70.0, 1000), &mut model);
    assert!(fly_to_commands(update.effects).is_empty());
    assert_eq!(
        model.telemetry.position,
        Some(LatLon::new(45.5, -73.5)),
        "the earlier push must not regress the retained state"
    );
}

#[test]
fn add_mode_does_not_suppress_following() {
    let (app, mut model) = ready_app();
    app.update(telemetry_push(45.5, -73.5, 1000), &mut model);
    app.update(Event::AddModeToggled, &mut model);

    let update = app.update(telemetry_push(45.6, -73.6, 2000), &mut model);
    assert_eq!(fly_to_commands(update.effects).len(), 1);
}
