use crux_core::testing::AppTester;
use proptest::prelude::*;
use serde_json::json;
use traceur_core::capabilities::{MapOperation, StoreDoc};
use traceur_core::reconcile::{MarkerOp, MarkerSet};
use traceur_core::registry::PlaceRegistry;
use traceur_core::view::Screen;
use traceur_core::{App, Effect, Event, LatLon, Model, PlaceId};

fn place_doc(id: &str, name: &str, lat: f64, lng: f64, created_at: u64) -> StoreDoc {
    StoreDoc {
        id: id.to_string(),
        fields: json!({
            "name": name,
            "latitude": lat,
            "longitude": lng,
            "createdAt": created_at,
        }),
    }
}

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

fn marker_ops(effects: Vec<Effect>) -> Vec<MarkerOp> {
    effects
        .into_iter()
        .filter_map(|e| {
            if let Effect::Map(req) = e {
                if let MapOperation::Marker(op) = &req.operation {
                    return Some(op.clone());
                }
            }
            None
        })
        .collect()
}

#[test]
fn empty_collection_shows_the_empty_state() {
    let (app, mut model) = ready_app();
    app.update(Event::PlacesPushed { docs: vec![] }, &mut model);

    let vm = app.view(&model);
    let Screen::Dashboard(dashboard) = vm.screen else {
        panic!("expected the dashboard screen");
    };
    assert_eq!(
        dashboard.empty_message.as_deref(),
        Some("Aucun lieu enregistré")
    );
    assert_eq!(model.markers.live_place_count(), 0);
}

#[test]
fn one_pushed_place_yields_one_marker_and_one_row() {
    let (app, mut model) = ready_app();

    let update = app.update(
        Event::PlacesPushed {
            docs: vec![place_doc("p1", "Maison", 45.5, -73.5, 1000)],
        },
        &mut model,
    );

    let ops = marker_ops(update.effects);
    assert_eq!(ops.len(), 1);
    assert!(matches!(
        &ops[0],
        MarkerOp::Add { id, position, .. }
            if id == "p1" && position.same_position(LatLon::new(45.5, -73.5))
    ));

    assert_eq!(model.markers.live_place_count(), 1);
    assert!(model.markers.has_place_marker(&PlaceId::new("p1")));

    let Screen::Dashboard(dashboard) = app.view(&model).screen else {
        panic!("expected the dashboard screen");
    };
    assert_eq!(dashboard.places.len(), 1);
    assert_eq!(dashboard.places[0].name, "Maison");
    assert_eq!(dashboard.empty_message, None);
}

#[test]
fn reapplying_a_snapshot_emits_no_marker_operations() {
    let (app, mut model) = ready_app();
    let docs = vec![
        place_doc("p1", "Maison", 45.5, -73.5, 1000),
        place_doc("p2", "Travail", 45.6, -73.6, 2000),
    ];

    app.update(Event::PlacesPushed { docs: docs.clone() }, &mut model);
    let update = app.update(Event::PlacesPushed { docs }, &mut model);

    assert!(marker_ops(update.effects).is_empty());
    assert_eq!(model.markers.live_place_count(), 2);
}

#[test]
fn removed_place_releases_its_marker() {
    let (app, mut model) = ready_app();
    app.update(
        Event::PlacesPushed {
            docs: vec![
                place_doc("p1", "Maison", 45.5, -73.5, 1000),
                place_doc("p2", "Travail", 45.6, -73.6, 2000),
            ],
        },
        &mut model,
    );

    let update = app.update(
        Event::PlacesPushed {
            docs: vec![place_doc("p2", "Travail", 45.6, -73.6, 2000)],
        },
        &mut model,
    );

    let ops = marker_ops(update.effects);
    assert_eq!(ops, vec![MarkerOp::Remove { id: "p1".into() }]);
    assert!(!model.markers.has_place_marker(&PlaceId::new("p1")));
}

#[test]
fn moved_place_repositions_its_marker_in_place() {
    let (app, mut model) = ready_app();
    app.update(
        Event::PlacesPushed {
            docs: vec![place_doc("p1", "Maison", 45.5, -73.5, 1000)],
        },
        &mut model,
    );

    let update = app.update(
        Event::PlacesPushed {
            docs: vec![place_doc("p1", "Maison", 45.51, -73.5, 1000)],
        },
        &mut model,
    );

    let ops = marker_ops(update.effects);
    assert_eq!(
        ops,
        vec![MarkerOp::Move {
            id: "p1".into(),
            position: LatLon::new(45.51, -73.5),
        }]
    );
}

#[test]
fn remote_deletion_of_the_selected_place_drops_the_selection() {
    let (app, mut model) = ready_app();
    app.update(
        Event::PlacesPushed {
            docs: vec![place_doc("p1", "Maison", 45.5, -73.5, 1000)],
        },
        &mut model,
    );
    app.update(Event::MarkerTapped { id: "p1".into() }, &mut model);
    assert!(model.selected_place().is_some());

    app.update(Event::PlacesPushed { docs: vec![] }, &mut model);
    assert!(model.selected_place().is_none());

    let Screen::Dashboard(dashboard) = app.view(&model).screen else {
        panic!("expected the dashboard screen");
    };
    assert!(dashboard.selected.is_none());
}

proptest! {
    /// For any sequence of snapshots, the live marker set equals the latest
    /// snapshot's id set: no duplicates, no leaks.
    #[test]
    fn live_markers_always_equal_the_latest_snapshot(
        snapshots in proptest::collection::vec(
            proptest::collection::vec((0u8..8, -80.0f64..80.0, -170.0f64..170.0), 0..8),
            1..12,
        )
    ) {
        let mut registry = PlaceRegistry::default();
        let mut markers = MarkerSet::default();

        for snapshot in snapshots {
            let docs: Vec<StoreDoc> = snapshot
                .iter()
                .map(|(id, lat, lng)| place_doc(&format!("p{id}"), "Lieu", *lat, *lng, 1))
                .collect();

            let delta = registry.apply_snapshot(&docs);
            markers.reconcile(&delta);

            let expected: Vec<PlaceId> = registry.iter().map(|p| p.id.clone()).collect();
            prop_assert_eq!(markers.place_ids(), expected);
        }
    }
}
