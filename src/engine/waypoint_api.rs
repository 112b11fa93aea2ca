use super::Engine;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::{RouteAPI, WaypointAPI},
    entities::{
        Coordinates, ImportFailure, ImportRecord, ImportReport, Stop, Waypoint, WaypointListing,
    },
    error::{invalid_coordinates_error, not_found_error, Error},
};

#[async_trait]
impl WaypointAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn list_waypoints(&self) -> Result<WaypointListing, Error> {
        let list = self.waypoints.lock().await;

        Ok(list.listing())
    }

    #[tracing::instrument(skip(self))]
    async fn add_waypoint(&self, text: String) -> Result<Waypoint, Error> {
        let location = self.resolve_address(text).await?;

        self.insert_waypoint(location.description, location.coordinates)
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn insert_waypoint(
        &self,
        label: String,
        position: Coordinates,
    ) -> Result<Waypoint, Error> {
        if !position.is_valid() {
            return Err(invalid_coordinates_error());
        }

        let mut list = self.waypoints.lock().await;
        let waypoint = list.insert(label, position);

        tracing::info!(id = %waypoint.id, len = list.len(), "inserted waypoint");

        self.publish(&list).await;
        self.focus(waypoint.position);

        Ok(waypoint)
    }

    #[tracing::instrument(skip(self))]
    async fn edit_waypoint(&self, id: Uuid, text: String) -> Result<Waypoint, Error> {
        if !self.waypoints.lock().await.contains(id) {
            return Err(not_found_error());
        }

        let location = self.resolve_address(text.clone()).await?;

        self.update_waypoint(id, text.trim().into(), location.coordinates)
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn update_waypoint(
        &self,
        id: Uuid,
        label: String,
        position: Coordinates,
    ) -> Result<Waypoint, Error> {
        if !position.is_valid() {
            return Err(invalid_coordinates_error());
        }

        let mut list = self.waypoints.lock().await;

        let waypoint = list.update(id, label, position).map_err(|err| {
            tracing::warn!(%id, "waypoint vanished before update, discarding");
            err
        })?;

        self.publish(&list).await;
        self.focus(waypoint.position);

        Ok(waypoint)
    }

    #[tracing::instrument(skip(self))]
    async fn remove_waypoint(&self, id: Uuid) -> Result<Waypoint, Error> {
        let mut list = self.waypoints.lock().await;
        let waypoint = list.remove(id)?;

        tracing::info!(%id, len = list.len(), "removed waypoint");

        self.publish(&list).await;

        Ok(waypoint)
    }

    #[tracing::instrument(skip(self))]
    async fn reorder_waypoints(&self, from: usize, to: usize) -> Result<Vec<Stop>, Error> {
        let mut list = self.waypoints.lock().await;
        list.reorder(from, to)?;

        self.publish(&list).await;

        Ok(list.stops())
    }

    #[tracing::instrument(skip_all, fields(records = records.len()))]
    async fn import_waypoints(&self, records: Vec<ImportRecord>) -> Result<ImportReport, Error> {
        let mut report = ImportReport::default();

        for record in records {
            let result = match record.position {
                Some(position) => self.insert_waypoint(record.label.clone(), position).await,
                None => self.add_waypoint(record.label.clone()).await,
            };

            match result {
                Ok(waypoint) => report.inserted.push(waypoint),
                Err(err) => {
                    tracing::warn!(label = %record.label, "skipping import record: {}", err);
                    report.failed.push(ImportFailure {
                        label: record.label,
                        reason: err.message,
                    });
                }
            }
        }

        Ok(report)
    }
}

#[test]
fn add_waypoints_by_text_and_coordinates() {
    use super::fakes::engine;
    use crate::entities::{ListState, Role};
    use tokio_test::block_on;

    let engine = engine();

    let start = block_on(engine.add_waypoint("Plaza de Mayo".into())).unwrap();
    assert_eq!(start.label, "Plaza de Mayo, Buenos Aires");

    let end = block_on(engine.add_waypoint("-34.6, -58.4".into())).unwrap();
    assert_eq!(end.label, "-34.6, -58.4");
    assert_eq!(end.position, Coordinates::new(-34.6, -58.4));

    let middle = block_on(engine.add_waypoint("Obelisco".into())).unwrap();

    let listing = block_on(engine.list_waypoints()).unwrap();
    assert_eq!(listing.state, ListState::Routable);

    let ids: Vec<Uuid> = listing.stops.iter().map(|s| s.waypoint.id).collect();
    assert_eq!(ids, vec![start.id, middle.id, end.id]);

    let roles: Vec<Role> = listing.stops.iter().map(|s| s.role).collect();
    assert_eq!(roles, vec![Role::Start, Role::Intermediate, Role::End]);
}

#[test]
fn add_unknown_address() {
    use super::fakes::engine;
    use crate::error::ErrorKind;
    use tokio_test::block_on;

    let engine = engine();

    let err = block_on(engine.add_waypoint("Atlantis".into())).unwrap_err();
    assert!(err.is(ErrorKind::NotFound));

    let err = block_on(engine.add_waypoint("   ".into())).unwrap_err();
    assert!(err.is(ErrorKind::InvalidInput));

    assert!(block_on(engine.list_waypoints()).unwrap().stops.is_empty());
}

#[test]
fn edit_keeps_identity_and_position_in_list() {
    use super::fakes::engine;
    use tokio_test::block_on;

    let engine = engine();

    let a = block_on(engine.add_waypoint("Plaza de Mayo".into())).unwrap();
    let b = block_on(engine.add_waypoint("Obelisco".into())).unwrap();

    let edited = block_on(engine.edit_waypoint(a.id, "Caminito".into())).unwrap();
    assert_eq!(edited.id, a.id);
    assert_eq!(edited.label, "Caminito");
    assert_eq!(edited.position, Coordinates::new(-34.6394, -58.3628));

    let listing = block_on(engine.list_waypoints()).unwrap();
    assert_eq!(listing.stops[0].waypoint, edited);
    assert_eq!(listing.stops[1].waypoint, b);
}

#[test]
fn failed_edit_leaves_waypoint_unchanged() {
    use super::fakes::engine;
    use crate::error::ErrorKind;
    use tokio_test::block_on;

    let engine = engine();
    let a = block_on(engine.add_waypoint("Plaza de Mayo".into())).unwrap();

    let err = block_on(engine.edit_waypoint(a.id, "Atlantis".into())).unwrap_err();
    assert!(err.is(ErrorKind::NotFound));

    let err = block_on(engine.edit_waypoint(Uuid::new_v4(), "Obelisco".into())).unwrap_err();
    assert!(err.is(ErrorKind::NotFound));

    let listing = block_on(engine.list_waypoints()).unwrap();
    assert_eq!(listing.stops[0].waypoint, a);
}

#[test]
fn edit_discards_result_for_removed_waypoint() {
    use super::fakes::{engine_with, places, FakeOptimizer, Plan};
    use crate::error::ErrorKind;
    use std::sync::Arc;
    use tokio::sync::Notify;
    use tokio_test::block_on;

    let gate = Arc::new(Notify::new());
    let engine = engine_with(
        places().gated(gate.clone()),
        FakeOptimizer::new(Plan::Reverse),
    );

    let a = block_on(engine.insert_waypoint("a".into(), Coordinates::new(1.0, 1.0))).unwrap();
    let b = block_on(engine.insert_waypoint("b".into(), Coordinates::new(2.0, 2.0))).unwrap();

    let (edited, removed) = block_on(async {
        tokio::join!(engine.edit_waypoint(a.id, "Obelisco".into()), async {
            let removed = engine.remove_waypoint(a.id).await;
            gate.notify_one();
            removed
        })
    });

    assert!(removed.is_ok());
    assert!(edited.unwrap_err().is(ErrorKind::NotFound));

    let listing = block_on(engine.list_waypoints()).unwrap();
    assert_eq!(listing.stops.len(), 1);
    assert_eq!(listing.stops[0].waypoint, b);
}

#[test]
fn remove_twice() {
    use super::fakes::engine;
    use crate::error::ErrorKind;
    use tokio_test::block_on;

    let engine = engine();
    let a = block_on(engine.insert_waypoint("a".into(), Coordinates::new(1.0, 1.0))).unwrap();

    assert!(block_on(engine.remove_waypoint(a.id)).is_ok());
    assert!(block_on(engine.remove_waypoint(a.id))
        .unwrap_err()
        .is(ErrorKind::NotFound));
}

#[test]
fn reorder_through_engine() {
    use super::fakes::engine;
    use crate::error::ErrorKind;
    use tokio_test::block_on;

    let engine = engine();
    for (i, label) in ["a", "e", "b", "c", "d"].iter().enumerate() {
        block_on(engine.insert_waypoint(label.to_string(), Coordinates::new(i as f64, 0.0)))
            .unwrap();
    }

    let stops = block_on(engine.reorder_waypoints(3, 1)).unwrap();
    let labels: Vec<&str> = stops.iter().map(|s| s.waypoint.label.as_str()).collect();
    assert_eq!(labels, vec!["a", "d", "b", "c", "e"]);

    let err = block_on(engine.reorder_waypoints(4, 1)).unwrap_err();
    assert!(err.is(ErrorKind::Rejected));
}

#[test]
fn import_continues_past_failures() {
    use super::fakes::engine;
    use tokio_test::block_on;

    let engine = engine();

    let records = vec![
        ImportRecord {
            label: "Plaza de Mayo".into(),
            position: None,
        },
        ImportRecord {
            label: "Atlantis".into(),
            position: None,
        },
        ImportRecord {
            label: "office".into(),
            position: Some(Coordinates::new(-34.59, -58.42)),
        },
        ImportRecord {
            label: "nowhere".into(),
            position: Some(Coordinates::new(123.0, 0.0)),
        },
        ImportRecord {
            label: "Obelisco".into(),
            position: None,
        },
    ];

    let report = block_on(engine.import_waypoints(records)).unwrap();

    let inserted: Vec<&str> = report.inserted.iter().map(|w| w.label.as_str()).collect();
    assert_eq!(
        inserted,
        vec![
            "Plaza de Mayo, Buenos Aires",
            "office",
            "Obelisco, Buenos Aires"
        ]
    );

    let failed: Vec<&str> = report.failed.iter().map(|f| f.label.as_str()).collect();
    assert_eq!(failed, vec!["Atlantis", "nowhere"]);

    let listing = block_on(engine.list_waypoints()).unwrap();
    let labels: Vec<&str> = listing
        .stops
        .iter()
        .map(|s| s.waypoint.label.as_str())
        .collect();
    assert_eq!(
        labels,
        vec![
            "Plaza de Mayo, Buenos Aires",
            "Obelisco, Buenos Aires",
            "office"
        ]
    );
}

#[test]
fn markers_follow_the_list() {
    use super::fakes::{engine, MapEvent, RecordingMap};
    use super::map_layer::FOCUS_ZOOM;
    use std::sync::Arc;
    use tokio_test::block_on;

    let map = Arc::new(RecordingMap::default());
    let engine = engine().with_map_surface(map.clone());

    let a = block_on(engine.insert_waypoint("a".into(), Coordinates::new(1.0, 1.0))).unwrap();
    let b = block_on(engine.insert_waypoint("b".into(), Coordinates::new(2.0, 2.0))).unwrap();
    let c = block_on(engine.insert_waypoint("c".into(), Coordinates::new(3.0, 3.0))).unwrap();

    let placed: Vec<MapEvent> = map
        .take()
        .into_iter()
        .filter(|e| matches!(e, MapEvent::Placed(_, _)))
        .collect();
    assert_eq!(placed.len(), 3);

    let handle_of = |label: &str| match placed
        .iter()
        .find(|e| matches!(e, MapEvent::Placed(_, l) if l == label))
    {
        Some(MapEvent::Placed(handle, _)) => *handle,
        _ => panic!("no marker for {}", label),
    };

    block_on(engine.update_waypoint(a.id, "A".into(), Coordinates::new(1.5, 1.5))).unwrap();
    assert_eq!(
        map.take(),
        vec![
            MapEvent::Moved(handle_of("a")),
            MapEvent::Relabelled(handle_of("a"), "A".into()),
            MapEvent::Centered(FOCUS_ZOOM),
        ]
    );

    block_on(engine.remove_waypoint(c.id)).unwrap();
    assert_eq!(map.take(), vec![MapEvent::Removed(handle_of("c"))]);

    block_on(engine.update_waypoint(b.id, "b".into(), Coordinates::new(2.0, 2.0))).unwrap();
    assert_eq!(map.take(), vec![MapEvent::Centered(FOCUS_ZOOM)]);
}
