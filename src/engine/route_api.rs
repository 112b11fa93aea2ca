use super::helpers::{
    build_optimization_request, coordinates_label, job_order_to_ids, parse_coordinates,
};
use super::Engine;

use async_trait::async_trait;

use crate::{
    api::RouteAPI,
    entities::{Location, OptimizedRoute},
    error::{
        invalid_coordinates_error, invalid_input_error, not_found_error,
        reconciliation_mismatch_error, Error,
    },
};

#[async_trait]
impl RouteAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn resolve_address(&self, text: String) -> Result<Location, Error> {
        let text = text.trim();

        if text.is_empty() {
            return Err(invalid_input_error());
        }

        if let Some(coordinates) = parse_coordinates(text) {
            if !coordinates.is_valid() {
                return Err(invalid_coordinates_error());
            }

            return Ok(Location::new(coordinates, coordinates_label(&coordinates)));
        }

        self.geocoder.lookup(text).await.map_err(|err| {
            tracing::warn!("address lookup failed: {}", err);
            not_found_error()
        })
    }

    #[tracing::instrument(skip(self))]
    async fn compute_optimized_route(&self) -> Result<OptimizedRoute, Error> {
        let (request, job_ids) = {
            let list = self.waypoints.lock().await;
            build_optimization_request(&list)?
        };

        tracing::info!(jobs = request.jobs.len(), "requesting optimized order");

        let order = self.optimizer.optimize(&request).await?;
        let ids = job_order_to_ids(&order, &job_ids)?;

        let (positions, stops) = {
            let mut list = self.waypoints.lock().await;

            list.apply_optimized_order(&ids).map_err(|_| {
                tracing::warn!("optimized order no longer matches the waypoint list");
                reconciliation_mismatch_error()
            })?;

            self.publish(&list).await;

            (list.positions(), list.stops())
        };

        // The new order stays applied even if the directions call fails.
        let route = self.directions.route(&positions).await?;

        if let Some(map) = &self.map {
            map.show_route(&route).await;
        }

        let route = OptimizedRoute::new(stops, route);

        tracing::info!("{}", route.summary());

        Ok(route)
    }
}

#[test]
fn resolve_coordinates_without_geocoder() {
    use super::fakes::places;
    use super::fakes::{FakeDirections, FakeOptimizer, Plan};
    use crate::entities::Coordinates;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tokio_test::block_on;

    let geocoder = Arc::new(places());
    let engine = Engine::new(
        geocoder.clone(),
        Arc::new(FakeOptimizer::new(Plan::Reverse)),
        Arc::new(FakeDirections::new()),
    );

    let location = block_on(engine.resolve_address("-34.6,-58.4".into())).unwrap();

    assert_eq!(location.coordinates, Coordinates::new(-34.6, -58.4));
    assert_eq!(location.description, "-34.6, -58.4");
    assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);

    block_on(engine.resolve_address("Obelisco".into())).unwrap();
    assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn resolve_failures() {
    use super::fakes::engine;
    use crate::error::ErrorKind;
    use tokio_test::block_on;

    let engine = engine();

    let err = block_on(engine.resolve_address("Atlantis".into())).unwrap_err();
    assert!(err.is(ErrorKind::NotFound));

    let err = block_on(engine.resolve_address("offline".into())).unwrap_err();
    assert!(err.is(ErrorKind::NotFound));

    let err = block_on(engine.resolve_address("95, 10".into())).unwrap_err();
    assert!(err.is(ErrorKind::InvalidInput));

    let err = block_on(engine.resolve_address("".into())).unwrap_err();
    assert!(err.is(ErrorKind::InvalidInput));
}

#[cfg(test)]
fn seed(engine: &Engine, labels: &[&str]) -> Vec<crate::entities::Waypoint> {
    use crate::api::WaypointAPI;
    use crate::entities::Coordinates;
    use tokio_test::block_on;

    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            block_on(engine.insert_waypoint(label.to_string(), Coordinates::new(i as f64, 0.0)))
                .unwrap()
        })
        .collect()
}

#[test]
fn optimized_route_reorders_intermediates() {
    use super::fakes::{engine_with, places, FakeOptimizer, Plan};
    use crate::api::WaypointAPI;
    use tokio_test::block_on;

    let engine = engine_with(places(), FakeOptimizer::new(Plan::Order(vec![1, 0])));

    // insertion order a, d, b, c gives [a, b, c, d]
    let seeded = seed(&engine, &["a", "d", "b", "c"]);
    let (a, d, b, c) = (&seeded[0], &seeded[1], &seeded[2], &seeded[3]);

    let route = block_on(engine.compute_optimized_route()).unwrap();

    let ids: Vec<_> = route.stops.iter().map(|s| s.waypoint.id).collect();
    assert_eq!(ids, vec![a.id, c.id, b.id, d.id]);
    assert_eq!(route.distance_meters, 4000.0);
    assert_eq!(route.geometry.0.len(), 4);

    let listing = block_on(engine.list_waypoints()).unwrap();
    let stored: Vec<_> = listing.stops.iter().map(|s| s.waypoint.clone()).collect();
    assert_eq!(stored, vec![a.clone(), c.clone(), b.clone(), d.clone()]);
}

#[test]
fn optimized_route_needs_three_points() {
    use super::fakes::engine;
    use crate::error::ErrorKind;
    use tokio_test::block_on;

    let engine = engine();

    let cases: [&[&str]; 3] = [&[], &["a"], &["a", "b"]];

    for labels in cases {
        let engine = super::fakes::engine();
        seed(&engine, labels);

        let err = block_on(engine.compute_optimized_route()).unwrap_err();
        assert!(err.is(ErrorKind::NotEnoughPoints));
    }

    let err = block_on(engine.compute_optimized_route()).unwrap_err();
    assert!(err.is(ErrorKind::NotEnoughPoints));
}

#[test]
fn malformed_optimizer_order_is_a_mismatch() {
    use super::fakes::{engine_with, places, FakeOptimizer, Plan};
    use crate::api::WaypointAPI;
    use crate::error::ErrorKind;
    use tokio_test::block_on;

    for order in [vec![0], vec![0, 0], vec![0, 5], vec![]] {
        let engine = engine_with(places(), FakeOptimizer::new(Plan::Order(order)));
        let seeded = seed(&engine, &["a", "d", "b", "c"]);

        let err = block_on(engine.compute_optimized_route()).unwrap_err();
        assert!(err.is(ErrorKind::ReconciliationMismatch));

        let listing = block_on(engine.list_waypoints()).unwrap();
        let ids: Vec<_> = listing.stops.iter().map(|s| s.waypoint.id).collect();
        assert_eq!(
            ids,
            vec![seeded[0].id, seeded[2].id, seeded[3].id, seeded[1].id]
        );
    }
}

#[test]
fn optimizer_failures_surface() {
    use super::fakes::{engine_with, places, FakeOptimizer, Plan};
    use crate::error::ErrorKind;
    use tokio_test::block_on;

    let engine = engine_with(places(), FakeOptimizer::new(Plan::NoRoute));
    seed(&engine, &["a", "b", "c"]);
    let err = block_on(engine.compute_optimized_route()).unwrap_err();
    assert!(err.is(ErrorKind::NoRoute));

    let engine = engine_with(places(), FakeOptimizer::new(Plan::Offline));
    seed(&engine, &["a", "b", "c"]);
    let err = block_on(engine.compute_optimized_route()).unwrap_err();
    assert!(err.is(ErrorKind::ServiceError));
}

#[test]
fn directions_failure_keeps_new_order() {
    use super::fakes::{places, FakeDirections, FakeOptimizer, Plan};
    use crate::api::WaypointAPI;
    use crate::error::ErrorKind;
    use std::sync::Arc;
    use tokio_test::block_on;

    let directions = Arc::new(FakeDirections::offline());
    let engine = Engine::new(
        Arc::new(places()),
        Arc::new(FakeOptimizer::new(Plan::Reverse)),
        directions.clone(),
    );

    let seeded = seed(&engine, &["a", "e", "b", "c", "d"]);
    let err = block_on(engine.compute_optimized_route()).unwrap_err();
    assert!(err.is(ErrorKind::ServiceError));

    let listing = block_on(engine.list_waypoints()).unwrap();
    let labels: Vec<&str> = listing
        .stops
        .iter()
        .map(|s| s.waypoint.label.as_str())
        .collect();
    assert_eq!(labels, vec!["a", "d", "c", "b", "e"]);

    // directions were asked for the new order
    let requested = directions.requests.lock().unwrap();
    assert_eq!(requested.len(), 1);
    assert_eq!(requested[0][1], seeded[4].position);
}

#[test]
fn stale_optimization_is_not_applied() {
    use super::fakes::{engine_with, places, FakeOptimizer, Plan};
    use crate::api::WaypointAPI;
    use crate::entities::Coordinates;
    use crate::error::ErrorKind;
    use std::sync::Arc;
    use tokio::sync::Notify;
    use tokio_test::block_on;

    let gate = Arc::new(Notify::new());
    let engine = engine_with(
        places(),
        FakeOptimizer::new(Plan::Reverse).gated(gate.clone()),
    );
    seed(&engine, &["a", "d", "b", "c"]);

    let (optimized, inserted) = block_on(async {
        tokio::join!(engine.compute_optimized_route(), async {
            let inserted = engine
                .insert_waypoint("late".into(), Coordinates::new(9.0, 9.0))
                .await;
            gate.notify_one();
            inserted
        })
    });

    assert!(inserted.is_ok());
    assert!(optimized.unwrap_err().is(ErrorKind::ReconciliationMismatch));

    let listing = block_on(engine.list_waypoints()).unwrap();
    let labels: Vec<&str> = listing
        .stops
        .iter()
        .map(|s| s.waypoint.label.as_str())
        .collect();
    assert_eq!(labels, vec!["a", "b", "c", "late", "d"]);
}

#[test]
fn optimized_route_is_drawn() {
    use super::fakes::{engine, MapEvent, RecordingMap};
    use std::sync::Arc;
    use tokio_test::block_on;

    let map = Arc::new(RecordingMap::default());
    let engine = engine().with_map_surface(map.clone());
    seed(&engine, &["a", "d", "b", "c"]);
    map.take();

    block_on(engine.compute_optimized_route()).unwrap();
    let events = map.take();

    assert!(events
        .iter()
        .all(|e| !matches!(e, MapEvent::Placed(_, _) | MapEvent::Removed(_))));
    assert!(matches!(events.last(), Some(MapEvent::Fitted)));

    let first_layer = events
        .iter()
        .find_map(|e| match e {
            MapEvent::Drawn(layer) => Some(*layer),
            _ => None,
        })
        .unwrap();

    block_on(engine.compute_optimized_route()).unwrap();
    let events = map.take();
    assert!(events.contains(&MapEvent::Erased(first_layer)));
}
