use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use geo_types::{LineString, Rect};
use tokio::sync::Notify;

use crate::entities::{Coordinates, Location, RouteGeometry};
use crate::error::{no_route_error, not_found_error, upstream_error, Error};
use crate::external::{
    Directions, Geocoder, LayerHandle, MapSurface, MarkerHandle, OptimizationRequest, Optimizer,
};

use super::Engine;

#[derive(Default)]
pub struct FakeGeocoder {
    places: HashMap<String, Location>,
    pub calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl FakeGeocoder {
    pub fn with_places(places: &[(&str, f64, f64)]) -> Self {
        let places = places
            .iter()
            .map(|(text, lat, lng)| {
                (
                    text.to_string(),
                    Location::new(
                        Coordinates::new(*lat, *lng),
                        format!("{}, Buenos Aires", text),
                    ),
                )
            })
            .collect();

        Self {
            places,
            ..Self::default()
        }
    }

    /// Lookups wait for `gate` to be notified before answering.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn lookup(&self, text: &str) -> Result<Location, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match text {
            "offline" => Err(upstream_error("geocoding service")),
            _ => self
                .places
                .get(text)
                .cloned()
                .ok_or_else(not_found_error),
        }
    }
}

pub enum Plan {
    Reverse,
    Order(Vec<usize>),
    NoRoute,
    Offline,
}

pub struct FakeOptimizer {
    plan: Plan,
    gate: Option<Arc<Notify>>,
    pub requests: Mutex<Vec<OptimizationRequest>>,
}

impl FakeOptimizer {
    pub fn new(plan: Plan) -> Self {
        Self {
            plan,
            gate: None,
            requests: Mutex::new(vec![]),
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl Optimizer for FakeOptimizer {
    async fn optimize(&self, request: &OptimizationRequest) -> Result<Vec<usize>, Error> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match &self.plan {
            Plan::Reverse => Ok(request.jobs.iter().rev().map(|job| job.index).collect()),
            Plan::Order(order) => Ok(order.clone()),
            Plan::NoRoute => Err(no_route_error()),
            Plan::Offline => Err(upstream_error("routing service")),
        }
    }
}

pub struct FakeDirections {
    offline: bool,
    pub requests: Mutex<Vec<Vec<Coordinates>>>,
}

impl FakeDirections {
    pub fn new() -> Self {
        Self {
            offline: false,
            requests: Mutex::new(vec![]),
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            requests: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl Directions for FakeDirections {
    async fn route(&self, positions: &[Coordinates]) -> Result<RouteGeometry, Error> {
        self.requests.lock().unwrap().push(positions.to_vec());

        if self.offline {
            return Err(upstream_error("routing service"));
        }

        let geometry: LineString<f64> = positions
            .iter()
            .map(|p| (p.lng, p.lat))
            .collect::<Vec<_>>()
            .into();

        Ok(RouteGeometry {
            geometry,
            distance_meters: 1000.0 * positions.len() as f64,
            duration_seconds: 60.0 * positions.len() as f64,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MapEvent {
    Placed(MarkerHandle, String),
    Moved(MarkerHandle),
    Relabelled(MarkerHandle, String),
    Removed(MarkerHandle),
    Drawn(LayerHandle),
    Erased(LayerHandle),
    Fitted,
    Centered(u8),
}

#[derive(Default)]
pub struct RecordingMap {
    next: AtomicU64,
    pub events: Mutex<Vec<MapEvent>>,
}

impl RecordingMap {
    fn record(&self, event: MapEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn take(&self) -> Vec<MapEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl MapSurface for RecordingMap {
    fn place_marker(&self, _: Coordinates, label: &str) -> MarkerHandle {
        let handle = MarkerHandle(self.next.fetch_add(1, Ordering::SeqCst));
        self.record(MapEvent::Placed(handle, label.into()));
        handle
    }

    fn move_marker(&self, handle: MarkerHandle, _: Coordinates) {
        self.record(MapEvent::Moved(handle));
    }

    fn relabel_marker(&self, handle: MarkerHandle, label: &str) {
        self.record(MapEvent::Relabelled(handle, label.into()));
    }

    fn remove_marker(&self, handle: MarkerHandle) {
        self.record(MapEvent::Removed(handle));
    }

    fn draw_geometry(&self, _: &LineString<f64>) -> LayerHandle {
        let handle = LayerHandle(self.next.fetch_add(1, Ordering::SeqCst));
        self.record(MapEvent::Drawn(handle));
        handle
    }

    fn remove_layer(&self, handle: LayerHandle) {
        self.record(MapEvent::Erased(handle));
    }

    fn fit_view(&self, _: Rect<f64>) {
        self.record(MapEvent::Fitted);
    }

    fn set_view(&self, _: Coordinates, zoom: u8) {
        self.record(MapEvent::Centered(zoom));
    }
}

pub fn places() -> FakeGeocoder {
    FakeGeocoder::with_places(&[
        ("Plaza de Mayo", -34.6083, -58.3712),
        ("Obelisco", -34.6037, -58.3816),
        ("Caminito", -34.6394, -58.3628),
        ("Planetario", -34.5696, -58.4116),
        ("Recoleta", -34.5875, -58.3974),
    ])
}

pub fn engine_with(geocoder: FakeGeocoder, optimizer: FakeOptimizer) -> Engine {
    Engine::new(
        Arc::new(geocoder),
        Arc::new(optimizer),
        Arc::new(FakeDirections::new()),
    )
}

pub fn engine() -> Engine {
    engine_with(places(), FakeOptimizer::new(Plan::Reverse))
}
