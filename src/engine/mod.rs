mod helpers;
mod map_layer;
mod route_api;
mod waypoint_api;

#[cfg(test)]
mod fakes;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    api::API,
    entities::{Coordinates, WaypointList},
    external::{Directions, Geocoder, MapSurface, Optimizer},
};
use map_layer::MapLayer;

/// Owns the waypoint list for the session and drives the geocoding,
/// optimization and directions services against it.
///
/// Remote calls never run while the list is locked. Each operation reads what
/// it needs, releases the lock, awaits the service, then locks again and
/// applies the result through the list's own checks, so a waypoint removed
/// in the meantime yields `NotFound` instead of a write.
pub struct Engine {
    waypoints: Mutex<WaypointList>,
    geocoder: Arc<dyn Geocoder + Send + Sync>,
    optimizer: Arc<dyn Optimizer + Send + Sync>,
    directions: Arc<dyn Directions + Send + Sync>,
    map: Option<MapLayer>,
}

impl Engine {
    pub fn new(
        geocoder: Arc<dyn Geocoder + Send + Sync>,
        optimizer: Arc<dyn Optimizer + Send + Sync>,
        directions: Arc<dyn Directions + Send + Sync>,
    ) -> Self {
        Self {
            waypoints: Mutex::new(WaypointList::new()),
            geocoder,
            optimizer,
            directions,
            map: None,
        }
    }

    pub fn with_map_surface(mut self, surface: Arc<dyn MapSurface + Send + Sync>) -> Self {
        self.map = Some(MapLayer::new(surface));
        self
    }

    async fn publish(&self, list: &WaypointList) {
        if let Some(map) = &self.map {
            map.sync(list.waypoints()).await;
        }
    }

    fn focus(&self, position: Coordinates) {
        if let Some(map) = &self.map {
            map.focus(position);
        }
    }
}

impl API for Engine {}
