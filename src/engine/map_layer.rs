use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    entities::{Coordinates, RouteGeometry, Waypoint},
    external::{LayerHandle, MapSurface, MarkerHandle},
};

pub const FOCUS_ZOOM: u8 = 13;

struct Marker {
    handle: MarkerHandle,
    position: Coordinates,
    label: String,
}

#[derive(Default)]
struct MapState {
    markers: HashMap<Uuid, Marker>,
    route: Option<LayerHandle>,
}

/// Keeps one marker per waypoint id on a map surface. Markers are moved and
/// relabelled in place; only vanished ids lose their marker.
pub struct MapLayer {
    surface: Arc<dyn MapSurface + Send + Sync>,
    state: Mutex<MapState>,
}

impl MapLayer {
    pub fn new(surface: Arc<dyn MapSurface + Send + Sync>) -> Self {
        Self {
            surface,
            state: Mutex::new(MapState::default()),
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn sync(&self, waypoints: &[Waypoint]) {
        let mut state = self.state.lock().await;

        let live: HashMap<Uuid, &Waypoint> = waypoints.iter().map(|w| (w.id, w)).collect();
        let stale: Vec<Uuid> = state
            .markers
            .keys()
            .filter(|id| !live.contains_key(*id))
            .copied()
            .collect();

        for id in stale {
            if let Some(marker) = state.markers.remove(&id) {
                self.surface.remove_marker(marker.handle);
            }
        }

        for waypoint in waypoints {
            match state.markers.get_mut(&waypoint.id) {
                Some(marker) => {
                    if marker.position != waypoint.position {
                        self.surface.move_marker(marker.handle, waypoint.position);
                        marker.position = waypoint.position;
                    }
                    if marker.label != waypoint.label {
                        self.surface.relabel_marker(marker.handle, &waypoint.label);
                        marker.label = waypoint.label.clone();
                    }
                }
                None => {
                    let handle = self
                        .surface
                        .place_marker(waypoint.position, &waypoint.label);
                    state.markers.insert(
                        waypoint.id,
                        Marker {
                            handle,
                            position: waypoint.position,
                            label: waypoint.label.clone(),
                        },
                    );
                }
            }
        }
    }

    pub fn focus(&self, position: Coordinates) {
        self.surface.set_view(position, FOCUS_ZOOM);
    }

    /// Replaces the drawn route and fits the view to it.
    #[tracing::instrument(skip_all)]
    pub async fn show_route(&self, route: &RouteGeometry) {
        let mut state = self.state.lock().await;

        if let Some(previous) = state.route.take() {
            self.surface.remove_layer(previous);
        }

        state.route = Some(self.surface.draw_geometry(&route.geometry));

        if let Some(bounds) = route.bounds() {
            self.surface.fit_view(bounds);
        }
    }
}
