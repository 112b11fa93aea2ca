pub mod nominatim;
pub mod openrouteservice;

use async_trait::async_trait;
use geo_types::{LineString, Rect};
use serde::{Deserialize, Serialize};

use crate::entities::{Coordinates, Location, RouteGeometry};
use crate::error::Error;

#[async_trait]
pub trait Geocoder {
    /// Resolves free text to a position. No match is `NotFound`.
    async fn lookup(&self, text: &str) -> Result<Location, Error>;
}

/// One intermediate waypoint to visit; `index` is its position among the
/// intermediates (list index minus one).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub index: usize,
    pub position: Coordinates,
}

/// A single vehicle leaving `start`, finishing at `end`, visiting every job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub start: Coordinates,
    pub end: Coordinates,
    pub jobs: Vec<Job>,
}

#[async_trait]
pub trait Optimizer {
    /// Returns job indices in visiting order. No route is `NoRoute`.
    async fn optimize(&self, request: &OptimizationRequest) -> Result<Vec<usize>, Error>;
}

#[async_trait]
pub trait Directions {
    async fn route(&self, positions: &[Coordinates]) -> Result<RouteGeometry, Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerHandle(pub u64);

/// Whatever draws the map. Implementations are expected to be cheap and
/// non-blocking.
pub trait MapSurface {
    fn place_marker(&self, position: Coordinates, label: &str) -> MarkerHandle;
    fn move_marker(&self, handle: MarkerHandle, position: Coordinates);
    fn relabel_marker(&self, handle: MarkerHandle, label: &str);
    fn remove_marker(&self, handle: MarkerHandle);
    fn draw_geometry(&self, geometry: &LineString<f64>) -> LayerHandle;
    fn remove_layer(&self, handle: LayerHandle);
    fn fit_view(&self, bounds: Rect<f64>);
    fn set_view(&self, position: Coordinates, zoom: u8);
}
