use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{
    Coordinates, ImportRecord, ImportReport, Location, OptimizedRoute, Stop, Waypoint,
    WaypointListing,
};
use crate::error::Error;

#[async_trait]
pub trait WaypointAPI {
    async fn list_waypoints(&self) -> Result<WaypointListing, Error>;

    /// Resolves `text` and inserts the result.
    async fn add_waypoint(&self, text: String) -> Result<Waypoint, Error>;

    async fn insert_waypoint(
        &self,
        label: String,
        position: Coordinates,
    ) -> Result<Waypoint, Error>;

    /// Resolves `text` and writes it over the waypoint, if it still exists
    /// once the lookup completes.
    async fn edit_waypoint(&self, id: Uuid, text: String) -> Result<Waypoint, Error>;

    async fn update_waypoint(
        &self,
        id: Uuid,
        label: String,
        position: Coordinates,
    ) -> Result<Waypoint, Error>;

    async fn remove_waypoint(&self, id: Uuid) -> Result<Waypoint, Error>;

    async fn reorder_waypoints(&self, from: usize, to: usize) -> Result<Vec<Stop>, Error>;

    async fn import_waypoints(&self, records: Vec<ImportRecord>) -> Result<ImportReport, Error>;
}

#[async_trait]
pub trait RouteAPI {
    async fn resolve_address(&self, text: String) -> Result<Location, Error>;
    async fn compute_optimized_route(&self) -> Result<OptimizedRoute, Error>;
}

pub trait API: WaypointAPI + RouteAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
