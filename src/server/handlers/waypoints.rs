use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{DynAPI, WaypointAPI};
use crate::entities::{ImportRecord, ImportReport, Stop, Waypoint, WaypointListing};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct TextParams {
    text: String,
}

#[derive(Serialize, Deserialize)]
pub struct ReorderParams {
    from: usize,
    to: usize,
}

pub async fn list(Extension(api): Extension<DynAPI>) -> Result<Json<WaypointListing>, Error> {
    let listing = api.list_waypoints().await?;

    Ok(listing.into())
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<TextParams>,
) -> Result<Json<Waypoint>, Error> {
    let waypoint = api.add_waypoint(params.text).await?;

    Ok(waypoint.into())
}

pub async fn edit(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Json(params): Json<TextParams>,
) -> Result<Json<Waypoint>, Error> {
    let waypoint = api.edit_waypoint(id, params.text).await?;

    Ok(waypoint.into())
}

pub async fn remove(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<Waypoint>, Error> {
    let waypoint = api.remove_waypoint(id).await?;

    Ok(waypoint.into())
}

pub async fn reorder(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<ReorderParams>,
) -> Result<Json<Vec<Stop>>, Error> {
    let stops = api.reorder_waypoints(params.from, params.to).await?;

    Ok(stops.into())
}

pub async fn import(
    Extension(api): Extension<DynAPI>,
    Json(records): Json<Vec<ImportRecord>>,
) -> Result<Json<ImportReport>, Error> {
    let report = api.import_waypoints(records).await?;

    Ok(report.into())
}
