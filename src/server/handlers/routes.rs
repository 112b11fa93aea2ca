use axum::extract::{Extension, Json};

use crate::api::{DynAPI, RouteAPI};
use crate::{entities::OptimizedRoute, error::Error};

pub async fn optimize(Extension(api): Extension<DynAPI>) -> Result<Json<OptimizedRoute>, Error> {
    let route = api.compute_optimized_route().await?;

    Ok(route.into())
}
