use axum::extract::{Extension, Json, Query};
use serde::{Deserialize, Serialize};

use crate::{
    api::{DynAPI, RouteAPI},
    entities::Location,
    error::Error,
};

#[derive(Serialize, Deserialize)]
pub struct ResolveParams {
    text: String,
}

pub async fn resolve(
    Extension(api): Extension<DynAPI>,
    Query(params): Query<ResolveParams>,
) -> Result<Json<Location>, Error> {
    let location = api.resolve_address(params.text).await?;

    Ok(location.into())
}
