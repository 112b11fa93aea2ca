mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::api::{DynAPI, API};
use crate::server::handlers::{addresses, routes, waypoints};

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/waypoints", get(waypoints::list).post(waypoints::create))
        .route(
            "/waypoints/:id",
            patch(waypoints::edit).delete(waypoints::remove),
        )
        .route("/imports", post(waypoints::import))
        .route("/order", patch(waypoints::reorder))
        .route("/addresses/resolve", get(addresses::resolve))
        .route("/routes/optimize", post(routes::optimize))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) {
    let api = Arc::new(api) as DynAPI;
    let app = router(api);

    tracing::info!("listening on {}", addr);

    if let Err(err) = axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
    {
        tracing::error!("server stopped: {}", err);
    }
}
