use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use waypointer::engine::Engine;
use waypointer::error::Error;
use waypointer::external::{nominatim::Nominatim, openrouteservice::OpenRouteService};
use waypointer::server::serve;

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

fn build_engine() -> Result<Engine, Error> {
    let geocoder = Arc::new(Nominatim::from_env());
    let routing = Arc::new(OpenRouteService::from_env()?);

    Ok(Engine::new(geocoder, routing.clone(), routing))
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let addr: SocketAddr = match env::var("WAYPOINTER_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.into())
        .parse()
    {
        Ok(addr) => addr,
        Err(err) => {
            tracing::error!("invalid WAYPOINTER_ADDR: {}", err);
            return;
        }
    };

    let engine = match build_engine() {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!(
                "could not configure routing services (is ORS_API_KEY set?): {}",
                err
            );
            return;
        }
    };

    serve(engine, addr).await;
}
