use std::{net::SocketAddr, sync::Arc, time::Instant};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::{from_fn, Next},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::server_state::ServerState;

mod account;
mod trips;

#[cfg(test)]
mod tests;

pub fn create_router(server_state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(account::health))
        .route("/register", post(account::register))
        .route("/login", post(account::login))
        .route("/locations", get(trips::locations))
        .route("/distance", get(trips::distance))
        .route("/trips", get(trips::list_trips).post(trips::add_trip).delete(trips::clear_trips))
        .route("/trips/{trip_id}", delete(trips::remove_trip))
        .route("/summary", get(trips::summary))
        .route("/export", get(trips::export))
        .with_state(server_state)
        .layer(from_fn(log_request))
        .layer(CorsLayer::permissive())
}

async fn log_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let client = req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ConnectInfo(addr)| addr.ip());
    let started = Instant::now();

    let response = next.run(req).await;

    match client {
        Some(ip) => tracing::debug!("{} {} from {} -> {} in {:?}", method, path, ip, response.status(), started.elapsed()),
        None => tracing::debug!("{} {} -> {} in {:?}", method, path, response.status(), started.elapsed()),
    }

    response
}
