//! The relay server binary.

#[macro_use]
extern crate tracing;

use std::env;
use std::sync::Arc;

use parley_relay::RelayConfigBuilder;
use parley_relay::api::{self, AppState};
use parley_relay::upstream::HttpUpstream;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Ok(api_key) = env::var("PARLEY_UPSTREAM_API_KEY") else {
        eprintln!("PARLEY_UPSTREAM_API_KEY environment variable is not set");
        return;
    };
    let Ok(base_url) = env::var("PARLEY_UPSTREAM_URL") else {
        eprintln!("PARLEY_UPSTREAM_URL environment variable is not set");
        return;
    };
    let listen_addr = env::var("PARLEY_LISTEN_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8787".to_owned());

    let mut builder = RelayConfigBuilder::with_api_key(api_key)
        .with_base_url(base_url);
    if let Ok(model) = env::var("PARLEY_UPSTREAM_MODEL") {
        builder = builder.with_model(model);
    }
    if let Ok(customer_id) = env::var("PARLEY_UPSTREAM_CUSTOMER_ID") {
        builder = builder.with_customer_id(customer_id);
    }
    let config = Arc::new(builder.build());
    debug!("relay configured: {config:?}");

    let state = Arc::new(AppState {
        upstream: Arc::new(HttpUpstream::new(Arc::clone(&config))),
        config,
    });
    let app = api::router(state);

    let listener = match TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("failed to bind {listen_addr}: {err}");
            return;
        }
    };
    info!("relay listening on {listen_addr}");
    if let Err(err) = axum::serve(listener, app).await {
        error!("server error: {err}");
    }
}
