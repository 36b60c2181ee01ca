//! Documentation of the OJS reviewer certificate service.
//!
//! Verifies a user's reviewer contribution against an Open Journal Systems
//! installation and hands back a downloadable PDF certificate.
//!
//!
//!
//! # General Infrastructure
//! - Frontend form posts `{ username, submissionId }` to `/verify`
//! - Backend asks the OJS REST API who that reviewer is and what happened on the submission
//! - Role is classified from the submission's review assignments
//! - Frontend re-posts the verified fields to `/certificate` and receives the PDF
//! - Nothing is stored between the two calls, the client resupplies everything
//!
//!
//!
//! # Environment
//!
//! | Variable             | Default                           |
//! |----------------------|-----------------------------------|
//! | `RUST_PORT`          | `3000`                            |
//! | `OJS_BASE_URL`       | required                          |
//! | `OJS_API_TOKEN`      | required                          |
//! | `OJS_AUTH_MODE`      | `header` (or `query`)             |
//! | `OJS_ACCEPT_INVALID_CERTS` | `false`                     |
//! | `CERT_TEMPLATE_PATH` | `assets/certificate-template.png` |
//! | `CERT_ORIENTATION`   | `landscape` (or `portrait`)       |
//!
//!
//!
//! # Setup
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
//!
//! Run against a live OJS install.
//! ```sh
//! OJS_BASE_URL=https://journal.example.org/index.php/jx/api/v1 \
//! OJS_API_TOKEN=$(cat token) cargo run
//! ```
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::post,
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod assets;
pub mod certificate;
pub mod config;
pub mod error;
pub mod ojs;
pub mod routes;
pub mod state;
pub mod verify;

use routes::{certificate_download_handler, certificate_handler, verify_handler};
use state::State;

pub fn app(state: std::sync::Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/verify", post(verify_handler))
        .route(
            "/certificate",
            post(certificate_handler).get(certificate_download_handler),
        )
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new();

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    let router = app(state);

    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
