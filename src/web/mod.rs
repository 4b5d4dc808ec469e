//! Web layer
//!
//! Thin axum handlers over the booking service. Control flow is strictly
//! handler -> service -> storage/gateway; errors bubble back up as the
//! `AppError` taxonomy and are mapped to status codes in `responses`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{
    config::Config, database::Database, notifications::NotificationGateway,
    services::BookingService,
};

pub mod api;
pub mod extractors;
pub mod responses;

pub use extractors::RequestContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub booking: BookingService,
    pub config: Config,
}

pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(
        config: Config,
        database: Database,
        notifications: Arc<dyn NotificationGateway>,
    ) -> Result<Self> {
        let booking =
            BookingService::new(database, notifications, config.pagination.clone());
        let app = create_router(AppState {
            booking,
            config: config.clone(),
        });

        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;

        Ok(Self { app, addr })
    }

    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Build the full router; exposed so integration tests can drive the exact
/// routes the server mounts.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health_check))
        .nest("/api/v1", api_v1_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(api::list_jobs).post(api::create_job))
        .route("/jobs/history", get(api::get_history))
        .route("/jobs/potential", get(api::get_potential_jobs))
        .route("/jobs/email", post(api::immediate_job_email))
        .route("/jobs/accept", post(api::accept_job))
        // Legacy alias kept for old clients; same operation underneath
        .route("/jobs/accept-with-id", post(api::accept_job_with_id))
        .route("/jobs/cancel", post(api::cancel_job))
        .route("/jobs/start", post(api::start_job))
        .route("/jobs/end", post(api::end_job))
        .route("/jobs/customer-not-call", post(api::customer_not_call))
        .route("/jobs/distance-feed", post(api::distance_feed))
        .route("/jobs/reopen", post(api::reopen_job))
        .route("/jobs/resend-notifications", post(api::resend_notifications))
        .route("/jobs/resend-sms", post(api::resend_sms_notifications))
        .route("/jobs/:id", get(api::get_job).put(api::update_job))
}
