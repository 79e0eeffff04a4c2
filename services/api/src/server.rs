use crate::cli::ServeArgs;
use crate::infra::{booking_service, AppState};
use crate::routes::with_appointment_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use passport_appointment::config::{AppConfig, BookingConfig};
use passport_appointment::error::AppError;
use passport_appointment::telemetry;
use passport_appointment::workflows::appointment::SystemClock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    args.apply(&mut config.server);
    telemetry::init(&config.telemetry)?;

    let readiness = Arc::new(AtomicBool::new(false));
    let app = build_app(&config.booking, readiness.clone())?;

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness.store(true, Ordering::Release);
    info!(
        ?config.environment,
        %addr,
        horizon_days = config.booking.horizon_days,
        "passport appointment service ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(readiness))
        .await?;
    info!("passport appointment service stopped");
    Ok(())
}

fn build_app(booking: &BookingConfig, readiness: Arc<AtomicBool>) -> Result<Router, AppError> {
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let state = AppState {
        readiness,
        metrics: Arc::new(prometheus_handle),
    };

    let (service, _) = booking_service(booking, Arc::new(SystemClock))?;
    Ok(with_appointment_routes(Arc::new(service))
        .layer(Extension(state))
        .layer(prometheus_layer))
}

/// Resolves on Ctrl+C. Readiness drops before the listener stops accepting.
async fn shutdown_signal(readiness: Arc<AtomicBool>) {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    readiness.store(false, Ordering::Release);
    info!("shutdown requested");
}
