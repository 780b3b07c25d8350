//! ClassDesk API Gateway
//!
//! The HTTP entry point for the teacher dashboard.
//! Handles:
//! - Request routing to the document store
//! - Assessment image uploads and static serving
//! - Rate limiting, timeouts and backpressure
//! - Observability (logging, metrics, request ids)

mod handlers;
mod middleware;
mod uploads;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use classdesk_common::{
    config::{AppConfig, ObservabilityConfig},
    db::{self, SharedStore},
    metrics::{self, LATENCY_BUCKETS},
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use tokio::signal;
use tower::{limit::ConcurrencyLimitLayer, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uploads::UploadStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: SharedStore,
    pub uploads: Arc<UploadStore>,
    pub metrics: Option<PrometheusHandle>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting ClassDesk API Gateway v{}",
        classdesk_common::VERSION
    );

    let config = Arc::new(config);

    // Initialize metrics
    let metrics_handle = if config.observability.metrics_enabled {
        let handle = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                LATENCY_BUCKETS,
            )?
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        metrics::register_metrics();
        Some(handle)
    } else {
        None
    };

    // Document store
    let store = db::connect(&config.database).await?;

    let uploads = UploadStore::new(&config.uploads);
    uploads
        .ensure_dir()
        .await
        .with_context(|| format!("Failed to create uploads directory {}", config.uploads.dir))?;

    let state = AppState {
        config: config.clone(),
        store,
        uploads: Arc::new(uploads),
        metrics: metrics_handle,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Teachers
        .route("/api/signup", post(handlers::teachers::signup))
        .route("/api/login", post(handlers::teachers::login))
        .route(
            "/api/teacher/{teacherId}",
            get(handlers::teachers::get_teacher).put(handlers::teachers::update_teacher),
        )

        // Students
        .route("/api/managestudents", post(handlers::students::add_student))
        .route("/api/managestudents/{teacherId}", get(handlers::students::list_students))
        .route("/api/managestudents/{teacherId}/track", get(handlers::students::track_students))
        .route("/api/managestudents/student/{rollno}", get(handlers::students::get_student))
        .route("/api/students/{rollno}/summary", get(handlers::reports::student_summary))

        // Platforms
        .route(
            "/api/platforms",
            get(handlers::platforms::list_platforms).post(handlers::platforms::create_platform),
        )
        .route(
            "/api/platforms/{id}",
            put(handlers::platforms::update_platform).delete(handlers::platforms::delete_platform),
        )

        // Courses
        .route("/api/courses", post(handlers::courses::add_course))
        .route("/api/courses/{teacherId}", get(handlers::courses::list_courses))

        // Assessments
        .route("/api/assessments", post(handlers::assessments::create_assessment))
        .route("/api/assessments/{teacherId}", get(handlers::assessments::list_assessments))
        .route(
            "/api/assessments/details/{assessmentId}",
            get(handlers::assessments::get_assessment),
        )

        // Discussions
        .route("/addDiscussion", post(handlers::discussions::add_discussion))
        .route("/editDiscussion/{id}", put(handlers::discussions::edit_discussion))
        .route("/addReply/{id}", post(handlers::discussions::add_reply))
        .route("/getDiscussions/{teacherId}", get(handlers::discussions::list_discussions))

        // Reports
        .route("/api/reports/add", post(handlers::reports::add_report))
        .route("/api/reports/CAT/{rollno}", get(handlers::reports::get_cat_reports))
        .route("/api/reports/SEM/{rollno}", get(handlers::reports::get_sem_reports))

        // Attendance
        .route("/addAttendance", post(handlers::attendance::add_attendance))
        .route("/api/attendances/{rollNo}", get(handlers::attendance::list_attendance))

        // Live sessions
        .route("/api/live-sessions", post(handlers::live_sessions::create_session))
        .route("/api/live-sessions/{teacherId}", get(handlers::live_sessions::list_sessions))

        // SAP
        .route("/api/sap/add", post(handlers::sap::add_sap))
        .route("/api/sap/{rollno}", get(handlers::sap::get_sap))
        .route_layer(from_fn(middleware::track_metrics));

    let mut app = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/metrics", get(handlers::health::metrics))
        .merge(api_routes)
        .nest_service(&config.uploads.public_prefix, ServeDir::new(state.uploads.dir()))
        .with_state(state);

    if let Some(limiter) = middleware::create_rate_limiter(&config.rate_limit) {
        app = app.layer(from_fn_with_state(limiter, middleware::rate_limit_middleware));
    }

    app.layer(DefaultBodyLimit::max(config.server.body_limit_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors)
                .layer(TimeoutLayer::new(config.request_timeout()))
                .layer(ConcurrencyLimitLayer::new(config.server.max_concurrent_requests)),
        )
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::test_app;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let app = test_app();
        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = test_app();
        let (status, _) = app.get("/api/nothing-here").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
