use crate::cli::ServeArgs;
use crate::infra::{in_memory_service, AppState};
use crate::routes::{open_catalog, with_enrollment_routes};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use course_registry::catalog::CourseCatalogImporter;
use course_registry::config::AppConfig;
use course_registry::error::AppError;
use course_registry::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let enrollment_service = Arc::new(in_memory_service(config.admission));

    if let Some(path) = args.catalog.take() {
        let courses = CourseCatalogImporter::from_path(&path)?;
        let imported = open_catalog(&enrollment_service, courses);
        for skipped in &imported.skipped {
            warn!(
                course_id = %skipped.course_id,
                reason = %skipped.reason,
                "catalog course skipped"
            );
        }
        info!(
            catalog = %path.display(),
            opened = imported.opened.len(),
            "course catalog loaded"
        );
    }

    let app = with_enrollment_routes(enrollment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_promotions_per_trigger = config.admission.max_promotions_per_trigger,
        "course registration service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
