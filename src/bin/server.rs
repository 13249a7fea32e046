use axum::{routing::get, Router};
use pettag_server::config::AppConfig;
use pettag_server::geocoding::NominatimGeocoder;
use pettag_server::intake::Intake;
use pettag_server::notifications::SendgridNotifier;
use pettag_server::qr::SvgQrRenderer;
use pettag_server::registry::Registry;
use pettag_server::store::PetStore;
use pettag_server::{api, migrator};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    pettag_server::telemetry::init_telemetry("pettag-server");

    let config = Arc::new(AppConfig::from_env()?);

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    let db = pettag_server::store::connect(&config.database_url).await?;

    // Pending migrations finish before the listener opens.
    migrator::Migrator::up(&db, None).await?;

    let store = PetStore::new(db, config.owner_email_policy);
    pettag_server::metrics::init_metrics(&store).await;

    let registry = Arc::new(Registry::new(
        store.clone(),
        Arc::new(SvgQrRenderer::default()),
        config.clone(),
    ));

    let notifier =
        SendgridNotifier::new(config.sendgrid_api_key.clone(), config.email_from.clone());
    let mut intake =
        Intake::new(store, config.collaborator_timeout).with_notifier(Arc::new(notifier));
    match config.geocoder_url.as_deref() {
        Some(endpoint) => match NominatimGeocoder::new(endpoint, config.collaborator_timeout) {
            Ok(geocoder) => intake = intake.with_geocoder(Arc::new(geocoder)),
            Err(e) => tracing::warn!(error = %e, "reverse geocoding disabled"),
        },
        None => tracing::info!("reverse geocoding disabled"),
    }

    let app = app(
        api::router(registry, Arc::new(intake), config.clone()),
        config.cors_origin.as_deref(),
        prometheus_layer,
        metric_handle,
    )?;

    tracing::info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

fn app(
    routes: Router,
    cors_origin: Option<&str>,
    prometheus_layer: axum_prometheus::PrometheusMetricLayer<'static>,
    metric_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> Result<Router, axum::http::header::InvalidHeaderValue> {
    let app = routes
        .layer(prometheus_layer)
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched| matched.as_str());

                    // "POST /api/register"
                    let span_name = if let Some(path) = matched_path {
                        format!("{} {}", request.method(), path)
                    } else {
                        format!("{} {}", request.method(), request.uri().path())
                    };

                    let client_ip = request
                        .headers()
                        .get("x-forwarded-for")
                        .and_then(|v| v.to_str().ok())
                        .or_else(|| {
                            request
                                .headers()
                                .get("x-real-ip")
                                .and_then(|v| v.to_str().ok())
                        })
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name,
                        client_ip = client_ip,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        // Filled in by handlers
                        pet_code = tracing::field::Empty,
                        action = tracing::field::Empty,
                        business_event = tracing::field::Empty,
                        error = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_request(
                    |_request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {},
                )
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record("status", tracing::field::display(response.status()));
                        span.record("latency", tracing::field::debug(latency));
                        tracing::info!("request completed");
                    },
                ),
        );

    let app = match cors_origin {
        Some(origin) => app.layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(origin.parse::<axum::http::HeaderValue>()?)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ]),
        ),
        None => app,
    };

    Ok(app.route("/metrics", get(|| async move { metric_handle.render() })))
}
