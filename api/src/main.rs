use api::config::AppConfig;
use api::observability::Observability;
use api::orchestrator::Orchestrator;
use api::repo::{PgDecisionRepo, PgPlanRepo, PgWebhookRepo};
use api::state::AppState;
use api::{bank_client, handlers, metrics, routes, webhook};

use axum::body::Body;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let obs = Observability::init();

    let app_config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(app_config.database.max_connections)
        .connect(&app_config.database.url)
        .await?;

    sqlx::migrate!("../database/migrations").run(&pool).await?;

    let risk_config = risk::RiskConfig::from_env()?;

    let bank_client = bank_client::BankClient::new(
        app_config.upstream.bank_api_url.clone(),
        app_config.upstream.bank_api_key.clone(),
        app_config.upstream.connect_timeout,
        app_config.upstream.read_timeout,
    );
    let webhook_dispatcher = webhook::WebhookDispatcher::new(
        app_config.upstream.ledger_webhook_url.clone(),
        app_config.upstream.connect_timeout,
        app_config.upstream.read_timeout,
    );

    let decision_store = Arc::new(PgDecisionRepo::new(pool.clone()));
    let plan_store = Arc::new(PgPlanRepo::new(pool.clone()));
    let webhook_repo = Arc::new(PgWebhookRepo::new(pool.clone()));

    let orchestrator = Arc::new(Orchestrator {
        transaction_source: Arc::new(bank_client),
        decision_store: decision_store.clone(),
        plan_store: plan_store.clone(),
        webhook_repo,
        webhook_sink: Arc::new(webhook_dispatcher),
        risk_config,
        ledger_webhook_url: app_config.upstream.ledger_webhook_url.clone(),
    });

    let state = AppState::new(pool, obs.registry, decision_store, plan_store, orchestrator);

    let cors = CorsLayer::permissive();

    let app = Router::new()
        .merge(routes::health_routes())
        .merge(routes::decision_routes())
        .merge(routes::plan_routes())
        .fallback(handlers::route_not_found)
        .layer(middleware::from_fn(request_logger))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(app_config.server.bind_addr).await?;
    tracing::info!(addr = %app_config.server.bind_addr, "bnpl gateway listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = start.elapsed().as_millis();
    tracing::info!(%method, %uri, %status, elapsed_ms = elapsed, "request handled");

    metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), uri.path(), status.as_str()])
        .inc();
    metrics::HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method.as_str(), uri.path()])
        .observe(start.elapsed().as_secs_f64());

    response
}
