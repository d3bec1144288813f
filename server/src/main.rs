use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use matcher::{GeminiGateway, Matcher};
use server::{api, config::Config, db, middleware::USER_ID_HEADER, user_store::UserStore, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=debug,matcher=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(port = config.port, model = %config.gemini_model, "befriend server starting");

    // Database
    let store = UserStore::new(db::connect(&config.database_url).await?);

    // Matcher
    let gateway = GeminiGateway::new(config.gemini_config())?;
    let catalog = config.activity_catalog()?;
    info!(activities = catalog.lines().len(), "activity catalog loaded");
    let matcher = Matcher::new(Arc::new(gateway), config.matcher_settings(), Arc::new(catalog));

    let state = Arc::new(AppState {
        store,
        matcher,
        max_candidates: config.discover_max_candidates,
    });

    let allowed_origins = config
        .frontend_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, "skipping invalid CORS origin: {e}");
                None
            }
        })
        .collect::<Vec<_>>();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
            header::HeaderName::from_static(USER_ID_HEADER),
        ])
        .max_age(std::time::Duration::from_secs(3600));

    let app = api::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
