use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::task::web::{TaskState, create_task_router};
use crate::task::{TaskStore, seed};

/// Assembles the full application router: task routes plus the health check,
/// with request tracing layered on top.
pub fn create_app(state: TaskState) -> Router {
    Router::new()
        .merge(create_task_router(state))
        .route("/health", axum::routing::get(health_check_handler))
        .layer(TraceLayer::new_for_http())
}

/// Binds the listener, seeds the store from the configured file, and serves
/// until the process ends. The seed file is read exactly once, before the
/// first request; a missing or malformed seed is logged and the store starts
/// empty.
#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Server is listening on {}", config.port);

    let store = match seed::load_store(&config.seed_file) {
        Ok(store) => {
            tracing::info!(
                "Loaded {} tasks from {}",
                store.all().len(),
                config.seed_file.display()
            );
            store
        }
        Err(err) => {
            tracing::warn!(
                "Could not load tasks from {}, starting with an empty store: {}",
                config.seed_file.display(),
                err
            );
            TaskStore::new()
        }
    };

    let app = create_app(TaskState::new(store));
    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
