pub mod pages;
mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::articles::ArticleFetcher;
use crate::client::ContentApiClient;
use crate::config::Config;
use crate::db::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    /// Source of full articles for the timeline loader.
    pub articles: Arc<dyn ArticleFetcher>,
    /// Remote content API, when `CONTENT_API_URL` is set.
    pub content_api: Option<ContentApiClient>,
}

impl AppState {
    /// Build the state, resolving articles and summaries remotely when
    /// `CONTENT_API_URL` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: Config, db: Database) -> Result<Self> {
        let content_api = match &config.content_api_url {
            Some(url) => {
                info!(url = %url, "Resolving articles from remote content API");
                let client = ContentApiClient::new(url.clone(), config.http_timeout)
                    .context("Failed to create content API client")?;
                Some(client)
            }
            None => None,
        };

        let articles: Arc<dyn ArticleFetcher> = match &content_api {
            Some(client) => Arc::new(client.clone()),
            None => Arc::new(db.clone()),
        };

        Ok(Self {
            db,
            config: Arc::new(config),
            articles,
            content_api,
        })
    }
}

/// Start the web server and run until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn serve<S>(state: AppState, shutdown: S) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", state.config.web_host, state.config.web_port)
        .parse()
        .context("Invalid web server address")?;

    let app = create_app(state);

    info!(addr = %addr, "Starting HTTP web server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind web server")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Web server error")?;

    Ok(())
}

/// Create the main application router.
pub fn create_app(state: AppState) -> Router {
    let static_dir = find_static_dir();
    info!(static_dir = ?static_dir, "Serving static files");

    Router::new()
        .merge(routes::router())
        .nest_service("/static", ServeDir::new(&static_dir))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Find the static files directory.
///
/// Checks in order:
/// 1. ./static (development)
/// 2. /usr/share/ehco/static (installed)
/// 3. Falls back to ./static
fn find_static_dir() -> PathBuf {
    let candidates = [
        PathBuf::from("./static"),
        PathBuf::from("/usr/share/ehco/static"),
    ];

    candidates
        .into_iter()
        .find(|path| path.is_dir())
        .unwrap_or_else(|| PathBuf::from("./static"))
}
