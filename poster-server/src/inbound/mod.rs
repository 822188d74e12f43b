mod api;
mod handlers;

use crate::domain::ports::PosterService;

use std::{path::Path, sync::Arc};

use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use tokio::net;
use tower_http::{services::ServeDir, trace::TraceLayer};

#[derive(Debug, Clone)]
pub(crate) struct AppState<PS: PosterService> {
    poster_service: Arc<PS>,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpServerConfig<'a> {
    pub port: &'a str,
    /// Directory served under `/posters`.
    pub posters_dir: &'a Path,
}

/// The application's HTTP server.
pub struct HttpServer {
    router: Router,
    listener: net::TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new(
        poster_service: impl PosterService,
        config: HttpServerConfig<'_>,
    ) -> anyhow::Result<Self> {
        let router = router(poster_service, config.posters_dir);

        let listener = net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("failed to listen on {}", config.port))?;

        Ok(Self { router, listener })
    }

    /// Runs the HTTP server.
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::debug!("listening on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

fn router<PS: PosterService>(poster_service: PS, posters_dir: &Path) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(
        |request: &axum::extract::Request<_>| {
            let uri = request.uri().to_string();
            tracing::info_span!("http_request", method = ?request.method(), uri)
        },
    );

    let state = AppState {
        poster_service: Arc::new(poster_service),
    };

    Router::new()
        .nest("/api", api_routes())
        .nest_service("/posters", ServeDir::new(posters_dir))
        .layer(trace_layer)
        .with_state(state)
}

fn api_routes<PS: PosterService>() -> Router<AppState<PS>> {
    Router::new()
        .route("/generate", post(handlers::generate_posters::<PS>))
        .route("/themes", get(handlers::list_themes::<PS>))
        .route("/posters", get(handlers::recent_posters::<PS>))
}
