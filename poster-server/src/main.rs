mod config;
mod domain;
mod inbound;
mod outbound;

use poster_core::{
    CachingGeocoder, DirectoryThemeSource, EmbeddedThemeSource, LayoutRenderer, NominatimGeocoder,
    OutputNamer, PosterJobRunner, SystemFontProvider, ThemeCatalog,
};

use std::sync::Arc;

use config::Config;

type LiveRunner = PosterJobRunner<CachingGeocoder<NominatimGeocoder>, SystemFontProvider, LayoutRenderer>;

fn build_runner(config: &Config) -> anyhow::Result<LiveRunner> {
    let catalog = if config.themes_dir.is_dir() {
        ThemeCatalog::load_all(&DirectoryThemeSource::new(&config.themes_dir))?
    } else {
        tracing::warn!(
            "Themes directory {} not found, using built-in themes",
            config.themes_dir.display()
        );
        ThemeCatalog::load_all(&EmbeddedThemeSource)?
    };

    let fonts = SystemFontProvider::new();
    let renderer = LayoutRenderer::new(fonts.database());
    let geocoder = CachingGeocoder::new(NominatimGeocoder::new(config.geocoder_url.as_str())?);

    Ok(PosterJobRunner::new(
        Arc::new(catalog),
        geocoder,
        fonts,
        renderer,
        OutputNamer::new(&config.posters_dir),
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // The blocking HTTP client and the font scan must stay off the async workers.
    let runner = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || build_runner(&config)).await??
    };

    let metrics = outbound::metrics::TracingMetrics;
    let gallery = outbound::gallery::DirectoryGallery::new(&config.posters_dir);
    let poster_service = domain::service::Service::new(runner, metrics, gallery);

    let server_config = inbound::HttpServerConfig {
        port: &config.server_port,
        posters_dir: &config.posters_dir,
    };
    let http_server = inbound::HttpServer::new(poster_service, server_config).await?;

    http_server.run().await
}
