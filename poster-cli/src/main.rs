use poster_core::{
    BatchSummary, DEFAULT_DISTANCE, DEFAULT_HEIGHT, DEFAULT_NOMINATIM_URL, DEFAULT_THEME,
    DEFAULT_WIDTH, DirectoryThemeSource, EmbeddedThemeSource, LayoutRenderer, NominatimGeocoder,
    OutputFormat, OutputNamer, PosterJobRunner, PosterRequest, SystemFontProvider, ThemeCatalog,
};

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Generate minimalist map posters for a city", long_about = None)]
struct Args {
    /// City to center the poster on
    #[arg(short, long, required_unless_present = "list_themes")]
    city: Option<String>,

    /// Country the city belongs to
    #[arg(short = 'C', long, required_unless_present = "list_themes")]
    country: Option<String>,

    /// Explicit latitude, skips geocoding when given with --longitude
    #[arg(long, allow_hyphen_values = true)]
    latitude: Option<String>,

    /// Explicit longitude, skips geocoding when given with --latitude
    #[arg(long, allow_hyphen_values = true)]
    longitude: Option<String>,

    /// Theme key
    #[arg(short, long, default_value = DEFAULT_THEME)]
    theme: String,

    /// Render every known theme instead of --theme
    #[arg(short, long)]
    all_themes: bool,

    /// Map radius in meters
    #[arg(short, long, default_value_t = DEFAULT_DISTANCE)]
    distance: u32,

    /// Poster width in inches
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: f32,

    /// Poster height in inches
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: f32,

    #[arg(short, long, default_value_t, value_enum)]
    format: OutputFormat,

    /// Text shown instead of the city name
    #[arg(long)]
    display_city: Option<String>,

    /// Text shown instead of the country name
    #[arg(long)]
    display_country: Option<String>,

    /// Country line override, wins over --display-country
    #[arg(long)]
    country_label: Option<String>,

    /// Font family to use instead of the default sans-serif set
    #[arg(long)]
    font_family: Option<String>,

    /// Directory of <key>.json theme files; the built-in themes are used when omitted
    #[arg(long)]
    themes_dir: Option<PathBuf>,

    /// Where posters are written
    #[arg(short, long, default_value = "posters")]
    output_dir: PathBuf,

    /// Nominatim instance used for geocoding
    #[arg(long, default_value = DEFAULT_NOMINATIM_URL)]
    geocoder_url: String,

    /// Print the available themes and exit
    #[arg(long)]
    list_themes: bool,
}

impl Args {
    fn into_request(self) -> PosterRequest {
        PosterRequest {
            city: self.city.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            latitude: self.latitude,
            longitude: self.longitude,
            theme: self.theme,
            all_themes: self.all_themes,
            distance: self.distance,
            width: self.width,
            height: self.height,
            format: self.format,
            display_city: self.display_city,
            display_country: self.display_country,
            country_label: self.country_label,
            font_family: self.font_family,
        }
    }
}

fn load_catalog(themes_dir: Option<&PathBuf>) -> Result<ThemeCatalog> {
    match themes_dir {
        Some(dir) => ThemeCatalog::load_all(&DirectoryThemeSource::new(dir)),
        None => ThemeCatalog::load_all(&EmbeddedThemeSource),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let catalog = load_catalog(args.themes_dir.as_ref())?;

    if args.list_themes {
        for theme in catalog.themes() {
            println!("{:<18} {:<18} {}", theme.key(), theme.name(), theme.description());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let fonts = SystemFontProvider::new();
    let renderer = LayoutRenderer::new(fonts.database());
    let geocoder = NominatimGeocoder::new(args.geocoder_url.as_str())?;

    // Timestamped names keep earlier runs for the same city and theme.
    let namer = OutputNamer::new(&args.output_dir)
        .with_suffix(&chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string());

    let runner = PosterJobRunner::new(Arc::new(catalog), geocoder, fonts, renderer, namer);

    let results = runner
        .run(args.into_request())
        .context("Poster generation failed")?;

    for result in &results {
        match result.outcome() {
            Ok(file) => println!("✓ {}: {}", result.theme(), file.display()),
            Err(err) => println!("✗ {}: {}", result.theme(), err),
        }
    }

    let summary = BatchSummary::of(&results);
    println!(
        "Generated {} of {} poster(s)",
        summary.succeeded,
        results.len()
    );

    if summary.succeeded == 0 {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
