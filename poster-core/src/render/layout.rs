use super::{PosterRenderer, RenderJob};
use crate::{
    constants::{CSS_DPI, PNG_DPI, POINTS_PER_INCH},
    error::RenderError,
    types::{Color, FontFace, OutputFormat, Palette},
};

use std::{fs, sync::Arc};

use anyhow::{Context, anyhow};
use svg::{
    Document,
    node::element::{Definitions, Ellipse, Line, LinearGradient, Rectangle, Stop, Text},
};
use tiny_skia::{Pixmap, Transform};
use tracing::{Level, event, span};
use usvg::fontdb::Database;

// The poster is laid out on a 120 x 160 grid that is stretched to the canvas.
const GRID_WIDTH: f32 = 120.0;
const GRID_HEIGHT: f32 = 160.0;

const GRADIENT_ID: &str = "caption-fade";
const FALLBACK_FAMILIES: &str = "DejaVu Sans, Liberation Sans, Arial, sans-serif";

// Past this many characters the city name shrinks to keep it on the poster.
const CITY_NAME_FIT: usize = 10;
const MIN_CITY_SCALE: f32 = 0.4;

#[derive(Clone, Copy)]
enum RoadTier {
    Motorway,
    Primary,
    Secondary,
    Tertiary,
    Residential,
}

impl RoadTier {
    fn color(self, palette: &Palette) -> &Color {
        match self {
            RoadTier::Motorway => &palette.roads.motorway,
            RoadTier::Primary => &palette.roads.primary,
            RoadTier::Secondary => &palette.roads.secondary,
            RoadTier::Tertiary => &palette.roads.tertiary,
            RoadTier::Residential => &palette.roads.residential,
        }
    }
}

// (tier, from, to, stroke width, opacity), in grid units.
const ROADS: [(RoadTier, (f32, f32), (f32, f32), f32, f32); 6] = [
    (RoadTier::Motorway, (0.0, 40.0), (120.0, 50.0), 2.5, 0.9),
    (RoadTier::Primary, (60.0, 0.0), (55.0, 160.0), 1.8, 0.8),
    (RoadTier::Secondary, (0.0, 90.0), (120.0, 85.0), 1.2, 0.7),
    (RoadTier::Tertiary, (25.0, 0.0), (30.0, 160.0), 0.8, 0.6),
    (RoadTier::Residential, (90.0, 0.0), (85.0, 160.0), 0.5, 0.5),
    (RoadTier::Residential, (0.0, 130.0), (120.0, 125.0), 0.5, 0.4),
];

/// Maps grid units onto the canvas.
#[derive(Debug, Clone, Copy)]
struct Grid {
    sx: f32,
    sy: f32,
}

impl Grid {
    fn x(&self, x: f32) -> f32 {
        x * self.sx
    }

    fn y(&self, y: f32) -> f32 {
        y * self.sy
    }

    // Lengths that must not be distorted (strokes, font sizes).
    fn len(&self, len: f32) -> f32 {
        len * self.sx.min(self.sy)
    }
}

/// Renders the poster frame: palette swatches for water, parks and the road
/// tiers, the caption fade and the typography block. Street geometry is the
/// business of a cartographic renderer and is not drawn here.
///
/// Writes SVG directly, rasterises PNG at 300 dpi and converts to PDF at the
/// poster's physical page size.
#[derive(Debug, Clone)]
pub struct LayoutRenderer {
    fontdb: Arc<Database>,
}

impl LayoutRenderer {
    pub fn new(fontdb: Arc<Database>) -> Self {
        Self { fontdb }
    }

    fn compose(&self, job: &RenderJob<'_>) -> Document {
        let palette = job.theme.palette();
        let width = job.width * POINTS_PER_INCH;
        let height = job.height * POINTS_PER_INCH;
        let grid = Grid {
            sx: width / GRID_WIDTH,
            sy: height / GRID_HEIGHT,
        };

        let mut document = Document::new()
            .set("viewBox", (0.0, 0.0, width, height))
            .set("width", format!("{}in", job.width))
            .set("height", format!("{}in", job.height))
            .set("data-theme", job.theme.key())
            .set("data-radius-m", job.distance)
            .add(caption_gradient(palette))
            .add(
                Rectangle::new()
                    .set("width", width)
                    .set("height", height)
                    .set("fill", palette.background.as_str()),
            );

        document = document
            .add(ellipse(&grid, (95.0, 55.0), (40.0, 28.0), &palette.water, 0.7))
            .add(ellipse(&grid, (30.0, 70.0), (18.0, 14.0), &palette.parks, 0.7))
            .add(ellipse(&grid, (85.0, 110.0), (12.0, 10.0), &palette.parks, 0.5));

        for (tier, from, to, stroke, opacity) in ROADS {
            document = document.add(line(&grid, from, to, tier.color(palette), stroke, opacity));
        }

        document = document.add(
            Rectangle::new()
                .set("y", grid.y(110.0))
                .set("width", width)
                .set("height", grid.y(50.0))
                .set("fill", format!("url(#{GRADIENT_ID})")),
        );

        let city = job.labels.city.to_uppercase();
        let city_len = city.chars().count();
        let city_scale = if city_len > CITY_NAME_FIT {
            (CITY_NAME_FIT as f32 / city_len as f32).max(MIN_CITY_SCALE)
        } else {
            1.0
        };

        let mut city_text = caption(
            &grid,
            city.clone(),
            140.0,
            9.0 * city_scale,
            &job.fonts.bold,
            &palette.text,
        );
        if is_latin(&city) {
            city_text = city_text.set("letter-spacing", grid.len(1.5 * city_scale));
        }

        document
            .add(city_text)
            .add(line(
                &grid,
                (45.0, 144.0),
                (75.0, 144.0),
                &palette.text,
                0.5,
                0.6,
            ))
            .add(caption(
                &grid,
                job.labels.country.to_uppercase(),
                152.0,
                5.0,
                &job.fonts.regular,
                &palette.text,
            ))
            .add(
                caption(
                    &grid,
                    job.coordinates.to_string(),
                    157.0,
                    3.0,
                    &job.fonts.light,
                    &palette.text,
                )
                .set("opacity", 0.7),
            )
    }

    fn write_svg(&self, document: &Document, job: &RenderJob<'_>) -> Result<(), RenderError> {
        svg::save(job.output, document).map_err(|source| RenderError::Io {
            path: job.output.to_path_buf(),
            source,
        })
    }

    fn parse_tree(&self, document: &Document) -> Result<usvg::Tree, RenderError> {
        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };

        let tree = usvg::Tree::from_str(&document.to_string(), &options)
            .context("Failed to parse poster SVG")?;

        Ok(tree)
    }

    fn write_png(&self, document: &Document, job: &RenderJob<'_>) -> Result<(), RenderError> {
        let tree = self.parse_tree(document)?;

        // The tree is sized in CSS pixels; scale it to the physical size.
        let pixel_width = (job.width * PNG_DPI).round() as u32;
        let pixel_height = (job.height * PNG_DPI).round() as u32;
        let size = tree.size();
        let transform = Transform::from_scale(
            pixel_width as f32 / size.width(),
            pixel_height as f32 / size.height(),
        );

        let mut pixmap = Pixmap::new(pixel_width, pixel_height).with_context(|| {
            format!("Failed to allocate a {pixel_width}x{pixel_height} pixmap")
        })?;

        resvg::render(&tree, transform, &mut pixmap.as_mut());

        pixmap
            .save_png(job.output)
            .with_context(|| format!("Failed to encode {}", job.output.display()))?;

        Ok(())
    }

    fn write_pdf(&self, document: &Document, job: &RenderJob<'_>) -> Result<(), RenderError> {
        let tree = self.parse_tree(document)?;

        // One CSS pixel per 1/96 in keeps the page at the poster's physical size.
        let page = svg2pdf::PageOptions {
            dpi: CSS_DPI,
            ..svg2pdf::PageOptions::default()
        };

        let pdf = svg2pdf::to_pdf(&tree, svg2pdf::ConversionOptions::default(), page)
            .map_err(|err| anyhow!("Failed to convert poster to PDF: {err:?}"))?;

        fs::write(job.output, pdf).map_err(|source| RenderError::Io {
            path: job.output.to_path_buf(),
            source,
        })
    }
}

impl PosterRenderer for LayoutRenderer {
    fn render(&self, job: &RenderJob<'_>) -> Result<(), RenderError> {
        let span = span!(Level::DEBUG, "render", theme = job.theme.key());
        let _guard = span.enter();

        let write: fn(&Self, &Document, &RenderJob<'_>) -> Result<(), RenderError> =
            match job.format {
                OutputFormat::Svg => Self::write_svg,
                OutputFormat::Png => Self::write_png,
                OutputFormat::Pdf => Self::write_pdf,
            };

        if let Some(parent) = job.output.parent() {
            fs::create_dir_all(parent).map_err(|source| RenderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let document = self.compose(job);
        write(self, &document, job)?;

        event!(Level::DEBUG, "Wrote {}", job.output.display());

        Ok(())
    }
}

fn caption_gradient(palette: &Palette) -> Definitions {
    let gradient = LinearGradient::new()
        .set("id", GRADIENT_ID)
        .set("x1", 0)
        .set("y1", 0)
        .set("x2", 0)
        .set("y2", 1)
        .add(
            Stop::new()
                .set("offset", 0)
                .set("stop-color", palette.gradient.as_str())
                .set("stop-opacity", 0),
        )
        .add(
            Stop::new()
                .set("offset", 1)
                .set("stop-color", palette.gradient.as_str())
                .set("stop-opacity", 1),
        );

    Definitions::new().add(gradient)
}

fn ellipse(grid: &Grid, center: (f32, f32), radii: (f32, f32), fill: &Color, opacity: f32) -> Ellipse {
    Ellipse::new()
        .set("cx", grid.x(center.0))
        .set("cy", grid.y(center.1))
        .set("rx", grid.x(radii.0))
        .set("ry", grid.y(radii.1))
        .set("fill", fill.as_str())
        .set("opacity", opacity)
}

fn line(
    grid: &Grid,
    from: (f32, f32),
    to: (f32, f32),
    stroke: &Color,
    width: f32,
    opacity: f32,
) -> Line {
    Line::new()
        .set("x1", grid.x(from.0))
        .set("y1", grid.y(from.1))
        .set("x2", grid.x(to.0))
        .set("y2", grid.y(to.1))
        .set("stroke", stroke.as_str())
        .set("stroke-width", grid.len(width))
        .set("opacity", opacity)
}

fn caption(grid: &Grid, content: String, y: f32, size: f32, face: &FontFace, fill: &Color) -> Text {
    Text::new(content)
        .set("x", grid.x(GRID_WIDTH / 2.0))
        .set("y", grid.y(y))
        .set("text-anchor", "middle")
        .set("font-family", format!("{}, {}", face.family, FALLBACK_FAMILIES))
        .set("font-weight", face.weight)
        .set("font-size", grid.len(size))
        .set("fill", fill.as_str())
}

// Letter spacing breaks joined scripts such as Arabic or Devanagari.
fn is_latin(text: &str) -> bool {
    text.chars()
        .filter(|c| c.is_alphabetic())
        .all(|c| c <= '\u{024F}')
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        catalog::test::sample_theme,
        types::{Coordinates, FontSet, Labels},
    };

    use std::path::Path;

    fn renderer() -> LayoutRenderer {
        LayoutRenderer::new(Arc::new(Database::new()))
    }

    fn render_to(
        renderer: &LayoutRenderer,
        format: OutputFormat,
        output: &Path,
    ) -> Result<(), RenderError> {
        let theme = sample_theme("terracotta");
        let labels = Labels {
            city: "Paris".to_owned(),
            country: "France".to_owned(),
        };
        let fonts = FontSet::default();

        renderer.render(&RenderJob {
            theme: &theme,
            coordinates: Coordinates::new(48.8566, 2.3522),
            distance: 18_000,
            width: 4.0,
            height: 5.0,
            format,
            labels: &labels,
            fonts: &fonts,
            output,
        })
    }

    #[test]
    fn test_svg_carries_palette_and_caption() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("paris_terracotta.svg");

        render_to(&renderer(), OutputFormat::Svg, &output).unwrap();

        let svg = fs::read_to_string(&output).unwrap();
        assert!(svg.contains("#f5ede4"));
        assert!(svg.contains("#a8c4c4"));
        assert!(svg.contains("PARIS"));
        assert!(svg.contains("FRANCE"));
        assert!(svg.contains("48.8566° N / 2.3522° E"));
        assert!(svg.contains(r#"data-theme="terracotta""#));
    }

    #[test]
    fn test_png_is_rasterised_at_poster_size() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("paris_terracotta.png");

        render_to(&renderer(), OutputFormat::Png, &output).unwrap();

        let pixmap = Pixmap::load_png(&output).unwrap();
        assert_eq!(pixmap.width(), 1200);
        assert_eq!(pixmap.height(), 1500);
    }

    #[test]
    fn test_pdf_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("paris_terracotta.pdf");

        render_to(&renderer(), OutputFormat::Pdf, &output).unwrap();

        let pdf = fs::read(&output).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn test_latin_detection() {
        assert!(is_latin("SÃO PAULO"));
        assert!(is_latin("NEW YORK 2"));
        assert!(!is_latin("東京"));
    }
}
