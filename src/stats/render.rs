//! Chart rendering
//!
//! Draws the title and company distributions as two side-by-side bar charts
//! and encodes the figure as PNG.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use std::fmt::Debug;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

use super::{Aggregation, FrequencyTable};
use crate::config::ChartConfig;
use crate::util::truncate_str;

/// Font family name registered with plotters
const FONT_FAMILY: &str = "sans-serif";

/// Bar colour (matplotlib's default blue)
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Fonts probed when no `font_path` is configured
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Registration outcome, decided once per process
static FONT_READY: OnceLock<bool> = OnceLock::new();

/// Errors that can occur while rendering a chart
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The drawing backend failed
    #[error("Chart drawing failed: {0}")]
    Backend(String),

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    /// Rendering did not finish in time
    #[error("Chart rendering timed out")]
    Timeout,

    /// The rendering task panicked or was cancelled
    #[error("Chart rendering task failed: {0}")]
    Task(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Rendering backend for the statistics chart
///
/// Rendering is synchronous and CPU bound; callers run it on a blocking
/// thread.
pub trait ChartRenderer: Send + Sync + Debug {
    /// Render both distributions into a PNG image
    fn render(&self, aggregation: &Aggregation) -> RenderResult<Vec<u8>>;

    /// Image size in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Image returned when there is nothing to plot
    fn placeholder(&self) -> RenderResult<Vec<u8>> {
        let (width, height) = self.dimensions();
        blank_png(width, height)
    }

    fn name(&self) -> &str;
}

/// Base64 (standard alphabet, padded) for JSON transport
pub fn encode_chart(png: &[u8]) -> String {
    STANDARD.encode(png)
}

/// Plain white PNG of the given size
pub fn blank_png(width: u32, height: u32) -> RenderResult<Vec<u8>> {
    encode_png(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
}

fn encode_png(image: RgbImage) -> RenderResult<Vec<u8>> {
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(png)
}

fn backend_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Backend(e.to_string())
}

/// Bar chart renderer built on plotters' bitmap backend
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    width: u32,
    height: u32,
    max_categories: usize,
    labels: bool,
}

impl PlottersRenderer {
    /// Create a renderer, registering a label font on first use.
    ///
    /// Without a usable font the chart is still drawn, minus text.
    pub fn new(config: &ChartConfig) -> Self {
        let labels = *FONT_READY.get_or_init(|| register_font(config.font_path.as_deref()));
        if !labels {
            warn!("No usable TrueType font found; charts will be drawn without labels");
        }
        Self {
            width: config.width,
            height: config.height,
            max_categories: config.max_categories,
            labels,
        }
    }

    fn draw_panel(
        &self,
        area: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
        table: &FrequencyTable,
        title: &str,
        x_label: &str,
    ) -> RenderResult<()> {
        let (width, height) = area.dim_in_pixel();
        let (width, height) = (width as i32, height as i32);
        let (left, right, top, bottom) = (60, 20, 50, 90);
        let (x0, x1, y0, y1) = (left, width - right, top, height - bottom);

        let limit = match self.max_categories {
            0 => table.len(),
            n => n.min(table.len()),
        };
        let entries = &table.entries()[..limit];
        let max_count = table.max_count().max(1);

        area.draw(&PathElement::new(vec![(x0, y0), (x0, y1), (x1, y1)], BLACK))
            .map_err(backend_error)?;

        // y axis ticks
        let step = max_count.div_ceil(5).max(1);
        let mut tick = 0;
        while tick <= max_count {
            let y = y1 - ((tick as f64 / max_count as f64) * (y1 - y0) as f64) as i32;
            area.draw(&PathElement::new(vec![(x0 - 5, y), (x0, y)], BLACK))
                .map_err(backend_error)?;
            if self.labels {
                let style = label_style(12.0).pos(Pos::new(HPos::Right, VPos::Center));
                area.draw(&Text::new(tick.to_string(), (x0 - 8, y), style))
                    .map_err(backend_error)?;
            }
            tick += step;
        }

        if !entries.is_empty() {
            let slot = (x1 - x0) as f64 / entries.len() as f64;
            let label_chars = ((slot / 7.0) as usize).max(3);

            for (i, (label, count)) in entries.iter().enumerate() {
                let bx0 = x0 + (slot * i as f64 + slot * 0.1) as i32;
                let bx1 = x0 + (slot * (i + 1) as f64 - slot * 0.1) as i32;
                let bar = ((*count as f64 / max_count as f64) * (y1 - y0) as f64) as i32;
                area.draw(&Rectangle::new([(bx0, y1 - bar), (bx1.max(bx0 + 1), y1)], BAR_COLOR.filled()))
                    .map_err(backend_error)?;

                if self.labels {
                    let style = label_style(11.0).pos(Pos::new(HPos::Center, VPos::Top));
                    let text = truncate_str(label, label_chars);
                    area.draw(&Text::new(text, ((bx0 + bx1) / 2, y1 + 6), style))
                        .map_err(backend_error)?;
                }
            }
        }

        if self.labels {
            let centered = |size| label_style(size).pos(Pos::new(HPos::Center, VPos::Center));
            area.draw(&Text::new(title.to_string(), ((x0 + x1) / 2, top / 2), centered(20.0)))
                .map_err(backend_error)?;
            area.draw(&Text::new(x_label.to_string(), ((x0 + x1) / 2, height - 25), centered(14.0)))
                .map_err(backend_error)?;
            area.draw(&Text::new("Count".to_string(), (x0, y0 - 14), centered(14.0)))
                .map_err(backend_error)?;
        }

        Ok(())
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render(&self, aggregation: &Aggregation) -> RenderResult<Vec<u8>> {
        let (width, height) = (self.width, self.height);
        let mut buffer = vec![0u8; width as usize * height as usize * 3];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(backend_error)?;

            let panels = root.split_evenly((1, 2));
            self.draw_panel(&panels[0], &aggregation.titles, "Job Title Distribution", "Title")?;
            self.draw_panel(&panels[1], &aggregation.companies, "Company Distribution", "Company")?;

            root.present().map_err(backend_error)?;
        }

        let image = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| RenderError::Encode("pixel buffer does not match image size".to_string()))?;
        let png = encode_png(image)?;
        debug!(
            "Rendered chart: {} titles, {} companies, {} bytes",
            aggregation.titles.len(),
            aggregation.companies.len(),
            png.len()
        );
        Ok(png)
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn name(&self) -> &str {
        "plotters"
    }
}

fn label_style(size: f64) -> TextStyle<'static> {
    TextStyle::from((FONT_FAMILY, size).into_font())
}

/// Register the first readable font with plotters
fn register_font(configured: Option<&Path>) -> bool {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        // plotters keeps registered fonts for the life of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                debug!("Registered chart font {}", path.display());
                return true;
            }
            Err(_) => warn!("Font {} could not be parsed, skipping", path.display()),
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregate;
    use crate::types::ProjectedRecord;
    use image::GenericImageView;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn sample_aggregation() -> Aggregation {
        let records: Vec<ProjectedRecord> = [
            ("Engineer", "Acme"),
            ("Engineer", "Globex"),
            ("Manager", "Acme"),
            ("Analyst with a very long job title indeed", "Initech"),
        ]
        .iter()
        .map(|(title, company)| ProjectedRecord {
            title: title.to_string(),
            company: company.to_string(),
            ..Default::default()
        })
        .collect();
        aggregate(&records)
    }

    #[test]
    fn blank_png_has_requested_size() {
        let png = blank_png(320, 200).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (320, 200));
    }

    #[test]
    fn encode_chart_is_standard_base64() {
        assert_eq!(encode_chart(b"png"), "cG5n");
        let decoded = STANDARD.decode(encode_chart(&PNG_SIGNATURE)).unwrap();
        assert_eq!(decoded, PNG_SIGNATURE);
    }

    #[test]
    fn renders_png_of_configured_size() {
        let config = ChartConfig {
            width: 800,
            height: 400,
            ..Default::default()
        };
        let renderer = PlottersRenderer::new(&config);
        let png = renderer.render(&sample_aggregation()).unwrap();

        assert_eq!(&png[..8], &PNG_SIGNATURE);
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (800, 400));
    }

    #[test]
    fn bars_are_drawn() {
        let renderer = PlottersRenderer::new(&ChartConfig::default());
        let png = renderer.render(&sample_aggregation()).unwrap();
        let image = image::load_from_memory(&png).unwrap().to_rgb8();
        let blue = image.pixels().filter(|p| p.0 == [31, 119, 180]).count();
        assert!(blue > 0, "expected bar pixels in the rendered chart");
    }

    #[test]
    fn empty_tables_still_render() {
        let renderer = PlottersRenderer::new(&ChartConfig::default());
        let png = renderer.render(&Aggregation::default()).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn placeholder_matches_dimensions() {
        let config = ChartConfig {
            width: 640,
            height: 300,
            ..Default::default()
        };
        let renderer = PlottersRenderer::new(&config);
        let png = renderer.placeholder().unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (640, 300));
    }

    #[test]
    fn max_categories_limits_bars() {
        let table = FrequencyTable::from_values(["a", "b", "c", "d"]);
        let agg = Aggregation {
            titles: table.clone(),
            companies: table,
            rows: 4,
        };
        let config = ChartConfig {
            max_categories: 1,
            ..Default::default()
        };
        let png = PlottersRenderer::new(&config).render(&agg).unwrap();
        assert!(image::load_from_memory(&png).is_ok());
    }
}
