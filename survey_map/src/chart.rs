// Rasterizing count series into RGB bitmaps with plotters.
//
// Charts are rendered fresh on every filter change; nothing is updated
// incrementally. The bitmaps feed both the host UI and the PDF exporter.

use std::error::Error;
use std::fmt::Display;

use log::debug;
use plotters::prelude::*;

use crate::model::{CountSeries, Facet};

/// Pixel size of a rendered chart: 6x4 inches at 150 DPI.
pub const CHART_WIDTH: u32 = 900;
pub const CHART_HEIGHT: u32 = 600;

// The accent color of the dashboard.
const THEME: RGBColor = RGBColor(0x2c, 0x6e, 0x49);

const PIE_PALETTE: [RGBColor; 8] = [
    RGBColor(0x2c, 0x6e, 0x49),
    RGBColor(0x4c, 0x95, 0x6c),
    RGBColor(0x8a, 0xb1, 0x7d),
    RGBColor(0xd6, 0xa8, 0x4a),
    RGBColor(0xc0, 0x5b, 0x4d),
    RGBColor(0x5b, 0x84, 0xb1),
    RGBColor(0x9a, 0x6f, 0xb0),
    RGBColor(0x7f, 0x7f, 0x7f),
];

/// How a facet's series is drawn.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ChartKind {
    Bar,
    Pie,
}

/// A rendered chart for one facet: raw 8-bit RGB, row-major,
/// `width * height * 3` bytes.
#[derive(PartialEq, Debug, Clone)]
pub struct ChartArtifact {
    pub facet: Facet,
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl ChartArtifact {
    /// Whether the buffer is consistent with the declared dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgb.len() == (self.width as usize) * (self.height as usize) * 3
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ChartError {
    /// Rendering an empty series is never attempted: the caller is
    /// expected to have checked for the empty-result state first.
    EmptySeries,
    Backend(String),
}

impl Error for ChartError {}

impl Display for ChartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartError::EmptySeries => write!(f, "cannot render a chart over an empty series"),
            ChartError::Backend(msg) => write!(f, "chart backend error: {}", msg),
        }
    }
}

fn backend_err<E: Display>(e: E) -> ChartError {
    ChartError::Backend(e.to_string())
}

/// Renders one count series to an RGB bitmap.
pub fn render_chart(
    series: &CountSeries,
    kind: ChartKind,
    title: &str,
    axis_label: &str,
) -> Result<ChartArtifact, ChartError> {
    if series.is_empty() {
        return Err(ChartError::EmptySeries);
    }
    debug!(
        "render_chart: {:?} {:?} with {} entries",
        series.facet,
        kind,
        series.entries.len()
    );
    let mut rgb = vec![0xffu8; (CHART_WIDTH as usize) * (CHART_HEIGHT as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut rgb, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        match kind {
            ChartKind::Bar => draw_bar(&root, series, title, axis_label)?,
            ChartKind::Pie => draw_pie(&root, series, title)?,
        }
        root.present().map_err(backend_err)?;
    }
    Ok(ChartArtifact {
        facet: series.facet,
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
        rgb,
    })
}

fn draw_bar<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    series: &CountSeries,
    title: &str,
    axis_label: &str,
) -> Result<(), ChartError> {
    root.fill(&WHITE).map_err(backend_err)?;
    let n = series.entries.len() as u32;
    let max = series.entries.iter().map(|(_, c)| *c).max().unwrap_or(0);
    // 5% headroom above the tallest bar, as in the dashboard.
    let y_max = (max + max / 20).max(1);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font().color(&THEME))
        .margin(12)
        .x_label_area_size(70)
        .y_label_area_size(55)
        .build_cartesian_2d((0u32..n).into_segmented(), 0u64..y_max)
        .map_err(backend_err)?;

    let entries = &series.entries;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n as usize)
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) if (*i as usize) < entries.len() => {
                entries[*i as usize].0.clone()
            }
            _ => String::new(),
        })
        .x_desc(axis_label)
        .y_desc("Count")
        .draw()
        .map_err(backend_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(THEME.filled())
                .margin(10)
                .data(entries.iter().enumerate().map(|(i, (_, c))| (i as u32, *c))),
        )
        .map_err(backend_err)?;

    // Count labels above the bars.
    chart
        .draw_series(entries.iter().enumerate().map(|(i, (_, c))| {
            Text::new(
                c.to_string(),
                (SegmentValue::CenterOf(i as u32), *c),
                ("sans-serif", 16).into_font(),
            )
        }))
        .map_err(backend_err)?;
    Ok(())
}

fn draw_pie<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    series: &CountSeries,
    title: &str,
) -> Result<(), ChartError> {
    root.fill(&WHITE).map_err(backend_err)?;
    let titled = root
        .titled(title, ("sans-serif", 28).into_font().color(&THEME))
        .map_err(backend_err)?;

    let (w, h) = titled.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = (w.min(h) as f64) * 0.32;
    let sizes: Vec<f64> = series.entries.iter().map(|(_, c)| *c as f64).collect();
    let colors: Vec<RGBColor> = series
        .entries
        .iter()
        .enumerate()
        .map(|(i, _)| PIE_PALETTE[i % PIE_PALETTE.len()])
        .collect();
    let labels: Vec<String> = series.entries.iter().map(|(l, _)| l.clone()).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", 18).into_font());
    pie.percentages(("sans-serif", 14).into_font());
    titled.draw(&pie).map_err(backend_err)?;
    Ok(())
}
