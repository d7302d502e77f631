// Laying out rendered charts onto a paginated PDF.
//
// The exporter never re-renders anything: it validates the rasterized
// artifacts up front and then only blits bitmaps, two per page. Either
// the whole document is produced or an error is returned; a truncated
// file is never handed back.

use std::error::Error;
use std::fmt::Display;

use log::debug;
use printpdf::{ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px};

use crate::chart::ChartArtifact;

/// The fixed name offered for the downloaded document.
pub const EXPORT_FILE_NAME: &str = "park_suggestions_charts.pdf";
/// The MIME type of the exported document.
pub const EXPORT_MIME: &str = "application/pdf";

/// Charts stacked on one page.
pub const CHARTS_PER_PAGE: usize = 2;

const MM_PER_INCH: f64 = 25.4;

/// The fixed page geometry of the export.
#[derive(PartialEq, Debug, Clone)]
pub struct PageSpec {
    pub width_mm: f64,
    pub height_mm: f64,
    pub margin_mm: f64,
    /// Resolution the chart bitmaps were rasterized at.
    pub dpi: f64,
}

impl PageSpec {
    /// A4 portrait with a 40pt margin, charts at 150 DPI.
    pub fn a4() -> PageSpec {
        PageSpec {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_mm: 40.0 * MM_PER_INCH / 72.0,
            dpi: 150.0,
        }
    }

    /// The box available to one chart:
    /// `(width - 2*margin) x ((height - 3*margin) / 2)`.
    pub fn slot_size(&self) -> (f64, f64) {
        (
            self.width_mm - 2.0 * self.margin_mm,
            (self.height_mm - 3.0 * self.margin_mm) / 2.0,
        )
    }
}

impl Default for PageSpec {
    fn default() -> PageSpec {
        PageSpec::a4()
    }
}

/// `ceil(chart_count / 2)`. An odd final chart sits alone in the upper
/// slot of the last page.
pub fn page_count(chart_count: usize) -> usize {
    (chart_count + CHARTS_PER_PAGE - 1) / CHARTS_PER_PAGE
}

/// The uniform scale that fits an image of `px` pixels (at `dpi`) inside
/// a slot of the given millimeter size, preserving aspect ratio.
pub fn fit_scale(px: (u32, u32), dpi: f64, slot_mm: (f64, f64)) -> f64 {
    let base_w = px.0 as f64 / dpi * MM_PER_INCH;
    let base_h = px.1 as f64 / dpi * MM_PER_INCH;
    (slot_mm.0 / base_w).min(slot_mm.1 / base_h)
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ExportError {
    /// Export was invoked with nothing to lay out.
    NoCharts,
    /// An artifact is missing its pixels or inconsistent with its
    /// declared size. Nothing has been emitted at this point.
    BadArtifact { facet: String },
    Pdf(String),
}

impl Error for ExportError {}

impl Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::NoCharts => write!(f, "no charts to export"),
            ExportError::BadArtifact { facet } => {
                write!(f, "chart artifact for {} is not renderable", facet)
            }
            ExportError::Pdf(msg) => write!(f, "error serializing the document: {}", msg),
        }
    }
}

/// Serializes the chart set to a multi-page PDF held in memory. The
/// caller decides persistence and delivery.
pub fn export_pdf(
    charts: &[ChartArtifact],
    spec: &PageSpec,
    doc_title: &str,
) -> Result<Vec<u8>, ExportError> {
    if charts.is_empty() {
        return Err(ExportError::NoCharts);
    }
    // Validate everything before emitting anything, so a failure cannot
    // leave a partial document behind.
    for chart in charts {
        if !chart.is_well_formed() {
            return Err(ExportError::BadArtifact {
                facet: chart.facet.name().to_string(),
            });
        }
    }

    let (slot_w, slot_h) = spec.slot_size();
    let pages = page_count(charts.len());
    debug!(
        "export_pdf: {} charts over {} pages, slot {:.1}x{:.1}mm",
        charts.len(),
        pages,
        slot_w,
        slot_h
    );

    let (doc, first_page, first_layer) = PdfDocument::new(
        doc_title,
        Mm(spec.width_mm),
        Mm(spec.height_mm),
        "charts",
    );
    let mut page_refs = vec![(first_page, first_layer)];
    for _ in 1..pages {
        page_refs.push(doc.add_page(Mm(spec.width_mm), Mm(spec.height_mm), "charts"));
    }

    for (i, chart) in charts.iter().enumerate() {
        let (page, layer) = page_refs[i / CHARTS_PER_PAGE];
        let slot = i % CHARTS_PER_PAGE;

        let scale = fit_scale((chart.width, chart.height), spec.dpi, (slot_w, slot_h));
        let placed_w = chart.width as f64 / spec.dpi * MM_PER_INCH * scale;
        let placed_h = chart.height as f64 / spec.dpi * MM_PER_INCH * scale;

        // PDF origin is the bottom-left corner. The upper slot is slot 0.
        let x = spec.margin_mm + (slot_w - placed_w) / 2.0;
        let slot_bottom =
            spec.height_mm - spec.margin_mm - slot_h - slot as f64 * (slot_h + spec.margin_mm);
        let y = slot_bottom + (slot_h - placed_h) / 2.0;

        let image = Image::from(ImageXObject {
            width: Px(chart.width as usize),
            height: Px(chart.height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: false,
            image_data: chart.rgb.clone(),
            image_filter: None,
            clipping_bbox: None,
        });
        image.add_to_layer(
            doc.get_page(page).get_layer(layer),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(y)),
                rotate: None,
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(spec.dpi),
            },
        );
    }

    doc.save_to_bytes().map_err(|e| ExportError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Facet;

    fn artifact(facet: Facet) -> ChartArtifact {
        let (w, h) = (30u32, 20u32);
        ChartArtifact {
            facet,
            width: w,
            height: h,
            rgb: vec![0xff; (w * h * 3) as usize],
        }
    }

    #[test]
    fn pages_hold_two_charts() {
        assert_eq!(page_count(1), 1);
        assert_eq!(page_count(2), 1);
        assert_eq!(page_count(3), 2);
        assert_eq!(page_count(4), 2);
        assert_eq!(page_count(5), 3);
    }

    #[test]
    fn fit_preserves_aspect_ratio() {
        // A 300x150 px image at 150 DPI is 50.8x25.4mm.
        let s = fit_scale((300, 150), 150.0, (101.6, 101.6));
        assert!((s - 2.0).abs() < 1e-9);
        // Height-bound slot.
        let s = fit_scale((300, 150), 150.0, (101.6, 12.7));
        assert!((s - 0.5).abs() < 1e-9);
    }

    #[test]
    fn a4_slot_matches_the_layout_rule() {
        let spec = PageSpec::a4();
        let (w, h) = spec.slot_size();
        assert!((w - (210.0 - 2.0 * spec.margin_mm)).abs() < 1e-9);
        assert!((h - (297.0 - 3.0 * spec.margin_mm) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn four_charts_make_two_pages() {
        let charts = vec![
            artifact(Facet::Category),
            artifact(Facet::Age),
            artifact(Facet::Gender),
            artifact(Facet::Relationship),
        ];
        let bytes = export_pdf(&charts, &PageSpec::a4(), "Charts").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let pages = bytes
            .windows(b"/Type /Page".len())
            .filter(|w| w == b"/Type /Page")
            .count();
        // /Type /Pages matches once as a prefix; 2 pages + 1 pages node.
        assert!(pages >= 2);
    }

    #[test]
    fn odd_chart_counts_still_export() {
        let charts = vec![
            artifact(Facet::Category),
            artifact(Facet::Age),
            artifact(Facet::Gender),
        ];
        let bytes = export_pdf(&charts, &PageSpec::a4(), "Charts").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn export_is_atomic_on_bad_artifacts() {
        let mut bad = artifact(Facet::Gender);
        bad.rgb.truncate(5);
        let charts = vec![artifact(Facet::Category), bad];
        assert_eq!(
            export_pdf(&charts, &PageSpec::a4(), "Charts"),
            Err(ExportError::BadArtifact {
                facet: "Gender".to_string()
            })
        );
    }

    #[test]
    fn no_charts_is_an_error() {
        assert_eq!(
            export_pdf(&[], &PageSpec::a4(), "Charts"),
            Err(ExportError::NoCharts)
        );
    }
}

