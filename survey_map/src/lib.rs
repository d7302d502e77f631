mod aggregate;
mod chart;
mod export;
mod filter;
mod lang;
mod loader;
mod markers;
mod model;

use log::{debug, info};

pub use crate::aggregate::{aggregate, aggregate_localized};
pub use crate::chart::{
    render_chart, ChartArtifact, ChartError, ChartKind, CHART_HEIGHT, CHART_WIDTH,
};
pub use crate::export::{
    export_pdf, fit_scale, page_count, ExportError, PageSpec, CHARTS_PER_PAGE, EXPORT_FILE_NAME,
    EXPORT_MIME,
};
pub use crate::filter::filter;
pub use crate::lang::{builtin, LanguagePack};
pub use crate::loader::{
    build_table, canonical_column, parse_coordinates, LoadError, SKIP_ROWS,
};
pub use crate::markers::{build_markers, MapError};
pub use crate::model::*;

/// The fixed chart set of the dashboard, in display order: three bar
/// charts and one pie chart, laid out as a 2x2 grid by the host.
pub const CHART_PLAN: [(Facet, ChartKind); 4] = [
    (Facet::Category, ChartKind::Bar),
    (Facet::Age, ChartKind::Bar),
    (Facet::Gender, ChartKind::Pie),
    (Facet::Relationship, ChartKind::Bar),
];

/// One chart slot of the view: the series plus everything needed to
/// draw it.
#[derive(PartialEq, Debug, Clone)]
pub struct FacetChart {
    pub facet: Facet,
    pub kind: ChartKind,
    pub title: String,
    pub axis_label: String,
    pub series: CountSeries,
}

/// Everything the host UI needs to redraw after a filter change.
///
/// An empty filtered subset produces no map and no charts; the host
/// shows the localized empty-state string instead.
#[derive(PartialEq, Debug, Clone)]
pub struct ViewModel {
    pub total: usize,
    pub map: Option<MapView>,
    pub charts: Vec<FacetChart>,
}

/// The whole pipeline for one interaction: filter, aggregate, place
/// markers. Pure: same inputs, same view model, no side effects. The
/// host loop re-invokes it on every filter change.
pub fn render(table: &Table, selection: &FacetSelection, lang: &LanguagePack) -> ViewModel {
    let subset = filter(table, selection);
    info!("render: {} of {} rows selected", subset.len(), table.len());
    if subset.is_empty() {
        return ViewModel {
            total: 0,
            map: None,
            charts: Vec::new(),
        };
    }

    let map = match build_markers(&subset, &lang.no_comment) {
        Ok(view) => Some(view),
        // Unreachable on a non-empty subset, but never worth a panic.
        Err(MapError::NoData) => None,
    };

    let charts = CHART_PLAN
        .iter()
        .map(|(facet, kind)| {
            let series = aggregate_localized(
                &subset,
                *facet,
                facet.default_sort_mode(),
                lang.translation(*facet),
            );
            debug!("render: {:?} -> {} labels", facet, series.entries.len());
            FacetChart {
                facet: *facet,
                kind: *kind,
                title: lang.chart_title(*facet).to_string(),
                axis_label: lang.facet_label(*facet).to_string(),
                series,
            }
        })
        .collect();

    ViewModel {
        total: subset.len(),
        map,
        charts,
    }
}

/// Rasterizes the charts of a view model, in plan order. Fails on the
/// first unrenderable chart; the partial artifact set is dropped.
pub fn render_artifacts(view: &ViewModel) -> Result<Vec<ChartArtifact>, ChartError> {
    view.charts
        .iter()
        .map(|c| render_chart(&c.series, c.kind, &c.title, &c.axis_label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(category: &str, age: &str, gender: &str, lat: f64, lon: f64) -> Submission {
        Submission {
            category: Some(category.to_string()),
            latitude: lat,
            longitude: lon,
            age: Some(age.to_string()),
            gender: Some(gender.to_string()),
            relationship: Some("Resident".to_string()),
            comment: None,
        }
    }

    fn sample_table() -> Table {
        let mut rows = Vec::new();
        for i in 0..3 {
            rows.push(submission("A", "18-20", "Male", 10.0 + i as f64, 20.0));
        }
        for _ in 0..2 {
            rows.push(submission("B", "21-30", "Female", 50.0, 60.0));
        }
        Table::new(rows)
    }

    #[test]
    fn render_reflects_the_selection() {
        let table = sample_table();
        let lang = LanguagePack::english();
        let mut sel = FacetSelection::all_observed(&table);
        sel.narrow(Facet::Category, &["A".to_string()]);

        let vm = render(&table, &sel, &lang);
        assert_eq!(vm.total, 3);

        let by_cat = &vm.charts[0];
        assert_eq!(by_cat.facet, Facet::Category);
        assert_eq!(by_cat.series.entries, vec![("A".to_string(), 3)]);
        let by_gender = &vm.charts[2];
        assert_eq!(by_gender.kind, ChartKind::Pie);
        assert_eq!(by_gender.series.entries, vec![("Male".to_string(), 3)]);

        // Centroid over the three selected rows only.
        let map = vm.map.unwrap();
        assert_eq!(map.center, (11.0, 20.0));
        assert_eq!(map.markers.len(), 3);
    }

    #[test]
    fn empty_result_renders_the_empty_state() {
        let table = sample_table();
        let lang = LanguagePack::english();
        let mut sel = FacetSelection::all_observed(&table);
        sel.narrow(Facet::Gender, &[]);

        let vm = render(&table, &sel, &lang);
        assert_eq!(vm.total, 0);
        assert!(vm.map.is_none());
        assert!(vm.charts.is_empty());
    }

    #[test]
    fn render_is_pure() {
        let table = sample_table();
        let lang = LanguagePack::english();
        let sel = FacetSelection::all_observed(&table);
        assert_eq!(render(&table, &sel, &lang), render(&table, &sel, &lang));
    }

    #[test]
    fn chart_plan_matches_the_grid() {
        assert_eq!(CHART_PLAN.len(), 4);
        let pies = CHART_PLAN
            .iter()
            .filter(|(_, k)| *k == ChartKind::Pie)
            .count();
        assert_eq!(pies, 1);
    }
}
