use log::{info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use survey_map::{
    export_pdf, FacetSelection, LanguagePack, PageSpec, Table, ViewModel, EXPORT_FILE_NAME,
    EXPORT_MIME,
};

use crate::args::Args;

pub mod cache;
pub mod geojson_out;
pub mod io_csv;
pub mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum AppError {
    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The spreadsheet has no readable rows"))]
    EmptyExcel {},
    #[snafu(display("Worksheet {name} not found"))]
    MissingWorksheet { name: String },
    #[snafu(display("Error opening CSV file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("The CSV file has no readable rows"))]
    EmptyCsv {},
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLine { source: csv::Error, lineno: usize },
    #[snafu(display("Error reading {path}"))]
    ReadingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Unknown language {key}"))]
    UnknownLanguage { key: String },
    #[snafu(display("Input type not supported: {input_type}"))]
    UnknownInputType { input_type: String },
    #[snafu(display("Error loading the survey table"))]
    Load { source: survey_map::LoadError },
    #[snafu(display("Error rendering the charts"))]
    Chart { source: survey_map::ChartError },
    #[snafu(display("Error exporting the chart document"))]
    Export { source: survey_map::ExportError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AppResult<T> = Result<T, AppError>;

pub mod selection_reader {
    use serde::{Deserialize, Serialize};
    use snafu::prelude::*;
    use std::fs;
    use survey_map::{Facet, FacetSelection};

    use super::{AppResult, ParsingJsonSnafu, ReadingFileSnafu};

    /// The facet selection file: one optional list of kept values per
    /// facet. A facet that is not listed keeps its select-all default.
    #[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
    pub struct SelectionFile {
        #[serde(default)]
        pub category: Option<Vec<String>>,
        #[serde(default)]
        pub age: Option<Vec<String>>,
        #[serde(default)]
        pub gender: Option<Vec<String>>,
        #[serde(default)]
        pub relationship: Option<Vec<String>>,
    }

    pub fn read_selection(path: &str) -> AppResult<SelectionFile> {
        let contents = fs::read_to_string(path).context(ReadingFileSnafu { path })?;
        serde_json::from_str(&contents).context(ParsingJsonSnafu {})
    }

    /// Narrows the select-all state with the lists of the file. Values
    /// that were never observed in the table are ignored.
    pub fn apply(selection: &mut FacetSelection, file: &SelectionFile) {
        if let Some(keep) = &file.category {
            selection.narrow(Facet::Category, keep);
        }
        if let Some(keep) = &file.age {
            selection.narrow(Facet::Age, keep);
        }
        if let Some(keep) = &file.gender {
            selection.narrow(Facet::Gender, keep);
        }
        if let Some(keep) = &file.relationship {
            selection.narrow(Facet::Relationship, keep);
        }
    }
}

fn load_language(key: &str) -> AppResult<LanguagePack> {
    if key.ends_with(".json") {
        let contents = fs::read_to_string(key).context(ReadingFileSnafu { path: key })?;
        serde_json::from_str(&contents).context(ParsingJsonSnafu {})
    } else {
        survey_map::builtin(key).context(UnknownLanguageSnafu { key })
    }
}

fn read_table(path: &str, args: &Args) -> AppResult<Table> {
    let provider = match &args.input_type {
        Some(t) => t.clone(),
        None => match path.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => "xlsx".to_string(),
        },
    };
    info!("Attempting to read survey file {:?} as {}", path, provider);
    let (header, rows) = match provider.as_str() {
        "xlsx" | "xls" => io_xlsx::read_excel_table(path, args.excel_worksheet_name.as_deref())?,
        "csv" => io_csv::read_csv_table(path)?,
        other => {
            return UnknownInputTypeSnafu { input_type: other }.fail();
        }
    };
    survey_map::build_table(&header, &rows).context(LoadSnafu {})
}

fn build_summary_js(vm: &ViewModel) -> JSValue {
    let mut facets: JSMap<String, JSValue> = JSMap::new();
    for chart in &vm.charts {
        let entries: Vec<JSValue> = chart
            .series
            .entries
            .iter()
            .map(|(label, count)| json!({"label": label, "count": count}))
            .collect();
        facets.insert(chart.facet.name().to_string(), json!(entries));
    }
    let center = vm.map.as_ref().map(|m| json!([m.center.0, m.center.1]));
    json!({"total": vm.total, "center": center, "facets": facets})
}

pub fn run(args: &Args) -> AppResult<()> {
    let lang = load_language(args.lang.as_deref().unwrap_or("English"))?;

    let mut table_cache = cache::TableCache::new();
    let table = table_cache.load(&args.input, |p| read_table(p, args))?;
    info!("Loaded {} submissions", table.len());

    let mut selection = FacetSelection::all_observed(&table);
    if let Some(path) = &args.selection {
        let file = selection_reader::read_selection(path)?;
        selection_reader::apply(&mut selection, &file);
    }

    let vm = survey_map::render(&table, &selection, &lang);
    if vm.total == 0 {
        println!("{}", lang.no_result);
    } else {
        println!("{}: {}", lang.result_header, vm.total);
    }

    if let Some(path) = &args.out_geojson {
        let path = path.as_str();
        match &vm.map {
            Some(map) => {
                let gj = geojson_out::to_geojson(map);
                fs::write(path, gj.to_string()).context(WritingFileSnafu { path })?;
                info!("Wrote {} markers to {}", map.markers.len(), path);
            }
            None => warn!("No rows selected, skipping the GeoJSON output"),
        }
    }

    if let Some(path) = &args.out_summary {
        let path = path.as_str();
        let pretty =
            serde_json::to_string_pretty(&build_summary_js(&vm)).context(ParsingJsonSnafu {})?;
        if path == "stdout" {
            println!("{}", pretty);
        } else {
            fs::write(path, pretty).context(WritingFileSnafu { path })?;
        }
    }

    let pdf_target = args
        .out_pdf
        .clone()
        .or_else(|| args.export.then(|| EXPORT_FILE_NAME.to_string()));
    if let Some(path) = pdf_target {
        if vm.charts.is_empty() {
            warn!("No charts to export, skipping {}", path);
        } else {
            let artifacts = survey_map::render_artifacts(&vm).context(ChartSnafu {})?;
            let bytes = export_pdf(&artifacts, &PageSpec::a4(), &lang.export)
                .context(ExportSnafu {})?;
            fs::write(&path, &bytes).context(WritingFileSnafu { path: path.clone() })?;
            info!("Wrote {} ({} bytes, {})", path, bytes.len(), EXPORT_MIME);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::selection_reader::{apply, SelectionFile};
    use super::*;
    use survey_map::{Facet, Submission};

    fn submission(category: &str, age: &str) -> Submission {
        Submission {
            category: Some(category.to_string()),
            latitude: 1.0,
            longitude: 2.0,
            age: Some(age.to_string()),
            gender: Some("Male".to_string()),
            relationship: Some("Resident".to_string()),
            comment: None,
        }
    }

    #[test]
    fn selection_file_narrows_only_listed_facets() {
        let table = Table::new(vec![submission("A", "18-20"), submission("B", "21-30")]);
        let mut selection = FacetSelection::all_observed(&table);
        let file: SelectionFile =
            serde_json::from_str(r#"{"category": ["A", "Unobserved"]}"#).unwrap();
        apply(&mut selection, &file);

        assert!(selection.allows(Facet::Category, Some("A")));
        assert!(!selection.allows(Facet::Category, Some("B")));
        // Never-observed values cannot enter the selection.
        assert!(!selection.allows(Facet::Category, Some("Unobserved")));
        // Unlisted facets keep their select-all state.
        assert!(selection.allows(Facet::Age, Some("21-30")));
    }

    #[test]
    fn unknown_language_is_an_error() {
        assert!(load_language("English").is_ok());
        assert!(matches!(
            load_language("Klingon"),
            Err(AppError::UnknownLanguage { .. })
        ));
    }

    #[test]
    fn summary_reflects_the_view() {
        let table = Table::new(vec![submission("A", "18-20"), submission("A", "18-20")]);
        let lang = LanguagePack::english();
        let selection = FacetSelection::all_observed(&table);
        let vm = survey_map::render(&table, &selection, &lang);
        let js = build_summary_js(&vm);
        assert_eq!(js["total"], json!(2));
        assert_eq!(js["facets"]["Category"][0]["label"], json!("A"));
        assert_eq!(js["facets"]["Category"][0]["count"], json!(2));
        assert_eq!(js["center"], json!([1.0, 2.0]));
    }
}
