use clap::Parser;

/// This is a batch explorer for geotagged survey exports. It loads a
/// submissions spreadsheet, applies facet filters, and writes the map
/// markers, the count summary and the chart document.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The spreadsheet containing the survey submissions.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (default xlsx) The type of the input: 'xlsx' or 'csv'.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (optional) When using an Excel file, the name of the worksheet to
    /// use. The first worksheet is used when not specified.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, optional) A JSON file restricting the selected values
    /// per facet. Facets not listed keep their default select-all state.
    #[clap(short, long, value_parser)]
    pub selection: Option<String>,

    /// (default English) The language key of a built-in pack, or the
    /// path to a JSON language pack file.
    #[clap(short, long, value_parser)]
    pub lang: Option<String>,

    /// (file path, optional) Where to write the filtered markers as a
    /// GeoJSON FeatureCollection.
    #[clap(long, value_parser)]
    pub out_geojson: Option<String>,

    /// (file path, optional) Where to write the filtered per-facet
    /// counts as JSON.
    #[clap(long, value_parser)]
    pub out_summary: Option<String>,

    /// (file path, optional) Where to write the paginated chart
    /// document.
    #[clap(long, value_parser)]
    pub out_pdf: Option<String>,

    /// If passed, writes the chart document under its fixed download
    /// name in the current directory. Overridden by --out-pdf.
    #[clap(long, takes_value = false)]
    pub export: bool,

    /// If passed as an argument, will turn on verbose logging to the
    /// standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
