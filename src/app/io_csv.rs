// Reading a survey export from a CSV file. Same shape as the Excel
// export: leading non-data rows, then the header row, then data.

use csv::ReaderBuilder;
use log::debug;
use snafu::prelude::*;

use survey_map::SKIP_ROWS;

use crate::app::{AppResult, CsvLineSnafu, EmptyCsvSnafu, OpeningCsvSnafu};

pub fn read_csv_table(path: &str) -> AppResult<(Vec<String>, Vec<Vec<Option<String>>>)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let mut records = rdr.records().enumerate().skip(SKIP_ROWS);
    let header: Vec<String> = match records.next() {
        Some((_, rec)) => rec
            .context(CsvLineSnafu {
                lineno: SKIP_ROWS + 1,
            })?
            .iter()
            .map(|s| s.trim().to_string())
            .collect(),
        None => return EmptyCsvSnafu {}.fail(),
    };
    debug!("read_csv_table: header: {:?}", header);

    let mut data: Vec<Vec<Option<String>>> = Vec::new();
    for (idx, rec) in records {
        let rec = rec.context(CsvLineSnafu { lineno: idx + 1 })?;
        data.push(
            rec.iter()
                .map(|s| {
                    let trimmed = s.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        Some(trimmed.to_string())
                    }
                })
                .collect(),
        );
    }
    debug!("read_csv_table: {} data rows", data.len());
    Ok((header, data))
}
