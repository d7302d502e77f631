// Reading a survey export from an Excel workbook.

use calamine::{open_workbook, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use survey_map::SKIP_ROWS;

use crate::app::{AppResult, EmptyExcelSnafu, MissingWorksheetSnafu, OpeningExcelSnafu};

/// Reads the header row and the data cells of a survey workbook,
/// skipping the leading non-data rows. Uses the first worksheet unless a
/// name is given.
pub fn read_excel_table(
    path: &str,
    worksheet: Option<&str>,
) -> AppResult<(Vec<String>, Vec<Vec<Option<String>>>)> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?,
    };

    let mut rows = wrange.rows().skip(SKIP_ROWS);
    let header: Vec<String> = rows
        .next()
        .context(EmptyExcelSnafu {})?
        .iter()
        .map(|c| cell_to_opt(c).unwrap_or_default())
        .collect();
    debug!("read_excel_table: header: {:?}", header);

    let data: Vec<Vec<Option<String>>> = rows
        .map(|row| row.iter().map(cell_to_opt).collect())
        .collect();
    debug!("read_excel_table: {} data rows", data.len());
    Ok((header, data))
}

fn cell_to_opt(cell: &calamine::DataType) -> Option<String> {
    match cell {
        calamine::DataType::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        calamine::DataType::Float(f) => Some(f.to_string()),
        calamine::DataType::Int(i) => Some(i.to_string()),
        calamine::DataType::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_normalize_to_optional_strings() {
        assert_eq!(
            cell_to_opt(&calamine::DataType::String(" 40.7,-74.0 ".to_string())),
            Some("40.7,-74.0".to_string())
        );
        assert_eq!(
            cell_to_opt(&calamine::DataType::String("   ".to_string())),
            None
        );
        assert_eq!(
            cell_to_opt(&calamine::DataType::Int(42)),
            Some("42".to_string())
        );
        assert_eq!(cell_to_opt(&calamine::DataType::Empty), None);
    }
}
