// Turning raw spreadsheet cells into the survey table.
//
// The file-format specific readers (XLSX, CSV) live in the command line
// crate. They hand over a header row and string cells; everything that
// gives those cells meaning happens here.

use std::error::Error;
use std::fmt::Display;

use log::{debug, warn};

use crate::model::{Submission, Table};

/// Number of leading non-data rows in a survey export, before the header
/// row.
pub const SKIP_ROWS: usize = 6;

/// The canonical column names, after renaming.
pub const COLUMN_CATEGORY: &str = "Category";
pub const COLUMN_COORDINATES: &str = "Coordinates";
pub const COLUMN_AGE: &str = "Age";
pub const COLUMN_GENDER: &str = "Gender";
pub const COLUMN_RELATIONSHIP: &str = "Relationship";
pub const COLUMN_COMMENT: &str = "Comment";

// The long-form question headers of the export, mapped to their short
// canonical names.
const RENAMES: [(&str, &str); 6] = [
    ("Q1. Category", COLUMN_CATEGORY),
    ("Q2. Coordinates", COLUMN_COORDINATES),
    ("Q5. Select your age group", COLUMN_AGE),
    ("Q6. Select your gender", COLUMN_GENDER),
    (
        "Q8. What is your relationship to the land you want transformed into a new park?",
        COLUMN_RELATIONSHIP,
    ),
    (
        "Q13. Is there anything else you\u{2019}d like to tell us about your idea?",
        COLUMN_COMMENT,
    ),
];

/// Errors that prevent the loader from producing a table at all.
/// Row-level problems are not errors: those rows are dropped.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum LoadError {
    MissingColumn(String),
}

impl Error for LoadError {}

impl Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::MissingColumn(name) => {
                write!(f, "missing required column: {}", name)
            }
        }
    }
}

/// Strips whitespace and renames the known long-form question headers to
/// their short canonical names. Unknown headers pass through trimmed.
pub fn canonical_column(raw: &str) -> String {
    let trimmed = raw.trim();
    for (long, short) in RENAMES {
        if trimmed == long {
            return short.to_string();
        }
    }
    trimmed.to_string()
}

/// Parses a `"lat,lon"` pair, split on the first comma. Returns None
/// unless both halves are finite floats.
pub fn parse_coordinates(raw: &str) -> Option<(f64, f64)> {
    let (lat_s, lon_s) = raw.split_once(',')?;
    let lat = lat_s.trim().parse::<f64>().ok()?;
    let lon = lon_s.trim().parse::<f64>().ok()?;
    if lat.is_finite() && lon.is_finite() {
        Some((lat, lon))
    } else {
        None
    }
}

struct ColumnIndex {
    category: usize,
    coordinates: usize,
    age: usize,
    gender: usize,
    relationship: usize,
    comment: usize,
}

fn find_column(canonical: &[String], name: &str) -> Result<usize, LoadError> {
    canonical
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
}

/// Builds the survey table from a header row and string cells.
///
/// A fully missing canonical column is fatal. Rows with a null
/// coordinate cell are dropped silently; rows whose coordinate string
/// does not parse are dropped with a warning.
pub fn build_table(header: &[String], rows: &[Vec<Option<String>>]) -> Result<Table, LoadError> {
    let canonical: Vec<String> = header.iter().map(|h| canonical_column(h)).collect();
    debug!("build_table: canonical header: {:?}", canonical);

    let idx = ColumnIndex {
        category: find_column(&canonical, COLUMN_CATEGORY)?,
        coordinates: find_column(&canonical, COLUMN_COORDINATES)?,
        age: find_column(&canonical, COLUMN_AGE)?,
        gender: find_column(&canonical, COLUMN_GENDER)?,
        relationship: find_column(&canonical, COLUMN_RELATIONSHIP)?,
        comment: find_column(&canonical, COLUMN_COMMENT)?,
    };

    let cell = |row: &Vec<Option<String>>, i: usize| -> Option<String> {
        row.get(i).and_then(|c| c.clone())
    };

    let mut submissions: Vec<Submission> = Vec::new();
    for (lineno, row) in rows.iter().enumerate() {
        let coords = match cell(row, idx.coordinates) {
            Some(c) => c,
            None => {
                debug!("build_table: row {}: no coordinates, dropped", lineno + 1);
                continue;
            }
        };
        let (latitude, longitude) = match parse_coordinates(&coords) {
            Some(pair) => pair,
            None => {
                warn!(
                    "build_table: row {}: unparsable coordinates {:?}, dropped",
                    lineno + 1,
                    coords
                );
                continue;
            }
        };
        submissions.push(Submission {
            category: cell(row, idx.category),
            latitude,
            longitude,
            age: cell(row, idx.age),
            gender: cell(row, idx.gender),
            relationship: cell(row, idx.relationship),
            comment: cell(row, idx.comment),
        });
    }
    debug!(
        "build_table: kept {} of {} data rows",
        submissions.len(),
        rows.len()
    );
    Ok(Table::new(submissions))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        vec![
            "Q1. Category".to_string(),
            " Q2. Coordinates ".to_string(),
            "Q5. Select your age group".to_string(),
            "Q6. Select your gender".to_string(),
            "Q8. What is your relationship to the land you want transformed into a new park?"
                .to_string(),
            "Q13. Is there anything else you\u{2019}d like to tell us about your idea?".to_string(),
        ]
    }

    fn row(cells: &[Option<&str>]) -> Vec<Option<String>> {
        cells.iter().map(|c| c.map(|s| s.to_string())).collect()
    }

    #[test]
    fn coordinates_parse() {
        assert_eq!(parse_coordinates("40.7,-74.0"), Some((40.7, -74.0)));
        assert_eq!(parse_coordinates(" 40.7 , -74.0 "), Some((40.7, -74.0)));
        assert_eq!(parse_coordinates("bad,data"), None);
        assert_eq!(parse_coordinates("40.7"), None);
        assert_eq!(parse_coordinates("nan,1.0"), None);
        assert_eq!(parse_coordinates("inf,1.0"), None);
    }

    #[test]
    fn renames_and_trims() {
        assert_eq!(canonical_column(" Q1. Category "), "Category");
        assert_eq!(canonical_column("Q2. Coordinates"), "Coordinates");
        assert_eq!(canonical_column("Something else"), "Something else");
    }

    #[test]
    fn missing_column_is_fatal() {
        let mut h = header();
        h.remove(1);
        let res = build_table(&h, &[]);
        assert_eq!(
            res,
            Err(LoadError::MissingColumn("Coordinates".to_string()))
        );
    }

    #[test]
    fn bad_rows_are_dropped_not_fatal() {
        let rows = vec![
            row(&[
                Some("A"),
                Some("40.7,-74.0"),
                Some("18-20"),
                Some("Male"),
                Some("Resident"),
                Some("nice spot"),
            ]),
            // No coordinates at all: dropped.
            row(&[Some("B"), None, Some("21-30"), Some("Female"), None, None]),
            // Unparsable coordinates: dropped.
            row(&[
                Some("B"),
                Some("bad,data"),
                Some("21-30"),
                Some("Female"),
                None,
                None,
            ]),
        ];
        let table = build_table(&header(), &rows).unwrap();
        assert_eq!(table.len(), 1);
        let s = &table.rows[0];
        assert_eq!(s.latitude, 40.7);
        assert_eq!(s.longitude, -74.0);
        assert_eq!(s.category.as_deref(), Some("A"));
        assert_eq!(s.comment.as_deref(), Some("nice spot"));
    }

    #[test]
    fn loading_is_deterministic() {
        let rows = vec![
            row(&[
                Some("A"),
                Some("1.0,2.0"),
                Some("18-20"),
                Some("Male"),
                Some("Resident"),
                None,
            ]),
            row(&[
                Some("B"),
                Some("3.0,4.0"),
                Some("21-30"),
                Some("Female"),
                Some("Visitor"),
                None,
            ]),
        ];
        let t1 = build_table(&header(), &rows).unwrap();
        let t2 = build_table(&header(), &rows).unwrap();
        assert_eq!(t1, t2);
    }
}
