use std::collections::BTreeMap;

use log::debug;

use crate::model::{CountSeries, Facet, SortMode, Table};

/// Groups the rows of a subset by their facet value and counts them.
///
/// Null values are dropped, so the counts sum to the number of rows that
/// carry a value for the facet.
pub fn aggregate(table: &Table, facet: Facet, mode: SortMode) -> CountSeries {
    aggregate_localized(table, facet, mode, None)
}

/// Like [`aggregate`], with labels mapped through a translation table
/// for display.
///
/// Grouping and ordering always happen on the raw underlying value; the
/// translation is applied afterwards. Values with no translation entry
/// pass through unchanged.
pub fn aggregate_localized(
    table: &Table,
    facet: Facet,
    mode: SortMode,
    translation: Option<&BTreeMap<String, String>>,
) -> CountSeries {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for s in &table.rows {
        if let Some(v) = s.facet_value(facet) {
            *counts.entry(v).or_insert(0) += 1;
        }
    }
    // The BTreeMap already yields label-ascending order.
    let mut entries: Vec<(&str, u64)> = counts.into_iter().collect();
    if let SortMode::ByCount = mode {
        entries.sort_by(|(la, ca), (lb, cb)| cb.cmp(ca).then_with(|| la.cmp(lb)));
    }
    debug!("aggregate: {:?} ({:?}): {:?}", facet, mode, entries);

    let localize = |raw: &str| -> String {
        translation
            .and_then(|t| t.get(raw))
            .cloned()
            .unwrap_or_else(|| raw.to_string())
    };
    CountSeries {
        facet,
        entries: entries
            .into_iter()
            .map(|(label, count)| (localize(label), count))
            .collect(),
    }
}
