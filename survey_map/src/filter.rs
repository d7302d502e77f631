use log::debug;

use crate::model::{Facet, FacetSelection, Table};

/// Keeps the rows that satisfy every facet of the selection at once.
///
/// The filter is stable: surviving rows keep their original relative
/// order. A facet with an empty selection set matches nothing, so the
/// whole result is empty (short circuit).
pub fn filter(table: &Table, selection: &FacetSelection) -> Table {
    if selection.has_empty_facet() {
        debug!("filter: a facet has an empty selection, returning no rows");
        return Table::default();
    }
    let rows = table
        .rows
        .iter()
        .filter(|s| {
            Facet::ALL
                .iter()
                .all(|f| selection.allows(*f, s.facet_value(*f)))
        })
        .cloned()
        .collect();
    Table::new(rows)
}
