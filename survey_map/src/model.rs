// ********* Input data structures ***********

use std::collections::{BTreeMap, BTreeSet};

/// The categorical columns that can be filtered and aggregated on.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Facet {
    Category,
    Age,
    Gender,
    Relationship,
}

impl Facet {
    /// All the facets, in the order they appear in the survey.
    pub const ALL: [Facet; 4] = [
        Facet::Category,
        Facet::Age,
        Facet::Gender,
        Facet::Relationship,
    ];

    /// The canonical (short) column name of this facet.
    pub fn name(&self) -> &'static str {
        match self {
            Facet::Category => "Category",
            Facet::Age => "Age",
            Facet::Gender => "Gender",
            Facet::Relationship => "Relationship",
        }
    }

    /// The ordering to use when nothing more specific is requested.
    ///
    /// Age bands have a natural order, so they are sorted by label. The
    /// other facets have no intrinsic order and are sorted by frequency.
    pub fn default_sort_mode(&self) -> SortMode {
        match self {
            Facet::Age => SortMode::ByLabel,
            _ => SortMode::ByCount,
        }
    }
}

/// How the entries of a [`CountSeries`] are ordered.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SortMode {
    /// Descending by count. Ties are broken by the raw label so that the
    /// output is deterministic.
    ByCount,
    /// Ascending by the raw label (lexical order).
    ByLabel,
}

/// One survey submission. Immutable after load.
///
/// The latitude and longitude are derived from the raw coordinate string
/// by the loader. A submission only exists if both parsed as finite
/// numbers.
#[derive(PartialEq, Debug, Clone)]
pub struct Submission {
    pub category: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub relationship: Option<String>,
    pub comment: Option<String>,
}

impl Submission {
    /// The value of this submission for the given facet, if filled.
    pub fn facet_value(&self, facet: Facet) -> Option<&str> {
        let v = match facet {
            Facet::Category => &self.category,
            Facet::Age => &self.age,
            Facet::Gender => &self.gender,
            Facet::Relationship => &self.relationship,
        };
        v.as_deref()
    }
}

/// The loaded survey table. Never mutated after construction: all the
/// derived views (filtered subsets, count series, markers) are
/// recomputed, not updated in place.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub rows: Vec<Submission>,
}

impl Table {
    pub fn new(rows: Vec<Submission>) -> Table {
        Table { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The distinct non-null values observed for a facet, sorted.
    pub fn distinct_values(&self, facet: Facet) -> BTreeSet<String> {
        self.rows
            .iter()
            .filter_map(|s| s.facet_value(facet))
            .map(|s| s.to_string())
            .collect()
    }
}

/// The current multi-select state, one set of kept values per facet.
///
/// Invariant: every set is a subset of the facet's observed distinct
/// values. The only way to change a selection is to narrow it, so the
/// invariant holds by construction. An empty set for a facet matches
/// nothing (it does not mean "all").
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FacetSelection {
    selected: BTreeMap<Facet, BTreeSet<String>>,
}

impl FacetSelection {
    /// The default selection: every observed value of every facet.
    pub fn all_observed(table: &Table) -> FacetSelection {
        let mut selected = BTreeMap::new();
        for facet in Facet::ALL {
            selected.insert(facet, table.distinct_values(facet));
        }
        FacetSelection { selected }
    }

    /// Restricts the facet to the intersection of its current set with
    /// `keep`. Values not currently selected are ignored, which preserves
    /// the subset-of-observed invariant.
    pub fn narrow(&mut self, facet: Facet, keep: &[String]) {
        let entry = self.selected.entry(facet).or_default();
        entry.retain(|v| keep.iter().any(|k| k == v));
    }

    /// The selected values for a facet. A facet that was never populated
    /// has an empty selection.
    pub fn selected(&self, facet: Facet) -> Option<&BTreeSet<String>> {
        self.selected.get(&facet)
    }

    /// Whether a row value passes the selection for this facet. A null
    /// value never passes: it cannot be a member of the selected set.
    pub fn allows(&self, facet: Facet, value: Option<&str>) -> bool {
        match (self.selected.get(&facet), value) {
            (Some(set), Some(v)) => set.contains(v),
            _ => false,
        }
    }

    /// Whether some facet has an empty selection, which forces an empty
    /// result on the whole table.
    pub fn has_empty_facet(&self) -> bool {
        Facet::ALL
            .iter()
            .any(|f| self.selected.get(f).map_or(true, |s| s.is_empty()))
    }
}

// ******** Output data structures *********

/// An ordered label -> frequency series for one facet over a row subset.
///
/// Invariant: the counts sum to the number of rows of the subset that
/// carry a non-null value for the facet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CountSeries {
    pub facet: Facet,
    pub entries: Vec<(String, u64)>,
}

impl CountSeries {
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| *c).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A point-of-interest descriptor for the map front end.
#[derive(PartialEq, Debug, Clone)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    /// Short hover text (the suggestion category).
    pub tooltip: String,
    /// Full popup text (the free-form comment, or a placeholder).
    pub popup: String,
}

/// The markers of a non-empty filtered subset, plus the initial view
/// center (unweighted mean of the coordinates).
#[derive(PartialEq, Debug, Clone)]
pub struct MapView {
    pub center: (f64, f64),
    pub markers: Vec<Marker>,
}
