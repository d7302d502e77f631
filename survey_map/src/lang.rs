// Display strings and optional per-facet value translations.
//
// A pack mirrors the language table of the hosting dashboard: fixed UI
// strings plus, optionally, a `facet -> {raw -> localized}` mapping that
// the aggregator applies to labels after counting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Facet;

/// The display strings for one language.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct LanguagePack {
    pub title: String,
    pub filter_header: String,
    pub map: String,
    pub export: String,
    pub export_button: String,
    pub result_header: String,
    pub no_result: String,
    /// Popup text for submissions without a comment.
    pub no_comment: String,
    /// Facet name -> label of the filter control.
    pub facet_labels: BTreeMap<String, String>,
    /// Facet name -> chart title.
    pub chart_titles: BTreeMap<String, String>,
    /// Facet name -> raw value -> localized value. Facets without an
    /// entry pass raw values through.
    #[serde(default)]
    pub translations: BTreeMap<String, BTreeMap<String, String>>,
}

impl LanguagePack {
    /// The built-in English pack.
    pub fn english() -> LanguagePack {
        let mut facet_labels = BTreeMap::new();
        facet_labels.insert("Category".to_string(), "Suggestion Type".to_string());
        facet_labels.insert("Age".to_string(), "Age Group".to_string());
        facet_labels.insert("Gender".to_string(), "Gender".to_string());
        facet_labels.insert("Relationship".to_string(), "User Relationship".to_string());

        let mut chart_titles = BTreeMap::new();
        chart_titles.insert(
            "Category".to_string(),
            "Suggestion Type Distribution".to_string(),
        );
        chart_titles.insert("Age".to_string(), "Age Distribution".to_string());
        chart_titles.insert("Gender".to_string(), "Gender Distribution".to_string());
        chart_titles.insert(
            "Relationship".to_string(),
            "User Relationship Distribution".to_string(),
        );

        LanguagePack {
            title: "Park Suggestion Interactive Map".to_string(),
            filter_header: "Filter Options".to_string(),
            map: "Map".to_string(),
            export: "Export Charts to PDF".to_string(),
            export_button: "Download PDF".to_string(),
            result_header: "Suggestions Found".to_string(),
            no_result: "No suggestions found. Adjust filters to see data.".to_string(),
            no_comment: "No comment".to_string(),
            facet_labels,
            chart_titles,
            translations: BTreeMap::new(),
        }
    }

    pub fn facet_label(&self, facet: Facet) -> &str {
        self.facet_labels
            .get(facet.name())
            .map(String::as_str)
            .unwrap_or_else(|| facet.name())
    }

    pub fn chart_title(&self, facet: Facet) -> &str {
        self.chart_titles
            .get(facet.name())
            .map(String::as_str)
            .unwrap_or_else(|| facet.name())
    }

    /// The value translation table for a facet, if this pack has one.
    pub fn translation(&self, facet: Facet) -> Option<&BTreeMap<String, String>> {
        self.translations.get(facet.name())
    }
}

/// Looks up a built-in pack by its language key. At least English is
/// always present.
pub fn builtin(key: &str) -> Option<LanguagePack> {
    match key {
        "English" => Some(LanguagePack::english()),
        _ => None,
    }
}
