//! # Response Flattener
//!
//! Turns a SPARQL result document into plain records: keeps rows whose `name`
//! carries the wanted language tag, projects the declared variables and splits
//! `*List` variables on `", "`.

use crate::domain::types::{FieldValue, Record, SparqlResults};

const NAME_FIELD: &str = "name";
const LIST_MARKER: &str = "List";
const LIST_SEPARATOR: &str = ", ";

pub fn is_list_field(var: &str) -> bool {
    var.contains(LIST_MARKER)
}

/// An empty value yields no items rather than a single empty string.
fn split_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(LIST_SEPARATOR).map(str::to_string).collect()
}

/// Flattens `doc`, preserving binding order. Rows without a `name` in `language` are dropped.
pub fn flatten(doc: &SparqlResults, language: &str) -> Vec<Record> {
    let vars = &doc.head.vars;

    doc.results
        .bindings
        .iter()
        .filter(|row| {
            row.get(NAME_FIELD)
                .and_then(|term| term.lang.as_deref())
                .is_some_and(|lang| lang == language)
        })
        .map(|row| {
            vars.iter()
                .filter_map(|var| {
                    let value = match (row.get(var), is_list_field(var)) {
                        (Some(term), true) => FieldValue::List(split_list(&term.value)),
                        (Some(term), false) => FieldValue::Text(term.value.clone()),
                        (None, true) => FieldValue::List(Vec::new()),
                        (None, false) => return None,
                    };
                    Some((var.clone(), value))
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(raw: &str) -> SparqlResults {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_keeps_only_requested_language() {
        let d = doc(r#"{
            "head": {"vars": ["name", "description"]},
            "results": {"bindings": [
                {"name": {"value": "Castle of the Counts", "xml:lang": "en"}, "description": {"value": "en"}},
                {"name": {"value": "Gravensteen", "xml:lang": "nl"}, "description": {"value": "nl"}},
                {"name": {"value": "Château des Comtes", "xml:lang": "fr"}, "description": {"value": "fr"}}
            ]}
        }"#);

        let records = flatten(&d, "nl");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], FieldValue::Text("Gravensteen".to_string()));
        assert_eq!(records[0]["description"], FieldValue::Text("nl".to_string()));
    }

    #[test]
    fn test_rows_without_name_or_tag_are_dropped() {
        let d = doc(r#"{
            "head": {"vars": ["name", "description"]},
            "results": {"bindings": [
                {"description": {"value": "orphan"}},
                {"name": {"value": "Untagged"}},
                {"name": {"value": "Belfort", "xml:lang": "nl"}}
            ]}
        }"#);

        let records = flatten(&d, "nl");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"].as_text(), Some("Belfort"));
    }

    #[test]
    fn test_list_fields_always_split() {
        let d = doc(r#"{
            "head": {"vars": ["name", "imagesList", "tagList"]},
            "results": {"bindings": [
                {"name": {"value": "A", "xml:lang": "nl"},
                 "imagesList": {"value": "https://img/1.jpg, https://img/2.jpg"},
                 "tagList": {"value": "single"}},
                {"name": {"value": "B", "xml:lang": "nl"},
                 "imagesList": {"value": ""}}
            ]}
        }"#);

        let records = flatten(&d, "nl");
        assert_eq!(
            records[0]["imagesList"],
            FieldValue::List(vec!["https://img/1.jpg".to_string(), "https://img/2.jpg".to_string()])
        );
        assert_eq!(records[0]["tagList"], FieldValue::List(vec!["single".to_string()]));
        assert_eq!(records[1]["imagesList"], FieldValue::List(vec![]));
        assert_eq!(records[1]["tagList"], FieldValue::List(vec![]));
    }

    #[test]
    fn test_projects_declared_vars_in_source_order() {
        let d = doc(r#"{
            "head": {"vars": ["name", "page"]},
            "results": {"bindings": [
                {"name": {"value": "Gentse Feesten", "xml:lang": "nl"}, "page": {"value": "https://p/1"}, "extra": {"value": "x"}},
                {"name": {"value": "Lichtfestival", "xml:lang": "nl"}}
            ]}
        }"#);

        let records = flatten(&d, "nl");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"].as_text(), Some("Gentse Feesten"));
        assert!(!records[0].contains_key("extra"));
        assert_eq!(records[1]["name"].as_text(), Some("Lichtfestival"));
        assert!(!records[1].contains_key("page"));
    }

    #[test]
    fn test_empty_document() {
        let d = doc(r#"{"head": {"vars": []}, "results": {"bindings": []}}"#);
        assert!(flatten(&d, "nl").is_empty());
    }
}
