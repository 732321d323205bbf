//! Query bodies for the lexical and sparse indexes.
//!
//! Bodies use the common bool-query JSON shape: a `multi_match` over boosted
//! fields, `should` clauses for expansion terms, and `term`/`terms` filters.

use std::collections::{BTreeMap, HashMap};

use serde_json::{json, Value};

/// Fields searched by default, with their base boosts.
pub const DEFAULT_FIELDS: &[(&str, f64)] = &[("text", 1.0), ("title_path", 1.5), ("section", 1.0)];

/// Sparse bodies keep at most this many encoder terms.
pub const MAX_SPARSE_TERMS: usize = 256;

/// Field under which sparse term weights are indexed.
pub const SPARSE_FIELD: &str = "splade_terms";

/// Effective field boosts: base boosts multiplied by intent boosts. Intent
/// boosts for fields outside the defaults add those fields.
pub fn field_boosts(intent_boosts: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let mut fields: BTreeMap<String, f64> = DEFAULT_FIELDS
        .iter()
        .map(|(f, b)| (f.to_string(), *b))
        .collect();
    for (field, boost) in intent_boosts {
        if !boost.is_finite() || *boost <= 0.0 {
            continue;
        }
        fields
            .entry(field.clone())
            .and_modify(|b| *b *= boost)
            .or_insert(*boost);
    }
    fields
}

/// Filter clauses: arrays become `terms`, scalars `term`.
pub fn filter_clauses(filters: &BTreeMap<String, Value>) -> Vec<Value> {
    filters
        .iter()
        .map(|(field, value)| match value {
            Value::Array(_) => json!({ "terms": { field: value } }),
            _ => json!({ "term": { field: value } }),
        })
        .collect()
}

/// BM25 body with field boosts, expansion terms, and filters.
pub fn lexical_body(
    query: &str,
    expanded_terms: &BTreeMap<String, f64>,
    boosts: &BTreeMap<String, f64>,
    filters: &BTreeMap<String, Value>,
) -> Value {
    let fields: Vec<String> = field_boosts(boosts)
        .into_iter()
        .map(|(field, boost)| format!("{field}^{boost}"))
        .collect();

    let should: Vec<Value> = expanded_terms
        .iter()
        .filter(|(_, w)| w.is_finite() && **w > 0.0)
        .map(|(term, weight)| {
            json!({ "match_phrase": { "text": { "query": term, "boost": weight } } })
        })
        .collect();

    json!({
        "query": {
            "bool": {
                "must": [{ "multi_match": { "query": query, "fields": fields } }],
                "should": should,
                "filter": filter_clauses(filters),
            }
        }
    })
}

/// SPLADE body from encoder output, or `None` when no usable term remains.
///
/// Terms are ordered by descending weight (term ascending on ties) and capped
/// at [`MAX_SPARSE_TERMS`].
pub fn sparse_body(terms: &HashMap<String, f32>, filters: &BTreeMap<String, Value>) -> Option<Value> {
    let mut weighted: Vec<(&String, f32)> = terms
        .iter()
        .filter(|(t, w)| !t.trim().is_empty() && w.is_finite() && **w > 0.0)
        .map(|(t, w)| (t, *w))
        .collect();
    if weighted.is_empty() {
        return None;
    }
    weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    weighted.truncate(MAX_SPARSE_TERMS);

    let should: Vec<Value> = weighted
        .into_iter()
        .map(|(term, weight)| {
            json!({ "rank_feature": { "field": format!("{SPARSE_FIELD}.{term}"), "boost": weight } })
        })
        .collect();

    Some(json!({
        "query": {
            "bool": {
                "should": should,
                "minimum_should_match": 1,
                "filter": filter_clauses(filters),
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_boosts_multiply_default_fields() {
        let boosts = BTreeMap::from([("section".to_string(), 2.0), ("abstract".to_string(), 3.0)]);
        let fields = field_boosts(&boosts);
        assert_eq!(fields["section"], 2.0);
        assert_eq!(fields["title_path"], 1.5);
        assert_eq!(fields["abstract"], 3.0);
    }

    #[test]
    fn lexical_body_carries_terms_and_filters() {
        let terms = BTreeMap::from([("keytruda".to_string(), 0.9)]);
        let filters = BTreeMap::from([
            ("doc_type".to_string(), json!("label")),
            ("phase".to_string(), json!([2, 3])),
        ]);
        let body = lexical_body("pembrolizumab", &terms, &BTreeMap::new(), &filters);
        let bool_q = &body["query"]["bool"];
        assert_eq!(bool_q["must"][0]["multi_match"]["query"], "pembrolizumab");
        assert_eq!(bool_q["should"][0]["match_phrase"]["text"]["query"], "keytruda");
        assert_eq!(bool_q["filter"][0]["term"]["doc_type"], "label");
        assert_eq!(bool_q["filter"][1]["terms"]["phase"], json!([2, 3]));
    }

    #[test]
    fn sparse_body_orders_and_drops_bad_terms() {
        let terms = HashMap::from([
            ("pd-1".to_string(), 0.5_f32),
            ("keytruda".to_string(), 1.5),
            ("zero".to_string(), 0.0),
            ("nan".to_string(), f32::NAN),
        ]);
        let body = sparse_body(&terms, &BTreeMap::new()).unwrap();
        let should = body["query"]["bool"]["should"].as_array().unwrap();
        assert_eq!(should.len(), 2);
        assert_eq!(should[0]["rank_feature"]["field"], "splade_terms.keytruda");
    }

    #[test]
    fn sparse_body_without_terms_is_none() {
        assert!(sparse_body(&HashMap::new(), &BTreeMap::new()).is_none());
    }
}
