//! House and term scoping
//!
//! Every query over any collection is restricted by the same gate. Rajya
//! Sabha records have no term dimension, so they are never filtered by
//! term. When no house is selected, the gate admits all Rajya Sabha records
//! plus the Lok Sabha records of the selected term(s).

use serde::Serialize;
use serde_json::Value;

use crate::config::AnalyticsConfig;
use crate::models::{FilterParams, House, TermSelection};
use crate::pipeline::Filter;
use crate::sanitize;

pub const HOUSE_FIELD: &str = "house";
pub const TERM_FIELD: &str = "lsTerm";
pub const STATE_FIELD: &str = "state";

/// Build the house/term filter for a request
pub fn build_gate(house: Option<House>, term: TermSelection) -> Filter {
    match house {
        Some(House::LokSabha) => lok_sabha(term),
        Some(House::RajyaSabha) => rajya_sabha(),
        None => Filter::Or(vec![rajya_sabha(), lok_sabha(term)]),
    }
}

fn rajya_sabha() -> Filter {
    Filter::eq(HOUSE_FIELD, House::RajyaSabha.as_str())
}

fn lok_sabha(term: TermSelection) -> Filter {
    let term_filter = match term {
        TermSelection::Single(t) => Filter::eq(TERM_FIELD, t),
        TermSelection::Both => Filter::is_in(
            TERM_FIELD,
            term.terms().into_iter().map(Value::from).collect(),
        ),
    };
    Filter::all(vec![
        Filter::eq(HOUSE_FIELD, House::LokSabha.as_str()),
        term_filter,
    ])
}

/// Case-insensitive literal substring match on `state`
pub fn state_filter(state: Option<&str>) -> Option<Filter> {
    sanitize::substring_pattern(state).map(|pattern| Filter::regex_ci(STATE_FIELD, pattern))
}

/// Resolved house/term/state scope of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub house: Option<House>,
    pub term: TermSelection,
    pub state: Option<String>,
}

impl Scope {
    pub fn resolve(params: &FilterParams, config: &AnalyticsConfig) -> Self {
        Self {
            house: House::selection(params.house.as_deref()),
            term: TermSelection::resolve(params.term.as_deref(), config.default_term),
            state: sanitize::clean_text(params.state.as_deref()),
        }
    }

    /// Gate only, ignoring the state
    pub fn gate(&self) -> Filter {
        build_gate(self.house, self.term)
    }

    /// Gate plus state
    pub fn filter(&self) -> Filter {
        let mut filters = vec![self.gate()];
        filters.extend(state_filter(self.state.as_deref()));
        Filter::all(filters)
    }

    /// Term selection, or none when the scope is Rajya Sabha only
    pub fn applicable_term(&self) -> Option<TermSelection> {
        match self.house {
            Some(House::RajyaSabha) => None,
            _ => Some(self.term),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::eval::run;
    use crate::pipeline::{Pipeline, Stage};
    use serde_json::json;

    fn population() -> Vec<Value> {
        vec![
            json!({ "_id": "ls17", "house": "Lok Sabha", "lsTerm": 17, "state": "Kerala" }),
            json!({ "_id": "ls18", "house": "Lok Sabha", "lsTerm": 18, "state": "Bihar" }),
            json!({ "_id": "ls16", "house": "Lok Sabha", "lsTerm": 16, "state": "Kerala" }),
            json!({ "_id": "rs", "house": "Rajya Sabha", "state": "Kerala" }),
            json!({ "_id": "rs_term", "house": "Rajya Sabha", "lsTerm": 17, "state": "Goa" }),
            json!({ "_id": "unknown", "state": "Kerala" }),
        ]
    }

    fn admitted(filter: Filter) -> Vec<String> {
        let pipeline = Pipeline::new().stage(Stage::Match(filter));
        run(&pipeline, population(), &Default::default())
            .unwrap()
            .into_iter()
            .map(|doc| doc["_id"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_lok_sabha_single_term() {
        let ids = admitted(build_gate(Some(House::LokSabha), TermSelection::Single(18)));
        assert_eq!(ids, vec!["ls18"]);
    }

    #[test]
    fn test_lok_sabha_both_terms() {
        let ids = admitted(build_gate(Some(House::LokSabha), TermSelection::Both));
        assert_eq!(ids, vec!["ls17", "ls18"]);
    }

    #[test]
    fn test_rajya_sabha_ignores_term() {
        for term in [TermSelection::Single(17), TermSelection::Single(18), TermSelection::Both] {
            let ids = admitted(build_gate(Some(House::RajyaSabha), term));
            assert_eq!(ids, vec!["rs", "rs_term"]);
        }
    }

    #[test]
    fn test_both_houses_keeps_rajya_sabha_and_selected_terms() {
        let ids = admitted(build_gate(None, TermSelection::Single(17)));
        assert_eq!(ids, vec!["ls17", "rs", "rs_term"]);

        let ids = admitted(build_gate(None, TermSelection::Both));
        assert_eq!(ids, vec!["ls17", "ls18", "rs", "rs_term"]);
    }

    #[test]
    fn test_gate_never_admits_unlisted_terms() {
        let houses = [None, Some(House::LokSabha), Some(House::RajyaSabha)];
        let terms = [TermSelection::Single(17), TermSelection::Single(18), TermSelection::Both];
        for house in houses {
            for term in terms {
                let ids = admitted(build_gate(house, term));
                assert!(!ids.contains(&"ls16".to_string()));
                assert!(!ids.contains(&"unknown".to_string()));
            }
        }
    }

    #[test]
    fn test_state_filter_is_case_insensitive_and_literal() {
        let filter = state_filter(Some("kerala")).unwrap();
        assert_eq!(admitted(filter), vec!["ls17", "ls16", "rs", "unknown"]);

        // Metacharacters match literally, so this matches nothing
        let filter = state_filter(Some("K.rala")).unwrap();
        assert!(admitted(filter).is_empty());

        assert!(state_filter(Some("  ")).is_none());
    }

    #[test]
    fn test_scope_resolution() {
        let config = AnalyticsConfig::default();
        let params = FilterParams::from_pairs(&[("house", "Rajya Sabha"), ("state", " Goa ")]);
        let scope = Scope::resolve(&params, &config);
        assert_eq!(scope.house, Some(House::RajyaSabha));
        assert_eq!(scope.term, TermSelection::Single(18));
        assert_eq!(scope.state.as_deref(), Some("Goa"));
        assert_eq!(scope.applicable_term(), None);
        assert_eq!(admitted(scope.filter()), vec!["rs_term"]);
    }
}
