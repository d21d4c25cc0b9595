//! Matching identifiers across differently keyed datasets.
//!
//! Every reconciliation follows one policy: a source key either resolves to a
//! key of the target, or it lands in the unmatched set. Each lookup step
//! returns an `Option`, so a missing crosswalk entry, a code absent from the
//! target, or a name spelled differently all end the chain the same way and
//! never abort the operation.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use log::{debug, info};
use serde::Serialize;

use crate::{codes::CodeMap, table::Table};

/// Resolves lookup keys against a fixed key set, optionally ignoring case.
///
/// The case-insensitive index maps each lowercased key to its original
/// spelling. When two keys fold to the same lowercase form the one seen later
/// wins.
#[derive(Debug)]
pub struct KeyMatcher<'a> {
    exact: HashSet<&'a str>,
    folded: Option<HashMap<String, &'a str>>,
}

impl<'a> KeyMatcher<'a> {
    pub fn new<I>(keys: I, case_insensitive: bool) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        if case_insensitive {
            let mut folded = HashMap::new();
            for key in keys {
                if let Some(previous) = folded.insert(key.to_lowercase(), key) {
                    debug!("Key '{previous}' shadowed by '{key}' under case folding");
                }
            }
            Self {
                exact: HashSet::new(),
                folded: Some(folded),
            }
        } else {
            Self {
                exact: keys.into_iter().collect(),
                folded: None,
            }
        }
    }

    /// Returns the target key exactly as it is cased in the key set.
    pub fn resolve(&self, key: &str) -> Option<&'a str> {
        match &self.folded {
            Some(folded) => folded.get(&key.to_lowercase()).copied(),
            None => self.exact.get(key).copied(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    matched: BTreeMap<String, String>,
    unmatched: BTreeSet<String>,
}

impl ReconciliationResult {
    /// Source key → matched target key.
    pub fn matched(&self) -> &BTreeMap<String, String> {
        &self.matched
    }

    pub fn unmatched(&self) -> &BTreeSet<String> {
        &self.unmatched
    }

    pub fn get(&self, source_key: &str) -> Option<&str> {
        self.matched.get(source_key).map(String::as_str)
    }

    pub fn total(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }

    /// Flattens the result into `plot_key, data_key, status` records, matched
    /// keys first.
    pub fn to_records(&self) -> Vec<Vec<String>> {
        let matched = self
            .matched
            .iter()
            .map(|(plot, data)| vec![plot.clone(), data.clone(), "matched".to_string()]);
        let unmatched = self
            .unmatched
            .iter()
            .map(|plot| vec![plot.clone(), String::new(), "unmatched".to_string()]);
        matched.chain(unmatched).collect()
    }

    pub fn record_headers() -> Vec<String> {
        ["plot_key", "data_key", "status"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

fn reconcile_with<I, S, F>(source_keys: I, mut resolve: F) -> ReconciliationResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnMut(&str) -> Option<String>,
{
    let mut result = ReconciliationResult::default();
    for key in source_keys {
        let key = key.as_ref();
        match resolve(key) {
            Some(found) => {
                result.matched.insert(key.to_string(), found);
            }
            None => {
                debug!("No match for '{key}'");
                result.unmatched.insert(key.to_string());
            }
        }
    }
    info!(
        "Reconciled {} key(s): {} matched, {} unmatched",
        result.total(),
        result.matched.len(),
        result.unmatched.len()
    );
    result
}

/// Matches each source key directly against the keys of `target`.
pub fn reconcile_by_key<I, S>(
    source_keys: I,
    target: &Table,
    case_insensitive: bool,
) -> ReconciliationResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let matcher = KeyMatcher::new(target.keys(), case_insensitive);
    reconcile_with(source_keys, |key| matcher.resolve(key).map(str::to_string))
}

/// Translates each source key through `code_map`, then matches the resulting
/// code against `target`. A missing crosswalk entry is an ordinary miss.
pub fn reconcile_by_code_then_key<I, S>(
    source_keys: I,
    code_map: &CodeMap,
    target: &Table,
    case_insensitive: bool,
) -> ReconciliationResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let code_matcher = KeyMatcher::new(code_map.keys(), case_insensitive);
    let target_matcher = KeyMatcher::new(target.keys(), case_insensitive);
    reconcile_with(source_keys, |key| {
        code_matcher
            .resolve(key)
            .and_then(|plot| code_map.get(plot))
            .and_then(|data| target_matcher.resolve(data))
            .map(str::to_string)
    })
}

/// Matches plot codes by their display name. `plot_countries` maps each plot
/// code to a country name; a code matches when that name is a key of
/// `target`.
pub fn reconcile_by_name(
    plot_countries: &CodeMap,
    target: &Table,
    case_insensitive: bool,
) -> ReconciliationResult {
    let matcher = KeyMatcher::new(target.keys(), case_insensitive);
    reconcile_with(plot_countries.keys(), |code| {
        plot_countries
            .get(code)
            .and_then(|name| matcher.resolve(name))
            .map(str::to_string)
    })
}
