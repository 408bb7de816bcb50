//! Canonical state and city table built from the provider's location list.

use std::collections::{HashMap, HashSet};

use regex::{Regex, RegexBuilder};

use rankscope_core::LocationEntry;
use rankscope_dataforseo::LocationItem;

use crate::error::LocationError;

const STATE_TYPE: &str = "State";
const CITY_TYPE: &str = "City";

/// States sorted by name, each with its alphabetised city list.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    states: Vec<LocationEntry>,
    cities: HashMap<i64, Vec<LocationEntry>>,
}

impl LocationIndex {
    /// Builds the index from raw provider rows.
    ///
    /// Cities are assigned to a state by their comma-separated full name
    /// (`"Austin,Texas,United States"`), trying longer state names first so
    /// that `West Virginia` wins over `Virginia`. A word-boundary match on the
    /// state name is the fallback. Cities matching no state are dropped.
    ///
    /// # Errors
    ///
    /// [`LocationError::EmptyLocationTable`] when the rows contain no state.
    pub fn build(items: &[LocationItem]) -> Result<Self, LocationError> {
        let mut seen_states = HashSet::new();
        let mut states: Vec<LocationEntry> = items
            .iter()
            .filter(|item| item.location_type.eq_ignore_ascii_case(STATE_TYPE))
            .filter(|item| seen_states.insert(item.location_code))
            .map(entry_from_item)
            .collect();

        if states.is_empty() {
            return Err(LocationError::EmptyLocationTable);
        }

        // Longest first for assignment.
        states.sort_by(|a, b| b.name.len().cmp(&a.name.len()));

        let boundary_patterns: Vec<(i64, Regex)> = states
            .iter()
            .filter_map(|state| {
                let words: Vec<String> = state
                    .name
                    .to_lowercase()
                    .split_whitespace()
                    .map(regex::escape)
                    .collect();
                RegexBuilder::new(&format!(r"\b{}\b", words.join(r"\s+")))
                    .case_insensitive(true)
                    .build()
                    .ok()
                    .map(|re| (state.code, re))
            })
            .collect();

        let mut cities: HashMap<i64, Vec<LocationEntry>> =
            states.iter().map(|s| (s.code, Vec::new())).collect();
        let mut seen_cities = HashSet::new();
        let mut dropped = 0usize;

        for item in items
            .iter()
            .filter(|item| item.location_type.eq_ignore_ascii_case(CITY_TYPE))
            .filter(|item| seen_cities.insert(item.location_code))
        {
            let normalized = normalize_full_name(&item.location_name);
            let state_code = states
                .iter()
                .find(|state| {
                    let name = state.name.to_lowercase();
                    normalized.contains(&format!(", {name},")) || normalized.ends_with(&format!(", {name}"))
                })
                .map(|state| state.code)
                .or_else(|| {
                    boundary_patterns
                        .iter()
                        .find(|(_, re)| re.is_match(&normalized))
                        .map(|(code, _)| *code)
                });

            match state_code.and_then(|code| cities.get_mut(&code)) {
                Some(list) => list.push(entry_from_item(item)),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::debug!(dropped, "cities without a matching state were dropped");
        }

        states.sort_by(|a, b| a.name.cmp(&b.name));
        for list in cities.values_mut() {
            list.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(Self { states, cities })
    }

    #[must_use]
    pub fn states(&self) -> &[LocationEntry] {
        &self.states
    }

    /// Cities of the state with code `state_code`; empty when unknown.
    #[must_use]
    pub fn cities_of(&self, state_code: i64) -> &[LocationEntry] {
        self.cities
            .get(&state_code)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Cities of the state named `state` (case-insensitive); empty when unknown.
    #[must_use]
    pub fn cities_named(&self, state: &str) -> &[LocationEntry] {
        let wanted = state.trim();
        self.states
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(wanted))
            .map(|s| self.cities_of(s.code))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn city_count(&self) -> usize {
        self.cities.values().map(Vec::len).sum()
    }
}

fn entry_from_item(item: &LocationItem) -> LocationEntry {
    let short = item
        .location_name
        .split(',')
        .next()
        .unwrap_or_default()
        .trim();
    LocationEntry {
        name: short.to_string(),
        code: item.location_code,
        full_name: item.location_name.clone(),
    }
}

/// Lowercases and rewrites comma separators as `", "`.
fn normalize_full_name(full_name: &str) -> String {
    full_name
        .split(',')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(", ")
        .to_lowercase()
}
