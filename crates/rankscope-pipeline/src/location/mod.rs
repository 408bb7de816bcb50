//! Free-text state/city input to provider location codes.

mod cache;
pub mod fuzzy;
mod index;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use rankscope_core::{LocationEntry, LocationKind};

use crate::error::LocationError;

pub use cache::{LocationCache, LocationSource, ProviderLocations};
pub use fuzzy::{MatchMethod, DEFAULT_THRESHOLD};
pub use index::LocationIndex;

/// How one part of the query (state or city) was matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    pub input_term: String,
    pub matched_name: String,
    pub code: i64,
    pub score: f64,
    pub method: MatchMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationMatch {
    /// The code to analyse with: the city's when one matched, otherwise the state's.
    pub code: i64,
    pub matched_name: String,
    pub kind: LocationKind,
    pub score: f64,
    pub method: MatchMethod,
    pub state: MatchDetail,
    pub city: Option<MatchDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub suggestions: Vec<String>,
}

pub struct LocationResolver {
    cache: Arc<LocationCache>,
    threshold: f64,
}

impl LocationResolver {
    #[must_use]
    pub fn new(cache: Arc<LocationCache>) -> Self {
        Self {
            cache,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Resolves a state, and optionally a city within it, to a location code.
    ///
    /// An unmatched city degrades to the state-level code with a warning and
    /// city suggestions.
    ///
    /// # Errors
    ///
    /// [`LocationError::StateNotFound`] when no state scores above the
    /// threshold, or any error from loading the location table.
    pub async fn resolve(
        &self,
        state_query: &str,
        city_query: Option<&str>,
    ) -> Result<LocationMatch, LocationError> {
        let index = self.cache.get().await?;
        resolve_in(&index, state_query, city_query, self.threshold)
    }

    /// All known states, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns an error if the location table cannot be loaded.
    pub async fn states(&self) -> Result<Vec<LocationEntry>, LocationError> {
        Ok(self.cache.get().await?.states().to_vec())
    }

    /// Cities of the named state, alphabetically; empty for an unknown state.
    ///
    /// # Errors
    ///
    /// Returns an error if the location table cannot be loaded.
    pub async fn cities(&self, state: &str) -> Result<Vec<LocationEntry>, LocationError> {
        Ok(self.cache.get().await?.cities_named(state).to_vec())
    }
}

fn resolve_in(
    index: &LocationIndex,
    state_query: &str,
    city_query: Option<&str>,
    threshold: f64,
) -> Result<LocationMatch, LocationError> {
    let states = index.states();
    let Some(found) = fuzzy::best_match(states, state_query, threshold) else {
        let suggestions = fuzzy::suggestions(states, state_query);
        tracing::info!(query = state_query, ?suggestions, "no state match");
        return Err(LocationError::StateNotFound {
            query: state_query.to_string(),
            suggestions,
        });
    };
    let state = &states[found.index];
    let state_detail = detail(state_query, state, found);
    tracing::debug!(
        query = state_query,
        matched = %state.name,
        score = found.score,
        method = ?found.method,
        "state matched"
    );

    let state_level = |warning: Option<String>, suggestions: Vec<String>| LocationMatch {
        code: state.code,
        matched_name: state.name.clone(),
        kind: LocationKind::State,
        score: found.score,
        method: found.method,
        state: state_detail.clone(),
        city: None,
        warning,
        suggestions,
    };

    let Some(city_query) = city_query.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(state_level(None, Vec::new()));
    };

    let cities = index.cities_of(state.code);
    match fuzzy::best_match(cities, city_query, threshold) {
        Some(city_found) => {
            let city = &cities[city_found.index];
            Ok(LocationMatch {
                code: city.code,
                matched_name: city.name.clone(),
                kind: LocationKind::City,
                score: city_found.score,
                method: city_found.method,
                state: state_detail.clone(),
                city: Some(detail(city_query, city, city_found)),
                warning: None,
                suggestions: Vec::new(),
            })
        }
        None => {
            tracing::warn!(
                city = city_query,
                state = %state.name,
                "no city match, falling back to state"
            );
            Ok(state_level(
                Some(format!("City \"{city_query}\" not found in {}", state.name)),
                fuzzy::suggestions(cities, city_query),
            ))
        }
    }
}

fn detail(input: &str, entry: &LocationEntry, found: fuzzy::ScoredMatch) -> MatchDetail {
    MatchDetail {
        input_term: input.to_string(),
        matched_name: entry.name.clone(),
        code: entry.code,
        score: found.score,
        method: found.method,
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
