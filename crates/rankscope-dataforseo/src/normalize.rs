//! Normalization of DataForSEO result items into rankscope domain records.

use std::collections::HashSet;

use rankscope_core::{KeywordRecord, RankedKeywordRecord};

use crate::types::{RankedKeywordItem, SearchVolumeItem};

/// Parses the provider's `competition` field.
///
/// The Google Ads endpoints report either a 0..1 number or a label; labels
/// fall back to `competition_index` (0..100) scaled to 0..1.
#[must_use]
pub fn parse_competition(item: &SearchVolumeItem) -> Option<f64> {
    match &item.competition {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        _ => item.competition_index.map(|idx| idx / 100.0),
    }
}

/// Converts search-volume items into one [`KeywordRecord`] per requested keyword.
///
/// Keywords the provider did not report come back with volume 0 so that the
/// output always covers the full request. Matching is case-insensitive and
/// each keyword appears at most once.
#[must_use]
pub fn keyword_records(items: &[SearchVolumeItem], requested: &[String]) -> Vec<KeywordRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(requested.len().max(items.len()));

    for item in items {
        let key = item.keyword.trim().to_lowercase();
        if key.is_empty() || !seen.insert(key.clone()) {
            continue;
        }
        records.push(KeywordRecord {
            keyword: key,
            search_volume: item.search_volume.unwrap_or(0),
            cpc: item.cpc,
            competition: parse_competition(item),
        });
    }

    for keyword in requested {
        let key = keyword.trim().to_lowercase();
        if key.is_empty() || !seen.insert(key.clone()) {
            continue;
        }
        records.push(KeywordRecord {
            keyword: key,
            search_volume: 0,
            cpc: None,
            competition: None,
        });
    }

    records
}

/// Flattens ranked-keyword items. Items without keyword text are dropped.
#[must_use]
pub fn ranked_keyword_records(items: Vec<RankedKeywordItem>) -> Vec<RankedKeywordRecord> {
    items
        .into_iter()
        .filter_map(|item| {
            let data = item.keyword_data?;
            let keyword = data.keyword.trim().to_lowercase();
            if keyword.is_empty() {
                return None;
            }
            let info = data.keyword_info;
            let element = item.ranked_serp_element;
            let serp_item = element.as_ref().and_then(|e| e.serp_item.as_ref());

            Some(RankedKeywordRecord {
                keyword,
                search_volume: info.as_ref().and_then(|i| i.search_volume).unwrap_or(0),
                cpc: info.as_ref().and_then(|i| i.cpc),
                rank: serp_item.and_then(|s| s.rank_absolute).unwrap_or(0),
                url: serp_item.and_then(|s| s.url.clone()).unwrap_or_default(),
                domain: serp_item.and_then(|s| s.domain.clone()).unwrap_or_default(),
                keyword_difficulty: element
                    .as_ref()
                    .and_then(|e| e.keyword_difficulty)
                    .unwrap_or(0.0),
            })
        })
        .collect()
}
