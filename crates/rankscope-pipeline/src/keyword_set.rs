//! Candidate keyword set: generated keywords plus what competitors rank for,
//! deduplicated and filtered for relevance.

use std::collections::HashSet;

use futures::future::join_all;

use rankscope_core::{AnalysisScope, RankedKeywordRecord};
use rankscope_dataforseo::SeoDataProvider;
use rankscope_llm::{filter_relevant_keywords, passthrough_filter, RelevanceContext, TextCompletion};

use crate::domain::{business_name, domain_from_url};

pub const DEFAULT_COMPETITOR_KEYWORD_LIMIT: u32 = 30;

pub struct KeywordSetInput<'a> {
    pub client_url: &'a str,
    pub business_type: &'a str,
    pub scope: AnalysisScope,
    pub location: &'a str,
    pub competitor_domains: &'a [String],
    pub generated: &'a [String],
    pub competitor_keyword_limit: u32,
    pub relevance_model: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    /// Deduplicated, relevance-filtered keywords in first-seen order.
    pub keywords: Vec<String>,
    /// Competitor ranked keywords merged by text, first-seen wins.
    pub ranked_keywords: Vec<RankedKeywordRecord>,
    pub competitor_failures: usize,
    /// Whether the relevance filter ran successfully (as opposed to passing
    /// the list through).
    pub filtered: bool,
}

/// Builds the keyword set for one analysis.
///
/// 1. Fetches ranked keywords for every competitor domain concurrently
/// 2. Logs and counts failed fetches, keeping the rest
/// 3. Merges competitor keywords by text
/// 4. Unions them with the generated keywords, case-insensitively deduplicated
/// 5. Runs the AI relevance filter, passing the list through unchanged when
///    the filter fails
pub async fn build_keywords(
    provider: &dyn SeoDataProvider,
    ai: &dyn TextCompletion,
    input: &KeywordSetInput<'_>,
) -> KeywordSet {
    let fetches = input.competitor_domains.iter().map(|domain| async move {
        let result = provider
            .ranked_keywords(domain, input.competitor_keyword_limit)
            .await;
        (domain, result)
    });

    let mut ranked_keywords: Vec<RankedKeywordRecord> = Vec::new();
    let mut seen_ranked = HashSet::new();
    let mut competitor_failures = 0usize;

    for (domain, result) in join_all(fetches).await {
        match result {
            Ok(records) => {
                tracing::debug!(domain = %domain, count = records.len(), "competitor ranked keywords");
                for record in records {
                    if seen_ranked.insert(record.keyword.clone()) {
                        ranked_keywords.push(record);
                    }
                }
            }
            Err(err) => {
                competitor_failures += 1;
                tracing::warn!(domain = %domain, error = %err, "competitor keyword fetch failed, skipping");
            }
        }
    }

    let combined = dedup_keywords(
        input
            .generated
            .iter()
            .map(String::as_str)
            .chain(ranked_keywords.iter().map(|r| r.keyword.as_str())),
    );
    tracing::info!(
        generated = input.generated.len(),
        from_competitors = ranked_keywords.len(),
        combined = combined.len(),
        "combined keyword candidates"
    );

    let domain = domain_from_url(input.client_url);
    let name = business_name(input.client_url);
    let ctx = RelevanceContext {
        business_type: input.business_type,
        domain: &domain,
        business_name: &name,
        scope: input.scope,
        location: input.location,
    };

    let (keywords, filtered) =
        match filter_relevant_keywords(ai, input.relevance_model, &combined, &ctx).await {
            Ok(kept) => (dedup_keywords(kept.iter().map(String::as_str)), true),
            Err(err) => {
                tracing::warn!(error = %err, "relevance filter failed, keeping all keywords");
                (passthrough_filter(&combined), false)
            }
        };

    KeywordSet {
        keywords,
        ranked_keywords,
        competitor_failures,
        filtered,
    }
}

/// Lowercased, trimmed, non-empty keywords, each once, in first-seen order.
#[must_use]
pub fn dedup_keywords<'a>(keywords: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .into_iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty() && seen.insert(k.clone()))
        .collect()
}
