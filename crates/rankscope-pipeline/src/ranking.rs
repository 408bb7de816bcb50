//! Search volumes and SERP positions for the keyword set.

use std::collections::{BTreeMap, HashSet};

use rankscope_core::{CombinedKeywordEntry, KeywordRecord, RankingCoverage};
use rankscope_dataforseo::normalize::keyword_records;
use rankscope_dataforseo::{poll_for_results, DataForSeoError, PollPolicy, SeoDataProvider, SerpResult};

use crate::domain::{domain_from_url, normalize_domain};

/// Provider limit on keywords per SERP submission.
pub const SERP_BATCH_SIZE: usize = 50;

/// Observed positions: domain → keyword → best rank.
pub type DomainRanking = BTreeMap<String, BTreeMap<String, Option<u32>>>;

#[derive(Debug, Clone, Copy)]
pub struct RankingSettings {
    /// How many of the highest-volume keywords get SERP checks.
    pub top_n: usize,
    pub poll_max_attempts: u32,
    pub volume_poll_delay_ms: u64,
    pub serp_poll_delay_ms: u64,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            top_n: 50,
            poll_max_attempts: 20,
            volume_poll_delay_ms: 3_000,
            serp_poll_delay_ms: 10_000,
        }
    }
}

pub struct RankingInput<'a> {
    pub keywords: &'a [String],
    pub location_code: i64,
    pub client_url: &'a str,
    /// Competitor URLs as supplied; `competitorRanks` is keyed by these.
    pub competitor_urls: &'a [String],
}

#[derive(Debug, Clone, Default)]
pub struct RankingAggregate {
    /// Keywords with volume > 0, highest volume first.
    pub entries: Vec<CombinedKeywordEntry>,
    pub coverage: RankingCoverage,
}

/// Fetches volumes for every keyword and positions for the top-volume subset.
///
/// 1. Submits one search-volume task and polls it; keywords without a
///    reported volume count as 0
/// 2. Drops zero-volume keywords and sorts the rest by volume (stable)
/// 3. Submits SERP tasks for the top `settings.top_n` in batches of 50 and
///    records the first position of the client and each competitor
/// 4. Keywords outside that subset keep `None` ranks
///
/// A failing SERP batch is logged and skipped.
///
/// # Errors
///
/// Returns the gateway error when the search-volume task cannot be submitted.
pub async fn aggregate(
    provider: &dyn SeoDataProvider,
    input: &RankingInput<'_>,
    settings: &RankingSettings,
) -> Result<RankingAggregate, DataForSeoError> {
    if input.keywords.is_empty() {
        tracing::warn!("no keywords to aggregate");
        return Ok(RankingAggregate::default());
    }

    let volumes = fetch_volumes(provider, input, settings).await?;

    let total = volumes.len();
    let mut with_volume: Vec<KeywordRecord> =
        volumes.into_iter().filter(|r| r.search_volume > 0).collect();
    with_volume.sort_by(|a, b| b.search_volume.cmp(&a.search_volume));
    tracing::info!(
        dropped = total - with_volume.len(),
        kept = with_volume.len(),
        "filtered zero-volume keywords"
    );

    let analysis_set: Vec<String> = with_volume
        .iter()
        .take(settings.top_n)
        .map(|r| r.keyword.clone())
        .collect();

    let client_domain = domain_from_url(input.client_url);
    let competitor_domains: Vec<String> =
        input.competitor_urls.iter().map(|u| domain_from_url(u)).collect();
    let mut domains = Vec::with_capacity(competitor_domains.len() + 1);
    domains.push(client_domain.clone());
    domains.extend(competitor_domains.iter().cloned());

    let mut coverage = RankingCoverage {
        analyzed_keywords: analysis_set.len(),
        ..RankingCoverage::default()
    };
    let rankings =
        fetch_rankings(provider, &analysis_set, &domains, input.location_code, settings, &mut coverage)
            .await;

    let in_analysis: HashSet<&str> = analysis_set.iter().map(String::as_str).collect();
    let rank_of = |domain: &str, keyword: &str| -> Option<u32> {
        if !in_analysis.contains(keyword) {
            return None;
        }
        rankings.get(domain).and_then(|m| m.get(keyword)).copied().flatten()
    };

    let entries = with_volume
        .into_iter()
        .map(|record| {
            let competitor_ranks = input
                .competitor_urls
                .iter()
                .zip(&competitor_domains)
                .map(|(url, domain)| (url.clone(), rank_of(domain, &record.keyword)))
                .collect();
            CombinedKeywordEntry {
                client_rank: rank_of(&client_domain, &record.keyword),
                competitor_ranks,
                search_volume: record.search_volume,
                keyword: record.keyword,
            }
        })
        .collect();

    Ok(RankingAggregate { entries, coverage })
}

async fn fetch_volumes(
    provider: &dyn SeoDataProvider,
    input: &RankingInput<'_>,
    settings: &RankingSettings,
) -> Result<Vec<KeywordRecord>, DataForSeoError> {
    let task_id = provider
        .post_search_volume_task(input.keywords, input.location_code)
        .await?;
    tracing::info!(task_id = %task_id, keywords = input.keywords.len(), "search volume task submitted");

    let policy = PollPolicy::new(settings.poll_max_attempts, settings.volume_poll_delay_ms);
    let outcome = poll_for_results(&[task_id], &policy, |id| async move {
        provider.get_search_volume_task(&id).await
    })
    .await;

    if !outcome.is_complete() {
        tracing::warn!(
            failed = outcome.failed.len(),
            pending = outcome.pending.len(),
            "search volume task did not complete, volumes default to 0"
        );
    }

    let items: Vec<_> = outcome
        .completed
        .into_iter()
        .flat_map(|task| task.result)
        .collect();
    Ok(keyword_records(&items, input.keywords))
}

async fn fetch_rankings(
    provider: &dyn SeoDataProvider,
    keywords: &[String],
    domains: &[String],
    location_code: i64,
    settings: &RankingSettings,
    coverage: &mut RankingCoverage,
) -> DomainRanking {
    let mut rankings: DomainRanking = domains
        .iter()
        .map(|d| (d.clone(), BTreeMap::new()))
        .collect();
    let policy = PollPolicy::new(settings.poll_max_attempts, settings.serp_poll_delay_ms);

    for (batch_no, batch) in keywords.chunks(SERP_BATCH_SIZE).enumerate() {
        let task_ids = match provider.post_serp_tasks(batch, location_code).await {
            Ok(ids) => ids,
            Err(err) => {
                coverage.failed_batches += 1;
                tracing::warn!(batch = batch_no, size = batch.len(), error = %err, "SERP batch failed, skipping");
                continue;
            }
        };
        coverage.submitted_tasks += task_ids.len();

        let outcome = poll_for_results(&task_ids, &policy, |id| async move {
            provider.get_serp_task(&id).await
        })
        .await;
        coverage.completed_tasks += outcome.completed.len();
        tracing::info!(
            batch = batch_no,
            submitted = task_ids.len(),
            completed = outcome.completed.len(),
            failed = outcome.failed.len(),
            pending = outcome.pending.len(),
            "SERP batch polled"
        );

        for task in &outcome.completed {
            for result in &task.result {
                record_positions(&mut rankings, domains, result);
            }
        }
    }

    rankings
}

/// Records, per domain, the first organic position in `result`.
///
/// An item belongs to the first domain (client first) whose name equals the
/// item's domain or appears in its URL.
pub fn record_positions(rankings: &mut DomainRanking, domains: &[String], result: &SerpResult) {
    let keyword = result.keyword.trim().to_lowercase();
    for domain in domains {
        rankings
            .entry(domain.clone())
            .or_default()
            .entry(keyword.clone())
            .or_insert(None);
    }

    for item in result.items.iter().filter(|i| i.is_organic()) {
        let Some(rank) = item.rank_absolute else { continue };
        let item_domain = item.domain.as_deref().map(normalize_domain);
        let item_url = item.url.as_deref().unwrap_or_default();

        let owner = domains.iter().find(|domain| {
            item_domain.as_deref() == Some(domain.as_str()) || item_url.contains(domain.as_str())
        });
        if let Some(domain) = owner {
            if let Some(slot) = rankings.get_mut(domain).and_then(|m| m.get_mut(&keyword)) {
                if slot.is_none() {
                    *slot = Some(rank);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "ranking_test.rs"]
mod tests;
