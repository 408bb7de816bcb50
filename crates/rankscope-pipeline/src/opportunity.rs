//! Traffic, customer and revenue estimates from the aggregated keyword data.

use chrono::Utc;

use rankscope_core::{
    AnalysisInsights, AnalysisScope, CombinedKeywordEntry, Competitor, CompetitorRanking,
    RankingBuckets, RankingCoverage, Report,
};
use rankscope_llm::ConversionEstimate;

pub const LOCAL_CTR: f64 = 0.35;
pub const NATIONAL_CTR: f64 = 0.30;
/// Stand-in position for "not ranked" when bucketing.
const UNRANKED: u32 = 101;

const LOCAL_ACTIONS: &[&str] = &[
    "Optimize Google Business Profile",
    "Build local citations",
    "Get more customer reviews",
    "Create location-specific content",
    "Optimize for 'near me' searches",
];

const NATIONAL_ACTIONS: &[&str] = &[
    "Create comprehensive content for high-volume keywords",
    "Build a strong backlink profile",
    "Improve technical SEO",
    "Optimize for featured snippets",
    "Develop a content calendar for consistent publishing",
];

#[must_use]
pub fn click_through_rate(scope: AnalysisScope) -> f64 {
    match scope {
        AnalysisScope::Local => LOCAL_CTR,
        AnalysisScope::National => NATIONAL_CTR,
    }
}

/// Builds the report. Pure apart from the creation timestamp.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn compute(
    entries: Vec<CombinedKeywordEntry>,
    competitors: &[Competitor],
    customer_value: f64,
    conversion: ConversionEstimate,
    scope: AnalysisScope,
    coverage: RankingCoverage,
) -> Report {
    let total_search_volume: u64 = entries.iter().map(|e| e.search_volume).sum();
    let potential_traffic = (total_search_volume as f64 * click_through_rate(scope)).floor() as u64;
    let potential_customers = (potential_traffic as f64 * conversion.rate / 100.0).floor() as u64;
    let potential_revenue = potential_customers as f64 * customer_value;

    let current_rankings = buckets(entries.iter().map(|e| e.client_rank));
    let competitor_rankings = competitors
        .iter()
        .map(|c| CompetitorRanking {
            name: c.name.clone(),
            url: c.url.clone(),
            source: c.source,
            buckets: buckets(
                entries
                    .iter()
                    .map(|e| e.competitor_ranks.get(&c.url).copied().flatten()),
            ),
        })
        .collect();

    let analysis_insights = match scope {
        AnalysisScope::Local => local_insights(&entries, &current_rankings),
        AnalysisScope::National => national_insights(&entries, &current_rankings),
    };

    tracing::info!(
        total_search_volume,
        potential_traffic,
        conversion_rate = conversion.rate,
        potential_customers,
        potential_revenue,
        "opportunity computed"
    );

    Report {
        total_search_volume,
        potential_traffic,
        conversion_rate: conversion.rate,
        conversion_rate_source: conversion.source,
        potential_customers,
        potential_revenue,
        current_rankings,
        competitor_rankings,
        analysis_scope: scope,
        analysis_insights,
        keyword_data: entries,
        ranking_coverage: coverage,
        created_at: Utc::now(),
    }
}

/// Cumulative position buckets; `None` counts toward `total` only.
#[must_use]
pub fn buckets(ranks: impl Iterator<Item = Option<u32>>) -> RankingBuckets {
    let mut out = RankingBuckets::default();
    for rank in ranks {
        out.total += 1;
        let rank = rank.unwrap_or(UNRANKED);
        if rank <= 3 {
            out.top3 += 1;
        }
        if rank <= 10 {
            out.top10 += 1;
        }
        if rank <= 50 {
            out.top50 += 1;
        }
        if rank <= 100 {
            out.top100 += 1;
        }
    }
    out
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn share(count: usize, fraction: f64) -> usize {
    (count as f64 * fraction).floor() as usize
}

fn actions(list: &[&str]) -> Vec<String> {
    list.iter().map(|a| (*a).to_string()).collect()
}

fn local_insights(entries: &[CombinedKeywordEntry], current: &RankingBuckets) -> AnalysisInsights {
    let near_me = entries
        .iter()
        .filter(|e| e.keyword.to_lowercase().contains("near me"))
        .count();
    let near_me_searches = if near_me == 0 {
        share(entries.len(), 0.3)
    } else {
        near_me
    };

    AnalysisInsights::Local {
        local_pack_opportunities: share(entries.len(), 0.4),
        google_maps_ranking_factor: if near_me_searches > 10 { "High" } else { "Medium" }.to_string(),
        near_me_searches,
        local_competitor_strength: if current.top10 < 10 { "Low" } else { "High" }.to_string(),
        recommended_actions: actions(LOCAL_ACTIONS),
    }
}

fn national_insights(entries: &[CombinedKeywordEntry], current: &RankingBuckets) -> AnalysisInsights {
    let content_gaps = entries
        .iter()
        .filter(|e| {
            let client_ranked = e.client_rank.is_some_and(|r| r <= 100);
            let competitor_ranked = e
                .competitor_ranks
                .values()
                .any(|r| r.is_some_and(|r| r <= 100));
            competitor_ranked && !client_ranked
        })
        .count();

    AnalysisInsights::National {
        competitive_difficulty: if current.top10 < 15 { "High" } else { "Medium" }.to_string(),
        content_gaps,
        backlink_opportunities: share(entries.len(), 0.4),
        recommended_actions: actions(NATIONAL_ACTIONS),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rankscope_core::{CompetitorDetails, CompetitorSource, ConversionRateSource};

    use super::*;

    fn entry(keyword: &str, volume: u64, client: Option<u32>, competitor: Option<u32>) -> CombinedKeywordEntry {
        CombinedKeywordEntry {
            keyword: keyword.to_string(),
            search_volume: volume,
            client_rank: client,
            competitor_ranks: BTreeMap::from([("https://roofco.com".to_string(), competitor)]),
        }
    }

    fn rival() -> Competitor {
        Competitor {
            name: "roofco.com".to_string(),
            url: "https://roofco.com".to_string(),
            source: CompetitorSource::UserProvided,
            details: CompetitorDetails::None,
        }
    }

    fn ai_rate(rate: f64) -> ConversionEstimate {
        ConversionEstimate {
            rate,
            source: ConversionRateSource::AiEstimate,
        }
    }

    #[test]
    fn revenue_arithmetic_for_local_scope() {
        let entries = vec![entry("roof repair", 6_000, None, None), entry("roofer", 4_000, None, None)];
        let report = compute(entries, &[], 200.0, ai_rate(5.0), AnalysisScope::Local, RankingCoverage::default());

        assert_eq!(report.total_search_volume, 10_000);
        assert_eq!(report.potential_traffic, 3_500);
        assert_eq!(report.potential_customers, 175);
        assert!((report.potential_revenue - 35_000.0).abs() < f64::EPSILON);
        assert_eq!(report.conversion_rate_source, ConversionRateSource::AiEstimate);
    }

    #[test]
    fn national_scope_uses_lower_ctr_and_floors() {
        let entries = vec![entry("roof repair", 1_001, None, None)];
        let report = compute(entries, &[], 10.0, ai_rate(2.5), AnalysisScope::National, RankingCoverage::default());

        assert_eq!(report.potential_traffic, 300);
        assert_eq!(report.potential_customers, 7);
        assert!((report.potential_revenue - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn buckets_are_cumulative_and_monotonic() {
        let ranks = [Some(1), Some(3), Some(4), Some(10), Some(11), Some(50), Some(99), Some(100), None, Some(101)];
        let b = buckets(ranks.into_iter());

        assert_eq!(b.top3, 2);
        assert_eq!(b.top10, 4);
        assert_eq!(b.top50, 6);
        assert_eq!(b.top100, 8);
        assert_eq!(b.total, 10);
        assert!(b.top3 <= b.top10 && b.top10 <= b.top50 && b.top50 <= b.top100 && b.top100 <= b.total);
    }

    #[test]
    fn bucket_monotonicity_holds_for_many_distributions() {
        for seed in 0u32..200 {
            let ranks: Vec<Option<u32>> = (0..40)
                .map(|i| {
                    let v = (seed.wrapping_mul(31).wrapping_add(i * 17)) % 130;
                    (v != 0 && v <= 120).then_some(v)
                })
                .collect();
            let b = buckets(ranks.into_iter());
            assert!(b.top3 <= b.top10);
            assert!(b.top10 <= b.top50);
            assert!(b.top50 <= b.top100);
            assert!(b.top100 <= b.total);
        }
    }

    #[test]
    fn competitor_buckets_use_their_own_ranks() {
        let entries = vec![
            entry("roof repair", 100, Some(12), Some(2)),
            entry("roofer", 100, None, Some(40)),
        ];
        let report = compute(entries, &[rival()], 100.0, ai_rate(3.0), AnalysisScope::Local, RankingCoverage::default());

        let rival_buckets = report.competitor_rankings[0].buckets;
        assert_eq!(rival_buckets.top3, 1);
        assert_eq!(rival_buckets.top50, 2);
        assert_eq!(report.current_rankings.top50, 1);
        assert_eq!(report.current_rankings.top3, 0);
    }

    #[test]
    fn local_insights_fall_back_when_no_near_me_keywords() {
        let entries: Vec<_> = (0..10).map(|i| entry(&format!("roof {i}"), 10, None, None)).collect();
        let report = compute(entries, &[], 1.0, ai_rate(1.0), AnalysisScope::Local, RankingCoverage::default());

        let AnalysisInsights::Local {
            local_pack_opportunities,
            near_me_searches,
            google_maps_ranking_factor,
            local_competitor_strength,
            recommended_actions,
        } = report.analysis_insights
        else {
            panic!("expected local insights");
        };
        assert_eq!(local_pack_opportunities, 4);
        assert_eq!(near_me_searches, 3);
        assert_eq!(google_maps_ranking_factor, "Medium");
        assert_eq!(local_competitor_strength, "Low");
        assert_eq!(recommended_actions.len(), 5);
    }

    #[test]
    fn local_insights_count_near_me_keywords() {
        let entries: Vec<_> = (0..12)
            .map(|i| entry(&format!("roofer near me {i}"), 10, Some(1), None))
            .collect();
        let report = compute(entries, &[], 1.0, ai_rate(1.0), AnalysisScope::Local, RankingCoverage::default());

        let AnalysisInsights::Local {
            near_me_searches,
            google_maps_ranking_factor,
            local_competitor_strength,
            ..
        } = report.analysis_insights
        else {
            panic!("expected local insights");
        };
        assert_eq!(near_me_searches, 12);
        assert_eq!(google_maps_ranking_factor, "High");
        assert_eq!(local_competitor_strength, "High");
    }

    #[test]
    fn national_content_gaps_need_a_ranking_competitor() {
        let entries = vec![
            entry("roof repair", 100, None, Some(5)),
            entry("roofer", 100, Some(3), Some(8)),
            entry("roof tiles", 100, None, None),
        ];
        let report = compute(entries, &[rival()], 1.0, ai_rate(1.0), AnalysisScope::National, RankingCoverage::default());

        let AnalysisInsights::National {
            content_gaps,
            competitive_difficulty,
            backlink_opportunities,
            ..
        } = report.analysis_insights
        else {
            panic!("expected national insights");
        };
        assert_eq!(content_gaps, 1);
        assert_eq!(competitive_difficulty, "High");
        assert_eq!(backlink_opportunities, 1);
    }
}
