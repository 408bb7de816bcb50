use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use rankscope_dataforseo::SerpItem;

use super::*;
use crate::test_support::{organic, FakeProvider, PENDING};

const CLIENT: &str = "https://www.acmeroofing.com/";
const LOCATION: i64 = 1_026_201;

fn settings(max_attempts: u32) -> RankingSettings {
    RankingSettings {
        top_n: 50,
        poll_max_attempts: max_attempts,
        volume_poll_delay_ms: 0,
        serp_poll_delay_ms: 0,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn numbered(count: usize) -> (Vec<String>, HashMap<String, u64>) {
    let keywords: Vec<String> = (1..=count).map(|i| format!("keyword {i}")).collect();
    let volumes = keywords
        .iter()
        .zip(1u64..)
        .map(|(k, v)| (k.clone(), v * 10))
        .collect();
    (keywords, volumes)
}

#[tokio::test]
async fn zero_volume_keywords_are_excluded_and_rest_sorted() {
    let provider = FakeProvider {
        volumes: HashMap::from([
            ("roof repair".to_string(), 100),
            ("roof painting".to_string(), 0),
            ("metal roofing".to_string(), 500),
        ]),
        ..FakeProvider::default()
    };
    let keywords = strings(&["roof repair", "roof painting", "metal roofing", "roof art"]);
    let input = RankingInput {
        keywords: &keywords,
        location_code: LOCATION,
        client_url: CLIENT,
        competitor_urls: &[],
    };

    let aggregate = aggregate(&provider, &input, &settings(3)).await.unwrap();

    let names: Vec<&str> = aggregate.entries.iter().map(|e| e.keyword.as_str()).collect();
    assert_eq!(names, vec!["metal roofing", "roof repair"]);
    assert!(aggregate.entries.iter().all(|e| e.search_volume > 0));
}

#[tokio::test]
async fn only_the_top_fifty_get_ranks() {
    let (keywords, volumes) = numbered(60);
    let serp = keywords
        .iter()
        .map(|k| (k.clone(), vec![organic(4, "acmeroofing.com")]))
        .collect();
    let provider = FakeProvider {
        volumes,
        serp,
        ..FakeProvider::default()
    };
    let input = RankingInput {
        keywords: &keywords,
        location_code: LOCATION,
        client_url: CLIENT,
        competitor_urls: &[],
    };

    let aggregate = aggregate(&provider, &input, &settings(3)).await.unwrap();

    let ranked = aggregate.entries.iter().filter(|e| e.client_rank.is_some()).count();
    let submitted = provider.submitted_serp_keywords();
    assert_eq!(aggregate.entries.len(), 60);
    assert_eq!(ranked, 50);
    assert_eq!(submitted.len(), 50);
    assert_eq!(aggregate.coverage.analyzed_keywords, 50);
    assert_eq!(aggregate.coverage.completed_tasks, 50);

    // The ten lowest volumes were never checked.
    assert!(aggregate.entries[50..].iter().all(|e| e.client_rank.is_none()));
    assert!(!submitted.contains(&"keyword 1".to_string()));
}

#[tokio::test]
async fn analysis_set_is_submitted_in_batches_of_fifty() {
    let (keywords, volumes) = numbered(75);
    let provider = FakeProvider {
        volumes,
        ..FakeProvider::default()
    };
    let input = RankingInput {
        keywords: &keywords,
        location_code: LOCATION,
        client_url: CLIENT,
        competitor_urls: &[],
    };
    let wide = RankingSettings {
        top_n: 75,
        ..settings(2)
    };

    aggregate(&provider, &input, &wide).await.unwrap();

    let batches: Vec<usize> = provider
        .submitted_serp
        .lock()
        .unwrap()
        .iter()
        .map(Vec::len)
        .collect();
    assert_eq!(batches, vec![50, 25]);
}

#[tokio::test]
async fn failed_serp_batch_is_skipped_and_later_batches_still_rank() {
    let (keywords, volumes) = numbered(75);
    let serp = keywords
        .iter()
        .map(|k| (k.clone(), vec![organic(4, "acmeroofing.com")]))
        .collect();
    let provider = FakeProvider {
        volumes,
        serp,
        failing_serp_batches: HashSet::from([0]),
        ..FakeProvider::default()
    };
    let input = RankingInput {
        keywords: &keywords,
        location_code: LOCATION,
        client_url: CLIENT,
        competitor_urls: &[],
    };
    let wide = RankingSettings {
        top_n: 75,
        ..settings(2)
    };

    let aggregate = aggregate(&provider, &input, &wide).await.unwrap();

    assert_eq!(aggregate.coverage.failed_batches, 1);
    assert_eq!(aggregate.coverage.submitted_tasks, 25);
    assert_eq!(aggregate.coverage.completed_tasks, 25);
    assert_eq!(aggregate.entries.len(), 75);
    // The fifty highest volumes went out in the failed batch.
    assert!(aggregate.entries[..50].iter().all(|e| e.client_rank.is_none()));
    assert!(aggregate.entries[50..].iter().all(|e| e.client_rank == Some(4)));
}

#[tokio::test]
async fn ranks_are_keyed_by_competitor_url() {
    let competitors = strings(&["https://roofco.com", "shingles.net"]);
    let provider = FakeProvider {
        volumes: HashMap::from([("roof repair".to_string(), 900)]),
        serp: HashMap::from([(
            "roof repair".to_string(),
            vec![
                organic(1, "roofco.com"),
                organic(2, "www.acmeroofing.com"),
                SerpItem {
                    item_type: "organic".to_string(),
                    rank_absolute: Some(6),
                    domain: Some("blog.example.com".to_string()),
                    url: Some("https://blog.example.com/shingles.net-review".to_string()),
                },
                organic(9, "acmeroofing.com"),
            ],
        )]),
        ..FakeProvider::default()
    };
    let keywords = strings(&["roof repair"]);
    let input = RankingInput {
        keywords: &keywords,
        location_code: LOCATION,
        client_url: CLIENT,
        competitor_urls: &competitors,
    };

    let aggregate = aggregate(&provider, &input, &settings(3)).await.unwrap();
    let entry = &aggregate.entries[0];

    assert_eq!(entry.client_rank, Some(2));
    assert_eq!(entry.competitor_ranks.get("https://roofco.com"), Some(&Some(1)));
    assert_eq!(entry.competitor_ranks.get("shingles.net"), Some(&Some(6)));
}

#[tokio::test]
async fn permanently_pending_serp_tasks_end_after_one_round() {
    let (keywords, volumes) = numbered(5);
    let provider = FakeProvider {
        volumes,
        serp_status: Some(PENDING),
        ..FakeProvider::default()
    };
    let competitors = strings(&["https://roofco.com"]);
    let input = RankingInput {
        keywords: &keywords,
        location_code: LOCATION,
        client_url: CLIENT,
        competitor_urls: &competitors,
    };
    let slow = RankingSettings {
        serp_poll_delay_ms: 60_000,
        ..settings(1)
    };

    let started = Instant::now();
    let aggregate = aggregate(&provider, &input, &slow).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(aggregate.entries.len(), 5);
    assert!(aggregate.entries.iter().all(|e| e.client_rank.is_none()));
    assert!(aggregate
        .entries
        .iter()
        .all(|e| e.competitor_ranks.values().all(Option::is_none)));
    assert_eq!(aggregate.coverage.submitted_tasks, 5);
    assert_eq!(aggregate.coverage.completed_tasks, 0);
}

#[tokio::test]
async fn unfinished_volume_task_leaves_nothing_to_rank() {
    let (keywords, volumes) = numbered(3);
    let provider = FakeProvider {
        volumes,
        volume_status: Some(PENDING),
        ..FakeProvider::default()
    };
    let input = RankingInput {
        keywords: &keywords,
        location_code: LOCATION,
        client_url: CLIENT,
        competitor_urls: &[],
    };

    let aggregate = aggregate(&provider, &input, &settings(1)).await.unwrap();

    assert!(aggregate.entries.is_empty());
    assert!(provider.submitted_serp_keywords().is_empty());
}

#[tokio::test]
async fn volume_submission_failure_is_an_error() {
    let provider = FakeProvider {
        volume_post_fails: true,
        ..FakeProvider::default()
    };
    let keywords = strings(&["roof repair"]);
    let input = RankingInput {
        keywords: &keywords,
        location_code: LOCATION,
        client_url: CLIENT,
        competitor_urls: &[],
    };

    let err = aggregate(&provider, &input, &settings(1)).await.unwrap_err();
    assert!(matches!(err, DataForSeoError::Status { status: 500, .. }));
}

#[test]
fn domain_keeps_its_best_position() {
    let domains = strings(&["acmeroofing.com"]);
    let mut rankings = DomainRanking::new();
    let result = SerpResult {
        keyword: "Roof Repair".to_string(),
        items: vec![
            SerpItem {
                item_type: "local_pack".to_string(),
                rank_absolute: Some(1),
                domain: Some("acmeroofing.com".to_string()),
                url: None,
            },
            organic(3, "acmeroofing.com"),
            organic(7, "acmeroofing.com"),
        ],
    };

    record_positions(&mut rankings, &domains, &result);

    assert_eq!(rankings["acmeroofing.com"]["roof repair"], Some(3));
}

#[test]
fn unseen_domain_is_recorded_as_none() {
    let domains = strings(&["acmeroofing.com", "roofco.com"]);
    let mut rankings = DomainRanking::new();
    let result = SerpResult {
        keyword: "roof repair".to_string(),
        items: vec![organic(3, "acmeroofing.com")],
    };

    record_positions(&mut rankings, &domains, &result);

    assert_eq!(rankings["roofco.com"]["roof repair"], None);
}
