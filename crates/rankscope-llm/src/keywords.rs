//! Candidate keyword generation.
//!
//! The AI service is asked for a comma-separated list of commercial-intent
//! keywords. When the call fails or yields fewer than [`MIN_AI_KEYWORDS`]
//! usable entries, [`fallback_keywords`] builds a deterministic list from a
//! small business-type keyword map and scope-specific modifiers.

use std::collections::HashSet;

use rankscope_core::AnalysisScope;

use crate::client::{CompletionRequest, TextCompletion};

pub const MIN_AI_KEYWORDS: usize = 10;
pub const MAX_KEYWORDS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordSource {
    Ai,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKeywords {
    pub keywords: Vec<String>,
    pub source: KeywordSource,
}

const KEYWORD_MAP: &[(&str, [&str; 10])] = &[
    (
        "roofing",
        [
            "roof repair",
            "roof replacement",
            "roofing company",
            "roofing contractor",
            "roof installation",
            "roof inspection",
            "metal roofing",
            "shingle roof",
            "commercial roofing",
            "residential roofing",
        ],
    ),
    (
        "plumbing",
        [
            "plumber",
            "plumbing services",
            "plumbing repair",
            "emergency plumber",
            "water heater installation",
            "drain cleaning",
            "pipe repair",
            "bathroom plumbing",
            "kitchen plumbing",
            "commercial plumbing",
        ],
    ),
    (
        "home improvement",
        [
            "home renovation",
            "kitchen remodeling",
            "bathroom remodeling",
            "home remodeling",
            "home addition",
            "basement finishing",
            "deck building",
            "interior painting",
            "exterior painting",
            "flooring installation",
        ],
    ),
    (
        "dental",
        [
            "dentist",
            "dental clinic",
            "dental care",
            "teeth cleaning",
            "tooth extraction",
            "dental implants",
            "cosmetic dentistry",
            "emergency dentist",
            "family dentist",
            "pediatric dentist",
        ],
    ),
    (
        "legal",
        [
            "lawyer",
            "attorney",
            "law firm",
            "legal services",
            "personal injury lawyer",
            "family lawyer",
            "criminal defense attorney",
            "divorce lawyer",
            "estate planning",
            "business lawyer",
        ],
    ),
];

const LONG_TAIL_PREFIXES: &[&str] = &[
    "best",
    "top",
    "affordable",
    "professional",
    "experienced",
    "trusted",
    "licensed",
    "emergency",
];

const NATIONAL_LONG_TAIL_PREFIXES: &[&str] = &["nationwide", "online", "remote", "USA", "American"];

/// Generates up to [`MAX_KEYWORDS`] candidate keywords for the business.
///
/// Never fails: any AI problem is logged and answered with [`fallback_keywords`].
pub async fn generate_keywords(
    ai: &dyn TextCompletion,
    model: &str,
    business_type: &str,
    location: &str,
    scope: AnalysisScope,
) -> GeneratedKeywords {
    let request = keyword_prompt(model, business_type, location, scope);

    match ai.complete(&request).await {
        Ok(raw) => {
            let keywords = parse_keyword_list(&raw);
            if keywords.len() >= MIN_AI_KEYWORDS {
                tracing::info!(count = keywords.len(), "generated keywords with AI");
                return GeneratedKeywords {
                    keywords,
                    source: KeywordSource::Ai,
                };
            }
            tracing::warn!(
                count = keywords.len(),
                "AI keyword generation returned too few keywords, using fallback list"
            );
        }
        Err(err) => {
            tracing::warn!(error = %err, "AI keyword generation failed, using fallback list");
        }
    }

    GeneratedKeywords {
        keywords: fallback_keywords(business_type, location, scope),
        source: KeywordSource::Fallback,
    }
}

fn keyword_prompt(
    model: &str,
    business_type: &str,
    location: &str,
    scope: AnalysisScope,
) -> CompletionRequest {
    let system = "You are an SEO keyword researcher generating conversion-focused keywords \
for an SEO opportunity calculator.\n\n\
Return exactly 50 keywords as ONE comma-separated list with no other text.\n\
Rules:\n\
- lowercase, natural spacing (\"roof repair chicago\", not \"RoofRepairChicago\")\n\
- mix: 20 high-intent buyer phrases, 15 problem/solution phrases, 10 comparison or \
price phrases, 5 informational phrases that lead to conversions\n\
- local analysis: put a location modifier in about 80% of keywords\n\
- national analysis: broader terms with industry qualifiers\n\
- 2 to 5 words each, favour 3-word phrases\n\
- each keyword 3 to 60 characters\n\
- no keyword stuffing, no overly generic terms"
        .to_string();

    let target = match scope {
        AnalysisScope::Local => format!("in {location}"),
        AnalysisScope::National => "across the United States".to_string(),
    };
    let user = format!(
        "Generate 50 high-converting SEO keywords for a {business_type} business {target}. \
Focus on what customers type when they are ready to buy or hire."
    );

    CompletionRequest {
        model: model.to_string(),
        system,
        user,
        temperature: 0.5,
        max_tokens: None,
        json_mode: false,
    }
}

/// Splits a comma-separated answer into normalized keywords.
///
/// Entries are trimmed of whitespace and quotes, lowercased, kept only when
/// 3 to 59 characters long, deduplicated, and capped at [`MAX_KEYWORDS`].
#[must_use]
pub fn parse_keyword_list(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split([',', '\n'])
        .map(|k| {
            k.trim()
                .trim_matches(|c: char| c == '"' || c == '\'')
                .trim()
                .to_lowercase()
        })
        .filter(|k| (3..60).contains(&k.chars().count()))
        .filter(|k| seen.insert(k.clone()))
        .take(MAX_KEYWORDS)
        .collect()
}

/// Deterministic keyword list for when the AI service is unavailable.
///
/// Base keywords come from the business-type map (exact key, then the first
/// key contained in the business type, then generic `<type> services`-style
/// phrases). They are combined with scope modifiers, then long-tail prefixes
/// on the first three base keywords, then a few scope-specific extras.
/// The result is lowercased, deduplicated and capped at [`MAX_KEYWORDS`].
#[must_use]
pub fn fallback_keywords(business_type: &str, location: &str, scope: AnalysisScope) -> Vec<String> {
    let bt = business_type.trim();
    let loc = location.trim();
    let base = base_keywords(bt);

    let modifiers: Vec<String> = match scope {
        AnalysisScope::Local => vec![
            format!("in {loc}"),
            loc.to_string(),
            "near me".to_string(),
            format!("best in {loc}"),
            format!("top rated {loc}"),
            format!("affordable in {loc}"),
            format!("{loc} area"),
        ],
        AnalysisScope::National => [
            "",
            "in USA",
            "nationwide",
            "best in America",
            "top rated",
            "professional",
            "affordable",
            "near me",
            "online",
        ]
        .iter()
        .map(|m| (*m).to_string())
        .collect(),
    };

    let mut keywords = Vec::new();
    for b in &base {
        for modifier in &modifiers {
            if modifier.is_empty() {
                keywords.push(b.clone());
            } else {
                keywords.push(format!("{b} {modifier}"));
            }
        }
    }

    let extra_prefixes: &[&str] = match scope {
        AnalysisScope::Local => &[],
        AnalysisScope::National => NATIONAL_LONG_TAIL_PREFIXES,
    };
    for prefix in LONG_TAIL_PREFIXES.iter().chain(extra_prefixes) {
        for b in base.iter().take(3) {
            match scope {
                AnalysisScope::Local => keywords.push(format!("{prefix} {b} in {loc}")),
                AnalysisScope::National => {
                    keywords.push(format!("{prefix} {b}"));
                    if !matches!(*prefix, "nationwide" | "online" | "USA") {
                        keywords.push(format!("{prefix} {b} in USA"));
                    }
                }
            }
        }
    }

    match scope {
        AnalysisScope::Local => keywords.extend([
            format!("{bt} near me"),
            format!("best {bt} in {loc}"),
            format!("{loc} {bt} company"),
            format!("{bt} services {loc}"),
            format!("local {bt} {loc}"),
            format!("{bt} contractor {loc}"),
        ]),
        AnalysisScope::National => keywords.extend([
            format!("{bt} company USA"),
            format!("nationwide {bt} services"),
            format!("best {bt} company in America"),
            format!("top rated {bt} services"),
            format!("professional {bt} nationwide"),
            format!("{bt} franchise opportunities"),
        ]),
    }

    let mut seen = HashSet::new();
    keywords
        .into_iter()
        .map(|k| k.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
        .filter(|k| !k.is_empty() && seen.insert(k.clone()))
        .take(MAX_KEYWORDS)
        .collect()
}

fn base_keywords(business_type: &str) -> Vec<String> {
    let lower = business_type.to_lowercase();
    let mapped = KEYWORD_MAP
        .iter()
        .find(|(key, _)| *key == lower)
        .or_else(|| KEYWORD_MAP.iter().find(|(key, _)| lower.contains(key)));

    if let Some((_, list)) = mapped {
        return list.iter().map(|k| (*k).to_string()).collect();
    }

    let bt = business_type;
    vec![
        format!("{bt} services"),
        format!("{bt} company"),
        format!("{bt} near me"),
        format!("best {bt}"),
        format!("affordable {bt}"),
        format!("local {bt}"),
        format!("{bt} prices"),
        format!("{bt} cost"),
        format!("{bt} quotes"),
        format!("professional {bt}"),
    ]
}
