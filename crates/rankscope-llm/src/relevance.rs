//! AI relevance filter for candidate keywords.

use std::collections::HashSet;

use serde::Deserialize;

use rankscope_core::AnalysisScope;

use crate::client::{CompletionRequest, TextCompletion};
use crate::error::RelevanceFilterError;

/// What the filter knows about the business it is filtering for.
#[derive(Debug, Clone, Copy)]
pub struct RelevanceContext<'a> {
    pub business_type: &'a str,
    pub domain: &'a str,
    pub business_name: &'a str,
    pub scope: AnalysisScope,
    pub location: &'a str,
}

#[derive(Deserialize)]
struct FilterResponse {
    keywords: Option<Vec<serde_json::Value>>,
}

/// Asks the AI service which of `keywords` are relevant to the business.
///
/// The answer is restricted to keywords present in the input and returned in
/// input order.
///
/// # Errors
///
/// Returns a [`RelevanceFilterError`] when the call fails, the answer is not
/// a `{"keywords": [...]}` object, or a non-empty input was filtered down to
/// nothing. Callers recover with [`passthrough_filter`].
pub async fn filter_relevant_keywords(
    ai: &dyn TextCompletion,
    model: &str,
    keywords: &[String],
    ctx: &RelevanceContext<'_>,
) -> Result<Vec<String>, RelevanceFilterError> {
    if keywords.is_empty() {
        return Ok(Vec::new());
    }

    let request = filter_prompt(model, keywords, ctx);
    let raw = ai.complete(&request).await?;
    let kept = parse_relevance_response(&raw, keywords)?;

    tracing::info!(
        input = keywords.len(),
        kept = kept.len(),
        removed = keywords.len() - kept.len(),
        "filtered keywords for relevance"
    );
    Ok(kept)
}

/// Fail-open result of the relevance filter: every input keyword, unchanged.
#[must_use]
pub fn passthrough_filter(keywords: &[String]) -> Vec<String> {
    keywords.to_vec()
}

/// Parses `{"keywords": [...]}` and keeps the input keywords it names.
///
/// Comparison is case-insensitive and whitespace-trimmed. Entries the model
/// invented, and non-string entries, are ignored.
///
/// # Errors
///
/// [`RelevanceFilterError::Malformed`] for anything other than an object with
/// a `keywords` array; [`RelevanceFilterError::EmptySelection`] when nothing
/// of a non-empty input survives.
pub fn parse_relevance_response(
    raw: &str,
    input: &[String],
) -> Result<Vec<String>, RelevanceFilterError> {
    let parsed: FilterResponse = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| RelevanceFilterError::Malformed(e.to_string()))?;
    let selected = parsed
        .keywords
        .ok_or_else(|| RelevanceFilterError::Malformed("missing 'keywords' array".to_string()))?;

    let wanted: HashSet<String> = selected
        .iter()
        .filter_map(serde_json::Value::as_str)
        .map(|k| k.trim().to_lowercase())
        .collect();

    let mut seen = HashSet::new();
    let kept: Vec<String> = input
        .iter()
        .filter(|k| {
            let key = k.trim().to_lowercase();
            wanted.contains(&key) && seen.insert(key)
        })
        .cloned()
        .collect();

    if kept.is_empty() && !input.is_empty() {
        return Err(RelevanceFilterError::EmptySelection);
    }
    Ok(kept)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}

fn filter_prompt(model: &str, keywords: &[String], ctx: &RelevanceContext<'_>) -> CompletionRequest {
    let focus = match ctx.scope {
        AnalysisScope::Local => ctx.location.to_string(),
        AnalysisScope::National => "National (United States)".to_string(),
    };
    let system = format!(
        "You filter SEO keywords for a {bt} business so that an opportunity report only \
contains keywords its customers would search.\n\n\
Business type: {bt}\nBusiness domain: {domain}\nBusiness name: {name}\nLocation focus: {focus}\n\n\
Keep a keyword only if it relates to products or services this kind of business offers \
and carries commercial or informational intent. Drop keywords about jobs or careers, \
other brands or competing businesses, internal operations, look-alike but unrelated \
concepts, and (for local businesses) other locations.\n\
When in doubt, keep the keyword.\n\
Respond with JSON only, exactly: {{\"keywords\": [\"keyword1\", \"keyword2\"]}}",
        bt = ctx.business_type,
        domain = ctx.domain,
        name = ctx.business_name,
    );

    let target = match ctx.scope {
        AnalysisScope::Local => format!(" in {}", ctx.location),
        AnalysisScope::National => " (national scope)".to_string(),
    };
    let list = serde_json::to_string(keywords).unwrap_or_else(|_| "[]".to_string());
    let user = format!(
        "Keywords to filter for a {}{target} business. Return only the relevant ones.\n\n{list}",
        ctx.business_type
    );

    CompletionRequest {
        model: model.to_string(),
        system,
        user,
        temperature: 0.4,
        max_tokens: None,
        json_mode: true,
    }
}
