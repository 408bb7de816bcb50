//! Conversion-rate estimate (visitor-to-customer percentage).

use std::sync::LazyLock;

use regex::Regex;

use rankscope_core::{AnalysisScope, ConversionRateSource};

use crate::client::{CompletionRequest, TextCompletion};
use crate::error::ConversionRateEstimateError;

pub const MIN_CONVERSION_RATE: f64 = 0.1;
pub const MAX_CONVERSION_RATE: f64 = 15.0;
pub const DEFAULT_BASE_RATE: f64 = 2.5;
pub const LOCAL_MULTIPLIER: f64 = 1.4;

/// Industry categories checked in order; the first match sets the base rate.
static INDUSTRY_RATES: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    [
        (r"real estate|property|home|apartment|housing", 2.2),
        (r"restaurant|food|cafe|catering|bakery", 3.1),
        (r"health|medical|doctor|dental|clinic|wellness", 3.8),
        (r"repair|plumbing|electric|roofing|contractor", 4.5),
        (r"law|legal|attorney|lawyer", 3.2),
        (r"retail|shop|store|ecommerce", 1.8),
        (r"tech|software|it|digital", 1.9),
        (r"financial|accounting|tax|insurance", 2.4),
        (r"education|school|training|course|tutor", 2.7),
        (r"beauty|salon|spa|hair|cosmetic", 3.4),
    ]
    .into_iter()
    .map(|(pattern, rate)| (Regex::new(pattern).expect("valid regex"), rate))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionEstimate {
    /// Percent, e.g. `5.0` means 5 %.
    pub rate: f64,
    pub source: ConversionRateSource,
}

/// Rule-based conversion rate: an industry base rate picked by matching the
/// business type against [`INDUSTRY_RATES`] (default 2.5 %), times 1.4 for
/// local scope.
#[must_use]
pub fn rule_based_conversion_rate(business_type: &str, scope: AnalysisScope) -> f64 {
    let lower = business_type.to_lowercase();
    let base = INDUSTRY_RATES
        .iter()
        .find(|(re, _)| re.is_match(&lower))
        .map_or(DEFAULT_BASE_RATE, |(_, rate)| *rate);

    match scope {
        AnalysisScope::Local => base * LOCAL_MULTIPLIER,
        AnalysisScope::National => base,
    }
}

/// Parses a numeric answer such as `"4.2"` or `"4.2%"`.
///
/// Everything except digits and dots is stripped before parsing. Positive
/// values are clamped into `[0.1, 15]`.
///
/// # Errors
///
/// [`ConversionRateEstimateError::Unparseable`] if no number remains,
/// [`ConversionRateEstimateError::NonPositive`] for zero.
pub fn parse_conversion_rate(raw: &str) -> Result<f64, ConversionRateEstimateError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let rate: f64 = cleaned
        .parse()
        .map_err(|_| ConversionRateEstimateError::Unparseable(raw.to_string()))?;

    if !rate.is_finite() || rate <= 0.0 {
        return Err(ConversionRateEstimateError::NonPositive(rate));
    }

    let clamped = rate.clamp(MIN_CONVERSION_RATE, MAX_CONVERSION_RATE);
    if (clamped - rate).abs() > f64::EPSILON {
        tracing::warn!(rate, clamped, "unrealistic AI conversion rate, clamping");
    }
    Ok(clamped)
}

/// Asks the AI service for a typical conversion rate.
///
/// # Errors
///
/// Returns a [`ConversionRateEstimateError`] when the call fails or the
/// answer is not a positive number.
pub async fn estimate_conversion_rate(
    ai: &dyn TextCompletion,
    model: &str,
    business_type: &str,
    scope: AnalysisScope,
) -> Result<f64, ConversionRateEstimateError> {
    let request = conversion_prompt(model, business_type, scope);
    let raw = ai.complete(&request).await?;
    parse_conversion_rate(&raw)
}

/// AI estimate when usable, otherwise [`rule_based_conversion_rate`].
pub async fn resolve_conversion_rate(
    ai: &dyn TextCompletion,
    model: &str,
    business_type: &str,
    scope: AnalysisScope,
) -> ConversionEstimate {
    match estimate_conversion_rate(ai, model, business_type, scope).await {
        Ok(rate) => ConversionEstimate {
            rate,
            source: ConversionRateSource::AiEstimate,
        },
        Err(err) => {
            let rate = rule_based_conversion_rate(business_type, scope);
            tracing::warn!(error = %err, rate, "using rule-based conversion rate");
            ConversionEstimate {
                rate,
                source: ConversionRateSource::RuleBased,
            }
        }
    }
}

fn conversion_prompt(model: &str, business_type: &str, scope: AnalysisScope) -> CompletionRequest {
    let system = "You are an SEO analyst with current industry conversion-rate benchmarks.\n\
Respond ONLY with a single number: the visitor-to-customer conversion rate in percent, \
no % sign and no text.\n\
Expected ranges:\n\
- service businesses: 0.8 to 8\n\
- e-commerce and retail: 0.5 to 4\n\
- B2B: 0.2 to 3.5\n\
- professional services: 1 to 9\n\
- medical and healthcare: 1.8 to 7\n\
Local businesses convert 30-50% above national averages. High-ticket services convert \
lower than low-ticket ones; emergency services convert higher than discretionary ones."
        .to_string();

    let audience = match scope {
        AnalysisScope::Local => "local customers in a specific geographic area",
        AnalysisScope::National => "customers across the entire United States",
    };
    let user = format!(
        "What is the typical website conversion rate for a {} business targeting {audience}? \
Return only the number.",
        business_type.trim().to_lowercase()
    );

    CompletionRequest {
        model: model.to_string(),
        system,
        user,
        temperature: 0.1,
        max_tokens: Some(5),
        json_mode: false,
    }
}
