//! End-to-end analysis of one request.

use std::sync::Arc;

use serde::Serialize;

use rankscope_core::{AnalysisRequest, Competitor, Report, ValidationError, US_LOCATION_CODE};
use rankscope_dataforseo::SeoDataProvider;
use rankscope_llm::{generate_keywords, resolve_conversion_rate, AiModels, TextCompletion};

use crate::competitors::resolve_competitors;
use crate::domain::domain_from_url;
use crate::error::{CompetitorError, PipelineError};
use crate::keyword_set::{build_keywords, KeywordSetInput, DEFAULT_COMPETITOR_KEYWORD_LIMIT};
use crate::opportunity;
use crate::ranking::{aggregate, RankingInput, RankingSettings};

#[derive(Debug, Clone, Copy)]
pub struct AnalyzerSettings {
    pub ranking: RankingSettings,
    pub competitor_keyword_limit: u32,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            ranking: RankingSettings::default(),
            competitor_keyword_limit: DEFAULT_COMPETITOR_KEYWORD_LIMIT,
        }
    }
}

/// Report plus the request context it was computed for.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub report: Report,
    pub business_type: String,
    pub business_url: String,
    pub location: String,
    pub competitors: Vec<Competitor>,
    pub keywords: Vec<String>,
}

pub struct Analyzer {
    provider: Arc<dyn SeoDataProvider>,
    ai: Arc<dyn TextCompletion>,
    models: AiModels,
    settings: AnalyzerSettings,
}

impl Analyzer {
    #[must_use]
    pub fn new(
        provider: Arc<dyn SeoDataProvider>,
        ai: Arc<dyn TextCompletion>,
        models: AiModels,
        settings: AnalyzerSettings,
    ) -> Self {
        Self {
            provider,
            ai,
            models,
            settings,
        }
    }

    /// Competitors for the request: the caller's list, or detected by scope.
    ///
    /// # Errors
    ///
    /// Returns a [`CompetitorError`] when detection fails or finds nothing.
    pub async fn competitors(&self, request: &AnalysisRequest) -> Result<Vec<Competitor>, CompetitorError> {
        resolve_competitors(self.provider.as_ref(), request).await
    }

    /// Runs the full pipeline.
    ///
    /// 1. Validates the request
    /// 2. Resolves competitors
    /// 3. Generates candidate keywords
    /// 4. Builds the keyword set from candidates and competitor keywords
    /// 5. Aggregates volumes and rankings while estimating the conversion rate
    /// 6. Computes the report
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] for an invalid request, failed competitor
    /// detection, or a failed search-volume submission. Everything else
    /// degrades to partial data.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome, PipelineError> {
        request.validate()?;
        let customer_value = request
            .customer_value
            .ok_or(ValidationError::MissingField("customerValue"))?;
        let scope = request.analysis_scope;
        let location = request.effective_location();
        let location_code = request.effective_location_code().unwrap_or(US_LOCATION_CODE);
        let provider = self.provider.as_ref();
        let ai = self.ai.as_ref();

        tracing::info!(
            business_url = %request.business_url,
            business_type = %request.business_type,
            scope = %scope,
            location,
            location_code,
            "starting analysis"
        );

        let competitors = self.competitors(request).await?;
        let competitor_urls: Vec<String> = competitors.iter().map(|c| c.url.clone()).collect();
        let competitor_domains: Vec<String> =
            competitor_urls.iter().map(|u| domain_from_url(u)).collect();

        let generated = generate_keywords(
            ai,
            &self.models.keywords,
            &request.business_type,
            location,
            scope,
        )
        .await;

        let keyword_set = build_keywords(
            provider,
            ai,
            &KeywordSetInput {
                client_url: &request.business_url,
                business_type: &request.business_type,
                scope,
                location,
                competitor_domains: &competitor_domains,
                generated: &generated.keywords,
                competitor_keyword_limit: self.settings.competitor_keyword_limit,
                relevance_model: &self.models.relevance,
            },
        )
        .await;

        let ranking_input = RankingInput {
            keywords: &keyword_set.keywords,
            location_code,
            client_url: &request.business_url,
            competitor_urls: &competitor_urls,
        };
        let (ranking, conversion) = tokio::join!(
            aggregate(provider, &ranking_input, &self.settings.ranking),
            resolve_conversion_rate(ai, &self.models.conversion, &request.business_type, scope),
        );
        let ranking = ranking.map_err(PipelineError::VolumeFetch)?;

        let report = opportunity::compute(
            ranking.entries,
            &competitors,
            customer_value,
            conversion,
            scope,
            ranking.coverage,
        );

        tracing::info!(
            keywords = report.keyword_data.len(),
            potential_revenue = report.potential_revenue,
            competitor_failures = keyword_set.competitor_failures,
            "analysis complete"
        );

        Ok(AnalysisOutcome {
            report,
            business_type: request.business_type.clone(),
            business_url: request.business_url.clone(),
            location: location.to_string(),
            competitors,
            keywords: keyword_set.keywords,
        })
    }
}

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod tests;
