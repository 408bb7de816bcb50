//! Competitor detection: Google Maps for local analyses, DataForSEO Labs
//! domain competitors for national ones.

use rankscope_core::{
    AnalysisRequest, AnalysisScope, Competitor, CompetitorDetails, CompetitorSource,
    US_LOCATION_CODE,
};
use rankscope_dataforseo::{CompetitorDomainItem, MapsItem, SeoDataProvider};

use crate::domain::{domain_from_url, normalize_domain, normalize_url};
use crate::error::CompetitorError;

pub const MAX_COMPETITORS: usize = 3;
/// Labs candidates requested; one extra in case the client's own domain is listed.
const NATIONAL_CANDIDATES: u32 = 4;

/// Caller-supplied competitors when present, otherwise detected ones.
///
/// # Errors
///
/// See [`detect_competitors`].
pub async fn resolve_competitors(
    provider: &dyn SeoDataProvider,
    request: &AnalysisRequest,
) -> Result<Vec<Competitor>, CompetitorError> {
    let supplied = request.competitor_urls();
    if supplied.is_empty() {
        detect_competitors(provider, request).await
    } else {
        Ok(user_competitors(&supplied))
    }
}

/// Finds up to three competitors for the request's scope.
///
/// # Errors
///
/// [`CompetitorError::Provider`] when the lookup fails and
/// [`CompetitorError::NoneFound`] when nothing usable comes back.
pub async fn detect_competitors(
    provider: &dyn SeoDataProvider,
    request: &AnalysisRequest,
) -> Result<Vec<Competitor>, CompetitorError> {
    match request.analysis_scope {
        AnalysisScope::Local => {
            let search_term = format!(
                "{} in {}",
                request.business_type.trim(),
                request.effective_location()
            );
            let location_code = request.effective_location_code().unwrap_or(US_LOCATION_CODE);
            let items = provider.maps_search(&search_term, location_code).await?;
            let found = local_competitors(&items, &request.business_url);
            tracing::info!(search_term = %search_term, found = found.len(), "local competitors");
            non_empty(found, &search_term)
        }
        AnalysisScope::National => {
            let client_domain = domain_from_url(&request.business_url);
            let items = provider
                .competitors_domain(&client_domain, NATIONAL_CANDIDATES)
                .await?;
            let found = national_competitors(&items, &client_domain);
            tracing::info!(domain = %client_domain, found = found.len(), "national competitors");
            non_empty(found, &client_domain)
        }
    }
}

/// Maps listings with a website, excluding the client's own, capped at three.
#[must_use]
pub fn local_competitors(items: &[MapsItem], client_url: &str) -> Vec<Competitor> {
    let client = normalize_url(client_url);
    items
        .iter()
        .filter_map(|item| {
            let url = item.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
            if !client.is_empty() && normalize_url(url) == client {
                return None;
            }
            let rating = item.rating.as_ref();
            Some(Competitor {
                name: item.title.clone(),
                url: url.to_string(),
                source: CompetitorSource::GoogleMaps,
                details: CompetitorDetails::Local {
                    rating: rating.and_then(|r| r.value),
                    reviews: rating.and_then(|r| r.votes_count),
                    address: item.address.clone(),
                },
            })
        })
        .take(MAX_COMPETITORS)
        .collect()
}

/// Labs competitor domains other than the client's, capped at three.
#[must_use]
pub fn national_competitors(items: &[CompetitorDomainItem], client_domain: &str) -> Vec<Competitor> {
    let client = normalize_domain(client_domain);
    items
        .iter()
        .filter(|item| normalize_domain(&item.domain) != client)
        .take(MAX_COMPETITORS)
        .map(|item| {
            let metrics = item.metrics.as_ref();
            let organic = metrics.and_then(|m| m.organic.as_ref());
            Competitor {
                name: item.domain.clone(),
                url: format!("https://{}", item.domain),
                source: CompetitorSource::DataForSeoLabs,
                details: CompetitorDetails::National {
                    organic_traffic: organic.and_then(|o| o.traffic),
                    organic_keywords: organic.and_then(|o| o.keywords),
                    domain_rank: metrics.and_then(|m| m.domain_rank),
                },
            }
        })
        .collect()
}

/// Competitors named by the caller, labelled by domain.
#[must_use]
pub fn user_competitors(urls: &[String]) -> Vec<Competitor> {
    urls.iter()
        .map(|url| Competitor {
            name: domain_from_url(url),
            url: url.clone(),
            source: CompetitorSource::UserProvided,
            details: CompetitorDetails::None,
        })
        .collect()
}

fn non_empty(found: Vec<Competitor>, target: &str) -> Result<Vec<Competitor>, CompetitorError> {
    if found.is_empty() {
        Err(CompetitorError::NoneFound(target.to_string()))
    } else {
        Ok(found)
    }
}
