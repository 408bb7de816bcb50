//! URL and domain helpers shared by competitor detection and SERP matching.

use reqwest::Url;

/// Host of `url` without a leading `www.`, lowercased.
///
/// Inputs without a scheme are treated as a bare host (`acme.com/about`).
/// Falls back to the trimmed input when no host can be found.
#[must_use]
pub fn domain_from_url(url: &str) -> String {
    let trimmed = url.trim();
    let host = parse_host(trimmed).or_else(|| {
        if trimmed.contains("://") {
            None
        } else {
            parse_host(&format!("https://{trimmed}"))
        }
    });

    match host {
        Some(host) => host
            .strip_prefix("www.")
            .map_or_else(|| host.clone(), str::to_string),
        None => trimmed.to_string(),
    }
}

fn parse_host(candidate: &str) -> Option<String> {
    Url::parse(candidate)
        .ok()?
        .host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_lowercase)
}

/// First label of the domain, e.g. `acmeroofing` for `https://www.acmeroofing.com`.
#[must_use]
pub fn business_name(url: &str) -> String {
    let domain = domain_from_url(url);
    domain
        .split('.')
        .next()
        .map_or_else(|| domain.clone(), str::to_string)
}

/// Domain comparison key: scheme, `www.` and trailing slash removed, lowercased.
#[must_use]
pub(crate) fn normalize_domain(value: &str) -> String {
    let lower = value.trim().to_lowercase();
    let no_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let no_www = no_scheme.strip_prefix("www.").unwrap_or(no_scheme);
    no_www.trim_end_matches('/').to_string()
}

/// URL comparison key: trailing slash removed.
#[must_use]
pub(crate) fn normalize_url(value: &str) -> &str {
    value.trim().trim_end_matches('/')
}
