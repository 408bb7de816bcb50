//! Subcommand handlers. Each prints its result as pretty JSON on stdout.

use anyhow::Context as _;
use serde::Serialize;

use rankscope_core::AnalysisRequest;

use crate::context::Context;

pub(crate) async fn run_analyze(ctx: &Context, mut request: AnalysisRequest) -> anyhow::Result<()> {
    if request.analysis_scope.is_local() && request.location_code.is_none() {
        let (state, city) = split_location(&request.location)
            .with_context(|| format!("cannot resolve location \"{}\"", request.location))?;
        let found = ctx.resolver.resolve(state, city).await?;
        if let Some(warning) = &found.warning {
            tracing::warn!(%warning, "location resolved at state level");
        }
        tracing::info!(code = found.code, matched = %found.matched_name, "location resolved");
        request.location_code = Some(found.code);
    }

    let outcome = ctx.analyzer.analyze(&request).await.map_err(|e| {
        tracing::error!(error = %e, stage = e.summary(), "analysis failed");
        anyhow::Error::new(e)
    })?;
    print_json(&outcome)
}

pub(crate) async fn run_locate(
    ctx: &Context,
    state: &str,
    city: Option<&str>,
    list_cities: bool,
) -> anyhow::Result<()> {
    if list_cities {
        let cities = ctx.resolver.cities(state).await?;
        return print_json(&cities);
    }
    print_json(&ctx.resolver.resolve(state, city).await?)
}

pub(crate) async fn run_competitors(ctx: &Context, request: &AnalysisRequest) -> anyhow::Result<()> {
    let found = ctx.analyzer.competitors(request).await?;
    print_json(&found)
}

/// Splits `"City, State"` into `(state, Some(city))`; a bare name is a state.
///
/// Returns `None` for blank input.
pub(crate) fn split_location(location: &str) -> Option<(&str, Option<&str>)> {
    let parts: Vec<&str> = location
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    match parts.as_slice() {
        [] => None,
        [state] => Some((*state, None)),
        [city, state, ..] => Some((*state, Some(*city))),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
