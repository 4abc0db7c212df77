//! Command handlers for the CLI.
//!
//! Results are printed to stdout as JSON. A failed batch item is reported
//! in place and never aborts the rest of the batch.

use std::path::Path;

use haulgeo_core::{Coordinate, GeocodeQuery};
use haulgeo_engine::{AddressHints, BatchSummary, GeoEngine};
use serde_json::json;

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) async fn run_geocode(
    engine: &GeoEngine,
    address: &str,
    city: Option<&str>,
) -> anyhow::Result<()> {
    let mut query = GeocodeQuery::new(address);
    if let Some(city) = city {
        query = query.with_scope_city(city);
    }
    let result = engine.resolve_address(&query).await?;
    tracing::info!(
        strategy = %result.strategy_used,
        confidence = result.confidence,
        "address resolved"
    );
    print_json(&serde_json::to_value(&result)?)
}

pub(crate) async fn run_fuzzy(
    engine: &GeoEngine,
    address: &str,
    city: Option<&str>,
) -> anyhow::Result<()> {
    if haulgeo_engine::normalize::is_vague_address(address) {
        tracing::info!(address, "address contains vague terms, cleaning before lookup");
    }
    let hints = AddressHints {
        city: city.map(str::to_owned),
    };
    let result = engine.resolve_fuzzy_address(address, &hints).await?;
    print_json(&serde_json::to_value(&result)?)
}

pub(crate) async fn run_reverse(engine: &GeoEngine, lat: f64, lon: f64) -> anyhow::Result<()> {
    let result = engine
        .reverse_resolve_address(Coordinate::new(lat, lon))
        .await?;
    print_json(&serde_json::to_value(&result)?)
}

/// Merges positional addresses with non-blank lines from `file`.
pub(crate) fn collect_batch_inputs(
    mut addresses: Vec<String>,
    file: Option<&Path>,
) -> anyhow::Result<Vec<String>> {
    if let Some(path) = file {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        addresses.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned),
        );
    }
    if addresses.is_empty() {
        anyhow::bail!("no addresses given; pass them as arguments or with --file");
    }
    Ok(addresses)
}

pub(crate) async fn run_batch(
    engine: &GeoEngine,
    addresses: &[String],
    city: Option<&str>,
) -> anyhow::Result<()> {
    let queries: Vec<GeocodeQuery> = addresses
        .iter()
        .map(|address| {
            let query = GeocodeQuery::new(address.as_str());
            match city {
                Some(city) => query.with_scope_city(city),
                None => query,
            }
        })
        .collect();

    let results = engine.batch_resolve_addresses(&queries).await;
    let summary = BatchSummary::from_results(&results);
    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "batch complete"
    );

    let items: Vec<serde_json::Value> = addresses
        .iter()
        .zip(&results)
        .map(|(address, result)| match result {
            Ok(resolved) => json!({ "input": address, "result": resolved }),
            Err(err) => json!({ "input": address, "error": err.to_string() }),
        })
        .collect();

    print_json(&json!({
        "succeeded": summary.succeeded,
        "failed": summary.failed,
        "items": items,
    }))
}

pub(crate) async fn run_route(engine: &GeoEngine, waypoints: &[String]) -> anyhow::Result<()> {
    let path = engine.resolve_route(waypoints).await?;

    let dropped: Vec<&str> = path
        .waypoints
        .iter()
        .filter(|w| w.coordinate.is_none())
        .map(|w| w.display_name.as_str())
        .collect();
    if !dropped.is_empty() {
        tracing::warn!(?dropped, "some waypoints had no cached coordinate");
    }

    print_json(&json!({
        "source": path.source,
        "distance_meters": path.distance_meters,
        "straight_line_meters": path.straight_line_meters(),
        "waypoints": path.waypoints,
        "dropped": dropped,
        "coordinates": path.ordered_coordinates,
    }))
}
