//! Strategy cascade for forward geocoding.
//!
//! Variants are tried strictly in order and the first candidate that passes
//! [`accept_candidate`] wins. A provider failure on one variant is logged and
//! the cascade moves on; only running out of variants is an error.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use haulgeo_core::{
    AddressVariant, AppConfig, Coordinate, GeocodeCandidate, GeocodeQuery, GeocodeResult,
    ReverseGeocodeResult,
};
use thiserror::Error;

use crate::confidence;
use crate::error::{GeoError, ProviderError};
use crate::normalize::{clean_vague_terms, generate_fuzzy_variants, generate_variants, normalize};
use crate::provider::GeocodeProvider;

const DEFAULT_BATCH_MAX_CONCURRENT: usize = 5;
const DEFAULT_REVERSE_RADIUS_M: u32 = 1000;

#[derive(Debug, Clone, Copy)]
pub struct CascadeOptions {
    /// Accept candidates whose level label is non-empty but unknown, scoring
    /// them at the neutral confidence. When `false` they are rejected.
    pub accept_unrecognized_levels: bool,
    pub reverse_radius_m: u32,
    pub batch_max_concurrent: usize,
}

impl Default for CascadeOptions {
    fn default() -> Self {
        Self {
            accept_unrecognized_levels: true,
            reverse_radius_m: DEFAULT_REVERSE_RADIUS_M,
            batch_max_concurrent: DEFAULT_BATCH_MAX_CONCURRENT,
        }
    }
}

impl CascadeOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            accept_unrecognized_levels: config.accept_unrecognized_levels,
            reverse_radius_m: config.reverse_radius_m,
            batch_max_concurrent: config.batch_max_concurrent.max(1),
        }
    }
}

/// Caller-supplied context for fuzzy resolution.
#[derive(Debug, Clone, Default)]
pub struct AddressHints {
    pub city: Option<String>,
}

/// Why a candidate failed the acceptance test.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandidateRejection {
    #[error("candidate has no coordinate")]
    MissingCoordinate,
    #[error("candidate coordinate {0} is out of range")]
    InvalidCoordinate(Coordinate),
    #[error("candidate level '{0}' is not a recognized administrative level")]
    UnrecognizedLevel(String),
}

/// The acceptance test applied to a provider's top candidate.
///
/// # Errors
///
/// Returns the first [`CandidateRejection`] that applies: a missing
/// coordinate, an out-of-range coordinate, or (when
/// `accept_unrecognized_levels` is `false`) a non-empty level label that does
/// not parse.
pub fn accept_candidate(
    candidate: &GeocodeCandidate,
    accept_unrecognized_levels: bool,
) -> Result<Coordinate, CandidateRejection> {
    let coordinate = candidate
        .coordinate
        .ok_or(CandidateRejection::MissingCoordinate)?;
    if !coordinate.is_valid() {
        return Err(CandidateRejection::InvalidCoordinate(coordinate));
    }
    let unrecognized = candidate.level.is_none() && !candidate.level_label.trim().is_empty();
    if unrecognized && !accept_unrecognized_levels {
        return Err(CandidateRejection::UnrecognizedLevel(
            candidate.level_label.clone(),
        ));
    }
    Ok(coordinate)
}

/// Success/failure counts over a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    #[must_use]
    pub fn from_results<T>(results: &[Result<T, GeoError>]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        Self {
            succeeded,
            failed: results.len() - succeeded,
        }
    }
}

pub struct StrategyCascadeResolver {
    provider: Arc<dyn GeocodeProvider>,
    options: CascadeOptions,
}

impl StrategyCascadeResolver {
    #[must_use]
    pub fn new(provider: Arc<dyn GeocodeProvider>, options: CascadeOptions) -> Self {
        Self { provider, options }
    }

    /// Resolves a free-text address through the canonical strategy cascade.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Exhausted`] when no variant yields an acceptable
    /// candidate, carrying the last provider error seen, if any.
    pub async fn resolve(&self, query: &GeocodeQuery) -> Result<GeocodeResult, GeoError> {
        let canonical = normalize(&query.raw_address);
        let variants = generate_variants(&canonical, query.scope_city.as_deref());
        self.run_cascade(&variants).await
    }

    /// Like [`resolve`](Self::resolve), but strips colloquial proximity words
    /// first and appends suffix-stripped guesses after the canonical stages.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Exhausted`] when no variant is accepted.
    pub async fn resolve_fuzzy(
        &self,
        address: &str,
        hints: &AddressHints,
    ) -> Result<GeocodeResult, GeoError> {
        let canonical = clean_vague_terms(&normalize(address));
        let variants = generate_fuzzy_variants(&canonical, hints.city.as_deref());
        self.run_cascade(&variants).await
    }

    /// Resolves a coordinate to a structured address with one provider call.
    ///
    /// # Errors
    ///
    /// - [`GeoError::InvalidCoordinate`] if `coordinate` is out of range; the
    ///   provider is not called.
    /// - [`GeoError::Exhausted`] if the provider fails or returns no
    ///   administrative fields.
    pub async fn reverse_resolve(
        &self,
        coordinate: Coordinate,
    ) -> Result<ReverseGeocodeResult, GeoError> {
        let coordinate = GeoError::check_coordinate(coordinate)?;
        let address = match self
            .provider
            .reverse_geocode(coordinate, Some(self.options.reverse_radius_m))
            .await
        {
            Ok(address) => address,
            Err(err) => {
                tracing::warn!(%coordinate, error = %err, "reverse geocode failed");
                return Err(GeoError::Exhausted {
                    attempts: 1,
                    last_error: Some(err),
                });
            }
        };

        let Some(level) = address.finest_level() else {
            tracing::debug!(%coordinate, "reverse geocode returned no administrative fields");
            return Err(GeoError::Exhausted {
                attempts: 1,
                last_error: None,
            });
        };

        Ok(ReverseGeocodeResult {
            coordinate,
            address,
            level,
            confidence: confidence::score(Some(level)),
        })
    }

    /// Resolves every query independently. Output order matches input order;
    /// a failure on one item never affects another.
    pub async fn batch_resolve(
        &self,
        queries: &[GeocodeQuery],
    ) -> Vec<Result<GeocodeResult, GeoError>> {
        let max_concurrent = self.options.batch_max_concurrent.max(1);

        let mut results: Vec<(usize, Result<GeocodeResult, GeoError>)> =
            stream::iter(queries.iter().enumerate())
                .map(|(idx, query)| async move { (idx, self.resolve(query).await) })
                .buffer_unordered(max_concurrent)
                .collect()
                .await;
        results.sort_by_key(|(idx, _)| *idx);

        for (idx, result) in &results {
            if let Err(err) = result {
                tracing::warn!(
                    index = idx,
                    address = %queries[*idx].raw_address,
                    error = %err,
                    "batch item failed to resolve"
                );
            }
        }

        results.into_iter().map(|(_, result)| result).collect()
    }

    async fn run_cascade(&self, variants: &[AddressVariant]) -> Result<GeocodeResult, GeoError> {
        let mut last_error: Option<ProviderError> = None;

        for variant in variants {
            tracing::debug!(
                strategy = %variant.strategy,
                variant = %variant.text,
                scope = ?variant.scope,
                "trying geocode strategy"
            );

            let candidates = match self
                .provider
                .forward_geocode(&variant.text, variant.scope.as_deref())
                .await
            {
                Ok(candidates) => candidates,
                Err(err) => {
                    tracing::warn!(
                        strategy = %variant.strategy,
                        variant = %variant.text,
                        error = %err,
                        "geocode provider failed, continuing cascade"
                    );
                    last_error = Some(err);
                    continue;
                }
            };

            // Providers rank their own results; only the top one is considered.
            let Some(candidate) = candidates.into_iter().next() else {
                tracing::debug!(strategy = %variant.strategy, "no candidates");
                continue;
            };

            match accept_candidate(&candidate, self.options.accept_unrecognized_levels) {
                Ok(_) => {
                    let confidence = confidence::score(candidate.level);
                    tracing::debug!(
                        strategy = %variant.strategy,
                        confidence,
                        level = %candidate.level_label,
                        "geocode candidate accepted"
                    );
                    return Ok(GeocodeResult {
                        candidate,
                        confidence,
                        strategy_used: variant.strategy,
                        matched_text: variant.text.clone(),
                    });
                }
                Err(reason) => {
                    tracing::debug!(
                        strategy = %variant.strategy,
                        %reason,
                        "geocode candidate rejected"
                    );
                }
            }
        }

        Err(GeoError::Exhausted {
            attempts: variants.len(),
            last_error,
        })
    }
}

#[cfg(test)]
#[path = "cascade_test.rs"]
mod tests;
