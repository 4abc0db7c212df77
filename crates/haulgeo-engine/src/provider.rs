//! External collaborators consumed by the engine.
//!
//! Each trait is a thin seam over one capability. Adapters (HTTP clients,
//! database readers) implement them and translate their own errors into
//! [`ProviderError`] or [`CacheError`]. Retries and back-off belong to the
//! adapter, never to the engine.

use async_trait::async_trait;
use haulgeo_core::{Coordinate, GeocodeCandidate, LocationRecord, ReverseAddress};

use crate::error::{CacheError, ProviderError};

/// Forward and reverse geocoding against an external service.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Issues exactly one forward geocode. Candidates are in the provider's
    /// own ranking order; an empty list means "no match".
    async fn forward_geocode(
        &self,
        text: &str,
        scope: Option<&str>,
    ) -> Result<Vec<GeocodeCandidate>, ProviderError>;

    /// Issues exactly one reverse geocode around `coordinate`.
    async fn reverse_geocode(
        &self,
        coordinate: Coordinate,
        radius_m: Option<u32>,
    ) -> Result<ReverseAddress, ProviderError>;
}

/// A routed path as returned by a live routing service.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvidedRoute {
    pub coordinates: Vec<Coordinate>,
    pub distance_meters: Option<f64>,
}

/// Live routing through an ordered list of waypoints.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(&self, waypoints: &[Coordinate]) -> Result<ProvidedRoute, ProviderError>;
}

/// Read-only name → location store. `Ok(None)` means not found.
#[async_trait]
pub trait LocationCache: Send + Sync {
    async fn lookup(&self, name: &str) -> Result<Option<LocationRecord>, CacheError>;
}
