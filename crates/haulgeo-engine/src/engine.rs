//! Single entry point wiring the resolvers to their collaborators.

use std::sync::Arc;

use haulgeo_core::{
    AppConfig, Coordinate, GeocodeQuery, GeocodeResult, ReverseGeocodeResult, RoutePath,
};

use crate::cascade::{AddressHints, CascadeOptions, StrategyCascadeResolver};
use crate::error::GeoError;
use crate::provider::{GeocodeProvider, LocationCache, RouteProvider};
use crate::route::{RouteOptions, RoutePathResolver};

/// Geocoding and route resolution over pluggable providers.
///
/// Stateless between calls. Route operations need a [`LocationCache`]; an
/// engine built without one can still geocode.
pub struct GeoEngine {
    cascade: StrategyCascadeResolver,
    routes: Option<RoutePathResolver>,
}

impl GeoEngine {
    #[must_use]
    pub fn new(geocoder: Arc<dyn GeocodeProvider>, options: CascadeOptions) -> Self {
        Self {
            cascade: StrategyCascadeResolver::new(geocoder, options),
            routes: None,
        }
    }

    /// Builds an engine with options taken from `config`.
    #[must_use]
    pub fn from_app_config(geocoder: Arc<dyn GeocodeProvider>, config: &AppConfig) -> Self {
        Self::new(geocoder, CascadeOptions::from_app_config(config))
    }

    /// Enables [`resolve_route`](Self::resolve_route).
    #[must_use]
    pub fn with_routing(
        mut self,
        cache: Arc<dyn LocationCache>,
        router: Arc<dyn RouteProvider>,
        options: RouteOptions,
    ) -> Self {
        self.routes = Some(RoutePathResolver::new(cache, router, options));
        self
    }

    #[must_use]
    pub fn supports_routing(&self) -> bool {
        self.routes.is_some()
    }

    /// # Errors
    ///
    /// See [`StrategyCascadeResolver::resolve`].
    pub async fn resolve_address(&self, query: &GeocodeQuery) -> Result<GeocodeResult, GeoError> {
        self.cascade.resolve(query).await
    }

    /// # Errors
    ///
    /// See [`StrategyCascadeResolver::resolve_fuzzy`].
    pub async fn resolve_fuzzy_address(
        &self,
        address: &str,
        hints: &AddressHints,
    ) -> Result<GeocodeResult, GeoError> {
        self.cascade.resolve_fuzzy(address, hints).await
    }

    /// # Errors
    ///
    /// See [`StrategyCascadeResolver::reverse_resolve`].
    pub async fn reverse_resolve_address(
        &self,
        coordinate: Coordinate,
    ) -> Result<ReverseGeocodeResult, GeoError> {
        self.cascade.reverse_resolve(coordinate).await
    }

    pub async fn batch_resolve_addresses(
        &self,
        queries: &[GeocodeQuery],
    ) -> Vec<Result<GeocodeResult, GeoError>> {
        self.cascade.batch_resolve(queries).await
    }

    /// # Errors
    ///
    /// Returns [`GeoError::InsufficientLocations`] when fewer than two
    /// waypoints resolve, which is always the case for an engine built
    /// without [`with_routing`](Self::with_routing).
    pub async fn resolve_route(&self, names: &[String]) -> Result<RoutePath, GeoError> {
        match &self.routes {
            Some(routes) => routes.resolve_route(names).await,
            None => {
                tracing::warn!("route requested but no location cache is configured");
                Err(GeoError::InsufficientLocations {
                    requested: names.len(),
                    resolved: 0,
                })
            }
        }
    }
}
