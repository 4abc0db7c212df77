//! Route resolution: cache lookups followed by a live-route race.
//!
//! Waypoint names resolve through the [`LocationCache`] only. The synthesized
//! path is built before the live request starts, so it is always ready when
//! the deadline fires. The live future is dropped at the deadline and any
//! response it would have produced is never observed.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use haulgeo_core::{AppConfig, Coordinate, PathSource, RoutePath, RouteWaypoint};

use crate::error::GeoError;
use crate::provider::{LocationCache, ProvidedRoute, RouteProvider};
use crate::synth::{PathSynthesizer, DEFAULT_CURVE_BIAS, DEFAULT_SAMPLES_PER_SEGMENT};

const DEFAULT_ROUTE_DEADLINE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
pub struct RouteOptions {
    /// How long the live routing call may run before synthesis wins.
    pub deadline: Duration,
    pub curve_bias: f64,
    pub samples_per_segment: usize,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_ROUTE_DEADLINE,
            curve_bias: DEFAULT_CURVE_BIAS,
            samples_per_segment: DEFAULT_SAMPLES_PER_SEGMENT,
        }
    }
}

impl RouteOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            deadline: Duration::from_millis(config.route_deadline_ms),
            curve_bias: config.route_curve_bias,
            samples_per_segment: config.route_samples_per_segment,
        }
    }
}

pub struct RoutePathResolver {
    cache: Arc<dyn LocationCache>,
    router: Arc<dyn RouteProvider>,
    synthesizer: PathSynthesizer,
    options: RouteOptions,
}

impl RoutePathResolver {
    #[must_use]
    pub fn new(
        cache: Arc<dyn LocationCache>,
        router: Arc<dyn RouteProvider>,
        options: RouteOptions,
    ) -> Self {
        Self {
            cache,
            router,
            synthesizer: PathSynthesizer::new(options.samples_per_segment),
            options,
        }
    }

    /// Builds a display path through the named waypoints, in order.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InsufficientLocations`] when fewer than two names
    /// resolve to a usable cached coordinate. Routing failures never surface;
    /// they select the synthesized path instead.
    pub async fn resolve_route(&self, names: &[String]) -> Result<RoutePath, GeoError> {
        let waypoints = self.lookup_waypoints(names).await;
        let coordinates: Vec<Coordinate> =
            waypoints.iter().filter_map(|w| w.coordinate).collect();

        if coordinates.len() < 2 {
            tracing::warn!(
                requested = names.len(),
                resolved = coordinates.len(),
                "not enough cached waypoints to build a route"
            );
            return Err(GeoError::InsufficientLocations {
                requested: names.len(),
                resolved: coordinates.len(),
            });
        }

        let synthesized = self
            .synthesizer
            .synthesize(&coordinates, self.options.curve_bias);

        let path = match self.race_live_route(&coordinates).await {
            Some(live) => RoutePath {
                ordered_coordinates: live.coordinates,
                distance_meters: live.distance_meters,
                source: PathSource::ProviderRouted,
                waypoints,
            },
            None => RoutePath {
                ordered_coordinates: synthesized,
                distance_meters: None,
                source: PathSource::Synthesized,
                waypoints,
            },
        };

        tracing::info!(
            source = %path.source,
            waypoints = coordinates.len(),
            points = path.ordered_coordinates.len(),
            "route resolved"
        );
        Ok(path)
    }

    /// Looks every name up concurrently. Misses, unusable records and cache
    /// errors leave the waypoint without a coordinate.
    async fn lookup_waypoints(&self, names: &[String]) -> Vec<RouteWaypoint> {
        let lookups = names.iter().map(|name| async move {
            let coordinate = match self.cache.lookup(name).await {
                Ok(Some(record)) => {
                    let usable = record.usable_coordinate();
                    if usable.is_none() {
                        tracing::warn!(
                            waypoint = %name,
                            status = ?record.status,
                            "cached location not usable, dropping waypoint"
                        );
                    }
                    usable
                }
                Ok(None) => {
                    tracing::warn!(waypoint = %name, "location not cached, dropping waypoint");
                    None
                }
                Err(err) => {
                    tracing::warn!(
                        waypoint = %name,
                        error = %err,
                        "location cache lookup failed, dropping waypoint"
                    );
                    None
                }
            };
            RouteWaypoint {
                display_name: name.clone(),
                coordinate,
            }
        });
        join_all(lookups).await
    }

    /// Returns the live route if it arrives in time and is usable.
    async fn race_live_route(&self, coordinates: &[Coordinate]) -> Option<ProvidedRoute> {
        match tokio::time::timeout(self.options.deadline, self.router.route(coordinates)).await {
            Ok(Ok(live)) if is_usable_route(&live) => Some(live),
            Ok(Ok(live)) => {
                tracing::warn!(
                    points = live.coordinates.len(),
                    "live route unusable, using synthesized path"
                );
                None
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "live routing failed, using synthesized path");
                None
            }
            Err(_) => {
                let deadline_ms =
                    u64::try_from(self.options.deadline.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(
                    deadline_ms,
                    "live routing missed deadline, using synthesized path"
                );
                None
            }
        }
    }
}

fn is_usable_route(route: &ProvidedRoute) -> bool {
    route.coordinates.len() >= 2 && route.coordinates.iter().all(Coordinate::is_valid)
}

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;
