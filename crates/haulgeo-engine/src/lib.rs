//! Geocoding and route-resolution engine.
//!
//! Free-text addresses resolve through an ordered cascade of query
//! strategies against a [`GeocodeProvider`]. Named waypoints resolve through
//! a read-only [`LocationCache`] and are joined by a live route when one
//! arrives in time, or by a synthesized curve otherwise.

pub mod cascade;
pub mod confidence;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod route;
pub mod synth;

pub use cascade::{
    accept_candidate, AddressHints, BatchSummary, CandidateRejection, CascadeOptions,
    StrategyCascadeResolver,
};
pub use engine::GeoEngine;
pub use error::{CacheError, GeoError, ProviderError};
pub use normalize::{generate_fuzzy_variants, generate_variants, normalize};
pub use provider::{GeocodeProvider, LocationCache, ProvidedRoute, RouteProvider};
pub use route::{RouteOptions, RoutePathResolver};
pub use synth::PathSynthesizer;
