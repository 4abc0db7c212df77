use haulgeo_core::Coordinate;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A failure reported by an external geocode or route provider.
///
/// Always recoverable from the engine's point of view: the cascade moves on
/// to its next variant and the route race falls back to synthesis.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network, TLS or timeout failure below the provider protocol.
    #[error("provider transport error: {0}")]
    Transport(#[source] BoxError),

    /// The provider answered but reported an error status.
    #[error("provider rejected request ({code}): {message}")]
    Rejected { code: String, message: String },

    /// The provider answered with a payload that could not be interpreted.
    #[error("malformed provider payload: {0}")]
    Malformed(String),
}

/// A failure reading the location cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("location cache backend error: {0}")]
    Backend(#[source] BoxError),
}

/// Errors surfaced to callers of the engine.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("invalid coordinate {0}: latitude must be within [-90, 90] and longitude within [-180, 180]")]
    InvalidCoordinate(Coordinate),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Every strategy was attempted and none produced an acceptable match.
    #[error("all {attempts} geocoding strategies exhausted without an acceptable match")]
    Exhausted {
        attempts: usize,
        #[source]
        last_error: Option<ProviderError>,
    },

    #[error("route needs at least two resolvable waypoints, {resolved} of {requested} resolved")]
    InsufficientLocations { requested: usize, resolved: usize },
}

impl GeoError {
    /// Validates a coordinate, returning it unchanged when in range.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidCoordinate`] when either component is out of
    /// range or NaN.
    pub fn check_coordinate(coordinate: Coordinate) -> Result<Coordinate, GeoError> {
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(GeoError::InvalidCoordinate(coordinate))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_coordinate_passes_valid_value_through() {
        let c = Coordinate::new(25.0, 102.7);
        assert_eq!(GeoError::check_coordinate(c).unwrap(), c);
    }

    #[test]
    fn check_coordinate_rejects_without_clamping() {
        let err = GeoError::check_coordinate(Coordinate::new(91.0, 0.0)).unwrap_err();
        assert!(matches!(err, GeoError::InvalidCoordinate(c) if (c.lat - 91.0).abs() < f64::EPSILON));
    }

    #[test]
    fn exhausted_exposes_last_provider_error_as_source() {
        use std::error::Error as _;
        let err = GeoError::Exhausted {
            attempts: 4,
            last_error: Some(ProviderError::Malformed("bad location".to_owned())),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains('4'));
    }
}
