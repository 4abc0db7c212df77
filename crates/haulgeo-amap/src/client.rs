//! HTTP client for the AMap web-service API.
//!
//! Wraps `reqwest` with AMap's key handling, status-envelope checks and
//! typed response parsing. Transient failures are retried here; the engine
//! never retries.

use std::time::Duration;

use async_trait::async_trait;
use haulgeo_core::{AppConfig, Coordinate, GeocodeCandidate, ReverseAddress};
use haulgeo_engine::{GeocodeProvider, ProvidedRoute, ProviderError, RouteProvider};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::AmapError;
use crate::retry::retry_with_backoff;
use crate::types::{
    format_lnglat, DrivingResponse, Envelope, Geocode, GeocodeResponse, RegeoResponse,
};

pub const DEFAULT_BASE_URL: &str = "https://restapi.amap.com/v3";

/// Info codes AMap uses for per-second and concurrency throttling.
const RATE_LIMIT_INFOCODES: &[&str] = &["10004", "10014", "10019", "10020", "10021"];

/// AMap caps driving requests at 16 intermediate waypoints.
const MAX_DRIVING_WAYPOINTS: usize = 16;

const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_REVERSE_RADIUS_M: u32 = 1000;
const DEFAULT_BACKOFF_BASE_MS: u64 = 500;

/// Client for the AMap REST API.
///
/// Use [`AmapClient::new`] for production or [`AmapClient::with_base_url`]
/// to point at a mock server in tests.
pub struct AmapClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl AmapClient {
    /// Creates a client pointed at the production AMap API.
    ///
    /// # Errors
    ///
    /// Returns [`AmapError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, AmapError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`AmapError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`AmapError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AmapError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("haulgeo/0.1 (freight-geocoding)")
            .build()?;

        // Exactly one trailing slash so relative endpoint joins keep the
        // version segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| AmapError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        })
    }

    /// Builds a client from the loaded configuration.
    ///
    /// # Errors
    ///
    /// See [`AmapClient::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, AmapError> {
        Ok(Self::with_base_url(
            &config.amap_api_key,
            config.provider_timeout_secs,
            &config.amap_base_url,
        )?
        .with_retry(config.provider_max_retries, config.provider_backoff_base_ms))
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Forward-geocodes `address`, optionally scoped to `city`.
    ///
    /// # Errors
    ///
    /// - [`AmapError::Api`] / [`AmapError::RateLimited`] if the service
    ///   reports a failure status.
    /// - [`AmapError::Http`] on network failure or non-2xx HTTP status.
    /// - [`AmapError::Deserialize`] if the body does not match the expected
    ///   shape.
    pub async fn geocode(
        &self,
        address: &str,
        city: Option<&str>,
    ) -> Result<Vec<GeocodeCandidate>, AmapError> {
        let mut params = vec![("address", address), ("output", "JSON")];
        if let Some(city) = city {
            params.push(("city", city));
        }
        let url = self.build_url("geocode/geo", &params)?;
        let response: GeocodeResponse = self
            .fetch(&url, &format!("geocode/geo(address={address})"))
            .await?;
        Ok(response
            .geocodes
            .into_iter()
            .map(Geocode::into_candidate)
            .collect())
    }

    /// Reverse-geocodes `coordinate` within `radius_m` metres.
    ///
    /// # Errors
    ///
    /// Same as [`AmapClient::geocode`].
    pub async fn regeocode(
        &self,
        coordinate: Coordinate,
        radius_m: u32,
    ) -> Result<ReverseAddress, AmapError> {
        let location = format_lnglat(coordinate);
        let radius = radius_m.to_string();
        let url = self.build_url(
            "geocode/regeo",
            &[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("extensions", "base"),
                ("output", "JSON"),
            ],
        )?;
        let response: RegeoResponse = self
            .fetch(&url, &format!("geocode/regeo(location={location})"))
            .await?;
        Ok(response.regeocode.into_reverse_address())
    }

    /// Requests a driving route through `waypoints` in order and returns the
    /// first path.
    ///
    /// # Errors
    ///
    /// Same as [`AmapClient::geocode`]. A response with no paths is reported
    /// as [`AmapError::Api`].
    pub async fn driving_route(
        &self,
        waypoints: &[Coordinate],
    ) -> Result<ProvidedRoute, AmapError> {
        let (Some(origin), Some(destination)) = (waypoints.first(), waypoints.last()) else {
            return Err(AmapError::Api {
                infocode: "20000".to_owned(),
                info: "driving route needs an origin and a destination".to_owned(),
            });
        };
        let origin = format_lnglat(*origin);
        let destination = format_lnglat(*destination);
        let via = if waypoints.len() > 2 {
            let inner = &waypoints[1..waypoints.len() - 1];
            if inner.len() > MAX_DRIVING_WAYPOINTS {
                tracing::warn!(
                    requested = inner.len(),
                    limit = MAX_DRIVING_WAYPOINTS,
                    "too many intermediate waypoints, truncating"
                );
            }
            inner
                .iter()
                .take(MAX_DRIVING_WAYPOINTS)
                .map(|c| format_lnglat(*c))
                .collect::<Vec<_>>()
                .join(";")
        } else {
            String::new()
        };

        let mut params = vec![
            ("origin", origin.as_str()),
            ("destination", destination.as_str()),
            ("extensions", "base"),
            ("output", "JSON"),
        ];
        if !via.is_empty() {
            params.push(("waypoints", via.as_str()));
        }
        let url = self.build_url("direction/driving", &params)?;
        let response: DrivingResponse = self
            .fetch(
                &url,
                &format!("direction/driving(origin={origin}, destination={destination})"),
            )
            .await?;

        let Some(path) = response.route.paths.first() else {
            return Err(AmapError::Api {
                infocode: "20803".to_owned(),
                info: "no driving path returned".to_owned(),
            });
        };
        Ok(ProvidedRoute {
            coordinates: path.coordinates(),
            distance_meters: path.distance_meters(),
        })
    }

    /// Joins `endpoint` onto the base URL and appends `key` plus `extra` as
    /// percent-encoded query parameters.
    fn build_url(&self, endpoint: &str, extra: &[(&str, &str)]) -> Result<Url, AmapError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| AmapError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Fetches `url` with retries and deserializes the body as `T` once the
    /// status envelope checks out.
    async fn fetch<T: DeserializeOwned>(&self, url: &Url, context: &str) -> Result<T, AmapError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let body = self.request_json(url).await?;
            Self::check_status(&body)?;
            Ok(body)
        })
        .await?;

        serde_json::from_value(body).map_err(|e| AmapError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the body as
    /// JSON.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, AmapError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AmapError::Deserialize {
            context: url.path().to_owned(),
            source: e,
        })
    }

    /// Maps a `"status": "0"` envelope to an error.
    fn check_status(body: &serde_json::Value) -> Result<(), AmapError> {
        let envelope: Envelope =
            serde_json::from_value(body.clone()).map_err(|e| AmapError::Deserialize {
                context: "status envelope".to_owned(),
                source: e,
            })?;
        if envelope.status == "1" {
            return Ok(());
        }
        let info = if envelope.info.is_empty() {
            "unknown error".to_owned()
        } else {
            envelope.info
        };
        if RATE_LIMIT_INFOCODES.contains(&envelope.infocode.as_str()) {
            Err(AmapError::RateLimited {
                infocode: envelope.infocode,
                info,
            })
        } else {
            Err(AmapError::Api {
                infocode: envelope.infocode,
                info,
            })
        }
    }
}

#[async_trait]
impl GeocodeProvider for AmapClient {
    async fn forward_geocode(
        &self,
        text: &str,
        scope: Option<&str>,
    ) -> Result<Vec<GeocodeCandidate>, ProviderError> {
        Ok(self.geocode(text, scope).await?)
    }

    async fn reverse_geocode(
        &self,
        coordinate: Coordinate,
        radius_m: Option<u32>,
    ) -> Result<ReverseAddress, ProviderError> {
        let radius = radius_m.unwrap_or(DEFAULT_REVERSE_RADIUS_M);
        Ok(self.regeocode(coordinate, radius).await?)
    }
}

#[async_trait]
impl RouteProvider for AmapClient {
    async fn route(&self, waypoints: &[Coordinate]) -> Result<ProvidedRoute, ProviderError> {
        Ok(self.driving_route(waypoints).await?)
    }
}
