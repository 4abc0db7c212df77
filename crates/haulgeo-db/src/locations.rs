//! Read-only access to the `locations` table.
//!
//! Rows are written by a separate geocoding ingestion job. This crate only
//! reads them, by exact name, to place route waypoints.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use haulgeo_core::{Coordinate, LocationRecord, ResolutionStatus};
use haulgeo_engine::{CacheError, LocationCache};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// A row from the `locations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationRow {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    /// One of `pending`, `success`, `failed`, `retry`. NULL reads as pending.
    pub geocoding_status: Option<String>,
    pub geocoding_updated_at: Option<DateTime<Utc>>,
}

impl LocationRow {
    /// Converts to the engine's record type. A coordinate is present only
    /// when both columns are non-null and convertible.
    #[must_use]
    pub fn into_record(self) -> LocationRecord {
        let coordinate = match (
            self.latitude.and_then(|d| d.to_f64()),
            self.longitude.and_then(|d| d.to_f64()),
        ) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        };
        LocationRecord {
            id: Some(self.id),
            name: self.name,
            address: self.address,
            coordinate,
            status: self
                .geocoding_status
                .as_deref()
                .map_or(ResolutionStatus::Pending, ResolutionStatus::parse),
            resolved_at: self.geocoding_updated_at,
        }
    }
}

/// Fetch a location by exact name.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_location_by_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<LocationRow>, sqlx::Error> {
    sqlx::query_as::<_, LocationRow>(
        "SELECT id, name, address, latitude, longitude, geocoding_status, geocoding_updated_at \
         FROM locations \
         WHERE name = $1 \
         ORDER BY geocoding_updated_at DESC NULLS LAST \
         LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
}

/// [`LocationCache`] backed by the Postgres `locations` table.
#[derive(Debug, Clone)]
pub struct PgLocationCache {
    pool: PgPool,
}

impl PgLocationCache {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationCache for PgLocationCache {
    async fn lookup(&self, name: &str) -> Result<Option<LocationRecord>, CacheError> {
        let row = get_location_by_name(&self.pool, name)
            .await
            .map_err(|e| CacheError::Backend(Box::new(e)))?;
        tracing::debug!(name, found = row.is_some(), "location cache lookup");
        Ok(row.map(LocationRow::into_record))
    }
}
