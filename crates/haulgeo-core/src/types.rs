//! Data model for geocoding and route resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::{haversine_distance_m, Coordinate};

/// Administrative granularity of a geocoded match, coarsest first.
///
/// The derived `Ord` follows declaration order, so `Country < HouseNumber`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevel {
    Country,
    Province,
    City,
    District,
    Township,
    Street,
    HouseNumber,
}

impl AdminLevel {
    /// Every level in natural order, coarsest to finest.
    pub const ORDERED: [AdminLevel; 7] = [
        AdminLevel::Country,
        AdminLevel::Province,
        AdminLevel::City,
        AdminLevel::District,
        AdminLevel::Township,
        AdminLevel::Street,
        AdminLevel::HouseNumber,
    ];

    /// Parses a provider level label.
    ///
    /// Accepts the Chinese labels used by AMap-style providers (`国家`, `省`,
    /// `市`, `区县`, `乡镇`, `街道`, `门牌号`) and the snake-case English names.
    /// Returns `None` for anything else, including the empty string.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "国家" | "country" => Some(Self::Country),
            "省" | "province" => Some(Self::Province),
            "市" | "city" => Some(Self::City),
            "区县" | "district" => Some(Self::District),
            "乡镇" | "township" => Some(Self::Township),
            "街道" | "street" => Some(Self::Street),
            "门牌号" | "house_number" => Some(Self::HouseNumber),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Province => "province",
            Self::City => "city",
            Self::District => "district",
            Self::Township => "township",
            Self::Street => "street",
            Self::HouseNumber => "house_number",
        }
    }
}

impl std::fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forward geocoding input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeQuery {
    pub raw_address: String,
    pub scope_city: Option<String>,
}

impl GeocodeQuery {
    #[must_use]
    pub fn new(raw_address: impl Into<String>) -> Self {
        Self {
            raw_address: raw_address.into(),
            scope_city: None,
        }
    }

    #[must_use]
    pub fn with_scope_city(mut self, city: impl Into<String>) -> Self {
        self.scope_city = Some(city.into());
        self
    }
}

/// Which query strategy produced an [`AddressVariant`].
///
/// Declaration order is cascade order: most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTag {
    Direct,
    CityExtracted,
    Simplified,
    MainLocationOnly,
    /// A fuzzy guess with one administrative suffix character removed.
    SuffixStripped,
}

impl std::fmt::Display for StrategyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Direct => "direct",
            Self::CityExtracted => "city_extracted",
            Self::Simplified => "simplified",
            Self::MainLocationOnly => "main_location_only",
            Self::SuffixStripped => "suffix_stripped",
        };
        f.write_str(s)
    }
}

/// One query to issue during a cascade: text plus an optional city scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressVariant {
    pub text: String,
    pub strategy: StrategyTag,
    pub scope: Option<String>,
}

/// One provider match for a forward geocode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub formatted_address: String,
    pub country: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub township: String,
    pub street: String,
    pub house_number: String,
    pub ad_code: String,
    pub city_code: String,
    /// `None` when the provider returned no usable location.
    pub coordinate: Option<Coordinate>,
    /// Parsed granularity; `None` when `level_label` is empty or unrecognized.
    pub level: Option<AdminLevel>,
    /// The provider's own level string, kept verbatim.
    pub level_label: String,
}

/// Terminal output of forward resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub candidate: GeocodeCandidate,
    pub confidence: f64,
    pub strategy_used: StrategyTag,
    /// The variant text that produced the match.
    pub matched_text: String,
}

/// Structured address returned by a reverse geocode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReverseAddress {
    pub formatted_address: String,
    pub country: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub township: String,
    pub street: String,
    pub house_number: String,
    pub ad_code: String,
    pub city_code: String,
}

impl ReverseAddress {
    /// Finest administrative level with a non-empty field, if any.
    #[must_use]
    pub fn finest_level(&self) -> Option<AdminLevel> {
        let fields = [
            (AdminLevel::HouseNumber, &self.house_number),
            (AdminLevel::Street, &self.street),
            (AdminLevel::Township, &self.township),
            (AdminLevel::District, &self.district),
            (AdminLevel::City, &self.city),
            (AdminLevel::Province, &self.province),
            (AdminLevel::Country, &self.country),
        ];
        fields
            .into_iter()
            .find(|(_, value)| !value.trim().is_empty())
            .map(|(level, _)| level)
    }
}

/// Terminal output of reverse resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseGeocodeResult {
    pub coordinate: Coordinate,
    pub address: ReverseAddress,
    pub level: AdminLevel,
    pub confidence: f64,
}

/// Resolution status of a cached location, as written by the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    Pending,
    Success,
    Failed,
    Retry,
}

impl ResolutionStatus {
    /// Parses the stored status string. Unknown values map to `Pending`,
    /// which is never usable for routing.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "success" => Self::Success,
            "failed" => Self::Failed,
            "retry" => Self::Retry,
            _ => Self::Pending,
        }
    }
}

/// A persisted name → coordinate record, consumed read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: Option<Uuid>,
    pub name: String,
    pub address: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub status: ResolutionStatus,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl LocationRecord {
    /// The coordinate, if this record is usable as a route waypoint:
    /// status `success` and a coordinate inside the valid range.
    #[must_use]
    pub fn usable_coordinate(&self) -> Option<Coordinate> {
        if self.status != ResolutionStatus::Success {
            return None;
        }
        self.coordinate.filter(Coordinate::is_valid)
    }
}

/// A named stop; `coordinate` is filled in after a cache lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteWaypoint {
    pub display_name: String,
    pub coordinate: Option<Coordinate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSource {
    ProviderRouted,
    Synthesized,
}

impl std::fmt::Display for PathSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProviderRouted => f.write_str("provider_routed"),
            Self::Synthesized => f.write_str("synthesized"),
        }
    }
}

/// A display path built fresh for one request. Never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePath {
    pub ordered_coordinates: Vec<Coordinate>,
    pub distance_meters: Option<f64>,
    pub source: PathSource,
    /// Every requested stop in request order, resolved or not.
    pub waypoints: Vec<RouteWaypoint>,
}

impl RoutePath {
    /// Sum of great-circle distances between consecutive resolved waypoints.
    #[must_use]
    pub fn straight_line_meters(&self) -> f64 {
        let resolved: Vec<Coordinate> = self
            .waypoints
            .iter()
            .filter_map(|w| w.coordinate)
            .collect();
        resolved
            .windows(2)
            .map(|pair| haversine_distance_m(pair[0], pair[1]))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_level_parses_provider_labels() {
        assert_eq!(AdminLevel::from_label("门牌号"), Some(AdminLevel::HouseNumber));
        assert_eq!(AdminLevel::from_label("区县"), Some(AdminLevel::District));
        assert_eq!(AdminLevel::from_label("street"), Some(AdminLevel::Street));
        assert_eq!(AdminLevel::from_label("兴趣点"), None);
        assert_eq!(AdminLevel::from_label(""), None);
    }

    #[test]
    fn admin_level_ordered_matches_ord() {
        let mut sorted = AdminLevel::ORDERED;
        sorted.sort();
        assert_eq!(sorted, AdminLevel::ORDERED);
    }

    #[test]
    fn admin_level_serializes_snake_case() {
        let json = serde_json::to_string(&AdminLevel::HouseNumber).unwrap();
        assert_eq!(json, "\"house_number\"");
    }

    #[test]
    fn reverse_address_finest_level_picks_most_specific_field() {
        let addr = ReverseAddress {
            province: "云南省".to_owned(),
            city: "昆明市".to_owned(),
            district: "西山区".to_owned(),
            ..ReverseAddress::default()
        };
        assert_eq!(addr.finest_level(), Some(AdminLevel::District));
        assert_eq!(ReverseAddress::default().finest_level(), None);
    }

    #[test]
    fn resolution_status_parse_unknown_is_pending() {
        assert_eq!(ResolutionStatus::parse("success"), ResolutionStatus::Success);
        assert_eq!(ResolutionStatus::parse("retry"), ResolutionStatus::Retry);
        assert_eq!(ResolutionStatus::parse("geocoded"), ResolutionStatus::Pending);
    }

    fn record(status: ResolutionStatus, coordinate: Option<Coordinate>) -> LocationRecord {
        LocationRecord {
            id: None,
            name: "昆明仓库".to_owned(),
            address: None,
            coordinate,
            status,
            resolved_at: None,
        }
    }

    #[test]
    fn usable_coordinate_requires_success_and_valid_range() {
        let good = Coordinate::new(25.0, 102.7);
        assert_eq!(
            record(ResolutionStatus::Success, Some(good)).usable_coordinate(),
            Some(good)
        );
        assert_eq!(
            record(ResolutionStatus::Retry, Some(good)).usable_coordinate(),
            None
        );
        assert_eq!(record(ResolutionStatus::Success, None).usable_coordinate(), None);
        assert_eq!(
            record(ResolutionStatus::Success, Some(Coordinate::new(120.0, 0.0)))
                .usable_coordinate(),
            None
        );
    }

    #[test]
    fn straight_line_meters_skips_unresolved_waypoints() {
        let path = RoutePath {
            ordered_coordinates: vec![],
            distance_meters: None,
            source: PathSource::Synthesized,
            waypoints: vec![
                RouteWaypoint {
                    display_name: "A".to_owned(),
                    coordinate: Some(Coordinate::new(0.0, 0.0)),
                },
                RouteWaypoint {
                    display_name: "missing".to_owned(),
                    coordinate: None,
                },
                RouteWaypoint {
                    display_name: "B".to_owned(),
                    coordinate: Some(Coordinate::new(1.0, 0.0)),
                },
            ],
        };
        let d = path.straight_line_meters();
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }
}
