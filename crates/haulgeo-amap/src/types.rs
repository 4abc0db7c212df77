//! AMap web-service response types.
//!
//! Every response carries a `status`/`info`/`infocode` envelope. Text fields
//! the service has no value for come back as `[]` rather than `""`, so all
//! of them go through [`lenient_string`].

use haulgeo_core::{AdminLevel, Coordinate, GeocodeCandidate, ReverseAddress};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Status envelope shared by all endpoints. `status` is `"1"` on success.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub info: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub infocode: String,
}

/// Accepts a string, number, `null` or `[]` and yields a string. A
/// non-empty array yields its first string element.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .into_iter()
            .find_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .unwrap_or_default(),
        _ => String::new(),
    })
}

/// Parses a `"lng,lat"` pair. Returns `None` on anything malformed; range
/// checks are left to the caller.
#[must_use]
pub fn parse_lnglat(raw: &str) -> Option<Coordinate> {
    let (lng, lat) = raw.trim().split_once(',')?;
    let lon: f64 = lng.trim().parse().ok()?;
    let lat: f64 = lat.trim().parse().ok()?;
    Some(Coordinate::new(lat, lon))
}

/// Formats a coordinate as AMap's `"lng,lat"` with six decimals.
#[must_use]
pub fn format_lnglat(coordinate: Coordinate) -> String {
    format!("{:.6},{:.6}", coordinate.lon, coordinate.lat)
}

/// Parses a `;`-separated polyline of `"lng,lat"` pairs, skipping malformed
/// points.
#[must_use]
pub fn parse_polyline(raw: &str) -> Vec<Coordinate> {
    raw.split(';')
        .filter(|p| !p.trim().is_empty())
        .filter_map(parse_lnglat)
        .collect()
}

// ---------------------------------------------------------------------------
// geocode/geo
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub geocodes: Vec<Geocode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Geocode {
    #[serde(deserialize_with = "lenient_string")]
    pub formatted_address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(deserialize_with = "lenient_string")]
    pub province: String,
    #[serde(deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(deserialize_with = "lenient_string")]
    pub district: String,
    #[serde(deserialize_with = "lenient_string")]
    pub township: String,
    #[serde(deserialize_with = "lenient_string")]
    pub street: String,
    #[serde(deserialize_with = "lenient_string")]
    pub number: String,
    #[serde(deserialize_with = "lenient_string")]
    pub adcode: String,
    #[serde(deserialize_with = "lenient_string")]
    pub citycode: String,
    /// `"lng,lat"`.
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    /// Match granularity label such as `门牌号`.
    #[serde(deserialize_with = "lenient_string")]
    pub level: String,
}

impl Geocode {
    #[must_use]
    pub fn into_candidate(self) -> GeocodeCandidate {
        GeocodeCandidate {
            coordinate: parse_lnglat(&self.location),
            level: AdminLevel::from_label(&self.level),
            level_label: self.level,
            formatted_address: self.formatted_address,
            country: self.country,
            province: self.province,
            city: self.city,
            district: self.district,
            township: self.township,
            street: self.street,
            house_number: self.number,
            ad_code: self.adcode,
            city_code: self.citycode,
        }
    }
}

// ---------------------------------------------------------------------------
// geocode/regeo
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RegeoResponse {
    pub regeocode: Regeocode,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Regeocode {
    #[serde(deserialize_with = "lenient_string")]
    pub formatted_address: String,
    #[serde(rename = "addressComponent")]
    pub address_component: AddressComponent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddressComponent {
    #[serde(deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(deserialize_with = "lenient_string")]
    pub province: String,
    #[serde(deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(deserialize_with = "lenient_string")]
    pub district: String,
    #[serde(deserialize_with = "lenient_string")]
    pub township: String,
    #[serde(deserialize_with = "lenient_string")]
    pub adcode: String,
    #[serde(deserialize_with = "lenient_string")]
    pub citycode: String,
    #[serde(rename = "streetNumber", deserialize_with = "lenient_street_number")]
    pub street_number: StreetNumber,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StreetNumber {
    #[serde(deserialize_with = "lenient_string")]
    pub street: String,
    #[serde(deserialize_with = "lenient_string")]
    pub number: String,
}

/// `streetNumber` is an object, or `[]` when there is none.
fn lenient_street_number<'de, D>(deserializer: D) -> Result<StreetNumber, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        v @ Value::Object(_) => StreetNumber::deserialize(v).map_err(serde::de::Error::custom),
        _ => Ok(StreetNumber::default()),
    }
}

impl Regeocode {
    #[must_use]
    pub fn into_reverse_address(self) -> ReverseAddress {
        let c = self.address_component;
        ReverseAddress {
            formatted_address: self.formatted_address,
            country: c.country,
            province: c.province,
            city: c.city,
            district: c.district,
            township: c.township,
            street: c.street_number.street,
            house_number: c.street_number.number,
            ad_code: c.adcode,
            city_code: c.citycode,
        }
    }
}

// ---------------------------------------------------------------------------
// direction/driving
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DrivingResponse {
    pub route: DrivingRoute,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DrivingRoute {
    pub paths: Vec<DrivingPath>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DrivingPath {
    /// Metres, as a string.
    #[serde(deserialize_with = "lenient_string")]
    pub distance: String,
    pub steps: Vec<DrivingStep>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DrivingStep {
    #[serde(deserialize_with = "lenient_string")]
    pub polyline: String,
}

impl DrivingPath {
    /// Concatenated step polylines. Step boundaries repeat their joint, so
    /// consecutive duplicates are collapsed.
    #[must_use]
    pub fn coordinates(&self) -> Vec<Coordinate> {
        let mut points: Vec<Coordinate> = self
            .steps
            .iter()
            .flat_map(|step| parse_polyline(&step.polyline))
            .collect();
        points.dedup();
        points
    }

    #[must_use]
    pub fn distance_meters(&self) -> Option<f64> {
        self.distance.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lnglat_orders_longitude_first() {
        let c = parse_lnglat("102.712251,25.040609").unwrap();
        assert!((c.lat - 25.040_609).abs() < 1e-9);
        assert!((c.lon - 102.712_251).abs() < 1e-9);
    }

    #[test]
    fn parse_lnglat_rejects_garbage() {
        assert!(parse_lnglat("").is_none());
        assert!(parse_lnglat("102.7").is_none());
        assert!(parse_lnglat("a,b").is_none());
    }

    #[test]
    fn format_lnglat_round_trips_through_parse() {
        let c = Coordinate::new(25.04, 102.71);
        assert_eq!(format_lnglat(c), "102.710000,25.040000");
    }

    #[test]
    fn empty_array_fields_become_empty_strings() {
        let geocode: Geocode = serde_json::from_value(serde_json::json!({
            "formatted_address": "云南省昆明市",
            "city": "昆明市",
            "district": [],
            "street": [],
            "number": [],
            "location": "102.712251,25.040609",
            "level": "市"
        }))
        .unwrap();
        let candidate = geocode.into_candidate();
        assert_eq!(candidate.district, "");
        assert_eq!(candidate.house_number, "");
        assert_eq!(candidate.level, Some(AdminLevel::City));
        assert!(candidate.coordinate.is_some());
    }

    #[test]
    fn missing_street_number_object_is_tolerated() {
        let regeo: Regeocode = serde_json::from_value(serde_json::json!({
            "formatted_address": "云南省昆明市西山区",
            "addressComponent": {
                "province": "云南省",
                "city": "昆明市",
                "district": "西山区",
                "streetNumber": []
            }
        }))
        .unwrap();
        let address = regeo.into_reverse_address();
        assert_eq!(address.district, "西山区");
        assert_eq!(address.street, "");
    }

    #[test]
    fn driving_path_collapses_step_joints() {
        let path: DrivingPath = serde_json::from_value(serde_json::json!({
            "distance": "1520",
            "steps": [
                { "polyline": "102.71,25.04;102.72,25.05" },
                { "polyline": "102.72,25.05;102.73,25.06" }
            ]
        }))
        .unwrap();
        assert_eq!(path.coordinates().len(), 3);
        assert_eq!(path.distance_meters(), Some(1520.0));
    }
}
