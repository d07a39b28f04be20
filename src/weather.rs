//! Provider wire types and the canonical snapshot.
//!
//! The weather source replies in the upstream provider's shape (current
//! conditions, a 3-hour-step forecast list, an AQI scalar and a map token).
//! Everything is converted into [`WeatherSnapshot`], the canonical
//! metric-unit record the rest of the core works from. Response
//! classification lives here too: 404 and 429 map to their own failure
//! kinds, any other failure is a network-class error.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::warn;

use crate::session::FetchErrorKind;
use crate::theme::ConditionInputs;

/// Air quality index on the provider's 1..=5 scale. Anything the provider
/// sends that is not a number in that range (the literal `"N/A"`, null, a
/// missing field) is `Unavailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Aqi {
    Level(u8),
    #[default]
    Unavailable,
}

impl Aqi {
    #[must_use]
    pub fn display(self) -> String {
        match self {
            Self::Level(n) => n.to_string(),
            Self::Unavailable => "N/A".to_string(),
        }
    }
}

impl Serialize for Aqi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Level(n) => serializer.serialize_u8(*n),
            Self::Unavailable => serializer.serialize_str("N/A"),
        }
    }
}

impl<'de> Deserialize<'de> for Aqi {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value.as_u64() {
            Some(n @ 1..=5) => {
                Self::Level(u8::try_from(n).map_err(|_| D::Error::custom("aqi out of range"))?)
            }
            _ => Self::Unavailable,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One forecast step, canonical units, 3-hour grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Unix seconds.
    pub timestamp: i64,
    pub temp_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub condition_code: i64,
    pub condition_icon: String,
    pub description: String,
    /// Precipitation probability, 0..=1.
    pub precipitation: f64,
}

/// Canonical metric record of one successful fetch. Immutable once stored;
/// the next fetch replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub coordinates: Option<Coordinates>,
    pub condition_code: i64,
    pub condition_icon: String,
    pub description: String,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
    pub pressure_hpa: f64,
    pub visibility_m: Option<f64>,
    pub forecast: Vec<ForecastPoint>,
    pub aqi: Aqi,
}

impl WeatherSnapshot {
    /// Night is signaled by the provider's icon suffix; a missing icon
    /// counts as day.
    #[must_use]
    pub fn is_night(&self) -> bool {
        self.condition_icon.ends_with('n')
    }

    /// The triple the theme resolver consumes.
    #[must_use]
    pub fn theme_inputs(&self) -> ConditionInputs {
        ConditionInputs {
            code: self.condition_code,
            temp_c: self.temp_c,
            is_night: self.is_night(),
        }
    }

    /// True when the provider resolved the query to a named place.
    #[must_use]
    pub fn has_name(&self) -> bool {
        !self.location_name.trim().is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("malformed report body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("report carries no condition entry")]
    MissingCondition,
}

/// A parsed report: the snapshot plus the map token that rides along for
/// the map pane.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub snapshot: WeatherSnapshot,
    pub map_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReportWire {
    weather: CurrentWire,
    #[serde(default)]
    forecast: ForecastWire,
    #[serde(default)]
    aqi: Aqi,
    #[serde(default, rename = "mapToken")]
    map_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentWire {
    #[serde(default)]
    name: String,
    coord: Option<Coordinates>,
    weather: Vec<ConditionWire>,
    main: MainWire,
    wind: Option<WindWire>,
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionWire {
    id: i64,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct MainWire {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    temp_min: f64,
    #[serde(default)]
    temp_max: f64,
    #[serde(default)]
    humidity: f64,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct WindWire {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct ForecastWire {
    #[serde(default)]
    list: Vec<ForecastEntryWire>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntryWire {
    dt: i64,
    main: MainWire,
    #[serde(default)]
    weather: Vec<ConditionWire>,
    #[serde(default)]
    pop: f64,
}

/// Parses a successful report body into the canonical snapshot.
pub fn parse_report(body: &[u8]) -> Result<ParsedReport, ReportError> {
    let wire: ReportWire = serde_json::from_slice(body)?;
    let current = wire.weather;
    let condition = current
        .weather
        .into_iter()
        .next()
        .ok_or(ReportError::MissingCondition)?;

    let forecast = wire
        .forecast
        .list
        .into_iter()
        .map(|entry| {
            let (code, icon, description) = entry
                .weather
                .into_iter()
                .next()
                .map_or((800, String::new(), String::new()), |c| {
                    (c.id, c.icon, c.description)
                });
            ForecastPoint {
                timestamp: entry.dt,
                temp_c: entry.main.temp,
                temp_min_c: entry.main.temp_min,
                temp_max_c: entry.main.temp_max,
                condition_code: code,
                condition_icon: icon,
                description,
                precipitation: entry.pop,
            }
        })
        .collect();

    let snapshot = WeatherSnapshot {
        location_name: current.name,
        coordinates: current.coord,
        condition_code: condition.id,
        condition_icon: condition.icon,
        description: condition.description,
        temp_c: current.main.temp,
        feels_like_c: current.main.feels_like,
        temp_min_c: current.main.temp_min,
        temp_max_c: current.main.temp_max,
        humidity_pct: current.main.humidity,
        wind_speed_ms: current.wind.map_or(0.0, |w| w.speed),
        pressure_hpa: current.main.pressure,
        visibility_m: current.visibility,
        forecast,
        aqi: wire.aqi,
    };

    Ok(ParsedReport {
        snapshot,
        map_token: wire.map_token,
    })
}

/// Maps a response status to a failure kind; `None` means success.
#[must_use]
pub const fn classify_status(status: u16) -> Option<FetchErrorKind> {
    match status {
        200..=299 => None,
        404 => Some(FetchErrorKind::NotFound),
        429 => Some(FetchErrorKind::RateLimited),
        _ => Some(FetchErrorKind::Network),
    }
}

/// Full response evaluation: status classification first, then body
/// parsing. An undecodable success body counts as a network-class failure.
pub fn evaluate_response(status: u16, body: &[u8]) -> Result<ParsedReport, FetchErrorKind> {
    if let Some(kind) = classify_status(status) {
        return Err(kind);
    }
    parse_report(body).map_err(|err| {
        warn!(error = %err, "weather report body rejected");
        FetchErrorKind::Network
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report_body() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "weather": {
                "name": "London",
                "coord": { "lat": 51.5073, "lon": -0.1276 },
                "weather": [
                    { "id": 803, "description": "broken clouds", "icon": "04n" }
                ],
                "main": {
                    "temp": 11.2,
                    "feels_like": 10.1,
                    "temp_min": 9.4,
                    "temp_max": 12.8,
                    "humidity": 81,
                    "pressure": 1013
                },
                "wind": { "speed": 4.6 },
                "visibility": 10000
            },
            "forecast": {
                "list": [
                    {
                        "dt": 1_700_000_000,
                        "main": { "temp": 10.0, "temp_min": 8.0, "temp_max": 11.0,
                                  "feels_like": 9.0, "humidity": 80, "pressure": 1011 },
                        "weather": [ { "id": 500, "description": "light rain", "icon": "10d" } ],
                        "pop": 0.62
                    }
                ]
            },
            "aqi": 2,
            "mapToken": "token-123"
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_full_report() {
        let parsed = parse_report(&report_body()).unwrap();
        let snapshot = &parsed.snapshot;
        assert_eq!(snapshot.location_name, "London");
        assert_eq!(snapshot.condition_code, 803);
        assert_eq!(snapshot.condition_icon, "04n");
        assert!(snapshot.is_night());
        assert_eq!(snapshot.temp_c, 11.2);
        assert_eq!(snapshot.humidity_pct, 81.0);
        assert_eq!(snapshot.wind_speed_ms, 4.6);
        assert_eq!(snapshot.pressure_hpa, 1013.0);
        assert_eq!(snapshot.visibility_m, Some(10000.0));
        assert_eq!(snapshot.aqi, Aqi::Level(2));
        assert_eq!(parsed.map_token.as_deref(), Some("token-123"));

        let point = &snapshot.forecast[0];
        assert_eq!(point.timestamp, 1_700_000_000);
        assert_eq!(point.condition_code, 500);
        assert_eq!(point.precipitation, 0.62);
    }

    #[test]
    fn test_theme_inputs_bridge() {
        let parsed = parse_report(&report_body()).unwrap();
        let inputs = parsed.snapshot.theme_inputs();
        assert_eq!(inputs.code, 803);
        assert!(inputs.is_night);
    }

    #[test]
    fn test_aqi_unavailable_string() {
        let body = serde_json::to_vec(&json!({
            "weather": {
                "name": "X",
                "weather": [ { "id": 800, "icon": "01d" } ],
                "main": { "temp": 20.0 }
            },
            "aqi": "N/A"
        }))
        .unwrap();
        let parsed = parse_report(&body).unwrap();
        assert_eq!(parsed.snapshot.aqi, Aqi::Unavailable);
        assert_eq!(parsed.snapshot.aqi.display(), "N/A");
        assert_eq!(parsed.map_token, None);
    }

    #[test]
    fn test_aqi_missing_or_out_of_range() {
        for aqi in [json!(null), json!(0), json!(6), json!(2.5)] {
            let body = serde_json::to_vec(&json!({
                "weather": {
                    "name": "X",
                    "weather": [ { "id": 800, "icon": "01d" } ],
                    "main": { "temp": 20.0 }
                },
                "aqi": aqi
            }))
            .unwrap();
            let parsed = parse_report(&body).unwrap();
            assert_eq!(parsed.snapshot.aqi, Aqi::Unavailable, "aqi case failed");
        }
    }

    #[test]
    fn test_empty_condition_array_is_rejected() {
        let body = serde_json::to_vec(&json!({
            "weather": { "name": "X", "weather": [], "main": { "temp": 20.0 } }
        }))
        .unwrap();
        assert!(matches!(
            parse_report(&body),
            Err(ReportError::MissingCondition)
        ));
    }

    #[test]
    fn test_unnamed_location_parses_without_history_name() {
        let body = serde_json::to_vec(&json!({
            "weather": {
                "weather": [ { "id": 800, "icon": "01d" } ],
                "main": { "temp": 20.0 }
            }
        }))
        .unwrap();
        let parsed = parse_report(&body).unwrap();
        assert!(!parsed.snapshot.has_name());
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(classify_status(200), None);
        assert_eq!(classify_status(204), None);
        assert_eq!(classify_status(404), Some(FetchErrorKind::NotFound));
        assert_eq!(classify_status(429), Some(FetchErrorKind::RateLimited));
        assert_eq!(classify_status(400), Some(FetchErrorKind::Network));
        assert_eq!(classify_status(500), Some(FetchErrorKind::Network));
        assert_eq!(classify_status(503), Some(FetchErrorKind::Network));
    }

    #[test]
    fn test_evaluate_undecodable_success_body() {
        assert_eq!(
            evaluate_response(200, b"<html>gateway</html>"),
            Err(FetchErrorKind::Network)
        );
    }

    #[test]
    fn test_evaluate_prefers_status_over_body() {
        assert_eq!(
            evaluate_response(404, &report_body()),
            Err(FetchErrorKind::NotFound)
        );
    }
}
