//! User preferences: unit choices, theme mode, map configuration, language
//! and home city.
//!
//! The persisted shape is a single JSON object under the `appSettings` key.
//! Loading is lenient per field: a missing or unrecognizable field falls back
//! to its default while the surrounding object keeps every field that does
//! parse. A payload that is not a JSON object at all loads as full defaults.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TempUnit {
    #[default]
    C,
    F,
}

impl TempUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::F => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WindUnit {
    #[default]
    #[serde(rename = "m/s")]
    MetersPerSecond,
    #[serde(rename = "km/h")]
    KilometersPerHour,
    #[serde(rename = "mph")]
    MilesPerHour,
}

impl WindUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MetersPerSecond => "m/s",
            Self::KilometersPerHour => "km/h",
            Self::MilesPerHour => "mph",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PressureUnit {
    #[default]
    #[serde(rename = "hPa")]
    Hectopascal,
    #[serde(rename = "mmHg")]
    MillimetersOfMercury,
    #[serde(rename = "inHg")]
    InchesOfMercury,
}

impl PressureUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hectopascal => "hPa",
            Self::MillimetersOfMercury => "mmHg",
            Self::InchesOfMercury => "inHg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Manual,
}

/// Manual background palette choice. `Default` means "no manual palette
/// picked yet"; the flat palettes are the only valid manual selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Default,
    Blue,
    Indigo,
    Slate,
}

impl ThemeChoice {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Blue => "blue",
            Self::Indigo => "indigo",
            Self::Slate => "slate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapLayer {
    #[default]
    Temperature,
    Clouds,
    Precipitation,
    Wind,
}

impl MapLayer {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Clouds => "clouds",
            Self::Precipitation => "precipitation",
            Self::Wind => "wind",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapStyle {
    #[default]
    Streets,
    Satellite,
    Dark,
}

impl MapStyle {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Streets => "streets",
            Self::Satellite => "satellite",
            Self::Dark => "dark",
        }
    }
}

/// Fully-populated preference record. Every field always has a value;
/// partial persisted payloads are backfilled with defaults on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, deserialize_with = "lenient")]
    pub temp_unit: TempUnit,
    #[serde(default, deserialize_with = "lenient")]
    pub wind_unit: WindUnit,
    #[serde(default, deserialize_with = "lenient")]
    pub pressure_unit: PressureUnit,
    #[serde(default, deserialize_with = "lenient")]
    pub theme_mode: ThemeMode,
    #[serde(default, deserialize_with = "lenient")]
    pub theme_background: ThemeChoice,
    #[serde(default, deserialize_with = "lenient")]
    pub map_layer: MapLayer,
    #[serde(default, deserialize_with = "lenient")]
    pub map_style: MapStyle,
    #[serde(default = "default_language", deserialize_with = "lenient_language")]
    pub language: String,
    #[serde(default, deserialize_with = "lenient")]
    pub home_city: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            temp_unit: TempUnit::default(),
            wind_unit: WindUnit::default(),
            pressure_unit: PressureUnit::default(),
            theme_mode: ThemeMode::default(),
            theme_background: ThemeChoice::default(),
            map_layer: MapLayer::default(),
            map_style: MapStyle::default(),
            language: default_language(),
            home_city: String::new(),
        }
    }
}

impl Settings {
    /// Decodes a persisted payload, backfilling defaults per field.
    /// Errors when the payload is not a JSON object at all; callers
    /// recover to full defaults and log.
    pub fn from_persisted(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if !value.is_object() {
            return Err(serde_json::Error::custom(
                "settings payload is not a JSON object",
            ));
        }
        Self::deserialize(value)
    }

    /// True when the home city setting names a city.
    #[must_use]
    pub fn home_city_trimmed(&self) -> Option<&str> {
        let city = self.home_city.trim();
        (!city.is_empty()).then_some(city)
    }

    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.temp_unit {
            self.temp_unit = v;
        }
        if let Some(v) = patch.wind_unit {
            self.wind_unit = v;
        }
        if let Some(v) = patch.pressure_unit {
            self.pressure_unit = v;
        }
        if let Some(v) = patch.theme_mode {
            self.theme_mode = v;
        }
        if let Some(v) = patch.theme_background {
            self.theme_background = v;
        }
        if let Some(v) = patch.map_layer {
            self.map_layer = v;
        }
        if let Some(v) = patch.map_style {
            self.map_style = v;
        }
        if let Some(v) = patch.language {
            self.language = v;
        }
        if let Some(v) = patch.home_city {
            self.home_city = v;
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn lenient<'de, T, D>(de: D) -> Result<T, D::Error>
where
    T: DeserializeOwned + Default,
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

fn lenient_language<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(String::deserialize(value).unwrap_or_else(|_| default_language()))
}

/// Partial settings change. Fields left `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub temp_unit: Option<TempUnit>,
    pub wind_unit: Option<WindUnit>,
    pub pressure_unit: Option<PressureUnit>,
    pub theme_mode: Option<ThemeMode>,
    pub theme_background: Option<ThemeChoice>,
    pub map_layer: Option<MapLayer>,
    pub map_style: Option<MapStyle>,
    pub language: Option<String>,
    pub home_city: Option<String>,
}

impl SettingsPatch {
    /// True when applying the patch can change which theme is active.
    #[must_use]
    pub const fn touches_theme(&self) -> bool {
        self.theme_mode.is_some() || self.theme_background.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_first_run() {
        let s = Settings::default();
        assert_eq!(s.temp_unit, TempUnit::C);
        assert_eq!(s.wind_unit, WindUnit::MetersPerSecond);
        assert_eq!(s.pressure_unit, PressureUnit::Hectopascal);
        assert_eq!(s.theme_mode, ThemeMode::Auto);
        assert_eq!(s.theme_background, ThemeChoice::Default);
        assert_eq!(s.map_layer, MapLayer::Temperature);
        assert_eq!(s.map_style, MapStyle::Streets);
        assert_eq!(s.language, "en");
        assert_eq!(s.home_city, "");
    }

    #[test]
    fn test_partial_payload_merges_over_defaults() {
        let s = Settings::from_persisted(br#"{"tempUnit":"F"}"#).unwrap();
        assert_eq!(s.temp_unit, TempUnit::F);
        assert_eq!(s.wind_unit, WindUnit::MetersPerSecond);
        assert_eq!(s.language, "en");
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let s = Settings::from_persisted(br#"{"tempUnit":"F","legacyFlag":true}"#).unwrap();
        assert_eq!(s.temp_unit, TempUnit::F);
    }

    #[test]
    fn test_garbage_field_falls_back_without_dropping_others() {
        let s =
            Settings::from_persisted(br#"{"tempUnit":"K","windUnit":"mph","mapLayer":7}"#).unwrap();
        assert_eq!(s.temp_unit, TempUnit::C);
        assert_eq!(s.wind_unit, WindUnit::MilesPerHour);
        assert_eq!(s.map_layer, MapLayer::Temperature);
    }

    #[test]
    fn test_non_object_payload_is_an_error() {
        assert!(Settings::from_persisted(b"[1,2,3]").is_err());
        assert!(Settings::from_persisted(b"[]").is_err());
        assert!(Settings::from_persisted(b"\"tempUnit\"").is_err());
        assert!(Settings::from_persisted(b"3").is_err());
        assert!(Settings::from_persisted(b"null").is_err());
        assert!(Settings::from_persisted(b"not json at all").is_err());
    }

    #[test]
    fn test_persisted_shape_uses_original_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "tempUnit",
            "windUnit",
            "pressureUnit",
            "themeMode",
            "themeBackground",
            "mapLayer",
            "mapStyle",
            "language",
            "homeCity",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(json["windUnit"], "m/s");
        assert_eq!(json["pressureUnit"], "hPa");
        assert_eq!(json["themeMode"], "auto");
    }

    #[test]
    fn test_round_trip_is_exact() {
        let s = Settings {
            temp_unit: TempUnit::F,
            wind_unit: WindUnit::KilometersPerHour,
            home_city: "Reykjavík".to_string(),
            ..Settings::default()
        };
        let bytes = serde_json::to_vec(&s).unwrap();
        assert_eq!(Settings::from_persisted(&bytes).unwrap(), s);
    }

    #[test]
    fn test_patch_applies_only_given_fields() {
        let mut s = Settings::default();
        s.apply(SettingsPatch {
            temp_unit: Some(TempUnit::F),
            home_city: Some("Oslo".to_string()),
            ..SettingsPatch::default()
        });
        assert_eq!(s.temp_unit, TempUnit::F);
        assert_eq!(s.home_city, "Oslo");
        assert_eq!(s.wind_unit, WindUnit::MetersPerSecond);
    }

    #[test]
    fn test_patch_theme_detection() {
        let neutral = SettingsPatch {
            temp_unit: Some(TempUnit::F),
            ..SettingsPatch::default()
        };
        assert!(!neutral.touches_theme());

        let manual = SettingsPatch {
            theme_mode: Some(ThemeMode::Manual),
            ..SettingsPatch::default()
        };
        assert!(manual.touches_theme());
    }
}
