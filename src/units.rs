//! Display conversions from canonical metric values.
//!
//! Snapshots are stored in metric (Celsius, m/s, hPa, meters); everything
//! here is a pure mapping to the user's chosen display unit. Formatting
//! belongs to the core so shells never convert units themselves.

#![allow(clippy::cast_possible_truncation)]

use crate::settings::{PressureUnit, TempUnit, WindUnit};

const KMH_PER_MS: f64 = 3.6;
const MPH_PER_MS: f64 = 2.237;
const MMHG_PER_HPA: f64 = 0.750_062;
const INHG_PER_HPA: f64 = 0.029_53;

#[must_use]
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

#[must_use]
pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Wind speed in the requested unit, from m/s.
#[must_use]
pub fn wind_value(ms: f64, unit: WindUnit) -> f64 {
    match unit {
        WindUnit::MetersPerSecond => ms,
        WindUnit::KilometersPerHour => ms * KMH_PER_MS,
        WindUnit::MilesPerHour => ms * MPH_PER_MS,
    }
}

/// Pressure in the requested unit, from hPa.
#[must_use]
pub fn pressure_value(hpa: f64, unit: PressureUnit) -> f64 {
    match unit {
        PressureUnit::Hectopascal => hpa,
        PressureUnit::MillimetersOfMercury => hpa * MMHG_PER_HPA,
        PressureUnit::InchesOfMercury => hpa * INHG_PER_HPA,
    }
}

/// Whole-degree display value. Rounds half away from zero.
#[must_use]
pub fn format_temp(temp_c: f64, unit: TempUnit) -> String {
    let shown = match unit {
        TempUnit::C => temp_c,
        TempUnit::F => celsius_to_fahrenheit(temp_c),
    };
    format!("{}", shown.round() as i64)
}

/// One decimal place for every wind unit, m/s pass-through included.
#[must_use]
pub fn format_wind(ms: f64, unit: WindUnit) -> String {
    format!("{:.1}", wind_value(ms, unit))
}

/// Zero decimals for hPa and mmHg, two for inHg.
#[must_use]
pub fn format_pressure(hpa: f64, unit: PressureUnit) -> String {
    let value = pressure_value(hpa, unit);
    match unit {
        PressureUnit::Hectopascal | PressureUnit::MillimetersOfMercury => {
            format!("{value:.0}")
        }
        PressureUnit::InchesOfMercury => format!("{value:.2}"),
    }
}

/// Visibility in kilometers, one decimal; `"N/A"` when the provider
/// omitted the field.
#[must_use]
pub fn format_visibility(meters: Option<f64>) -> String {
    match meters {
        Some(m) => format!("{:.1} km", m / 1000.0),
        None => "N/A".to_string(),
    }
}

#[must_use]
pub fn format_humidity(pct: f64) -> String {
    format!("{pct:.0}%")
}

/// Precipitation probability (0..1) as a whole percentage.
#[must_use]
pub fn format_precipitation(pop: f64) -> String {
    format!("{}%", (pop * 100.0).round() as i64)
}
