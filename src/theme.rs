//! Theme selection: a fixed descriptor table and the rules that pick one
//! descriptor from weather conditions or a manual palette choice.
//!
//! Rule order (first match wins): manual flat palette, night outside the
//! storm/rain code range, hot above 32 °C, storm [200,300), rain [300,600),
//! snow [600,700), cloudy [801,804], clear 800, fallback sunny. Malformed
//! condition codes fall through to the fallback; nothing here errors.

use serde::{Deserialize, Serialize};

use crate::settings::{ThemeChoice, ThemeMode};
use crate::{BACKGROUND_VARIANTS, HOT_TEMP_THRESHOLD_C};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKey {
    Sunny,
    Hot,
    Rainy,
    Storm,
    Snow,
    Cloudy,
    Night,
    Blue,
    Indigo,
    Slate,
}

impl ThemeKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Hot => "hot",
            Self::Rainy => "rainy",
            Self::Storm => "storm",
            Self::Snow => "snow",
            Self::Cloudy => "cloudy",
            Self::Night => "night",
            Self::Blue => "blue",
            Self::Indigo => "indigo",
            Self::Slate => "slate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTone {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gradient {
    Linear {
        from: &'static str,
        to: &'static str,
    },
    Solid(&'static str),
}

/// One immutable entry of the theme table. `image_family` is the base path
/// of a two-variant background image set; themes without one render the
/// gradient alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeDescriptor {
    pub key: ThemeKey,
    pub gradient: Gradient,
    pub image_family: Option<&'static str>,
    pub overlay: &'static str,
    pub text: TextTone,
}

const SUNNY: ThemeDescriptor = ThemeDescriptor {
    key: ThemeKey::Sunny,
    gradient: Gradient::Linear {
        from: "#0061ff",
        to: "#60efff",
    },
    image_family: Some("/weather-backgrounds/sunny"),
    overlay: "rgba(30, 58, 138, 0.20)",
    text: TextTone::Light,
};

// Hot reuses the sunny image assets.
const HOT: ThemeDescriptor = ThemeDescriptor {
    key: ThemeKey::Hot,
    gradient: Gradient::Linear {
        from: "#f83600",
        to: "#f9d423",
    },
    image_family: Some("/weather-backgrounds/sunny"),
    overlay: "rgba(124, 45, 18, 0.30)",
    text: TextTone::Light,
};

const RAINY: ThemeDescriptor = ThemeDescriptor {
    key: ThemeKey::Rainy,
    gradient: Gradient::Linear {
        from: "#203a43",
        to: "#2c5364",
    },
    image_family: Some("/weather-backgrounds/rainy"),
    overlay: "rgba(15, 23, 42, 0.30)",
    text: TextTone::Light,
};

const STORM: ThemeDescriptor = ThemeDescriptor {
    key: ThemeKey::Storm,
    gradient: Gradient::Linear {
        from: "#141e30",
        to: "#243b55",
    },
    image_family: None,
    overlay: "rgba(0, 0, 0, 0.50)",
    text: TextTone::Light,
};

const SNOW: ThemeDescriptor = ThemeDescriptor {
    key: ThemeKey::Snow,
    gradient: Gradient::Linear {
        from: "#e6dada",
        to: "#274046",
    },
    image_family: None,
    overlay: "rgba(51, 65, 85, 0.20)",
    text: TextTone::Dark,
};

const CLOUDY: ThemeDescriptor = ThemeDescriptor {
    key: ThemeKey::Cloudy,
    gradient: Gradient::Linear {
        from: "#bdc3c7",
        to: "#2c3e50",
    },
    image_family: Some("/weather-backgrounds/cloudy"),
    overlay: "rgba(31, 41, 55, 0.25)",
    text: TextTone::Light,
};

const NIGHT: ThemeDescriptor = ThemeDescriptor {
    key: ThemeKey::Night,
    gradient: Gradient::Linear {
        from: "#0f172a",
        to: "#1e1b4b",
    },
    image_family: Some("/weather-backgrounds/night"),
    overlay: "rgba(0, 0, 0, 0.40)",
    text: TextTone::Light,
};

const BLUE: ThemeDescriptor = ThemeDescriptor {
    key: ThemeKey::Blue,
    gradient: Gradient::Solid("#0f172a"),
    image_family: None,
    overlay: "rgba(30, 58, 138, 0.10)",
    text: TextTone::Light,
};

const INDIGO: ThemeDescriptor = ThemeDescriptor {
    key: ThemeKey::Indigo,
    gradient: Gradient::Solid("#1e1b4b"),
    image_family: None,
    overlay: "rgba(49, 46, 129, 0.10)",
    text: TextTone::Light,
};

const SLATE: ThemeDescriptor = ThemeDescriptor {
    key: ThemeKey::Slate,
    gradient: Gradient::Solid("#020617"),
    image_family: None,
    overlay: "rgba(15, 23, 42, 0.10)",
    text: TextTone::Light,
};

#[must_use]
pub const fn descriptor(key: ThemeKey) -> &'static ThemeDescriptor {
    match key {
        ThemeKey::Sunny => &SUNNY,
        ThemeKey::Hot => &HOT,
        ThemeKey::Rainy => &RAINY,
        ThemeKey::Storm => &STORM,
        ThemeKey::Snow => &SNOW,
        ThemeKey::Cloudy => &CLOUDY,
        ThemeKey::Night => &NIGHT,
        ThemeKey::Blue => &BLUE,
        ThemeKey::Indigo => &INDIGO,
        ThemeKey::Slate => &SLATE,
    }
}

/// The flat palette a manual choice names, if it names one.
#[must_use]
pub const fn manual_palette(choice: ThemeChoice) -> Option<ThemeKey> {
    match choice {
        ThemeChoice::Default => None,
        ThemeChoice::Blue => Some(ThemeKey::Blue),
        ThemeChoice::Indigo => Some(ThemeKey::Indigo),
        ThemeChoice::Slate => Some(ThemeKey::Slate),
    }
}

/// The weather triple the resolver works from. Retained across mode
/// switches so auto mode can re-resolve without a fresh fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionInputs {
    pub code: i64,
    pub temp_c: f64,
    pub is_night: bool,
}

impl Default for ConditionInputs {
    /// Neutral triple used before the first fetch: clear sky, 25 °C, day.
    fn default() -> Self {
        Self {
            code: 800,
            temp_c: 25.0,
            is_night: false,
        }
    }
}

/// Automatic resolution rules, in priority order.
#[must_use]
pub fn resolve_auto(inputs: ConditionInputs) -> ThemeKey {
    let ConditionInputs {
        code,
        temp_c,
        is_night,
    } = inputs;

    if is_night && !(200..600).contains(&code) {
        return ThemeKey::Night;
    }
    if temp_c > HOT_TEMP_THRESHOLD_C {
        return ThemeKey::Hot;
    }
    match code {
        200..=299 => ThemeKey::Storm,
        300..=599 => ThemeKey::Rainy,
        600..=699 => ThemeKey::Snow,
        801..=804 => ThemeKey::Cloudy,
        _ => ThemeKey::Sunny,
    }
}

/// Active theme plus the retained inputs. Exactly one descriptor is active
/// at any time; the background is either one concrete variant path or
/// absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeState {
    pub active: ThemeKey,
    pub background: Option<String>,
    pub last_inputs: ConditionInputs,
}

impl Default for ThemeState {
    fn default() -> Self {
        Self {
            active: ThemeKey::Sunny,
            background: Some("/weather-backgrounds/sunny-1.png".to_string()),
            last_inputs: ConditionInputs::default(),
        }
    }
}

impl ThemeState {
    /// Feeds a fresh weather triple in. The triple is retained even in
    /// manual mode (so a later switch to auto resolves from it), but the
    /// active theme only changes in auto mode. Returns the theme whose
    /// background needs a variant pick, if one does.
    pub fn apply_weather(&mut self, inputs: ConditionInputs, mode: ThemeMode) -> Option<ThemeKey> {
        self.last_inputs = inputs;
        if mode == ThemeMode::Manual {
            return None;
        }
        self.activate(resolve_auto(inputs))
    }

    /// Re-evaluates after a theme-mode or palette change. Manual mode with
    /// a valid palette selects it and clears the background; manual with no
    /// palette picked leaves the current theme in place. Auto re-resolves
    /// from the retained inputs.
    pub fn apply_mode(&mut self, mode: ThemeMode, choice: ThemeChoice) -> Option<ThemeKey> {
        match mode {
            ThemeMode::Manual => {
                if let Some(palette) = manual_palette(choice) {
                    self.active = palette;
                    self.background = None;
                }
                None
            }
            ThemeMode::Auto => self.activate(resolve_auto(self.last_inputs)),
        }
    }

    /// Applies a variant reply from the random source. Replies for a theme
    /// that is no longer active are discarded; out-of-range values clamp
    /// into the family.
    pub fn set_variant(&mut self, key: ThemeKey, variant: u8) -> bool {
        if key != self.active {
            return false;
        }
        let Some(base) = descriptor(key).image_family else {
            return false;
        };
        let n = variant.clamp(1, BACKGROUND_VARIANTS);
        self.background = Some(format!("{base}-{n}.png"));
        true
    }

    fn activate(&mut self, key: ThemeKey) -> Option<ThemeKey> {
        self.active = key;
        if descriptor(key).image_family.is_some() {
            Some(key)
        } else {
            self.background = None;
            None
        }
    }
}
