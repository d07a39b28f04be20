//! Shell-facing projection of the model.
//!
//! Every value is preformatted here in the user's chosen units; shells
//! render the strings verbatim and never convert anything themselves.

use serde::{Deserialize, Serialize};

use crate::model::Model;
use crate::session::SessionPhase;
use crate::theme::{descriptor, Gradient, TextTone};
use crate::units;
use crate::weather::{ForecastPoint, WeatherSnapshot};
use crate::{DAILY_POINTS, DAILY_STRIDE, HOURLY_POINTS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub session: SessionView,
    pub theme: ThemeView,
    /// Recently searched cities, most recent first.
    pub history: Vec<String>,
    pub settings: SettingsView,
    pub map: MapView,
    pub auth: AuthView,
    pub chat: ChatView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionView {
    Idle,
    Loading,
    Resolved {
        current: CurrentView,
        hourly: Vec<HourlyPointView>,
        daily: Vec<DailyPointView>,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentView {
    pub location: String,
    pub description: String,
    pub icon: String,
    pub temp: String,
    pub feels_like: String,
    pub temp_min: String,
    pub temp_max: String,
    pub temp_unit: String,
    pub humidity: String,
    pub wind: String,
    pub wind_unit: String,
    pub pressure: String,
    pub pressure_unit: String,
    pub visibility: String,
    pub aqi: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPointView {
    /// Unix seconds; the shell localizes.
    pub timestamp: i64,
    pub temp: String,
    pub icon: String,
    pub precipitation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPointView {
    pub timestamp: i64,
    pub temp_min: String,
    pub temp_max: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeView {
    pub key: String,
    pub gradient_from: String,
    pub gradient_to: String,
    /// Concrete background image path, when the theme carries one.
    pub background: Option<String>,
    pub overlay: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub temp_unit: String,
    pub wind_unit: String,
    pub pressure_unit: String,
    pub theme_mode: String,
    pub theme_background: String,
    pub language: String,
    pub home_city: String,
    pub panel_open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub layer: String,
    pub style: String,
    pub token: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthView {
    pub signed_in: bool,
    pub user_name: Option<String>,
    pub pending: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageView {
    pub id: String,
    pub role: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub messages: Vec<ChatMessageView>,
    pub pending: bool,
}

#[must_use]
pub fn build(model: &Model) -> ViewModel {
    ViewModel {
        session: session_view(model),
        theme: theme_view(model),
        history: model.history.names(),
        settings: settings_view(model),
        map: map_view(model),
        auth: auth_view(model),
        chat: chat_view(model),
    }
}

fn session_view(model: &Model) -> SessionView {
    match &model.phase {
        SessionPhase::Idle => SessionView::Idle,
        SessionPhase::Loading => SessionView::Loading,
        SessionPhase::Failed(kind) => SessionView::Failed {
            message: kind.user_facing_message().to_string(),
        },
        SessionPhase::Resolved(snapshot) => SessionView::Resolved {
            current: current_view(snapshot, model),
            hourly: snapshot
                .forecast
                .iter()
                .take(HOURLY_POINTS)
                .map(|point| hourly_point(point, model))
                .collect(),
            daily: snapshot
                .forecast
                .iter()
                .step_by(DAILY_STRIDE)
                .take(DAILY_POINTS)
                .map(|point| daily_point(point, model))
                .collect(),
        },
    }
}

fn current_view(snapshot: &WeatherSnapshot, model: &Model) -> CurrentView {
    let settings = &model.settings;
    CurrentView {
        location: snapshot.location_name.clone(),
        description: snapshot.description.clone(),
        icon: snapshot.condition_icon.clone(),
        temp: units::format_temp(snapshot.temp_c, settings.temp_unit),
        feels_like: units::format_temp(snapshot.feels_like_c, settings.temp_unit),
        temp_min: units::format_temp(snapshot.temp_min_c, settings.temp_unit),
        temp_max: units::format_temp(snapshot.temp_max_c, settings.temp_unit),
        temp_unit: settings.temp_unit.as_str().to_string(),
        humidity: units::format_humidity(snapshot.humidity_pct),
        wind: units::format_wind(snapshot.wind_speed_ms, settings.wind_unit),
        wind_unit: settings.wind_unit.as_str().to_string(),
        pressure: units::format_pressure(snapshot.pressure_hpa, settings.pressure_unit),
        pressure_unit: settings.pressure_unit.as_str().to_string(),
        visibility: units::format_visibility(snapshot.visibility_m),
        aqi: snapshot.aqi.display(),
    }
}

fn hourly_point(point: &ForecastPoint, model: &Model) -> HourlyPointView {
    HourlyPointView {
        timestamp: point.timestamp,
        temp: units::format_temp(point.temp_c, model.settings.temp_unit),
        icon: point.condition_icon.clone(),
        precipitation: units::format_precipitation(point.precipitation),
    }
}

fn daily_point(point: &ForecastPoint, model: &Model) -> DailyPointView {
    DailyPointView {
        timestamp: point.timestamp,
        temp_min: units::format_temp(point.temp_min_c, model.settings.temp_unit),
        temp_max: units::format_temp(point.temp_max_c, model.settings.temp_unit),
        icon: point.condition_icon.clone(),
        description: point.description.clone(),
    }
}

fn theme_view(model: &Model) -> ThemeView {
    let descriptor = descriptor(model.theme.active);
    let (from, to) = match descriptor.gradient {
        Gradient::Linear { from, to } => (from, to),
        Gradient::Solid(color) => (color, color),
    };
    ThemeView {
        key: descriptor.key.as_str().to_string(),
        gradient_from: from.to_string(),
        gradient_to: to.to_string(),
        background: model.theme.background.clone(),
        overlay: descriptor.overlay.to_string(),
        text: match descriptor.text {
            TextTone::Light => "light",
            TextTone::Dark => "dark",
        }
        .to_string(),
    }
}

fn settings_view(model: &Model) -> SettingsView {
    let settings = &model.settings;
    SettingsView {
        temp_unit: settings.temp_unit.as_str().to_string(),
        wind_unit: settings.wind_unit.as_str().to_string(),
        pressure_unit: settings.pressure_unit.as_str().to_string(),
        theme_mode: match settings.theme_mode {
            crate::settings::ThemeMode::Auto => "auto",
            crate::settings::ThemeMode::Manual => "manual",
        }
        .to_string(),
        theme_background: settings.theme_background.as_str().to_string(),
        language: settings.language.clone(),
        home_city: settings.home_city.clone(),
        panel_open: model.settings_open,
    }
}

fn map_view(model: &Model) -> MapView {
    let coordinates = model.phase.snapshot().and_then(|s| s.coordinates);
    MapView {
        layer: model.settings.map_layer.as_str().to_string(),
        style: model.settings.map_style.as_str().to_string(),
        token: model.map_token.clone(),
        lat: coordinates.map(|c| c.lat),
        lon: coordinates.map(|c| c.lon),
    }
}

fn auth_view(model: &Model) -> AuthView {
    AuthView {
        signed_in: model.is_authenticated(),
        user_name: model.user.as_ref().map(|user| user.name.clone()),
        pending: model.auth_pending,
        error: model.auth_error.as_ref().map(|e| e.message.clone()),
    }
}

fn chat_view(model: &Model) -> ChatView {
    ChatView {
        messages: model
            .chat
            .messages
            .iter()
            .map(|message| ChatMessageView {
                id: message.id.to_string(),
                role: match message.role {
                    crate::chat::ChatRole::User => "user",
                    crate::chat::ChatRole::Assistant => "assistant",
                }
                .to_string(),
                text: message.text.clone(),
            })
            .collect(),
        pending: model.chat.pending,
    }
}
