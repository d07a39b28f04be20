//! The update loop: hydration, the startup source ladder, weather fetches
//! with sequence guarding, settings, credential sessions and the assistant.

use crux_http::HttpError;
use crux_kv::error::KeyValueError;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use url::Url;

use crate::auth::{self, AuthUser, CredentialFailure, CredentialOp};
use crate::capabilities::{Capabilities, GeolocationOutput, RandomOutput};
use crate::chat::{self, ChatContext};
use crate::history::SearchHistory;
use crate::model::Model;
use crate::session::{FetchErrorKind, LocationQuery, QueryError, SessionPhase, Startup};
use crate::settings::{Settings, SettingsPatch};
use crate::storage::{encode_json, StoreKey};
use crate::theme::ThemeKey;
use crate::view::ViewModel;
use crate::weather;
use crate::{BACKGROUND_VARIANTS, FALLBACK_CITY};

/// Shell reply to a plain byte-body request.
pub type HttpResult = crux_http::Result<crux_http::Response<Vec<u8>>>;

#[derive(Debug)]
pub enum Event {
    /// Shell is up; begin hydration.
    Started,
    StoreHydrated {
        key: StoreKey,
        value: Result<Option<Vec<u8>>, KeyValueError>,
    },
    StoreWritten {
        key: StoreKey,
        result: Result<Option<Vec<u8>>, KeyValueError>,
    },
    PositionReceived(GeolocationOutput),

    CitySearched {
        query: String,
    },
    LocateRequested,
    ReportReceived {
        seq: u64,
        response: Box<HttpResult>,
    },
    BackgroundVariantPicked {
        theme: ThemeKey,
        output: RandomOutput,
    },

    SettingsChanged(SettingsPatch),
    SettingsPanelToggled,
    HistoryCleared,

    RegisterSubmitted {
        name: String,
        email: String,
        password: SecretString,
    },
    LoginSubmitted {
        email: String,
        password: SecretString,
    },
    AuthReceived {
        op: CredentialOp,
        response: Box<HttpResult>,
    },
    LogoutRequested,

    ChatSubmitted {
        text: String,
    },
    ChatReplyReceived {
        response: Box<HttpResult>,
    },

    Noop,
}

impl Default for Event {
    fn default() -> Self {
        Self::Noop
    }
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::StoreHydrated { .. } => "store_hydrated",
            Self::StoreWritten { .. } => "store_written",
            Self::PositionReceived(_) => "position_received",
            Self::CitySearched { .. } => "city_searched",
            Self::LocateRequested => "locate_requested",
            Self::ReportReceived { .. } => "report_received",
            Self::BackgroundVariantPicked { .. } => "background_variant_picked",
            Self::SettingsChanged(_) => "settings_changed",
            Self::SettingsPanelToggled => "settings_panel_toggled",
            Self::HistoryCleared => "history_cleared",
            Self::RegisterSubmitted { .. } => "register_submitted",
            Self::LoginSubmitted { .. } => "login_submitted",
            Self::AuthReceived { .. } => "auth_received",
            Self::LogoutRequested => "logout_requested",
            Self::ChatSubmitted { .. } => "chat_submitted",
            Self::ChatReplyReceived { .. } => "chat_reply_received",
            Self::Noop => "noop",
        }
    }
}

#[derive(Default)]
pub struct App;

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Self::Event, model: &mut Self::Model, caps: &Self::Capabilities) {
        debug!(event = event.name(), "handling event");
        match event {
            Event::Started => {
                model.startup = Startup::Hydrating;
                model.pending_hydration = StoreKey::ALL.len();
                for key in StoreKey::ALL {
                    caps.key_value
                        .get(key.key().to_string(), move |value| Event::StoreHydrated {
                            key,
                            value,
                        });
                }
                caps.render.render();
            }

            Event::StoreHydrated { key, value } => {
                match value {
                    Ok(Some(bytes)) if !bytes.is_empty() => {
                        Self::apply_hydrated(model, key, &bytes);
                    }
                    Ok(_) => {}
                    Err(error) => {
                        warn!(key = key.key(), ?error, "store read failed during hydration");
                    }
                }
                model.pending_hydration = model.pending_hydration.saturating_sub(1);
                if model.pending_hydration == 0 && model.startup == Startup::Hydrating {
                    Self::finish_hydration(model, caps);
                }
            }

            Event::StoreWritten { key, result } => {
                if let Err(error) = result {
                    warn!(key = key.key(), ?error, "store write failed");
                }
            }

            Event::PositionReceived(output) => {
                let during_startup = model.startup == Startup::Locating;
                if during_startup {
                    model.startup = Startup::Done;
                }
                match output {
                    GeolocationOutput::Position { lat, lon } => {
                        Self::send_report_request(
                            model,
                            caps,
                            &LocationQuery::coordinates(lat, lon),
                        );
                    }
                    GeolocationOutput::Unavailable { reason } => {
                        warn!(%reason, "device position unavailable");
                        if during_startup {
                            Self::fetch_city(model, caps, FALLBACK_CITY);
                        }
                    }
                }
            }

            Event::CitySearched { query } => match LocationQuery::city(&query) {
                Ok(location) => Self::send_report_request(model, caps, &location),
                Err(QueryError::Empty) => {}
                Err(QueryError::TooLong) => {
                    model.phase = SessionPhase::Failed(FetchErrorKind::NotFound);
                    caps.render.render();
                }
            },

            Event::LocateRequested => {
                caps.geolocation.current_position(Event::PositionReceived);
            }

            Event::ReportReceived { seq, response } => {
                if !model.sequencer.is_current(seq) {
                    debug!(seq, "discarding superseded weather response");
                    return;
                }
                match Self::evaluate_report(*response) {
                    Ok(parsed) => Self::apply_report(model, caps, parsed),
                    Err(kind) => model.phase = SessionPhase::Failed(kind),
                }
                caps.render.render();
            }

            Event::BackgroundVariantPicked { theme, output } => {
                if model.theme.set_variant(theme, output.0) {
                    caps.render.render();
                }
            }

            Event::SettingsChanged(patch) => {
                let touches_theme = patch.touches_theme();
                model.settings.apply(patch);
                Self::persist_json(caps, StoreKey::Settings, &model.settings);
                if touches_theme {
                    let pick = model
                        .theme
                        .apply_mode(model.settings.theme_mode, model.settings.theme_background);
                    if let Some(theme) = pick {
                        Self::request_variant(caps, theme);
                    }
                }
                caps.render.render();
            }

            Event::SettingsPanelToggled => {
                model.settings_open = !model.settings_open;
                caps.render.render();
            }

            Event::HistoryCleared => {
                model.history.clear();
                Self::persist_json(caps, StoreKey::History, &model.history.names());
                caps.render.render();
            }

            Event::RegisterSubmitted {
                name,
                email,
                password,
            } => {
                let body = auth::register_body(&name, &email, &password);
                Self::send_credential_request(model, caps, CredentialOp::Register, body);
                caps.render.render();
            }

            Event::LoginSubmitted { email, password } => {
                let body = auth::login_body(&email, &password);
                Self::send_credential_request(model, caps, CredentialOp::Login, body);
                caps.render.render();
            }

            Event::AuthReceived { op, response } => {
                model.auth_pending = false;
                let outcome = match *response {
                    Ok(mut response) => {
                        let status = u16::from(response.status());
                        let body = response.take_body().unwrap_or_default();
                        auth::evaluate_auth_response(op, status, &body)
                    }
                    // Non-success statuses arrive as errors, body attached.
                    Err(HttpError::Http { code, body, .. }) => {
                        auth::evaluate_auth_response(op, u16::from(code), &body.unwrap_or_default())
                    }
                    Err(error) => {
                        warn!(%error, "credential request transport failure");
                        Err(CredentialFailure::service(op))
                    }
                };
                match outcome {
                    Ok(session) => {
                        Self::persist_raw(
                            caps,
                            StoreKey::Token,
                            session.token.expose_secret().clone().into_bytes(),
                        );
                        Self::persist_json(caps, StoreKey::User, &session.user);
                        model.token = Some(session.token);
                        model.user = Some(session.user);
                        model.auth_error = None;
                    }
                    Err(failure) => {
                        debug!(code = failure.kind.code(), "credential operation failed");
                        model.auth_error = Some(failure);
                    }
                }
                caps.render.render();
            }

            Event::LogoutRequested => {
                model.token = None;
                model.user = None;
                model.auth_error = None;
                model.chat.reset();
                Self::delete_key(caps, StoreKey::Token);
                Self::delete_key(caps, StoreKey::User);
                caps.render.render();
            }

            Event::ChatSubmitted { text } => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return;
                }
                if model.chat.pending {
                    debug!("assistant request already in flight, dropping ask");
                    return;
                }
                model.chat.push_user(&text);
                if !model.is_authenticated() {
                    model.chat.push_assistant(chat::SIGN_IN_PROMPT);
                    caps.render.render();
                    return;
                }
                Self::send_assistant_request(model, caps, &text);
                caps.render.render();
            }

            Event::ChatReplyReceived { response } => {
                if !model.chat.pending {
                    debug!("discarding assistant reply with no ask in flight");
                    return;
                }
                model.chat.pending = false;
                let reply = match *response {
                    Ok(mut response) => {
                        let status = u16::from(response.status());
                        let body = response.take_body().unwrap_or_default();
                        chat::evaluate_reply(status, &body)
                    }
                    Err(HttpError::Http { code, body, .. }) => {
                        chat::evaluate_reply(u16::from(code), &body.unwrap_or_default())
                    }
                    Err(error) => {
                        warn!(%error, "assistant request transport failure");
                        Err(chat::AssistantError::Unavailable)
                    }
                };
                match reply {
                    Ok(text) => model.chat.push_assistant(text),
                    Err(_) => model.chat.push_assistant(chat::FALLBACK_REPLY),
                }
                caps.render.render();
            }

            Event::Noop => {}
        }
    }

    fn view(&self, model: &Self::Model) -> Self::ViewModel {
        crate::view::build(model)
    }
}

impl App {
    fn apply_hydrated(model: &mut Model, key: StoreKey, bytes: &[u8]) {
        match key {
            StoreKey::Settings => match Settings::from_persisted(bytes) {
                Ok(settings) => model.settings = settings,
                Err(error) => {
                    warn!(key = key.key(), %error, "corrupt settings payload, keeping defaults");
                }
            },
            StoreKey::History => match SearchHistory::from_persisted(bytes) {
                Ok(history) => model.history = history,
                Err(error) => {
                    warn!(key = key.key(), %error, "corrupt history payload, starting empty");
                }
            },
            StoreKey::LastCity => match std::str::from_utf8(bytes) {
                Ok(city) if !city.trim().is_empty() => {
                    model.last_city = Some(city.trim().to_string());
                }
                _ => warn!(key = key.key(), "unreadable last-city payload"),
            },
            StoreKey::Token => match std::str::from_utf8(bytes) {
                Ok(token) if !token.trim().is_empty() => {
                    model.token = Some(SecretString::new(token.trim().to_string()));
                }
                _ => warn!(key = key.key(), "unreadable token payload"),
            },
            StoreKey::User => match serde_json::from_slice::<AuthUser>(bytes) {
                Ok(user) => model.user = Some(user),
                Err(error) => {
                    warn!(key = key.key(), %error, "corrupt user payload, signing out");
                }
            },
        }
    }

    fn finish_hydration(model: &mut Model, caps: &Capabilities) {
        if model.token.is_some() != model.user.is_some() {
            warn!("incomplete credential session in store, signing out");
            model.token = None;
            model.user = None;
        }
        let pick = model
            .theme
            .apply_mode(model.settings.theme_mode, model.settings.theme_background);
        if let Some(theme) = pick {
            Self::request_variant(caps, theme);
        }
        Self::begin_first_fetch(model, caps);
    }

    /// Startup source ladder: home city, then the remembered last city,
    /// then the device position, then the fixed fallback. Each source is
    /// tried at most once.
    fn begin_first_fetch(model: &mut Model, caps: &Capabilities) {
        let home = model.settings.home_city_trimmed().map(str::to_string);
        if let Some(location) = home.and_then(|city| LocationQuery::city(&city).ok()) {
            model.startup = Startup::Done;
            Self::send_report_request(model, caps, &location);
            return;
        }
        let last = model.last_city.clone();
        if let Some(location) = last.and_then(|city| LocationQuery::city(&city).ok()) {
            model.startup = Startup::Done;
            Self::send_report_request(model, caps, &location);
            return;
        }
        model.startup = Startup::Locating;
        caps.geolocation.current_position(Event::PositionReceived);
    }

    fn fetch_city(model: &mut Model, caps: &Capabilities, city: &str) {
        match LocationQuery::city(city) {
            Ok(location) => Self::send_report_request(model, caps, &location),
            Err(error) => warn!(%error, city, "unusable city name"),
        }
    }

    fn send_report_request(model: &mut Model, caps: &Capabilities, location: &LocationQuery) {
        let url = match Self::report_url(&model.api_base, location) {
            Ok(url) => url,
            Err(error) => {
                warn!(%error, "cannot build report url");
                model.phase = SessionPhase::Failed(FetchErrorKind::Network);
                caps.render.render();
                return;
            }
        };
        let seq = model.sequencer.issue();
        model.phase = SessionPhase::Loading;
        debug!(url = %url, seq, "requesting weather report");
        caps.http.get(url.as_str()).send(move |response| Event::ReportReceived {
            seq,
            response: Box::new(response),
        });
        caps.render.render();
    }

    fn report_url(api_base: &str, location: &LocationQuery) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(api_base)?.join("/api/report")?;
        {
            let mut pairs = url.query_pairs_mut();
            match location {
                LocationQuery::City(name) => {
                    pairs.append_pair("city", name);
                }
                LocationQuery::Coordinates { lat, lon } => {
                    pairs.append_pair("lat", &lat.to_string());
                    pairs.append_pair("lon", &lon.to_string());
                }
            }
        }
        Ok(url)
    }

    fn evaluate_report(response: HttpResult) -> Result<weather::ParsedReport, FetchErrorKind> {
        match response {
            Ok(mut response) => {
                let status = u16::from(response.status());
                let body = response.take_body().unwrap_or_default();
                weather::evaluate_response(status, &body)
            }
            // Non-success statuses arrive as errors, body attached.
            Err(HttpError::Http { code, body, .. }) => {
                weather::evaluate_response(u16::from(code), &body.unwrap_or_default())
            }
            Err(error) => {
                warn!(%error, "weather request transport failure");
                Err(FetchErrorKind::Network)
            }
        }
    }

    fn apply_report(model: &mut Model, caps: &Capabilities, parsed: weather::ParsedReport) {
        let snapshot = parsed.snapshot;
        if snapshot.has_name() {
            if model.history.record(&snapshot.location_name) {
                Self::persist_json(caps, StoreKey::History, &model.history.names());
            }
            model.last_city = Some(snapshot.location_name.clone());
            Self::persist_raw(
                caps,
                StoreKey::LastCity,
                snapshot.location_name.clone().into_bytes(),
            );
        }
        let pick = model
            .theme
            .apply_weather(snapshot.theme_inputs(), model.settings.theme_mode);
        if let Some(theme) = pick {
            Self::request_variant(caps, theme);
        }
        model.map_token = parsed.map_token;
        model.phase = SessionPhase::Resolved(Box::new(snapshot));
    }

    fn request_variant(caps: &Capabilities, theme: ThemeKey) {
        caps.random
            .uniform(BACKGROUND_VARIANTS, move |output| {
                Event::BackgroundVariantPicked { theme, output }
            });
    }

    fn send_credential_request(
        model: &mut Model,
        caps: &Capabilities,
        op: CredentialOp,
        body: Vec<u8>,
    ) {
        model.auth_pending = true;
        model.auth_error = None;
        let url = match Url::parse(&model.api_base).and_then(|base| base.join(op.path())) {
            Ok(url) => url,
            Err(error) => {
                warn!(%error, "cannot build credential url");
                model.auth_pending = false;
                model.auth_error = Some(CredentialFailure::service(op));
                return;
            }
        };
        caps.http
            .post(url.as_str())
            .header("content-type", "application/json")
            .body(body)
            .send(move |response| Event::AuthReceived {
                op,
                response: Box::new(response),
            });
    }

    fn send_assistant_request(model: &mut Model, caps: &Capabilities, text: &str) {
        let url = match Url::parse(&model.api_base).and_then(|base| base.join(chat::ASSISTANT_PATH))
        {
            Ok(url) => url,
            Err(error) => {
                warn!(%error, "cannot build assistant url");
                model.chat.push_assistant(chat::FALLBACK_REPLY);
                return;
            }
        };
        let context = model.phase.snapshot().map(ChatContext::from_snapshot);
        let body = chat::ask_body(text, context.as_ref());
        model.chat.pending = true;
        let mut request = caps
            .http
            .post(url.as_str())
            .header("content-type", "application/json");
        if let Some(token) = &model.token {
            request = request.header("x-auth-token", token.expose_secret().as_str());
        }
        request.body(body).send(move |response| Event::ChatReplyReceived {
            response: Box::new(response),
        });
    }

    fn persist_json<T: serde::Serialize>(caps: &Capabilities, key: StoreKey, value: &T) {
        if let Some(bytes) = encode_json(key, value) {
            Self::persist_raw(caps, key, bytes);
        }
    }

    fn persist_raw(caps: &Capabilities, key: StoreKey, bytes: Vec<u8>) {
        caps.key_value
            .set(key.key().to_string(), bytes, move |result| {
                Event::StoreWritten { key, result }
            });
    }

    fn delete_key(caps: &Capabilities, key: StoreKey) {
        caps.key_value
            .delete(key.key().to_string(), move |result| Event::StoreWritten {
                key,
                result,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_url_for_city_query() {
        let location = LocationQuery::city("São Paulo").unwrap();
        let url = App::report_url("https://api.brella.app", &location).unwrap();
        assert_eq!(url.path(), "/api/report");
        assert_eq!(url.query_pairs().count(), 1);
        assert_eq!(
            url.query_pairs().next().unwrap().1.as_ref(),
            "São Paulo"
        );
    }

    #[test]
    fn test_report_url_for_coordinates() {
        let location = LocationQuery::coordinates(51.5073, -0.1276);
        let url = App::report_url("https://api.brella.app", &location).unwrap();
        assert_eq!(url.query(), Some("lat=51.5073&lon=-0.1276"));
    }

    #[test]
    fn test_event_stays_small() {
        // Responses and other bulky payloads ride boxed.
        assert!(std::mem::size_of::<Event>() <= 128);
    }
}
