//! Weather fetch lifecycle, end to end through resolved effects.

use brella_core::capabilities::RandomOutput;
use brella_core::settings::{SettingsPatch, ThemeChoice, ThemeMode};
use brella_core::theme::ThemeKey;
use brella_core::{App, Effect, Event, Model};
use crux_core::testing::AppTester;
use crux_http::http::StatusCode;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};
use crux_http::HttpError;
use crux_kv::KeyValueOperation;
use serde_json::json;

fn report_body(name: &str, code: i64, icon: &str, temp: f64) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "weather": {
            "name": name,
            "coord": { "lat": 51.5073, "lon": -0.1276 },
            "weather": [ { "id": code, "description": "conditions", "icon": icon } ],
            "main": { "temp": temp, "feels_like": temp, "temp_min": temp - 2.0,
                      "temp_max": temp + 2.0, "humidity": 70, "pressure": 1012 },
            "wind": { "speed": 3.0 }
        },
        "forecast": { "list": [] },
        "aqi": 2,
        "mapToken": "map-token"
    }))
    .unwrap()
}

fn take_http(effects: impl IntoIterator<Item = Effect>) -> Vec<crux_core::Request<HttpRequest>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .collect()
}

fn kv_write_keys(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::KeyValue(request) => match &request.operation {
                KeyValueOperation::Set { key, .. } => Some(key.clone()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

#[test]
fn fetch_success_resolves_snapshot_history_and_theme() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(
        Event::CitySearched {
            query: "  London ".into(),
        },
        &mut model,
    );
    assert!(model.phase.is_loading());
    let mut requests = take_http(update.effects);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].operation.method, "GET");
    assert!(requests[0].operation.url.contains("city=London"));

    let response = HttpResult::Ok(
        HttpResponse::ok()
            .body(report_body("London", 803, "04n", 11.0))
            .build(),
    );
    let update = app.resolve(&mut requests[0], response).expect("to resolve");
    let mut follow_ups = Vec::new();
    for event in update.events {
        follow_ups.extend(app.update(event, &mut model).effects);
    }

    let snapshot = model.phase.snapshot().expect("resolved snapshot");
    assert_eq!(snapshot.location_name, "London");
    assert_eq!(model.history.names(), vec!["London"]);
    assert_eq!(model.last_city.as_deref(), Some("London"));
    assert_eq!(model.map_token.as_deref(), Some("map-token"));

    let writes = kv_write_keys(&follow_ups);
    assert!(writes.iter().any(|key| key == "quickCities"));
    assert!(writes.iter().any(|key| key == "lastCity"));

    // Broken clouds at night resolves the night theme, which carries a
    // two-variant background.
    assert_eq!(model.theme.active, ThemeKey::Night);
    let mut randoms: Vec<_> = follow_ups
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Random(request) => Some(request),
            _ => None,
        })
        .collect();
    assert_eq!(randoms.len(), 1);
    let update = app.resolve(&mut randoms[0], RandomOutput(2)).expect("to resolve");
    for event in update.events {
        app.update(event, &mut model);
    }
    assert_eq!(
        model.theme.background.as_deref(),
        Some("/weather-backgrounds/night-2.png")
    );
}

#[test]
fn late_response_for_superseded_fetch_is_discarded() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::CitySearched { query: "Paris".into() }, &mut model);
    let mut request_a = take_http(update.effects).pop().expect("first request");
    let update = app.update(Event::CitySearched { query: "Tokyo".into() }, &mut model);
    let mut request_b = take_http(update.effects).pop().expect("second request");

    // The newer request settles first.
    let response = HttpResult::Ok(
        HttpResponse::ok()
            .body(report_body("Tokyo", 800, "01d", 22.0))
            .build(),
    );
    let update = app.resolve(&mut request_b, response).expect("to resolve");
    for event in update.events {
        app.update(event, &mut model);
    }
    assert_eq!(model.phase.snapshot().unwrap().location_name, "Tokyo");

    // The older one arrives late and must not overwrite anything.
    let response = HttpResult::Ok(
        HttpResponse::ok()
            .body(report_body("Paris", 500, "10d", 14.0))
            .build(),
    );
    let update = app.resolve(&mut request_a, response).expect("to resolve");
    for event in update.events {
        app.update(event, &mut model);
    }
    assert_eq!(model.phase.snapshot().unwrap().location_name, "Tokyo");
    assert_eq!(model.history.names(), vec!["Tokyo"]);
    assert_eq!(model.theme.active, ThemeKey::Sunny);
}

#[test]
fn failure_statuses_map_to_their_kinds_and_drop_the_snapshot() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    // Establish a resolved snapshot first.
    let update = app.update(Event::CitySearched { query: "Oslo".into() }, &mut model);
    let mut request = take_http(update.effects).pop().unwrap();
    let response = HttpResult::Ok(
        HttpResponse::ok()
            .body(report_body("Oslo", 800, "01d", 18.0))
            .build(),
    );
    let update = app.resolve(&mut request, response).expect("to resolve");
    for event in update.events {
        app.update(event, &mut model);
    }
    assert!(model.phase.snapshot().is_some());

    // A 404 on the next fetch replaces it with the failure, snapshot gone.
    // Non-success statuses reach the core as errors carrying the status.
    let update = app.update(Event::CitySearched { query: "Nowhere".into() }, &mut model);
    let mut request = take_http(update.effects).pop().unwrap();
    let update = app
        .resolve(
            &mut request,
            HttpResult::Err(HttpError::Http {
                code: StatusCode::NotFound,
                message: "Not Found".to_string(),
                body: Some(Vec::new()),
            }),
        )
        .expect("to resolve");
    for event in update.events {
        app.update(event, &mut model);
    }
    assert!(model.phase.snapshot().is_none());
    let view = app.view(&model);
    assert_eq!(
        serde_json::to_value(&view.session).unwrap()["message"],
        "City not found. Please try another location."
    );

    // 429 maps to the rate-limit message.
    let update = app.update(Event::CitySearched { query: "Oslo".into() }, &mut model);
    let mut request = take_http(update.effects).pop().unwrap();
    let update = app
        .resolve(
            &mut request,
            HttpResult::Err(HttpError::Http {
                code: StatusCode::TooManyRequests,
                message: "Too Many Requests".to_string(),
                body: None,
            }),
        )
        .expect("to resolve");
    for event in update.events {
        app.update(event, &mut model);
    }
    let view = app.view(&model);
    assert_eq!(
        serde_json::to_value(&view.session).unwrap()["message"],
        "Too many requests. Please try again later."
    );

    // An undecodable success body counts as a network failure.
    let update = app.update(Event::CitySearched { query: "Oslo".into() }, &mut model);
    let mut request = take_http(update.effects).pop().unwrap();
    let update = app
        .resolve(
            &mut request,
            HttpResult::Ok(HttpResponse::ok().body("<html>gateway</html>").build()),
        )
        .expect("to resolve");
    for event in update.events {
        app.update(event, &mut model);
    }
    let view = app.view(&model);
    assert_eq!(
        serde_json::to_value(&view.session).unwrap()["message"],
        "Unable to fetch weather data. Check your connection."
    );
}

#[test]
fn over_long_query_fails_without_any_request() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(
        Event::CitySearched {
            query: "x".repeat(51),
        },
        &mut model,
    );
    assert!(take_http(update.effects).is_empty());
    assert!(model.phase.snapshot().is_none());
    let view = app.view(&model);
    assert_eq!(
        serde_json::to_value(&view.session).unwrap()["message"],
        "City not found. Please try another location."
    );

    // Blank input is ignored outright.
    let update = app.update(Event::CitySearched { query: "   ".into() }, &mut model);
    assert!(update.effects.is_empty());
}

#[test]
fn manual_palette_overrides_weather_until_auto_returns() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    // Resolve a thunderstorm so auto mode lands on the storm theme.
    let update = app.update(Event::CitySearched { query: "Bergen".into() }, &mut model);
    let mut request = take_http(update.effects).pop().unwrap();
    let response = HttpResult::Ok(
        HttpResponse::ok()
            .body(report_body("Bergen", 212, "11d", 16.0))
            .build(),
    );
    let update = app.resolve(&mut request, response).expect("to resolve");
    for event in update.events {
        app.update(event, &mut model);
    }
    assert_eq!(model.theme.active, ThemeKey::Storm);

    let update = app.update(
        Event::SettingsChanged(SettingsPatch {
            theme_mode: Some(ThemeMode::Manual),
            theme_background: Some(ThemeChoice::Indigo),
            ..SettingsPatch::default()
        }),
        &mut model,
    );
    assert_eq!(model.theme.active, ThemeKey::Indigo);
    assert_eq!(model.theme.background, None);
    assert!(kv_write_keys(&update.effects).iter().any(|k| k == "appSettings"));

    // Returning to auto re-resolves from the retained storm conditions
    // without a fresh fetch.
    let update = app.update(
        Event::SettingsChanged(SettingsPatch {
            theme_mode: Some(ThemeMode::Auto),
            ..SettingsPatch::default()
        }),
        &mut model,
    );
    assert!(take_http(update.effects).is_empty());
    assert_eq!(model.theme.active, ThemeKey::Storm);
}

#[test]
fn clearing_history_persists_the_empty_list() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    model.history.record("London");
    model.history.record("Paris");

    let update = app.update(Event::HistoryCleared, &mut model);
    assert!(model.history.is_empty());

    let payload = update.effects.iter().find_map(|effect| match effect {
        Effect::KeyValue(request) => match &request.operation {
            KeyValueOperation::Set { key, value } if key == "quickCities" => Some(value.clone()),
            _ => None,
        },
        _ => None,
    });
    assert_eq!(payload.as_deref(), Some(b"[]".as_slice()));
}
