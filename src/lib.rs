// lib.rs - Brella shared core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod auth;
pub mod capabilities;
pub mod chat;
pub mod history;
pub mod model;
pub mod session;
pub mod settings;
pub mod storage;
pub mod theme;
pub mod units;
pub mod view;
pub mod weather;

pub use app::{App, Event};
pub use capabilities::{Capabilities, Effect};
pub use model::Model;
pub use view::ViewModel;

/// Base URL the shell-side proxy is reachable at. Shells and tests may
/// override `Model::api_base` before the first event.
pub const DEFAULT_API_BASE: &str = "https://api.brella.app";

/// City used when no home city, no remembered city and no device
/// location is available at startup.
pub const FALLBACK_CITY: &str = "London";

pub const HISTORY_CAPACITY: usize = 5;
pub const MAX_CITY_QUERY_CHARS: usize = 50;
pub const HOT_TEMP_THRESHOLD_C: f64 = 32.0;
pub const BACKGROUND_VARIANTS: u8 = 2;

/// Forecast slicing: the provider delivers 3-hour steps; the first 24
/// entries feed the hourly rail and every 8th entry (one per day, 7 days)
/// feeds the daily rail.
pub const HOURLY_POINTS: usize = 24;
pub const DAILY_STRIDE: usize = 8;
pub const DAILY_POINTS: usize = 7;
