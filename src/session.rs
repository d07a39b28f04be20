//! Fetch lifecycle state: the session phase machine, failure kinds with
//! their user-facing messages, monotone request sequencing and the startup
//! source ladder.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::weather::WeatherSnapshot;
use crate::MAX_CITY_QUERY_CHARS;

/// A place to fetch weather for: a city name or a coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationQuery {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum QueryError {
    #[error("query is empty")]
    Empty,
    #[error("query exceeds {MAX_CITY_QUERY_CHARS} characters")]
    TooLong,
}

impl LocationQuery {
    /// Builds a city query from user input. Input is trimmed; empty input
    /// and input beyond the upstream's 50-character bound are rejected
    /// before any effect is issued.
    pub fn city(name: &str) -> Result<Self, QueryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QueryError::Empty);
        }
        if name.chars().count() > MAX_CITY_QUERY_CHARS {
            return Err(QueryError::TooLong);
        }
        Ok(Self::City(name.to_string()))
    }

    #[must_use]
    pub const fn coordinates(lat: f64, lon: f64) -> Self {
        Self::Coordinates { lat, lon }
    }
}

/// Why a weather fetch failed. Each kind carries one stable message shown
/// to the user; raw upstream text never surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    NotFound,
    RateLimited,
    Network,
}

impl FetchErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::RateLimited => "RATE_LIMITED",
            Self::Network => "NETWORK_ERROR",
        }
    }

    #[must_use]
    pub const fn user_facing_message(self) -> &'static str {
        match self {
            Self::NotFound => "City not found. Please try another location.",
            Self::RateLimited => "Too many requests. Please try again later.",
            Self::Network => "Unable to fetch weather data. Check your connection.",
        }
    }
}

/// The fetch state machine. The phases are mutually exclusive by
/// construction: a snapshot exists only in `Resolved`, an error kind only
/// in `Failed`, and a failed fetch drops the prior snapshot rather than
/// keeping it stale.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Loading,
    Resolved(Box<WeatherSnapshot>),
    Failed(FetchErrorKind),
}

impl SessionPhase {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            Self::Resolved(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<FetchErrorKind> {
        match self {
            Self::Failed(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Monotone fetch sequence numbers. Every issued fetch gets a fresh number;
/// a response is applied only when it belongs to the newest issued request,
/// so an earlier, slower request can never overwrite a later one (and a
/// superseded response never flickers in while the newest is in flight).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestSequencer {
    last_issued: u64,
}

impl RequestSequencer {
    pub fn issue(&mut self) -> u64 {
        self.last_issued += 1;
        self.last_issued
    }

    #[must_use]
    pub const fn is_current(self, seq: u64) -> bool {
        seq == self.last_issued
    }

    #[must_use]
    pub const fn last_issued(self) -> u64 {
        self.last_issued
    }
}

/// Startup source ladder progress. Hydration of the persisted keys runs
/// first; each source is attempted at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Startup {
    /// Waiting for the persisted keys to hydrate.
    #[default]
    Hydrating,
    /// No home or remembered city; waiting on the device position.
    Locating,
    /// A first fetch was chosen; the ladder is done.
    Done,
}
