//! Key-value persistence layout.
//!
//! Key names and encodings are shared with earlier releases, so hydration
//! must keep accepting them verbatim: `appSettings` and `user` hold JSON
//! objects, `quickCities` a JSON string array, `lastCity` and `token` raw
//! UTF-8.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Settings,
    History,
    LastCity,
    Token,
    User,
}

impl StoreKey {
    /// Every key read back at startup, in hydration order.
    pub const ALL: [Self; 5] = [
        Self::Settings,
        Self::History,
        Self::LastCity,
        Self::Token,
        Self::User,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Settings => "appSettings",
            Self::History => "quickCities",
            Self::LastCity => "lastCity",
            Self::Token => "token",
            Self::User => "user",
        }
    }
}

/// Serializes a value for storage. Returns `None` (and logs) on encode
/// failure so a broken write never aborts the update that triggered it.
pub fn encode_json<T: Serialize>(key: StoreKey, value: &T) -> Option<Vec<u8>> {
    match serde_json::to_vec(value) {
        Ok(bytes) => Some(bytes),
        Err(error) => {
            tracing::error!(key = key.key(), %error, "failed to encode value for storage");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match_persisted_names() {
        assert_eq!(StoreKey::Settings.key(), "appSettings");
        assert_eq!(StoreKey::History.key(), "quickCities");
        assert_eq!(StoreKey::LastCity.key(), "lastCity");
        assert_eq!(StoreKey::Token.key(), "token");
        assert_eq!(StoreKey::User.key(), "user");
    }

    #[test]
    fn test_all_covers_every_key() {
        assert_eq!(StoreKey::ALL.len(), 5);
    }

    #[test]
    fn test_encode_json_round_trips() {
        let bytes = encode_json(StoreKey::History, &vec!["London", "Paris"]).unwrap();
        let back: Vec<String> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, ["London", "Paris"]);
    }
}
