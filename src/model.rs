//! The core's single state record.
//!
//! Everything the update loop mutates and the view projects lives here.
//! Nothing in the model is serialized wholesale; persistence goes through
//! the individual store keys.

use secrecy::SecretString;

use crate::auth::{AuthUser, CredentialFailure};
use crate::chat::ChatThread;
use crate::history::SearchHistory;
use crate::session::{RequestSequencer, SessionPhase, Startup};
use crate::settings::Settings;
use crate::theme::ThemeState;
use crate::DEFAULT_API_BASE;

pub struct Model {
    /// Base URL of the weather proxy. Tests point this at a fixture host.
    pub api_base: String,

    pub settings: Settings,
    pub settings_open: bool,

    pub theme: ThemeState,
    pub history: SearchHistory,

    pub phase: SessionPhase,
    pub sequencer: RequestSequencer,
    pub startup: Startup,
    /// Store keys still awaiting their hydration read.
    pub pending_hydration: usize,

    /// Last successfully resolved location name, for the next launch.
    pub last_city: Option<String>,
    /// Map pane access token riding along with the latest report.
    pub map_token: Option<String>,

    pub token: Option<SecretString>,
    pub user: Option<AuthUser>,
    pub auth_pending: bool,
    pub auth_error: Option<CredentialFailure>,

    pub chat: ChatThread,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            settings: Settings::default(),
            settings_open: false,
            theme: ThemeState::default(),
            history: SearchHistory::default(),
            phase: SessionPhase::default(),
            sequencer: RequestSequencer::default(),
            startup: Startup::default(),
            pending_hydration: 0,
            last_city: None,
            map_token: None,
            token: None,
            user: None,
            auth_pending: false,
            auth_error: None,
            chat: ChatThread::default(),
        }
    }
}

impl Model {
    /// A session is active only when both persisted halves are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}
