//! Credential session: wire contracts for register/login, the persisted
//! user record, and failure classification.
//!
//! The credential service's short failure message is surfaced to the caller
//! verbatim; the submitted password travels as a [`SecretString`] and never
//! reaches logs or the view model.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Signed-in user record, persisted as JSON under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// An authenticated session: opaque bearer token plus the user record.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: SecretString,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialOp {
    Register,
    Login,
}

impl CredentialOp {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Register => "/api/auth/register",
            Self::Login => "/api/auth/login",
        }
    }

    /// Message used when the service did not provide one (transport
    /// failure, empty body).
    #[must_use]
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::Register => "Registration failed",
            Self::Login => "Login failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialErrorKind {
    /// Bad or missing fields on register.
    Validation,
    /// Register against an existing account.
    Conflict,
    /// Login rejected.
    InvalidCredentials,
    /// The service itself failed or replied unintelligibly.
    Service,
}

impl CredentialErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Conflict => "CONFLICT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Service => "SERVICE_ERROR",
        }
    }
}

/// A failed credential operation: a kind for diagnostics plus the short
/// message shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialFailure {
    pub kind: CredentialErrorKind,
    pub message: String,
}

impl CredentialFailure {
    #[must_use]
    pub fn service(op: CredentialOp) -> Self {
        Self {
            kind: CredentialErrorKind::Service,
            message: op.fallback_message().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthOkWire {
    token: String,
    user: AuthUser,
}

#[derive(Debug, Default, Deserialize)]
struct AuthErrWire {
    #[serde(default)]
    error: String,
}

/// JSON body for a register call. The secret is exposed only here, at
/// encoding time.
#[must_use]
pub fn register_body(name: &str, email: &str, password: &SecretString) -> Vec<u8> {
    serde_json::json!({
        "name": name,
        "email": email,
        "password": password.expose_secret(),
    })
    .to_string()
    .into_bytes()
}

/// JSON body for a login call.
#[must_use]
pub fn login_body(email: &str, password: &SecretString) -> Vec<u8> {
    serde_json::json!({
        "email": email,
        "password": password.expose_secret(),
    })
    .to_string()
    .into_bytes()
}

/// Evaluates a credential service response. On success the token and user
/// record become an [`AuthSession`]; on failure the service's message is
/// carried verbatim with a classified kind.
pub fn evaluate_auth_response(
    op: CredentialOp,
    status: u16,
    body: &[u8],
) -> Result<AuthSession, CredentialFailure> {
    if (200..300).contains(&status) {
        let ok: AuthOkWire =
            serde_json::from_slice(body).map_err(|_| CredentialFailure::service(op))?;
        return Ok(AuthSession {
            token: SecretString::new(ok.token),
            user: ok.user,
        });
    }

    let wire: AuthErrWire = serde_json::from_slice(body).unwrap_or_default();
    let message = if wire.error.is_empty() {
        op.fallback_message().to_string()
    } else {
        wire.error
    };
    let kind = if status >= 500 {
        CredentialErrorKind::Service
    } else {
        match op {
            CredentialOp::Login => CredentialErrorKind::InvalidCredentials,
            CredentialOp::Register => {
                if message == "User already exists" {
                    CredentialErrorKind::Conflict
                } else {
                    CredentialErrorKind::Validation
                }
            }
        }
    };
    Err(CredentialFailure { kind, message })
}
