//! Session State: the current authenticated identity.
//!
//! The identity lives in memory and is mirrored to local storage under
//! [`keys::USER`] so a later process start resumes the session. It is set on
//! login/register success and cleared on logout.

use lumina_core::{Email, EmailError, Identity};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::gateway::GatewayError;
use crate::store::{LocalStore, keys, load_json, save_json};

/// Errors that can occur during login or registration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// A required form field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The service refused the credentials, or could not be reached.
    #[error("{0}")]
    Rejected(#[from] GatewayError),
}

/// Session-held identity.
#[derive(Debug, Clone, Default)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    /// Resume the session persisted in `store`, if any.
    #[must_use]
    pub fn restore(store: &dyn LocalStore) -> Self {
        let identity: Option<Identity> = load_json(store, keys::USER);
        if let Some(identity) = &identity {
            tracing::debug!(user_id = %identity.id, "Resumed persisted session");
            set_sentry_user(&identity.id, Some(identity.email.as_str()));
        }
        Self { identity }
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Make `identity` the active one and persist it.
    pub fn establish(&mut self, identity: Identity, store: &dyn LocalStore) -> &Identity {
        if let Err(e) = save_json(store, keys::USER, &identity) {
            tracing::warn!(error = %e, "Failed to persist session");
        }
        tracing::info!(user_id = %identity.id, "Session established");
        set_sentry_user(&identity.id, Some(identity.email.as_str()));
        self.identity.insert(identity)
    }

    /// Drop the active identity, returning it.
    pub fn clear(&mut self, store: &dyn LocalStore) -> Option<Identity> {
        if let Err(e) = store.remove(keys::USER) {
            tracing::warn!(error = %e, "Failed to remove persisted session");
        }
        clear_sentry_user();
        let previous = self.identity.take();
        if let Some(identity) = &previous {
            tracing::info!(user_id = %identity.id, "Session cleared");
        }
        previous
    }
}

/// Validate the login form before it reaches the service.
///
/// # Errors
///
/// [`AuthError::InvalidEmail`] or [`AuthError::MissingField`].
pub fn validate_login(email: &str, password: &SecretString) -> Result<Email, AuthError> {
    let email = Email::parse(email)?;
    if password.expose_secret().is_empty() {
        return Err(AuthError::MissingField("password"));
    }
    Ok(email)
}

/// Validate the registration form before it reaches the service.
///
/// Returns the trimmed display name and the parsed email.
///
/// # Errors
///
/// [`AuthError::InvalidEmail`] or [`AuthError::MissingField`].
pub fn validate_registration<'a>(
    name: &'a str,
    email: &str,
    password: &SecretString,
) -> Result<(&'a str, Email), AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::MissingField("name"));
    }
    let email = validate_login(email, password)?;
    Ok((name, email))
}
