//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for the operations of [`Storefront`].
//! Errors worth investigating are captured to Sentry by [`AppError::report`];
//! the view layer shows [`AppError::user_message`].
//!
//! [`Storefront`]: crate::storefront::Storefront

use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::details::ReviewError;
use crate::gateway::GatewayError;
use crate::session::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The CRUD service refused the request or could not be reached.
    #[error("Service error: {0}")]
    Gateway(#[from] GatewayError),

    /// Login or registration failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Review submission failed.
    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    /// Order submission was rejected.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Message suitable for showing to the shopper.
    ///
    /// Service messages are passed through verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) => "Internal error".to_string(),
            Self::Gateway(err) => err.to_string(),
            Self::Auth(err) => err.to_string(),
            Self::Review(err) => err.to_string(),
            Self::Checkout(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
        }
    }

    /// Whether this error points at a fault rather than at shopper input.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Gateway(err) => err.is_connection_error(),
            Self::Auth(AuthError::Rejected(err)) | Self::Review(ReviewError::Gateway(err)) => {
                err.is_connection_error()
            }
            _ => false,
        }
    }

    /// Log the error, capturing faults to Sentry.
    pub fn report(&self) {
        if self.is_fault() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "Storefront request rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "add_to_cart", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::CONNECTION_ERROR;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 42".to_string());
        assert_eq!(err.to_string(), "Not found: product 42");
        assert_eq!(err.user_message(), "product 42 not found");
    }

    #[test]
    fn test_service_message_passes_through() {
        let err = AppError::from(GatewayError::Rejected("Email already exists".to_string()));
        assert_eq!(err.user_message(), "Email already exists");
        assert!(!err.is_fault());
    }

    #[test]
    fn test_connection_errors_are_faults() {
        let err = AppError::from(AuthError::Rejected(GatewayError::Rejected(
            CONNECTION_ERROR.to_string(),
        )));
        assert!(err.is_fault());
        assert!(!AppError::from(CheckoutError::EmptyCart).is_fault());
    }

    #[test]
    fn test_config_error_is_internal() {
        let err = AppError::from(ConfigError::InvalidEnvVar(
            "LUMINA_API_URL".to_string(),
            "relative URL without a base".to_string(),
        ));
        assert_eq!(err.user_message(), "Internal error");
        assert!(err.is_fault());
    }
}
