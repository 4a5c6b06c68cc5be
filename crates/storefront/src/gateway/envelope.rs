//! Uniform response wrapper returned by every gateway call.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Message carried by every envelope produced from a transport failure.
pub const CONNECTION_ERROR: &str = "Connection Error";

/// Errors extracted from an unsuccessful [`Envelope`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The service reported `success: false`, or the call never reached it.
    #[error("{0}")]
    Rejected(String),

    /// The service reported success but sent no payload.
    #[error("response carried no data")]
    MissingData,
}

impl GatewayError {
    /// Whether this is the generic transport failure.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Rejected(message) if message == CONNECTION_ERROR)
    }
}

/// `{ success, data?, message? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// A successful envelope carrying `data`.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// A failed envelope with a human-readable message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// The generic envelope for network, status or parse failures.
    #[must_use]
    pub fn connection_error() -> Self {
        Self::failure(CONNECTION_ERROR)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Transform the payload, keeping the flag and message.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            data: self.data.map(f),
            message: self.message,
        }
    }

    /// Convert into a `Result` over the payload.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Rejected`] with the service message when `success` is
    /// false, [`GatewayError::MissingData`] when a successful envelope has no
    /// payload.
    pub fn into_result(self) -> Result<T, GatewayError> {
        if !self.success {
            return Err(self.rejection());
        }
        self.data.ok_or(GatewayError::MissingData)
    }

    /// Convert a status-only envelope, returning the service message.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Rejected`] when `success` is false.
    pub fn into_status(self) -> Result<Option<String>, GatewayError> {
        if self.success {
            Ok(self.message)
        } else {
            Err(self.rejection())
        }
    }

    fn rejection(self) -> GatewayError {
        GatewayError::Rejected(
            self.message
                .unwrap_or_else(|| "Request failed".to_string()),
        )
    }
}

/// Payload of a status-only response; accepts and discards any JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Ack;

impl<'de> Deserialize<'de> for Ack {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_envelope_from_service() {
        let envelope: Envelope<Vec<u32>> =
            serde_json::from_str(r#"{"success":false,"message":"Product not found"}"#).unwrap();
        assert_eq!(
            envelope.into_result(),
            Err(GatewayError::Rejected("Product not found".to_string()))
        );
    }

    #[test]
    fn test_success_without_data() {
        let envelope: Envelope<Ack> =
            serde_json::from_str(r#"{"success":true,"message":"Added"}"#).unwrap();
        assert_eq!(envelope.clone().into_status(), Ok(Some("Added".to_string())));
        assert_eq!(envelope.into_result(), Err(GatewayError::MissingData));
    }

    #[test]
    fn test_connection_error_is_generic() {
        let err = Envelope::<()>::connection_error().into_result().unwrap_err();
        assert!(err.is_connection_error());
        assert_eq!(err.to_string(), "Connection Error");
    }

    #[test]
    fn test_rejection_without_message() {
        let envelope: Envelope<()> = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(
            envelope.into_status(),
            Err(GatewayError::Rejected("Request failed".to_string()))
        );
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Row {
        id: u32,
    }

    fn parse<T: serde::de::DeserializeOwned>(body: &str) -> Envelope<T> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_payload_without_default() {
        let found: Envelope<Row> = parse(r#"{"success":true,"data":{"id":3}}"#);
        assert_eq!(found.into_result(), Ok(Row { id: 3 }));

        let missing: Envelope<Row> = parse(r#"{"success":false,"message":"Product not found"}"#);
        assert_eq!(missing.data, None);
        assert_eq!(missing.message.as_deref(), Some("Product not found"));
    }

    #[test]
    fn test_map_keeps_message() {
        let envelope = Envelope {
            success: true,
            data: Some(2),
            message: Some("ok".to_string()),
        }
        .map(|n| n * 10);
        assert_eq!(envelope.data, Some(20));
        assert_eq!(envelope.message.as_deref(), Some("ok"));
    }
}
