//! Error types for the SOS REST binding.

use thiserror::Error;

/// Result type alias using SosError.
pub type SosResult<T> = Result<T, SosError>;

/// Primary error type for decoding requests against the observations resource.
///
/// Every variant is a rejected decode: no partial request is ever returned
/// alongside one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SosError {
    // === Request shape errors ===
    #[error("Bad request for resource '{resource}': {message}")]
    AmbiguousRequest { resource: String, message: String },

    #[error("The value '{value}' of the parameter '{param}' is invalid")]
    UnrecognizedParameter { param: String, value: String },

    #[error("No valid KVP parameter found in request: {0}")]
    NoValidParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameterValue { param: String, message: String },

    // === Operation errors ===
    #[error("Operation not supported: {0}")]
    UnsupportedOperation(String),

    // === Payload errors ===
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    // === Infrastructure errors ===
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl SosError {
    /// Build an `UnrecognizedParameter` error.
    pub fn unrecognized(param: impl Into<String>, value: impl Into<String>) -> Self {
        SosError::UnrecognizedParameter {
            param: param.into(),
            value: value.into(),
        }
    }

    /// Build an `InvalidParameterValue` error.
    pub fn invalid_value(param: impl Into<String>, message: impl Into<String>) -> Self {
        SosError::InvalidParameterValue {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Get the OWS exception code for this error.
    pub fn ows_exception_code(&self) -> &'static str {
        match self {
            SosError::AmbiguousRequest { .. } => "NoApplicableCode",
            SosError::UnrecognizedParameter { .. } => "InvalidParameterValue",
            SosError::NoValidParameter(_) => "MissingParameterValue",
            SosError::InvalidParameterValue { .. } => "InvalidParameterValue",
            SosError::UnsupportedOperation(_) => "OperationNotSupported",
            SosError::MalformedBody(_) => "InvalidRequest",
            SosError::Internal(_) => "NoApplicableCode",
        }
    }

    /// Machine readable reason, distinct per variant.
    pub fn reason(&self) -> &'static str {
        match self {
            SosError::AmbiguousRequest { .. } => "ambiguous-request",
            SosError::UnrecognizedParameter { .. } => "unrecognized-parameter",
            SosError::NoValidParameter(_) => "no-valid-parameter",
            SosError::InvalidParameterValue { .. } => "invalid-parameter-value",
            SosError::UnsupportedOperation(_) => "unsupported-operation",
            SosError::MalformedBody(_) => "malformed-body",
            SosError::Internal(_) => "internal-error",
        }
    }

    /// The offending parameter, if the error is attributable to one.
    pub fn locator(&self) -> Option<&str> {
        match self {
            SosError::UnrecognizedParameter { param, .. }
            | SosError::InvalidParameterValue { param, .. } => Some(param),
            _ => None,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            SosError::AmbiguousRequest { .. }
            | SosError::UnrecognizedParameter { .. }
            | SosError::NoValidParameter(_)
            | SosError::InvalidParameterValue { .. }
            | SosError::MalformedBody(_) => 400,

            SosError::UnsupportedOperation(_) => 405,

            SosError::Internal(_) => 500,
        }
    }

    /// Whether the caller (not the service) is at fault.
    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }
}

impl From<serde_json::Error> for SosError {
    fn from(err: serde_json::Error) -> Self {
        SosError::Internal(format!("JSON error: {}", err))
    }
}
