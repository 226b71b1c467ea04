//! Shared test utilities for the sos-rest workspace.
//!
//! This crate provides common testing infrastructure including:
//! - A binding configuration pointing at a fixed test service URL
//! - Builders for observation documents in the REST binding XML form
//! - Temporary configuration files
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, ObservationXml};
//! ```

pub mod documents;
pub mod fixtures;

// Re-export commonly used items at the crate root
pub use documents::*;
pub use fixtures::*;

/// Assert that a result is an error of the given `SosError` variant.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_sos_error;
///
/// assert_sos_error!(decoder.decode_delete(None), SosError::UnsupportedOperation(_));
/// ```
#[macro_export]
macro_rules! assert_sos_error {
    ($result:expr, $pattern:pat) => {{
        match $result {
            Err(ref err) if matches!(err, $pattern) => {}
            Err(err) => panic!(
                "assertion failed: expected error `{}`, got `{:?}`",
                stringify!($pattern),
                err
            ),
            Ok(value) => panic!(
                "assertion failed: expected error `{}`, got Ok(`{:?}`)",
                stringify!($pattern),
                value
            ),
        }
    }};
}

#[cfg(test)]
mod tests {
    use sos_common::SosError;

    #[test]
    fn test_assert_sos_error_passes() {
        let result: Result<(), SosError> = Err(SosError::Internal("x".to_string()));
        assert_sos_error!(result, SosError::Internal(_));
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_sos_error_fails_on_other_variant() {
        let result: Result<(), SosError> = Err(SosError::Internal("x".to_string()));
        assert_sos_error!(result, SosError::MalformedBody(_));
    }

    #[test]
    #[should_panic(expected = "got Ok")]
    fn test_assert_sos_error_fails_on_ok() {
        let result: Result<u8, SosError> = Ok(1);
        assert_sos_error!(result, SosError::Internal(_));
    }
}
