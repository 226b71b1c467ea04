//! Common test fixtures for sos-rest tests.
//!
//! This module provides pre-defined configuration and request data that
//! represents common scenarios on the observations resource.

use std::io::Write;

use sos_common::BindingConfig;
use tempfile::NamedTempFile;

/// Base URL used by the test binding configuration.
pub const SERVICE_URL: &str = "http://svc";

/// Binding configuration with [`SERVICE_URL`] and default tags.
pub fn binding_config() -> BindingConfig {
    BindingConfig::with_service_url(SERVICE_URL)
}

/// Offering link targets on the test service.
pub mod offerings {
    pub const OFF1: &str = "http://svc/offerings/off1";
    pub const OFF2: &str = "http://svc/offerings/off2";

    /// Offering hosted elsewhere.
    pub const FOREIGN: &str = "http://other.example.org/sos/offerings/remote-off";
}

/// Procedure and feature references.
pub mod references {
    pub const LOCAL_PROCEDURE: &str = "http://svc/procedures/proc1";
    pub const FOREIGN_PROCEDURE: &str = "http://other.example.org/procedures/proc1";
    pub const LOCAL_FEATURE: &str = "http://svc/features/foi-1";
    pub const OBSERVED_PROPERTY: &str = "http://example.org/phenomena/temperature";
}

/// Query strings for the search path.
pub mod queries {
    pub const OBSERVED_PROPERTIES: &str = "observedProperty=p1,p2,p3";
    pub const OFFERING_AND_PROCEDURE: &str = "offering=off1&procedure=proc1";
    pub const PROCEDURE_AND_OFFERING: &str = "procedure=proc1&offering=off1";
    pub const UNKNOWN_PARAMETER: &str = "foo=bar";
    pub const SPATIAL: &str = "spatialFilter=om:featureOfInterest/*/sams:shape,0.0,0.0,60.0,60.0,http://www.opengis.net/def/crs/EPSG/0/4326";
    pub const TEMPORAL: &str =
        "temporalFilter=om:phenomenonTime,2012-11-19T13:00:00Z/2012-11-19T14:00:00Z";
}

/// Write `contents` to a temporary file that lives as long as the handle.
pub fn config_file(contents: &str) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_config_uses_test_url() {
        let config = binding_config();
        assert_eq!(config.service_url, SERVICE_URL);
        assert_eq!(config.service, "SOS");
    }

    #[test]
    fn test_offerings_are_on_service() {
        assert!(offerings::OFF1.starts_with(SERVICE_URL));
        assert!(!offerings::FOREIGN.starts_with(SERVICE_URL));
    }

    #[test]
    fn test_config_file_round_trip() {
        let file = config_file("service_url: http://svc\n").unwrap();
        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents, "service_url: http://svc\n");
    }
}
