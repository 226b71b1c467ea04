//! Spatial reference system names.

/// OGC http URI prefix for EPSG codes.
pub const SRS_NAME_PREFIX_HTTP: &str = "http://www.opengis.net/def/crs/EPSG/0/";

/// OGC URN prefix for EPSG codes.
pub const SRS_NAME_PREFIX_URN: &str = "urn:ogc:def:crs:EPSG::";

/// SRID assumed when a filter names none.
pub const DEFAULT_SRID: u32 = 4326;

/// Whether the value looks like an srs name this binding understands.
pub fn is_srs_name(s: &str) -> bool {
    s.starts_with(SRS_NAME_PREFIX_HTTP) || s.starts_with(SRS_NAME_PREFIX_URN)
}

/// Extract the EPSG code from an srs name.
pub fn parse_srid(s: &str) -> Result<u32, SrsParseError> {
    let code = s
        .strip_prefix(SRS_NAME_PREFIX_HTTP)
        .or_else(|| s.strip_prefix(SRS_NAME_PREFIX_URN))
        .ok_or_else(|| SrsParseError::UnknownPrefix(s.to_string()))?;

    code.parse()
        .map_err(|_| SrsParseError::InvalidCode(code.to_string()))
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SrsParseError {
    #[error("Unsupported srs name: {0}")]
    UnknownPrefix(String),

    #[error("Invalid EPSG code: {0}")]
    InvalidCode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_srid() {
        assert_eq!(parse_srid("urn:ogc:def:crs:EPSG::4258"), Ok(4258));
        assert_eq!(
            parse_srid("http://www.opengis.net/def/crs/EPSG/0/31467"),
            Ok(31467)
        );
    }

    #[test]
    fn test_parse_srid_errors() {
        assert!(matches!(
            parse_srid("EPSG:4326"),
            Err(SrsParseError::UnknownPrefix(_))
        ));
        assert!(matches!(
            parse_srid("urn:ogc:def:crs:EPSG::abc"),
            Err(SrsParseError::InvalidCode(_))
        ));
    }

    #[test]
    fn test_is_srs_name() {
        assert!(is_srs_name("urn:ogc:def:crs:EPSG::4326"));
        assert!(!is_srs_name("60.0"));
    }
}
