//! Classification of inbound requests into decode strategies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sos_common::config::RESOURCE_OBSERVATIONS;
use sos_common::{SosError, SosResult};

/// HTTP methods the observations resource distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = SosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            other => Err(SosError::UnsupportedOperation(format!(
                "HTTP {} on resource '{}'",
                other, RESOURCE_OBSERVATIONS
            ))),
        }
    }
}

/// What the request addressed, built once from (path segment, query string).
///
/// Empty strings count as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceTarget {
    /// `/observations`
    Collection,
    /// `/observations/{id}`
    Item(String),
    /// `/observations?{query}`
    Query(String),
    /// `/observations/{id}?{query}`
    ItemWithQuery(String, String),
}

impl ResourceTarget {
    pub fn from_parts(path: Option<&str>, query: Option<&str>) -> Self {
        let path = path.filter(|p| !p.is_empty()).map(str::to_string);
        let query = query.filter(|q| !q.is_empty()).map(str::to_string);

        match (path, query) {
            (None, None) => ResourceTarget::Collection,
            (Some(id), None) => ResourceTarget::Item(id),
            (None, Some(query)) => ResourceTarget::Query(query),
            (Some(id), Some(query)) => ResourceTarget::ItemWithQuery(id, query),
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            ResourceTarget::Item(id) | ResourceTarget::ItemWithQuery(id, _) => Some(id),
            _ => None,
        }
    }
}

/// The decoding routine selected for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeStrategy {
    GetById(String),
    Search(String),
    Insert,
    Delete(String),
    Options { is_global: bool, is_collection: bool },
}

/// OPTIONS scope flags: `(is_global, is_collection)`.
pub fn options_scope(target: &ResourceTarget) -> (bool, bool) {
    match target {
        ResourceTarget::Query(_) => (true, true),
        ResourceTarget::Collection => (true, false),
        ResourceTarget::Item(_) => (false, false),
        ResourceTarget::ItemWithQuery(..) => (false, false),
    }
}

fn bad_get_request() -> SosError {
    SosError::AmbiguousRequest {
        resource: RESOURCE_OBSERVATIONS.to_string(),
        message: format!(
            "GET requires either an observation id in the path (/{res}/{{id}}) or KVP search parameters (/{res}?...), not both and not neither",
            res = RESOURCE_OBSERVATIONS
        ),
    }
}

/// Select the decode strategy for a method and target.
pub fn classify(method: HttpMethod, target: &ResourceTarget) -> SosResult<DecodeStrategy> {
    match (method, target) {
        (HttpMethod::Get, ResourceTarget::Item(id)) => Ok(DecodeStrategy::GetById(id.clone())),
        (HttpMethod::Get, ResourceTarget::Query(query)) => {
            Ok(DecodeStrategy::Search(query.clone()))
        }
        // Collection listing (a feed) is not offered.
        (HttpMethod::Get, _) => Err(bad_get_request()),

        (HttpMethod::Post, ResourceTarget::Item(_) | ResourceTarget::ItemWithQuery(..)) => {
            tracing::error!(
                "HTTP POST is not allowed on a single resource of '{}'",
                RESOURCE_OBSERVATIONS
            );
            Err(SosError::UnsupportedOperation(format!(
                "HTTP POST on a single resource of '{}'",
                RESOURCE_OBSERVATIONS
            )))
        }
        (HttpMethod::Post, _) => Ok(DecodeStrategy::Insert),

        (HttpMethod::Delete, ResourceTarget::Item(id) | ResourceTarget::ItemWithQuery(id, _)) => {
            Ok(DecodeStrategy::Delete(id.clone()))
        }
        (HttpMethod::Delete, _) => Err(SosError::UnsupportedOperation(format!(
            "HTTP DELETE on the '{}' collection",
            RESOURCE_OBSERVATIONS
        ))),

        (HttpMethod::Put, _) => Err(SosError::UnsupportedOperation(format!(
            "HTTP PUT on resource '{}'",
            RESOURCE_OBSERVATIONS
        ))),

        (HttpMethod::Options, target) => {
            let (is_global, is_collection) = options_scope(target);
            Ok(DecodeStrategy::Options {
                is_global,
                is_collection,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(path: Option<&str>, query: Option<&str>) -> ResourceTarget {
        ResourceTarget::from_parts(path, query)
    }

    #[test]
    fn test_target_from_parts() {
        assert_eq!(target(None, None), ResourceTarget::Collection);
        assert_eq!(target(Some(""), Some("")), ResourceTarget::Collection);
        assert_eq!(target(Some("o1"), None), ResourceTarget::Item("o1".to_string()));
        assert_eq!(target(None, Some("a=b")), ResourceTarget::Query("a=b".to_string()));
        assert_eq!(
            target(Some("o1"), Some("a=b")),
            ResourceTarget::ItemWithQuery("o1".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn test_get_by_id() {
        assert_eq!(
            classify(HttpMethod::Get, &target(Some("obs-42"), None)).unwrap(),
            DecodeStrategy::GetById("obs-42".to_string())
        );
    }

    #[test]
    fn test_get_search() {
        assert_eq!(
            classify(HttpMethod::Get, &target(None, Some("offering=o1"))).unwrap(),
            DecodeStrategy::Search("offering=o1".to_string())
        );
    }

    #[test]
    fn test_get_both_is_ambiguous() {
        let err = classify(HttpMethod::Get, &target(Some("obs-42"), Some("a=b"))).unwrap_err();
        assert!(matches!(err, SosError::AmbiguousRequest { .. }));
    }

    #[test]
    fn test_get_neither_is_ambiguous() {
        let err = classify(HttpMethod::Get, &target(None, None)).unwrap_err();
        assert!(matches!(err, SosError::AmbiguousRequest { .. }));
    }

    #[test]
    fn test_put_always_unsupported() {
        for t in [
            target(None, None),
            target(Some("o1"), None),
            target(None, Some("a=b")),
        ] {
            assert!(matches!(
                classify(HttpMethod::Put, &t),
                Err(SosError::UnsupportedOperation(_))
            ));
        }
    }

    #[test]
    fn test_post() {
        assert_eq!(
            classify(HttpMethod::Post, &target(None, None)).unwrap(),
            DecodeStrategy::Insert
        );
        assert!(matches!(
            classify(HttpMethod::Post, &target(Some("o1"), None)),
            Err(SosError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_delete() {
        assert_eq!(
            classify(HttpMethod::Delete, &target(Some("o1"), None)).unwrap(),
            DecodeStrategy::Delete("o1".to_string())
        );
        assert!(matches!(
            classify(HttpMethod::Delete, &target(None, None)),
            Err(SosError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_options_scope_table() {
        assert_eq!(options_scope(&target(None, Some("x=1"))), (true, true));
        assert_eq!(options_scope(&target(None, None)), (true, false));
        assert_eq!(options_scope(&target(Some("o1"), None)), (false, false));
        assert_eq!(options_scope(&target(Some("o1"), Some("x=1"))), (false, false));
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("OPTIONS".parse::<HttpMethod>().unwrap(), HttpMethod::Options);
        assert!("PATCH".parse::<HttpMethod>().is_err());
    }
}
