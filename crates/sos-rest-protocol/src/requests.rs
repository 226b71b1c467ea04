//! Canonical protocol requests produced by the decoder.
//!
//! Every request carries the service and version tags of the binding
//! configuration. The search envelope additionally keeps the raw query string.

use serde::{Deserialize, Serialize};
use sos_common::BindingConfig;

use crate::filters::{Namespaces, SpatialFilter, TemporalFilter};
use crate::observation::Observation;

/// Service and version tags copied from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTag {
    pub service: String,
    pub version: String,
}

impl ServiceTag {
    pub fn from_config(config: &BindingConfig) -> Self {
        Self {
            service: config.service.clone(),
            version: config.version.clone(),
        }
    }
}

/// Retrieve observations by identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetObservationByIdRequest {
    #[serde(flatten)]
    pub tag: ServiceTag,
    pub observation_identifiers: Vec<String>,
    /// Ask the engine to merge observations sharing a constellation into one data array.
    pub subsetting_extension: bool,
}

/// Search observations by KVP filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetObservationRequest {
    #[serde(flatten)]
    pub tag: ServiceTag,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_identifiers: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_properties: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offerings: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedures: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spatial_filter: Option<SpatialFilter>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal_filters: Option<Vec<TemporalFilter>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<Namespaces>,

    pub subsetting_extension: bool,
}

impl GetObservationRequest {
    /// An unfiltered search with the subsetting extension enabled.
    pub fn new(tag: ServiceTag) -> Self {
        Self {
            tag,
            feature_identifiers: None,
            observed_properties: None,
            offerings: None,
            procedures: None,
            spatial_filter: None,
            temporal_filters: None,
            namespaces: None,
            subsetting_extension: true,
        }
    }
}

/// Insert one observation into the listed offerings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertObservationRequest {
    #[serde(flatten)]
    pub tag: ServiceTag,
    pub offerings: Vec<String>,
    pub observation: Observation,
}

/// Delete one observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteObservationRequest {
    #[serde(flatten)]
    pub tag: ServiceTag,
    pub observation_identifier: String,
}

/// Scope description answered to OPTIONS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsDescriptor {
    pub resource_relation: String,
    /// The request addressed the resource without an item id.
    pub is_global: bool,
    /// The request addressed the collection with a query.
    pub is_collection: bool,
}

impl OptionsDescriptor {
    /// HTTP methods allowed in this scope.
    pub fn allowed_methods(&self) -> &'static [&'static str] {
        match (self.is_global, self.is_collection) {
            (true, true) => &["GET", "OPTIONS"],
            (true, false) => &["GET", "POST", "OPTIONS"],
            _ => &["GET", "DELETE", "OPTIONS"],
        }
    }
}

/// The canonical request handed to the query/insert engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanonicalRequest {
    GetById(GetObservationByIdRequest),
    Search(GetObservationRequest),
    Insert(InsertObservationRequest),
    Delete(DeleteObservationRequest),
    Options(OptionsDescriptor),
}

impl CanonicalRequest {
    /// Short name of the variant, used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CanonicalRequest::GetById(_) => "get_by_id",
            CanonicalRequest::Search(_) => "search",
            CanonicalRequest::Insert(_) => "insert",
            CanonicalRequest::Delete(_) => "delete",
            CanonicalRequest::Options(_) => "options",
        }
    }
}

/// Resource envelope around a canonical request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestRequest {
    /// Resource relation the request was addressed at.
    pub resource: String,

    pub request: CanonicalRequest,

    /// Raw query string of search requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_string: Option<String>,
}

impl RestRequest {
    pub fn new(resource: impl Into<String>, request: CanonicalRequest) -> Self {
        Self {
            resource: resource.into(),
            request,
            query_string: None,
        }
    }

    pub fn with_query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = Some(query_string.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag() -> ServiceTag {
        ServiceTag::from_config(&BindingConfig::default())
    }

    #[test]
    fn test_search_defaults() {
        let request = GetObservationRequest::new(tag());
        assert!(request.subsetting_extension);
        assert!(request.observed_properties.is_none());
        assert_eq!(request.tag.service, "SOS");
    }

    #[test]
    fn test_canonical_request_serialization() {
        let request = CanonicalRequest::Delete(DeleteObservationRequest {
            tag: tag(),
            observation_identifier: "obs-1".to_string(),
        });
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["kind"], "delete");
        assert_eq!(json["service"], "SOS");
        assert_eq!(json["version"], "2.0.0");
        assert_eq!(json["observation_identifier"], "obs-1");
        assert_eq!(request.kind(), "delete");
    }

    #[test]
    fn test_allowed_methods() {
        let item = OptionsDescriptor {
            resource_relation: "observations".to_string(),
            is_global: false,
            is_collection: false,
        };
        assert!(item.allowed_methods().contains(&"DELETE"));

        let collection = OptionsDescriptor {
            is_global: true,
            ..item
        };
        assert!(collection.allowed_methods().contains(&"POST"));
    }
}
