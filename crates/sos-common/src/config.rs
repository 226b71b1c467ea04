//! Binding configuration shared by the decoder and the HTTP host.

use serde::{Deserialize, Serialize};

/// Default service type tag.
pub const DEFAULT_SERVICE: &str = "SOS";

/// Default protocol version tag.
pub const DEFAULT_VERSION: &str = "2.0.0";

/// Default public base URL of the REST binding.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8080/sos/rest";

/// Namespace of the REST binding's link relations.
pub const REST_NAMESPACE: &str = "http://www.opengis.net/sosREST/1.0";

/// Relation name of a link pointing at an offering resource.
pub const RELATION_OFFERING_GET: &str = "offering-get";

/// Resource relation name of the observations resource.
pub const RESOURCE_OBSERVATIONS: &str = "observations";

/// Read-only settings consumed when decoding requests.
///
/// Built once at startup and shared between all requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Service type tag copied into every canonical request.
    #[serde(default = "default_service")]
    pub service: String,

    /// Protocol version tag copied into every canonical request.
    #[serde(default = "default_version")]
    pub version: String,

    /// Public base URL of this service. Links starting with it point back here.
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Full relation URI identifying offering links in observation documents.
    #[serde(default = "default_offering_relation")]
    pub offering_relation: String,
}

fn default_service() -> String {
    DEFAULT_SERVICE.to_string()
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_offering_relation() -> String {
    relation_with_namespace(RELATION_OFFERING_GET)
}

/// Qualify a relation name with the REST binding namespace.
pub fn relation_with_namespace(relation: &str) -> String {
    format!("{}/{}", REST_NAMESPACE, relation)
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            service: default_service(),
            version: default_version(),
            service_url: default_service_url(),
            offering_relation: default_offering_relation(),
        }
    }
}

impl BindingConfig {
    /// Create a config for the given base URL, keeping the other defaults.
    pub fn with_service_url(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            ..Self::default()
        }
    }

    /// Apply overrides from an arbitrary key lookup (environment-shaped keys).
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(service) = lookup("SOS_SERVICE") {
            self.service = service;
        }
        if let Some(version) = lookup("SOS_VERSION") {
            self.version = version;
        }
        if let Some(url) = lookup("SOS_SERVICE_URL") {
            self.service_url = url;
        }
        if let Some(relation) = lookup("SOS_OFFERING_RELATION") {
            self.offering_relation = relation;
        }
        self
    }
}
