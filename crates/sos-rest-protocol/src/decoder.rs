//! Decoder for requests addressed at the observations resource.
//!
//! One decoder instance serves all requests. It holds only immutable
//! configuration and shared, thread-safe collaborators.

use std::sync::Arc;

use sos_common::config::RESOURCE_OBSERVATIONS;
use sos_common::{BindingConfig, SosError, SosResult};
use tracing::{debug, error, warn};

use crate::classify::{classify, options_scope, DecodeStrategy, HttpMethod, ResourceTarget};
use crate::codec::{CodecError, ObservationCodec, XmlObservationCodec};
use crate::identifier::{IdentifierGenerator, UuidGenerator};
use crate::kvp::{self, KvpParameters};
use crate::links::{resource_id_from_href, LinkNormalizer};
use crate::requests::{
    CanonicalRequest, DeleteObservationRequest, GetObservationByIdRequest, GetObservationRequest,
    InsertObservationRequest, OptionsDescriptor, RestRequest, ServiceTag,
};

/// A raw request as handed over by the HTTP layer.
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'a> {
    pub method: HttpMethod,
    /// Path segment after `/observations/`, if any.
    pub path: Option<&'a str>,
    pub query: Option<&'a str>,
    pub body: Option<&'a [u8]>,
}

impl<'a> InboundRequest<'a> {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            path: None,
            query: None,
            body: None,
        }
    }

    pub fn with_path(mut self, path: &'a str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_query(mut self, query: &'a str) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_body(mut self, body: &'a [u8]) -> Self {
        self.body = Some(body);
        self
    }
}

/// Turns inbound observations requests into canonical requests.
#[derive(Clone)]
pub struct ObservationsDecoder {
    config: BindingConfig,
    codec: Arc<dyn ObservationCodec>,
    ids: Arc<dyn IdentifierGenerator>,
}

impl std::fmt::Debug for ObservationsDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservationsDecoder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ObservationsDecoder {
    /// Decoder with the XML codec and random UUID identifiers.
    pub fn new(config: BindingConfig) -> Self {
        Self {
            config,
            codec: Arc::new(XmlObservationCodec),
            ids: Arc::new(UuidGenerator),
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn ObservationCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_identifier_generator(mut self, ids: Arc<dyn IdentifierGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    fn tag(&self) -> ServiceTag {
        ServiceTag::from_config(&self.config)
    }

    /// Classify and decode a request.
    pub fn decode(&self, request: &InboundRequest<'_>) -> SosResult<RestRequest> {
        let target = ResourceTarget::from_parts(request.path, request.query);
        let strategy = classify(request.method, &target).inspect_err(|e| {
            warn!(method = %request.method, error = %e, "Rejected observations request");
        })?;

        match strategy {
            DecodeStrategy::GetById(id) => Ok(self.decode_get_by_id(&id)),
            DecodeStrategy::Search(query) => self.decode_search(&query),
            DecodeStrategy::Insert => self.decode_insert(request.body, target.path()),
            DecodeStrategy::Delete(id) => self.decode_delete(Some(&id)),
            DecodeStrategy::Options {
                is_global,
                is_collection,
            } => Ok(RestRequest::new(
                RESOURCE_OBSERVATIONS,
                CanonicalRequest::Options(OptionsDescriptor {
                    resource_relation: RESOURCE_OBSERVATIONS.to_string(),
                    is_global,
                    is_collection,
                }),
            )),
        }
    }

    /// GetObservationById for a single identifier, subsetting enabled.
    pub fn decode_get_by_id(&self, observation_id: &str) -> RestRequest {
        debug!(observation_id = %observation_id, "Decoding GetObservationById");

        let request = GetObservationByIdRequest {
            tag: self.tag(),
            observation_identifiers: vec![observation_id.to_string()],
            subsetting_extension: true,
        };
        RestRequest::new(RESOURCE_OBSERVATIONS, CanonicalRequest::GetById(request))
    }

    /// Decode a KVP query string into a search envelope.
    pub fn decode_search(&self, query: &str) -> SosResult<RestRequest> {
        let params = KvpParameters::from_query(query);
        let request = self.parse_search(&params)?;
        debug!(parameters = params.len(), "Decoded observations search");

        Ok(
            RestRequest::new(RESOURCE_OBSERVATIONS, CanonicalRequest::Search(request))
                .with_query_string(query),
        )
    }

    /// Build a search request from already decoded parameters.
    pub fn parse_search(&self, params: &KvpParameters) -> SosResult<GetObservationRequest> {
        kvp::parse_search(params, self.tag()).inspect_err(|e| {
            warn!(error = %e, "Invalid observations search parameters");
        })
    }

    /// Decode a POSTed observation document into an insert request.
    pub fn decode_insert(&self, body: Option<&[u8]>, path: Option<&str>) -> SosResult<RestRequest> {
        let body = body.filter(|b| b.iter().any(|c| !c.is_ascii_whitespace()));
        let (Some(body), None) = (body, path.filter(|p| !p.is_empty())) else {
            let message = format!(
                "HTTP POST on resource '{}' requires an observation document and no resource id",
                RESOURCE_OBSERVATIONS
            );
            error!("{}", message);
            return Err(SosError::UnsupportedOperation(message));
        };

        let mut document = self.codec.parse(body)?;

        let missing_identifier = document
            .observation
            .identifier
            .as_ref()
            .map_or(true, |id| id.value.trim().is_empty());
        if missing_identifier {
            let identifier = self.ids.generate();
            debug!(identifier = %identifier.value, "Assigned identifier to observation");
            document.observation.identifier = Some(identifier);
        }

        let offering_relation = self.config.offering_relation.as_str();
        let offerings: Vec<String> = document
            .links
            .iter()
            .filter(|link| link.is_offering_link(offering_relation))
            .map(|link| resource_id_from_href(&link.href).to_string())
            .collect();

        let normalizer = LinkNormalizer::new(&self.config.service_url);
        if let Some(procedure) = document.observation.procedure.as_mut() {
            normalizer.normalize_reference(procedure);
        }
        if let Some(feature) = document.observation.feature_of_interest.as_mut() {
            normalizer.normalize_reference(feature);
        }

        let mut observation = self.codec.decode(&document.observation).map_err(|e| {
            warn!(error = %e, "Observation document did not decode to an observation");
            codec_failure(e)
        })?;
        observation.offerings = offerings.clone();

        debug!(
            identifier = %observation.identifier.value,
            offerings = offerings.len(),
            "Decoded InsertObservation"
        );

        let request = InsertObservationRequest {
            tag: self.tag(),
            offerings,
            observation,
        };
        Ok(RestRequest::new(
            RESOURCE_OBSERVATIONS,
            CanonicalRequest::Insert(request),
        ))
    }

    /// Delete a single observation. The id is passed through unvalidated.
    pub fn decode_delete(&self, path: Option<&str>) -> SosResult<RestRequest> {
        let Some(observation_id) = path.filter(|p| !p.is_empty()) else {
            return Err(SosError::UnsupportedOperation(format!(
                "HTTP DELETE on the '{}' collection",
                RESOURCE_OBSERVATIONS
            )));
        };

        debug!(observation_id = %observation_id, "Decoding DeleteObservation");
        let request = DeleteObservationRequest {
            tag: self.tag(),
            observation_identifier: observation_id.to_string(),
        };
        Ok(RestRequest::new(
            RESOURCE_OBSERVATIONS,
            CanonicalRequest::Delete(request),
        ))
    }

    /// Scope descriptor for OPTIONS. Never fails.
    pub fn describe_options(&self, path: Option<&str>, query: Option<&str>) -> OptionsDescriptor {
        let (is_global, is_collection) = options_scope(&ResourceTarget::from_parts(path, query));
        OptionsDescriptor {
            resource_relation: RESOURCE_OBSERVATIONS.to_string(),
            is_global,
            is_collection,
        }
    }
}

fn codec_failure(e: CodecError) -> SosError {
    match e {
        CodecError::UnexpectedType(found) => SosError::MalformedBody(format!(
            "The value of the parameter 'observationType' is invalid: {}",
            found
        )),
        CodecError::InvalidContent(detail) => {
            SosError::MalformedBody(format!("The observation document is invalid: {}", detail))
        }
    }
}
