//! RESTful binding for the SOS observations resource.
//!
//! This crate turns HTTP-level requests against `/observations` into the
//! canonical SOS 2.0 requests a core service executes:
//!
//! | Request                          | Canonical request         |
//! |----------------------------------|---------------------------|
//! | `GET /observations/{id}`         | GetObservationById        |
//! | `GET /observations?{kvp}`        | GetObservation            |
//! | `POST /observations` (document)  | InsertObservation         |
//! | `DELETE /observations/{id}`      | DeleteObservation         |
//! | `OPTIONS ...`                    | Options descriptor        |
//!
//! # Example
//!
//! ```rust
//! use sos_common::BindingConfig;
//! use sos_rest_protocol::{HttpMethod, InboundRequest, ObservationsDecoder};
//!
//! let decoder = ObservationsDecoder::new(BindingConfig::default());
//! let request = decoder
//!     .decode(&InboundRequest::new(HttpMethod::Get).with_path("obs-42"))
//!     .unwrap();
//! assert_eq!(request.request.kind(), "get_by_id");
//! ```

pub mod classify;
pub mod codec;
pub mod decoder;
pub mod document;
pub mod exceptions;
pub mod filters;
pub mod identifier;
pub mod kvp;
pub mod links;
pub mod observation;
pub mod requests;
pub mod types;

pub use classify::{classify, DecodeStrategy, HttpMethod, ResourceTarget};
pub use codec::{CodecError, ObservationCodec, XmlObservationCodec};
pub use decoder::{InboundRequest, ObservationsDecoder};
pub use document::{ObservationDocument, OmObservationDocument};
pub use exceptions::{ExceptionReport, OwsException};
pub use filters::{SpatialFilter, TemporalFilter};
pub use identifier::{IdentifierGenerator, SequentialIdGenerator, UuidGenerator};
pub use kvp::{KvpParameters, RecognizedParameter};
pub use links::{resource_id_from_href, LinkNormalizer};
pub use observation::{Observation, ObservationType, ObservationValue, ScalarValue};
pub use requests::{
    CanonicalRequest, DeleteObservationRequest, GetObservationByIdRequest, GetObservationRequest,
    InsertObservationRequest, OptionsDescriptor, RestRequest, ServiceTag,
};
pub use types::{CodeWithAuthority, Link, Reference};
