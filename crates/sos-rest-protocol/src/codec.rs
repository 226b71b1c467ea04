//! Observation document codec: XML payload to document, document to entity.

use chrono::{DateTime, Utc};
use sos_common::time::parse_iso8601;
use sos_common::{SosResult, TimeValue};
use thiserror::Error;

use crate::document::{DocumentTime, FieldElement, ObservationDocument, OmObservationDocument};
use crate::links::resource_id_from_href;
use crate::observation::{Observation, ObservationType, ObservationValue, RecordField, ScalarValue};
use crate::types::Reference;

/// Failures of the generic observation decoder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// The document decoded to something other than a supported observation.
    #[error("Unexpected decoding result type: {0}")]
    UnexpectedType(String),

    /// The document is an observation but its content is unusable.
    #[error("Invalid observation content: {0}")]
    InvalidContent(String),
}

/// Parses observation payloads and decodes them into observation entities.
///
/// Implementations must be safe to share between concurrent requests.
pub trait ObservationCodec: Send + Sync {
    /// Parse a raw payload into a structured observation document.
    fn parse(&self, body: &[u8]) -> SosResult<ObservationDocument>;

    /// Decode a structured observation into the canonical entity.
    fn decode(&self, observation: &OmObservationDocument) -> Result<Observation, CodecError>;
}

/// Codec for the REST binding's XML observation documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlObservationCodec;

impl ObservationCodec for XmlObservationCodec {
    fn parse(&self, body: &[u8]) -> SosResult<ObservationDocument> {
        ObservationDocument::from_xml(body)
    }

    fn decode(&self, doc: &OmObservationDocument) -> Result<Observation, CodecError> {
        let identifier = doc
            .identifier
            .clone()
            .filter(|id| !id.value.is_empty())
            .ok_or_else(|| invalid("missing gml:identifier"))?;

        let procedure = required_href(doc.procedure.as_ref(), "om:procedure")?;
        let observed_property = required_href(doc.observed_property.as_ref(), "om:observedProperty")?;
        let feature_of_interest = doc
            .feature_of_interest
            .as_ref()
            .and_then(Reference::href_str)
            .map(str::to_string)
            .or_else(|| doc.inline_feature_identifier.clone())
            .ok_or_else(|| invalid("missing om:featureOfInterest reference"))?;

        let phenomenon_time = doc
            .phenomenon_time
            .as_ref()
            .map(decode_phenomenon_time)
            .transpose()?;
        let result_time = decode_result_time(doc.result_time.as_ref(), phenomenon_time.as_ref())?;

        let observation_type = observation_type(doc)?;
        let result = decode_result(doc, observation_type)?;

        Ok(Observation {
            identifier,
            gml_id: doc.gml_id.clone(),
            observation_type,
            procedure,
            observed_property,
            feature_of_interest,
            phenomenon_time,
            result_time,
            offerings: Vec::new(),
            result,
        })
    }
}

fn invalid(message: impl Into<String>) -> CodecError {
    CodecError::InvalidContent(message.into())
}

fn required_href(reference: Option<&Reference>, element: &str) -> Result<String, CodecError> {
    reference
        .and_then(Reference::href_str)
        .map(str::to_string)
        .ok_or_else(|| invalid(format!("missing {} reference", element)))
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, CodecError> {
    parse_iso8601(s).map_err(|e| invalid(e.to_string()))
}

fn decode_phenomenon_time(time: &DocumentTime) -> Result<TimeValue, CodecError> {
    match time {
        DocumentTime::Instant { position, .. } => Ok(TimeValue::Instant {
            at: parse_time(position)?,
        }),
        DocumentTime::Period { begin, end, .. } => {
            TimeValue::period(parse_time(begin)?, parse_time(end)?)
                .map_err(|e| invalid(e.to_string()))
        }
        DocumentTime::Reference(href) => Err(invalid(format!(
            "unresolvable phenomenon time reference '{}'",
            href
        ))),
    }
}

fn decode_result_time(
    time: Option<&DocumentTime>,
    phenomenon_time: Option<&TimeValue>,
) -> Result<Option<DateTime<Utc>>, CodecError> {
    match time {
        None => Ok(None),
        Some(DocumentTime::Instant { position, .. }) => parse_time(position).map(Some),
        Some(DocumentTime::Period { .. }) => Err(invalid("result time must be an instant")),
        Some(DocumentTime::Reference(href)) => match phenomenon_time {
            Some(TimeValue::Instant { at }) => Ok(Some(*at)),
            Some(TimeValue::Period { end, .. }) => Ok(Some(*end)),
            None => Err(invalid(format!(
                "unresolvable result time reference '{}'",
                href
            ))),
        },
    }
}

fn observation_type(doc: &OmObservationDocument) -> Result<ObservationType, CodecError> {
    if let Some(uri) = doc.observation_type.as_deref() {
        return ObservationType::from_uri(uri)
            .ok_or_else(|| CodecError::UnexpectedType(resource_id_from_href(uri).to_string()));
    }

    let result = doc
        .result
        .as_ref()
        .ok_or_else(|| invalid("missing om:result"))?;
    if result.record.is_some() {
        return Ok(ObservationType::Complex);
    }

    let xsi_type = result.xsi_type.as_deref().unwrap_or_default();
    let local = xsi_type.rsplit(':').next().unwrap_or(xsi_type);
    match local {
        "MeasureType" => Ok(ObservationType::Measurement),
        "integer" => Ok(ObservationType::Count),
        "boolean" => Ok(ObservationType::Truth),
        "ReferenceType" => Ok(ObservationType::Category),
        "string" => Ok(ObservationType::Text),
        "" => Err(CodecError::UnexpectedType("untyped result".to_string())),
        other => Err(CodecError::UnexpectedType(other.to_string())),
    }
}

fn decode_result(
    doc: &OmObservationDocument,
    observation_type: ObservationType,
) -> Result<ObservationValue, CodecError> {
    let result = doc
        .result
        .as_ref()
        .ok_or_else(|| invalid("missing om:result"))?;
    let text = result.text.trim();

    let value = match observation_type {
        ObservationType::Measurement => ScalarValue::Quantity {
            value: parse_number(text)?,
            uom: result
                .uom
                .clone()
                .ok_or_else(|| invalid("measurement result without uom"))?,
        },
        ObservationType::Count => ScalarValue::Count {
            value: parse_integer(text)?,
        },
        ObservationType::Truth => ScalarValue::Boolean {
            value: parse_boolean(text)?,
        },
        ObservationType::Category => ScalarValue::Category {
            value: result
                .reference
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| text.to_string()),
            code_space: result.reference.href.clone(),
        },
        ObservationType::Text => ScalarValue::Text {
            value: text.to_string(),
        },
        ObservationType::Complex => {
            let fields = result
                .record
                .as_ref()
                .ok_or_else(|| invalid("complex observation without swe:DataRecord"))?;
            let fields = fields
                .iter()
                .map(decode_field)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(ObservationValue::Record(fields));
        }
    };
    Ok(ObservationValue::Single(value))
}

fn decode_field(field: &FieldElement) -> Result<RecordField, CodecError> {
    let raw = field.value.as_deref().unwrap_or_default().trim();
    let value = match field.component.as_deref() {
        Some("Quantity") => ScalarValue::Quantity {
            value: parse_number(raw)?,
            uom: field
                .uom
                .clone()
                .ok_or_else(|| invalid(format!("field '{}' has no uom", field.name)))?,
        },
        Some("Count") => ScalarValue::Count {
            value: parse_integer(raw)?,
        },
        Some("Boolean") => ScalarValue::Boolean {
            value: parse_boolean(raw)?,
        },
        Some("Category") => ScalarValue::Category {
            value: raw.to_string(),
            code_space: field.code_space.clone(),
        },
        Some("Text") => ScalarValue::Text {
            value: raw.to_string(),
        },
        Some(other) => return Err(CodecError::UnexpectedType(other.to_string())),
        None => return Err(invalid(format!("field '{}' has no component", field.name))),
    };

    Ok(RecordField {
        name: field.name.clone(),
        definition: field.definition.clone(),
        value,
    })
}

fn parse_number(s: &str) -> Result<f64, CodecError> {
    s.parse()
        .map_err(|_| invalid(format!("'{}' is not a number", s)))
}

fn parse_integer(s: &str) -> Result<i64, CodecError> {
    s.parse()
        .map_err(|_| invalid(format!("'{}' is not an integer", s)))
}

fn parse_boolean(s: &str) -> Result<bool, CodecError> {
    match s {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(format!("'{}' is not a boolean", s))),
    }
}
