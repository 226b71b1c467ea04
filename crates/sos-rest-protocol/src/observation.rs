//! Canonical observation entity handed to the insert engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sos_common::TimeValue;

use crate::types::CodeWithAuthority;

/// Base URI of the O&M 2.0 observation type definitions.
pub const OBSERVATION_TYPE_BASE: &str = "http://www.opengis.net/def/observationType/OGC-OM/2.0/";

/// O&M observation types with a decodable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    Measurement,
    Count,
    Truth,
    Category,
    Text,
    Complex,
}

impl ObservationType {
    /// Resolve a type URI (or its bare `OM_*` name).
    pub fn from_uri(uri: &str) -> Option<Self> {
        let name = uri.strip_prefix(OBSERVATION_TYPE_BASE).unwrap_or(uri);
        match name {
            "OM_Measurement" => Some(ObservationType::Measurement),
            "OM_CountObservation" => Some(ObservationType::Count),
            "OM_TruthObservation" => Some(ObservationType::Truth),
            "OM_CategoryObservation" => Some(ObservationType::Category),
            "OM_TextObservation" => Some(ObservationType::Text),
            "OM_ComplexObservation" => Some(ObservationType::Complex),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ObservationType::Measurement => "OM_Measurement",
            ObservationType::Count => "OM_CountObservation",
            ObservationType::Truth => "OM_TruthObservation",
            ObservationType::Category => "OM_CategoryObservation",
            ObservationType::Text => "OM_TextObservation",
            ObservationType::Complex => "OM_ComplexObservation",
        }
    }

    pub fn uri(&self) -> String {
        format!("{}{}", OBSERVATION_TYPE_BASE, self.name())
    }
}

/// A single scalar result value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScalarValue {
    Quantity { value: f64, uom: String },
    Count { value: i64 },
    Boolean { value: bool },
    Category {
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code_space: Option<String>,
    },
    Text { value: String },
}

/// One field of a complex (record) result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordField {
    pub name: String,

    /// Observed property the field reports on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    pub value: ScalarValue,
}

/// The result of an observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationValue {
    Single(ScalarValue),
    Record(Vec<RecordField>),
}

/// A decoded O&M observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub identifier: CodeWithAuthority,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gml_id: Option<String>,

    pub observation_type: ObservationType,

    pub procedure: String,

    pub observed_property: String,

    pub feature_of_interest: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phenomenon_time: Option<TimeValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_time: Option<DateTime<Utc>>,

    /// Offerings the observation is associated with.
    #[serde(default)]
    pub offerings: Vec<String>,

    pub result: ObservationValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_type_from_uri() {
        assert_eq!(
            ObservationType::from_uri(
                "http://www.opengis.net/def/observationType/OGC-OM/2.0/OM_Measurement"
            ),
            Some(ObservationType::Measurement)
        );
        assert_eq!(
            ObservationType::from_uri("OM_ComplexObservation"),
            Some(ObservationType::Complex)
        );
        assert_eq!(
            ObservationType::from_uri(
                "http://www.opengis.net/def/observationType/OGC-OM/2.0/OM_SWEArrayObservation"
            ),
            None
        );
    }

    #[test]
    fn test_observation_type_uri_roundtrip() {
        let t = ObservationType::Category;
        assert_eq!(ObservationType::from_uri(&t.uri()), Some(t));
    }

    #[test]
    fn test_scalar_value_serialization() {
        let value = ScalarValue::Quantity {
            value: 42.0,
            uom: "degC".to_string(),
        };
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["type"], "quantity");
        assert_eq!(json["uom"], "degC");
    }
}
