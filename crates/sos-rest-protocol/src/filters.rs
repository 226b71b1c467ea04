//! Spatial, temporal and namespace filter grammars for KVP search values.
//!
//! Grammars (values already split on commas where noted):
//! - spatialFilter: `valueReference,minx,miny,maxx,maxy[,srsName]`
//! - temporalFilter: `valueReference,time[,valueReference,time...]`, where
//!   `time` is an instant or a `start/end` period
//! - namespaces: `xmlns(prefix,uri)[,xmlns(prefix,uri)...]`, or `xmlns(uri)`
//!   for the default namespace

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sos_common::srs::{self, DEFAULT_SRID};
use sos_common::{Envelope, SosError, SosResult, TimeValue};

/// Prefix to namespace URI bindings.
pub type Namespaces = BTreeMap<String, String>;

/// Spatial comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpatialOperator {
    #[serde(rename = "BBOX")]
    BBox,
}

/// A parsed spatial filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialFilter {
    /// Property path the filter applies to, e.g. `om:featureOfInterest/*/sams:shape`.
    pub value_reference: String,
    pub operator: SpatialOperator,
    pub envelope: Envelope,
    pub srid: u32,
}

impl SpatialFilter {
    /// Parse the comma-split values of a spatialFilter parameter.
    pub fn parse(values: &[&str], param: &str) -> SosResult<Self> {
        let Some((value_reference, rest)) = values.split_first() else {
            return Err(SosError::invalid_value(param, "empty spatial filter"));
        };
        if value_reference.is_empty() {
            return Err(SosError::invalid_value(param, "missing value reference"));
        }

        let (coordinates, srid) = match rest.split_last() {
            Some((last, coords)) if srs::is_srs_name(last) => {
                let srid = srs::parse_srid(last)
                    .map_err(|e| SosError::invalid_value(param, e.to_string()))?;
                (coords, srid)
            }
            _ => (rest, DEFAULT_SRID),
        };

        let envelope = Envelope::from_parts(coordinates)
            .map_err(|e| SosError::invalid_value(param, e.to_string()))?;

        Ok(Self {
            value_reference: value_reference.to_string(),
            operator: SpatialOperator::BBox,
            envelope,
            srid,
        })
    }
}

/// Temporal comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemporalOperator {
    #[serde(rename = "TM_Equals")]
    Equals,
    #[serde(rename = "TM_During")]
    During,
}

/// A parsed temporal filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalFilter {
    /// Time property the filter applies to, e.g. `om:phenomenonTime`.
    pub value_reference: String,
    pub operator: TemporalOperator,
    pub time: TimeValue,
}

impl TemporalFilter {
    /// Parse the comma-split values of a temporalFilter parameter.
    pub fn parse_all(values: &[&str], param: &str) -> SosResult<Vec<Self>> {
        if values.is_empty() || values.len() % 2 != 0 {
            return Err(SosError::invalid_value(
                param,
                "expected pairs of valueReference,time",
            ));
        }

        values
            .chunks_exact(2)
            .map(|pair| {
                let (value_reference, time) = (pair[0], pair[1]);
                let time = TimeValue::parse(time)
                    .map_err(|e| SosError::invalid_value(param, e.to_string()))?;
                let operator = if time.is_period() {
                    TemporalOperator::During
                } else {
                    TemporalOperator::Equals
                };
                Ok(Self {
                    value_reference: value_reference.to_string(),
                    operator,
                    time,
                })
            })
            .collect()
    }
}

/// Parse a namespaces parameter value.
pub fn parse_namespaces(value: &str, param: &str) -> SosResult<Namespaces> {
    const OPEN: &str = "xmlns(";

    let mut namespaces = Namespaces::new();
    let mut rest = value.trim();

    while !rest.is_empty() {
        let Some(after_open) = rest.strip_prefix(OPEN) else {
            return Err(SosError::invalid_value(
                param,
                format!("expected 'xmlns(prefix,uri)', found '{}'", rest),
            ));
        };
        let close = after_open.find(')').ok_or_else(|| {
            SosError::invalid_value(param, "missing closing parenthesis")
        })?;

        let inner = &after_open[..close];
        let (prefix, uri) = match inner.split_once(',') {
            Some((prefix, uri)) => (prefix.trim(), uri.trim()),
            None => ("", inner.trim()),
        };
        if uri.is_empty() {
            return Err(SosError::invalid_value(
                param,
                format!("empty namespace URI for prefix '{}'", prefix),
            ));
        }
        namespaces.insert(prefix.to_string(), uri.to_string());

        rest = after_open[close + 1..].trim_start_matches(|c: char| c == ',' || c.is_whitespace());
    }

    if namespaces.is_empty() {
        return Err(SosError::invalid_value(param, "no namespace declared"));
    }
    Ok(namespaces)
}
