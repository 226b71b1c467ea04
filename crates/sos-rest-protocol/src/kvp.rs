//! KVP (key-value pair) search parameters for the observations resource.

use sos_common::{SosError, SosResult};

use crate::filters::{parse_namespaces, SpatialFilter, TemporalFilter};
use crate::requests::{GetObservationRequest, ServiceTag};

/// The fixed set of search parameters understood by the observations resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecognizedParameter {
    Feature,
    ObservedProperty,
    Offering,
    Procedure,
    SpatialFilter,
    TemporalFilter,
    Namespaces,
}

impl RecognizedParameter {
    pub const ALL: [RecognizedParameter; 7] = [
        RecognizedParameter::Feature,
        RecognizedParameter::ObservedProperty,
        RecognizedParameter::Offering,
        RecognizedParameter::Procedure,
        RecognizedParameter::SpatialFilter,
        RecognizedParameter::TemporalFilter,
        RecognizedParameter::Namespaces,
    ];

    /// Canonical parameter name.
    pub fn name(&self) -> &'static str {
        match self {
            RecognizedParameter::Feature => "feature",
            RecognizedParameter::ObservedProperty => "observedProperty",
            RecognizedParameter::Offering => "offering",
            RecognizedParameter::Procedure => "procedure",
            RecognizedParameter::SpatialFilter => "spatialFilter",
            RecognizedParameter::TemporalFilter => "temporalFilter",
            RecognizedParameter::Namespaces => "namespaces",
        }
    }

    /// Case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct KvpEntry {
    name: String,
    value: String,
}

/// Decoded query parameters.
///
/// Names are matched case-insensitively; inserting a name again (in any case)
/// replaces the earlier value and spelling but keeps its position. Iteration
/// follows the order in which names first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvpParameters {
    entries: Vec<KvpEntry>,
}

impl KvpParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` query string.
    pub fn from_query(query: &str) -> Self {
        url::form_urlencoded::parse(query.as_bytes())
            .filter(|(name, _)| !name.is_empty())
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let entry = KvpEntry {
            name: name.into(),
            value: value.into(),
        };
        match self.position(&entry.name) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Value of a parameter, matched case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .map(|index| self.entries[index].value.as_str())
    }

    /// Iterate `(name, value)` pairs in the spelling last supplied.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), e.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for KvpParameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = KvpParameters::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Split a comma-delimited value into trimmed, non-empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn list_value(name: &str, value: &str) -> SosResult<Vec<String>> {
    let list = split_list(value);
    if list.is_empty() {
        return Err(SosError::unrecognized(name, value));
    }
    Ok(list)
}

/// Build a search request from KVP parameters.
///
/// Every parameter must be recognized and non-empty, and at least one must be
/// present. Fields are independent, so parameter order has no effect.
pub fn parse_search(params: &KvpParameters, tag: ServiceTag) -> SosResult<GetObservationRequest> {
    let mut request = GetObservationRequest::new(tag);
    let mut valid = false;

    for (name, value) in params.iter() {
        let parameter = RecognizedParameter::from_name(name)
            .filter(|_| !value.is_empty())
            .ok_or_else(|| SosError::unrecognized(name, value))?;

        match parameter {
            RecognizedParameter::Feature => {
                request.feature_identifiers = Some(list_value(name, value)?)
            }
            RecognizedParameter::ObservedProperty => {
                request.observed_properties = Some(list_value(name, value)?)
            }
            RecognizedParameter::Offering => request.offerings = Some(list_value(name, value)?),
            RecognizedParameter::Procedure => request.procedures = Some(list_value(name, value)?),
            RecognizedParameter::SpatialFilter => {
                let values: Vec<&str> = value.split(',').map(str::trim).collect();
                request.spatial_filter = Some(SpatialFilter::parse(&values, name)?);
            }
            RecognizedParameter::TemporalFilter => {
                let values: Vec<&str> = value.split(',').map(str::trim).collect();
                request.temporal_filters = Some(TemporalFilter::parse_all(&values, name)?);
            }
            RecognizedParameter::Namespaces => {
                request.namespaces = Some(parse_namespaces(value, name)?)
            }
        }
        valid = true;
    }

    if !valid {
        return Err(SosError::NoValidParameter(format!(
            "expected at least one of: {}",
            RecognizedParameter::ALL
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    Ok(request)
}
