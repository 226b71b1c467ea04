//! Structured observation document and its XML reader.
//!
//! The accepted document is a REST binding observation wrapper:
//!
//! ```xml
//! <sosREST:Observation>
//!   <om:OM_Observation gml:id="o1">
//!     <gml:identifier codeSpace="...">...</gml:identifier>
//!     <om:type xlink:href="...OM_Measurement"/>
//!     <om:phenomenonTime>...</om:phenomenonTime>
//!     <om:resultTime xlink:href="#phenomenonTime"/>
//!     <om:procedure xlink:href="..."/>
//!     <om:observedProperty xlink:href="..."/>
//!     <om:featureOfInterest xlink:href="..."/>
//!     <om:result xsi:type="gml:MeasureType" uom="degC">21.5</om:result>
//!   </om:OM_Observation>
//!   <sosREST:link rel="..." href="..." type="..."/>
//! </sosREST:Observation>
//! ```
//!
//! Elements are matched on their local names; prefixes are not resolved.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use sos_common::config::RESOURCE_OBSERVATIONS;
use sos_common::{SosError, SosResult};

use crate::types::{CodeWithAuthority, Link, Reference};

const ROOT: &str = "Observation";
const OM_OBSERVATION: &str = "OM_Observation";
const RECORD_COMPONENTS: [&str; 5] = ["Quantity", "Count", "Boolean", "Text", "Category"];

/// A time element of the observation as written in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentTime {
    Instant {
        id: Option<String>,
        position: String,
    },
    Period {
        id: Option<String>,
        begin: String,
        end: String,
    },
    /// `xlink:href` pointing at another time element, e.g. `#phenomenonTime`.
    Reference(String),
}

/// One `swe:field` of a `swe:DataRecord` result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldElement {
    pub name: String,
    /// Local name of the SWE component (`Quantity`, `Count`, ...).
    pub component: Option<String>,
    pub definition: Option<String>,
    pub uom: Option<String>,
    pub code_space: Option<String>,
    pub value: Option<String>,
}

/// The `om:result` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultElement {
    /// `xsi:type` attribute, e.g. `gml:MeasureType`.
    pub xsi_type: Option<String>,
    pub uom: Option<String>,
    pub reference: Reference,
    pub text: String,
    pub record: Option<Vec<FieldElement>>,
}

/// The embedded `om:OM_Observation`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OmObservationDocument {
    pub gml_id: Option<String>,
    pub identifier: Option<CodeWithAuthority>,
    pub observation_type: Option<String>,
    pub phenomenon_time: Option<DocumentTime>,
    pub result_time: Option<DocumentTime>,
    pub procedure: Option<Reference>,
    pub observed_property: Option<Reference>,
    pub feature_of_interest: Option<Reference>,
    /// `gml:identifier` of an inline feature of interest.
    pub inline_feature_identifier: Option<String>,
    pub result: Option<ResultElement>,
}

/// A REST binding observation document: one observation plus its links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationDocument {
    pub observation: OmObservationDocument,
    pub links: Vec<Link>,
}

impl ObservationDocument {
    /// Parse an XML payload.
    ///
    /// Syntax errors are `MalformedBody`; well-formed documents that are not a
    /// single-observation document are `UnsupportedOperation`.
    pub fn from_xml(body: &[u8]) -> SosResult<Self> {
        let mut reader = Reader::from_reader(body);
        reader.trim_text(true);

        let mut builder = DocumentBuilder::default();
        let mut stack: Vec<String> = Vec::new();
        let mut text = String::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let name = local_name(&e);
                    builder.open(&name, &stack, &e)?;
                    stack.push(name);
                    text.clear();
                }
                Ok(Event::Empty(e)) => {
                    let name = local_name(&e);
                    builder.open(&name, &stack, &e)?;
                    builder.close(&name, &stack, String::new());
                }
                Ok(Event::Text(t)) => {
                    let unescaped = t.unescape().map_err(|e| syntax(&reader, e))?;
                    if stack.is_empty() && !unescaped.trim().is_empty() {
                        return Err(SosError::MalformedBody(
                            "text content outside of the root element".to_string(),
                        ));
                    }
                    text.push_str(&unescaped);
                }
                Ok(Event::CData(c)) => {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
                Ok(Event::End(_)) => {
                    let name = stack.pop().unwrap_or_default();
                    builder.close(&name, &stack, std::mem::take(&mut text));
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(syntax(&reader, e)),
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(SosError::MalformedBody(format!(
                "unexpected end of document inside '{}'",
                stack.join("/")
            )));
        }

        builder.finish()
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn syntax<R>(reader: &Reader<R>, err: impl std::fmt::Display) -> SosError {
    SosError::MalformedBody(format!(
        "XML parsing error at position {}: {}",
        reader.buffer_position(),
        err
    ))
}

fn not_an_observation_document(detail: impl Into<String>) -> SosError {
    SosError::UnsupportedOperation(format!(
        "HTTP POST on resource '{}' requires a single observation document ({})",
        RESOURCE_OBSERVATIONS,
        detail.into()
    ))
}

struct XmlAttr {
    prefix: Option<String>,
    local: String,
    value: String,
}

fn read_attributes(e: &BytesStart<'_>) -> SosResult<Vec<XmlAttr>> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| SosError::MalformedBody(format!("invalid attribute: {}", err)))?;
        let prefix = attr
            .key
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
        if prefix.as_deref() == Some("xmlns") || attr.key.as_ref() == b"xmlns" {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|err| SosError::MalformedBody(format!("invalid attribute value: {}", err)))?
            .into_owned();
        attrs.push(XmlAttr {
            prefix,
            local: String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned(),
            value,
        });
    }
    Ok(attrs)
}

fn attr(attrs: &[XmlAttr], local: &str) -> Option<String> {
    attrs
        .iter()
        .find(|a| a.local == local)
        .map(|a| a.value.clone())
}

/// `xsi:type`-style attribute: named `type` but not in the xlink namespace.
fn schema_type_attr(attrs: &[XmlAttr]) -> Option<String> {
    attrs
        .iter()
        .find(|a| a.local == "type" && a.prefix.is_some() && a.prefix.as_deref() != Some("xlink"))
        .map(|a| a.value.clone())
}

fn reference_from(attrs: &[XmlAttr]) -> Reference {
    Reference {
        href: attr(attrs, "href"),
        title: attr(attrs, "title"),
    }
}

fn within(stack: &[String], name: &str) -> bool {
    stack.iter().any(|s| s == name)
}

#[derive(Default)]
struct DocumentBuilder {
    seen_root: bool,
    observations: usize,
    observation: OmObservationDocument,
    links: Vec<Link>,
    pending_code_space: Option<String>,
}

impl DocumentBuilder {
    fn open(&mut self, name: &str, stack: &[String], e: &BytesStart<'_>) -> SosResult<()> {
        if stack.is_empty() {
            if self.seen_root {
                return Err(SosError::MalformedBody(
                    "multiple root elements".to_string(),
                ));
            }
            if name != ROOT {
                return Err(not_an_observation_document(format!(
                    "root element is '{}'",
                    name
                )));
            }
            self.seen_root = true;
            return Ok(());
        }

        let parent = stack.last().map(String::as_str);

        if name == OM_OBSERVATION && parent == Some(ROOT) {
            self.observations += 1;
            if self.observations > 1 {
                return Err(not_an_observation_document(
                    "more than one observation element",
                ));
            }
            let attrs = read_attributes(e)?;
            self.observation.gml_id = attr(&attrs, "id");
            return Ok(());
        }

        if !within(stack, OM_OBSERVATION) {
            if name == "link" && parent == Some(ROOT) {
                let attrs = read_attributes(e)?;
                let nil = attr(&attrs, "nil")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(false);
                self.links.push(Link {
                    rel: attr(&attrs, "rel").unwrap_or_default(),
                    href: attr(&attrs, "href").unwrap_or_default(),
                    type_: attrs
                        .iter()
                        .find(|a| a.local == "type" && a.prefix.is_none())
                        .map(|a| a.value.clone()),
                    nil,
                });
            }
            return Ok(());
        }

        if parent == Some(OM_OBSERVATION) {
            let attrs = read_attributes(e)?;
            let obs = &mut self.observation;
            match name {
                "identifier" => self.pending_code_space = attr(&attrs, "codeSpace"),
                "type" => obs.observation_type = attr(&attrs, "href"),
                "procedure" => obs.procedure = Some(reference_from(&attrs)),
                "observedProperty" => obs.observed_property = Some(reference_from(&attrs)),
                "featureOfInterest" => obs.feature_of_interest = Some(reference_from(&attrs)),
                "phenomenonTime" => {
                    obs.phenomenon_time = attr(&attrs, "href").map(DocumentTime::Reference)
                }
                "resultTime" => obs.result_time = attr(&attrs, "href").map(DocumentTime::Reference),
                "result" => {
                    obs.result = Some(ResultElement {
                        xsi_type: schema_type_attr(&attrs),
                        uom: attr(&attrs, "uom"),
                        reference: reference_from(&attrs),
                        text: String::new(),
                        record: None,
                    })
                }
                _ => {}
            }
            return Ok(());
        }

        match name {
            "TimeInstant" | "TimePeriod" => {
                let attrs = read_attributes(e)?;
                let id = attr(&attrs, "id");
                if let Some(slot) = self.time_slot(stack) {
                    *slot = Some(if name == "TimeInstant" {
                        DocumentTime::Instant {
                            id,
                            position: String::new(),
                        }
                    } else {
                        DocumentTime::Period {
                            id,
                            begin: String::new(),
                            end: String::new(),
                        }
                    });
                }
            }
            "DataRecord" if parent == Some("result") => {
                if let Some(result) = self.observation.result.as_mut() {
                    result.record = Some(Vec::new());
                }
            }
            "field" if parent == Some("DataRecord") => {
                let attrs = read_attributes(e)?;
                if let Some(fields) = self.record_mut() {
                    fields.push(FieldElement {
                        name: attr(&attrs, "name").unwrap_or_default(),
                        ..FieldElement::default()
                    });
                }
            }
            component if parent == Some("field") && RECORD_COMPONENTS.contains(&component) => {
                let attrs = read_attributes(e)?;
                if let Some(field) = self.current_field_mut() {
                    field.component = Some(component.to_string());
                    field.definition = attr(&attrs, "definition");
                }
            }
            "uom" if within(stack, "field") => {
                let attrs = read_attributes(e)?;
                if let Some(field) = self.current_field_mut() {
                    field.uom = attr(&attrs, "code").or_else(|| attr(&attrs, "href"));
                }
            }
            "codeSpace" if within(stack, "field") => {
                let attrs = read_attributes(e)?;
                if let Some(field) = self.current_field_mut() {
                    field.code_space = attr(&attrs, "href");
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &str, stack: &[String], text: String) {
        if !within(stack, OM_OBSERVATION) {
            return;
        }
        let parent = stack.last().map(String::as_str);

        match name {
            "identifier" if parent == Some(OM_OBSERVATION) => {
                self.observation.identifier = Some(CodeWithAuthority {
                    value: text.trim().to_string(),
                    code_space: self.pending_code_space.take(),
                });
            }
            "identifier" if within(stack, "featureOfInterest") => {
                if self.observation.inline_feature_identifier.is_none() {
                    self.observation.inline_feature_identifier = Some(text.trim().to_string());
                }
            }
            "result" if parent == Some(OM_OBSERVATION) => {
                if let Some(result) = self.observation.result.as_mut() {
                    result.text = text;
                }
            }
            "timePosition" | "beginPosition" | "endPosition" => {
                if let Some(Some(time)) = self.time_slot(stack) {
                    match (name, time) {
                        ("timePosition", DocumentTime::Instant { position, .. }) => *position = text,
                        ("beginPosition", DocumentTime::Period { begin, .. }) => *begin = text,
                        ("endPosition", DocumentTime::Period { end, .. }) => *end = text,
                        _ => {}
                    }
                }
            }
            "value" if within(stack, "field") => {
                if let Some(field) = self.current_field_mut() {
                    field.value = Some(text);
                }
            }
            _ => {}
        }
    }

    fn time_slot(&mut self, stack: &[String]) -> Option<&mut Option<DocumentTime>> {
        if within(stack, "phenomenonTime") {
            Some(&mut self.observation.phenomenon_time)
        } else if within(stack, "resultTime") {
            Some(&mut self.observation.result_time)
        } else {
            None
        }
    }

    fn record_mut(&mut self) -> Option<&mut Vec<FieldElement>> {
        self.observation.result.as_mut()?.record.as_mut()
    }

    fn current_field_mut(&mut self) -> Option<&mut FieldElement> {
        self.record_mut()?.last_mut()
    }

    fn finish(self) -> SosResult<ObservationDocument> {
        if !self.seen_root {
            return Err(SosError::MalformedBody("document has no root element".to_string()));
        }
        if self.observations == 0 {
            return Err(not_an_observation_document("no observation element"));
        }
        Ok(ObservationDocument {
            observation: self.observation,
            links: self.links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEASUREMENT: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<sosREST:Observation xmlns:sosREST="http://www.opengis.net/sosREST/1.0"
    xmlns:om="http://www.opengis.net/om/2.0"
    xmlns:gml="http://www.opengis.net/gml/3.2"
    xmlns:xlink="http://www.w3.org/1999/xlink"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <om:OM_Observation gml:id="o1">
    <gml:identifier codeSpace="http://www.opengis.net/def/nil/OGC/0/unknown">obs-1</gml:identifier>
    <om:type xlink:href="http://www.opengis.net/def/observationType/OGC-OM/2.0/OM_Measurement"/>
    <om:phenomenonTime>
      <gml:TimeInstant gml:id="phenomenonTime">
        <gml:timePosition>2012-11-19T13:00:00Z</gml:timePosition>
      </gml:TimeInstant>
    </om:phenomenonTime>
    <om:resultTime xlink:href="#phenomenonTime"/>
    <om:procedure xlink:href="http://svc/procedures/proc1"/>
    <om:observedProperty xlink:href="http://example.org/temperature"/>
    <om:featureOfInterest xlink:href="foi-1" xlink:title="Station 1"/>
    <om:result xsi:type="gml:MeasureType" uom="degC">21.5</om:result>
  </om:OM_Observation>
  <sosREST:link rel="http://www.opengis.net/sosREST/1.0/offering-get" href="http://svc/offerings/off1" type="application/gml+xml"/>
</sosREST:Observation>"##;

    #[test]
    fn test_parse_measurement_document() {
        let doc = ObservationDocument::from_xml(MEASUREMENT.as_bytes()).unwrap();
        let obs = &doc.observation;

        assert_eq!(obs.gml_id.as_deref(), Some("o1"));
        let identifier = obs.identifier.as_ref().unwrap();
        assert_eq!(identifier.value, "obs-1");
        assert_eq!(
            identifier.code_space.as_deref(),
            Some("http://www.opengis.net/def/nil/OGC/0/unknown")
        );
        assert!(obs.observation_type.as_deref().unwrap().ends_with("OM_Measurement"));
        assert_eq!(
            obs.phenomenon_time,
            Some(DocumentTime::Instant {
                id: Some("phenomenonTime".to_string()),
                position: "2012-11-19T13:00:00Z".to_string(),
            })
        );
        assert_eq!(
            obs.result_time,
            Some(DocumentTime::Reference("#phenomenonTime".to_string()))
        );
        assert_eq!(
            obs.procedure.as_ref().unwrap().href.as_deref(),
            Some("http://svc/procedures/proc1")
        );
        assert_eq!(
            obs.feature_of_interest.as_ref().unwrap().title.as_deref(),
            Some("Station 1")
        );

        let result = obs.result.as_ref().unwrap();
        assert_eq!(result.xsi_type.as_deref(), Some("gml:MeasureType"));
        assert_eq!(result.uom.as_deref(), Some("degC"));
        assert_eq!(result.text, "21.5");

        assert_eq!(doc.links.len(), 1);
        assert_eq!(doc.links[0].href, "http://svc/offerings/off1");
        assert_eq!(doc.links[0].type_.as_deref(), Some("application/gml+xml"));
        assert!(!doc.links[0].nil);
    }

    #[test]
    fn test_parse_time_period_and_record() {
        let xml = r#"<Observation xmlns:swe="http://www.opengis.net/swe/2.0">
  <OM_Observation>
    <phenomenonTime>
      <TimePeriod id="tp"><beginPosition>2012-01-01T00:00:00Z</beginPosition><endPosition>2012-01-02T00:00:00Z</endPosition></TimePeriod>
    </phenomenonTime>
    <result>
      <swe:DataRecord>
        <swe:field name="temp"><swe:Quantity definition="http://x/temp"><swe:uom code="degC"/><swe:value>42.0</swe:value></swe:Quantity></swe:field>
        <swe:field name="class"><swe:Category definition="http://x/class"><swe:codeSpace xlink:href="codespace"/><swe:value>52</swe:value></swe:Category></swe:field>
      </swe:DataRecord>
    </result>
  </OM_Observation>
</Observation>"#;

        let doc = ObservationDocument::from_xml(xml.as_bytes()).unwrap();
        assert_eq!(
            doc.observation.phenomenon_time,
            Some(DocumentTime::Period {
                id: Some("tp".to_string()),
                begin: "2012-01-01T00:00:00Z".to_string(),
                end: "2012-01-02T00:00:00Z".to_string(),
            })
        );

        let record = doc.observation.result.unwrap().record.unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record[0].name, "temp");
        assert_eq!(record[0].component.as_deref(), Some("Quantity"));
        assert_eq!(record[0].uom.as_deref(), Some("degC"));
        assert_eq!(record[0].value.as_deref(), Some("42.0"));
        assert_eq!(record[1].code_space.as_deref(), Some("codespace"));
        assert_eq!(record[1].definition.as_deref(), Some("http://x/class"));
    }

    #[test]
    fn test_nil_link() {
        let xml = r#"<Observation><OM_Observation/><link rel="r" href="h" xsi:nil="true"/></Observation>"#;
        let doc = ObservationDocument::from_xml(xml.as_bytes()).unwrap();
        assert!(doc.links[0].nil);
    }

    #[test]
    fn test_wrong_root_is_unsupported() {
        let xml = r#"<om:OM_Observation xmlns:om="http://www.opengis.net/om/2.0"/>"#;
        let err = ObservationDocument::from_xml(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, SosError::UnsupportedOperation(_)));
    }

    #[test]
    fn test_two_observations_unsupported() {
        let xml = r#"<Observation><OM_Observation/><OM_Observation/></Observation>"#;
        let err = ObservationDocument::from_xml(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, SosError::UnsupportedOperation(_)));
    }

    #[test]
    fn test_missing_observation_unsupported() {
        let err = ObservationDocument::from_xml(b"<Observation/>").unwrap_err();
        assert!(matches!(err, SosError::UnsupportedOperation(_)));
    }

    #[test]
    fn test_mismatched_tags_malformed() {
        let err =
            ObservationDocument::from_xml(b"<Observation><OM_Observation></Observation>").unwrap_err();
        assert!(matches!(err, SosError::MalformedBody(_)));
    }

    #[test]
    fn test_truncated_document_malformed() {
        let err = ObservationDocument::from_xml(b"<Observation><OM_Observation>").unwrap_err();
        assert!(matches!(err, SosError::MalformedBody(_)));
    }

    #[test]
    fn test_plain_text_malformed() {
        let err = ObservationDocument::from_xml(b"not xml at all").unwrap_err();
        assert!(matches!(err, SosError::MalformedBody(_)));
    }
}
