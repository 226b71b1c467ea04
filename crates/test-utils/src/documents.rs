//! Builders for observation documents in the REST binding XML form.

use sos_common::BindingConfig;

const OBSERVATION_TYPE_BASE: &str = "http://www.opengis.net/def/observationType/OGC-OM/2.0/";

/// A link element appended after the observation.
#[derive(Debug, Clone)]
struct LinkXml {
    rel: String,
    href: String,
    nil: bool,
}

/// Builder for a `sosREST:Observation` document holding one observation.
///
/// Defaults to a temperature measurement with identifier `obs-1`, a local
/// procedure and feature, and no links.
#[derive(Debug, Clone)]
pub struct ObservationXml {
    identifier: Option<String>,
    observation_type: Option<String>,
    procedure: String,
    observed_property: String,
    feature: String,
    phenomenon_time: String,
    result: String,
    links: Vec<LinkXml>,
}

impl Default for ObservationXml {
    fn default() -> Self {
        Self::measurement(21.5, "degC")
    }
}

impl ObservationXml {
    /// A measurement with the given value and unit of measure.
    pub fn measurement(value: f64, uom: &str) -> Self {
        Self {
            identifier: Some("obs-1".to_string()),
            observation_type: Some(format!("{}OM_Measurement", OBSERVATION_TYPE_BASE)),
            procedure: "http://svc/procedures/proc1".to_string(),
            observed_property: "http://example.org/phenomena/temperature".to_string(),
            feature: "http://svc/features/foi-1".to_string(),
            phenomenon_time: "2012-11-19T13:00:00Z".to_string(),
            result: format!(
                r#"<om:result xsi:type="gml:MeasureType" uom="{}">{}</om:result>"#,
                uom, value
            ),
            links: Vec::new(),
        }
    }

    /// A truth observation.
    pub fn truth(value: bool) -> Self {
        Self::measurement(0.0, "")
            .with_observation_type("OM_TruthObservation")
            .with_result(format!(
                r#"<om:result xsi:type="xs:boolean">{}</om:result>"#,
                value
            ))
    }

    /// A category observation expressed as a reference with a title.
    pub fn category(code_space: &str, value: &str) -> Self {
        Self::measurement(0.0, "")
            .with_observation_type("OM_CategoryObservation")
            .with_result(format!(
                r#"<om:result xsi:type="gml:ReferenceType" xlink:href="{}" xlink:title="{}"/>"#,
                code_space, value
            ))
    }

    pub fn with_identifier(mut self, identifier: &str) -> Self {
        self.identifier = Some(identifier.to_string());
        self
    }

    pub fn without_identifier(mut self) -> Self {
        self.identifier = None;
        self
    }

    /// Type name relative to the O&M observation type base, e.g. `OM_Measurement`.
    pub fn with_observation_type(mut self, name: &str) -> Self {
        self.observation_type = Some(format!("{}{}", OBSERVATION_TYPE_BASE, name));
        self
    }

    pub fn without_observation_type(mut self) -> Self {
        self.observation_type = None;
        self
    }

    pub fn with_procedure(mut self, href: &str) -> Self {
        self.procedure = href.to_string();
        self
    }

    pub fn with_feature(mut self, href: &str) -> Self {
        self.feature = href.to_string();
        self
    }

    pub fn with_phenomenon_time(mut self, position: &str) -> Self {
        self.phenomenon_time = position.to_string();
        self
    }

    /// Replace the whole `om:result` element.
    pub fn with_result(mut self, result_xml: impl Into<String>) -> Self {
        self.result = result_xml.into();
        self
    }

    pub fn with_link(mut self, rel: &str, href: &str) -> Self {
        self.links.push(LinkXml {
            rel: rel.to_string(),
            href: href.to_string(),
            nil: false,
        });
        self
    }

    pub fn with_nil_link(mut self, rel: &str, href: &str) -> Self {
        self.links.push(LinkXml {
            rel: rel.to_string(),
            href: href.to_string(),
            nil: true,
        });
        self
    }

    /// Add a link using the default offering relation.
    pub fn with_offering(self, href: &str) -> Self {
        let rel = BindingConfig::default().offering_relation;
        self.with_link(&rel, href)
    }

    pub fn build(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<sosREST:Observation xmlns:sosREST="http://www.opengis.net/sosREST/1.0"
    xmlns:om="http://www.opengis.net/om/2.0"
    xmlns:gml="http://www.opengis.net/gml/3.2"
    xmlns:xlink="http://www.w3.org/1999/xlink"
    xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <om:OM_Observation gml:id="o1">
"#,
        );

        if let Some(identifier) = &self.identifier {
            xml.push_str(&format!(
                "    <gml:identifier codeSpace=\"http://www.opengis.net/def/nil/OGC/0/unknown\">{}</gml:identifier>\n",
                identifier
            ));
        }
        if let Some(observation_type) = &self.observation_type {
            xml.push_str(&format!(
                "    <om:type xlink:href=\"{}\"/>\n",
                observation_type
            ));
        }
        xml.push_str(&format!(
            r##"    <om:phenomenonTime>
      <gml:TimeInstant gml:id="phenomenonTime">
        <gml:timePosition>{}</gml:timePosition>
      </gml:TimeInstant>
    </om:phenomenonTime>
    <om:resultTime xlink:href="#phenomenonTime"/>
    <om:procedure xlink:href="{}"/>
    <om:observedProperty xlink:href="{}"/>
    <om:featureOfInterest xlink:href="{}"/>
    {}
  </om:OM_Observation>
"##,
            self.phenomenon_time, self.procedure, self.observed_property, self.feature, self.result
        ));

        for link in &self.links {
            let nil = if link.nil { r#" xsi:nil="true""# } else { "" };
            xml.push_str(&format!(
                "  <sosREST:link rel=\"{}\" href=\"{}\" type=\"application/gml+xml\"{}/>\n",
                link.rel, link.href, nil
            ));
        }

        xml.push_str("</sosREST:Observation>\n");
        xml
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.build().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document() {
        let xml = ObservationXml::default().build();
        assert!(xml.contains("<gml:identifier"));
        assert!(xml.contains("OM_Measurement"));
        assert!(xml.contains(r#"uom="degC">21.5<"#));
        assert!(!xml.contains("sosREST:link"));
    }

    #[test]
    fn test_links_in_order() {
        let xml = ObservationXml::default()
            .with_offering("http://svc/offerings/off1")
            .with_link("http://example.org/other", "http://svc/x")
            .with_offering("http://svc/offerings/off2")
            .build();
        let first = xml.find("off1").unwrap();
        let second = xml.find("off2").unwrap();
        assert!(first < second);
        assert_eq!(xml.matches("<sosREST:link").count(), 3);
    }

    #[test]
    fn test_without_identifier() {
        let xml = ObservationXml::default().without_identifier().build();
        assert!(!xml.contains("gml:identifier"));
    }
}
