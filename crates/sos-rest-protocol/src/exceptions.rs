//! OWS exception reports rendered from decoding failures.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};
use sos_common::{SosError, SosResult};

/// OWS 1.1 namespace.
pub const OWS_NAMESPACE: &str = "http://www.opengis.net/ows/1.1";

/// A single exception entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwsException {
    pub exception_code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,

    pub text: String,
}

/// `ows:ExceptionReport`, serializable as JSON or XML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionReport {
    pub version: String,

    /// HTTP status the report is sent with.
    #[serde(skip)]
    pub status: u16,

    pub exceptions: Vec<OwsException>,
}

impl ExceptionReport {
    pub fn new(version: impl Into<String>, status: u16) -> Self {
        Self {
            version: version.into(),
            status,
            exceptions: Vec::new(),
        }
    }

    pub fn with_exception(
        mut self,
        code: impl Into<String>,
        locator: Option<String>,
        text: impl Into<String>,
    ) -> Self {
        self.exceptions.push(OwsException {
            exception_code: code.into(),
            locator,
            text: text.into(),
        });
        self
    }

    /// Build a report for a decoding error.
    pub fn from_error(version: &str, error: &SosError) -> Self {
        Self::new(version, error.http_status_code()).with_exception(
            error.ows_exception_code(),
            error.locator().map(str::to_string),
            error.to_string(),
        )
    }

    /// Serialize as an `ows:ExceptionReport` XML document.
    pub fn to_xml(&self) -> SosResult<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        self.write_xml(&mut writer)
            .map_err(|e| SosError::Internal(format!("Failed to write exception report: {}", e)))?;

        String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| SosError::Internal(format!("Exception report is not UTF-8: {}", e)))
    }

    fn write_xml(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> Result<(), quick_xml::Error> {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let root = BytesStart::new("ows:ExceptionReport").with_attributes([
            ("xmlns:ows", OWS_NAMESPACE),
            ("version", self.version.as_str()),
        ]);
        writer.write_event(Event::Start(root))?;

        for exception in &self.exceptions {
            let mut start = BytesStart::new("ows:Exception");
            start.push_attribute(("exceptionCode", exception.exception_code.as_str()));
            if let Some(locator) = &exception.locator {
                start.push_attribute(("locator", locator.as_str()));
            }
            writer.write_event(Event::Start(start))?;

            writer.write_event(Event::Start(BytesStart::new("ows:ExceptionText")))?;
            writer.write_event(Event::Text(BytesText::new(&exception.text)))?;
            writer.write_event(Event::End(BytesEnd::new("ows:ExceptionText")))?;

            writer.write_event(Event::End(BytesEnd::new("ows:Exception")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("ows:ExceptionReport")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_from_unrecognized_parameter() {
        let report = ExceptionReport::from_error("2.0.0", &SosError::unrecognized("foo", "bar"));

        assert_eq!(report.status, 400);
        assert_eq!(report.exceptions.len(), 1);
        assert_eq!(report.exceptions[0].exception_code, "InvalidParameterValue");
        assert_eq!(report.exceptions[0].locator.as_deref(), Some("foo"));
    }

    #[test]
    fn test_xml_output() {
        let report = ExceptionReport::from_error("2.0.0", &SosError::unrecognized("foo", "<bar>"));
        let xml = report.to_xml().unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<ows:ExceptionReport xmlns:ows=\"http://www.opengis.net/ows/1.1\" version=\"2.0.0\">"));
        assert!(xml.contains("exceptionCode=\"InvalidParameterValue\""));
        assert!(xml.contains("locator=\"foo\""));
        // Text content is escaped.
        assert!(xml.contains("&lt;bar&gt;"));
    }

    #[test]
    fn test_xml_without_locator() {
        let report = ExceptionReport::from_error(
            "2.0.0",
            &SosError::UnsupportedOperation("HTTP PUT on resource 'observations'".to_string()),
        );
        let xml = report.to_xml().unwrap();

        assert_eq!(report.status, 405);
        assert!(xml.contains("exceptionCode=\"OperationNotSupported\""));
        assert!(!xml.contains("locator="));
    }

    #[test]
    fn test_json_serialization() {
        let report = ExceptionReport::from_error("2.0.0", &SosError::NoValidParameter("none".into()));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["version"], "2.0.0");
        assert_eq!(json["exceptions"][0]["exceptionCode"], "MissingParameterValue");
        assert!(json.get("status").is_none());
        assert!(json["exceptions"][0].get("locator").is_none());
    }
}
