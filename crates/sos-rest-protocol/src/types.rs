//! Core types shared by the observation document and the canonical requests.

use serde::{Deserialize, Serialize};

/// A typed link embedded in an observation document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    /// The relation URI of the link.
    pub rel: String,

    /// The URI of the linked resource.
    pub href: String,

    /// The media type of the linked resource.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Whether the link element was marked `xsi:nil`.
    #[serde(default)]
    pub nil: bool,
}

impl Link {
    /// Create a new link with required fields.
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            type_: None,
            nil: false,
        }
    }

    /// Set the media type.
    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    /// Mark the link as nil.
    pub fn nil(mut self) -> Self {
        self.nil = true;
        self
    }

    /// Whether this link associates the observation with an offering.
    ///
    /// Nil links never count, the relation is compared case-insensitively.
    pub fn is_offering_link(&self, offering_relation: &str) -> bool {
        !self.nil && self.rel.eq_ignore_ascii_case(offering_relation)
    }
}

/// An identifier qualified by the authority (code space) that issued it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeWithAuthority {
    pub value: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_space: Option<String>,
}

impl CodeWithAuthority {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            code_space: None,
        }
    }

    pub fn with_code_space(mut self, code_space: impl Into<String>) -> Self {
        self.code_space = Some(code_space.into());
        self
    }
}

/// An xlink reference (`xlink:href` plus optional `xlink:title`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Reference {
    pub fn href(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            title: None,
        }
    }

    /// The href when present and non-empty.
    pub fn href_str(&self) -> Option<&str> {
        self.href.as_deref().filter(|h| !h.is_empty())
    }
}
