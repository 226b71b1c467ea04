//! Detection and rewriting of links that point back at this service.

use std::borrow::Cow;

use crate::types::Reference;

/// The trailing path segment of an href (everything after the last `/`).
///
/// An href without any `/` is returned unchanged.
pub fn resource_id_from_href(href: &str) -> &str {
    match href.rfind('/') {
        Some(idx) => &href[idx + 1..],
        None => href,
    }
}

/// Rewrites self-referencing resource links to bare resource ids.
#[derive(Debug, Clone, Copy)]
pub struct LinkNormalizer<'a> {
    service_url: &'a str,
}

impl<'a> LinkNormalizer<'a> {
    pub fn new(service_url: &'a str) -> Self {
        Self { service_url }
    }

    /// Whether the href starts with the configured service base URL.
    ///
    /// An empty base URL matches nothing.
    pub fn is_self_reference(&self, href: &str) -> bool {
        !self.service_url.is_empty() && href.starts_with(self.service_url)
    }

    /// The bare resource id for self-references, the href itself otherwise.
    pub fn normalize<'h>(&self, href: &'h str) -> Cow<'h, str> {
        if self.is_self_reference(href) {
            Cow::Owned(resource_id_from_href(href).to_string())
        } else {
            Cow::Borrowed(href)
        }
    }

    /// Rewrite a reference in place. Returns true if it was changed.
    pub fn normalize_reference(&self, reference: &mut Reference) -> bool {
        let Some(href) = reference.href_str() else {
            return false;
        };
        if !self.is_self_reference(href) {
            return false;
        }

        let rewritten = resource_id_from_href(href).to_string();
        tracing::debug!(
            from = %href,
            to = %rewritten,
            "Rewriting self-referencing link"
        );
        reference.href = Some(rewritten);
        true
    }
}
