//! Resource headers
//!
//! A `ResourceHeaders` document records the repository-level metadata of one
//! resource at one version: identity, interaction model, attribution,
//! timestamps, state token, and (for binaries) technical metadata. Headers
//! are persisted as a JSON sidecar next to the resource content inside the
//! OCFL object, so the struct doubles as the wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository metadata for one resource at one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceHeaders {
    /// Internal Fedora id of the resource
    pub id: String,
    /// Internal Fedora id of the resource's parent
    pub parent: String,
    /// Interaction model IRI
    pub interaction_model: String,
    pub archival_group: bool,
    pub object_root: bool,
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub digests: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_handling: Option<String>,
}

impl ResourceHeaders {
    /// Create headers with identity fields set and everything else at its
    /// default (`archival_group` and `deleted` false, no attribution).
    pub fn new(
        id: impl Into<String>,
        parent: impl Into<String>,
        interaction_model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent: parent.into(),
            interaction_model: interaction_model.into(),
            archival_group: false,
            object_root: false,
            deleted: false,
            created_by: None,
            created_date: None,
            last_modified_by: None,
            last_modified_date: None,
            state_token: None,
            content_size: None,
            digests: Vec::new(),
            filename: None,
            mime_type: None,
            external_url: None,
            external_handling: None,
        }
    }

    pub fn with_object_root(mut self, object_root: bool) -> Self {
        self.object_root = object_root;
        self
    }

    pub fn with_archival_group(mut self, archival_group: bool) -> Self {
        self.archival_group = archival_group;
        self
    }

    pub fn with_deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }

    pub fn with_created_by(mut self, created_by: Option<String>) -> Self {
        self.created_by = created_by;
        self
    }

    pub fn with_created_date(mut self, created_date: Option<DateTime<Utc>>) -> Self {
        self.created_date = created_date;
        self
    }

    pub fn with_last_modified_by(mut self, last_modified_by: Option<String>) -> Self {
        self.last_modified_by = last_modified_by;
        self
    }

    pub fn with_last_modified_date(mut self, last_modified_date: Option<DateTime<Utc>>) -> Self {
        self.last_modified_date = last_modified_date;
        self
    }

    pub fn with_state_token(mut self, state_token: impl Into<String>) -> Self {
        self.state_token = Some(state_token.into());
        self
    }

    pub fn with_content_size(mut self, content_size: u64) -> Self {
        self.content_size = Some(content_size);
        self
    }

    pub fn with_digests(mut self, digests: Vec<String>) -> Self {
        self.digests = digests;
        self
    }

    pub fn with_filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename;
        self
    }

    pub fn with_mime_type(mut self, mime_type: Option<String>) -> Self {
        self.mime_type = mime_type;
        self
    }

    pub fn with_external_url(mut self, external_url: impl Into<String>) -> Self {
        self.external_url = Some(external_url.into());
        self
    }

    pub fn with_external_handling(mut self, external_handling: impl Into<String>) -> Self {
        self.external_handling = Some(external_handling.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn json_round_trip() {
        let ts = Utc.with_ymd_and_hms(2020, 10, 15, 5, 35, 26).unwrap();
        let headers = ResourceHeaders::new(
            "info:fedora/bin",
            "info:fedora",
            "http://www.w3.org/ns/ldp#NonRDFSource",
        )
        .with_object_root(true)
        .with_created_by(Some("fedoraAdmin".into()))
        .with_created_date(Some(ts))
        .with_last_modified_date(Some(ts))
        .with_state_token("ABCDEF")
        .with_content_size(41)
        .with_digests(vec!["urn:sha1:aaa".into()])
        .with_filename(Some("file.txt".into()))
        .with_mime_type(Some("text/plain".into()));

        let json = serde_json::to_string(&headers).unwrap();
        assert!(json.contains("\"interactionModel\""));
        assert!(json.contains("\"contentSize\":41"));

        let back: ResourceHeaders = serde_json::from_str(&json).unwrap();
        assert_eq!(back, headers);
    }

    #[test]
    fn optional_fields_are_omitted() {
        let headers = ResourceHeaders::new(
            "info:fedora/c",
            "info:fedora",
            "http://www.w3.org/ns/ldp#BasicContainer",
        );
        let json = serde_json::to_string(&headers).unwrap();
        assert!(!json.contains("contentSize"));
        assert!(!json.contains("externalUrl"));
        assert!(!json.contains("digests"));
    }
}
