//! Resource descriptors
//!
//! A [`ResourceInfo`] carries everything a task needs to migrate one
//! resource: its identity, where it sits in the export tree, and its kind.
//! Descriptors are produced by a parent's child enumeration, consumed once,
//! and discarded after the resource's own children are emitted.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Form-URL encoding set: everything but `[A-Za-z0-9]`, `*`, `-`, `.`, `_`.
/// Space maps to `+` separately.
const FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// Form-URL encode an identifier segment the way export file names are
/// encoded (space becomes `+`).
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, FORM)
        .to_string()
        .replace("%20", "+")
}

/// Decode a form-URL encoded file name back to an identifier segment.
pub fn decode_segment(encoded: &str) -> String {
    let plus_decoded: Cow<'_, str> = if encoded.contains('+') {
        Cow::Owned(encoded.replace('+', " "))
    } else {
        Cow::Borrowed(encoded)
    };
    percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// The migration kinds a resource can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Container,
    Binary,
    ExternalBinary,
}

/// Encapsulates all of the information necessary to migrate a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Internal Fedora id of the resource's parent
    pub parent_id: String,
    /// Internal Fedora id of the resource
    pub full_id: String,
    /// Final segment of the full id, percent encoded
    pub name_encoded: String,
    /// Export directory that contains the resource
    pub outer_directory: PathBuf,
    /// Export directory that contains the contents of the resource
    pub inner_directory: PathBuf,
    /// The kind of the resource
    pub kind: ResourceKind,
}

impl ResourceInfo {
    /// Descriptor for a container resource.
    pub fn container(
        parent_id: impl Into<String>,
        full_id: impl Into<String>,
        outer_directory: impl Into<PathBuf>,
        name_encoded: impl Into<String>,
    ) -> Self {
        Self::new(
            parent_id,
            full_id,
            outer_directory,
            name_encoded,
            ResourceKind::Container,
        )
    }

    /// Descriptor for a binary resource.
    pub fn binary(
        parent_id: impl Into<String>,
        full_id: impl Into<String>,
        outer_directory: impl Into<PathBuf>,
        name_encoded: impl Into<String>,
    ) -> Self {
        Self::new(
            parent_id,
            full_id,
            outer_directory,
            name_encoded,
            ResourceKind::Binary,
        )
    }

    /// Descriptor for an externally-stored binary resource.
    pub fn external_binary(
        parent_id: impl Into<String>,
        full_id: impl Into<String>,
        outer_directory: impl Into<PathBuf>,
        name_encoded: impl Into<String>,
    ) -> Self {
        Self::new(
            parent_id,
            full_id,
            outer_directory,
            name_encoded,
            ResourceKind::ExternalBinary,
        )
    }

    fn new(
        parent_id: impl Into<String>,
        full_id: impl Into<String>,
        outer_directory: impl Into<PathBuf>,
        name_encoded: impl Into<String>,
        kind: ResourceKind,
    ) -> Self {
        let name_encoded = name_encoded.into();
        let outer_directory = outer_directory.into();
        let inner_directory = outer_directory.join(&name_encoded);

        Self {
            parent_id: parent_id.into(),
            full_id: full_id.into(),
            name_encoded,
            outer_directory,
            inner_directory,
            kind,
        }
    }

    /// The export directory that contains the resource.
    pub fn outer_directory(&self) -> &Path {
        &self.outer_directory
    }

    /// The export directory that contains the contents of the resource.
    pub fn inner_directory(&self) -> &Path {
        &self.inner_directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_directory_is_derived() {
        let info = ResourceInfo::container(
            "info:fedora",
            "info:fedora/simple",
            "/export/rest",
            "simple",
        );
        assert_eq!(info.inner_directory, PathBuf::from("/export/rest/simple"));
        assert_eq!(info.kind, ResourceKind::Container);
    }

    #[test]
    fn factory_kinds() {
        let binary = ResourceInfo::binary("p", "p/b", "/x", "b");
        assert_eq!(binary.kind, ResourceKind::Binary);

        let external = ResourceInfo::external_binary("p", "p/e", "/x", "e");
        assert_eq!(external.kind, ResourceKind::ExternalBinary);
    }

    #[test]
    fn segment_encoding_matches_form_urlencoding() {
        assert_eq!(encode_segment("simple"), "simple");
        assert_eq!(
            encode_segment("binary:with!encoding"),
            "binary%3Awith%21encoding"
        );
        assert_eq!(encode_segment("with space"), "with+space");
        assert_eq!(encode_segment("keep-.._*"), "keep-.._*");
        assert_eq!(encode_segment("a/b"), "a%2Fb");
    }

    #[test]
    fn segment_decoding_round_trips() {
        for segment in [
            "simple",
            "binary:with!encoding",
            "with space",
            "a/b",
            "ünïcode",
        ] {
            assert_eq!(decode_segment(&encode_segment(segment)), segment);
        }
    }
}
