//! OCFL inventory model
//!
//! The inventory is the authoritative record of an OCFL object: its digest
//! algorithm, content manifest, and version history. `BTreeMap` keys keep the
//! serialized JSON deterministic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{OcflError, Result};

/// OCFL inventory type declaration
const INVENTORY_TYPE: &str = "https://ocfl.io/1.0/spec/#inventory";

/// Default content directory name within each version
pub const CONTENT_DIRECTORY: &str = "content";

/// A 1-based OCFL version number (`v1`, `v2`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionNum(pub u32);

impl VersionNum {
    /// Parse `v<n>` into a version number.
    pub fn parse(name: &str) -> Result<Self> {
        name.strip_prefix('v')
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .map(VersionNum)
            .ok_or_else(|| OcflError::corrupt_inventory(format!("invalid version name: {name}")))
    }
}

impl std::fmt::Display for VersionNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Attribution for a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionUser {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// One version of an OCFL object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: VersionUser,
    /// digest -> logical paths present in this version
    pub state: BTreeMap<String, Vec<String>>,
}

impl VersionRecord {
    /// Find the digest of the entry holding the given logical path.
    pub fn digest_for_path(&self, logical_path: &str) -> Option<&str> {
        self.state.iter().find_map(|(digest, paths)| {
            paths
                .iter()
                .any(|p| p == logical_path)
                .then_some(digest.as_str())
        })
    }

    /// True if this version's state includes the logical path.
    pub fn has_path(&self, logical_path: &str) -> bool {
        self.digest_for_path(logical_path).is_some()
    }

    /// Remove a logical path from the state, dropping emptied entries.
    pub fn remove_path(&mut self, logical_path: &str) {
        self.state.retain(|_, paths| {
            paths.retain(|p| p != logical_path);
            !paths.is_empty()
        });
    }
}

/// The OCFL object inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub id: String,
    #[serde(rename = "type")]
    pub spec_type: String,
    pub digest_algorithm: String,
    pub head: String,
    pub content_directory: String,
    /// digest -> content paths relative to the object root
    pub manifest: BTreeMap<String, Vec<String>>,
    /// version name (`v1`, ...) -> version record
    pub versions: BTreeMap<String, VersionRecord>,
}

impl Inventory {
    /// Create an inventory for a new object with no versions yet.
    pub fn new(id: impl Into<String>, digest_algorithm: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            spec_type: INVENTORY_TYPE.to_string(),
            digest_algorithm: digest_algorithm.into(),
            head: String::new(),
            content_directory: CONTENT_DIRECTORY.to_string(),
            manifest: BTreeMap::new(),
            versions: BTreeMap::new(),
        }
    }

    /// Number of the head version; 0 when no versions exist.
    pub fn head_num(&self) -> u32 {
        if self.head.is_empty() {
            0
        } else {
            VersionNum::parse(&self.head).map(|v| v.0).unwrap_or(0)
        }
    }

    /// The head version record, if any version exists.
    pub fn head_version(&self) -> Option<&VersionRecord> {
        self.versions.get(&self.head)
    }

    /// Look up a version by number.
    pub fn version(&self, num: VersionNum) -> Option<&VersionRecord> {
        self.versions.get(&num.to_string())
    }

    /// Version numbers in ascending order.
    pub fn version_nums(&self) -> Vec<VersionNum> {
        let mut nums: Vec<VersionNum> = self
            .versions
            .keys()
            .filter_map(|name| VersionNum::parse(name).ok())
            .collect();
        nums.sort();
        nums
    }

    /// The first content path recorded for a digest.
    pub fn content_path(&self, digest: &str) -> Option<&str> {
        self.manifest
            .get(digest)
            .and_then(|paths| paths.first())
            .map(String::as_str)
    }
}
