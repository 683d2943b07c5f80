//! OCFL object sessions
//!
//! A session stages writes against a single OCFL object and commits them as
//! one new version. Objects are stored under a sha256 hashed-n-tuple layout
//! beneath the storage root; content within an object is deduplicated by
//! digest through the inventory manifest.
//!
//! Sessions are exclusively owned: at most one session is open per object id
//! at a time. The caller enforces this by committing a parent object before
//! scheduling work on its children.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256, Sha512};
use tracing::debug;

use crate::error::{OcflError, Result};
use crate::headers::ResourceHeaders;
use crate::inventory::{Inventory, VersionNum, VersionRecord, VersionUser, CONTENT_DIRECTORY};

/// Storage-root namaste marker
const ROOT_NAMASTE: &str = "0=ocfl_1.0";
const ROOT_NAMASTE_CONTENT: &str = "ocfl_1.0\n";

/// Object-root namaste marker
const OBJECT_NAMASTE: &str = "0=ocfl_object_1.0";
const OBJECT_NAMASTE_CONTENT: &str = "ocfl_object_1.0\n";

const INVENTORY_FILE: &str = "inventory.json";

/// Suffix appended to the object id for a binary description resource
const METADATA_SUFFIX: &str = "/fcr:metadata";
/// Suffix appended to the object id for an ACL resource
const ACL_SUFFIX: &str = "/fcr:acl";

/// OCFL digest algorithms supported for manifests and sidecars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    #[default]
    Sha512,
    Sha256,
}

impl DigestAlgorithm {
    /// The algorithm name as it appears in inventories and sidecar names.
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha512 => "sha512",
            DigestAlgorithm::Sha256 => "sha256",
        }
    }

    /// Look up an algorithm by name.
    pub fn from_str(name: &str) -> Option<Self> {
        match name {
            "sha512" => Some(DigestAlgorithm::Sha512),
            "sha256" => Some(DigestAlgorithm::Sha256),
            _ => None,
        }
    }

    /// Hex digest of the given bytes.
    pub fn hex_digest(&self, bytes: &[u8]) -> String {
        match self {
            DigestAlgorithm::Sha512 => hex::encode(Sha512::digest(bytes)),
            DigestAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
        }
    }
}

/// Configuration shared by all sessions of a factory.
#[derive(Debug, Clone)]
pub struct OcflConfig {
    pub digest_algorithm: DigestAlgorithm,
    /// Name recorded as the version user
    pub user_name: String,
    /// Address recorded for the version user
    pub user_address: String,
    /// Force Windows-safe encoding of logical paths
    pub windows_mode: bool,
}

impl Default for OcflConfig {
    fn default() -> Self {
        Self {
            digest_algorithm: DigestAlgorithm::Sha512,
            user_name: "fedoraAdmin".to_string(),
            user_address: "info:fedora/fedoraAdmin".to_string(),
            windows_mode: false,
        }
    }
}

/// Creates sessions bound to a storage root.
#[derive(Debug)]
pub struct OcflObjectSessionFactory {
    root: PathBuf,
    config: OcflConfig,
}

impl OcflObjectSessionFactory {
    /// Open (creating if necessary) a storage root.
    pub fn open(root: impl Into<PathBuf>, config: OcflConfig) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        let namaste = root.join(ROOT_NAMASTE);
        if !namaste.exists() {
            fs::write(&namaste, ROOT_NAMASTE_CONTENT)?;
        }

        Ok(Self { root, config })
    }

    /// The storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open a session for the object identified by `object_id`.
    pub fn new_session(&self, object_id: &str) -> Result<OcflObjectSession> {
        let object_root = self.object_root(object_id);
        let inventory = load_inventory(&object_root)?;

        Ok(OcflObjectSession {
            object_id: object_id.to_string(),
            object_root,
            config: self.config.clone(),
            inventory,
            staged: BTreeMap::new(),
            deletes: BTreeSet::new(),
            delete_object: false,
            version_created: None,
        })
    }

    /// Release the factory. Sessions flush on commit, so this is a
    /// synchronization point only.
    pub fn close(&self) {}

    /// Object path under the storage root: sha256 hashed n-tuple
    /// (`abc/def/012/<full-hex>`).
    fn object_root(&self, object_id: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(object_id.as_bytes()));
        self.root
            .join(&digest[0..3])
            .join(&digest[3..6])
            .join(&digest[6..9])
            .join(&digest)
    }
}

/// Content read back from a committed version.
#[derive(Debug, Clone)]
pub struct ResourceContent {
    pub headers: ResourceHeaders,
    pub content: Option<Vec<u8>>,
}

/// A committed version a resource appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub num: VersionNum,
    pub created: DateTime<Utc>,
}

#[derive(Debug)]
struct StagedResource {
    headers: Vec<u8>,
    content: Option<Vec<u8>>,
}

/// A staged-write session against one OCFL object.
#[derive(Debug)]
pub struct OcflObjectSession {
    object_id: String,
    object_root: PathBuf,
    config: OcflConfig,
    inventory: Option<Inventory>,
    /// slug -> staged bytes
    staged: BTreeMap<String, StagedResource>,
    /// slugs removed in the next version
    deletes: BTreeSet<String>,
    delete_object: bool,
    version_created: Option<DateTime<Utc>>,
}

impl OcflObjectSession {
    /// The id of the object this session addresses.
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Set the creation timestamp recorded for the next committed version.
    pub fn version_creation_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.version_created = Some(timestamp);
    }

    /// True if the head version of the object contains the resource.
    pub fn contains_resource(&self, resource_id: &str) -> bool {
        let Ok(slug) = self.resource_slug(resource_id) else {
            return false;
        };
        let headers_path = self.headers_logical_path(&slug);
        self.inventory
            .as_ref()
            .and_then(|inv| inv.head_version())
            .is_some_and(|version| version.has_path(&headers_path))
    }

    /// Stage a resource write for the next version.
    pub fn write_resource(
        &mut self,
        headers: &ResourceHeaders,
        content: Option<Vec<u8>>,
    ) -> Result<()> {
        let slug = self.resource_slug(&headers.id)?;
        let headers_bytes = serde_json::to_vec_pretty(headers)?;

        self.deletes.remove(&slug);
        self.staged.insert(
            slug,
            StagedResource {
                headers: headers_bytes,
                content,
            },
        );
        Ok(())
    }

    /// Stage a resource delete. Deleting the object's root resource deletes
    /// the whole object at commit.
    pub fn delete_resource(&mut self, resource_id: &str) -> Result<()> {
        let slug = self.resource_slug(resource_id)?;
        if slug == "root" {
            self.delete_object = true;
            self.staged.clear();
            self.deletes.clear();
        } else {
            self.staged.remove(&slug);
            self.deletes.insert(slug);
        }
        Ok(())
    }

    /// Commit staged changes as a new version (or delete the object).
    pub fn commit(&mut self) -> Result<()> {
        if self.delete_object {
            if self.object_root.exists() {
                debug!(object_id = %self.object_id, "deleting OCFL object");
                fs::remove_dir_all(&self.object_root)?;
            }
            self.inventory = None;
            self.reset();
            return Ok(());
        }

        if self.staged.is_empty() && self.deletes.is_empty() {
            return Ok(());
        }

        let created = self.version_created.unwrap_or_else(Utc::now);
        let mut inventory = self.inventory.take().unwrap_or_else(|| {
            Inventory::new(&self.object_id, self.config.digest_algorithm.as_str())
        });

        let version_name = VersionNum(inventory.head_num() + 1).to_string();

        // Next version state: previous state minus touched slugs
        let mut version = VersionRecord {
            created,
            message: None,
            user: VersionUser {
                name: self.config.user_name.clone(),
                address: Some(self.config.user_address.clone()),
            },
            state: inventory
                .head_version()
                .map(|v| v.state.clone())
                .unwrap_or_default(),
        };

        for slug in self.staged.keys().chain(self.deletes.iter()) {
            version.remove_path(&self.headers_logical_path(slug));
            version.remove_path(&self.content_logical_path(slug));
        }

        for (slug, staged) in &self.staged {
            let mut files: Vec<(String, &[u8])> =
                vec![(self.headers_logical_path(slug), staged.headers.as_slice())];
            if let Some(content) = &staged.content {
                files.push((self.content_logical_path(slug), content.as_slice()));
            }

            for (logical_path, bytes) in files {
                let digest = self.config.digest_algorithm.hex_digest(bytes);

                if !inventory.manifest.contains_key(&digest) {
                    let physical =
                        format!("{version_name}/{CONTENT_DIRECTORY}/{logical_path}");
                    let target = join_logical(&self.object_root, &physical);
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&target, bytes)?;
                    inventory.manifest.insert(digest.clone(), vec![physical]);
                }

                let entry = version.state.entry(digest).or_default();
                entry.push(logical_path);
                entry.sort();
                entry.dedup();
            }
        }

        inventory
            .versions
            .insert(version_name.clone(), version);
        inventory.head = version_name.clone();

        self.write_object_files(&inventory, &version_name)?;

        self.inventory = Some(inventory);
        self.reset();
        Ok(())
    }

    /// Discard all staged changes.
    pub fn abort(&mut self) {
        self.reset();
    }

    /// Versions (ascending) in which the resource changed. Versions that
    /// merely carry the resource's files forward unchanged are not part of
    /// its history.
    pub fn list_versions(&self, resource_id: &str) -> Result<Vec<VersionInfo>> {
        let slug = self.resource_slug(resource_id)?;
        let headers_path = self.headers_logical_path(&slug);
        let content_path = self.content_logical_path(&slug);

        let Some(inventory) = &self.inventory else {
            return Ok(Vec::new());
        };

        let mut result = Vec::new();
        let mut previous: Option<(String, Option<String>)> = None;

        for num in inventory.version_nums() {
            let Some(version) = inventory.version(num) else {
                continue;
            };
            match version.digest_for_path(&headers_path) {
                Some(headers_digest) => {
                    let current = (
                        headers_digest.to_string(),
                        version.digest_for_path(&content_path).map(String::from),
                    );
                    if previous.as_ref() != Some(&current) {
                        result.push(VersionInfo {
                            num,
                            created: version.created,
                        });
                    }
                    previous = Some(current);
                }
                None => previous = None,
            }
        }

        Ok(result)
    }

    /// Read a resource's headers and content at a specific version.
    pub fn read_content(&self, resource_id: &str, num: VersionNum) -> Result<ResourceContent> {
        let slug = self.resource_slug(resource_id)?;
        let inventory = self
            .inventory
            .as_ref()
            .ok_or_else(|| OcflError::not_found(format!("object {}", self.object_id)))?;
        let version = inventory
            .version(num)
            .ok_or_else(|| OcflError::not_found(format!("version {num} of {}", self.object_id)))?;

        let headers_path = self.headers_logical_path(&slug);
        let headers_digest = version.digest_for_path(&headers_path).ok_or_else(|| {
            OcflError::not_found(format!("resource {resource_id} in version {num}"))
        })?;
        let headers_bytes = self.read_manifest_entry(inventory, headers_digest)?;
        let headers: ResourceHeaders = serde_json::from_slice(&headers_bytes)?;

        let content_path = self.content_logical_path(&slug);
        let content = match version.digest_for_path(&content_path) {
            Some(digest) => Some(self.read_manifest_entry(inventory, digest)?),
            None => None,
        };

        Ok(ResourceContent { headers, content })
    }

    fn read_manifest_entry(&self, inventory: &Inventory, digest: &str) -> Result<Vec<u8>> {
        let physical = inventory.content_path(digest).ok_or_else(|| {
            OcflError::corrupt_inventory(format!("digest {digest} missing from manifest"))
        })?;
        Ok(fs::read(join_logical(&self.object_root, physical))?)
    }

    fn write_object_files(&self, inventory: &Inventory, version_name: &str) -> Result<()> {
        fs::create_dir_all(&self.object_root)?;

        let namaste = self.object_root.join(OBJECT_NAMASTE);
        if !namaste.exists() {
            fs::write(&namaste, OBJECT_NAMASTE_CONTENT)?;
        }

        let mut inventory_bytes = serde_json::to_vec_pretty(inventory)?;
        inventory_bytes.push(b'\n');

        let sidecar_name = format!(
            "{INVENTORY_FILE}.{}",
            self.config.digest_algorithm.as_str()
        );
        let sidecar_content = format!(
            "{}  {INVENTORY_FILE}\n",
            self.config.digest_algorithm.hex_digest(&inventory_bytes)
        );

        fs::write(self.object_root.join(INVENTORY_FILE), &inventory_bytes)?;
        fs::write(self.object_root.join(&sidecar_name), &sidecar_content)?;

        // OCFL keeps a copy of the inventory in each version directory
        let version_dir = self.object_root.join(version_name);
        fs::create_dir_all(&version_dir)?;
        fs::write(version_dir.join(INVENTORY_FILE), &inventory_bytes)?;
        fs::write(version_dir.join(&sidecar_name), &sidecar_content)?;

        Ok(())
    }

    fn reset(&mut self) {
        self.staged.clear();
        self.deletes.clear();
        self.delete_object = false;
        self.version_created = None;
    }

    /// Map a resource id to its slug within the object.
    fn resource_slug(&self, resource_id: &str) -> Result<String> {
        if resource_id == self.object_id {
            Ok("root".to_string())
        } else if resource_id.strip_suffix(METADATA_SUFFIX) == Some(self.object_id.as_str()) {
            Ok("description".to_string())
        } else if resource_id.strip_suffix(ACL_SUFFIX) == Some(self.object_id.as_str()) {
            Ok("acl".to_string())
        } else {
            Err(OcflError::validation(format!(
                "resource {resource_id} does not belong to object {}",
                self.object_id
            )))
        }
    }

    fn headers_logical_path(&self, slug: &str) -> String {
        sanitize_logical(&format!(".fcrepo/{slug}.json"), self.config.windows_mode)
    }

    fn content_logical_path(&self, slug: &str) -> String {
        sanitize_logical(slug, self.config.windows_mode)
    }
}

/// Resolve a `/`-separated logical or content path against a directory.
fn join_logical(base: &Path, path: &str) -> PathBuf {
    let mut result = base.to_path_buf();
    for segment in path.split('/') {
        result.push(segment);
    }
    result
}

/// Percent-encode characters that are illegal in Windows file names when
/// windows mode is forced.
fn sanitize_logical(path: &str, windows_mode: bool) -> String {
    if !windows_mode {
        return path.to_string();
    }
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '<' | '>' | ':' | '"' | '\\' | '|' | '?' | '*' => {
                out.push_str(&format!("%{:02X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

fn load_inventory(object_root: &Path) -> Result<Option<Inventory>> {
    let path = object_root.join(INVENTORY_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(&path)?;
    let inventory: Inventory = serde_json::from_slice(&bytes)
        .map_err(|e| OcflError::corrupt_inventory(format!("{}: {e}", path.display())))?;
    Ok(Some(inventory))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn factory(root: &Path) -> OcflObjectSessionFactory {
        OcflObjectSessionFactory::open(root, OcflConfig::default()).unwrap()
    }

    fn ts(sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 10, 15, 5, 35, sec).unwrap()
    }

    fn container_headers(id: &str) -> ResourceHeaders {
        ResourceHeaders::new(id, "info:fedora", "http://www.w3.org/ns/ldp#BasicContainer")
            .with_object_root(true)
            .with_last_modified_date(Some(ts(26)))
    }

    #[test]
    fn commit_creates_object_with_one_version() {
        let tmp = tempfile::tempdir().unwrap();
        let factory = factory(tmp.path());

        let id = "info:fedora/obj";
        let mut session = factory.new_session(id).unwrap();
        assert!(!session.contains_resource(id));

        session.version_creation_timestamp(ts(26));
        session
            .write_resource(&container_headers(id), Some(b"<a> <b> <c> .\n".to_vec()))
            .unwrap();
        session.commit().unwrap();

        // A fresh session sees the committed state
        let session = factory.new_session(id).unwrap();
        assert!(session.contains_resource(id));

        let versions = session.list_versions(id).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].num, VersionNum(1));
        assert_eq!(versions[0].created, ts(26));

        let content = session.read_content(id, VersionNum(1)).unwrap();
        assert_eq!(content.headers.id, id);
        assert_eq!(content.content.as_deref(), Some(b"<a> <b> <c> .\n".as_slice()));

        // Storage root namaste exists
        assert!(tmp.path().join("0=ocfl_1.0").exists());
    }

    #[test]
    fn successive_commits_grow_versions() {
        let tmp = tempfile::tempdir().unwrap();
        let factory = factory(tmp.path());
        let id = "info:fedora/versioned";

        let mut session = factory.new_session(id).unwrap();
        for (n, sec) in [(1u32, 26u32), (2, 27), (3, 28)] {
            session.version_creation_timestamp(ts(sec));
            session
                .write_resource(
                    &container_headers(id).with_last_modified_date(Some(ts(sec))),
                    Some(format!("version {n}\n").into_bytes()),
                )
                .unwrap();
            session.commit().unwrap();
        }

        let versions = session.list_versions(id).unwrap();
        assert_eq!(versions.len(), 3);
        assert_eq!(
            versions.iter().map(|v| v.created).collect::<Vec<_>>(),
            vec![ts(26), ts(27), ts(28)]
        );

        let v2 = session.read_content(id, VersionNum(2)).unwrap();
        assert_eq!(v2.content.as_deref(), Some(b"version 2\n".as_slice()));
    }

    #[test]
    fn description_and_acl_share_the_object() {
        let tmp = tempfile::tempdir().unwrap();
        let factory = factory(tmp.path());
        let id = "info:fedora/bin";
        let desc_id = format!("{id}/fcr:metadata");
        let acl_id = format!("{id}/fcr:acl");

        let mut session = factory.new_session(id).unwrap();
        session.version_creation_timestamp(ts(26));
        session
            .write_resource(
                &ResourceHeaders::new(id, "info:fedora", "http://www.w3.org/ns/ldp#NonRDFSource")
                    .with_object_root(true),
                Some(b"payload".to_vec()),
            )
            .unwrap();
        session
            .write_resource(
                &ResourceHeaders::new(
                    &desc_id,
                    id,
                    "http://fedora.info/definitions/v4/repository#NonRdfSourceDescription",
                ),
                Some(b"<a> <b> \"d\" .\n".to_vec()),
            )
            .unwrap();
        session
            .write_resource(
                &ResourceHeaders::new(&acl_id, id, "http://fedora.info/definitions/v4/webac#Acl"),
                Some(b"<a> <b> \"acl\" .\n".to_vec()),
            )
            .unwrap();
        session.commit().unwrap();

        let session = factory.new_session(id).unwrap();
        assert!(session.contains_resource(id));
        assert!(session.contains_resource(&desc_id));
        assert!(session.contains_resource(&acl_id));

        let desc = session.read_content(&desc_id, VersionNum(1)).unwrap();
        assert_eq!(desc.headers.parent, id);
    }

    #[test]
    fn foreign_resource_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let factory = factory(tmp.path());

        let mut session = factory.new_session("info:fedora/a").unwrap();
        let headers = container_headers("info:fedora/other");
        assert!(session.write_resource(&headers, None).is_err());
    }

    #[test]
    fn abort_discards_staged_writes() {
        let tmp = tempfile::tempdir().unwrap();
        let factory = factory(tmp.path());
        let id = "info:fedora/aborted";

        let mut session = factory.new_session(id).unwrap();
        session
            .write_resource(&container_headers(id), Some(b"x".to_vec()))
            .unwrap();
        session.abort();
        session.commit().unwrap();

        let session = factory.new_session(id).unwrap();
        assert!(!session.contains_resource(id));
    }

    #[test]
    fn delete_root_removes_object() {
        let tmp = tempfile::tempdir().unwrap();
        let factory = factory(tmp.path());
        let id = "info:fedora/doomed";

        let mut session = factory.new_session(id).unwrap();
        session
            .write_resource(&container_headers(id), Some(b"x".to_vec()))
            .unwrap();
        session.commit().unwrap();

        let mut session = factory.new_session(id).unwrap();
        assert!(session.contains_resource(id));
        session.delete_resource(id).unwrap();
        session.commit().unwrap();

        let session = factory.new_session(id).unwrap();
        assert!(!session.contains_resource(id));
        assert!(session.list_versions(id).unwrap().is_empty());
    }

    #[test]
    fn identical_content_is_deduplicated() {
        let tmp = tempfile::tempdir().unwrap();
        let factory = factory(tmp.path());
        let id = "info:fedora/dedup";

        let mut session = factory.new_session(id).unwrap();
        session.version_creation_timestamp(ts(26));
        session
            .write_resource(&container_headers(id), Some(b"same bytes".to_vec()))
            .unwrap();
        session.commit().unwrap();

        session.version_creation_timestamp(ts(27));
        session
            .write_resource(
                &container_headers(id).with_last_modified_date(Some(ts(27))),
                Some(b"same bytes".to_vec()),
            )
            .unwrap();
        session.commit().unwrap();

        let session = factory.new_session(id).unwrap();
        let v1 = session.read_content(id, VersionNum(1)).unwrap();
        let v2 = session.read_content(id, VersionNum(2)).unwrap();
        assert_eq!(v1.content, v2.content);

        // The payload bytes exist once on disk (manifest dedup)
        let inventory = load_inventory(&factory.object_root(id)).unwrap().unwrap();
        let payload_entries = inventory
            .manifest
            .values()
            .filter(|paths| paths.iter().any(|p| p.ends_with("/root")))
            .count();
        assert_eq!(payload_entries, 1);
    }

    #[test]
    fn digest_algorithms() {
        assert_eq!(
            DigestAlgorithm::Sha256.hex_digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(DigestAlgorithm::from_str("sha512"), Some(DigestAlgorithm::Sha512));
        assert_eq!(DigestAlgorithm::from_str("md5"), None);
    }

    #[test]
    fn windows_mode_encodes_reserved_characters() {
        assert_eq!(sanitize_logical("a:b", true), "a%3Ab");
        assert_eq!(sanitize_logical("a:b", false), "a:b");
        assert_eq!(sanitize_logical("plain/path.json", true), "plain/path.json");
    }
}
