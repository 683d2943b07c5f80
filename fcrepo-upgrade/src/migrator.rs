//! Resource migrator
//!
//! The central algorithm: given one [`ResourceInfo`], reconstruct the
//! resource's version history from the export tree, synthesize resource
//! headers, write one OCFL version per memento (plus the live state when it
//! diverges), migrate any attached ACL, and enumerate the resource's direct
//! children, descending through ghost path segments.
//!
//! All writes happen inside an OCFL session. On any failure the session is
//! aborted and the partially-written object is deleted before the error
//! propagates, so a failed resource never leaves output behind.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use fcrepo_graph::{Graph, RdfFormat};
use fcrepo_ocfl::{InteractionModel, OcflObjectSession, OcflObjectSessionFactory, ResourceHeaders};
use fcrepo_vocab::{ebucore, fedora, premis, rdf};
use md5::{Digest, Md5};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{Result, UpgradeError};
use crate::rdf_util;
use crate::resource::{decode_segment, ResourceInfo, ResourceKind};

/// The internal identifier prefix of the target repository
pub const INFO_FEDORA: &str = "info:fedora";

const BINARY_EXT: &str = ".binary";
const EXTERNAL_EXT: &str = ".external";
const HEADERS_EXT: &str = ".headers";

const FCR: &str = "fcr%3A";
const FCR_VERSIONS: &str = "fcr%3Aversions";
const FCR_METADATA: &str = "fcr%3Ametadata";
const FCR_ACL: &str = "fcr%3Aacl";

const FCR_METADATA_ID: &str = "fcr:metadata";
const FCR_ACL_ID: &str = "fcr:acl";

/// Memento timestamps are `yyyyMMddHHmmss` in UTC
const MEMENTO_FORMAT: &str = "%Y%m%d%H%M%S";

/// How an externally-stored binary is reached by the target repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalHandling {
    Redirect,
    Proxy,
}

impl ExternalHandling {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalHandling::Redirect => "redirect",
            ExternalHandling::Proxy => "proxy",
        }
    }
}

/// An external binary's location and handling, parsed from the sidecar
/// headers JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalReference {
    pub location: String,
    pub handling: ExternalHandling,
}

/// Migrates resources into OCFL objects.
pub struct ResourceMigrator {
    session_factory: Arc<OcflObjectSessionFactory>,
    src_rdf_format: RdfFormat,
    src_rdf_ext: String,
    base_uri: String,
}

impl ResourceMigrator {
    /// Create a migrator from the run configuration and a session factory.
    pub fn new(config: &Config, session_factory: Arc<OcflObjectSessionFactory>) -> Self {
        Self {
            session_factory,
            src_rdf_format: config.src_rdf_lang,
            src_rdf_ext: config.src_rdf_ext(),
            base_uri: strip_trailing_slash(&config.base_uri),
        }
    }

    /// Migrate a resource and return its direct children, if it has any.
    pub fn migrate(&self, info: &ResourceInfo) -> Result<Vec<ResourceInfo>> {
        info!("Migrating {}", info.full_id);
        debug!("Resource info: {:?}", info);

        let result = match info.kind {
            ResourceKind::Binary => self.migrate_binary(info).map(|_| Vec::new()),
            ResourceKind::ExternalBinary => self.migrate_external_binary(info).map(|_| Vec::new()),
            ResourceKind::Container => self.migrate_container(info),
        };

        match result {
            Ok(children) => {
                info!("Resource upgraded: {}", info.full_id);
                Ok(children)
            }
            Err(e @ UpgradeError::UnsupportedResource(_)) => Err(e),
            Err(e) => {
                info!("Failed to migrate resource {}. Rolling back...", info.full_id);
                self.delete_object(&info.full_id);
                Err(e)
            }
        }
    }

    /// Release the OCFL session factory.
    pub fn close(&self) {
        self.session_factory.close();
    }

    // =========================================================================
    // Containers
    // =========================================================================

    fn migrate_container(&self, info: &ResourceInfo) -> Result<Vec<ResourceInfo>> {
        let container_dir = info.inner_directory();

        let mut last_version_update: Option<DateTime<Utc>> = None;

        if self.has_versions(container_dir) {
            for version in self.identify_versions(container_dir)? {
                info!("Migrating {}/fcr:versions/{}", info.full_id, version);
                let rdf = self.read_rdf(
                    &container_dir
                        .join(FCR_VERSIONS)
                        .join(self.rdf_file(&version)),
                )?;
                last_version_update = rdf_util::get_date_value(fedora::LAST_MODIFIED_DATE, &rdf)?;
                let memento_instant = parse_memento(&version)?;

                self.migrate_container_version(info, container_dir, &rdf, memento_instant)?;
            }
        }

        let rdf = self.read_rdf(&info.outer_directory().join(self.rdf_file(&info.name_encoded)))?;
        let current_update = rdf_util::get_date_value(fedora::LAST_MODIFIED_DATE, &rdf)?
            .ok_or_else(|| {
                UpgradeError::missing_field(&info.full_id, "fedora:lastModified")
            })?;

        // only migrate the live state if it differs from the most recent memento
        if last_version_update != Some(current_update) {
            self.migrate_container_version(info, container_dir, &rdf, current_update)?;
        }

        self.list_all_children(&info.full_id, &info.full_id, container_dir)
    }

    fn migrate_container_version(
        &self,
        info: &ResourceInfo,
        container_dir: &Path,
        rdf: &Graph,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let interaction_model = self.identify_interaction_model(&info.full_id, rdf)?;
        let headers = self.create_container_headers(info, interaction_model, rdf)?;
        let rdf_bytes = self.write_rdf(rdf);

        self.do_in_session(&info.full_id, move |session| {
            let is_first = !session.contains_resource(&info.full_id);

            session.version_creation_timestamp(timestamp);
            session.write_resource(&headers, Some(rdf_bytes))?;

            if is_first && self.has_acl(container_dir) {
                self.migrate_acl(&info.full_id, container_dir, session)?;
            }

            session.commit()?;
            Ok(())
        })
    }

    // =========================================================================
    // Binaries
    // =========================================================================

    fn migrate_binary(&self, info: &ResourceInfo) -> Result<()> {
        let binary_dir = info.inner_directory();

        let mut last_version_update: Option<DateTime<Utc>> = None;

        if self.has_versions(binary_dir) {
            for version in self.identify_versions(binary_dir)? {
                info!("Migrating {}/fcr:versions/{}", info.full_id, version);
                let rdf = self.read_rdf(
                    &binary_dir
                        .join(FCR_METADATA)
                        .join(FCR_VERSIONS)
                        .join(self.rdf_file(&version)),
                )?;
                last_version_update = rdf_util::get_date_value(fedora::LAST_MODIFIED_DATE, &rdf)?;
                let memento_instant = parse_memento(&version)?;

                self.migrate_binary_version(
                    info,
                    binary_dir,
                    &binary_dir.join(FCR_VERSIONS).join(binary_file(&version)),
                    &rdf,
                    memento_instant,
                )?;
            }
        }

        let rdf = self.read_rdf(&binary_dir.join(self.rdf_file(FCR_METADATA)))?;
        let current_update = rdf_util::get_date_value(fedora::LAST_MODIFIED_DATE, &rdf)?
            .ok_or_else(|| {
                UpgradeError::missing_field(&info.full_id, "fedora:lastModified")
            })?;

        // only migrate the live state if it differs from the most recent memento
        if last_version_update != Some(current_update) {
            self.migrate_binary_version(
                info,
                binary_dir,
                &info.outer_directory().join(binary_file(&info.name_encoded)),
                &rdf,
                current_update,
            )?;
        }

        Ok(())
    }

    fn migrate_binary_version(
        &self,
        info: &ResourceInfo,
        binary_dir: &Path,
        binary_file: &Path,
        rdf: &Graph,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let headers = self.create_binary_headers(info, rdf)?;

        let desc_id = join_id(&info.full_id, FCR_METADATA_ID);
        let desc_headers = self.create_binary_desc_headers(&info.full_id, &desc_id, rdf)?;

        let content = fs::read(binary_file)?;

        self.write_binary(
            &info.full_id,
            binary_dir,
            headers,
            Some(content),
            desc_headers,
            rdf,
            timestamp,
        )
    }

    fn migrate_external_binary(&self, info: &ResourceInfo) -> Result<()> {
        let rdf = self.read_rdf(&info.inner_directory().join(self.rdf_file(FCR_METADATA)))?;

        let external = self.parse_external_reference(info)?;
        let headers = self
            .create_binary_headers(info, &rdf)?
            .with_external_url(external.location)
            .with_external_handling(external.handling.as_str());

        let desc_id = join_id(&info.full_id, FCR_METADATA_ID);
        let desc_headers = self.create_binary_desc_headers(&info.full_id, &desc_id, &rdf)?;

        let timestamp = headers.last_modified_date.ok_or_else(|| {
            UpgradeError::missing_field(&info.full_id, "fedora:lastModified")
        })?;

        self.write_binary(
            &info.full_id,
            info.inner_directory(),
            headers,
            None,
            desc_headers,
            &rdf,
            timestamp,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn write_binary(
        &self,
        full_id: &str,
        binary_dir: &Path,
        content_headers: ResourceHeaders,
        content: Option<Vec<u8>>,
        desc_headers: ResourceHeaders,
        rdf: &Graph,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let rdf_bytes = self.write_rdf(rdf);

        self.do_in_session(full_id, move |session| {
            let is_first = !session.contains_resource(full_id);

            session.version_creation_timestamp(timestamp);
            session.write_resource(&content_headers, content)?;
            session.write_resource(&desc_headers, Some(rdf_bytes))?;

            if is_first && self.has_acl(binary_dir) {
                self.migrate_acl(full_id, binary_dir, session)?;
            }

            session.commit()?;
            Ok(())
        })
    }

    // =========================================================================
    // ACLs
    // =========================================================================

    fn migrate_acl(
        &self,
        parent_id: &str,
        directory: &Path,
        session: &mut OcflObjectSession,
    ) -> Result<()> {
        let full_id = join_id(parent_id, FCR_ACL_ID);
        info!("Migrating {}", full_id);

        let rdf = self.read_rdf(&directory.join(self.rdf_file(FCR_ACL)))?;
        let headers = self.create_acl_headers(parent_id, &full_id, &rdf)?;

        session.write_resource(&headers, Some(self.write_rdf(&rdf)))?;
        Ok(())
    }

    // =========================================================================
    // Rollback
    // =========================================================================

    /// Best-effort removal of the OCFL object for a failed resource.
    fn delete_object(&self, full_id: &str) {
        let result = (|| -> Result<()> {
            let mut session = self.session_factory.new_session(full_id)?;
            if session.contains_resource(full_id) {
                debug!("Deleting resource {} due to failed migration", full_id);
                session.delete_resource(full_id)?;
                session.commit()?;
            }
            Ok(())
        })();

        if let Err(e) = result {
            error!("Failed to delete OCFL object for resource {}: {}", full_id, e);
        }
    }

    // =========================================================================
    // Child enumeration
    // =========================================================================

    /// Lists all of the children of a container. A container can hold ghost
    /// nodes between it and its children; those are navigated down to the
    /// next concrete children, which stay parented to this container.
    fn list_all_children(
        &self,
        root_parent_id: &str,
        current_parent_id: &str,
        container_dir: &Path,
    ) -> Result<Vec<ResourceInfo>> {
        // A childless container has no inner directory in the export
        if !container_dir.is_dir() {
            return Ok(Vec::new());
        }

        let child_map = self.list_direct_children(root_parent_id, current_parent_id, container_dir)?;
        let ghosts = self.list_ghost_nodes(container_dir, &child_map)?;

        let mut children: Vec<ResourceInfo> = child_map.into_values().collect();

        for ghost in ghosts {
            let name = decode_segment(&file_name(&ghost));
            let extended_parent = join_id(current_parent_id, &name);
            children.extend(self.list_all_children(root_parent_id, &extended_parent, &ghost)?);
        }

        Ok(children)
    }

    /// The concrete children directly inside a container directory, keyed by
    /// encoded name.
    fn list_direct_children(
        &self,
        root_parent_id: &str,
        current_parent_id: &str,
        container_dir: &Path,
    ) -> Result<BTreeMap<String, ResourceInfo>> {
        let mut children = BTreeMap::new();

        for entry in fs::read_dir(container_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let filename = entry.file_name().to_string_lossy().into_owned();
            if filename.starts_with(FCR) || filename.ends_with(HEADERS_EXT) {
                continue;
            }

            let Some(stripped) = extract_name(&filename) else {
                continue;
            };
            let decoded = decode_segment(stripped);
            let full_id = join_id(current_parent_id, &decoded);

            let info = if filename.ends_with(BINARY_EXT) {
                ResourceInfo::binary(root_parent_id, full_id, container_dir, stripped)
            } else if filename.ends_with(EXTERNAL_EXT) {
                ResourceInfo::external_binary(root_parent_id, full_id, container_dir, stripped)
            } else if filename.ends_with(&self.src_rdf_ext) {
                ResourceInfo::container(root_parent_id, full_id, container_dir, stripped)
            } else {
                continue;
            };

            children.insert(stripped.to_string(), info);
        }

        Ok(children)
    }

    /// Subdirectories that are not reserved and have no matching concrete
    /// child: ghost path segments.
    fn list_ghost_nodes(
        &self,
        container_dir: &Path,
        children: &BTreeMap<String, ResourceInfo>,
    ) -> Result<Vec<PathBuf>> {
        let mut ghosts = Vec::new();

        for entry in fs::read_dir(container_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(FCR) || children.contains_key(&name) {
                continue;
            }
            ghosts.push(entry.path());
        }

        ghosts.sort();
        Ok(ghosts)
    }

    // =========================================================================
    // Versions
    // =========================================================================

    fn has_versions(&self, container_dir: &Path) -> bool {
        container_dir.join(FCR_VERSIONS).exists()
    }

    /// Memento names under `fcr%3Aversions/`, ascending by instant.
    fn identify_versions(&self, directory: &Path) -> Result<Vec<String>> {
        let mut versions = Vec::new();

        for entry in fs::read_dir(directory.join(FCR_VERSIONS))? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let filename = entry.file_name().to_string_lossy().into_owned();
            if filename.ends_with(HEADERS_EXT) {
                continue;
            }

            let Some(name) = extract_name(&filename) else {
                continue;
            };
            versions.push((parse_memento(name)?, name.to_string()));
        }

        versions.sort();
        Ok(versions.into_iter().map(|(_, name)| name).collect())
    }

    // =========================================================================
    // Header synthesis
    // =========================================================================

    fn identify_interaction_model(&self, full_id: &str, rdf: &Graph) -> Result<InteractionModel> {
        for statement in rdf.with_predicate(rdf::TYPE) {
            if let Some(type_iri) = statement.o.as_iri() {
                if let Some(model) = InteractionModel::from_iri(type_iri) {
                    if model.is_container() {
                        return Ok(model);
                    }
                }
            }
        }
        Err(UpgradeError::source_corrupt(format!(
            "Failed to identify interaction model for resource {full_id}"
        )))
    }

    fn create_common_headers(
        &self,
        parent_id: &str,
        full_id: &str,
        interaction_model: InteractionModel,
        rdf: &Graph,
    ) -> Result<ResourceHeaders> {
        let created = rdf_util::get_date_value(fedora::CREATED_DATE, rdf)?;
        let last_modified = rdf_util::get_date_value(fedora::LAST_MODIFIED_DATE, rdf)?
            .ok_or_else(|| UpgradeError::missing_field(full_id, "fedora:lastModified"))?;

        Ok(
            ResourceHeaders::new(full_id, parent_id, interaction_model.as_iri())
                .with_archival_group(false)
                .with_deleted(false)
                .with_created_by(rdf_util::get_first_value(fedora::CREATED_BY, rdf))
                .with_created_date(Some(created.unwrap_or(last_modified)))
                .with_last_modified_by(rdf_util::get_first_value(fedora::LAST_MODIFIED_BY, rdf))
                .with_last_modified_date(Some(last_modified))
                .with_state_token(calculate_state_token(last_modified)),
        )
    }

    fn create_container_headers(
        &self,
        info: &ResourceInfo,
        interaction_model: InteractionModel,
        rdf: &Graph,
    ) -> Result<ResourceHeaders> {
        Ok(self
            .create_common_headers(&info.parent_id, &info.full_id, interaction_model, rdf)?
            .with_object_root(true))
    }

    fn create_binary_headers(&self, info: &ResourceInfo, rdf: &Graph) -> Result<ResourceHeaders> {
        let size_text = rdf_util::get_first_value(premis::HAS_SIZE, rdf)
            .ok_or_else(|| UpgradeError::missing_field(&info.full_id, "premis:hasSize"))?;
        let content_size = size_text.parse::<u64>().map_err(|e| {
            UpgradeError::source_corrupt(format!(
                "invalid premis:hasSize '{size_text}' on {}: {e}",
                info.full_id
            ))
        })?;

        Ok(self
            .create_common_headers(
                &info.parent_id,
                &info.full_id,
                InteractionModel::NonRdfSource,
                rdf,
            )?
            .with_object_root(true)
            .with_content_size(content_size)
            .with_digests(rdf_util::get_uris(premis::HAS_MESSAGE_DIGEST, rdf))
            .with_filename(rdf_util::get_first_value(ebucore::FILENAME, rdf))
            .with_mime_type(rdf_util::get_first_value(ebucore::HAS_MIME_TYPE, rdf)))
    }

    fn create_binary_desc_headers(
        &self,
        parent_id: &str,
        full_id: &str,
        rdf: &Graph,
    ) -> Result<ResourceHeaders> {
        Ok(self
            .create_common_headers(
                parent_id,
                full_id,
                InteractionModel::NonRdfSourceDescription,
                rdf,
            )?
            .with_object_root(false))
    }

    fn create_acl_headers(
        &self,
        parent_id: &str,
        full_id: &str,
        rdf: &Graph,
    ) -> Result<ResourceHeaders> {
        Ok(self
            .create_common_headers(parent_id, full_id, InteractionModel::Acl, rdf)?
            .with_object_root(false))
    }

    // =========================================================================
    // External binaries
    // =========================================================================

    /// Parse `<name>.external.headers`: a JSON map of header name to values.
    /// A `Location` header means the binary is redirected; otherwise it is
    /// proxied from `Content-Location`.
    fn parse_external_reference(&self, info: &ResourceInfo) -> Result<ExternalReference> {
        let path = info.outer_directory().join(format!(
            "{}{}{}",
            info.name_encoded, EXTERNAL_EXT, HEADERS_EXT
        ));

        let content = fs::read_to_string(&path)?;
        let headers: HashMap<String, Vec<String>> =
            serde_json::from_str(&content).map_err(|e| {
                UpgradeError::source_corrupt(format!("failed to parse {}: {e}", path.display()))
            })?;

        let (handling, values) = match headers.get("Location") {
            Some(values) => (ExternalHandling::Redirect, values),
            None => (
                ExternalHandling::Proxy,
                headers.get("Content-Location").ok_or_else(|| {
                    UpgradeError::source_corrupt(format!(
                        "{} has neither Location nor Content-Location",
                        path.display()
                    ))
                })?,
            ),
        };

        let location = values.first().ok_or_else(|| {
            UpgradeError::source_corrupt(format!("{} has an empty location list", path.display()))
        })?;

        Ok(ExternalReference {
            location: location.clone(),
            handling,
        })
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn do_in_session<F>(&self, full_id: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut OcflObjectSession) -> Result<()>,
    {
        let mut session = self.session_factory.new_session(full_id)?;
        match f(&mut session) {
            Ok(()) => Ok(()),
            Err(e) => {
                session.abort();
                Err(e)
            }
        }
    }

    fn read_rdf(&self, path: &Path) -> Result<Graph> {
        rdf_util::parse_rdf(path, self.src_rdf_format)
    }

    fn write_rdf(&self, rdf: &Graph) -> Vec<u8> {
        rdf_util::write_rdf_translate_ids(rdf, &self.base_uri, INFO_FEDORA)
    }

    fn has_acl(&self, directory: &Path) -> bool {
        directory.join(self.rdf_file(FCR_ACL)).exists()
    }

    fn rdf_file(&self, name: &str) -> String {
        format!("{name}{}", self.src_rdf_ext)
    }
}

fn binary_file(name: &str) -> String {
    format!("{name}{BINARY_EXT}")
}

fn join_id(id: &str, part: &str) -> String {
    format!("{id}/{part}")
}

/// File name without its final extension; `None` when there is no dot.
fn extract_name(filename: &str) -> Option<&str> {
    filename.rfind('.').map(|i| &filename[..i])
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parse_memento(memento: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(memento, MEMENTO_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| UpgradeError::source_corrupt(format!("invalid memento name '{memento}': {e}")))
}

/// `uppercase(md5_hex(lastModified.epochMillis))`
fn calculate_state_token(timestamp: DateTime<Utc>) -> String {
    let millis = timestamp.timestamp_millis().to_string();
    hex::encode(Md5::digest(millis.as_bytes())).to_uppercase()
}

fn strip_trailing_slash(value: &str) -> String {
    value.trim_end_matches('/').to_string()
}
