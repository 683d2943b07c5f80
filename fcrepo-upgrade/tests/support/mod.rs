//! Fixture helpers for building Fedora 5 export trees in temp directories.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fcrepo_ocfl::{OcflConfig, OcflObjectSessionFactory};
use fcrepo_upgrade::{Config, ResourceMigrator};
use std::sync::Arc;

/// The external base URI of the exported repository.
pub const BASE_URI: &str = "http://localhost:8080/rest";

/// Install a test subscriber honoring `RUST_LOG`; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

pub const T1: &str = "2020-10-15T05:35:26Z";
pub const T2: &str = "2020-10-15T05:37:17Z";
pub const T3: &str = "2020-10-15T05:39:47Z";

/// Parse an RFC-3339 timestamp used in fixtures.
pub fn ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .unwrap()
        .with_timezone(&Utc)
}

const PREFIXES: &str = "\
@prefix ldp: <http://www.w3.org/ns/ldp#> .
@prefix fedora: <http://fedora.info/definitions/v4/repository#> .
@prefix premis: <http://www.loc.gov/premis/rdf/v1#> .
@prefix ebucore: <http://www.ebu.ch/metadata/ontologies/ebucore/ebucore#> .
@prefix dcterms: <http://purl.org/dc/terms/> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .\n";

/// Turtle for a basic container resource.
pub fn container_ttl(subject: &str, created: &str, modified: &str) -> String {
    format!(
        "{PREFIXES}
<{subject}> a ldp:RDFSource , ldp:Container , ldp:BasicContainer ;
    fedora:created \"{created}\"^^xsd:dateTime ;
    fedora:createdBy \"fedoraAdmin\" ;
    fedora:lastModified \"{modified}\"^^xsd:dateTime ;
    fedora:lastModifiedBy \"fedoraAdmin\" ;
    dcterms:title \"A container\" .
"
    )
}

/// Turtle for the description of a binary resource.
pub fn binary_ttl(
    subject: &str,
    created: &str,
    modified: &str,
    size: usize,
    digest: &str,
    filename: &str,
) -> String {
    format!(
        "{PREFIXES}
<{subject}> a ldp:NonRDFSource ;
    fedora:created \"{created}\"^^xsd:dateTime ;
    fedora:createdBy \"fedoraAdmin\" ;
    fedora:lastModified \"{modified}\"^^xsd:dateTime ;
    fedora:lastModifiedBy \"fedoraAdmin\" ;
    premis:hasSize \"{size}\"^^xsd:long ;
    premis:hasMessageDigest <{digest}> ;
    ebucore:hasMimeType \"text/plain\" ;
    ebucore:filename \"{filename}\" ;
    dcterms:title \"A binary\" .
"
    )
}

/// Turtle for an ACL resource.
pub fn acl_ttl(subject: &str, created: &str, modified: &str) -> String {
    format!(
        "{PREFIXES}
<{subject}/fcr:acl> fedora:created \"{created}\"^^xsd:dateTime ;
    fedora:createdBy \"fedoraAdmin\" ;
    fedora:lastModified \"{modified}\"^^xsd:dateTime ;
    fedora:lastModifiedBy \"fedoraAdmin\" ;
    dcterms:title \"An acl\" .
"
    )
}

/// An export tree rooted at `input/`, with the repository root at
/// `input/rest.ttl` + `input/rest/`.
pub struct Export {
    pub input: PathBuf,
    pub rest: PathBuf,
}

impl Export {
    /// Create the export skeleton inside `dir`.
    pub fn new(dir: &Path) -> Self {
        let input = dir.join("input");
        let rest = input.join("rest");
        fs::create_dir_all(&rest).unwrap();
        fs::write(
            input.join("rest.ttl"),
            container_ttl(BASE_URI, T1, T1),
        )
        .unwrap();
        Self { input, rest }
    }

    /// Add a container under `outer` (an export directory): writes
    /// `<name>.ttl` and creates the inner directory.
    pub fn add_container(&self, outer: &Path, name: &str, created: &str, modified: &str) -> PathBuf {
        let subject = format!("{BASE_URI}/{name}");
        fs::write(
            outer.join(format!("{name}.ttl")),
            container_ttl(&subject, created, modified),
        )
        .unwrap();
        let inner = outer.join(name);
        fs::create_dir_all(&inner).unwrap();
        inner
    }

    /// Add a binary under `outer`: payload, inner directory, and live
    /// description RDF. Returns the inner directory.
    pub fn add_binary(
        &self,
        outer: &Path,
        encoded_name: &str,
        subject: &str,
        created: &str,
        modified: &str,
        content: &str,
    ) -> PathBuf {
        fs::write(outer.join(format!("{encoded_name}.binary")), content).unwrap();
        let inner = outer.join(encoded_name);
        fs::create_dir_all(&inner).unwrap();
        fs::write(
            inner.join("fcr%3Ametadata.ttl"),
            binary_ttl(
                subject,
                created,
                modified,
                content.len(),
                "urn:sha1:aaa111",
                "file.txt",
            ),
        )
        .unwrap();
        inner
    }

    /// Add an external binary under `outer`: placeholder, sidecar headers
    /// JSON, inner directory, and live description RDF.
    pub fn add_external_binary(
        &self,
        outer: &Path,
        name: &str,
        modified: &str,
        headers_json: &str,
    ) -> PathBuf {
        let subject = format!("{BASE_URI}/{name}");
        fs::write(outer.join(format!("{name}.external")), "").unwrap();
        fs::write(outer.join(format!("{name}.external.headers")), headers_json).unwrap();
        let inner = outer.join(name);
        fs::create_dir_all(&inner).unwrap();
        fs::write(
            inner.join("fcr%3Ametadata.ttl"),
            binary_ttl(&subject, T1, modified, 41, "urn:sha1:eee111", "ext.txt"),
        )
        .unwrap();
        inner
    }

    /// Add an ACL document to a resource's inner directory.
    pub fn add_acl(&self, inner: &Path, subject: &str) {
        fs::write(
            inner.join("fcr%3Aacl.ttl"),
            acl_ttl(subject, T1, T1),
        )
        .unwrap();
    }

    /// Add container mementos: `(memento_name, modified)` pairs.
    pub fn add_container_versions(
        &self,
        inner: &Path,
        subject: &str,
        mementos: &[(&str, &str)],
    ) {
        let versions = inner.join("fcr%3Aversions");
        fs::create_dir_all(&versions).unwrap();
        for (name, modified) in mementos {
            fs::write(
                versions.join(format!("{name}.ttl")),
                container_ttl(subject, T1, modified),
            )
            .unwrap();
        }
    }

    /// Add binary mementos: `(memento_name, modified, content)` triples.
    pub fn add_binary_versions(
        &self,
        inner: &Path,
        subject: &str,
        mementos: &[(&str, &str, &str)],
    ) {
        let payloads = inner.join("fcr%3Aversions");
        let descriptions = inner.join("fcr%3Ametadata").join("fcr%3Aversions");
        fs::create_dir_all(&payloads).unwrap();
        fs::create_dir_all(&descriptions).unwrap();

        for (name, modified, content) in mementos {
            fs::write(payloads.join(format!("{name}.binary")), content).unwrap();
            fs::write(
                descriptions.join(format!("{name}.ttl")),
                binary_ttl(
                    subject,
                    T1,
                    modified,
                    content.len(),
                    "urn:sha1:ver111",
                    "file.txt",
                ),
            )
            .unwrap();
        }
    }
}

/// A migrator plus the session factory needed to read its output back.
pub struct Harness {
    pub migrator: ResourceMigrator,
    pub factory: Arc<OcflObjectSessionFactory>,
    pub config: Config,
}

/// Build a migrator over `input`, writing OCFL output under `output`.
pub fn harness(input: &Path, output: &Path) -> Harness {
    let config = Config::new(input, output, BASE_URI);
    let ocfl_config = OcflConfig {
        digest_algorithm: config.digest_algorithm,
        user_name: config.fedora_user.clone(),
        user_address: config.fedora_user_address.clone(),
        windows_mode: config.force_windows_mode,
    };
    let factory =
        Arc::new(OcflObjectSessionFactory::open(config.ocfl_root(), ocfl_config).unwrap());
    let migrator = ResourceMigrator::new(&config, Arc::clone(&factory));
    Harness {
        migrator,
        factory,
        config,
    }
}
