//! Migration run configuration

use std::path::{Path, PathBuf};
use std::thread;

use fcrepo_graph::RdfFormat;
use fcrepo_ocfl::DigestAlgorithm;

use crate::error::{Result, UpgradeError};

/// Default user to attribute OCFL versions to
pub const DEFAULT_USER: &str = "fedoraAdmin";

/// Default address of the user OCFL versions are attributed to
pub const DEFAULT_USER_ADDRESS: &str = "info:fedora/fedoraAdmin";

/// A Fedora release family relevant to migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FedoraVersion {
    /// 4.7.x (handled by a separate tool, rejected here)
    V4_7,
    /// 5.x
    V5,
    /// 6.x
    V6,
}

impl FedoraVersion {
    /// Human-readable version string.
    pub fn as_str(&self) -> &'static str {
        match self {
            FedoraVersion::V4_7 => "4.7.5",
            FedoraVersion::V5 => "5+",
            FedoraVersion::V6 => "6+",
        }
    }
}

impl std::fmt::Display for FedoraVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration of an upgrade run.
///
/// Constructed with the required options and refined with `with_*` setters;
/// [`Config::validate`] is called by the upgrade manager before any work
/// starts.
#[derive(Debug, Clone)]
pub struct Config {
    pub source_version: FedoraVersion,
    pub target_version: FedoraVersion,
    /// Root of the source export
    pub input_dir: PathBuf,
    /// Root of the OCFL storage
    pub output_dir: PathBuf,
    /// External URI prefix rewritten to the internal prefix in RDF,
    /// e.g. `http://localhost:8080/rest`
    pub base_uri: String,
    /// Syntax of the source RDF
    pub src_rdf_lang: RdfFormat,
    /// Worker-pool size
    pub threads: usize,
    /// OCFL manifest digest algorithm
    pub digest_algorithm: DigestAlgorithm,
    /// User to attribute OCFL versions to
    pub fedora_user: String,
    /// Address of the user OCFL versions are attributed to
    pub fedora_user_address: String,
    /// Test-only: force Windows-safe OCFL path semantics
    pub force_windows_mode: bool,
}

impl Config {
    /// Create a 5 → 6 migration configuration with defaults for everything
    /// beyond the required options.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        base_uri: impl Into<String>,
    ) -> Self {
        Self {
            source_version: FedoraVersion::V5,
            target_version: FedoraVersion::V6,
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            base_uri: base_uri.into(),
            src_rdf_lang: RdfFormat::Turtle,
            threads: default_threads(),
            digest_algorithm: DigestAlgorithm::Sha512,
            fedora_user: DEFAULT_USER.to_string(),
            fedora_user_address: DEFAULT_USER_ADDRESS.to_string(),
            force_windows_mode: false,
        }
    }

    pub fn with_source_version(mut self, version: FedoraVersion) -> Self {
        self.source_version = version;
        self
    }

    pub fn with_target_version(mut self, version: FedoraVersion) -> Self {
        self.target_version = version;
        self
    }

    pub fn with_src_rdf_lang(mut self, lang: RdfFormat) -> Self {
        self.src_rdf_lang = lang;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_digest_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.digest_algorithm = algorithm;
        self
    }

    pub fn with_fedora_user(mut self, user: impl Into<String>) -> Self {
        self.fedora_user = user.into();
        self
    }

    pub fn with_fedora_user_address(mut self, address: impl Into<String>) -> Self {
        self.fedora_user_address = address.into();
        self
    }

    pub fn with_force_windows_mode(mut self, force: bool) -> Self {
        self.force_windows_mode = force;
        self
    }

    /// Check option constraints that cannot be enforced by construction.
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(UpgradeError::invalid_config("threads must be > 0"));
        }
        if self.base_uri.is_empty() {
            return Err(UpgradeError::invalid_config("baseUri must be specified"));
        }
        if !self.input_dir.is_dir() {
            return Err(UpgradeError::invalid_config(format!(
                "input directory does not exist: {}",
                self.input_dir.display()
            )));
        }
        Ok(())
    }

    /// The OCFL storage root: `<outputDir>/data/ocfl-root`.
    pub fn ocfl_root(&self) -> PathBuf {
        self.output_dir.join("data").join("ocfl-root")
    }

    /// The source RDF file extension, with leading dot (e.g. `.ttl`).
    pub fn src_rdf_ext(&self) -> String {
        format!(".{}", self.src_rdf_lang.extension())
    }

    /// The input directory as a path.
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }
}

fn default_threads() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::new("/in", "/out", "http://localhost:8080/rest");
        assert_eq!(config.source_version, FedoraVersion::V5);
        assert_eq!(config.target_version, FedoraVersion::V6);
        assert_eq!(config.src_rdf_lang, RdfFormat::Turtle);
        assert_eq!(config.digest_algorithm, DigestAlgorithm::Sha512);
        assert_eq!(config.fedora_user, "fedoraAdmin");
        assert_eq!(config.fedora_user_address, "info:fedora/fedoraAdmin");
        assert!(config.threads > 0);
        assert!(!config.force_windows_mode);
        assert_eq!(config.src_rdf_ext(), ".ttl");
    }

    #[test]
    fn validate_rejects_zero_threads() {
        let tmp = tempfile::tempdir().unwrap();
        let config =
            Config::new(tmp.path(), "/out", "http://localhost:8080/rest").with_threads(0);
        assert!(matches!(
            config.validate(),
            Err(UpgradeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_rejects_missing_input() {
        let config = Config::new("/does/not/exist", "/out", "http://localhost:8080/rest");
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_good_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::new(tmp.path(), "/out", "http://localhost:8080/rest");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn ocfl_root_layout() {
        let config = Config::new("/in", "/out", "http://localhost:8080/rest");
        assert_eq!(config.ocfl_root(), PathBuf::from("/out/data/ocfl-root"));
    }
}
