//! The Fedora 5 → Fedora 6 upgrade manager
//!
//! Validates the requested migration path, bootstraps the OCFL session
//! factory, seeds the task manager with the export root, and waits for the
//! parallel walk to drain.

use std::sync::Arc;

use fcrepo_ocfl::{OcflConfig, OcflObjectSessionFactory};
use tracing::info;

use crate::config::{Config, FedoraVersion};
use crate::error::{Result, UpgradeError};
use crate::manager::MigrationTaskManager;
use crate::migrator::{ResourceMigrator, INFO_FEDORA};
use crate::resource::ResourceInfo;

/// Name of the export root directory within the input tree.
const ROOT_NAME: &str = "rest";

/// Drives one complete upgrade run.
pub struct UpgradeManager {
    config: Config,
}

impl UpgradeManager {
    /// Create an upgrade manager for a validated configuration.
    ///
    /// Only the 5 → 6 path is supported; anything else (including the
    /// 4.7 → 5 path handled by a different tool) is rejected.
    pub fn new(config: Config) -> Result<Self> {
        if config.source_version != FedoraVersion::V5
            || config.target_version != FedoraVersion::V6
        {
            return Err(UpgradeError::invalid_config(format!(
                "The migration path from {} to {} is not supported",
                config.source_version, config.target_version
            )));
        }
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this run was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the migration to completion.
    ///
    /// Submits the root resource, waits for the walk to drain, and shuts the
    /// worker pool down. Per-resource failures are logged and skipped; only
    /// bootstrap failures surface here.
    pub async fn start(&self) -> Result<()> {
        info!(
            "Migrating {} to {}",
            self.config.input_dir.display(),
            self.config.ocfl_root().display()
        );

        let ocfl_config = OcflConfig {
            digest_algorithm: self.config.digest_algorithm,
            user_name: self.config.fedora_user.clone(),
            user_address: self.config.fedora_user_address.clone(),
            windows_mode: self.config.force_windows_mode,
        };
        let session_factory = Arc::new(OcflObjectSessionFactory::open(
            self.config.ocfl_root(),
            ocfl_config,
        )?);

        let migrator = Arc::new(ResourceMigrator::new(&self.config, session_factory));
        let task_manager = MigrationTaskManager::new(self.config.threads, migrator);

        let root = ResourceInfo::container(
            INFO_FEDORA,
            INFO_FEDORA,
            self.config.input_dir.clone(),
            ROOT_NAME,
        );

        task_manager.submit(root)?;
        task_manager.await_completion().await;
        task_manager.shutdown().await;

        info!("Migration complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_paths() {
        let tmp = tempfile::tempdir().unwrap();

        let f47 = Config::new(tmp.path(), "/out", "http://localhost:8080/rest")
            .with_source_version(FedoraVersion::V4_7)
            .with_target_version(FedoraVersion::V5);
        assert!(matches!(
            UpgradeManager::new(f47),
            Err(UpgradeError::InvalidConfig(_))
        ));

        let inverted = Config::new(tmp.path(), "/out", "http://localhost:8080/rest")
            .with_source_version(FedoraVersion::V6)
            .with_target_version(FedoraVersion::V5);
        assert!(UpgradeManager::new(inverted).is_err());
    }

    #[test]
    fn accepts_five_to_six() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::new(tmp.path(), "/out", "http://localhost:8080/rest");
        assert!(UpgradeManager::new(config).is_ok());
    }
}
