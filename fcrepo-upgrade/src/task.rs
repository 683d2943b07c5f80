//! A unit of migration work
//!
//! A task migrates exactly one resource and feeds every child descriptor the
//! migrator returns back into the task manager. Failures never escape a
//! task: unsupported resources are logged and skipped, everything else is
//! logged with the descriptor so the run can continue.

use std::sync::Arc;

use tracing::{error, warn};

use crate::error::UpgradeError;
use crate::manager::{MigrationTaskManager, Migrator};
use crate::resource::ResourceInfo;

/// A task for migrating one resource.
pub struct MigrateResourceTask {
    manager: MigrationTaskManager,
    migrator: Arc<dyn Migrator>,
    info: ResourceInfo,
}

impl MigrateResourceTask {
    pub fn new(
        manager: MigrationTaskManager,
        migrator: Arc<dyn Migrator>,
        info: ResourceInfo,
    ) -> Self {
        Self {
            manager,
            migrator,
            info,
        }
    }

    /// Run the migration and submit the resulting children.
    pub fn run(self) {
        let children = match self.migrator.migrate(&self.info) {
            Ok(children) => children,
            Err(UpgradeError::UnsupportedResource(message)) => {
                // Thrown for resources the migration does not handle
                error!("{message}");
                Vec::new()
            }
            Err(e) => {
                error!("Failed to process {:?}: {e}", self.info);
                Vec::new()
            }
        };

        for child in children {
            let child_id = child.full_id.clone();
            if self.manager.submit(child).is_err() {
                warn!("Failed to queue {} for migration", child_id);
            }
        }
    }
}
