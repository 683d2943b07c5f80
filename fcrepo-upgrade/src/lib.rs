//! Fedora 5 export → Fedora 6 OCFL migration engine
//!
//! Transforms a filesystem export of a Fedora 5.x repository into an OCFL
//! storage root as used by Fedora 6.x. Every exported resource becomes an
//! OCFL object with one version per source memento, plus a version for the
//! live state when it diverges from the latest memento.
//!
//! The pipeline, leaves first:
//!
//! - [`rdf_util`] — RDF parsing, server-managed triple filtering, identifier
//!   translation, typed predicate extractors
//! - [`resource`] — descriptors for resources awaiting migration
//! - [`migrator`] — the per-resource migration algorithm, including
//!   ghost-node child enumeration
//! - [`task`] / [`manager`] — self-submitting migration tasks on a bounded
//!   worker pool
//! - [`upgrade`] — the run driver
//!
//! ```no_run
//! use fcrepo_upgrade::{Config, UpgradeManager};
//!
//! # async fn run() -> fcrepo_upgrade::Result<()> {
//! let config = Config::new("export", "output", "http://localhost:8080/rest");
//! UpgradeManager::new(config)?.start().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod migrator;
pub mod rdf_util;
pub mod resource;
pub mod task;
pub mod upgrade;

pub use config::{Config, FedoraVersion};
pub use error::{Result, UpgradeError};
pub use manager::{MigrationTaskManager, Migrator};
pub use migrator::{ExternalHandling, ExternalReference, ResourceMigrator, INFO_FEDORA};
pub use resource::{ResourceInfo, ResourceKind};
pub use task::MigrateResourceTask;
pub use upgrade::UpgradeManager;
