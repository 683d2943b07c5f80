//! Migration task manager
//!
//! Coordinates resource migration across a bounded worker pool. Tasks are
//! blocking filesystem work, so they run on the blocking thread pool with a
//! semaphore of `threads` permits capping concurrency. An atomic
//! outstanding-count plus a [`Notify`] provides completion signalling;
//! workers enqueue their own children, so termination is reached when the
//! count drains to zero.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{Notify, Semaphore};
use tracing::error;

use crate::error::{Result, UpgradeError};
use crate::migrator::ResourceMigrator;
use crate::resource::ResourceInfo;
use crate::task::MigrateResourceTask;

/// How long `shutdown` waits for in-flight tasks before forcing termination.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(60);

/// The object responsible for performing the migration of one resource.
///
/// The task manager only needs this seam; production code uses
/// [`ResourceMigrator`], tests can use a stub.
pub trait Migrator: Send + Sync + 'static {
    /// Migrate a resource, returning its direct children.
    fn migrate(&self, info: &ResourceInfo) -> Result<Vec<ResourceInfo>>;

    /// Release held resources (e.g. the OCFL session factory).
    fn close(&self) {}
}

impl Migrator for ResourceMigrator {
    fn migrate(&self, info: &ResourceInfo) -> Result<Vec<ResourceInfo>> {
        ResourceMigrator::migrate(self, info)
    }

    fn close(&self) {
        ResourceMigrator::close(self)
    }
}

/// Task manager for coordinating resource migration tasks.
///
/// Cheap to clone; all clones share the same pool and counters. Must be
/// created within a Tokio runtime.
#[derive(Clone)]
pub struct MigrationTaskManager {
    inner: Arc<Inner>,
}

struct Inner {
    migrator: Arc<dyn Migrator>,
    runtime: Handle,
    semaphore: Arc<Semaphore>,
    outstanding: AtomicU64,
    idle_notify: Notify,
    accepting: AtomicBool,
}

impl MigrationTaskManager {
    /// Create a manager running at most `threads` tasks concurrently.
    pub fn new(threads: usize, migrator: Arc<dyn Migrator>) -> Self {
        Self {
            inner: Arc::new(Inner {
                migrator,
                runtime: Handle::current(),
                semaphore: Arc::new(Semaphore::new(threads.max(1))),
                outstanding: AtomicU64::new(0),
                idle_notify: Notify::new(),
                accepting: AtomicBool::new(true),
            }),
        }
    }

    /// Submit a resource to be migrated. Returns immediately; the resource
    /// is migrated asynchronously. Fails with [`UpgradeError::Cancelled`]
    /// once `shutdown` has been called.
    pub fn submit(&self, info: ResourceInfo) -> Result<()> {
        if !self.inner.accepting.load(Ordering::Acquire) {
            return Err(UpgradeError::Cancelled);
        }

        self.inner.outstanding.fetch_add(1, Ordering::AcqRel);

        let manager = self.clone();
        let inner = Arc::clone(&self.inner);

        self.inner.runtime.spawn(async move {
            // A closed semaphore means shutdown was forced while this task
            // was still queued; it is dropped without running.
            if let Ok(_permit) = inner.semaphore.clone().acquire_owned().await {
                let task = MigrateResourceTask::new(manager, Arc::clone(&inner.migrator), info);
                let _ = tokio::task::spawn_blocking(move || task.run()).await;
            }

            inner.outstanding.fetch_sub(1, Ordering::AcqRel);
            inner.idle_notify.notify_waiters();
        });

        Ok(())
    }

    /// Wait until all migration tasks are complete. This does not prevent
    /// additional tasks from being submitted; it simply waits until the
    /// queue is empty. Legal to call repeatedly.
    pub async fn await_completion(&self) {
        loop {
            // Avoid missed-wakeup races: create the notification future
            // *before* checking the condition, then await it if still busy.
            let notified = self.inner.idle_notify.notified();
            if self.inner.outstanding.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Stop accepting work, drain in-flight tasks (bounded by a grace
    /// period), and close the migrator.
    pub async fn shutdown(&self) {
        self.inner.accepting.store(false, Ordering::Release);

        if tokio::time::timeout(SHUTDOWN_GRACE, self.await_completion())
            .await
            .is_err()
        {
            error!(
                "Failed to shut down the migration worker pool cleanly after {}s of waiting",
                SHUTDOWN_GRACE.as_secs()
            );
            // Cancel tasks still waiting for a permit
            self.inner.semaphore.close();
        }

        self.inner.migrator.close();
    }

    /// Number of submitted tasks that have not finished yet.
    pub fn outstanding(&self) -> u64 {
        self.inner.outstanding.load(Ordering::Acquire)
    }
}
