//! OCFL object storage for migrated Fedora resources
//!
//! This crate provides the storage side of the Fedora 5 → Fedora 6 migration:
//! an [Oxford Common File Layout](https://ocfl.io/) storage root in which
//! each repository resource becomes a versioned, content-addressed object.
//!
//! The unit of work is the [`OcflObjectSession`]: writes against one object
//! are staged in the session and land atomically as a single new OCFL
//! version on `commit()`. A session addresses the object's root resource and
//! its subordinate resources (binary description, ACL), which share the
//! object.
//!
//! ```no_run
//! use fcrepo_ocfl::{OcflConfig, OcflObjectSessionFactory, ResourceHeaders};
//!
//! # fn run() -> fcrepo_ocfl::Result<()> {
//! let factory = OcflObjectSessionFactory::open("data/ocfl-root", OcflConfig::default())?;
//!
//! let mut session = factory.new_session("info:fedora/object")?;
//! let headers = ResourceHeaders::new(
//!     "info:fedora/object",
//!     "info:fedora",
//!     "http://www.w3.org/ns/ldp#BasicContainer",
//! );
//! session.write_resource(&headers, Some(b"<s> <p> <o> .\n".to_vec()))?;
//! session.commit()?;
//! # Ok(())
//! # }
//! ```

mod error;
mod headers;
mod interaction;
mod inventory;
mod session;

pub use error::{OcflError, Result};
pub use headers::ResourceHeaders;
pub use interaction::InteractionModel;
pub use inventory::{Inventory, VersionNum, VersionRecord, VersionUser};
pub use session::{
    DigestAlgorithm, OcflConfig, OcflObjectSession, OcflObjectSessionFactory, ResourceContent,
    VersionInfo,
};
