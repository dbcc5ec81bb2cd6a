//! `arch-copier-core`: archive a file under a timestamped name and keep the
//! archive directory within its retention policy.
//!
//! - [`inventory`] lists the archive's files oldest-first.
//! - [`retention`] deletes the oldest files until a [`Policy`] holds.
//! - [`disk`] reads filesystem capacity through the [`SpaceProbe`] seam.
//! - [`archive`] ties it together for a single copy.

pub mod archive;
pub mod disk;
pub mod error;
pub mod format;
pub mod inventory;
pub mod policy;
pub mod retention;

pub use archive::{ArchiveOutcome, ArchiveRequest};
pub use disk::{DiskUsage, SpaceProbe, StatvfsProbe};
pub use error::CoreError;
pub use inventory::Entry;
pub use policy::Policy;
pub use retention::EnforcementReport;
