//! Campaign replication engine
//!
//! Extracts a hierarchical snapshot of a source campaign, sanitizes it into
//! an account-agnostic template, and recreates the hierarchy in destination
//! accounts: natively via the platform's deep-copy endpoint when it works,
//! manually object-by-object when it does not.

pub mod extract;
pub mod models;
pub mod orchestrator;
pub mod recreate;
pub mod sanitize;
pub mod snapshot;
pub mod strategy;

pub use extract::SnapshotExtractor;
pub use models::{
    CloneResult, CloneStatus, DestinationAccount, RecreationOutcome, Stage, StepFailure,
};
pub use orchestrator::CloneOrchestrator;
pub use recreate::RecreationPipeline;
pub use sanitize::{is_account_scoped, sanitize, sanitize_value};
pub use snapshot::{AdSetSnapshot, AdSnapshot, CampaignSnapshot, CreativeSnapshot, LinkData};
pub use strategy::{CloneStrategy, ManualCloneStrategy, NativeCopyStrategy};
