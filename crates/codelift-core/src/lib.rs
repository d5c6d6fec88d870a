//! Codelift Core
//!
//! Packages a local training-code directory and submits it as a remote
//! training job:
//! - Building filtered tar.gz archives of trainer code (`archive`)
//! - `${name}` variable substitution over configuration trees (`substitute`)
//! - YAML-driven job configuration (`AppConfig`)
//! - Object-storage and job-submission seams (`ObjectStore`, `JobSubmitter`)
//! - The submission orchestrator (`submit_training_job`)

pub mod archive;
pub mod client;
pub mod config;
pub mod error;
pub mod storage;
pub mod submit;
pub mod substitute;

pub use archive::{build_archive, ExcludePatterns};
pub use client::{JobHandle, JobSubmitter, ObjectStore, SubmitRequest};
pub use config::{AppConfig, InputLocation, PlatformConfig};
pub use error::{SubmitError, SubmitResult};
pub use storage::StorageUri;
pub use submit::submit_training_job;
pub use substitute::{substitute, substitute_str};
