//! Seams for the external platform services.
//!
//! The orchestrator never talks to the network itself; it is handed an
//! object store and a job submitter. Keeping these as injected trait
//! objects (rather than an ambient session singleton) lets tests swap in
//! doubles and keeps invocations free of hidden shared state.

use crate::config::InputLocation;
use crate::error::SubmitResult;
use serde::Serialize;
use serde_yaml::Mapping;
use std::path::Path;

/// Uploads local files to object storage.
pub trait ObjectStore {
    /// Uploads `local_file` under `key_prefix` in `bucket` and returns the
    /// resulting remote URI.
    fn upload(&self, local_file: &Path, bucket: &str, key_prefix: &str) -> SubmitResult<String>;
}

/// Hands training jobs to the external platform.
pub trait JobSubmitter {
    /// Submits a job and returns once the platform has accepted it.
    /// Fire-and-forget: never waits for job completion.
    fn submit(&self, request: &SubmitRequest) -> SubmitResult<JobHandle>;
}

/// Everything the platform needs to start a training job.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequest {
    pub job_name: String,
    pub image_uri: String,
    pub execution_role: String,
    /// Remote URI of the uploaded trainer archive.
    pub source_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<InputLocation>,
    /// Substituted job parameters; hyperparameter values are already
    /// string-encoded.
    pub args: Mapping,
}

/// Opaque reference to an accepted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_name: String,
    pub handle: String,
}
