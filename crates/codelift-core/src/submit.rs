//! Submission orchestrator.
//!
//! Ties the pieces together: validate configuration, package the trainer
//! directory, upload it, and hand the job to the platform.

use crate::archive::{build_archive, ExcludePatterns};
use crate::client::{JobHandle, JobSubmitter, ObjectStore, SubmitRequest};
use crate::config::AppConfig;
use crate::error::SubmitResult;
use crate::storage::StorageUri;
use std::path::Path;

/// Packages `trainer_dir`, uploads the archive to the configured storage
/// location, and submits the training job.
///
/// Configuration problems (malformed storage URI, bad exclude pattern)
/// surface before any archive is built or network call is made. The local
/// archive is removed on both the success and failure paths.
pub fn submit_training_job(
    config: &AppConfig,
    trainer_dir: &Path,
    store: &dyn ObjectStore,
    submitter: &dyn JobSubmitter,
) -> SubmitResult<JobHandle> {
    let storage = StorageUri::parse(&config.platform.storage_uri)?;
    let exclude = ExcludePatterns::compile(&config.exclude_patterns)?;
    let run_id = config.platform.run_id.clone();
    tracing::info!(%run_id, trainer_dir = %trainer_dir.display(), "submitting training job");

    let source_uri = prepare_training_code(trainer_dir, &storage, &run_id, &exclude, store)?;
    tracing::info!(%source_uri, "uploaded training code");

    let variables = config.variables();
    let request = SubmitRequest {
        job_name: config.job_name(),
        image_uri: config.platform.image_uri.clone(),
        execution_role: config.platform.execution_role.clone(),
        source_uri,
        input: config
            .platform
            .input_uri
            .as_ref()
            .map(|input| input.substituted(&variables)),
        args: config.job_args(&variables)?,
    };

    let handle = submitter.submit(&request)?;
    tracing::info!(job_name = %handle.job_name, "training job accepted");
    Ok(handle)
}

/// Builds the run-id-qualified trainer archive and uploads it, returning
/// the remote URI. The archive lives in the system temp directory only for
/// the duration of the upload; deletion is unconditional.
fn prepare_training_code(
    trainer_dir: &Path,
    storage: &StorageUri,
    run_id: &str,
    exclude: &ExcludePatterns,
    store: &dyn ObjectStore,
) -> SubmitResult<String> {
    let archive_path = std::env::temp_dir().join(format!("trainer_{run_id}.tar.gz"));

    let result = (|| {
        build_archive(trainer_dir, &archive_path, exclude)?;
        store.upload(&archive_path, &storage.bucket, &storage.key_prefix)
    })();

    if archive_path.exists() {
        if let Err(e) = std::fs::remove_file(&archive_path) {
            tracing::warn!(path = %archive_path.display(), error = %e, "failed to remove trainer archive");
        }
    }

    result
}
