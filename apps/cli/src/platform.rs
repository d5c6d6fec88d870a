//! HTTP client for the training platform gateway.
//!
//! One client implements both seams: archives are streamed with
//! `PUT {endpoint}/storage/{bucket}/{key}` and jobs are started with
//! `POST {endpoint}/jobs`. Retries are the gateway's responsibility,
//! not ours.

use codelift_core::{
    JobHandle, JobSubmitter, ObjectStore, SubmitError, SubmitRequest, SubmitResult,
};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    handle: String,
}

pub struct PlatformClient {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl PlatformClient {
    pub fn new(endpoint: &str) -> SubmitResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| SubmitError::Submit(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { endpoint: endpoint.trim_end_matches('/').to_string(), client })
    }
}

impl ObjectStore for PlatformClient {
    fn upload(&self, local_file: &Path, bucket: &str, key_prefix: &str) -> SubmitResult<String> {
        let file_name = local_file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                SubmitError::Upload(format!("invalid archive path: {}", local_file.display()))
            })?;
        let url = format!("{}/storage/{bucket}/{key_prefix}/{file_name}", self.endpoint);

        let file = File::open(local_file)?;
        let response = self
            .client
            .put(&url)
            .body(file)
            .send()
            .map_err(|e| SubmitError::Upload(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SubmitError::Upload(format!("{url}: HTTP {}", response.status())));
        }

        let body: UploadResponse = response
            .json()
            .map_err(|e| SubmitError::Upload(format!("invalid upload response: {e}")))?;
        Ok(body.uri)
    }
}

impl JobSubmitter for PlatformClient {
    fn submit(&self, request: &SubmitRequest) -> SubmitResult<JobHandle> {
        let url = format!("{}/jobs", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .map_err(|e| SubmitError::Submit(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SubmitError::Submit(format!("{url}: HTTP {}", response.status())));
        }

        let body: SubmitResponse = response
            .json()
            .map_err(|e| SubmitError::Submit(format!("invalid submit response: {e}")))?;
        Ok(JobHandle { job_name: request.job_name.clone(), handle: body.handle })
    }
}
