//! Object-storage location parsing.

use crate::error::{SubmitError, SubmitResult};
use std::fmt;

/// A parsed `scheme://bucket/key-prefix` storage location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageUri {
    pub scheme: String,
    pub bucket: String,
    pub key_prefix: String,
}

impl StorageUri {
    /// Parses a storage URI, rejecting anything without a scheme prefix, a
    /// bucket segment, and a non-empty key prefix after the bucket. These
    /// are configuration errors, not transient faults.
    pub fn parse(uri: &str) -> SubmitResult<Self> {
        let (scheme, rest) = uri.split_once("://").ok_or_else(|| {
            SubmitError::Config(format!("storage URI `{uri}` is missing a scheme prefix"))
        })?;
        if scheme.is_empty() {
            return Err(SubmitError::Config(format!(
                "storage URI `{uri}` is missing a scheme prefix"
            )));
        }

        let (bucket, key_prefix) = rest.split_once('/').ok_or_else(|| {
            SubmitError::Config(format!(
                "storage URI `{uri}` has no key prefix after the bucket"
            ))
        })?;
        let key_prefix = key_prefix.trim_matches('/');
        if bucket.is_empty() || key_prefix.is_empty() {
            return Err(SubmitError::Config(format!(
                "storage URI `{uri}` has no key prefix after the bucket"
            )));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            bucket: bucket.to_string(),
            key_prefix: key_prefix.to_string(),
        })
    }
}

impl fmt::Display for StorageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.scheme, self.bucket, self.key_prefix)
    }
}
