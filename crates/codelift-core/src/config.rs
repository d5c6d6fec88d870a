//! YAML-driven submission configuration.
//!
//! The configuration file has a `platform` block describing the remote
//! training platform, an open-ended `job` mapping forwarded to the
//! submission API, and an optional list of archive exclude patterns:
//!
//! ```yaml
//! platform:
//!   endpoint: https://gateway.example.com
//!   storage_uri: s3://bucket/code
//!   execution_role: arn:aws:iam::123456789012:role/train
//!   image_uri: 123456789012.dkr.ecr.us-east-1.amazonaws.com/train:latest
//!   input_uri: s3://bucket/data
//! job:
//!   base_job_name: demo
//!   hyperparameters: { epochs: 3, lr: 0.001 }
//! exclude_patterns: ["__pycache__", "*.pyc"]
//! ```

use crate::error::{SubmitError, SubmitResult};
use crate::storage::StorageUri;
use crate::substitute::{substitute, substitute_str};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Timestamp-derived run identifier, unique per submission. Generated at
/// configuration construction time and read-only thereafter.
fn default_run_id() -> String {
    chrono::Local::now().format("%Y%m%dT%H%M%S%6f").to_string()
}

/// Training input location: a single URI or a channel-name to URI map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputLocation {
    Uri(String),
    Channels(BTreeMap<String, String>),
}

impl InputLocation {
    /// Returns a copy with `${name}` tokens replaced in every URI.
    pub fn substituted(&self, variables: &BTreeMap<String, String>) -> Self {
        match self {
            Self::Uri(uri) => Self::Uri(substitute_str(uri, variables)),
            Self::Channels(channels) => Self::Channels(
                channels
                    .iter()
                    .map(|(name, uri)| (name.clone(), substitute_str(uri, variables)))
                    .collect(),
            ),
        }
    }
}

/// Connection settings for the remote training platform.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Platform gateway endpoint.
    pub endpoint: String,
    /// Where trainer archives are uploaded, `scheme://bucket/key-prefix`.
    pub storage_uri: String,
    /// Execution role or credential identifier passed to the platform.
    pub execution_role: String,
    /// Training image reference.
    pub image_uri: String,
    /// Optional training input data location.
    #[serde(default)]
    pub input_uri: Option<InputLocation>,
    /// Unique per-submission token; generated unless pinned in the file.
    #[serde(default = "default_run_id")]
    pub run_id: String,
}

/// Top-level submission configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub platform: PlatformConfig,
    /// Free-form job parameters forwarded to the submission API.
    #[serde(default)]
    pub job: Mapping,
    /// Archive exclude patterns. Empty means nothing is excluded.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl AppConfig {
    /// Loads and validates a configuration file, failing fast on missing
    /// or malformed fields before any archive or network work happens.
    pub fn from_yaml(path: &Path) -> SubmitResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&raw)
            .map_err(|e| SubmitError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> SubmitResult<()> {
        let required = [
            ("platform.endpoint", &self.platform.endpoint),
            ("platform.storage_uri", &self.platform.storage_uri),
            ("platform.execution_role", &self.platform.execution_role),
            ("platform.image_uri", &self.platform.image_uri),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SubmitError::Config(format!("{name} must not be empty")));
            }
        }
        StorageUri::parse(&self.platform.storage_uri)?;
        Ok(())
    }

    /// The fixed substitution variable set: `run_id` only.
    pub fn variables(&self) -> BTreeMap<String, String> {
        BTreeMap::from([("run_id".to_string(), self.platform.run_id.clone())])
    }

    /// Job parameters after variable substitution, with every value under
    /// `hyperparameters` JSON-encoded to a string (the submission API only
    /// accepts string-valued parameters).
    pub fn job_args(&self, variables: &BTreeMap<String, String>) -> SubmitResult<Mapping> {
        let Value::Mapping(mut args) = substitute(&Value::Mapping(self.job.clone()), variables)
        else {
            return Ok(Mapping::new());
        };

        let key = Value::String("hyperparameters".to_string());
        if let Some(hyperparameters) = args.get_mut(&key) {
            *hyperparameters = Value::Mapping(encode_hyperparameters(hyperparameters)?);
        }
        Ok(args)
    }

    /// Job name: the configured base name (default `job`) plus the run id.
    pub fn job_name(&self) -> String {
        let base = self
            .job
            .get(&Value::String("base_job_name".to_string()))
            .and_then(Value::as_str)
            .unwrap_or("job");
        format!("{base}-{}", self.platform.run_id)
    }
}

/// JSON-encodes every hyperparameter value into a string-to-string map.
fn encode_hyperparameters(value: &Value) -> SubmitResult<Mapping> {
    let Value::Mapping(map) = value else {
        return Err(SubmitError::Config(
            "job.hyperparameters must be a mapping".to_string(),
        ));
    };

    let mut encoded = Mapping::new();
    for (key, val) in map {
        let key = match key {
            Value::String(s) => s.clone(),
            other => serde_json::to_string(other)?,
        };
        encoded.insert(
            Value::String(key),
            Value::String(serde_json::to_string(val)?),
        );
    }
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID: &str = "\
platform:
  endpoint: https://gateway.example.com
  storage_uri: s3://bucket/code
  execution_role: arn:aws:iam::123456789012:role/train
  image_uri: registry.example.com/train:latest
  input_uri: s3://bucket/data/${run_id}
job:
  base_job_name: demo
  instance_type: ml.m5.xlarge
  checkpoint_uri: s3://bucket/checkpoints/${run_id}
  hyperparameters:
    epochs: 3
    lr: 0.001
    optimizer: adam
exclude_patterns: ['__pycache__', '*.pyc']
";

    fn write_config(contents: &str) -> (TempDir, AppConfig) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, contents).unwrap();
        let config = AppConfig::from_yaml(&path).unwrap();
        (temp, config)
    }

    #[test]
    fn test_from_yaml_happy_path() {
        let (_temp, config) = write_config(VALID);
        assert_eq!(config.platform.endpoint, "https://gateway.example.com");
        assert_eq!(config.exclude_patterns, vec!["__pycache__", "*.pyc"]);
        assert_eq!(
            config.platform.input_uri,
            Some(InputLocation::Uri("s3://bucket/data/${run_id}".to_string()))
        );
        assert!(!config.platform.run_id.is_empty());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "platform:\n  endpoint: https://x\n").unwrap();
        let err = AppConfig::from_yaml(&path).unwrap_err();
        assert!(matches!(err, SubmitError::Config(_)));
    }

    #[test]
    fn test_malformed_storage_uri_fails_at_load() {
        let bad = VALID.replace("s3://bucket/code", "bucket-without-scheme");
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, bad).unwrap();
        let err = AppConfig::from_yaml(&path).unwrap_err();
        assert!(err.to_string().contains("scheme"));
    }

    #[test]
    fn test_job_args_encodes_hyperparameters_and_substitutes() {
        let (_temp, config) = write_config(VALID);
        let mut variables = config.variables();
        variables.insert("run_id".to_string(), "R123".to_string());

        let args = config.job_args(&variables).unwrap();
        assert_eq!(
            args.get(&Value::String("checkpoint_uri".to_string())),
            Some(&Value::String("s3://bucket/checkpoints/R123".to_string()))
        );

        let Some(Value::Mapping(hp)) = args.get(&Value::String("hyperparameters".to_string()))
        else {
            panic!("hyperparameters missing");
        };
        assert_eq!(
            hp.get(&Value::String("epochs".to_string())),
            Some(&Value::String("3".to_string()))
        );
        assert_eq!(
            hp.get(&Value::String("lr".to_string())),
            Some(&Value::String("0.001".to_string()))
        );
        assert_eq!(
            hp.get(&Value::String("optimizer".to_string())),
            Some(&Value::String("\"adam\"".to_string()))
        );
    }

    #[test]
    fn test_job_name_uses_base_and_falls_back() {
        let (_temp, config) = write_config(VALID);
        assert_eq!(config.job_name(), format!("demo-{}", config.platform.run_id));

        let bare = VALID.replace("  base_job_name: demo\n", "");
        let (_temp2, config) = write_config(&bare);
        assert_eq!(config.job_name(), format!("job-{}", config.platform.run_id));
    }

    #[test]
    fn test_run_ids_distinguish_submissions() {
        let (_t1, first) = write_config(VALID);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let (_t2, second) = write_config(VALID);
        assert_ne!(first.platform.run_id, second.platform.run_id);
    }

    #[test]
    fn test_input_channels_are_substituted() {
        let channels = InputLocation::Channels(BTreeMap::from([
            ("train".to_string(), "s3://bucket/${run_id}/train".to_string()),
            ("eval".to_string(), "s3://bucket/eval".to_string()),
        ]));
        let variables = BTreeMap::from([("run_id".to_string(), "R".to_string())]);
        let InputLocation::Channels(out) = channels.substituted(&variables) else {
            panic!("expected channels");
        };
        assert_eq!(out["train"], "s3://bucket/R/train");
        assert_eq!(out["eval"], "s3://bucket/eval");
    }
}
