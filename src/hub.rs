//! Hugging Face Hub integration.
//!
//! Pulls model checkpoints from the Hub so a model pair can be named by
//! repository id instead of local path.
//!
//! # Example
//!
//! ```rust,ignore
//! use cotejar::hub::HubClient;
//!
//! let client = HubClient::new()?;
//! let path = client.pull("org/base-model")?;
//! let params = cotejar::serialization::load_safetensors(path)?;
//! ```
//!
//! # Authentication
//!
//! Set the `HF_TOKEN` environment variable with your Hugging Face token.
//! Anonymous pulls of public repositories work without it.

use std::path::PathBuf;

/// Checkpoint filename pulled by default.
pub const DEFAULT_MODEL_FILE: &str = "model.safetensors";

/// Error type for Hub operations
#[derive(Debug)]
pub enum HubError {
    /// Network or API error
    NetworkError(String),
    /// File not found in repository
    FileNotFound(String),
    /// Invalid repository ID format
    InvalidRepoId(String),
    /// IO error
    IoError(std::io::Error),
}

impl std::fmt::Display for HubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError(e) => write!(f, "Network error: {e}"),
            Self::FileNotFound(file) => write!(f, "File not found: {file}"),
            Self::InvalidRepoId(id) => write!(f, "Invalid repo ID (expected 'org/name'): {id}"),
            Self::IoError(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for HubError {}

impl From<std::io::Error> for HubError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// Result type for Hub operations
pub type Result<T> = std::result::Result<T, HubError>;

/// Hugging Face Hub client for checkpoint pulls
#[derive(Debug)]
pub struct HubClient {
    /// HF API token
    token: Option<String>,
    /// Cache directory for downloaded checkpoints
    cache_dir: PathBuf,
}

impl HubClient {
    /// Create a new Hub client.
    ///
    /// Reads the token from the `HF_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Does not error on a missing token (allows anonymous pulls).
    pub fn new() -> Result<Self> {
        let token = std::env::var("HF_TOKEN").ok();
        Ok(Self {
            token,
            cache_dir: Self::default_cache_dir(),
        })
    }

    /// Create client with explicit token
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            cache_dir: Self::default_cache_dir(),
        }
    }

    /// Set custom cache directory
    #[must_use]
    pub fn with_cache_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_dir = path.into();
        self
    }

    /// Get default cache directory
    pub(crate) fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("huggingface")
            .join("hub")
    }

    /// Check if client has an authentication token
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Parse repository ID (org/name format)
    pub(crate) fn parse_repo_id(repo_id: &str) -> Result<(&str, &str)> {
        let parts: Vec<&str> = repo_id.split('/').collect();
        match parts.as_slice() {
            &[org, name] if !org.is_empty() && !name.is_empty() => Ok((org, name)),
            _ => Err(HubError::InvalidRepoId(repo_id.to_string())),
        }
    }

    /// Pull a model checkpoint from the Hub.
    ///
    /// Downloads [`DEFAULT_MODEL_FILE`] into the local cache and returns
    /// its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails or the repo is not found.
    pub fn pull(&self, repo_id: &str) -> Result<PathBuf> {
        self.pull_file(repo_id, DEFAULT_MODEL_FILE)
    }

    /// Pull a specific file from a Hub repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails or the file is not found.
    pub fn pull_file(&self, repo_id: &str, filename: &str) -> Result<PathBuf> {
        use hf_hub::api::sync::ApiBuilder;

        let (org, name) = Self::parse_repo_id(repo_id)?;

        let mut builder = ApiBuilder::new().with_cache_dir(self.cache_dir.clone());
        if let Some(token) = &self.token {
            builder = builder.with_token(Some(token.clone()));
        }
        let api = builder
            .build()
            .map_err(|e| HubError::NetworkError(e.to_string()))?;

        let repo = api.model(format!("{org}/{name}"));

        let path = repo
            .get(filename)
            .map_err(|e| HubError::FileNotFound(format!("{filename}: {e}")))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repo_id_valid() {
        let (org, name) = HubClient::parse_repo_id("paiml/base-model").expect("valid");
        assert_eq!(org, "paiml");
        assert_eq!(name, "base-model");
    }

    #[test]
    fn test_parse_repo_id_missing_slash() {
        assert!(matches!(
            HubClient::parse_repo_id("no-slash"),
            Err(HubError::InvalidRepoId(_))
        ));
    }

    #[test]
    fn test_parse_repo_id_too_many_parts() {
        assert!(matches!(
            HubClient::parse_repo_id("a/b/c"),
            Err(HubError::InvalidRepoId(_))
        ));
    }

    #[test]
    fn test_parse_repo_id_empty_sides() {
        assert!(HubClient::parse_repo_id("/name").is_err());
        assert!(HubClient::parse_repo_id("org/").is_err());
    }

    #[test]
    fn test_with_token_is_authenticated() {
        let client = HubClient::with_token("hf_test");
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_with_cache_dir() {
        let client = HubClient::with_token("hf_test").with_cache_dir("/tmp/cotejar-cache");
        assert_eq!(client.cache_dir, PathBuf::from("/tmp/cotejar-cache"));
    }

    #[test]
    fn test_default_cache_dir_has_hub_suffix() {
        let dir = HubClient::default_cache_dir();
        assert!(dir.ends_with("huggingface/hub"));
    }

    #[test]
    fn test_error_display() {
        let err = HubError::InvalidRepoId("bad".to_string());
        assert!(err.to_string().contains("org/name"));
        let err = HubError::FileNotFound("model.safetensors".to_string());
        assert!(err.to_string().contains("model.safetensors"));
    }
}
