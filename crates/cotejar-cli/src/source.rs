//! Model source resolution.
//!
//! A model argument is either a local SafeTensors checkpoint path or a
//! Hugging Face Hub "org/name" repository id. Hub sources are pulled
//! into the local cache before loading.

use crate::error::{CliError, Result};
use colored::Colorize;
use cotejar::hub::HubClient;
use cotejar::params::ParamSet;
use cotejar::serialization::load_safetensors;
use std::path::{Path, PathBuf};

/// Where a model comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ModelSource {
    /// Local checkpoint file
    File(PathBuf),
    /// Hub repository id ("org/name")
    Hub(String),
}

impl ModelSource {
    /// Classify a model argument.
    ///
    /// Existing paths and anything ending in `.safetensors` are treated
    /// as files; otherwise an "org/name" string is a Hub repo id.
    pub(crate) fn parse(arg: &str) -> Result<Self> {
        let path = Path::new(arg);
        if path.exists() || arg.ends_with(".safetensors") {
            return Ok(Self::File(path.to_path_buf()));
        }

        let parts: Vec<&str> = arg.split('/').collect();
        if let [org, name] = parts.as_slice() {
            if !org.is_empty() && !name.is_empty() {
                return Ok(Self::Hub(arg.to_string()));
            }
        }

        Err(CliError::InvalidFormat(format!(
            "{arg} is neither a checkpoint path nor an org/name repo id"
        )))
    }

    /// Resolve the source to a local checkpoint path.
    pub(crate) fn resolve(&self) -> Result<PathBuf> {
        match self {
            Self::File(path) => {
                if !path.exists() {
                    return Err(CliError::FileNotFound(path.clone()));
                }
                if !path.is_file() {
                    return Err(CliError::InvalidFormat(format!(
                        "not a file: {}",
                        path.display()
                    )));
                }
                Ok(path.clone())
            }
            Self::Hub(repo_id) => {
                let client = HubClient::new()?;
                Ok(client.pull(repo_id)?)
            }
        }
    }
}

/// Load a model's parameter set, printing a progress line unless JSON
/// output was requested.
pub(crate) fn load_model(arg: &str, role: &str, json: bool) -> Result<ParamSet> {
    let source = ModelSource::parse(arg)?;
    if !json {
        println!("Loading {role} model: {}", arg.cyan());
    }
    let path = source.resolve()?;
    Ok(load_safetensors(path)?)
}
