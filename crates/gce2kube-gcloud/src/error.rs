//! gcloud wrapper error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcloudError {
    #[error("gcloud not found at '{}'. Please install the Google Cloud SDK", .0.display())]
    GcloudNotFound(PathBuf),

    #[error("gcloud command failed ({status}): {command}\n{stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A resource path or self-link without a usable final segment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourcePathError {
    #[error("resource path is empty")]
    Empty,

    #[error("resource path '{0}' ends with '/'")]
    TrailingSlash(String),
}

pub type Result<T> = std::result::Result<T, GcloudError>;
