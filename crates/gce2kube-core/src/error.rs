use std::path::PathBuf;
use thiserror::Error;

/// Failures while pulling pod specs out of instance template metadata
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("user-data is not a valid cloud-config document: {0}")]
    UserData(#[source] serde_yaml::Error),

    #[error("{path}: not a pod spec: {source}")]
    PodSpec {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{path}: pod spec has no metadata.name")]
    MissingName { path: PathBuf },

    #[error("{path}: unsupported write_files encoding '{encoding}'")]
    UnsupportedEncoding { path: PathBuf, encoding: String },

    #[error("{path}: invalid base64 content: {source}")]
    Base64 {
        path: PathBuf,
        #[source]
        source: base64::DecodeError,
    },

    #[error("{path}: invalid gzip content: {source}")]
    Gzip {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: content is not UTF-8: {source}")]
    Utf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl ExtractError {
    /// Path of the embedded file the error refers to, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ExtractError::UserData(_) => None,
            ExtractError::PodSpec { path, .. }
            | ExtractError::MissingName { path }
            | ExtractError::UnsupportedEncoding { path, .. }
            | ExtractError::Base64 { path, .. }
            | ExtractError::Gzip { path, .. }
            | ExtractError::Utf8 { path, .. } => Some(path),
        }
    }
}

/// Failures of a migration run
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error(transparent)]
    Gcloud(#[from] gce2kube_gcloud::GcloudError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("failed to serialize manifest: {0}")]
    Emit(#[from] serde_yaml::Error),

    #[error("failed to write manifest: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MigrateError>;
