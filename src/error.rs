//! Error types for fetching, decoding and storing pet images.
//!
//! None of these are fatal. The gallery state machine turns a
//! [`NetworkError`] into an `Error` state, and the save workflow turns a
//! [`SaveError`] into a `Failure` outcome. Both go through
//! [`NetworkError::user_message`] / [`SaveError::user_message`] so every
//! failure path ends in a message the UI can show.

use thiserror::Error;

use crate::app_data::messages;

/// Failure to complete a remote read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Host unreachable or name resolution failed
    #[error("no network connectivity")]
    NoConnectivity,

    /// The request did not complete within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Anything else: bad status, malformed body, transport failure
    #[error("{0}")]
    Other(String),
}

impl NetworkError {
    /// Classify a reqwest error into the network taxonomy
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            NetworkError::Timeout
        } else if e.is_connect() {
            NetworkError::NoConnectivity
        } else if let Some(status) = e.status() {
            NetworkError::Other(format!("HTTP {}", status))
        } else {
            NetworkError::Other(e.to_string())
        }
    }

    /// Message published in `GalleryState::Error` for a failed refresh
    pub fn user_message(&self) -> String {
        let m = messages();
        match self {
            NetworkError::NoConnectivity => m.no_connectivity.clone(),
            NetworkError::Timeout => m.timeout.clone(),
            NetworkError::Other(detail) => format!("{}{}", m.load_failed_prefix, detail),
        }
    }
}

/// Downloaded bytes are not a decodable image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to decode image: {0}")]
pub struct DecodeError(pub String);

/// Failure to write into picture storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("out of memory")]
    OutOfMemory,

    #[error("{0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => StorageError::PermissionDenied,
            std::io::ErrorKind::OutOfMemory => StorageError::OutOfMemory,
            _ => StorageError::Io(e.to_string()),
        }
    }
}

/// Everything that can end a save attempt early
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SaveError {
    /// Message carried by `SaveOutcome::Failure`
    pub fn user_message(&self) -> String {
        let m = messages();
        match self {
            SaveError::Storage(StorageError::PermissionDenied) => m.permission_required.clone(),
            SaveError::Storage(StorageError::OutOfMemory) => m.out_of_memory.clone(),
            SaveError::Decode(_) => m.decode_failed.clone(),
            other => format!("{}{}", m.save_failed_prefix, other),
        }
    }
}
