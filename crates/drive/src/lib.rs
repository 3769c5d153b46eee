//! Google Drive storage backend: OAuth-backed credentials and the Drive v3
//! REST calls behind the pipeline's [`pdfsqueeze_pipeline::Storage`] seam.

pub mod credentials;
pub mod error;
pub mod storage;

pub use {
    credentials::{LazyCredentials, TokenSource, authorize_interactively},
    error::{Error, Result},
    storage::{DriveStorage, escape_query_literal},
};

/// Least-privilege scope: only files this app created are visible.
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// Key the Drive grant is stored under in the token file.
pub const TOKEN_PROVIDER: &str = "google-drive";
