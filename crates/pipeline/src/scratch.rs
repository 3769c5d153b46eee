use std::path::{Path, PathBuf};

use {tempfile::TempDir, uuid::Uuid};

const ORIGINAL_NAME: &str = "original.pdf";
const COMPRESSED_NAME: &str = "compressed.pdf";

/// Request-scoped scratch files for one pipeline run.
///
/// Each run gets its own directory named after its job id, so concurrent
/// requests never share paths. The directory and everything in it is removed
/// when the artifact is dropped.
#[derive(Debug)]
pub struct WorkArtifact {
    job_id: Uuid,
    dir: TempDir,
}

impl WorkArtifact {
    pub fn create(scratch_root: &Path, job_id: Uuid) -> std::io::Result<Self> {
        std::fs::create_dir_all(scratch_root)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("pdfsqueeze-{job_id}-"))
            .tempdir_in(scratch_root)?;
        Ok(Self { job_id, dir })
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn original_path(&self) -> PathBuf {
        self.dir.path().join(ORIGINAL_NAME)
    }

    pub fn compressed_path(&self) -> PathBuf {
        self.dir.path().join(COMPRESSED_NAME)
    }
}
