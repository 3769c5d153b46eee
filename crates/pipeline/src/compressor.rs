//! Ghostscript-backed PDF compression with a fixed `screen` profile.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Stdio,
};

use {
    async_trait::async_trait,
    tokio::process::Command,
    tracing::{debug, warn},
};

/// Stderr kept in errors, in bytes.
const MAX_STDERR_BYTES: usize = 4 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum CompressError {
    #[error("compression failed: cannot run {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compression failed: exit code {code:?}: {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },

    #[error("compression failed: no output written to {}", path.display())]
    MissingOutput { path: PathBuf },
}

/// Turns an input PDF into a smaller output PDF.
#[async_trait]
pub trait Compress: Send + Sync {
    async fn compress(&self, input: &Path, output: &Path) -> Result<(), CompressError>;
}

/// Runs Ghostscript's `pdfwrite` device with the `/screen` preset.
///
/// Only the program location is configurable; the argument vector is fixed.
#[derive(Debug, Clone)]
pub struct GhostscriptCompressor {
    program: PathBuf,
}

impl Default for GhostscriptCompressor {
    fn default() -> Self {
        Self::new("gs")
    }
}

impl GhostscriptCompressor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The exact arguments passed to Ghostscript.
    pub fn args(input: &Path, output: &Path) -> Vec<OsString> {
        let mut out_arg = OsString::from("-sOutputFile=");
        out_arg.push(output);
        vec![
            "-sDEVICE=pdfwrite".into(),
            "-dCompatibilityLevel=1.4".into(),
            "-dPDFSETTINGS=/screen".into(),
            "-dNOPAUSE".into(),
            "-dBATCH".into(),
            out_arg,
            input.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl Compress for GhostscriptCompressor {
    async fn compress(&self, input: &Path, output: &Path) -> Result<(), CompressError> {
        debug!(
            program = %self.program.display(),
            input = %input.display(),
            output = %output.display(),
            "running ghostscript"
        );

        let result = Command::new(&self.program)
            .args(Self::args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| CompressError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            let mut stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            if stderr.len() > MAX_STDERR_BYTES {
                let mut cut = MAX_STDERR_BYTES;
                while !stderr.is_char_boundary(cut) {
                    cut -= 1;
                }
                stderr.truncate(cut);
                stderr.push_str("... [truncated]");
            }
            warn!(code = ?result.status.code(), "ghostscript exited with failure");
            return Err(CompressError::ExitStatus {
                code: result.status.code(),
                stderr,
            });
        }

        if !tokio::fs::try_exists(output).await.unwrap_or(false) {
            return Err(CompressError::MissingOutput {
                path: output.to_path_buf(),
            });
        }

        Ok(())
    }
}
