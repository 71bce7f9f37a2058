use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::io::AsyncReadExt;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Recording file not found or invalid")]
    Unreadable,
    #[error("Path is not a file")]
    NotAFile,
    #[error("File is empty")]
    Empty,
    #[error("No file path reported for finished recording")]
    MissingPath,
    #[error("Failed to hash recording: {0}")]
    Hash(String),
    #[error("Failed to probe duration: {0}")]
    Probe(String),
}

#[derive(Debug, Clone, Copy)]
pub struct ArtifactStat {
    pub is_file: bool,
    pub size: u64,
}

/// File-level inspection of a reported recording artifact: existence/shape,
/// content fingerprint, media duration. All I/O is scoped to the call.
#[async_trait]
pub trait ArtifactInspector: Send + Sync {
    async fn stat(&self, path: &str) -> Result<ArtifactStat, ArtifactError>;

    /// Hex-encoded SHA-256 of the file contents.
    async fn hash(&self, path: &str) -> Result<String, ArtifactError>;

    /// Media duration in whole seconds.
    async fn probe_duration(&self, path: &str) -> Result<u32, ArtifactError>;
}

pub struct FsArtifactInspector {
    ffprobe_bin: String,
}

impl FsArtifactInspector {
    pub fn new(ffprobe_bin: impl Into<String>) -> Self {
        Self {
            ffprobe_bin: ffprobe_bin.into(),
        }
    }
}

#[async_trait]
impl ArtifactInspector for FsArtifactInspector {
    async fn stat(&self, path: &str) -> Result<ArtifactStat, ArtifactError> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|_| ArtifactError::Unreadable)?;
        Ok(ArtifactStat {
            is_file: meta.is_file(),
            size: meta.len(),
        })
    }

    async fn hash(&self, path: &str) -> Result<String, ArtifactError> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| ArtifactError::Hash(e.to_string()))?;

        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = file
                .read(&mut buf)
                .await
                .map_err(|e| ArtifactError::Hash(e.to_string()))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hex::encode(hasher.finalize()))
    }

    async fn probe_duration(&self, path: &str) -> Result<u32, ArtifactError> {
        let output = tokio::process::Command::new(&self.ffprobe_bin)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
                path,
            ])
            .output()
            .await
            .map_err(|e| ArtifactError::Probe(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ArtifactError::Probe(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let seconds: f64 = stdout
            .trim()
            .parse()
            .map_err(|_| ArtifactError::Probe(format!("Unparseable duration: {}", stdout.trim())))?;
        Ok(seconds.floor() as u32)
    }
}
