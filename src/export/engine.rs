//! Typst rendering engine.
//!
//! Writes the generated Typst source and its assets to a scratch directory,
//! runs the compiler and reads back the PDF. The compiler only exits once the
//! PDF is written, so its exit is the render-complete signal.

use async_trait::async_trait;
use tempfile::tempdir;
use thiserror::Error;
use tokio::process::Command;

use super::template::RenderSource;

const SOURCE_FILE: &str = "laporan.typ";
const OUTPUT_FILE: &str = "laporan.pdf";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to load Typst template: {0}")]
    TemplateIo(#[source] std::io::Error),
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write Typst source: {0}")]
    WriteTypst(#[source] std::io::Error),
    #[error("failed to copy asset '{name}': {source}")]
    CopyAsset {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Typst CLI execution failed: {0}")]
    TypstIo(#[source] std::io::Error),
    #[error("Typst CLI exited with status {code}: {stderr}")]
    TypstExit { code: i32, stderr: String },
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
}

/// Turns a laid-out report into PDF bytes.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Whether the backend can render at all right now.
    fn is_ready(&self) -> bool;

    async fn render(&self, source: &RenderSource) -> Result<Vec<u8>, RenderError>;
}

/// Renders with the `typst` command line compiler.
pub struct TypstRenderEngine {
    binary: String,
    version: Option<String>,
}

impl TypstRenderEngine {
    /// Runs `<binary> --version` once; the engine is ready only if that succeeds.
    pub fn new(binary: impl Into<String>) -> Self {
        let binary = binary.into();
        let version = probe_version(&binary);
        match &version {
            Some(version) => log::info!("Using Typst compiler '{}' ({})", binary, version),
            None => log::warn!("Typst compiler '{}' not runnable, PDF export is unavailable", binary),
        }
        Self { binary, version }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

#[async_trait]
impl RenderBackend for TypstRenderEngine {
    fn is_ready(&self) -> bool {
        self.version.is_some()
    }

    async fn render(&self, source: &RenderSource) -> Result<Vec<u8>, RenderError> {
        // Compilation context
        let temp_dir = tempdir().map_err(RenderError::TempDir)?;
        let typ_path = temp_dir.path().join(SOURCE_FILE);
        let output_path = temp_dir.path().join(OUTPUT_FILE);

        tokio::fs::write(&typ_path, &source.typst)
            .await
            .map_err(RenderError::WriteTypst)?;

        for asset in &source.assets {
            tokio::fs::copy(&asset.path, temp_dir.path().join(&asset.name))
                .await
                .map_err(|source| RenderError::CopyAsset {
                    name: asset.name.clone(),
                    source,
                })?;
        }

        let output = Command::new(&self.binary)
            .arg("compile")
            .arg(&typ_path)
            .arg(&output_path)
            .current_dir(temp_dir.path())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(RenderError::TypstIo)?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RenderError::TypstExit { code, stderr });
        }

        tokio::fs::read(&output_path)
            .await
            .map_err(RenderError::ReadPdf)
    }
}

fn probe_version(binary: &str) -> Option<String> {
    let output = std::process::Command::new(binary)
        .arg("--version")
        .output()
        .map_err(|e| log::debug!("Failed to run '{} --version': {}", binary, e))
        .ok()?;

    if !output.status.success() {
        log::debug!("'{} --version' exited with {}", binary, output.status);
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Some(if version.is_empty() { binary.to_string() } else { version })
}
