//! Per-job scratch workspace.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

use crate::rendition::Rendition;

/// Scratch space owned by one job: a source file and an output directory.
///
/// Both are created uniquely under the scratch root and removed when the
/// workspace is dropped, whichever way the job ends.
#[derive(Debug)]
pub struct ScratchWorkspace {
    source: NamedTempFile,
    output: TempDir,
}

impl ScratchWorkspace {
    /// Creates `video-*<extension>` and `transcoded-*/` under `root`.
    pub fn create(root: &Path, source_extension: &str) -> io::Result<Self> {
        std::fs::create_dir_all(root)?;

        let source = tempfile::Builder::new()
            .prefix("video-")
            .suffix(source_extension)
            .tempfile_in(root)?;
        let output = tempfile::Builder::new()
            .prefix("transcoded-")
            .tempdir_in(root)?;

        Ok(Self { source, output })
    }

    /// Local path the source object is downloaded to.
    pub fn source_path(&self) -> &Path {
        self.source.path()
    }

    pub fn output_dir(&self) -> &Path {
        self.output.path()
    }

    /// Creates and returns the output directory for `rendition`.
    pub async fn rendition_dir(&self, rendition: Rendition) -> io::Result<PathBuf> {
        let dir = self.output.path().join(rendition.name());
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }
}
