use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A recorded stream of back-to-back packets, mapped read-only.
pub struct CaptureFile {
    path: PathBuf,
    // Zero-length files cannot be mapped on every platform
    mmap: Option<Mmap>,
}

impl CaptureFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).context(format!("Failed to open capture {:?}", path))?;
        let len = file
            .metadata()
            .context(format!("Failed to stat capture {:?}", path))?
            .len();

        let mmap = if len == 0 {
            None
        } else {
            // SAFETY: the map is read-only; captures are not modified while analyzed
            let mmap = unsafe { Mmap::map(&file) }
                .context(format!("Failed to map capture {:?}", path))?;
            Some(mmap)
        };

        tracing::debug!(path = %path.display(), bytes = len, "opened capture");

        Ok(Self { path, mmap })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
