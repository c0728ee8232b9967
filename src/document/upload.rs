use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// An uploaded file buffered to disk. The file is removed when this value
/// is dropped, whichever way the owning scope exits.
pub struct TempUpload {
    file: NamedTempFile,
}

impl TempUpload {
    pub fn write(bytes: &[u8], suffix: &str) -> std::io::Result<Self> {
        Self::write_in(&std::env::temp_dir(), bytes, suffix)
    }

    pub fn write_in(dir: &Path, bytes: &[u8], suffix: &str) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("edumind-upload-")
            .suffix(suffix)
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
