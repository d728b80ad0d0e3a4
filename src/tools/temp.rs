use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::ViewgridResult;

const PREFIX: &str = "viewgrid_";

/// A uniquely named filesystem path that is removed when dropped.
///
/// The file is either created empty ([`TempPath::create`]) or only reserved by name
/// ([`TempPath::reserve`]) for a tool to write. Removal happens on every exit path of the
/// owning scope, including `?` returns and panics; [`TempPath::persist`] hands the file over
/// to a final destination instead.
#[derive(Debug)]
pub struct TempPath {
    inner: Option<tempfile::TempPath>,
}

impl TempPath {
    pub fn create(dir: impl AsRef<Path>, extension: &str) -> ViewgridResult<Self> {
        let dir = dir.as_ref();
        let file = tempfile::Builder::new()
            .prefix(PREFIX)
            .suffix(&format!(".{extension}"))
            .tempfile_in(dir)
            .with_context(|| format!("create temporary in '{}'", dir.display()))?;
        Ok(Self {
            inner: Some(file.into_temp_path()),
        })
    }

    /// Reserves a unique name in `dir` without leaving a file behind, so tools that must
    /// produce their output can be checked for it.
    pub fn reserve(dir: impl AsRef<Path>, extension: &str) -> ViewgridResult<Self> {
        let tmp = Self::create(dir, extension)?;
        std::fs::remove_file(tmp.path())
            .with_context(|| format!("reserve temporary '{}'", tmp.path().display()))?;
        Ok(tmp)
    }

    /// Reserves a temporary next to `dest`, so [`TempPath::persist`] is a same-directory rename.
    pub fn beside(dest: &Path, extension: &str) -> ViewgridResult<Self> {
        Self::reserve(parent_dir(dest), extension)
    }

    pub fn path(&self) -> &Path {
        // Only `persist` takes the inner path, and it consumes `self`.
        self.inner.as_deref().unwrap_or(Path::new(""))
    }

    /// Renames the file to `dest`, replacing any existing file there.
    pub fn persist(mut self, dest: impl AsRef<Path>) -> ViewgridResult<()> {
        let dest = dest.as_ref();
        let Some(inner) = self.inner.take() else {
            return Ok(());
        };
        let src = inner.to_path_buf();
        inner
            .persist(dest)
            .with_context(|| format!("move '{}' to '{}'", src.display(), dest.display()))?;
        Ok(())
    }
}

impl Drop for TempPath {
    fn drop(&mut self) {
        let Some(inner) = self.inner.take() else {
            return;
        };
        let path = inner.to_path_buf();
        if let Err(e) = inner.close()
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove temporary");
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tools/temp.rs"]
mod tests;
