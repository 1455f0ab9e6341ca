use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Canonicalizes and validates a directory that is served or written to.
pub fn canonicalize_existing_dir(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("failed to canonicalize directory {}", path.display()))?;
    if !canonical.is_dir() {
        bail!("not a directory: {}", canonical.display());
    }
    Ok(canonical)
}

/// Creates the directory (and parents) if needed, then canonicalizes it.
pub fn ensure_dir(path: &Path) -> Result<PathBuf> {
    if path.exists() && !path.is_dir() {
        bail!("path exists but is not a directory: {}", path.display());
    }
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory {}", path.display()))?;
    canonicalize_existing_dir(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let tmp = tempdir().expect("tempdir");
        let target = tmp.path().join("static").join("photos");
        let canonical = ensure_dir(&target).expect("ensure");
        assert!(canonical.is_dir());
        assert!(canonical.ends_with("static/photos"));
    }

    #[test]
    fn ensure_dir_refuses_regular_file() {
        let tmp = tempdir().expect("tempdir");
        let file = tmp.path().join("music");
        fs::write(&file, b"not a dir").expect("write");
        assert!(ensure_dir(&file).is_err());
        assert!(canonicalize_existing_dir(&file).is_err());
    }
}
