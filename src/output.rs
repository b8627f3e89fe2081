use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::BuildError;

pub fn read_template(path: &Path) -> Result<String, BuildError> {
    fs::read_to_string(path).map_err(|source| BuildError::TemplateMissing {
        path: path.to_path_buf(),
        source,
    })
}

pub fn ensure_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|source| BuildError::Output {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `contents` unless the file already holds exactly these bytes.
/// Returns whether anything was written.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<bool, BuildError> {
    if let Ok(existing) = fs::read(path) {
        if existing == contents.as_bytes() {
            debug!(path = %path.display(), "unchanged");
            return Ok(false);
        }
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).map_err(|source| BuildError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_once_then_skips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/page.html");
        assert!(write_if_changed(&path, "<p>a</p>").unwrap());
        assert!(!write_if_changed(&path, "<p>a</p>").unwrap());
        assert!(write_if_changed(&path, "<p>b</p>").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>b</p>");
    }

    #[test]
    fn missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_template(&dir.path().join("nope.html")).unwrap_err();
        assert!(matches!(err, BuildError::TemplateMissing { .. }));
    }
}
