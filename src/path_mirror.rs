use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Maps files under a source root onto the same relative layout under a
/// destination root, appending a marker suffix to each file name.
#[derive(Debug, Clone)]
pub struct PathMirror {
    source_root: PathBuf,
    dest_root: PathBuf,
    suffix: String,
}

impl PathMirror {
    pub fn new<S: AsRef<Path>, D: AsRef<Path>>(source_root: S, dest_root: D, suffix: &str) -> Self {
        Self {
            source_root: source_root.as_ref().to_path_buf(),
            dest_root: dest_root.as_ref().to_path_buf(),
            suffix: suffix.to_string(),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn dest_root(&self) -> &Path {
        &self.dest_root
    }

    /// Mirrored path for `file`, or `None` when it is not under the source
    /// root. The comparison is lexical; nothing touches the file system.
    ///
    /// `src/app.ts` becomes `src/app.ts.json`; `Makefile` becomes `Makefile.json`.
    pub fn destination<P: AsRef<Path>>(&self, file: P) -> Option<PathBuf> {
        let relative = file.as_ref().strip_prefix(&self.source_root).ok()?;
        let file_name = relative.file_name()?;

        let mut marked: OsString = file_name.to_os_string();
        marked.push(&self.suffix);

        Some(self.dest_root.join(relative).with_file_name(marked))
    }

    /// Like [`destination`](Self::destination), also creating the missing
    /// parent directories of the mirrored path.
    pub fn mirror<P: AsRef<Path>>(&self, file: P) -> Result<Option<PathBuf>> {
        let Some(dest) = self.destination(file) else {
            return Ok(None);
        };

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        Ok(Some(dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_destination_appends_suffix() {
        let mirror = PathMirror::new("/repo", "/data", ".json");

        assert_eq!(
            mirror.destination("/repo/src/app.ts"),
            Some(PathBuf::from("/data/src/app.ts.json"))
        );
        assert_eq!(
            mirror.destination("/repo/shop/src/app/app.component.spec.ts"),
            Some(PathBuf::from("/data/shop/src/app/app.component.spec.ts.json"))
        );
    }

    #[test]
    fn test_destination_without_suffix() {
        let mirror = PathMirror::new("repos", "data", ".json");

        assert_eq!(
            mirror.destination("repos/site/Makefile"),
            Some(PathBuf::from("data/site/Makefile.json"))
        );
        assert_eq!(
            mirror.destination("repos/site/.env"),
            Some(PathBuf::from("data/site/.env.json"))
        );
    }

    #[test]
    fn test_outside_root_is_skipped() {
        let mirror = PathMirror::new("/repo", "/data", ".json");

        assert_eq!(mirror.destination("/elsewhere/app.ts"), None);
        assert_eq!(mirror.destination("/repository/app.ts"), None);
        assert_eq!(mirror.destination("/repo"), None);
    }

    #[test]
    fn test_mirror_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let repo = temp_dir.path().join("repo");
        let data = temp_dir.path().join("data");
        let mirror = PathMirror::new(&repo, &data, ".json");

        let dest = mirror.mirror(repo.join("src/app.ts")).unwrap().unwrap();

        assert_eq!(dest, data.join("src/app.ts.json"));
        assert!(data.join("src").is_dir());
        assert!(!dest.exists());
    }

    #[test]
    fn test_mirror_outside_root_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data");
        let mirror = PathMirror::new(temp_dir.path().join("repo"), &data, ".json");

        assert!(mirror.mirror("/tmp/other/app.ts").unwrap().is_none());
        assert!(!data.exists());
    }
}
