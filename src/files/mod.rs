use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;
use walkdir::WalkDir;

mod manifest;

pub use manifest::{load_manifest, save_manifest};

/// One enumerated source file, as persisted in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub file_path: PathBuf,
    pub file_name: String,
    pub extension: String,
    pub created_at: String,
    pub last_modified: String,
}

impl FileDescriptor {
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)?;
        let modified = metadata.modified()?;
        // Not every file system records a birth time.
        let created = metadata.created().unwrap_or(modified);

        Ok(Self {
            file_path: path.to_path_buf(),
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            extension: extension_of(path),
            created_at: format_timestamp(created),
            last_modified: format_timestamp(modified),
        })
    }
}

/// Recursively lists files under `root` whose name ends with one of
/// `extensions`. Matching is a plain, case-sensitive suffix test. Symlinks to
/// files are listed; symlinked directories are not descended into.
pub fn enumerate_files(root: &Path, extensions: &[String]) -> Result<Vec<FileDescriptor>> {
    if !root.is_dir() {
        anyhow::bail!("{:?} is not a directory", root);
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            continue;
        }

        match FileDescriptor::from_path(entry.path()) {
            Ok(descriptor) => files.push(descriptor),
            Err(e) => warn!("Skipping {:?}: {}", entry.path(), e),
        }
    }

    Ok(files)
}

/// Reads a text file as lines. Invalid UTF-8 is dropped and `\n`, `\r\n` and
/// `\r` all end a line.
pub fn read_file_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path)?;

    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }

    Ok(split_lines(&text))
}

fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
            }
            '\n' => lines.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// UTC, second precision: `2024-01-31T09:05:00Z`.
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

/// Last dotted suffix including the dot, or empty. Dotfiles have none.
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tempfile::TempDir;

    fn setup_test_repo() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::create_dir_all(root.join("public")).unwrap();
        fs::write(root.join("src/app.ts"), "const x = 1;\n").unwrap();
        fs::write(root.join("src/components/Button.tsx"), "export {}\n").unwrap();
        fs::write(root.join("src/LEGACY.TS"), "var y;\n").unwrap();
        fs::write(root.join("public/index.html"), "<html></html>\n").unwrap();
        fs::write(root.join("README.md"), "# readme\n").unwrap();

        temp_dir
    }

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_enumerate_filters_by_suffix() {
        let temp_dir = setup_test_repo();
        let files = enumerate_files(temp_dir.path(), &exts(&[".ts", ".tsx", ".html"])).unwrap();

        let mut names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["Button.tsx", "app.ts", "index.html"]);
    }

    #[test]
    fn test_enumerate_is_case_sensitive() {
        let temp_dir = setup_test_repo();
        let files = enumerate_files(temp_dir.path(), &exts(&[".ts"])).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "app.ts");
        assert!(files.iter().all(|f| f.file_name != "LEGACY.TS"));
    }

    #[cfg(unix)]
    #[test]
    fn test_enumerate_follows_file_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("real.txt"), "export const real = true;\n").unwrap();
        std::os::unix::fs::symlink(root.join("real.txt"), root.join("link.ts")).unwrap();

        let files = enumerate_files(root, &exts(&[".ts"])).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "link.ts");
        assert_eq!(files[0].extension, ".ts");
        assert_eq!(files[0].file_path, root.join("link.ts"));
    }

    #[cfg(unix)]
    #[test]
    fn test_enumerate_skips_dangling_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::os::unix::fs::symlink(root.join("gone.ts"), root.join("broken.ts")).unwrap();
        fs::write(root.join("kept.ts"), "let k;\n").unwrap();

        let files = enumerate_files(root, &exts(&[".ts"])).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "kept.ts");
    }

    #[cfg(unix)]
    #[test]
    fn test_enumerate_continues_past_unreadable_directory() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = setup_test_repo();
        let locked = temp_dir.path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("hidden.ts"), "let h;\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let result = enumerate_files(temp_dir.path(), &exts(&[".ts"]));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // Root ignores permission bits, so hidden.ts may or may not be listed.
        let files = result.unwrap();
        assert!(files.iter().any(|f| f.file_name == "app.ts"));
    }

    #[test]
    fn test_descriptor_fields() {
        let temp_dir = setup_test_repo();
        let path = temp_dir.path().join("src/components/Button.tsx");
        let descriptor = FileDescriptor::from_path(&path).unwrap();

        assert_eq!(descriptor.file_path, path);
        assert_eq!(descriptor.file_name, "Button.tsx");
        assert_eq!(descriptor.extension, ".tsx");
        assert_eq!(descriptor.created_at.len(), "2024-01-01T00:00:00Z".len());
        assert!(descriptor.last_modified.ends_with('Z'));
    }

    #[test]
    fn test_enumerate_missing_root() {
        assert!(enumerate_files(Path::new("/nonexistent/path/for/sure"), &exts(&[".ts"])).is_err());
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("a/b/app.component.ts")), ".ts");
        assert_eq!(extension_of(Path::new("Makefile")), "");
        assert_eq!(extension_of(Path::new(".env")), "");
    }

    #[test]
    fn test_format_timestamp() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_millis(1_706_691_900_750);
        assert_eq!(format_timestamp(time), "2024-01-31T09:05:00Z");
        assert_eq!(format_timestamp(SystemTime::UNIX_EPOCH), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("one\n"), vec!["one"]);
        assert_eq!(split_lines("one\n\n"), vec!["one", ""]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_read_file_lines_drops_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("styles.css");
        fs::write(&path, b"body { content: \"caf\xc3\xa9\"; }\n/* \xff broken */\n").unwrap();

        let lines = read_file_lines(&path).unwrap();
        assert_eq!(lines, vec!["body { content: \"café\"; }", "/*  broken */"]);
    }
}
