use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use walkdir::WalkDir;

use crate::error::ScanError;
use crate::schema::types::ScanOptions;

use super::observer::ScanObserver;

/// File collector for finding source files
#[derive(Debug, Clone)]
pub struct FileCollector {
    /// Suffix a file name must end with, including the dot
    suffix: String,

    /// Visit entries of each directory sorted by file name
    sort_paths: bool,

    /// Whether to follow symbolic links
    follow_links: bool,
}

impl Default for FileCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl FileCollector {
    /// Create a new file collector for `.py` files
    pub fn new() -> Self {
        Self::with_extension("py")
    }

    /// Create a new file collector for a custom file extension
    pub fn with_extension(extension: &str) -> Self {
        Self {
            suffix: format!(".{}", extension.trim_start_matches('.')),
            sort_paths: true,
            follow_links: false,
        }
    }

    /// Create a file collector from scan options
    pub fn from_options(options: &ScanOptions) -> Self {
        Self {
            sort_paths: options.sort_paths,
            follow_links: options.follow_links,
            ..Self::with_extension(&options.extension)
        }
    }

    /// Whether a path names a source file this collector accepts
    pub fn accepts(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(&self.suffix))
    }

    /// Collect all matching files below `input_dir`, in visitation order.
    ///
    /// A root that cannot be read is an error. Unreadable entries further down
    /// are reported to the observer and skipped.
    pub fn collect_files(&self, input_dir: impl AsRef<Path>, observer: &mut dyn ScanObserver) -> Result<Vec<PathBuf>, ScanError> {
        let input_dir = input_dir.as_ref();
        debug!("Collecting files from directory: {}", input_dir.display());

        let mut walker = WalkDir::new(input_dir).follow_links(self.follow_links);
        if self.sort_paths {
            walker = walker.sort_by_file_name();
        }

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(ScanError::Walk {
                        path: input_dir.to_path_buf(),
                        source: err,
                    });
                }
                // A dangling link named like a source file is still collected
                // so that reading it fails the scan
                Err(err) if err.path().is_some_and(|p| self.accepts(p) && is_symlink(p)) => {
                    if let Some(path) = err.path() {
                        files.push(path.to_path_buf());
                    }
                    continue;
                }
                Err(err) => {
                    observer.walk_error(&err);
                    continue;
                }
            };

            // Symlinks count as files unless they point at a directory
            let is_file = entry.file_type().is_file() || (entry.path_is_symlink() && !entry.path().is_dir());
            if is_file && self.accepts(entry.path()) {
                trace!("Found file: {}", entry.path().display());
                files.push(entry.into_path());
            }
        }

        debug!("Collected {} files for processing", files.len());
        Ok(files)
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::scanner::observer::NullObserver;
    use tempfile::tempdir;

    #[test]
    fn test_collects_matching_files_sorted() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("pkg/sub"))?;
        fs::write(dir.path().join("b.py"), "")?;
        fs::write(dir.path().join("a.py"), "")?;
        fs::write(dir.path().join("notes.txt"), "")?;
        fs::write(dir.path().join("module.pyc"), "")?;
        fs::write(dir.path().join("UPPER.PY"), "")?;
        fs::write(dir.path().join("pkg/sub/c.py"), "")?;

        let files = FileCollector::new().collect_files(dir.path(), &mut NullObserver)?;
        let relative: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(relative, vec!["a.py", "b.py", "pkg/sub/c.py"]);
        Ok(())
    }

    #[test]
    fn test_directory_named_like_source_is_skipped() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("weird.py"))?;
        fs::write(dir.path().join("weird.py/inner.py"), "")?;

        let files = FileCollector::new().collect_files(dir.path(), &mut NullObserver)?;
        assert_eq!(files, vec![dir.path().join("weird.py").join("inner.py")]);
        Ok(())
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = FileCollector::new()
            .collect_files(&missing, &mut NullObserver)
            .unwrap_err();
        assert!(matches!(err, ScanError::Walk { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_source_link_is_collected() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let link = dir.path().join("dangling.py");
        std::os::unix::fs::symlink(dir.path().join("missing.py"), &link)?;
        std::os::unix::fs::symlink(dir.path().join("missing.txt"), dir.path().join("other.txt"))?;

        for follow_links in [false, true] {
            let collector = FileCollector {
                follow_links,
                ..FileCollector::new()
            };
            let files = collector.collect_files(dir.path(), &mut NullObserver)?;
            assert_eq!(files, vec![link.clone()]);
        }
        Ok(())
    }

    #[test]
    fn test_custom_extension() {
        let collector = FileCollector::with_extension(".pyi");
        assert!(collector.accepts(Path::new("stubs/models.pyi")));
        assert!(!collector.accepts(Path::new("models.py")));
    }
}
