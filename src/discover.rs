//! Input discovery
//!
//! Expands the paths given on the command line into the list of source files
//! to segment. Directories are walked with `.gitignore` support plus a set of
//! default noise excludes; glob patterns are expanded; explicit files are
//! taken as given.

use crate::adapter::LanguageRegistry;
use crate::{Error, Result};
use ignore::WalkBuilder;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const DEFAULT_EXCLUDES: &[&str] = &[
    // Noise directories
    "target/", "node_modules/", "venv/", ".venv/", "vendor/",
    "dist/", "build/", "out/", "coverage/", "__pycache__/", "egg-info/",
    ".git/", ".vscode/", ".idea/",

    // Generated or minified sources
    "*.min.js", "*.bundle.js", "*.pb.go", "*_pb2.py",
];

/// Gitignore-style matcher for the default excludes plus user patterns.
pub struct ExcludeFilter {
    inner: Gitignore,
}

impl ExcludeFilter {
    pub fn new(root: &Path, extra_excludes: &[String]) -> Self {
        let mut builder = GitignoreBuilder::new(root);

        for pattern in DEFAULT_EXCLUDES {
            builder.add_line(None, pattern).ok();
        }
        for pattern in extra_excludes {
            if let Err(e) = builder.add_line(None, pattern) {
                tracing::warn!("ignoring exclude pattern {:?}: {}", pattern, e);
            }
        }

        Self {
            inner: builder.build().unwrap_or_else(|_| Gitignore::empty()),
        }
    }

    pub fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        self.inner.matched(path, is_dir).is_ignore()
    }
}

/// Language hint for a path: its lowercased extension.
pub fn language_hint(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Expand `inputs` into a sorted, deduplicated list of files.
///
/// Files found by walking a directory or expanding a glob are kept only when
/// some adapter in `registry` claims their extension. Explicitly named files
/// are always kept, so `--language` can cover unusual extensions.
pub fn collect_inputs(inputs: &[PathBuf], excludes: &[String], registry: &LanguageRegistry) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for input in inputs {
        if input.is_file() {
            files.insert(input.clone());
        } else if input.is_dir() {
            files.extend(walk_directory(input, excludes, registry));
        } else if is_glob(input) {
            files.extend(expand_glob(input, excludes, registry)?);
        } else {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such file or directory: {}", input.display()),
            )));
        }
    }

    Ok(files.into_iter().collect())
}

fn walk_directory(root: &Path, excludes: &[String], registry: &LanguageRegistry) -> Vec<PathBuf> {
    let filter = ExcludeFilter::new(root, excludes);
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .require_git(false);
    builder.filter_entry(move |entry| {
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        entry.depth() == 0 || !filter.is_excluded(entry.path(), is_dir)
    });

    let mut files = Vec::new();
    for result in builder.build() {
        match result {
            Ok(entry) => {
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let path = entry.path();
                if registry.resolve_path(path).is_ok() {
                    files.push(path.to_path_buf());
                } else {
                    tracing::debug!("Skipping unsupported file {}", path.display());
                }
            }
            Err(e) => tracing::warn!("walk error under {}: {}", root.display(), e),
        }
    }
    files
}

fn is_glob(input: &Path) -> bool {
    input.to_string_lossy().contains(['*', '?', '['])
}

fn expand_glob(pattern: &Path, excludes: &[String], registry: &LanguageRegistry) -> Result<Vec<PathBuf>> {
    let pattern = pattern.to_string_lossy();
    let paths = glob::glob(&pattern)
        .map_err(|e| Error::InvalidConfig(format!("invalid glob pattern {pattern:?}: {e}")))?;

    let filter = ExcludeFilter::new(Path::new("."), excludes);
    let files: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("unreadable glob match: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .filter(|path| !filter.is_excluded(path, false))
        .filter(|path| registry.resolve_path(path).is_ok())
        .collect();

    if files.is_empty() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no source files match {pattern}"),
        )));
    }
    Ok(files)
}
