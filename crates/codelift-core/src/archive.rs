//! Trainer-code archive builder.
//!
//! Walks a source directory, applies glob exclusion rules at both the
//! directory and file level, and writes the surviving tree into a gzip
//! compressed tar archive whose entry names are the source-relative paths.

use crate::error::{SubmitError, SubmitResult};
use flate2::write::GzEncoder;
use flate2::Compression;
use glob::{MatchOptions, Pattern};
use std::fs::File;
use std::io;
use std::path::Path;
use tar::Builder;
use walkdir::WalkDir;

/// A compiled set of shell-glob exclusion rules.
///
/// A pattern excludes a directory when it matches the directory's path
/// relative to the archive root, or any single component of that path; a
/// matched directory is pruned before descent. A pattern excludes a file
/// when it matches the file's relative path or its basename. Matching is
/// case-sensitive and `*` does not cross path separators.
///
/// An empty set excludes nothing: there are no implicit exclusions, so
/// callers must pass every pattern they want honored.
#[derive(Debug, Clone, Default)]
pub struct ExcludePatterns {
    patterns: Vec<Pattern>,
}

/// `*` and `?` stay within one path segment when matching full relative
/// paths; basename and component matches never see a separator anyway.
fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

impl ExcludePatterns {
    /// Compiles raw glob strings, failing on the first malformed pattern.
    pub fn compile(raw: &[String]) -> SubmitResult<Self> {
        let patterns = raw
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|source| SubmitError::Pattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<SubmitResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True when the directory at `rel` (relative to the archive root)
    /// should be pruned. Every path component is tested independently, so
    /// a bare name like `__pycache__` matches at any depth while a
    /// slash-qualified pattern like `tests/fixtures` only matches that
    /// exact relative location.
    fn excludes_dir(&self, rel: &Path) -> bool {
        if self
            .patterns
            .iter()
            .any(|p| p.matches_path_with(rel, match_options()))
        {
            return true;
        }
        rel.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .is_some_and(|name| self.patterns.iter().any(|p| p.matches(name)))
        })
    }

    /// True when the file at `rel` should be left out of the archive,
    /// either by relative path or by basename.
    fn excludes_file(&self, rel: &Path) -> bool {
        if self
            .patterns
            .iter()
            .any(|p| p.matches_path_with(rel, match_options()))
        {
            return true;
        }
        rel.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.patterns.iter().any(|p| p.matches(name)))
    }
}

/// Archives every non-excluded regular file under `source_dir` into a
/// gzip compressed tar file at `output_path`, returning the compressed
/// size in bytes.
///
/// The source directory is never modified. Symlinks are not followed.
/// The caller owns the output file and is responsible for removing it.
pub fn build_archive(
    source_dir: &Path,
    output_path: &Path,
    exclude: &ExcludePatterns,
) -> SubmitResult<u64> {
    if !source_dir.is_dir() {
        return Err(SubmitError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source directory does not exist: {}", source_dir.display()),
        )));
    }

    let file = File::create(output_path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut tar = Builder::new(encoder);

    let walker = WalkDir::new(source_dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            match entry.path().strip_prefix(source_dir) {
                Ok(rel) => !exclude.excludes_dir(rel),
                Err(_) => true,
            }
        });

    let mut entries = 0usize;
    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(source_dir) else {
            continue;
        };
        if exclude.excludes_file(rel) {
            continue;
        }
        tar.append_path_with_name(entry.path(), rel)?;
        entries += 1;
    }

    let encoder = tar.into_inner()?;
    encoder.finish()?;

    let size = std::fs::metadata(output_path)?.len();
    tracing::debug!(entries, size, output = %output_path.display(), "built trainer archive");
    Ok(size)
}
