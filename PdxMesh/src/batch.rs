//! Batch mesh validation
//!
//! Finds `.mesh` files under a directory and parses each one in parallel.
//! Every file gets its own cursor and tree, so files are independent.

use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use walkdir::WalkDir;

use crate::formats::pdx::{FileSummary, ReadOptions, read_pdx_with_options};

/// Outcome for one file
#[derive(Debug, Clone, Serialize)]
pub struct MeshValidation {
    pub path: PathBuf,
    /// Summary on success, error message on failure
    pub outcome: std::result::Result<FileSummary, String>,
}

impl MeshValidation {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Result of a batch validation
#[derive(Debug, Clone, Serialize)]
pub struct BatchValidationResult {
    /// Number of files that parsed
    pub success_count: usize,
    /// Number of files that failed
    pub fail_count: usize,
    /// Per-file outcomes, in input order
    pub results: Vec<MeshValidation>,
}

impl BatchValidationResult {
    pub fn failures(&self) -> impl Iterator<Item = &MeshValidation> {
        self.results.iter().filter(|r| !r.is_ok())
    }
}

/// Find all .mesh files in a directory recursively
///
/// # Returns
/// A sorted list of paths to .mesh files found in the directory tree.
pub fn find_mesh_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut mesh_files: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.path().is_file()
                && e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("mesh"))
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    mesh_files.sort();
    mesh_files
}

/// Parse mesh files in parallel
///
/// `progress` is called once per file with `(current, total, path)`, from
/// worker threads and in completion order.
pub fn validate_batch<F>(
    mesh_files: &[PathBuf],
    options: &ReadOptions,
    progress: F,
) -> BatchValidationResult
where
    F: Fn(usize, usize, &Path) + Send + Sync,
{
    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = mesh_files.len();

    let results: Vec<MeshValidation> = mesh_files
        .par_iter()
        .map(|path| {
            let outcome = match read_pdx_with_options(path, options) {
                Ok(file) => {
                    success_counter.fetch_add(1, Ordering::SeqCst);
                    Ok(file.summary())
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    Err(e.to_string())
                }
            };

            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(current, total, path);

            MeshValidation {
                path: path.clone(),
                outcome,
            }
        })
        .collect();

    BatchValidationResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::pdx::{PdxFile, write_pdx};

    #[test]
    fn test_find_mesh_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/b.MESH"), b"").unwrap();
        std::fs::write(dir.path().join("a.mesh"), b"").unwrap();
        std::fs::write(dir.path().join("a.gfx"), b"").unwrap();

        let files = find_mesh_files(dir.path());
        assert_eq!(
            files,
            vec![dir.path().join("a.mesh"), dir.path().join("sub/b.MESH")]
        );
    }

    #[test]
    fn test_validate_batch_counts() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.mesh");
        let bad = dir.path().join("bad.mesh");
        write_pdx(&PdxFile::default(), &good).unwrap();
        std::fs::write(&bad, b"not a mesh").unwrap();

        let calls = AtomicUsize::new(0);
        let files = [bad.clone(), good.clone()];
        let result = validate_batch(&files, &ReadOptions::default(), |_, total, _| {
            assert_eq!(total, 2);
            calls.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(result.success_count, 1);
        assert_eq!(result.fail_count, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.results[0].path, bad);
        assert!(!result.results[0].is_ok());
        assert!(result.results[1].is_ok());
        assert_eq!(result.failures().count(), 1);
    }
}
