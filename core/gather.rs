use crate::error::{AppError, Result};
use crate::rules::{Candidate, RuleSet};
use log;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    pub content: Vec<u8>,
}

impl FileRecord {
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read(path).map_err(|e| AppError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            size: content.len() as u64,
            content,
        })
    }
}

/// Ordered, duplicate-free set of selected files.
#[derive(Debug, Default)]
pub struct Manifest {
    files: Vec<FileRecord>,
    seen: HashSet<PathBuf>,
    total_bytes: u64,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.seen.contains(&clean_path(path))
    }

    /// Reads `path` and appends it under its cleaned form. A path that is
    /// already present is an error.
    pub fn add_file(&mut self, path: &Path) -> Result<()> {
        let path = clean_path(path);
        if self.contains(&path) {
            return Err(AppError::DuplicatePath(path));
        }
        let record = FileRecord::read(&path)?;
        log::trace!("Read {} ({} bytes)", path.display(), record.size);
        self.total_bytes += record.size;
        self.seen.insert(record.path.clone());
        self.files.push(record);
        Ok(())
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_files(self) -> Vec<FileRecord> {
        self.files
    }
}

/// Drops `.` components, so `./web/a.txt` and `web/a.txt` name the same record.
pub fn clean_path(path: &Path) -> PathBuf {
    let cleaned: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

/// Collects every input into one manifest. Directly named files bypass the
/// rules; directory descendants are filtered by them. The first error aborts
/// the whole collection.
pub fn collect(inputs: &[PathBuf], rules: &RuleSet, verbose: bool) -> Result<Manifest> {
    let mut manifest = Manifest::new();

    for input in inputs {
        let metadata = fs::metadata(input).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AppError::NotFound(input.clone()),
            _ => AppError::FileRead {
                path: input.clone(),
                source: e,
            },
        })?;

        if !metadata.is_dir() {
            log::debug!("Adding input file: {}", input.display());
            manifest.add_file(input)?;
            continue;
        }

        log::debug!("Walking input directory: {}", input.display());
        walk_directory(input, rules, verbose, &mut manifest)?;
    }

    if verbose {
        log::info!("total bytes read: {}", manifest.total_bytes());
    } else {
        log::debug!("total bytes read: {}", manifest.total_bytes());
    }
    Ok(manifest)
}

fn walk_directory(
    root: &Path,
    rules: &RuleSet,
    verbose: bool,
    manifest: &mut Manifest,
) -> Result<()> {
    let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();

    for entry_result in walker {
        let entry = entry_result?;
        let file_type = entry.file_type();
        let is_dir = file_type.is_dir();
        let candidate = Candidate::new(entry.path(), is_dir);

        // Rejected directories are still descended into.
        if !rules.test(&candidate, verbose) || is_dir {
            continue;
        }
        if file_type.is_symlink() && entry.path().is_dir() {
            log::debug!(
                "Not following directory symlink: {}",
                entry.path().display()
            );
            continue;
        }

        manifest.add_file(entry.path())?;
    }
    Ok(())
}
