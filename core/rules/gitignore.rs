use crate::error::{AppError, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log;
use std::path::Path;
use walkdir::WalkDir;

pub const GITIGNORE_FILENAME: &str = ".gitignore";

/// Compiles every `.gitignore` under `root`, in walk order.
pub fn discover_gitignores(root: &Path) -> Result<Vec<Gitignore>> {
    log::debug!("Discovering .gitignore files under: {}", root.display());
    let mut matchers = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() || entry.file_name() != GITIGNORE_FILENAME {
            continue;
        }
        log::trace!("Found .gitignore: {}", entry.path().display());
        matchers.push(compile_gitignore(entry.path())?);
    }
    log::debug!("Loaded {} .gitignore files.", matchers.len());
    Ok(matchers)
}

/// Patterns are rooted at the directory holding the file.
pub fn compile_gitignore(path: &Path) -> Result<Gitignore> {
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    let mut builder = GitignoreBuilder::new(root);
    if let Some(err) = builder.add(path) {
        return Err(AppError::Gitignore {
            path: path.to_path_buf(),
            source: err,
        });
    }
    builder.build().map_err(|err| AppError::Gitignore {
        path: path.to_path_buf(),
        source: err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_in_walk_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("b/nested")).unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("b/nested/.gitignore"), "*.o\n").unwrap();
        fs::write(dir.path().join("a/.gitignore"), "*.tmp\n").unwrap();
        fs::write(dir.path().join("not-a-gitignore"), "*\n").unwrap();

        let found = discover_gitignores(dir.path()).unwrap();
        let roots: Vec<&Path> = found.iter().map(|g| g.path()).collect();
        assert_eq!(
            roots,
            vec![
                dir.path().join("a").as_path(),
                dir.path().join("b/nested").as_path()
            ]
        );
        assert_eq!(found[0].num_ignores(), 1);
    }

    #[test]
    fn test_no_gitignores() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.go"), "package x").unwrap();
        assert!(discover_gitignores(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_gitignore_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(GITIGNORE_FILENAME);
        fs::write(&path, "*.tmp\n[unclosed\n").unwrap();

        match compile_gitignore(&path) {
            Err(AppError::Gitignore { path: bad, .. }) => assert_eq!(bad, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_gitignore_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            compile_gitignore(&dir.path().join(GITIGNORE_FILENAME)),
            Err(AppError::Gitignore { .. })
        ));
    }
}
