use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("TOML Parsing Error: {0}")]
    TomlParse(String),

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    #[error("Glob Pattern Error: invalid wildcard \"{pattern}\": {message}")]
    Glob { pattern: String, message: String },

    #[error("Gitignore Error: cannot open .gitignore '{path}': {source}")]
    Gitignore {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("File or directory '{0}' not found")]
    NotFound(PathBuf),

    #[error("Duplicate path in the input: {0}")]
    DuplicatePath(PathBuf),

    #[error("File Read Error: Path '{path}', Error: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File Write Error: Path '{path}', Error: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WalkDir Error: Path '{path}', Error: {message}")]
    WalkDir { path: PathBuf, message: String },

    #[error("Pack Error: {0}")]
    Pack(String),

    #[error("Package Discovery Error: {0}")]
    PackageDiscovery(String),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<walkdir::Error> for AppError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        AppError::WalkDir {
            path,
            message: err.to_string(),
        }
    }
}

impl AppError {
    /// True for errors caused by the user's configuration rather than the
    /// filesystem or the packer.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::TomlParse(_)
                | AppError::Glob { .. }
                | AppError::Gitignore { .. }
        )
    }
}
