use crate::error::{AppError, Result};
use log;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILENAME: &str = "assetpack.toml";
pub const DEFAULT_OUTPUT_FILE: &str = "assets.gen.rs";
pub const DEFAULT_VARIABLE: &str = "ASSETS";
pub const DEFAULT_QUALITY: u32 = 11;
pub const MIN_QUALITY: u32 = 1;
pub const MAX_QUALITY: u32 = 11;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    /// Comma-separated globs; only matching files are bundled.
    #[serde(default)]
    pub include: Option<String>,
    /// Comma-separated globs; matching files are left out. Ignored when
    /// `include` is set.
    #[serde(default)]
    pub exclude: Option<String>,
    #[serde(default)]
    pub use_gitignore: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default = "default_variable")]
    pub variable: String,
    #[serde(default)]
    pub decompress: bool,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default = "default_quality")]
    pub quality: u32,
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}
fn default_variable() -> String {
    DEFAULT_VARIABLE.to_string()
}
fn default_quality() -> u32 {
    DEFAULT_QUALITY
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            variable: default_variable(),
            decompress: false,
            package: None,
            quality: default_quality(),
        }
    }
}

impl Config {
    pub fn determine_work_dir() -> Result<PathBuf> {
        env::current_dir().map_err(AppError::Io)
    }

    pub fn resolve_config_path(
        work_dir: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p_str) => {
                let mut path = PathBuf::from(shellexpand::tilde(p_str).as_ref());
                if path.is_relative() {
                    path = work_dir.join(path);
                }
                if !path.exists() && path.extension().is_none() {
                    path.set_extension("toml");
                }
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = work_dir.join(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| {
            AppError::TomlParse(format!(
                "Error parsing config file '{}': {}",
                config_path.display(),
                e
            ))
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut config = toml::from_str::<Config>(content)?;
        config.input.paths = config
            .input
            .paths
            .iter()
            .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref()))
            .collect();
        Ok(config)
    }

    /// The include string if non-empty.
    pub fn effective_include(&self) -> Option<&str> {
        self.input
            .include
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The exclude string if non-empty and no include string shadows it.
    pub fn effective_exclude(&self) -> Option<&str> {
        if self.effective_include().is_some() {
            return None;
        }
        self.input
            .exclude
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.paths.is_empty() {
            return Err(AppError::InvalidArgument(
                "No input files or directories given".to_string(),
            ));
        }
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.output.quality) {
            return Err(AppError::InvalidArgument(format!(
                "Compression quality must be between {} and {}, got {}",
                MIN_QUALITY, MAX_QUALITY, self.output.quality
            )));
        }
        if !is_identifier(&self.output.variable) {
            return Err(AppError::InvalidArgument(format!(
                "'{}' is not a valid variable name",
                self.output.variable
            )));
        }
        if let Some(package) = &self.output.package {
            if !is_identifier(package) {
                return Err(AppError::InvalidArgument(format!(
                    "'{}' is not a valid crate name",
                    package
                )));
            }
        }
        let has_include = self.effective_include().is_some();
        let has_exclude = self
            .input
            .exclude
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if has_include && has_exclude {
            log::warn!("Both include and exclude patterns given; exclude patterns are ignored.");
        }
        Ok(())
    }
}

/// Strict and reserved keywords of the 2024 edition.
const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait",
    "true", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do",
    "final", "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// ASCII identifier that is usable as-is in generated source.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    s != "_"
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        && !RUST_KEYWORDS.contains(&s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_with(paths: &[&str]) -> Config {
        let mut config = Config::default();
        config.input.paths = paths.iter().map(PathBuf::from).collect();
        config
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output.quality, 11);
        assert_eq!(config.output.variable, "ASSETS");
        assert_eq!(config.output.path, PathBuf::from("assets.gen.rs"));
        assert!(!config.output.decompress);
        assert!(!config.input.use_gitignore);
    }

    #[test]
    fn test_parse_toml() {
        let config = Config::from_toml_str(
            r#"
            [input]
            paths = ["public", "index.html"]
            exclude = "*.map, *.log"
            use_gitignore = true

            [output]
            variable = "WEB"
            quality = 5
            "#,
        )
        .unwrap();
        assert_eq!(
            config.input.paths,
            vec![PathBuf::from("public"), PathBuf::from("index.html")]
        );
        assert_eq!(config.effective_exclude(), Some("*.map, *.log"));
        assert!(config.input.use_gitignore);
        assert_eq!(config.output.variable, "WEB");
        assert_eq!(config.output.quality, 5);
        assert_eq!(config.output.path, PathBuf::from("assets.gen.rs"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Config::from_toml_str("[input]\nfoo = 1\n").is_err());
    }

    #[test]
    fn test_include_shadows_exclude() {
        let mut config = config_with(&["assets"]);
        config.input.include = Some("*.html".to_string());
        config.input.exclude = Some("*.css".to_string());
        assert_eq!(config.effective_include(), Some("*.html"));
        assert_eq!(config.effective_exclude(), None);
        assert!(config.validate().is_ok());

        config.input.include = Some("   ".to_string());
        assert_eq!(config.effective_include(), None);
        assert_eq!(config.effective_exclude(), Some("*.css"));
    }

    #[test]
    fn test_validate_quality_range() {
        let mut config = config_with(&["assets"]);
        config.output.quality = 0;
        assert!(matches!(
            config.validate(),
            Err(AppError::InvalidArgument(_))
        ));
        config.output.quality = 12;
        assert!(config.validate().is_err());
        config.output.quality = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_inputs() {
        assert!(matches!(
            Config::default().validate(),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_variable_name() {
        let mut config = config_with(&["assets"]);
        config.output.variable = "1abc".to_string();
        assert!(config.validate().is_err());
        config.output.variable = "my-var".to_string();
        assert!(config.validate().is_err());
        config.output.variable = "_ASSETS2".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_keywords_are_not_identifiers() {
        let mut config = config_with(&["assets"]);
        for keyword in ["static", "fn", "self", "match", "gen", "try"] {
            config.output.variable = keyword.to_string();
            assert!(
                matches!(config.validate(), Err(AppError::InvalidArgument(_))),
                "{keyword} accepted as variable"
            );
        }

        config.output.variable = "ASSETS".to_string();
        config.output.package = Some("crate".to_string());
        assert!(config.validate().is_err());
        config.output.package = Some("static_files".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_config_path() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            Config::resolve_config_path(dir.path(), None, false).unwrap(),
            None
        );

        let default_path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(&default_path, "").unwrap();
        assert_eq!(
            Config::resolve_config_path(dir.path(), None, false).unwrap(),
            Some(default_path.clone())
        );
        assert_eq!(
            Config::resolve_config_path(dir.path(), None, true).unwrap(),
            None
        );

        fs::write(dir.path().join("custom.toml"), "").unwrap();
        let custom = "custom".to_string();
        assert_eq!(
            Config::resolve_config_path(dir.path(), Some(&custom), false).unwrap(),
            Some(dir.path().join("custom.toml"))
        );

        let missing = "missing.toml".to_string();
        assert!(matches!(
            Config::resolve_config_path(dir.path(), Some(&missing), false),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_path_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(&path, "[output]\nquality = \"high\"\n").unwrap();
        assert!(matches!(
            Config::load_from_path(&path),
            Err(AppError::TomlParse(_))
        ));
    }
}
