use crate::config::Config;
use crate::emit;
use crate::error::Result;
use crate::gather::{self, Manifest};
use crate::pack;
use crate::rules::{self, RuleSet};
use log;
use std::path::{Path, PathBuf};

/// Result of one generation run.
#[derive(Debug, Clone)]
pub struct Generated {
    pub blob: Vec<u8>,
    pub file_count: usize,
    pub bytes_read: u64,
}

/// Drives one run: rules, collection, packing and rendering.
#[derive(Debug, Clone)]
pub struct Generator {
    config: Config,
    work_dir: PathBuf,
    verbose: bool,
}

impl Generator {
    /// `work_dir` is where `.gitignore` discovery starts, the package name is
    /// looked up and a relative output path is placed.
    pub fn new(config: Config, work_dir: impl Into<PathBuf>, verbose: bool) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            work_dir: work_dir.into(),
            verbose,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn build_rules(&self) -> Result<RuleSet> {
        rules::build_rules(&self.config, &self.work_dir)
    }

    /// Input paths exactly as configured. They become the record paths in
    /// the bundle, so relative inputs stay relative.
    pub fn inputs(&self) -> &[PathBuf] {
        &self.config.input.paths
    }

    pub fn collect(&self) -> Result<Manifest> {
        let rules = self.build_rules()?;
        gather::collect(self.inputs(), &rules, self.verbose)
    }

    pub fn generate(&self) -> Result<Generated> {
        let manifest = self.collect()?;
        let file_count = manifest.len();
        let bytes_read = manifest.total_bytes();

        let blob = pack::pack(&manifest.into_files(), self.config.output.quality)?;
        if self.verbose {
            log::info!("total bytes compressed: {}", blob.len());
        } else {
            log::debug!("total bytes compressed: {}", blob.len());
        }

        Ok(Generated {
            blob,
            file_count,
            bytes_read,
        })
    }

    pub fn package_name(&self) -> Result<String> {
        match &self.config.output.package {
            Some(name) => Ok(name.clone()),
            None => emit::discover_package_name(&self.work_dir),
        }
    }

    pub fn render(&self, generated: &Generated) -> Result<String> {
        let package = self.package_name()?;
        Ok(emit::render(
            &generated.blob,
            &self.config.output.variable,
            self.config.output.decompress,
            &package,
        ))
    }

    pub fn output_path(&self) -> PathBuf {
        let path = &self.config.output.path;
        if path.is_absolute() {
            path.clone()
        } else {
            self.work_dir.join(path)
        }
    }
}
